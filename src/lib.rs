//! Six-field cron expression parser with next and previous occurrence search.
#![deny(unsafe_code, warnings, missing_docs)]

//! This is a tiny crate, intended to:
//! - parse classic cron expressions with a leading seconds field;
//! - find the nearest instant matching the expression, after or before a given one.
//!
//! It depends on [chrono](https://crates.io/crates/chrono) for calendar arithmetic and timezones.
//!
//! _This is not a cron jobs scheduler or runner._ It owns no clock and no threads,
//! so parsed expressions may be shared and searched concurrently.
//!
//! ## Cron expression format
//!
//! An expression consists of exactly six fields separated by whitespace:
//! seconds, minutes, hours, day of month, month and day of week.
//!
//! | Field        | Allowed values  | Allowed special characters |
//! |--------------|-----------------|----------------------------|
//! | Seconds      | 0-59            | * , - /                    |
//! | Minutes      | 0-59            | * , - /                    |
//! | Hours        | 0-23            | * , - /                    |
//! | Day of Month | 1-31            | * , - / ?                  |
//! | Month        | 1-12 or JAN-DEC | * , - /                    |
//! | Day of Week  | 0-7 or SUN-SAT  | * , - / ?                  |
//!
//! Patterns meanings:
//! - `*` - each possible value, i.e. `0,1,2,...,59` for minutes;
//! - `,` - list of values or patterns, i.e. `1,7,12`, `SUN,FRI`;
//! - `-` - range of values, i.e. `0-15`, `JAN-MAR`;
//! - `/` - repeating values, i.e. `*/12`, `10/5`, `30-59/2`; `10/5` runs up to the end of the field;
//! - `?` - the whole day of month or day of week field may be `?`, which means the same as `*`.
//!
//! Names of months and days of week are case-insensitive, and both `0` and `7` mean Sunday.
//!
//! Unlike in some cron flavors, day of month and day of week are combined with logical AND:
//! `0 0 0 13 * FRI` matches Friday the 13th only.
//!
//! ## How to use
//!
//! The central entity of the crate is a [`CronExpr`] structure:
//! - [new()](CronExpr::new): constructor to parse and validate provided expression;
//! - [next()](CronExpr::next): returns the earliest matching instant strictly after the provided one;
//! - [prev()](CronExpr::prev): returns the latest matching instant strictly before the provided one;
//! - [iter()](CronExpr::iter) and [iter_back()](CronExpr::iter_back): series of matching instants.
//!
//! Calendar fields are evaluated in the timezone of the provided instant.
//! Searches give up (and return `None`) if there is no match within four years, like for `0 0 0 30 2 *`.
//!
//! ### Example with `next` and `prev`
//! ```rust
//! use chrono::DateTime;
//! use cron_seek::{CronExpr, Result};
//!
//! fn next_and_prev() -> Result<()> {
//!     let expr = CronExpr::new("0 0 12 * * MON-FRI")?;
//!     let saturday = DateTime::parse_from_rfc3339("2024-01-06T09:00:00+00:00").unwrap();
//!
//!     let next = expr.next(&saturday).unwrap();
//!     assert_eq!(next.to_rfc3339(), "2024-01-08T12:00:00+00:00");
//!
//!     let prev = expr.prev(&saturday).unwrap();
//!     assert_eq!(prev.to_rfc3339(), "2024-01-05T12:00:00+00:00");
//!
//!     Ok(())
//! }
//! # next_and_prev().unwrap();
//! ```
//!
//! ### Example with Unix timestamps
//! ```rust
//! use cron_seek::{next, prev, CronExpr, INVALID_INSTANT};
//!
//! let yearly = CronExpr::new("0 0 0 1 1 *").unwrap();
//! assert_eq!(next(&yearly, 0), 31_536_000);
//! assert_eq!(prev(&yearly, 31_536_000), 0);
//!
//! let never = CronExpr::new("0 0 0 31 2 *").unwrap();
//! assert_eq!(next(&never, 0), INVALID_INSTANT);
//! ```
//!
//! ### Example with `iter`
//! ```rust
//! use chrono::Utc;
//! use cron_seek::{CronExpr, Result};
//!
//! fn iterator() -> Result<()> {
//!     let expr = CronExpr::new("0 0 0 * * *")?;
//!     let now = Utc::now();
//!
//!     // Get the next 10 timestamps starting from now
//!     expr.iter(&now).take(10).for_each(|t| println!("next: {t}"));
//!
//!     Ok(())
//! }
//! # iterator().unwrap();
//! ```
//!
//! # Feature flags
//! * `serde`: adds [`Serialize`](https://docs.rs/serde/latest/serde/trait.Serialize.html) and [`Deserialize`](https://docs.rs/serde/latest/serde/trait.Deserialize.html) trait implementation for [`CronExpr`],
//!   as its canonical string form.

mod calendar;
/// Crate specific Error implementation.
pub mod error;
/// Parsed cron expression and its search methods.
pub mod expr;
/// Bit set of values allowed by a single field.
pub mod field;
mod pattern;
mod search;
mod utils;

// Re-export of public entities.
pub use error::CronError;
pub use expr::CronExpr;
pub use field::{FieldSet, FieldValue};

/// Convenient alias for `Result`.
pub type Result<T, E = CronError> = std::result::Result<T, E>;

/// Returned by [`next`] and [`prev`] when no instant can be found.
///
/// Note that it's also a valid timestamp (one second before the Unix epoch),
/// so prefer [`CronExpr::next_timestamp`] and [`CronExpr::prev_timestamp`] where that matters.
pub const INVALID_INSTANT: i64 = -1;

/// Parses `expression`, same as [`CronExpr::new`].
#[inline]
pub fn parse(expression: &str) -> Result<CronExpr> {
    CronExpr::new(expression)
}

/// Returns the earliest instant matching `expr` strictly after `from`, both in seconds since the Unix epoch (UTC).
///
/// Returns [`INVALID_INSTANT`] if there is no such instant within four years.
pub fn next(expr: &CronExpr, from: i64) -> i64 {
    expr.next_timestamp(from).unwrap_or(INVALID_INSTANT)
}

/// Returns the latest instant matching `expr` strictly before `from`, both in seconds since the Unix epoch (UTC).
///
/// Returns [`INVALID_INSTANT`] if there is no such instant within four years.
pub fn prev(expr: &CronExpr, from: i64) -> i64 {
    expr.prev_timestamp(from).unwrap_or(INVALID_INSTANT)
}
