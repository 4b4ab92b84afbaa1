use crate::{
    calendar::CalendarTime,
    field::FieldSet,
    pattern::PatternType,
    search::{self, Backward, Direction, Forward},
    CronError, Result,
};
use chrono::{DateTime, TimeZone, Utc};
use log::debug;
use std::{fmt::Display, marker::PhantomData, str::FromStr};

/// Parsed six-field cron expression.
///
/// Immutable once constructed, so it may be freely shared between threads.
/// For the expression format and usage examples, please refer to the [crate documentation](crate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String"))]
#[cfg_attr(feature = "serde", serde(into = "String"))]
pub struct CronExpr {
    pub(crate) seconds: FieldSet,
    pub(crate) minutes: FieldSet,
    pub(crate) hours: FieldSet,
    pub(crate) days_of_month: FieldSet,
    pub(crate) months: FieldSet,
    pub(crate) days_of_week: FieldSet,
}

impl CronExpr {
    /// Parses and validates provided `pattern` and constructs [`CronExpr`] instance.
    ///
    /// Alternative way to construct [`CronExpr`] is to use one of `try_from` or `from_str` methods.
    ///
    /// Returns [`CronError`] in a case provided pattern is unparsable or has format errors.
    pub fn new(pattern: impl AsRef<str>) -> Result<Self> {
        let pattern = pattern.as_ref();
        let fields: Vec<&str> = pattern.split_whitespace().collect();

        if fields.len() != PatternType::ALL.len() {
            debug!("rejected `{pattern}`: {} fields", fields.len());
            return Err(CronError::InvalidCronSchedule(pattern.to_owned()));
        }

        let parse = |type_: PatternType| {
            type_
                .parse(fields[type_ as usize])
                .inspect_err(|err| debug!("rejected `{pattern}`: {err}"))
        };

        Ok(Self {
            seconds: parse(PatternType::Seconds)?,
            minutes: parse(PatternType::Minutes)?,
            hours: parse(PatternType::Hours)?,
            days_of_month: parse(PatternType::Doms)?,
            months: parse(PatternType::Months)?,
            days_of_week: parse(PatternType::Dows)?,
        })
    }

    /// Allowed seconds, `0-59`.
    pub fn seconds(&self) -> &FieldSet {
        &self.seconds
    }

    /// Allowed minutes, `0-59`.
    pub fn minutes(&self) -> &FieldSet {
        &self.minutes
    }

    /// Allowed hours, `0-23`.
    pub fn hours(&self) -> &FieldSet {
        &self.hours
    }

    /// Allowed days of month, `1-31`.
    pub fn days_of_month(&self) -> &FieldSet {
        &self.days_of_month
    }

    /// Allowed months, zero-based: `0` is January.
    pub fn months(&self) -> &FieldSet {
        &self.months
    }

    /// Allowed days of week, `0-6` where `0` is Sunday.
    pub fn days_of_week(&self) -> &FieldSet {
        &self.days_of_week
    }

    /// Returns `true` if `datetime`, taken in its own timezone, satisfies every field.
    ///
    /// Fraction of the second is ignored.
    pub fn matches<Tz: TimeZone>(&self, datetime: &DateTime<Tz>) -> bool {
        search::matches(self, &CalendarTime::from_datetime(datetime))
    }

    /// Returns the earliest matching instant strictly after `from`.
    ///
    /// Calendar fields are taken in the timezone of `from`, and the result is in the same timezone.
    /// Returns `None` if there is no match within four years after `from`
    /// (like for `0 0 0 31 2 *`) or the result can't be represented.
    #[inline]
    pub fn next<Tz: TimeZone>(&self, from: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        search::find::<Forward, Tz>(self, from)
    }

    /// Returns the latest matching instant strictly before `from`.
    ///
    /// Mirror of [`next`](CronExpr::next).
    #[inline]
    pub fn prev<Tz: TimeZone>(&self, from: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        search::find::<Backward, Tz>(self, from)
    }

    /// Same as [`next`](CronExpr::next), for seconds since the Unix epoch, in UTC.
    pub fn next_timestamp(&self, from: i64) -> Option<i64> {
        let from = DateTime::<Utc>::from_timestamp(from, 0)?;
        self.next(&from).map(|found| found.timestamp())
    }

    /// Same as [`prev`](CronExpr::prev), for seconds since the Unix epoch, in UTC.
    pub fn prev_timestamp(&self, from: i64) -> Option<i64> {
        let from = DateTime::<Utc>::from_timestamp(from, 0)?;
        self.prev(&from).map(|found| found.timestamp())
    }

    /// Returns iterator of matching instants strictly after `from`, in ascending order.
    ///
    /// Iteration stops at the first failed search.
    #[inline]
    pub fn iter<Tz: TimeZone>(&self, from: &DateTime<Tz>) -> impl Iterator<Item = DateTime<Tz>> {
        CronIter::<Tz, Forward>::new(*self, from)
    }

    /// Returns iterator of matching instants strictly before `from`, in descending order.
    #[inline]
    pub fn iter_back<Tz: TimeZone>(&self, from: &DateTime<Tz>) -> impl Iterator<Item = DateTime<Tz>> {
        CronIter::<Tz, Backward>::new(*self, from)
    }
}

/// Contains iterator state.
#[derive(Debug, Clone)]
struct CronIter<Tz: TimeZone, D: Direction> {
    expr: CronExpr,
    next: Option<DateTime<Tz>>,
    direction: PhantomData<D>,
}

impl<Tz: TimeZone, D: Direction> CronIter<Tz, D> {
    fn new(expr: CronExpr, from: &DateTime<Tz>) -> Self {
        Self {
            next: search::find::<D, Tz>(&expr, from),
            expr,
            direction: PhantomData,
        }
    }
}

impl<Tz: TimeZone, D: Direction> Iterator for CronIter<Tz, D> {
    type Item = DateTime<Tz>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = search::find::<D, Tz>(&self.expr, &current);
        Some(current)
    }
}

impl From<CronExpr> for String {
    fn from(value: CronExpr) -> Self {
        value.to_string()
    }
}

impl From<&CronExpr> for String {
    fn from(value: &CronExpr) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for CronExpr {
    type Error = CronError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&String> for CronExpr {
    type Error = CronError;

    fn try_from(value: &String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for CronExpr {
    type Error = CronError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl FromStr for CronExpr {
    type Err = CronError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

/// Canonical form: `*` for unrestricted fields, months as `1-12`, days of week as `0-6`.
impl Display for CronExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {}",
            PatternType::Seconds.format(&self.seconds),
            PatternType::Minutes.format(&self.minutes),
            PatternType::Hours.format(&self.hours),
            PatternType::Doms.format(&self.days_of_month),
            PatternType::Months.format(&self.months),
            PatternType::Dows.format(&self.days_of_week),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use rstest::rstest;
    use rstest_reuse::{apply, template};
    use std::time::Duration;

    fn utc(input: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(input).unwrap().with_timezone(&Utc)
    }

    #[template]
    #[rstest]
    #[case("* * * * * *", "* * * * * *")]
    #[case("0 0 12 * * MON-FRI", "0 0 12 * * 1-5")]
    #[case("  0   0 12 * *   mon-fri ", "0 0 12 * * 1-5")]
    #[case("0 */15 9-17 ? JAN,MAR,MAY ?", "0 0,15,30,45 9-17 * 1,3,5 *")]
    #[case("0 0 0 1 */3 SUN,7", "0 0 0 1 1,4,7,10 0")]
    #[case("0 0 0 1 1-12 0-7", "0 0 0 1 * *")]
    #[case("30 1,2,3 0 1,2 1 *", "30 1-3 0 1,2 1 *")]
    #[case("0/20 5/2 0-15 1-6/2 */6 *", "0,20,40 5,7,9,11,13,15,17,19,21,23,25,27,29,31,33,35,37,39,41,43,45,47,49,51,53,55,57,59 0-15 1,3,5 1,7 *")]
    fn valid_expressions(#[case] input: &str, #[case] expected: &str) {}

    #[apply(valid_expressions)]
    fn test_display_and_new(#[case] input: &str, #[case] expected: &str) {
        let expr = CronExpr::new(input).unwrap();
        assert_eq!(expr.to_string(), expected, "input = {input}");
        assert_eq!(CronExpr::new(expr.to_string()), Ok(expr));
    }

    #[apply(valid_expressions)]
    fn test_try_from_string(#[case] input: &str, #[case] _expected: &str) {
        let expr = CronExpr::new(input).unwrap();
        assert_eq!(CronExpr::try_from(input), Ok(expr));

        let text = String::from(input);
        assert_eq!(CronExpr::try_from(&text), Ok(expr));
        assert_eq!(CronExpr::try_from(text), Ok(expr));
        assert_eq!(CronExpr::from_str(input), Ok(expr));
        assert_eq!(input.parse::<CronExpr>(), Ok(expr));
    }

    #[rstest]
    #[case("", CronError::InvalidCronSchedule("".into()))]
    #[case("* * * * *", CronError::InvalidCronSchedule("* * * * *".into()))]
    #[case("* * * * * * *", CronError::InvalidCronSchedule("* * * * * * *".into()))]
    #[case("60 * * * * *", CronError::InvalidSecondValue("60".into()))]
    #[case("* 60 * * * *", CronError::InvalidMinuteValue("60".into()))]
    #[case("* * 24 * * *", CronError::InvalidHourValue("24".into()))]
    #[case("* * * 0 * *", CronError::InvalidDayOfMonthValue("0".into()))]
    #[case("* * * * 13 *", CronError::InvalidMonthValue("13".into()))]
    #[case("* * * * * 8", CronError::InvalidDayOfWeekValue("8".into()))]
    #[case("* * * * * FRI-MON", CronError::InvalidRangeValue("FRI-MON".into()))]
    #[case("*/0 * * * * *", CronError::InvalidRepeatingPattern("*/0".into()))]
    fn test_new_errors(#[case] input: &str, #[case] expected: CronError) {
        assert_eq!(CronExpr::new(input), Err(expected));
    }

    #[test]
    fn test_accessors() {
        let expr = CronExpr::new("1 2 3 4 5 6").unwrap();
        assert_eq!(expr.seconds().iter().collect::<Vec<_>>(), vec![1]);
        assert_eq!(expr.minutes().iter().collect::<Vec<_>>(), vec![2]);
        assert_eq!(expr.hours().iter().collect::<Vec<_>>(), vec![3]);
        assert_eq!(expr.days_of_month().iter().collect::<Vec<_>>(), vec![4]);
        assert_eq!(expr.months().iter().collect::<Vec<_>>(), vec![4]);
        assert_eq!(expr.days_of_week().iter().collect::<Vec<_>>(), vec![6]);
    }

    #[test]
    fn test_into_string() {
        let expr = CronExpr::new("0 0 0 * * SUN").unwrap();
        assert_eq!(String::from(&expr), "0 0 0 * * 0");
        assert_eq!(String::from(expr), "0 0 0 * * 0");
    }

    #[rstest]
    #[case("0 0 12 * * MON-FRI", "2024-01-06T09:00:00Z", "2024-01-08T12:00:00+00:00")]
    #[case("0 0 12 * * MON-FRI", "2024-01-08T12:00:00Z", "2024-01-09T12:00:00+00:00")]
    #[case("*/5 * * * * *", "2024-01-01T00:00:00Z", "2024-01-01T00:00:05+00:00")]
    #[case("*/5 * * * * *", "2024-01-01T00:00:01Z", "2024-01-01T00:00:05+00:00")]
    #[case("0 */15 * * * *", "2024-01-01T00:01:00Z", "2024-01-01T00:15:00+00:00")]
    #[case("0 0 0 1 1 *", "2024-01-01T00:00:00Z", "2025-01-01T00:00:00+00:00")]
    #[case("0 0 0 1 1 *", "2024-12-31T23:59:59Z", "2025-01-01T00:00:00+00:00")]
    #[case("0 0 0 29 2 *", "2024-03-01T00:00:00Z", "2028-02-29T00:00:00+00:00")]
    #[case("0 0 0 31 * *", "2024-02-01T00:00:00Z", "2024-03-31T00:00:00+00:00")]
    #[case("0 0 0 * 2 *", "2024-01-31T00:00:00Z", "2024-02-01T00:00:00+00:00")]
    #[case("0,30 * * * 2 *", "2024-01-31T23:59:15Z", "2024-02-01T00:00:00+00:00")]
    #[case("59 59 23 31 12 *", "2024-06-15T10:00:00Z", "2024-12-31T23:59:59+00:00")]
    #[case("0 0 0 13 * FRI", "2024-01-01T00:00:00Z", "2024-09-13T00:00:00+00:00")]
    #[case("0 0 0 13 * FRI", "2024-09-13T00:00:00Z", "2024-12-13T00:00:00+00:00")]
    #[case("0 0 0 * * SUN", "2024-01-01T00:00:00Z", "2024-01-07T00:00:00+00:00")]
    #[case("0 0 0 * * 7", "2024-01-01T00:00:00Z", "2024-01-07T00:00:00+00:00")]
    #[case("0 0 0 1 */2 *", "2024-02-01T00:00:00Z", "2024-03-01T00:00:00+00:00")]
    #[case("0 1 2 29-31 * *", "2025-02-01T00:00:21Z", "2025-03-29T02:01:00+00:00")]
    #[case("30 0 0 1 * *", "2024-01-01T00:00:29.500Z", "2024-01-01T00:00:30+00:00")]
    #[case("30 0 0 1 * *", "2024-01-01T00:00:30.001Z", "2024-02-01T00:00:30+00:00")]
    #[timeout(Duration::from_secs(1))]
    fn test_next(#[case] pattern: &str, #[case] from: &str, #[case] expected: &str) {
        let expr = CronExpr::new(pattern).unwrap();
        let next = expr.next(&utc(from)).map(|found| found.to_rfc3339());
        assert_eq!(next.as_deref(), Some(expected), "pattern = {pattern}, from = {from}");
    }

    #[rstest]
    #[case("0 0 12 * * MON-FRI", "2024-01-09T12:00:00Z", "2024-01-08T12:00:00+00:00")]
    #[case("0 0 12 * * MON-FRI", "2024-01-08T09:00:00Z", "2024-01-05T12:00:00+00:00")]
    #[case("*/5 * * * * *", "2024-01-01T00:00:00Z", "2023-12-31T23:59:55+00:00")]
    #[case("0 0 0 1 1 *", "2024-06-01T00:00:00Z", "2024-01-01T00:00:00+00:00")]
    #[case("0 0 0 * 2 *", "2024-03-31T12:00:00Z", "2024-02-29T00:00:00+00:00")]
    #[case("0 0 0 29 2 *", "2024-02-28T00:00:00Z", "2020-02-29T00:00:00+00:00")]
    #[case("0 0 0 13 * FRI", "2024-09-13T00:00:00Z", "2023-10-13T00:00:00+00:00")]
    #[case("59 59 23 31 12 *", "2024-06-15T10:00:00Z", "2023-12-31T23:59:59+00:00")]
    #[case("30 0 0 1 * *", "2024-01-01T00:00:30Z", "2023-12-01T00:00:30+00:00")]
    #[case("30 0 0 1 * *", "2024-01-01T00:00:30.500Z", "2024-01-01T00:00:30+00:00")]
    #[timeout(Duration::from_secs(1))]
    fn test_prev(#[case] pattern: &str, #[case] from: &str, #[case] expected: &str) {
        let expr = CronExpr::new(pattern).unwrap();
        let prev = expr.prev(&utc(from)).map(|found| found.to_rfc3339());
        assert_eq!(prev.as_deref(), Some(expected), "pattern = {pattern}, from = {from}");
    }

    #[rstest]
    #[case("0 0 0 31 2 *")]
    #[case("0 0 0 30 2 *")]
    #[timeout(Duration::from_secs(1))]
    fn test_no_match(#[case] pattern: &str) {
        let expr = CronExpr::new(pattern).unwrap();
        let from = utc("2024-01-01T00:00:00Z");
        assert_eq!(expr.next(&from), None);
        assert_eq!(expr.prev(&from), None);
        assert_eq!(expr.iter(&from).count(), 0);
    }

    #[test]
    fn test_timezone_is_preserved() {
        let tz = FixedOffset::east_opt(3 * 3600).unwrap();
        let expr = CronExpr::new("0 0 12 * * *").unwrap();
        let from = tz.with_ymd_and_hms(2024, 1, 1, 13, 0, 0).unwrap();

        let next = expr.next(&from).unwrap();
        assert_eq!(next.to_rfc3339(), "2024-01-02T12:00:00+03:00");
        assert_eq!(next.timezone(), tz);

        let prev = expr.prev(&from).unwrap();
        assert_eq!(prev.to_rfc3339(), "2024-01-01T12:00:00+03:00");
    }

    #[test]
    fn test_timestamps() {
        let expr = CronExpr::new("0 0 0 1 1 *").unwrap();
        assert_eq!(expr.next_timestamp(0), Some(31_536_000));
        assert_eq!(expr.prev_timestamp(31_536_000), Some(0));
        assert_eq!(expr.next_timestamp(i64::MAX), None);
    }

    #[test]
    fn test_matches() {
        let expr = CronExpr::new("0 0 0 13 * FRI").unwrap();
        assert!(expr.matches(&utc("2024-09-13T00:00:00Z")));
        assert!(expr.matches(&utc("2024-09-13T00:00:00.999Z")));
        assert!(!expr.matches(&utc("2024-08-13T00:00:00Z")));
        assert!(!expr.matches(&utc("2024-09-13T00:00:01Z")));
    }

    #[test]
    fn test_iter() {
        let expr = CronExpr::new("0 0 0 * * SAT,SUN").unwrap();
        let from = utc("2024-01-01T00:00:00Z");

        let forward: Vec<String> = expr.iter(&from).take(4).map(|t| t.to_rfc3339()).collect();
        assert_eq!(
            forward,
            vec![
                "2024-01-06T00:00:00+00:00",
                "2024-01-07T00:00:00+00:00",
                "2024-01-13T00:00:00+00:00",
                "2024-01-14T00:00:00+00:00",
            ]
        );

        let backward: Vec<String> = expr.iter_back(&from).take(3).map(|t| t.to_rfc3339()).collect();
        assert_eq!(
            backward,
            vec![
                "2023-12-31T00:00:00+00:00",
                "2023-12-30T00:00:00+00:00",
                "2023-12-24T00:00:00+00:00",
            ]
        );
    }

    #[test]
    fn test_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CronExpr>();
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde() {
        let expr = CronExpr::new("0 0 12 * * MON-FRI").unwrap();
        let json = serde_json::to_string(&expr).unwrap();
        assert_eq!(json, "\"0 0 12 * * 1-5\"");
        assert_eq!(serde_json::from_str::<CronExpr>(&json).unwrap(), expr);
        assert!(serde_json::from_str::<CronExpr>("\"0 0 12 * *\"").is_err());
    }
}
