/// Field-by-field search of the nearest matching instant, in either direction.
use crate::{
    calendar::{Bound, CalendarField, CalendarTime},
    expr::CronExpr,
    field::{FieldSet, FieldValue},
};
use chrono::{DateTime, TimeZone};
use log::{debug, trace};
use std::marker::PhantomData;

/// Maximum number of single-day steps made by one day-search pass.
pub(crate) const MAX_DAY_STEPS: u32 = 366;
/// The search gives up once the candidate is more than this number of years away from the start.
pub(crate) const MAX_YEARS_DIFF: i64 = 4;

/// Direction of the search: which neighbour to seek, where to wrap, and which way to carry.
pub(crate) trait Direction {
    /// Carry into the next higher field, also the direction skipped local time is moved in.
    const STEP: i64;
    /// Lower fields snap to this end of their range when a higher field moves.
    const BOUND: Bound;

    /// Nearest member of `set` on the search side of `from`, `from` itself included.
    fn seek(set: &FieldSet, from: FieldValue) -> Option<FieldValue>;
    /// Member to wrap around to after a carry.
    fn wrap(set: &FieldSet) -> Option<FieldValue>;
    /// Returns `true` if `year` is too far from `start_year`.
    fn diverged(start_year: i64, year: i64) -> bool;
    /// Returns `true` if `found` lies strictly on the search side of `from`.
    fn beyond<Tz: TimeZone>(found: &DateTime<Tz>, from: &DateTime<Tz>) -> bool;
}

/// Searches for the earliest match strictly after the start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Forward;

/// Searches for the latest match strictly before the start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Backward;

impl Direction for Forward {
    const STEP: i64 = 1;
    const BOUND: Bound = Bound::Min;

    fn seek(set: &FieldSet, from: FieldValue) -> Option<FieldValue> {
        set.find_next_set(from)
    }

    fn wrap(set: &FieldSet) -> Option<FieldValue> {
        set.first()
    }

    fn diverged(start_year: i64, year: i64) -> bool {
        year - start_year > MAX_YEARS_DIFF
    }

    fn beyond<Tz: TimeZone>(found: &DateTime<Tz>, from: &DateTime<Tz>) -> bool {
        found > from
    }
}

impl Direction for Backward {
    const STEP: i64 = -1;
    const BOUND: Bound = Bound::Max;

    fn seek(set: &FieldSet, from: FieldValue) -> Option<FieldValue> {
        set.find_prev_set(from)
    }

    fn wrap(set: &FieldSet) -> Option<FieldValue> {
        set.last()
    }

    fn diverged(start_year: i64, year: i64) -> bool {
        start_year - year > MAX_YEARS_DIFF
    }

    fn beyond<Tz: TimeZone>(found: &DateTime<Tz>, from: &DateTime<Tz>) -> bool {
        found < from
    }
}

/// Ordered set of fields already settled during the current pass.
///
/// Whenever a higher field moves, every recorded field is reset to its bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Resets {
    fields: [Option<CalendarField>; CalendarField::COUNT],
    len: usize,
}

impl Resets {
    /// Returns a copy with `field` recorded. Recording the same field twice has no effect.
    pub(crate) fn with(mut self, field: CalendarField) -> Self {
        if !self.contains(field) && self.len < CalendarField::COUNT {
            self.fields[self.len] = Some(field);
            self.len += 1;
        }
        self
    }

    pub(crate) fn contains(&self, field: CalendarField) -> bool {
        self.iter().any(|recorded| recorded == field)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = CalendarField> + '_ {
        self.fields[..self.len].iter().flatten().copied()
    }

    fn apply<Tz: TimeZone>(&self, calendar: &mut CalendarTime<Tz>, bound: Bound) {
        self.iter().for_each(|field| calendar.reset(field, bound));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SearchError {
    /// Calendar time can't be represented as an instant.
    Conversion,
    /// No match within the allowed number of years.
    Diverged,
    /// Field has no members at all.
    EmptyField,
    /// Search keeps landing on the start.
    Stalled,
}

/// Current step of the search state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Second,
    Minute,
    Hour,
    Day,
    Month,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DaySeek {
    Matched,
    Moved,
    Exhausted,
}

/// Single search over the calendar, in direction `D`.
pub(crate) struct Search<'a, D: Direction> {
    expr: &'a CronExpr,
    start_year: i64,
    direction: PhantomData<D>,
}

/// Returns the nearest instant matching `expr`, strictly after (or before) `from`,
/// in the timezone of `from`.
pub(crate) fn find<D: Direction, Tz: TimeZone>(expr: &CronExpr, from: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    match try_find::<D, Tz>(expr, from) {
        Ok(found) => Some(found),
        Err(err) => {
            debug!("no instant found for `{expr}` from {}: {err:?}", from.naive_local());
            None
        }
    }
}

fn try_find<D: Direction, Tz: TimeZone>(expr: &CronExpr, from: &DateTime<Tz>) -> Result<DateTime<Tz>, SearchError> {
    let mut calendar = CalendarTime::from_datetime(from).searching_from(from, D::STEP);

    Search::<D>::new(expr, calendar.year()).advance(&mut calendar)?;
    let found = calendar.to_datetime().ok_or(SearchError::Conversion)?;
    if D::beyond(&found, from) {
        return Ok(found);
    }

    // the start matched itself
    trace!("{} isn't beyond the start, stepping over", found.naive_local());
    calendar.add(CalendarField::Second, D::STEP);
    calendar.normalize().ok_or(SearchError::Conversion)?;
    Search::<D>::new(expr, calendar.year()).advance(&mut calendar)?;

    let found = calendar.to_datetime().ok_or(SearchError::Conversion)?;
    if D::beyond(&found, from) {
        Ok(found)
    } else {
        Err(SearchError::Stalled)
    }
}

/// Returns `true` if every field of `calendar` is allowed by `expr`.
pub(crate) fn matches<Tz: TimeZone>(expr: &CronExpr, calendar: &CalendarTime<Tz>) -> bool {
    calendar.is_member(CalendarField::Second, &expr.seconds)
        && calendar.is_member(CalendarField::Minute, &expr.minutes)
        && calendar.is_member(CalendarField::Hour, &expr.hours)
        && calendar.is_member(CalendarField::DayOfMonth, &expr.days_of_month)
        && calendar.is_member(CalendarField::Month, &expr.months)
        && calendar.is_member(CalendarField::DayOfWeek, &expr.days_of_week)
}

impl<'a, D: Direction> Search<'a, D> {
    pub(crate) fn new(expr: &'a CronExpr, start_year: i64) -> Self {
        Self {
            expr,
            start_year,
            direction: PhantomData,
        }
    }

    /// Moves `calendar` to the nearest matching instant, the current one included.
    pub(crate) fn advance<Tz: TimeZone>(&self, calendar: &mut CalendarTime<Tz>) -> Result<(), SearchError> {
        let mut state = State::Second;
        let mut resets = Resets::default();

        while state != State::Done {
            (state, resets) = self.step(state, resets, calendar)?;
        }

        Ok(())
    }

    fn step<Tz: TimeZone>(
        &self,
        state: State,
        resets: Resets,
        calendar: &mut CalendarTime<Tz>,
    ) -> Result<(State, Resets), SearchError> {
        let restart = (State::Second, Resets::default());

        match state {
            State::Second => {
                // a new second is a member too, so it's settled either way
                self.seek(calendar, &self.expr.seconds, CalendarField::Second, CalendarField::Minute, resets)?;
                Ok((State::Minute, resets.with(CalendarField::Second)))
            }
            State::Minute => {
                if self.seek(calendar, &self.expr.minutes, CalendarField::Minute, CalendarField::Hour, resets)? {
                    trace!("minute moved, restarting");
                    Ok(restart)
                } else {
                    Ok((State::Hour, resets.with(CalendarField::Minute)))
                }
            }
            State::Hour => {
                if self.seek(calendar, &self.expr.hours, CalendarField::Hour, CalendarField::DayOfWeek, resets)? {
                    trace!("hour moved, restarting");
                    Ok(restart)
                } else {
                    Ok((State::Day, resets.with(CalendarField::Hour)))
                }
            }
            State::Day => match self.seek_day(calendar, resets)? {
                DaySeek::Matched => Ok((State::Month, resets.with(CalendarField::DayOfMonth))),
                DaySeek::Moved => {
                    trace!("day moved, restarting");
                    Ok(restart)
                }
                DaySeek::Exhausted => {
                    self.check_divergence(calendar)?;
                    trace!("day search exhausted at year {}, restarting", calendar.year());
                    Ok(restart)
                }
            },
            State::Month => {
                if self.seek(calendar, &self.expr.months, CalendarField::Month, CalendarField::Year, resets)? {
                    self.check_divergence(calendar)?;
                    trace!("month moved, restarting");
                    Ok(restart)
                } else {
                    Ok((State::Done, resets))
                }
            }
            State::Done => Ok((State::Done, resets)),
        }
    }

    /// Moves `field` to the nearest member of `set`.
    ///
    /// If there is no such member in the current range, carries into `carry` and wraps around.
    /// Recorded `lower` fields are reset in the same normalization pass.
    /// Returns `true` if the field has been moved.
    fn seek<Tz: TimeZone>(
        &self,
        calendar: &mut CalendarTime<Tz>,
        set: &FieldSet,
        field: CalendarField,
        carry: CalendarField,
        lower: Resets,
    ) -> Result<bool, SearchError> {
        let value = FieldValue::try_from(calendar.get(field)).map_err(|_| SearchError::Conversion)?;

        let target = match D::seek(set, value) {
            Some(found) if found == value => return Ok(false),
            Some(found) => found,
            None => {
                calendar.add(carry, D::STEP);
                D::wrap(set).ok_or(SearchError::EmptyField)?
            }
        };

        calendar.set(field, i64::from(target));
        lower.apply(calendar, D::BOUND);
        calendar.normalize().ok_or(SearchError::Conversion)?;

        Ok(true)
    }

    /// Steps day by day until both day of month and day of week are allowed.
    fn seek_day<Tz: TimeZone>(&self, calendar: &mut CalendarTime<Tz>, lower: Resets) -> Result<DaySeek, SearchError> {
        let mut steps = 0;

        while !(calendar.is_member(CalendarField::DayOfMonth, &self.expr.days_of_month)
            && calendar.is_member(CalendarField::DayOfWeek, &self.expr.days_of_week))
        {
            if steps == MAX_DAY_STEPS {
                return Ok(DaySeek::Exhausted);
            }
            steps += 1;

            calendar.add(CalendarField::DayOfMonth, D::STEP);
            lower.apply(calendar, D::BOUND);
            calendar.normalize().ok_or(SearchError::Conversion)?;
        }

        Ok(if steps == 0 { DaySeek::Matched } else { DaySeek::Moved })
    }

    fn check_divergence<Tz: TimeZone>(&self, calendar: &CalendarTime<Tz>) -> Result<(), SearchError> {
        if D::diverged(self.start_year, calendar.year()) {
            debug!(
                "giving up at year {}, started at {} for `{}`",
                calendar.year(),
                self.start_year,
                self.expr
            );
            Err(SearchError::Diverged)
        } else {
            Ok(())
        }
    }
}
