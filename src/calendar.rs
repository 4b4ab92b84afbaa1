/// Broken-down calendar time, bound to a `chrono` timezone.
use crate::{field::FieldSet, field::FieldValue, utils};
use chrono::{DateTime, Datelike, LocalResult, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Timelike};

/// Longest run of local time skipped by an offset transition, in hours.
const MAX_GAP_HOURS: i64 = 24;

/// Calendar fields which the search reads, sets, resets or carries into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum CalendarField {
    Second,
    Minute,
    Hour,
    DayOfWeek,
    DayOfMonth,
    Month,
    Year,
}

impl CalendarField {
    pub(crate) const COUNT: usize = 7;
}

/// Which end of its range a field snaps to on reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Bound {
    Min,
    Max,
}

impl Bound {
    #[inline]
    fn pick(self, min: i64, max: i64) -> i64 {
        match self {
            Self::Min => min,
            Self::Max => max,
        }
    }
}

/// Year, month (zero-based), day, hour, minute, second and weekday (Sunday is 0)
/// of an instant in the timezone `Tz`.
///
/// Setters only stage values, which may temporarily run out of their natural ranges:
/// [`normalize`](CalendarTime::normalize) folds them back using proleptic Gregorian arithmetic
/// (day 32 of January is February 1st, minute -1 is the last minute of the previous hour)
/// and re-reads every field, including the weekday, from the resolved instant.
#[derive(Debug, Clone)]
pub(crate) struct CalendarTime<Tz: TimeZone> {
    tz: Tz,
    step: i64,
    anchor: Option<DateTime<Tz>>,
    year: i64,
    month: i64,
    day: i64,
    hour: i64,
    minute: i64,
    second: i64,
    weekday: i64,
}

impl<Tz: TimeZone> CalendarTime<Tz> {
    /// Breaks `datetime` down in its own timezone, dropping the fraction of the second.
    pub(crate) fn from_datetime(datetime: &DateTime<Tz>) -> Self {
        let local = datetime.naive_local();

        Self {
            tz: datetime.timezone(),
            step: 1,
            anchor: None,
            year: i64::from(local.year()),
            month: i64::from(local.month0()),
            day: i64::from(local.day()),
            hour: i64::from(local.hour()),
            minute: i64::from(local.minute()),
            second: i64::from(local.second()),
            weekday: i64::from(local.weekday().num_days_from_sunday()),
        }
    }

    /// Resolves offset transitions for a search from `anchor`, in the direction of `step` (`1` or `-1`).
    ///
    /// Local time skipped by a transition moves in that direction, an hour at a time.
    /// Repeated local time takes the first of its instants, in search order, which isn't behind `anchor`.
    /// Without an anchor, skipped time moves forward and repeated time takes the earliest instant.
    pub(crate) fn searching_from(mut self, anchor: &DateTime<Tz>, step: i64) -> Self {
        self.step = step.signum();
        self.anchor = Some(anchor.clone());
        self
    }

    /// Resolves staged fields into an instant.
    ///
    /// Returns `None` if the result is out of the range `chrono` is able to represent.
    pub(crate) fn to_datetime(&self) -> Option<DateTime<Tz>> {
        let naive = self.to_naive()?;

        (0..=MAX_GAP_HOURS).find_map(|hours| {
            let shifted = naive.checked_add_signed(TimeDelta::try_hours(hours * self.step)?)?;
            self.pick_instant(self.tz.from_local_datetime(&shifted))
        })
    }

    /// Round-trips staged fields through the timezone.
    pub(crate) fn normalize(&mut self) -> Option<()> {
        let datetime = self.to_datetime()?;
        let (step, anchor) = (self.step, self.anchor.take());
        *self = Self {
            step,
            anchor,
            ..Self::from_datetime(&datetime)
        };
        Some(())
    }

    #[inline]
    pub(crate) fn year(&self) -> i64 {
        self.year
    }

    pub(crate) fn get(&self, field: CalendarField) -> i64 {
        match field {
            CalendarField::Second => self.second,
            CalendarField::Minute => self.minute,
            CalendarField::Hour => self.hour,
            CalendarField::DayOfWeek => self.weekday,
            CalendarField::DayOfMonth => self.day,
            CalendarField::Month => self.month,
            CalendarField::Year => self.year,
        }
    }

    /// Returns `true` if the current value of `field` is a member of `set`.
    pub(crate) fn is_member(&self, field: CalendarField, set: &FieldSet) -> bool {
        FieldValue::try_from(self.get(field)).is_ok_and(|value| set.contains(value))
    }

    pub(crate) fn set(&mut self, field: CalendarField, value: i64) {
        *self.field_mut(field) = value;
    }

    /// Shifts `field` by `delta`.
    ///
    /// Weekday has no calendar meaning on its own, so shifting it moves the day of month.
    pub(crate) fn add(&mut self, field: CalendarField, delta: i64) {
        let field = if field == CalendarField::DayOfWeek {
            CalendarField::DayOfMonth
        } else {
            field
        };
        *self.field_mut(field) += delta;
    }

    /// Snaps `field` to the lowest or the highest value.
    ///
    /// The last day of month is taken from the staged year and month,
    /// so set them before resetting the day.
    pub(crate) fn reset(&mut self, field: CalendarField, bound: Bound) {
        match field {
            CalendarField::Second => self.second = bound.pick(0, 59),
            CalendarField::Minute => self.minute = bound.pick(0, 59),
            CalendarField::Hour => self.hour = bound.pick(0, 23),
            CalendarField::DayOfWeek => self.weekday = bound.pick(0, 6),
            CalendarField::DayOfMonth => self.day = bound.pick(1, self.days_in_staged_month()),
            CalendarField::Month => self.month = bound.pick(0, 11),
            // years are unbounded
            CalendarField::Year => {}
        }
    }

    fn field_mut(&mut self, field: CalendarField) -> &mut i64 {
        match field {
            CalendarField::Second => &mut self.second,
            CalendarField::Minute => &mut self.minute,
            CalendarField::Hour => &mut self.hour,
            CalendarField::DayOfWeek => &mut self.weekday,
            CalendarField::DayOfMonth => &mut self.day,
            CalendarField::Month => &mut self.month,
            CalendarField::Year => &mut self.year,
        }
    }

    fn days_in_staged_month(&self) -> i64 {
        let months = self.year * 12 + self.month;
        // rem_euclid(12) is always in 0..12
        let month = months.rem_euclid(12) as u32 + 1;
        utils::days_in_month(months.div_euclid(12), month).map_or(31, i64::from)
    }

    fn pick_instant(&self, local: LocalResult<DateTime<Tz>>) -> Option<DateTime<Tz>> {
        match local {
            LocalResult::Single(datetime) => Some(datetime),
            LocalResult::Ambiguous(earliest, latest) => {
                let (first, second) = if self.step < 0 {
                    (latest, earliest)
                } else {
                    (earliest, latest)
                };
                match &self.anchor {
                    Some(anchor) if (first < *anchor && self.step > 0) || (first > *anchor && self.step < 0) => {
                        Some(second)
                    }
                    _ => Some(first),
                }
            }
            LocalResult::None => None,
        }
    }

    fn to_naive(&self) -> Option<NaiveDateTime> {
        let months = self.year.checked_mul(12)?.checked_add(self.month)?;
        let year = i32::try_from(months.div_euclid(12)).ok()?;
        let month = u32::try_from(months.rem_euclid(12) + 1).ok()?;
        let days = TimeDelta::try_days(self.day.checked_sub(1)?)?;
        let seconds = TimeDelta::try_seconds(self.hour * 3600 + self.minute * 60 + self.second)?;

        NaiveDate::from_ymd_opt(year, month, 1)?
            .checked_add_signed(days)?
            .and_hms_opt(0, 0, 0)?
            .checked_add_signed(seconds)
    }
}
