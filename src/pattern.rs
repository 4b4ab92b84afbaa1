use crate::{
    field::{FieldSet, FieldValue},
    utils, CronError, Result,
};
use std::ops::RangeInclusive;

/// Kind of the cron expression field, in the order fields are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum PatternType {
    Seconds = 0,
    Minutes = 1,
    Hours = 2,
    Doms = 3,
    Months = 4,
    Dows = 5,
}

impl PatternType {
    pub(crate) const ALL: [PatternType; 6] = [
        Self::Seconds,
        Self::Minutes,
        Self::Hours,
        Self::Doms,
        Self::Months,
        Self::Dows,
    ];

    const DAYS_OF_WEEK: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];
    const MONTHS: [&str; 12] = [
        "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
    ];

    /// Values accepted in the expression text, `[min, max)`.
    ///
    /// Months are written 1-12, and Sunday may be written as 7.
    fn bounds(&self) -> (FieldValue, FieldValue) {
        match self {
            Self::Seconds => (0, 60),
            Self::Minutes => (0, 60),
            Self::Hours => (0, 24),
            Self::Doms => (1, 32),
            Self::Months => (1, 13),
            Self::Dows => (0, 8),
        }
    }

    /// Values which may be stored in the parsed set.
    pub(crate) fn stored_range(&self) -> RangeInclusive<FieldValue> {
        match self {
            Self::Seconds => 0..=59,
            Self::Minutes => 0..=59,
            Self::Hours => 0..=23,
            Self::Doms => 1..=31,
            Self::Months => 0..=11,
            Self::Dows => 0..=6,
        }
    }

    fn invalid_value(&self, input: &str) -> CronError {
        let input = input.to_owned();
        match self {
            Self::Seconds => CronError::InvalidSecondValue(input),
            Self::Minutes => CronError::InvalidMinuteValue(input),
            Self::Hours => CronError::InvalidHourValue(input),
            Self::Doms => CronError::InvalidDayOfMonthValue(input),
            Self::Months => CronError::InvalidMonthValue(input),
            Self::Dows => CronError::InvalidDayOfWeekValue(input),
        }
    }

    /// Parses a whole field of the expression into the set of allowed values.
    pub(crate) fn parse(&self, input: &str) -> Result<FieldSet> {
        let input = if input == "?" && matches!(self, Self::Doms | Self::Dows) {
            "*"
        } else {
            input
        };

        if input.is_empty() {
            return Err(CronError::InvalidCronPattern(input.to_owned()));
        }

        let (_min, max) = self.bounds();
        let mut hits = FieldSet::new(max);

        for item in input.split(',') {
            if item.is_empty() {
                return Err(CronError::InvalidCronPattern(input.to_owned()));
            }

            if let Some((base, step)) = item.split_once('/') {
                if base.is_empty() || step.is_empty() || step.contains('/') {
                    return Err(CronError::InvalidRepeatingPattern(item.to_owned()));
                }

                let (start, end) = self.parse_range(base)?;
                // `a/n` runs up to the end of the field
                let end = if base.contains('-') { end } else { max - 1 };

                let step = match step.parse::<usize>() {
                    Ok(0) | Err(_) => return Err(CronError::InvalidRepeatingPattern(item.to_owned())),
                    Ok(step) => step,
                };

                (start..=end).step_by(step).for_each(|value| hits.set(value));
            } else {
                let (start, end) = self.parse_range(item)?;
                (start..=end).for_each(|value| hits.set(value));
            }
        }

        Ok(self.rotate(hits))
    }

    /// Parses `*`, a single value or `start-end` into inclusive bounds.
    fn parse_range(&self, input: &str) -> Result<(FieldValue, FieldValue)> {
        let (min, max) = self.bounds();

        if input == "*" {
            return Ok((min, max - 1));
        }

        match input.split_once('-') {
            None => {
                let value = self.parse_value(input)?;
                Ok((value, value))
            }
            Some((start, end)) => {
                if start.is_empty() || end.is_empty() || end.contains('-') {
                    return Err(CronError::InvalidRangeValue(input.to_owned()));
                }

                let start = self.parse_value(start)?;
                let end = self.parse_value(end)?;
                if start > end {
                    return Err(CronError::InvalidRangeValue(input.to_owned()));
                }

                Ok((start, end))
            }
        }
    }

    /// Parses a single numeric or mnemonic value.
    fn parse_value(&self, input: &str) -> Result<FieldValue> {
        let (min, max) = self.bounds();

        if let Some(value) = utils::parse_digital_value(input, min, max - 1) {
            return Ok(value);
        }

        let mnemonic = match self {
            Self::Months => utils::parse_string_value(input, &Self::MONTHS).map(|month| month + 1),
            Self::Dows => utils::parse_string_value(input, &Self::DAYS_OF_WEEK),
            _ => None,
        };

        mnemonic.ok_or_else(|| self.invalid_value(input))
    }

    /// Moves parsed values into the stored representation.
    ///
    /// Always builds a fresh set, so no bit may be shifted twice.
    fn rotate(&self, parsed: FieldSet) -> FieldSet {
        match self {
            Self::Months => {
                let mut rotated = FieldSet::new(12);
                parsed.iter().for_each(|month| rotated.set(month - 1));
                rotated
            }
            Self::Dows => {
                let mut folded = FieldSet::new(7);
                parsed.iter().for_each(|dow| folded.set(dow % 7));
                folded
            }
            _ => parsed,
        }
    }

    /// Renders the set back into its canonical textual form.
    pub(crate) fn format(&self, set: &FieldSet) -> String {
        if self.stored_range().all(|value| set.contains(value)) {
            return "*".to_owned();
        }

        let shift = if *self == Self::Months { 1 } else { 0 };
        let values: Vec<FieldValue> = set.iter().map(|value| value + shift).collect();

        let mut items = Vec::new();
        let mut index = 0;
        while index < values.len() {
            let start = values[index];
            let mut end_index = index;
            while end_index + 1 < values.len() && values[end_index + 1] == values[end_index] + 1 {
                end_index += 1;
            }

            if end_index - index >= 2 {
                items.push(format!("{}-{}", start, values[end_index]));
                index = end_index + 1;
            } else {
                items.push(start.to_string());
                index += 1;
            }
        }

        items.join(",")
    }
}
