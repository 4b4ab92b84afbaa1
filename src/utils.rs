/// Common utility functions.
use crate::field::FieldValue;

/// Converts string into unsigned number with bounds validation (both inclusive).
pub(crate) fn parse_digital_value(input: &str, min: FieldValue, max: FieldValue) -> Option<FieldValue> {
    let value = input.parse::<u32>().ok()?;
    if value < u32::from(min) || value > u32::from(max) {
        None
    } else {
        FieldValue::try_from(value).ok()
    }
}

/// Converts string with mnemonic value representation into its index in `values`.
pub(crate) fn parse_string_value(input: &str, values: &[&str]) -> Option<FieldValue> {
    if input.is_empty() {
        None
    } else {
        values
            .iter()
            .position(|&x| x.eq_ignore_ascii_case(input))
            .and_then(|i| FieldValue::try_from(i).ok())
    }
}

/// Returns `true` if provided year is leap.
#[inline]
pub(crate) fn is_leap_year(year: i64) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Returns number of days in specified month (1-based), or `None` if there is no such month.
pub(crate) fn days_in_month(year: i64, month: u32) -> Option<u32> {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => Some(31),
        4 | 6 | 9 | 11 => Some(30),
        2 if is_leap_year(year) => Some(29),
        2 => Some(28),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn parse_digital_value_valid_value_within_range() {
        assert_eq!(parse_digital_value("5", 0, 10), Some(5));
        assert_eq!(parse_digital_value("0", 0, 10), Some(0));
        assert_eq!(parse_digital_value("10", 0, 10), Some(10));
        assert_eq!(parse_digital_value("007", 0, 10), Some(7));
    }

    #[test]
    fn parse_digital_value_out_of_range() {
        assert_eq!(parse_digital_value("5", 10, 20), None);
        assert_eq!(parse_digital_value("25", 0, 20), None);
        assert_eq!(parse_digital_value("256", 0, 255), None);
    }

    #[test]
    fn parse_digital_value_invalid_input() {
        assert_eq!(parse_digital_value("abc", 0, 10), None);
        assert_eq!(parse_digital_value("", 0, 10), None);
        assert_eq!(parse_digital_value("-1", 0, 10), None);
        assert_eq!(parse_digital_value("1.5", 0, 10), None);
        assert_eq!(parse_digital_value("99999999999999999999", 0, 10), None);
    }

    #[test]
    fn parse_string_value_regular() {
        let days = &["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

        assert_eq!(parse_string_value("mon", days), Some(1));
        assert_eq!(parse_string_value("FRI", days), Some(5));
        assert_eq!(parse_string_value("sUn", days), Some(0));
        assert_eq!(parse_string_value("sat", days), Some(6));

        assert_eq!(parse_string_value("", days), None);
        assert_eq!(parse_string_value("monday", days), None);
        assert_eq!(parse_string_value(" mon", days), None);
        assert_eq!(parse_string_value("test", &[]), None);
    }

    #[rstest]
    #[case(2024, true)]
    #[case(1996, true)]
    #[case(2000, true)]
    #[case(1600, true)]
    #[case(2023, false)]
    #[case(1900, false)]
    #[case(2100, false)]
    fn test_is_leap_year(#[case] year: i64, #[case] expected: bool) {
        assert_eq!(is_leap_year(year), expected, "{year}");
    }

    #[rstest]
    #[case(2023, 1, 31)]
    #[case(2023, 4, 30)]
    #[case(2023, 2, 28)]
    #[case(2024, 2, 29)]
    #[case(2000, 2, 29)]
    #[case(2100, 2, 28)]
    #[case(2023, 12, 31)]
    fn test_days_in_month(#[case] y: i64, #[case] m: u32, #[case] expected: u32) {
        assert_eq!(days_in_month(y, m), Some(expected), "{y:04}-{m:02} has {expected} days");
    }

    #[rstest]
    #[case(2023, 0)]
    #[case(2023, 13)]
    fn test_days_in_month_invalid(#[case] y: i64, #[case] m: u32) {
        assert_eq!(days_in_month(y, m), None);
    }
}
