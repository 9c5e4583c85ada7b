//! Session date normalization.
//!
//! Input formats are tried in a fixed order and the first one that yields a
//! real calendar date wins. Month-first formats come before day-first ones,
//! so `03/04/2025` is always March 4th.

use chrono::NaiveDate;

/// Output format of every normalized date.
pub const CANONICAL_FORMAT: &str = "%m/%d/%Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Order {
    MonthFirst,
    DayFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum YearDigits {
    Four,
    Two,
}

#[derive(Debug, Clone, Copy)]
struct InputFormat {
    separator: char,
    order: Order,
    year: YearDigits,
}

const INPUT_FORMATS: [InputFormat; 6] = [
    InputFormat { separator: '/', order: Order::MonthFirst, year: YearDigits::Four },
    InputFormat { separator: '/', order: Order::MonthFirst, year: YearDigits::Two },
    InputFormat { separator: '-', order: Order::MonthFirst, year: YearDigits::Four },
    InputFormat { separator: '-', order: Order::MonthFirst, year: YearDigits::Two },
    InputFormat { separator: '/', order: Order::DayFirst, year: YearDigits::Four },
    InputFormat { separator: '/', order: Order::DayFirst, year: YearDigits::Two },
];

impl InputFormat {
    fn parse(&self, input: &str) -> Option<NaiveDate> {
        let parts: Vec<&str> = input.split(self.separator).collect();
        let [first, second, year] = parts.as_slice() else {
            return None;
        };

        let first = day_or_month(first)?;
        let second = day_or_month(second)?;
        let year = self.year(year)?;

        let (month, day) = match self.order {
            Order::MonthFirst => (first, second),
            Order::DayFirst => (second, first),
        };

        NaiveDate::from_ymd_opt(year, month, day)
    }

    fn year(&self, s: &str) -> Option<i32> {
        let width = match self.year {
            YearDigits::Four => 4,
            YearDigits::Two => 2,
        };
        if s.len() != width || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let value: i32 = s.parse().ok()?;
        Some(match self.year {
            YearDigits::Four => value,
            // Two-digit years pivot at 69: 00-68 -> 2000s, 69-99 -> 1900s.
            YearDigits::Two if value < 69 => 2000 + value,
            YearDigits::Two => 1900 + value,
        })
    }
}

fn day_or_month(s: &str) -> Option<u32> {
    if s.is_empty() || s.len() > 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Parse a date in any supported input format.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    INPUT_FORMATS.iter().find_map(|format| format.parse(input))
}

/// Reformat a date into `MM/DD/YYYY`.
///
/// Input that no format accepts is returned trimmed but otherwise
/// unchanged; validation decides whether it is usable.
pub fn normalize_date(input: &str) -> String {
    match parse_date(input) {
        Some(date) => date.format(CANONICAL_FORMAT).to_string(),
        None => input.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_first() {
        assert_eq!(normalize_date("07/08/2025"), "07/08/2025");
        assert_eq!(normalize_date("7/8/2025"), "07/08/2025");
        assert_eq!(normalize_date("7-8-2025"), "07/08/2025");
    }

    #[test]
    fn test_two_digit_year() {
        assert_eq!(normalize_date("07/08/25"), "07/08/2025");
        assert_eq!(normalize_date("12-31-99"), "12/31/1999");
        assert_eq!(normalize_date("01/02/68"), "01/02/2068");
        assert_eq!(normalize_date("01/02/69"), "01/02/1969");
    }

    #[test]
    fn test_ambiguous_date_is_month_first() {
        let date = parse_date("03/04/2025").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 3, 4).unwrap());
    }

    #[test]
    fn test_day_first_fallback() {
        assert_eq!(normalize_date("13/04/2025"), "04/13/2025");
        assert_eq!(normalize_date("31/12/24"), "12/31/2024");
    }

    #[test]
    fn test_unparseable_passes_through_trimmed() {
        assert_eq!(normalize_date("  July 8th  "), "July 8th");
        assert_eq!(normalize_date("13/13/2025"), "13/13/2025");
        assert_eq!(normalize_date("07/08/2025 am"), "07/08/2025 am");
        assert_eq!(normalize_date("O7/O8/2O25"), "O7/O8/2O25");
        assert_eq!(normalize_date(""), "");
    }

    #[test]
    fn test_year_width_is_exact() {
        // A three-digit year fits neither the four- nor the two-digit format.
        assert_eq!(parse_date("07/08/202"), None);
        // A dash-separated day-first date is not a supported format.
        assert_eq!(parse_date("13-04-2025"), None);
    }

    #[test]
    fn test_canonical_form_is_fixed_point() {
        for input in ["01/01/2000", "02/29/2024", "12/31/1999", "10/05/2031"] {
            let once = normalize_date(input);
            assert_eq!(once, input);
            assert_eq!(normalize_date(&once), once);
        }
    }
}
