//! Calendar month names and the (year, month) periods used by the car loan ledger.
//!
//! Car loan statements are stored with a month name and a year rather than a
//! date. All chronological comparisons go through [month_ordinal] so that the
//! name-to-number mapping lives in exactly one place.

use std::fmt::Display;

use time::OffsetDateTime;

use crate::Error;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Get the position of the month `name` in the calendar year, starting at 1.
///
/// Only the full English month names are recognised and the match is
/// case-sensitive.
///
/// # Errors
/// Returns [Error::UnknownMonth] if `name` is not one of the twelve month names.
pub fn month_ordinal(name: &str) -> Result<u8, Error> {
    MONTH_NAMES
        .iter()
        .position(|&month| month == name)
        .map(|index| index as u8 + 1)
        .ok_or_else(|| Error::UnknownMonth(name.to_owned()))
}

/// Get the name of the month at position `ordinal` (1 to 12) in the calendar year.
pub fn month_name(ordinal: u8) -> Option<&'static str> {
    match ordinal {
        1..=12 => Some(MONTH_NAMES[ordinal as usize - 1]),
        _ => None,
    }
}

/// A calendar month in a specific year, e.g. June 2023.
///
/// Periods order chronologically: first by year, then by month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoanPeriod {
    year: i32,
    month: u8,
}

impl LoanPeriod {
    /// Create a period from a year and a month name, e.g. `(2023, "June")`.
    ///
    /// # Errors
    /// Returns [Error::UnknownMonth] if `month` is not a month name.
    pub fn from_name(year: i32, month: &str) -> Result<Self, Error> {
        Ok(Self {
            year,
            month: month_ordinal(month)?,
        })
    }

    /// The calendar year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The month ordinal, 1 to 12.
    pub fn month(&self) -> u8 {
        self.month
    }

    /// The full English name of the month.
    pub fn month_name(&self) -> &'static str {
        // `month` is always produced by `month_ordinal` or `time::Month`.
        month_name(self.month).unwrap_or(MONTH_NAMES[0])
    }
}

impl From<OffsetDateTime> for LoanPeriod {
    /// Reduce a timestamp to its calendar month and year, dropping the day.
    fn from(date_time: OffsetDateTime) -> Self {
        Self {
            year: date_time.year(),
            month: u8::from(date_time.month()),
        }
    }
}

impl Display for LoanPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.month_name(), self.year)
    }
}

#[cfg(test)]
mod month_ordinal_tests {
    use crate::Error;

    use super::{MONTH_NAMES, month_name, month_ordinal};

    #[test]
    fn january_is_first() {
        assert_eq!(month_ordinal("January"), Ok(1));
    }

    #[test]
    fn december_is_last() {
        assert_eq!(month_ordinal("December"), Ok(12));
    }

    #[test]
    fn every_month_maps_back_to_its_name() {
        for name in MONTH_NAMES {
            let ordinal = month_ordinal(name).unwrap();

            assert_eq!(month_name(ordinal), Some(name));
        }
    }

    #[test]
    fn abbreviation_is_unknown() {
        assert_eq!(
            month_ordinal("Jan"),
            Err(Error::UnknownMonth("Jan".to_owned()))
        );
    }

    #[test]
    fn lowercase_is_unknown() {
        assert_eq!(
            month_ordinal("january"),
            Err(Error::UnknownMonth("january".to_owned()))
        );
    }

    #[test]
    fn surrounding_whitespace_is_unknown() {
        assert!(month_ordinal(" June").is_err());
        assert!(month_ordinal("June ").is_err());
        assert!(month_ordinal("").is_err());
    }

    #[test]
    fn out_of_range_ordinal_has_no_name() {
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
    }
}

#[cfg(test)]
mod loan_period_tests {
    use time::macros::datetime;

    use super::LoanPeriod;

    #[test]
    fn orders_by_year_before_month() {
        let december_2022 = LoanPeriod::from_name(2022, "December").unwrap();
        let january_2023 = LoanPeriod::from_name(2023, "January").unwrap();

        assert!(december_2022 < january_2023);
    }

    #[test]
    fn orders_by_calendar_month_not_alphabetically() {
        let april = LoanPeriod::from_name(2023, "April").unwrap();
        let march = LoanPeriod::from_name(2023, "March").unwrap();

        assert!(march < april);
    }

    #[test]
    fn from_timestamp_drops_the_day() {
        let period = LoanPeriod::from(datetime!(2023-06-30 23:59:59 UTC));

        assert_eq!(period, LoanPeriod::from_name(2023, "June").unwrap());
    }

    #[test]
    fn displays_month_name_and_year() {
        let period = LoanPeriod::from_name(2024, "February").unwrap();

        assert_eq!(period.to_string(), "February 2024");
    }
}
