//! Calendar months and month iteration.

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::MonthParseError;

/// A calendar month (`YYYY-MM`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Creates a month, returning `None` if `month` is not in `1..=12`.
    #[must_use]
    pub const fn new(year: i32, month: u32) -> Option<Self> {
        if month >= 1 && month <= 12 {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// Returns the current UTC calendar month.
    #[must_use]
    pub fn current() -> Self {
        Self::of(Utc::now().date_naive())
    }

    /// Returns the month containing `date`.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Returns the year.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Returns the month number (1 = January).
    #[must_use]
    pub const fn month(&self) -> u32 {
        self.month
    }

    /// Returns the last digit of the year, as used in contract codes.
    #[must_use]
    pub const fn year_digit(&self) -> u32 {
        self.year.rem_euclid(10) as u32
    }

    /// Returns the following month.
    #[must_use]
    pub const fn succ(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Returns the first day of the month.
    #[must_use]
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = MonthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || MonthParseError(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(err)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(err());
        }
        let year: i32 = year.parse().map_err(|_| err())?;
        let month: u32 = month.parse().map_err(|_| err())?;
        Self::new(year, month).ok_or_else(err)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = MonthParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

/// An inclusive range of calendar months.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    /// First month (inclusive).
    pub start: YearMonth,
    /// Last month (inclusive).
    pub end: YearMonth,
}

impl MonthRange {
    /// Creates a month range. A start after the end yields an empty range.
    #[must_use]
    pub const fn new(start: YearMonth, end: YearMonth) -> Self {
        Self { start, end }
    }

    /// Creates a range from `start` through the current month.
    #[must_use]
    pub fn through_current(start: YearMonth) -> Self {
        Self::new(start, YearMonth::current())
    }

    /// Returns an iterator over all months in the range.
    #[must_use]
    pub const fn months(&self) -> MonthIterator {
        MonthIterator {
            current: self.start,
            end: self.end,
        }
    }

    /// Returns the number of months in the range.
    #[must_use]
    pub fn len(&self) -> usize {
        let span = (self.end.year - self.start.year) * 12 + self.end.month as i32
            - self.start.month as i32
            + 1;
        span.max(0) as usize
    }

    /// Returns true if the range holds no months.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Display for MonthRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Iterator over the months of a [`MonthRange`].
#[derive(Debug, Clone)]
pub struct MonthIterator {
    current: YearMonth,
    end: YearMonth,
}

impl Iterator for MonthIterator {
    type Item = YearMonth;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current > self.end {
            return None;
        }
        let result = self.current;
        self.current = self.current.succ();
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = MonthRange::new(self.current, self.end).len();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for MonthIterator {}
