//! Search descriptors
//!
//! A [`Search`] is a partially specified date: a year plus, optionally, month, day,
//! hour, minute and second, each finer component only present if the coarser ones
//! are. The tree descends until the first unset component and answers from the
//! node it stopped at.
//!
//! Components use calendar numbering (month 1-12, day 1-31, hour 0-23,
//! minute/second 0-59). Every `Search` has been range-checked when it was built, so
//! the tree can index its fixed-size child arrays without further checks.

use chrono::{Datelike, NaiveDateTime, Timelike};
use std::fmt;
use thiserror::Error;

/// How deep a search descends into the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Granularity {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

impl Granularity {
    pub fn all() -> &'static [Granularity] {
        &[
            Granularity::Year,
            Granularity::Month,
            Granularity::Day,
            Granularity::Hour,
            Granularity::Minute,
            Granularity::Second,
        ]
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Year => write!(f, "year"),
            Granularity::Month => write!(f, "month"),
            Granularity::Day => write!(f, "day"),
            Granularity::Hour => write!(f, "hour"),
            Granularity::Minute => write!(f, "minute"),
            Granularity::Second => write!(f, "second"),
        }
    }
}

/// Errors raised while building a [`Search`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// A component is outside the calendar range of its unit
    #[error("{unit} {value} is out of range ({min}-{max})")]
    OutOfRange {
        unit: Granularity,
        value: u32,
        min: u32,
        max: u32,
    },

    /// A finer component was given while a coarser one was left unset
    #[error("{unit} is set but {missing} is not")]
    Gap {
        unit: Granularity,
        missing: Granularity,
    },
}

/// A validated, partially specified date plus the requested ranking size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Search {
    year: i32,
    month: Option<u32>,
    day: Option<u32>,
    hour: Option<u32>,
    minute: Option<u32>,
    second: Option<u32>,
    popularity: usize,
}

impl Search {
    /// Start building a search for `year`
    pub fn builder(year: i32) -> SearchBuilder {
        SearchBuilder {
            search: Search {
                year,
                month: None,
                day: None,
                hour: None,
                minute: None,
                second: None,
                popularity: 0,
            },
        }
    }

    /// Search covering `timestamp` down to `granularity`
    ///
    /// Infallible: every component comes from a real date.
    pub fn at(timestamp: &NaiveDateTime, granularity: Granularity) -> Self {
        let keep = |g: Granularity, value: u32| (granularity >= g).then_some(value);

        Search {
            year: timestamp.year(),
            month: keep(Granularity::Month, timestamp.month()),
            day: keep(Granularity::Day, timestamp.day()),
            hour: keep(Granularity::Hour, timestamp.hour()),
            minute: keep(Granularity::Minute, timestamp.minute()),
            second: keep(Granularity::Second, timestamp.second()),
            popularity: 0,
        }
    }

    /// Builder method: set the requested ranking size
    pub fn with_popularity(mut self, popularity: usize) -> Self {
        self.popularity = popularity;
        self
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> Option<u32> {
        self.month
    }

    pub fn day(&self) -> Option<u32> {
        self.day
    }

    pub fn hour(&self) -> Option<u32> {
        self.hour
    }

    pub fn minute(&self) -> Option<u32> {
        self.minute
    }

    pub fn second(&self) -> Option<u32> {
        self.second
    }

    /// Maximum number of entries a popularity query returns
    pub fn popularity(&self) -> usize {
        self.popularity
    }

    /// Finest component that is set
    pub fn granularity(&self) -> Granularity {
        if self.second.is_some() {
            Granularity::Second
        } else if self.minute.is_some() {
            Granularity::Minute
        } else if self.hour.is_some() {
            Granularity::Hour
        } else if self.day.is_some() {
            Granularity::Day
        } else if self.month.is_some() {
            Granularity::Month
        } else {
            Granularity::Year
        }
    }
}

impl fmt::Display for Search {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.year)?;
        if let Some(month) = self.month {
            write!(f, "-{:02}", month)?;
        }
        if let Some(day) = self.day {
            write!(f, "-{:02}", day)?;
        }
        if let Some(hour) = self.hour {
            write!(f, " {:02}", hour)?;
        }
        if let Some(minute) = self.minute {
            write!(f, ":{:02}", minute)?;
        }
        if let Some(second) = self.second {
            write!(f, ":{:02}", second)?;
        }
        Ok(())
    }
}

/// Builder for [`Search`], validating components on [`SearchBuilder::build`]
#[derive(Debug, Clone)]
pub struct SearchBuilder {
    search: Search,
}

impl SearchBuilder {
    /// Month, 1-12
    pub fn month(mut self, month: u32) -> Self {
        self.search.month = Some(month);
        self
    }

    /// Day of month, 1-31
    pub fn day(mut self, day: u32) -> Self {
        self.search.day = Some(day);
        self
    }

    /// Hour, 0-23
    pub fn hour(mut self, hour: u32) -> Self {
        self.search.hour = Some(hour);
        self
    }

    /// Minute, 0-59
    pub fn minute(mut self, minute: u32) -> Self {
        self.search.minute = Some(minute);
        self
    }

    /// Second, 0-59
    pub fn second(mut self, second: u32) -> Self {
        self.search.second = Some(second);
        self
    }

    pub fn popularity(mut self, popularity: usize) -> Self {
        self.search.popularity = popularity;
        self
    }

    pub fn build(self) -> Result<Search, SearchError> {
        let s = self.search;
        let components = [
            (Granularity::Month, s.month, 1, 12),
            (Granularity::Day, s.day, 1, 31),
            (Granularity::Hour, s.hour, 0, 23),
            (Granularity::Minute, s.minute, 0, 59),
            (Granularity::Second, s.second, 0, 59),
        ];

        let mut unset: Option<Granularity> = None;
        for (unit, value, min, max) in components {
            match (value, unset) {
                (Some(_), Some(missing)) => return Err(SearchError::Gap { unit, missing }),
                (Some(value), None) if value < min || value > max => {
                    return Err(SearchError::OutOfRange {
                        unit,
                        value,
                        min,
                        max,
                    })
                }
                (Some(_), None) => {}
                (None, _) => unset = unset.or(Some(unit)),
            }
        }

        Ok(s)
    }
}
