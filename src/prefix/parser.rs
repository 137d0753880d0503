//! Date prefix parser
//!
//! Turns the date part of a request URL into a [`DatePrefix`]:
//!
//! ```text
//! 2015                   year
//! 2015-08                month
//! 2015-08-03             day
//! 2015-08-03 00          hour
//! 2015-08-03 00:05       minute
//! 2015-08-03 00:05:07    second
//! ```
//!
//! The layout is picked from the separators present. Every component must then
//! have its full width (four-digit year, two digits for the rest), the missing
//! components are filled with their lowest value and chrono checks that the
//! result is a real date, so "2015-8", "2015-02-30" or "2015-13" are rejected here
//! and never reach the tree.

use chrono::NaiveDateTime;
use std::fmt;
use std::str::FromStr;

use crate::prefix::error::{PrefixError, PrefixResult};
use crate::tree::{Granularity, Search};

/// Layout of a complete log timestamp
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Shape of a complete prefix; each granularity accepts a leading part of it
const LAYOUT: &str = "YYYY-MM-DD hh:mm:ss";

/// A date truncated to some granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatePrefix {
    granularity: Granularity,
    timestamp: NaiveDateTime,
}

impl DatePrefix {
    /// Parse a prefix such as `2015-08` or `2015-08-03 00:05`
    pub fn parse(input: &str) -> PrefixResult<Self> {
        if input.is_empty() {
            return Err(PrefixError::Empty);
        }

        let granularity = detect_granularity(input)?;

        let layout = layout(granularity);
        if !matches_layout(input, layout) {
            return Err(PrefixError::Layout {
                input: input.to_string(),
                layout,
            });
        }
        let completed = format!("{}{}", input, completion(granularity));

        let timestamp = NaiveDateTime::parse_from_str(&completed, TIMESTAMP_FORMAT).map_err(
            |source| PrefixError::Parse {
                input: input.to_string(),
                source,
            },
        )?;

        Ok(Self {
            granularity,
            timestamp,
        })
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Start of the period covered by the prefix
    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// Tree search for this prefix returning at most `popularity` entries
    pub fn to_search(&self, popularity: usize) -> Search {
        Search::at(&self.timestamp, self.granularity).with_popularity(popularity)
    }
}

impl FromStr for DatePrefix {
    type Err = PrefixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DatePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_search(0))
    }
}

/// Pick the granularity of a prefix from its separators
pub fn detect_granularity(input: &str) -> PrefixResult<Granularity> {
    let (mut dashes, mut spaces, mut colons) = (0, 0, 0);
    for c in input.chars() {
        match c {
            '-' => dashes += 1,
            ' ' => spaces += 1,
            ':' => colons += 1,
            _ => {}
        }
    }

    match (dashes, spaces, colons) {
        (0, 0, 0) => Ok(Granularity::Year),
        (1, 0, 0) => Ok(Granularity::Month),
        (2, 0, 0) => Ok(Granularity::Day),
        (2, 1, 0) => Ok(Granularity::Hour),
        (2, 1, 1) => Ok(Granularity::Minute),
        (2, 1, 2) => Ok(Granularity::Second),
        _ => Err(PrefixError::UnknownFormat(input.to_string())),
    }
}

/// Leading part of [`LAYOUT`] for `granularity`
fn layout(granularity: Granularity) -> &'static str {
    let len = match granularity {
        Granularity::Year => 4,
        Granularity::Month => 7,
        Granularity::Day => 10,
        Granularity::Hour => 13,
        Granularity::Minute => 16,
        Granularity::Second => 19,
    };
    &LAYOUT[..len]
}

// Letters in the layout stand for one ASCII digit, anything else for itself.
fn matches_layout(input: &str, layout: &str) -> bool {
    input.len() == layout.len()
        && input.bytes().zip(layout.bytes()).all(|(c, l)| {
            if l.is_ascii_alphabetic() {
                c.is_ascii_digit()
            } else {
                c == l
            }
        })
}

/// Suffix turning a prefix of `granularity` into a full timestamp
fn completion(granularity: Granularity) -> &'static str {
    match granularity {
        Granularity::Year => "-01-01 00:00:00",
        Granularity::Month => "-01 00:00:00",
        Granularity::Day => " 00:00:00",
        Granularity::Hour => ":00:00",
        Granularity::Minute => ":00",
        Granularity::Second => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_granularity() {
        assert_eq!(detect_granularity("2015").unwrap(), Granularity::Year);
        assert_eq!(detect_granularity("2015-08").unwrap(), Granularity::Month);
        assert_eq!(detect_granularity("2015-08-03").unwrap(), Granularity::Day);
        assert_eq!(detect_granularity("2015-08-03 00").unwrap(), Granularity::Hour);
        assert_eq!(detect_granularity("2015-08-03 00:05").unwrap(), Granularity::Minute);
        assert_eq!(
            detect_granularity("2015-08-03 00:05:07").unwrap(),
            Granularity::Second
        );
    }

    #[test]
    fn test_parse_each_granularity() {
        let prefix = DatePrefix::parse("2015").unwrap();
        assert_eq!(prefix.granularity(), Granularity::Year);
        assert_eq!(prefix.to_search(3).year(), 2015);
        assert_eq!(prefix.to_search(3).month(), None);
        assert_eq!(prefix.to_search(3).popularity(), 3);

        let prefix: DatePrefix = "2015-09-03 00".parse().unwrap();
        let search = prefix.to_search(0);
        assert_eq!(search.granularity(), Granularity::Hour);
        assert_eq!(search.day(), Some(3));
        assert_eq!(search.hour(), Some(0));
        assert_eq!(search.minute(), None);

        let prefix = DatePrefix::parse("2015-08-03 00:00:07").unwrap();
        let search = prefix.to_search(10);
        assert_eq!(search.minute(), Some(0));
        assert_eq!(search.second(), Some(7));
    }

    #[test]
    fn test_parse_displays() {
        let prefix = DatePrefix::parse("2015-08-03 00:05").unwrap();
        assert_eq!(prefix.granularity(), Granularity::Minute);
        assert_eq!(prefix.to_string(), "2015-08-03 00:05");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(DatePrefix::parse("").unwrap_err(), PrefixError::Empty);
    }

    #[test]
    fn test_parse_surrounding_whitespace() {
        for input in ["2015 ", " 2015-08", "   "] {
            let err = DatePrefix::parse(input).unwrap_err();
            assert!(matches!(err, PrefixError::UnknownFormat(_)), "{:?}", input);
        }
    }

    #[test]
    fn test_parse_requires_full_width_components() {
        for input in ["2015-8", "2015-8-3 0", "2015-08-3", "2015-08-03 0:05", "15", "20150", "2015-08-03 00:05:7"] {
            let err = DatePrefix::parse(input).unwrap_err();
            assert!(matches!(err, PrefixError::Layout { .. }), "{:?}", input);
            assert!(err.to_string().starts_with("Failed to parse date"), "{:?}", input);
        }

        let err = DatePrefix::parse("2015-8").unwrap_err();
        assert_eq!(
            err,
            PrefixError::Layout {
                input: "2015-8".to_string(),
                layout: "YYYY-MM",
            }
        );
    }

    #[test]
    fn test_parse_unknown_layout() {
        let err = DatePrefix::parse("2015-08-02 15:04:05-999999999").unwrap_err();
        assert!(matches!(err, PrefixError::UnknownFormat(_)));
        assert!(err.to_string().contains("unknown date format"));

        assert!(matches!(
            DatePrefix::parse("2015:08").unwrap_err(),
            PrefixError::UnknownFormat(_)
        ));
    }

    #[test]
    fn test_parse_invalid_dates() {
        let err = DatePrefix::parse("zorglub").unwrap_err();
        assert!(matches!(err, PrefixError::Layout { .. }));

        for input in ["2015-13", "2015-02-30", "2015-08-03 24", "2015-08-03 10:61"] {
            let err = DatePrefix::parse(input).unwrap_err();
            assert!(matches!(err, PrefixError::Parse { .. }), "{}", input);
            assert!(err.to_string().starts_with("Failed to parse date"), "{}", input);
        }
    }
}
