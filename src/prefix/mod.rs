//! Date prefixes
//!
//! Requests select a period by a date prefix of any granularity, from a year
//! (`2015`) down to a second (`2015-08-03 00:00:07`). This module validates such a
//! prefix and turns it into a tree [`Search`](crate::tree::Search).
//!
//! ```rust
//! use hitlog::prefix::DatePrefix;
//! use hitlog::tree::Granularity;
//!
//! let prefix = DatePrefix::parse("2015-08-03 00").unwrap();
//! assert_eq!(prefix.granularity(), Granularity::Hour);
//!
//! let search = prefix.to_search(10);
//! assert_eq!(search.hour(), Some(0));
//! assert_eq!(search.popularity(), 10);
//! ```

mod error;
mod parser;

pub use error::{PrefixError, PrefixResult};
pub use parser::{detect_granularity, DatePrefix, TIMESTAMP_FORMAT};
