//! Date prefix error types

use thiserror::Error;

/// Errors that can occur while reading a date prefix
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrefixError {
    /// Nothing but whitespace was given
    #[error("no date specified")]
    Empty,

    /// The separators match none of the supported layouts
    #[error("unknown date format {0}")]
    UnknownFormat(String),

    /// A component is missing digits or holds something other than digits
    #[error("Failed to parse date {input}: expected layout {layout}")]
    Layout { input: String, layout: &'static str },

    /// The layout was recognized but the date itself is invalid
    #[error("Failed to parse date {input}: {source}")]
    Parse {
        input: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Result type for date prefix operations
pub type PrefixResult<T> = Result<T, PrefixError>;
