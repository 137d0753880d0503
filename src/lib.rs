//! # Hitlog
//!
//! Query-log analytics over date prefixes. Hitlog loads a tab-separated log of
//! timestamped search queries into a tree keyed by year, month, day, hour, minute
//! and second, then answers two questions for any prefix of a date:
//!
//! - how many distinct queries were made, and
//! - which queries were made most often.
//!
//! ## Modules
//!
//! - [`tree`]: Date tree, search descriptors and the parallel rank index
//! - [`prefix`]: Parsing of partial dates such as `2015-08` or `2015-08-03 00:04`
//! - [`ingest`]: TSV log ingestion
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust
//! use hitlog::ingest::TsvIngester;
//! use hitlog::prefix::DatePrefix;
//! use hitlog::tree::DateTree;
//!
//! let log = "2015-08-03 00:00:07\tElixir\n2015-08-03 00:00:07\tPlop\n2015-08-05 23:00:12\tElixir\n";
//!
//! let mut tree = DateTree::new();
//! TsvIngester::new().ingest_str(log, &mut tree).unwrap();
//! let tree = tree.build_index();
//!
//! let search = DatePrefix::parse("2015-08").unwrap().to_search(1);
//! assert_eq!(tree.count(&search), 2);
//! assert_eq!(tree.popular(&search)[0].query.as_ref(), "Elixir");
//! ```

pub mod api;
pub mod config;
pub mod ingest;
pub mod prefix;
pub mod tree;

// Re-export top-level types for convenience
pub use tree::{DateTree, Granularity, IndexedTree, Popularity, Search, SearchError, TreeStats};

pub use prefix::{DatePrefix, PrefixError};

pub use ingest::{IngestError, IngestReport, TsvIngester};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{ApiConfig, Config, ConfigError, IngestConfig, LoggingConfig};
