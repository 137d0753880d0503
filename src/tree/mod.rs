//! Date-indexed hit tree
//!
//! Aggregates query-log events by calendar component so that counts and
//! popularity rankings for any date prefix are a short descent away:
//!
//! ```text
//! DateTree ─ 2015 ─ Aug ─ 03 ─ 00h ─ 00m ─ 07s   {"Elixir": 1, "Plop": 1}
//!                    │     │                       ▲
//!                    │     └ 05 ─ 23h ─ 00m ─ 12s  │ every level keeps the
//!                    │                             │ hits of its whole subtree
//!                    └ {"Elixir": 2, "Plop": 1} ───┘
//! ```
//!
//! # Lifecycle
//!
//! A [`DateTree`] accepts insertions. [`DateTree::build_index`] consumes it, ranks
//! every node in parallel and returns an [`IndexedTree`], the read-only handle that
//! answers popularity queries. Rankings can therefore never be read before they
//! exist nor go stale after later insertions.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use hitlog::tree::{DateTree, Search};
//!
//! let mut tree = DateTree::new();
//! let at = NaiveDate::from_ymd_opt(2018, 10, 12).unwrap().and_hms_opt(21, 0, 0).unwrap();
//! tree.insert("https://www.algolia.com/", at);
//! tree.insert("https://www.algolia.com/", at);
//!
//! let tree = tree.build_index();
//! let search = Search::builder(2018).month(10).popularity(10).build().unwrap();
//!
//! assert_eq!(tree.total_count(), 2);
//! assert_eq!(tree.count(&search), 1);
//! assert_eq!(tree.popular(&search)[0].count, 2);
//! ```

mod hits;
mod node;
mod search;

pub use hits::{top, Hits, Popularity};
pub use node::{
    Aggregate, Branch, CalendarUnit, DateNode, DayNode, DaySlot, HourNode, HourSlot, Leaf,
    MinuteNode, MinuteSlot, MonthNode, MonthSlot, SecondNode, SecondSlot, YearNode,
};
pub use search::{Granularity, Search, SearchBuilder, SearchError};

use chrono::{Datelike, NaiveDateTime};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

/// Tree of hit aggregates accepting insertions
#[derive(Debug, Default)]
pub struct DateTree {
    years: BTreeMap<i32, YearNode>,
    total_count: u64,
}

impl DateTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one event of `query` at `timestamp`
    pub fn insert(&mut self, query: &str, timestamp: NaiveDateTime) {
        let query: Arc<str> = Arc::from(query);
        self.years
            .entry(timestamp.year())
            .or_default()
            .insert(&query, &timestamp);
        self.total_count += 1;
    }

    /// Distinct queries under the date selected by `search`
    pub fn count(&self, search: &Search) -> usize {
        self.years
            .get(&search.year())
            .map_or(0, |year| year.count(search))
    }

    /// Events under the date selected by `search`
    pub fn events(&self, search: &Search) -> u64 {
        self.years
            .get(&search.year())
            .map_or(0, |year| year.events(search))
    }

    /// Number of insertions so far
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }

    pub fn year(&self, year: i32) -> Option<&YearNode> {
        self.years.get(&year)
    }

    /// Rank every node and switch to the read-only phase
    ///
    /// Years are ranked in parallel, and inside each node every child subtree is
    /// ranked before the node itself.
    pub fn build_index(mut self) -> IndexedTree {
        let start = Instant::now();

        self.years
            .par_iter_mut()
            .for_each(|(_, year)| year.build_index());

        tracing::debug!(
            years = self.years.len(),
            events = self.total_count,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Popularity index built"
        );

        IndexedTree { tree: self }
    }

    pub fn stats(&self) -> TreeStats {
        TreeStats {
            total_events: self.total_count,
            years: self.years.keys().copied().collect(),
            nodes: self.years.values().map(DateNode::node_count).sum(),
            distinct_queries: self.distinct_queries(),
        }
    }

    fn distinct_queries(&self) -> usize {
        match self.years.len() {
            0 => 0,
            1 => self.years.values().map(|y| y.hits().distinct()).sum(),
            _ => {
                let mut seen = HashSet::new();
                for year in self.years.values() {
                    seen.extend(year.hits().iter().map(|(query, _)| query));
                }
                seen.len()
            }
        }
    }
}

/// Ranked, read-only tree
///
/// Immutable and `Sync`; share it behind an `Arc` to serve concurrent readers.
#[derive(Debug)]
pub struct IndexedTree {
    tree: DateTree,
}

impl IndexedTree {
    /// Distinct queries under the date selected by `search`
    pub fn count(&self, search: &Search) -> usize {
        self.tree.count(search)
    }

    /// Events under the date selected by `search`
    pub fn events(&self, search: &Search) -> u64 {
        self.tree.events(search)
    }

    /// Most frequent queries under the date selected by `search`
    ///
    /// At most `search.popularity()` entries, by descending count then query.
    pub fn popular(&self, search: &Search) -> &[Popularity] {
        match self.tree.years.get(&search.year()) {
            Some(year) => year.popular(search),
            None => &[],
        }
    }

    pub fn total_count(&self) -> u64 {
        self.tree.total_count()
    }

    pub fn year(&self, year: i32) -> Option<&YearNode> {
        self.tree.year(year)
    }

    pub fn stats(&self) -> TreeStats {
        self.tree.stats()
    }
}

/// Size summary of a tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TreeStats {
    /// Number of insertions
    pub total_events: u64,
    /// Distinct query strings over all years
    pub distinct_queries: usize,
    /// Years holding at least one event, ascending
    pub years: Vec<i32>,
    /// Nodes across all levels
    pub nodes: usize,
}

impl std::fmt::Display for TreeStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} events, {} distinct queries, {} years, {} nodes",
            self.total_events,
            self.distinct_queries,
            self.years.len(),
            self.nodes
        )
    }
}
