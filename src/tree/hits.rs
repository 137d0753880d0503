//! Per-node hit aggregates and popularity ranking
//!
//! Every node in the date tree owns a [`Hits`] map counting how many events each
//! query string produced inside the node's subtree. Once ingestion is over the map
//! is frozen into a ranking sorted by count (descending), ties broken by the query
//! string (ascending), so that truncated top-N answers are reproducible.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

/// A query string and the number of events it produced
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Popularity {
    /// The query string
    pub query: Arc<str>,
    /// Number of events for that query
    pub count: u64,
}

impl Popularity {
    pub fn new(query: impl Into<Arc<str>>, count: u64) -> Self {
        Self {
            query: query.into(),
            count,
        }
    }

    /// Ranking order: higher count first, then lexicographic query
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .count
            .cmp(&self.count)
            .then_with(|| self.query.cmp(&other.query))
    }
}

/// Aggregate hit counts of a subtree, keyed by query string
#[derive(Debug, Clone, Default)]
pub struct Hits {
    counts: HashMap<Arc<str>, u64>,
}

impl Hits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one event for `query`
    ///
    /// The shared string is only cloned the first time this node sees the query.
    pub fn record(&mut self, query: &Arc<str>) {
        match self.counts.get_mut(query.as_ref()) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(Arc::clone(query), 1);
            }
        }
    }

    /// Hit count for a single query (0 if never seen)
    pub fn get(&self, query: &str) -> u64 {
        self.counts.get(query).copied().unwrap_or(0)
    }

    /// Number of distinct queries
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Sum of all counts, i.e. the number of events in the subtree
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Arc<str>, u64)> {
        self.counts.iter().map(|(query, count)| (query, *count))
    }

    /// Materialize the popularity ranking of this node
    pub fn rank(&self) -> Vec<Popularity> {
        let mut ranking: Vec<Popularity> = self
            .counts
            .iter()
            .map(|(query, count)| Popularity {
                query: Arc::clone(query),
                count: *count,
            })
            .collect();

        // Keys are unique so the order is total and an unstable sort is deterministic.
        ranking.sort_unstable_by(Popularity::rank_cmp);
        ranking
    }
}

/// First `n` entries of a ranking, or the whole ranking if it is shorter
pub fn top(ranking: &[Popularity], n: usize) -> &[Popularity] {
    &ranking[..n.min(ranking.len())]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hits_of(queries: &[&str]) -> Hits {
        let mut hits = Hits::new();
        for q in queries {
            hits.record(&Arc::from(*q));
        }
        hits
    }

    #[test]
    fn test_record_and_totals() {
        let hits = hits_of(&["Elixir", "Plop", "Elixir"]);

        assert_eq!(hits.get("Elixir"), 2);
        assert_eq!(hits.get("Plop"), 1);
        assert_eq!(hits.get("missing"), 0);
        assert_eq!(hits.distinct(), 2);
        assert_eq!(hits.total(), 3);
    }

    #[test]
    fn test_rank_orders_by_count_then_query() {
        let hits = hits_of(&["yeah", "Elixir", "Plop", "Elixir", "SoftLayer", "will", "will", "will"]);
        let ranking = hits.rank();

        let expected = vec![
            Popularity::new("will", 3),
            Popularity::new("Elixir", 2),
            Popularity::new("Plop", 1),
            Popularity::new("SoftLayer", 1),
            Popularity::new("yeah", 1),
        ];
        assert_eq!(ranking, expected);
    }

    #[test]
    fn test_rank_empty() {
        assert!(Hits::new().rank().is_empty());
    }

    #[test]
    fn test_top_truncation() {
        let ranking = hits_of(&["a", "b", "b", "c", "c", "c"]).rank();

        assert!(top(&ranking, 0).is_empty());
        assert_eq!(top(&ranking, 2), &ranking[..2]);
        assert_eq!(top(&ranking, 2)[0], Popularity::new("c", 3));
        assert_eq!(top(&ranking, 3), &ranking[..]);
        assert_eq!(top(&ranking, 100), &ranking[..]);
    }

    #[test]
    fn test_record_shares_interned_string() {
        let query: Arc<str> = Arc::from("Elixir");
        let mut a = Hits::new();
        let mut b = Hits::new();
        a.record(&query);
        b.record(&query);

        // the original plus one clone per map
        assert_eq!(Arc::strong_count(&query), 3);
    }
}
