//! Date tree nodes
//!
//! The five inner levels (year, month, day, hour, minute) are all the same
//! [`Branch`] type, parameterized by the calendar unit that picks a child slot, the
//! child type and the fan-out. Seconds are [`Leaf`] nodes.
//!
//! ```text
//! YearNode   = Branch<MonthSlot,  MonthNode,  12>
//! MonthNode  = Branch<DaySlot,    DayNode,    31>
//! DayNode    = Branch<HourSlot,   HourNode,   24>
//! HourNode   = Branch<MinuteSlot, MinuteNode, 60>
//! MinuteNode = Branch<SecondSlot, SecondNode, 60>
//! SecondNode = Leaf
//! ```

use chrono::{Datelike, NaiveDateTime, Timelike};
use rayon::prelude::*;
use std::marker::PhantomData;
use std::sync::Arc;

use super::hits::{top, Hits, Popularity};
use super::search::{Granularity, Search};

/// Aggregate data of the node a search stopped at
#[derive(Debug, Clone, Copy)]
pub struct Aggregate<'a> {
    pub hits: &'a Hits,
    pub ranking: &'a [Popularity],
}

/// Operations shared by every level of the tree
pub trait DateNode: Default + Send + Sync {
    /// Record one event in this node and every node below it on the event's path
    fn insert(&mut self, query: &Arc<str>, timestamp: &NaiveDateTime);

    /// Descend as far as `search` asks and return the node reached
    ///
    /// `None` when a selected child has never received an event.
    fn resolve(&self, search: &Search) -> Option<Aggregate<'_>>;

    /// Rank every node of the subtree, children in parallel before their parent
    fn build_index(&mut self);

    fn hits(&self) -> &Hits;

    /// Number of nodes in the subtree, this one included
    fn node_count(&self) -> usize;

    /// Distinct queries in the node selected by `search`
    fn count(&self, search: &Search) -> usize {
        self.resolve(search).map_or(0, |node| node.hits.distinct())
    }

    /// Events in the node selected by `search`
    fn events(&self, search: &Search) -> u64 {
        self.resolve(search).map_or(0, |node| node.hits.total())
    }

    /// Top `search.popularity()` queries of the node selected by `search`
    fn popular(&self, search: &Search) -> &[Popularity] {
        match self.resolve(search) {
            Some(node) => top(node.ranking, search.popularity()),
            None => &[],
        }
    }
}

/// Maps timestamps and searches to a zero-based child slot of one level
pub trait CalendarUnit: 'static {
    const UNIT: Granularity;

    fn slot_of(timestamp: &NaiveDateTime) -> usize;

    /// Slot selected by `search`, `None` if the search stops above this unit
    fn selected(search: &Search) -> Option<usize>;
}

// Calendar numbering to slot. Values below the unit's minimum wrap around and
// miss every slot.
fn one_based(value: u32) -> usize {
    (value as usize).wrapping_sub(1)
}

#[derive(Debug)]
pub struct MonthSlot;

impl CalendarUnit for MonthSlot {
    const UNIT: Granularity = Granularity::Month;

    fn slot_of(timestamp: &NaiveDateTime) -> usize {
        timestamp.month0() as usize
    }

    fn selected(search: &Search) -> Option<usize> {
        search.month().map(one_based)
    }
}

#[derive(Debug)]
pub struct DaySlot;

impl CalendarUnit for DaySlot {
    const UNIT: Granularity = Granularity::Day;

    fn slot_of(timestamp: &NaiveDateTime) -> usize {
        timestamp.day0() as usize
    }

    fn selected(search: &Search) -> Option<usize> {
        search.day().map(one_based)
    }
}

#[derive(Debug)]
pub struct HourSlot;

impl CalendarUnit for HourSlot {
    const UNIT: Granularity = Granularity::Hour;

    fn slot_of(timestamp: &NaiveDateTime) -> usize {
        timestamp.hour() as usize
    }

    fn selected(search: &Search) -> Option<usize> {
        search.hour().map(|h| h as usize)
    }
}

#[derive(Debug)]
pub struct MinuteSlot;

impl CalendarUnit for MinuteSlot {
    const UNIT: Granularity = Granularity::Minute;

    fn slot_of(timestamp: &NaiveDateTime) -> usize {
        timestamp.minute() as usize
    }

    fn selected(search: &Search) -> Option<usize> {
        search.minute().map(|m| m as usize)
    }
}

#[derive(Debug)]
pub struct SecondSlot;

impl CalendarUnit for SecondSlot {
    const UNIT: Granularity = Granularity::Second;

    fn slot_of(timestamp: &NaiveDateTime) -> usize {
        timestamp.second() as usize
    }

    fn selected(search: &Search) -> Option<usize> {
        search.second().map(|s| s as usize)
    }
}

/// Inner node with `N` lazily created children
#[derive(Debug)]
pub struct Branch<U, C, const N: usize> {
    hits: Hits,
    children: [Option<Box<C>>; N],
    ranking: Vec<Popularity>,
    unit: PhantomData<fn() -> U>,
}

impl<U, C, const N: usize> Default for Branch<U, C, N> {
    fn default() -> Self {
        Self {
            hits: Hits::new(),
            children: std::array::from_fn(|_| None),
            ranking: Vec::new(),
            unit: PhantomData,
        }
    }
}

impl<U, C, const N: usize> Branch<U, C, N> {
    /// Child at a zero-based slot
    pub fn child(&self, slot: usize) -> Option<&C> {
        self.children.get(slot)?.as_deref()
    }

    /// Present children with their zero-based slot
    pub fn children(&self) -> impl Iterator<Item = (usize, &C)> {
        self.children
            .iter()
            .enumerate()
            .filter_map(|(slot, child)| child.as_deref().map(|c| (slot, c)))
    }
}

impl<U: CalendarUnit, C: DateNode, const N: usize> DateNode for Branch<U, C, N> {
    fn insert(&mut self, query: &Arc<str>, timestamp: &NaiveDateTime) {
        self.hits.record(query);

        let child = self.children[U::slot_of(timestamp)].get_or_insert_with(Box::default);
        child.insert(query, timestamp);
    }

    fn resolve(&self, search: &Search) -> Option<Aggregate<'_>> {
        match U::selected(search) {
            None => Some(Aggregate {
                hits: &self.hits,
                ranking: &self.ranking,
            }),
            Some(slot) => self.child(slot)?.resolve(search),
        }
    }

    fn build_index(&mut self) {
        self.children[..]
            .par_iter_mut()
            .filter_map(|child| child.as_deref_mut())
            .for_each(|child| child.build_index());

        self.ranking = self.hits.rank();
    }

    fn hits(&self) -> &Hits {
        &self.hits
    }

    fn node_count(&self) -> usize {
        1 + self
            .children()
            .map(|(_, child)| child.node_count())
            .sum::<usize>()
    }
}

/// Second-level node, the bottom of the tree
#[derive(Debug, Default)]
pub struct Leaf {
    hits: Hits,
    ranking: Vec<Popularity>,
}

impl DateNode for Leaf {
    fn insert(&mut self, query: &Arc<str>, _timestamp: &NaiveDateTime) {
        self.hits.record(query);
    }

    fn resolve(&self, _search: &Search) -> Option<Aggregate<'_>> {
        Some(Aggregate {
            hits: &self.hits,
            ranking: &self.ranking,
        })
    }

    fn build_index(&mut self) {
        self.ranking = self.hits.rank();
    }

    fn hits(&self) -> &Hits {
        &self.hits
    }

    fn node_count(&self) -> usize {
        1
    }
}

pub type SecondNode = Leaf;
pub type MinuteNode = Branch<SecondSlot, SecondNode, 60>;
pub type HourNode = Branch<MinuteSlot, MinuteNode, 60>;
pub type DayNode = Branch<HourSlot, HourNode, 24>;
pub type MonthNode = Branch<DaySlot, DayNode, 31>;
pub type YearNode = Branch<MonthSlot, MonthNode, 12>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    fn q(s: &str) -> Arc<str> {
        Arc::from(s)
    }

    /// Every query count of a branch equals the sum over its children
    fn assert_consistent<U: CalendarUnit, C: DateNode, const N: usize>(node: &Branch<U, C, N>) {
        for (query, count) in node.hits().iter() {
            let below: u64 = node.children().map(|(_, c)| c.hits().get(query)).sum();
            assert_eq!(count, below, "{} mismatch for {}", U::UNIT, query);
        }
        let below_total: u64 = node.children().map(|(_, c)| c.hits().total()).sum();
        assert_eq!(node.hits().total(), below_total);
    }

    #[test]
    fn test_minute_node_slots() {
        let mut minute = MinuteNode::default();
        minute.insert(&q("Elixir"), &ts(2015, 8, 3, 0, 0, 7));
        minute.insert(&q("Plop"), &ts(2015, 8, 3, 0, 0, 7));
        minute.insert(&q("Elixir"), &ts(2015, 8, 3, 0, 0, 59));

        let slots: Vec<usize> = minute.children().map(|(slot, _)| slot).collect();
        assert_eq!(slots, vec![7, 59]);
        assert_eq!(minute.child(7).unwrap().hits().distinct(), 2);
        assert_eq!(minute.child(59).unwrap().hits().get("Elixir"), 1);
        assert!(minute.child(8).is_none());
        assert!(minute.child(600).is_none());
        assert_consistent(&minute);
    }

    #[test]
    fn test_year_node_aggregates_every_level() {
        let mut year = YearNode::default();
        let events = [
            ("a", ts(2015, 1, 1, 0, 0, 0)),
            ("a", ts(2015, 1, 1, 0, 0, 1)),
            ("b", ts(2015, 1, 31, 23, 59, 59)),
            ("a", ts(2015, 12, 31, 12, 30, 30)),
            ("c", ts(2015, 12, 31, 12, 30, 30)),
        ];
        for (query, at) in &events {
            year.insert(&q(query), at);
        }

        assert_eq!(year.hits().total(), 5);
        assert_consistent(&year);
        for (_, month) in year.children() {
            assert_consistent(month);
            for (_, day) in month.children() {
                assert_consistent(day);
                for (_, hour) in day.children() {
                    assert_consistent(hour);
                    for (_, minute) in hour.children() {
                        assert_consistent(minute);
                    }
                }
            }
        }

        let months: Vec<usize> = year.children().map(|(slot, _)| slot).collect();
        assert_eq!(months, vec![0, 11]);
        // year + 2 months + 3 days + 3 hours + 3 minutes + 4 seconds
        assert_eq!(year.node_count(), 16);
    }

    #[test]
    fn test_resolve_and_rank() {
        let mut year = YearNode::default();
        year.insert(&q("Elixir"), &ts(2015, 8, 3, 0, 0, 7));
        year.insert(&q("Plop"), &ts(2015, 8, 3, 0, 0, 7));
        year.insert(&q("Elixir"), &ts(2015, 8, 5, 23, 0, 12));
        year.build_index();

        let month = Search::builder(2015).month(8).popularity(10).build().unwrap();
        assert_eq!(
            year.popular(&month),
            &[Popularity::new("Elixir", 2), Popularity::new("Plop", 1)]
        );
        assert_eq!(year.count(&month), 2);
        assert_eq!(year.events(&month), 3);

        let empty_day = Search::builder(2015).month(8).day(4).build().unwrap();
        assert!(year.resolve(&empty_day).is_none());
        assert_eq!(year.count(&empty_day), 0);
        assert!(year.popular(&empty_day).is_empty());
    }

    #[test]
    fn test_leaf_ranking() {
        let mut leaf = Leaf::default();
        leaf.insert(&q("Plop"), &ts(2015, 8, 3, 0, 0, 7));
        leaf.insert(&q("Elixir"), &ts(2015, 8, 3, 0, 0, 7));

        let search = Search::builder(2015).popularity(5).build().unwrap();
        assert!(leaf.popular(&search).is_empty());

        leaf.build_index();
        assert_eq!(
            leaf.popular(&search),
            &[Popularity::new("Elixir", 1), Popularity::new("Plop", 1)]
        );
    }
}
