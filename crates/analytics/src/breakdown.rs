use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One `(key, value)` pair of a grouped aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupEntry<K> {
    pub key: K,
    pub value: Decimal,
}

/// A ranking of groups by aggregated value.
///
/// Entries are ordered by value descending; equal values are ordered by key
/// ascending so the ranking never depends on input order or sort stability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupBreakdown<K> {
    entries: Vec<GroupEntry<K>>,
}

impl<K: Ord> GroupBreakdown<K> {
    pub fn from_totals<I>(totals: I) -> Self
    where
        I: IntoIterator<Item = (K, Decimal)>,
    {
        let mut entries: Vec<GroupEntry<K>> = totals
            .into_iter()
            .map(|(key, value)| GroupEntry { key, value })
            .collect();
        entries.sort_by(rank_order);
        Self { entries }
    }

    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    /// Keeps the `n` highest-ranked groups.
    pub fn top(mut self, n: usize) -> Self {
        self.entries.truncate(n);
        self
    }

    /// The same entries re-ordered by key, for time series such as weeks.
    pub fn in_key_order(self) -> Vec<GroupEntry<K>> {
        let mut entries = self.entries;
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries
    }

    pub fn get(&self, key: &K) -> Option<Decimal> {
        self.entries.iter().find(|e| &e.key == key).map(|e| e.value)
    }

    pub fn entries(&self) -> &[GroupEntry<K>] {
        &self.entries
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|e| &e.key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn rank_order<K: Ord>(a: &GroupEntry<K>, b: &GroupEntry<K>) -> Ordering {
    b.value.cmp(&a.value).then_with(|| a.key.cmp(&b.key))
}
