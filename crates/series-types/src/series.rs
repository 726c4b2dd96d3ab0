use crate::error::SeriesError;
use crate::key::SeriesKey;
use crate::record::Record;
use std::collections::BTreeMap;

/// An ordered mapping from key to record with the *functional* uniqueness
/// policy: keys are unique and a duplicate insertion is a reported error.
///
/// Iteration is always in ascending key order. The engine treats input
/// series as read-only and allocates fresh output series.
#[derive(Debug, Clone, PartialEq)]
pub struct Series<K: SeriesKey, R: Record> {
    points: BTreeMap<K, R>,
}

impl<K: SeriesKey, R: Record> Default for Series<K, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: SeriesKey, R: Record> Series<K, R> {
    pub fn new() -> Self {
        Self {
            points: BTreeMap::new(),
        }
    }

    /// Builds a series from key/record pairs, rejecting duplicate keys.
    pub fn from_records<I>(records: I) -> Result<Self, SeriesError>
    where
        I: IntoIterator<Item = (K, R)>,
    {
        let mut series = Self::new();
        for (key, record) in records {
            series.insert(key, record)?;
        }
        Ok(series)
    }

    /// Inserts a record at `key`. A key already present is an error under
    /// the functional policy; the series is left unchanged.
    pub fn insert(&mut self, key: K, record: R) -> Result<(), SeriesError> {
        if self.points.contains_key(&key) {
            return Err(SeriesError::DuplicateKey(format!("{key:?}")));
        }
        self.points.insert(key, record);
        Ok(())
    }

    pub fn get(&self, key: &K) -> Option<&R> {
        self.points.get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.points.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&K, &R)> {
        self.points.iter()
    }

    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> {
        self.points.keys()
    }

    pub fn values(&self) -> impl DoubleEndedIterator<Item = &R> {
        self.points.values()
    }

    pub fn first(&self) -> Option<(&K, &R)> {
        self.points.iter().next()
    }

    pub fn last(&self) -> Option<(&K, &R)> {
        self.points.iter().next_back()
    }

    /// The first record with at least one defined field, in key order.
    pub fn first_valid(&self) -> Option<&R> {
        self.points.values().find(|r| r.is_defined())
    }

    /// The last record with at least one defined field, in key order.
    pub fn last_valid(&self) -> Option<&R> {
        self.points.values().rev().find(|r| r.is_defined())
    }
}

impl<K: SeriesKey, R: Record> IntoIterator for Series<K, R> {
    type Item = (K, R);
    type IntoIter = std::collections::btree_map::IntoIter<K, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

/// A list-backed series with the *non-functional* uniqueness policy:
/// duplicate keys are permitted, lookup is a linear scan returning the
/// first match, and ordering is explicit via [`PairSeries::sort_by_key`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PairSeries<K: SeriesKey, R: Record> {
    points: Vec<(K, R)>,
}

impl<K: SeriesKey, R: Record> PairSeries<K, R> {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn push(&mut self, key: K, record: R) {
        self.points.push((key, record));
    }

    /// First record stored under `key`, by linear scan.
    pub fn get(&self, key: &K) -> Option<&R> {
        self.points.iter().find(|(k, _)| k == key).map(|(_, r)| r)
    }

    /// All records stored under `key`, in insertion order.
    pub fn get_all<'a>(&'a self, key: &'a K) -> impl Iterator<Item = &'a R> {
        self.points
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, r)| r)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &R)> {
        self.points.iter().map(|(k, r)| (k, r))
    }

    /// Re-sorts the pairs by key. Duplicates keep their insertion order.
    pub fn sort_by_key(&mut self) {
        self.points.sort_by(|(a, _), (b, _)| a.cmp(b));
    }
}

impl<K: SeriesKey, R: Record> From<Vec<(K, R)>> for PairSeries<K, R> {
    fn from(points: Vec<(K, R)>) -> Self {
        Self { points }
    }
}
