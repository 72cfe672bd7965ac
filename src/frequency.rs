//! Symbol occurrence counting.

use std::collections::BTreeMap;

/// occurrences of each symbol in one input sequence
///
/// Keys iterate in symbol order, which is what makes tree construction
/// reproducible: leaves are seeded in that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable<S: Ord> {
    counts: BTreeMap<S, u64>,
}

impl<S: Ord> FrequencyTable<S> {
    /// count occurrences of each symbol
    pub fn count<I>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
    {
        let mut counts: BTreeMap<S, u64> = BTreeMap::new();
        for symbol in symbols {
            *counts.entry(symbol).or_insert(0) += 1;
        }
        FrequencyTable { counts }
    }

    pub fn get(&self, symbol: &S) -> Option<u64> {
        self.counts.get(symbol).copied()
    }

    /// number of distinct symbols
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// length of the counted input
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// symbols with their counts, in ascending symbol order
    pub fn iter(&self) -> impl Iterator<Item = (&S, u64)> + '_ {
        self.counts.iter().map(|(symbol, &count)| (symbol, count))
    }
}

impl<S: Ord> Default for FrequencyTable<S> {
    fn default() -> Self {
        FrequencyTable {
            counts: BTreeMap::new(),
        }
    }
}

impl<S: Ord> std::iter::FromIterator<S> for FrequencyTable<S> {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::count(iter)
    }
}
