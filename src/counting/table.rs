use std::collections::{BTreeMap, HashMap, HashSet};

use ahash::RandomState;

use crate::core::types::HashValue;

/// Hash value -> number of signatures holding it
pub type HashCounts = HashMap<HashValue, u64, RandomState>;

/// Occurrence counts of every hash value seen across a set of signatures.
///
/// A table only grows while counting. Hashes never seen are absent, not
/// stored with a zero count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: HashCounts,
    signatures: u64,
}

impl FrequencyTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            counts: HashCounts::with_capacity_and_hasher(capacity, RandomState::new()),
            signatures: 0,
        }
    }

    /// Count the distinct hashes of one signature.
    ///
    /// A hash repeated within the signature still adds 1.
    pub fn add_signature(&mut self, hashes: &[HashValue]) {
        let distinct: HashSet<HashValue, RandomState> = hashes.iter().copied().collect();
        self.counts.reserve(distinct.len());
        for hash in distinct {
            *self.counts.entry(hash).or_insert(0) += 1;
        }
        self.signatures += 1;
    }

    /// Total count of `hash`, 0 if never seen
    pub fn get(&self, hash: HashValue) -> u64 {
        self.counts.get(&hash).copied().unwrap_or(0)
    }

    pub fn contains(&self, hash: HashValue) -> bool {
        self.counts.contains_key(&hash)
    }

    /// Number of distinct hashes
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of signatures absorbed into this table
    pub fn signatures(&self) -> u64 {
        self.signatures
    }

    /// Sum of all counts
    pub fn total_occurrences(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (HashValue, u64)> + '_ {
        self.counts.iter().map(|(&hash, &count)| (hash, count))
    }

    /// Add every count of `other` into this table.
    ///
    /// Counts are summed, so the result does not depend on which side is
    /// larger or in which order fragments are merged.
    pub fn merge(&mut self, mut other: FrequencyTable) {
        // Fold the smaller table into the larger one
        if other.counts.len() > self.counts.len() {
            std::mem::swap(self, &mut other);
        }
        for (hash, count) in other.counts {
            *self.counts.entry(hash).or_insert(0) += count;
        }
        self.signatures += other.signatures;
    }

    /// Merge any number of fragments into one table
    pub fn merge_all(fragments: impl IntoIterator<Item = FrequencyTable>) -> FrequencyTable {
        fragments
            .into_iter()
            .fold(FrequencyTable::new(), |mut merged, fragment| {
                merged.merge(fragment);
                merged
            })
    }

    /// Number of distinct hashes per occurrence count
    pub fn spectrum(&self) -> BTreeMap<u64, u64> {
        let mut spectrum = BTreeMap::new();
        for &count in self.counts.values() {
            *spectrum.entry(count).or_insert(0) += 1;
        }
        spectrum
    }
}

impl FromIterator<(HashValue, u64)> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = (HashValue, u64)>>(iter: I) -> Self {
        let mut table = FrequencyTable::new();
        for (hash, count) in iter {
            *table.counts.entry(hash).or_insert(0) += count;
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_of(signatures: &[&[u64]]) -> FrequencyTable {
        let mut table = FrequencyTable::new();
        for hashes in signatures {
            table.add_signature(hashes);
        }
        table
    }

    #[test]
    fn test_counts_across_signatures() {
        let table = table_of(&[&[1, 2, 3], &[2, 3, 4], &[3, 4, 5]]);

        assert_eq!(table.get(1), 1);
        assert_eq!(table.get(2), 2);
        assert_eq!(table.get(3), 3);
        assert_eq!(table.get(4), 2);
        assert_eq!(table.get(5), 1);
        assert_eq!(table.get(6), 0);
        assert!(!table.contains(6));
        assert_eq!(table.len(), 5);
        assert_eq!(table.signatures(), 3);
        assert_eq!(table.total_occurrences(), 9);
    }

    #[test]
    fn test_repeated_hash_counts_once_per_signature() {
        let table = table_of(&[&[7, 7, 1], &[1]]);

        assert_eq!(table.get(7), 1);
        assert_eq!(table.get(1), 2);
        assert_eq!(table.total_occurrences(), 3);
        assert_eq!(table.spectrum().get(&1), Some(&1));
    }

    #[test]
    fn test_merge_sums_counts() {
        let mut a = table_of(&[&[1, 2]]);
        let b = table_of(&[&[2, 3], &[3]]);
        a.merge(b);

        assert_eq!(a.get(1), 1);
        assert_eq!(a.get(2), 2);
        assert_eq!(a.get(3), 2);
        assert_eq!(a.signatures(), 3);
    }

    #[test]
    fn test_merge_order_independent() {
        let fragments = || {
            vec![
                table_of(&[&[1, 2, 3]]),
                table_of(&[&[2, 3, 4], &[9]]),
                table_of(&[&[3, 4, 5]]),
            ]
        };

        let forward = FrequencyTable::merge_all(fragments());
        let backward = FrequencyTable::merge_all(fragments().into_iter().rev());
        let sequential = table_of(&[&[1, 2, 3], &[2, 3, 4], &[9], &[3, 4, 5]]);

        assert_eq!(forward, backward);
        assert_eq!(forward, sequential);
    }

    #[test]
    fn test_merge_empty_fragments() {
        let merged = FrequencyTable::merge_all(vec![FrequencyTable::new(), FrequencyTable::new()]);
        assert!(merged.is_empty());
        assert_eq!(merged.get(1), 0);
    }

    #[test]
    fn test_spectrum() {
        let table = table_of(&[&[1, 2, 3], &[2, 3, 4], &[3, 4, 5]]);
        let spectrum = table.spectrum();
        assert_eq!(spectrum.get(&1), Some(&2));
        assert_eq!(spectrum.get(&2), Some(&2));
        assert_eq!(spectrum.get(&3), Some(&1));
    }

    #[test]
    fn test_from_iter_sums_duplicates() {
        let table: FrequencyTable = vec![(1, 2), (1, 3), (5, 1)].into_iter().collect();
        assert_eq!(table.get(1), 5);
        assert_eq!(table.get(5), 1);
    }
}
