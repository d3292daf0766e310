use std::collections::HashSet;
use std::path::Path;

use ahash::RandomState;
use tracing::info;

use crate::core::signature::Signature;
use crate::core::types::HashValue;
use crate::counting::table::FrequencyTable;
use crate::parsing::sourmash::parse_signatures;
use crate::parsing::ParseError;

/// Default error threshold: a hash seen in exactly one signature
pub const DEFAULT_MAX_ERROR_COUNT: u64 = 1;

/// Hash values classified as sequencing errors at one k-mer size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorSet {
    ksize: u32,
    hashes: HashSet<HashValue, RandomState>,
}

impl ErrorSet {
    #[must_use]
    pub fn new(ksize: u32) -> Self {
        Self {
            ksize,
            hashes: HashSet::default(),
        }
    }

    pub fn from_hashes(ksize: u32, hashes: impl IntoIterator<Item = HashValue>) -> Self {
        Self {
            ksize,
            hashes: hashes.into_iter().collect(),
        }
    }

    /// Load a persisted error signature.
    ///
    /// Every sketch at `ksize` in the file contributes its hashes.
    ///
    /// # Errors
    ///
    /// Returns any `ParseError` from reading the file.
    pub fn load(path: &Path, ksize: u32) -> Result<Self, ParseError> {
        let signatures = parse_signatures(path, ksize)?;
        let errors = Self::from_hashes(ksize, signatures.into_iter().flat_map(|s| s.hashes));
        info!(
            path = %path.display(),
            ksize,
            error_hashes = errors.len(),
            "Loaded error signature"
        );
        Ok(errors)
    }

    pub fn ksize(&self) -> u32 {
        self.ksize
    }

    #[inline]
    pub fn contains(&self, hash: HashValue) -> bool {
        self.hashes.contains(&hash)
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = HashValue> + '_ {
        self.hashes.iter().copied()
    }

    /// Members in ascending order
    #[must_use]
    pub fn sorted(&self) -> Vec<HashValue> {
        let mut hashes: Vec<HashValue> = self.hashes.iter().copied().collect();
        hashes.sort_unstable();
        hashes
    }

    /// Unweighted signature holding every member, ready to be written out
    #[must_use]
    pub fn to_signature(&self, name: impl Into<String>) -> Signature {
        Signature::new(self.ksize, self.sorted()).with_name(name)
    }
}

/// Selects hashes whose cohort-wide count is at or below a threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorClassifier {
    max_count: u64,
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ERROR_COUNT)
    }
}

impl ErrorClassifier {
    #[must_use]
    pub fn new(max_count: u64) -> Self {
        Self { max_count }
    }

    pub fn max_count(&self) -> u64 {
        self.max_count
    }

    #[inline]
    pub fn is_error(&self, count: u64) -> bool {
        count <= self.max_count
    }

    /// Build the error set of a merged table
    #[must_use]
    pub fn classify(&self, table: &FrequencyTable, ksize: u32) -> ErrorSet {
        let errors = ErrorSet::from_hashes(
            ksize,
            table
                .iter()
                .filter(|&(_, count)| self.is_error(count))
                .map(|(hash, _)| hash),
        );

        info!(
            distinct = table.len(),
            error_hashes = errors.len(),
            max_count = self.max_count,
            "Classified error hashes"
        );

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::materializer::Materializer;

    fn scenario_table() -> FrequencyTable {
        let mut table = FrequencyTable::new();
        table.add_signature(&[1, 2, 3]);
        table.add_signature(&[2, 3, 4]);
        table.add_signature(&[3, 4, 5]);
        table
    }

    #[test]
    fn test_singletons_are_errors() {
        let errors = ErrorClassifier::default().classify(&scenario_table(), 31);
        assert_eq!(errors.sorted(), vec![1, 5]);
        assert_eq!(errors.ksize(), 31);
    }

    #[test]
    fn test_threshold_is_configurable() {
        let errors = ErrorClassifier::new(2).classify(&scenario_table(), 31);
        assert_eq!(errors.sorted(), vec![1, 2, 4, 5]);

        let none = ErrorClassifier::new(0).classify(&scenario_table(), 31);
        assert!(none.is_empty());
    }

    #[test]
    fn test_classification_is_deterministic() {
        let table = scenario_table();
        let classifier = ErrorClassifier::default();
        assert_eq!(classifier.classify(&table, 31), classifier.classify(&table, 31));
    }

    #[test]
    fn test_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("errors.sig");
        let errors = ErrorSet::from_hashes(31, [5, 1, 99]);

        Materializer::new()
            .write_error_set(&errors, &path)
            .unwrap();

        let loaded = ErrorSet::load(&path, 31).unwrap();
        assert_eq!(loaded, errors);
    }
}
