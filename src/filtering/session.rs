use std::path::Path;
use std::sync::Arc;

use crate::core::signature::Signature;
use crate::core::types::{AbundancePolicy, HashValue};
use crate::filtering::classifier::ErrorSet;
use crate::parsing::sourmash::parse_signatures;
use crate::parsing::ParseError;

/// A signature with every error hash removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredSignature {
    /// Kept hashes, in source order, with metadata of the source sketch
    pub signature: Signature,

    /// Number of source hashes that were in the error set
    pub removed: usize,
}

impl FilteredSignature {
    pub fn kept(&self) -> usize {
        self.signature.len()
    }
}

/// Read-only filtering context bound to one error set.
///
/// Cloning is cheap and every method takes `&self`, so one session can
/// filter many signatures concurrently.
#[derive(Debug, Clone)]
pub struct FilterSession {
    errors: Arc<ErrorSet>,
    abundance: AbundancePolicy,
}

impl FilterSession {
    pub fn new(errors: impl Into<Arc<ErrorSet>>) -> Self {
        Self {
            errors: errors.into(),
            abundance: AbundancePolicy::default(),
        }
    }

    #[must_use]
    pub fn with_abundance_policy(mut self, abundance: AbundancePolicy) -> Self {
        self.abundance = abundance;
        self
    }

    pub fn errors(&self) -> &ErrorSet {
        &self.errors
    }

    pub fn ksize(&self) -> u32 {
        self.errors.ksize()
    }

    pub fn abundance_policy(&self) -> AbundancePolicy {
        self.abundance
    }

    /// Hashes of `hashes` that are not errors, in input order
    pub fn filter_hashes(&self, hashes: &[HashValue]) -> Vec<HashValue> {
        hashes
            .iter()
            .copied()
            .filter(|&hash| !self.errors.contains(hash))
            .collect()
    }

    /// Remove every error hash from one signature
    pub fn filter(&self, signature: &Signature) -> FilteredSignature {
        let keep_abundance =
            self.abundance == AbundancePolicy::Keep && signature.track_abundance();

        let mut hashes = Vec::with_capacity(signature.len());
        let mut abundances = keep_abundance.then(|| Vec::with_capacity(signature.len()));

        for (hash, abundance) in signature.iter() {
            if self.errors.contains(hash) {
                continue;
            }
            hashes.push(hash);
            if let (Some(kept), Some(value)) = (abundances.as_mut(), abundance) {
                kept.push(value);
            }
        }

        let removed = signature.len() - hashes.len();
        let kept = Signature {
            name: signature.name.clone(),
            filename: signature.filename.clone(),
            ksize: signature.ksize,
            max_hash: signature.max_hash,
            seed: signature.seed,
            molecule: signature.molecule.clone(),
            hashes,
            abundances,
        };

        FilteredSignature {
            signature: kept,
            removed,
        }
    }

    /// Filter every sketch at the session's k-mer size in one file.
    ///
    /// # Errors
    ///
    /// Returns any `ParseError` from reading the file.
    pub fn filter_file(&self, path: &Path) -> Result<Vec<FilteredSignature>, ParseError> {
        let signatures = parse_signatures(path, self.ksize())?;
        Ok(signatures.iter().map(|s| self.filter(s)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> FilterSession {
        FilterSession::new(ErrorSet::from_hashes(31, [1, 5]))
    }

    #[test]
    fn test_filter_removes_errors() {
        let filtered = session().filter(&Signature::new(31, vec![1, 2, 3]));
        assert_eq!(filtered.signature.hashes, vec![2, 3]);
        assert_eq!(filtered.removed, 1);
        assert_eq!(filtered.kept(), 2);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let session = session();
        let once = session.filter(&Signature::new(31, vec![5, 4, 1, 9]));
        let twice = session.filter(&once.signature);
        assert_eq!(twice.signature, once.signature);
        assert_eq!(twice.removed, 0);
    }

    #[test]
    fn test_abundance_dropped_by_default() {
        let sig = Signature::new(31, vec![1, 2, 3]).with_abundances(vec![10, 20, 30]);
        let filtered = session().filter(&sig);
        assert!(filtered.signature.abundances.is_none());
    }

    #[test]
    fn test_abundance_kept_when_requested() {
        let sig = Signature::new(31, vec![1, 2, 3]).with_abundances(vec![10, 20, 30]);
        let filtered = session()
            .with_abundance_policy(AbundancePolicy::Keep)
            .filter(&sig);
        assert_eq!(filtered.signature.hashes, vec![2, 3]);
        assert_eq!(filtered.signature.abundances, Some(vec![20, 30]));
    }

    #[test]
    fn test_keep_policy_on_unweighted_source() {
        let filtered = session()
            .with_abundance_policy(AbundancePolicy::Keep)
            .filter(&Signature::new(31, vec![2]));
        assert!(filtered.signature.abundances.is_none());
    }

    #[test]
    fn test_filter_hashes_preserves_order() {
        assert_eq!(session().filter_hashes(&[9, 5, 3, 1, 2]), vec![9, 3, 2]);
    }

    #[test]
    fn test_empty_error_set_keeps_everything() {
        let session = FilterSession::new(ErrorSet::new(31));
        let filtered = session.filter(&Signature::new(31, vec![4, 5]));
        assert_eq!(filtered.signature.hashes, vec![4, 5]);
        assert_eq!(filtered.removed, 0);
    }
}
