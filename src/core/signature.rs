use crate::core::types::{HashValue, DEFAULT_MOLECULE, DEFAULT_SEED};
use crate::utils::validation::compute_md5sum;

/// One sketch at a fixed k-mer size, as read from a signature file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Sample name from the enclosing record
    pub name: Option<String>,

    /// Source filename from the enclosing record
    pub filename: Option<String>,

    /// k-mer size the hashes were computed with
    pub ksize: u32,

    /// Largest hash value the sketch can hold (0 for num-based sketches)
    pub max_hash: u64,

    /// Hash seed
    pub seed: u64,

    /// Molecule type (DNA, protein, ...)
    pub molecule: String,

    /// Hash values in file order
    pub hashes: Vec<HashValue>,

    /// Per-hash abundances, aligned with `hashes`
    pub abundances: Option<Vec<u64>>,
}

impl Signature {
    #[must_use]
    pub fn new(ksize: u32, hashes: Vec<HashValue>) -> Self {
        Self {
            name: None,
            filename: None,
            ksize,
            max_hash: u64::MAX,
            seed: DEFAULT_SEED,
            molecule: DEFAULT_MOLECULE.to_string(),
            hashes,
            abundances: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    #[must_use]
    pub fn with_max_hash(mut self, max_hash: u64) -> Self {
        self.max_hash = max_hash;
        self
    }

    /// Attach abundances. Callers guarantee `abundances.len() == hashes.len()`.
    #[must_use]
    pub fn with_abundances(mut self, abundances: Vec<u64>) -> Self {
        self.abundances = Some(abundances);
        self
    }

    /// Same metadata with no hashes; abundance tracking is preserved
    #[must_use]
    pub fn empty_like(&self) -> Self {
        Self {
            name: self.name.clone(),
            filename: self.filename.clone(),
            ksize: self.ksize,
            max_hash: self.max_hash,
            seed: self.seed,
            molecule: self.molecule.clone(),
            hashes: Vec::new(),
            abundances: self.abundances.as_ref().map(|_| Vec::new()),
        }
    }

    /// Number of hashes in the sketch
    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    pub fn track_abundance(&self) -> bool {
        self.abundances.is_some()
    }

    /// Iterate hashes together with their abundance, if tracked.
    ///
    /// A hash past the end of a short abundance list pairs with `None`.
    pub fn iter(&self) -> impl Iterator<Item = (HashValue, Option<u64>)> + '_ {
        let abundances = self.abundances.as_deref().unwrap_or_default();
        self.hashes
            .iter()
            .zip(abundances.iter().map(Some).chain(std::iter::repeat(None)))
            .map(|(&hash, abundance)| (hash, abundance.copied()))
    }

    /// Sort hashes ascending, keeping abundances aligned.
    pub fn sort(&mut self) {
        match self.abundances.take() {
            None => self.hashes.sort_unstable(),
            Some(abundances) => {
                let mut pairs: Vec<(HashValue, u64)> =
                    self.hashes.iter().copied().zip(abundances).collect();
                pairs.sort_unstable_by_key(|&(hash, _)| hash);
                let (hashes, abundances) = pairs.into_iter().unzip();
                self.hashes = hashes;
                self.abundances = Some(abundances);
            }
        }
    }

    /// Remove every hash above `max_hash` and record the new bound.
    pub fn downsample(&mut self, max_hash: u64) {
        if max_hash == u64::MAX || (max_hash >= self.max_hash && self.max_hash != 0) {
            return;
        }
        self.max_hash = max_hash;

        match self.abundances.take() {
            None => self.hashes.retain(|&hash| hash <= max_hash),
            Some(abundances) => {
                let (hashes, abundances) = self
                    .hashes
                    .iter()
                    .copied()
                    .zip(abundances)
                    .filter(|&(hash, _)| hash <= max_hash)
                    .unzip();
                self.hashes = hashes;
                self.abundances = Some(abundances);
            }
        }
    }

    /// Sourmash-compatible checksum over the sorted hashes
    #[must_use]
    pub fn md5sum(&self) -> String {
        let mut sorted = self.hashes.clone();
        sorted.sort_unstable();
        compute_md5sum(self.ksize, &sorted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_keeps_abundances_aligned() {
        let mut sig = Signature::new(31, vec![30, 10, 20]).with_abundances(vec![3, 1, 2]);
        sig.sort();
        assert_eq!(sig.hashes, vec![10, 20, 30]);
        assert_eq!(sig.abundances, Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_downsample_drops_hashes_above_bound() {
        let mut sig = Signature::new(31, vec![5, 100, 50]).with_abundances(vec![1, 2, 3]);
        sig.downsample(50);
        assert_eq!(sig.hashes, vec![5, 50]);
        assert_eq!(sig.abundances, Some(vec![1, 3]));
        assert_eq!(sig.max_hash, 50);
    }

    #[test]
    fn test_downsample_full_space_is_noop() {
        let mut sig = Signature::new(31, vec![u64::MAX, 1]);
        sig.downsample(u64::MAX);
        assert_eq!(sig.hashes, vec![u64::MAX, 1]);
    }

    #[test]
    fn test_iter_pairs_abundance() {
        let sig = Signature::new(21, vec![7, 8]).with_abundances(vec![2, 4]);
        let pairs: Vec<_> = sig.iter().collect();
        assert_eq!(pairs, vec![(7, Some(2)), (8, Some(4))]);

        let plain = Signature::new(21, vec![7]);
        assert_eq!(plain.iter().next(), Some((7, None)));
    }

    #[test]
    fn test_iter_short_abundances_does_not_panic() {
        let mut sig = Signature::new(21, vec![1, 2, 3]);
        sig.abundances = Some(vec![5]);
        let pairs: Vec<_> = sig.iter().collect();
        assert_eq!(pairs, vec![(1, Some(5)), (2, None), (3, None)]);
    }

    #[test]
    fn test_md5sum_ignores_order() {
        let a = Signature::new(31, vec![3, 1, 2]);
        let b = Signature::new(31, vec![1, 2, 3]);
        assert_eq!(a.md5sum(), b.md5sum());
        assert_eq!(a.md5sum().len(), 32);
    }
}
