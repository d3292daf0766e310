use std::path::{Path, PathBuf};

use tracing::debug;

use crate::counting::table::FrequencyTable;
use crate::parsing::sourmash::parse_signatures;
use crate::parsing::ParseError;

/// Split `paths` into at most `num_workers` contiguous, non-empty groups.
///
/// Group sizes differ by at most one file. With fewer files than workers,
/// one group per file is returned.
#[must_use]
pub fn partition_paths(paths: &[PathBuf], num_workers: usize) -> Vec<&[PathBuf]> {
    if paths.is_empty() || num_workers == 0 {
        return Vec::new();
    }

    let groups = num_workers.min(paths.len());
    let base = paths.len() / groups;
    let remainder = paths.len() % groups;

    let mut partitions = Vec::with_capacity(groups);
    let mut start = 0;
    for i in 0..groups {
        let size = base + usize::from(i < remainder);
        partitions.push(&paths[start..start + size]);
        start += size;
    }
    partitions
}

/// Counts the hashes of one group of signature files into a private table
pub struct PartitionWorker<'a> {
    index: usize,
    paths: &'a [PathBuf],
    ksize: u32,
}

impl<'a> PartitionWorker<'a> {
    pub fn new(index: usize, paths: &'a [PathBuf], ksize: u32) -> Self {
        Self {
            index,
            paths,
            ksize,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn paths(&self) -> &[PathBuf] {
        self.paths
    }

    /// Scan every assigned file and return the local counts.
    ///
    /// Each signature is dropped as soon as its hashes are counted.
    ///
    /// # Errors
    ///
    /// Returns the first `ParseError` hit; the fragment is discarded.
    pub fn run(&self) -> Result<FrequencyTable, ParseError> {
        let mut table = FrequencyTable::new();

        for path in self.paths {
            self.count_file(path, &mut table)?;
        }

        debug!(
            worker = self.index,
            files = self.paths.len(),
            distinct = table.len(),
            "Worker finished"
        );

        Ok(table)
    }

    fn count_file(&self, path: &Path, table: &mut FrequencyTable) -> Result<(), ParseError> {
        for signature in parse_signatures(path, self.ksize)? {
            table.add_signature(&signature.hashes);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(n: usize) -> Vec<PathBuf> {
        (0..n).map(|i| PathBuf::from(format!("{i}.sig"))).collect()
    }

    #[test]
    fn test_partition_even_split() {
        let files = paths(10);
        let parts = partition_paths(&files, 3);
        let sizes: Vec<usize> = parts.iter().map(|p| p.len()).collect();
        assert_eq!(sizes, vec![4, 3, 3]);

        let rejoined: Vec<PathBuf> = parts.iter().flat_map(|p| p.iter().cloned()).collect();
        assert_eq!(rejoined, files);
    }

    #[test]
    fn test_partition_more_workers_than_files() {
        let files = paths(2);
        let parts = partition_paths(&files, 8);
        assert_eq!(parts.len(), 2);
        assert!(parts.iter().all(|p| p.len() == 1));
    }

    #[test]
    fn test_partition_single_worker() {
        let files = paths(5);
        let parts = partition_paths(&files, 1);
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].len(), 5);
    }

    #[test]
    fn test_partition_empty() {
        assert!(partition_paths(&[], 4).is_empty());
        assert!(partition_paths(&paths(3), 0).is_empty());
    }

    #[test]
    fn test_worker_propagates_missing_file() {
        let files = vec![PathBuf::from("/nonexistent/a.sig")];
        let worker = PartitionWorker::new(0, &files, 31);
        assert!(matches!(worker.run(), Err(ParseError::InputNotFound(_))));
    }
}
