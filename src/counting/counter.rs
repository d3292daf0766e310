use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::core::types::DEFAULT_KSIZE;
use crate::counting::partition::{partition_paths, PartitionWorker};
use crate::counting::summary::CountSummary;
use crate::counting::table::FrequencyTable;
use crate::counting::CountError;
use crate::filtering::classifier::{ErrorClassifier, ErrorSet, DEFAULT_MAX_ERROR_COUNT};
use crate::filtering::session::{FilterSession, FilteredSignature};
use crate::parsing::ParseError;
use crate::utils::validation::{validate_ksize, validate_thread_count};

/// Settings for one counting run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterConfig {
    /// k-mer size of the sketches to count
    pub ksize: u32,
    /// Number of partition workers
    pub num_threads: usize,
    /// Hashes with a cohort-wide count at or below this are errors
    pub max_error_count: u64,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            ksize: DEFAULT_KSIZE,
            num_threads: 1,
            max_error_count: DEFAULT_MAX_ERROR_COUNT,
        }
    }
}

impl CounterConfig {
    #[must_use]
    pub fn with_ksize(mut self, ksize: u32) -> Self {
        self.ksize = ksize;
        self
    }

    #[must_use]
    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }

    #[must_use]
    pub fn with_max_error_count(mut self, max_error_count: u64) -> Self {
        self.max_error_count = max_error_count;
        self
    }
}

/// Counts hashes across a cohort of signature files and derives the error set.
///
/// Call [`HashesCounter::process`] once; afterwards the table, error set and
/// filtering session are available.
#[derive(Debug)]
pub struct HashesCounter {
    config: CounterConfig,
    sig_paths: Vec<PathBuf>,
    table: Option<FrequencyTable>,
    errors: Option<Arc<ErrorSet>>,
}

impl HashesCounter {
    /// Validate the configuration. No file is touched yet.
    ///
    /// # Errors
    ///
    /// Returns `CountError::Validation` for a zero thread count or k-mer size,
    /// or `CountError::NoInputs` if `sig_paths` is empty.
    pub fn new(config: CounterConfig, sig_paths: Vec<PathBuf>) -> Result<Self, CountError> {
        validate_ksize(config.ksize)?;
        validate_thread_count(config.num_threads)?;
        if sig_paths.is_empty() {
            return Err(CountError::NoInputs);
        }

        Ok(Self {
            config,
            sig_paths,
            table: None,
            errors: None,
        })
    }

    pub fn config(&self) -> &CounterConfig {
        &self.config
    }

    pub fn sig_paths(&self) -> &[PathBuf] {
        &self.sig_paths
    }

    /// Count every input and classify the merged table.
    ///
    /// # Errors
    ///
    /// Returns `CountError::Parse` if any input is missing, unreadable or has
    /// no sketch at the configured k-mer size, or `CountError::ThreadPool` if
    /// the worker pool cannot be started. Nothing is kept from a failed run.
    pub fn process(&mut self) -> Result<&ErrorSet, CountError> {
        let ksize = self.config.ksize;
        check_inputs_exist(&self.sig_paths).map_err(|source| CountError::Parse { ksize, source })?;

        let table = count_hashes(&self.sig_paths, ksize, self.config.num_threads)?;
        let errors = ErrorClassifier::new(self.config.max_error_count).classify(&table, ksize);

        self.table = Some(table);
        let errors = self.errors.insert(Arc::new(errors));
        Ok(&**errors)
    }

    /// Merged counts, once processed
    pub fn frequency_table(&self) -> Option<&FrequencyTable> {
        self.table.as_ref()
    }

    /// The error set.
    ///
    /// # Errors
    ///
    /// Returns `CountError::NotProcessed` before [`HashesCounter::process`].
    pub fn error_hashes(&self) -> Result<&ErrorSet, CountError> {
        self.errors.as_deref().ok_or(CountError::NotProcessed)
    }

    /// Start a filtering session over the error set.
    ///
    /// # Errors
    ///
    /// Returns `CountError::NotProcessed` before [`HashesCounter::process`].
    pub fn initialize_sigs_filtration(&self) -> Result<FilterSession, CountError> {
        let errors = self.errors.clone().ok_or(CountError::NotProcessed)?;
        Ok(FilterSession::new(errors))
    }

    /// Filter one signature file against the error set.
    ///
    /// # Errors
    ///
    /// Returns `CountError::NotProcessed` before processing, or
    /// `CountError::Parse` if the file cannot be read.
    pub fn filter_sig(&self, path: &Path) -> Result<Vec<FilteredSignature>, CountError> {
        let ksize = self.config.ksize;
        self.initialize_sigs_filtration()?
            .filter_file(path)
            .map_err(|source| CountError::Parse { ksize, source })
    }

    /// Run figures.
    ///
    /// # Errors
    ///
    /// Returns `CountError::NotProcessed` before [`HashesCounter::process`].
    pub fn summary(&self) -> Result<CountSummary, CountError> {
        let table = self.table.as_ref().ok_or(CountError::NotProcessed)?;
        let errors = self.error_hashes()?;
        Ok(CountSummary::new(
            self.config.ksize,
            self.sig_paths.len(),
            self.config.max_error_count,
            table,
            errors,
        ))
    }
}

/// Fail fast on missing inputs before any worker is scheduled
fn check_inputs_exist(paths: &[PathBuf]) -> Result<(), ParseError> {
    match paths.iter().find(|path| !path.exists()) {
        Some(missing) => Err(ParseError::InputNotFound(missing.clone())),
        None => Ok(()),
    }
}

/// Count the hashes of every sketch at `ksize` in `paths` using `num_threads` workers.
///
/// Each worker fills a private table; the fragments are summed after all
/// workers finish. The result is the same for any worker count.
///
/// # Errors
///
/// Returns `CountError::Validation` for a zero thread count,
/// `CountError::ThreadPool` if the pool cannot be built, or
/// `CountError::Parse` for the first file that fails to parse.
pub fn count_hashes(
    paths: &[PathBuf],
    ksize: u32,
    num_threads: usize,
) -> Result<FrequencyTable, CountError> {
    let num_threads = validate_thread_count(num_threads)?;
    let start = Instant::now();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(|i| format!("sig-cleaner-worker-{i}"))
        .build()
        .map_err(|e| CountError::ThreadPool {
            threads: num_threads,
            reason: e.to_string(),
        })?;

    let partitions = partition_paths(paths, num_threads);
    info!(
        files = paths.len(),
        workers = partitions.len(),
        ksize,
        "Counting hashes"
    );

    let fragments: Vec<FrequencyTable> = pool
        .install(|| {
            partitions
                .par_iter()
                .enumerate()
                .map(|(index, group)| PartitionWorker::new(index, group, ksize).run())
                .collect::<Result<Vec<_>, _>>()
        })
        .map_err(|source| CountError::Parse { ksize, source })?;

    debug!(fragments = fragments.len(), "All workers finished, merging");
    let table = FrequencyTable::merge_all(fragments);

    info!(
        signatures = table.signatures(),
        distinct = table.len(),
        elapsed = ?start.elapsed(),
        "Merged hash counts"
    );

    Ok(table)
}
