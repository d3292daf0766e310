//! # sig-cleaner
//!
//! A library for removing likely-erroneous k-mers from sourmash sketch signatures.
//!
//! Sequencing errors produce k-mers that show up in a single sample and
//! nowhere else, while true biological signal recurs across independent
//! samples. `sig-cleaner` counts every hash across a cohort of signatures,
//! classifies hashes whose cohort-wide count is at or below a threshold as
//! errors, and strips them from each signature.
//!
//! ## Features
//!
//! - **Parallel counting**: Input files are split across a fixed worker pool; each worker counts privately and fragments are summed once all finish
//! - **Configurable threshold**: Hashes seen in at most `max_count` signatures are errors (default 1)
//! - **Sourmash-compatible I/O**: Reads and writes JSON signature files, gzip-compressed or not
//! - **Large results**: Sketches with a million or more hashes are written by patching a placeholder document
//! - **Atomic output**: Files are staged and renamed into place
//!
//! ## Example
//!
//! ```rust,no_run
//! use sig_cleaner::{CounterConfig, HashesCounter, Materializer};
//! use std::path::{Path, PathBuf};
//!
//! let paths: Vec<PathBuf> = vec!["a.sig".into(), "b.sig".into(), "c.sig".into()];
//! let config = CounterConfig::default().with_ksize(31).with_num_threads(4);
//!
//! let mut counter = HashesCounter::new(config, paths.clone()).unwrap();
//! let errors = counter.process().unwrap();
//! Materializer::new().write_error_set(errors, Path::new("errors.sig")).unwrap();
//!
//! let session = counter.initialize_sigs_filtration().unwrap();
//! for filtered in session.filter_file(&paths[0]).unwrap() {
//!     println!("kept {} removed {}", filtered.kept(), filtered.removed);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Hash and signature types
//! - [`parsing`]: Signature file reader and writer
//! - [`counting`]: Partition workers, frequency table and the hash counter
//! - [`filtering`]: Error classification and signature filtering
//! - [`output`]: Size-aware, atomic signature output
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod counting;
pub mod filtering;
pub mod output;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use crate::core::signature::Signature;
pub use crate::core::types::*;
pub use counting::{CountError, CounterConfig, FrequencyTable, HashesCounter};
pub use filtering::{ErrorClassifier, ErrorSet, FilterOptions, FilterSession, FilteredSignature};
pub use output::materializer::{Materializer, OutputStrategy};
pub use parsing::ParseError;
