//! Cohort-wide hash counting.
//!
//! Input files are split across a fixed pool of workers. Each
//! [`partition::PartitionWorker`] counts its files into a private
//! [`table::FrequencyTable`]; once every worker has finished, the fragments
//! are summed into one table. No lock is taken while counting.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sig_cleaner::counting::{CounterConfig, HashesCounter};
//! use std::path::PathBuf;
//!
//! let paths = vec![PathBuf::from("a.sig"), PathBuf::from("b.sig")];
//! let config = CounterConfig::default().with_num_threads(4);
//!
//! let mut counter = HashesCounter::new(config, paths).unwrap();
//! counter.process().unwrap();
//! println!("{} error hashes", counter.error_hashes().unwrap().len());
//! ```

use thiserror::Error;

use crate::parsing::ParseError;
use crate::utils::validation::ValidationError;

pub mod counter;
pub mod partition;
pub mod summary;
pub mod table;

pub use counter::{CounterConfig, HashesCounter};
pub use summary::CountSummary;
pub use table::FrequencyTable;

#[derive(Error, Debug)]
pub enum CountError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("No input signatures given")]
    NoInputs,

    #[error("Failed to start worker pool with {threads} threads: {reason}")]
    ThreadPool { threads: usize, reason: String },

    #[error("Counting at ksize={ksize} failed: {source}")]
    Parse {
        ksize: u32,
        #[source]
        source: ParseError,
    },

    #[error("Hashes have not been counted yet; call process() first")]
    NotProcessed,
}
