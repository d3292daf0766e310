//! Error classification and signature filtering.
//!
//! - [`classifier`]: turns a merged frequency table into an [`ErrorSet`]
//! - [`session`]: removes error hashes from individual signatures
//! - [`batch`]: filters many signature files into an output directory
//!
//! A [`FilterSession`] is built once per error set and shared read-only by
//! every filtering call, so files can be filtered in parallel.

use std::path::PathBuf;

use thiserror::Error;

use crate::output::OutputError;
use crate::parsing::ParseError;
use crate::utils::validation::ValidationError;

pub mod batch;
pub mod classifier;
pub mod session;

pub use batch::{FilterOptions, FilterReport};
pub use classifier::{ErrorClassifier, ErrorSet};
pub use session::{FilterSession, FilteredSignature};

#[derive(Error, Debug)]
pub enum FilterError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("Failed to start worker pool with {threads} threads: {reason}")]
    ThreadPool { threads: usize, reason: String },

    #[error("Inputs {} and {} would both be written to {}", first.display(), second.display(), output.display())]
    DuplicateOutput {
        first: PathBuf,
        second: PathBuf,
        output: PathBuf,
    },
}
