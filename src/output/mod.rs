//! Writing error sets and filtered signatures to signature files.
//!
//! Two strategies produce the same on-disk document:
//!
//! - **Direct**: build the records in memory and serialize them.
//! - **Patched**: serialize placeholder records with empty `mins`, then
//!   splice the real hashes into `signatures[0].mins` of the parsed
//!   document. Used for sketches with at least
//!   [`materializer::LARGE_RESULT_THRESHOLD`] hashes.
//!
//! Every file is written to a temporary file in the destination directory
//! and renamed into place, so a failed run never leaves a truncated output.

use std::path::PathBuf;

use thiserror::Error;

pub mod materializer;
pub mod writer;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write {}: {source}", path.display())]
    OutputWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to re-read placeholder for {}: {source}", path.display())]
    Placeholder {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Placeholder for {} has no sketch at record {index}", path.display())]
    InvalidPatchTarget { path: PathBuf, index: usize },
}

impl OutputError {
    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::OutputWriteFailure {
            path: path.into(),
            source,
        }
    }
}
