use std::io::BufWriter;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use crate::core::signature::Signature;
use crate::filtering::classifier::ErrorSet;
use crate::output::writer::{staging_file, write_atomically};
use crate::output::OutputError;
use crate::parsing::sourmash::{write_records, SignatureRecord};
use crate::utils::validation::compute_md5sum;

/// Sketch size at which the patched strategy takes over
pub const LARGE_RESULT_THRESHOLD: usize = 1_000_000;

/// Name given to the error-hash signature
pub const ERROR_SIGNATURE_NAME: &str = "error_kmers";

/// How a document is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStrategy {
    /// Records built in memory and serialized once
    Direct,
    /// Placeholder records serialized, then hash lists spliced into the document
    Patched,
}

impl OutputStrategy {
    /// Pick the strategy for a document whose largest sketch has `cardinality` hashes
    #[must_use]
    pub fn for_cardinality(cardinality: usize, threshold: usize) -> Self {
        if cardinality >= threshold {
            Self::Patched
        } else {
            Self::Direct
        }
    }
}

/// Writes signatures to disk, choosing a strategy by size
#[derive(Debug, Clone, Copy)]
pub struct Materializer {
    threshold: usize,
}

impl Default for Materializer {
    fn default() -> Self {
        Self::new()
    }
}

impl Materializer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            threshold: LARGE_RESULT_THRESHOLD,
        }
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn strategy_for(&self, signatures: &[Signature]) -> OutputStrategy {
        let largest = signatures.iter().map(Signature::len).max().unwrap_or(0);
        OutputStrategy::for_cardinality(largest, self.threshold)
    }

    /// Write an error set as a single unweighted sketch.
    ///
    /// # Errors
    ///
    /// Returns an `OutputError` if the file cannot be written.
    pub fn write_error_set(
        &self,
        errors: &ErrorSet,
        path: &Path,
    ) -> Result<OutputStrategy, OutputError> {
        let signature = errors.to_signature(ERROR_SIGNATURE_NAME);
        self.write_signatures(std::slice::from_ref(&signature), path)
    }

    /// Write one record per signature.
    ///
    /// # Errors
    ///
    /// Returns an `OutputError` if the file cannot be written.
    pub fn write_signatures(
        &self,
        signatures: &[Signature],
        path: &Path,
    ) -> Result<OutputStrategy, OutputError> {
        let strategy = self.strategy_for(signatures);
        match strategy {
            OutputStrategy::Direct => write_direct(signatures, path)?,
            OutputStrategy::Patched => write_patched(signatures, path)?,
        }

        info!(
            path = %path.display(),
            sketches = signatures.len(),
            hashes = signatures.iter().map(Signature::len).sum::<usize>(),
            ?strategy,
            "Wrote signature file"
        );
        Ok(strategy)
    }
}

fn write_direct(signatures: &[Signature], path: &Path) -> Result<(), OutputError> {
    let records: Vec<SignatureRecord> = signatures
        .iter()
        .map(SignatureRecord::from_signature)
        .collect();
    write_atomically(path, |w| write_records(w, &records))
}

fn write_patched(signatures: &[Signature], path: &Path) -> Result<(), OutputError> {
    let mut sorted: Vec<Signature> = signatures.to_vec();
    for signature in &mut sorted {
        signature.sort();
    }

    // Placeholders carry the metadata; hash lists are spliced in afterwards
    let placeholders: Vec<SignatureRecord> = sorted
        .iter()
        .map(|s| {
            let mut record = SignatureRecord::from_signature(&s.empty_like());
            record.signatures[0].md5sum.clear();
            record
        })
        .collect();

    let mut staged = staging_file(path)?;
    write_records(BufWriter::new(staged.as_file_mut()), &placeholders)
        .map_err(|e| OutputError::write(path, e))?;

    let bytes = std::fs::read(staged.path()).map_err(|e| OutputError::write(path, e))?;
    let mut document: Value =
        serde_json::from_slice(&bytes).map_err(|source| OutputError::Placeholder {
            path: path.to_path_buf(),
            source,
        })?;
    drop(bytes);
    drop(staged);

    for (index, signature) in sorted.into_iter().enumerate() {
        patch_sketch(&mut document, index, signature, path)?;
    }
    debug!(path = %path.display(), "Patched placeholder document");

    write_atomically(path, |w| {
        serde_json::to_writer(&mut *w, &document)?;
        w.flush()
    })
}

/// Replace `mins`, `abundances` and `md5sum` of `document[index].signatures[0]`.
/// `signature` must already be sorted.
fn patch_sketch(
    document: &mut Value,
    index: usize,
    signature: Signature,
    path: &Path,
) -> Result<(), OutputError> {
    let md5sum = compute_md5sum(signature.ksize, &signature.hashes);
    let sketch = document
        .get_mut(index)
        .and_then(|record| record.get_mut("signatures"))
        .and_then(|sketches| sketches.get_mut(0))
        .and_then(Value::as_object_mut)
        .ok_or_else(|| OutputError::InvalidPatchTarget {
            path: path.to_path_buf(),
            index,
        })?;

    sketch.insert(
        "mins".to_string(),
        Value::Array(signature.hashes.into_iter().map(Value::from).collect()),
    );
    if let Some(abundances) = signature.abundances {
        sketch.insert(
            "abundances".to_string(),
            Value::Array(abundances.into_iter().map(Value::from).collect()),
        );
    }
    sketch.insert("md5sum".to_string(), Value::from(md5sum));
    Ok(())
}
