use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::signature::Signature;
use crate::core::types::{HashValue, DEFAULT_MOLECULE, DEFAULT_SEED, HASH_FUNCTION};
use crate::utils::validation::is_gzip;

/// Record class written by sourmash
pub const SIGNATURE_CLASS: &str = "sourmash_signature";

/// Signature format version written by sourmash
pub const SIGNATURE_VERSION: f64 = 0.4;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Input signature not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Failed to read signature file {}: {source}", path.display())]
    UnreadableFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid signature file {}: {reason}", path.display())]
    InvalidFormat { path: PathBuf, reason: String },

    #[error("No sketch with ksize={ksize} in {}", path.display())]
    SignatureMismatch { path: PathBuf, ksize: u32 },
}

impl ParseError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::InputNotFound(path.to_path_buf())
        } else {
            Self::UnreadableFile {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    fn invalid(path: &Path, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

/// One entry of the top-level JSON array of a signature file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureRecord {
    #[serde(default = "default_class")]
    pub class: String,

    #[serde(default)]
    pub email: String,

    #[serde(default = "default_hash_function")]
    pub hash_function: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default = "default_license")]
    pub license: String,

    pub signatures: Vec<SketchRecord>,

    #[serde(default = "default_version")]
    pub version: f64,
}

/// One sketch inside a record's `signatures` array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SketchRecord {
    #[serde(default)]
    pub num: u32,

    pub ksize: u32,

    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default)]
    pub max_hash: u64,

    #[serde(default)]
    pub mins: Vec<HashValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abundances: Option<Vec<u64>>,

    #[serde(default)]
    pub md5sum: String,

    #[serde(default = "default_molecule")]
    pub molecule: String,
}

fn default_class() -> String {
    SIGNATURE_CLASS.to_string()
}

fn default_hash_function() -> String {
    HASH_FUNCTION.to_string()
}

fn default_license() -> String {
    "CC0".to_string()
}

fn default_version() -> f64 {
    SIGNATURE_VERSION
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_molecule() -> String {
    DEFAULT_MOLECULE.to_string()
}

/// A file holds either an array of records or a single bare record
#[derive(Deserialize)]
#[serde(untagged)]
enum RecordDocument {
    Many(Vec<SignatureRecord>),
    One(SignatureRecord),
}

impl SignatureRecord {
    /// Build a record holding one sketch. Hashes are written sorted.
    #[must_use]
    pub fn from_signature(signature: &Signature) -> Self {
        let mut sorted = signature.clone();
        sorted.sort();
        let md5sum = sorted.md5sum();

        Self {
            class: default_class(),
            email: String::new(),
            hash_function: default_hash_function(),
            filename: sorted.filename,
            name: sorted.name,
            license: default_license(),
            signatures: vec![SketchRecord {
                num: 0,
                ksize: sorted.ksize,
                seed: sorted.seed,
                max_hash: sorted.max_hash,
                mins: sorted.hashes,
                abundances: sorted.abundances,
                md5sum,
                molecule: sorted.molecule,
            }],
            version: SIGNATURE_VERSION,
        }
    }
}

/// Read every record of a signature file, gzip-compressed or not.
///
/// # Errors
///
/// Returns `ParseError::InputNotFound` if the file does not exist,
/// `ParseError::UnreadableFile` if it cannot be read or decompressed, or
/// `ParseError::InvalidFormat` if the content is not a signature document.
pub fn read_records(path: &Path) -> Result<Vec<SignatureRecord>, ParseError> {
    let raw = std::fs::read(path).map_err(|e| ParseError::io(path, e))?;

    let content = if is_gzip(&raw) {
        let mut decoded = Vec::with_capacity(raw.len() * 4);
        GzDecoder::new(raw.as_slice())
            .read_to_end(&mut decoded)
            .map_err(|e| ParseError::io(path, e))?;
        decoded
    } else {
        raw
    };

    let document: RecordDocument =
        serde_json::from_slice(&content).map_err(|e| ParseError::invalid(path, e.to_string()))?;

    Ok(match document {
        RecordDocument::Many(records) => records,
        RecordDocument::One(record) => vec![record],
    })
}

/// Parse every sketch at `ksize` in a signature file.
///
/// Each matching sketch of each record becomes its own [`Signature`].
///
/// # Errors
///
/// Returns any error from [`read_records`], `ParseError::InvalidFormat` if a
/// sketch's abundances do not line up with its hashes, or
/// `ParseError::SignatureMismatch` if no sketch has the requested k-mer size.
pub fn parse_signatures(path: &Path, ksize: u32) -> Result<Vec<Signature>, ParseError> {
    let records = read_records(path)?;
    let mut signatures = Vec::new();

    for record in records {
        for sketch in record.signatures {
            if sketch.ksize != ksize {
                continue;
            }

            if let Some(abundances) = &sketch.abundances {
                if abundances.len() != sketch.mins.len() {
                    return Err(ParseError::invalid(
                        path,
                        format!(
                            "sketch has {} hashes but {} abundances",
                            sketch.mins.len(),
                            abundances.len()
                        ),
                    ));
                }
            }

            if sketch.mins.is_empty() {
                warn!(path = %path.display(), ksize, "Sketch has no hashes");
            }

            signatures.push(Signature {
                name: record.name.clone(),
                filename: record.filename.clone(),
                ksize: sketch.ksize,
                max_hash: sketch.max_hash,
                seed: sketch.seed,
                molecule: sketch.molecule,
                hashes: sketch.mins,
                abundances: sketch.abundances,
            });
        }
    }

    if signatures.is_empty() {
        return Err(ParseError::SignatureMismatch {
            path: path.to_path_buf(),
            ksize,
        });
    }

    debug!(
        path = %path.display(),
        ksize,
        sketches = signatures.len(),
        "Parsed signature file"
    );

    Ok(signatures)
}

/// Parse the hash values of every sketch at `ksize`, in file order.
///
/// # Errors
///
/// Same as [`parse_signatures`].
pub fn parse_hashes(path: &Path, ksize: u32) -> Result<Vec<HashValue>, ParseError> {
    let signatures = parse_signatures(path, ksize)?;
    Ok(signatures.into_iter().flat_map(|s| s.hashes).collect())
}

/// Serialize records as a JSON array.
///
/// # Errors
///
/// Returns an I/O error if serialization or the underlying write fails.
pub fn write_records<W: Write>(mut writer: W, records: &[SignatureRecord]) -> std::io::Result<()> {
    serde_json::to_writer(&mut writer, records)?;
    writer.flush()
}
