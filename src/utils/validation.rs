//! Centralized validation and helper functions.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Gzip magic number
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Validation error types
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid thread count {0}: at least one thread is required")]
    InvalidThreadCount(usize),

    #[error("Invalid k-mer size {0}: must be greater than zero")]
    InvalidKsize(u32),

    #[error("Input path {} has no file name to derive an output name from", .0.display())]
    MissingFileName(PathBuf),
}

/// Check that a worker pool size is usable.
///
/// # Errors
///
/// Returns `ValidationError::InvalidThreadCount` if `num_threads` is zero.
pub fn validate_thread_count(num_threads: usize) -> Result<usize, ValidationError> {
    if num_threads == 0 {
        return Err(ValidationError::InvalidThreadCount(num_threads));
    }
    Ok(num_threads)
}

/// Check that a k-mer size is usable.
///
/// # Errors
///
/// Returns `ValidationError::InvalidKsize` if `ksize` is zero.
pub fn validate_ksize(ksize: u32) -> Result<u32, ValidationError> {
    if ksize == 0 {
        return Err(ValidationError::InvalidKsize(ksize));
    }
    Ok(ksize)
}

/// Returns true when `content` starts with the gzip magic number.
///
/// # Examples
///
/// ```
/// use sig_cleaner::utils::validation::is_gzip;
///
/// assert!(is_gzip(&[0x1f, 0x8b, 0x08]));
/// assert!(!is_gzip(b"[{\"signatures\": []}]"));
/// ```
#[must_use]
pub fn is_gzip(content: &[u8]) -> bool {
    content.len() >= GZIP_MAGIC.len() && content.starts_with(&GZIP_MAGIC)
}

/// Returns true when the path should be written gzip-compressed
#[must_use]
pub fn has_gzip_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gz"))
}

/// Compute the sourmash checksum of a sketch.
///
/// The checksum is the MD5 of the decimal k-mer size followed by every hash
/// in decimal, with no separators. `sorted_hashes` must be ascending.
#[must_use]
pub fn compute_md5sum(ksize: u32, sorted_hashes: &[u64]) -> String {
    let mut context = md5::Context::new();
    context.consume(ksize.to_string().as_bytes());
    for hash in sorted_hashes {
        context.consume(hash.to_string().as_bytes());
    }
    format!("{:x}", context.compute())
}

/// File name an input signature keeps when written into an output directory.
///
/// # Errors
///
/// Returns `ValidationError::MissingFileName` for paths such as `/` or `..`.
pub fn output_file_name(input: &Path) -> Result<OsString, ValidationError> {
    input
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .ok_or_else(|| ValidationError::MissingFileName(input.to_path_buf()))
}
