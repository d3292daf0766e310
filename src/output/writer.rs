use std::io::{BufWriter, Write};
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::NamedTempFile;

use crate::output::OutputError;
use crate::utils::validation::has_gzip_extension;

/// Directory temporary files for `path` are created in
fn staging_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Create an empty temporary file next to `path`.
///
/// The file is removed when dropped.
///
/// # Errors
///
/// Returns `OutputError::OutputWriteFailure` if the directory is not writable.
pub fn staging_file(path: &Path) -> Result<NamedTempFile, OutputError> {
    NamedTempFile::new_in(staging_dir(path)).map_err(|e| OutputError::write(path, e))
}

/// Write `path` through a temporary file that is renamed into place on success.
///
/// Paths ending in `.gz` are gzip-compressed. If `write` fails the
/// temporary file is removed and `path` is left untouched.
///
/// # Errors
///
/// Returns `OutputError::OutputWriteFailure` if the temporary file cannot be
/// created, written or renamed.
pub fn write_atomically<F>(path: &Path, write: F) -> Result<(), OutputError>
where
    F: FnOnce(&mut dyn Write) -> std::io::Result<()>,
{
    let mut staged = staging_file(path)?;

    {
        let mut buffered = BufWriter::new(staged.as_file_mut());
        if has_gzip_extension(path) {
            let mut encoder = GzEncoder::new(&mut buffered, Compression::default());
            write(&mut encoder).map_err(|e| OutputError::write(path, e))?;
            encoder.finish().map_err(|e| OutputError::write(path, e))?;
        } else {
            write(&mut buffered).map_err(|e| OutputError::write(path, e))?;
        }
        buffered.flush().map_err(|e| OutputError::write(path, e))?;
    }

    staged
        .persist(path)
        .map_err(|e| OutputError::write(path, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_write_atomically_plain() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.sig");

        write_atomically(&path, |w| w.write_all(b"[]")).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn test_write_atomically_gzip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.sig.gz");

        write_atomically(&path, |w| w.write_all(b"[1,2]")).unwrap();

        let raw = std::fs::read(&path).unwrap();
        let mut text = String::new();
        flate2::read::GzDecoder::new(raw.as_slice())
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text, "[1,2]");
    }

    #[test]
    fn test_failed_write_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.sig");

        let result = write_atomically(&path, |_| Err(std::io::Error::other("boom")));
        assert!(matches!(result, Err(OutputError::OutputWriteFailure { .. })));
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_unwritable_directory() {
        let path = Path::new("/nonexistent/dir/out.sig");
        let result = write_atomically(path, |w| w.write_all(b"[]"));
        assert!(matches!(result, Err(OutputError::OutputWriteFailure { .. })));
    }
}
