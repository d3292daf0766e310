use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::core::signature::Signature;
use crate::core::types::{max_hash_for_scale, AbundancePolicy};
use crate::filtering::session::FilterSession;
use crate::filtering::FilterError;
use crate::output::materializer::Materializer;
use crate::output::OutputError;
use crate::parsing::ParseError;
use crate::utils::validation::{output_file_name, validate_thread_count};

/// Settings for filtering a batch of signature files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterOptions {
    /// Scale parameter of the written sketches; 1 keeps every hash
    pub scale: u64,
    /// Whether kept hashes carry their abundance
    pub abundance: AbundancePolicy,
    /// Number of files filtered concurrently
    pub num_threads: usize,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            scale: 1,
            abundance: AbundancePolicy::Drop,
            num_threads: 1,
        }
    }
}

impl FilterOptions {
    #[must_use]
    pub fn with_scale(mut self, scale: u64) -> Self {
        self.scale = scale;
        self
    }

    #[must_use]
    pub fn with_abundance(mut self, abundance: AbundancePolicy) -> Self {
        self.abundance = abundance;
        self
    }

    #[must_use]
    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }
}

/// Outcome for one filtered input file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub sketches: usize,
    /// Hashes written out
    pub kept: usize,
    /// Hashes removed as errors
    pub removed: usize,
    /// Non-error hashes dropped by the output scale
    pub downsampled: usize,
}

/// Filter every input into `out_dir`, one output per input named after its file name.
///
/// `out_dir` is created if missing. Outputs appear in input order in the
/// returned reports.
///
/// # Errors
///
/// Returns `FilterError::DuplicateOutput` if two inputs share a file name,
/// `FilterError::Parse` for a missing or unreadable input, and
/// `FilterError::Output` if the directory or a file cannot be written.
pub fn filter_to_directory(
    session: &FilterSession,
    paths: &[PathBuf],
    out_dir: &Path,
    options: &FilterOptions,
    materializer: &Materializer,
) -> Result<Vec<FilterReport>, FilterError> {
    let num_threads = validate_thread_count(options.num_threads)?;
    let targets = output_targets(paths, out_dir)?;

    if let Some(missing) = paths.iter().find(|path| !path.exists()) {
        return Err(ParseError::InputNotFound(missing.clone()).into());
    }

    let session = session.clone().with_abundance_policy(options.abundance);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(|i| format!("sig-cleaner-filter-{i}"))
        .build()
        .map_err(|e| FilterError::ThreadPool {
            threads: num_threads,
            reason: e.to_string(),
        })?;

    info!(
        files = paths.len(),
        threads = num_threads,
        scale = options.scale,
        out_dir = %out_dir.display(),
        "Filtering signatures"
    );

    // Every input is parsed and filtered before the first output is written
    let max_hash = max_hash_for_scale(options.scale);
    let prepared = pool.install(|| {
        paths
            .par_iter()
            .zip(targets.into_par_iter())
            .map(|(input, output)| prepare_output(&session, input, output, max_hash))
            .collect::<Result<Vec<_>, _>>()
    })?;

    std::fs::create_dir_all(out_dir).map_err(|e| OutputError::write(out_dir, e))?;

    let written = pool.install(|| {
        prepared
            .par_iter()
            .map(|output| output.write(materializer))
            .collect::<Result<Vec<_>, _>>()
    });
    let reports = match written {
        Ok(reports) => reports,
        Err(e) => {
            for output in &prepared {
                let _ = std::fs::remove_file(&output.report.output);
            }
            return Err(e);
        }
    };

    let removed: usize = reports.iter().map(|r| r.removed).sum();
    info!(files = reports.len(), removed, "Filtering finished");

    Ok(reports)
}

fn output_targets(paths: &[PathBuf], out_dir: &Path) -> Result<Vec<PathBuf>, FilterError> {
    let mut seen: HashMap<PathBuf, &PathBuf> = HashMap::new();
    let mut targets = Vec::with_capacity(paths.len());

    for input in paths {
        let output = out_dir.join(output_file_name(input)?);
        if let Some(first) = seen.insert(output.clone(), input) {
            return Err(FilterError::DuplicateOutput {
                first: first.clone(),
                second: input.clone(),
                output,
            });
        }
        targets.push(output);
    }

    Ok(targets)
}

/// Filtered signatures of one input, waiting to be written
struct PreparedOutput {
    signatures: Vec<Signature>,
    report: FilterReport,
}

impl PreparedOutput {
    fn write(&self, materializer: &Materializer) -> Result<FilterReport, FilterError> {
        materializer.write_signatures(&self.signatures, &self.report.output)?;
        Ok(self.report.clone())
    }
}

fn prepare_output(
    session: &FilterSession,
    input: &Path,
    output: PathBuf,
    max_hash: u64,
) -> Result<PreparedOutput, FilterError> {
    let filtered = session.filter_file(input)?;

    let mut removed = 0;
    let mut downsampled = 0;
    let mut signatures = Vec::with_capacity(filtered.len());
    for result in filtered {
        removed += result.removed;
        let mut signature = result.signature;
        let before = signature.len();
        signature.downsample(max_hash);
        downsampled += before - signature.len();
        signatures.push(signature);
    }

    let kept: usize = signatures.iter().map(Signature::len).sum();
    debug!(
        input = %input.display(),
        kept,
        removed,
        downsampled,
        "Filtered signature file"
    );

    Ok(PreparedOutput {
        report: FilterReport {
            input: input.to_path_buf(),
            output,
            sketches: signatures.len(),
            kept,
            removed,
            downsampled,
        },
        signatures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filtering::classifier::ErrorSet;
    use crate::parsing::sourmash::parse_signatures;

    fn write_sig(dir: &Path, name: &str, sig: Signature) -> PathBuf {
        let path = dir.join(name);
        Materializer::new().write_signatures(&[sig], &path).unwrap();
        path
    }

    #[test]
    fn test_filter_to_directory() {
        let input_dir = tempfile::tempdir().unwrap();
        let out_dir = input_dir.path().join("filtered");
        let inputs = vec![
            write_sig(input_dir.path(), "a.sig", Signature::new(31, vec![1, 2, 3])),
            write_sig(input_dir.path(), "c.sig", Signature::new(31, vec![3, 4, 5])),
        ];

        let session = FilterSession::new(ErrorSet::from_hashes(31, [1, 5]));
        let options = FilterOptions::default().with_num_threads(2);
        let reports =
            filter_to_directory(&session, &inputs, &out_dir, &options, &Materializer::new())
                .unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].output, out_dir.join("a.sig"));
        assert_eq!(reports[0].kept, 2);
        assert_eq!(reports[0].removed, 1);

        let a = parse_signatures(&out_dir.join("a.sig"), 31).unwrap();
        assert_eq!(a[0].hashes, vec![2, 3]);
        let c = parse_signatures(&out_dir.join("c.sig"), 31).unwrap();
        assert_eq!(c[0].hashes, vec![3, 4]);
    }

    #[test]
    fn test_scale_downsamples_output() {
        let dir = tempfile::tempdir().unwrap();
        let big = u64::MAX - 1;
        let inputs = vec![write_sig(dir.path(), "a.sig", Signature::new(31, vec![1, 2, big]))];

        let session = FilterSession::new(ErrorSet::from_hashes(31, [1]));
        let options = FilterOptions::default().with_scale(1000);
        let out_dir = dir.path().join("out");
        let reports =
            filter_to_directory(&session, &inputs, &out_dir, &options, &Materializer::new())
                .unwrap();

        assert_eq!(reports[0].removed, 1);
        assert_eq!(reports[0].downsampled, 1);
        let sig = &parse_signatures(&out_dir.join("a.sig"), 31).unwrap()[0];
        assert_eq!(sig.hashes, vec![2]);
        assert_eq!(sig.max_hash, u64::MAX / 1000);
    }

    #[test]
    fn test_keep_abundance_written() {
        let dir = tempfile::tempdir().unwrap();
        let sig = Signature::new(31, vec![1, 2, 3]).with_abundances(vec![7, 8, 9]);
        let inputs = vec![write_sig(dir.path(), "a.sig", sig)];

        let session = FilterSession::new(ErrorSet::from_hashes(31, [2]));
        let options = FilterOptions::default().with_abundance(AbundancePolicy::Keep);
        let out_dir = dir.path().join("out");
        filter_to_directory(&session, &inputs, &out_dir, &options, &Materializer::new()).unwrap();

        let written = &parse_signatures(&out_dir.join("a.sig"), 31).unwrap()[0];
        assert_eq!(written.hashes, vec![1, 3]);
        assert_eq!(written.abundances, Some(vec![7, 9]));
    }

    #[test]
    fn test_duplicate_file_names_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("x")).unwrap();
        std::fs::create_dir(dir.path().join("y")).unwrap();
        let inputs = vec![
            write_sig(&dir.path().join("x"), "s.sig", Signature::new(31, vec![1])),
            write_sig(&dir.path().join("y"), "s.sig", Signature::new(31, vec![2])),
        ];

        let session = FilterSession::new(ErrorSet::new(31));
        let result = filter_to_directory(
            &session,
            &inputs,
            &dir.path().join("out"),
            &FilterOptions::default(),
            &Materializer::new(),
        );
        assert!(matches!(result, Err(FilterError::DuplicateOutput { .. })));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_missing_input_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = vec![
            write_sig(dir.path(), "a.sig", Signature::new(31, vec![1])),
            dir.path().join("missing.sig"),
        ];

        let out_dir = dir.path().join("out");
        let result = filter_to_directory(
            &FilterSession::new(ErrorSet::new(31)),
            &inputs,
            &out_dir,
            &FilterOptions::default(),
            &Materializer::new(),
        );
        assert!(matches!(
            result,
            Err(FilterError::Parse(ParseError::InputNotFound(_)))
        ));
        assert!(!out_dir.exists());
    }

    #[test]
    fn test_unreadable_later_input_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = vec![
            write_sig(dir.path(), "a.sig", Signature::new(31, vec![1, 2])),
            write_sig(dir.path(), "b.sig", Signature::new(21, vec![3])),
        ];

        let out_dir = dir.path().join("out");
        let result = filter_to_directory(
            &FilterSession::new(ErrorSet::new(31)),
            &inputs,
            &out_dir,
            &FilterOptions::default(),
            &Materializer::new(),
        );
        assert!(matches!(
            result,
            Err(FilterError::Parse(ParseError::SignatureMismatch { ksize: 31, .. }))
        ));
        assert!(!out_dir.exists());
    }
}
