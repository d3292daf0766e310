use std::path::PathBuf;

use clap::Args;

use crate::cli::OutputFormat;
use crate::core::types::DEFAULT_KSIZE;
use crate::counting::{CountSummary, CounterConfig, HashesCounter};
use crate::filtering::classifier::DEFAULT_MAX_ERROR_COUNT;
use crate::output::materializer::{Materializer, OutputStrategy};

#[derive(Args)]
pub struct ExtractArgs {
    /// Input signature files
    #[arg(required = true, num_args = 1..)]
    pub sig_paths: Vec<PathBuf>,

    /// k-mer size of the sketches to use
    #[arg(short, long, default_value_t = DEFAULT_KSIZE)]
    pub ksize: u32,

    /// Number of worker threads
    #[arg(short = 't', long, default_value_t = 1)]
    pub num_threads: usize,

    /// Hashes seen in at most this many signatures are errors
    #[arg(long, default_value_t = DEFAULT_MAX_ERROR_COUNT)]
    pub max_count: u64,

    /// Output signature file for the error hashes (.gz to compress)
    #[arg(short, long, required = true)]
    pub output: PathBuf,
}

pub fn run(args: ExtractArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let config = CounterConfig::default()
        .with_ksize(args.ksize)
        .with_num_threads(args.num_threads)
        .with_max_error_count(args.max_count);

    let mut counter = HashesCounter::new(config, args.sig_paths)?;
    let errors = counter.process()?;
    let strategy = Materializer::new().write_error_set(errors, &args.output)?;

    if verbose {
        eprintln!(
            "Wrote {} error hashes to {} ({:?} output)",
            errors.len(),
            args.output.display(),
            strategy
        );
    }

    let summary = counter.summary()?;
    match format {
        OutputFormat::Text => print_text_summary(&summary, &args.output, strategy),
        OutputFormat::Json => print_json_summary(&summary, &args.output)?,
        OutputFormat::Tsv => print_tsv_summary(&summary),
    }

    Ok(())
}

fn print_text_summary(summary: &CountSummary, output: &std::path::Path, strategy: OutputStrategy) {
    println!("Error k-mer Extraction");
    println!("{}", "=".repeat(60));
    println!("  k-mer size: {}", summary.ksize);
    println!("  Files: {}", summary.files);
    println!("  Signatures: {}", summary.signatures);
    println!("  Total hashes: {}", summary.total_hashes);
    println!("  Distinct hashes: {}", summary.distinct_hashes);
    println!(
        "  Error hashes (count <= {}): {} ({:.2}%)",
        summary.max_error_count,
        summary.error_hashes,
        summary.error_fraction() * 100.0
    );
    println!("  Output: {}", output.display());
    if strategy == OutputStrategy::Patched {
        println!("  Output written with large-result strategy");
    }

    println!("\nFrequency spectrum:");
    println!("  {:>10}  {:>12}", "count", "hashes");
    for (count, hashes) in &summary.spectrum {
        println!("  {count:>10}  {hashes:>12}");
    }
}

fn print_json_summary(summary: &CountSummary, output: &std::path::Path) -> anyhow::Result<()> {
    let mut value = serde_json::to_value(summary)?;
    value["output"] = serde_json::Value::from(output.display().to_string());
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_tsv_summary(summary: &CountSummary) {
    println!("ksize\tfiles\tsignatures\ttotal_hashes\tdistinct_hashes\tmax_count\terror_hashes");
    println!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}",
        summary.ksize,
        summary.files,
        summary.signatures,
        summary.total_hashes,
        summary.distinct_hashes,
        summary.max_error_count,
        summary.error_hashes,
    );
}
