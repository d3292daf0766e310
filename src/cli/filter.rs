use std::path::PathBuf;

use clap::Args;

use crate::cli::OutputFormat;
use crate::core::types::{AbundancePolicy, DEFAULT_KSIZE};
use crate::filtering::batch::{filter_to_directory, FilterOptions, FilterReport};
use crate::filtering::classifier::ErrorSet;
use crate::filtering::session::FilterSession;
use crate::output::materializer::Materializer;

#[derive(Args)]
pub struct FilterArgs {
    /// Input signature files to filter
    #[arg(required = true, num_args = 1..)]
    pub sig_paths: Vec<PathBuf>,

    /// Error signature written by `extract`
    #[arg(short, long, required = true)]
    pub errors: PathBuf,

    /// k-mer size of the sketches to use
    #[arg(short, long, default_value_t = DEFAULT_KSIZE)]
    pub ksize: u32,

    /// Scale parameter of the written sketches (1 keeps every hash)
    #[arg(short, long, default_value_t = 1)]
    pub scale: u64,

    /// Carry source abundances forward for kept hashes
    #[arg(long)]
    pub keep_abundance: bool,

    /// Number of files filtered concurrently
    #[arg(short = 't', long, default_value_t = 1)]
    pub num_threads: usize,

    /// Directory the filtered signatures are written to (created if missing)
    #[arg(short, long, required = true)]
    pub output_dir: PathBuf,
}

pub fn run(args: FilterArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let errors = ErrorSet::load(&args.errors, args.ksize)?;

    if verbose {
        eprintln!(
            "Loaded {} error hashes from {}",
            errors.len(),
            args.errors.display()
        );
    }

    let abundance = if args.keep_abundance {
        AbundancePolicy::Keep
    } else {
        AbundancePolicy::Drop
    };
    let options = FilterOptions::default()
        .with_scale(args.scale)
        .with_abundance(abundance)
        .with_num_threads(args.num_threads);

    let session = FilterSession::new(errors);
    let reports = filter_to_directory(
        &session,
        &args.sig_paths,
        &args.output_dir,
        &options,
        &Materializer::new(),
    )?;

    match format {
        OutputFormat::Text => print_text_reports(&reports),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        OutputFormat::Tsv => print_tsv_reports(&reports),
    }

    Ok(())
}

fn print_text_reports(reports: &[FilterReport]) {
    println!("Signature Filtering");
    println!("{}", "=".repeat(60));
    for report in reports {
        println!("\n{}", report.input.display());
        println!("  Output: {}", report.output.display());
        println!("  Kept: {}", report.kept);
        println!("  Removed: {}", report.removed);
        if report.downsampled > 0 {
            println!("  Dropped by scale: {}", report.downsampled);
        }
    }

    let removed: usize = reports.iter().map(|r| r.removed).sum();
    println!("\nRemoved {removed} error hashes from {} files", reports.len());
}

fn print_tsv_reports(reports: &[FilterReport]) {
    println!("input\toutput\tsketches\tkept\tremoved\tdownsampled");
    for report in reports {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            report.input.display(),
            report.output.display(),
            report.sketches,
            report.kept,
            report.removed,
            report.downsampled,
        );
    }
}
