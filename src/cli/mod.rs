//! Command-line interface for sig-cleaner.
//!
//! Available commands:
//!
//! - **extract**: Count hashes across signatures and write the error hashes
//! - **filter-sigs**: Remove error hashes from each signature
//!
//! ## Usage
//!
//! ```text
//! # Find hashes seen in only one of the samples
//! sig-cleaner extract --ksize 31 --num-threads 8 --output errors.sig samples/*.sig
//!
//! # Strip them from every sample
//! sig-cleaner filter-sigs --errors errors.sig --output-dir cleaned/ samples/*.sig
//!
//! # JSON summary for scripting
//! sig-cleaner --format json extract --output errors.sig samples/*.sig
//! ```

use clap::{Parser, Subcommand};

pub mod extract;
pub mod filter;

#[derive(Parser)]
#[command(name = "sig-cleaner")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Remove likely-erroneous k-mers from sketch signatures")]
#[command(
    long_about = "sig-cleaner counts every hash across a cohort of sourmash signatures and treats hashes seen in too few signatures as sequencing errors.\n\nIt can:\n- Extract the error hashes into a signature file\n- Filter each input signature against a previously extracted error signature"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Count hashes across signatures and write the error hashes
    Extract(extract::ExtractArgs),

    /// Remove error hashes from each input signature
    #[command(name = "filter-sigs", alias = "filter_sigs")]
    FilterSigs(filter::FilterArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
