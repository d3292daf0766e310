use clap::Parser;
use tracing_subscriber::EnvFilter;

use sig_cleaner::cli;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("sig_cleaner=debug,info")
    } else {
        EnvFilter::new("sig_cleaner=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        cli::Commands::Extract(args) => {
            cli::extract::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::FilterSigs(args) => {
            cli::filter::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
