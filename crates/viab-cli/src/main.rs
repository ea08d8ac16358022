use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{LogFormat, ViabCli};

const DEFAULT_FILTER: &str = "viab=info,viab_core=info,viab_calculator=info";

fn init_tracing(format: LogFormat, verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("viab=debug,viab_core=debug,viab_calculator=debug")
        } else {
            EnvFilter::new(DEFAULT_FILTER)
        }
    });

    // Reports go to stdout, so logs stay on stderr.
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = ViabCli::parse();
    init_tracing(cli.log_format, cli.verbose);

    debug!(version = env!("CARGO_PKG_VERSION"), "Starting viab");

    cli.execute()
}
