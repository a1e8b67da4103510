use anyhow::Result;
use clap::Parser;
use rover_blockgen_core::cli::Args;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // Stdout may carry the generated program, so logs go to stderr.
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    rover_blockgen_core::run_cli(&args)
}
