mod cli;
mod config;
mod demo;
mod observability;
mod output;

use anyhow::{Context, Result, anyhow};
use clap::Parser;

use cli::Cli;
use output::{print_error, write_response};

#[tokio::main]
async fn main() {
    // Load .env file if present; a missing file is fine
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound) {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    observability::init_tracing();

    match run().await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            print_error(&format!("{e:#}"));
            std::process::exit(2);
        }
    }
}

/// Runs the request and returns the process exit code.
async fn run() -> Result<i32> {
    let cli = Cli::parse();

    let cfg = config::load_config(cli.config.as_deref())
        .map_err(|e| anyhow!("Configuration error: {e}"))?;
    observability::set_level(cli.log_level.as_deref().unwrap_or(&cfg.logging.level));
    tracing::debug!(executor = ?cfg.executor, "Configuration loaded");

    let schema = demo::build_schema(cfg.executor.clone()).context("Failed to build schema")?;

    if cli.sdl {
        print!("{}", schema.sdl());
        return Ok(0);
    }

    let request = cli.request()?;
    let response = schema.execute(request).await;

    write_response(
        &response,
        cli.pretty,
        &mut std::io::stdout().lock(),
        &mut std::io::stderr().lock(),
    )
}
