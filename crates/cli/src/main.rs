//! # cupom: A CLI for receipt extraction
//!
//! Runs the extractor directly against a vision model server (`process`) or
//! uploads an image to a running `cupom-server` (`send`).

mod api_client;
mod image;
mod process;
mod ui;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract a receipt locally by calling the model server directly
    Process(process::ProcessArgs),
    /// Upload a receipt image to a running cupom server
    Send(api_client::SendArgs),
}

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only the extracted JSON.
    let subscriber = fmt::Subscriber::builder()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Process(args) => process::handle_process(args)
            .await
            .map_err(|e| e.context("Process failed")),
        Commands::Send(args) => api_client::handle_send(args)
            .await
            .map_err(|e| e.context("Send failed")),
    };

    if let Err(e) = result {
        eprintln!("{e:#}");
        std::process::exit(1);
    }

    Ok(())
}
