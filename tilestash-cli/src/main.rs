//! Tilestash CLI - operational commands against a document-store tile backend.

mod commands;
mod error;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use commands::Command;

/// Command-line interface to a tilestash tile store.
#[derive(Debug, Parser)]
#[command(name = "tilestash", version, about)]
struct Cli {
    /// Connection descriptor, e.g. "tilestash://?host=localhost:9200&index=tiles"
    #[arg(short, long)]
    source: String,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = commands::run(&cli.source, cli.command).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
