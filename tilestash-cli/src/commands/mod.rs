//! CLI commands against a tile store.
//!
//! Every command opens the adapter through the protocol registry, so the
//! same connection descriptors work here as in the host framework
//! (`tilestash://?host=...&index=...`, or `memory:` for a scratch store).

use std::path::{Path, PathBuf};

use clap::Subcommand;
use tracing::debug;

use tilestash::{register_protocols, GetRequest, GetResponse, Registry, TileStoreAdapter};

use crate::error::CliError;

/// Tile store operations.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check connectivity to the store
    Ping,
    /// Fetch a tile and write its bytes to a file or stdout
    Get {
        z: u8,
        x: u32,
        y: u32,
        /// Output file; defaults to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Store a tile from a file
    Put {
        z: u8,
        x: u32,
        y: u32,
        /// File holding the tile payload
        file: PathBuf,
    },
    /// Delete a tile
    Rm { z: u8, x: u32, y: u32 },
    /// Read or write the tileset info document
    Info {
        #[command(subcommand)]
        action: InfoAction,
    },
}

/// Info document subcommands.
#[derive(Debug, Subcommand)]
pub enum InfoAction {
    /// Print the info document (or the synthesized default) as JSON
    Get,
    /// Store an info document from a JSON file
    Set { file: PathBuf },
}

/// Open an initialized adapter for the given connection descriptor.
async fn open(source: &str) -> Result<TileStoreAdapter, CliError> {
    let mut registry = Registry::new();
    register_protocols(&mut registry);
    debug!(source, "opening tile store");
    Ok(registry.open(source).await?)
}

/// Run a command against the store at `source`.
pub async fn run(source: &str, command: Command) -> Result<(), CliError> {
    let adapter = open(source).await?;

    match command {
        Command::Ping => {
            // `open` already chained the liveness probe.
            println!("{} is reachable", adapter.config().host);
            Ok(())
        }
        Command::Get { z, x, y, output } => get(&adapter, z, x, y, output.as_deref()).await,
        Command::Put { z, x, y, file } => {
            let payload = std::fs::read(&file)?;
            adapter.put_tile(z, x, y, Some(payload)).await?;
            println!("stored {}/{}/{}", z, x, y);
            Ok(())
        }
        Command::Rm { z, x, y } => {
            adapter.put_tile(z, x, y, None).await?;
            println!("deleted {}/{}/{}", z, x, y);
            Ok(())
        }
        Command::Info { action } => info(&adapter, action).await,
    }
}

async fn get(
    adapter: &TileStoreAdapter,
    z: u8,
    x: u32,
    y: u32,
    output: Option<&Path>,
) -> Result<(), CliError> {
    match adapter.get(GetRequest::tile(z, x, y)).await {
        Ok(GetResponse::Tile { data, .. }) => {
            match output {
                Some(path) => std::fs::write(path, &data)?,
                None => {
                    use std::io::Write as _;
                    std::io::stdout().write_all(&data)?;
                }
            }
            Ok(())
        }
        Ok(GetResponse::Info { .. }) => unreachable!("tile request cannot yield info"),
        // A miss is a normal negative result, not a command failure.
        Err(e) if e.is_no_tile() => {
            eprintln!("tile {}/{}/{} does not exist", z, x, y);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

async fn info(adapter: &TileStoreAdapter, action: InfoAction) -> Result<(), CliError> {
    match action {
        InfoAction::Get => {
            let response = adapter.get(GetRequest::Info).await?;
            if let GetResponse::Info { data } = response {
                println!("{}", serde_json::to_string_pretty(&data).map_err(|e| CliError::Json(e.to_string()))?);
            }
            Ok(())
        }
        InfoAction::Set { file } => {
            let raw = std::fs::read(&file)?;
            let value = serde_json::from_slice(&raw).map_err(|e| CliError::Json(e.to_string()))?;
            adapter.put_info(&value).await?;
            println!("info document stored");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[tokio::test]
    async fn test_run_against_memory_store() {
        let mut payload = tempfile::NamedTempFile::new().unwrap();
        payload.write_all(b"abc").unwrap();

        // Each command opens a fresh memory store, so only commands that
        // tolerate an empty store are exercised end to end here.
        run("memory:", Command::Ping).await.unwrap();
        run(
            "memory:",
            Command::Put {
                z: 0,
                x: 0,
                y: 0,
                file: payload.path().to_path_buf(),
            },
        )
        .await
        .unwrap();
        run("memory:", Command::Rm { z: 0, x: 0, y: 0 }).await.unwrap();
        run("memory:", Command::Info { action: InfoAction::Get })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_info_set_rejects_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not json").unwrap();

        let err = run(
            "memory:",
            Command::Info {
                action: InfoAction::Set {
                    file: file.path().to_path_buf(),
                },
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CliError::Json(_)));
    }

    #[tokio::test]
    async fn test_unknown_scheme_is_an_error() {
        let err = run("bogus://?host=h&index=i", Command::Ping).await.unwrap_err();
        assert!(matches!(err, CliError::Tile(_)));
    }
}
