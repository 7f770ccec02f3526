//! CLI error types.

use std::fmt;

use tilestash::TileError;

/// Errors that can occur while running a CLI command.
#[derive(Debug)]
pub enum CliError {
    /// Adapter or store operation failed.
    Tile(TileError),

    /// Reading or writing a local file failed.
    Io(String),

    /// A JSON argument or file could not be parsed.
    Json(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Tile(e) => write!(f, "{}", e),
            CliError::Io(msg) => write!(f, "I/O error: {}", msg),
            CliError::Json(msg) => write!(f, "Invalid JSON: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Tile(e) => Some(e),
            CliError::Io(_) | CliError::Json(_) => None,
        }
    }
}

impl From<TileError> for CliError {
    fn from(e: TileError) -> Self {
        CliError::Tile(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}
