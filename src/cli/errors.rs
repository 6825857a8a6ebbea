//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit code.

use std::io;

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::store::StoreError;

/// CLI error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Config file unreadable or invalid
    ConfigError,
    /// Reading input files or writing to stdout
    IoError,
    /// `init` on a data directory that already holds a snapshot
    AlreadyInitialized,
    /// Store missing for a command that needs one
    NotInitialized,
    /// Runtime or HTTP listener could not start
    BootFailed,
    /// Snapshot could not be opened or written
    StoreError,
    /// Catalog rejected an operation
    CatalogError,
}

impl CliErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "WALKDB_CLI_CONFIG_ERROR",
            Self::IoError => "WALKDB_CLI_IO_ERROR",
            Self::AlreadyInitialized => "WALKDB_CLI_ALREADY_INITIALIZED",
            Self::NotInitialized => "WALKDB_CLI_NOT_INITIALIZED",
            Self::BootFailed => "WALKDB_CLI_BOOT_FAILED",
            Self::StoreError => "WALKDB_CLI_STORE_ERROR",
            Self::CatalogError => "WALKDB_CLI_CATALOG_ERROR",
        }
    }
}

#[derive(Debug, Error)]
#[error("{}: {message}", code.code())]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn already_initialized() -> Self {
        Self::new(
            CliErrorCode::AlreadyInitialized,
            "Walk store already initialized",
        )
    }

    pub fn not_initialized() -> Self {
        Self::new(
            CliErrorCode::NotInitialized,
            "Walk store not initialized. Run 'walkdb init' first.",
        )
    }

    pub fn boot_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::BootFailed, msg)
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        Self::new(CliErrorCode::StoreError, e.to_string())
    }
}

impl From<CatalogError> for CliError {
    fn from(e: CatalogError) -> Self {
        Self::new(
            CliErrorCode::CatalogError,
            format!("{}: {}", e.kind().as_str(), e),
        )
    }
}

pub type CliResult<T> = Result<T, CliError>;
