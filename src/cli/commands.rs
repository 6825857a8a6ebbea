//! CLI command implementations
//!
//! `init` prepares the data directory, `serve` opens the configured store
//! and runs the HTTP server until interrupted, `import` bulk-loads walks
//! through the catalog so every record gets the same validation as an HTTP
//! create.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::catalog::{CatalogError, WalkCatalog};
use crate::http_server::{HttpServer, HttpServerConfig};
use crate::observability::{log_event_with_fields, Event, ObservationScope};
use crate::store::{DocumentStore, FileStore, MemoryStore};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_walks_file, write_response};

/// Snapshot file name inside the data directory
pub const SNAPSHOT_FILE: &str = "walks.snapshot";

/// Which document store backs the catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// Lost on exit
    Memory,
    /// Checksummed snapshot under `data_dir`
    #[default]
    File,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Memory => "memory",
            StoreKind::File => "file",
        }
    }
}

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory (required)
    pub data_dir: String,

    /// Store engine (optional, default "file")
    #[serde(default)]
    pub store: StoreKind,

    /// HTTP listener (optional, all fields defaulted)
    #[serde(default)]
    pub http: HttpServerConfig,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        log_event_with_fields(
            Event::ConfigLoaded,
            &[
                ("data_dir", config.data_dir.as_str()),
                ("path", &path.display().to_string()),
                ("store", config.store.as_str()),
            ],
        );
        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.data_dir.trim().is_empty() {
            return Err(CliError::config_error("data_dir must not be empty"));
        }
        self.http.validate().map_err(CliError::config_error)?;
        Ok(())
    }

    /// Get data directory as Path
    pub fn data_path(&self) -> &Path {
        Path::new(&self.data_dir)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_path().join(SNAPSHOT_FILE)
    }
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Serve { config, port } => serve(&config, port),
        Command::Import { config, file } => import(&config, &file),
    }
}

/// Initialize a new walkdb data directory
///
/// With the file store, writes an empty snapshot and refuses to touch an
/// existing one.
pub fn init(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let scope = ObservationScope::new("INIT");

    if config.store == StoreKind::File && is_initialized(&config) {
        scope.fail("snapshot already exists");
        return Err(CliError::already_initialized());
    }

    fs::create_dir_all(config.data_path()).map_err(|e| {
        CliError::config_error(format!(
            "Failed to create directory {:?}: {}",
            config.data_path(),
            e
        ))
    })?;

    if config.store == StoreKind::File {
        runtime()?.block_on(async {
            let store = FileStore::open(config.snapshot_path()).await?;
            store.flush().await
        })?;
    }

    scope.complete_with_fields(&[("store", config.store.as_str())]);
    write_response(json!({"initialized": true, "store": config.store.as_str()}))?;

    Ok(())
}

/// Serve the walk catalog over HTTP until the process is stopped
pub fn serve(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    let config = Config::load(config_path)?;

    let mut http_config = config.http.clone();
    if let Some(port) = port {
        http_config.port = port;
    }

    runtime()?.block_on(async {
        let catalog = open_catalog(&config).await?;
        HttpServer::with_config(http_config, Arc::new(catalog))
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Create every walk in a JSON array file
///
/// Walks the catalog rejects are reported and skipped. A store failure
/// stops the import.
pub fn import(config_path: &Path, file: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    if config.store == StoreKind::Memory {
        return Err(CliError::config_error(
            "import needs a persistent store; set \"store\": \"file\"",
        ));
    }
    let items = read_walks_file(file)?;

    let scope = ObservationScope::new("IMPORT");
    let result = runtime()?.block_on(async {
        let catalog = open_catalog(&config).await?;
        import_walks(&catalog, items).await
    });

    match result {
        Ok(summary) => {
            let imported = summary["imported"].to_string();
            let rejected = summary["rejected"]
                .as_array()
                .map_or(0, Vec::len)
                .to_string();
            scope.complete_with_fields(&[("imported", &imported), ("rejected", &rejected)]);
            write_response(summary)
        }
        Err(e) => {
            scope.fail(e.message());
            Err(e)
        }
    }
}

async fn import_walks(catalog: &WalkCatalog, items: Vec<Value>) -> CliResult<Value> {
    let mut imported = 0u64;
    let mut rejected = Vec::new();

    for (index, item) in items.into_iter().enumerate() {
        match catalog.create(item).await {
            Ok(_) => imported += 1,
            Err(e @ CatalogError::Persistence(_)) => return Err(e.into()),
            Err(e) => rejected.push(json!({
                "index": index,
                "kind": e.kind(),
                "error": e.to_string(),
            })),
        }
    }

    Ok(json!({"imported": imported, "rejected": rejected}))
}

async fn open_catalog(config: &Config) -> CliResult<WalkCatalog> {
    let store: Arc<dyn DocumentStore> = match config.store {
        StoreKind::Memory => Arc::new(MemoryStore::new()),
        StoreKind::File => {
            if !is_initialized(config) {
                return Err(CliError::not_initialized());
            }
            Arc::new(FileStore::open(config.snapshot_path()).await?)
        }
    };
    Ok(WalkCatalog::with_store(store))
}

fn runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))
}

/// Check if a data directory holds a snapshot
fn is_initialized(config: &Config) -> bool {
    config.snapshot_path().exists()
}

#[cfg(test)]
mod tests {
    use super::super::errors::CliErrorCode;
    use super::*;
    use crate::catalog::ErrorKind;
    use tempfile::TempDir;

    fn create_config(temp_dir: &TempDir, extra: Value) -> PathBuf {
        let config_path = temp_dir.path().join("walkdb.json");
        let data_dir = temp_dir.path().join("data");

        let mut config = json!({
            "data_dir": data_dir.to_string_lossy()
        });
        if let (Some(base), Some(extra)) = (config.as_object_mut(), extra.as_object()) {
            base.extend(extra.clone());
        }

        fs::write(&config_path, config.to_string()).unwrap();
        config_path
    }

    #[test]
    fn test_init_writes_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir, json!({}));

        init(&config_path).unwrap();

        assert!(temp_dir.path().join("data").join(SNAPSHOT_FILE).exists());
    }

    #[test]
    fn test_init_refuses_reinit() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir, json!({}));

        init(&config_path).unwrap();

        let result = init(&config_path);
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().code(),
            &CliErrorCode::AlreadyInitialized
        );
    }

    #[test]
    fn test_serve_requires_init() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir, json!({}));

        let result = serve(&config_path, Some(0));
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().code(), &CliErrorCode::NotInitialized);
    }

    #[test]
    fn test_config_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir, json!({}));

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.store, StoreKind::File);
        assert_eq!(config.http.port, 54321);
        assert_eq!(config.http.host, "0.0.0.0");
    }

    #[test]
    fn test_config_rejects_unknown_store() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir, json!({"store": "postgres"}));

        let result = Config::load(&config_path);
        assert_eq!(result.unwrap_err().code(), &CliErrorCode::ConfigError);
    }

    #[test]
    fn test_import_refuses_memory_store() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir, json!({"store": "memory"}));
        let walks = temp_dir.path().join("walks.json");
        fs::write(&walks, "[]").unwrap();

        let result = import(&config_path, &walks);
        assert_eq!(result.unwrap_err().code(), &CliErrorCode::ConfigError);
    }

    #[test]
    fn test_import_persists_valid_walks() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir, json!({}));
        init(&config_path).unwrap();

        let walks = temp_dir.path().join("walks.json");
        fs::write(
            &walks,
            json!([
                {"name": "Tour Eiffel", "address": "Champ de Mars", "category": "Monument"},
                {"name": "No address", "category": "Park"}
            ])
            .to_string(),
        )
        .unwrap();

        import(&config_path, &walks).unwrap();

        let config = Config::load(&config_path).unwrap();
        let rt = runtime().unwrap();
        let names: Vec<String> = rt.block_on(async {
            let catalog = open_catalog(&config).await.unwrap();
            catalog
                .get_all()
                .await
                .unwrap()
                .into_iter()
                .map(|w| w.name)
                .collect()
        });
        assert_eq!(names, vec!["Tour Eiffel"]);
    }

    #[tokio::test]
    async fn test_import_walks_reports_rejections() {
        let catalog = WalkCatalog::with_store(Arc::new(MemoryStore::new()));
        let summary = import_walks(
            &catalog,
            vec![
                json!({"name": "A", "address": "B", "category": "C"}),
                json!({"address": "B", "category": "C"}),
            ],
        )
        .await
        .unwrap();

        assert_eq!(summary["imported"], 1);
        assert_eq!(summary["rejected"][0]["index"], 1);
        assert_eq!(
            summary["rejected"][0]["kind"],
            serde_json::to_value(ErrorKind::InvalidInput).unwrap()
        );
    }
}
