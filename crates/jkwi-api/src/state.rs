//! # Application State
//!
//! Shared state for the Axum application: the [`RecordEngine`] and the
//! server configuration read from the environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use jkwi_records::{EngineConfig, RecordEngine};
use jkwi_store::{LocalFsStore, MemoryStore, RecordStore};
use thiserror::Error;

/// Which [`RecordStore`] backend the server runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreKind {
    /// Files under `data_dir`.
    #[default]
    Fs,
    /// Process memory. Lost on restart.
    Memory,
}

impl FromStr for StoreKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fs" => Ok(Self::Fs),
            "memory" => Ok(Self::Memory),
            _ => Err(ConfigError::UnknownStore(s.to_string())),
        }
    }
}

/// Error reading server configuration from the environment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PORT must be a number between 0 and 65535, got \"{0}\"")]
    InvalidPort(String),
    #[error("JKWI_STORE must be \"fs\" or \"memory\", got \"{0}\"")]
    UnknownStore(String),
}

/// Server configuration.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Shared bearer secret. If `None`, authentication is disabled.
    pub auth_token: Option<String>,
    /// Root directory of the filesystem store.
    pub data_dir: PathBuf,
    /// Storage backend.
    pub store: StoreKind,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field("data_dir", &self.data_dir)
            .field("store", &self.store)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
            data_dir: PathBuf::from("./data"),
            store: StoreKind::Fs,
        }
    }
}

impl AppConfig {
    /// Read `PORT`, `AUTH_TOKEN`, `JKWI_DATA_DIR` and `JKWI_STORE`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup. Unset or empty values keep
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();
        if let Some(port) = var("PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
        }
        config.auth_token = var("AUTH_TOKEN");
        if let Some(dir) = var("JKWI_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(store) = var("JKWI_STORE") {
            config.store = store.parse()?;
        }
        Ok(config)
    }

    /// Construct the configured backend.
    pub fn open_store(&self) -> Arc<dyn RecordStore> {
        match self.store {
            StoreKind::Fs => Arc::new(LocalFsStore::new(&self.data_dir)),
            StoreKind::Memory => Arc::new(MemoryStore::new()),
        }
    }
}

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub engine: Arc<RecordEngine>,
    pub config: AppConfig,
}

impl AppState {
    /// In-memory engine, authentication disabled.
    pub fn new() -> Self {
        Self::with_engine(
            RecordEngine::new(Arc::new(MemoryStore::new())),
            AppConfig {
                store: StoreKind::Memory,
                ..AppConfig::default()
            },
        )
    }

    /// Open the configured backend with the default field layout.
    pub fn with_config(config: AppConfig) -> Self {
        let engine = RecordEngine::with_config(config.open_store(), EngineConfig::default());
        Self::with_engine(engine, config)
    }

    /// Wrap an existing engine.
    pub fn with_engine(engine: RecordEngine, config: AppConfig) -> Self {
        Self {
            engine: Arc::new(engine),
            config,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
