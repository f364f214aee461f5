//! Configuration management for the RAX file manager
//!
//! Values come from built-in defaults, then an optional `config.toml`, then
//! `RAX_FM_*` environment variables (e.g. `RAX_FM_ROOT_DIR`, `RAX_FM_PORT`).

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::storage::SandboxRoot;

const CONFIG_PATHS: &[&str] = &[
    "rax-file-manager/config", // Docker production: /app/rax-file-manager/config.toml
    "config",                  // Local development: ./config.toml
];

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// IP address the request listener binds to
    pub bind_address: String,

    /// Port for the request listener
    pub port: u16,

    /// Sandbox root. Platform default when unset.
    #[serde(default)]
    pub root_dir: Option<String>,

    /// Maximum concurrent client sessions
    pub max_clients: usize,

    /// Maximum length of one request line in bytes
    pub max_request_length: usize,

    /// Chunk size for upload and download streaming
    pub buffer_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 2122,
            root_dir: None,
            max_clients: 10,
            max_request_length: 64 * 1024,
            buffer_size: 8192,
        }
    }
}

impl ServerConfig {
    /// Load configuration with file and environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let mut builder = Config::builder()
            .set_default("bind_address", defaults.bind_address)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("max_clients", defaults.max_clients as i64)?
            .set_default("max_request_length", defaults.max_request_length as i64)?
            .set_default("buffer_size", defaults.buffer_size as i64)?;

        for path in CONFIG_PATHS {
            builder = builder.add_source(File::with_name(path).required(false));
        }

        let config: ServerConfig = builder
            .add_source(Environment::with_prefix("RAX_FM").try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Message("port cannot be 0".into()));
        }

        if self.max_clients == 0 {
            return Err(ConfigError::Message(
                "max_clients must be greater than 0".into(),
            ));
        }

        if self.buffer_size == 0 {
            return Err(ConfigError::Message(
                "buffer_size must be greater than 0".into(),
            ));
        }

        if self.max_request_length < 256 {
            return Err(ConfigError::Message(
                "max_request_length must be at least 256 bytes".into(),
            ));
        }

        if matches!(&self.root_dir, Some(dir) if dir.trim().is_empty()) {
            return Err(ConfigError::Message("root_dir cannot be empty".into()));
        }

        Ok(())
    }

    /// Bind address and port as a socket address string
    pub fn listen_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Builds the sandbox root from `root_dir`, or the platform default.
    pub fn sandbox_root(&self) -> SandboxRoot {
        match &self.root_dir {
            Some(dir) => SandboxRoot::new(dir),
            None => SandboxRoot::platform_default(),
        }
    }
}
