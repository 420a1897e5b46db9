//! Configuration module for the file download service.
//!
//! Loads configuration from `config.toml` with environment variable overrides.

use config::{Config as ConfigLoader, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

use crate::error::AppError;

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub resources: ResourcesConfig,
    #[serde(default)]
    pub download: DownloadConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Where downloadable resources are read from
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResourceSource {
    /// Files compiled into the binary from the `resources/` folder
    #[default]
    Embedded,
    /// Files read from `resources.directory` at request time
    Directory,
}

/// Resource store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ResourcesConfig {
    #[serde(default)]
    pub source: ResourceSource,
    #[serde(default = "default_resource_dir")]
    pub directory: PathBuf,
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            source: ResourceSource::default(),
            directory: default_resource_dir(),
        }
    }
}

fn default_resource_dir() -> PathBuf {
    PathBuf::from("./resources")
}

/// Which timestamp goes into the `Last-Modified` header
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LastModifiedSource {
    /// Wall-clock time at which the request was handled
    #[default]
    RequestTime,
    /// The resource's own modification time, when the store knows it
    Resource,
}

/// File naming and header options for `/files/download`
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default = "default_suffix")]
    pub suffix: String,
    #[serde(default = "default_fallback")]
    pub fallback: String,
    #[serde(default)]
    pub last_modified: LastModifiedSource,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            suffix: default_suffix(),
            fallback: default_fallback(),
            last_modified: LastModifiedSource::default(),
        }
    }
}

fn default_prefix() -> String {
    "image".to_string()
}

fn default_suffix() -> String {
    ".jpeg".to_string()
}

fn default_fallback() -> String {
    "superman.jpeg".to_string()
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Configuration is loaded in the following order (later sources override earlier):
    /// 1. Default values
    /// 2. `config.toml` in current directory (optional)
    /// 3. Environment variables with `FILES_` prefix
    ///
    /// Environment variables use double underscore for nesting:
    /// - `FILES_SERVER__PORT=9000` sets `server.port`
    /// - `FILES_RESOURCES__SOURCE=directory` sets `resources.source`
    pub fn load() -> Result<Self, AppError> {
        Self::load_from("config.toml")
    }

    /// Load configuration from a specific file path.
    pub fn load_from(config_path: &str) -> Result<Self, AppError> {
        let config = ConfigLoader::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("resources.source", "embedded")?
            .set_default("resources.directory", "./resources")?
            .set_default("download.prefix", "image")?
            .set_default("download.suffix", ".jpeg")?
            .set_default("download.fallback", "superman.jpeg")?
            .set_default("download.last_modified", "request_time")?
            .add_source(File::with_name(config_path).required(false))
            // FILES_SERVER__PORT=9000 -> server.port = 9000
            .add_source(
                Environment::with_prefix("FILES")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values that serde cannot check.
    fn validate(&self) -> Result<(), AppError> {
        if self.download.fallback.trim().is_empty() {
            return Err(AppError::Config(config::ConfigError::Message(
                "download.fallback must name a resource".to_string(),
            )));
        }

        if self.resources.source == ResourceSource::Directory && !self.resources.directory.is_dir()
        {
            tracing::warn!(
                "Resource directory {:?} does not exist - every download will 404",
                self.resources.directory
            );
        }

        Ok(())
    }

    /// Get the server socket address
    pub fn server_addr(&self) -> std::net::SocketAddr {
        use std::net::{IpAddr, Ipv4Addr, SocketAddr};
        let ip: IpAddr = self.server.host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid host '{}', using 0.0.0.0", self.server.host);
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        });
        SocketAddr::new(ip, self.server.port)
    }
}
