//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `REFSTORE_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `REFSTORE_` override YAML values
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `REFSTORE_DEMO__DISPOSITION=attachment` sets the `demo.disposition` field.
//!
//! ## Usage
//!
//! ```no_run
//! use clap::Parser;
//! use refstore::config::{Args, Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let args = Args::parse();
//! let config = Config::load(&args)?;
//!
//! println!("Server will bind to {}:{}", config.host, config.port);
//! # Ok(())
//! # }
//! ```
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! # Override server port
//! REFSTORE_PORT=8080
//!
//! # Move the storage root
//! REFSTORE_STORAGE_ROOT=/var/lib/refstore
//!
//! # Return retrieval URLs instead of raw paths
//! REFSTORE_DEMO__BASE_URL=https://files.example.com
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Simple CLI args - just for specifying the config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "REFSTORE_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    /// Useful for CI/CD pipelines to catch config errors before deployment.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// This is the root configuration structure loaded from YAML and environment variables.
/// All fields have sensible defaults defined in the `Default` implementation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Base directory under which per-type subdirectories of uploaded files are created
    pub storage_root: PathBuf,
    /// Path prefix for the storage API (status + upload endpoints)
    pub api_base_path: String,
    /// Path prefix for the demo retrieval API
    pub demo_base_path: String,
    /// Maximum accepted upload body size in bytes
    pub max_upload_bytes: u64,
    /// Allowed origins for CORS requests ("*" allows all origins)
    pub cors_allowed_origins: Vec<String>,
    /// Service metadata reported by the status endpoint
    pub metadata: Metadata,
    /// Demo retrieval endpoint configuration
    pub demo: DemoConfig,
}

/// Service metadata reported to callers.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Metadata {
    /// Human-readable service name returned by `GET /v1/status`
    pub name: String,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            name: "Reference Storage Service".to_string(),
        }
    }
}

/// Demo retrieval endpoint configuration.
///
/// When `base_url` is set, successful uploads return a fully qualified retrieval
/// URL (base URL + demo base path + stored path as a `filePath` query parameter)
/// instead of the raw filesystem path.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemoConfig {
    /// Public base URL of this service, used to compose retrieval URLs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<Url>,
    /// How retrieved files are served to browsers
    pub disposition: Disposition,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            disposition: Disposition::Open,
        }
    }
}

/// Content-Disposition mode for the demo retrieval endpoint.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    /// Serve files inline so browsers render them directly
    Open,
    /// Serve files as download attachments
    Attachment,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4001,
            storage_root: PathBuf::from("./data"),
            api_base_path: "/storage-api".to_string(),
            demo_base_path: "/demo".to_string(),
            max_upload_bytes: 1024 * 1024 * 1024, // 1 GiB
            cors_allowed_origins: vec!["*".to_string()],
            metadata: Metadata::default(),
            demo: DemoConfig::default(),
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Build the figment used for configuration extraction
    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("REFSTORE_").split("__"))
    }

    /// Validate cross-field constraints that serde cannot express
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, path) in [("api_base_path", &self.api_base_path), ("demo_base_path", &self.demo_base_path)] {
            if !path.starts_with('/') || path.ends_with('/') {
                anyhow::bail!("{} must start with '/' and must not end with '/' (got '{}')", name, path);
            }
        }
        if self.api_base_path == self.demo_base_path {
            anyhow::bail!("api_base_path and demo_base_path must differ");
        }
        if self.max_upload_bytes == 0 {
            anyhow::bail!("max_upload_bytes must be greater than zero");
        }
        Ok(())
    }

    /// Get the socket address string to bind the HTTP server to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        config.validate().expect("default config should validate");
        assert_eq!(config.bind_address(), "0.0.0.0:4001");
        assert_eq!(config.demo.disposition, Disposition::Open);
        assert!(config.demo.base_url.is_none());
    }

    #[test]
    fn rejects_base_path_without_leading_slash() {
        let config = Config {
            api_base_path: "storage-api".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_identical_base_paths() {
        let config = Config {
            api_base_path: "/files".to_string(),
            demo_base_path: "/files".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_upload_limit() {
        let config = Config {
            max_upload_bytes: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn environment_overrides_yaml() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r#"
port: 5000
demo:
  disposition: open
"#,
            )?;
            jail.set_env("REFSTORE_PORT", "6000");
            jail.set_env("REFSTORE_DEMO__DISPOSITION", "attachment");

            let args = Args {
                config: "config.yaml".to_string(),
                validate: false,
            };
            let config = Config::load(&args).expect("config should load");
            assert_eq!(config.port, 6000);
            assert_eq!(config.demo.disposition, Disposition::Attachment);
            Ok(())
        });
    }
}
