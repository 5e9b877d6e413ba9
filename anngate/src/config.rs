//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `ANNGATE_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `ANNGATE_` override YAML values
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `ANNGATE_LIMITS__MAX_UPLOAD_BYTES=1048576` sets the `limits.max_upload_bytes` field.
//!
//! ## Configuration Structure
//!
//! - **Server**: `host`, `port` - HTTP server binding configuration
//! - **Limits**: `limits.max_upload_bytes` - Upload size ceiling, enforced while streaming
//! - **Cloud**: `cloud.region`, `cloud.endpoint`, `cloud.force_path_style` - Optional
//!   S3-compatible object storage used as an alternative dataset source/destination.
//!   Leaving the whole `cloud` section out disables cloud upload, and the `/v1/features`
//!   endpoint reports `cloud_upload: false` to clients.
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! # Override server port
//! ANNGATE_PORT=8080
//!
//! # Point cloud storage at a MinIO instance
//! ANNGATE_CLOUD__ENDPOINT="http://localhost:9000"
//! ANNGATE_CLOUD__FORCE_PATH_STYLE=true
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use url::Url;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "ANNGATE_CONFIG", default_value = "config.yaml")]
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
    /// Upload limits
    pub limits: LimitsConfig,
    /// Optional cloud object storage. When absent, bucket-based upload and
    /// download are rejected and the feature flag reports cloud upload as disabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud: Option<CloudConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3002,
            limits: LimitsConfig::default(),
            cloud: None,
        }
    }
}

/// Upload limits configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    /// Maximum accepted dataset size in bytes. The limit is enforced
    /// incrementally while the multipart body streams in, so oversized
    /// uploads are aborted early.
    pub max_upload_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}

/// Cloud object storage configuration (S3-compatible).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CloudConfig {
    /// AWS region. Falls back to the ambient AWS configuration when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Custom endpoint URL for S3-compatible stores (MinIO, localstack, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<Url>,
    /// Use path-style addressing. Required by most S3-compatible stores.
    pub force_path_style: bool,
}

impl Config {
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        Self::figment(args).extract()
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can still override specific values
            .merge(Env::prefixed("ANNGATE_").split("__"))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.bind_address(), "0.0.0.0:3002");
        assert!(config.cloud.is_none());
        assert_eq!(config.limits.max_upload_bytes, 50 * 1024 * 1024);
    }

    #[test]
    fn test_yaml_with_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
port: 9000
limits:
  max_upload_bytes: 1024
cloud:
  endpoint: http://localhost:9000
  force_path_style: true
"#,
            )?;
            jail.set_env("ANNGATE_PORT", "9100");

            let args = Args {
                config: "test.yaml".to_string(),
                validate: false,
            };
            let config = Config::load(&args)?;

            assert_eq!(config.port, 9100); // env wins over yaml
            assert_eq!(config.limits.max_upload_bytes, 1024);
            let cloud = config.cloud.expect("cloud section configured");
            assert!(cloud.force_path_style);
            assert_eq!(cloud.endpoint.unwrap().as_str(), "http://localhost:9000/");
            Ok(())
        });
    }

    #[test]
    fn test_unknown_field_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("test.yaml", "bogus_field: true\n")?;
            let args = Args {
                config: "test.yaml".to_string(),
                validate: false,
            };
            assert!(Config::load(&args).is_err());
            Ok(())
        });
    }
}
