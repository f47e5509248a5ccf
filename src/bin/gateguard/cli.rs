//! Command-line interface definition.

use clap::Parser;
use gateguard::config::ServiceConfig;
use std::path::PathBuf;

/// Credential verification oracle for proxy front-ends.
#[derive(Parser, Debug)]
#[command(name = "gateguard")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Listening port for the HTTP boundary.
    #[arg(long, short, env = "GATEGUARD_PORT")]
    pub port: Option<u16>,

    /// Base URL of the trusted key source.
    #[arg(long, env = "GATEGUARD_KEY_SOURCE_URL")]
    pub key_source_url: Option<String>,

    /// Path of the replay ledger blob.
    #[arg(long, env = "GATEGUARD_LEDGER_PATH")]
    pub ledger_path: Option<PathBuf>,

    /// Log level.
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    /// Path to configuration file.
    #[arg(long, short)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Convert CLI arguments into a `ServiceConfig`.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file is specified but cannot be loaded,
    /// or if the resulting configuration is invalid.
    pub fn into_config(self) -> color_eyre::Result<ServiceConfig> {
        // Start with default config or load from file.
        let mut config = if let Some(ref path) = self.config {
            ServiceConfig::from_file(path)?
        } else {
            ServiceConfig::default()
        };

        // Override with CLI arguments.
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(url) = self.key_source_url {
            config.key_source_url = url;
        }
        if let Some(path) = self.ledger_path {
            config.ledger_path = path;
        }
        config.log_level = self.log_level;

        config.validate()?;
        Ok(config)
    }
}
