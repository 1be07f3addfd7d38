//! Environment and file configuration
//!
//! Settings load from `config/indexguard.toml` (optional) with
//! `INDEXGUARD`-prefixed environment variables layered on top, e.g.
//! `INDEXGUARD_SCHEMA_PATH`, `INDEXGUARD_SKIP`, `INDEXGUARD_BASE_REF`.
//! CLI flags override both.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
pub struct CheckConfig {
    /// Emit extraction-decision tracing (debug log level)
    #[serde(default)]
    pub debug: bool,
    /// Path to the consolidated schema snapshot
    #[serde(default = "default_schema_path")]
    pub schema_path: String,
    /// Directory holding migration files, used for changed-file filtering
    #[serde(default = "default_migrations_dir")]
    pub migrations_dir: String,
    /// Explicit skip override
    #[serde(default)]
    pub skip: bool,
    /// Base reference of the change range, when the CI run knows one
    #[serde(default)]
    pub base_ref: Option<String>,
    /// Head reference of the change range
    #[serde(default)]
    pub head_ref: Option<String>,
}

fn default_schema_path() -> String {
    "db/schema.rb".to_string()
}

fn default_migrations_dir() -> String {
    "db/migrate".to_string()
}

impl CheckConfig {
    /// Load configuration from `config/indexguard.toml`, falling back to env vars.
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name("config/indexguard.toml").required(false))
            .add_source(Environment::with_prefix("INDEXGUARD"));

        // If the file existed but was unreadable, warn and retry with env only
        let settings = match builder.build() {
            Ok(cfg) => cfg,
            Err(err) => {
                if std::path::Path::new("config/indexguard.toml").exists() {
                    eprintln!(
                        "Warning: failed to load config file, falling back to env. Error: {}",
                        err
                    );
                }
                Config::builder()
                    .add_source(Environment::with_prefix("INDEXGUARD"))
                    .build()
                    .map_err(|env_err| {
                        ConfigError::Message(format!(
                            "Failed to load configuration from file and env: {}, then env-only error: {}",
                            err, env_err
                        ))
                    })?
            }
        };

        settings.try_deserialize::<CheckConfig>().map_err(|e| {
            ConfigError::Message(format!(
                "Check configuration could not be loaded from file or environment: {}",
                e
            ))
        })
    }
}
