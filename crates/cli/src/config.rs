//! Layered configuration: optional TOML file, then `CROPREC_*` environment

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File as ConfigFile};
use croprec_weather::WeatherConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "croprec.toml";

const ENV_PREFIX: &str = "CROPREC";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the trained artifact set
    pub model_dir: PathBuf,
    /// Labeled CSV used by `insights`
    pub dataset: Option<PathBuf>,
    pub log_level: String,
    pub weather: WeatherConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models/crop"),
            dataset: None,
            log_level: "info".to_string(),
            weather: WeatherConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from `path_override` (must exist) or `croprec.toml` (if present),
    /// with environment variables taking precedence
    pub fn load(path_override: Option<&Path>) -> Result<Self> {
        let resolved_path = match path_override {
            Some(path) => {
                if !path.exists() {
                    bail!(
                        "Configuration file {} not found (specified via --config)",
                        path.display()
                    );
                }
                Some(path.to_path_buf())
            }
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                path.exists().then_some(path)
            }
        };

        Self::from_sources(resolved_path.as_deref(), environment())
    }

    fn from_sources(file: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = file {
            builder = builder.add_source(ConfigFile::from(path));
        }

        builder = builder.add_source(env);

        let config = builder.build().context("Failed to read configuration")?;
        config
            .try_deserialize()
            .context("Invalid configuration")
    }
}

/// `CROPREC_MODEL_DIR`, `CROPREC_WEATHER__API_KEY`, ...
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
