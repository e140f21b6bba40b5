use std::path::PathBuf;

/// Pipeline configuration loaded from environment variables.
///
/// Unset or unparsable variables fall back to their defaults.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub database_url: String,
    pub max_connections: u32,
    /// Directory trained models are written to and loaded from.
    pub models_dir: PathBuf,
    /// Directory for JSON reports.
    pub output_dir: PathBuf,
    /// Stored with every prediction.
    pub model_version: String,
}

const DEFAULT_DATABASE_URL: &str = "sqlite://industrial_iot.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_MODELS_DIR: &str = "models";
const DEFAULT_OUTPUT_DIR: &str = ".";
const DEFAULT_MODEL_VERSION: &str = "v1.0";

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            models_dir: PathBuf::from(DEFAULT_MODELS_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            model_version: DEFAULT_MODEL_VERSION.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var              | Default                      |
    /// |----------------------|------------------------------|
    /// | `DATABASE_URL`       | `sqlite://industrial_iot.db` |
    /// | `DB_MAX_CONNECTIONS` | `5`                          |
    /// | `MODELS_DIR`         | `models`                     |
    /// | `OUTPUT_DIR`         | `.`                          |
    /// | `MODEL_VERSION`      | `v1.0`                       |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let max_connections = lookup("DB_MAX_CONNECTIONS")
            .and_then(|v| v.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.max_connections);

        Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            max_connections,
            models_dir: lookup("MODELS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.models_dir),
            output_dir: lookup("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            model_version: lookup("MODEL_VERSION").unwrap_or(defaults.model_version),
        }
    }
}
