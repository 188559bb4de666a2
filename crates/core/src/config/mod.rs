//! Host configuration: which generation to build, where its assets live and
//! how the network client behaves.
//!
//! Layers merge defaults, then an optional TOML file, then `OFFGRID_*`
//! environment variables. Nested tables use `__`, e.g.
//! `OFFGRID_NOTIFICATIONS__TITLE`.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::manifest::MatchMode;
use crate::notify::NotificationDefaults;

mod validation;

pub use validation::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite cache database.
    ///
    /// Set via OFFGRID_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Origin that manifest paths and root-relative requests resolve against.
    ///
    /// Set via OFFGRID_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Prefix of every store name; the generation name is `{prefix}-v{version}`.
    #[serde(default = "default_cache_prefix")]
    pub cache_prefix: String,

    /// Generation version. Bump it whenever `assets` changes.
    ///
    /// Set via OFFGRID_VERSION environment variable.
    #[serde(default = "default_version")]
    pub version: String,

    /// Root-relative paths that must be available offline.
    #[serde(default = "default_assets")]
    pub assets: Vec<String>,

    /// Requests whose path starts with this prefix are never cached.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// How request paths are matched against `assets`.
    #[serde(default)]
    pub match_mode: MatchMode,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via OFFGRID_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to buffer per response.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via OFFGRID_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Install and activate the configured generation when the host starts.
    #[serde(default = "default_true")]
    pub install_on_start: bool,

    /// Fallback values for push payload fields.
    #[serde(default)]
    pub notifications: NotificationDefaults,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./offgrid-cache.sqlite")
}

fn default_origin() -> String {
    "http://localhost:8080".into()
}

fn default_cache_prefix() -> String {
    "offgrid".into()
}

fn default_version() -> String {
    "3.3.0".into()
}

fn default_assets() -> Vec<String> {
    ["/", "/css/styles.css", "/css/theme.css", "/js/app.js", "/manifest.json"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_api_prefix() -> String {
    "/api/".into()
}

fn default_user_agent() -> String {
    "offgrid/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            origin: default_origin(),
            cache_prefix: default_cache_prefix(),
            version: default_version(),
            assets: default_assets(),
            api_prefix: default_api_prefix(),
            match_mode: MatchMode::default(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            install_on_start: true,
            notifications: NotificationDefaults::default(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Name of the store owned by the configured generation.
    pub fn cache_name(&self) -> String {
        format!("{}-v{}", self.cache_prefix, self.version)
    }

    /// Load from defaults, `OFFGRID_CONFIG_FILE` and the environment, in
    /// increasing precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a layer fails to parse or the merged result
    /// is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("OFFGRID_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("OFFGRID_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        Self::from_figment(figment)
    }

    /// Extract and validate configuration from a prepared figment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::LoadFailed` if extraction fails, or the
    /// validation error for the first invalid field.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
