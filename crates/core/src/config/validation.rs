//! Configuration validation rules.
//!
//! Checks run after every layer has been merged, grouped by what they guard:
//! generation identity, the manifest, and the network client.

use crate::config::AppConfig;
use crate::manifest::MatchMode;
use thiserror::Error;

const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;
const TIMEOUT_RANGE_MS: std::ops::RangeInclusive<u64> = 100..=300_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.to_string(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_generation()?;
        self.validate_manifest()?;
        self.validate_client()
    }

    fn validate_generation(&self) -> Result<(), ConfigError> {
        if self.version.trim().is_empty() {
            return Err(invalid("version", "must not be empty"));
        }
        if self.cache_prefix.trim().is_empty() {
            return Err(invalid("cache_prefix", "must not be empty"));
        }

        let origin = url::Url::parse(&self.origin).map_err(|e| invalid("origin", e.to_string()))?;
        if !matches!(origin.scheme(), "http" | "https") {
            return Err(invalid("origin", format!("unsupported scheme: {}", origin.scheme())));
        }
        Ok(())
    }

    fn validate_manifest(&self) -> Result<(), ConfigError> {
        if self.assets.is_empty() {
            return Err(invalid("assets", "must list at least one path"));
        }
        if let Some(bad) = self.assets.iter().find(|path| !path.starts_with('/')) {
            return Err(invalid("assets", format!("'{bad}' must be root-relative (start with '/')")));
        }
        if !self.api_prefix.starts_with('/') {
            return Err(invalid("api_prefix", "must start with '/'"));
        }

        if self.match_mode == MatchMode::Suffix && self.assets.iter().any(|path| path == "/") {
            tracing::warn!(
                assets = self.assets.len(),
                "suffix matching with '/' in assets treats every path ending in '/' as a static asset"
            );
        }
        Ok(())
    }

    fn validate_client(&self) -> Result<(), ConfigError> {
        if self.max_bytes == 0 || self.max_bytes > MAX_BODY_BYTES {
            return Err(invalid("max_bytes", format!("must be between 1 and {MAX_BODY_BYTES}")));
        }
        if !TIMEOUT_RANGE_MS.contains(&self.timeout_ms) {
            return Err(invalid(
                "timeout_ms",
                format!("must be between {} and {}", TIMEOUT_RANGE_MS.start(), TIMEOUT_RANGE_MS.end()),
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }
        Ok(())
    }
}
