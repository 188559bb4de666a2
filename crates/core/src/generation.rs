//! Cache generation: the explicit configuration value the controller and the
//! router run against.

use url::Url;

use crate::Error;
use crate::config::AppConfig;
use crate::http::Request;
use crate::manifest::AssetManifest;

/// Whether a request path is API traffic, a manifest asset, or anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    Api,
    Static,
    Other,
}

impl RequestClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestClass::Api => "api",
            RequestClass::Static => "static",
            RequestClass::Other => "other",
        }
    }
}

impl std::fmt::Display for RequestClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One versioned instantiation of the cache store and its routing inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    name: String,
    origin: Url,
    api_prefix: String,
    manifest: AssetManifest,
}

impl Generation {
    pub fn new(cache_prefix: &str, version: &str, origin: Url, api_prefix: &str, manifest: AssetManifest) -> Self {
        Self {
            name: format!("{cache_prefix}-v{version}"),
            origin,
            api_prefix: api_prefix.to_string(),
            manifest,
        }
    }

    /// Build the configured generation.
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        Self::from_config_with_version(config, &config.version)
    }

    /// Build a generation from `config` with its version replaced.
    pub fn from_config_with_version(config: &AppConfig, version: &str) -> Result<Self, Error> {
        if version.trim().is_empty() {
            return Err(Error::InvalidInput("generation version must not be empty".into()));
        }
        let origin = Url::parse(&config.origin).map_err(|e| Error::InvalidUrl(format!("{}: {e}", config.origin)))?;
        let manifest = AssetManifest::new(config.assets.clone(), config.match_mode);
        Ok(Self::new(&config.cache_prefix, version, origin, &config.api_prefix, manifest))
    }

    /// Store name, e.g. `offgrid-v3.3.0`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn manifest(&self) -> &AssetManifest {
        &self.manifest
    }

    /// Classify a request by its path.
    pub fn classify(&self, request: &Request) -> RequestClass {
        let path = request.url.path();
        if path.starts_with(&self.api_prefix) {
            RequestClass::Api
        } else if self.manifest.is_static_asset(path) {
            RequestClass::Static
        } else {
            RequestClass::Other
        }
    }

    /// Absolute URLs of every manifest asset, in manifest order.
    pub fn asset_urls(&self) -> Result<Vec<Url>, Error> {
        self.manifest
            .entries()
            .iter()
            .map(|path| self.origin.join(path).map_err(|e| Error::InvalidUrl(format!("{path}: {e}"))))
            .collect()
    }
}
