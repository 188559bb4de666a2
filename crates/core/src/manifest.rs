//! Asset manifest: the fixed list of paths a generation keeps offline.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How request paths are compared against manifest entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// The request path must equal an entry.
    #[default]
    Exact,
    /// The request path may also end with an entry. An entry of `/` then
    /// matches every path with a trailing slash.
    Suffix,
}

/// Ordered, immutable list of root-relative asset paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetManifest {
    entries: Vec<String>,
    mode: MatchMode,
}

impl AssetManifest {
    pub fn new(entries: Vec<String>, mode: MatchMode) -> Self {
        Self { entries, mode }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// True if `path` names a manifest asset under the configured match mode.
    pub fn is_static_asset(&self, path: &str) -> bool {
        self.entries.iter().any(|entry| match self.mode {
            MatchMode::Exact => path == entry,
            MatchMode::Suffix => path == entry || path.ends_with(entry.as_str()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(mode: MatchMode) -> AssetManifest {
        AssetManifest::new(vec!["/".into(), "/css/styles.css".into(), "/js/app.js".into()], mode)
    }

    #[test]
    fn test_exact_match() {
        let m = manifest(MatchMode::Exact);
        assert!(m.is_static_asset("/"));
        assert!(m.is_static_asset("/css/styles.css"));
        assert!(!m.is_static_asset("/static/css/styles.css"));
        assert!(!m.is_static_asset("/blog/"));
    }

    #[test]
    fn test_suffix_match() {
        let m = manifest(MatchMode::Suffix);
        assert!(m.is_static_asset("/css/styles.css"));
        assert!(m.is_static_asset("/static/css/styles.css"));
        assert!(!m.is_static_asset("/css/styles.css.map"));
    }

    #[test]
    fn test_suffix_root_entry_matches_trailing_slash() {
        let m = manifest(MatchMode::Suffix);
        assert!(m.is_static_asset("/blog/"));
        assert!(!m.is_static_asset("/blog"));
    }

    #[test]
    fn test_entries_preserve_order() {
        let m = manifest(MatchMode::Exact);
        assert_eq!(m.entries(), ["/", "/css/styles.css", "/js/app.js"]);
    }
}
