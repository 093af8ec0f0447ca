//! Static school catalog.
//!
//! The catalog is the closed set of schools the service knows about. It is
//! loaded once at startup, either from a configured JSON file or from the
//! embedded default, and never changes while the service runs. Entries may
//! carry logo paths relative to the configured asset base URL; these are
//! resolved to absolute URLs at load time so the rest of the pipeline only
//! ever sees fully-qualified logo locations.

use serde::Deserialize;
use tracing::{info, warn};
use url::Url;

use crate::assets::CatalogAssets;
use crate::config::CatalogConfig;
use crate::models::School;

/// One catalog entry as it appears on disk. `logo_url` may be absolute or a
/// path relative to the asset base URL.
#[derive(Debug, Clone, Deserialize)]
struct CatalogEntry {
    name: String,
    logo_url: String,
}

pub struct Catalog {
    schools: Vec<School>,
}

impl Catalog {
    /// Load the catalog from the configured path, falling back to the
    /// embedded default when no path is set.
    pub fn load(config: &CatalogConfig) -> anyhow::Result<Self> {
        let raw = match &config.path {
            Some(path) => std::fs::read_to_string(path).map_err(|e| {
                anyhow::anyhow!("Failed to read catalog file {}: {}", path.display(), e)
            })?,
            None => {
                let file = CatalogAssets::default_catalog()
                    .ok_or_else(|| anyhow::anyhow!("Embedded school catalog is missing"))?;
                String::from_utf8(file.data.into_owned())
                    .map_err(|e| anyhow::anyhow!("Embedded school catalog is not UTF-8: {}", e))?
            }
        };

        let catalog = Self::from_json(&raw, &config.asset_base_url)?;
        if catalog.is_empty() {
            warn!("School catalog is empty; every query will resolve to no match");
        } else {
            info!("Loaded school catalog with {} entries", catalog.len());
        }
        Ok(catalog)
    }

    /// Parse catalog JSON and resolve every logo location against the asset
    /// base URL. An entry whose logo cannot be resolved to a valid URL fails
    /// the whole load; a half-loaded catalog would silently shrink the set
    /// of findable schools.
    pub fn from_json(raw: &str, asset_base_url: &str) -> anyhow::Result<Self> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(raw)
            .map_err(|e| anyhow::anyhow!("Failed to parse school catalog: {}", e))?;

        let mut schools = Vec::with_capacity(entries.len());
        for entry in entries {
            let logo_url = resolve_logo_url(&entry.logo_url, asset_base_url).map_err(|e| {
                anyhow::anyhow!("Invalid logo location for '{}': {}", entry.name, e)
            })?;
            schools.push(School {
                name: entry.name,
                logo_url,
            });
        }

        Ok(Self { schools })
    }

    pub fn schools(&self) -> &[School] {
        &self.schools
    }

    pub fn len(&self) -> usize {
        self.schools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schools.is_empty()
    }
}

/// Resolve a catalog logo location to an absolute URL. Absolute entries are
/// validated and passed through; relative paths are appended to the asset
/// base URL.
fn resolve_logo_url(raw: &str, asset_base_url: &str) -> Result<String, String> {
    if raw.starts_with("http://") || raw.starts_with("https://") {
        Url::parse(raw).map_err(|e| format!("'{}': {}", raw, e))?;
        return Ok(raw.to_string());
    }

    let joined = format!(
        "{}/{}",
        asset_base_url.trim_end_matches('/'),
        raw.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|e| format!("'{}': {}", joined, e))?;
    Ok(joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://assets.example.com/public";

    #[test]
    fn relative_logo_paths_resolve_against_base_url() {
        let catalog = Catalog::from_json(
            r#"[{"name": "Churchill High School", "logo_url": "/logos/churchill.png"}]"#,
            BASE,
        )
        .unwrap();

        assert_eq!(
            catalog.schools()[0].logo_url,
            "https://assets.example.com/public/logos/churchill.png"
        );
    }

    #[test]
    fn absolute_logo_urls_pass_through_unchanged() {
        let catalog = Catalog::from_json(
            r#"[{"name": "Prince Edward School", "logo_url": "https://cdn.example.com/pe.png"}]"#,
            BASE,
        )
        .unwrap();

        assert_eq!(catalog.schools()[0].logo_url, "https://cdn.example.com/pe.png");
    }

    #[test]
    fn missing_leading_slash_still_resolves() {
        let catalog = Catalog::from_json(
            r#"[{"name": "Goromonzi High School", "logo_url": "logos/goromonzi.png"}]"#,
            BASE,
        )
        .unwrap();

        assert_eq!(
            catalog.schools()[0].logo_url,
            "https://assets.example.com/public/logos/goromonzi.png"
        );
    }

    #[test]
    fn malformed_json_is_rejected() {
        let result = Catalog::from_json("not json at all", BASE);
        assert!(result.is_err());
    }

    #[test]
    fn unresolvable_logo_fails_the_load() {
        let result = Catalog::from_json(
            r#"[{"name": "Broken School", "logo_url": "/logos/broken.png"}]"#,
            "not a url",
        );
        let message = result.err().map(|e| e.to_string()).unwrap_or_default();
        assert!(message.contains("Broken School"));
    }

    #[test]
    fn embedded_default_catalog_loads() {
        let config = crate::config::Config::default().catalog;
        let catalog = Catalog::load(&config).unwrap();
        assert!(!catalog.is_empty());
        for school in catalog.schools() {
            assert!(school.logo_url.starts_with("https://"));
        }
    }
}
