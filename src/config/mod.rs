use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub web: WebConfig,
    pub catalog: CatalogConfig,
    pub cache: CacheConfig,
    pub resolver: ResolverConfig,
    pub palette: PaletteConfig,
    pub generator: GeneratorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Optional path to a catalog JSON file; when unset the embedded default
    /// catalog is used.
    pub path: Option<PathBuf>,
    /// Base URL that relative logo locators in the catalog are resolved
    /// against.
    pub asset_base_url: String,
}

/// Freshness policy for cached pages.
///
/// `NoExpiry` writes entries without an expiry timestamp (valid forever);
/// `Ttl` stamps each write with `created_at + ttl_seconds`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CachePolicy {
    NoExpiry,
    Ttl,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub policy: CachePolicy,
    /// Time-to-live applied under the `ttl` policy. Ignored under `no-expiry`.
    pub ttl_seconds: u64,
}

impl CacheConfig {
    /// Expiry timestamp for an entry written at `created_at` under this
    /// policy.
    pub fn expires_at(&self, created_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self.policy {
            CachePolicy::NoExpiry => None,
            CachePolicy::Ttl => Some(created_at + Duration::seconds(self.ttl_seconds as i64)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Minimum similarity score (0.0-1.0) a candidate must reach to count as
    /// a match. The default of 0.6 tolerates roughly 40% dissimilarity.
    pub min_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaletteConfig {
    pub timeout_seconds: u64,
    pub max_image_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub model: String,
    /// API key for the generation collaborator. Falls back to the
    /// GEMINI_API_KEY environment variable when unset.
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
    /// Region qualifier embedded in the generation instruction so the
    /// collaborator grounds its search in the right place.
    pub region: String,
}

impl GeneratorConfig {
    /// Configured key, falling back to the environment.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.is_empty())
            .or_else(|| std::env::var("GEMINI_API_KEY").ok().filter(|key| !key.is_empty()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://./school-pages.db".to_string(),
                max_connections: 5,
            },
            web: WebConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            catalog: CatalogConfig {
                path: None,
                asset_base_url:
                    "https://raw.githubusercontent.com/panasheMuriro/ZimbabweSchools/refs/heads/main/frontend/public"
                        .to_string(),
            },
            cache: CacheConfig {
                policy: CachePolicy::Ttl,
                ttl_seconds: 7 * 24 * 60 * 60,
            },
            resolver: ResolverConfig { min_score: 0.6 },
            palette: PaletteConfig {
                timeout_seconds: 30,
                max_image_bytes: 10 * 1024 * 1024,
            },
            generator: GeneratorConfig {
                model: "gemini-2.5-flash-lite".to_string(),
                api_key: None,
                timeout_seconds: 120,
                region: "Zimbabwe".to_string(),
            },
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());

        if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(&config_file)?;
            Ok(toml::from_str(&contents)?)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(&config_file, contents)?;
            Ok(default_config)
        }
    }
}
