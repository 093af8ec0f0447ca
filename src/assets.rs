use rust_embed::RustEmbed;

/// Embedded static web assets (the landing page)
#[derive(RustEmbed)]
#[folder = "static/"]
#[prefix = "static/"]
pub struct StaticAssets;

/// Embedded database migrations
#[derive(RustEmbed)]
#[folder = "src/store/migrations/"]
#[prefix = "migrations/"]
pub struct MigrationAssets;

/// Embedded default school catalog
#[derive(RustEmbed)]
#[folder = "data/"]
#[prefix = "data/"]
pub struct CatalogAssets;

impl StaticAssets {
    /// Get a static asset by path
    pub fn get_asset(path: &str) -> Option<rust_embed::EmbeddedFile> {
        Self::get(path)
    }

    /// Get the content type for a given file extension
    pub fn get_content_type(path: &str) -> &'static str {
        match path.split('.').next_back() {
            Some("html") => "text/html; charset=utf-8",
            Some("css") => "text/css; charset=utf-8",
            Some("js") => "application/javascript; charset=utf-8",
            Some("json") => "application/json; charset=utf-8",
            Some("png") => "image/png",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("svg") => "image/svg+xml; charset=utf-8",
            Some("ico") => "image/x-icon",
            _ => "application/octet-stream",
        }
    }
}

impl MigrationAssets {
    /// Get all migration files sorted by filename
    pub fn get_migrations() -> Vec<(String, String)> {
        let mut migrations = Vec::new();

        for file_path in Self::iter() {
            if let Some(file) = Self::get(&file_path) {
                let content = String::from_utf8_lossy(&file.data).to_string();
                let name = file_path
                    .strip_prefix("migrations/")
                    .unwrap_or(&file_path)
                    .to_string();
                migrations.push((name, content));
            }
        }

        migrations.sort_by(|a, b| a.0.cmp(&b.0));
        migrations
    }
}

impl CatalogAssets {
    /// The embedded default catalog JSON
    pub fn default_catalog() -> Option<rust_embed::EmbeddedFile> {
        Self::get("data/schools.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_detection() {
        assert_eq!(
            StaticAssets::get_content_type("index.html"),
            "text/html; charset=utf-8"
        );
        assert_eq!(
            StaticAssets::get_content_type("schools.json"),
            "application/json; charset=utf-8"
        );
        assert_eq!(StaticAssets::get_content_type("favicon.ico"), "image/x-icon");
        assert_eq!(
            StaticAssets::get_content_type("unknown"),
            "application/octet-stream"
        );
    }

    #[test]
    fn landing_page_is_embedded() {
        let index = StaticAssets::get_asset("static/index.html").expect("index.html embedded");
        let content = String::from_utf8_lossy(&index.data);
        assert!(content.contains("<!DOCTYPE html>") || content.contains("<!doctype html>"));
    }

    #[test]
    fn migrations_are_embedded_and_sorted() {
        let migrations = MigrationAssets::get_migrations();
        assert!(!migrations.is_empty(), "should have at least one migration");
        for window in migrations.windows(2) {
            assert!(window[0].0 <= window[1].0, "migrations sorted by name");
        }
    }

    #[test]
    fn default_catalog_is_embedded() {
        let catalog = CatalogAssets::default_catalog().expect("schools.json embedded");
        let parsed: serde_json::Value = serde_json::from_slice(&catalog.data).unwrap();
        assert!(parsed.as_array().is_some_and(|schools| !schools.is_empty()));
    }

    #[test]
    fn nonexistent_assets() {
        assert!(StaticAssets::get_asset("static/nonexistent.html").is_none());
        assert!(CatalogAssets::get("data/other.json").is_none());
    }
}
