//! Page generation
//!
//! Turns a resolved school into a complete HTML document: extract a theme
//! from the school logo, build the generation instruction, and hand it to
//! the generation collaborator. Palette extraction is best-effort and falls
//! back to the default theme; generation failures surface to the caller,
//! which must not cache anything for them.

pub mod gemini;
pub mod prompt;

pub use gemini::{GeminiClient, PageGenerator};
pub use prompt::build_page_prompt;

use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::GenerationError;
use crate::models::School;
use crate::palette::{Palette, PaletteSource};

pub struct GenerationService {
    palette_source: Arc<dyn PaletteSource>,
    generator: Arc<dyn PageGenerator>,
    region: String,
}

impl GenerationService {
    pub fn new(
        palette_source: Arc<dyn PaletteSource>,
        generator: Arc<dyn PageGenerator>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            palette_source,
            generator,
            region: region.into(),
        }
    }

    /// Generate the page for a school.
    ///
    /// A failed palette extraction downgrades to the default theme and the
    /// generation still proceeds; only generation itself can fail here.
    pub async fn generate(&self, school: &School) -> Result<String, GenerationError> {
        let palette = match self.palette_source.palette_for(&school.logo_url).await {
            Ok(palette) => palette,
            Err(e) => {
                warn!(
                    "Palette extraction failed for '{}', using default theme: {}",
                    school.name, e
                );
                Palette::fallback()
            }
        };

        let instruction = build_page_prompt(&school.name, &school.logo_url, &palette, &self.region);
        let html = self.generator.generate_page(&instruction).await?;

        info!("Generated page for '{}' ({} bytes)", school.name, html.len());
        Ok(html)
    }
}
