//! Logo color palette extraction.
//!
//! Pages are themed with three colors pulled from the school's logo. The
//! logo is fetched over HTTP, downscaled, and its dominant colors are
//! classified into vibrant/muted swatches by saturation and luma; the
//! primary/secondary/accent roles are then filled from those swatches.
//! Extraction is best-effort by contract: callers fall back to
//! [`Palette::fallback`] when it fails, and a page is generated either way.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use image::DynamicImage;
use tracing::debug;

use crate::config::PaletteConfig;
use crate::errors::PaletteError;

/// Default theme used when extraction fails: deep blue primary, light gray
/// secondary, amber accent.
pub const DEFAULT_PRIMARY: &str = "#1E3A8A";
pub const DEFAULT_SECONDARY: &str = "#E5E7EB";
pub const DEFAULT_ACCENT: &str = "#F59E0B";

// Swatch classification bands. Saturation at or above the vibrant minimum
// separates vibrant from muted; luma below/above the dark/light bounds
// separates the dark and light variants from the mid band.
const MIN_VIBRANT_SATURATION: f64 = 0.35;
const DARK_LUMA_MAX: f64 = 0.45;
const LIGHT_LUMA_MIN: f64 = 0.55;
const NORMAL_LUMA_MIN: f64 = 0.3;
const NORMAL_LUMA_MAX: f64 = 0.7;

const TARGET_NORMAL_LUMA: f64 = 0.5;
const TARGET_DARK_LUMA: f64 = 0.26;
const TARGET_LIGHT_LUMA: f64 = 0.74;

/// Three-role color theme for a generated page, as CSS hex strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
}

impl Palette {
    /// The documented default theme, used whenever extraction fails.
    pub fn fallback() -> Self {
        Self {
            primary: DEFAULT_PRIMARY.to_string(),
            secondary: DEFAULT_SECONDARY.to_string(),
            accent: DEFAULT_ACCENT.to_string(),
        }
    }
}

/// Source of page themes. The production implementation fetches the school
/// logo; tests substitute canned palettes or failures.
#[async_trait]
pub trait PaletteSource: Send + Sync {
    async fn palette_for(&self, logo_url: &str) -> Result<Palette, PaletteError>;
}

/// Extracts palettes from logo images fetched over HTTP.
pub struct LogoPalette {
    client: reqwest::Client,
    max_image_bytes: usize,
}

impl LogoPalette {
    pub fn new(config: &PaletteConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("school-pages/1.0")
            .build()?;

        Ok(Self {
            client,
            max_image_bytes: config.max_image_bytes,
        })
    }
}

#[async_trait]
impl PaletteSource for LogoPalette {
    async fn palette_for(&self, logo_url: &str) -> Result<Palette, PaletteError> {
        debug!("Fetching logo for palette extraction: {}", logo_url);

        let response = self.client.get(logo_url).send().await?;

        if !response.status().is_success() {
            return Err(PaletteError::FetchFailed {
                status: response.status().as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if !content_type.starts_with("image/") {
            return Err(PaletteError::NotAnImage {
                content_type: content_type.to_string(),
            });
        }

        let bytes = response.bytes().await?;
        if bytes.len() > self.max_image_bytes {
            return Err(PaletteError::TooLarge {
                size: bytes.len(),
                max_size: self.max_image_bytes,
            });
        }

        let image = image::load_from_memory(&bytes).map_err(|e| PaletteError::Decode(e.to_string()))?;

        extract_palette(&image)
    }
}

/// Classified dominant colors of an image. Any slot may be empty when no
/// dominant color falls in its band.
#[derive(Debug, Default)]
struct Swatches {
    vibrant: Option<String>,
    dark_vibrant: Option<String>,
    light_vibrant: Option<String>,
    muted: Option<String>,
    dark_muted: Option<String>,
}

impl Swatches {
    fn is_empty(&self) -> bool {
        self.vibrant.is_none()
            && self.dark_vibrant.is_none()
            && self.light_vibrant.is_none()
            && self.muted.is_none()
            && self.dark_muted.is_none()
    }
}

/// A dominant color candidate: averaged bucket color plus how many sampled
/// pixels landed in the bucket.
struct Candidate {
    r: u8,
    g: u8,
    b: u8,
    saturation: f64,
    luma: f64,
    population: u64,
}

impl Candidate {
    fn hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Copy)]
enum SwatchKind {
    Vibrant,
    DarkVibrant,
    LightVibrant,
    Muted,
    DarkMuted,
}

impl SwatchKind {
    fn accepts(self, candidate: &Candidate) -> bool {
        let (s, l) = (candidate.saturation, candidate.luma);
        match self {
            SwatchKind::Vibrant => {
                s >= MIN_VIBRANT_SATURATION && (NORMAL_LUMA_MIN..=NORMAL_LUMA_MAX).contains(&l)
            }
            SwatchKind::DarkVibrant => s >= MIN_VIBRANT_SATURATION && l < DARK_LUMA_MAX,
            SwatchKind::LightVibrant => s >= MIN_VIBRANT_SATURATION && l > LIGHT_LUMA_MIN,
            SwatchKind::Muted => {
                s < MIN_VIBRANT_SATURATION && (NORMAL_LUMA_MIN..=NORMAL_LUMA_MAX).contains(&l)
            }
            SwatchKind::DarkMuted => s < MIN_VIBRANT_SATURATION && l < DARK_LUMA_MAX,
        }
    }

    fn target_luma(self) -> f64 {
        match self {
            SwatchKind::Vibrant | SwatchKind::Muted => TARGET_NORMAL_LUMA,
            SwatchKind::DarkVibrant | SwatchKind::DarkMuted => TARGET_DARK_LUMA,
            SwatchKind::LightVibrant => TARGET_LIGHT_LUMA,
        }
    }

    /// Population-weighted fitness, pulled toward the band's target luma.
    fn score(self, candidate: &Candidate) -> f64 {
        candidate.population as f64 * (1.0 - (candidate.luma - self.target_luma()).abs())
    }
}

/// Extract the three-role palette from a decoded image.
///
/// Fails with [`PaletteError::EmptyPalette`] only when no pixel survives
/// sampling (for example a fully transparent or pure-white logo); a partial
/// swatch set still yields a palette with per-role defaults filling the gaps.
pub fn extract_palette(image: &DynamicImage) -> Result<Palette, PaletteError> {
    let swatches = collect_swatches(image);
    if swatches.is_empty() {
        return Err(PaletteError::EmptyPalette);
    }

    Ok(Palette {
        primary: swatches
            .vibrant
            .clone()
            .or(swatches.muted.clone())
            .unwrap_or_else(|| DEFAULT_PRIMARY.to_string()),
        secondary: swatches
            .dark_vibrant
            .clone()
            .or(swatches.dark_muted.clone())
            .unwrap_or_else(|| DEFAULT_SECONDARY.to_string()),
        accent: swatches
            .light_vibrant
            .clone()
            .or(swatches.vibrant.clone())
            .unwrap_or_else(|| DEFAULT_ACCENT.to_string()),
    })
}

fn collect_swatches(image: &DynamicImage) -> Swatches {
    let thumbnail = image.thumbnail(64, 64).to_rgba8();

    // Histogram at 4 bits per channel; each bucket averages its members so
    // a uniform region keeps its exact color.
    let mut buckets: HashMap<u16, (u64, u64, u64, u64)> = HashMap::new();
    for pixel in thumbnail.pixels() {
        let [r, g, b, a] = pixel.0;
        // Skip transparent pixels and near-white background fill.
        if a < 125 {
            continue;
        }
        if r > 250 && g > 250 && b > 250 {
            continue;
        }

        let key = ((r as u16 >> 4) << 8) | ((g as u16 >> 4) << 4) | (b as u16 >> 4);
        let entry = buckets.entry(key).or_insert((0, 0, 0, 0));
        entry.0 += 1;
        entry.1 += r as u64;
        entry.2 += g as u64;
        entry.3 += b as u64;
    }

    let candidates: Vec<Candidate> = buckets
        .values()
        .map(|&(count, r_sum, g_sum, b_sum)| {
            let r = (r_sum / count) as u8;
            let g = (g_sum / count) as u8;
            let b = (b_sum / count) as u8;
            let (saturation, luma) = saturation_and_luma(r, g, b);
            Candidate {
                r,
                g,
                b,
                saturation,
                luma,
                population: count,
            }
        })
        .collect();

    Swatches {
        vibrant: pick(&candidates, SwatchKind::Vibrant),
        dark_vibrant: pick(&candidates, SwatchKind::DarkVibrant),
        light_vibrant: pick(&candidates, SwatchKind::LightVibrant),
        muted: pick(&candidates, SwatchKind::Muted),
        dark_muted: pick(&candidates, SwatchKind::DarkMuted),
    }
}

fn pick(candidates: &[Candidate], kind: SwatchKind) -> Option<String> {
    candidates
        .iter()
        .filter(|c| kind.accepts(c))
        .max_by(|a, b| kind.score(a).total_cmp(&kind.score(b)))
        .map(Candidate::hex)
}

/// HSL saturation and luma for an RGB color. Hue is never needed here.
fn saturation_and_luma(r: u8, g: u8, b: u8) -> (f64, f64) {
    let r = r as f64 / 255.0;
    let g = g as f64 / 255.0;
    let b = b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let luma = (max + min) / 2.0;

    let delta = max - min;
    let saturation = if delta == 0.0 {
        0.0
    } else {
        delta / (1.0 - (2.0 * luma - 1.0).abs())
    };

    (saturation, luma)
}
