//! Font resolution for text watermarks.
//!
//! Named fonts are looked up as `{name}.ttf`, either inside the configured font
//! directory or relative to the working directory. Loading a named font can
//! fail in many ways (missing file, unreadable file, not a TrueType font); all
//! of them are logged and answered with the embedded default font, so callers
//! always receive a usable [`FontHandle`].

use super::FontLoadError;
use crate::constants::{FONT_FILE_EXTENSION, MAX_FONT_SIZE};
use crate::metrics::WatermarkMetrics;
use ab_glyph::{Font, FontArc, PxScale};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Embedded default font (DejaVu Sans Mono, free license).
const EMBEDDED_FONT_DATA: &[u8] = include_bytes!("fonts/DejaVuSansMono.ttf");

static DEFAULT_FONT: OnceLock<FontArc> = OnceLock::new();

/// Get the default font, initializing it lazily.
fn default_font() -> FontArc {
    DEFAULT_FONT
        .get_or_init(|| {
            FontArc::try_from_slice(EMBEDDED_FONT_DATA)
                .expect("Failed to load embedded font - this is a bug")
        })
        .clone()
}

/// Em sizes are kept within `1..=MAX_FONT_SIZE`.
fn clamp_size(size: u32) -> u32 {
    size.clamp(1, MAX_FONT_SIZE)
}

/// Where a loaded font came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    Embedded,
    File(PathBuf),
}

/// A font ready for rendering at a fixed size.
#[derive(Clone)]
pub struct FontHandle {
    font: FontArc,
    size: u32,
    source: FontSource,
}

impl fmt::Debug for FontHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontHandle")
            .field("size", &self.size)
            .field("source", &self.source)
            .finish()
    }
}

impl FontHandle {
    /// The embedded default font at `size` pixels.
    pub fn embedded(size: u32) -> Self {
        Self {
            font: default_font(),
            size: clamp_size(size),
            source: FontSource::Embedded,
        }
    }

    pub fn font(&self) -> &FontArc {
        &self.font
    }

    /// Em size in pixels.
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn source(&self) -> &FontSource {
        &self.source
    }

    pub fn is_default(&self) -> bool {
        self.source == FontSource::Embedded
    }

    /// Glyph scale for the requested em size.
    ///
    /// ab_glyph scales by line height (ascent - descent), while font sizes
    /// are em sizes, so the em size is converted through the font's metrics.
    pub fn scale(&self) -> PxScale {
        let em = self.size as f32;
        match self.font.units_per_em() {
            Some(units_per_em) if units_per_em > 0.0 => {
                PxScale::from(em * self.font.height_unscaled() / units_per_em)
            }
            _ => PxScale::from(em),
        }
    }
}

/// Path a named font is expected at.
///
/// Only the last path component of `name` is used, so a name can never point
/// outside `font_dir` (or the working directory).
pub fn font_path(name: &str, font_dir: Option<&Path>) -> PathBuf {
    let name = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let file_name = format!("{}.{}", name, FONT_FILE_EXTENSION);
    match font_dir {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}

/// Load a named font, reporting why it could not be used.
pub fn try_load_font(
    name: &str,
    size: u32,
    font_dir: Option<&Path>,
) -> Result<FontHandle, FontLoadError> {
    let path = font_path(name, font_dir);
    let data = std::fs::read(&path).map_err(|source| FontLoadError::Io {
        path: path.clone(),
        source,
    })?;
    let font = FontArc::try_from_vec(data).map_err(|e| FontLoadError::InvalidFont {
        path: path.clone(),
        message: e.to_string(),
    })?;

    Ok(FontHandle {
        font,
        size: clamp_size(size),
        source: FontSource::File(path),
    })
}

/// Resolve a font relative to the working directory. Never fails.
pub fn load_font(name: Option<&str>, size: u32) -> FontHandle {
    load_font_from(name, size, None)
}

/// Resolve a font, looking named fonts up in `font_dir` when given. Never fails.
pub fn load_font_from(name: Option<&str>, size: u32, font_dir: Option<&Path>) -> FontHandle {
    let name = match name.map(str::trim) {
        Some(name) if !name.is_empty() => name,
        _ => return FontHandle::embedded(size),
    };

    match try_load_font(name, size, font_dir) {
        Ok(handle) => {
            tracing::debug!(font = name, size, "Loaded named font");
            handle
        }
        Err(e) => {
            tracing::warn!(
                font = name,
                size,
                error = %e,
                "Falling back to default font"
            );
            WatermarkMetrics::global().font_fallbacks.inc();
            FontHandle::embedded(size)
        }
    }
}
