//! Font resolution: turns a per-request `FontSpec` into a loaded `ResolvedFont`.
//!
//! # Path selection
//! 1. An explicit path is used when it names an existing file.
//! 2. Otherwise the configured candidate list is scanned in order.
//! 3. If nothing exists, the built-in bitmap face is used (degraded mode, logged).
//!
//! A path that exists but does not parse as a font is fatal for the request;
//! it is never silently replaced by the next candidate.
//!
//! # Size selection
//! `requested_size > 0` is used verbatim (callers reject sizes above
//! `MAX_FONT_PX`), otherwise the size is 10% of the
//! shorter canvas side, clamped to `MIN_AUTO_FONT_PX..=MAX_AUTO_FONT_PX`.

use std::fmt;
use std::path::{Path, PathBuf};

use rusttype::Font;
use tracing::{debug, warn};

use crate::layout::error::LayoutError;

pub const MIN_AUTO_FONT_PX: u32 = 14;
pub const MAX_AUTO_FONT_PX: u32 = 128;
/// Largest explicit size accepted from callers. Glyph rasterization memory
/// grows with the square of the size.
pub const MAX_FONT_PX: u32 = 1024;
const AUTO_FONT_FRACTION: f64 = 0.10;

/// Default ordered font search list. Relative entries resolve against the
/// working directory of the process.
pub const DEFAULT_FONT_CANDIDATES: &[&str] = &[
    "assets/fonts/Inter-Regular.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:/Windows/Fonts/arial.ttf",
];

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// Caller-supplied font preferences for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontSpec {
    /// Explicit font file. Empty strings are treated as absent.
    pub path: Option<String>,
    /// Pixel size; 0 selects the automatic size.
    pub requested_size: u32,
}

/// The glyph source backing a `ResolvedFont`.
pub enum FontFace {
    Scalable(Font<'static>),
    /// `font8x8` basic glyphs at a fixed 8 px cell.
    Bitmap,
}

impl fmt::Debug for FontFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontFace::Scalable(font) => write!(f, "Scalable({} glyphs)", font.glyph_count()),
            FontFace::Bitmap => write!(f, "Bitmap"),
        }
    }
}

/// A font ready for measuring and drawing. Owns the font bytes, so the file
/// itself is closed as soon as resolution returns.
#[derive(Debug)]
pub struct ResolvedFont {
    path: Option<PathBuf>,
    size: u32,
    face: FontFace,
}

impl ResolvedFont {
    /// Builds a font around an already-parsed face.
    pub fn new(path: Option<PathBuf>, size: u32, face: FontFace) -> Self {
        Self { path, size, face }
    }

    pub fn bitmap(size: u32) -> Self {
        Self::new(None, size, FontFace::Bitmap)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Selected pixel size. The bitmap face ignores it and always draws 8 px glyphs.
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn face(&self) -> &FontFace {
        &self.face
    }

    pub fn is_scalable(&self) -> bool {
        matches!(self.face, FontFace::Scalable(_))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Resolver
// ────────────────────────────────────────────────────────────────────────────

/// Resolves fonts against an ordered candidate list fixed at construction.
#[derive(Debug, Clone)]
pub struct FontResolver {
    candidates: Vec<PathBuf>,
}

impl FontResolver {
    pub fn new(candidates: Vec<PathBuf>) -> Self {
        Self { candidates }
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// Picks the font file to load, or `None` when the bitmap face must be used.
    pub fn pick_path(&self, explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(explicit) = explicit.map(str::trim).filter(|p| !p.is_empty()) {
            let path = Path::new(explicit);
            if path.is_file() {
                return Some(path.to_path_buf());
            }
            debug!("Explicit font path {explicit} does not exist, scanning candidates");
        }
        self.candidates.iter().find(|p| p.is_file()).cloned()
    }

    /// Resolves `spec` for a canvas of the given size.
    pub fn resolve(
        &self,
        spec: &FontSpec,
        canvas_width: u32,
        canvas_height: u32,
    ) -> Result<ResolvedFont, LayoutError> {
        let size = select_font_size(spec.requested_size, canvas_width, canvas_height);

        match self.pick_path(spec.path.as_deref()) {
            Some(path) => {
                let font = load_font(&path)?;
                debug!("Resolved font {} at {size}px", path.display());
                Ok(ResolvedFont::new(Some(path), size, FontFace::Scalable(font)))
            }
            None => {
                warn!(
                    "No font file found among {} candidates; using fixed-size bitmap font",
                    self.candidates.len()
                );
                Ok(ResolvedFont::bitmap(size))
            }
        }
    }
}

/// Returns `requested` when positive, otherwise the automatic size.
pub fn select_font_size(requested: u32, canvas_width: u32, canvas_height: u32) -> u32 {
    if requested > 0 {
        requested
    } else {
        auto_font_size(canvas_width, canvas_height)
    }
}

/// `clamp(round(0.10 * min(w, h)), 14, 128)`.
pub fn auto_font_size(canvas_width: u32, canvas_height: u32) -> u32 {
    let shorter = canvas_width.min(canvas_height) as f64;
    let scaled = (AUTO_FONT_FRACTION * shorter).round() as u32;
    scaled.clamp(MIN_AUTO_FONT_PX, MAX_AUTO_FONT_PX)
}

fn load_font(path: &Path) -> Result<Font<'static>, LayoutError> {
    let bytes = std::fs::read(path).map_err(|source| LayoutError::FontRead {
        path: path.to_path_buf(),
        source,
    })?;
    Font::try_from_vec(bytes).ok_or_else(|| LayoutError::FontLoad {
        path: path.to_path_buf(),
        reason: "not a valid TrueType/OpenType font".to_string(),
    })
}

/// DejaVu Sans loaded through the resolver, for tests of the scalable path.
#[cfg(test)]
pub(crate) fn fixture_font(size: u32) -> ResolvedFont {
    let path = PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/DejaVuSans.ttf"));
    let spec = FontSpec {
        path: None,
        requested_size: size,
    };
    FontResolver::new(vec![path])
        .resolve(&spec, 1000, 1000)
        .expect("fixture font loads")
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
