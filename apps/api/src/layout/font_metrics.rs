//! Text measurement for resolved fonts.
//!
//! The fitter and block layout only ever see the `TextMeasurer` trait, so tests
//! can swap in a fixed-advance measurer while the service measures with the
//! real glyph outlines.
//!
//! Two faces are supported:
//! - Scalable TrueType/OpenType faces via `rusttype`, measured by the union of
//!   the glyph pixel bounding boxes (the ink extent of the line).
//! - The built-in `font8x8` bitmap face, fixed at 8×8 px per character with no
//!   size control. Used only when no font file could be found.

use rusttype::{point, Font, Scale};
use serde::Serialize;

use crate::layout::font_resolver::{FontFace, ResolvedFont};

/// Side length in pixels of one bitmap glyph cell.
pub const BITMAP_GLYPH_PX: u32 = 8;

// ────────────────────────────────────────────────────────────────────────────
// Measurement contract
// ────────────────────────────────────────────────────────────────────────────

/// Rendered pixel size of a single line of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TextExtent {
    pub width: u32,
    pub height: u32,
}

/// Measures a single line of text in pixels. Must be pure: the same line always
/// measures the same.
pub trait TextMeasurer {
    fn measure(&self, text: &str) -> TextExtent;
}

impl<T: TextMeasurer + ?Sized> TextMeasurer for &T {
    fn measure(&self, text: &str) -> TextExtent {
        (**self).measure(text)
    }
}

impl TextMeasurer for ResolvedFont {
    fn measure(&self, text: &str) -> TextExtent {
        match self.face() {
            FontFace::Scalable(font) => ink_bounds(font, self.size() as f32, text)
                .map(|b| b.extent())
                .unwrap_or_default(),
            FontFace::Bitmap => bitmap_extent(text),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scalable faces
// ────────────────────────────────────────────────────────────────────────────

/// Pixel bounding box of the inked area of a laid-out line, relative to a
/// layout origin whose baseline sits at the font ascent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InkBounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl InkBounds {
    pub fn extent(&self) -> TextExtent {
        TextExtent {
            width: (self.max_x - self.min_x).max(0) as u32,
            height: (self.max_y - self.min_y).max(0) as u32,
        }
    }
}

/// Returns the ink bounds of `text` at `px`, or `None` when nothing is inked
/// (empty string or whitespace only).
pub fn ink_bounds(font: &Font<'static>, px: f32, text: &str) -> Option<InkBounds> {
    let scale = Scale::uniform(px);
    let ascent = font.v_metrics(scale).ascent;

    font.layout(text, scale, point(0.0, ascent))
        .filter_map(|glyph| glyph.pixel_bounding_box())
        .fold(None, |acc: Option<InkBounds>, bb| {
            Some(match acc {
                None => InkBounds {
                    min_x: bb.min.x,
                    min_y: bb.min.y,
                    max_x: bb.max.x,
                    max_y: bb.max.y,
                },
                Some(b) => InkBounds {
                    min_x: b.min_x.min(bb.min.x),
                    min_y: b.min_y.min(bb.min.y),
                    max_x: b.max_x.max(bb.max.x),
                    max_y: b.max_y.max(bb.max.y),
                },
            })
        })
}

// ────────────────────────────────────────────────────────────────────────────
// Bitmap face
// ────────────────────────────────────────────────────────────────────────────

/// Extent of `text` in the fixed 8×8 bitmap face. Every character, including
/// unsupported ones (drawn as `?`), advances one full cell.
pub fn bitmap_extent(text: &str) -> TextExtent {
    let chars = text.chars().count() as u32;
    if chars == 0 {
        return TextExtent::default();
    }
    TextExtent {
        width: chars * BITMAP_GLYPH_PX,
        height: BITMAP_GLYPH_PX,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
