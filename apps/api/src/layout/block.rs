//! Block layout: positions wrapped lines so the block is centered on the canvas.
//!
//! Each line is centered horizontally on its own; lines stack top to bottom with
//! a spacing proportional to the first line's height. The stacked block is
//! centered vertically. Offsets may go negative when the block is larger than
//! the canvas; drawing clips at the canvas edges.

use serde::Serialize;

use crate::layout::fitter::WrappedBlock;

/// Spacing between lines as a fraction of the first line's height.
const LINE_SPACING_FRACTION: f64 = 0.25;
const MIN_LINE_SPACING_PX: u32 = 4;
/// Horizontal margin kept clear on each side, as a fraction of canvas width.
const SIDE_MARGIN_FRACTION: f64 = 0.10;

/// Top-left draw position of one line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LineOrigin {
    pub x: i64,
    pub y: i64,
}

/// A rectangle in canvas pixel space. May extend past the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PanelRect {
    pub x: i64,
    pub y: i64,
    pub width: u64,
    pub height: u64,
}

/// Draw instructions for a `WrappedBlock`, one origin per line in line order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LayoutResult {
    pub line_origins: Vec<LineOrigin>,
    /// Left edge of the widest line.
    pub block_x: i64,
    /// Top edge of the first line.
    pub block_y: i64,
    pub block_width: u32,
    pub block_height: u64,
    pub line_spacing: u32,
}

impl LayoutResult {
    pub fn is_empty(&self) -> bool {
        self.line_origins.is_empty()
    }

    /// The block's bounding box grown by `padding` on every side, or `None`
    /// when there is nothing to draw.
    pub fn panel(&self, padding: u32) -> Option<PanelRect> {
        if self.is_empty() {
            return None;
        }
        let pad = padding as i64;
        Some(PanelRect {
            x: self.block_x - pad,
            y: self.block_y - pad,
            width: self.block_width as u64 + 2 * padding as u64,
            height: self.block_height + 2 * padding as u64,
        })
    }
}

/// Widest line the fitter may produce on a canvas `canvas_width` pixels wide.
pub fn max_line_width(canvas_width: u32) -> u32 {
    let margin = (SIDE_MARGIN_FRACTION * canvas_width as f64) as u32;
    canvas_width.saturating_sub(2 * margin)
}

/// `max(4, round(0.25 * first_line_height))`.
pub fn line_spacing(first_line_height: u32) -> u32 {
    let proportional = (LINE_SPACING_FRACTION * first_line_height as f64).round() as u32;
    proportional.max(MIN_LINE_SPACING_PX)
}

/// Computes per-line origins centering `block` on a `canvas_width × canvas_height` canvas.
pub fn layout(block: &WrappedBlock, canvas_width: u32, canvas_height: u32) -> LayoutResult {
    let Some(&first_height) = block.line_heights.first() else {
        return LayoutResult::default();
    };

    let spacing = line_spacing(first_height);
    let line_count = block.line_heights.len() as u64;
    let total_height = block.line_heights.iter().map(|h| *h as u64).sum::<u64>()
        + spacing as u64 * (line_count - 1);
    let y0 = centered_offset(canvas_height, total_height);

    let mut line_origins = Vec::with_capacity(block.line_widths.len());
    let mut y = y0;
    for (width, height) in block.line_widths.iter().zip(&block.line_heights) {
        line_origins.push(LineOrigin {
            x: centered_offset(canvas_width, *width as u64),
            y,
        });
        y += *height as i64 + spacing as i64;
    }

    let block_width = block.max_width();
    LayoutResult {
        block_x: centered_offset(canvas_width, block_width as u64),
        block_y: y0,
        block_width,
        block_height: total_height,
        line_spacing: spacing,
        line_origins,
    }
}

/// `(canvas - extent) / 2`, rounded toward negative infinity.
fn centered_offset(canvas: u32, extent: u64) -> i64 {
    (canvas as i64 - extent as i64).div_euclid(2)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
