//! Compositing: draws a laid-out watermark block onto an RGBA canvas.
//!
//! Consumes the core's `WrappedBlock` and `LayoutResult` as draw instructions
//! only: a translucent white panel behind the block, then each line with its
//! ink top-left placed on its origin. Everything clips at the canvas edges.

use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgba, RgbaImage};
use rusttype::{point, Font, Scale};

use crate::layout::font_metrics::{ink_bounds, BITMAP_GLYPH_PX};
use crate::layout::{FontFace, LayoutResult, LineOrigin, PanelRect, ResolvedFont, WrappedBlock};

const PANEL_RGB: [u8; 3] = [255, 255, 255];

/// How the block is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatermarkStyle {
    pub text_color: Rgba<u8>,
    /// Alpha of the background panel; 0 disables it.
    pub panel_opacity: u8,
    pub panel_padding: u32,
}

/// Paints `block` onto `canvas` at the positions in `layout`.
pub fn composite(
    canvas: &mut RgbaImage,
    font: &ResolvedFont,
    block: &WrappedBlock,
    layout: &LayoutResult,
    style: &WatermarkStyle,
) {
    if block.is_empty() {
        return;
    }

    if style.panel_opacity > 0 {
        if let Some(panel) = layout.panel(style.panel_padding) {
            let [r, g, b] = PANEL_RGB;
            fill_rect(canvas, panel, Rgba([r, g, b, style.panel_opacity]));
        }
    }

    for (line, origin) in block.lines.iter().zip(&layout.line_origins) {
        match font.face() {
            FontFace::Scalable(face) => {
                draw_scalable_line(canvas, face, font.size() as f32, line, *origin, style.text_color)
            }
            FontFace::Bitmap => draw_bitmap_line(canvas, line, *origin, style.text_color),
        }
    }
}

fn fill_rect(canvas: &mut RgbaImage, rect: PanelRect, color: Rgba<u8>) {
    let x0 = rect.x.max(0);
    let y0 = rect.y.max(0);
    let x1 = rect.x.saturating_add(rect.width as i64).min(canvas.width() as i64);
    let y1 = rect.y.saturating_add(rect.height as i64).min(canvas.height() as i64);

    for y in y0..y1 {
        for x in x0..x1 {
            blend_pixel(canvas, x, y, color, 1.0);
        }
    }
}

fn draw_scalable_line(
    canvas: &mut RgbaImage,
    font: &Font<'static>,
    px: f32,
    line: &str,
    origin: LineOrigin,
    color: Rgba<u8>,
) {
    let Some(ink) = ink_bounds(font, px, line) else {
        return;
    };
    let scale = Scale::uniform(px);
    let ascent = font.v_metrics(scale).ascent;

    // Shift so the ink box's top-left lands on the origin.
    let dx = origin.x - ink.min_x as i64;
    let dy = origin.y - ink.min_y as i64;
    let (width, height) = (canvas.width() as i64, canvas.height() as i64);

    for glyph in font.layout(line, scale, point(0.0, ascent)) {
        let Some(bb) = glyph.pixel_bounding_box() else {
            continue;
        };
        let (left, top) = (dx + bb.min.x as i64, dy + bb.min.y as i64);
        let (right, bottom) = (dx + bb.max.x as i64, dy + bb.max.y as i64);
        // Glyphs entirely off the canvas are never rasterized.
        if right <= 0 || bottom <= 0 || left >= width || top >= height {
            continue;
        }
        glyph.draw(|gx, gy, coverage| {
            blend_pixel(canvas, left + gx as i64, top + gy as i64, color, coverage);
        });
    }
}

fn draw_bitmap_line(canvas: &mut RgbaImage, line: &str, origin: LineOrigin, color: Rgba<u8>) {
    let cell = BITMAP_GLYPH_PX as i64;
    for (idx, ch) in line.chars().enumerate() {
        let Some(glyph) = BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?')) else {
            continue;
        };
        let cell_x = origin.x + idx as i64 * cell;
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..8 {
                if (bits >> col) & 1 == 0 {
                    continue;
                }
                blend_pixel(canvas, cell_x + col, origin.y + row as i64, color, 1.0);
            }
        }
    }
}

/// Source-over blend of `color` scaled by `coverage` into the pixel at `(x, y)`.
/// Out-of-canvas coordinates are ignored.
fn blend_pixel(canvas: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>, coverage: f32) {
    if x < 0 || y < 0 || x >= canvas.width() as i64 || y >= canvas.height() as i64 {
        return;
    }
    let alpha = (coverage.clamp(0.0, 1.0) * color.0[3] as f32).round() as u16;
    if alpha == 0 {
        return;
    }

    let dst = canvas.get_pixel_mut(x as u32, y as u32);
    let inv = 255 - alpha;
    let mix = |d: u8, s: u8| -> u8 { ((d as u16 * inv + s as u16 * alpha + 127) / 255) as u8 };
    let out_alpha = alpha + (dst.0[3] as u16 * inv + 127) / 255;
    *dst = Rgba([
        mix(dst.0[0], color.0[0]),
        mix(dst.0[1], color.0[1]),
        mix(dst.0[2], color.0[2]),
        out_alpha.min(255) as u8,
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::font_metrics::TextMeasurer;
    use crate::layout::{fit, layout};

    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    fn style(panel_opacity: u8) -> WatermarkStyle {
        WatermarkStyle {
            text_color: BLACK,
            panel_opacity,
            panel_padding: 4,
        }
    }

    fn plan(text: &str, w: u32, h: u32) -> (ResolvedFont, WrappedBlock, LayoutResult) {
        let font = ResolvedFont::bitmap(14);
        let block = fit(text, &font, w);
        let result = layout(&block, w, h);
        (font, block, result)
    }

    #[test]
    fn test_empty_block_leaves_canvas_untouched() {
        let mut canvas = RgbaImage::from_pixel(40, 20, BLUE);
        let (font, block, result) = plan("", 40, 20);
        composite(&mut canvas, &font, &block, &result, &style(255));
        assert!(canvas.pixels().all(|p| *p == BLUE));
    }

    #[test]
    fn test_panel_blends_white_at_requested_opacity() {
        let mut canvas = RgbaImage::from_pixel(60, 30, BLUE);
        let (font, block, result) = plan("Hi", 60, 30);
        composite(&mut canvas, &font, &block, &result, &style(200));

        let panel = result.panel(4).unwrap();
        // Panel corner is never covered by glyph ink.
        let corner = canvas.get_pixel(panel.x as u32, panel.y as u32);
        assert_eq!(corner.0[0], 200);
        assert_eq!(corner.0[1], 200);
        assert_eq!(corner.0[2], 255);
        // Outside the panel nothing changes.
        assert_eq!(*canvas.get_pixel(0, 0), BLUE);
    }

    #[test]
    fn test_zero_opacity_skips_panel_but_draws_text() {
        let mut canvas = RgbaImage::from_pixel(60, 30, BLUE);
        let (font, block, result) = plan("Hi", 60, 30);
        composite(&mut canvas, &font, &block, &result, &style(0));

        let black = canvas.pixels().filter(|p| **p == BLACK).count();
        assert!(black > 0, "text pixels should be drawn");
        let changed = canvas.pixels().filter(|p| **p != BLUE).count();
        assert_eq!(changed, black, "only glyph pixels may change without a panel");
    }

    #[test]
    fn test_text_stays_inside_its_measured_box() {
        let mut canvas = RgbaImage::from_pixel(80, 40, BLUE);
        let (font, block, result) = plan("Mark", 80, 40);
        composite(&mut canvas, &font, &block, &result, &style(0));

        let origin = result.line_origins[0];
        let extent = font.measure("Mark");
        for (x, y, p) in canvas.enumerate_pixels() {
            if *p != BLUE {
                assert!(x as i64 >= origin.x && (x as i64) < origin.x + extent.width as i64);
                assert!(y as i64 >= origin.y && (y as i64) < origin.y + extent.height as i64);
            }
        }
    }

    #[test]
    fn test_overflowing_block_clips_without_panic() {
        let mut canvas = RgbaImage::from_pixel(10, 6, BLUE);
        let (font, block, result) = plan("overflowing", 10, 6);
        assert!(block.degenerate);
        composite(&mut canvas, &font, &block, &result, &style(128));
    }

    #[test]
    fn test_blend_full_alpha_replaces_color() {
        let mut canvas = RgbaImage::from_pixel(1, 1, BLUE);
        blend_pixel(&mut canvas, 0, 0, BLACK, 1.0);
        assert_eq!(*canvas.get_pixel(0, 0), BLACK);
        blend_pixel(&mut canvas, -1, 5, BLUE, 1.0);
        assert_eq!(*canvas.get_pixel(0, 0), BLACK);
    }

    // ── scalable face ───────────────────────────────────────────────────────

    #[test]
    fn test_scalable_ink_stays_inside_each_line_box() {
        let font = crate::layout::font_resolver::fixture_font(40);
        let mut canvas = RgbaImage::from_pixel(400, 200, BLUE);
        let block = fit("Hello World watermark text", &font, crate::layout::max_line_width(400));
        let result = layout(&block, 400, 200);
        assert!(block.len() > 1);
        composite(&mut canvas, &font, &block, &result, &style(0));

        let boxes: Vec<(i64, i64, i64, i64)> = result
            .line_origins
            .iter()
            .zip(block.line_widths.iter().zip(&block.line_heights))
            .map(|(o, (w, h))| (o.x, o.y, o.x + *w as i64, o.y + *h as i64))
            .collect();

        let mut inked = 0;
        for (x, y, p) in canvas.enumerate_pixels() {
            if *p == BLUE {
                continue;
            }
            inked += 1;
            let (x, y) = (x as i64, y as i64);
            assert!(
                boxes
                    .iter()
                    .any(|(x0, y0, x1, y1)| x >= *x0 && x < *x1 && y >= *y0 && y < *y1),
                "ink at ({x}, {y}) outside every line box"
            );
        }
        assert!(inked > 0, "text should be drawn");
    }

    #[test]
    fn test_scalable_glyphs_off_canvas_are_skipped() {
        let font = crate::layout::font_resolver::fixture_font(1024);
        let mut canvas = RgbaImage::from_pixel(20, 10, BLUE);
        let block = fit("WWWW", &font, 20);
        assert!(block.degenerate);

        // Push the whole line far below and right of the canvas.
        let far = LayoutResult {
            line_origins: vec![LineOrigin { x: 50_000, y: 50_000 }],
            ..layout(&block, 20, 10)
        };
        composite(&mut canvas, &font, &block, &far, &style(0));
        assert!(canvas.pixels().all(|p| *p == BLUE));
    }

    #[test]
    fn test_scalable_oversized_line_clips_to_canvas() {
        let font = crate::layout::font_resolver::fixture_font(1024);
        let mut canvas = RgbaImage::from_pixel(40, 30, BLUE);
        let block = fit("Wide watermark", &font, crate::layout::max_line_width(40));
        let result = layout(&block, 40, 30);
        composite(&mut canvas, &font, &block, &result, &style(0));
        assert_eq!(canvas.dimensions(), (40, 30));
    }
}
