//! The CPU-bound watermark pipeline.
//!
//! decode → resolve font → fit → layout → composite → encode
//!
//! Everything here is synchronous; handlers run it via `spawn_blocking`. The
//! resolved font (and the font bytes it owns) lives only for one call and is
//! dropped on every exit path, including encode failures.

use tracing::{debug, info};

use crate::errors::AppError;
use crate::layout::{
    fit, layout, max_line_width, FontResolver, FontSpec, LayoutError, LayoutResult, ResolvedFont,
    WrappedBlock,
};
use crate::render::codec::content_disposition;
use crate::render::{composite, decode, encode, OutputFormat, WatermarkStyle};
use crate::watermark::form::WatermarkForm;

/// Core output for one request: the font used plus the draw instructions.
#[derive(Debug)]
pub struct WatermarkPlan {
    pub font: ResolvedFont,
    pub block: WrappedBlock,
    pub layout: LayoutResult,
}

/// An encoded result ready to send.
#[derive(Debug)]
pub struct RenderedImage {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    pub content_disposition: String,
}

/// Runs the layout core for `text` on a `canvas_width × canvas_height` canvas.
pub fn plan(
    text: &str,
    font_spec: &FontSpec,
    canvas_width: u32,
    canvas_height: u32,
    resolver: &FontResolver,
) -> Result<WatermarkPlan, LayoutError> {
    let font = resolver.resolve(font_spec, canvas_width, canvas_height)?;
    let block = fit(text, &font, max_line_width(canvas_width));
    let layout = layout(&block, canvas_width, canvas_height);

    debug!(
        lines = block.len(),
        degenerate = block.degenerate,
        font_px = font.size(),
        "Planned watermark block {}x{}",
        layout.block_width,
        layout.block_height
    );
    Ok(WatermarkPlan {
        font,
        block,
        layout,
    })
}

/// Decodes the upload, paints the watermark and encodes the result.
pub fn render_watermark(
    form: &WatermarkForm,
    resolver: &FontResolver,
    panel_padding: u32,
) -> Result<RenderedImage, AppError> {
    let mut canvas = decode(&form.image)?;
    let (width, height) = canvas.dimensions();

    let plan = plan(&form.text, &form.font, width, height, resolver)?;
    let style = WatermarkStyle {
        text_color: form.text_color,
        panel_opacity: form.opacity,
        panel_padding,
    };
    composite(&mut canvas, &plan.font, &plan.block, &plan.layout, &style);

    let bytes = encode(&canvas, form.output)?;
    info!(
        "Watermarked {width}x{height} image: {} lines, {} bytes as {}",
        plan.block.len(),
        bytes.len(),
        form.output.mime()
    );
    Ok(RenderedImage {
        bytes,
        format: form.output,
        content_disposition: content_disposition(&form.output_token),
    })
}
