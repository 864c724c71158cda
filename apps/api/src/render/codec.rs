//! Upload decoding and result encoding.
//!
//! Every upload is normalized to RGBA8 before compositing. JPEG output drops
//! the alpha channel; PNG and WebP keep it.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};
use tracing::debug;

use crate::errors::AppError;

const JPEG_QUALITY: u8 = 95;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
    Webp,
}

impl OutputFormat {
    /// Accepts `png`, `jpg`, `jpeg` and `webp`, ignoring case and surrounding whitespace.
    pub fn parse(token: &str) -> Result<Self, AppError> {
        match token.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "webp" => Ok(Self::Webp),
            _ => Err(AppError::UnsupportedOutputFormat(token.trim().to_string())),
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
            Self::Webp => "WebP",
        }
    }
}

/// `Content-Disposition` value for a result requested with `token`.
/// The extension echoes the token as sent, so `jpeg` and `jpg` both round-trip.
pub fn content_disposition(token: &str) -> String {
    format!(
        "inline; filename=watermarked.{}",
        token.trim().to_ascii_lowercase()
    )
}

/// Decodes any supported upload into an RGBA canvas.
pub fn decode(bytes: &[u8]) -> Result<RgbaImage, AppError> {
    let image = image::load_from_memory(bytes).map_err(|e| {
        debug!("Upload decode failed: {e}");
        AppError::InvalidInput("Invalid image upload".to_string())
    })?;
    Ok(image.to_rgba8())
}

/// Encodes the composited canvas in `format`.
pub fn encode(canvas: &RgbaImage, format: OutputFormat) -> Result<Vec<u8>, AppError> {
    let (width, height) = canvas.dimensions();
    let mut buffer = Vec::new();

    let result = match format {
        OutputFormat::Png => PngEncoder::new_with_quality(
            Cursor::new(&mut buffer),
            CompressionType::Best,
            FilterType::Adaptive,
        )
        .write_image(canvas.as_raw(), width, height, ExtendedColorType::Rgba8),
        OutputFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(canvas.clone()).into_rgb8();
            JpegEncoder::new_with_quality(Cursor::new(&mut buffer), JPEG_QUALITY).write_image(
                rgb.as_raw(),
                width,
                height,
                ExtendedColorType::Rgb8,
            )
        }
        OutputFormat::Webp => WebPEncoder::new_lossless(Cursor::new(&mut buffer)).write_image(
            canvas.as_raw(),
            width,
            height,
            ExtendedColorType::Rgba8,
        ),
    };

    result.map_err(|e| AppError::Encode(format!("failed to encode {}: {e}", format.label())))?;
    Ok(buffer)
}
