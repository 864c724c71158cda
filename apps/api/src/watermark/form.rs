//! Multipart form for `POST /watermark`.
//!
//! Fields are collected raw first, then validated in one synchronous step so
//! the rules are testable without building multipart bodies.

use axum::extract::Multipart;
use bytes::Bytes;
use image::Rgba;

use crate::errors::AppError;
use crate::layout::font_resolver::MAX_FONT_PX;
use crate::layout::FontSpec;
use crate::render::{parse_hex_color, OutputFormat};

const DEFAULT_OPACITY: u8 = 200;
const DEFAULT_TEXT_COLOR: &str = "#000000";
const DEFAULT_OUTPUT: &str = "png";

/// Form fields as received, before validation.
#[derive(Debug, Default)]
pub struct RawWatermarkFields {
    pub file: Option<Bytes>,
    pub text: Option<String>,
    pub opacity: Option<String>,
    pub text_color: Option<String>,
    pub font_size: Option<String>,
    pub font_path: Option<String>,
    pub output: Option<String>,
}

/// A validated watermark request.
#[derive(Debug, Clone)]
pub struct WatermarkForm {
    pub image: Bytes,
    pub text: String,
    pub opacity: u8,
    pub text_color: Rgba<u8>,
    pub font: FontSpec,
    pub output: OutputFormat,
    /// Output token as sent, reused for the download filename.
    pub output_token: String,
}

impl RawWatermarkFields {
    /// Drains a multipart stream. Unknown fields are ignored.
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut fields = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => fields.file = Some(field.bytes().await?),
                "text" => fields.text = Some(field.text().await?),
                "opacity" => fields.opacity = Some(field.text().await?),
                "text_color" => fields.text_color = Some(field.text().await?),
                "font_size" => fields.font_size = Some(field.text().await?),
                "font_path" => fields.font_path = Some(field.text().await?),
                "output" => fields.output = Some(field.text().await?),
                other => tracing::debug!("Ignoring unknown form field '{other}'"),
            }
        }
        Ok(fields)
    }

    /// Applies defaults and validates every field.
    ///
    /// The output format is checked first so an unsupported format is
    /// rejected before any image work happens.
    pub fn validate(self) -> Result<WatermarkForm, AppError> {
        let output_token = self
            .output
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_OUTPUT.to_string());
        let output = OutputFormat::parse(&output_token)?;

        let image = self
            .file
            .filter(|b| !b.is_empty())
            .ok_or_else(|| AppError::InvalidInput("Missing image file field 'file'".to_string()))?;

        let opacity = match non_blank(self.opacity) {
            None => DEFAULT_OPACITY,
            Some(raw) => raw.parse::<u8>().map_err(|_| {
                AppError::InvalidInput(format!("opacity must be an integer in 0..=255, got '{raw}'"))
            })?,
        };

        let color_raw = non_blank(self.text_color).unwrap_or_else(|| DEFAULT_TEXT_COLOR.to_string());
        let text_color = parse_hex_color(&color_raw).ok_or_else(|| {
            AppError::InvalidInput(format!("text_color must be a hex color, got '{color_raw}'"))
        })?;

        let requested_size = match non_blank(self.font_size) {
            None => 0,
            Some(raw) => {
                let size = raw.parse::<i64>().map_err(|_| {
                    AppError::InvalidInput(format!("font_size must be an integer, got '{raw}'"))
                })?;
                check_font_size(size)?
            }
        };

        Ok(WatermarkForm {
            image,
            text: self.text.unwrap_or_default(),
            opacity,
            text_color,
            font: FontSpec {
                path: non_blank(self.font_path),
                requested_size,
            },
            output,
            output_token,
        })
    }
}

/// Maps a requested font size onto `0..=MAX_FONT_PX`.
/// Non-positive sizes select the automatic size; larger ones are rejected.
pub fn check_font_size(size: i64) -> Result<u32, AppError> {
    if size > MAX_FONT_PX as i64 {
        return Err(AppError::InvalidInput(format!(
            "font_size must be at most {MAX_FONT_PX}, got {size}"
        )));
    }
    Ok(size.max(0) as u32)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
