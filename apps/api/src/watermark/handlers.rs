//! Axum route handlers for the Watermark API.

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::layout::{FontSpec, LayoutResult, WrappedBlock};
use crate::state::AppState;
use crate::watermark::form::{check_font_size, RawWatermarkFields};
use crate::watermark::pipeline::{plan, render_watermark};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LayoutRequest {
    #[serde(default)]
    pub text: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub font_size: u32,
    #[serde(default)]
    pub font_path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FontSummary {
    pub path: Option<String>,
    pub size: u32,
    pub scalable: bool,
}

#[derive(Debug, Serialize)]
pub struct LayoutResponse {
    pub font: FontSummary,
    pub block: WrappedBlock,
    pub layout: LayoutResult,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /watermark
pub async fn handle_watermark(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let span = info_span!("watermark", request_id = %Uuid::new_v4());

    async move {
        let form = RawWatermarkFields::read(multipart).await?.validate()?;
        let fonts = state.fonts.clone();
        let padding = state.config.panel_padding_px;

        // CPU-bound decode/draw/encode runs off the async executor.
        let blocking_span = tracing::Span::current();
        let rendered = tokio::task::spawn_blocking(move || {
            let _entered = blocking_span.enter();
            render_watermark(&form, &fonts, padding)
        })
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in watermark: {e}")))??;

        let headers = [
            (header::CONTENT_TYPE, rendered.format.mime().to_string()),
            (header::CONTENT_DISPOSITION, rendered.content_disposition),
        ];
        Ok::<_, AppError>((headers, rendered.bytes).into_response())
    }
    .instrument(span)
    .await
}

/// POST /layout
/// Runs only the layout core and returns the line breaks and draw origins.
pub async fn handle_layout(
    State(state): State<AppState>,
    Json(req): Json<LayoutRequest>,
) -> Result<Json<LayoutResponse>, AppError> {
    if req.width == 0 || req.height == 0 {
        return Err(AppError::InvalidInput(
            "width and height must be positive".to_string(),
        ));
    }
    let requested_size = check_font_size(req.font_size as i64)?;

    let fonts = state.fonts.clone();
    let response = tokio::task::spawn_blocking(move || {
        let spec = FontSpec {
            path: req.font_path,
            requested_size,
        };
        let plan = plan(&req.text, &spec, req.width, req.height, &fonts)?;
        Ok::<_, AppError>(LayoutResponse {
            font: FontSummary {
                path: plan.font.path().map(|p| p.display().to_string()),
                size: plan.font.size(),
                scalable: plan.font.is_scalable(),
            },
            block: plan.block,
            layout: plan.layout,
        })
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in layout: {e}")))??;

    Ok(Json(response))
}
