//! Request handlers for the watermark API.

use std::path::Path;

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Multipart, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::multipart::Uploads;
use super::AppState;
use crate::constants::DEFAULT_FONT_SIZE;
use crate::error::{ApiError, AppResult};
use crate::watermark::image_io::media_type_for_file;
use crate::watermark::TextWatermarkOptions;

// ── Query parameters ─────────────────────────────────────────────────

/// Query parameters for `POST /png_watermark/`.
#[derive(Debug, Default, Deserialize)]
pub struct PngWatermarkParams {
    #[serde(default)]
    pub pos_x: i32,
    #[serde(default)]
    pub pos_y: i32,
}

fn default_text_size() -> u32 {
    DEFAULT_FONT_SIZE
}

/// Query parameters for `POST /text_watermark/`.
#[derive(Debug, Deserialize)]
pub struct TextWatermarkParams {
    pub wm_text: Option<String>,
    #[serde(default)]
    pub wm_orientation: i32,
    #[serde(default = "default_text_size")]
    pub wm_text_size: u32,
    #[serde(default)]
    pub wm_text_color_red: i64,
    #[serde(default)]
    pub wm_text_color_green: i64,
    #[serde(default)]
    pub wm_text_color_blue: i64,
    #[serde(default)]
    pub pos_x: i32,
    #[serde(default)]
    pub pos_y: i32,
    pub wm_font: Option<String>,
}

impl TextWatermarkParams {
    fn into_options(self) -> AppResult<TextWatermarkOptions> {
        let text = self
            .wm_text
            .ok_or_else(|| ApiError::BadRequest("Missing query parameter 'wm_text'".into()))?;

        Ok(TextWatermarkOptions {
            text,
            orientation_degrees: self.wm_orientation,
            font_size: self.wm_text_size,
            color_red: self.wm_text_color_red,
            color_green: self.wm_text_color_green,
            color_blue: self.wm_text_color_blue,
            pos_x: self.pos_x,
            pos_y: self.pos_y,
            font: self.wm_font.filter(|name| !name.is_empty()),
        })
    }
}

fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> AppResult<T> {
    query
        .map(|Query(params)| params)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

fn multipart_body(multipart: Result<Multipart, MultipartRejection>) -> AppResult<Multipart> {
    multipart.map_err(|e| ApiError::BadRequest(e.body_text()))
}

// ── Watermark endpoints ──────────────────────────────────────────────

/// POST /png_watermark/
///
/// Paste the `watermark_image` upload onto the `image` upload and return the
/// saved result as a download.
pub async fn png_watermark(
    State(state): State<AppState>,
    query: Result<Query<PngWatermarkParams>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Response> {
    let params = query_params(query)?;
    let mut uploads =
        Uploads::collect(multipart_body(multipart)?, &["image", "watermark_image"]).await?;
    let image = uploads.take("image")?;
    let watermark = uploads.take("watermark_image")?;

    let engine = state.engine.clone();

    let output = tokio::task::spawn_blocking(move || {
        engine.add_image_watermark(
            &image.bytes,
            &watermark.bytes,
            params.pos_x,
            params.pos_y,
            &image.file_name,
        )
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Watermark task failed: {e}")))??;

    file_download(state.engine.output_folder(), &output.file_name).await
}

/// POST /text_watermark/
///
/// Draw `wm_text` onto the `file` upload and return the saved result as a
/// download.
pub async fn text_watermark(
    State(state): State<AppState>,
    query: Result<Query<TextWatermarkParams>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Response> {
    let options = query_params(query)?.into_options()?;
    let mut uploads = Uploads::collect(multipart_body(multipart)?, &["file"]).await?;
    let file = uploads.take("file")?;

    let engine = state.engine.clone();

    let output = tokio::task::spawn_blocking(move || {
        engine.add_text_watermark(&file.bytes, &options, &file.file_name, None)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Watermark task failed: {e}")))??;

    file_download(&output.output_folder, &output.file_name).await
}

/// Read a saved image back and wrap it as an attachment.
async fn file_download(folder: &Path, file_name: &str) -> AppResult<Response> {
    let path = folder.join(file_name);
    let body = tokio::fs::read(&path).await.map_err(|e| {
        ApiError::Internal(format!("Failed to read {}: {e}", path.display()))
    })?;

    Ok((
        [
            (CONTENT_TYPE, media_type_for_file(file_name).to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    )
        .into_response())
}

// ── Service endpoints ────────────────────────────────────────────────

/// GET / -- send browsers to the API description.
pub async fn redirect_to_docs() -> Redirect {
    Redirect::temporary("/docs")
}

/// GET /docs -- machine readable summary of the API.
pub async fn docs() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            {
                "method": "POST",
                "path": "/png_watermark/",
                "multipart": ["image", "watermark_image"],
                "query": {"pos_x": 0, "pos_y": 0},
                "returns": "watermarked image as attachment"
            },
            {
                "method": "POST",
                "path": "/text_watermark/",
                "multipart": ["file"],
                "query": {
                    "wm_text": "required",
                    "wm_orientation": 0,
                    "wm_text_size": DEFAULT_FONT_SIZE,
                    "wm_text_color_red": 0,
                    "wm_text_color_green": 0,
                    "wm_text_color_blue": 0,
                    "pos_x": 0,
                    "pos_y": 0,
                    "wm_font": "optional"
                },
                "returns": "watermarked image as attachment"
            },
            {"method": "GET", "path": "/health"},
            {"method": "GET", "path": "/metrics"}
        ],
        "notes": [
            "A position of 0 means a quarter of the image dimension.",
            "A colour with any channel outside 0..=128 is drawn black."
        ]
    }))
}

/// Health check response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /metrics -- Prometheus text exposition.
pub async fn metrics() -> AppResult<Response> {
    let body = crate::metrics::export_text().map_err(ApiError::Internal)?;
    Ok((
        [(CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
        .into_response())
}
