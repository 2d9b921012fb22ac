//! Watermark engine: the two operations exposed to the HTTP layer.
//!
//! Both operations follow the same shape: decode the upload, derive the
//! drawing parameters, mutate the image in memory and write it once. A
//! failure before the write leaves nothing on disk.
//!
//! The text operation accepts an output folder from its caller while the image
//! operation always writes into the configured folder.

use super::font::load_font_from;
use super::image_io::{self, DecodedImage};
use super::position::{resolve_placement, ImageDimensions, PlacementPosition};
use super::text_renderer::{draw_text_watermark, resolve_color, TextRenderOptions};
use super::{compositor, WatermarkError};
use crate::constants::{
    DEFAULT_FONT_SIZE, DEFAULT_IMAGE_OUTPUT_NAME, DEFAULT_OUTPUT_FOLDER, DEFAULT_TEXT_OUTPUT_NAME,
};
use crate::metrics::{WatermarkKind, WatermarkMetrics};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Engine configuration, fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Folder watermarked images are written to.
    pub output_folder: PathBuf,
    /// Folder named fonts are looked up in. `None` means the working directory.
    pub font_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            output_folder: PathBuf::from(DEFAULT_OUTPUT_FOLDER),
            font_dir: None,
        }
    }
}

impl EngineConfig {
    pub fn new(output_folder: impl Into<PathBuf>) -> Self {
        Self {
            output_folder: output_folder.into(),
            font_dir: None,
        }
    }

    pub fn with_font_dir(mut self, font_dir: impl Into<PathBuf>) -> Self {
        self.font_dir = Some(font_dir.into());
        self
    }
}

/// Caller-supplied options for a text watermark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextWatermarkOptions {
    pub text: String,
    /// Counter-clockwise rotation in degrees.
    pub orientation_degrees: i32,
    /// Em size in pixels.
    pub font_size: u32,
    pub color_red: i64,
    pub color_green: i64,
    pub color_blue: i64,
    /// 0 means a quarter of the image width.
    pub pos_x: i32,
    /// 0 means a quarter of the image height.
    pub pos_y: i32,
    /// Font name without extension. `None` uses the embedded font.
    pub font: Option<String>,
}

impl Default for TextWatermarkOptions {
    fn default() -> Self {
        Self {
            text: String::new(),
            orientation_degrees: 0,
            font_size: DEFAULT_FONT_SIZE,
            color_red: 0,
            color_green: 0,
            color_blue: 0,
            pos_x: 0,
            pos_y: 0,
            font: None,
        }
    }
}

impl TextWatermarkOptions {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// Result of a text watermark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextWatermarkOutput {
    pub output_folder: PathBuf,
    pub file_name: String,
}

impl TextWatermarkOutput {
    pub fn path(&self) -> PathBuf {
        self.output_folder.join(&self.file_name)
    }
}

/// Result of an image watermark; always inside the configured folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageWatermarkOutput {
    pub file_name: String,
}

/// Stateless watermark engine. Cheap to clone and safe to share.
#[derive(Debug, Clone, Default)]
pub struct WatermarkEngine {
    config: Arc<EngineConfig>,
}

impl WatermarkEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn output_folder(&self) -> &Path {
        &self.config.output_folder
    }

    /// Draw text onto an uploaded image and save it.
    ///
    /// `file_name` is stripped of its extension; the output keeps the decoded
    /// format. `output_folder` overrides the configured folder when given.
    pub fn add_text_watermark(
        &self,
        image_bytes: &[u8],
        options: &TextWatermarkOptions,
        file_name: &str,
        output_folder: Option<&Path>,
    ) -> Result<TextWatermarkOutput, WatermarkError> {
        let metrics = WatermarkMetrics::global();
        let _timer = metrics.start_timer(WatermarkKind::Text);

        let result = self.render_text(image_bytes, options, file_name, output_folder);
        metrics.record(WatermarkKind::Text, &result);
        result
    }

    fn render_text(
        &self,
        image_bytes: &[u8],
        options: &TextWatermarkOptions,
        file_name: &str,
        output_folder: Option<&Path>,
    ) -> Result<TextWatermarkOutput, WatermarkError> {
        let mut decoded = image_io::decode(image_bytes)?;
        let dims = ImageDimensions::new(decoded.width(), decoded.height());

        let color = resolve_color(options.color_red, options.color_green, options.color_blue);
        let position = resolve_placement(options.pos_x, options.pos_y, &dims);
        let font = load_font_from(
            options.font.as_deref(),
            options.font_size,
            self.config.font_dir.as_deref(),
        );

        tracing::debug!(
            width = dims.width,
            height = dims.height,
            x = position.x,
            y = position.y,
            rotation = options.orientation_degrees,
            font_size = font.size(),
            "Rendering text watermark"
        );

        let render_options = TextRenderOptions {
            text: options.text.clone(),
            color,
            position,
            rotation_degrees: options.orientation_degrees,
        };

        let mut canvas = decoded.image.to_rgba8();
        draw_text_watermark(&mut canvas, &render_options, &font);
        decoded.replace_pixels(canvas);

        let folder = output_folder.unwrap_or(&self.config.output_folder);
        let base = image_io::base_name(file_name, DEFAULT_TEXT_OUTPUT_NAME);
        let path = image_io::save(&decoded, folder, &base)?;

        tracing::info!(
            path = %path.display(),
            format = ?decoded.format,
            "Text watermark written"
        );

        Ok(TextWatermarkOutput {
            output_folder: folder.to_path_buf(),
            file_name: decoded.file_name(&base),
        })
    }

    /// Paste a watermark image onto a main image and save it into the
    /// configured output folder as `{base}.{format}`, where `base` is
    /// `base_file_name` reduced like an upload name (`watermarked` when empty).
    pub fn add_image_watermark(
        &self,
        main_image_bytes: &[u8],
        watermark_image_bytes: &[u8],
        pos_x: i32,
        pos_y: i32,
        base_file_name: &str,
    ) -> Result<ImageWatermarkOutput, WatermarkError> {
        let metrics = WatermarkMetrics::global();
        let _timer = metrics.start_timer(WatermarkKind::Image);

        let result = self.render_image(
            main_image_bytes,
            watermark_image_bytes,
            pos_x,
            pos_y,
            base_file_name,
        );
        metrics.record(WatermarkKind::Image, &result);
        result
    }

    fn render_image(
        &self,
        main_image_bytes: &[u8],
        watermark_image_bytes: &[u8],
        pos_x: i32,
        pos_y: i32,
        base_file_name: &str,
    ) -> Result<ImageWatermarkOutput, WatermarkError> {
        let mut main_image = image_io::decode(main_image_bytes)?;
        let watermark = image_io::decode(watermark_image_bytes)?;

        paste_watermark(&mut main_image, &watermark, PlacementPosition::new(pos_x, pos_y));

        let base = image_io::base_name(base_file_name, DEFAULT_IMAGE_OUTPUT_NAME);
        let path = image_io::save(&main_image, &self.config.output_folder, &base)?;

        tracing::info!(
            path = %path.display(),
            format = ?main_image.format,
            watermark_alpha = watermark.image.color().has_alpha(),
            "Image watermark written"
        );

        Ok(ImageWatermarkOutput {
            file_name: main_image.file_name(&base),
        })
    }
}

fn paste_watermark(main_image: &mut DecodedImage, watermark: &DecodedImage, offset: PlacementPosition) {
    let mut canvas = main_image.image.to_rgba8();
    compositor::paste_image(&mut canvas, &watermark.image, offset);
    main_image.replace_pixels(canvas);
}
