//! Image decoding, saving and output naming.
//!
//! The format detected while decoding is authoritative: the output file is
//! always written as `{base}.{format}` in that same format, whatever extension
//! the uploaded file name carried.

use super::WatermarkError;
use image::io::Reader as ImageReader;
use image::{ColorType, DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// A decoded image together with the format it was stored in.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub image: DynamicImage,
    pub format: ImageFormat,
}

impl DecodedImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Output file name for this image's format.
    pub fn file_name(&self, base_name: &str) -> String {
        output_file_name(base_name, self.format)
    }

    /// Replace the pixels with a composited RGBA buffer while keeping the
    /// original colour type, so the encoder sees what it decoded.
    pub fn replace_pixels(&mut self, rgba: RgbaImage) {
        let color = self.image.color();
        self.image = restore_color(rgba, color);
    }
}

/// Decode image bytes, detecting the format from the data itself.
pub fn decode(bytes: &[u8]) -> Result<DecodedImage, WatermarkError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| WatermarkError::decode(e.to_string()))?;

    let format = reader
        .format()
        .ok_or_else(|| WatermarkError::decode("Unrecognized image format"))?;

    let image = reader
        .decode()
        .map_err(|e| WatermarkError::decode(e.to_string()))?;

    Ok(DecodedImage { image, format })
}

/// File extension written for a format.
pub fn format_extension(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "jpeg",
        ImageFormat::Png => "png",
        ImageFormat::Gif => "gif",
        ImageFormat::WebP => "webp",
        ImageFormat::Bmp => "bmp",
        ImageFormat::Tiff => "tiff",
        other => other.extensions_str().first().copied().unwrap_or("img"),
    }
}

/// MIME type of a format, used for download responses.
pub fn media_type(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Png => "image/png",
        ImageFormat::Gif => "image/gif",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Tiff => "image/tiff",
        _ => "application/octet-stream",
    }
}

/// MIME type guessed from an output file name's extension.
pub fn media_type_for_file(file_name: &str) -> &'static str {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ImageFormat::from_extension)
        .map(media_type)
        .unwrap_or("application/octet-stream")
}

/// `{base}.{ext}` for the given format.
pub fn output_file_name(base_name: &str, format: ImageFormat) -> String {
    format!("{}.{}", base_name, format_extension(format))
}

/// Everything before the first `.`: `photo.final.jpg` becomes `photo`.
pub fn strip_extension(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}

/// Base name for an uploaded file.
///
/// Only the final path component is kept so an upload named `../x.png`
/// cannot leave the output folder. Falls back to `default_name` when nothing
/// usable remains.
pub fn base_name(file_name: &str, default_name: &str) -> String {
    let last_component = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);
    let stem = strip_extension(last_component).trim();

    if stem.is_empty() {
        default_name.to_string()
    } else {
        stem.to_string()
    }
}

/// Write the image into `folder` as `{base}.{format}`.
///
/// The folder must already exist; it is never created here.
pub fn save(image: &DecodedImage, folder: &Path, base_name: &str) -> Result<PathBuf, WatermarkError> {
    let path = folder.join(image.file_name(base_name));

    encodable(image)
        .save_with_format(&path, image.format)
        .map_err(|e| WatermarkError::write(&path, e.to_string()))?;

    Ok(path)
}

/// JPEG cannot carry alpha; everything else is written as decoded.
fn encodable(image: &DecodedImage) -> std::borrow::Cow<'_, DynamicImage> {
    if image.format == ImageFormat::Jpeg && image.image.color().has_alpha() {
        let flattened = if image.image.color().has_color() {
            DynamicImage::ImageRgb8(image.image.to_rgb8())
        } else {
            DynamicImage::ImageLuma8(image.image.to_luma8())
        };
        std::borrow::Cow::Owned(flattened)
    } else {
        std::borrow::Cow::Borrowed(&image.image)
    }
}

/// Convert an RGBA working buffer back to `color`.
pub fn restore_color(rgba: RgbaImage, color: ColorType) -> DynamicImage {
    let working = DynamicImage::ImageRgba8(rgba);
    match color {
        ColorType::L8 => DynamicImage::ImageLuma8(working.to_luma8()),
        ColorType::La8 => DynamicImage::ImageLumaA8(working.to_luma_alpha8()),
        ColorType::Rgb8 => DynamicImage::ImageRgb8(working.to_rgb8()),
        ColorType::L16 => DynamicImage::ImageLuma16(working.to_luma16()),
        ColorType::La16 => DynamicImage::ImageLumaA16(working.to_luma_alpha16()),
        ColorType::Rgb16 => DynamicImage::ImageRgb16(working.to_rgb16()),
        ColorType::Rgba16 => DynamicImage::ImageRgba16(working.to_rgba16()),
        ColorType::Rgb32F => DynamicImage::ImageRgb32F(working.to_rgb32f()),
        ColorType::Rgba32F => DynamicImage::ImageRgba32F(working.to_rgba32f()),
        _ => working,
    }
}
