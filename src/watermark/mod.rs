//! Watermark module for stamping text and image watermarks onto images.
//!
//! # Features
//!
//! - **Text watermarks** with optional counter-clockwise rotation, named
//!   TrueType fonts and an embedded fallback font
//! - **Image watermarks** pasted through the watermark's own alpha channel
//! - **Format preserving output**: results are written in the format the
//!   upload was decoded from, named `{base}.{format}`
//!
//! # Input normalisation
//!
//! Neither colours nor positions are ever rejected:
//! - a colour with any channel outside `0..=128` becomes black,
//! - a coordinate of `0` becomes a quarter of the image dimension.

pub mod compositor;
pub mod error;
pub mod font;
pub mod image_io;
pub mod position;
pub mod processor;
pub mod text_renderer;

// Re-export main types for convenience
pub use compositor::{colorize, fill_with_mask, paste_image, paste_with_mask};
pub use error::{FontLoadError, WatermarkError};
pub use font::{load_font, load_font_from, try_load_font, FontHandle, FontSource};
pub use image_io::{decode, output_file_name, save, DecodedImage};
pub use position::{resolve_coordinate, resolve_placement, ImageDimensions, PlacementPosition};
pub use processor::{
    EngineConfig, ImageWatermarkOutput, TextWatermarkOptions, TextWatermarkOutput,
    WatermarkEngine,
};
pub use text_renderer::{
    draw_rotated_text, draw_text, draw_text_watermark, measure_text, resolve_color, rotate_mask,
    Color, TextRenderOptions,
};
