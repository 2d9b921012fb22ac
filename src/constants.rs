// Constants module - centralized default values for configuration
//
// This module defines all default values used throughout the codebase.

// =============================================================================
// Server defaults
// =============================================================================

/// Default bind address
pub const DEFAULT_ADDRESS: &str = "0.0.0.0";

/// Default listen port
pub const DEFAULT_PORT: u16 = 8000;

/// Default maximum request body size (20 MB), covers both uploads of a request
pub const DEFAULT_MAX_BODY_SIZE: usize = 20 * 1024 * 1024;

// =============================================================================
// Output defaults
// =============================================================================

/// Default folder watermarked images are written to
pub const DEFAULT_OUTPUT_FOLDER: &str = "output";

/// Base name used when a text watermark upload carries no usable file name
pub const DEFAULT_TEXT_OUTPUT_NAME: &str = "watermarked_image";

/// Base name used when an image watermark upload carries no usable file name
pub const DEFAULT_IMAGE_OUTPUT_NAME: &str = "watermarked";

// =============================================================================
// Text watermark defaults
// =============================================================================

/// Default font size in pixels
pub const DEFAULT_FONT_SIZE: u32 = 20;

/// Largest em size rendered; bigger requests are drawn at this size.
/// Rasterizing one glyph allocates its whole pixel box.
pub const MAX_FONT_SIZE: u32 = 1024;

/// Highest accepted value for each text colour channel
pub const MAX_COLOR_CHANNEL: i64 = 128;

/// Extension appended to named fonts
pub const FONT_FILE_EXTENSION: &str = "ttf";

/// Extra pixels between lines of multi-line text
pub const LINE_SPACING: f32 = 4.0;
