//! Position calculation for watermark placement.
//!
//! Coordinates are in pixel space with the origin at the top-left corner.
//! A coordinate of `0` means "not provided" and is replaced by a default of a
//! quarter of the matching image dimension. An explicit `0` therefore cannot
//! be requested; callers wanting the very edge have to pass `1`.
//!
//! # Example
//!
//! ```
//! use watermarker::watermark::position::{resolve_placement, ImageDimensions, PlacementPosition};
//!
//! let image = ImageDimensions { width: 800, height: 600 };
//! assert_eq!(resolve_placement(0, 0, &image), PlacementPosition::new(200, 150));
//! assert_eq!(resolve_placement(15, 0, &image), PlacementPosition::new(15, 150));
//! ```

/// Dimensions of the target image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Default placement: one quarter of each dimension, rounded down.
    pub fn default_placement(&self) -> PlacementPosition {
        PlacementPosition::new(quarter(self.width), quarter(self.height))
    }
}

/// A position where a watermark is placed. May be negative or lie outside the
/// image; drawing clips to the image bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlacementPosition {
    pub x: i32,
    pub y: i32,
}

impl PlacementPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self::default()
    }
}

fn quarter(dimension: u32) -> i32 {
    i32::try_from(dimension / 4).unwrap_or(i32::MAX)
}

/// Zero-means-default rule for a single coordinate.
pub fn resolve_coordinate(requested: i32, default_value: i32) -> i32 {
    if requested != 0 {
        requested
    } else {
        default_value
    }
}

/// Resolve the requested coordinates against the image's default placement.
pub fn resolve_placement(pos_x: i32, pos_y: i32, image: &ImageDimensions) -> PlacementPosition {
    let defaults = image.default_placement();
    PlacementPosition::new(
        resolve_coordinate(pos_x, defaults.x),
        resolve_coordinate(pos_y, defaults.y),
    )
}
