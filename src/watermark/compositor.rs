//! Watermark compositor for blending watermarks onto images.
//!
//! Every operation here is a masked paste: for each destination pixel covered
//! by the mask, every channel moves from its current value towards the source
//! value in proportion to the mask value.
//!
//! ```text
//! out = dst + (src - dst) * mask / 255
//! ```
//!
//! A mask value of 255 copies the source exactly, 0 leaves the destination
//! untouched. Regions falling outside the destination are clipped, and
//! offsets may be negative.

use super::position::PlacementPosition;
use image::{DynamicImage, GrayImage, Luma, Rgba, RgbaImage};

/// Blend one channel towards `src` by `mask` (0..=255), rounding to nearest.
#[inline]
fn blend_channel(dst: u8, src: u8, mask: u8) -> u8 {
    let tmp = (src as i32 - dst as i32) * mask as i32 + 128;
    (dst as i32 + ((tmp + (tmp >> 8)) >> 8)) as u8
}

/// Blend a whole pixel towards `src` by `mask`.
#[inline]
fn blend_pixel(dst: Rgba<u8>, src: Rgba<u8>, mask: u8) -> Rgba<u8> {
    Rgba([
        blend_channel(dst[0], src[0], mask),
        blend_channel(dst[1], src[1], mask),
        blend_channel(dst[2], src[2], mask),
        blend_channel(dst[3], src[3], mask),
    ])
}

/// Visible overlap of a `width` x `height` region placed at `offset` on the
/// target, as `(x_start, y_start, x_end, y_end)` in target coordinates.
fn visible_region(
    target: &RgbaImage,
    width: u32,
    height: u32,
    offset: PlacementPosition,
) -> (i64, i64, i64, i64) {
    let (ox, oy) = (offset.x as i64, offset.y as i64);
    (
        ox.max(0),
        oy.max(0),
        (ox + width as i64).min(target.width() as i64),
        (oy + height as i64).min(target.height() as i64),
    )
}

/// Paste `source` onto `target` at `offset`, using `mask` as per-pixel weight.
///
/// `mask` must have the same dimensions as `source`.
pub fn paste_with_mask(
    target: &mut RgbaImage,
    source: &RgbaImage,
    mask: &GrayImage,
    offset: PlacementPosition,
) {
    debug_assert_eq!(source.dimensions(), mask.dimensions());

    let (x_start, y_start, x_end, y_end) =
        visible_region(target, source.width(), source.height(), offset);

    for ty in y_start..y_end {
        for tx in x_start..x_end {
            let sx = (tx - offset.x as i64) as u32;
            let sy = (ty - offset.y as i64) as u32;

            let Luma([weight]) = *mask.get_pixel(sx, sy);
            if weight == 0 {
                continue;
            }

            let dst = target.get_pixel_mut(tx as u32, ty as u32);
            *dst = blend_pixel(*dst, *source.get_pixel(sx, sy), weight);
        }
    }
}

/// Fill `target` with a single `ink` colour wherever `mask` is set.
pub fn fill_with_mask(
    target: &mut RgbaImage,
    ink: Rgba<u8>,
    mask: &GrayImage,
    offset: PlacementPosition,
) {
    let (x_start, y_start, x_end, y_end) =
        visible_region(target, mask.width(), mask.height(), offset);

    for ty in y_start..y_end {
        for tx in x_start..x_end {
            let sx = (tx - offset.x as i64) as u32;
            let sy = (ty - offset.y as i64) as u32;

            let Luma([weight]) = *mask.get_pixel(sx, sy);
            if weight == 0 {
                continue;
            }

            let dst = target.get_pixel_mut(tx as u32, ty as u32);
            *dst = blend_pixel(*dst, ink, weight);
        }
    }
}

/// Alpha channel of an image, or `None` when the image has no alpha.
pub fn alpha_mask(image: &DynamicImage) -> Option<GrayImage> {
    if !image.color().has_alpha() {
        return None;
    }

    let rgba = image.to_rgba8();
    Some(GrayImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        Luma([rgba.get_pixel(x, y)[3]])
    }))
}

/// Paste a watermark image onto `target` at `offset`, masked by the watermark's
/// own alpha channel. A watermark without alpha overwrites its rectangle.
pub fn paste_image(target: &mut RgbaImage, watermark: &DynamicImage, offset: PlacementPosition) {
    let source = watermark.to_rgba8();
    let mask = alpha_mask(watermark)
        .unwrap_or_else(|| GrayImage::from_pixel(source.width(), source.height(), Luma([255])));

    paste_with_mask(target, &source, &mask, offset);
}

/// Map a grayscale mask onto a colour ramp from `black` (value 0) to `white`
/// (value 255). The result is fully opaque.
pub fn colorize(mask: &GrayImage, black: [u8; 3], white: [u8; 3]) -> RgbaImage {
    let ramp = |level: u8, from: u8, to: u8| -> u8 {
        let delta = to as i32 - from as i32;
        (from as i32 + level as i32 * delta / 255) as u8
    };

    RgbaImage::from_fn(mask.width(), mask.height(), |x, y| {
        let Luma([level]) = *mask.get_pixel(x, y);
        Rgba([
            ramp(level, black[0], white[0]),
            ramp(level, black[1], white[1]),
            ramp(level, black[2], white[2]),
            255,
        ])
    })
}
