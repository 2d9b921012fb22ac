//! Text watermark rendering.
//!
//! Text is always rasterized into a single-channel coverage mask first and
//! then composited onto the target:
//!
//! - horizontal text fills the target with the text colour through the mask,
//! - rotated text renders onto a mask the size of the whole image, rotates
//!   that mask counter-clockwise (growing the canvas to fit), colourises it and
//!   pastes it back at the image origin using the rotated mask as alpha.
//!
//! The rotated path pastes at the origin no matter where the text was asked
//! for; the requested position only moves the text inside the unrotated mask.
//!
//! # Example
//!
//! ```ignore
//! use watermarker::watermark::text_renderer::{draw_text_watermark, resolve_color, TextRenderOptions};
//!
//! let options = TextRenderOptions {
//!     text: "Copyright 2025".to_string(),
//!     color: resolve_color(100, 100, 100),
//!     position: PlacementPosition::new(10, 10),
//!     rotation_degrees: 0,
//! };
//!
//! draw_text_watermark(&mut image, &options, &load_font(None, 24));
//! ```

use super::compositor::{colorize, fill_with_mask, paste_with_mask};
use super::font::FontHandle;
use super::position::PlacementPosition;
use crate::constants::{LINE_SPACING, MAX_COLOR_CHANNEL};
use ab_glyph::{Font, ScaleFont};
use image::{imageops, GrayImage, Luma, Rgba, RgbaImage};

/// RGB text colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Black color.
    pub fn black() -> Self {
        Self::new(0, 0, 0)
    }

    pub fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Fully opaque ink for filling.
    pub fn to_rgba(&self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, 255])
    }
}

/// Clamp-or-black colour rule.
///
/// The triple is used as-is when every channel lies in `0..=128`; if any
/// channel is outside that range the whole colour becomes black. Channels
/// are never clamped individually.
pub fn resolve_color(red: i64, green: i64, blue: i64) -> Color {
    let in_range = |c: i64| (0..=MAX_COLOR_CHANNEL).contains(&c);

    if in_range(red) && in_range(green) && in_range(blue) {
        // In range implies each channel fits in a u8
        Color::new(red as u8, green as u8, blue as u8)
    } else {
        Color::black()
    }
}

/// Options for drawing a text watermark.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRenderOptions {
    /// The text to render. `\n` starts a new line.
    pub text: String,
    /// Fill colour.
    pub color: Color,
    /// Top-left corner of the text box.
    pub position: PlacementPosition,
    /// Counter-clockwise rotation in degrees. 0 draws horizontally.
    pub rotation_degrees: i32,
}

impl Default for TextRenderOptions {
    fn default() -> Self {
        Self {
            text: String::new(),
            color: Color::black(),
            position: PlacementPosition::origin(),
            rotation_degrees: 0,
        }
    }
}

fn lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').map(|line| line.trim_end_matches('\r'))
}

/// Calculate the dimensions of rendered text.
///
/// Returns (width, height) in pixels, covering every line.
pub fn measure_text(text: &str, font: &FontHandle) -> (u32, u32) {
    let scaled_font = font.font().as_scaled(font.scale());
    let line_height = scaled_font.height();

    let mut max_width = 0.0f32;
    let mut line_count = 0usize;

    for line in lines(text) {
        let mut width = 0.0f32;
        let mut prev_glyph: Option<ab_glyph::GlyphId> = None;

        for c in line.chars() {
            let glyph_id = scaled_font.glyph_id(c);

            if let Some(prev) = prev_glyph {
                width += scaled_font.kern(prev, glyph_id);
            }

            width += scaled_font.h_advance(glyph_id);
            prev_glyph = Some(glyph_id);
        }

        max_width = max_width.max(width);
        line_count += 1;
    }

    let height =
        line_height * line_count as f32 + LINE_SPACING * line_count.saturating_sub(1) as f32;

    (max_width.ceil() as u32, height.ceil() as u32)
}

/// Rasterize `text` into a coverage mask of `width` x `height`, with the top-left
/// corner of the text box at `origin`. Glyphs falling outside are clipped.
pub fn render_text_mask(
    width: u32,
    height: u32,
    text: &str,
    font: &FontHandle,
    origin: PlacementPosition,
) -> GrayImage {
    let mut mask = GrayImage::new(width, height);

    let font_ref = font.font();
    let scale = font.scale();
    let scaled_font = font_ref.as_scaled(scale);
    let line_advance = scaled_font.height() + LINE_SPACING;

    for (index, line) in lines(text).enumerate() {
        let baseline_y = origin.y as f32 + scaled_font.ascent() + index as f32 * line_advance;
        let mut cursor_x = origin.x as f32;
        let mut prev_glyph: Option<ab_glyph::GlyphId> = None;

        for c in line.chars() {
            let glyph_id = scaled_font.glyph_id(c);

            if let Some(prev) = prev_glyph {
                cursor_x += scaled_font.kern(prev, glyph_id);
            }

            let glyph =
                glyph_id.with_scale_and_position(scale, ab_glyph::point(cursor_x, baseline_y));

            // Rasterizing allocates the whole glyph box, so skip glyphs off the canvas
            let outlined = font_ref
                .outline_glyph(glyph)
                .filter(|outlined| overlaps_canvas(outlined.px_bounds(), width, height));

            if let Some(outlined) = outlined {
                let bounds = outlined.px_bounds();

                outlined.draw(|px, py, coverage| {
                    let x = px as i64 + bounds.min.x as i64;
                    let y = py as i64 + bounds.min.y as i64;

                    if x >= 0 && y >= 0 && x < width as i64 && y < height as i64 {
                        let value = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
                        let Luma([existing]) = mask.get_pixel_mut(x as u32, y as u32);
                        // Overlapping glyph edges keep the stronger coverage
                        *existing = (*existing).max(value);
                    }
                });
            }

            cursor_x += scaled_font.h_advance(glyph_id);
            prev_glyph = Some(glyph_id);
        }
    }

    mask
}

fn overlaps_canvas(bounds: ab_glyph::Rect, width: u32, height: u32) -> bool {
    bounds.max.x > 0.0
        && bounds.max.y > 0.0
        && bounds.min.x < width as f32
        && bounds.min.y < height as f32
}

/// Rotate a mask counter-clockwise by `degrees`, growing the canvas so the
/// whole rotated mask fits. Uncovered areas are 0.
///
/// Right angles are exact transposes; other angles use nearest-neighbour
/// sampling around the canvas centre.
pub fn rotate_mask(mask: &GrayImage, degrees: i32) -> GrayImage {
    match degrees.rem_euclid(360) {
        0 => mask.clone(),
        90 => imageops::rotate270(mask),
        180 => imageops::rotate180(mask),
        270 => imageops::rotate90(mask),
        other => rotate_mask_nearest(mask, other as f64),
    }
}

/// Trig values are rounded so near-zero terms do not inflate the canvas.
fn round15(value: f64) -> f64 {
    (value * 1e15).round() / 1e15
}

fn rotate_mask_nearest(mask: &GrayImage, degrees: f64) -> GrayImage {
    let src_w = mask.width() as f64;
    let src_h = mask.height() as f64;

    // Inverse mapping (destination -> source) for a counter-clockwise turn
    let theta = -degrees.to_radians();
    let (cos, sin) = (round15(theta.cos()), round15(theta.sin()));
    let (a, b, d, e) = (cos, sin, -sin, cos);
    let transform = |x: f64, y: f64, c: f64, f: f64| (a * x + b * y + c, d * x + e * y + f);

    let (cx, cy) = (src_w / 2.0, src_h / 2.0);
    let (c, f) = transform(-cx, -cy, 0.0, 0.0);
    let (c, f) = (c + cx, f + cy);

    let corners = [(0.0, 0.0), (src_w, 0.0), (src_w, src_h), (0.0, src_h)];
    let mapped: Vec<(f64, f64)> = corners
        .iter()
        .map(|&(x, y)| transform(x, y, c, f))
        .collect();

    let min_x = mapped.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let max_x = mapped.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    let min_y = mapped.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let max_y = mapped.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);

    let dst_w = (max_x.ceil() - min_x.floor()).max(1.0);
    let dst_h = (max_y.ceil() - min_y.floor()).max(1.0);

    // Re-centre on the expanded canvas
    let (c, f) = transform(-(dst_w - src_w) / 2.0, -(dst_h - src_h) / 2.0, c, f);

    let mut rotated = GrayImage::new(dst_w as u32, dst_h as u32);

    for (dx, dy, pixel) in rotated.enumerate_pixels_mut() {
        let (sx, sy) = transform(dx as f64 + 0.5, dy as f64 + 0.5, c, f);
        let (sx, sy) = (sx.floor(), sy.floor());

        if sx >= 0.0 && sy >= 0.0 && sx < src_w && sy < src_h {
            *pixel = *mask.get_pixel(sx as u32, sy as u32);
        }
    }

    rotated
}

/// Draw horizontal text onto `target`.
///
/// The coverage mask never exceeds the target; glyphs outside it are skipped.
pub fn draw_text(
    target: &mut RgbaImage,
    text: &str,
    font: &FontHandle,
    position: PlacementPosition,
    color: Color,
) {
    let mask = render_text_mask(target.width(), target.height(), text, font, position);
    fill_with_mask(target, color.to_rgba(), &mask, PlacementPosition::origin());
}

/// Draw text rotated by `degrees` onto `target`, pasting at the origin.
pub fn draw_rotated_text(
    target: &mut RgbaImage,
    text: &str,
    font: &FontHandle,
    position: PlacementPosition,
    color: Color,
    degrees: i32,
) {
    let mask = render_text_mask(target.width(), target.height(), text, font, position);
    let rotated = rotate_mask(&mask, degrees);
    let colored = colorize(&rotated, Color::black().channels(), color.channels());

    paste_with_mask(target, &colored, &rotated, PlacementPosition::origin());
}

/// Draw a text watermark, choosing the horizontal or rotated path.
pub fn draw_text_watermark(target: &mut RgbaImage, options: &TextRenderOptions, font: &FontHandle) {
    if options.rotation_degrees == 0 {
        draw_text(target, &options.text, font, options.position, options.color);
    } else {
        draw_rotated_text(
            target,
            &options.text,
            font,
            options.position,
            options.color,
            options.rotation_degrees,
        );
    }
}
