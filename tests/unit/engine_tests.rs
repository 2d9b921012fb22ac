// Watermark engine unit tests
// Exercise the public engine API end to end on in-memory images

use image::{DynamicImage, GenericImageView, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use rstest::rstest;
use std::io::Cursor;
use std::path::Path;
use watermarker::watermark::image_io;
use watermarker::watermark::*;

fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, format).unwrap();
    buffer.into_inner()
}

fn white_jpeg(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    encode(DynamicImage::ImageRgb8(image), ImageFormat::Jpeg)
}

fn white_png(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
    encode(DynamicImage::ImageRgba8(image), ImageFormat::Png)
}

fn engine_in(dir: &Path) -> WatermarkEngine {
    WatermarkEngine::new(EngineConfig::new(dir))
}

fn open_output(path: &Path) -> DecodedImage {
    image_io::decode(&std::fs::read(path).unwrap()).unwrap()
}

#[test]
fn test_out_of_range_red_draws_black_text_into_jpeg() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(dir.path());

    let options = TextWatermarkOptions {
        color_red: 200,
        ..TextWatermarkOptions::new("HELLO")
    };
    let output = engine
        .add_text_watermark(&white_jpeg(100, 100), &options, "input.jpg", None)
        .unwrap();

    assert_eq!(output.file_name, "input.jpeg");
    assert_eq!(output.output_folder, dir.path());

    let saved = open_output(&output.path());
    assert_eq!(saved.format, ImageFormat::Jpeg);
    assert_eq!((saved.width(), saved.height()), (100, 100));

    // Text landed somewhere, and it is dark grey rather than red
    let rgb = saved.image.to_rgb8();
    let darkest = rgb
        .pixels()
        .map(|p| p.0.iter().map(|&c| c as u32).sum::<u32>())
        .min()
        .unwrap();
    assert!(darkest < 200, "expected dark text pixels, darkest sum {darkest}");
    assert!(rgb
        .pixels()
        .all(|p| (p.0[0] as i32 - p.0[1] as i32).abs() < 60));
}

#[test]
fn test_opaque_watermark_replaces_top_left_block_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(dir.path());

    let watermark = RgbaImage::from_fn(50, 50, |x, y| Rgba([x as u8 * 5, y as u8 * 5, 77, 255]));
    let watermark_bytes = encode(DynamicImage::ImageRgba8(watermark.clone()), ImageFormat::Png);

    let output = engine
        .add_image_watermark(&white_png(200, 200), &watermark_bytes, 0, 0, "combined")
        .unwrap();
    assert_eq!(output.file_name, "combined.png");

    let saved = open_output(&dir.path().join(&output.file_name)).image.to_rgba8();
    assert_eq!(saved.dimensions(), (200, 200));
    for (x, y, pixel) in saved.enumerate_pixels() {
        if x < 50 && y < 50 {
            assert_eq!(pixel, watermark.get_pixel(x, y), "at ({x}, {y})");
        } else {
            assert_eq!(*pixel, Rgba([255, 255, 255, 255]), "at ({x}, {y})");
        }
    }
}

#[test]
fn test_image_watermark_offset_block_only() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(dir.path());

    let watermark = RgbaImage::from_pixel(7, 5, Rgba([10, 20, 30, 255]));
    let watermark_bytes = encode(DynamicImage::ImageRgba8(watermark), ImageFormat::Png);

    let output = engine
        .add_image_watermark(&white_png(64, 64), &watermark_bytes, 10, 20, "offset")
        .unwrap();

    let saved = open_output(&dir.path().join(&output.file_name)).image.to_rgba8();
    for (x, y, pixel) in saved.enumerate_pixels() {
        let inside = (10..17).contains(&x) && (20..25).contains(&y);
        let expected = if inside {
            Rgba([10, 20, 30, 255])
        } else {
            Rgba([255, 255, 255, 255])
        };
        assert_eq!(*pixel, expected, "at ({x}, {y})");
    }
}

#[rstest]
#[case(0)]
#[case(45)]
#[case(90)]
#[case(180)]
#[case(-30)]
fn test_rotated_text_keeps_dimensions(#[case] orientation: i32) {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(dir.path());

    let options = TextWatermarkOptions {
        orientation_degrees: orientation,
        pos_x: 90,
        pos_y: 5,
        ..TextWatermarkOptions::new("Rotated")
    };
    let output = engine
        .add_text_watermark(&white_png(120, 80), &options, "rot.png", None)
        .unwrap();

    let saved = open_output(&output.path());
    assert_eq!(saved.image.dimensions(), (120, 80));
}

#[test]
fn test_missing_named_font_falls_back() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(dir.path());

    let options = TextWatermarkOptions {
        font: Some("no-such-font-anywhere".to_string()),
        ..TextWatermarkOptions::new("fallback")
    };
    let output = engine
        .add_text_watermark(&white_png(80, 40), &options, "font.png", None)
        .unwrap();

    assert!(output.path().exists());
}

#[rstest]
#[case(b"".as_slice())]
#[case(b"definitely not an image".as_slice())]
#[case(&[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0])]
fn test_corrupt_input_is_decode_error_and_writes_nothing(#[case] bytes: &[u8]) {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(dir.path());

    let err = engine
        .add_text_watermark(bytes, &TextWatermarkOptions::new("x"), "bad.png", None)
        .unwrap_err();
    assert!(matches!(err, WatermarkError::DecodeError(_)));

    let err = engine
        .add_image_watermark(&white_png(10, 10), bytes, 0, 0, "bad")
        .unwrap_err();
    assert!(matches!(err, WatermarkError::DecodeError(_)));

    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[rstest]
#[case("../../etc/passwd.png", "passwd.png")]
#[case("photo.final.png", "photo.png")]
#[case("", "watermarked_image.png")]
#[case(".hidden", "watermarked_image.png")]
fn test_text_output_names(#[case] upload_name: &str, #[case] expected: &str) {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(dir.path());

    let output = engine
        .add_text_watermark(&white_png(16, 16), &TextWatermarkOptions::new("n"), upload_name, None)
        .unwrap();

    assert_eq!(output.file_name, expected);
    assert!(dir.path().join(expected).exists());
}

#[rstest]
#[case("", "watermarked.png")]
#[case(".hidden", "watermarked.png")]
#[case("../a.png", "a.png")]
#[case("photo.png", "photo.png")]
fn test_image_output_names(#[case] base_file_name: &str, #[case] expected: &str) {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(dir.path());
    let png = white_png(8, 8);

    let output = engine
        .add_image_watermark(&png, &png, 0, 0, base_file_name)
        .unwrap();

    assert_eq!(output.file_name, expected);
    assert!(dir.path().join(expected).exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[rstest]
#[case(0)]
#[case(45)]
fn test_huge_font_size_on_small_image(#[case] orientation: i32) {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(dir.path());

    let options = TextWatermarkOptions {
        font_size: 3_000_000_000,
        orientation_degrees: orientation,
        ..TextWatermarkOptions::new("HI")
    };
    let output = engine
        .add_text_watermark(&white_png(20, 20), &options, "tiny.png", None)
        .unwrap();

    let saved = open_output(&output.path());
    assert_eq!(saved.image.dimensions(), (20, 20));
}

#[test]
fn test_empty_text_leaves_pixels_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(dir.path());

    let output = engine
        .add_text_watermark(&white_png(32, 32), &TextWatermarkOptions::new(""), "blank.png", None)
        .unwrap();

    let saved = open_output(&output.path()).image.to_rgba8();
    assert!(saved.pixels().all(|p| *p == Rgba([255, 255, 255, 255])));
}

#[test]
fn test_rules_are_exposed() {
    assert_eq!(resolve_color(128, 0, 128), Color::new(128, 0, 128));
    assert_eq!(resolve_color(129, 0, 0), Color::black());
    assert_eq!(resolve_color(0, -1, 0), Color::black());

    let dims = ImageDimensions::new(101, 99);
    assert_eq!(resolve_placement(0, 0, &dims), PlacementPosition::new(25, 24));
    assert_eq!(resolve_placement(-5, 7, &dims), PlacementPosition::new(-5, 7));
}
