//! Image → heatmap transform
//!
//! The whole pipeline is synchronous: read file, decode, reduce to luma,
//! stretch to the full 8-bit range, colorize, encode JPEG.

use crate::camera::CameraImage;
use crate::colormap::Colormap;
use crate::error::CameraError;
use crate::mime::MimeType;
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, GrayImage, Luma, RgbImage};
use std::path::Path;
use tracing::debug;

/// Quality passed to the JPEG encoder
pub const JPEG_QUALITY: u8 = 75;

/// Render the image at `path` as a jet heatmap JPEG.
pub fn render_heatmap(path: impl AsRef<Path>) -> Result<CameraImage, CameraError> {
    let path = path.as_ref();
    let raw = std::fs::read(path)?;
    let decoded = image::load_from_memory(&raw).map_err(CameraError::Format)?;

    let gray = to_grayscale(&decoded);
    let normalized = normalize_min_max(&gray);
    let heatmap = Colormap::jet().apply(&normalized);
    let data = encode_jpeg(&heatmap)?;

    debug!(
        "Rendered heatmap for {} ({}x{}, {} bytes)",
        path.display(),
        heatmap.width(),
        heatmap.height(),
        data.len()
    );

    Ok(CameraImage::new(Bytes::from(data), MimeType::Jpeg))
}

/// Reduce to 8-bit luma using ITU-R 601-2 weights; alpha is dropped.
pub fn to_grayscale(image: &DynamicImage) -> GrayImage {
    if let DynamicImage::ImageLuma8(gray) = image {
        return gray.clone();
    }

    let rgb = image.to_rgb8();
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        // 16.16 fixed point: 0.299, 0.587, 0.114
        let luma = (r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16;
        Luma([luma as u8])
    })
}

/// Stretch intensities linearly so the darkest pixel becomes 0 and the
/// brightest 255. A uniform image has no range to stretch and maps to all 0.
pub fn normalize_min_max(gray: &GrayImage) -> GrayImage {
    let (min, max) = gray
        .pixels()
        .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p[0]), hi.max(p[0])));

    if gray.width() == 0 || gray.height() == 0 || min >= max {
        return GrayImage::new(gray.width(), gray.height());
    }

    let range = (max - min) as u32;
    let mut out = gray.clone();
    for p in out.pixels_mut() {
        p[0] = scale_rounded((p[0] - min) as u32, range);
    }
    out
}

/// `offset * 255 / range`, rounded half to even
fn scale_rounded(offset: u32, range: u32) -> u8 {
    let scaled = offset * 255;
    let (quotient, remainder) = (scaled / range, scaled % range);
    let rounded = match (remainder * 2).cmp(&range) {
        std::cmp::Ordering::Less => quotient,
        std::cmp::Ordering::Greater => quotient + 1,
        std::cmp::Ordering::Equal => quotient + (quotient & 1),
    };
    rounded as u8
}

/// Encode an RGB image as baseline JPEG.
pub fn encode_jpeg(image: &RgbImage) -> Result<Vec<u8>, CameraError> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY)
        .encode(image.as_raw(), image.width(), image.height(), ColorType::Rgb8)
        .map_err(CameraError::Encode)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, Rgba, RgbaImage};

    #[test]
    fn test_grayscale_passthrough() {
        let gray = GrayImage::from_raw(2, 1, vec![3, 250]).unwrap();
        let out = to_grayscale(&DynamicImage::ImageLuma8(gray.clone()));
        assert_eq!(out, gray);
    }

    #[test]
    fn test_grayscale_luma_weights() {
        let rgb = RgbImage::from_raw(3, 1, vec![255, 0, 0, 0, 255, 0, 0, 0, 255]).unwrap();
        let out = to_grayscale(&DynamicImage::ImageRgb8(rgb));
        assert_eq!(out.as_raw(), &vec![76, 150, 29]);
    }

    #[test]
    fn test_grayscale_ignores_alpha() {
        let rgba = RgbaImage::from_pixel(1, 1, Rgba([100, 100, 100, 0]));
        let out = to_grayscale(&DynamicImage::ImageRgba8(rgba));
        assert_eq!(out.get_pixel(0, 0)[0], 100);
    }

    #[test]
    fn test_normalize_stretches_range() {
        let gray = GrayImage::from_raw(3, 1, vec![50, 100, 150]).unwrap();
        let out = normalize_min_max(&gray);
        assert_eq!(out.as_raw(), &vec![0, 128, 255]);
    }

    #[test]
    fn test_normalize_ties_round_to_even() {
        // 3 * 25.5 = 76.5 and 1 * 25.5 = 25.5
        let gray = GrayImage::from_raw(4, 1, vec![10, 13, 11, 20]).unwrap();
        let out = normalize_min_max(&gray);
        assert_eq!(out.as_raw(), &vec![0, 76, 26, 255]);
    }

    #[test]
    fn test_normalize_uniform_maps_to_zero() {
        let gray = GrayImage::from_pixel(4, 4, Luma([77]));
        let out = normalize_min_max(&gray);
        assert!(out.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_normalize_two_level() {
        let gray = GrayImage::from_raw(2, 2, vec![0, 0, 255, 255]).unwrap();
        assert_eq!(normalize_min_max(&gray), gray);
    }

    #[test]
    fn test_encode_jpeg_signature() {
        let rgb = RgbImage::from_pixel(8, 8, Rgb([10, 20, 30]));
        let data = encode_jpeg(&rgb).unwrap();
        assert_eq!(&data[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_render_missing_file_is_io_error() {
        let err = render_heatmap("/definitely/not/here.png").unwrap_err();
        assert!(matches!(err, CameraError::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound));
    }
}
