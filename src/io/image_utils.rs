// Copyright @yucwang 2026

use crate::io::exr_utils;
use crate::math::bitmap::Bitmap;
use crate::math::constants::Float;

use std::fmt;
use std::path::Path;

/// Exponent applied to clamped radiance for 8-bit output.
pub const DEFAULT_GAMMA: Float = 0.6;

#[derive(Debug)]
pub enum ImageWriteError {
    Exr(exr::error::Error),
    Image(image::ImageError),
    UnsupportedFormat(String),
}

impl From<exr::error::Error> for ImageWriteError {
    fn from(err: exr::error::Error) -> Self {
        ImageWriteError::Exr(err)
    }
}

impl From<image::ImageError> for ImageWriteError {
    fn from(err: image::ImageError) -> Self {
        ImageWriteError::Image(err)
    }
}

impl fmt::Display for ImageWriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageWriteError::Exr(err) => write!(f, "exr error: {}", err),
            ImageWriteError::Image(err) => write!(f, "image error: {}", err),
            ImageWriteError::UnsupportedFormat(ext) => write!(f, "unsupported image format '{}'", ext),
        }
    }
}

impl std::error::Error for ImageWriteError {}

fn to_byte(v: Float, gamma: Float) -> u8 {
    let v = if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
    (255.0 * v.powf(gamma)).round() as u8
}

/// 8-bit RGB image of the bitmap, clamped to `[0, 1]` and raised to `gamma`.
pub fn to_rgb8(bitmap: &Bitmap, gamma: Float) -> image::RgbImage {
    image::RgbImage::from_fn(bitmap.width() as u32, bitmap.height() as u32, |x, y| {
        let p = bitmap[(x as usize, y as usize)];
        image::Rgb([to_byte(p.r(), gamma), to_byte(p.g(), gamma), to_byte(p.b(), gamma)])
    })
}

/// Saves by extension: `.exr` keeps linear floats, `.png`/`.jpg`/`.jpeg`/
/// `.bmp` go through `to_rgb8`.
pub fn save_bitmap<P: AsRef<Path>>(bitmap: &Bitmap, file_path: P, gamma: Float) -> Result<(), ImageWriteError> {
    let path = file_path.as_ref();
    let ext = path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "exr" => exr_utils::write_exr(bitmap, path),
        "png" | "jpg" | "jpeg" | "bmp" => {
            log::info!("Writing image: {}.", path.display());
            to_rgb8(bitmap, gamma).save(path)?;
            Ok(())
        }
        _ => Err(ImageWriteError::UnsupportedFormat(ext)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::spectrum::RGBSpectrum;

    #[test]
    fn test_tone_mapping() {
        let mut bitmap = Bitmap::new(2, 1);
        bitmap[(0, 0)] = RGBSpectrum::new(-1.0, 0.5, 4.0);
        bitmap[(1, 0)] = RGBSpectrum::new(Float::NAN, 1.0, 0.0);
        let img = to_rgb8(&bitmap, DEFAULT_GAMMA);

        let expected_half = (255.0 * (0.5 as Float).powf(0.6)).round() as u8;
        assert_eq!(img.get_pixel(0, 0).0, [0, expected_half, 255]);
        assert_eq!(img.get_pixel(1, 0).0, [0, 255, 0]);
    }

    #[test]
    fn test_unsupported_extension() {
        let bitmap = Bitmap::new(1, 1);
        let result = save_bitmap(&bitmap, std::env::temp_dir().join("penumbra_out.tiff2"), 1.0);
        assert!(matches!(result, Err(ImageWriteError::UnsupportedFormat(ref e)) if e == "tiff2"));
    }

    #[test]
    fn test_save_png() {
        let mut bitmap = Bitmap::new(4, 4);
        bitmap[(1, 2)] = RGBSpectrum::splat(1.0);
        let path = std::env::temp_dir().join("penumbra_image_utils_test.png");
        save_bitmap(&bitmap, &path, DEFAULT_GAMMA).expect("write png");
        let back = image::open(&path).expect("read png").to_rgb8();
        let _ = std::fs::remove_file(&path);
        assert_eq!(back.get_pixel(1, 2).0, [255, 255, 255]);
        assert_eq!(back.get_pixel(0, 0).0, [0, 0, 0]);
    }
}
