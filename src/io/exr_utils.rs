/* Copyright 2020 @TwoCookingMice */

use crate::io::image_utils::ImageWriteError;
use crate::math::bitmap::Bitmap;
use crate::math::spectrum::RGBSpectrum;

use exr::prelude::{ read_first_rgba_layer_from_file, write_rgb_file };
use std::path::Path;

/// Reads the first RGBA layer of an OpenEXR file; alpha is ignored.
pub fn read_exr<P: AsRef<Path>>(file_path: P) -> Result<Bitmap, ImageWriteError> {
    log::info!("Reading OpenEXR image from: {}.", file_path.as_ref().display());

    let image = read_first_rgba_layer_from_file(
        file_path,
        |resolution, _| Bitmap::new(resolution.width(), resolution.height()),
        |bitmap: &mut Bitmap, position, (r, g, b, _a): (f32, f32, f32, f32)| {
            bitmap[(position.x(), position.y())] = RGBSpectrum::new(r, g, b);
        },
    )?;

    Ok(image.layer_data.channel_data.pixels)
}

/// Writes linear radiance values as a 32-bit float RGB OpenEXR file.
pub fn write_exr<P: AsRef<Path>>(bitmap: &Bitmap, file_path: P) -> Result<(), ImageWriteError> {
    log::info!("Writing OpenEXR image: {}.", file_path.as_ref().display());

    write_rgb_file(file_path, bitmap.width(), bitmap.height(), |x, y| {
        let p = bitmap[(x, y)];
        (p.r(), p.g(), p.b())
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read_exr() {
        let mut bitmap = Bitmap::new(3, 2);
        bitmap[(0, 0)] = RGBSpectrum::new(0.25, 8.0, 0.0);
        bitmap[(2, 1)] = RGBSpectrum::new(1.5, 0.5, 100.0);

        let path = std::env::temp_dir().join("penumbra_exr_utils_test.exr");
        write_exr(&bitmap, &path).expect("write exr");
        let back = read_exr(&path).expect("read exr");
        let _ = std::fs::remove_file(&path);

        assert_eq!(back.width(), 3);
        assert_eq!(back.height(), 2);
        assert_eq!(back[(0, 0)], bitmap[(0, 0)]);
        assert_eq!(back[(2, 1)], bitmap[(2, 1)]);
    }
}
