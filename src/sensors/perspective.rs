// Copyright @yucwang 2026

use crate::core::sensor::Sensor;
use crate::math::bitmap::Bitmap;
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::ray::Ray3f;

/// Pinhole camera. `fov_y` is the vertical field of view in degrees.
pub struct PerspectiveCamera {
    origin: Vector3f,
    forward: Vector3f,
    right: Vector3f,
    up: Vector3f,
    fov_y: Float,
    tan_half_fov_y: Float,
    aspect: Float,
    bitmap: Bitmap,
}

impl PerspectiveCamera {
    pub fn new(origin: Vector3f,
               target: Vector3f,
               up: Vector3f,
               fov_y: Float,
               width: usize,
               height: usize) -> Self {
        let forward = (target - origin).normalize();
        let right = forward.cross(&up).normalize();
        let up = right.cross(&forward).normalize();
        let aspect = if height > 0 { width as Float / height as Float } else { 1.0 };

        Self {
            origin,
            forward,
            right,
            up,
            fov_y,
            tan_half_fov_y: (0.5 * fov_y.to_radians()).tan(),
            aspect,
            bitmap: Bitmap::new(width, height),
        }
    }

    pub fn width(&self) -> usize {
        self.bitmap.width()
    }

    pub fn height(&self) -> usize {
        self.bitmap.height()
    }
}

impl Sensor for PerspectiveCamera {
    fn sample_ray(&self, u: &Vector2f) -> Ray3f {
        let px = (2.0 * u.x - 1.0) * self.aspect * self.tan_half_fov_y;
        let py = (1.0 - 2.0 * u.y) * self.tan_half_fov_y;
        let dir = self.right * px + self.up * py + self.forward;

        Ray3f::new(self.origin, dir, None, None)
    }

    fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    fn bitmap_mut(&mut self) -> &mut Bitmap {
        &mut self.bitmap
    }

    fn describe(&self) -> String {
        format!("PerspectiveCamera {}x{} fov {} at ({}, {}, {})",
                self.width(), self.height(), self.fov_y,
                self.origin.x, self.origin.y, self.origin.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> PerspectiveCamera {
        PerspectiveCamera::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, -1.0),
                               Vector3f::new(0.0, 1.0, 0.0), 90.0, 8, 4)
    }

    #[test]
    fn test_center_ray_looks_at_target() {
        let ray = camera().sample_ray(&Vector2f::new(0.5, 0.5));
        assert!((ray.dir() - Vector3f::new(0.0, 0.0, -1.0)).norm() < 1e-6);
        assert_eq!(ray.origin(), Vector3f::zeros());
    }

    #[test]
    fn test_film_corners() {
        let cam = camera();
        assert_eq!(cam.film_size(), (8, 4));
        // top-left: x goes left (-right), y goes up
        let d = cam.sample_ray(&Vector2f::new(0.0, 0.0)).dir();
        let expected = Vector3f::new(-2.0, 1.0, -1.0).normalize();
        assert!((d - expected).norm() < 1e-5);
    }
}
