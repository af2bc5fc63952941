// Copyright @yucwang 2026

use crate::math::bitmap::Bitmap;
use crate::math::constants::Vector2f;
use crate::math::ray::Ray3f;

/// Camera that owns the film it develops into.
pub trait Sensor: Sync {
    /// Primary ray through the film position `u` in `[0, 1]^2`, with `(0, 0)`
    /// at the top-left corner.
    fn sample_ray(&self, u: &Vector2f) -> Ray3f;
    fn bitmap(&self) -> &Bitmap;
    fn bitmap_mut(&mut self) -> &mut Bitmap;

    fn film_size(&self) -> (usize, usize) {
        (self.bitmap().width(), self.bitmap().height())
    }

    fn describe(&self) -> String {
        let (w, h) = self.film_size();
        format!("Sensor {}x{}", w, h)
    }
}
