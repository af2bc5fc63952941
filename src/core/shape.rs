// Copyright @yucwang 2023

use crate::core::interaction::{ SurfaceIntersection, SurfaceSampleRecord };
use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector2f };
use crate::math::ray::Ray3f;

pub trait Shape: Send + Sync {
    fn bounding_box(&self) -> AABB;

    /// Nearest hit within the ray segment.
    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceIntersection>;

    /// Whether anything is hit within the ray segment.
    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.ray_intersection(ray).is_some()
    }

    /// Uniform-by-area point on the surface; the record carries the per-area
    /// density `1 / surface_area()`.
    fn sample(&self, u: &Vector2f) -> SurfaceSampleRecord;

    fn surface_area(&self) -> Float;
}
