// Copyright @yucwang 2026

use crate::core::interaction::{ SurfaceIntersection, SurfaceSampleRecord };
use crate::core::shape::Shape;
use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector2f, Vector3f, PI };
use crate::math::ray::Ray3f;
use crate::math::warp::sample_uniform_sphere;

pub struct Sphere {
    center: Vector3f,
    radius: Float,
}

impl Sphere {
    pub fn new(center: Vector3f, radius: Float) -> Self {
        Self { center, radius: radius.abs() }
    }

    pub fn center(&self) -> Vector3f {
        self.center
    }

    pub fn radius(&self) -> Float {
        self.radius
    }

    fn hit_distance(&self, ray: &Ray3f) -> Option<Float> {
        let oc = ray.origin() - self.center;
        let b = oc.dot(&ray.dir());
        let c = oc.norm_squared() - self.radius * self.radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }

        let sqrt_disc = disc.sqrt();
        [-b - sqrt_disc, -b + sqrt_disc].into_iter().find(|&t| ray.test_segment(t))
    }
}

impl Shape for Sphere {
    fn bounding_box(&self) -> AABB {
        let r = Vector3f::new(self.radius, self.radius, self.radius);
        AABB::new(self.center - r, self.center + r)
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceIntersection> {
        let t = self.hit_distance(ray)?;
        let p = ray.at(t);
        Some(SurfaceIntersection::new(p, (p - self.center) / self.radius, t))
    }

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.hit_distance(ray).is_some()
    }

    fn sample(&self, u: &Vector2f) -> SurfaceSampleRecord {
        let n = sample_uniform_sphere(u);
        let p = self.center + n * self.radius;
        let area = self.surface_area();
        let pdf = if area > 0.0 { 1.0 / area } else { 0.0 };

        SurfaceSampleRecord::new(SurfaceIntersection::new(p, n, 0.0), pdf)
    }

    fn surface_area(&self) -> Float {
        4.0 * PI * self.radius * self.radius
    }
}
