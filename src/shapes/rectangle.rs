// Copyright @yucwang 2026

use crate::core::interaction::{ SurfaceIntersection, SurfaceSampleRecord };
use crate::core::shape::Shape;
use crate::math::aabb::AABB;
use crate::math::constants::{ EPSILON, Float, Vector2f, Vector3f };
use crate::math::ray::Ray3f;
use crate::math::transform::Transform;

/// The square `[-1, 1]^2` at `z = 0`, normal `+z`, placed by `to_world`.
pub struct Rectangle {
    to_world: Transform,
    normal: Vector3f,
    area: Float,
}

impl Rectangle {
    pub fn new(to_world: Transform) -> Self {
        let dp_du = to_world.apply_vector(Vector3f::new(2.0, 0.0, 0.0));
        let dp_dv = to_world.apply_vector(Vector3f::new(0.0, 2.0, 0.0));
        let cross = dp_du.cross(&dp_dv);
        let area = cross.norm();
        let normal = if area > 0.0 { cross / area } else { Vector3f::new(0.0, 0.0, 1.0) };

        Self { to_world, normal, area }
    }

    /// Parallelogram spanned by `edge_u` and `edge_v` from `corner`; it faces
    /// `edge_u x edge_v`.
    pub fn from_corner(corner: Vector3f, edge_u: Vector3f, edge_v: Vector3f) -> Self {
        let normal = edge_u.cross(&edge_v);
        let center = corner + 0.5 * (edge_u + edge_v);
        let m = nalgebra::Matrix4::new(
            0.5 * edge_u.x, 0.5 * edge_v.x, normal.x, center.x,
            0.5 * edge_u.y, 0.5 * edge_v.y, normal.y, center.y,
            0.5 * edge_u.z, 0.5 * edge_v.z, normal.z, center.z,
            0.0, 0.0, 0.0, 1.0);
        Self::new(Transform::new(m))
    }

    pub fn normal(&self) -> Vector3f {
        self.normal
    }

    fn hit_distance(&self, ray: &Ray3f) -> Option<Float> {
        let local = self.to_world.inv_apply_ray(ray);
        let dir = local.dir();
        if dir.z.abs() < EPSILON {
            return None;
        }

        let p_local = local.at(-local.origin().z / dir.z);
        if p_local.x.abs() > 1.0 || p_local.y.abs() > 1.0 {
            return None;
        }

        let t = (self.to_world.apply_point(p_local) - ray.origin()).dot(&ray.dir());
        if ray.test_segment(t) { Some(t) } else { None }
    }
}

impl Shape for Rectangle {
    fn bounding_box(&self) -> AABB {
        let mut bbox = AABB::default();
        for (x, y) in [(-1.0, -1.0), (-1.0, 1.0), (1.0, -1.0), (1.0, 1.0)] {
            bbox.expand_by_point(&self.to_world.apply_point(Vector3f::new(x, y, 0.0)));
        }
        bbox
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceIntersection> {
        let t = self.hit_distance(ray)?;
        Some(SurfaceIntersection::new(ray.at(t), self.normal, t))
    }

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.hit_distance(ray).is_some()
    }

    fn sample(&self, u: &Vector2f) -> SurfaceSampleRecord {
        let p_local = Vector3f::new(2.0 * u.x - 1.0, 2.0 * u.y - 1.0, 0.0);
        let p = self.to_world.apply_point(p_local);
        let pdf = if self.area > 0.0 { 1.0 / self.area } else { 0.0 };

        SurfaceSampleRecord::new(SurfaceIntersection::new(p, self.normal, 0.0), pdf)
    }

    fn surface_area(&self) -> Float {
        self.area
    }
}
