// Copyright @yucwang 2023

use crate::core::shape::Shape;
use crate::core::interaction::{ SurfaceIntersection, SurfaceSampleRecord };
use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::ray::Ray3f;
use crate::math::transform::Transform;
use crate::math::warp::square_to_triangle;

#[derive(Debug, Clone)]
pub struct Triangle {
    p0: Vector3f,
    p1: Vector3f,
    p2: Vector3f,
    normal: Vector3f,
    area: Float,
}

impl Shape for Triangle {
    fn bounding_box(&self) -> AABB {
        let mut bound = AABB::new(self.p0, self.p1);
        bound.expand_by_point(&self.p2);

        bound
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceIntersection> {
        let t = self.hit_distance(ray)?;
        Some(SurfaceIntersection::new(ray.at(t), self.normal, t))
    }

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.hit_distance(ray).is_some()
    }

    fn sample(&self, u: &Vector2f) -> SurfaceSampleRecord {
        let bary = square_to_triangle(u);
        let p = self.p0 * bary.x + self.p1 * bary.y + self.p2 * bary.z;
        let interaction = SurfaceIntersection::new(p, self.normal, 0.0);

        SurfaceSampleRecord::new(interaction, 1.0 / self.area)
    }

    fn surface_area(&self) -> Float {
        self.area
    }
}

impl Triangle {
    pub fn new(p0: Vector3f, p1: Vector3f, p2: Vector3f) -> Self {
        let cross = (p1 - p0).cross(&(p2 - p0));
        let area = 0.5 * cross.norm();
        let normal = if area > 0.0 { cross.normalize() } else { Vector3f::new(0.0, 0.0, 1.0) };
        Triangle { p0, p1, p2, normal, area }
    }

    /// Moeller-Trumbore test; both faces are hit.
    fn hit_distance(&self, ray: &Ray3f) -> Option<Float> {
        let e1 = self.p1 - self.p0;
        let e2 = self.p2 - self.p0;
        let pvec = ray.dir().cross(&e2);
        let det = e1.dot(&pvec);
        if det.abs() < 1e-10 {
            return None;
        }

        let inv_det = 1.0 / det;
        let tvec = ray.origin() - self.p0;
        let b1 = tvec.dot(&pvec) * inv_det;
        if b1 < 0.0 || b1 > 1.0 {
            return None;
        }

        let qvec = tvec.cross(&e1);
        let b2 = ray.dir().dot(&qvec) * inv_det;
        if b2 < 0.0 || b1 + b2 > 1.0 {
            return None;
        }

        let t = e2.dot(&qvec) * inv_det;
        if ray.test_segment(t) { Some(t) } else { None }
    }

    pub fn geometric_normal(&self) -> Vector3f {
        self.normal
    }

    pub fn vertices(&self) -> (Vector3f, Vector3f, Vector3f) {
        (self.p0, self.p1, self.p2)
    }

    pub fn transformed(&self, transform: &Transform) -> Self {
        Self::new(transform.apply_point(self.p0),
                  transform.apply_point(self.p1),
                  transform.apply_point(self.p2))
    }
}
