// Copyright @yucwang 2023

use super::triangle::Triangle;

use crate::core::bvh::{ BVH, SplitMethod };
use crate::core::interaction::{ SurfaceIntersection, SurfaceSampleRecord };
use crate::core::shape::Shape;
use crate::io::obj_utils;
use crate::io::obj_utils::ObjLoadError;
use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::ray::Ray3f;
use crate::math::transform::Transform;

use std::path::Path;

/// Triangle soup with its own hierarchy. Sampling picks a triangle
/// proportionally to its area, so the density is `1 / total_area`.
pub struct TriangleMesh {
    triangles: Vec<Triangle>,
    cdf: Vec<Float>,
    total_area: Float,
    bvh: BVH,
}

impl TriangleMesh {
    pub fn new(triangles: Vec<Triangle>) -> Self {
        let mut cdf = Vec::with_capacity(triangles.len());
        let mut total_area = 0.0;
        for tri in &triangles {
            total_area += tri.surface_area();
            cdf.push(total_area);
        }

        let bounds = triangles.iter().map(|t| t.bounding_box()).collect();
        let bvh = BVH::new(bounds, SplitMethod::Sah);

        Self { triangles, cdf, total_area, bvh }
    }

    pub fn from_obj<P: AsRef<Path>>(path: P, to_world: &Transform) -> Result<Self, ObjLoadError> {
        let obj_set = obj_utils::load_obj_from_file(path)?;
        Ok(Self::from_obj_set(&obj_set, to_world))
    }

    pub fn from_obj_str(input: &str, to_world: &Transform) -> Result<Self, ObjLoadError> {
        let obj_set = obj_utils::load_obj_from_str(input)?;
        Ok(Self::from_obj_set(&obj_set, to_world))
    }

    fn from_obj_set(obj_set: &wavefront_obj::obj::ObjSet, to_world: &Transform) -> Self {
        let mut triangles = Vec::new();
        for object in &obj_set.objects {
            let vertices: Vec<Vector3f> = object.vertices.iter()
                .map(|v| to_world.apply_point(Vector3f::new(v.x as Float, v.y as Float, v.z as Float)))
                .collect();
            for geom in &object.geometry {
                for shape in &geom.shapes {
                    if let wavefront_obj::obj::Primitive::Triangle(a, b, c) = shape.primitive {
                        let corners = (vertices.get(a.0), vertices.get(b.0), vertices.get(c.0));
                        match corners {
                            (Some(p0), Some(p1), Some(p2)) => triangles.push(Triangle::new(*p0, *p1, *p2)),
                            _ => log::warn!("Skipping face with out of range vertex in {}", object.name),
                        }
                    }
                }
            }
        }

        log::debug!("Loaded mesh with {} triangles", triangles.len());
        Self::new(triangles)
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }
}

impl Shape for TriangleMesh {
    fn bounding_box(&self) -> AABB {
        self.bvh.bounds()
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceIntersection> {
        self.bvh.ray_intersection(ray, |idx, r| {
            self.triangles[idx].ray_intersection(r).map(|h| {
                let t = h.t();
                (h, t)
            })
        }).map(|(_, hit)| hit)
    }

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.bvh.ray_intersection_t(ray, |idx, r| self.triangles[idx].ray_intersection_t(r))
    }

    fn sample(&self, u: &Vector2f) -> SurfaceSampleRecord {
        if self.triangles.is_empty() || self.total_area <= 0.0 {
            let intersection = SurfaceIntersection::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), 0.0);
            return SurfaceSampleRecord::new(intersection, 0.0);
        }

        let target = u.x * self.total_area;
        let idx = self.cdf.partition_point(|&c| c < target).min(self.triangles.len() - 1);
        let lo = if idx == 0 { 0.0 } else { self.cdf[idx - 1] };
        let tri_area = self.cdf[idx] - lo;
        let reused = if tri_area > 0.0 { ((target - lo) / tri_area).clamp(0.0, 0.999_999) } else { 0.0 };

        let mut record = self.triangles[idx].sample(&Vector2f::new(reused, u.y));
        record.set_pdf(1.0 / self.total_area);
        record
    }

    fn surface_area(&self) -> Float {
        self.total_area
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
v 0.0 0.0 0.0
v 2.0 0.0 0.0
v 2.0 1.0 0.0
v 0.0 1.0 0.0
f 1 2 3 4
";

    #[test]
    fn test_quad_mesh() {
        let mesh = TriangleMesh::from_obj_str(QUAD, &Transform::default()).expect("parse");
        assert_eq!(mesh.triangle_count(), 2);
        assert!((mesh.surface_area() - 2.0).abs() < 1e-5);

        let ray = Ray3f::new(Vector3f::new(1.5, 0.2, 1.0), Vector3f::new(0.0, 0.0, -1.0), None, None);
        let hit = mesh.ray_intersection(&ray).expect("hit");
        assert!((hit.t() - 1.0).abs() < 1e-5);
        assert!(mesh.ray_intersection_t(&ray));

        let miss = Ray3f::new(Vector3f::new(3.0, 0.2, 1.0), Vector3f::new(0.0, 0.0, -1.0), None, None);
        assert!(mesh.ray_intersection(&miss).is_none());
    }

    #[test]
    fn test_mesh_sampling_density() {
        let to_world = Transform::translate(&Vector3f::new(0.0, 0.0, 5.0));
        let mesh = TriangleMesh::from_obj_str(QUAD, &to_world).expect("parse");
        for i in 0..16 {
            let u = Vector2f::new(i as Float / 16.0, 0.3);
            let record = mesh.sample(&u);
            let p = record.intersection().p();
            assert!((p.z - 5.0).abs() < 1e-5);
            assert!(p.x >= -1e-5 && p.x <= 2.0 + 1e-5);
            assert!(p.y >= -1e-5 && p.y <= 1.0 + 1e-5);
            assert_eq!(record.pdf(), 1.0 / mesh.surface_area());
        }
    }
}
