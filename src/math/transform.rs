// Copyright 2020 @TwoCookingMice

use super::constants::{ Float, Matrix4f, Vector3f, Vector4f };
use super::ray::Ray3f;

use nalgebra::{ Rotation3, Unit };

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    matrix: Matrix4f,
    inv_matrix: Matrix4f
}

impl Default for Transform {
    fn default() -> Self {
        Self { matrix: Matrix4f::identity(),
               inv_matrix: Matrix4f::identity() }
    }
}

impl Transform {
    pub fn new(matrix: Matrix4f) -> Self {
        Self { matrix,
               inv_matrix: matrix.try_inverse().unwrap_or(Matrix4f::identity())}
    }

    pub fn translate(v: &Vector3f) -> Self {
        Self::new(Matrix4f::new_translation(v))
    }

    pub fn scale(v: &Vector3f) -> Self {
        Self::new(Matrix4f::new_nonuniform_scaling(v))
    }

    /// Rotation by `angle_deg` degrees around `axis`.
    pub fn rotate(axis: &Vector3f, angle_deg: Float) -> Self {
        let axis = Unit::new_normalize(*axis);
        let rotation = Rotation3::from_axis_angle(&axis, angle_deg.to_radians());
        Self::new(rotation.to_homogeneous())
    }

    /// Applies `self` first, then `next`.
    pub fn then(&self, next: &Transform) -> Self {
        Self { matrix: next.matrix * self.matrix,
               inv_matrix: self.inv_matrix * next.inv_matrix }
    }

    pub fn matrix(&self) -> &Matrix4f {
        &self.matrix
    }

    fn apply_point_with(m: &Matrix4f, p: Vector3f) -> Vector3f {
        let h = m * Vector4f::new(p.x, p.y, p.z, 1.0);
        Vector3f::new(h.x / h.w, h.y / h.w, h.z / h.w)
    }

    fn apply_vector_with(m: &Matrix4f, v: Vector3f) -> Vector3f {
        let h = m * Vector4f::new(v.x, v.y, v.z, 0.0);
        Vector3f::new(h.x, h.y, h.z)
    }

    pub fn apply_point(&self, p: Vector3f) -> Vector3f {
        Self::apply_point_with(&self.matrix, p)
    }

    pub fn apply_vector(&self, v: Vector3f) -> Vector3f {
        Self::apply_vector_with(&self.matrix, v)
    }

    // Normals transform with the inverse transpose: (M^{-1})^T n.
    pub fn apply_normal(&self, n: Vector3f) -> Vector3f {
        Self::apply_vector_with(&self.inv_matrix.transpose(), n)
    }

    pub fn inv_apply_point(&self, p: Vector3f) -> Vector3f {
        Self::apply_point_with(&self.inv_matrix, p)
    }

    pub fn inv_apply_vector(&self, v: Vector3f) -> Vector3f {
        Self::apply_vector_with(&self.inv_matrix, v)
    }

    /// Ray in the local space. The direction is renormalized, so distances
    /// along the returned ray are local distances.
    pub fn inv_apply_ray(&self, ray: &Ray3f) -> Ray3f {
        let new_p = self.inv_apply_point(ray.origin());
        let new_d = self.inv_apply_vector(ray.dir());

        Ray3f::new(new_p, new_d, None, None)
    }
}
