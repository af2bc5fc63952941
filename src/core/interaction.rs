// Copyright @yucwang 2023

use crate::core::material::Material;
use crate::math::constants::{ Float, Vector3f };
use crate::math::spectrum::RGBSpectrum;
use std::sync::Arc;

/// Result of a ray query or of sampling a point on a surface.
#[derive(Clone)]
pub struct SurfaceIntersection {
    p: Vector3f,
    normal: Vector3f,
    t: Float,
    le: RGBSpectrum,
    material: Option<Arc<dyn Material>>,
    object_index: Option<usize>,
}

pub struct SurfaceSampleRecord {
    intersection: SurfaceIntersection,
    pdf: Float,
}

impl SurfaceIntersection {
    pub fn new(p: Vector3f, normal: Vector3f, t: Float) -> Self {
        Self { p, normal, t, le: RGBSpectrum::default(), material: None, object_index: None }
    }

    pub fn t(&self) -> Float {
        self.t
    }

    pub fn p(&self) -> Vector3f {
        self.p
    }

    /// Geometric normal as reported by the shape; not guaranteed to be unit length.
    pub fn normal(&self) -> Vector3f {
        self.normal
    }

    pub fn le(&self) -> RGBSpectrum {
        self.le
    }

    pub fn material(&self) -> Option<&Arc<dyn Material>> {
        self.material.as_ref()
    }

    pub fn object_index(&self) -> Option<usize> {
        self.object_index
    }

    pub fn with_le(mut self, le: RGBSpectrum) -> Self {
        self.le = le;
        self
    }

    pub fn with_material(mut self, material: Arc<dyn Material>) -> Self {
        self.material = Some(material);
        self
    }

    pub fn with_object_index(mut self, object_index: Option<usize>) -> Self {
        self.object_index = object_index;
        self
    }
}

impl SurfaceSampleRecord {
    pub fn new(intersection: SurfaceIntersection, pdf: Float) -> Self {
        Self { intersection, pdf }
    }

    pub fn intersection(&self) -> &SurfaceIntersection {
        &self.intersection
    }

    pub fn pdf(&self) -> Float {
        self.pdf
    }

    pub fn set_pdf(&mut self, pdf: Float) {
        self.pdf = pdf;
    }

    pub fn map_intersection<F>(self, f: F) -> Self
    where
        F: FnOnce(SurfaceIntersection) -> SurfaceIntersection,
    {
        Self { intersection: f(self.intersection), pdf: self.pdf }
    }
}
