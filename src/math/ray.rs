// Copyright 2020 @TwoCookingMice

use super::constants::{Float, Vector3f, EPSILON, FLOAT_MAX, SHADOW_EPSILON};

#[derive(Debug, Clone, Copy)]
pub struct Ray3f {
    origin: Vector3f,
    dir: Vector3f,
    pub min_t: Float,
    pub max_t: Float
}

/// Start offset for rays leaving a surface at `p`. Float error in a hit
/// point grows with its coordinates, so the offset does too; scenes within a
/// unit box get `EPSILON` itself.
pub fn surface_offset(p: &Vector3f) -> Float {
    EPSILON * p.amax().max(1.0)
}

impl Ray3f {
    pub fn new(o: Vector3f, d: Vector3f,
               min_t: Option<Float>, max_t: Option<Float>) -> Self {
        Self { origin: o, dir: d.normalize(),
               min_t: min_t.unwrap_or(0.0),
               max_t: max_t.unwrap_or(FLOAT_MAX)}
    }

    /// Continuation ray leaving a surface point, offset to skip the surface itself.
    pub fn spawn(o: Vector3f, d: Vector3f) -> Self {
        Self::new(o, d, Some(surface_offset(&o)), None)
    }

    /// Shadow segment from `o` towards `target`. Returns the ray and the full
    /// distance to the target; the segment stops `SHADOW_EPSILON` short of it.
    pub fn spawn_to(o: Vector3f, target: Vector3f) -> (Self, Float) {
        let to_target = target - o;
        let dist = to_target.norm();
        let ray = Self::new(o, to_target, Some(surface_offset(&o)), Some(dist - SHADOW_EPSILON));
        (ray, dist)
    }

    pub fn origin(&self) -> Vector3f {
        self.origin
    }

    pub fn dir(&self) -> Vector3f {
        self.dir
    }

    pub fn at(&self, t: Float) -> Vector3f {
        self.origin + self.dir * t
    }

    pub fn update(&mut self, t: Float) -> bool {
        if !self.test_segment(t) {
            false
        } else {
            self.max_t = t;
            true
        }
    }

    pub fn test_segment(&self, t: Float) -> bool {
        t >= self.min_t && t <= self.max_t
    }
}

/* Tests for Ray */
