// Copyright 2020 @TwoCookingMice

use super::constants::{ Float, Vector3f, FLOAT_MIN, FLOAT_MAX };
use super::ray::{ Ray3f };

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AABB {
    pub p_min: Vector3f,
    pub p_max: Vector3f
}

impl Default for AABB {
    fn default() -> Self {
        Self { p_min: Vector3f::new(FLOAT_MAX, FLOAT_MAX, FLOAT_MAX),
               p_max: Vector3f::new(FLOAT_MIN, FLOAT_MIN, FLOAT_MIN) }
    }
}

impl AABB {
    pub fn new(a: Vector3f, b: Vector3f) -> Self {
        Self { p_min: a.inf(&b), p_max: a.sup(&b) }
    }

    pub fn center(&self) -> Vector3f {
        0.5f32 * (self.p_min + self.p_max)
    }

    pub fn expand_by_point(&mut self, p: &Vector3f) {
        self.p_min = self.p_min.inf(p);
        self.p_max = self.p_max.sup(p);
    }

    pub fn expand_by_aabb(&mut self, other: &AABB) {
        self.p_min = self.p_min.inf(&other.p_min);
        self.p_max = self.p_max.sup(&other.p_max);
    }

    pub fn diagonal(&self) -> Vector3f {
        self.p_max - self.p_min
    }

    pub fn surface_area(&self) -> Float {
        if !self.is_valid() {
            return 0.0;
        }
        let d = self.diagonal();
        2.0f32 * (d.x * d.y + d.x * d.z + d.y * d.z)
    }

    pub fn max_extent(&self) -> usize {
        let d = self.diagonal();
        if d.x > d.y && d.x > d.z {
            0
        } else if d.y > d.z {
            1
        } else {
            2
        }
    }

    pub fn is_valid(&self) -> bool {
        (0..3).all(|idx| self.p_min[idx] <= self.p_max[idx])
    }

    /// Slab test clipped to the ray segment. Returns the entry and exit distances.
    pub fn ray_intersect_range(&self, ray: &Ray3f) -> Option<(Float, Float)> {
        if !self.is_valid() {
            return None;
        }

        let o = ray.origin();
        let d = ray.dir();
        let mut t_min = ray.min_t;
        let mut t_max = ray.max_t;

        for idx in 0..3 {
            if d[idx].abs() < 1e-8 {
                if o[idx] < self.p_min[idx] || o[idx] > self.p_max[idx] {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d[idx];
            let mut t0 = (self.p_min[idx] - o[idx]) * inv;
            let mut t1 = (self.p_max[idx] - o[idx]) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }

            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_max < t_min {
                return None;
            }
        }

        Some((t_min, t_max))
    }

    pub fn ray_intersect(&self, ray: &Ray3f) -> bool {
        self.ray_intersect_range(ray).is_some()
    }
}

/* Test for AABB */
