// Copyright @yucwang 2023

use crate::math::constants::{ Float, Vector3f };

/// Orthonormal shading frame whose `n` axis is the local +z.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    pub s: Vector3f,
    pub t: Vector3f,
    pub n: Vector3f
}

impl Default for Frame {
    fn default() -> Self {
        Frame {
            s: Vector3f::new(1.0, 0.0, 0.0),
            t: Vector3f::new(0.0, 1.0, 0.0),
            n: Vector3f::new(0.0, 0.0, 1.0)
        }
    }
}

impl Frame {
    /// Builds a frame around a unit normal without branching on the
    /// dominant axis (Duff et al. 2017).
    pub fn from_normal(n: &Vector3f) -> Frame {
        let sign: Float = (1.0 as Float).copysign(n.z);
        let a = -1.0 / (sign + n.z);
        let b = n.x * n.y * a;
        Frame {
            s: Vector3f::new(1.0 + sign * n.x * n.x * a, sign * b, -sign * n.x),
            t: Vector3f::new(b, sign + n.y * n.y * a, -n.y),
            n: *n
        }
    }

    pub fn to_local(&self, v: &Vector3f) -> Vector3f {
        Vector3f::new(v.dot(&self.s), v.dot(&self.t), v.dot(&self.n))
    }

    pub fn to_world(&self, v: &Vector3f) -> Vector3f {
        self.s * v.x + self.t * v.y + self.n * v.z
    }

    pub fn cos_theta(v: &Vector3f) -> Float {
        v.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_orthonormal(frame: &Frame) {
        assert!((frame.s.norm() - 1.0).abs() < 1e-5);
        assert!((frame.t.norm() - 1.0).abs() < 1e-5);
        assert!((frame.n.norm() - 1.0).abs() < 1e-5);
        assert!(frame.s.dot(&frame.t).abs() < 1e-5);
        assert!(frame.s.dot(&frame.n).abs() < 1e-5);
        assert!(frame.t.dot(&frame.n).abs() < 1e-5);
    }

    #[test]
    fn test_frame_is_orthonormal() {
        let normals = [
            Vector3f::new(0.0, 0.0, 1.0),
            Vector3f::new(0.0, 0.0, -1.0),
            Vector3f::new(1.0, 0.0, 0.0),
            Vector3f::new(0.3, -0.4, 0.5).normalize(),
            Vector3f::new(-0.7, 0.1, -0.2).normalize(),
        ];
        for n in &normals {
            assert_orthonormal(&Frame::from_normal(n));
        }
    }

    #[test]
    fn test_local_world_round_trip() {
        let frame = Frame::from_normal(&Vector3f::new(0.2, 0.9, -0.1).normalize());
        let v = Vector3f::new(0.3, -1.2, 2.0);
        let back = frame.to_world(&frame.to_local(&v));
        assert!((back - v).norm() < 1e-5);
        let up = frame.to_world(&Vector3f::new(0.0, 0.0, 1.0));
        assert!((up - frame.n).norm() < 1e-6);
    }
}
