// Copyright 2020 @TwoCookingMice

use super::constants::{Float, Vector3f};

use std::ops;

/// Linear RGB radiance triple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RGBSpectrum {
    rgb: Vector3f
}

impl Default for RGBSpectrum {
    fn default() -> Self {
        Self { rgb: Vector3f::new(0.0f32, 0.0f32, 0.0f32) }
    }
}

impl RGBSpectrum {
    pub fn new(r: Float, g: Float, b: Float) -> Self {
        Self { rgb: Vector3f::new(r, g, b) }
    }

    pub fn splat(v: Float) -> Self {
        Self::new(v, v, v)
    }

    pub fn from_vec(rgb: Vector3f) -> Self {
        Self { rgb }
    }

    pub fn to_vec(&self) -> Vector3f {
        self.rgb
    }

    pub fn r(&self) -> Float {
        self.rgb.x
    }

    pub fn g(&self) -> Float {
        self.rgb.y
    }

    pub fn b(&self) -> Float {
        self.rgb.z
    }

    pub fn is_black(&self) -> bool {
        self.rgb.iter().all(|c| *c == 0.0)
    }

    pub fn is_finite(&self) -> bool {
        self.rgb.iter().all(|c| c.is_finite())
    }

    pub fn has_negative(&self) -> bool {
        self.rgb.iter().any(|c| *c < 0.0)
    }

    pub fn max_component(&self) -> Float {
        self.rgb.x.max(self.rgb.y).max(self.rgb.z)
    }
}

impl ops::Index<usize> for RGBSpectrum {
    type Output = Float;

    fn index(&self, idx: usize) -> &Float {
        &self.rgb[idx]
    }
}

impl ops::Add for RGBSpectrum {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self { rgb: self.rgb + rhs.rgb }
    }
}

impl ops::AddAssign for RGBSpectrum {
    fn add_assign(&mut self, rhs: Self) {
        self.rgb += rhs.rgb;
    }
}

impl ops::Sub for RGBSpectrum {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self { rgb: self.rgb - rhs.rgb }
    }
}

impl ops::Mul for RGBSpectrum {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self { rgb: self.rgb.component_mul(&rhs.rgb) }
    }
}

impl ops::Mul<Float> for RGBSpectrum {
    type Output = Self;

    fn mul(self, rhs: Float) -> Self {
        Self { rgb: self.rgb * rhs }
    }
}

impl ops::Mul<RGBSpectrum> for Float {
    type Output = RGBSpectrum;

    fn mul(self, rhs: RGBSpectrum) -> RGBSpectrum {
        rhs * self
    }
}

impl ops::MulAssign<Float> for RGBSpectrum {
    fn mul_assign(&mut self, rhs: Float) {
        self.rgb *= rhs;
    }
}

impl ops::Div<Float> for RGBSpectrum {
    type Output = Self;

    fn div(self, rhs: Float) -> Self {
        Self { rgb: self.rgb / rhs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_black_and_finite() {
        assert!(RGBSpectrum::default().is_black());
        assert!(!RGBSpectrum::new(0.0, 1e-6, 0.0).is_black());
        assert!(RGBSpectrum::new(1.0, 2.0, 3.0).is_finite());
        assert!(!RGBSpectrum::new(1.0, Float::NAN, 3.0).is_finite());
        assert!(!RGBSpectrum::new(Float::INFINITY, 0.0, 0.0).is_finite());
        assert!(RGBSpectrum::new(0.5, -0.1, 0.0).has_negative());
    }

    #[test]
    fn test_arithmetic() {
        let a = RGBSpectrum::new(1.0, 2.0, 3.0);
        let b = RGBSpectrum::new(0.5, 0.5, 2.0);
        assert_eq!(a * b, RGBSpectrum::new(0.5, 1.0, 6.0));
        assert_eq!(a + b, RGBSpectrum::new(1.5, 2.5, 5.0));
        assert_eq!(2.0 * a, a * 2.0);
        assert_eq!((a / 2.0)[2], 1.5);
        assert_eq!(a.max_component(), 3.0);
    }
}
