// Copyright @yucwang 2026

use rand::{Error, RngCore, SeedableRng};

/// 64-bit linear congruential generator, one instance per pixel.
#[derive(Debug, Clone)]
pub struct LcgRng {
    state: u64,
}

impl LcgRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Seed for the pixel `(x, y)` of a render started with `seed`.
    pub fn pixel_seed(seed: u64, x: usize, y: usize) -> u64 {
        ((seed & 0xFFFF_FFFF) << 32)
            | (((y as u64) & 0xFFFF) << 16)
            | ((x as u64) & 0xFFFF)
    }
}

impl RngCore for LcgRng {
    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.state >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        let hi = self.next_u32() as u64;
        let lo = self.next_u32() as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for LcgRng {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u64::from_le_bytes(seed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = LcgRng::seed_from_u64(42);
        let mut b = LcgRng::seed_from_u64(42);
        for _ in 0..16 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn test_floats_in_unit_interval() {
        let mut rng = LcgRng::seed_from_u64(7);
        let mut sum = 0.0f64;
        let n = 10_000;
        for _ in 0..n {
            let v: f32 = rng.gen();
            assert!((0.0..1.0).contains(&v));
            sum += v as f64;
        }
        assert!((sum / n as f64 - 0.5).abs() < 0.02);
    }

    #[test]
    fn test_pixel_seeds_are_distinct() {
        assert_ne!(LcgRng::pixel_seed(0, 1, 0), LcgRng::pixel_seed(0, 0, 1));
        assert_ne!(LcgRng::pixel_seed(1, 0, 0), LcgRng::pixel_seed(0, 0, 0));
    }
}
