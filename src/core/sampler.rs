// Copyright @yucwang 2026

use crate::math::constants::{ Float, Vector2f };
use rand::{Rng, RngCore};

/// Source of uniform numbers in `[0, 1)` threaded through every estimator call.
pub trait Sampler {
    fn next_1d(&mut self) -> Float;

    fn next_2d(&mut self) -> Vector2f {
        let x = self.next_1d();
        let y = self.next_1d();
        Vector2f::new(x, y)
    }
}

impl<R: RngCore> Sampler for R {
    fn next_1d(&mut self) -> Float {
        self.gen::<Float>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::LcgRng;
    use rand::SeedableRng;

    #[test]
    fn test_rng_backed_sampler_is_reproducible() {
        let mut a = LcgRng::seed_from_u64(3);
        let mut b = LcgRng::seed_from_u64(3);
        let sa: &mut dyn Sampler = &mut a;
        let sb: &mut dyn Sampler = &mut b;
        for _ in 0..8 {
            assert_eq!(sa.next_2d(), sb.next_2d());
        }
    }
}
