// Copyright 2020 @TwoCookingMice

use super::constants::Float;
use super::spectrum::RGBSpectrum;

use std::ops;
use std::vec::Vec;

#[derive(Debug, Clone)]
pub struct Bitmap {
    data: Vec<RGBSpectrum>,
    height: usize,
    width: usize
}

impl ops::Index<(usize, usize)> for Bitmap {
    type Output = RGBSpectrum;

    fn index(&self, index: (usize, usize)) -> &RGBSpectrum {
        assert!(index.0 < self.width && index.1 < self.height);
        &self.data[index.0 + self.width * index.1]
    }
}

impl ops::IndexMut<(usize, usize)> for Bitmap {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut RGBSpectrum {
        assert!(index.0 < self.width && index.1 < self.height);
        &mut self.data[index.0 + self.width * index.1]
    }
}

impl Bitmap {
    pub fn new(width: usize, height: usize) -> Self {
        Self { data: vec![RGBSpectrum::default(); width * height],
               width,
               height }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[RGBSpectrum] {
        &self.data
    }

    pub fn mean(&self) -> RGBSpectrum {
        if self.data.is_empty() {
            return RGBSpectrum::default();
        }
        let sum = self.data.iter().fold(RGBSpectrum::default(), |acc, p| acc + *p);
        sum / self.data.len() as Float
    }
}

/* Test for Bitmap */
