// Copyright @yucwang 2021

use crate::core::integrator::Integrator;
use crate::core::rng::LcgRng;
use crate::core::sampler::Sampler;
use crate::core::scene::Scene;
use crate::core::sensor::Sensor;
use crate::math::bitmap::Bitmap;
use crate::math::constants::{Float, Vector2f};
use crate::math::spectrum::RGBSpectrum;
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

pub use super::renderer::{RenderError, Renderer};

const BLOCK_SIZE: usize = 32;

/// Statistics of the samples taken for one pixel.
#[derive(Debug, Clone, Copy)]
pub struct PixelEstimate {
    pub mean: RGBSpectrum,
    pub std_error: RGBSpectrum,
    pub kept: u32,
    pub dropped: u32,
}

struct Block {
    x0: usize,
    y0: usize,
    x1: usize,
    y1: usize,
    pixels: Vec<RGBSpectrum>,
}

/// Tile-parallel renderer. Every pixel draws from its own generator seeded by
/// `(seed, x, y)`, so images do not depend on the thread count.
pub struct SimpleRenderer {
    integrator: Box<dyn Integrator>,
    camera_id: usize,
    seed: u64,
    threads: Option<usize>,
}

impl SimpleRenderer {
    pub fn new(integrator: Box<dyn Integrator>, camera_id: usize, seed: u64) -> Self {
        Self { integrator, camera_id, seed, threads: None }
    }

    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        self.threads = threads.filter(|&n| n > 0);
        self
    }

    /// Runs `spp` samples for the pixel `(x, y)`. Non-finite samples are
    /// discarded and counted.
    pub fn estimate_pixel(integrator: &dyn Integrator,
                          scene: &Scene,
                          sensor: &dyn Sensor,
                          x: usize,
                          y: usize,
                          spp: u32,
                          seed: u64) -> PixelEstimate {
        let (width, height) = sensor.film_size();
        let mut rng = LcgRng::seed_from_u64(LcgRng::pixel_seed(seed, x, y));
        let mut sum = RGBSpectrum::default();
        let mut sum_sq = RGBSpectrum::default();
        let mut kept = 0u32;
        let mut dropped = 0u32;

        for _ in 0..spp.max(1) {
            let u = Vector2f::new((x as Float + rng.next_1d()) / width as Float,
                                  (y as Float + rng.next_1d()) / height as Float);
            let ray = sensor.sample_ray(&u);
            let l = integrator.li(scene, &ray, &mut rng);
            if l.is_finite() {
                sum += l;
                sum_sq += l * l;
                kept += 1;
            } else {
                dropped += 1;
            }
        }

        if kept == 0 {
            return PixelEstimate { mean: RGBSpectrum::default(), std_error: RGBSpectrum::default(), kept, dropped };
        }

        let n = kept as Float;
        let mean = sum / n;
        let std_error = if kept > 1 {
            let var = (sum_sq / n - mean * mean) * (n / (n - 1.0));
            RGBSpectrum::new(var.r().max(0.0).sqrt(), var.g().max(0.0).sqrt(), var.b().max(0.0).sqrt()) / n.sqrt()
        } else {
            RGBSpectrum::default()
        };

        PixelEstimate { mean, std_error, kept, dropped }
    }

    fn render_block(&self, scene: &Scene, sensor: &dyn Sensor, block_index: usize,
                    blocks_x: usize, dropped: &AtomicUsize) -> Block {
        let (width, height) = sensor.film_size();
        let x0 = (block_index % blocks_x) * BLOCK_SIZE;
        let y0 = (block_index / blocks_x) * BLOCK_SIZE;
        let x1 = (x0 + BLOCK_SIZE).min(width);
        let y1 = (y0 + BLOCK_SIZE).min(height);
        let spp = self.integrator.samples_per_pixel();

        let mut pixels = Vec::with_capacity((x1 - x0) * (y1 - y0));
        for y in y0..y1 {
            for x in x0..x1 {
                let estimate = Self::estimate_pixel(self.integrator.as_ref(), scene, sensor, x, y, spp, self.seed);
                if estimate.dropped > 0 {
                    dropped.fetch_add(estimate.dropped as usize, Ordering::Relaxed);
                }
                pixels.push(estimate.mean);
            }
        }

        Block { x0, y0, x1, y1, pixels }
    }
}

impl Renderer for SimpleRenderer {
    fn render(&self, scene: &mut Scene) -> Result<Bitmap, RenderError> {
        let mut sensor = scene.take_sensor(self.camera_id)
            .ok_or(RenderError::MissingCamera(self.camera_id))?;

        let (width, height) = sensor.film_size();
        if width == 0 || height == 0 {
            scene.insert_sensor(self.camera_id, sensor);
            return Err(RenderError::EmptyFilm);
        }

        let blocks_x = (width + BLOCK_SIZE - 1) / BLOCK_SIZE;
        let blocks_y = (height + BLOCK_SIZE - 1) / BLOCK_SIZE;
        let total_blocks = blocks_x * blocks_y;
        let thread_count = self.threads.unwrap_or_else(|| {
            thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
        });
        log::info!("Rendering {}x{} at {} spp on {} threads",
                   width, height, self.integrator.samples_per_pixel(), thread_count);

        let progress = ProgressBar::new(total_blocks as u64);
        progress.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} blocks")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let next_block = AtomicUsize::new(0);
        let dropped = AtomicUsize::new(0);
        let (tx, rx) = mpsc::channel::<Block>();
        let mut output = Bitmap::new(width, height);
        let scene_ref: &Scene = scene;
        let sensor_ref: &dyn Sensor = sensor.as_ref();

        thread::scope(|scope| {
            for _ in 0..thread_count {
                let tx = tx.clone();
                let next_block = &next_block;
                let dropped = &dropped;
                scope.spawn(move || loop {
                    let block_index = next_block.fetch_add(1, Ordering::Relaxed);
                    if block_index >= total_blocks {
                        break;
                    }
                    let block = self.render_block(scene_ref, sensor_ref, block_index, blocks_x, dropped);
                    if tx.send(block).is_err() {
                        break;
                    }
                });
            }

            drop(tx);
            for block in rx.iter() {
                let mut pixels = block.pixels.into_iter();
                for y in block.y0..block.y1 {
                    for x in block.x0..block.x1 {
                        if let Some(p) = pixels.next() {
                            output[(x, y)] = p;
                        }
                    }
                }
                progress.inc(1);
            }
        });
        progress.finish_and_clear();

        let dropped = dropped.into_inner();
        if dropped > 0 {
            log::warn!("Dropped {} non-finite radiance samples", dropped);
        }

        *sensor.bitmap_mut() = output.clone();
        scene.insert_sensor(self.camera_id, sensor);
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scene::SceneObject;
    use crate::integrators::path::PathIntegrator;
    use crate::materials::emissive::EmissiveMaterial;
    use crate::materials::lambertian_diffuse::LambertianDiffuse;
    use crate::math::constants::Vector3f;
    use crate::math::transform::Transform;
    use crate::sensors::perspective::PerspectiveCamera;
    use crate::shapes::rectangle::Rectangle;
    use std::sync::Arc;

    fn scene_with_camera() -> Scene {
        let mut scene = Scene::new();
        let white: Arc<dyn crate::core::material::Material> = Arc::new(LambertianDiffuse::new(RGBSpectrum::splat(0.5)));
        let floor = Rectangle::new(Transform::scale(&Vector3f::new(3.0, 3.0, 1.0)));
        scene.add_object(SceneObject::new(Arc::new(floor), white.clone()));
        let light = Rectangle::new(Transform::rotate(&Vector3f::new(1.0, 0.0, 0.0), 180.0)
            .then(&Transform::translate(&Vector3f::new(0.0, 0.0, 2.0))));
        scene.add_object(SceneObject::new(Arc::new(light),
                                          Arc::new(EmissiveMaterial::new(white, RGBSpectrum::splat(3.0)))));
        scene.build_bvh();
        scene.add_sensor(Box::new(PerspectiveCamera::new(
            Vector3f::new(0.0, -4.0, 1.0), Vector3f::new(0.0, 0.0, 0.5), Vector3f::new(0.0, 0.0, 1.0),
            45.0, 40, 30)));
        scene
    }

    #[test]
    fn test_render_is_independent_of_thread_count() {
        let mut scene = scene_with_camera();
        let one = SimpleRenderer::new(Box::new(PathIntegrator::new(0.8, 2)), 0, 7).with_threads(Some(1));
        let four = SimpleRenderer::new(Box::new(PathIntegrator::new(0.8, 2)), 0, 7).with_threads(Some(4));

        let a = one.render(&mut scene).expect("render");
        let b = four.render(&mut scene).expect("render");
        assert_eq!(a.width(), 40);
        assert_eq!(a.height(), 30);
        assert_eq!(a.pixels(), b.pixels());
        assert!(a.pixels().iter().all(|p| p.is_finite() && !p.has_negative()));
        assert!(!a.mean().is_black());
        assert_eq!(scene.camera(0).map(|c| c.bitmap().pixels() == a.pixels()), Some(true));
    }

    #[test]
    fn test_missing_camera() {
        let mut scene = scene_with_camera();
        let renderer = SimpleRenderer::new(Box::new(PathIntegrator::new(0.8, 1)), 3, 0);
        assert!(matches!(renderer.render(&mut scene), Err(RenderError::MissingCamera(3))));
    }

    #[test]
    fn test_pixel_estimate_statistics() {
        let scene = scene_with_camera();
        let integrator = PathIntegrator::new(0.8, 64);
        let sensor = scene.camera(0).expect("camera");
        let estimate = SimpleRenderer::estimate_pixel(&integrator, &scene, sensor, 20, 20, 64, 1);
        assert_eq!(estimate.kept + estimate.dropped, 64);
        assert!(!estimate.std_error.has_negative());
        assert!(estimate.mean.is_finite());
    }
}
