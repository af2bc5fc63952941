use penumbra::core::scene_loader::load_scene;
use penumbra::integrators::path::{ PathIntegrator, DEFAULT_RR_PROBABILITY };
use penumbra::renderers::simple::SimpleRenderer;
use std::env;

fn usage(program: &str) -> ! {
    eprintln!("Usage: {} <scene.xml> <x> <y> [--spp N] [--seed N] [--camera N]", program);
    std::process::exit(1);
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        usage(&args[0]);
    }

    let scene_path = &args[1];
    let (x, y) = match (args[2].parse::<usize>(), args[3].parse::<usize>()) {
        (Ok(x), Ok(y)) => (x, y),
        _ => usage(&args[0]),
    };

    let mut spp: Option<u32> = None;
    let mut seed: u64 = 0;
    let mut camera_id: usize = 0;

    let mut i = 4;
    while i < args.len() {
        match args[i].as_str() {
            "--spp" => {
                i += 1;
                spp = args.get(i).and_then(|v| v.parse::<u32>().ok());
            }
            "--seed" => {
                i += 1;
                seed = args.get(i).and_then(|v| v.parse::<u64>().ok()).unwrap_or(seed);
            }
            "--camera" => {
                i += 1;
                camera_id = args.get(i).and_then(|v| v.parse::<usize>().ok()).unwrap_or(camera_id);
            }
            other => log::warn!("Ignoring argument '{}'", other),
        }
        i += 1;
    }

    let loaded = match load_scene(scene_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };
    let settings = loaded.settings;
    let scene = loaded.scene;

    let sensor = match scene.camera(camera_id) {
        Some(sensor) => sensor,
        None => {
            log::error!("Scene has no camera {}", camera_id);
            std::process::exit(1);
        }
    };
    let (width, height) = sensor.film_size();
    if x >= width || y >= height {
        log::error!("Pixel out of bounds: ({}, {}) for size {}x{}", x, y, width, height);
        std::process::exit(2);
    }

    let spp = spp.or(settings.samples_per_pixel).unwrap_or(64);
    let integrator = PathIntegrator::new(settings.rr_probability.unwrap_or(DEFAULT_RR_PROBABILITY), spp)
        .with_light_pdf(settings.light_pdf.unwrap_or_default())
        .with_max_depth(settings.max_depth);

    let estimate = SimpleRenderer::estimate_pixel(&integrator, &scene, sensor, x, y, spp, seed);
    println!("pixel ({}, {}) spp={} -> R {:.6}, G {:.6}, B {:.6}",
             x, y, spp, estimate.mean.r(), estimate.mean.g(), estimate.mean.b());
    println!("std error -> R {:.6}, G {:.6}, B {:.6}",
             estimate.std_error.r(), estimate.std_error.g(), estimate.std_error.b());
    println!("dropped non-finite samples: {}", estimate.dropped);
}
