// Copyright 2020 TwoCookingMice

use penumbra::core::light_sampler::LightPdfMode;
use penumbra::core::scene_loader::load_scene;
use penumbra::integrators::path::{ PathIntegrator, DEFAULT_RR_PROBABILITY };
use penumbra::io::image_utils::{ save_bitmap, DEFAULT_GAMMA };
use penumbra::math::constants::Float;
use penumbra::renderers::simple::{ SimpleRenderer, Renderer };

use clap::Parser;
use std::path::PathBuf;

/// Path traced rendering of an XML scene.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Options {
    /// Scene description.
    scene: PathBuf,

    /// Output image; `.exr` is written linear, `.png`/`.jpg` are tone mapped.
    output: PathBuf,

    /// Samples per pixel, overrides the scene's sampler.
    #[arg(long, value_name = "NUM")]
    spp: Option<u32>,

    /// Russian roulette continuation probability.
    #[arg(long, value_name = "P")]
    rr: Option<Float>,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Index of the camera to render through.
    #[arg(long, default_value_t = 0)]
    camera: usize,

    /// Worker threads, all cores when omitted.
    #[arg(long, short = 't', value_name = "NUM")]
    threads: Option<usize>,

    /// Density reported for light samples: per-emitter or total-area.
    #[arg(long, value_name = "MODE")]
    light_pdf: Option<LightPdfMode>,

    /// Stop paths after this many bounces (debugging).
    #[arg(long, value_name = "NUM")]
    max_depth: Option<u32>,

    /// Exponent applied to clamped radiance for 8-bit formats.
    #[arg(long, default_value_t = DEFAULT_GAMMA)]
    gamma: Float,
}

fn run(options: Options) -> Result<(), Box<dyn std::error::Error>> {
    let loaded = load_scene(&options.scene)?;
    let settings = loaded.settings;
    let mut scene = loaded.scene;
    if scene.lights().is_empty() {
        log::warn!("Scene has no emitters, the image will be black");
    }

    let spp = options.spp.or(settings.samples_per_pixel).unwrap_or(1);
    let rr = options.rr.or(settings.rr_probability).unwrap_or(DEFAULT_RR_PROBABILITY);
    let integrator = PathIntegrator::new(rr, spp)
        .with_light_pdf(options.light_pdf.or(settings.light_pdf).unwrap_or_default())
        .with_max_depth(options.max_depth.or(settings.max_depth));

    let renderer = SimpleRenderer::new(Box::new(integrator), options.camera, options.seed)
        .with_threads(options.threads);
    let image = renderer.render(&mut scene)?;
    log::info!("Mean radiance: {:?}", image.mean());

    save_bitmap(&image, &options.output, options.gamma)?;
    log::info!("Image written to: {}", options.output.display());
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Options::parse()) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
