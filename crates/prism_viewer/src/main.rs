use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use prism_core::{load_scene, Scene};
use prism_renderer::{
    render_frame, Bgra8, ReflectanceGate, RenderConfig, RenderContext, MOUSE_X, MOUSE_Y,
    TRACE_MODE,
};

/// Render the built-in lens scene, or a JSON scene file, and save a PNG.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "prism_viewer", version)]
struct Options {
    /// Scene description (JSON); the lens demo is used when omitted
    scene: Option<PathBuf>,

    /// Frame width in pixels
    #[arg(long, default_value_t = 800, value_parser = clap::value_parser!(u32).range(1..))]
    width: u32,

    /// Frame height in pixels
    #[arg(long, default_value_t = 600, value_parser = clap::value_parser!(u32).range(1..))]
    height: u32,

    /// Rays per pixel
    #[arg(long)]
    samples: Option<u32>,

    /// Maximum reflection/refraction depth
    #[arg(long)]
    depth: Option<u32>,

    /// Seed for reproducible frames
    #[arg(long)]
    seed: Option<u64>,

    /// Reflect when any reflectance channel is positive
    #[arg(long)]
    any_channel: bool,

    /// Debug probe position in pixels
    #[arg(long, num_args = 2, value_names = ["X", "Y"], allow_negative_numbers = true)]
    mouse: Option<Vec<i32>>,

    /// Debug rays: 0 off, 1 entry points, 2 exit points
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(i64).range(0..=2))]
    trace_mode: i64,

    /// Output file
    #[arg(long, default_value = "prism.png")]
    out: PathBuf,
}

impl Options {
    fn render_config(&self) -> RenderConfig {
        let mut config = RenderConfig::default();
        if let Some(samples) = self.samples {
            config = config.with_samples(samples);
        }
        if let Some(depth) = self.depth {
            config = config.with_max_depth(depth);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if self.any_channel {
            config = config.with_reflectance_gate(ReflectanceGate::AnyChannel);
        }
        config
    }

    fn ui_state(&self) -> HashMap<String, f64> {
        let mut ui = HashMap::new();
        if let Some([x, y]) = self.mouse.as_deref() {
            ui.insert(MOUSE_X.to_string(), *x as f64);
            ui.insert(MOUSE_Y.to_string(), *y as f64);
        }
        ui.insert(TRACE_MODE.to_string(), self.trace_mode as f64);
        ui
    }
}

/// Reorder a BGRA frame into RGBA bytes.
fn to_rgba(pixels: &[Bgra8]) -> Vec<u8> {
    pixels.iter().flat_map(|px| px.to_rgba()).collect()
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let opts = Options::parse();
    log::info!("Starting Prism");

    let scene = match &opts.scene {
        Some(path) => load_scene(path)
            .with_context(|| format!("failed to load scene '{}'", path.display()))?,
        None => {
            log::info!("No scene file given, using the lens demo");
            Scene::lens_demo()
        }
    };

    let config = opts.render_config();
    let ui = opts.ui_state();

    let mut buffer = vec![0u8; opts.width as usize * opts.height as usize * 4];
    let mut ctx = RenderContext::new(&mut buffer, opts.width, opts.height)?;
    let report = render_frame(&mut ctx, &scene, &config, &ui);

    if report.overlay.rays_cast > 0 {
        log::info!(
            "Debug overlay: {}/{} rays drawn",
            report.overlay.rays_drawn,
            report.overlay.rays_cast
        );
    }
    if !ctx.is_painted() {
        bail!("frame did not complete");
    }

    let rgba = to_rgba(ctx.pixels());
    let image = image::RgbaImage::from_raw(opts.width, opts.height, rgba)
        .ok_or_else(|| anyhow!("frame buffer does not match {}x{}", opts.width, opts.height))?;
    image
        .save(&opts.out)
        .with_context(|| format!("failed to write '{}'", opts.out.display()))?;

    log::info!("Saved {} in {:?}", opts.out.display(), report.elapsed);
    Ok(())
}
