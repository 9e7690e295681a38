//! Scanline-interleaved parallel frame rendering for Prism.
//!
//! The frame is split into [`PARTS`] slices: slice `p` owns every scanline
//! `y` with `y % PARTS == p`. Slices render in parallel on rayon, each with
//! its own random generator. A mutex-guarded completion latch picks the one
//! worker that finishes the frame; that worker owns the debug overlay pass
//! and raises the painted flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use bytemuck::{Pod, Zeroable};
use parking_lot::Mutex;
use prism_core::{Color, ColorExt, Scene};
use prism_math::Vec2;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use thiserror::Error;

use crate::overlay::{draw_debug_rays, Canvas, DebugProbe, OverlayStats, UiState};
use crate::renderer::{sample_pixel, RenderConfig};

/// Number of concurrent scanline slices per frame.
pub const PARTS: usize = 4;

/// One pixel in the frame buffer's byte order.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct Bgra8 {
    pub b: u8,
    pub g: u8,
    pub r: u8,
    pub a: u8,
}

impl Bgra8 {
    pub const BLACK: Bgra8 = Bgra8 {
        b: 0,
        g: 0,
        r: 0,
        a: 255,
    };

    /// Quantize a radiance value: clamp to [0, 1], scale to [0, 255], opaque.
    pub fn from_color(color: Color) -> Self {
        let c = color.saturate() * 255.0;
        Self {
            b: c.z as u8,
            g: c.y as u8,
            r: c.x as u8,
            a: 255,
        }
    }

    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Errors when binding a caller's buffer to a render context.
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("frame buffer holds {actual} bytes but {width}x{height} BGRA needs {expected}")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// Counts finished slices; exactly one arrival observes the target count.
pub struct CompletionLatch {
    count: Mutex<usize>,
    parts: usize,
}

impl CompletionLatch {
    pub fn new(parts: usize) -> Self {
        Self {
            count: Mutex::new(0),
            parts,
        }
    }

    /// Record one finished slice. Returns true only for the arrival that
    /// brings the count to exactly `parts`.
    pub fn arrive(&self) -> bool {
        let mut count = self.count.lock();
        *count += 1;
        *count == self.parts
    }

    pub fn count(&self) -> usize {
        *self.count.lock()
    }

    pub fn reset(&self) {
        *self.count.lock() = 0;
    }
}

/// The scanlines owned by one worker.
pub struct Scanlines<'a> {
    part: usize,
    width: u32,
    height: u32,
    rows: Vec<(u32, &'a mut [Bgra8])>,
}

impl<'a> Scanlines<'a> {
    /// Row indices in this slice, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = u32> + '_ {
        self.rows.iter().map(|(y, _)| *y)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Hand out disjoint scanline slices of a pixel buffer.
fn partition_rows(pixels: &mut [Bgra8], width: u32, height: u32, parts: usize) -> Vec<Scanlines<'_>> {
    let mut slices: Vec<Scanlines<'_>> = (0..parts)
        .map(|part| Scanlines {
            part,
            width,
            height,
            rows: Vec::new(),
        })
        .collect();

    if width == 0 || parts == 0 {
        return slices;
    }

    for (y, row) in pixels.chunks_mut(width as usize).enumerate() {
        slices[y % parts].rows.push((y as u32, row));
    }
    slices
}

/// Per-frame render state: the caller's pixels, the completion latch and the
/// painted flag.
pub struct RenderContext<'a> {
    width: u32,
    height: u32,
    pixels: &'a mut [Bgra8],
    completion: CompletionLatch,
    painted: AtomicBool,
}

impl<'a> RenderContext<'a> {
    /// Bind a caller-owned BGRA8 buffer of exactly `width * height * 4` bytes.
    pub fn new(buffer: &'a mut [u8], width: u32, height: u32) -> Result<Self, FrameError> {
        let expected = width as usize * height as usize * 4;
        if buffer.len() != expected {
            return Err(FrameError::SizeMismatch {
                width,
                height,
                expected,
                actual: buffer.len(),
            });
        }

        Ok(Self {
            width,
            height,
            pixels: bytemuck::cast_slice_mut(buffer),
            completion: CompletionLatch::new(PARTS),
            painted: AtomicBool::new(false),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Bgra8] {
        self.pixels
    }

    /// The pixel at (x, y), or `None` outside the frame.
    pub fn get(&self, x: u32, y: u32) -> Option<Bgra8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// True once the frame has been completed and is ready to present.
    pub fn is_painted(&self) -> bool {
        self.painted.load(Ordering::Acquire)
    }

    /// Number of slices that have finished this frame.
    pub fn completed(&self) -> usize {
        self.completion.count()
    }

    /// Prepare for another frame into the same buffer.
    pub fn reset(&mut self) {
        self.completion.reset();
        self.painted.store(false, Ordering::Release);
    }

    /// The scanlines of slice `part`.
    ///
    /// Panics if `part >= PARTS`.
    pub fn scanlines(&mut self, part: usize) -> Scanlines<'_> {
        assert!(part < PARTS, "slice {part} out of range");
        partition_rows(self.pixels, self.width, self.height, PARTS).swap_remove(part)
    }

    /// Drawing surface over the whole frame.
    pub fn canvas(&mut self) -> Canvas<'_> {
        Canvas::new(self.pixels, self.width, self.height)
    }
}

/// What happened while rendering a frame.
#[derive(Debug, Clone)]
pub struct FrameReport {
    /// Slice whose arrival completed the frame
    pub finished_by: Option<usize>,
    /// Debug overlay statistics
    pub overlay: OverlayStats,
    pub elapsed: Duration,
}

/// Render every scanline of one slice.
///
/// Samples are taken at `(x / m, y / m)` with `m = min(width, height)`, so the
/// shorter side of the frame always spans [0, 1].
pub fn render_slice(slice: Scanlines<'_>, scene: &Scene, config: &RenderConfig, rng: &mut dyn RngCore) {
    let m = slice.width.min(slice.height) as f32;

    for (y, row) in slice.rows {
        for (x, pixel) in row.iter_mut().enumerate() {
            let point = Vec2::new(x as f32 / m, y as f32 / m);
            *pixel = Bgra8::from_color(sample_pixel(scene, point, config, rng));
        }
    }
}

/// Seed for one worker's generator.
fn worker_seed(base: u64, part: usize) -> u64 {
    base ^ (part as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Render a full frame.
///
/// The slices run in parallel. The worker whose arrival completes the latch
/// is reported back, and once every slice has released its rows that worker's
/// overlay pass runs over the whole frame before the painted flag is raised.
pub fn render_frame(
    ctx: &mut RenderContext<'_>,
    scene: &Scene,
    config: &RenderConfig,
    ui: &dyn UiState,
) -> FrameReport {
    let start = Instant::now();
    ctx.reset();

    let base_seed = config.seed.unwrap_or_else(rand::random);
    let probe = DebugProbe::from_ui(ui);

    log::info!(
        "Rendering {}x{} @ {} rays/pixel, depth {}",
        ctx.width,
        ctx.height,
        config.samples,
        config.max_depth
    );

    let completion = &ctx.completion;
    let slices = partition_rows(ctx.pixels, ctx.width, ctx.height, PARTS);

    let finished_by = slices
        .into_par_iter()
        .map(|slice| {
            let part = slice.part;
            let rows = slice.len();
            let mut rng = StdRng::seed_from_u64(worker_seed(base_seed, part));

            render_slice(slice, scene, config, &mut rng);
            log::debug!("Slice {} finished ({} scanlines)", part, rows);

            completion.arrive().then_some(part)
        })
        .reduce(|| None, |a, b| a.or(b));

    let mut overlay = OverlayStats::default();
    match finished_by {
        Some(part) => {
            if probe.is_active() {
                let mut rng = StdRng::seed_from_u64(worker_seed(base_seed, part + PARTS));
                overlay = draw_debug_rays(&mut ctx.canvas(), scene, &probe, &mut rng);
            }
            ctx.painted.store(true, Ordering::Release);
        }
        None => log::warn!("No slice completed the frame"),
    }

    let elapsed = start.elapsed();
    log::info!("Rendered in {:?}", elapsed);

    FrameReport {
        finished_by,
        overlay,
        elapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::NoUi;
    use prism_core::{circle, Body};
    use std::sync::Arc;

    fn config() -> RenderConfig {
        RenderConfig::default().with_samples(4).with_seed(42)
    }

    #[test]
    fn test_context_rejects_wrong_size() {
        let mut buffer = vec![0u8; 10];
        let err = RenderContext::new(&mut buffer, 2, 2).err().unwrap();
        assert!(matches!(err, FrameError::SizeMismatch { expected: 16, actual: 10, .. }));
    }

    #[test]
    fn test_bgra_from_color() {
        let px = Bgra8::from_color(Color::new(2.0, 0.5, -1.0));
        assert_eq!(px, Bgra8 { b: 0, g: 127, r: 255, a: 255 });
        assert_eq!(px.to_rgba(), [255, 127, 0, 255]);
    }

    #[test]
    fn test_bgra_byte_layout() {
        let mut buffer = vec![0u8; 4];
        let mut ctx = RenderContext::new(&mut buffer, 1, 1).unwrap();
        ctx.canvas().set_pixel(glam::IVec2::ZERO, Bgra8 { b: 1, g: 2, r: 3, a: 4 });
        drop(ctx);
        assert_eq!(buffer, [1, 2, 3, 4]);
    }

    #[test]
    fn test_get_outside_frame() {
        let mut buffer = vec![0u8; 3 * 2 * 4];
        let mut ctx = RenderContext::new(&mut buffer, 3, 2).unwrap();
        ctx.canvas().set_pixel(glam::IVec2::new(2, 1), Bgra8::BLACK);

        assert_eq!(ctx.get(2, 1), Some(Bgra8::BLACK));
        assert_eq!(ctx.get(0, 0), Some(Bgra8::default()));
        assert_eq!(ctx.get(3, 0), None);
        assert_eq!(ctx.get(0, 2), None);
        assert_eq!(ctx.get(u32::MAX, u32::MAX), None);
    }

    #[test]
    fn test_partition_rows() {
        let (width, height) = (3, 10);
        let mut pixels = vec![Bgra8::default(); (width * height) as usize];
        let slices = partition_rows(&mut pixels, width, height, PARTS);

        let rows: Vec<Vec<u32>> = slices.iter().map(|s| s.rows().collect()).collect();
        assert_eq!(rows[0], vec![0, 4, 8]);
        assert_eq!(rows[1], vec![1, 5, 9]);
        assert_eq!(rows[2], vec![2, 6]);
        assert_eq!(rows[3], vec![3, 7]);
    }

    #[test]
    fn test_slices_write_every_scanline_once() {
        let (width, height) = (5, 9);
        let mut buffer = vec![0u8; (width * height * 4) as usize];
        let mut ctx = RenderContext::new(&mut buffer, width, height).unwrap();
        let scene = Scene::empty();
        let config = config();
        let mut rng = StdRng::seed_from_u64(1);

        for part in 0..PARTS {
            render_slice(ctx.scanlines(part), &scene, &config, &mut rng);

            // Written pixels are opaque; untouched ones still have alpha 0
            for y in 0..height {
                let written = y as usize % PARTS <= part;
                for x in 0..width {
                    assert_eq!(ctx.get(x, y).unwrap().a == 255, written, "pixel ({x}, {y}) after part {part}");
                }
            }
        }
    }

    #[test]
    fn test_latch_single_finisher() {
        for _ in 0..16 {
            let latch = Arc::new(CompletionLatch::new(PARTS));
            let finishers: usize = std::thread::scope(|s| {
                let handles: Vec<_> = (0..PARTS).map(|_| s.spawn(|| latch.arrive())).collect();
                handles
                    .into_iter()
                    .map(|h| h.join().unwrap() as usize)
                    .sum()
            });
            assert_eq!(finishers, 1);
            assert_eq!(latch.count(), PARTS);
        }
    }

    #[test]
    fn test_latch_late_arrivals_do_not_finish() {
        let latch = CompletionLatch::new(PARTS);
        let results: Vec<bool> = (0..PARTS + 2).map(|_| latch.arrive()).collect();
        assert_eq!(results, vec![false, false, false, true, false, false]);

        latch.reset();
        assert_eq!(latch.count(), 0);
    }

    #[test]
    fn test_render_frame_paints_once() {
        let (width, height) = (8, 6);
        let mut buffer = vec![0u8; (width * height * 4) as usize];
        let mut ctx = RenderContext::new(&mut buffer, width, height).unwrap();
        let scene = Scene::lens_demo();

        assert!(!ctx.is_painted());
        let report = render_frame(&mut ctx, &scene, &config(), &NoUi);

        assert!(ctx.is_painted());
        assert_eq!(ctx.completed(), PARTS);
        assert!(report.finished_by.is_some_and(|part| part < PARTS));
        assert_eq!(report.overlay, OverlayStats::default());
        assert!(ctx.pixels().iter().all(|px| px.a == 255));
    }

    #[test]
    fn test_render_frame_empty_scene_is_black() {
        let (width, height) = (7, 5);
        let mut buffer = vec![0u8; (width * height * 4) as usize];
        let mut ctx = RenderContext::new(&mut buffer, width, height).unwrap();

        render_frame(&mut ctx, &Scene::empty(), &config(), &NoUi);
        assert!(ctx.pixels().iter().all(|px| *px == Bgra8::BLACK));
    }

    #[test]
    fn test_render_frame_uniform_emitter() {
        // Every sample point lies inside one large clear emitter
        let body = Body::emitter(Color::new(1.0, 0.5, 0.25));
        let scene = Scene::new(circle(0.5, 0.5, 10.0, body));
        let (width, height) = (6, 4);
        let mut buffer = vec![0u8; (width * height * 4) as usize];
        let mut ctx = RenderContext::new(&mut buffer, width, height).unwrap();

        render_frame(&mut ctx, &scene, &config(), &NoUi);
        let expected = Bgra8 { b: 63, g: 127, r: 255, a: 255 };
        assert!(ctx.pixels().iter().all(|px| *px == expected));
    }

    #[test]
    fn test_seeded_frames_repeat() {
        let (width, height) = (6, 6);
        let scene = Scene::lens_demo();
        let config = RenderConfig::default().with_samples(8).with_seed(9);

        let mut first = vec![0u8; (width * height * 4) as usize];
        let mut ctx = RenderContext::new(&mut first, width, height).unwrap();
        render_frame(&mut ctx, &scene, &config, &NoUi);
        drop(ctx);

        let mut second = vec![0u8; (width * height * 4) as usize];
        let mut ctx = RenderContext::new(&mut second, width, height).unwrap();
        render_frame(&mut ctx, &scene, &config, &NoUi);
        drop(ctx);

        assert_eq!(first, second);
    }

    #[test]
    fn test_context_reuse_paints_again() {
        let (width, height) = (4, 4);
        let mut buffer = vec![0u8; (width * height * 4) as usize];
        let mut ctx = RenderContext::new(&mut buffer, width, height).unwrap();
        let scene = Scene::empty();

        for _ in 0..3 {
            let report = render_frame(&mut ctx, &scene, &config(), &NoUi);
            assert!(report.finished_by.is_some());
            assert!(ctx.is_painted());
            assert_eq!(ctx.completed(), PARTS);
        }
    }

    #[test]
    fn test_zero_sized_frame() {
        let mut buffer = Vec::new();
        let mut ctx = RenderContext::new(&mut buffer, 0, 0).unwrap();

        let report = render_frame(&mut ctx, &Scene::lens_demo(), &config(), &NoUi);
        assert!(report.finished_by.is_some());
        assert!(ctx.is_painted());
    }
}
