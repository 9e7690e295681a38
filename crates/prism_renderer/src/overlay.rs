//! Debug ray visualizer drawn over a finished frame.

use std::collections::HashMap;

use glam::IVec2;
use prism_core::Scene;
use prism_math::Vec2;
use rand::RngCore;

use crate::frame::Bgra8;
use crate::renderer::jittered_directions;

/// Rays cast from the probe point.
pub const TRACE_RAYS: u32 = 64;

/// Length of the drawn normal ticks, in normalized scene units.
pub const NORMAL_SCALE: f32 = 0.02;

pub const MOUSE_X: &str = "mouse_x";
pub const MOUSE_Y: &str = "mouse_y";
pub const TRACE_MODE: &str = "trace_mode";

/// Read-only view of the UI's named scalar values.
pub trait UiState {
    fn scalar(&self, name: &str) -> Option<f64>;
}

impl UiState for HashMap<String, f64> {
    fn scalar(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

/// A UI with nothing set.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoUi;

impl UiState for NoUi {
    fn scalar(&self, _name: &str) -> Option<f64> {
        None
    }
}

/// Which boundary the debug rays are drawn to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraceMode {
    #[default]
    Off,
    Entry,
    Exit,
}

impl TraceMode {
    /// `1` entry, `2` exit, anything else off.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => TraceMode::Entry,
            2 => TraceMode::Exit,
            _ => TraceMode::Off,
        }
    }
}

/// Probe settings read from the UI for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DebugProbe {
    /// Mouse position in pixels
    pub mouse: IVec2,
    pub mode: TraceMode,
}

impl DebugProbe {
    pub fn new(mouse: IVec2, mode: TraceMode) -> Self {
        Self { mouse, mode }
    }

    pub fn from_ui(ui: &dyn UiState) -> Self {
        let read = |name: &str| ui.scalar(name).unwrap_or(0.0);
        Self {
            mouse: IVec2::new(read(MOUSE_X) as i32, read(MOUSE_Y) as i32),
            mode: TraceMode::from_code(read(TRACE_MODE) as i64),
        }
    }

    pub fn is_active(&self) -> bool {
        self.mode != TraceMode::Off
    }
}

/// Counters from one overlay pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverlayStats {
    pub rays_cast: u32,
    pub rays_drawn: u32,
}

/// Mutable pixel surface over a whole frame.
pub struct Canvas<'a> {
    pixels: &'a mut [Bgra8],
    width: u32,
    height: u32,
}

impl<'a> Canvas<'a> {
    pub fn new(pixels: &'a mut [Bgra8], width: u32, height: u32) -> Self {
        debug_assert_eq!(pixels.len(), width as usize * height as usize);
        Self {
            pixels,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn contains(&self, p: IVec2) -> bool {
        p.x >= 0 && p.y >= 0 && (p.x as u32) < self.width && (p.y as u32) < self.height
    }

    /// Clamp a point to `[0, width - 1] x [0, height - 1]`.
    pub fn clamp(&self, p: IVec2) -> IVec2 {
        let max = IVec2::new(self.width as i32 - 1, self.height as i32 - 1);
        p.min(max).max(IVec2::ZERO)
    }

    fn index(&self, p: IVec2) -> Option<usize> {
        self.contains(p)
            .then(|| p.y as usize * self.width as usize + p.x as usize)
    }

    pub fn pixel(&self, p: IVec2) -> Option<Bgra8> {
        self.index(p).map(|i| self.pixels[i])
    }

    /// Returns false when `p` is off the canvas.
    pub fn set_pixel(&mut self, p: IVec2, color: Bgra8) -> bool {
        match self.index(p) {
            Some(i) => {
                self.pixels[i] = color;
                true
            }
            None => false,
        }
    }

    /// Draw a line with both endpoints clamped onto the canvas.
    pub fn draw_line(&mut self, from: IVec2, to: IVec2, color: Bgra8) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        for p in LinePixels::new(self.clamp(from), self.clamp(to)) {
            self.set_pixel(p, color);
        }
    }
}

/// Bresenham walk over the pixels of a line, both endpoints included.
#[derive(Debug, Clone)]
pub struct LinePixels {
    current: IVec2,
    end: IVec2,
    delta: IVec2,
    step: IVec2,
    err: i32,
    done: bool,
}

impl LinePixels {
    pub fn new(start: IVec2, end: IVec2) -> Self {
        let delta = IVec2::new((end.x - start.x).abs(), -(end.y - start.y).abs());
        let step = IVec2::new(
            if start.x < end.x { 1 } else { -1 },
            if start.y < end.y { 1 } else { -1 },
        );
        Self {
            current: start,
            end,
            delta,
            step,
            err: delta.x + delta.y,
            done: false,
        }
    }
}

impl Iterator for LinePixels {
    type Item = IVec2;

    fn next(&mut self) -> Option<IVec2> {
        if self.done {
            return None;
        }

        let p = self.current;
        if p == self.end {
            self.done = true;
            return Some(p);
        }

        let e2 = 2 * self.err;
        if e2 >= self.delta.y {
            self.err += self.delta.y;
            self.current.x += self.step.x;
        }
        if e2 <= self.delta.x {
            self.err += self.delta.x;
            self.current.y += self.step.y;
        }
        Some(p)
    }
}

/// Cast [`TRACE_RAYS`] jittered rays from the probe's mouse point and draw,
/// for every hit, the path to the selected boundary plus a short tick along
/// its normal.
pub fn draw_debug_rays(
    canvas: &mut Canvas<'_>,
    scene: &Scene,
    probe: &DebugProbe,
    rng: &mut dyn RngCore,
) -> OverlayStats {
    let mut stats = OverlayStats::default();
    if !probe.is_active() {
        return stats;
    }
    if !canvas.contains(probe.mouse) {
        log::warn!(
            "Trace point {:?} lies outside the {}x{} frame",
            probe.mouse,
            canvas.width(),
            canvas.height()
        );
        return stats;
    }

    let m = canvas.width().min(canvas.height()) as f32;
    let to_pixel = |p: Vec2| (p * m).as_ivec2();
    let origin = probe.mouse.as_vec2() / m;

    for direction in jittered_directions(TRACE_RAYS, rng) {
        stats.rays_cast += 1;

        let hit = scene.sample(origin, direction);
        if !hit.is_hit() {
            continue;
        }
        let point = match probe.mode {
            TraceMode::Entry => hit.entry,
            TraceMode::Exit => hit.exit,
            TraceMode::Off => continue,
        };

        let target = to_pixel(point.position);
        let tick = to_pixel(point.position + point.normal * NORMAL_SCALE);
        canvas.draw_line(probe.mouse, target, Bgra8::BLACK);
        canvas.draw_line(target, tick, Bgra8::BLACK);
        stats.rays_drawn += 1;
    }

    log::debug!(
        "Overlay: {} of {} trace rays hit",
        stats.rays_drawn,
        stats.rays_cast
    );
    stats
}
