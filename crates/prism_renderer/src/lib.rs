//! Prism Renderer - stochastic 2D light tracing.
//!
//! Gathers the radiance arriving at every pixel from all directions by
//! casting jittered rays into a CSG scene. Boundaries emit, reflect and
//! refract with Fresnel weighting, and light is absorbed along each segment.
//! Frames render as four interleaved scanline slices in parallel.

mod frame;
mod optics;
mod overlay;
mod renderer;

pub use frame::{
    render_frame, render_slice, Bgra8, CompletionLatch, FrameError, FrameReport, RenderContext,
    Scanlines, PARTS,
};
pub use optics::{attenuate, fresnel, reflect, refract};
pub use overlay::{
    draw_debug_rays, Canvas, DebugProbe, LinePixels, NoUi, OverlayStats, TraceMode, UiState,
    MOUSE_X, MOUSE_Y, NORMAL_SCALE, TRACE_MODE, TRACE_RAYS,
};
pub use renderer::{
    jittered_directions, sample_pixel, trace, ReflectanceGate, RenderConfig, BIAS, MAX_DEPTH,
    SAMPLES,
};

/// Re-export the scene types the renderer consumes
pub use prism_core::{Color, Scene};
