//! Renderer collaborator boundary.
//!
//! The core requests a frame after every mutation that must be
//! visually reflected; the renderer itself lives outside the core.

use shared::ViewMode;

/// What a frame would draw, handed to the renderer on every request
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameStats {
    pub view: ViewMode,
    pub parts_drawn: usize,
    pub decals_drawn: usize,
}

pub trait Renderer {
    fn render_frame(&mut self, frame: &FrameStats);
}

/// Discards frames; used where no visual output exists
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render_frame(&mut self, _frame: &FrameStats) {}
}

/// Logs each frame request; the headless driver's renderer
pub struct LogRenderer;

impl Renderer for LogRenderer {
    fn render_frame(&mut self, frame: &FrameStats) {
        tracing::debug!(
            view = ?frame.view,
            parts = frame.parts_drawn,
            decals = frame.decals_drawn,
            "frame"
        );
    }
}
