//! Rendering seam
//!
//! The simulation never draws. Each frame the runner captures a
//! `FrameSnapshot` and hands it to a `Renderer`.

pub mod snapshot;

use std::io::Write;

use thiserror::Error;

pub use snapshot::{
    EvolutionPanel, FrameSnapshot, HudView, MonsterView, ParticleView, PlacementPreview,
    ProjectileView, UnitView, health_color,
};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write frame: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode frame: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Consumer of frame snapshots
pub trait Renderer {
    fn draw(&mut self, frame: &FrameSnapshot) -> Result<(), RenderError>;

    fn finish(&mut self) -> Result<(), RenderError> {
        Ok(())
    }
}

/// Discards every frame (benchmarks, tests)
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub frames: u64,
}

impl Renderer for NullRenderer {
    fn draw(&mut self, _frame: &FrameSnapshot) -> Result<(), RenderError> {
        self.frames += 1;
        Ok(())
    }
}

/// Writes one JSON document per drawn frame
pub struct JsonLinesRenderer<W: Write> {
    out: W,
    /// Draw every Nth frame; frames carrying events are always drawn
    stride: u64,
    seen: u64,
}

impl<W: Write> JsonLinesRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            stride: 1,
            seen: 0,
        }
    }

    pub fn with_stride(mut self, stride: u64) -> Self {
        self.stride = stride.max(1);
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for JsonLinesRenderer<W> {
    fn draw(&mut self, frame: &FrameSnapshot) -> Result<(), RenderError> {
        let due = self.seen % self.stride == 0;
        self.seen += 1;
        if !due && frame.events.is_empty() {
            return Ok(());
        }

        serde_json::to_writer(&mut self.out, frame)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), RenderError> {
        self.out.flush()?;
        Ok(())
    }
}
