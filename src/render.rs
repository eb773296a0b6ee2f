use crate::{compile::plan::RenderPlan, foundation::error::FramecardResult};

pub(crate) mod blur;
pub(crate) mod composite;
pub(crate) mod compositor;
pub(crate) mod cpu;
pub(crate) mod passes;

pub use compositor::{Compositor, PassReport};
pub use cpu::CpuBackend;
pub use passes::{DrawBackend, PassAssets, execute_plan};

/// A finished surface read back from a backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA8, tightly packed.
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// RGBA8 of the pixel at `(x, y)`, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Backend that can replay a whole plan in one call.
pub trait RenderBackend: DrawBackend {
    fn render_plan(
        &mut self,
        plan: &RenderPlan,
        assets: PassAssets<'_>,
    ) -> FramecardResult<FrameRGBA> {
        execute_plan(self, plan, assets)
    }
}

impl RenderBackend for CpuBackend {}
