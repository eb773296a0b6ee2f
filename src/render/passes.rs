use crate::{
    assets::Raster,
    compile::plan::{DrawOp, RenderPlan},
    foundation::{
        core::{BezPath, Canvas, Rect, Rgba8Premul},
        error::{FramecardError, FramecardResult},
    },
    render::FrameRGBA,
};

/// Decoded rasters a plan draws from.
#[derive(Clone, Copy, Debug)]
pub struct PassAssets<'a> {
    pub background: &'a Raster,
    pub source: Option<&'a Raster>,
}

/// Raster surface a [`RenderPlan`] is replayed onto.
pub trait DrawBackend {
    /// Sizes the working surface to `canvas` and clears it to transparent.
    fn begin_pass(&mut self, canvas: Canvas) -> FramecardResult<()>;

    fn draw_background(&mut self, dest: Rect, background: &Raster) -> FramecardResult<()>;

    fn draw_shadow(
        &mut self,
        path: &BezPath,
        blur_radius: f64,
        color: Rgba8Premul,
    ) -> FramecardResult<()>;

    fn fill_path(&mut self, path: &BezPath, color: Rgba8Premul) -> FramecardResult<()>;

    fn push_clip(&mut self, path: &BezPath) -> FramecardResult<()>;

    fn draw_image(&mut self, dest: Rect, image: &Raster) -> FramecardResult<()>;

    fn pop_clip(&mut self) -> FramecardResult<()>;

    /// Reads back the finished surface.
    fn finish_pass(&mut self) -> FramecardResult<FrameRGBA>;
}

pub fn execute_plan<B: DrawBackend + ?Sized>(
    backend: &mut B,
    plan: &RenderPlan,
    assets: PassAssets<'_>,
) -> FramecardResult<FrameRGBA> {
    backend.begin_pass(plan.canvas)?;

    let mut clip_depth = 0usize;
    for op in &plan.ops {
        match op {
            DrawOp::Background { dest } => backend.draw_background(*dest, assets.background)?,
            DrawOp::Shadow {
                path,
                blur_radius,
                color,
            } => backend.draw_shadow(path, *blur_radius, *color)?,
            DrawOp::FillPath { path, color } => backend.fill_path(path, *color)?,
            DrawOp::PushClip { path } => {
                backend.push_clip(path)?;
                clip_depth += 1;
            }
            DrawOp::Image { dest } => {
                let image = assets.source.ok_or(FramecardError::NoSourceImage)?;
                backend.draw_image(*dest, image)?;
            }
            DrawOp::PopClip => {
                if clip_depth == 0 {
                    return Err(FramecardError::render("pop_clip without push_clip"));
                }
                backend.pop_clip()?;
                clip_depth -= 1;
            }
        }
    }

    if clip_depth != 0 {
        return Err(FramecardError::render(format!(
            "{clip_depth} clip(s) still active at end of pass"
        )));
    }

    backend.finish_pass()
}
