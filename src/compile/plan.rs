use crate::{
    foundation::{
        core::{BezPath, Canvas, Rect, Rgba8Premul},
        error::{FramecardError, FramecardResult},
    },
    geometry::layout::FrameLayout,
    style::StyleParameters,
};

/// Fill colour of the frame card.
pub const FRAME_FILL: Rgba8Premul = Rgba8Premul::WHITE;

#[derive(Clone, Debug)]
/// Backend-agnostic render plan for a single pass.
///
/// Ops are executed strictly in order against one surface of size `canvas`.
pub struct RenderPlan {
    pub canvas: Canvas,
    pub ops: Vec<DrawOp>,
    /// Present when a source image is drawn and its frame is non-empty.
    pub layout: Option<FrameLayout>,
}

#[derive(Clone, Debug, PartialEq)]
/// A single drawing operation in a [`RenderPlan`].
pub enum DrawOp {
    /// Draw the selected background raster scaled into `dest`.
    Background { dest: Rect },
    /// Blurred copy of `path` painted in `color`, without offset.
    Shadow {
        path: BezPath,
        blur_radius: f64,
        color: Rgba8Premul,
    },
    FillPath { path: BezPath, color: Rgba8Premul },
    /// Restrict subsequent image draws to the inside of `path`.
    PushClip { path: BezPath },
    /// Draw the source raster scaled into `dest`.
    Image { dest: Rect },
    PopClip,
}

impl DrawOp {
    pub fn name(&self) -> &'static str {
        match self {
            DrawOp::Background { .. } => "background",
            DrawOp::Shadow { .. } => "shadow",
            DrawOp::FillPath { .. } => "fill_path",
            DrawOp::PushClip { .. } => "push_clip",
            DrawOp::Image { .. } => "image",
            DrawOp::PopClip => "pop_clip",
        }
    }
}

/// Compiles one pass: background first, then (only with a source image) the framed image.
///
/// The background is drawn at `(0, 0)` with both sides equal to the canvas width; square
/// backgrounds therefore cover every preset, cropped at the bottom for wide ones.
#[tracing::instrument(level = "debug", skip(params))]
pub fn compile_pass(
    canvas: Canvas,
    params: &StyleParameters,
    source_dims: Option<(u32, u32)>,
    shadow_color: Rgba8Premul,
) -> FramecardResult<RenderPlan> {
    let side = canvas.width_f64();
    let mut ops = vec![DrawOp::Background {
        dest: Rect::new(0.0, 0.0, side, side),
    }];

    let mut layout = None;
    if source_dims.is_some() {
        let (image_ops, l) = compile_image_ops(canvas, params, source_dims, shadow_color)?;
        ops.extend(image_ops);
        layout = l;
    }

    Ok(RenderPlan {
        canvas,
        ops,
        layout,
    })
}

/// Ops drawing the framed source image: shadow, card fill, clip, image, unclip.
///
/// An empty frame (margin eats the whole canvas) compiles to no ops.
pub fn compile_image_ops(
    canvas: Canvas,
    params: &StyleParameters,
    source_dims: Option<(u32, u32)>,
    shadow_color: Rgba8Premul,
) -> FramecardResult<(Vec<DrawOp>, Option<FrameLayout>)> {
    let (sw, sh) = source_dims.ok_or(FramecardError::NoSourceImage)?;
    let layout = FrameLayout::compute(canvas, params, sw, sh)?;
    if layout.frame_is_empty() {
        tracing::debug!("frame collapsed to zero size; drawing background only");
        return Ok((Vec::new(), None));
    }

    let mut ops = Vec::with_capacity(5);
    if params.shadow_radius > 0.0 {
        ops.push(DrawOp::Shadow {
            path: layout.clip.clone(),
            blur_radius: params.shadow_radius,
            color: shadow_color,
        });
    }
    ops.push(DrawOp::FillPath {
        path: layout.clip.clone(),
        color: FRAME_FILL,
    });
    ops.push(DrawOp::PushClip {
        path: layout.clip.clone(),
    });
    if !layout.image_is_empty() {
        ops.push(DrawOp::Image { dest: layout.image });
    }
    ops.push(DrawOp::PopClip);

    Ok((ops, Some(layout)))
}

impl RenderPlan {
    /// Checks the pass ordering rules: exactly one background and it comes first, every
    /// clip is preceded by a fill of the same path, clips are balanced, and images are
    /// only drawn under a clip.
    pub fn validate_ordering(&self) -> FramecardResult<()> {
        let mut backgrounds = self
            .ops
            .iter()
            .enumerate()
            .filter(|(_, op)| matches!(op, DrawOp::Background { .. }));
        match (backgrounds.next(), backgrounds.next()) {
            (Some((0, _)), None) => {}
            _ => {
                return Err(FramecardError::render(
                    "plan must start with exactly one background op",
                ));
            }
        }

        let mut last_fill: Option<&BezPath> = None;
        let mut clip_depth = 0usize;
        for op in &self.ops {
            match op {
                DrawOp::FillPath { path, .. } => last_fill = Some(path),
                DrawOp::PushClip { path } => {
                    if last_fill != Some(path) {
                        return Err(FramecardError::render(
                            "clip must follow a fill of the same path",
                        ));
                    }
                    clip_depth += 1;
                }
                DrawOp::PopClip => {
                    clip_depth = clip_depth
                        .checked_sub(1)
                        .ok_or_else(|| FramecardError::render("pop_clip without push_clip"))?;
                }
                DrawOp::Image { .. } if clip_depth == 0 => {
                    return Err(FramecardError::render("image drawn outside a clip"));
                }
                _ => {}
            }
        }
        if clip_depth != 0 {
            return Err(FramecardError::render("clip left active at end of pass"));
        }
        Ok(())
    }

    pub fn op_names(&self) -> Vec<&'static str> {
        self.ops.iter().map(DrawOp::name).collect()
    }
}
