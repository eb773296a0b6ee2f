use crate::{
    foundation::{
        core::{BezPath, Canvas, Rect},
        error::FramecardResult,
    },
    geometry::{
        fit::{AspectFit, aspect_fit},
        path::{effective_corner_radius, rounded_rect_path},
    },
    style::StyleParameters,
};

/// Placement of the frame card and the image inside it for one render pass.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameLayout {
    /// Source image fitted into the canvas minus the margin on every side.
    pub outer: AspectFit,
    /// Source image fitted into the frame minus the padding on every side.
    pub inner: AspectFit,
    /// Card rectangle, centred in the canvas.
    pub frame: Rect,
    /// Image rectangle, centred in the frame.
    pub image: Rect,
    pub corner_radius: f64,
    /// Rounded outline of `frame`; filled as the card and reused as the image clip.
    pub clip: BezPath,
}

impl FrameLayout {
    /// Two independent fits of the same source dimensions: the outer one sizes the card,
    /// the inner one sizes the image, so padding never changes the card's silhouette.
    #[tracing::instrument(level = "debug", skip(params))]
    pub fn compute(
        canvas: Canvas,
        params: &StyleParameters,
        source_w: u32,
        source_h: u32,
    ) -> FramecardResult<Self> {
        let (cw, ch) = (canvas.width_f64(), canvas.height_f64());
        let (sw, sh) = (f64::from(source_w), f64::from(source_h));

        let outer = aspect_fit(cw - 2.0 * params.margin, ch - 2.0 * params.margin, sw, sh)?;
        let frame_x = (cw - outer.render_w) / 2.0;
        let frame_y = (ch - outer.render_h) / 2.0;
        let frame = Rect::new(
            frame_x,
            frame_y,
            frame_x + outer.render_w,
            frame_y + outer.render_h,
        );

        let inner = aspect_fit(
            outer.render_w - 2.0 * params.padding,
            outer.render_h - 2.0 * params.padding,
            sw,
            sh,
        )?;
        let image_x = frame_x + (outer.render_w - inner.render_w) / 2.0;
        let image_y = frame_y + (outer.render_h - inner.render_h) / 2.0;
        let image = Rect::new(
            image_x,
            image_y,
            image_x + inner.render_w,
            image_y + inner.render_h,
        );

        let corner_radius =
            effective_corner_radius(outer.render_w, outer.render_h, params.corner_radius);
        let clip = rounded_rect_path(
            frame_x,
            frame_y,
            outer.render_w,
            outer.render_h,
            params.corner_radius,
        );

        Ok(Self {
            outer,
            inner,
            frame,
            image,
            corner_radius,
            clip,
        })
    }

    pub fn frame_is_empty(&self) -> bool {
        self.frame.width() <= 0.0 || self.frame.height() <= 0.0
    }

    pub fn image_is_empty(&self) -> bool {
        self.image.width() <= 0.0 || self.image.height() <= 0.0
    }
}
