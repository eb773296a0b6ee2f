use crate::foundation::{
    core::Rect,
    error::{FramecardError, FramecardResult},
};

/// Uniform scale of some content into a container, centred.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AspectFit {
    pub scale: f64,
    pub render_w: f64,
    pub render_h: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl AspectFit {
    /// The fitted rectangle once the container's origin is known.
    pub fn rect_at(&self, origin_x: f64, origin_y: f64) -> Rect {
        let x0 = origin_x + self.offset_x;
        let y0 = origin_y + self.offset_y;
        Rect::new(x0, y0, x0 + self.render_w, y0 + self.render_h)
    }
}

/// Largest uniform scale of `content` that fits inside `container`, centred.
///
/// Container sides below zero are treated as zero, which yields an empty fit. Content sides
/// must be strictly positive and finite.
pub fn aspect_fit(
    container_w: f64,
    container_h: f64,
    content_w: f64,
    content_h: f64,
) -> FramecardResult<AspectFit> {
    let positive = |v: f64| v.is_finite() && v > 0.0;
    if !positive(content_w) || !positive(content_h) {
        return Err(FramecardError::invalid_dimensions(format!(
            "content must be > 0, got {content_w}x{content_h}"
        )));
    }
    if !container_w.is_finite() || !container_h.is_finite() {
        return Err(FramecardError::invalid_dimensions(format!(
            "container must be finite, got {container_w}x{container_h}"
        )));
    }

    let container_w = container_w.max(0.0);
    let container_h = container_h.max(0.0);

    let scale = (container_w / content_w).min(container_h / content_h);
    let render_w = content_w * scale;
    let render_h = content_h * scale;

    Ok(AspectFit {
        scale,
        render_w,
        render_h,
        offset_x: (container_w - render_w) / 2.0,
        offset_y: (container_h - render_h) / 2.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn wide_content_is_width_bound_and_vertically_centred() {
        let fit = aspect_fit(260.0, 260.0, 1000.0, 500.0).unwrap();
        assert!((fit.scale - 0.26).abs() < EPS);
        assert!((fit.render_w - 260.0).abs() < EPS);
        assert!((fit.render_h - 130.0).abs() < EPS);
        assert!(fit.offset_x.abs() < EPS);
        assert!((fit.offset_y - 65.0).abs() < EPS);
    }

    #[test]
    fn tall_content_is_height_bound() {
        let fit = aspect_fit(200.0, 100.0, 50.0, 100.0).unwrap();
        assert!((fit.scale - 1.0).abs() < EPS);
        assert!((fit.render_w - 50.0).abs() < EPS);
        assert!((fit.offset_x - 75.0).abs() < EPS);
        assert!(fit.offset_y.abs() < EPS);
    }

    #[test]
    fn fit_stays_inside_and_keeps_ratio() {
        let containers = [(1.0, 1.0), (300.0, 17.0), (33.3, 999.0), (640.0, 480.0)];
        let contents = [(1.0, 1.0), (1920.0, 1080.0), (7.0, 3000.0), (0.5, 0.25)];
        for &(cw, ch) in &containers {
            for &(w, h) in &contents {
                let fit = aspect_fit(cw, ch, w, h).unwrap();
                assert!(fit.render_w <= cw + EPS);
                assert!(fit.render_h <= ch + EPS);
                assert!((fit.render_w / fit.render_h - w / h).abs() < 1e-6);
                assert!((fit.offset_x - (cw - fit.render_w) / 2.0).abs() < EPS);
                assert!((fit.offset_y - (ch - fit.render_h) / 2.0).abs() < EPS);
            }
        }
    }

    #[test]
    fn degenerate_content_is_rejected() {
        for (w, h) in [(0.0, 10.0), (10.0, 0.0), (-1.0, 5.0), (f64::NAN, 5.0)] {
            assert!(matches!(
                aspect_fit(100.0, 100.0, w, h),
                Err(FramecardError::InvalidDimensions(_))
            ));
        }
    }

    #[test]
    fn negative_container_collapses_to_empty_fit() {
        let fit = aspect_fit(-20.0, 100.0, 10.0, 10.0).unwrap();
        assert_eq!(fit.scale, 0.0);
        assert_eq!(fit.render_w, 0.0);
        assert_eq!(fit.render_h, 0.0);
        assert_eq!(fit.offset_y, 50.0);
    }

    #[test]
    fn rect_at_translates_by_origin() {
        let fit = aspect_fit(260.0, 260.0, 1000.0, 500.0).unwrap();
        let r = fit.rect_at(20.0, 20.0);
        assert!((r.x0 - 20.0).abs() < EPS);
        assert!((r.y0 - 85.0).abs() < EPS);
        assert!((r.width() - 260.0).abs() < EPS);
        assert!((r.height() - 130.0).abs() < EPS);
    }
}
