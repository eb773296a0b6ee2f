use kurbo::Shape as _;

use crate::foundation::core::{BezPath, Point};

/// Corner radius actually used for a `w`x`h` rectangle.
///
/// Never exceeds half of the shorter side, so opposite corners cannot overlap.
pub fn effective_corner_radius(w: f64, h: f64, radius: f64) -> f64 {
    let radius = if radius.is_nan() { 0.0 } else { radius };
    radius.min(w / 2.0).min(h / 2.0).max(0.0)
}

/// Closed rounded-rectangle outline: straight edges joined by quadratic corners whose control
/// point is the rectangle's corner.
///
/// The same path serves as the frame fill and as the image clip.
pub fn rounded_rect_path(x: f64, y: f64, w: f64, h: f64, radius: f64) -> BezPath {
    let r = effective_corner_radius(w, h, radius);
    let (x1, y1) = (x + w, y + h);

    let mut p = BezPath::new();
    p.move_to(Point::new(x + r, y));
    p.line_to(Point::new(x1 - r, y));
    p.quad_to(Point::new(x1, y), Point::new(x1, y + r));
    p.line_to(Point::new(x1, y1 - r));
    p.quad_to(Point::new(x1, y1), Point::new(x1 - r, y1));
    p.line_to(Point::new(x + r, y1));
    p.quad_to(Point::new(x, y1), Point::new(x, y1 - r));
    p.line_to(Point::new(x, y + r));
    p.quad_to(Point::new(x, y), Point::new(x + r, y));
    p.close_path();
    p
}

/// Axis-aligned bounds of a path.
pub fn path_bounds(path: &BezPath) -> kurbo::Rect {
    path.bounding_box()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::PathEl;

    #[test]
    fn radius_clamps_to_half_shorter_side() {
        assert_eq!(effective_corner_radius(260.0, 130.0, 15.0), 15.0);
        assert_eq!(effective_corner_radius(20.0, 20.0, 15.0), 10.0);
        assert_eq!(effective_corner_radius(20.0, 20.0, -3.0), 0.0);
        assert_eq!(effective_corner_radius(20.0, 20.0, f64::NAN), 0.0);
        assert_eq!(effective_corner_radius(40.0, 8.0, f64::INFINITY), 4.0);
    }

    #[test]
    fn oversized_radius_yields_the_clamped_path() {
        let (x, y, w, h) = (5.0, 7.0, 20.0, 30.0);
        let at_limit = rounded_rect_path(x, y, w, h, 10.0);
        for r in [10.0, 10.5, 15.0, 1000.0] {
            assert_eq!(rounded_rect_path(x, y, w, h, r), at_limit);
        }
    }

    #[test]
    fn path_is_closed_line_quad_sequence() {
        let p = rounded_rect_path(0.0, 0.0, 100.0, 50.0, 10.0);
        let els = p.elements();
        assert_eq!(els.len(), 10);
        assert_eq!(els[0], PathEl::MoveTo(Point::new(10.0, 0.0)));
        assert_eq!(els[1], PathEl::LineTo(Point::new(90.0, 0.0)));
        assert_eq!(
            els[2],
            PathEl::QuadTo(Point::new(100.0, 0.0), Point::new(100.0, 10.0))
        );
        assert_eq!(
            els[8],
            PathEl::QuadTo(Point::new(0.0, 0.0), Point::new(10.0, 0.0))
        );
        assert_eq!(els[9], PathEl::ClosePath);
    }

    #[test]
    fn bounds_match_the_rectangle() {
        let p = rounded_rect_path(20.0, 85.0, 260.0, 130.0, 15.0);
        let b = path_bounds(&p);
        assert!((b.x0 - 20.0).abs() < 1e-9);
        assert!((b.y0 - 85.0).abs() < 1e-9);
        assert!((b.x1 - 280.0).abs() < 1e-9);
        assert!((b.y1 - 215.0).abs() < 1e-9);
    }

    #[test]
    fn zero_radius_degenerates_to_sharp_corners() {
        let p = rounded_rect_path(0.0, 0.0, 4.0, 4.0, 0.0);
        assert_eq!(p.elements()[0], PathEl::MoveTo(Point::new(0.0, 0.0)));
        assert_eq!(p.elements()[1], PathEl::LineTo(Point::new(4.0, 0.0)));
    }
}
