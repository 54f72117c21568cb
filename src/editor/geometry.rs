use crate::model::{Point, Quadrant, QuadrantBounds, RectF};

pub fn rotate(v: Point, angle: f32) -> Point {
    let sin = angle.sin();
    let cos = angle.cos();
    Point::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Even-odd test against a closed outline.
pub fn point_in_polygon(p: Point, outline: &[Point]) -> bool {
    if outline.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = outline.len() - 1;
    for i in 0..outline.len() {
        let a = outline[i];
        let b = outline[j];
        if (a.y > p.y) != (b.y > p.y) {
            let t = (p.y - a.y) / (b.y - a.y);
            if p.x < a.x + t * (b.x - a.x) {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Canvas size and the fixed 2×2 split.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasLayout {
    pub width: f32,
    pub height: f32,
    pub quadrant_width: f32,
    pub quadrant_height: f32,
}

impl Default for CanvasLayout {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 690.0,
            quadrant_width: 400.0,
            quadrant_height: 345.0,
        }
    }
}

impl CanvasLayout {
    /// Points on a dividing line belong to the right/bottom side.
    pub fn classify(&self, p: Point) -> Quadrant {
        let right = p.x >= self.quadrant_width;
        let bottom = p.y >= self.quadrant_height;
        match (right, bottom) {
            (false, false) => Quadrant::TopLeft,
            (true, false) => Quadrant::TopRight,
            (false, true) => Quadrant::BottomLeft,
            (true, true) => Quadrant::BottomRight,
        }
    }

    pub fn offset(&self, quadrant: Quadrant) -> Point {
        Point::new(
            if quadrant.is_right() { self.quadrant_width } else { 0.0 },
            if quadrant.is_bottom() { self.quadrant_height } else { 0.0 },
        )
    }

    pub fn bounds(&self, quadrant: Quadrant) -> QuadrantBounds {
        let (x_min, x_max) = if quadrant.is_right() {
            (self.quadrant_width, self.width)
        } else {
            (0.0, self.quadrant_width)
        };
        let (y_min, y_max) = if quadrant.is_bottom() {
            (self.quadrant_height, self.height)
        } else {
            (0.0, self.quadrant_height)
        };
        QuadrantBounds {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    pub fn normalize(&self, points: &[Point], source: Quadrant) -> Vec<Point> {
        let offset = self.offset(source);
        points.iter().map(|p| *p - offset).collect()
    }

    pub fn denormalize(&self, points: &[Point], target: Quadrant) -> Vec<Point> {
        let offset = self.offset(target);
        points.iter().map(|p| *p + offset).collect()
    }

    pub fn translate_between(&self, p: Point, from: Quadrant, to: Quadrant) -> Point {
        p - self.offset(from) + self.offset(to)
    }
}

/// Pulls `p` inside `bounds` shrunk by `margin` on every side. Low edges are
/// applied before high edges, so a margin wider than the bound settles on the
/// high edge instead of panicking.
pub fn clamp_point(p: Point, bounds: QuadrantBounds, margin: f32) -> Point {
    Point::new(
        p.x.max(bounds.x_min + margin).min(bounds.x_max - margin),
        p.y.max(bounds.y_min + margin).min(bounds.y_max - margin),
    )
}

/// Multiplicative scale factors that pull an overflowing box back in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleCorrection {
    pub x: f32,
    pub y: f32,
}

impl ScaleCorrection {
    pub const NONE: ScaleCorrection = ScaleCorrection { x: 1.0, y: 1.0 };

    pub fn shrinks(self) -> bool {
        self.x < 1.0 || self.y < 1.0
    }
}

/// Per-axis shrink factor for a box that crossed its bound while scaling.
///
/// This is an approximation: it treats overflow as axis-aligned, so for a
/// rotated shape the corrected box can still poke out slightly. Callers
/// follow up with [`contain_offset`].
pub fn clamp_bounding_box_to_scale(bbox: RectF, bounds: QuadrantBounds) -> ScaleCorrection {
    ScaleCorrection {
        x: axis_factor(bbox.min.x, bbox.max.x, bounds.x_min, bounds.x_max),
        y: axis_factor(bbox.min.y, bbox.max.y, bounds.y_min, bounds.y_max),
    }
}

fn axis_factor(lo: f32, hi: f32, bound_lo: f32, bound_hi: f32) -> f32 {
    let extent = hi - lo;
    if extent <= f32::EPSILON {
        return 1.0;
    }
    let overflow = if lo < bound_lo {
        bound_lo - lo
    } else if hi > bound_hi {
        hi - bound_hi
    } else {
        return 1.0;
    };
    let factor = (extent - overflow) / extent;
    if factor < 1.0 { factor.max(0.0) } else { 1.0 }
}

/// Translation that moves `bbox` back inside `bounds`.
pub fn contain_offset(bbox: RectF, bounds: QuadrantBounds) -> Point {
    Point::new(
        axis_offset(bbox.min.x, bbox.max.x, bounds.x_min, bounds.x_max),
        axis_offset(bbox.min.y, bbox.max.y, bounds.y_min, bounds.y_max),
    )
}

fn axis_offset(lo: f32, hi: f32, bound_lo: f32, bound_hi: f32) -> f32 {
    let mut shift = 0.0;
    if lo < bound_lo {
        shift = bound_lo - lo;
    }
    if hi + shift > bound_hi {
        shift = bound_hi - hi;
    }
    shift
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn layout() -> CanvasLayout {
        CanvasLayout::default()
    }

    #[test]
    fn classify_puts_dividers_on_the_far_side() {
        let l = layout();
        assert_eq!(l.classify(Point::new(0.0, 0.0)), Quadrant::TopLeft);
        assert_eq!(l.classify(Point::new(399.9, 344.9)), Quadrant::TopLeft);
        assert_eq!(l.classify(Point::new(400.0, 0.0)), Quadrant::TopRight);
        assert_eq!(l.classify(Point::new(399.0, 345.0)), Quadrant::BottomLeft);
        assert_eq!(l.classify(Point::new(400.0, 345.0)), Quadrant::BottomRight);
    }

    #[test]
    fn bounds_tile_the_canvas() {
        let l = layout();
        assert_eq!(
            l.bounds(Quadrant::TopLeft),
            QuadrantBounds { x_min: 0.0, x_max: 400.0, y_min: 0.0, y_max: 345.0 }
        );
        assert_eq!(
            l.bounds(Quadrant::BottomRight),
            QuadrantBounds { x_min: 400.0, x_max: 800.0, y_min: 345.0, y_max: 690.0 }
        );
    }

    #[test]
    fn normalize_then_denormalize_is_identity() {
        let l = layout();
        let pts = vec![Point::new(450.0, 400.0), Point::new(790.0, 680.0)];
        for q in Quadrant::ALL {
            let moved = l.denormalize(&pts, q);
            assert_eq!(l.denormalize(&l.normalize(&moved, q), q), moved);
        }
        assert_eq!(
            l.normalize(&pts, Quadrant::BottomRight),
            vec![Point::new(50.0, 55.0), Point::new(390.0, 335.0)]
        );
    }

    #[test]
    fn translate_between_mirrors_across_quadrants() {
        let l = layout();
        let p = Point::new(50.0, 60.0);
        assert_eq!(
            l.translate_between(p, Quadrant::TopLeft, Quadrant::BottomRight),
            Point::new(450.0, 405.0)
        );
    }

    #[test]
    fn clamp_point_respects_margin() {
        let b = layout().bounds(Quadrant::TopRight);
        assert_eq!(clamp_point(Point::new(380.0, -4.0), b, 0.5), Point::new(400.5, 0.5));
        assert_eq!(clamp_point(Point::new(900.0, 400.0), b, 0.0), Point::new(800.0, 345.0));
        assert_eq!(clamp_point(Point::new(500.0, 100.0), b, 0.5), Point::new(500.0, 100.0));
    }

    #[test]
    fn clamp_point_tolerates_oversized_margin() {
        let b = QuadrantBounds { x_min: 0.0, x_max: 1.0, y_min: 0.0, y_max: 1.0 };
        let p = clamp_point(Point::new(0.3, 0.3), b, 2.0);
        assert_eq!(p, Point::new(-1.0, -1.0));
    }

    #[test]
    fn scale_correction_shrinks_the_overflowing_axis() {
        let b = layout().bounds(Quadrant::TopLeft);
        let bbox = RectF { min: Point::new(200.0, 100.0), max: Point::new(500.0, 200.0) };
        let c = clamp_bounding_box_to_scale(bbox, b);
        assert!((c.x - 2.0 / 3.0).abs() < 1e-6);
        assert_eq!(c.y, 1.0);
        assert!(c.shrinks());

        let inside = RectF { min: Point::new(10.0, 10.0), max: Point::new(20.0, 20.0) };
        assert_eq!(clamp_bounding_box_to_scale(inside, b), ScaleCorrection::NONE);
    }

    #[test]
    fn contain_offset_pulls_box_back() {
        let b = layout().bounds(Quadrant::TopLeft);
        let bbox = RectF { min: Point::new(-10.0, 300.0), max: Point::new(40.0, 360.0) };
        assert_eq!(contain_offset(bbox, b), Point::new(10.0, -15.0));
        let fits = RectF { min: Point::new(5.0, 5.0), max: Point::new(6.0, 6.0) };
        assert!(contain_offset(fits, b).is_zero());
    }

    #[test]
    fn point_in_polygon_handles_concave_outline() {
        let outline = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(5.0, 3.0),
            Point::new(0.0, 10.0),
        ];
        assert!(point_in_polygon(Point::new(2.0, 2.0), &outline));
        assert!(!point_in_polygon(Point::new(5.0, 8.0), &outline));
    }
}
