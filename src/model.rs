use eframe::egui;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

use crate::editor::geometry::{point_in_polygon, rotate};

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn from_pos2(p: egui::Pos2) -> Self {
        Self { x: p.x, y: p.y }
    }

    pub fn to_pos2(self) -> egui::Pos2 {
        egui::pos2(self.x, self.y)
    }

    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Point) -> f32 {
        (self - other).length()
    }

    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct RectF {
    pub min: Point,
    pub max: Point,
}

impl RectF {
    /// Axis-aligned box around `points`, `None` when there are no points.
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let mut it = points.iter();
        let first = *it.next()?;
        let mut min = first;
        let mut max = first;
        for p in it {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some(Self { min, max })
    }

    pub fn width(self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn center(self) -> Point {
        Point::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
        )
    }

    pub fn translate(self, delta: Point) -> Self {
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_color32(self) -> egui::Color32 {
        egui::Color32::from_rgba_unmultiplied(self.r, self.g, self.b, self.a)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MaskStyle {
    pub stroke_width: f32,
    /// Dash and gap length of the edge that follows the cursor while drawing.
    pub preview_dash: [f32; 2],
    pub fill: Rgba,
    pub stroke: Rgba,
    pub handle_fill: Rgba,
    pub handle_stroke: Rgba,
    pub preview: Rgba,
}

impl Default for MaskStyle {
    fn default() -> Self {
        Self {
            stroke_width: 2.0,
            preview_dash: [5.0, 5.0],
            fill: Rgba::new(0, 0, 255, 77),
            stroke: Rgba::new(0, 0, 255, 255),
            handle_fill: Rgba::new(255, 255, 255, 255),
            handle_stroke: Rgba::new(0, 0, 255, 255),
            preview: Rgba::new(0, 0, 255, 255),
        }
    }
}

/// One cell of the fixed 2×2 partition, ordered top-left, top-right,
/// bottom-left, bottom-right.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Quadrant {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::TopLeft,
        Quadrant::TopRight,
        Quadrant::BottomLeft,
        Quadrant::BottomRight,
    ];

    pub fn index(self) -> usize {
        match self {
            Quadrant::TopLeft => 0,
            Quadrant::TopRight => 1,
            Quadrant::BottomLeft => 2,
            Quadrant::BottomRight => 3,
        }
    }

    pub fn is_right(self) -> bool {
        matches!(self, Quadrant::TopRight | Quadrant::BottomRight)
    }

    pub fn is_bottom(self) -> bool {
        matches!(self, Quadrant::BottomLeft | Quadrant::BottomRight)
    }

    pub fn label(self) -> &'static str {
        match self {
            Quadrant::TopLeft => "top-left",
            Quadrant::TopRight => "top-right",
            Quadrant::BottomLeft => "bottom-left",
            Quadrant::BottomRight => "bottom-right",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadrantBounds {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
}

impl QuadrantBounds {
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x_min && p.x <= self.x_max && p.y >= self.y_min && p.y <= self.y_max
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub u64);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group {}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PolygonId {
    pub group: GroupId,
    pub quadrant: Quadrant,
}

impl fmt::Display for PolygonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.group, self.quadrant.label())
    }
}

/// Placement of a polygon's frame on the canvas. `position` is the top-left
/// corner of the unrotated, scaled frame; rotation turns about the frame
/// centre.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeTransform {
    pub position: Point,
    pub scale_x: f32,
    pub scale_y: f32,
    pub rotation: f32,
}

impl ShapeTransform {
    pub fn at(position: Point) -> Self {
        Self {
            position,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
        }
    }
}

/// Transform captured when vertex editing starts; re-asserted after every
/// vertex mutation so the polygon's box stays put.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EditBaseline {
    pub transform: ShapeTransform,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    pub id: PolygonId,
    /// Vertices in the design frame. Under the identity transform these are
    /// absolute canvas coordinates.
    pub points: Vec<Point>,
    /// Bounding geometry of `points` as of the last frame recomputation.
    pub frame: RectF,
    pub transform: ShapeTransform,
    /// Position recorded at the last drag step, used to derive drag deltas.
    pub last_position: Point,
    /// `Some` while the polygon's vertex handles are exposed.
    pub edit: Option<EditBaseline>,
}

impl Polygon {
    pub fn new(id: PolygonId, points: Vec<Point>) -> Self {
        let frame = RectF::from_points(&points).unwrap_or_default();
        Self {
            id,
            points,
            frame,
            transform: ShapeTransform::at(frame.min),
            last_position: frame.min,
            edit: None,
        }
    }

    pub fn quadrant(&self) -> Quadrant {
        self.id.quadrant
    }

    pub fn is_editing(&self) -> bool {
        self.edit.is_some()
    }

    /// True when the last vertex repeats the first one.
    pub fn is_closed(&self) -> bool {
        self.points.len() > 1 && self.points.first() == self.points.last()
    }

    fn center_world(&self) -> Point {
        let t = &self.transform;
        Point::new(
            t.position.x + self.frame.width() * t.scale_x * 0.5,
            t.position.y + self.frame.height() * t.scale_y * 0.5,
        )
    }

    pub fn world_point(&self, p: Point) -> Point {
        let t = &self.transform;
        let pivot = self.frame.center();
        let local = Point::new((p.x - pivot.x) * t.scale_x, (p.y - pivot.y) * t.scale_y);
        self.center_world() + rotate(local, t.rotation)
    }

    pub fn world_points(&self) -> Vec<Point> {
        self.points.iter().map(|p| self.world_point(*p)).collect()
    }

    /// Inverse of [`Polygon::world_point`]. A zero scale axis is treated as
    /// unit scale.
    pub fn local_point(&self, world: Point) -> Point {
        let t = &self.transform;
        let v = rotate(world - self.center_world(), -t.rotation);
        let sx = if t.scale_x.abs() <= f32::EPSILON { 1.0 } else { t.scale_x };
        let sy = if t.scale_y.abs() <= f32::EPSILON { 1.0 } else { t.scale_y };
        self.frame.center() + Point::new(v.x / sx, v.y / sy)
    }

    /// Axis-aligned box of the transformed vertices.
    pub fn bounding_box(&self) -> RectF {
        RectF::from_points(&self.world_points()).unwrap_or(RectF {
            min: self.transform.position,
            max: self.transform.position,
        })
    }

    /// Frame corners in world space, clockwise from top-left.
    pub fn frame_corners(&self) -> [Point; 4] {
        let f = self.frame;
        [
            self.world_point(f.min),
            self.world_point(Point::new(f.max.x, f.min.y)),
            self.world_point(f.max),
            self.world_point(Point::new(f.min.x, f.max.y)),
        ]
    }

    pub fn contains(&self, world: Point) -> bool {
        point_in_polygon(world, &self.world_points())
    }

    /// Re-derives the frame from the current vertices and shifts the position
    /// so that no vertex moves on the canvas.
    pub fn recompute_frame(&mut self) {
        let Some(next) = RectF::from_points(&self.points) else {
            return;
        };
        let t = self.transform;
        let prev_pivot = self.frame.center();
        let next_pivot = next.center();
        let shift = Point::new(
            (next_pivot.x - prev_pivot.x) * t.scale_x,
            (next_pivot.y - prev_pivot.y) * t.scale_y,
        );
        let center = self.center_world() + rotate(shift, t.rotation);
        self.frame = next;
        self.transform.position = Point::new(
            center.x - next.width() * t.scale_x * 0.5,
            center.y - next.height() * t.scale_y * 0.5,
        );
    }
}

/// Four mirrored polygons; `members[q]` lives in quadrant `q`.
#[derive(Clone, Debug, PartialEq)]
pub struct Group {
    pub id: GroupId,
    pub members: [Polygon; 4],
}

impl Group {
    pub fn member(&self, quadrant: Quadrant) -> &Polygon {
        &self.members[quadrant.index()]
    }

    pub fn member_mut(&mut self, quadrant: Quadrant) -> &mut Polygon {
        &mut self.members[quadrant.index()]
    }

    pub fn is_editing(&self) -> bool {
        self.members.iter().any(Polygon::is_editing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Polygon {
        let id = PolygonId {
            group: GroupId(1),
            quadrant: Quadrant::TopLeft,
        };
        Polygon::new(
            id,
            vec![
                Point::new(50.0, 50.0),
                Point::new(150.0, 50.0),
                Point::new(150.0, 150.0),
                Point::new(50.0, 50.0),
            ],
        )
    }

    fn assert_close(a: Point, b: Point) {
        assert!(a.distance(b) < 1e-3, "{a:?} != {b:?}");
    }

    #[test]
    fn identity_transform_maps_points_onto_themselves() {
        let poly = triangle();
        assert_eq!(poly.transform.position, Point::new(50.0, 50.0));
        for p in &poly.points {
            assert_close(poly.world_point(*p), *p);
        }
    }

    #[test]
    fn local_point_inverts_world_point_under_scale_and_rotation() {
        let mut poly = triangle();
        poly.transform.scale_x = 1.5;
        poly.transform.scale_y = 0.5;
        poly.transform.rotation = 0.7;
        let p = Point::new(120.0, 80.0);
        assert_close(poly.local_point(poly.world_point(p)), p);
    }

    #[test]
    fn scaling_grows_bounding_box_from_position() {
        let mut poly = triangle();
        poly.transform.scale_x = 2.0;
        let bbox = poly.bounding_box();
        assert_close(bbox.min, Point::new(50.0, 50.0));
        assert_close(bbox.max, Point::new(250.0, 150.0));
    }

    #[test]
    fn recompute_frame_keeps_world_vertices_in_place() {
        let mut poly = triangle();
        poly.transform.scale_x = 1.2;
        poly.transform.rotation = 0.3;
        poly.points[1] = Point::new(190.0, 20.0);
        let before = poly.world_points();
        poly.recompute_frame();
        assert_eq!(poly.frame.max.x, 190.0);
        for (a, b) in before.iter().zip(poly.world_points()) {
            assert_close(*a, b);
        }
    }

    #[test]
    fn contains_uses_transformed_outline() {
        let mut poly = triangle();
        assert!(poly.contains(Point::new(140.0, 100.0)));
        assert!(!poly.contains(Point::new(60.0, 140.0)));
        poly.transform.position = Point::new(250.0, 50.0);
        assert!(poly.contains(Point::new(340.0, 100.0)));
    }

    #[test]
    fn quadrant_ordinals_follow_the_partition() {
        for (i, q) in Quadrant::ALL.into_iter().enumerate() {
            assert_eq!(q.index(), i);
        }
        assert!(Quadrant::BottomRight.is_right() && Quadrant::BottomRight.is_bottom());
        assert!(!Quadrant::TopLeft.is_right() && !Quadrant::TopLeft.is_bottom());
    }
}
