use crate::model::{Point, Polygon, PolygonId, QuadrantBounds};

use super::edit_mode::VertexHandle;
use super::error::EditorError;
use super::geometry::{clamp_bounding_box_to_scale, clamp_point, contain_offset, rotate};
use super::sync::{ChangeKind, SyncOutcome, TransformTrigger};
use super::EditorSession;

/// Distance between the top edge of the frame and the rotate handle.
pub const ROTATE_HANDLE_OFFSET: f32 = 24.0;
const MIN_EXTENT: f32 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScaleCorner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl ScaleCorner {
    pub const ALL: [ScaleCorner; 4] = [
        ScaleCorner::TopLeft,
        ScaleCorner::TopRight,
        ScaleCorner::BottomRight,
        ScaleCorner::BottomLeft,
    ];

    fn signs(self) -> (f32, f32) {
        match self {
            ScaleCorner::TopLeft => (-1.0, -1.0),
            ScaleCorner::TopRight => (1.0, -1.0),
            ScaleCorner::BottomRight => (1.0, 1.0),
            ScaleCorner::BottomLeft => (-1.0, 1.0),
        }
    }

    fn opposite(self) -> Self {
        match self {
            ScaleCorner::TopLeft => ScaleCorner::BottomRight,
            ScaleCorner::TopRight => ScaleCorner::BottomLeft,
            ScaleCorner::BottomRight => ScaleCorner::TopLeft,
            ScaleCorner::BottomLeft => ScaleCorner::TopRight,
        }
    }

    fn design_point(self, polygon: &Polygon) -> Point {
        let f = polygon.frame;
        match self {
            ScaleCorner::TopLeft => f.min,
            ScaleCorner::TopRight => Point::new(f.max.x, f.min.y),
            ScaleCorner::BottomRight => f.max,
            ScaleCorner::BottomLeft => Point::new(f.min.x, f.max.y),
        }
    }

    pub fn cursor_is_nw_se(self) -> bool {
        matches!(self, ScaleCorner::TopLeft | ScaleCorner::BottomRight)
    }
}

/// Snapshot taken when a corner handle is grabbed. The opposite corner stays
/// pinned for the whole drag.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleDrag {
    pub polygon: PolygonId,
    pub corner: ScaleCorner,
    pub start_rotation: f32,
    pub anchor_design: Point,
    pub anchor_world: Point,
}

/// Pointer gesture currently owned by the session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Interaction {
    Move {
        polygon: PolygonId,
        start_pointer: Point,
        start_position: Point,
    },
    Scale(ScaleDrag),
    Rotate {
        polygon: PolygonId,
        start_rotation: f32,
        start_angle: f32,
    },
    DragVertex(VertexHandle),
}

impl Interaction {
    pub fn polygon(&self) -> PolygonId {
        match self {
            Interaction::Move { polygon, .. } | Interaction::Rotate { polygon, .. } => *polygon,
            Interaction::Scale(drag) => drag.polygon,
            Interaction::DragVertex(handle) => handle.polygon,
        }
    }
}

/// Holds the scale snapshot while the pointer is outside the window. The
/// first position reported after re-entry is clamped once and the recovery
/// disarms.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum PointerRecovery {
    #[default]
    Idle,
    Armed(ScaleDrag),
}

impl PointerRecovery {
    pub fn arm(&mut self, drag: ScaleDrag) {
        *self = PointerRecovery::Armed(drag);
    }

    pub fn reset(&mut self) {
        *self = PointerRecovery::Idle;
    }

    fn take(&mut self) -> Option<ScaleDrag> {
        match std::mem::take(self) {
            PointerRecovery::Armed(drag) => Some(drag),
            PointerRecovery::Idle => None,
        }
    }
}

/// World positions of the selection decorations around one polygon.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformHandles {
    pub outline: [Point; 4],
    pub corners: [(ScaleCorner, Point); 4],
    pub rotate_stem: Point,
    pub rotate: Point,
}

impl EditorSession {
    /// Translates a polygon, pulling it back into its quadrant, and lets the
    /// siblings follow the resulting delta.
    pub fn move_polygon(&mut self, id: PolygonId, delta: Point) -> Result<SyncOutcome, EditorError> {
        let bounds = self.config.layout.bounds(id.quadrant);
        let polygon = self
            .polygon_mut(id)
            .ok_or(EditorError::MissingGroup(id.group))?;
        if polygon.is_editing() {
            return Ok(SyncOutcome::Skipped);
        }
        polygon.transform.position = polygon.transform.position + delta;
        contain(polygon, bounds);
        self.sync_from_source(id, ChangeKind::Transform(TransformTrigger::PointerDrag))
    }

    /// Sets the scale about the frame centre.
    pub fn scale_polygon(
        &mut self,
        id: PolygonId,
        scale_x: f32,
        scale_y: f32,
    ) -> Result<SyncOutcome, EditorError> {
        let bounds = self.config.layout.bounds(id.quadrant);
        let polygon = self
            .polygon_mut(id)
            .ok_or(EditorError::MissingGroup(id.group))?;
        if polygon.is_editing() {
            return Ok(SyncOutcome::Skipped);
        }
        let pivot = polygon.frame.center();
        let pivot_world = polygon.world_point(pivot);
        apply_scale(polygon, scale_x, scale_y, pivot, pivot_world, bounds);
        self.sync_from_source(id, ChangeKind::Transform(TransformTrigger::PointerDrag))
    }

    /// Sets the rotation (radians) about the frame centre.
    pub fn rotate_polygon(&mut self, id: PolygonId, rotation: f32) -> Result<SyncOutcome, EditorError> {
        let bounds = self.config.layout.bounds(id.quadrant);
        let polygon = self
            .polygon_mut(id)
            .ok_or(EditorError::MissingGroup(id.group))?;
        if polygon.is_editing() {
            return Ok(SyncOutcome::Skipped);
        }
        polygon.transform.rotation = rotation;
        contain(polygon, bounds);
        self.sync_from_source(id, ChangeKind::Transform(TransformTrigger::PointerDrag))
    }

    pub fn transform_handles(&self, id: PolygonId) -> Option<TransformHandles> {
        let polygon = self.polygon(id)?;
        if polygon.is_editing() {
            return None;
        }
        let outline = polygon.frame_corners();
        let corners = [
            (ScaleCorner::TopLeft, outline[0]),
            (ScaleCorner::TopRight, outline[1]),
            (ScaleCorner::BottomRight, outline[2]),
            (ScaleCorner::BottomLeft, outline[3]),
        ];
        let f = polygon.frame;
        let rotate_stem = polygon.world_point(Point::new(f.center().x, f.min.y));
        let rotate_handle = rotate_stem
            + rotate(
                Point::new(0.0, -ROTATE_HANDLE_OFFSET),
                polygon.transform.rotation,
            );
        Some(TransformHandles {
            outline,
            corners,
            rotate_stem,
            rotate: rotate_handle,
        })
    }

    pub(crate) fn begin_scale(&mut self, id: PolygonId, corner: ScaleCorner) {
        let Some(polygon) = self.polygon(id) else {
            return;
        };
        let anchor_design = corner.opposite().design_point(polygon);
        self.interaction = Some(Interaction::Scale(ScaleDrag {
            polygon: id,
            corner,
            start_rotation: polygon.transform.rotation,
            anchor_design,
            anchor_world: polygon.world_point(anchor_design),
        }));
    }

    pub(crate) fn begin_rotate(&mut self, id: PolygonId, pointer: Point) {
        let Some(polygon) = self.polygon(id) else {
            return;
        };
        let center = polygon.world_point(polygon.frame.center());
        self.interaction = Some(Interaction::Rotate {
            polygon: id,
            start_rotation: polygon.transform.rotation,
            start_angle: (pointer.y - center.y).atan2(pointer.x - center.x),
        });
    }

    pub(crate) fn drag_scale(&mut self, drag: ScaleDrag, pointer: Point) -> Result<SyncOutcome, EditorError> {
        let bounds = self.config.layout.bounds(drag.polygon.quadrant);
        let pointer = clamp_point(pointer, bounds, 0.0);
        let polygon = self
            .polygon_mut(drag.polygon)
            .ok_or(EditorError::MissingGroup(drag.polygon.group))?;
        if polygon.is_editing() {
            return Ok(SyncOutcome::Skipped);
        }
        let (sx, sy) = drag.corner.signs();
        let local = rotate(pointer - drag.anchor_world, -drag.start_rotation);
        let width = polygon.frame.width();
        let height = polygon.frame.height();
        let scale_x = if width > f32::EPSILON {
            (local.x * sx).max(MIN_EXTENT) / width
        } else {
            polygon.transform.scale_x
        };
        let scale_y = if height > f32::EPSILON {
            (local.y * sy).max(MIN_EXTENT) / height
        } else {
            polygon.transform.scale_y
        };
        polygon.transform.rotation = drag.start_rotation;
        apply_scale(polygon, scale_x, scale_y, drag.anchor_design, drag.anchor_world, bounds);
        self.sync_from_source(
            drag.polygon,
            ChangeKind::Transform(TransformTrigger::PointerDrag),
        )
    }

    pub(crate) fn drag_rotate(
        &mut self,
        id: PolygonId,
        start_rotation: f32,
        start_angle: f32,
        pointer: Point,
    ) -> Result<SyncOutcome, EditorError> {
        let polygon = self
            .polygon(id)
            .ok_or(EditorError::MissingGroup(id.group))?;
        let center = polygon.world_point(polygon.frame.center());
        let angle = (pointer.y - center.y).atan2(pointer.x - center.x);
        self.rotate_polygon(id, start_rotation + (angle - start_angle))
    }

    /// The pointer left the window. A running scale keeps its snapshot so the
    /// pointer can be pulled back into the quadrant on re-entry.
    pub fn pointer_left(&mut self) {
        if let Some(Interaction::Scale(drag)) = self.interaction {
            log::debug!("pointer left the canvas while scaling {}", drag.polygon);
            self.recovery.arm(drag);
        }
    }

    /// First pointer report after the window regains the pointer. Returns the
    /// clamped position fed to the pending scale, if any.
    pub fn pointer_entered(&mut self, p: Point) -> Option<Point> {
        let drag = self.recovery.take()?;
        let clamped = clamp_point(p, self.config.layout.bounds(drag.polygon.quadrant), 0.0);
        if self.interaction == Some(Interaction::Scale(drag)) {
            let result = self.drag_scale(drag, clamped);
            self.absorb(result);
        }
        Some(clamped)
    }
}

/// Scale about a fixed point, then shrink and shift until the polygon fits its
/// quadrant again.
fn apply_scale(
    polygon: &mut Polygon,
    scale_x: f32,
    scale_y: f32,
    anchor_design: Point,
    anchor_world: Point,
    bounds: QuadrantBounds,
) {
    polygon.transform.scale_x = scale_x;
    polygon.transform.scale_y = scale_y;
    pin(polygon, anchor_design, anchor_world);
    contain(polygon, bounds);

    let correction = clamp_bounding_box_to_scale(polygon.bounding_box(), bounds);
    if correction.shrinks() {
        polygon.transform.scale_x *= correction.x;
        polygon.transform.scale_y *= correction.y;
        pin(polygon, anchor_design, anchor_world);
        contain(polygon, bounds);
    }

    // Rotated outlines can still be larger than the quadrant after the
    // per-axis correction; a uniform shrink fits them exactly.
    let bbox = polygon.bounding_box();
    let fit_x = if bbox.width() > f32::EPSILON {
        (bounds.x_max - bounds.x_min) / bbox.width()
    } else {
        1.0
    };
    let fit_y = if bbox.height() > f32::EPSILON {
        (bounds.y_max - bounds.y_min) / bbox.height()
    } else {
        1.0
    };
    let fit = fit_x.min(fit_y);
    if fit < 1.0 {
        polygon.transform.scale_x *= fit;
        polygon.transform.scale_y *= fit;
        pin(polygon, anchor_design, anchor_world);
        contain(polygon, bounds);
    }
}

fn pin(polygon: &mut Polygon, design: Point, world: Point) {
    let drift = world - polygon.world_point(design);
    polygon.transform.position = polygon.transform.position + drift;
}

fn contain(polygon: &mut Polygon, bounds: QuadrantBounds) {
    let shift = contain_offset(polygon.bounding_box(), bounds);
    if !shift.is_zero() {
        polygon.transform.position = polygon.transform.position + shift;
    }
}
