//! Quadrant-mirrored mask editing, independent of any windowing toolkit.
//!
//! Every mask is a group of four polygons, one per quadrant of the canvas.
//! Whatever happens to one member (drag, scale, rotation, vertex edit) is
//! mirrored into the other three while each stays inside its own quadrant.

pub mod drawing;
pub mod edit_mode;
pub mod error;
pub mod geometry;
pub mod registry;
pub mod sync;
pub mod transform;

use crate::model::{Group, GroupId, Point, PolygonId};

use drawing::DrawingSession;
use edit_mode::{EditModeState, VertexHandle};
use error::EditorError;
use geometry::CanvasLayout;
use sync::{ChangeKind, SyncLock, TransformTrigger};
use transform::{Interaction, PointerRecovery, ScaleCorner};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EditorConfig {
    pub layout: CanvasLayout,
    /// A click closer than this to the first vertex closes the outline.
    pub closure_threshold: f32,
    /// Inward margin applied when mirrored vertices are clamped.
    pub sync_margin: f32,
    /// Pick radius of vertex, corner and rotate handles.
    pub handle_radius: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            layout: CanvasLayout::default(),
            closure_threshold: 10.0,
            sync_margin: 0.5,
            handle_radius: 6.0,
        }
    }
}

/// What sits under the pointer, topmost first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Hit {
    DrawingPreview,
    VertexHandle(VertexHandle),
    ScaleHandle(PolygonId, ScaleCorner),
    RotateHandle(PolygonId),
    Polygon(PolygonId),
}

pub struct EditorSession {
    config: EditorConfig,
    groups: Vec<Group>,
    next_group_id: u64,
    sync_lock: SyncLock,
    drawing: DrawingSession,
    editing: Option<EditModeState>,
    selected: Option<PolygonId>,
    interaction: Option<Interaction>,
    recovery: PointerRecovery,
    /// Where the last press closed an outline. The double-click that
    /// completes the same gesture must not reach the new mask.
    closed_at: Option<Point>,
}

impl EditorSession {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            groups: Vec::new(),
            next_group_id: 1,
            sync_lock: SyncLock::default(),
            drawing: DrawingSession::default(),
            editing: None,
            selected: None,
            interaction: None,
            recovery: PointerRecovery::default(),
            closed_at: None,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Swaps thresholds and canvas geometry. Existing groups are dropped when
    /// the canvas geometry changes since their quadrants no longer line up.
    pub fn set_config(&mut self, config: EditorConfig) {
        if config.layout != self.config.layout && !self.groups.is_empty() {
            log::warn!("canvas layout changed, dropping existing masks");
            self.clear_all();
        }
        self.config = config;
    }

    pub fn drawing(&self) -> &DrawingSession {
        &self.drawing
    }

    pub fn selected(&self) -> Option<PolygonId> {
        self.selected
    }

    pub fn select(&mut self, id: Option<PolygonId>) {
        self.selected = id.filter(|id| self.polygon(*id).is_some());
    }

    pub fn interaction(&self) -> Option<&Interaction> {
        self.interaction.as_ref()
    }

    pub fn begin_drawing(&mut self) {
        if let Some(group) = self.editing_group() {
            let result = self.exit_edit_mode(group);
            self.absorb(result);
        }
        self.interaction = None;
        self.selected = None;
        self.drawing.enter();
        log::info!("drawing mode armed");
    }

    pub fn cancel_drawing(&mut self) {
        if self.drawing.is_active() {
            self.drawing.cancel();
            log::info!("drawing cancelled");
        }
    }

    /// Commits the outline being drawn. Returns the new group, or `None` when
    /// fewer than three vertices were placed (drawing mode ends either way).
    pub fn finish_drawing(&mut self) -> Option<GroupId> {
        let finished = match self.drawing.finish(self.config.closure_threshold) {
            Ok(finished) => finished,
            Err(err) => {
                log::info!("drawing ended without a mask: {err}");
                return None;
            }
        };
        let result = self.create_group(&finished.vertices, finished.quadrant);
        self.absorb(result)
    }

    pub fn hit_test(&self, p: Point) -> Option<Hit> {
        let r = self.config.handle_radius;
        if self.drawing.is_active() {
            let on_marker = self.drawing.points().iter().any(|m| m.distance(p) <= r);
            return on_marker.then_some(Hit::DrawingPreview);
        }
        if let Some((handle, _)) = self
            .vertex_handles()
            .into_iter()
            .rev()
            .find(|(_, pos)| pos.distance(p) <= r)
        {
            return Some(Hit::VertexHandle(handle));
        }
        if let Some(id) = self.selected {
            if let Some(handles) = self.transform_handles(id) {
                if handles.rotate.distance(p) <= r {
                    return Some(Hit::RotateHandle(id));
                }
                for (corner, pos) in handles.corners {
                    if (pos.x - p.x).abs() <= r && (pos.y - p.y).abs() <= r {
                        return Some(Hit::ScaleHandle(id, corner));
                    }
                }
            }
        }
        self.groups
            .iter()
            .rev()
            .flat_map(|g| g.members.iter())
            .find(|m| m.contains(p))
            .map(|m| Hit::Polygon(m.id))
    }

    pub fn pointer_down(&mut self, p: Point) {
        self.closed_at = None;
        if self.drawing.is_active() {
            let step = self.drawing.pointer_down(
                p,
                &self.config.layout,
                self.config.closure_threshold,
            );
            log::trace!("drawing click at {p:?}: {step:?}");
            if step == drawing::DrawingStep::Closed && self.finish_drawing().is_some() {
                self.closed_at = Some(p);
            }
            return;
        }
        match self.hit_test(p) {
            None => {
                if let Some(group) = self.editing_group() {
                    let result = self.exit_edit_mode(group);
                    self.absorb(result);
                    return;
                }
                self.selected = None;
            }
            Some(Hit::VertexHandle(handle)) => {
                self.interaction = Some(Interaction::DragVertex(handle));
            }
            Some(Hit::ScaleHandle(id, corner)) => self.begin_scale(id, corner),
            Some(Hit::RotateHandle(id)) => self.begin_rotate(id, p),
            Some(Hit::Polygon(id)) => {
                self.selected = Some(id);
                let Some(polygon) = self.polygon_mut(id) else {
                    return;
                };
                if polygon.is_editing() {
                    return;
                }
                let start_position = polygon.transform.position;
                polygon.last_position = start_position;
                self.interaction = Some(Interaction::Move {
                    polygon: id,
                    start_pointer: p,
                    start_position,
                });
            }
            Some(Hit::DrawingPreview) => {}
        }
    }

    /// Hover without a button held.
    pub fn pointer_move(&mut self, p: Point) {
        self.drawing.pointer_move(p, &self.config.layout);
    }

    pub fn pointer_drag(&mut self, p: Point) {
        let Some(interaction) = self.interaction else {
            self.pointer_move(p);
            return;
        };
        let result = match interaction {
            Interaction::Move {
                polygon,
                start_pointer,
                start_position,
            } => {
                let Some(current) = self.polygon(polygon).map(|m| m.transform.position) else {
                    self.interaction = None;
                    return;
                };
                let target = start_position + (p - start_pointer);
                self.move_polygon(polygon, target - current)
            }
            Interaction::Scale(drag) => self.drag_scale(drag, p),
            Interaction::Rotate {
                polygon,
                start_rotation,
                start_angle,
            } => self.drag_rotate(polygon, start_rotation, start_angle, p),
            Interaction::DragVertex(handle) => self.drag_vertex(handle, p),
        };
        if self.absorb(result).is_none() {
            self.interaction = None;
        }
    }

    /// Ends the current gesture and re-mirrors the shape it touched.
    pub fn pointer_up(&mut self, _p: Point) {
        self.recovery.reset();
        if let Some(state) = &mut self.editing {
            state.active = None;
        }
        let Some(interaction) = self.interaction.take() else {
            return;
        };
        let id = interaction.polygon();
        match interaction {
            Interaction::DragVertex(_) => {}
            _ => {
                if let Some(polygon) = self.polygon_mut(id) {
                    polygon.last_position = polygon.transform.position;
                }
                self.shape_changed(id, ChangeKind::Transform(TransformTrigger::Programmatic));
            }
        }
    }

    pub fn double_click(&mut self, p: Point) {
        if let Some(closed) = self.closed_at.take() {
            if closed.distance(p) <= self.config.closure_threshold {
                log::trace!("double click at {p:?} consumed by outline closure");
                return;
            }
        }
        if self.drawing.is_active() {
            if self.drawing.points().len() >= 3 && self.hit_test(p) == Some(Hit::DrawingPreview) {
                self.finish_drawing();
            }
            return;
        }
        let target = match self.hit_test(p) {
            Some(Hit::Polygon(id)) => id,
            Some(Hit::VertexHandle(handle)) => handle.polygon,
            _ => return,
        };
        self.interaction = None;
        self.selected = Some(target);
        let result = self.toggle_edit_mode(target.group);
        self.absorb(result);
    }

    /// Logs a failed operation at the dispatch boundary. Errors never reach
    /// the host from pointer events.
    fn absorb<T>(&self, result: Result<T, EditorError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(EditorError::MissingGroup(group)) => {
                log::debug!("ignoring event for {group}, it no longer exists");
                None
            }
            Err(err) => {
                log::debug!("pointer event dropped: {err}");
                None
            }
        }
    }
}
