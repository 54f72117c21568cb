use crate::model::{EditBaseline, GroupId, Point, PolygonId, Quadrant};

use super::error::EditorError;
use super::geometry::clamp_point;
use super::sync::{ChangeKind, SyncOutcome};
use super::transform::Interaction;
use super::EditorSession;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VertexHandle {
    pub polygon: PolygonId,
    pub vertex: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EditModeState {
    pub group: GroupId,
    pub handles: Vec<VertexHandle>,
    /// Member whose handle is currently being dragged.
    pub active: Option<Quadrant>,
}

/// Vertices that get a handle; a closing duplicate of the first vertex does
/// not.
fn handle_range(points: &[Point]) -> std::ops::Range<usize> {
    let closed = points.len() > 1 && points.first() == points.last();
    0..if closed { points.len() - 1 } else { points.len() }
}

impl EditorSession {
    pub fn editing_group(&self) -> Option<GroupId> {
        self.editing.as_ref().map(|state| state.group)
    }

    pub fn edit_state(&self) -> Option<&EditModeState> {
        self.editing.as_ref()
    }

    /// Freezes every member's transform and exposes its vertices. Any other
    /// group that was being edited is released first.
    pub fn enter_edit_mode(&mut self, group: GroupId) -> Result<(), EditorError> {
        match self.editing_group() {
            Some(current) if current == group => return Ok(()),
            Some(current) => self.exit_edit_mode(current)?,
            None => {}
        }
        let target = self
            .group_mut(group)
            .ok_or(EditorError::MissingGroup(group))?;
        let mut handles = Vec::new();
        for member in target.members.iter_mut() {
            member.edit = Some(EditBaseline {
                transform: member.transform,
            });
            handles.extend(handle_range(&member.points).map(|vertex| VertexHandle {
                polygon: member.id,
                vertex,
            }));
        }
        self.editing = Some(EditModeState {
            group,
            handles,
            active: None,
        });
        self.interaction = None;
        log::info!("{group} entered vertex edit mode");
        Ok(())
    }

    /// Drops the handles and re-derives each member's frame from its edited
    /// vertices. Exiting a group that is not being edited does nothing.
    pub fn exit_edit_mode(&mut self, group: GroupId) -> Result<(), EditorError> {
        if self.editing_group() != Some(group) {
            return Ok(());
        }
        self.editing = None;
        if matches!(self.interaction, Some(Interaction::DragVertex(_))) {
            self.interaction = None;
        }
        let target = self
            .group_mut(group)
            .ok_or(EditorError::MissingGroup(group))?;
        for member in target.members.iter_mut() {
            if let Some(baseline) = member.edit.take() {
                member.transform = baseline.transform;
            }
            member.recompute_frame();
            member.last_position = member.transform.position;
        }
        log::info!("{group} left vertex edit mode");
        Ok(())
    }

    pub fn toggle_edit_mode(&mut self, group: GroupId) -> Result<(), EditorError> {
        if self.editing_group() == Some(group) {
            self.exit_edit_mode(group)
        } else {
            self.enter_edit_mode(group)
        }
    }

    /// Handles of the editing group with their world positions.
    pub fn vertex_handles(&self) -> Vec<(VertexHandle, Point)> {
        let Some(state) = &self.editing else {
            return Vec::new();
        };
        state
            .handles
            .iter()
            .filter_map(|handle| {
                let polygon = self.polygon(handle.polygon)?;
                let p = polygon.points.get(handle.vertex)?;
                Some((*handle, polygon.world_point(*p)))
            })
            .collect()
    }

    /// Moves one vertex to the pointer, kept inside the polygon's own
    /// quadrant, and mirrors the new outline to the siblings.
    pub fn drag_vertex(
        &mut self,
        handle: VertexHandle,
        pointer: Point,
    ) -> Result<SyncOutcome, EditorError> {
        let bounds = self.config.layout.bounds(handle.polygon.quadrant);
        let polygon = self
            .polygon_mut(handle.polygon)
            .ok_or(EditorError::MissingGroup(handle.polygon.group))?;
        let len = polygon.points.len();
        if handle.vertex >= len {
            log::error!(
                "vertex {} requested on {} which has {len} vertices",
                handle.vertex,
                handle.polygon
            );
            return Err(EditorError::InvalidVertexIndex {
                index: handle.vertex,
                len,
            });
        }
        let Some(baseline) = polygon.edit else {
            return Ok(SyncOutcome::Skipped);
        };
        let closed = polygon.is_closed();
        polygon.transform = baseline.transform;
        let design = polygon.local_point(clamp_point(pointer, bounds, 0.0));
        polygon.points[handle.vertex] = design;
        if handle.vertex == 0 && closed {
            polygon.points[len - 1] = design;
        }
        polygon.transform = baseline.transform;

        if let Some(state) = &mut self.editing {
            state.active = Some(handle.polygon.quadrant);
        }
        self.sync_from_source(handle.polygon, ChangeKind::VertexEdit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::EditorConfig;
    use pretty_assertions::assert_eq;

    fn session_with_triangle() -> (EditorSession, GroupId) {
        let mut session = EditorSession::new(EditorConfig::default());
        let outline = [
            Point::new(50.0, 50.0),
            Point::new(150.0, 50.0),
            Point::new(150.0, 150.0),
            Point::new(50.0, 50.0),
        ];
        let id = session.create_group(&outline, Quadrant::TopLeft).unwrap();
        (session, id)
    }

    fn pid(group: GroupId, quadrant: Quadrant) -> PolygonId {
        PolygonId { group, quadrant }
    }

    fn session_with_square() -> (EditorSession, GroupId) {
        let mut session = EditorSession::new(EditorConfig::default());
        let outline = [
            Point::new(100.0, 100.0),
            Point::new(200.0, 100.0),
            Point::new(200.0, 200.0),
            Point::new(100.0, 200.0),
        ];
        let id = session.create_group(&outline, Quadrant::TopLeft).unwrap();
        (session, id)
    }

    /// Canvas outline of every member, relative to its own quadrant.
    fn relative_outlines(session: &EditorSession, id: GroupId) -> Vec<Vec<Point>> {
        let layout = session.config().layout;
        session
            .group(id)
            .unwrap()
            .members
            .iter()
            .map(|m| layout.normalize(&m.world_points(), m.quadrant()))
            .collect()
    }

    fn assert_members_agree(session: &EditorSession, id: GroupId) {
        let outlines = relative_outlines(session, id);
        for outline in &outlines[1..] {
            assert_eq!(outline.len(), outlines[0].len());
            for (a, b) in outlines[0].iter().zip(outline) {
                assert!(a.distance(*b) < 1e-2, "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn entering_exposes_one_handle_per_distinct_vertex() {
        let (mut session, id) = session_with_triangle();
        session.enter_edit_mode(id).unwrap();
        assert_eq!(session.editing_group(), Some(id));
        let handles = session.vertex_handles();
        assert_eq!(handles.len(), 12);
        assert!(handles.iter().all(|(h, _)| h.vertex < 3));
        assert!(session.group(id).unwrap().is_editing());
    }

    #[test]
    fn vertex_drag_is_mirrored_and_transform_stays_frozen() {
        let (mut session, id) = session_with_triangle();
        session.enter_edit_mode(id).unwrap();
        let before: Vec<_> = session
            .group(id)
            .unwrap()
            .members
            .iter()
            .map(|m| m.transform)
            .collect();

        let handle = VertexHandle {
            polygon: pid(id, Quadrant::TopLeft),
            vertex: 1,
        };
        let outcome = session.drag_vertex(handle, Point::new(180.0, 40.0)).unwrap();
        assert_eq!(outcome, SyncOutcome::Applied);

        let group = session.group(id).unwrap();
        assert_eq!(group.member(Quadrant::TopLeft).points[1], Point::new(180.0, 40.0));
        assert_eq!(group.member(Quadrant::TopRight).points[1], Point::new(580.0, 40.0));
        assert_eq!(group.member(Quadrant::BottomLeft).points[1], Point::new(180.0, 385.0));
        let after: Vec<_> = group.members.iter().map(|m| m.transform).collect();
        assert_eq!(after, before);
        assert_eq!(session.edit_state().unwrap().active, Some(Quadrant::TopLeft));
    }

    #[test]
    fn vertex_drag_on_a_scaled_group_lands_at_the_same_canvas_spot() {
        let (mut session, id) = session_with_square();
        let source = pid(id, Quadrant::TopLeft);
        session.scale_polygon(source, 0.5, 0.5).unwrap();
        session.enter_edit_mode(id).unwrap();
        let handle = VertexHandle {
            polygon: source,
            vertex: 1,
        };
        session.drag_vertex(handle, Point::new(390.0, 130.0)).unwrap();

        let group = session.group(id).unwrap();
        let expected = [
            (Quadrant::TopLeft, Point::new(390.0, 130.0)),
            (Quadrant::TopRight, Point::new(790.0, 130.0)),
            (Quadrant::BottomLeft, Point::new(390.0, 475.0)),
            (Quadrant::BottomRight, Point::new(790.0, 475.0)),
        ];
        for (quadrant, want) in expected {
            let member = group.member(quadrant);
            let got = member.world_point(member.points[1]);
            assert!(got.distance(want) < 1e-2, "{quadrant:?}: {got:?}");
        }
    }

    #[test]
    fn members_agree_after_vertex_drags_on_a_scaled_rotated_group() {
        let (mut session, id) = session_with_square();
        let layout = session.config().layout;
        let source = pid(id, Quadrant::TopLeft);
        session.scale_polygon(source, 0.6, 0.8).unwrap();
        session.rotate_polygon(source, 0.3).unwrap();
        assert_members_agree(&session, id);

        session.enter_edit_mode(id).unwrap();
        // (quadrant dragged in, vertex, target relative to that quadrant)
        let drags = [
            (Quadrant::TopLeft, 1, Point::new(300.0, 120.0)),
            (Quadrant::BottomRight, 3, Point::new(150.0, 300.0)),
            (Quadrant::TopRight, 2, Point::new(350.0, 250.0)),
            (Quadrant::BottomLeft, 0, Point::new(40.0, 60.0)),
        ];
        for (quadrant, vertex, target) in drags {
            let pointer = layout.denormalize(&[target], quadrant)[0];
            let handle = VertexHandle {
                polygon: pid(id, quadrant),
                vertex,
            };
            assert_eq!(session.drag_vertex(handle, pointer).unwrap(), SyncOutcome::Applied);
            let dragged = session.polygon(pid(id, quadrant)).unwrap();
            assert!(dragged.world_point(dragged.points[vertex]).distance(pointer) < 1e-2);
            assert_members_agree(&session, id);
        }
    }

    #[test]
    fn vertex_drag_is_clamped_to_its_quadrant() {
        let (mut session, id) = session_with_triangle();
        session.enter_edit_mode(id).unwrap();
        let handle = VertexHandle {
            polygon: pid(id, Quadrant::TopRight),
            vertex: 2,
        };
        session.drag_vertex(handle, Point::new(900.0, 500.0)).unwrap();
        let group = session.group(id).unwrap();
        assert_eq!(group.member(Quadrant::TopRight).points[2], Point::new(800.0, 345.0));
        assert_eq!(group.member(Quadrant::TopLeft).points[2], Point::new(399.5, 344.5));
    }

    #[test]
    fn moving_the_first_vertex_keeps_the_outline_closed() {
        let (mut session, id) = session_with_triangle();
        session.enter_edit_mode(id).unwrap();
        let handle = VertexHandle {
            polygon: pid(id, Quadrant::TopLeft),
            vertex: 0,
        };
        session.drag_vertex(handle, Point::new(30.0, 60.0)).unwrap();
        for member in &session.group(id).unwrap().members {
            assert!(member.is_closed());
        }
    }

    #[test]
    fn invalid_vertex_index_changes_nothing() {
        let (mut session, id) = session_with_triangle();
        session.enter_edit_mode(id).unwrap();
        let before = session.group(id).unwrap().clone();
        let handle = VertexHandle {
            polygon: pid(id, Quadrant::TopLeft),
            vertex: 9,
        };
        assert_eq!(
            session.drag_vertex(handle, Point::new(10.0, 10.0)),
            Err(EditorError::InvalidVertexIndex { index: 9, len: 4 })
        );
        assert_eq!(session.group(id).unwrap(), &before);
    }

    #[test]
    fn editing_a_second_group_releases_the_first() {
        let (mut session, first) = session_with_triangle();
        let outline = [
            Point::new(200.0, 200.0),
            Point::new(300.0, 200.0),
            Point::new(250.0, 300.0),
        ];
        let second = session.create_group(&outline, Quadrant::TopLeft).unwrap();
        session.enter_edit_mode(first).unwrap();
        session.enter_edit_mode(second).unwrap();
        assert_eq!(session.editing_group(), Some(second));
        assert!(!session.group(first).unwrap().is_editing());
        assert!(session.group(second).unwrap().is_editing());
    }

    #[test]
    fn exit_keeps_edited_vertices_where_they_were_drawn() {
        let (mut session, id) = session_with_triangle();
        let source = pid(id, Quadrant::TopLeft);
        session.rotate_polygon(source, 0.3).unwrap();
        session.enter_edit_mode(id).unwrap();
        let handle = VertexHandle {
            polygon: source,
            vertex: 2,
        };
        session.drag_vertex(handle, Point::new(170.0, 190.0)).unwrap();
        let during = session.polygon(source).unwrap().world_points();

        session.exit_edit_mode(id).unwrap();
        let polygon = session.polygon(source).unwrap();
        assert!(!polygon.is_editing());
        assert_eq!(polygon.last_position, polygon.transform.position);
        for (a, b) in during.iter().zip(polygon.world_points()) {
            assert!(a.distance(b) < 1e-3);
        }
        assert!(polygon.world_points()[2].distance(Point::new(170.0, 190.0)) < 1e-3);
    }

    #[test]
    fn toggle_flips_between_modes() {
        let (mut session, id) = session_with_triangle();
        session.toggle_edit_mode(id).unwrap();
        assert_eq!(session.editing_group(), Some(id));
        session.toggle_edit_mode(id).unwrap();
        assert_eq!(session.editing_group(), None);
        assert!(session.vertex_handles().is_empty());
    }
}
