use crate::model::{Group, GroupId, Point, Polygon, PolygonId, Quadrant};

use super::error::EditorError;
use super::geometry::clamp_point;
use super::EditorSession;

impl EditorSession {
    /// Mirrors a freshly drawn outline into all four quadrants and registers
    /// the result as one group.
    pub fn create_group(
        &mut self,
        vertices: &[Point],
        source: Quadrant,
    ) -> Result<GroupId, EditorError> {
        if vertices.len() < 3 {
            return Err(EditorError::TooFewVertices(vertices.len()));
        }
        let layout = self.config.layout;
        let normalized = layout.normalize(vertices, source);
        let id = self.allocate_group_id();
        let members = Quadrant::ALL.map(|quadrant| {
            let bounds = layout.bounds(quadrant);
            let points = layout
                .denormalize(&normalized, quadrant)
                .into_iter()
                .map(|p| clamp_point(p, bounds, 0.0))
                .collect();
            Polygon::new(PolygonId { group: id, quadrant }, points)
        });
        self.groups.push(Group { id, members });
        log::info!(
            "created {id} from {} vertices drawn in the {} quadrant",
            vertices.len(),
            source.label()
        );
        Ok(id)
    }

    /// Drops every group along with edit, selection and interaction state.
    pub fn clear_all(&mut self) {
        let count = self.groups.len();
        self.groups.clear();
        self.editing = None;
        self.selected = None;
        self.interaction = None;
        self.recovery.reset();
        self.closed_at = None;
        log::info!("cleared {count} mask group(s)");
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub(crate) fn group_mut(&mut self, id: GroupId) -> Option<&mut Group> {
        self.groups.iter_mut().find(|g| g.id == id)
    }

    pub fn polygon(&self, id: PolygonId) -> Option<&Polygon> {
        self.group(id.group).map(|g| g.member(id.quadrant))
    }

    pub fn polygon_mut(&mut self, id: PolygonId) -> Option<&mut Polygon> {
        self.group_mut(id.group).map(|g| g.member_mut(id.quadrant))
    }

    fn allocate_group_id(&mut self) -> GroupId {
        let id = GroupId(self.next_group_id);
        self.next_group_id += 1;
        id
    }
}
