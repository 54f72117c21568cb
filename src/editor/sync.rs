use std::cell::Cell;
use std::rc::Rc;

use crate::model::{Group, Point, Polygon, PolygonId, Quadrant, QuadrantBounds, RectF};

use super::error::EditorError;
use super::geometry::{clamp_point, contain_offset, CanvasLayout};
use super::EditorSession;

/// Session-wide re-entrancy flag for mirroring. Not a mutex: everything runs
/// on the UI thread and the flag only breaks notification cycles.
#[derive(Clone, Debug, Default)]
pub struct SyncLock {
    held: Rc<Cell<bool>>,
}

impl SyncLock {
    #[cfg(test)]
    pub fn is_held(&self) -> bool {
        self.held.get()
    }

    pub fn try_acquire(&self) -> Option<SyncGuard> {
        if self.held.replace(true) {
            return None;
        }
        Some(SyncGuard {
            held: Rc::clone(&self.held),
        })
    }
}

/// Releases the [`SyncLock`] when dropped.
#[derive(Debug)]
pub struct SyncGuard {
    held: Rc<Cell<bool>>,
}

impl Drop for SyncGuard {
    fn drop(&mut self) {
        self.held.set(false);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransformTrigger {
    /// A gesture step that may have moved the source; siblings follow the
    /// position delta since the previous step.
    PointerDrag,
    /// Re-mirroring without a drag delta, e.g. when a gesture ends.
    Programmatic,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    Transform(TransformTrigger),
    VertexEdit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    Applied,
    /// Another sync was already running.
    Suppressed,
    /// The change does not apply in the source's current mode.
    Skipped,
}

impl EditorSession {
    /// Propagates a change of `source` to the other three members of its
    /// group.
    pub fn sync_from_source(
        &mut self,
        source: PolygonId,
        change: ChangeKind,
    ) -> Result<SyncOutcome, EditorError> {
        let Some(_guard) = self.sync_lock.try_acquire() else {
            log::trace!("sync from {source} suppressed, another sync is running");
            return Ok(SyncOutcome::Suppressed);
        };
        let layout = self.config.layout;
        let margin = self.config.sync_margin;
        let group = self
            .group_mut(source.group)
            .ok_or(EditorError::MissingGroup(source.group))?;
        let outcome = match change {
            ChangeKind::Transform(trigger) => {
                mirror_transform(group, source.quadrant, trigger, &layout, margin)
            }
            ChangeKind::VertexEdit => mirror_vertices(group, source.quadrant, &layout, margin),
        };
        if outcome == SyncOutcome::Applied {
            for quadrant in Quadrant::ALL.into_iter().filter(|q| *q != source.quadrant) {
                self.shape_changed(
                    PolygonId {
                        group: source.group,
                        quadrant,
                    },
                    change,
                );
            }
        }
        Ok(outcome)
    }

    /// Entry point for "this polygon changed" notifications, including the
    /// ones raised for siblings while a sync is running.
    pub fn shape_changed(&mut self, id: PolygonId, change: ChangeKind) {
        match self.sync_from_source(id, change) {
            Ok(_) => {}
            Err(EditorError::MissingGroup(group)) => {
                log::debug!("change notification for {id} ignored, {group} is gone");
            }
            Err(err) => log::warn!("sync from {id} failed: {err}"),
        }
    }
}

fn mirror_transform(
    group: &mut Group,
    source: Quadrant,
    trigger: TransformTrigger,
    layout: &CanvasLayout,
    margin: f32,
) -> SyncOutcome {
    let src = group.member(source);
    if src.is_editing() {
        return SyncOutcome::Skipped;
    }
    let transform = src.transform;
    let frame = src.frame;
    let drag = trigger == TransformTrigger::PointerDrag;
    let delta = if drag {
        transform.position - src.last_position
    } else {
        Point::ZERO
    };
    let normalized = layout.normalize(&src.points, source);

    for member in group.members.iter_mut().filter(|m| m.quadrant() != source) {
        let quadrant = member.quadrant();
        let bounds = layout.bounds(quadrant);
        if !delta.is_zero() {
            let moved = member.bounding_box().translate(delta);
            member.transform.position =
                member.transform.position + delta + contain_offset(moved, bounds);
        }
        member.points = layout.denormalize(&normalized, quadrant);
        member.frame = RectF {
            min: layout.translate_between(frame.min, source, quadrant),
            max: layout.translate_between(frame.max, source, quadrant),
        };
        member.transform.scale_x = transform.scale_x;
        member.transform.scale_y = transform.scale_y;
        member.transform.rotation = transform.rotation;

        let overflow = contain_offset(member.bounding_box(), bounds);
        if !overflow.is_zero() {
            member.transform.position = member.transform.position + overflow;
        }
        member.points = clamp_outline(member, bounds, margin);
        if drag {
            member.last_position = member.transform.position;
        }
    }
    if drag {
        group.member_mut(source).last_position = transform.position;
    }
    SyncOutcome::Applied
}

fn mirror_vertices(
    group: &mut Group,
    source: Quadrant,
    layout: &CanvasLayout,
    margin: f32,
) -> SyncOutcome {
    let src = group.member(source);
    if !src.is_editing() {
        return SyncOutcome::Skipped;
    }
    let normalized = layout.normalize(&src.points, source);

    for member in group.members.iter_mut() {
        if let Some(baseline) = member.edit {
            member.transform = baseline.transform;
        }
        let quadrant = member.quadrant();
        if quadrant != source {
            member.points = layout.denormalize(&normalized, quadrant);
            member.points = clamp_outline(member, layout.bounds(quadrant), margin);
        }
    }
    SyncOutcome::Applied
}

/// Clamps the vertices by where they land on the canvas. The bound is in
/// canvas space, so a scaled or rotated member cannot be clamped on its
/// design-frame points directly.
fn clamp_outline(member: &Polygon, bounds: QuadrantBounds, margin: f32) -> Vec<Point> {
    member
        .points
        .iter()
        .map(|&p| {
            let world = member.world_point(p);
            let clamped = clamp_point(world, bounds, margin);
            if clamped == world {
                p
            } else {
                member.local_point(clamped)
            }
        })
        .collect()
}
