use crate::model::{Point, Quadrant};

use super::error::EditorError;
use super::geometry::{clamp_point, CanvasLayout};

/// Clicks closer than this to the previous vertex are dropped, which keeps a
/// double-click from stacking two vertices on the same spot.
const DUPLICATE_TOLERANCE: f32 = 1.0;

#[derive(Clone, Debug, Default, PartialEq)]
pub enum DrawingState {
    #[default]
    Off,
    /// Armed, waiting for the first click.
    Idle,
    Drawing {
        quadrant: Quadrant,
        points: Vec<Point>,
        cursor: Option<Point>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawingStep {
    Started(Quadrant),
    Appended(usize),
    /// The click landed on the first vertex; the outline should be committed.
    Closed,
    Ignored,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FinishedPolygon {
    pub vertices: Vec<Point>,
    pub quadrant: Quadrant,
}

/// Click-by-click outline capture confined to one quadrant.
#[derive(Clone, Debug, Default)]
pub struct DrawingSession {
    state: DrawingState,
}

impl DrawingSession {
    pub fn enter(&mut self) {
        self.state = DrawingState::Idle;
    }

    pub fn cancel(&mut self) {
        self.state = DrawingState::Off;
    }

    pub fn is_active(&self) -> bool {
        self.state != DrawingState::Off
    }

    pub fn points(&self) -> &[Point] {
        match &self.state {
            DrawingState::Drawing { points, .. } => points,
            _ => &[],
        }
    }

    pub fn active_quadrant(&self) -> Option<Quadrant> {
        match &self.state {
            DrawingState::Drawing { quadrant, .. } => Some(*quadrant),
            _ => None,
        }
    }

    pub fn cursor(&self) -> Option<Point> {
        match &self.state {
            DrawingState::Drawing { cursor, .. } => *cursor,
            _ => None,
        }
    }

    pub fn pointer_down(
        &mut self,
        p: Point,
        layout: &CanvasLayout,
        closure_threshold: f32,
    ) -> DrawingStep {
        if self.state == DrawingState::Idle {
            let quadrant = layout.classify(p);
            let first = clamp_point(p, layout.bounds(quadrant), 0.0);
            self.state = DrawingState::Drawing {
                quadrant,
                points: vec![first],
                cursor: None,
            };
            return DrawingStep::Started(quadrant);
        }
        match &mut self.state {
            DrawingState::Off | DrawingState::Idle => DrawingStep::Ignored,
            DrawingState::Drawing {
                quadrant, points, ..
            } => {
                let p = clamp_point(p, layout.bounds(*quadrant), 0.0);
                if points.len() > 2 && points[0].distance(p) < closure_threshold {
                    return DrawingStep::Closed;
                }
                if points
                    .last()
                    .is_some_and(|last| last.distance(p) < DUPLICATE_TOLERANCE)
                {
                    return DrawingStep::Ignored;
                }
                points.push(p);
                DrawingStep::Appended(points.len())
            }
        }
    }

    pub fn pointer_move(&mut self, p: Point, layout: &CanvasLayout) {
        if let DrawingState::Drawing {
            quadrant, cursor, ..
        } = &mut self.state
        {
            *cursor = Some(clamp_point(p, layout.bounds(*quadrant), 0.0));
        }
    }

    /// Ends the session. The outline is closed by repeating the first vertex
    /// unless the last one already sits within `closure_threshold` of it.
    pub fn finish(&mut self, closure_threshold: f32) -> Result<FinishedPolygon, EditorError> {
        let DrawingState::Drawing {
            quadrant,
            mut points,
            ..
        } = std::mem::take(&mut self.state)
        else {
            return Err(EditorError::TooFewVertices(0));
        };
        if points.len() < 3 {
            return Err(EditorError::TooFewVertices(points.len()));
        }
        let first = points[0];
        if points
            .last()
            .is_some_and(|last| last.distance(first) >= closure_threshold)
        {
            points.push(first);
        }
        Ok(FinishedPolygon {
            vertices: points,
            quadrant,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn click_all(session: &mut DrawingSession, clicks: &[(f32, f32)]) -> Vec<DrawingStep> {
        let layout = CanvasLayout::default();
        clicks
            .iter()
            .map(|&(x, y)| session.pointer_down(Point::new(x, y), &layout, 10.0))
            .collect()
    }

    #[test]
    fn clicks_are_ignored_until_armed() {
        let mut session = DrawingSession::default();
        assert_eq!(click_all(&mut session, &[(10.0, 10.0)]), vec![DrawingStep::Ignored]);
        assert!(!session.is_active());
    }

    #[test]
    fn click_near_first_vertex_closes_the_outline() {
        let mut session = DrawingSession::default();
        session.enter();
        let steps = click_all(
            &mut session,
            &[(10.0, 10.0), (100.0, 10.0), (100.0, 100.0), (12.0, 12.0)],
        );
        assert_eq!(
            steps,
            vec![
                DrawingStep::Started(Quadrant::TopLeft),
                DrawingStep::Appended(2),
                DrawingStep::Appended(3),
                DrawingStep::Closed,
            ]
        );
        assert_eq!(session.points().len(), 3);

        let finished = session.finish(10.0).unwrap();
        assert_eq!(finished.quadrant, Quadrant::TopLeft);
        assert_eq!(
            finished.vertices,
            vec![
                Point::new(10.0, 10.0),
                Point::new(100.0, 10.0),
                Point::new(100.0, 100.0),
                Point::new(10.0, 10.0),
            ]
        );
        assert!(!session.is_active());
    }

    #[test]
    fn closure_needs_three_vertices() {
        let mut session = DrawingSession::default();
        session.enter();
        let steps = click_all(&mut session, &[(10.0, 10.0), (100.0, 10.0), (14.0, 12.0)]);
        assert_eq!(steps[2], DrawingStep::Appended(3));
    }

    #[test]
    fn points_are_clamped_into_the_first_quadrant() {
        let mut session = DrawingSession::default();
        session.enter();
        click_all(&mut session, &[(420.0, 20.0), (300.0, 500.0)]);
        assert_eq!(session.active_quadrant(), Some(Quadrant::TopRight));
        assert_eq!(session.points()[1], Point::new(400.0, 345.0));

        session.pointer_move(Point::new(900.0, 10.0), &CanvasLayout::default());
        assert_eq!(session.cursor(), Some(Point::new(800.0, 10.0)));
    }

    #[test]
    fn repeated_click_does_not_add_a_vertex() {
        let mut session = DrawingSession::default();
        session.enter();
        let steps = click_all(&mut session, &[(10.0, 10.0), (80.0, 40.0), (80.2, 40.0)]);
        assert_eq!(steps[2], DrawingStep::Ignored);
        assert_eq!(session.points().len(), 2);
    }

    #[test]
    fn finishing_with_two_points_aborts() {
        let mut session = DrawingSession::default();
        session.enter();
        click_all(&mut session, &[(10.0, 10.0), (100.0, 10.0)]);
        assert_eq!(session.finish(10.0), Err(EditorError::TooFewVertices(2)));
        assert!(!session.is_active());
    }

    #[test]
    fn finish_keeps_an_already_closed_outline() {
        let mut session = DrawingSession::default();
        session.enter();
        click_all(&mut session, &[(10.0, 10.0), (100.0, 10.0), (100.0, 100.0)]);
        let finished = session.finish(200.0).unwrap();
        assert_eq!(finished.vertices.len(), 3);
    }

    #[test]
    fn cancel_discards_the_buffer() {
        let mut session = DrawingSession::default();
        session.enter();
        click_all(&mut session, &[(10.0, 10.0), (100.0, 10.0)]);
        session.cancel();
        assert!(!session.is_active());
        assert!(session.points().is_empty());
        assert_eq!(session.cursor(), None);
    }
}
