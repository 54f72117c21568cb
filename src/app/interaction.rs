use crate::editor::transform::Interaction;
use crate::editor::Hit;
use crate::model;
use eframe::egui;

use super::{MaskEditorApp, View};

struct PointerFrame {
    pressed: bool,
    down: bool,
    released: bool,
    moving: bool,
    gone: bool,
    latest: Option<egui::Pos2>,
}

impl MaskEditorApp {
    /// Feeds this frame's pointer state on the canvas to the editor session.
    pub(super) fn handle_canvas_pointer(
        &mut self,
        ctx: &egui::Context,
        response: &egui::Response,
        origin: egui::Pos2,
        view: &View,
    ) {
        let frame = ctx.input(|i| PointerFrame {
            pressed: i.pointer.primary_pressed(),
            down: i.pointer.primary_down(),
            released: i.pointer.primary_released(),
            moving: i.pointer.is_moving(),
            gone: i
                .events
                .iter()
                .any(|e| matches!(e, egui::Event::PointerGone)),
            latest: i.pointer.latest_pos(),
        });
        let groups_before = self.session.groups().len();

        if frame.gone {
            if self.pointer_inside {
                self.session.pointer_left();
            }
            self.pointer_inside = false;
        }
        let Some(screen) = frame.latest else {
            return;
        };
        let world = view.screen_to_world(origin, screen);

        if !frame.gone && !self.pointer_inside {
            self.pointer_inside = true;
            if let Some(clamped) = self.session.pointer_entered(world) {
                log::debug!("pointer re-entered, scale resumed at {clamped:?}");
            }
        }

        if frame.pressed && response.hovered() {
            self.canvas_gesture = true;
            self.session.pointer_down(world);
        } else if self.canvas_gesture && frame.down {
            if frame.moving {
                self.session.pointer_drag(world);
            }
        } else if self.canvas_gesture && (frame.released || !frame.down) {
            // a release outside the window is never reported; treat the
            // button coming back up as the end of the gesture
            self.canvas_gesture = false;
            self.session.pointer_up(world);
        } else if response.hovered() && frame.moving {
            self.session.pointer_move(world);
        }

        if response.double_clicked() {
            self.session.double_click(world);
        }

        if self.session.groups().len() > groups_before {
            if let Some(group) = self.session.groups().last() {
                self.status = Some(format!("Created {}", group.id));
            }
        }

        if response.hovered() || self.canvas_gesture {
            ctx.set_cursor_icon(self.cursor_for(world));
        }
    }

    fn cursor_for(&self, world: model::Point) -> egui::CursorIcon {
        match self.session.interaction() {
            Some(Interaction::Move { .. }) | Some(Interaction::Rotate { .. }) => {
                return egui::CursorIcon::Grabbing;
            }
            Some(Interaction::Scale(drag)) => return resize_cursor(drag.corner.cursor_is_nw_se()),
            Some(Interaction::DragVertex(_)) => return egui::CursorIcon::Crosshair,
            None => {}
        }
        match self.session.hit_test(world) {
            Some(Hit::DrawingPreview) | Some(Hit::VertexHandle(_)) => {
                egui::CursorIcon::PointingHand
            }
            Some(Hit::ScaleHandle(_, corner)) => resize_cursor(corner.cursor_is_nw_se()),
            Some(Hit::RotateHandle(_)) => egui::CursorIcon::Grab,
            Some(Hit::Polygon(id)) if self.session.editing_group() == Some(id.group) => {
                egui::CursorIcon::Default
            }
            Some(Hit::Polygon(_)) => egui::CursorIcon::Move,
            None if self.session.drawing().is_active() => egui::CursorIcon::Crosshair,
            None => egui::CursorIcon::Default,
        }
    }
}

fn resize_cursor(nw_se: bool) -> egui::CursorIcon {
    if nw_se {
        egui::CursorIcon::ResizeNwSe
    } else {
        egui::CursorIcon::ResizeNeSw
    }
}
