use crate::editor::error::EditorError;
use crate::model::{GroupId, PolygonId, Quadrant};
use eframe::egui;

use super::render::{
    draw_background, draw_drawing_preview, draw_handles, draw_masks, draw_quadrant_guides,
    style_editor,
};
use super::{settings, MaskEditorApp, View};

impl eframe::App for MaskEditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let wants_keyboard = ctx.wants_keyboard_input();
        let mut toggle_drawing = false;
        let mut finish = false;
        let mut cancel = false;
        ctx.input_mut(|i| {
            if i.consume_key(egui::Modifiers::NONE, egui::Key::F1) {
                self.show_help = !self.show_help;
            }
            if wants_keyboard {
                return;
            }
            toggle_drawing = i.consume_key(egui::Modifiers::NONE, egui::Key::D);
            finish = i.consume_key(egui::Modifiers::NONE, egui::Key::Enter);
            cancel = i.consume_key(egui::Modifiers::NONE, egui::Key::Escape);
        });
        if toggle_drawing {
            self.toggle_drawing();
        }
        if finish {
            self.finish_polygon();
        }
        if cancel {
            self.cancel_current();
        }

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Background…").clicked() {
                        self.open_background_dialog(ctx);
                        ui.close_menu();
                    }
                    if ui
                        .add_enabled(self.background.is_some(), egui::Button::new("Clear Background"))
                        .clicked()
                    {
                        self.clear_background();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Reload Settings").clicked() {
                        self.reload_settings(ctx);
                        ui.close_menu();
                    }
                    if ui.button("Save Settings").clicked() {
                        self.status = Some(
                            match settings::save_settings(&self.settings_path, &self.settings) {
                                Ok(()) => format!("Settings saved to {}", self.settings_path),
                                Err(e) => format!("Settings save failed: {e}"),
                            },
                        );
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
                ui.menu_button("Mask", |ui| {
                    let drawing = self.session.drawing().is_active();
                    let label = if drawing { "Cancel Drawing (D)" } else { "Draw Mask (D)" };
                    if ui.button(label).clicked() {
                        self.toggle_drawing();
                        ui.close_menu();
                    }
                    if ui
                        .add_enabled(drawing, egui::Button::new("Finish Polygon (Enter)"))
                        .clicked()
                    {
                        self.finish_polygon();
                        ui.close_menu();
                    }
                    if let Some(group) = self.session.editing_group() {
                        if ui.button("Exit Edit Mode (Esc)").clicked() {
                            self.exit_edit_mode(group);
                            ui.close_menu();
                        }
                    }
                    ui.separator();
                    if ui
                        .add_enabled(!self.session.groups().is_empty(), egui::Button::new("Clear All"))
                        .clicked()
                    {
                        self.clear_masks();
                        ui.close_menu();
                    }
                });
                ui.menu_button("Help", |ui| {
                    if ui.button("Show Help (F1)").clicked() {
                        self.show_help = true;
                        ui.close_menu();
                    }
                });
                ui.separator();
                let drawing = self.session.drawing().is_active();
                if ui
                    .selectable_label(drawing, if drawing { "Cancel Drawing" } else { "Draw Mask" })
                    .clicked()
                {
                    self.toggle_drawing();
                }
                if drawing && self.session.drawing().points().len() >= 3 && ui.button("Finish").clicked() {
                    self.finish_polygon();
                }
            });
        });

        egui::SidePanel::right("right_panel")
            .resizable(true)
            .min_width(220.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.masks_panel(ui);
                    ui.separator();
                    self.selection_panel(ui);
                    ui.separator();
                    self.settings_panel(ui);
                });
            });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(status) = &self.status {
                    ui.label(status);
                } else {
                    ui.label("Ready");
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(self.mode_label());
                    ui.separator();
                    ui.label(format!("Masks: {}", self.session.groups().len()));
                    ui.separator();
                    ui.label(format!("Zoom: {:.0}%", self.view.zoom * 100.0));
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let (rect, response) =
                ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
            let origin = rect.min;
            let layout = self.session.config().layout;
            self.view = View::fit(rect, &layout);
            let view = self.view;

            self.handle_canvas_pointer(ctx, &response, origin, &view);

            let painter = ui.painter_at(rect);
            let canvas = view.canvas_rect(origin, &layout);
            draw_background(&painter, rect, canvas, self.background.as_ref(), &view);
            draw_quadrant_guides(&painter, origin, &view, &layout);
            let style = self.settings.style;
            draw_masks(&painter, origin, &view, &self.session, &style);
            draw_handles(&painter, origin, &view, &self.session, &style);
            draw_drawing_preview(&painter, origin, &view, &self.session, &style);
        });

        super::help::draw_help_window(ctx, &mut self.show_help);

        let settled = !ctx.input(|i| i.pointer.any_down()) && !ctx.wants_keyboard_input();
        if self.pending_save.take_if_settled(settled) {
            self.persist_settings();
        }
    }
}

impl MaskEditorApp {
    fn mode_label(&self) -> String {
        if let Some(quadrant) = self.session.drawing().active_quadrant() {
            format!("Drawing in {}", quadrant.label())
        } else if self.session.drawing().is_active() {
            "Drawing".to_string()
        } else if let Some(group) = self.session.editing_group() {
            format!("Editing {group}")
        } else {
            "Select".to_string()
        }
    }

    fn masks_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Masks");
        if self.session.groups().is_empty() {
            ui.label("No masks yet. Press D to draw one.");
            return;
        }
        let selected_group = self.session.selected().map(|id| id.group);
        let editing = self.session.editing_group();
        let rows: Vec<GroupId> = self.session.groups().iter().map(|g| g.id).collect();
        for group in rows {
            ui.horizontal(|ui| {
                let label = format!("Mask {}", group.0);
                if ui.selectable_label(selected_group == Some(group), label).clicked() {
                    self.session.select(Some(PolygonId {
                        group,
                        quadrant: Quadrant::TopLeft,
                    }));
                }
                let edit_label = if editing == Some(group) { "Done" } else { "Edit" };
                if ui.small_button(edit_label).clicked() {
                    self.toggle_edit_mode(group);
                }
            });
        }
    }

    fn selection_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Selection");
        let Some(id) = self.session.selected() else {
            ui.label("Nothing selected");
            return;
        };
        let Some(polygon) = self.session.polygon(id) else {
            return;
        };
        let transform = polygon.transform;
        let editing = polygon.is_editing();
        let vertices = if polygon.is_closed() {
            polygon.points.len().saturating_sub(1)
        } else {
            polygon.points.len()
        };
        ui.label(format!("{id}"));
        ui.label(format!("Vertices: {vertices}"));
        ui.label(format!(
            "Position: {:.1}, {:.1}",
            transform.position.x, transform.position.y
        ));

        let mut scale_x = transform.scale_x;
        let mut scale_y = transform.scale_y;
        let mut degrees = transform.rotation.to_degrees();
        ui.add_enabled_ui(!editing, |ui| {
            let mut scale_changed = false;
            ui.horizontal(|ui| {
                ui.label("Scale");
                scale_changed |= ui
                    .add(egui::DragValue::new(&mut scale_x).speed(0.01).range(0.05..=20.0))
                    .changed();
                scale_changed |= ui
                    .add(egui::DragValue::new(&mut scale_y).speed(0.01).range(0.05..=20.0))
                    .changed();
            });
            if scale_changed {
                let result = self.session.scale_polygon(id, scale_x, scale_y);
                self.report(result);
            }
            ui.horizontal(|ui| {
                ui.label("Rotation");
                if ui
                    .add(egui::DragValue::new(&mut degrees).speed(1.0).suffix("°"))
                    .changed()
                {
                    let result = self.session.rotate_polygon(id, degrees.to_radians());
                    self.report(result);
                }
            });
        });
        if editing {
            ui.small("Leave edit mode to move, scale or rotate.");
        }
    }

    fn settings_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Style");
        if style_editor(ui, &mut self.settings.style) {
            self.pending_save.mark();
        }

        ui.separator();
        ui.heading("Editing");
        let mut changed = false;
        changed |= ui
            .add(
                egui::Slider::new(&mut self.settings.closure_threshold, 2.0..=40.0)
                    .text("Close distance"),
            )
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut self.settings.sync_margin, 0.0..=5.0).text("Edge margin"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut self.settings.handle_size, 6.0..=24.0).text("Handle size"))
            .changed();
        if changed {
            self.session.set_config(self.settings.editor_config());
            self.pending_save.mark();
        }
    }

    fn report<T>(&mut self, result: Result<T, EditorError>) {
        if let Err(e) = result {
            log::debug!("{e}");
            self.status = Some(e.to_string());
        }
    }
}
