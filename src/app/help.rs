use eframe::egui;

pub(super) fn draw_help_window(ctx: &egui::Context, open: &mut bool) {
    egui::Window::new("Help")
        .open(open)
        .resizable(true)
        .default_width(520.0)
        .default_height(420.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("Keyboard Shortcuts");
                ui.separator();
                help_row(ui, "D", "Start or cancel drawing a mask");
                help_row(ui, "Enter", "Finish the outline being drawn");
                help_row(ui, "Escape", "Cancel drawing / leave edit mode / deselect");
                help_row(ui, "F1", "Toggle this window");

                ui.add_space(10.0);
                ui.heading("Drawing");
                ui.separator();
                ui.label("• Click inside any quadrant to place vertices. Points stay in the quadrant of the first click.");
                ui.label("• Click near the first vertex, double-click a marker or press Enter to close the outline.");
                ui.label("• The finished mask is copied into all four quadrants.");

                ui.add_space(10.0);
                ui.heading("Editing");
                ui.separator();
                help_row(ui, "Drag", "Move a mask; its copies follow");
                help_row(ui, "Corner handle", "Scale about the opposite corner");
                help_row(ui, "Round handle", "Rotate about the centre");
                help_row(ui, "Double-click", "Enter or leave vertex edit mode");
                help_row(ui, "Empty click", "Leave vertex edit mode");
                ui.label("Every copy is kept inside its own quadrant.");

                ui.add_space(10.0);
                ui.heading("Settings");
                ui.separator();
                ui.label("Settings are read from ~/.config/quadmask.toml or ./quadmask.toml:");
                ui.add_space(5.0);
                ui.code(
                    r##"closure_threshold = 10.0
sync_margin = 0.5
handle_size = 12.0
background_image = "frame.png"

[style]
stroke_width = 2.0
preview_dash = [5.0, 5.0]
fill = { r = 0, g = 0, b = 255, a = 77 }"##,
                );
                ui.add_space(5.0);
                ui.label("Set QUADMASK_LOG=debug to see what the editor is doing.");
            });
        });
}

fn help_row(ui: &mut egui::Ui, shortcut: &str, description: &str) {
    ui.horizontal(|ui| {
        ui.add_sized(
            [110.0, 16.0],
            egui::Label::new(egui::RichText::new(shortcut).monospace().strong()),
        );
        ui.label(description);
    });
}
