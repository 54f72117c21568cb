mod app;
mod editor;
mod logger;
mod model;

fn main() -> eframe::Result<()> {
    logger::init();
    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1140.0, 820.0])
            .with_title("Quadrant Mask Editor"),
        ..Default::default()
    };
    eframe::run_native(
        "Quadrant Mask Editor",
        native_options,
        Box::new(|cc| Ok(Box::new(app::MaskEditorApp::new(cc)))),
    )
}
