use crate::editor::geometry::CanvasLayout;
use crate::editor::EditorSession;
use crate::model;
use eframe::egui;

mod actions;
mod help;
mod interaction;
mod render;
mod settings;
mod update;

/// Empty space kept around the canvas inside the central panel.
const CANVAS_MARGIN: f32 = 12.0;

/// Canvas placement inside the central panel. The canvas is shown 1:1 unless
/// the panel is too small, in which case it is scaled down to fit.
#[derive(Clone, Copy, Debug)]
struct View {
    offset: egui::Vec2,
    zoom: f32,
}

impl Default for View {
    fn default() -> Self {
        Self {
            offset: egui::vec2(CANVAS_MARGIN, CANVAS_MARGIN),
            zoom: 1.0,
        }
    }
}

impl View {
    fn fit(panel: egui::Rect, layout: &CanvasLayout) -> Self {
        let avail = panel.size() - egui::vec2(CANVAS_MARGIN, CANVAS_MARGIN) * 2.0;
        let zoom = (avail.x / layout.width)
            .min(avail.y / layout.height)
            .clamp(0.1, 1.0);
        Self {
            zoom,
            ..Self::default()
        }
    }

    fn world_to_screen(&self, origin: egui::Pos2, world: model::Point) -> egui::Pos2 {
        origin + self.offset + world.to_pos2().to_vec2() * self.zoom
    }

    fn screen_to_world(&self, origin: egui::Pos2, screen: egui::Pos2) -> model::Point {
        model::Point::from_pos2(((screen - origin - self.offset) / self.zoom).to_pos2())
    }

    fn canvas_rect(&self, origin: egui::Pos2, layout: &CanvasLayout) -> egui::Rect {
        egui::Rect::from_min_size(
            origin + self.offset,
            egui::vec2(layout.width, layout.height) * self.zoom,
        )
    }
}

/// Background picture, uploaded once and drawn scaled to the canvas width.
struct Background {
    texture: egui::TextureHandle,
    path: String,
    display_size: egui::Vec2,
}

pub struct MaskEditorApp {
    session: EditorSession,
    settings: settings::AppSettings,
    settings_path: String,
    background: Option<Background>,
    view: View,
    status: Option<String>,
    /// True while a primary-button gesture that started on the canvas is
    /// still held.
    canvas_gesture: bool,
    pointer_inside: bool,
    show_help: bool,
    pending_save: settings::PendingSave,
}

impl MaskEditorApp {
    fn config_path() -> Option<String> {
        if let Some(home) = std::env::var_os("HOME") {
            let path = std::path::PathBuf::from(home)
                .join(".config")
                .join("quadmask.toml");
            if path.exists() {
                return Some(path.display().to_string());
            }
        }
        if std::path::Path::new("quadmask.toml").exists() {
            return Some("quadmask.toml".to_string());
        }
        None
    }

    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings_path = Self::config_path().unwrap_or_else(|| "quadmask.toml".to_string());
        let mut status = None;
        let settings = match settings::load_settings(&settings_path)
            .or_else(|_| settings::load_settings("settings.json"))
        {
            Ok(settings) => {
                log::info!("settings loaded from {settings_path}");
                settings
            }
            Err(settings::SettingsError::Read { path, .. }) => {
                log::debug!("no settings at {path}, using defaults");
                settings::AppSettings::default()
            }
            Err(err) => {
                log::warn!("{err}");
                status = Some(format!("Settings ignored: {err}"));
                settings::AppSettings::default()
            }
        };

        let mut app = Self {
            session: EditorSession::new(settings.editor_config()),
            settings,
            settings_path,
            background: None,
            view: View::default(),
            status,
            canvas_gesture: false,
            pointer_inside: false,
            show_help: false,
            pending_save: settings::PendingSave::default(),
        };
        if let Some(path) = app.settings.background_image.clone() {
            app.load_background(&cc.egui_ctx, &path);
        }
        app
    }
}
