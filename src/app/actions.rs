use eframe::egui;
use thiserror::Error;

use crate::model::GroupId;

use super::{settings, Background, MaskEditorApp};

#[derive(Debug, Error)]
pub(super) enum BackgroundError {
    #[error("could not load {path}: {source}")]
    Decode {
        path: String,
        source: image::ImageError,
    },
    #[error("{path} has no pixels")]
    Empty { path: String },
}

/// Decodes an image file into an egui-ready RGBA buffer.
fn decode_background(path: &str) -> Result<egui::ColorImage, BackgroundError> {
    let rgba = image::open(path)
        .map_err(|source| BackgroundError::Decode {
            path: path.to_string(),
            source,
        })?
        .to_rgba8();
    let (w, h) = rgba.dimensions();
    if w == 0 || h == 0 {
        return Err(BackgroundError::Empty {
            path: path.to_string(),
        });
    }
    Ok(egui::ColorImage::from_rgba_unmultiplied(
        [w as usize, h as usize],
        rgba.as_raw(),
    ))
}

/// Image size once stretched to the canvas width, aspect ratio kept.
fn fit_to_width(size: [usize; 2], canvas_width: f32) -> egui::Vec2 {
    let scale = canvas_width / size[0] as f32;
    egui::vec2(canvas_width, size[1] as f32 * scale)
}

impl MaskEditorApp {
    pub(super) fn load_background(&mut self, ctx: &egui::Context, path: &str) {
        match decode_background(path) {
            Ok(image) => {
                let display_size = fit_to_width(image.size, self.session.config().layout.width);
                let texture = ctx.load_texture("background", image, egui::TextureOptions::LINEAR);
                log::info!("background loaded from {path}");
                self.background = Some(Background {
                    texture,
                    path: path.to_string(),
                    display_size,
                });
                self.status = Some(format!("Background: {path}"));
            }
            Err(err) => {
                log::warn!("{err}");
                self.status = Some(format!("Background failed: {err}"));
            }
        }
    }

    pub(super) fn open_background_dialog(&mut self, ctx: &egui::Context) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG image", &["png"])
            .pick_file()
        {
            let path = path.display().to_string();
            self.load_background(ctx, &path);
            if self.background.as_ref().is_some_and(|b| b.path == path) {
                self.settings.background_image = Some(path);
                self.persist_settings();
            }
        }
    }

    pub(super) fn clear_background(&mut self) {
        self.background = None;
        self.settings.background_image = None;
        self.persist_settings();
        self.status = Some("Background cleared".to_string());
    }

    pub(super) fn persist_settings(&mut self) {
        if let Err(e) = settings::save_settings(&self.settings_path, &self.settings) {
            log::warn!("{e}");
            self.status = Some(format!("Settings save failed: {e}"));
        }
    }

    pub(super) fn reload_settings(&mut self, ctx: &egui::Context) {
        let settings = match settings::load_settings(&self.settings_path)
            .or_else(|_| settings::load_settings("settings.json"))
        {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("{e}");
                self.status = Some(format!("Settings reload failed: {e}"));
                return;
            }
        };
        self.session.set_config(settings.editor_config());
        let background_changed = settings.background_image
            != self.background.as_ref().map(|b| b.path.clone());
        self.settings = settings;
        self.status = Some("Settings reloaded".to_string());
        if background_changed {
            match self.settings.background_image.clone() {
                Some(path) => self.load_background(ctx, &path),
                None => self.background = None,
            }
        }
    }

    pub(super) fn toggle_drawing(&mut self) {
        if self.session.drawing().is_active() {
            self.session.cancel_drawing();
            self.status = Some("Drawing cancelled".to_string());
        } else {
            self.session.begin_drawing();
            self.status = Some("Click inside a quadrant to place vertices".to_string());
        }
    }

    pub(super) fn finish_polygon(&mut self) {
        if !self.session.drawing().is_active() {
            return;
        }
        self.status = Some(match self.session.finish_drawing() {
            Some(group) => format!("Created {group}"),
            None => "A mask needs at least three vertices".to_string(),
        });
    }

    /// Escape: leave drawing mode first, then edit mode, then drop the
    /// selection.
    pub(super) fn cancel_current(&mut self) {
        if self.session.drawing().is_active() {
            self.session.cancel_drawing();
            self.status = Some("Drawing cancelled".to_string());
        } else if let Some(group) = self.session.editing_group() {
            self.exit_edit_mode(group);
        } else {
            self.session.select(None);
        }
    }

    pub(super) fn toggle_edit_mode(&mut self, group: GroupId) {
        match self.session.toggle_edit_mode(group) {
            Ok(()) if self.session.editing_group() == Some(group) => {
                self.status = Some(format!("Editing vertices of {group}"));
            }
            Ok(()) => self.status = Some(format!("Finished editing {group}")),
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    pub(super) fn exit_edit_mode(&mut self, group: GroupId) {
        match self.session.exit_edit_mode(group) {
            Ok(()) => self.status = Some(format!("Finished editing {group}")),
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    pub(super) fn clear_masks(&mut self) {
        let count = self.session.groups().len();
        self.session.clear_all();
        self.status = Some(format!("Cleared {count} mask(s)"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn background_is_stretched_to_canvas_width() {
        assert_eq!(fit_to_width([400, 300], 800.0), egui::vec2(800.0, 600.0));
        assert_eq!(fit_to_width([1600, 1380], 800.0), egui::vec2(800.0, 690.0));
    }

    #[test]
    fn png_decodes_into_a_color_image() {
        let path = std::env::temp_dir().join(format!("quadmask-bg-{}.png", std::process::id()));
        image::RgbaImage::from_pixel(4, 2, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();
        let decoded = decode_background(&path.display().to_string()).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(decoded.size, [4, 2]);
        assert_eq!(decoded.pixels[0], egui::Color32::from_rgb(10, 20, 30));
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        let err = decode_background("/nonexistent/quadmask/background.png").unwrap_err();
        assert!(matches!(err, BackgroundError::Decode { .. }));
    }
}
