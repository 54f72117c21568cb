use crate::editor::geometry::CanvasLayout;
use crate::editor::EditorConfig;
use crate::model;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub(super) enum SettingsError {
    #[error("could not read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid settings in {path}: {reason}")]
    Parse { path: String, reason: String },
    #[error("could not encode settings: {0}")]
    Encode(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(super) struct AppSettings {
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub quadrant_width: f32,
    pub quadrant_height: f32,
    pub closure_threshold: f32,
    pub sync_margin: f32,
    pub handle_size: f32,
    pub background_image: Option<String>,
    pub style: model::MaskStyle,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            canvas_width: 800.0,
            canvas_height: 690.0,
            quadrant_width: 400.0,
            quadrant_height: 345.0,
            closure_threshold: 10.0,
            sync_margin: 0.5,
            handle_size: 12.0,
            background_image: None,
            style: model::MaskStyle::default(),
        }
    }
}

impl AppSettings {
    /// Canvas geometry and thresholds for the editor core. Quadrant sizes are
    /// kept inside the canvas.
    pub fn editor_config(&self) -> EditorConfig {
        let width = self.canvas_width.max(2.0);
        let height = self.canvas_height.max(2.0);
        EditorConfig {
            layout: CanvasLayout {
                width,
                height,
                quadrant_width: self.quadrant_width.clamp(1.0, width - 1.0),
                quadrant_height: self.quadrant_height.clamp(1.0, height - 1.0),
            },
            closure_threshold: self.closure_threshold.max(0.0),
            sync_margin: self.sync_margin.max(0.0),
            handle_radius: (self.handle_size * 0.5).max(1.0),
        }
    }
}

fn parse(path: &str, text: &str) -> Result<AppSettings, SettingsError> {
    let parse_err = |reason: String| SettingsError::Parse {
        path: path.to_string(),
        reason,
    };
    if path.ends_with(".toml") {
        toml::from_str::<AppSettings>(text).or_else(|toml_err| {
            serde_json::from_str::<AppSettings>(text).map_err(|_| parse_err(toml_err.to_string()))
        })
    } else {
        serde_json::from_str::<AppSettings>(text).or_else(|json_err| {
            toml::from_str::<AppSettings>(text).map_err(|_| parse_err(json_err.to_string()))
        })
    }
}

pub(super) fn load_settings(path: &str) -> Result<AppSettings, SettingsError> {
    let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_string(),
        source,
    })?;
    parse(path, &text)
}

pub(super) fn save_settings(path: &str, settings: &AppSettings) -> Result<(), SettingsError> {
    let text = if path.ends_with(".toml") {
        toml::to_string_pretty(settings).map_err(|e| SettingsError::Encode(e.to_string()))?
    } else {
        serde_json::to_string_pretty(settings).map_err(|e| SettingsError::Encode(e.to_string()))?
    };
    std::fs::write(path, text).map_err(|source| SettingsError::Write {
        path: path.to_string(),
        source,
    })
}

/// Settings edited from the side panel but not yet written. Sliders and
/// colour pickers report a change on every frame of a drag, so the file is
/// written once the edit settles.
#[derive(Debug, Default)]
pub(super) struct PendingSave {
    dirty: bool,
}

impl PendingSave {
    pub(super) fn mark(&mut self) {
        self.dirty = true;
    }

    /// Returns true once per batch of edits, on the first settled frame.
    pub(super) fn take_if_settled(&mut self, settled: bool) -> bool {
        if self.dirty && settled {
            self.dirty = false;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let settings = parse(
            "quadmask.toml",
            "closure_threshold = 14.0\nbackground_image = \"frame.png\"\n",
        )
        .unwrap();
        assert_eq!(settings.closure_threshold, 14.0);
        assert_eq!(settings.background_image.as_deref(), Some("frame.png"));
        assert_eq!(settings.canvas_width, 800.0);
        assert_eq!(settings.style, model::MaskStyle::default());
    }

    #[test]
    fn json_settings_are_accepted() {
        let settings = parse("settings.json", r#"{"sync_margin": 0.0}"#).unwrap();
        assert_eq!(settings.sync_margin, 0.0);
        assert_eq!(settings.quadrant_height, 345.0);
    }

    #[test]
    fn toml_round_trip_keeps_style() {
        let mut settings = AppSettings::default();
        settings.style.fill = model::Rgba::new(255, 0, 0, 90);
        let text = toml::to_string_pretty(&settings).unwrap();
        assert_eq!(parse("quadmask.toml", &text).unwrap(), settings);
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let err = parse("quadmask.toml", "canvas_width = [").unwrap_err();
        assert!(matches!(err, SettingsError::Parse { .. }));
    }

    #[test]
    fn default_settings_match_the_default_editor_config() {
        assert_eq!(AppSettings::default().editor_config(), EditorConfig::default());
    }

    #[test]
    fn slider_drag_is_saved_once_on_release() {
        let mut pending = PendingSave::default();
        let mut writes = 0;
        for _ in 0..3 {
            pending.mark();
            writes += usize::from(pending.take_if_settled(false));
        }
        assert_eq!(writes, 0);
        for _ in 0..2 {
            writes += usize::from(pending.take_if_settled(true));
        }
        assert_eq!(writes, 1);
    }

    #[test]
    fn unchanged_settings_are_never_written() {
        let mut pending = PendingSave::default();
        assert!(!pending.take_if_settled(true));
        pending.mark();
        assert!(!pending.take_if_settled(false));
        assert!(pending.take_if_settled(true));
        assert!(!pending.take_if_settled(true));
    }

    #[test]
    fn quadrant_size_is_kept_inside_the_canvas() {
        let settings = AppSettings {
            quadrant_width: 5000.0,
            ..AppSettings::default()
        };
        assert_eq!(settings.editor_config().layout.quadrant_width, 799.0);
    }
}
