use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings for the demo host window.
/// Stored in the platform config directory (`$XDG_CONFIG_HOME/snowfall-loader/` or `%APPDATA%\snowfall-loader\`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Image drawn in the middle of the progress ring.
    pub logo_path: PathBuf,
    /// Seed for the snow. `None` seeds from the OS on every launch.
    pub seed: Option<u64>,
    /// Initial window size in logical pixels.
    pub window_width: f64,
    pub window_height: f64,
    /// Upper bound on a single frame's delta in seconds, so the snow does not
    /// jump after the window was stalled or minimised.
    pub max_frame_dt: f32,
    /// Framebuffer clear colour behind the overlay (RGB, 0.0–1.0).
    pub clear_color: [f32; 3],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logo_path: PathBuf::from(crate::logo::DEFAULT_LOGO_PATH),
            seed: None,
            window_width: 1024.0,
            window_height: 768.0,
            max_frame_dt: 0.1,
            clear_color: [0.02, 0.03, 0.06],
        }
    }
}

impl Config {
    /// Load config from the platform config directory, or return defaults.
    pub fn load() -> Self {
        let path = config_path();
        match std::fs::read_to_string(&path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                log::warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                Self::default()
            }),
            Err(_) => {
                log::info!(
                    "No config file at {}, using defaults. Creating default config.",
                    path.display()
                );
                let config = Self::default();
                config.save();
                config
            }
        }
    }

    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str(contents)
    }

    /// Save current config to `config.json`.
    pub fn save(&self) {
        let path = config_path();
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    log::warn!("Failed to write config to {}: {}", path.display(), e);
                }
            }
            Err(e) => {
                log::warn!("Failed to serialize config: {}", e);
            }
        }
    }

    /// Clamp a measured frame delta into `[0, max_frame_dt]`.
    pub fn frame_dt(&self, measured: f32) -> f32 {
        measured.clamp(0.0, self.max_frame_dt.max(0.0))
    }
}

fn config_path() -> PathBuf {
    let dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("snowfall-loader");
    if !dir.exists() {
        std::fs::create_dir_all(&dir).ok();
    }
    dir.join("config.json")
}
