//! Game settings and preferences
//!
//! Persisted separately from the board save in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::consts::{ANIMATION_DURATION_MS, DEFAULT_WIDTH};
use crate::error::ConfigError;
use crate::puzzle::checked_width;

/// Board size presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BoardPreset {
    Small,
    #[default]
    Classic,
    Large,
}

impl BoardPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoardPreset::Small => "Small",
            BoardPreset::Classic => "Classic",
            BoardPreset::Large => "Large",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "small" | "8" => Some(BoardPreset::Small),
            "classic" | "15" => Some(BoardPreset::Classic),
            "large" | "24" => Some(BoardPreset::Large),
            _ => None,
        }
    }

    /// Board side length for this preset
    pub fn width(&self) -> usize {
        match self {
            BoardPreset::Small => 3,
            BoardPreset::Classic => 4,
            BoardPreset::Large => 5,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Board side length. Kept raw so a bad value can be reported and
    /// repaired when the board is built.
    pub width: f64,
    /// Slide speed: ms to cover the remaining distance at full rate
    pub animation_ms: f64,
    /// Fixed shuffle seed (random when absent)
    pub seed: Option<u64>,
    /// Highlight the tile under the pointer
    pub hover_highlight: bool,
    /// Continue an unfinished saved board on start
    pub resume_saved: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH as f64,
            animation_ms: ANIMATION_DURATION_MS,
            seed: None,
            hover_highlight: true,
            resume_saved: true,
        }
    }
}

impl Settings {
    /// Create settings from a board preset
    pub fn from_preset(preset: BoardPreset) -> Self {
        Self {
            width: preset.width() as f64,
            ..Self::default()
        }
    }

    /// Parse settings JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Repair out-of-range values, returning what was wrong
    pub fn sanitize(&mut self) -> Vec<ConfigError> {
        let mut problems = Vec::new();

        let (width, problem) = checked_width(self.width);
        if let Some(err) = problem {
            problems.push(err);
            self.width = width as f64;
        }

        if !(self.animation_ms.is_finite() && self.animation_ms > 0.0) {
            problems.push(ConfigError::AnimationDuration(self.animation_ms));
            self.animation_ms = ANIMATION_DURATION_MS;
        }

        problems
    }

    /// Shuffle seed, falling back to `entropy` when none is configured
    pub fn seed_or(&self, entropy: u64) -> u64 {
        self.seed.unwrap_or(entropy)
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "fifteen_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        if let Some(json) = crate::platform::web::storage_get(Self::STORAGE_KEY) {
            match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
                Err(err) => log::warn!("Ignoring stored settings: {}", err),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        if let Ok(json) = self.to_json() {
            if crate::platform::web::storage_set(Self::STORAGE_KEY, &json) {
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
