//! Player settings and preferences
//!
//! Persisted separately from puzzle progress.

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_ITEM_COUNT, PUZZLE_SIZES};
use crate::error::{PuzzleError, Result};
use crate::platform::KeyValueStore;

/// Interface language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Locale {
    #[default]
    En,
    Fr,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Fr => "fr",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "en" | "english" => Some(Locale::En),
            "fr" | "french" | "français" => Some(Locale::Fr),
            _ => None,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub locale: Locale,

    // === HUD ===
    /// Show the play timer
    pub show_timer: bool,
    /// Show FPS counter
    pub show_fps: bool,
    /// Draw faint hint images in empty cells
    pub show_hints: bool,

    // === Audio ===
    /// Play a sound when a piece is dropped
    pub play_sound: bool,

    // === Difficulty ===
    /// Number of pieces, one of `PUZZLE_SIZES`
    #[serde(default = "default_item_count")]
    pub item_count: u32,
}

fn default_item_count() -> u32 {
    DEFAULT_ITEM_COUNT
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            locale: Locale::En,

            // HUD
            show_timer: true,
            show_fps: false,
            show_hints: true,

            // Audio
            play_sound: true,

            item_count: DEFAULT_ITEM_COUNT,
        }
    }
}

impl Settings {
    /// Storage key
    const STORAGE_KEY: &'static str = "drag_jigsaw_settings";

    /// Select a difficulty. Only the offered sizes are accepted.
    pub fn set_item_count(&mut self, item_count: u32) -> Result<()> {
        if !PUZZLE_SIZES.contains(&item_count) {
            return Err(PuzzleError::InvalidConfiguration { item_count });
        }
        self.item_count = item_count;
        Ok(())
    }

    /// Flip the sound preference (the `M` shortcut)
    pub fn toggle_sound(&mut self) {
        self.play_sound = !self.play_sound;
    }

    /// Load settings, falling back to defaults when missing or unreadable
    pub fn load(store: &dyn KeyValueStore) -> Self {
        if let Ok(Some(json)) = store.get(Self::STORAGE_KEY) {
            match serde_json::from_str::<Settings>(&json) {
                Ok(mut settings) => {
                    if !PUZZLE_SIZES.contains(&settings.item_count) {
                        log::warn!(
                            "Stored difficulty {} not offered, using {}",
                            settings.item_count,
                            DEFAULT_ITEM_COUNT
                        );
                        settings.item_count = DEFAULT_ITEM_COUNT;
                    }
                    log::info!("Loaded settings");
                    return settings;
                }
                Err(err) => log::warn!("Ignoring corrupt settings: {}", err),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<()> {
        let json = serde_json::to_string(self)?;
        store.set(Self::STORAGE_KEY, &json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
