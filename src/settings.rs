//! Game settings and preferences
//!
//! Persisted separately from game saves, under their own storage key.

use serde::{Deserialize, Serialize};

use crate::consts::{CELL_CACHE_CAPACITY, VISIBILITY_RADIUS};
use crate::persistence::{KeyValueStore, PersistenceError};

/// Difficulty presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "norm" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Multiplier on damage the hero takes
    pub fn damage_multiplier(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.6,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.5,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub difficulty: Difficulty,

    // === World ===
    /// Overworld cells kept generated before least-recently-used eviction
    pub cell_cache_capacity: usize,
    /// Radius around the hero that is simulated and drawn
    pub visibility_radius: f32,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,

    // === Accessibility ===
    /// Reduced motion, read by the presentation layer to skip screen shake and flashes
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,

            cell_cache_capacity: CELL_CACHE_CAPACITY,
            visibility_radius: VISIBILITY_RADIUS,

            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Storage key
    const STORAGE_KEY: &'static str = "disc_hero_settings";

    /// Create settings for a difficulty preset
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    /// Volume sound cues actually play at
    pub fn effective_sfx_volume(&self) -> f32 {
        (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
    }

    /// Effective music volume, read by the presentation layer's music player
    pub fn effective_music_volume(&self) -> f32 {
        (self.master_volume * self.music_volume).clamp(0.0, 1.0)
    }

    /// Load settings, falling back to defaults when missing or unreadable
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Self>(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings ({})", settings.difficulty.as_str());
                    return settings.sanitized();
                }
                Err(e) => log::warn!("Ignoring malformed settings: {e}"),
            },
            Ok(None) => {}
            Err(e) => log::warn!("Settings storage unavailable: {e}"),
        }

        log::info!("Using default settings");
        Self::default()
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) {
        let result = serde_json::to_string(self)
            .map_err(PersistenceError::from)
            .and_then(|json| store.set(Self::STORAGE_KEY, &json));
        match result {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Failed to save settings: {e}"),
        }
    }

    /// Clamp hand-edited values back into range
    fn sanitized(mut self) -> Self {
        self.cell_cache_capacity = self.cell_cache_capacity.max(1);
        self.visibility_radius = self.visibility_radius.max(1.0);
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
        self.music_volume = self.music_volume.clamp(0.0, 1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_difficulty_from_str() {
        assert_eq!(Difficulty::from_str("HARD"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::from_str("norm"), Some(Difficulty::Normal));
        assert_eq!(Difficulty::from_str("nightmare"), None);
        assert_eq!(Difficulty::default().damage_multiplier(), 1.0);
    }

    #[test]
    fn test_settings_round_trip() {
        let mut store = MemoryStore::new();
        let mut settings = Settings::from_difficulty(Difficulty::Hard);
        settings.sfx_volume = 0.5;
        settings.save(&mut store);
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let mut store = MemoryStore::new();
        store
            .set(Settings::STORAGE_KEY, "{\"difficulty\":\"Easy\",\"master_volume\":7.0}")
            .unwrap();
        let settings = Settings::load(&store);
        assert_eq!(settings.difficulty, Difficulty::Easy);
        assert_eq!(settings.master_volume, 1.0);
        assert_eq!(settings.cell_cache_capacity, CELL_CACHE_CAPACITY);
    }

    #[test]
    fn test_malformed_settings_use_defaults() {
        let mut store = MemoryStore::new();
        store.set(Settings::STORAGE_KEY, "[1, 2").unwrap();
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_muted_sfx() {
        let mut settings = Settings::default();
        assert!(settings.effective_sfx_volume() > 0.0);
        settings.master_volume = 0.0;
        assert_eq!(settings.effective_sfx_volume(), 0.0);
    }

    #[test]
    fn test_music_volume_scales_with_master() {
        let mut settings = Settings::default();
        settings.master_volume = 0.5;
        settings.music_volume = 0.5;
        assert_eq!(settings.effective_music_volume(), 0.25);
    }
}
