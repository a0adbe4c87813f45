//! Save/load persistence
//!
//! Features:
//! - Versioned JSON envelope
//! - Saves store recipes only (seed, levels, item recipes); the world and
//!   every derived stat are regenerated on load
//! - Corruption detection and fallback to a fresh game

pub mod store;

pub use store::{KeyValueStore, MemoryStore};

#[cfg(not(target_arch = "wasm32"))]
pub use store::FileStore;
#[cfg(target_arch = "wasm32")]
pub use store::LocalStorage;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::settings::Settings;
use crate::sim::hero::{Hero, Proficiency, ProficiencyKey};
use crate::sim::items::{Armor, Item, Weapon};
use crate::sim::state::GameState;

/// Storage key of the save slot
pub const SAVE_KEY: &str = "disc_hero_save";
/// Current envelope version; older versions are still readable
pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage unavailable: {0}")]
    Storage(String),
    #[error("malformed save data: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("save version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    version: u32,
    data: T,
}

#[derive(Debug, Deserialize)]
struct VersionHeader {
    version: u32,
}

/// Hero progress, reduced to what can't be regenerated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroRecord {
    pub level: u32,
    pub experience: u64,
    /// Overworld position (dungeons are not saved)
    pub pos: Vec2,
    pub coins: u64,
    pub weapon: Weapon,
    pub armor: Armor,
    pub inventory: Vec<Item>,
    pub proficiencies: Vec<(ProficiencyKey, Proficiency)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    pub world_seed: u32,
    pub hero: HeroRecord,
}

impl SaveData {
    pub fn capture(state: &GameState) -> Self {
        let hero = &state.hero;
        let pos = if state.in_dungeon() {
            state.overworld_return.unwrap_or(Vec2::ZERO)
        } else {
            hero.pos
        };
        Self {
            world_seed: state.world_seed,
            hero: HeroRecord {
                level: hero.level,
                experience: hero.experience,
                pos,
                coins: hero.coins,
                weapon: hero.weapon.clone(),
                armor: hero.armor.clone(),
                inventory: hero.inventory.clone(),
                proficiencies: hero.proficiencies.iter().map(|(k, p)| (*k, *p)).collect(),
            },
        }
    }

    /// Rebuild a game from the recipe
    pub fn restore(self, settings: Settings) -> GameState {
        let mut state = GameState::with_settings(self.world_seed, settings);
        let record = self.hero;
        let mut hero = Hero::new(record.level);
        hero.experience = record.experience;
        hero.pos = record.pos;
        hero.coins = record.coins;
        hero.weapon = record.weapon;
        hero.armor = record.armor;
        hero.inventory = record.inventory;
        hero.proficiencies = record.proficiencies.into_iter().collect();
        hero.life = hero.max_life();
        state.hero = hero;
        state.refresh_active_area();
        state.hero.disc = state.closest_active_disc(state.hero.pos);
        state
    }
}

pub fn save_game(store: &mut dyn KeyValueStore, state: &GameState) -> Result<(), PersistenceError> {
    let envelope = Envelope {
        version: SAVE_VERSION,
        data: SaveData::capture(state),
    };
    let json = serde_json::to_string(&envelope)?;
    store.set(SAVE_KEY, &json)?;
    log::info!("Game saved (level {}, {} coins)", state.hero.level, state.hero.coins);
    Ok(())
}

/// Read the save slot; `Ok(None)` when nothing has been saved yet
pub fn load_game(store: &dyn KeyValueStore) -> Result<Option<SaveData>, PersistenceError> {
    let Some(json) = store.get(SAVE_KEY)? else {
        return Ok(None);
    };
    let header: VersionHeader = serde_json::from_str(&json)?;
    if header.version > SAVE_VERSION {
        return Err(PersistenceError::UnsupportedVersion {
            found: header.version,
            supported: SAVE_VERSION,
        });
    }
    let envelope: Envelope<SaveData> = serde_json::from_str(&json)?;
    Ok(Some(envelope.data))
}

/// Load the saved game, or start a new one if there is none or it can't be read
pub fn load_or_new(store: &dyn KeyValueStore, seed: u32, settings: Settings) -> GameState {
    match load_game(store) {
        Ok(Some(save)) => {
            log::info!("Loaded save (world seed {}, level {})", save.world_seed, save.hero.level);
            save.restore(settings)
        }
        Ok(None) => {
            log::info!("No save found, starting world {seed}");
            GameState::with_settings(seed, settings)
        }
        Err(e) => {
            log::warn!("Failed to load save, starting fresh: {e}");
            GameState::with_settings(seed, settings)
        }
    }
}
