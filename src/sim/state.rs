//! Game state and the input/audio boundary types
//!
//! `GameState` is the single context every simulation function receives.
//! Discs live in their owning cell or dungeon, enemies in one arena keyed by
//! [`EnemyId`]; everything else refers to them by key.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::bullet::Bullet;
use super::disc::{AreaId, Disc, DiscId, PortalDestination, find_closest_disc};
use super::enemy::{Enemy, EnemyDefinition, EnemyId, create_enemy};
use super::hero::Hero;
use crate::consts::*;
use crate::settings::Settings;
use crate::world::{Dungeon, DungeonRecipe, World, cells_in_radius, create_dungeon};

/// Logical keys the simulation reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GameKey {
    Up,
    Down,
    Left,
    Right,
    /// Pick up/use loot, or travel through a portal
    Interact,
    /// Sell the selected loot
    Sell,
    /// Release a full charge
    Charge,
}

/// Keyboard/pointer state for one frame
#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    /// Keys held this frame
    pub down: BTreeSet<GameKey>,
    /// Keys that went down since the previous frame
    pub pressed: BTreeSet<GameKey>,
    /// Keys that went up since the previous frame
    pub released: BTreeSet<GameKey>,
    /// Aim point in world coordinates; the hero attacks while this is set
    pub aim: Option<Vec2>,
}

impl InputSnapshot {
    pub fn is_down(&self, key: GameKey) -> bool {
        self.down.contains(&key)
    }

    pub fn was_pressed(&self, key: GameKey) -> bool {
        self.pressed.contains(&key)
    }

    /// Unit movement direction from the held direction keys
    pub fn move_direction(&self) -> Vec2 {
        let mut direction = Vec2::ZERO;
        if self.is_down(GameKey::Up) {
            direction.y -= 1.0;
        }
        if self.is_down(GameKey::Down) {
            direction.y += 1.0;
        }
        if self.is_down(GameKey::Left) {
            direction.x -= 1.0;
        }
        if self.is_down(GameKey::Right) {
            direction.x += 1.0;
        }
        direction.normalize_or_zero()
    }

    /// Build the next frame's snapshot from the keys now held
    pub fn advance(&self, down: BTreeSet<GameKey>, aim: Option<Vec2>) -> Self {
        let pressed = down.difference(&self.down).copied().collect();
        let released = self.down.difference(&down).copied().collect();
        Self {
            down,
            pressed,
            released,
            aim,
        }
    }
}

/// Sound cues emitted by the simulation for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundKey {
    Shoot,
    Hit,
    EnemyDeath,
    HeroHurt,
    HeroDeath,
    LevelUp,
    Pickup,
    Sell,
    Portal,
    BossIntro,
    Charge,
}

/// Queue a sound cue; the presentation layer drains `state.sounds`
pub fn play_sound(state: &mut GameState, sound: SoundKey) {
    if state.settings.effective_sfx_volume() > 0.0 {
        state.sounds.push(sound);
    }
}

/// An isolated boss encounter on a single disc
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BossFight {
    pub disc: DiscId,
    pub boss: EnemyId,
    /// Milliseconds since the fight started
    pub time: f32,
}

impl BossFight {
    /// True once the intro is over and the boss may act
    pub fn is_active(&self) -> bool {
        self.time >= BOSS_INTRO_DURATION
    }
}

/// Loot item currently selected for pickup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LootRef {
    pub disc: DiscId,
    pub index: usize,
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed every cell is generated from
    pub world_seed: u32,
    /// Runtime randomness (drops, jitter, AI choices)
    pub rng: Pcg32,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub hero: Hero,
    pub world: World,
    /// Active dungeon, replacing the overworld while set
    pub dungeon: Option<Dungeon>,
    /// Overworld position to return to when leaving the dungeon
    pub overworld_return: Option<Vec2>,
    /// Enemy arena
    pub enemies: BTreeMap<EnemyId, Enemy>,
    pub hero_bullets: Vec<Bullet>,
    pub enemy_bullets: Vec<Bullet>,
    /// Discs within the hero's visibility radius
    pub active_discs: BTreeSet<DiscId>,
    pub boss_fight: Option<BossFight>,
    pub active_loot: Option<LootRef>,
    /// Sound cues raised this frame
    pub sounds: Vec<SoundKey>,
    pub settings: Settings,
    /// Next runtime enemy serial per area
    spawn_serials: BTreeMap<AreaId, u32>,
    next_dungeon: u32,
}

impl GameState {
    /// Create a new game with default settings
    pub fn new(world_seed: u32) -> Self {
        Self::with_settings(world_seed, Settings::default())
    }

    pub fn with_settings(world_seed: u32, settings: Settings) -> Self {
        let mut state = Self {
            world_seed,
            rng: Pcg32::seed_from_u64(u64::from(world_seed)),
            time_ticks: 0,
            hero: Hero::new(1),
            world: World::new(world_seed, settings.cell_cache_capacity),
            dungeon: None,
            overworld_return: None,
            enemies: BTreeMap::new(),
            hero_bullets: Vec::new(),
            enemy_bullets: Vec::new(),
            active_discs: BTreeSet::new(),
            boss_fight: None,
            active_loot: None,
            sounds: Vec::new(),
            settings,
            spawn_serials: BTreeMap::new(),
            next_dungeon: 0,
        };
        state.refresh_active_area();
        state.hero.disc = state.closest_active_disc(state.hero.pos);
        state
    }

    pub fn in_dungeon(&self) -> bool {
        self.dungeon.is_some()
    }

    /// Look up a disc in its owning cell or dungeon
    pub fn disc(&self, id: DiscId) -> Option<&Disc> {
        let discs = match id.area {
            AreaId::Cell { x, y } => &self.world.cell(x, y)?.discs,
            AreaId::Dungeon(serial) => &self.dungeon.as_ref().filter(|d| d.id == serial)?.discs,
        };
        match discs.get(id.index as usize) {
            Some(disc) if disc.id == id => Some(disc),
            _ => discs.iter().find(|d| d.id == id),
        }
    }

    pub fn disc_mut(&mut self, id: DiscId) -> Option<&mut Disc> {
        let discs = match id.area {
            AreaId::Cell { x, y } => &mut self.world.cell_mut(x, y)?.discs,
            AreaId::Dungeon(serial) => &mut self.dungeon.as_mut().filter(|d| d.id == serial)?.discs,
        };
        let index = match discs.get(id.index as usize) {
            Some(disc) if disc.id == id => id.index as usize,
            _ => discs.iter().position(|d| d.id == id)?,
        };
        discs.get_mut(index)
    }

    /// Discs within the hero's visibility radius, in id order
    pub fn active_disc_list(&self) -> Vec<&Disc> {
        self.active_discs.iter().filter_map(|id| self.disc(*id)).collect()
    }

    /// Active disc whose surface is nearest to `point`
    pub fn closest_active_disc(&self, point: Vec2) -> Option<DiscId> {
        find_closest_disc(point, self.active_disc_list()).map(|d| d.id)
    }

    /// True if the enemy stands on (or, when unplaced, belongs to) an active disc
    pub fn is_enemy_active(&self, enemy: &Enemy) -> bool {
        self.active_discs.contains(&enemy.disc.unwrap_or(enemy.home))
    }

    pub fn active_enemies(&self) -> impl Iterator<Item = &Enemy> + '_ {
        self.enemies.values().filter(|e| self.is_enemy_active(e))
    }

    /// Reserve an enemy id for a runtime spawn in `area`
    pub fn allocate_enemy_id(&mut self, area: AreaId) -> EnemyId {
        let serial = self.spawn_serials.entry(area).or_insert(0);
        let id = EnemyId::new(area, *serial);
        *serial += 1;
        id
    }

    /// Add generated enemies to the arena and reserve their serials
    pub fn insert_enemies(&mut self, enemies: Vec<Enemy>) {
        for enemy in enemies {
            let next = self.spawn_serials.entry(enemy.id.area).or_insert(0);
            *next = (*next).max(enemy.id.serial + 1);
            self.enemies.insert(enemy.id, enemy);
        }
    }

    /// Spawn an enemy at runtime on `home`
    pub fn spawn_enemy(
        &mut self,
        definition: &'static EnemyDefinition,
        pos: Vec2,
        home: DiscId,
        level: u32,
    ) -> EnemyId {
        let id = self.allocate_enemy_id(home.area);
        let enemy = create_enemy(&mut self.rng, id, pos, home, definition, level);
        if let Some(disc) = self.disc_mut(home) {
            disc.enemies.push(id);
        }
        self.enemies.insert(id, enemy);
        id
    }

    /// Drop every enemy that belongs to `area`
    pub fn purge_area(&mut self, area: AreaId) {
        self.enemies.retain(|id, _| id.area != area);
        self.spawn_serials.remove(&area);
    }

    /// Make sure the area around the hero is generated and mark its discs active
    ///
    /// Overworld cells covering the visibility radius are generated on demand
    /// and the cache is trimmed, never evicting the cells just marked active.
    pub fn refresh_active_area(&mut self) {
        let radius = self.settings.visibility_radius;
        let hero_pos = self.hero.pos;
        if let Some(dungeon) = &self.dungeon {
            self.active_discs = dungeon.discs.iter().map(|d| d.id).collect();
            return;
        }

        let keep: BTreeSet<(i32, i32)> = cells_in_radius(hero_pos, radius).into_iter().collect();
        for &(x, y) in &keep {
            if let Some(spawned) = self.world.ensure_cell(x, y) {
                self.insert_enemies(spawned);
            }
        }
        for (x, y) in self.world.evict(&keep) {
            self.purge_area(AreaId::Cell { x, y });
        }

        self.active_discs = keep
            .iter()
            .filter_map(|&(x, y)| self.world.cell(x, y))
            .flat_map(|cell| cell.discs.iter())
            .filter(|disc| disc.pos.distance(hero_pos) <= radius + disc.radius)
            .map(|disc| disc.id)
            .collect();
    }

    /// Move the hero into a freshly generated dungeon
    pub fn enter_dungeon(&mut self, recipe: DungeonRecipe) {
        // Going deeper keeps the original way home
        if !self.in_dungeon() {
            self.overworld_return = Some(self.hero.pos);
        }
        self.leave_dungeon_silently();
        let serial = self.next_dungeon;
        self.next_dungeon += 1;
        let (dungeon, spawned) = create_dungeon(serial, recipe);
        log::info!(
            "Entering {} (level {}, {} discs)",
            dungeon.name,
            dungeon.level,
            dungeon.discs.len()
        );
        self.hero.pos = dungeon.entrance;
        self.dungeon = Some(dungeon);
        self.insert_enemies(spawned);
        self.reset_transient();
        self.refresh_active_area();
        self.hero.disc = self.closest_active_disc(self.hero.pos);
    }

    /// Return to the overworld position the dungeon was entered from
    pub fn leave_dungeon(&mut self) {
        if !self.in_dungeon() {
            return;
        }
        log::info!("Leaving dungeon");
        self.leave_dungeon_silently();
        self.hero.pos = self.overworld_return.take().unwrap_or(Vec2::ZERO);
        self.reset_transient();
        self.refresh_active_area();
        self.hero.disc = self.closest_active_disc(self.hero.pos);
    }

    /// Follow a portal
    pub fn travel(&mut self, destination: PortalDestination) {
        match destination {
            PortalDestination::Dungeon(recipe) => self.enter_dungeon(recipe),
            PortalDestination::Overworld if self.in_dungeon() => self.leave_dungeon(),
            PortalDestination::Overworld => {
                self.hero.pos = Vec2::ZERO;
                self.reset_transient();
                self.refresh_active_area();
                self.hero.disc = self.closest_active_disc(self.hero.pos);
            }
        }
    }

    /// Bring a defeated hero back at the overworld origin, abandoning any dungeon
    pub fn respawn_hero(&mut self) {
        log::info!("Hero fell at level {}; respawning", self.hero.level);
        self.leave_dungeon_silently();
        self.overworld_return = None;
        self.hero.respawn(Vec2::ZERO);
        self.reset_transient();
        self.refresh_active_area();
        self.hero.disc = self.closest_active_disc(self.hero.pos);
    }

    fn leave_dungeon_silently(&mut self) {
        if let Some(dungeon) = self.dungeon.take() {
            self.purge_area(AreaId::Dungeon(dungeon.id));
        }
    }

    fn reset_transient(&mut self) {
        self.hero_bullets.clear();
        self.enemy_bullets.clear();
        self.boss_fight = None;
        self.active_loot = None;
        self.hero.disc = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::DungeonKind;

    #[test]
    fn test_new_state_places_hero_on_a_disc() {
        let state = GameState::new(42);
        let disc = state.hero.disc.and_then(|id| state.disc(id));
        assert!(disc.is_some());
        assert!(disc.is_some_and(|d| d.contains_point(state.hero.pos)));
        assert!(!state.active_discs.is_empty());
    }

    #[test]
    fn test_disc_lookup_by_id() {
        let state = GameState::new(42);
        for id in &state.active_discs {
            assert_eq!(state.disc(*id).map(|d| d.id), Some(*id));
        }
        let missing = DiscId::new(AreaId::Cell { x: 999, y: 999 }, 0);
        assert!(state.disc(missing).is_none());
    }

    #[test]
    fn test_input_edges() {
        let first = InputSnapshot::default().advance(BTreeSet::from([GameKey::Up, GameKey::Charge]), None);
        assert!(first.was_pressed(GameKey::Charge));
        let second = first.advance(BTreeSet::from([GameKey::Up]), None);
        assert!(!second.was_pressed(GameKey::Up));
        assert!(second.released.contains(&GameKey::Charge));
        assert_eq!(second.move_direction(), Vec2::new(0.0, -1.0));
    }

    #[test]
    fn test_runtime_ids_follow_generated_ones() {
        let mut state = GameState::new(7);
        let area = AreaId::Dungeon(77);
        let home = DiscId::new(area, 0);
        let enemy = create_enemy(
            &mut state.rng,
            EnemyId::new(area, 4),
            Vec2::ZERO,
            home,
            &crate::content::SLIME,
            1,
        );
        state.insert_enemies(vec![enemy]);
        assert_eq!(state.allocate_enemy_id(area), EnemyId::new(area, 5));
        state.purge_area(area);
        assert!(state.enemies.keys().all(|id| id.area != area));
    }

    #[test]
    fn test_dungeon_round_trip_restores_position() {
        let mut state = GameState::new(3);
        state.hero.pos = Vec2::new(30.0, -20.0);
        state.enter_dungeon(DungeonRecipe {
            seed: 11,
            level: 4,
            kind: DungeonKind::Cavern,
        });
        assert!(state.in_dungeon());
        let dungeon_id = state.dungeon.as_ref().map(|d| d.id);
        assert!(state.enemies.keys().any(|id| Some(id.area) == dungeon_id.map(AreaId::Dungeon)));
        assert!(state.active_discs.iter().all(|id| matches!(id.area, AreaId::Dungeon(_))));

        state.travel(PortalDestination::Overworld);
        assert!(!state.in_dungeon());
        assert_eq!(state.hero.pos, Vec2::new(30.0, -20.0));
        assert!(state.enemies.keys().all(|id| !matches!(id.area, AreaId::Dungeon(_))));
    }

    #[test]
    fn test_nested_dungeon_returns_to_overworld_entry() {
        let mut state = GameState::new(3);
        state.hero.pos = Vec2::new(30.0, -20.0);
        let recipe = |seed| DungeonRecipe {
            seed,
            level: 4,
            kind: DungeonKind::Gauntlet,
        };
        state.enter_dungeon(recipe(11));
        state.travel(PortalDestination::Dungeon(recipe(12)));
        assert_eq!(state.dungeon.as_ref().map(|d| d.recipe.seed), Some(12));
        state.travel(PortalDestination::Overworld);
        assert_eq!(state.hero.pos, Vec2::new(30.0, -20.0));
    }
}
