//! Enemies, their definitions and the entity factory
//!
//! An enemy is plain data plus a `&'static EnemyDefinition`. All behavior
//! lives behind the definition's [`EnemyBehavior`] trait object, so content
//! modules add new enemy types without touching the simulation loop.

use std::collections::BTreeMap;
use std::fmt;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::bullet::Bullet;
use super::collision::Circle;
use super::disc::{AreaId, DiscId};
use super::hero::{hero_attacks_per_second_at_level, hero_damage_at_level, hero_max_life_at_level};
use super::items::Enchantment;
use super::state::GameState;
use crate::consts::*;
use crate::render::Canvas;

/// Stable arena key; `area` ties the enemy to the cell or dungeon that spawned it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId {
    pub area: AreaId,
    pub serial: u32,
}

impl EnemyId {
    pub fn new(area: AreaId, serial: u32) -> Self {
        Self { area, serial }
    }
}

/// Multipliers on the hero-relative baseline stats
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatFactors {
    pub max_life: f32,
    pub damage: f32,
    pub armor: f32,
    /// Attacks per second (absolute, not relative)
    pub attack_speed: f32,
    pub speed: f32,
}

impl StatFactors {
    pub const DEFAULT: StatFactors = StatFactors {
        max_life: 1.0,
        damage: 1.0,
        armor: 1.0,
        attack_speed: 1.0,
        speed: 1.0,
    };
}

impl Default for StatFactors {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A value in an enemy's per-instance parameter bag
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Number(f32),
    Point(Vec2),
    Flag(bool),
}

/// Typed per-instance state used by enemy behaviors
///
/// Keys are behavior-local names; a missing key reads as zero/false/None.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(BTreeMap<&'static str, ParamValue>);

impl Params {
    pub fn number(&self, key: &str) -> f32 {
        match self.0.get(key) {
            Some(ParamValue::Number(value)) => *value,
            _ => 0.0,
        }
    }

    pub fn set_number(&mut self, key: &'static str, value: f32) {
        self.0.insert(key, ParamValue::Number(value));
    }

    pub fn point(&self, key: &str) -> Option<Vec2> {
        match self.0.get(key) {
            Some(ParamValue::Point(point)) => Some(*point),
            _ => None,
        }
    }

    pub fn set_point(&mut self, key: &'static str, point: Vec2) {
        self.0.insert(key, ParamValue::Point(point));
    }

    pub fn flag(&self, key: &str) -> bool {
        matches!(self.0.get(key), Some(ParamValue::Flag(true)))
    }

    pub fn set_flag(&mut self, key: &'static str, flag: bool) {
        self.0.insert(key, ParamValue::Flag(flag));
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.0.remove(key)
    }
}

/// Per-type behavior hooks
///
/// Only `update` is required. Hooks receive the enemy detached from the
/// arena, so they may freely mutate `state` (spawn bullets, minions, loot).
pub trait EnemyBehavior: Sync {
    /// Advance the enemy's mode machine by one frame
    fn update(&self, state: &mut GameState, enemy: &mut Enemy);

    fn render(&self, canvas: &mut dyn Canvas, _state: &GameState, enemy: &Enemy) {
        canvas.fill_circle(enemy.pos, enemy.radius, enemy.definition.color);
    }

    /// Called after a surviving hit
    fn on_hit(&self, _state: &mut GameState, _enemy: &mut Enemy, _bullet: &Bullet) {}

    /// Adjust incoming damage (after armor); returns the damage to apply
    fn on_damage(&self, _state: &mut GameState, _enemy: &mut Enemy, damage: f32) -> f32 {
        damage
    }

    fn on_death(&self, _state: &mut GameState, _enemy: &mut Enemy) {}

    /// Enchantment dropped when this enemy dies as a boss
    fn get_enchantment(&self, _state: &mut GameState, _enemy: &Enemy) -> Option<Enchantment> {
        None
    }
}

/// Static description of an enemy type
///
/// Variants are derived from a base record with the `const fn` builders:
///
/// ```ignore
/// pub static BIG_SLIME: EnemyDefinition = SLIME_BASE.named("Big Slime").with_radius(36.0);
/// ```
#[derive(Clone, Copy)]
pub struct EnemyDefinition {
    pub name: &'static str,
    pub stat_factors: StatFactors,
    pub radius: f32,
    /// Chance to drop a basic item on death
    pub drop_chance: f32,
    pub experience_factor: f32,
    /// Chance for a boss to leave a portal to a deeper dungeon on death
    pub portal_chance: f32,
    pub initial_mode: &'static str,
    /// 0xRRGGBB
    pub color: u32,
    pub behavior: &'static dyn EnemyBehavior,
}

impl EnemyDefinition {
    pub const fn new(name: &'static str, behavior: &'static dyn EnemyBehavior) -> Self {
        Self {
            name,
            stat_factors: StatFactors::DEFAULT,
            radius: 20.0,
            drop_chance: 0.1,
            experience_factor: 1.0,
            portal_chance: 0.0,
            initial_mode: "choose",
            color: 0xcc3333,
            behavior,
        }
    }

    pub const fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub const fn with_stat_factors(mut self, stat_factors: StatFactors) -> Self {
        self.stat_factors = stat_factors;
        self
    }

    pub const fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub const fn with_drop_chance(mut self, drop_chance: f32) -> Self {
        self.drop_chance = drop_chance;
        self
    }

    pub const fn with_experience_factor(mut self, experience_factor: f32) -> Self {
        self.experience_factor = experience_factor;
        self
    }

    pub const fn with_portal_chance(mut self, portal_chance: f32) -> Self {
        self.portal_chance = portal_chance;
        self
    }

    pub const fn with_initial_mode(mut self, mode: &'static str) -> Self {
        self.initial_mode = mode;
        self
    }

    pub const fn with_color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    pub const fn with_behavior(mut self, behavior: &'static dyn EnemyBehavior) -> Self {
        self.behavior = behavior;
        self
    }
}

impl fmt::Debug for EnemyDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnemyDefinition")
            .field("name", &self.name)
            .field("stat_factors", &self.stat_factors)
            .field("radius", &self.radius)
            .field("drop_chance", &self.drop_chance)
            .field("experience_factor", &self.experience_factor)
            .field("portal_chance", &self.portal_chance)
            .field("initial_mode", &self.initial_mode)
            .finish_non_exhaustive()
    }
}

/// A live enemy instance
#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: EnemyId,
    pub pos: Vec2,
    pub radius: f32,
    pub life: f32,
    pub max_life: f32,
    pub armor: f32,
    pub base_armor: f32,
    pub damage: f32,
    pub attacks_per_second: f32,
    pub speed: f32,
    /// Facing angle (radians)
    pub theta: f32,
    pub mode: &'static str,
    /// Milliseconds spent in the current mode
    pub mode_time: f32,
    pub params: Params,
    /// Disc the enemy currently stands on
    pub disc: Option<DiscId>,
    /// Disc the enemy was spawned on
    pub home: DiscId,
    pub minions: Vec<EnemyId>,
    pub master: Option<EnemyId>,
    pub invulnerable: bool,
    pub level: u32,
    pub definition: &'static EnemyDefinition,
}

impl Enemy {
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    /// Switch modes; the mode timer only restarts on an actual change
    pub fn set_mode(&mut self, mode: &'static str) {
        if self.mode != mode {
            self.mode = mode;
            self.mode_time = 0.0;
        }
    }

    /// Milliseconds between attacks
    pub fn attack_cooldown(&self) -> f32 {
        1000.0 / self.attacks_per_second.max(0.01)
    }

    /// Step toward `target` at `speed_factor` times normal speed; returns true on arrival
    pub fn move_toward(&mut self, target: Vec2, speed_factor: f32) -> bool {
        let step = self.speed * speed_factor * FRAME_SECONDS;
        let offset = target - self.pos;
        let distance = offset.length();
        if distance <= step {
            self.pos = target;
            return true;
        }
        self.theta = crate::heading(offset);
        self.pos += offset / distance * step;
        false
    }

    /// Step along the facing direction
    pub fn move_forward(&mut self, speed_factor: f32) {
        self.pos += crate::polar_to_cartesian(self.speed * speed_factor * FRAME_SECONDS, self.theta);
    }
}

impl Circle for Enemy {
    fn center(&self) -> Vec2 {
        self.pos
    }

    fn radius(&self) -> f32 {
        self.radius
    }
}

/// Seconds a `max_life = 1` enemy of `level` survives the hero's damage output
pub fn fight_duration(level: u32) -> f32 {
    BASE_FIGHT_DURATION + FIGHT_DURATION_PER_LEVEL * level as f32
}

/// Build an enemy with vitals derived from the hero baseline at `level`
pub fn create_enemy<R: Rng>(
    rng: &mut R,
    id: EnemyId,
    pos: Vec2,
    home: DiscId,
    definition: &'static EnemyDefinition,
    level: u32,
) -> Enemy {
    let factors = definition.stat_factors;
    let hero_dps = hero_damage_at_level(level) * hero_attacks_per_second_at_level(level);
    let max_life = hero_dps * fight_duration(level) * factors.max_life;
    let armor = hero_damage_at_level(level) * ENEMY_ARMOR_FRACTION * factors.armor;
    let jitter = rng.random_range(1.0 - SPEED_JITTER..1.0 + SPEED_JITTER);
    Enemy {
        id,
        pos,
        radius: definition.radius,
        life: max_life,
        max_life,
        armor,
        base_armor: armor,
        damage: hero_max_life_at_level(level) * ENEMY_DAMAGE_FRACTION * factors.damage,
        attacks_per_second: factors.attack_speed,
        speed: ENEMY_BASE_SPEED * factors.speed * jitter,
        theta: 0.0,
        mode: definition.initial_mode,
        mode_time: 0.0,
        params: Params::default(),
        disc: Some(home),
        home,
        minions: Vec::new(),
        master: None,
        invulnerable: false,
        level,
        definition,
    }
}
