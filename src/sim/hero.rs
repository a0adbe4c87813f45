//! The hero: level curves, equipment-derived stats, damage intake
//!
//! Enemy vitals are derived from the hero baseline at the enemy's level, so
//! the curves here double as the global difficulty curve.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Circle;
use super::disc::DiscId;
use super::items::{Armor, ArmorType, Item, Weapon, WeaponType, generate_armor, generate_weapon};
use super::state::{GameState, SoundKey, play_sound};
use crate::consts::*;

/// Damage of one full-strength hero shot at `level`
pub fn hero_damage_at_level(level: u32) -> f32 {
    HERO_BASE_DAMAGE * HERO_DAMAGE_GROWTH.powi(level as i32)
}

pub fn hero_attacks_per_second_at_level(level: u32) -> f32 {
    HERO_BASE_ATTACKS_PER_SECOND + HERO_ATTACK_SPEED_PER_LEVEL * level as f32
}

pub fn hero_max_life_at_level(level: u32) -> f32 {
    HERO_BASE_LIFE * HERO_LIFE_GROWTH.powi(level as i32)
}

/// Experience needed to advance from `level` to `level + 1`
pub fn experience_for_level(level: u32) -> u64 {
    (10.0 * BASE_XP * XP_GROWTH.powi(level as i32)).ceil() as u64
}

/// Experience for defeating an enemy, reduced when the hero outlevels it
pub fn experience_reward(enemy_level: u32, hero_level: u32, experience_factor: f32) -> u64 {
    let penalty = ((hero_level as f64 - enemy_level as f64) * 0.1).clamp(0.0, 1.0);
    (BASE_XP * XP_GROWTH.powi(enemy_level as i32) * f64::from(experience_factor) * (1.0 - penalty)).ceil()
        as u64
}

/// Proficiency experience needed to advance from `level` to `level + 1`
pub fn proficiency_for_level(level: u32) -> u64 {
    (50.0 * 1.25f32.powi(level as i32)).ceil() as u64
}

/// Stat bonus per proficiency level
pub const PROFICIENCY_BONUS: f32 = 0.02;

/// Armor mitigation with a 10% floor
///
/// Returns `max(ceil(d/10), ceil(d²/(d + a)))`, or `d` unchanged without armor.
pub fn apply_armor_to_damage(damage: f32, armor: f32) -> f32 {
    if armor <= 0.0 || damage <= 0.0 {
        return damage;
    }
    let floor = (damage / 10.0).ceil();
    let mitigated = (damage * damage / (damage + armor)).ceil();
    floor.max(mitigated)
}

/// Equipment a proficiency is tracked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProficiencyKey {
    Weapon(WeaponType),
    Armor(ArmorType),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proficiency {
    pub level: u32,
    pub experience: u64,
}

impl Proficiency {
    /// Add experience; returns levels gained
    pub fn add_experience(&mut self, experience: u64) -> u32 {
        self.experience += experience;
        let mut gained = 0;
        while self.experience >= proficiency_for_level(self.level) {
            self.experience -= proficiency_for_level(self.level);
            self.level += 1;
            gained += 1;
        }
        gained
    }

    pub fn bonus(&self) -> f32 {
        1.0 + PROFICIENCY_BONUS * self.level as f32
    }
}

/// Burst-damage window for the hero damage cap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageWindow {
    pub start_tick: u64,
    pub cap: f32,
    pub taken: f32,
}

#[derive(Debug, Clone)]
pub struct Hero {
    pub level: u32,
    /// Experience toward the next level
    pub experience: u64,
    pub pos: Vec2,
    pub radius: f32,
    pub life: f32,
    /// Facing/aim angle (radians)
    pub theta: f32,
    pub disc: Option<DiscId>,
    pub weapon: Weapon,
    pub armor: Armor,
    pub inventory: Vec<Item>,
    pub coins: u64,
    pub proficiencies: BTreeMap<ProficiencyKey, Proficiency>,
    /// Accumulated charge (0..=MAX_CHARGE)
    pub charge: f32,
    /// Current attack cycle is charged
    pub charged_attack: bool,
    /// Milliseconds into the current attack cycle
    pub attack_time: f32,
    pub damage_window: Option<DamageWindow>,
}

impl Default for Hero {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Hero {
    pub fn new(level: u32) -> Self {
        let mut hero = Self {
            level,
            experience: 0,
            pos: Vec2::ZERO,
            radius: HERO_RADIUS,
            life: 0.0,
            theta: 0.0,
            disc: None,
            weapon: generate_weapon(WeaponType::Bow, level, &[]),
            armor: generate_armor(ArmorType::Cloth, level, &[]),
            inventory: Vec::new(),
            coins: 0,
            proficiencies: BTreeMap::new(),
            charge: 0.0,
            charged_attack: false,
            attack_time: 0.0,
            damage_window: None,
        };
        hero.life = hero.max_life();
        hero
    }

    pub fn proficiency(&self, key: ProficiencyKey) -> Proficiency {
        self.proficiencies.get(&key).copied().unwrap_or_default()
    }

    pub fn max_life(&self) -> f32 {
        hero_max_life_at_level(self.level) * self.armor.life_multiplier()
    }

    pub fn armor_value(&self) -> f32 {
        self.armor.armor() * self.proficiency(ProficiencyKey::Armor(self.armor.kind)).bonus()
    }

    pub fn speed(&self) -> f32 {
        HERO_SPEED * self.armor.kind.speed_factor()
    }

    /// Damage of a full-strength shot, including proficiency and charge
    pub fn shot_damage(&self) -> f32 {
        let proficiency = self.proficiency(ProficiencyKey::Weapon(self.weapon.kind)).bonus();
        let charged = if self.charged_attack {
            CHARGED_DAMAGE_MULTIPLIER
        } else {
            1.0
        };
        self.weapon.damage() * proficiency * charged
    }

    /// Length of one attack cycle in ms
    pub fn attack_cooldown(&self) -> f32 {
        let aps = hero_attacks_per_second_at_level(self.level) * self.weapon.kind.attack_speed_factor();
        1000.0 / aps
    }

    pub fn heal(&mut self, amount: f32) {
        self.life = (self.life + amount).min(self.max_life());
    }

    /// Add experience; level-ups heal to full. Returns levels gained.
    pub fn gain_experience(&mut self, experience: u64) -> u32 {
        self.experience += experience;
        let mut gained = 0;
        while self.experience >= experience_for_level(self.level) {
            self.experience -= experience_for_level(self.level);
            self.level += 1;
            gained += 1;
        }
        if gained > 0 {
            self.life = self.max_life();
            log::info!("Hero reached level {}", self.level);
        }
        gained
    }

    /// Experience for the currently equipped weapon and armor
    pub fn gain_proficiency(&mut self, experience: u64) {
        for key in [
            ProficiencyKey::Weapon(self.weapon.kind),
            ProficiencyKey::Armor(self.armor.kind),
        ] {
            self.proficiencies.entry(key).or_default().add_experience(experience);
        }
    }

    pub fn gain_charge(&mut self, amount: f32) {
        self.charge = (self.charge + amount).clamp(0.0, MAX_CHARGE);
    }

    /// Arm a charged attack if the meter is full; restarts the attack cycle
    pub fn activate_charge(&mut self) -> bool {
        if self.charge < MAX_CHARGE || self.charged_attack {
            return false;
        }
        self.charge = 0.0;
        self.charged_attack = true;
        self.attack_time = 0.0;
        true
    }

    /// Swap in a new weapon; returns the old one
    pub fn equip_weapon(&mut self, weapon: Weapon) -> Weapon {
        std::mem::replace(&mut self.weapon, weapon)
    }

    /// Swap in new armor, keeping life below the new maximum; returns the old armor
    pub fn equip_armor(&mut self, armor: Armor) -> Armor {
        let old = std::mem::replace(&mut self.armor, armor);
        self.life = self.life.min(self.max_life());
        old
    }

    /// Full heal and clear transient combat state
    pub fn respawn(&mut self, pos: Vec2) {
        self.pos = pos;
        self.disc = None;
        self.life = self.max_life();
        self.charge = 0.0;
        self.charged_attack = false;
        self.attack_time = 0.0;
        self.damage_window = None;
    }
}

impl Circle for Hero {
    fn center(&self) -> Vec2 {
        self.pos
    }

    fn radius(&self) -> f32 {
        self.radius
    }
}

/// Apply an enemy hit to the hero; returns the damage actually taken
///
/// Damage goes through armor and the difficulty multiplier, then the burst
/// cap: the first hit of an empty window fixes `min(max_life/2, 2·damage)` as
/// the most the hero can lose until the window closes.
pub fn damage_hero(state: &mut GameState, damage: f32) -> f32 {
    let multiplier = state.settings.difficulty.damage_multiplier();
    let now = state.time_ticks;
    let hero = &mut state.hero;
    let damage = apply_armor_to_damage(damage, hero.armor_value()) * multiplier;
    if damage <= 0.0 {
        return 0.0;
    }

    let window = match hero.damage_window {
        Some(window) if now < window.start_tick + HERO_DAMAGE_FRAME_COUNT => window,
        _ => DamageWindow {
            start_tick: now,
            cap: (hero.max_life() / 2.0).min(2.0 * damage),
            taken: 0.0,
        },
    };
    let applied = damage.min(window.cap - window.taken).max(0.0);
    hero.damage_window = Some(DamageWindow {
        taken: window.taken + applied,
        ..window
    });
    hero.life -= applied;
    if applied > 0.0 {
        play_sound(state, SoundKey::HeroHurt);
    }
    applied
}

/// One frame of a lingering effect on the hero
///
/// Burns skip armor and the burst cap; the per-frame slice is far below the
/// armor floor and would otherwise be rounded up to a full point.
pub fn burn_hero(state: &mut GameState, damage_per_second: f32) -> f32 {
    let multiplier = state.settings.difficulty.damage_multiplier();
    let damage = (damage_per_second * FRAME_SECONDS * multiplier).max(0.0);
    state.hero.life -= damage;
    damage
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_armor_floor() {
        assert_eq!(apply_armor_to_damage(100.0, 1000.0), 10.0);
        assert_eq!(apply_armor_to_damage(100.0, 0.0), 100.0);
        assert_eq!(apply_armor_to_damage(100.0, -5.0), 100.0);
        // 100²/(100+100) = 50
        assert_eq!(apply_armor_to_damage(100.0, 100.0), 50.0);
        // Rounds up
        assert_eq!(apply_armor_to_damage(10.0, 1.0), 10.0);
    }

    #[test]
    fn test_level_curves() {
        assert!((hero_damage_at_level(0) - 8.0).abs() < 1e-6);
        assert!((hero_damage_at_level(2) - 8.0 * 1.3225).abs() < 1e-4);
        assert!((hero_attacks_per_second_at_level(10) - 1.7).abs() < 1e-6);
        assert!((hero_max_life_at_level(1) - 115.0).abs() < 1e-3);
        assert_eq!(experience_for_level(0), 50);
        assert_eq!(experience_for_level(1), 60);
        assert_eq!(proficiency_for_level(0), 50);
        assert_eq!(proficiency_for_level(2), 79);
    }

    #[test]
    fn test_experience_reward_penalty() {
        let full = (BASE_XP * XP_GROWTH.powi(10) * 2.0).ceil() as u64;
        assert_eq!(experience_reward(10, 1, 2.0), full);
        assert_eq!(experience_reward(10, 10, 2.0), full);
        // Five levels above: half reward
        let half = (BASE_XP * XP_GROWTH.powi(10) * 2.0 * 0.5).ceil() as u64;
        assert_eq!(experience_reward(10, 15, 2.0), half);
        assert_eq!(experience_reward(10, 40, 2.0), 0);
    }

    #[test]
    fn test_level_up_heals() {
        let mut hero = Hero::new(1);
        hero.life = 1.0;
        let gained = hero.gain_experience(65);
        assert_eq!(gained, 1);
        assert_eq!(hero.level, 2);
        assert_eq!(hero.experience, 5);
        assert_eq!(hero.life, hero.max_life());
    }

    #[test]
    fn test_proficiency_bonus_scales_damage() {
        let mut hero = Hero::new(3);
        let base = hero.shot_damage();
        hero.gain_proficiency(proficiency_for_level(0) + proficiency_for_level(1));
        let key = ProficiencyKey::Weapon(hero.weapon.kind);
        assert_eq!(hero.proficiency(key).level, 2);
        assert!((hero.shot_damage() / base - 1.04).abs() < 1e-5);
    }

    #[test]
    fn test_charge_caps_and_activates() {
        let mut hero = Hero::new(1);
        assert!(!hero.activate_charge());
        hero.gain_charge(0.7);
        hero.gain_charge(0.7);
        assert_eq!(hero.charge, MAX_CHARGE);
        hero.attack_time = 300.0;
        let base = hero.shot_damage();
        assert!(hero.activate_charge());
        assert_eq!(hero.charge, 0.0);
        assert_eq!(hero.attack_time, 0.0);
        assert!((hero.shot_damage() / base - CHARGED_DAMAGE_MULTIPLIER).abs() < 1e-5);
    }

    #[test]
    fn test_damage_cap_within_window() {
        let mut state = GameState::new(1);
        let max_life = state.hero.max_life();
        state.hero.life = max_life;
        let armor = state.hero.armor_value();
        let multiplier = state.settings.difficulty.damage_multiplier();

        let first = damage_hero(&mut state, 10.0);
        let expected_first = apply_armor_to_damage(10.0, armor) * multiplier;
        assert!((first - expected_first).abs() < 1e-4);

        // Cap is 2x the first hit; a huge follow-up only fills the remainder
        let second = damage_hero(&mut state, 10_000.0);
        let cap = (max_life / 2.0).min(2.0 * expected_first);
        assert!((first + second - cap).abs() < 1e-3);
        assert_eq!(damage_hero(&mut state, 10_000.0), 0.0);

        // After the window closes the next hit opens a fresh one
        state.time_ticks += HERO_DAMAGE_FRAME_COUNT;
        assert!(damage_hero(&mut state, 10.0) > 0.0);
        assert!(state.sounds.contains(&SoundKey::HeroHurt));
    }

    #[test]
    fn test_damage_cap_never_exceeds_half_life() {
        let mut state = GameState::new(1);
        let max_life = state.hero.max_life();
        state.hero.life = max_life;
        let taken = damage_hero(&mut state, 1_000_000.0);
        assert!(taken <= max_life / 2.0 + 1e-3);
        assert!(state.hero.life > 0.0);
    }

    #[test]
    fn test_burn_ignores_armor_floor() {
        let mut state = GameState::new(1);
        let life = state.hero.max_life();
        state.hero.life = life;
        let multiplier = state.settings.difficulty.damage_multiplier();
        for _ in 0..50 {
            burn_hero(&mut state, 10.0);
        }
        // One second at 10 dps
        assert!((life - state.hero.life - 10.0 * multiplier).abs() < 1e-3);
    }
}
