//! Enemy definitions
//!
//! Each submodule owns one behavior type and the definitions built on it.
//! The helpers below are the small vocabulary the mode machines share.

pub mod archer;
pub mod charger;
pub mod ghost;
pub mod necromancer;
pub mod slime;
pub mod sorcerer;

pub use archer::{ARCHER, SNIPER};
pub use charger::CHARGER;
pub use ghost::GHOST;
pub use necromancer::{NECROMANCER, NECROMANCER_ADEPT};
pub use slime::{BIG_SLIME, SKELETON, SLIME};
pub use sorcerer::{ARCHMAGE, SORCERER};

use glam::Vec2;
use rand::Rng;

use crate::consts::*;
use crate::sim::bullet::{Bullet, BulletSource};
use crate::sim::collision::circles_intersect;
use crate::sim::enemy::Enemy;
use crate::sim::hero::damage_hero;
use crate::sim::state::{GameState, SoundKey, play_sound};
use crate::{heading, polar_to_cartesian};

/// True if the hero is alive and within `range` of the enemy
pub fn sees_hero(state: &GameState, enemy: &Enemy, range: f32) -> bool {
    state.hero.life > 0.0 && enemy.pos.distance(state.hero.pos) <= range
}

pub fn angle_to_hero(state: &GameState, enemy: &Enemy) -> f32 {
    heading(state.hero.pos - enemy.pos)
}

/// First update since the current mode was entered
pub fn just_entered(enemy: &Enemy) -> bool {
    enemy.mode_time <= FRAME_LENGTH
}

/// Walk to random points on the home disc; returns false if the disc is gone
pub fn wander(state: &mut GameState, enemy: &mut Enemy, speed_factor: f32) -> bool {
    let Some((center, radius)) = state.disc(enemy.home).map(|d| (d.pos, d.radius)) else {
        return false;
    };
    let target = match enemy.params.point("wander") {
        Some(target) => target,
        None => {
            let r = state.rng.random_range(0.0..(radius - enemy.radius).max(1.0));
            let theta = state.rng.random_range(0.0..std::f32::consts::TAU);
            let target = center + polar_to_cartesian(r, theta);
            enemy.params.set_point("wander", target);
            target
        }
    };
    if enemy.move_toward(target, speed_factor) {
        enemy.params.remove("wander");
    }
    true
}

/// Damage the hero on touch, at most once per attack cooldown
pub fn contact_attack(state: &mut GameState, enemy: &mut Enemy) {
    let cooldown = enemy.params.number("contact_cooldown") - FRAME_LENGTH;
    if cooldown > 0.0 {
        enemy.params.set_number("contact_cooldown", cooldown);
        return;
    }
    if state.hero.life > 0.0 && circles_intersect(&*enemy, &state.hero) {
        damage_hero(state, enemy.damage);
        enemy.params.set_number("contact_cooldown", enemy.attack_cooldown());
    } else {
        enemy.params.set_number("contact_cooldown", 0.0);
    }
}

/// Bullet leaving the enemy's edge at `theta`
pub fn enemy_bullet(enemy: &Enemy, theta: f32, speed: f32, radius: f32, duration: f32) -> Bullet {
    Bullet::new(
        BulletSource::Enemy(enemy.id),
        enemy.pos + polar_to_cartesian(enemy.radius, theta),
        polar_to_cartesian(speed, theta),
        radius,
        duration,
        enemy.damage,
    )
}

pub fn fire(state: &mut GameState, bullet: Bullet) {
    state.enemy_bullets.push(bullet);
    play_sound(state, SoundKey::Shoot);
}

/// Evenly spaced headings around a circle starting at `offset`
pub fn ring_angles(count: usize, offset: f32) -> impl Iterator<Item = f32> {
    let step = std::f32::consts::TAU / count.max(1) as f32;
    (0..count).map(move |i| offset + step * i as f32)
}

/// Point `distance` away from `from`, directly away from `threat`
pub fn retreat_point(from: Vec2, threat: Vec2, distance: f32) -> Vec2 {
    from + crate::sim::collision::direction_between(threat, from) * distance
}

/// Spawn a level-3 enemy next to the hero, on the hero's disc
#[cfg(test)]
pub(crate) fn spawn_near_hero(
    state: &mut GameState,
    definition: &'static crate::sim::enemy::EnemyDefinition,
    offset: Vec2,
) -> crate::sim::enemy::EnemyId {
    let home = state.hero.disc.unwrap_or_else(|| panic!("hero is not on a disc"));
    let pos = state.hero.pos + offset;
    state.spawn_enemy(definition, pos, home, 3)
}
