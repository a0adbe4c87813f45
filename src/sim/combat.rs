//! Damage resolution and enemy death
//!
//! Both entry points take the enemy detached from the arena (the same way
//! behaviors receive it), so hooks can mutate `state` freely.

use glam::Vec2;
use rand::Rng;

use super::bullet::Bullet;
use super::disc::{Portal, PortalDestination};
use super::enemy::Enemy;
use super::hero::{apply_armor_to_damage, experience_reward};
use super::items::{Item, Loot, generate_random_item};
use super::state::{GameState, SoundKey, play_sound};
use crate::Random;
use crate::consts::*;
use crate::world::DungeonRecipe;

/// Strip armor; each point counts less once armor drops below half, and less
/// again below a quarter, of the enemy's base armor
pub fn shred_armor(enemy: &mut Enemy, shred: f32) {
    if shred <= 0.0 || enemy.base_armor <= 0.0 {
        return;
    }
    let ratio = enemy.armor / enemy.base_armor;
    let effectiveness = if ratio > 0.5 {
        1.0
    } else if ratio > 0.25 {
        0.5
    } else {
        0.25
    };
    enemy.armor = (enemy.armor - shred * effectiveness).max(0.0);
}

/// Resolve a hero bullet striking `enemy`
///
/// Returns the damage dealt. Kills go through [`defeat_enemy`]; survivors get
/// their `on_hit` hook.
pub fn hit_enemy(state: &mut GameState, enemy: &mut Enemy, bullet: &mut Bullet) -> f32 {
    let earlier_hits = bullet.hit_targets.len();
    bullet.hit_targets.insert(enemy.id);
    if !bullet.is_enemy_piercing {
        bullet.consumed = true;
    }

    let behavior = enemy.definition.behavior;
    let mitigated = apply_armor_to_damage(bullet.damage, enemy.armor);
    let damage = behavior.on_damage(state, enemy, mitigated).max(0.0);
    enemy.life -= damage;
    shred_armor(enemy, bullet.armor_shred);
    if bullet.charge_gain > 0.0 {
        // Halved for every enemy this bullet already went through
        state.hero.gain_charge(bullet.charge_gain / 2f32.powi(earlier_hits as i32));
    }
    play_sound(state, SoundKey::Hit);

    if enemy.is_alive() {
        behavior.on_hit(state, enemy, bullet);
    } else {
        defeat_enemy(state, enemy);
    }
    damage
}

/// Apply one frame of a lingering bullet's damage; armor doesn't apply
pub fn burn_enemy(state: &mut GameState, enemy: &mut Enemy, damage_per_second: f32) {
    let behavior = enemy.definition.behavior;
    let damage = behavior.on_damage(state, enemy, damage_per_second * FRAME_SECONDS).max(0.0);
    enemy.life -= damage;
    if !enemy.is_alive() {
        defeat_enemy(state, enemy);
    }
}

/// Everything that happens when an enemy dies: hooks, rewards, drops and
/// the boss epilogue. Returns the experience granted.
///
/// The enemy stays in the arena with `life <= 0` until the end-of-frame sweep.
pub fn defeat_enemy(state: &mut GameState, enemy: &mut Enemy) -> u64 {
    let definition = enemy.definition;
    enemy.life = enemy.life.min(0.0);
    definition.behavior.on_death(state, enemy);

    // Summoned minions are worth nothing
    let experience = if enemy.master.is_some() {
        0
    } else {
        experience_reward(enemy.level, state.hero.level, definition.experience_factor)
    };
    if experience > 0 {
        if state.hero.gain_experience(experience) > 0 {
            play_sound(state, SoundKey::LevelUp);
        }
        state.hero.gain_proficiency(experience);
    }

    if state.rng.random::<f32>() < definition.drop_chance {
        let item = generate_random_item(&mut state.rng, enemy.level);
        drop_loot(state, enemy, item);
    }

    let is_boss = state.disc(enemy.home).is_some_and(|d| d.boss == Some(enemy.id));
    if is_boss {
        log::info!("{} defeated", definition.name);
        // Bosses may open the way one level deeper
        let deeper = (state.rng.random::<f32>() < definition.portal_chance)
            .then(|| DungeonRecipe::roll(&mut Random::new(state.rng.random()), enemy.level + 1));
        if let Some(disc) = state.disc_mut(enemy.home) {
            disc.boss = None;
            let exit = Portal::new(disc.pos, PortalDestination::Overworld);
            disc.portals.push(exit);
            if let Some(recipe) = deeper {
                let pos = disc.clamp_point(disc.pos + Vec2::new(PORTAL_RADIUS * 2.5, 0.0));
                log::info!("{} left a {} portal", definition.name, recipe.kind.as_str());
                disc.portals.push(Portal::new(pos, PortalDestination::Dungeon(recipe)));
            }
        }
        for id in &enemy.minions {
            if let Some(minion) = state.enemies.get_mut(id) {
                minion.life = 0.0;
            }
        }
        if let Some(enchantment) = definition.behavior.get_enchantment(state, enemy) {
            drop_loot(state, enemy, Item::Enchantment(enchantment));
        }
        state.boss_fight = None;
    }

    play_sound(state, SoundKey::EnemyDeath);
    experience
}

fn drop_loot(state: &mut GameState, enemy: &Enemy, item: Item) {
    let disc_id = enemy.disc.unwrap_or(enemy.home);
    if let Some(disc) = state.disc_mut(disc_id) {
        let pos = disc.clamp_point(enemy.pos);
        disc.loot.push(Loot::new(pos, item));
    }
}
