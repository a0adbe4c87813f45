//! Necromancers: raise skeletons and pulse rings of bone shards
//!
//! The dungeon variant is a boss: minions die with it and its death drops a
//! weapon enchantment.

use glam::Vec2;
use rand::Rng;

use super::{angle_to_hero, enemy_bullet, fire, just_entered, retreat_point, ring_angles, sees_hero, wander};
use super::slime::SKELETON;
use crate::polar_to_cartesian;
use crate::render::Canvas;
use crate::sim::bullet::{Bullet, BulletSource};
use crate::sim::enemy::{Enemy, EnemyBehavior, EnemyDefinition, StatFactors};
use crate::sim::items::Enchantment;
use crate::sim::state::GameState;

/// Telegraph before a nova's shards become harmful
const NOVA_WARNING: f32 = 500.0;
/// Blight pools linger under the hero, armed after a telegraph
const BLIGHT_RADIUS: f32 = 45.0;
const BLIGHT_DURATION: f32 = 3500.0;
const BLIGHT_WARNING: f32 = 700.0;

pub struct NecromancerBehavior {
    pub sight: f32,
    pub max_minions: usize,
    pub nova_bullets: usize,
    /// Drops a weapon enchantment when killed as a boss
    pub drops_enchantment: bool,
    /// Blight pool damage per second, as a fraction of hit damage; 0 disables
    pub blight: f32,
}

impl NecromancerBehavior {
    fn live_minions(state: &GameState, enemy: &Enemy) -> usize {
        enemy
            .minions
            .iter()
            .filter(|id| state.enemies.get(id).is_some_and(|m| m.is_alive()))
            .count()
    }

    fn summon(&self, state: &mut GameState, enemy: &mut Enemy) {
        let offset = polar_to_cartesian(enemy.radius * 2.0, state.rng.random_range(0.0..std::f32::consts::TAU));
        let id = state.spawn_enemy(&SKELETON, enemy.pos + offset, enemy.home, enemy.level);
        if let Some(minion) = state.enemies.get_mut(&id) {
            minion.master = Some(enemy.id);
        }
        enemy.minions.push(id);
    }

    /// Rot the ground under the hero
    fn spread_blight(&self, state: &mut GameState, enemy: &Enemy) {
        let pool = Bullet::new(
            BulletSource::Enemy(enemy.id),
            state.hero.pos,
            Vec2::ZERO,
            BLIGHT_RADIUS,
            BLIGHT_DURATION,
            0.0,
        )
        .with_warning(BLIGHT_WARNING)
        .with_damage_over_time(enemy.damage * self.blight);
        fire(state, pool);
    }
}

impl EnemyBehavior for NecromancerBehavior {
    fn update(&self, state: &mut GameState, enemy: &mut Enemy) {
        enemy.minions.retain(|id| state.enemies.contains_key(id));
        match enemy.mode {
            "choose" => {
                if !sees_hero(state, enemy, self.sight) {
                    wander(state, enemy, 0.5);
                } else if Self::live_minions(state, enemy) < self.max_minions {
                    enemy.set_mode("summon");
                } else {
                    enemy.set_mode("nova");
                }
            }
            "summon" => {
                if just_entered(enemy) && self.blight > 0.0 {
                    self.spread_blight(state, enemy);
                }
                if enemy.mode_time >= 800.0 {
                    self.summon(state, enemy);
                    enemy.set_mode("rest");
                }
            }
            "nova" => {
                if just_entered(enemy) {
                    let offset = angle_to_hero(state, enemy);
                    for theta in ring_angles(self.nova_bullets, offset) {
                        let shard = enemy_bullet(enemy, theta, 180.0, 9.0, 2200.0).with_warning(NOVA_WARNING);
                        fire(state, shard);
                    }
                }
                if enemy.mode_time >= NOVA_WARNING {
                    enemy.set_mode("rest");
                }
            }
            "rest" => {
                if enemy.pos.distance(state.hero.pos) < 200.0 {
                    let away = retreat_point(enemy.pos, state.hero.pos, 60.0);
                    enemy.move_toward(away, 0.7);
                }
                if enemy.mode_time >= enemy.attack_cooldown() {
                    enemy.set_mode("choose");
                }
            }
            _ => enemy.set_mode("choose"),
        }
    }

    fn render(&self, canvas: &mut dyn Canvas, _state: &GameState, enemy: &Enemy) {
        canvas.fill_circle(enemy.pos, enemy.radius, enemy.definition.color);
        if self.drops_enchantment {
            canvas.stroke_circle(enemy.pos, enemy.radius + 6.0, 3.0, 0x9040c0);
            let label_pos = enemy.pos - Vec2::new(0.0, enemy.radius + 16.0);
            canvas.label(label_pos, enemy.definition.name, 0xffffff);
        }
    }

    /// Minions crumble with their master
    fn on_death(&self, state: &mut GameState, enemy: &mut Enemy) {
        for id in &enemy.minions {
            if let Some(minion) = state.enemies.get_mut(id) {
                minion.life = 0.0;
            }
        }
    }

    fn get_enchantment(&self, state: &mut GameState, _enemy: &Enemy) -> Option<Enchantment> {
        if !self.drops_enchantment {
            return None;
        }
        let index = state.rng.random_range(0..Enchantment::WEAPON.len());
        Some(Enchantment::WEAPON[index])
    }
}

pub static NECROMANCER: EnemyDefinition = EnemyDefinition::new(
    "Necromancer",
    &NecromancerBehavior {
        sight: 900.0,
        max_minions: 4,
        nova_bullets: 16,
        drops_enchantment: true,
        blight: 0.4,
    },
)
.with_radius(40.0)
.with_color(0x4a2a6a)
.with_drop_chance(1.0)
.with_portal_chance(0.25)
.with_experience_factor(10.0)
.with_stat_factors(StatFactors {
    max_life: 8.0,
    damage: 1.5,
    armor: 1.5,
    attack_speed: 0.8,
    speed: 0.7,
});

pub static NECROMANCER_ADEPT: EnemyDefinition = EnemyDefinition::new(
    "Necromancer Adept",
    &NecromancerBehavior {
        sight: 500.0,
        max_minions: 2,
        nova_bullets: 8,
        drops_enchantment: false,
        blight: 0.0,
    },
)
.with_radius(24.0)
.with_color(0x6a4a8a)
.with_drop_chance(0.3)
.with_experience_factor(3.0)
.with_stat_factors(StatFactors {
    max_life: 1.5,
    damage: 1.0,
    armor: 0.8,
    attack_speed: 0.5,
    speed: 0.8,
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_LENGTH;
    use crate::content::spawn_near_hero;

    fn step(state: &mut GameState, enemy: &mut Enemy) {
        enemy.mode_time += FRAME_LENGTH;
        enemy.definition.behavior.update(state, enemy);
    }

    #[test]
    fn test_summons_minions_with_master() {
        let mut state = GameState::new(41);
        state.enemies.clear();
        let id = spawn_near_hero(&mut state, &NECROMANCER_ADEPT, Vec2::new(300.0, 0.0));
        let mut enemy = state.enemies.remove(&id).unwrap_or_else(|| panic!("missing"));
        step(&mut state, &mut enemy);
        assert_eq!(enemy.mode, "summon");
        for _ in 0..40 {
            step(&mut state, &mut enemy);
        }
        assert_eq!(enemy.minions.len(), 1);
        let minion = &state.enemies[&enemy.minions[0]];
        assert_eq!(minion.master, Some(id));
        assert_eq!(minion.definition.name, SKELETON.name);
        assert_eq!(minion.home, enemy.home);
    }

    #[test]
    fn test_nova_is_telegraphed_ring() {
        let mut state = GameState::new(41);
        state.enemies.clear();
        let id = spawn_near_hero(&mut state, &NECROMANCER_ADEPT, Vec2::new(300.0, 0.0));
        let mut enemy = state.enemies.remove(&id).unwrap_or_else(|| panic!("missing"));
        enemy.set_mode("nova");
        step(&mut state, &mut enemy);
        assert_eq!(state.enemy_bullets.len(), 8);
        assert!(state.enemy_bullets.iter().all(|b| !b.is_armed()));
        // Only fires on entry
        step(&mut state, &mut enemy);
        assert_eq!(state.enemy_bullets.len(), 8);
    }

    #[test]
    fn test_death_takes_minions_along() {
        let mut state = GameState::new(41);
        state.enemies.clear();
        let id = spawn_near_hero(&mut state, &NECROMANCER, Vec2::new(300.0, 0.0));
        let mut enemy = state.enemies.remove(&id).unwrap_or_else(|| panic!("missing"));
        let behavior = NecromancerBehavior {
            sight: 900.0,
            max_minions: 4,
            nova_bullets: 16,
            drops_enchantment: true,
            blight: 0.4,
        };
        behavior.summon(&mut state, &mut enemy);
        behavior.summon(&mut state, &mut enemy);
        NECROMANCER.behavior.on_death(&mut state, &mut enemy);
        assert!(enemy.minions.iter().all(|m| state.enemies[m].life == 0.0));

        let enchantment = NECROMANCER.behavior.get_enchantment(&mut state, &enemy);
        assert!(enchantment.is_some_and(|e| Enchantment::WEAPON.contains(&e)));
        assert!(NECROMANCER_ADEPT.behavior.get_enchantment(&mut state, &enemy).is_none());
    }

    #[test]
    fn test_boss_blights_ground_under_hero() {
        let mut state = GameState::new(41);
        state.enemies.clear();
        let id = spawn_near_hero(&mut state, &NECROMANCER, Vec2::new(300.0, 0.0));
        let mut enemy = state.enemies.remove(&id).unwrap_or_else(|| panic!("missing"));
        enemy.set_mode("summon");
        step(&mut state, &mut enemy);
        assert_eq!(state.enemy_bullets.len(), 1);
        let pool = &state.enemy_bullets[0];
        assert_eq!(pool.pos, state.hero.pos);
        assert!(!pool.is_armed());
        assert!((pool.damage_over_time - enemy.damage * 0.4).abs() < 1e-4);

        // The adept never blights
        let id = spawn_near_hero(&mut state, &NECROMANCER_ADEPT, Vec2::new(-300.0, 0.0));
        let mut adept = state.enemies.remove(&id).unwrap_or_else(|| panic!("missing"));
        adept.set_mode("summon");
        step(&mut state, &mut adept);
        assert_eq!(state.enemy_bullets.len(), 1);
    }
}
