//! Slimes: melee wanderers that chase the hero on sight

use super::{contact_attack, sees_hero, wander};
use crate::sim::enemy::{Enemy, EnemyBehavior, EnemyDefinition, StatFactors};
use crate::sim::state::GameState;

pub struct SlimeBehavior {
    /// Distance at which the slime starts chasing
    pub sight: f32,
    /// Distance at which it gives up
    pub leash: f32,
}

impl EnemyBehavior for SlimeBehavior {
    fn update(&self, state: &mut GameState, enemy: &mut Enemy) {
        match enemy.mode {
            "choose" => {
                if sees_hero(state, enemy, self.sight) {
                    enemy.set_mode("chase");
                } else {
                    enemy.set_mode("wander");
                }
            }
            "wander" => {
                if sees_hero(state, enemy, self.sight) {
                    enemy.set_mode("chase");
                } else if !wander(state, enemy, 0.5) || enemy.mode_time >= 3000.0 {
                    enemy.set_mode("rest");
                }
            }
            "rest" => {
                if enemy.mode_time >= 800.0 {
                    enemy.set_mode("choose");
                }
            }
            "chase" => {
                if sees_hero(state, enemy, self.leash) {
                    enemy.move_toward(state.hero.pos, 1.0);
                } else {
                    enemy.params.remove("wander");
                    enemy.set_mode("rest");
                }
            }
            _ => enemy.set_mode("choose"),
        }
        contact_attack(state, enemy);
    }
}

const SLIME_BASE: EnemyDefinition = EnemyDefinition::new(
    "Slime",
    &SlimeBehavior {
        sight: 300.0,
        leash: 450.0,
    },
)
.with_color(0x55cc55)
.with_stat_factors(StatFactors {
    max_life: 0.8,
    damage: 0.8,
    armor: 0.5,
    attack_speed: 1.0,
    speed: 0.8,
});

pub static SLIME: EnemyDefinition = SLIME_BASE;

pub static BIG_SLIME: EnemyDefinition = SLIME_BASE
    .named("Big Slime")
    .with_radius(34.0)
    .with_color(0x2f9a3f)
    .with_drop_chance(0.25)
    .with_experience_factor(2.0)
    .with_stat_factors(StatFactors {
        max_life: 2.5,
        damage: 1.5,
        armor: 1.0,
        attack_speed: 0.7,
        speed: 0.6,
    });

/// Necromancer minion; also roams dark biomes on its own
pub static SKELETON: EnemyDefinition = EnemyDefinition::new(
    "Skeleton",
    &SlimeBehavior {
        sight: 450.0,
        leash: 700.0,
    },
)
.with_radius(18.0)
.with_color(0xe8e2d0)
.with_drop_chance(0.05)
.with_experience_factor(0.6)
.with_stat_factors(StatFactors {
    max_life: 0.6,
    damage: 0.7,
    armor: 1.5,
    attack_speed: 1.2,
    speed: 1.1,
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::spawn_near_hero;
    use glam::Vec2;

    fn run(state: &mut GameState, id: crate::sim::enemy::EnemyId, frames: usize) {
        for _ in 0..frames {
            let Some(mut enemy) = state.enemies.remove(&id) else {
                return;
            };
            enemy.mode_time += crate::consts::FRAME_LENGTH;
            enemy.definition.behavior.update(state, &mut enemy);
            state.enemies.insert(id, enemy);
        }
    }

    #[test]
    fn test_slime_chases_visible_hero() {
        let mut state = GameState::new(9);
        state.enemies.clear();
        let id = spawn_near_hero(&mut state, &SLIME, Vec2::new(200.0, 0.0));
        run(&mut state, id, 3);
        let enemy = &state.enemies[&id];
        assert_eq!(enemy.mode, "chase");
        assert!(enemy.pos.x < state.hero.pos.x + 200.0);
    }

    #[test]
    fn test_slime_wanders_when_alone() {
        let mut state = GameState::new(9);
        state.enemies.clear();
        let id = spawn_near_hero(&mut state, &SLIME, Vec2::new(5000.0, 0.0));
        run(&mut state, id, 2);
        assert_eq!(state.enemies[&id].mode, "wander");
    }
}
