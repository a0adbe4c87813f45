//! Chargers: wind up, then rush in a straight line

use super::{angle_to_hero, contact_attack, sees_hero, wander};
use crate::sim::enemy::{Enemy, EnemyBehavior, EnemyDefinition, StatFactors};
use crate::sim::state::GameState;

const WINDUP_TIME: f32 = 600.0;
const CHARGE_TIME: f32 = 700.0;
const RECOVER_TIME: f32 = 900.0;
const CHARGE_SPEED: f32 = 3.5;

pub struct ChargerBehavior;

impl EnemyBehavior for ChargerBehavior {
    fn update(&self, state: &mut GameState, enemy: &mut Enemy) {
        match enemy.mode {
            "choose" => {
                if sees_hero(state, enemy, 400.0) {
                    enemy.set_mode("windup");
                } else {
                    wander(state, enemy, 0.5);
                }
            }
            "windup" => {
                // Track the hero until the last moment, then lock in
                enemy.theta = angle_to_hero(state, enemy);
                if enemy.mode_time >= WINDUP_TIME {
                    enemy.set_mode("charge");
                }
            }
            "charge" => {
                enemy.move_forward(CHARGE_SPEED);
                contact_attack(state, enemy);
                if enemy.mode_time >= CHARGE_TIME {
                    enemy.set_mode("recover");
                }
            }
            "recover" => {
                if enemy.mode_time >= RECOVER_TIME {
                    enemy.params.remove("wander");
                    enemy.set_mode("choose");
                }
            }
            _ => enemy.set_mode("choose"),
        }
    }

    /// Braced while charging
    fn on_damage(&self, _state: &mut GameState, enemy: &mut Enemy, damage: f32) -> f32 {
        if enemy.mode == "charge" { damage * 0.5 } else { damage }
    }
}

pub static CHARGER: EnemyDefinition = EnemyDefinition::new("Charger", &ChargerBehavior)
    .with_radius(26.0)
    .with_color(0x8a5ac8)
    .with_drop_chance(0.15)
    .with_experience_factor(1.3)
    .with_stat_factors(StatFactors {
        max_life: 1.4,
        damage: 1.8,
        armor: 1.5,
        attack_speed: 1.0,
        speed: 1.0,
    });

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_LENGTH;
    use crate::content::spawn_near_hero;
    use glam::Vec2;

    #[test]
    fn test_charge_locks_direction() {
        let mut state = GameState::new(21);
        state.enemies.clear();
        let id = spawn_near_hero(&mut state, &CHARGER, Vec2::new(0.0, -300.0));
        let mut enemy = state.enemies.remove(&id).unwrap_or_else(|| panic!("missing"));
        let step = |state: &mut GameState, enemy: &mut Enemy| {
            enemy.mode_time += FRAME_LENGTH;
            CHARGER.behavior.update(state, enemy);
        };
        step(&mut state, &mut enemy);
        assert_eq!(enemy.mode, "windup");
        for _ in 0..30 {
            step(&mut state, &mut enemy);
        }
        assert_eq!(enemy.mode, "charge");
        let locked = enemy.theta;
        // Hero sidesteps; the charge keeps its heading
        state.hero.pos.x += 200.0;
        let before = enemy.pos;
        step(&mut state, &mut enemy);
        assert_eq!(enemy.theta, locked);
        assert!(enemy.pos.y > before.y);
    }

    #[test]
    fn test_braced_while_charging() {
        let mut state = GameState::new(21);
        state.enemies.clear();
        let id = spawn_near_hero(&mut state, &CHARGER, Vec2::new(0.0, -300.0));
        let mut enemy = state.enemies.remove(&id).unwrap_or_else(|| panic!("missing"));
        assert_eq!(ChargerBehavior.on_damage(&mut state, &mut enemy, 10.0), 10.0);
        enemy.set_mode("charge");
        assert_eq!(ChargerBehavior.on_damage(&mut state, &mut enemy, 10.0), 5.0);
    }
}
