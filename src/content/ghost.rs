//! Ghosts: drift after the hero, then fade out of reach

use super::{angle_to_hero, enemy_bullet, fire, sees_hero, wander};
use crate::render::Canvas;
use crate::sim::enemy::{Enemy, EnemyBehavior, EnemyDefinition, StatFactors};
use crate::sim::state::GameState;

const HAUNT_TIME: f32 = 2500.0;
const FADE_TIME: f32 = 1500.0;

pub struct GhostBehavior;

impl EnemyBehavior for GhostBehavior {
    fn update(&self, state: &mut GameState, enemy: &mut Enemy) {
        match enemy.mode {
            "choose" => {
                enemy.invulnerable = false;
                if sees_hero(state, enemy, 550.0) {
                    enemy.set_mode("haunt");
                } else {
                    wander(state, enemy, 0.4);
                }
            }
            "haunt" => {
                enemy.move_toward(state.hero.pos, 0.6);
                let cooldown = enemy.params.number("shot_cooldown") - crate::consts::FRAME_LENGTH;
                if cooldown <= 0.0 {
                    let wisp = enemy_bullet(enemy, angle_to_hero(state, enemy), 220.0, 8.0, 2500.0)
                        .with_wave(30.0, 1.5);
                    fire(state, wisp);
                    enemy.params.set_number("shot_cooldown", enemy.attack_cooldown());
                } else {
                    enemy.params.set_number("shot_cooldown", cooldown);
                }
                if enemy.mode_time >= HAUNT_TIME {
                    enemy.set_mode("fade");
                }
            }
            "fade" => {
                enemy.invulnerable = true;
                if enemy.mode_time >= FADE_TIME {
                    enemy.invulnerable = false;
                    enemy.set_mode("choose");
                }
            }
            _ => enemy.set_mode("choose"),
        }
    }

    fn render(&self, canvas: &mut dyn Canvas, _state: &GameState, enemy: &Enemy) {
        if enemy.invulnerable {
            canvas.stroke_circle(enemy.pos, enemy.radius, 2.0, enemy.definition.color);
        } else {
            canvas.fill_circle(enemy.pos, enemy.radius, enemy.definition.color);
        }
    }

    /// Half-present even when solid
    fn on_damage(&self, _state: &mut GameState, _enemy: &mut Enemy, damage: f32) -> f32 {
        damage * 0.75
    }
}

pub static GHOST: EnemyDefinition = EnemyDefinition::new("Ghost", &GhostBehavior)
    .with_radius(22.0)
    .with_color(0xc8d8f0)
    .with_drop_chance(0.15)
    .with_experience_factor(1.4)
    .with_stat_factors(StatFactors {
        max_life: 0.9,
        damage: 0.9,
        armor: 0.0,
        attack_speed: 0.6,
        speed: 1.2,
    });
