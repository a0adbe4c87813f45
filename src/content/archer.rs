//! Archers: keep their distance and loose telegraphed arrows

use super::{angle_to_hero, enemy_bullet, fire, just_entered, retreat_point, sees_hero, wander};
use crate::sim::enemy::{Enemy, EnemyBehavior, EnemyDefinition, StatFactors};
use crate::sim::state::GameState;

pub struct ArcherBehavior {
    pub range: f32,
    /// Hero closer than this makes the archer back off
    pub comfort: f32,
    /// Time spent drawing before the shot (ms)
    pub aim_time: f32,
    pub arrow_speed: f32,
    /// Arrows per volley, fanned around the aim line
    pub arrows: usize,
}

impl EnemyBehavior for ArcherBehavior {
    fn update(&self, state: &mut GameState, enemy: &mut Enemy) {
        match enemy.mode {
            "choose" => {
                if sees_hero(state, enemy, self.range) {
                    enemy.set_mode("aim");
                } else {
                    wander(state, enemy, 0.6);
                }
            }
            "aim" => {
                enemy.theta = angle_to_hero(state, enemy);
                if enemy.pos.distance(state.hero.pos) < self.comfort {
                    let away = retreat_point(enemy.pos, state.hero.pos, 50.0);
                    enemy.move_toward(away, 0.8);
                    enemy.theta = angle_to_hero(state, enemy);
                }
                if enemy.mode_time >= self.aim_time {
                    let spread = 0.15;
                    let first = enemy.theta - spread * (self.arrows as f32 - 1.0) / 2.0;
                    for i in 0..self.arrows {
                        let arrow = enemy_bullet(enemy, first + spread * i as f32, self.arrow_speed, 6.0, 1500.0);
                        fire(state, arrow);
                    }
                    enemy.set_mode("reload");
                }
            }
            "reload" => {
                if just_entered(enemy) {
                    enemy.params.remove("wander");
                }
                if enemy.mode_time >= enemy.attack_cooldown() {
                    enemy.set_mode("choose");
                }
            }
            _ => enemy.set_mode("choose"),
        }
    }
}

const ARCHER_BASE: EnemyDefinition = EnemyDefinition::new(
    "Archer",
    &ArcherBehavior {
        range: 500.0,
        comfort: 200.0,
        aim_time: 600.0,
        arrow_speed: 400.0,
        arrows: 1,
    },
)
.with_color(0xb5793a)
.with_drop_chance(0.15)
.with_stat_factors(StatFactors {
    max_life: 0.7,
    damage: 1.0,
    armor: 0.5,
    attack_speed: 0.8,
    speed: 0.9,
});

pub static ARCHER: EnemyDefinition = ARCHER_BASE;

pub static SNIPER: EnemyDefinition = ARCHER_BASE
    .named("Sniper")
    .with_color(0x6b4a2a)
    .with_experience_factor(1.5)
    .with_behavior(&ArcherBehavior {
        range: 800.0,
        comfort: 350.0,
        aim_time: 1000.0,
        arrow_speed: 700.0,
        arrows: 3,
    });

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_LENGTH;
    use crate::content::spawn_near_hero;
    use crate::sim::bullet::BulletSource;
    use glam::Vec2;

    #[test]
    fn test_archer_fires_after_aiming() {
        let mut state = GameState::new(12);
        state.enemies.clear();
        let id = spawn_near_hero(&mut state, &ARCHER, Vec2::new(300.0, 0.0));
        let mut enemy = state.enemies.remove(&id).unwrap_or_else(|| panic!("missing"));
        let mut fired_at = None;
        for frame in 0..60 {
            enemy.mode_time += FRAME_LENGTH;
            ARCHER.behavior.update(&mut state, &mut enemy);
            if fired_at.is_none() && !state.enemy_bullets.is_empty() {
                fired_at = Some(frame);
            }
        }
        // One frame to choose, then 600 ms of aiming
        assert_eq!(fired_at, Some(30));
        let arrow = &state.enemy_bullets[0];
        assert_eq!(arrow.source, BulletSource::Enemy(id));
        assert!(arrow.vel.x < 0.0, "arrow flies toward the hero");
    }

    #[test]
    fn test_sniper_fans_three_arrows() {
        let mut state = GameState::new(12);
        state.enemies.clear();
        let id = spawn_near_hero(&mut state, &SNIPER, Vec2::new(0.0, 600.0));
        let mut enemy = state.enemies.remove(&id).unwrap_or_else(|| panic!("missing"));
        for _ in 0..60 {
            enemy.mode_time += FRAME_LENGTH;
            SNIPER.behavior.update(&mut state, &mut enemy);
        }
        assert_eq!(state.enemy_bullets.len(), 3);
    }
}
