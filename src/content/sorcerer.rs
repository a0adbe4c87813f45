//! Sorcerers: ring themselves with orbiting wards, then hurl homing bolts

use rand::Rng;

use super::{angle_to_hero, enemy_bullet, fire, just_entered, retreat_point, ring_angles, sees_hero, wander};
use crate::render::Canvas;
use crate::sim::bullet::{Bullet, BulletBehavior, BulletSource, OrbitCenter, SeekTarget};
use crate::sim::enemy::{Enemy, EnemyBehavior, EnemyDefinition, StatFactors};
use crate::sim::items::Enchantment;
use crate::sim::state::GameState;

pub struct SorcererBehavior {
    pub sight: f32,
    /// Preferred distance to the hero
    pub comfort: f32,
    pub wards: usize,
    pub bolts: usize,
    pub drops_enchantment: bool,
}

impl EnemyBehavior for SorcererBehavior {
    fn update(&self, state: &mut GameState, enemy: &mut Enemy) {
        match enemy.mode {
            "choose" => {
                if sees_hero(state, enemy, self.sight) {
                    enemy.set_mode("conjure");
                } else {
                    wander(state, enemy, 0.5);
                }
            }
            "conjure" => {
                if just_entered(enemy) {
                    let id = enemy.id;
                    for theta in ring_angles(self.wards, enemy.theta) {
                        let ward = Bullet::orbiting(
                            BulletSource::Enemy(id),
                            OrbitCenter::Enemy(id),
                            enemy.pos,
                            theta,
                            2.5,
                            enemy.radius + 45.0,
                            10.0,
                            4000.0,
                            enemy.damage * 0.5,
                        );
                        fire(state, ward);
                    }
                }
                if enemy.mode_time >= 1000.0 {
                    enemy.set_mode("volley");
                }
            }
            "volley" => {
                if just_entered(enemy) {
                    let aim = angle_to_hero(state, enemy);
                    let spread = 0.4;
                    let first = aim - spread * (self.bolts as f32 - 1.0) / 2.0;
                    for i in 0..self.bolts {
                        let bolt = enemy_bullet(enemy, first + spread * i as f32, 260.0, 10.0, 2500.0).with_behavior(
                            BulletBehavior::Seeking {
                                target: SeekTarget::Hero,
                                turn_rate: 1.2,
                            },
                        );
                        fire(state, bolt);
                    }
                }
                if enemy.mode_time >= 400.0 {
                    enemy.set_mode("rest");
                }
            }
            "rest" => {
                if enemy.pos.distance(state.hero.pos) < self.comfort {
                    let away = retreat_point(enemy.pos, state.hero.pos, 60.0);
                    enemy.move_toward(away, 0.9);
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
            canvas.stroke_circle(enemy.pos, enemy.radius + 6.0, 3.0, 0x40a0e0);
            let label_pos = enemy.pos - glam::Vec2::new(0.0, enemy.radius + 16.0);
            canvas.label(label_pos, enemy.definition.name, 0xffffff);
        }
    }

    fn get_enchantment(&self, state: &mut GameState, _enemy: &Enemy) -> Option<Enchantment> {
        if !self.drops_enchantment {
            return None;
        }
        let index = state.rng.random_range(0..Enchantment::ARMOR.len());
        Some(Enchantment::ARMOR[index])
    }
}

pub static SORCERER: EnemyDefinition = EnemyDefinition::new(
    "Sorcerer",
    &SorcererBehavior {
        sight: 600.0,
        comfort: 250.0,
        wards: 2,
        bolts: 1,
        drops_enchantment: false,
    },
)
.with_color(0x3a6ad0)
.with_drop_chance(0.2)
.with_experience_factor(1.6)
.with_stat_factors(StatFactors {
    max_life: 0.9,
    damage: 1.1,
    armor: 0.6,
    attack_speed: 0.5,
    speed: 0.9,
});

pub static ARCHMAGE: EnemyDefinition = EnemyDefinition::new(
    "Archmage",
    &SorcererBehavior {
        sight: 1000.0,
        comfort: 350.0,
        wards: 6,
        bolts: 5,
        drops_enchantment: true,
    },
)
.with_radius(38.0)
.with_color(0x1a3a90)
.with_drop_chance(1.0)
.with_portal_chance(0.25)
.with_experience_factor(10.0)
.with_stat_factors(StatFactors {
    max_life: 7.0,
    damage: 1.4,
    armor: 1.2,
    attack_speed: 0.7,
    speed: 0.8,
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_LENGTH;
    use crate::content::spawn_near_hero;
    use glam::Vec2;

    #[test]
    fn test_conjures_wards_then_volleys() {
        let mut state = GameState::new(51);
        state.enemies.clear();
        let id = spawn_near_hero(&mut state, &ARCHMAGE, Vec2::new(0.0, 400.0));
        let mut enemy = state.enemies.remove(&id).unwrap_or_else(|| panic!("missing"));
        let step = |state: &mut GameState, enemy: &mut Enemy| {
            enemy.mode_time += FRAME_LENGTH;
            ARCHMAGE.behavior.update(state, enemy);
        };
        step(&mut state, &mut enemy);
        assert_eq!(enemy.mode, "conjure");
        step(&mut state, &mut enemy);
        assert_eq!(state.enemy_bullets.len(), 6);
        assert!(state
            .enemy_bullets
            .iter()
            .all(|b| matches!(b.behavior, BulletBehavior::Circling { center: OrbitCenter::Enemy(c), .. } if c == id)));

        for _ in 0..50 {
            step(&mut state, &mut enemy);
        }
        assert_eq!(enemy.mode, "volley");
        assert_eq!(state.enemy_bullets.len(), 11);
    }

    #[test]
    fn test_archmage_drops_armor_enchantment() {
        let mut state = GameState::new(51);
        state.enemies.clear();
        let id = spawn_near_hero(&mut state, &ARCHMAGE, Vec2::new(0.0, 400.0));
        let enemy = state.enemies[&id].clone();
        let enchantment = ARCHMAGE.behavior.get_enchantment(&mut state, &enemy);
        assert!(enchantment.is_some_and(|e| Enchantment::ARMOR.contains(&e)));
        assert!(SORCERER.behavior.get_enchantment(&mut state, &enemy).is_none());
    }
}
