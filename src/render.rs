//! Rendering boundary
//!
//! The simulation never draws. A presentation layer implements [`Canvas`]
//! and calls [`render_scene`] with a shared borrow of the state once per
//! displayed frame.

use glam::Vec2;

use crate::sim::state::GameState;

const PORTAL_COLOR: u32 = 0x8040ff;
const LOOT_COLOR: u32 = 0xffd040;
const HERO_COLOR: u32 = 0xf0f0f0;
const HERO_BULLET_COLOR: u32 = 0xfff6a0;
const ENEMY_BULLET_COLOR: u32 = 0xff5050;
const HOLE_COLOR: u32 = 0x101018;

/// Drawing surface; colors are 0xRRGGBB
pub trait Canvas {
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: u32);
    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: u32);
    fn label(&mut self, pos: Vec2, text: &str, color: u32);
}

/// Draw everything near the hero, back to front
pub fn render_scene(canvas: &mut dyn Canvas, state: &GameState) {
    let discs = state.active_disc_list();
    for disc in &discs {
        canvas.fill_circle(disc.pos, disc.radius, disc.biome.color());
    }
    for disc in &discs {
        for hole in &disc.holes {
            canvas.fill_circle(hole.pos, hole.radius, HOLE_COLOR);
        }
        for portal in &disc.portals {
            canvas.stroke_circle(portal.pos, portal.radius, 4.0, PORTAL_COLOR);
        }
        for loot in &disc.loot {
            canvas.fill_circle(loot.pos, loot.radius, LOOT_COLOR);
        }
    }
    let selected = state
        .active_loot
        .and_then(|selected| state.disc(selected.disc)?.loot.get(selected.index));
    if let Some(loot) = selected {
        canvas.stroke_circle(loot.pos, loot.radius + 4.0, 2.0, LOOT_COLOR);
        canvas.label(loot.pos + Vec2::new(0.0, -loot.radius - 12.0), &loot.item.name(), LOOT_COLOR);
    }

    for enemy in state.active_enemies() {
        enemy.definition.behavior.render(canvas, state, enemy);
    }

    for bullet in &state.enemy_bullets {
        if bullet.is_armed() {
            canvas.fill_circle(bullet.pos, bullet.radius, ENEMY_BULLET_COLOR);
        } else {
            // Telegraphed, not yet dangerous
            canvas.stroke_circle(bullet.pos, bullet.radius, 1.0, ENEMY_BULLET_COLOR);
        }
    }
    for bullet in &state.hero_bullets {
        canvas.fill_circle(bullet.pos, bullet.radius, HERO_BULLET_COLOR);
    }

    let hero = &state.hero;
    canvas.fill_circle(hero.pos, hero.radius, HERO_COLOR);
    if hero.charged_attack {
        canvas.stroke_circle(hero.pos, hero.radius + 4.0, 2.0, HERO_BULLET_COLOR);
    }

    let intro = state
        .boss_fight
        .filter(|fight| !fight.is_active())
        .and_then(|fight| state.enemies.get(&fight.boss));
    if let Some(boss) = intro {
        canvas.label(hero.pos + Vec2::new(0.0, -120.0), boss.definition.name, 0xffffff);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Call {
        Fill(Vec2, f32, u32),
        Stroke(Vec2, f32, u32),
        Label(String),
    }

    #[derive(Default)]
    struct RecordingCanvas {
        calls: Vec<Call>,
    }

    impl Canvas for RecordingCanvas {
        fn fill_circle(&mut self, center: Vec2, radius: f32, color: u32) {
            self.calls.push(Call::Fill(center, radius, color));
        }

        fn stroke_circle(&mut self, center: Vec2, radius: f32, _width: f32, color: u32) {
            self.calls.push(Call::Stroke(center, radius, color));
        }

        fn label(&mut self, _pos: Vec2, text: &str, _color: u32) {
            self.calls.push(Call::Label(text.to_string()));
        }
    }

    #[test]
    fn test_scene_draws_discs_first_and_hero_last() {
        let state = GameState::new(77);
        let mut canvas = RecordingCanvas::default();
        render_scene(&mut canvas, &state);

        let disc_count = state.active_discs.len();
        assert!(canvas.calls.len() > disc_count);
        assert!(canvas.calls[..disc_count].iter().all(|c| matches!(c, Call::Fill(..))));
        assert_eq!(
            canvas.calls.last(),
            Some(&Call::Fill(state.hero.pos, state.hero.radius, HERO_COLOR))
        );
    }
}
