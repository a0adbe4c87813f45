//! Disc Hero - simulation core of a disc-platform action RPG
//!
//! Core modules:
//! - `random`: Seeded xorshift generator used by every procedural system
//! - `sim`: Deterministic simulation (hero, enemies, bullets, combat, tick)
//! - `world`: Procedural overworld cells and dungeons built from disc graphs
//! - `content`: Enemy and boss definitions driving the simulation
//! - `render`: Read-only rendering boundary for the presentation layer
//! - `persistence`: Save/load of recipe data through a key-value store
//! - `settings`: Player-facing configuration

pub mod content;
pub mod persistence;
pub mod random;
pub mod render;
pub mod settings;
pub mod sim;
pub mod world;

pub use random::Random;
pub use settings::{Difficulty, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (50 Hz)
    pub const FRAME_LENGTH: f32 = 20.0;
    /// Fixed simulation timestep in seconds
    pub const FRAME_SECONDS: f32 = FRAME_LENGTH / 1000.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Side length of an overworld cell
    pub const CELL_SIZE: f32 = 2000.0;
    /// Number of generated cells kept in memory
    pub const CELL_CACHE_CAPACITY: usize = 100;
    /// Distance around the hero whose cells must be loaded
    pub const VISIBILITY_RADIUS: f32 = 1200.0;

    /// Two discs are linked when they overlap by at least this much
    pub const LINK_MARGIN: f32 = 16.0;
    /// Overlap used when attaching generated discs to the graph
    pub const GENERATION_OVERLAP: f32 = 32.0;
    /// Placed discs may not overlap any other disc by more than this
    pub const MAX_GENERATION_OVERLAP: f32 = 64.0;
    /// Shrink-and-retry attempts before a candidate disc is discarded
    pub const PLACEMENT_ATTEMPTS: u32 = 3;
    /// Radius multiplier applied on every failed placement attempt
    pub const PLACEMENT_SHRINK: f32 = 0.75;

    /// Hero defaults
    pub const HERO_RADIUS: f32 = 20.0;
    pub const HERO_SPEED: f32 = 250.0;
    pub const HERO_BASE_DAMAGE: f32 = 8.0;
    pub const HERO_DAMAGE_GROWTH: f32 = 1.15;
    pub const HERO_BASE_ATTACKS_PER_SECOND: f32 = 1.5;
    pub const HERO_ATTACK_SPEED_PER_LEVEL: f32 = 0.02;
    pub const HERO_BASE_LIFE: f32 = 100.0;
    pub const HERO_LIFE_GROWTH: f32 = 1.15;
    /// Window (in frames) over which burst damage to the hero is capped
    pub const HERO_DAMAGE_FRAME_COUNT: u64 = 5;
    /// Charge needed to arm a charged attack
    pub const MAX_CHARGE: f32 = 1.0;
    pub const CHARGED_DAMAGE_MULTIPLIER: f32 = 3.0;
    pub const CHARGED_SIZE_MULTIPLIER: f32 = 1.5;
    /// Charge granted by a full-strength shot's first hit
    pub const CHARGE_PER_HIT: f32 = 0.05;

    /// Experience (f64 so the ceil'd curves land on exact integers)
    pub const BASE_XP: f64 = 5.0;
    pub const XP_GROWTH: f64 = 1.2;

    /// Enemy scaling
    pub const ENEMY_BASE_SPEED: f32 = 100.0;
    /// Seconds a level-0 enemy with `max_life = 1` should survive the hero
    pub const BASE_FIGHT_DURATION: f32 = 2.0;
    pub const FIGHT_DURATION_PER_LEVEL: f32 = 0.05;
    /// Fraction of hero life a `damage = 1` enemy hit removes
    pub const ENEMY_DAMAGE_FRACTION: f32 = 0.1;
    pub const ENEMY_ARMOR_FRACTION: f32 = 0.5;
    /// Random spread applied to enemy speed (+/-)
    pub const SPEED_JITTER: f32 = 0.1;
    /// Time after a boss fight starts before the boss activates (ms)
    pub const BOSS_INTRO_DURATION: f32 = 1000.0;

    /// Sine offsets of wavy bullets ramp in over this many ms
    pub const WAVE_RAMP_DURATION: f32 = 200.0;

    /// Loot and portals
    pub const LOOT_RADIUS: f32 = 16.0;
    pub const ACTIVE_LOOT_RANGE: f32 = 60.0;
    pub const PORTAL_RADIUS: f32 = 40.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Rotate `theta` toward `target` by at most `delta`, taking the shorter way around
pub fn turn_towards_angle(theta: f32, delta: f32, target: f32) -> f32 {
    let diff = normalize_angle(target - theta);
    if diff.abs() <= delta {
        return normalize_angle(target);
    }
    normalize_angle(theta + delta.copysign(diff))
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Angle of a vector in radians
#[inline]
pub fn heading(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(1.5 * PI) + PI / 2.0).abs() < 1e-5);
        assert!((normalize_angle(-2.5 * PI) + PI / 2.0).abs() < 1e-5);
        assert!((normalize_angle(-PI / 2.0) + PI / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_turn_towards_takes_short_way() {
        // Target is 179° away counter-clockwise: the short way is positive
        let theta = turn_towards_angle(0.0, 0.1, PI - 0.05);
        assert!((theta - 0.1).abs() < 1e-6);

        // Mirror image turns negative
        let theta = turn_towards_angle(0.0, 0.1, -(PI - 0.05));
        assert!((theta + 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_turn_towards_crosses_seam() {
        // From just below +π toward just above -π: cross the seam, don't sweep back through 0
        let theta = turn_towards_angle(PI - 0.05, 0.1, -PI + 0.05);
        assert!((theta - (-PI + 0.05)).abs() < 1e-5);

        let theta = turn_towards_angle(PI - 0.05, 0.06, -PI + 0.2);
        assert!(theta < 0.0, "should wrap to the negative side, got {theta}");
        assert!((theta - (-PI + 0.01)).abs() < 1e-4);
    }

    #[test]
    fn test_turn_towards_never_overshoots() {
        let theta = turn_towards_angle(1.0, 0.5, 1.2);
        assert!((theta - 1.2).abs() < 1e-6);
        for step in 0..50 {
            let start = step as f32 * 0.13 - 3.0;
            let next = turn_towards_angle(start, 0.2, 2.5);
            assert!(normalize_angle(next - start).abs() <= 0.2 + 1e-5);
        }
    }
}
