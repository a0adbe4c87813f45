//! Bullets and their per-frame kinematics
//!
//! A bullet is a plain value; its movement is selected by a swappable
//! [`BulletBehavior`]. Swapping behavior mid-flight is intended: returning
//! shots turn into simple shots, boomerangs turn into source-seekers.

use std::collections::BTreeSet;

use glam::Vec2;

use super::collision::Circle;
use super::enemy::EnemyId;
use super::state::GameState;
use crate::consts::*;
use crate::{heading, normalize_angle, polar_to_cartesian, turn_towards_angle};

/// Turn rate of a boomerang flying home (radians/s)
pub const BOOMERANG_TURN_RATE: f32 = 12.0;

/// Who fired a bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulletSource {
    Hero,
    Enemy(EnemyId),
}

/// Center an orbiting bullet circles around
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrbitCenter {
    Hero,
    Enemy(EnemyId),
    Point(Vec2),
}

/// What a seeking bullet homes in on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekTarget {
    /// Nearest live enemy not yet hit by this bullet
    Enemies,
    Hero,
    /// Whoever fired the bullet
    Source,
}

/// Per-frame movement rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BulletBehavior {
    /// Straight line with optional sine weave and friction
    Simple,
    /// Orbit a moving center at a fixed radius
    Circling {
        center: OrbitCenter,
        theta: f32,
        /// Angular velocity (radians/s)
        v_theta: f32,
        orbit_radius: f32,
    },
    /// Simple until half the lifetime, then reverse and become Simple
    Returning,
    /// Simple until half the lifetime, then seek the source
    Boomerang,
    /// Turn toward a target by at most `turn_rate` (radians/s), then Simple
    Seeking { target: SeekTarget, turn_rate: f32 },
}

/// A projectile
#[derive(Debug, Clone)]
pub struct Bullet {
    /// Unperturbed center (before wave offset)
    pub base_pos: Vec2,
    /// Rendered/collision position
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Lifetime in ms
    pub duration: f32,
    /// Elapsed ms
    pub time: f32,
    /// Telegraph ms remaining; no hits while positive
    pub warning_time: f32,
    pub damage: f32,
    /// Damage per second applied while overlapping
    pub damage_over_time: f32,
    pub armor_shred: f32,
    /// Charge granted to the hero on the next enemy hit
    pub charge_gain: f32,
    pub hit_targets: BTreeSet<EnemyId>,
    pub is_enemy_piercing: bool,
    /// Set once a non-piercing bullet hits; removed at end of frame
    pub consumed: bool,
    pub amplitude: f32,
    /// Weave cycles per second
    pub frequency: f32,
    /// Fraction of speed lost per second
    pub friction: f32,
    pub source: BulletSource,
    pub behavior: BulletBehavior,
}

impl Bullet {
    pub fn new(source: BulletSource, pos: Vec2, vel: Vec2, radius: f32, duration: f32, damage: f32) -> Self {
        Self {
            base_pos: pos,
            pos,
            vel,
            radius,
            duration,
            time: 0.0,
            warning_time: 0.0,
            damage,
            damage_over_time: 0.0,
            armor_shred: 0.0,
            charge_gain: 0.0,
            hit_targets: BTreeSet::new(),
            is_enemy_piercing: false,
            consumed: false,
            amplitude: 0.0,
            frequency: 0.0,
            friction: 0.0,
            source,
            behavior: BulletBehavior::Simple,
        }
    }

    /// A bullet orbiting `center` (currently at `center_pos`)
    #[allow(clippy::too_many_arguments)]
    pub fn orbiting(
        source: BulletSource,
        center: OrbitCenter,
        center_pos: Vec2,
        theta: f32,
        v_theta: f32,
        orbit_radius: f32,
        radius: f32,
        duration: f32,
        damage: f32,
    ) -> Self {
        let pos = center_pos + polar_to_cartesian(orbit_radius, theta);
        Self::new(source, pos, Vec2::ZERO, radius, duration, damage).with_behavior(BulletBehavior::Circling {
            center,
            theta,
            v_theta,
            orbit_radius,
        })
    }

    pub fn with_behavior(mut self, behavior: BulletBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn with_warning(mut self, warning_time: f32) -> Self {
        self.warning_time = warning_time;
        self
    }

    pub fn with_wave(mut self, amplitude: f32, frequency: f32) -> Self {
        self.amplitude = amplitude;
        self.frequency = frequency;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_damage_over_time(mut self, damage_per_second: f32) -> Self {
        self.damage_over_time = damage_per_second;
        self
    }

    pub fn with_charge_gain(mut self, charge_gain: f32) -> Self {
        self.charge_gain = charge_gain;
        self
    }

    pub fn piercing(mut self) -> Self {
        self.is_enemy_piercing = true;
        self
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.time >= self.duration
    }

    /// False while the telegraph is still running
    #[inline]
    pub fn is_armed(&self) -> bool {
        self.warning_time <= 0.0
    }

    /// Ready to be filtered out of the bullet list
    #[inline]
    pub fn is_done(&self) -> bool {
        self.is_expired() || self.consumed
    }
}

impl Circle for Bullet {
    fn center(&self) -> Vec2 {
        self.pos
    }

    fn radius(&self) -> f32 {
        self.radius
    }
}

/// Advance one frame: timers, then the current behavior
pub fn advance_bullet(state: &GameState, bullet: &mut Bullet) {
    bullet.time += FRAME_LENGTH;
    if bullet.warning_time > 0.0 {
        bullet.warning_time = (bullet.warning_time - FRAME_LENGTH).max(0.0);
    }
    match bullet.behavior {
        BulletBehavior::Simple => update_simple(bullet),
        BulletBehavior::Circling { .. } => update_circling(state, bullet),
        BulletBehavior::Returning => update_returning(bullet),
        BulletBehavior::Boomerang => update_boomerang(bullet),
        BulletBehavior::Seeking { target, turn_rate } => update_seeking(state, bullet, target, turn_rate),
    }
}

/// Integrate velocity, apply friction and the perpendicular weave
pub fn update_simple(bullet: &mut Bullet) {
    if bullet.friction > 0.0 {
        bullet.vel *= (1.0 - bullet.friction).max(0.0).powf(FRAME_SECONDS);
    }
    bullet.base_pos += bullet.vel * FRAME_SECONDS;
    bullet.pos = bullet.base_pos;
    if bullet.amplitude != 0.0 && bullet.frequency != 0.0 {
        // Ramp the weave in so the bullet doesn't snap sideways at spawn
        let ramp = (bullet.time / WAVE_RAMP_DURATION).min(1.0);
        let normal = bullet.vel.normalize_or_zero().perp();
        let phase = std::f32::consts::TAU * bullet.frequency * bullet.time / 1000.0;
        bullet.pos += normal * bullet.amplitude * ramp * phase.sin();
    }
}

fn update_circling(state: &GameState, bullet: &mut Bullet) {
    let BulletBehavior::Circling {
        center,
        theta,
        mut v_theta,
        orbit_radius,
    } = bullet.behavior
    else {
        return;
    };
    let Some(center_pos) = orbit_center_position(state, center) else {
        // Source is gone
        bullet.time = bullet.time.max(bullet.duration);
        return;
    };
    if bullet.friction > 0.0 {
        v_theta *= (1.0 - bullet.friction).max(0.0).powf(FRAME_SECONDS);
    }
    let theta = normalize_angle(theta + v_theta * FRAME_SECONDS);
    let offset = polar_to_cartesian(orbit_radius, theta);
    bullet.base_pos = center_pos + offset;
    bullet.pos = bullet.base_pos;
    bullet.vel = offset.perp().normalize_or_zero() * v_theta * orbit_radius;
    bullet.behavior = BulletBehavior::Circling {
        center,
        theta,
        v_theta,
        orbit_radius,
    };
}

fn update_returning(bullet: &mut Bullet) {
    update_simple(bullet);
    if bullet.time >= bullet.duration / 2.0 {
        bullet.vel = -bullet.vel;
        bullet.behavior = BulletBehavior::Simple;
    }
}

fn update_boomerang(bullet: &mut Bullet) {
    update_simple(bullet);
    if bullet.time >= bullet.duration / 2.0 {
        bullet.behavior = BulletBehavior::Seeking {
            target: SeekTarget::Source,
            turn_rate: BOOMERANG_TURN_RATE,
        };
    }
}

fn update_seeking(state: &GameState, bullet: &mut Bullet, target: SeekTarget, turn_rate: f32) {
    if let Some(target_pos) = seek_target_position(state, bullet, target) {
        let speed = bullet.vel.length();
        let desired = heading(target_pos - bullet.base_pos);
        let theta = turn_towards_angle(heading(bullet.vel), turn_rate * FRAME_SECONDS, desired);
        bullet.vel = polar_to_cartesian(speed, theta);
        // A returning boomerang is caught when it reaches its thrower
        if target == SeekTarget::Source && bullet.base_pos.distance(target_pos) <= bullet.radius + HERO_RADIUS {
            bullet.time = bullet.time.max(bullet.duration);
        }
    }
    update_simple(bullet);
}

fn orbit_center_position(state: &GameState, center: OrbitCenter) -> Option<Vec2> {
    match center {
        OrbitCenter::Hero => Some(state.hero.pos),
        OrbitCenter::Enemy(id) => state.enemies.get(&id).filter(|e| e.life > 0.0).map(|e| e.pos),
        OrbitCenter::Point(point) => Some(point),
    }
}

fn source_position(state: &GameState, source: BulletSource) -> Option<Vec2> {
    match source {
        BulletSource::Hero => Some(state.hero.pos),
        BulletSource::Enemy(id) => state.enemies.get(&id).map(|e| e.pos),
    }
}

fn seek_target_position(state: &GameState, bullet: &Bullet, target: SeekTarget) -> Option<Vec2> {
    match target {
        SeekTarget::Hero => Some(state.hero.pos),
        SeekTarget::Source => source_position(state, bullet.source),
        SeekTarget::Enemies => state
            .active_enemies()
            .filter(|e| e.life > 0.0 && !e.invulnerable && !bullet.hit_targets.contains(&e.id))
            // A boss fight seals the arena
            .filter(|e| state.boss_fight.is_none_or(|fight| e.disc == Some(fight.disc)))
            .min_by(|a, b| {
                a.pos
                    .distance_squared(bullet.base_pos)
                    .partial_cmp(&b.pos.distance_squared(bullet.base_pos))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|e| e.pos),
    }
}
