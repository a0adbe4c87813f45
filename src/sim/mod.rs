//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod bullet;
pub mod collision;
pub mod combat;
pub mod disc;
pub mod enemy;
pub mod hero;
pub mod items;
pub mod state;
pub mod tick;

pub use bullet::{Bullet, BulletBehavior, BulletSource, OrbitCenter, SeekTarget, advance_bullet};
pub use collision::{Circle, CircleShape, Rect, circles_intersect, vector_to_circle};
pub use combat::{defeat_enemy, hit_enemy};
pub use disc::{
    AreaId, Disc, DiscId, Portal, PortalDestination, find_closest_disc, link_discs, project_disc_to_closest_disc,
    project_disc_to_disc,
};
pub use enemy::{Enemy, EnemyBehavior, EnemyDefinition, EnemyId, StatFactors, create_enemy};
pub use hero::{Hero, apply_armor_to_damage, burn_hero, damage_hero};
pub use items::{Armor, ArmorType, Enchantment, Item, Loot, Weapon, WeaponType};
pub use state::{BossFight, GameKey, GameState, InputSnapshot, SoundKey, play_sound};
pub use tick::tick;
