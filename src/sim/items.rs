//! Equipment, enchantments and loot
//!
//! Items only store their recipe (type, level, enchantments). Every derived
//! number is computed on demand from the level curves, which is what lets a
//! save file rebuild identical equipment.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::bullet::{Bullet, BulletBehavior, SeekTarget};
use super::collision::Circle;
use super::hero::hero_damage_at_level;
use crate::consts::*;

/// How a weapon shot moves once fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotKind {
    /// Flies in a straight line
    Straight,
    /// Circles the hero
    Orbit,
    /// Homes in on the nearest enemy
    Seek,
}

/// One bullet of a weapon's attack cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponShot {
    /// Fraction of the cooldown at which this shot fires (0..1)
    pub timing_offset: f32,
    /// Added to the aim angle (radians)
    pub angle_offset: f32,
    pub speed: f32,
    pub damage_factor: f32,
    pub radius: f32,
    /// Lifetime in ms
    pub duration: f32,
    pub kind: ShotKind,
}

const BOW_SHOTS: [WeaponShot; 1] = [WeaponShot {
    timing_offset: 0.0,
    angle_offset: 0.0,
    speed: 600.0,
    damage_factor: 1.0,
    radius: 8.0,
    duration: 800.0,
    kind: ShotKind::Straight,
}];

const DAGGER_SHOTS: [WeaponShot; 3] = [
    WeaponShot {
        timing_offset: 0.0,
        angle_offset: -0.1,
        speed: 500.0,
        damage_factor: 0.4,
        radius: 6.0,
        duration: 400.0,
        kind: ShotKind::Straight,
    },
    WeaponShot {
        timing_offset: 0.15,
        angle_offset: 0.0,
        speed: 500.0,
        damage_factor: 0.4,
        radius: 6.0,
        duration: 400.0,
        kind: ShotKind::Straight,
    },
    WeaponShot {
        timing_offset: 0.3,
        angle_offset: 0.1,
        speed: 500.0,
        damage_factor: 0.4,
        radius: 6.0,
        duration: 400.0,
        kind: ShotKind::Straight,
    },
];

const STAFF_SHOTS: [WeaponShot; 1] = [WeaponShot {
    timing_offset: 0.0,
    angle_offset: 0.0,
    speed: 350.0,
    damage_factor: 1.2,
    radius: 10.0,
    duration: 1200.0,
    kind: ShotKind::Seek,
}];

const ORB_SHOTS: [WeaponShot; 2] = [
    WeaponShot {
        timing_offset: 0.0,
        angle_offset: 0.0,
        speed: 6.0,
        damage_factor: 0.6,
        radius: 12.0,
        duration: 1500.0,
        kind: ShotKind::Orbit,
    },
    WeaponShot {
        timing_offset: 0.5,
        angle_offset: std::f32::consts::PI,
        speed: 6.0,
        damage_factor: 0.6,
        radius: 12.0,
        duration: 1500.0,
        kind: ShotKind::Orbit,
    },
];

/// Distance orbiting shots keep from the hero
pub const ORB_ORBIT_RADIUS: f32 = 70.0;
/// Turn rate of seeking weapon shots (radians/s)
pub const SEEK_TURN_RATE: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WeaponType {
    Bow,
    Dagger,
    Staff,
    Orb,
}

impl WeaponType {
    pub const ALL: [WeaponType; 4] = [
        WeaponType::Bow,
        WeaponType::Dagger,
        WeaponType::Staff,
        WeaponType::Orb,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WeaponType::Bow => "Bow",
            WeaponType::Dagger => "Dagger",
            WeaponType::Staff => "Staff",
            WeaponType::Orb => "Orb",
        }
    }

    /// Bullets fired during one attack cycle
    pub fn shots(&self) -> &'static [WeaponShot] {
        match self {
            WeaponType::Bow => &BOW_SHOTS,
            WeaponType::Dagger => &DAGGER_SHOTS,
            WeaponType::Staff => &STAFF_SHOTS,
            WeaponType::Orb => &ORB_SHOTS,
        }
    }

    /// Multiplier on attack rate
    pub fn attack_speed_factor(&self) -> f32 {
        match self {
            WeaponType::Bow => 1.0,
            WeaponType::Dagger => 0.8,
            WeaponType::Staff => 0.7,
            WeaponType::Orb => 0.6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ArmorType {
    Cloth,
    Leather,
    Plate,
}

impl ArmorType {
    pub const ALL: [ArmorType; 3] = [ArmorType::Cloth, ArmorType::Leather, ArmorType::Plate];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArmorType::Cloth => "Cloth",
            ArmorType::Leather => "Leather",
            ArmorType::Plate => "Plate",
        }
    }

    /// Armor as a fraction of hero damage at the item level
    pub fn armor_factor(&self) -> f32 {
        match self {
            ArmorType::Cloth => 0.1,
            ArmorType::Leather => 0.5,
            ArmorType::Plate => 1.0,
        }
    }

    /// Bonus max life fraction
    pub fn life_factor(&self) -> f32 {
        match self {
            ArmorType::Cloth => 0.2,
            ArmorType::Leather => 0.1,
            ArmorType::Plate => 0.0,
        }
    }

    pub fn speed_factor(&self) -> f32 {
        match self {
            ArmorType::Cloth => 1.05,
            ArmorType::Leather => 1.0,
            ArmorType::Plate => 0.9,
        }
    }
}

/// Which equipment an enchantment can be socketed into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquipmentSlot {
    Weapon,
    Armor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Enchantment {
    /// +25% bullet damage
    Power,
    /// Bullets pass through enemies
    Piercing,
    /// Bullets reverse at half their lifetime
    Returning,
    /// Bullets fly back to the hero at half their lifetime
    Boomerang,
    /// Bullets home in on enemies
    Seeking,
    /// Bullets weave side to side
    Wave,
    /// Bullets strip enemy armor
    Shred,
    /// +25% max life
    Vitality,
    /// +25% armor
    Fortify,
}

impl Enchantment {
    pub const WEAPON: [Enchantment; 7] = [
        Enchantment::Power,
        Enchantment::Piercing,
        Enchantment::Returning,
        Enchantment::Boomerang,
        Enchantment::Seeking,
        Enchantment::Wave,
        Enchantment::Shred,
    ];
    pub const ARMOR: [Enchantment; 2] = [Enchantment::Vitality, Enchantment::Fortify];

    pub fn slot(&self) -> EquipmentSlot {
        match self {
            Enchantment::Vitality | Enchantment::Fortify => EquipmentSlot::Armor,
            _ => EquipmentSlot::Weapon,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Enchantment::Power => "Power",
            Enchantment::Piercing => "Piercing",
            Enchantment::Returning => "Returning",
            Enchantment::Boomerang => "Boomerang",
            Enchantment::Seeking => "Seeking",
            Enchantment::Wave => "Wave",
            Enchantment::Shred => "Shred",
            Enchantment::Vitality => "Vitality",
            Enchantment::Fortify => "Fortify",
        }
    }

    /// Decorate a freshly created hero bullet
    pub fn apply_to_bullet(&self, bullet: &mut Bullet) {
        match self {
            Enchantment::Power => bullet.damage *= 1.25,
            Enchantment::Piercing => bullet.is_enemy_piercing = true,
            Enchantment::Returning => {
                if bullet.behavior == BulletBehavior::Simple {
                    bullet.behavior = BulletBehavior::Returning;
                }
            }
            Enchantment::Boomerang => {
                if bullet.behavior == BulletBehavior::Simple {
                    bullet.behavior = BulletBehavior::Boomerang;
                }
            }
            Enchantment::Seeking => {
                if matches!(bullet.behavior, BulletBehavior::Simple | BulletBehavior::Returning) {
                    bullet.behavior = BulletBehavior::Seeking {
                        target: SeekTarget::Enemies,
                        turn_rate: SEEK_TURN_RATE * 0.5,
                    };
                }
            }
            Enchantment::Wave => {
                bullet.amplitude = 20.0;
                bullet.frequency = 3.0;
            }
            Enchantment::Shred => bullet.armor_shred += bullet.damage * 0.5,
            Enchantment::Vitality | Enchantment::Fortify => {}
        }
    }
}

/// Enchantment slots available at an item level
pub fn enchantment_slots(level: u32) -> usize {
    (1 + level as usize / 10).min(3)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub kind: WeaponType,
    pub level: u32,
    pub enchantments: Vec<Enchantment>,
}

impl Weapon {
    /// Base damage of one full-strength shot
    pub fn damage(&self) -> f32 {
        hero_damage_at_level(self.level)
    }

    /// Try to socket an enchantment; false if it doesn't fit
    pub fn add_enchantment(&mut self, enchantment: Enchantment) -> bool {
        if enchantment.slot() != EquipmentSlot::Weapon
            || self.enchantments.len() >= enchantment_slots(self.level)
        {
            return false;
        }
        self.enchantments.push(enchantment);
        true
    }

    pub fn value(&self) -> u64 {
        10 + u64::from(self.level) * 5 + self.enchantments.len() as u64 * 20
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Armor {
    pub kind: ArmorType,
    pub level: u32,
    pub enchantments: Vec<Enchantment>,
}

impl Armor {
    pub fn armor(&self) -> f32 {
        let fortify = self.count(Enchantment::Fortify) as f32 * 0.25;
        hero_damage_at_level(self.level) * self.kind.armor_factor() * (1.0 + fortify)
    }

    /// Multiplier applied to hero max life
    pub fn life_multiplier(&self) -> f32 {
        let vitality = self.count(Enchantment::Vitality) as f32 * 0.25;
        1.0 + self.kind.life_factor() + vitality
    }

    pub fn add_enchantment(&mut self, enchantment: Enchantment) -> bool {
        if enchantment.slot() != EquipmentSlot::Armor
            || self.enchantments.len() >= enchantment_slots(self.level)
        {
            return false;
        }
        self.enchantments.push(enchantment);
        true
    }

    pub fn value(&self) -> u64 {
        10 + u64::from(self.level) * 5 + self.enchantments.len() as u64 * 20
    }

    fn count(&self, enchantment: Enchantment) -> usize {
        self.enchantments.iter().filter(|e| **e == enchantment).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Item {
    Weapon(Weapon),
    Armor(Armor),
    Enchantment(Enchantment),
    /// Restores a fraction of max life
    Potion { heal: f32 },
}

impl Item {
    pub fn value(&self) -> u64 {
        match self {
            Item::Weapon(weapon) => weapon.value(),
            Item::Armor(armor) => armor.value(),
            Item::Enchantment(_) => 50,
            Item::Potion { .. } => 5,
        }
    }

    pub fn name(&self) -> String {
        match self {
            Item::Weapon(weapon) => format!("Lv {} {}", weapon.level, weapon.kind.as_str()),
            Item::Armor(armor) => format!("Lv {} {} Armor", armor.level, armor.kind.as_str()),
            Item::Enchantment(enchantment) => format!("{} Enchantment", enchantment.as_str()),
            Item::Potion { .. } => "Potion".to_string(),
        }
    }
}

/// An item lying on a disc
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loot {
    pub pos: Vec2,
    pub radius: f32,
    pub item: Item,
}

impl Loot {
    pub fn new(pos: Vec2, item: Item) -> Self {
        Self {
            pos,
            radius: LOOT_RADIUS,
            item,
        }
    }
}

impl Circle for Loot {
    fn center(&self) -> Vec2 {
        self.pos
    }

    fn radius(&self) -> f32 {
        self.radius
    }
}

/// Build a weapon from its recipe, dropping enchantments that don't fit
pub fn generate_weapon(kind: WeaponType, level: u32, enchantments: &[Enchantment]) -> Weapon {
    let mut weapon = Weapon {
        kind,
        level,
        enchantments: Vec::new(),
    };
    for enchantment in enchantments {
        weapon.add_enchantment(*enchantment);
    }
    weapon
}

/// Build armor from its recipe, dropping enchantments that don't fit
pub fn generate_armor(kind: ArmorType, level: u32, enchantments: &[Enchantment]) -> Armor {
    let mut armor = Armor {
        kind,
        level,
        enchantments: Vec::new(),
    };
    for enchantment in enchantments {
        armor.add_enchantment(*enchantment);
    }
    armor
}

/// Roll a basic drop for an enemy of `level`
pub fn generate_random_item<R: Rng>(rng: &mut R, level: u32) -> Item {
    let roll: f32 = rng.random();
    if roll < 0.4 {
        Item::Potion { heal: 0.25 }
    } else if roll < 0.75 {
        let kind = WeaponType::ALL[rng.random_range(0..WeaponType::ALL.len())];
        Item::Weapon(generate_weapon(kind, level, &[]))
    } else {
        let kind = ArmorType::ALL[rng.random_range(0..ArmorType::ALL.len())];
        Item::Armor(generate_armor(kind, level, &[]))
    }
}
