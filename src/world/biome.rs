//! Biomes, the overworld level table and enemy spawn tables

use serde::{Deserialize, Serialize};

use crate::content::{
    ARCHER, BIG_SLIME, CHARGER, GHOST, NECROMANCER_ADEPT, SKELETON, SLIME, SNIPER, SORCERER,
};
use crate::polar_to_cartesian;
use crate::random::Random;
use crate::sim::disc::Disc;
use crate::sim::enemy::{Enemy, EnemyDefinition, EnemyId, create_enemy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Biome {
    Meadow,
    Forest,
    Desert,
    Cavern,
    Tundra,
    Volcano,
    Abyss,
}

impl Biome {
    /// Biomes cycled through by rows beyond the fixed table
    pub const DEEP: [Biome; 3] = [Biome::Tundra, Biome::Volcano, Biome::Abyss];

    pub fn as_str(&self) -> &'static str {
        match self {
            Biome::Meadow => "Meadow",
            Biome::Forest => "Forest",
            Biome::Desert => "Desert",
            Biome::Cavern => "Cavern",
            Biome::Tundra => "Tundra",
            Biome::Volcano => "Volcano",
            Biome::Abyss => "Abyss",
        }
    }

    /// Ground color (0xRRGGBB)
    pub fn color(&self) -> u32 {
        match self {
            Biome::Meadow => 0x6fae4f,
            Biome::Forest => 0x2f6b3a,
            Biome::Desert => 0xd8c07a,
            Biome::Cavern => 0x5a5560,
            Biome::Tundra => 0xcfe3ea,
            Biome::Volcano => 0x7a2e1f,
            Biome::Abyss => 0x231a3a,
        }
    }

    pub fn spawn_table(&self) -> &'static [SpawnSlot] {
        match self {
            Biome::Meadow => &MEADOW_SPAWNS,
            Biome::Forest => &FOREST_SPAWNS,
            Biome::Desert => &DESERT_SPAWNS,
            Biome::Cavern => &CAVERN_SPAWNS,
            Biome::Tundra | Biome::Volcano | Biome::Abyss => &DEEP_SPAWNS,
        }
    }
}

/// Level range and biome of one overworld row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelBand {
    pub min_level: u32,
    pub max_level: u32,
    pub biome: Biome,
}

/// Level band for row `|cell_y|`
pub fn level_band(row: u32) -> LevelBand {
    let (min_level, max_level, biome) = match row {
        0 => (1, 2, Biome::Meadow),
        1 => (3, 5, Biome::Forest),
        2 => (6, 9, Biome::Desert),
        3 => (10, 14, Biome::Cavern),
        _ => {
            let min_level = 15 + (row - 4) * 6;
            let biome = Biome::DEEP[((row - 4) % 3) as usize];
            (min_level, min_level + 5, biome)
        }
    };
    LevelBand {
        min_level,
        max_level,
        biome,
    }
}

/// Chance for a deep cell to be an easier pocket
pub const DOWNGRADE_CHANCE: f32 = 0.1;

/// Level band of a cell, with the occasional easier pocket in deep rows
///
/// Rows from 3 down may drop two or three rows (never exactly one).
pub fn cell_level_band(random: &mut Random, cell_y: i32) -> LevelBand {
    let row = cell_y.unsigned_abs();
    if row >= 3 && random.chance(DOWNGRADE_CHANCE) {
        let drop = random.range(2, 3) as u32;
        return level_band(row.saturating_sub(drop));
    }
    level_band(row)
}

/// One probability check in a spawn slot
#[derive(Debug, Clone, Copy)]
pub struct SpawnCheck {
    pub chance: f32,
    pub definition: &'static EnemyDefinition,
}

/// An ordered if/else-if chain: the first check whose fresh roll succeeds spawns
#[derive(Debug, Clone, Copy)]
pub struct SpawnSlot(pub &'static [SpawnCheck]);

impl SpawnSlot {
    pub fn roll(&self, random: &mut Random) -> Option<&'static EnemyDefinition> {
        self.0
            .iter()
            .find(|check| random.chance(check.chance))
            .map(|check| check.definition)
    }
}

static MEADOW_SPAWNS: [SpawnSlot; 2] = [
    SpawnSlot(&[
        SpawnCheck {
            chance: 0.1,
            definition: &BIG_SLIME,
        },
        SpawnCheck {
            chance: 0.6,
            definition: &SLIME,
        },
    ]),
    SpawnSlot(&[SpawnCheck {
        chance: 0.3,
        definition: &SLIME,
    }]),
];

static FOREST_SPAWNS: [SpawnSlot; 3] = [
    SpawnSlot(&[
        SpawnCheck {
            chance: 0.3,
            definition: &ARCHER,
        },
        SpawnCheck {
            chance: 0.5,
            definition: &SLIME,
        },
    ]),
    SpawnSlot(&[
        SpawnCheck {
            chance: 0.2,
            definition: &BIG_SLIME,
        },
        SpawnCheck {
            chance: 0.2,
            definition: &ARCHER,
        },
    ]),
    SpawnSlot(&[SpawnCheck {
        chance: 0.2,
        definition: &CHARGER,
    }]),
];

static DESERT_SPAWNS: [SpawnSlot; 3] = [
    SpawnSlot(&[
        SpawnCheck {
            chance: 0.3,
            definition: &CHARGER,
        },
        SpawnCheck {
            chance: 0.4,
            definition: &SNIPER,
        },
    ]),
    SpawnSlot(&[
        SpawnCheck {
            chance: 0.3,
            definition: &ARCHER,
        },
        SpawnCheck {
            chance: 0.3,
            definition: &BIG_SLIME,
        },
    ]),
    SpawnSlot(&[SpawnCheck {
        chance: 0.15,
        definition: &SORCERER,
    }]),
];

static CAVERN_SPAWNS: [SpawnSlot; 3] = [
    SpawnSlot(&[
        SpawnCheck {
            chance: 0.3,
            definition: &GHOST,
        },
        SpawnCheck {
            chance: 0.5,
            definition: &SKELETON,
        },
    ]),
    SpawnSlot(&[
        SpawnCheck {
            chance: 0.2,
            definition: &SORCERER,
        },
        SpawnCheck {
            chance: 0.3,
            definition: &CHARGER,
        },
    ]),
    SpawnSlot(&[SpawnCheck {
        chance: 0.05,
        definition: &NECROMANCER_ADEPT,
    }]),
];

static DEEP_SPAWNS: [SpawnSlot; 4] = [
    SpawnSlot(&[
        SpawnCheck {
            chance: 0.3,
            definition: &SORCERER,
        },
        SpawnCheck {
            chance: 0.4,
            definition: &GHOST,
        },
    ]),
    SpawnSlot(&[
        SpawnCheck {
            chance: 0.3,
            definition: &SNIPER,
        },
        SpawnCheck {
            chance: 0.4,
            definition: &CHARGER,
        },
    ]),
    SpawnSlot(&[SpawnCheck {
        chance: 0.5,
        definition: &SKELETON,
    }]),
    SpawnSlot(&[SpawnCheck {
        chance: 0.1,
        definition: &NECROMANCER_ADEPT,
    }]),
];

/// Radius of disc area covered by one pass over a spawn table
const SPAWN_PASS_RADIUS: f32 = 150.0;

/// Roll a disc's spawn table and create its enemies
///
/// Enemy ids are taken from `next_serial` so a regenerated area reproduces
/// the same ids. Created enemies are also recorded in `disc.enemies`.
pub fn populate_disc(
    random: &mut Random,
    disc: &mut Disc,
    table: &[SpawnSlot],
    next_serial: &mut u32,
) -> Vec<Enemy> {
    let passes = 1 + (disc.radius / SPAWN_PASS_RADIUS) as usize;
    let mut enemies = Vec::new();
    for _ in 0..passes {
        for slot in table {
            let Some(definition) = slot.roll(random) else {
                continue;
            };
            let offset = polar_to_cartesian(
                random.float_range(0.0, (disc.radius - definition.radius).max(0.0) * 0.8),
                random.float_range(0.0, std::f32::consts::TAU),
            );
            let id = EnemyId::new(disc.id.area, *next_serial);
            *next_serial += 1;
            let pos = disc.clamp_point(disc.pos + offset);
            let enemy = create_enemy(random, id, pos, disc.id, definition, disc.level);
            disc.enemies.push(id);
            enemies.push(enemy);
        }
    }
    enemies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::disc::{AreaId, DiscId};
    use glam::Vec2;

    #[test]
    fn test_level_table_rows() {
        assert_eq!(level_band(0), LevelBand { min_level: 1, max_level: 2, biome: Biome::Meadow });
        assert_eq!(level_band(3).biome, Biome::Cavern);
        assert_eq!((level_band(4).min_level, level_band(4).max_level), (15, 20));
        assert_eq!(level_band(5).min_level, 21);
        assert_eq!(level_band(4).biome, Biome::Tundra);
        assert_eq!(level_band(5).biome, Biome::Volcano);
        assert_eq!(level_band(6).biome, Biome::Abyss);
        assert_eq!(level_band(7).biome, Biome::Tundra);
    }

    #[test]
    fn test_downgrade_skips_exactly_one_row() {
        let mut seen_downgrade = false;
        for seed in 0..2000 {
            let mut random = Random::new(seed);
            let band = cell_level_band(&mut random, -8);
            let row = (0..20).find(|row| level_band(*row) == band);
            assert!(matches!(row, Some(8) | Some(6) | Some(5)), "row {row:?}");
            seen_downgrade |= row != Some(8);
        }
        assert!(seen_downgrade);

        // Shallow rows never downgrade
        for seed in 0..200 {
            let mut random = Random::new(seed);
            assert_eq!(cell_level_band(&mut random, 2), level_band(2));
        }
    }

    #[test]
    fn test_spawn_slot_is_ordered_chain() {
        static ALWAYS: [SpawnCheck; 2] = [
            SpawnCheck {
                chance: 1.0,
                definition: &BIG_SLIME,
            },
            SpawnCheck {
                chance: 1.0,
                definition: &SLIME,
            },
        ];
        let mut random = Random::new(1);
        let picked = SpawnSlot(&ALWAYS).roll(&mut random).map(|d| d.name);
        assert_eq!(picked, Some(BIG_SLIME.name));
        static NEVER: [SpawnCheck; 1] = [SpawnCheck {
            chance: 0.0,
            definition: &SLIME,
        }];
        assert!(SpawnSlot(&NEVER).roll(&mut random).is_none());
    }

    #[test]
    fn test_populate_records_membership() {
        let id = DiscId::new(AreaId::Cell { x: 0, y: 0 }, 3);
        let mut disc = Disc::new(id, Vec2::new(100.0, 100.0), 200.0).with_level(4);
        let mut serial = 10;
        let mut random = Random::new(5);
        let enemies = populate_disc(&mut random, &mut disc, Biome::Cavern.spawn_table(), &mut serial);
        assert_eq!(disc.enemies.len(), enemies.len());
        for enemy in &enemies {
            assert_eq!(enemy.home, id);
            assert_eq!(enemy.level, 4);
            assert!(disc.contains_point(enemy.pos));
            assert!(enemy.id.serial >= 10);
        }
        assert_eq!(serial, 10 + enemies.len() as u32);
    }
}
