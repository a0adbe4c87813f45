//! Dungeons: self-contained disc graphs ending in a boss arena

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::biome::{Biome, populate_disc};
use super::generator::{DiscGenerator, GenerationProfile, Region};
use crate::content::{ARCHMAGE, NECROMANCER};
use crate::polar_to_cartesian;
use crate::random::Random;
use crate::sim::disc::{AreaId, Disc, DiscId, Portal, PortalDestination};
use crate::sim::enemy::{Enemy, EnemyDefinition, EnemyId, create_enemy};

const DUNGEON_SALT: u32 = 0xD0_6E0E;
const START_RADIUS: f32 = 150.0;
const ARENA_RADIUS: f32 = 260.0;

const NAME_PREFIXES: [&str; 6] = ["Forgotten", "Sunken", "Howling", "Ashen", "Silent", "Hollow"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DungeonKind {
    /// Winding maze of small discs
    Cavern,
    /// Few large discs leading straight to a distant arena
    Gauntlet,
}

impl DungeonKind {
    pub const ALL: [DungeonKind; 2] = [DungeonKind::Cavern, DungeonKind::Gauntlet];
    /// Relative odds of each kind behind a dropped portal
    pub const WEIGHTS: [(DungeonKind, f32); 2] = [(DungeonKind::Cavern, 0.65), (DungeonKind::Gauntlet, 0.35)];

    pub fn as_str(&self) -> &'static str {
        match self {
            DungeonKind::Cavern => "Cavern",
            DungeonKind::Gauntlet => "Gauntlet",
        }
    }

    pub fn biome(&self) -> Biome {
        match self {
            DungeonKind::Cavern => Biome::Cavern,
            DungeonKind::Gauntlet => Biome::Volcano,
        }
    }

    pub fn profile(&self) -> GenerationProfile {
        match self {
            DungeonKind::Cavern => GenerationProfile {
                target_discs: 40,
                max_iterations: 400,
                min_radius: 60.0,
                max_radius: 140.0,
                goal_bias: 0.25,
            },
            DungeonKind::Gauntlet => GenerationProfile {
                target_discs: 18,
                max_iterations: 250,
                min_radius: 120.0,
                max_radius: 220.0,
                goal_bias: 0.6,
            },
        }
    }

    /// Distance from the entrance to the boss arena
    pub fn arena_distance(&self) -> f32 {
        match self {
            DungeonKind::Cavern => 1200.0,
            DungeonKind::Gauntlet => 1800.0,
        }
    }

    pub fn boss(&self) -> &'static EnemyDefinition {
        match self {
            DungeonKind::Cavern => &NECROMANCER,
            DungeonKind::Gauntlet => &ARCHMAGE,
        }
    }
}

/// Everything needed to regenerate a dungeon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DungeonRecipe {
    pub seed: u32,
    pub level: u32,
    pub kind: DungeonKind,
}

impl DungeonRecipe {
    /// Roll a recipe for a portal found at `level`
    pub fn roll(random: &mut Random, level: u32) -> Self {
        let kind = random
            .weighted_element(&DungeonKind::WEIGHTS)
            .copied()
            .unwrap_or(DungeonKind::Cavern);
        random.generate_and_mutate();
        Self {
            seed: random.state(),
            level,
            kind,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Dungeon {
    /// Serial used in this dungeon's `AreaId::Dungeon`
    pub id: u32,
    pub recipe: DungeonRecipe,
    pub name: String,
    pub level: u32,
    pub kind: DungeonKind,
    pub entrance: Vec2,
    pub discs: Vec<Disc>,
    pub boss_disc: DiscId,
}

impl Dungeon {
    pub fn area(&self) -> AreaId {
        AreaId::Dungeon(self.id)
    }
}

/// Generate a dungeon and its enemies from a recipe
pub fn create_dungeon(id: u32, recipe: DungeonRecipe) -> (Dungeon, Vec<Enemy>) {
    let area = AreaId::Dungeon(id);
    let kind = recipe.kind;
    let base = Random::new(recipe.seed).add_seed(DUNGEON_SALT);
    let mut layout_random = base.add_seed(1);
    let entrance = Vec2::ZERO;

    let arena_distance = kind.arena_distance();
    let arena_pos = polar_to_cartesian(
        arena_distance,
        layout_random.float_range(0.0, std::f32::consts::TAU),
    );
    let region = Region::Circle {
        center: entrance,
        radius: arena_distance + ARENA_RADIUS,
    };
    let mut generator = DiscGenerator::new(
        area,
        layout_random,
        kind.profile(),
        region,
        entrance,
        START_RADIUS,
    );
    let arena_id = generator.add_goal(arena_pos, ARENA_RADIUS);
    let start_id = generator.start_id();
    let mut discs = generator.generate();

    let biome = kind.biome();
    let mut spawn_random = base.add_seed(2);
    let mut next_serial = 0;
    let mut enemies = Vec::new();
    for disc in discs.iter_mut() {
        disc.level = recipe.level;
        disc.biome = biome;
        if disc.id == start_id {
            disc.portals.push(Portal::new(disc.pos, PortalDestination::Overworld));
        } else if disc.id == arena_id {
            let boss_id = EnemyId::new(area, next_serial);
            next_serial += 1;
            let boss = create_enemy(
                &mut spawn_random,
                boss_id,
                disc.pos,
                disc.id,
                kind.boss(),
                recipe.level,
            );
            disc.boss = Some(boss_id);
            disc.enemies.push(boss_id);
            enemies.push(boss);
        } else {
            enemies.extend(populate_disc(
                &mut spawn_random,
                disc,
                biome.spawn_table(),
                &mut next_serial,
            ));
        }
    }

    let mut name_random = base.add_seed(3);
    let prefix = name_random.element(&NAME_PREFIXES).copied().unwrap_or("Nameless");
    let dungeon = Dungeon {
        id,
        recipe,
        name: format!("{prefix} {}", kind.as_str()),
        level: recipe.level,
        kind,
        entrance,
        discs,
        boss_disc: arena_id,
    };
    (dungeon, enemies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::generator::is_connected;

    fn recipe(seed: u32, kind: DungeonKind) -> DungeonRecipe {
        DungeonRecipe { seed, level: 6, kind }
    }

    #[test]
    fn test_dungeons_are_connected() {
        for seed in 0..10 {
            for kind in DungeonKind::ALL {
                let (dungeon, _) = create_dungeon(seed, recipe(seed, kind));
                assert!(is_connected(&dungeon.discs), "seed {seed} {kind:?}");
            }
        }
    }

    #[test]
    fn test_boss_arena_and_return_portal() {
        let (dungeon, enemies) = create_dungeon(0, recipe(5, DungeonKind::Cavern));
        let arena = dungeon
            .discs
            .iter()
            .find(|d| d.id == dungeon.boss_disc)
            .cloned()
            .unwrap_or_else(|| panic!("arena missing"));
        let boss_id = arena.boss.unwrap_or_else(|| panic!("arena has no boss"));
        let boss = enemies.iter().find(|e| e.id == boss_id).unwrap_or_else(|| panic!("boss not spawned"));
        assert_eq!(boss.definition.name, NECROMANCER.name);
        assert_eq!(boss.level, 6);

        let start = &dungeon.discs[0];
        assert_eq!(start.portals.len(), 1);
        assert_eq!(start.portals[0].destination, PortalDestination::Overworld);
        assert!(start.enemies.is_empty());
        assert_eq!(dungeon.discs.iter().filter(|d| d.boss.is_some()).count(), 1);
    }

    #[test]
    fn test_recipe_regenerates_identically() {
        let (a, enemies_a) = create_dungeon(3, recipe(99, DungeonKind::Gauntlet));
        let (b, enemies_b) = create_dungeon(3, recipe(99, DungeonKind::Gauntlet));
        assert_eq!(a.discs, b.discs);
        assert_eq!(a.name, b.name);
        let ids_a: Vec<_> = enemies_a.iter().map(|e| (e.id, e.pos)).collect();
        let ids_b: Vec<_> = enemies_b.iter().map(|e| (e.id, e.pos)).collect();
        assert_eq!(ids_a, ids_b);
    }

    #[test]
    fn test_rolled_recipes_favor_caverns() {
        let mut random = Random::new(4);
        let caverns = (0..400)
            .map(|_| DungeonRecipe::roll(&mut random, 3))
            .filter(|r| r.kind == DungeonKind::Cavern)
            .count();
        assert!((200..320).contains(&caverns), "caverns {caverns}");
    }
}
