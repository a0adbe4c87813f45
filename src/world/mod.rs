//! Procedural world: overworld cells and dungeons
//!
//! The overworld is an unbounded grid of `CELL_SIZE` cells, each generated
//! from `(world_seed, x, y)` alone. Cells are cached and evicted
//! least-recently-used; regenerating an evicted cell gives the same discs.
//! Neighboring cells agree on their shared exit disc because its position
//! and size come from a seed owned by the edge, not by either cell.

pub mod biome;
pub mod dungeon;
pub mod generator;

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;

pub use biome::{Biome, LevelBand, SpawnCheck, SpawnSlot, cell_level_band, level_band, populate_disc};
pub use dungeon::{Dungeon, DungeonKind, DungeonRecipe, create_dungeon};
pub use generator::{DiscGenerator, GenerationProfile, Region, is_connected};

use crate::consts::*;
use crate::random::Random;
use crate::sim::collision::Rect;
use crate::sim::disc::{AreaId, Disc, Portal, PortalDestination};
use crate::sim::enemy::Enemy;

const CELL_SALT: u32 = 0xCE11;
const VERTICAL_EDGE_SALT: u32 = 0xED6E_0001;
const HORIZONTAL_EDGE_SALT: u32 = 0xED6E_0002;

const START_RADIUS: f32 = 160.0;
const EXIT_MIN_RADIUS: f32 = 70.0;
const EXIT_MAX_RADIUS: f32 = 120.0;
/// Exits sit within this fraction of the cell size from the edge midpoint
const EXIT_SPREAD: f32 = 0.3;
/// Chance that a cell hides a dungeon portal
pub const DUNGEON_PORTAL_CHANCE: f32 = 0.25;

const CELL_PROFILE: GenerationProfile = GenerationProfile {
    target_discs: 30,
    max_iterations: 300,
    min_radius: 70.0,
    max_radius: 180.0,
    goal_bias: 0.35,
};

/// A generated overworld cell
#[derive(Debug, Clone, PartialEq)]
pub struct WorldCell {
    pub x: i32,
    pub y: i32,
    pub biome: Biome,
    pub min_level: u32,
    pub max_level: u32,
    pub bounds: Rect,
    pub discs: Vec<Disc>,
}

impl WorldCell {
    pub fn area(&self) -> AreaId {
        AreaId::Cell { x: self.x, y: self.y }
    }
}

/// Cell containing `point`
pub fn cell_coords(point: Vec2) -> (i32, i32) {
    (
        (point.x / CELL_SIZE + 0.5).floor() as i32,
        (point.y / CELL_SIZE + 0.5).floor() as i32,
    )
}

pub fn cell_bounds(x: i32, y: i32) -> Rect {
    let center = Vec2::new(x as f32, y as f32) * CELL_SIZE;
    Rect::around(center, CELL_SIZE / 2.0)
}

/// Every cell overlapping the square around `point` of half-size `radius`
pub fn cells_in_radius(point: Vec2, radius: f32) -> Vec<(i32, i32)> {
    let (min_x, min_y) = cell_coords(point - Vec2::splat(radius));
    let (max_x, max_y) = cell_coords(point + Vec2::splat(radius));
    let mut cells = Vec::new();
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            cells.push((x, y));
        }
    }
    cells
}

/// Exit disc on a shared edge, identical for both neighbors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeExit {
    pub pos: Vec2,
    pub radius: f32,
}

/// Exit on the edge between `(x, y)` and `(x + 1, y)`
fn vertical_edge_exit(world: Random, x: i32, y: i32) -> EdgeExit {
    let mut random = world.add_seeds(&[VERTICAL_EDGE_SALT, x as u32, y as u32]);
    let offset = random.float_range(-EXIT_SPREAD, EXIT_SPREAD) * CELL_SIZE;
    let radius = random.float_range(EXIT_MIN_RADIUS, EXIT_MAX_RADIUS);
    EdgeExit {
        pos: Vec2::new((x as f32 + 0.5) * CELL_SIZE, y as f32 * CELL_SIZE + offset),
        radius,
    }
}

/// Exit on the edge between `(x, y)` and `(x, y + 1)`
fn horizontal_edge_exit(world: Random, x: i32, y: i32) -> EdgeExit {
    let mut random = world.add_seeds(&[HORIZONTAL_EDGE_SALT, x as u32, y as u32]);
    let offset = random.float_range(-EXIT_SPREAD, EXIT_SPREAD) * CELL_SIZE;
    let radius = random.float_range(EXIT_MIN_RADIUS, EXIT_MAX_RADIUS);
    EdgeExit {
        pos: Vec2::new(x as f32 * CELL_SIZE + offset, (y as f32 + 0.5) * CELL_SIZE),
        radius,
    }
}

/// The four exits of a cell: east, west, south, north
pub fn cell_exits(world_seed: u32, x: i32, y: i32) -> [EdgeExit; 4] {
    let world = Random::new(world_seed);
    [
        vertical_edge_exit(world, x, y),
        vertical_edge_exit(world, x - 1, y),
        horizontal_edge_exit(world, x, y),
        horizontal_edge_exit(world, x, y - 1),
    ]
}

/// Generate cell `(x, y)` and the enemies living on it
pub fn create_world_cell(world_seed: u32, x: i32, y: i32) -> (WorldCell, Vec<Enemy>) {
    let area = AreaId::Cell { x, y };
    let cell_random = Random::new(world_seed).add_seeds(&[CELL_SALT, x as u32, y as u32]);
    let band = cell_level_band(&mut cell_random.add_seed(1), y);
    let bounds = cell_bounds(x, y);

    let mut generator = DiscGenerator::new(
        area,
        cell_random.add_seed(2),
        CELL_PROFILE,
        Region::Rect(bounds),
        bounds.center(),
        START_RADIUS,
    );
    for exit in cell_exits(world_seed, x, y) {
        generator.add_goal(exit.pos, exit.radius);
    }
    let start_id = generator.start_id();
    let mut discs = generator.generate();

    let mut spawn_random = cell_random.add_seed(3);
    let mut next_serial = 0;
    let mut enemies = Vec::new();
    for disc in discs.iter_mut() {
        disc.biome = band.biome;
        disc.level = spawn_random.range(band.min_level as i32, band.max_level as i32) as u32;
        if disc.id != start_id {
            enemies.extend(populate_disc(
                &mut spawn_random,
                disc,
                band.biome.spawn_table(),
                &mut next_serial,
            ));
        }
    }

    let mut portal_random = cell_random.add_seed(4);
    if discs.len() > 1 && portal_random.chance(DUNGEON_PORTAL_CHANCE) {
        let index = portal_random.range(1, discs.len() as i32 - 1) as usize;
        let recipe = DungeonRecipe::roll(&mut portal_random, band.max_level);
        let disc = &mut discs[index];
        disc.portals.push(Portal::new(disc.pos, PortalDestination::Dungeon(recipe)));
    }

    let cell = WorldCell {
        x,
        y,
        biome: band.biome,
        min_level: band.min_level,
        max_level: band.max_level,
        bounds,
        discs,
    };
    (cell, enemies)
}

#[derive(Debug, Clone)]
struct CachedCell {
    cell: WorldCell,
    last_used: u64,
}

/// Lazily generated, LRU-bounded overworld
#[derive(Debug, Clone)]
pub struct World {
    seed: u32,
    capacity: usize,
    cells: BTreeMap<(i32, i32), CachedCell>,
    clock: u64,
}

impl World {
    pub fn new(seed: u32, capacity: usize) -> Self {
        Self {
            seed,
            capacity: capacity.max(1),
            cells: BTreeMap::new(),
            clock: 0,
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.cells.contains_key(&(x, y))
    }

    pub fn cell(&self, x: i32, y: i32) -> Option<&WorldCell> {
        self.cells.get(&(x, y)).map(|cached| &cached.cell)
    }

    pub fn cell_mut(&mut self, x: i32, y: i32) -> Option<&mut WorldCell> {
        self.cells.get_mut(&(x, y)).map(|cached| &mut cached.cell)
    }

    pub fn cells(&self) -> impl Iterator<Item = &WorldCell> {
        self.cells.values().map(|cached| &cached.cell)
    }

    /// Mark a cell as used, generating it if needed
    ///
    /// Returns the spawned enemies when the cell was (re)generated.
    pub fn ensure_cell(&mut self, x: i32, y: i32) -> Option<Vec<Enemy>> {
        self.clock += 1;
        if let Some(cached) = self.cells.get_mut(&(x, y)) {
            cached.last_used = self.clock;
            return None;
        }
        let (cell, enemies) = create_world_cell(self.seed, x, y);
        log::info!(
            "Generated cell ({x}, {y}): {} {}-{}, {} discs, {} enemies",
            cell.biome.as_str(),
            cell.min_level,
            cell.max_level,
            cell.discs.len(),
            enemies.len()
        );
        self.cells.insert(
            (x, y),
            CachedCell {
                cell,
                last_used: self.clock,
            },
        );
        Some(enemies)
    }

    /// Drop least-recently-used cells beyond capacity, never touching `keep`
    ///
    /// Returns the evicted coordinates so their enemies can be purged.
    pub fn evict(&mut self, keep: &BTreeSet<(i32, i32)>) -> Vec<(i32, i32)> {
        let mut evicted = Vec::new();
        while self.cells.len() > self.capacity {
            let Some(oldest) = self
                .cells
                .iter()
                .filter(|(key, _)| !keep.contains(key))
                .min_by_key(|(_, cached)| cached.last_used)
                .map(|(key, _)| *key)
            else {
                break;
            };
            self.cells.remove(&oldest);
            log::debug!("Evicted cell {oldest:?}");
            evicted.push(oldest);
        }
        evicted
    }
}
