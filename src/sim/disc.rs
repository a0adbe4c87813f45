//! Discs: circular platforms forming the navigation graph
//!
//! Discs are owned by the `WorldCell` or `Dungeon` that generated them and
//! addressed by a deterministic [`DiscId`], so regenerating an evicted cell
//! yields the same ids, positions and links.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Circle, CircleShape, clamp_to_circle, direction_between, push_out_of_circle};
use super::enemy::EnemyId;
use super::items::Loot;
use crate::consts::*;
use crate::world::{Biome, DungeonRecipe};

/// Which generated area a disc (or enemy) belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AreaId {
    /// Overworld cell at integer cell coordinates
    Cell { x: i32, y: i32 },
    /// A dungeon instance
    Dungeon(u32),
}

/// Stable address of a disc inside its owning area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DiscId {
    pub area: AreaId,
    pub index: u32,
}

impl DiscId {
    pub fn new(area: AreaId, index: u32) -> Self {
        Self { area, index }
    }
}

/// Where a portal leads
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PortalDestination {
    /// Back to the overworld (from a dungeon), or to the world origin
    Overworld,
    /// Into a freshly generated dungeon
    Dungeon(DungeonRecipe),
}

/// A portal anchored to a disc
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Portal {
    pub pos: Vec2,
    pub radius: f32,
    pub destination: PortalDestination,
}

impl Portal {
    pub fn new(pos: Vec2, destination: PortalDestination) -> Self {
        Self {
            pos,
            radius: PORTAL_RADIUS,
            destination,
        }
    }
}

impl Circle for Portal {
    fn center(&self) -> Vec2 {
        self.pos
    }

    fn radius(&self) -> f32 {
        self.radius
    }
}

/// A circular platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disc {
    pub id: DiscId,
    pub pos: Vec2,
    pub radius: f32,
    /// Difficulty tier of enemies spawned here
    pub level: u32,
    pub biome: Biome,
    /// Adjacent discs (overlapping by at least [`LINK_MARGIN`])
    pub links: Vec<DiscId>,
    /// Enemies spawned on this disc (lifecycle grouping, not position)
    pub enemies: Vec<EnemyId>,
    pub loot: Vec<Loot>,
    pub portals: Vec<Portal>,
    /// Marks this disc as a boss arena
    pub boss: Option<EnemyId>,
    /// Voids entities cannot stand in
    pub holes: Vec<CircleShape>,
}

impl Disc {
    /// Create a disc with empty link/enemy/loot/portal lists
    pub fn new(id: DiscId, pos: Vec2, radius: f32) -> Self {
        Self {
            id,
            pos,
            radius,
            level: 1,
            biome: Biome::Meadow,
            links: Vec::new(),
            enemies: Vec::new(),
            loot: Vec::new(),
            portals: Vec::new(),
            boss: None,
            holes: Vec::new(),
        }
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_biome(mut self, biome: Biome) -> Self {
        self.biome = biome;
        self
    }

    pub fn with_portal(mut self, portal: Portal) -> Self {
        self.portals.push(portal);
        self
    }

    pub fn with_hole(mut self, hole: CircleShape) -> Self {
        self.holes.push(hole);
        self
    }

    /// Ranking key for "which disc am I on": distance² − radius²
    #[inline]
    pub fn surface_key(&self, point: Vec2) -> f32 {
        point.distance_squared(self.pos) - self.radius * self.radius
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        point.distance_squared(self.pos) <= self.radius * self.radius
    }

    /// Keep a point on the platform and out of its holes
    pub fn clamp_point(&self, point: Vec2) -> Vec2 {
        let mut point = clamp_to_circle(point, self.pos, self.radius);
        for hole in &self.holes {
            point = push_out_of_circle(point, hole.pos, hole.radius);
        }
        point
    }

    /// True if two discs overlap by at least the link margin
    pub fn is_linked_to(&self, other: &Disc) -> bool {
        self.pos.distance(other.pos) <= self.radius + other.radius - LINK_MARGIN
    }
}

impl Circle for Disc {
    fn center(&self) -> Vec2 {
        self.pos
    }

    fn radius(&self) -> f32 {
        self.radius
    }
}

/// Disc whose surface is nearest to `point` (not nearest center)
pub fn find_closest_disc<'a, I>(point: Vec2, discs: I) -> Option<&'a Disc>
where
    I: IntoIterator<Item = &'a Disc>,
{
    discs.into_iter().min_by(|a, b| {
        a.surface_key(point)
            .partial_cmp(&b.surface_key(point))
            .unwrap_or(std::cmp::Ordering::Equal)
    })
}

/// Index of the disc whose surface is nearest to `point`
pub fn find_closest_disc_index(point: Vec2, discs: &[Disc]) -> Option<usize> {
    discs
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            a.surface_key(point)
                .partial_cmp(&b.surface_key(point))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(index, _)| index)
}

/// Move `disc` along the line from `target` so the two overlap by exactly `overlap`
pub fn project_disc_to_disc(disc: &mut Disc, target: &Disc, overlap: f32) {
    let direction = direction_between(target.pos, disc.pos);
    disc.pos = target.pos + direction * (target.radius + disc.radius - overlap);
}

/// Project `disc` onto whichever of `discs` it is closest to; returns that disc's index
pub fn project_disc_to_closest_disc(disc: &mut Disc, discs: &[Disc], overlap: f32) -> Option<usize> {
    let index = find_closest_disc_index(disc.pos, discs)?;
    project_disc_to_disc(disc, &discs[index], overlap);
    Some(index)
}

/// Recompute adjacency for every pair of discs
pub fn link_discs(discs: &mut [Disc]) {
    for disc in discs.iter_mut() {
        disc.links.clear();
    }
    for i in 0..discs.len() {
        for j in (i + 1)..discs.len() {
            if discs[i].is_linked_to(&discs[j]) {
                let (a, b) = (discs[i].id, discs[j].id);
                discs[i].links.push(b);
                discs[j].links.push(a);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disc(index: u32, x: f32, y: f32, radius: f32) -> Disc {
        Disc::new(DiscId::new(AreaId::Dungeon(0), index), Vec2::new(x, y), radius)
    }

    #[test]
    fn test_new_disc_defaults() {
        let d = disc(0, 1.0, 2.0, 50.0);
        assert!(d.links.is_empty());
        assert!(d.enemies.is_empty());
        assert!(d.loot.is_empty());
        assert!(d.portals.is_empty());
        assert!(d.boss.is_none());
    }

    #[test]
    fn test_closest_disc_uses_surface_distance() {
        // Point is nearer the small disc's center but inside the big disc's surface
        let small = disc(0, 0.0, 0.0, 10.0);
        let big = disc(1, 120.0, 0.0, 100.0);
        let point = Vec2::new(40.0, 0.0);
        let closest = find_closest_disc(point, [&small, &big]).map(|d| d.id.index);
        assert_eq!(closest, Some(1));
    }

    #[test]
    fn test_projection_exactness() {
        let target = disc(0, 10.0, -20.0, 80.0);
        for (i, &(x, y, r)) in [(300.0, 40.0, 50.0), (-5.0, -400.0, 120.0), (10.0, -20.0, 30.0)]
            .iter()
            .enumerate()
        {
            let mut new_disc = disc(i as u32 + 1, x, y, r);
            project_disc_to_disc(&mut new_disc, &target, 32.0);
            let distance = new_disc.pos.distance(target.pos);
            let expected = target.radius + new_disc.radius - 32.0;
            assert!((distance - expected).abs() < 1e-3, "{distance} vs {expected}");
        }
    }

    #[test]
    fn test_project_to_closest() {
        let discs = vec![disc(0, 0.0, 0.0, 50.0), disc(1, 1000.0, 0.0, 50.0)];
        let mut new_disc = disc(2, 900.0, 100.0, 40.0);
        let index = project_disc_to_closest_disc(&mut new_disc, &discs, 20.0);
        assert_eq!(index, Some(1));
        assert!((new_disc.pos.distance(discs[1].pos) - 70.0).abs() < 1e-3);
        assert!(project_disc_to_closest_disc(&mut new_disc, &[], 20.0).is_none());
    }

    #[test]
    fn test_link_discs_margin() {
        let mut discs = vec![
            disc(0, 0.0, 0.0, 50.0),
            // Overlaps by exactly 16: linked
            disc(1, 84.0, 0.0, 50.0),
            // Overlaps by 10 with disc 1: not linked
            disc(2, 174.0, 0.0, 50.0),
        ];
        link_discs(&mut discs);
        assert_eq!(discs[0].links, vec![discs[1].id]);
        assert_eq!(discs[1].links, vec![discs[0].id]);
        assert!(discs[2].links.is_empty());
    }

    #[test]
    fn test_clamp_point_avoids_holes() {
        let d = disc(0, 0.0, 0.0, 100.0).with_hole(CircleShape::new(Vec2::ZERO, 20.0));
        let clamped = d.clamp_point(Vec2::new(5.0, 0.0));
        assert!((clamped.length() - 20.0).abs() < 1e-4);
        let clamped = d.clamp_point(Vec2::new(500.0, 0.0));
        assert!((clamped.x - 100.0).abs() < 1e-4);
    }
}
