//! Goal-directed disc graph generation
//!
//! Every generated disc is projected onto a disc that is already connected to
//! the start disc, so the graph is connected by construction. Goal discs
//! (cell exits, boss arenas) are placed up front and join the graph once a
//! placed disc links to them; whatever is still outstanding when the
//! iteration budget runs out is bridged explicitly.

use glam::Vec2;

use crate::consts::*;
use crate::polar_to_cartesian;
use crate::random::Random;
use crate::sim::collision::{Rect, circle_overlap, direction_between};
use crate::sim::disc::{AreaId, Disc, DiscId, link_discs, project_disc_to_closest_disc};

/// Upper bound on bridging discs per outstanding goal
const MAX_BRIDGE_STEPS: usize = 256;

/// Where disc centers may be placed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Region {
    Rect(Rect),
    Circle { center: Vec2, radius: f32 },
}

impl Region {
    pub fn contains(&self, point: Vec2) -> bool {
        match self {
            Region::Rect(rect) => rect.contains_point(point),
            Region::Circle { center, radius } => point.distance_squared(*center) <= radius * radius,
        }
    }

    pub fn random_point(&self, random: &mut Random) -> Vec2 {
        match self {
            Region::Rect(rect) => Vec2::new(
                random.float_range(rect.min.x, rect.max.x),
                random.float_range(rect.min.y, rect.max.y),
            ),
            Region::Circle { center, radius } => {
                // sqrt keeps the distribution uniform over the area
                let r = radius * (random.generate_and_mutate() as f32).sqrt();
                *center + polar_to_cartesian(r, random.float_range(0.0, std::f32::consts::TAU))
            }
        }
    }
}

/// Knobs for one kind of area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationProfile {
    /// Keep iterating until at least this many discs are placed
    pub target_discs: usize,
    /// Hard cap on placement iterations
    pub max_iterations: usize,
    pub min_radius: f32,
    pub max_radius: f32,
    /// Probability a proposal is aimed at an outstanding goal
    pub goal_bias: f32,
}

/// Incremental builder for one area's disc graph
pub struct DiscGenerator {
    area: AreaId,
    random: Random,
    profile: GenerationProfile,
    region: Region,
    /// Discs connected to the start disc
    placed: Vec<Disc>,
    /// Goal discs not yet connected
    goals: Vec<Disc>,
    next_index: u32,
    discarded: usize,
}

impl DiscGenerator {
    /// Start a graph with its entrance disc
    pub fn new(
        area: AreaId,
        random: Random,
        profile: GenerationProfile,
        region: Region,
        start_pos: Vec2,
        start_radius: f32,
    ) -> Self {
        let start = Disc::new(DiscId::new(area, 0), start_pos, start_radius);
        Self {
            area,
            random,
            profile,
            region,
            placed: vec![start],
            goals: Vec::new(),
            next_index: 1,
            discarded: 0,
        }
    }

    /// Register a disc that must end up connected; returns its id
    pub fn add_goal(&mut self, pos: Vec2, radius: f32) -> DiscId {
        let id = self.allocate_id();
        let goal = Disc::new(id, pos, radius);
        if self.placed.iter().any(|disc| disc.is_linked_to(&goal)) {
            self.placed.push(goal);
        } else {
            self.goals.push(goal);
        }
        id
    }

    pub fn start_id(&self) -> DiscId {
        DiscId::new(self.area, 0)
    }

    /// Proposals that failed every placement attempt
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    /// Run the placement loop, bridge leftover goals and link the result
    ///
    /// Returned discs are sorted so that `discs[i].id.index == i`.
    pub fn generate(mut self) -> Vec<Disc> {
        let mut iterations = 0;
        while iterations < self.profile.max_iterations
            && (!self.goals.is_empty() || self.placed.len() < self.profile.target_discs)
        {
            iterations += 1;
            self.place_one();
        }
        self.bridge_goals();
        if self.discarded > 0 {
            log::debug!(
                "{:?}: {} discs placed, {} proposals discarded",
                self.area,
                self.placed.len(),
                self.discarded
            );
        }

        let mut discs = self.placed;
        discs.sort_by_key(|disc| disc.id.index);
        link_discs(&mut discs);
        discs
    }

    fn allocate_id(&mut self) -> DiscId {
        let id = DiscId::new(self.area, self.next_index);
        self.next_index += 1;
        id
    }

    /// Propose one disc and try to attach it
    fn place_one(&mut self) {
        let mut radius = self
            .random
            .float_range(self.profile.min_radius, self.profile.max_radius);
        let target = if !self.goals.is_empty() && self.random.chance(self.profile.goal_bias) {
            let index = self.random.range(0, self.goals.len() as i32 - 1) as usize;
            let (center, reach) = (self.goals[index].pos, self.goals[index].radius + radius);
            center
                + polar_to_cartesian(
                    self.random.float_range(0.0, reach),
                    self.random.float_range(0.0, std::f32::consts::TAU),
                )
        } else {
            self.region.random_point(&mut self.random)
        };

        for _ in 0..PLACEMENT_ATTEMPTS {
            let mut candidate = Disc::new(DiscId::new(self.area, self.next_index), target, radius);
            project_disc_to_closest_disc(&mut candidate, &self.placed, GENERATION_OVERLAP);
            if self.is_valid(&candidate) {
                self.next_index += 1;
                self.accept(candidate);
                return;
            }
            radius *= PLACEMENT_SHRINK;
        }
        self.discarded += 1;
    }

    /// Center inside the region and no excessive overlap with any disc
    fn is_valid(&self, candidate: &Disc) -> bool {
        self.region.contains(candidate.pos)
            && self
                .placed
                .iter()
                .chain(self.goals.iter())
                .all(|disc| circle_overlap(candidate, disc) <= MAX_GENERATION_OVERLAP + 1e-3)
    }

    /// Add a connected disc and pull in any goals it now reaches
    fn accept(&mut self, disc: Disc) {
        let (reached, outstanding): (Vec<Disc>, Vec<Disc>) =
            self.goals.drain(..).partition(|goal| goal.is_linked_to(&disc));
        self.goals = outstanding;
        self.placed.push(disc);
        self.placed.extend(reached);
    }

    /// Connect every outstanding goal with forced bridging discs
    fn bridge_goals(&mut self) {
        let max_radius = self.profile.max_radius.max(GENERATION_OVERLAP * 2.0 + 1.0);
        while let Some(goal) = self.goals.first().cloned() {
            let mut steps = 0;
            loop {
                let Some(nearest) = self
                    .placed
                    .iter()
                    .min_by(|a, b| {
                        let da = a.pos.distance(goal.pos) - a.radius;
                        let db = b.pos.distance(goal.pos) - b.radius;
                        da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
                    })
                    .cloned()
                else {
                    break;
                };
                if nearest.is_linked_to(&goal) || steps >= MAX_BRIDGE_STEPS {
                    break;
                }
                steps += 1;

                let direction = direction_between(nearest.pos, goal.pos);
                let gap = nearest.pos.distance(goal.pos) - nearest.radius - goal.radius;
                let bridge_radius = gap / 2.0 + GENERATION_OVERLAP;
                let id = self.allocate_id();
                if bridge_radius <= max_radius {
                    // One disc overlapping both ends by the generation overlap
                    let pos = nearest.pos + direction * (nearest.radius + gap / 2.0);
                    self.placed.push(Disc::new(id, pos, bridge_radius));
                    break;
                }
                let pos = nearest.pos + direction * (nearest.radius + max_radius - GENERATION_OVERLAP);
                self.placed.push(Disc::new(id, pos, max_radius));
            }
            if steps >= MAX_BRIDGE_STEPS {
                log::warn!("{:?}: gave up bridging goal {:?}", self.area, goal.id);
            }
            self.goals.remove(0);
            self.placed.push(goal);
        }
    }
}

/// True if every disc is reachable from `discs[0]` over links
pub fn is_connected(discs: &[Disc]) -> bool {
    let Some(first) = discs.first() else {
        return true;
    };
    let mut seen = std::collections::BTreeSet::from([first.id]);
    let mut frontier = vec![first];
    while let Some(disc) = frontier.pop() {
        for link in &disc.links {
            if seen.insert(*link) {
                if let Some(next) = discs.iter().find(|d| d.id == *link) {
                    frontier.push(next);
                }
            }
        }
    }
    seen.len() == discs.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> GenerationProfile {
        GenerationProfile {
            target_discs: 25,
            max_iterations: 200,
            min_radius: 60.0,
            max_radius: 140.0,
            goal_bias: 0.3,
        }
    }

    fn region() -> Region {
        Region::Rect(Rect::around(Vec2::ZERO, 1000.0))
    }

    #[test]
    fn test_generated_graph_is_connected_and_indexed() {
        let mut generator =
            DiscGenerator::new(AreaId::Dungeon(1), Random::new(9), profile(), region(), Vec2::ZERO, 150.0);
        generator.add_goal(Vec2::new(990.0, 0.0), 100.0);
        generator.add_goal(Vec2::new(0.0, -990.0), 80.0);
        let discs = generator.generate();
        assert!(discs.len() >= 3);
        assert!(is_connected(&discs));
        for (index, disc) in discs.iter().enumerate() {
            assert_eq!(disc.id.index as usize, index);
        }
    }

    #[test]
    fn test_placed_discs_respect_overlap_limit() {
        let generator =
            DiscGenerator::new(AreaId::Dungeon(2), Random::new(4), profile(), region(), Vec2::ZERO, 150.0);
        let discs = generator.generate();
        assert!(discs.len() >= profile().target_discs.min(10));
        for (i, a) in discs.iter().enumerate() {
            assert!(region().contains(a.pos));
            for b in &discs[i + 1..] {
                assert!(circle_overlap(a, b) <= MAX_GENERATION_OVERLAP + 1e-2);
            }
        }
    }

    #[test]
    fn test_unreachable_goal_is_bridged() {
        // No iterations: the goal can only be connected by bridging
        let profile = GenerationProfile {
            max_iterations: 0,
            ..profile()
        };
        let mut generator =
            DiscGenerator::new(AreaId::Dungeon(3), Random::new(1), profile, region(), Vec2::ZERO, 100.0);
        let goal = generator.add_goal(Vec2::new(2500.0, 0.0), 120.0);
        let discs = generator.generate();
        assert!(discs.iter().any(|d| d.id == goal));
        assert!(is_connected(&discs));
        assert!(discs.len() > 2);
    }

    #[test]
    fn test_same_seed_same_graph() {
        let build = || {
            let mut generator =
                DiscGenerator::new(AreaId::Dungeon(5), Random::new(77), profile(), region(), Vec2::ZERO, 150.0);
            generator.add_goal(Vec2::new(-900.0, 400.0), 90.0);
            generator.generate()
        };
        assert_eq!(build(), build());
    }
}
