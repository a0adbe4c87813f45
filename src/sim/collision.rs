//! Collision and geometry helpers for circular entities
//!
//! Everything in the simulation is a circle: discs, the hero, enemies,
//! bullets, loot and portals. These helpers never produce NaN; a zero-length
//! direction falls back to a fixed unit vector so facing math stays live.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Fallback direction for coincident points
pub const FALLBACK_DIRECTION: Vec2 = Vec2::X;

/// Anything with a center and a radius
pub trait Circle {
    fn center(&self) -> Vec2;
    fn radius(&self) -> f32;
}

/// Unit vector from `from` toward `to`, or [`FALLBACK_DIRECTION`] when they coincide
#[inline]
pub fn direction_between(from: Vec2, to: Vec2) -> Vec2 {
    let delta = to - from;
    let length = delta.length();
    if length <= f32::EPSILON {
        FALLBACK_DIRECTION
    } else {
        delta / length
    }
}

/// Unit vector from one circle's center toward another's
#[inline]
pub fn vector_to_circle<A: Circle + ?Sized, B: Circle + ?Sized>(from: &A, to: &B) -> Vec2 {
    direction_between(from.center(), to.center())
}

/// Surface-to-surface distance (negative when overlapping)
#[inline]
pub fn distance_between_circles<A: Circle + ?Sized, B: Circle + ?Sized>(a: &A, b: &B) -> f32 {
    a.center().distance(b.center()) - a.radius() - b.radius()
}

/// How deep two circles overlap (negative when apart)
#[inline]
pub fn circle_overlap<A: Circle + ?Sized, B: Circle + ?Sized>(a: &A, b: &B) -> f32 {
    -distance_between_circles(a, b)
}

/// True if two circles touch or overlap
#[inline]
pub fn circles_intersect<A: Circle + ?Sized, B: Circle + ?Sized>(a: &A, b: &B) -> bool {
    let r = a.radius() + b.radius();
    a.center().distance_squared(b.center()) <= r * r
}

/// Pull `point` back inside a circle if it strayed outside
pub fn clamp_to_circle(point: Vec2, center: Vec2, radius: f32) -> Vec2 {
    let offset = point - center;
    if offset.length_squared() <= radius * radius {
        point
    } else {
        center + direction_between(center, point) * radius
    }
}

/// Push `point` out of a circle if it is inside
pub fn push_out_of_circle(point: Vec2, center: Vec2, radius: f32) -> Vec2 {
    let offset = point - center;
    if offset.length_squared() >= radius * radius {
        point
    } else {
        center + direction_between(center, point) * radius
    }
}

/// A plain positioned circle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircleShape {
    pub pos: Vec2,
    pub radius: f32,
}

impl CircleShape {
    pub fn new(pos: Vec2, radius: f32) -> Self {
        Self { pos, radius }
    }
}

impl Circle for CircleShape {
    fn center(&self) -> Vec2 {
        self.pos
    }

    fn radius(&self) -> f32 {
        self.radius
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Square of half-size `half_extent` around `center`
    pub fn around(center: Vec2, half_extent: f32) -> Self {
        Self::new(center - Vec2::splat(half_extent), center + Vec2::splat(half_extent))
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// True if the whole circle lies inside the rectangle
    pub fn contains_circle<C: Circle + ?Sized>(&self, circle: &C) -> bool {
        let inner = Rect::new(
            self.min + Vec2::splat(circle.radius()),
            self.max - Vec2::splat(circle.radius()),
        );
        circle.radius() * 2.0 <= self.width().min(self.height()) && inner.contains_point(circle.center())
    }

    /// True if the rectangles share any area
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_guard_on_zero_distance() {
        let dir = direction_between(Vec2::new(5.0, 5.0), Vec2::new(5.0, 5.0));
        assert_eq!(dir, FALLBACK_DIRECTION);
        assert!(!dir.x.is_nan());
    }

    #[test]
    fn test_circle_distance_and_overlap() {
        let a = CircleShape::new(Vec2::ZERO, 10.0);
        let b = CircleShape::new(Vec2::new(25.0, 0.0), 10.0);
        assert!((distance_between_circles(&a, &b) - 5.0).abs() < 1e-5);
        assert!(!circles_intersect(&a, &b));

        let c = CircleShape::new(Vec2::new(15.0, 0.0), 10.0);
        assert!((circle_overlap(&a, &c) - 5.0).abs() < 1e-5);
        assert!(circles_intersect(&a, &c));
        assert!((vector_to_circle(&a, &c) - Vec2::X).length() < 1e-6);
    }

    #[test]
    fn test_clamp_and_push() {
        let clamped = clamp_to_circle(Vec2::new(0.0, 50.0), Vec2::ZERO, 20.0);
        assert!((clamped - Vec2::new(0.0, 20.0)).length() < 1e-5);
        let inside = clamp_to_circle(Vec2::new(3.0, 4.0), Vec2::ZERO, 20.0);
        assert_eq!(inside, Vec2::new(3.0, 4.0));

        let pushed = push_out_of_circle(Vec2::new(1.0, 0.0), Vec2::ZERO, 10.0);
        assert!((pushed - Vec2::new(10.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_rect_containment() {
        let rect = Rect::new(Vec2::ZERO, Vec2::new(100.0, 50.0));
        assert!(rect.contains_point(Vec2::new(50.0, 25.0)));
        assert!(!rect.contains_point(Vec2::new(150.0, 25.0)));
        assert!(rect.contains_circle(&CircleShape::new(Vec2::new(50.0, 25.0), 20.0)));
        assert!(!rect.contains_circle(&CircleShape::new(Vec2::new(10.0, 25.0), 20.0)));
        assert!(!rect.contains_circle(&CircleShape::new(Vec2::new(50.0, 25.0), 30.0)));
        assert!(rect.intersects(&Rect::around(Vec2::new(110.0, 25.0), 15.0)));
        assert!(!rect.intersects(&Rect::around(Vec2::new(200.0, 25.0), 15.0)));
    }
}
