//! Bodies, collision layers and probe shapes.
//!
//! These are the vocabulary of the [`Sensor`](crate::Sensor) contract: the
//! core asks "what overlaps this probe on these layers" and gets back body
//! identifiers. How bodies are stored is up to the host.

use std::fmt;

use bitflags::bitflags;
use glam::Vec2;

/// Unique identifier for any collider the host tracks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BodyId(pub u32);

impl BodyId {
    /// Reserved identifier for colliders that belong to no actor (terrain).
    pub const STATIC: Self = Self(u32::MAX);

    #[inline]
    pub const fn is_static(self) -> bool {
        self.0 == Self::STATIC.0
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

bitflags! {
    /// Collision layers a body lives on, and layer masks probes filter by.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct Layers: u32 {
        const GROUND = 1 << 0;
        const WALL   = 1 << 1;
        const PLAYER = 1 << 2;
        const ENEMY  = 1 << 3;
        const BOSS   = 1 << 4;
        const HAZARD = 1 << 5;
        const PICKUP = 1 << 6;

        /// Everything solid an actor can stand on or bump into.
        const TERRAIN = Self::GROUND.bits() | Self::WALL.bits();
        /// Everything that can receive damage.
        const ACTORS = Self::PLAYER.bits() | Self::ENEMY.bits() | Self::BOSS.bits();
    }
}

/// Overlap shape, centered on the probe origin.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Shape {
    Circle { radius: f32 },
    Rect { half_extents: Vec2 },
}

impl Shape {
    pub const fn circle(radius: f32) -> Self {
        Self::Circle { radius }
    }

    pub const fn rect(half_extents: Vec2) -> Self {
        Self::Rect { half_extents }
    }

    /// Returns the same shape grown by `margin` on every side.
    pub fn inflate(self, margin: f32) -> Self {
        match self {
            Shape::Circle { radius } => Shape::Circle {
                radius: (radius + margin).max(0.0),
            },
            Shape::Rect { half_extents } => Shape::Rect {
                half_extents: (half_extents + Vec2::splat(margin)).max(Vec2::ZERO),
            },
        }
    }

    /// Tests whether this shape at `origin` overlaps `other` at `other_origin`.
    ///
    /// Touching edges count as overlapping.
    pub fn overlaps(self, origin: Vec2, other: Shape, other_origin: Vec2) -> bool {
        match (self, other) {
            (Shape::Circle { radius: a }, Shape::Circle { radius: b }) => {
                origin.distance_squared(other_origin) <= (a + b) * (a + b)
            }
            (Shape::Circle { radius }, Shape::Rect { half_extents }) => {
                circle_rect(origin, radius, other_origin, half_extents)
            }
            (Shape::Rect { half_extents }, Shape::Circle { radius }) => {
                circle_rect(other_origin, radius, origin, half_extents)
            }
            (Shape::Rect { half_extents: a }, Shape::Rect { half_extents: b }) => {
                let gap = (origin - other_origin).abs();
                gap.x <= a.x + b.x && gap.y <= a.y + b.y
            }
        }
    }
}

fn circle_rect(center: Vec2, radius: f32, rect_center: Vec2, half_extents: Vec2) -> bool {
    let closest = center.clamp(rect_center - half_extents, rect_center + half_extents);
    center.distance_squared(closest) <= radius * radius
}

/// One overlap query: a shape placed at a point, filtered by layer mask.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Probe {
    pub shape: Shape,
    pub origin: Vec2,
    pub mask: Layers,
}

impl Probe {
    pub const fn new(shape: Shape, origin: Vec2, mask: Layers) -> Self {
        Self {
            shape,
            origin,
            mask,
        }
    }

    pub const fn circle(origin: Vec2, radius: f32, mask: Layers) -> Self {
        Self::new(Shape::circle(radius), origin, mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circles_touching_overlap() {
        let a = Shape::circle(1.0);
        assert!(a.overlaps(Vec2::ZERO, Shape::circle(1.0), Vec2::new(2.0, 0.0)));
        assert!(!a.overlaps(Vec2::ZERO, Shape::circle(1.0), Vec2::new(2.1, 0.0)));
    }

    #[test]
    fn circle_against_rect_uses_closest_point() {
        let rect = Shape::rect(Vec2::new(2.0, 0.5));
        let probe = Shape::circle(0.5);

        assert!(probe.overlaps(Vec2::new(1.5, 0.9), rect, Vec2::ZERO));
        assert!(!probe.overlaps(Vec2::new(2.6, 1.1), rect, Vec2::ZERO));
        assert!(rect.overlaps(Vec2::ZERO, probe, Vec2::new(0.0, -0.9)));
    }

    #[test]
    fn rects_overlap_on_both_axes_only() {
        let a = Shape::rect(Vec2::ONE);
        assert!(a.overlaps(Vec2::ZERO, a, Vec2::new(1.5, 1.5)));
        assert!(!a.overlaps(Vec2::ZERO, a, Vec2::new(1.5, 2.5)));
    }

    #[test]
    fn inflate_never_goes_negative() {
        assert_eq!(Shape::circle(0.1).inflate(-1.0), Shape::circle(0.0));
        assert_eq!(
            Shape::rect(Vec2::new(1.0, 0.2)).inflate(-0.5),
            Shape::rect(Vec2::new(0.5, 0.0))
        );
    }

    #[test]
    fn layer_groups() {
        assert!(Layers::ACTORS.contains(Layers::BOSS));
        assert!(!Layers::TERRAIN.intersects(Layers::PLAYER));
    }
}
