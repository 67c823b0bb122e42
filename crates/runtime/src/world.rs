//! Headless collision world.
//!
//! Holds the static terrain and a per-step snapshot of every actor collider,
//! answers the overlap queries controllers make through [`Sensor`], and moves
//! mobile bodies with a minimal kinematic integrator.

use game_core::{BodyId, Collider, Kinematics, Layers, Probe, QueryBuffer, Sensor, Shape};
use glam::Vec2;

#[derive(Debug, Default)]
pub struct CollisionWorld {
    statics: Vec<Collider>,
    dynamics: Vec<Collider>,
}

impl CollisionWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a terrain collider owned by no actor.
    pub fn add_static(&mut self, position: Vec2, shape: Shape, layers: Layers) {
        self.statics.push(Collider {
            body: BodyId::STATIC,
            shape,
            position,
            layers,
        });
    }

    pub fn statics(&self) -> &[Collider] {
        &self.statics
    }

    pub fn dynamics(&self) -> &[Collider] {
        &self.dynamics
    }

    /// Drops the actor snapshot so it can be rebuilt.
    pub fn clear_dynamics(&mut self) {
        self.dynamics.clear();
    }

    /// Mutable access for refilling the actor snapshot.
    pub fn dynamics_mut(&mut self) -> &mut Vec<Collider> {
        &mut self.dynamics
    }

    /// Applies gravity, moves the body and pushes it out of solid terrain.
    ///
    /// Vertical speed never drops below `gravity`, matching the floor the
    /// controllers apply when they steer.
    pub fn integrate(&self, motion: &mut Kinematics, body: Shape, gravity: f32, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        motion.velocity.y = (motion.velocity.y + gravity * dt).max(gravity.min(0.0));
        motion.position += motion.velocity * dt;
        self.resolve(motion, body);
    }

    /// Separates `body` from every overlapping terrain collider along the
    /// axis of least penetration, cancelling velocity into the contact.
    fn resolve(&self, motion: &mut Kinematics, body: Shape) {
        let half = half_extents(body);
        for solid in self.statics.iter().filter(|c| c.layers.intersects(Layers::TERRAIN)) {
            let other = half_extents(solid.shape);
            let gap = motion.position - solid.position;
            let overlap = half + other - gap.abs();
            if overlap.x <= 0.0 || overlap.y <= 0.0 {
                continue;
            }

            if overlap.y <= overlap.x {
                let push = overlap.y.copysign(gap.y);
                motion.position.y += push;
                if push * motion.velocity.y < 0.0 {
                    motion.velocity.y = 0.0;
                }
            } else {
                let push = overlap.x.copysign(gap.x);
                motion.position.x += push;
                if push * motion.velocity.x < 0.0 {
                    motion.velocity.x = 0.0;
                }
            }
        }
    }

    fn candidates(&self) -> impl Iterator<Item = &Collider> {
        self.statics.iter().chain(self.dynamics.iter())
    }
}

impl Sensor for CollisionWorld {
    fn query_overlap(&self, probe: &Probe, out: &mut QueryBuffer) {
        out.clear();
        for collider in self.candidates() {
            if out.is_full() {
                tracing::trace!(origin = ?probe.origin, "overlap query truncated");
                break;
            }
            if collider.layers.intersects(probe.mask)
                && probe
                    .shape
                    .overlaps(probe.origin, collider.shape, collider.position)
            {
                out.push(collider.body);
            }
        }
    }
}

/// Axis-aligned half size of a shape.
fn half_extents(shape: Shape) -> Vec2 {
    match shape {
        Shape::Circle { radius } => Vec2::splat(radius),
        Shape::Rect { half_extents } => half_extents,
    }
}
