//! Area damage dispatch.

use arrayvec::ArrayVec;

use crate::error::CoreError;
use crate::geometry::{BodyId, Probe};
use crate::health::{Health, HealthReport};
use crate::intent::HitboxSlot;
use crate::sensor::{QUERY_CAPACITY, QueryBuffer, Sensor};

/// Anything that owns a [`Health`] and can be hurt or healed from outside.
///
/// External sources reach an actor's health only through these calls, so the
/// actor can react (interrupt its behavior, die) in the same step.
pub trait Damageable {
    fn health(&self) -> &Health;

    fn receive_damage(&mut self, amount: u32) -> Result<HealthReport, CoreError>;

    fn receive_heal(&mut self, amount: u32) -> Result<HealthReport, CoreError>;
}

/// Resolves bodies returned by a query to the actors that own them.
pub trait DamageTargets {
    /// Damages whatever owns `body`.
    ///
    /// Returns `Ok(None)` if the body belongs to nothing damageable.
    fn damage(&mut self, body: BodyId, amount: u32) -> Result<Option<HealthReport>, CoreError>;

    /// Primary body of whatever owns `body`. Bodies sharing an owner take one
    /// hit per strike between them.
    fn owner(&self, body: BodyId) -> Option<BodyId> {
        Some(body)
    }

    /// Damages only what is local to `body`, for an owner the current strike
    /// has already hit through another of its bodies.
    fn damage_part(&mut self, _body: BodyId, _amount: u32) -> Result<(), CoreError> {
        Ok(())
    }
}

/// One damage pulse from an attacking hitbox.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Strike {
    /// Body of the attacker; never hit by its own strike.
    pub source: BodyId,
    pub slot: HitboxSlot,
    pub probe: Probe,
    pub damage: u32,
}

/// What a strike did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Damageable bodies hit.
    pub hits: u32,
    /// Health actually removed across all hits.
    pub total: u32,
    /// Bodies this strike depleted.
    pub depleted: ArrayVec<BodyId, QUERY_CAPACITY>,
}

impl DispatchReport {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.hits == 0
    }
}

/// Runs the shared area-damage algorithm for one strike.
///
/// Queries `strike.probe` into `buffer`, skips the attacker's own body and
/// every body without a damageable owner, and applies `strike.damage` once to
/// each remaining owner. Further bodies of an owner already hit only take
/// [`DamageTargets::damage_part`].
pub fn dispatch_strike(
    sensor: &(impl Sensor + ?Sized),
    targets: &mut (impl DamageTargets + ?Sized),
    strike: &Strike,
    buffer: &mut QueryBuffer,
) -> Result<DispatchReport, CoreError> {
    let mut report = DispatchReport::default();
    let mut struck = ArrayVec::<BodyId, QUERY_CAPACITY>::new();
    sensor.query_overlap(&strike.probe, buffer);

    for &body in buffer.iter() {
        let Some(owner) = targets.owner(body) else {
            continue;
        };
        if body == strike.source || owner == strike.source {
            continue;
        }
        if struck.contains(&owner) {
            targets.damage_part(body, strike.damage)?;
            continue;
        }
        let Some(hit) = targets.damage(body, strike.damage)? else {
            continue;
        };

        struck.push(owner);
        report.hits += 1;
        report.total += hit.delta();
        if hit.depleted {
            report.depleted.push(body);
        }
    }

    if !report.is_empty() {
        tracing::debug!(
            source = %strike.source,
            slot = %strike.slot,
            hits = report.hits,
            total = report.total,
            "strike landed"
        );
    }
    Ok(report)
}
