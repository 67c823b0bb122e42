//! Damage-over-time zones and health pickups.

use glam::Vec2;

use crate::combat::{DamageTargets, Damageable, DispatchReport};
use crate::config::HazardTuning;
use crate::error::{ConfigError, CoreError};
use crate::geometry::{BodyId, Layers, Probe, Shape};
use crate::health::HealthReport;
use crate::sensor::{QueryBuffer, Sensor};

/// Region that hurts everything inside it on a fixed period.
///
/// The period only runs while something is inside. A body the zone depletes
/// is dropped and ignored until it leaves and comes back.
#[derive(Debug)]
pub struct HurtZone {
    id: BodyId,
    position: Vec2,
    shape: Shape,
    tuning: HazardTuning,
    affected: Vec<BodyId>,
    spent: Vec<BodyId>,
    elapsed: f32,
}

impl HurtZone {
    pub fn new(id: BodyId, position: Vec2, shape: Shape, tuning: HazardTuning) -> Result<Self, ConfigError> {
        tuning.validate()?;
        Ok(Self {
            id,
            position,
            shape,
            tuning,
            affected: Vec::new(),
            spent: Vec::new(),
            elapsed: 0.0,
        })
    }

    pub fn id(&self) -> BodyId {
        self.id
    }

    pub fn affected(&self) -> &[BodyId] {
        &self.affected
    }

    pub fn interval(&self) -> f32 {
        self.tuning.interval
    }

    pub fn set_interval(&mut self, seconds: f32) -> Result<(), ConfigError> {
        ConfigError::check_duration("interval", seconds)?;
        self.tuning.interval = seconds;
        Ok(())
    }

    pub fn probe(&self) -> Probe {
        Probe::new(self.shape, self.position, Layers::ACTORS)
    }

    /// Starts tracking `body`. Returns `false` if it was already tracked.
    pub fn enter(&mut self, body: BodyId) -> bool {
        if self.affected.contains(&body) || self.spent.contains(&body) {
            return false;
        }
        tracing::trace!(zone = %self.id, %body, "entered hurt zone");
        self.affected.push(body);
        true
    }

    /// Stops tracking `body`. Returns `false` if it was not tracked.
    pub fn exit(&mut self, body: BodyId) -> bool {
        self.spent.retain(|spent| *spent != body);
        let before = self.affected.len();
        self.affected.retain(|affected| *affected != body);
        before != self.affected.len()
    }

    /// Syncs the tracked set with whatever overlaps the zone right now.
    pub fn refresh(&mut self, sensor: &(impl Sensor + ?Sized), buffer: &mut QueryBuffer) {
        sensor.query_overlap(&self.probe(), buffer);

        let left: Vec<BodyId> = self
            .affected
            .iter()
            .chain(self.spent.iter())
            .copied()
            .filter(|body| !buffer.contains(body))
            .collect();
        for body in left {
            self.exit(body);
        }
        for &body in buffer.iter() {
            self.enter(body);
        }
    }

    /// Advances the period and, when it elapses, damages every tracked body.
    pub fn tick(
        &mut self,
        dt: f32,
        targets: &mut (impl DamageTargets + ?Sized),
    ) -> Result<DispatchReport, CoreError> {
        let mut report = DispatchReport::default();
        if self.affected.is_empty() {
            self.elapsed = 0.0;
            return Ok(report);
        }

        self.elapsed += dt.max(0.0);
        if self.elapsed < self.tuning.interval {
            return Ok(report);
        }
        self.elapsed = 0.0;

        let mut index = 0;
        while index < self.affected.len() {
            let body = self.affected[index];
            match targets.damage(body, self.tuning.damage)? {
                Some(hit) => {
                    report.hits += 1;
                    report.total += hit.delta();
                    if hit.depleted {
                        if !report.depleted.is_full() {
                            report.depleted.push(body);
                        }
                        self.affected.remove(index);
                        self.spent.push(body);
                        continue;
                    }
                }
                None => {
                    self.affected.remove(index);
                    continue;
                }
            }
            index += 1;
        }

        tracing::debug!(zone = %self.id, hits = report.hits, total = report.total, "hurt zone pulse");
        Ok(report)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PickupKind {
    FullRestore,
    TwentyPercent,
}

impl PickupKind {
    /// Heal granted to a pool with the given max.
    pub fn heal_amount(self, max: u32) -> u32 {
        match self {
            PickupKind::FullRestore => max,
            PickupKind::TwentyPercent => (max as f32 * 0.2) as u32,
        }
    }
}

/// Single-use heal, taken by the first hurt actor that touches it.
#[derive(Clone, Debug, PartialEq)]
pub struct HealthPickup {
    id: BodyId,
    position: Vec2,
    shape: Shape,
    kind: PickupKind,
    active: bool,
}

impl HealthPickup {
    pub fn new(id: BodyId, position: Vec2, shape: Shape, kind: PickupKind) -> Self {
        Self {
            id,
            position,
            shape,
            kind,
            active: true,
        }
    }

    pub fn id(&self) -> BodyId {
        self.id
    }

    pub fn kind(&self) -> PickupKind {
        self.kind
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn probe(&self) -> Probe {
        Probe::new(self.shape, self.position, Layers::ACTORS)
    }

    /// Heals `target` if it is below max, then deactivates.
    ///
    /// Returns `Ok(None)` and stays active when `target` is at full health.
    pub fn try_consume(
        &mut self,
        target: &mut (impl Damageable + ?Sized),
    ) -> Result<Option<HealthReport>, CoreError> {
        let health = target.health();
        if !self.active || health.is_full() {
            return Ok(None);
        }

        let amount = self.kind.heal_amount(health.max());
        let report = target.receive_heal(amount)?;
        self.active = false;
        tracing::info!(pickup = %self.id, kind = %self.kind, healed = report.delta(), "health pickup used");
        Ok(Some(report))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::health::Health;
    use crate::sensor::fake::FakeSensor;

    #[derive(Default)]
    struct Pool {
        bodies: HashMap<BodyId, Health>,
    }

    impl DamageTargets for Pool {
        fn damage(&mut self, body: BodyId, amount: u32) -> Result<Option<HealthReport>, CoreError> {
            Ok(self
                .bodies
                .get_mut(&body)
                .map(|health| health.apply_damage(amount)))
        }
    }

    struct Patient(Health);

    impl Damageable for Patient {
        fn health(&self) -> &Health {
            &self.0
        }

        fn receive_damage(&mut self, amount: u32) -> Result<HealthReport, CoreError> {
            Ok(self.0.apply_damage(amount))
        }

        fn receive_heal(&mut self, amount: u32) -> Result<HealthReport, CoreError> {
            Ok(self.0.apply_heal(amount))
        }
    }

    fn zone(interval: f32) -> HurtZone {
        HurtZone::new(
            BodyId(50),
            Vec2::ZERO,
            Shape::rect(Vec2::ONE),
            HazardTuning {
                damage: 10,
                interval,
            },
        )
        .unwrap()
    }

    #[test]
    fn waits_while_empty_then_pulses_on_period() {
        let mut zone = zone(1.0);
        let mut pool = Pool::default();
        pool.bodies.insert(BodyId(1), Health::new(100));

        zone.tick(5.0, &mut pool).unwrap();
        assert_eq!(pool.bodies[&BodyId(1)].current(), 100);

        zone.enter(BodyId(1));
        assert!(zone.tick(0.5, &mut pool).unwrap().is_empty());
        let report = zone.tick(0.5, &mut pool).unwrap();
        assert_eq!(report.hits, 1);
        assert_eq!(pool.bodies[&BodyId(1)].current(), 90);
    }

    #[test]
    fn depleted_bodies_are_dropped() {
        let mut zone = zone(0.0);
        let mut pool = Pool::default();
        pool.bodies.insert(BodyId(1), Health::new(10));
        pool.bodies.insert(BodyId(2), Health::new(100));
        zone.enter(BodyId(1));
        zone.enter(BodyId(2));

        let report = zone.tick(0.1, &mut pool).unwrap();
        assert_eq!(report.depleted.as_slice(), &[BodyId(1)]);
        assert_eq!(zone.affected(), &[BodyId(2)]);
        assert!(!zone.enter(BodyId(1)));
    }

    #[test]
    fn refresh_tracks_overlaps() {
        let mut zone = zone(1.0);
        let mut buffer = QueryBuffer::new();
        let inside = FakeSensor::default().with(3, Shape::circle(0.5), Vec2::new(0.5, 0.0), Layers::PLAYER);

        zone.refresh(&inside, &mut buffer);
        assert_eq!(zone.affected(), &[BodyId(3)]);

        zone.refresh(&FakeSensor::default(), &mut buffer);
        assert!(zone.affected().is_empty());
    }

    #[test]
    fn interval_can_change() {
        let mut zone = zone(1.0);
        zone.set_interval(0.25).unwrap();
        assert_eq!(zone.interval(), 0.25);
        assert!(zone.set_interval(-1.0).is_err());
    }

    #[test]
    fn pickup_skips_full_health() {
        let mut pickup = HealthPickup::new(BodyId(9), Vec2::ZERO, Shape::circle(0.5), PickupKind::FullRestore);
        let mut patient = Patient(Health::new(50));

        assert_eq!(pickup.try_consume(&mut patient).unwrap(), None);
        assert!(pickup.is_active());
    }

    #[test]
    fn twenty_percent_heals_a_fifth_of_max() {
        let mut pickup = HealthPickup::new(BodyId(9), Vec2::ZERO, Shape::circle(0.5), PickupKind::TwentyPercent);
        let mut patient = Patient(Health::new(50));
        patient.0.apply_damage(30);

        let report = pickup.try_consume(&mut patient).unwrap().unwrap();
        assert_eq!(report.delta(), 10);
        assert!(!pickup.is_active());
        assert_eq!(pickup.try_consume(&mut patient).unwrap(), None);
    }

    #[test]
    fn full_restore_can_raise_the_cap() {
        let mut pickup = HealthPickup::new(BodyId(9), Vec2::ZERO, Shape::circle(0.5), PickupKind::FullRestore);
        let mut patient = Patient(Health::new(40));
        patient.0.apply_damage(1);

        pickup.try_consume(&mut patient).unwrap();
        assert_eq!(patient.0.current(), 79);
        assert_eq!(patient.0.max(), 79);
    }
}
