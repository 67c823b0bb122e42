//! Owned actors and body-to-owner lookup.

use game_core::{Actor, BodyId, CoreError, DamageTargets, HealthReport, SubscriptionId};

use crate::events::{Event, EventBus};

struct ActorSlot {
    actor: Box<dyn Actor>,
    subscription: SubscriptionId,
}

/// Every live actor, in spawn order.
#[derive(Default)]
pub struct ActorRegistry {
    slots: Vec<ActorSlot>,
}

impl ActorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, actor: Box<dyn Actor>, subscription: SubscriptionId) {
        self.slots.push(ActorSlot {
            actor,
            subscription,
        });
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Actor whose primary body is `body`.
    pub fn get(&self, body: BodyId) -> Option<&dyn Actor> {
        self.slots
            .iter()
            .find(|slot| slot.actor.body() == body)
            .map(|slot| slot.actor.as_ref())
    }

    pub fn get_mut(&mut self, body: BodyId) -> Option<&mut dyn Actor> {
        self.slots
            .iter_mut()
            .find(|slot| slot.actor.body() == body)
            .map(|slot| slot.actor.as_mut() as &mut dyn Actor)
    }

    /// Actor owning `body` as its primary body or any secondary collider.
    pub fn owner(&self, body: BodyId) -> Option<&dyn Actor> {
        if body.is_static() {
            return None;
        }
        self.slots
            .iter()
            .find(|slot| slot.actor.owns(body))
            .map(|slot| slot.actor.as_ref())
    }

    pub fn owner_mut(&mut self, body: BodyId) -> Option<&mut dyn Actor> {
        if body.is_static() {
            return None;
        }
        self.slots
            .iter_mut()
            .find(|slot| slot.actor.owns(body))
            .map(|slot| slot.actor.as_mut() as &mut dyn Actor)
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Actor> {
        self.slots.iter().map(|slot| slot.actor.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut (dyn Actor + 'static)> {
        self.slots.iter_mut().map(|slot| slot.actor.as_mut())
    }

    /// Removes every actor whose death has completed, handing back each one
    /// with the subscription the runtime registered on it.
    pub(crate) fn take_finished(&mut self) -> Vec<(Box<dyn Actor>, SubscriptionId)> {
        let mut finished = Vec::new();
        let mut index = 0;
        while index < self.slots.len() {
            if self.slots[index].actor.is_finished() {
                let slot = self.slots.remove(index);
                finished.push((slot.actor, slot.subscription));
            } else {
                index += 1;
            }
        }
        finished
    }
}

/// Damage routing for one damage source, reporting every hit on the bus.
pub(crate) struct Targets<'a> {
    pub actors: &'a mut ActorRegistry,
    pub events: &'a EventBus,
    pub source: BodyId,
}

impl DamageTargets for Targets<'_> {
    fn damage(&mut self, body: BodyId, amount: u32) -> Result<Option<HealthReport>, CoreError> {
        let Some(actor) = self.actors.owner_mut(body) else {
            return Ok(None);
        };
        if actor.is_finished() {
            return Ok(None);
        }

        let report = actor.receive_damage_at(body, amount)?;
        if report.changed() {
            self.events.publish(Event::Damaged {
                source: self.source,
                target: body,
                amount: report.delta(),
                remaining: report.current,
            });
        }
        Ok(Some(report))
    }

    fn owner(&self, body: BodyId) -> Option<BodyId> {
        self.actors.owner(body).map(|actor| actor.body())
    }

    fn damage_part(&mut self, body: BodyId, amount: u32) -> Result<(), CoreError> {
        match self.actors.owner_mut(body) {
            Some(actor) if !actor.is_finished() => actor.receive_part_damage(body, amount),
            _ => Ok(()),
        }
    }
}
