//! Health pool shared by every actor.
//!
//! Amounts are unsigned: negative damage or healing cannot be expressed, and
//! a zero amount changes nothing and notifies nobody.

use std::fmt;

use crate::observer::{Observers, SubscriptionId};

/// Notifications published by [`Health`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HealthEvent {
    /// The current value moved. Carries the values after the change.
    Changed { current: u32, max: u32 },
    /// The current value just reached zero from a positive value.
    Depleted,
}

/// Outcome of a single damage or heal call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct HealthReport {
    pub previous: u32,
    pub current: u32,
    pub max: u32,
    /// Set when this call moved the pool from positive to zero.
    pub depleted: bool,
}

impl HealthReport {
    #[inline]
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }

    /// Amount actually removed (damage) or added (heal).
    #[inline]
    pub fn delta(&self) -> u32 {
        self.previous.abs_diff(self.current)
    }
}

/// Clamped integer resource with change and depletion notifications.
///
/// # Invariants
///
/// - `0 <= current <= max`
/// - `max` never decreases
/// - [`HealthEvent::Depleted`] fires once per crossing into zero, never
///   while already at zero
pub struct Health {
    current: u32,
    max: u32,
    observers: Observers<HealthEvent>,
}

impl Health {
    /// Creates a full pool; `initial` seeds both current and max.
    pub fn new(initial: u32) -> Self {
        Self {
            current: initial,
            max: initial,
            observers: Observers::new(),
        }
    }

    #[inline]
    pub fn current(&self) -> u32 {
        self.current
    }

    #[inline]
    pub fn max(&self) -> u32 {
        self.max
    }

    #[inline]
    pub fn is_depleted(&self) -> bool {
        self.current == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }

    /// Current value as a fraction of max (0.0 for an empty pool).
    pub fn fraction(&self) -> f32 {
        if self.max == 0 {
            0.0
        } else {
            self.current as f32 / self.max as f32
        }
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&HealthEvent) + 'static) -> SubscriptionId {
        self.observers.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Removes `amount`, clamping at zero.
    ///
    /// When both apply, [`HealthEvent::Depleted`] is delivered before
    /// [`HealthEvent::Changed`].
    pub fn apply_damage(&mut self, amount: u32) -> HealthReport {
        let previous = self.current;
        self.current = self.current.saturating_sub(amount);

        let report = self.report(previous);
        if report.depleted {
            self.observers.notify(&HealthEvent::Depleted);
        }
        if report.changed() {
            self.notify_changed();
        }
        report
    }

    /// Adds `amount`, raising max when the result exceeds it.
    pub fn apply_heal(&mut self, amount: u32) -> HealthReport {
        let previous = self.current;
        self.current = self.current.saturating_add(amount);
        if self.current > self.max {
            self.max = self.current;
        }

        let report = self.report(previous);
        if report.changed() {
            self.notify_changed();
        }
        report
    }

    fn report(&self, previous: u32) -> HealthReport {
        HealthReport {
            previous,
            current: self.current,
            max: self.max,
            depleted: previous > 0 && self.current == 0,
        }
    }

    fn notify_changed(&mut self) {
        let event = HealthEvent::Changed {
            current: self.current,
            max: self.max,
        };
        self.observers.notify(&event);
    }
}

impl fmt::Debug for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Health")
            .field("current", &self.current)
            .field("max", &self.max)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn recorded(health: &mut Health) -> Rc<RefCell<Vec<HealthEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        health.subscribe(move |event| sink.borrow_mut().push(*event));
        events
    }

    #[test]
    fn damage_then_depletion_scenario() {
        let mut health = Health::new(100);
        let events = recorded(&mut health);

        let report = health.apply_damage(30);
        assert_eq!((health.current(), health.max()), (70, 100));
        assert!(!report.depleted);
        assert_eq!(
            *events.borrow(),
            vec![HealthEvent::Changed {
                current: 70,
                max: 100
            }]
        );

        events.borrow_mut().clear();
        let report = health.apply_damage(70);
        assert!(report.depleted);
        assert_eq!(health.current(), 0);
        assert_eq!(
            *events.borrow(),
            vec![
                HealthEvent::Depleted,
                HealthEvent::Changed {
                    current: 0,
                    max: 100
                }
            ]
        );
    }

    #[test]
    fn depletion_fires_once_while_empty() {
        let mut health = Health::new(10);
        let events = recorded(&mut health);

        health.apply_damage(25);
        health.apply_damage(5);
        health.apply_damage(0);

        let depleted = events
            .borrow()
            .iter()
            .filter(|event| **event == HealthEvent::Depleted)
            .count();
        assert_eq!(depleted, 1);
        assert_eq!(events.borrow().len(), 2);
    }

    #[test]
    fn depletion_fires_again_after_recovery() {
        let mut health = Health::new(10);
        let events = recorded(&mut health);

        health.apply_damage(10);
        health.apply_heal(4);
        health.apply_damage(4);

        let depleted = events
            .borrow()
            .iter()
            .filter(|event| **event == HealthEvent::Depleted)
            .count();
        assert_eq!(depleted, 2);
    }

    #[test]
    fn heal_above_max_raises_cap() {
        let mut health = Health::new(50);
        health.apply_damage(10);

        let report = health.apply_heal(30);
        assert_eq!(report.delta(), 30);
        assert_eq!((health.current(), health.max()), (70, 70));
    }

    #[test]
    fn zero_amounts_are_silent() {
        let mut health = Health::new(5);
        let events = recorded(&mut health);

        assert!(!health.apply_heal(0).changed());
        assert!(!health.apply_damage(0).changed());
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn bounds_hold_for_mixed_sequences() {
        let mut health = Health::new(40);
        let mut last_max = health.max();
        let script: [(bool, u32); 10] = [
            (true, 15),
            (false, 3),
            (true, 100),
            (false, 60),
            (true, 1),
            (false, 0),
            (true, 59),
            (false, 200),
            (true, u32::MAX),
            (false, 1),
        ];

        for (damage, amount) in script {
            if damage {
                health.apply_damage(amount);
            } else {
                health.apply_heal(amount);
            }
            assert!(health.current() <= health.max());
            assert!(health.max() >= last_max);
            last_max = health.max();
        }
    }

    #[test]
    fn handler_can_observe_reentrant_teardown() {
        let mut health = Health::new(1);
        let destroyed = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&destroyed);
        health.subscribe(move |event| {
            if *event == HealthEvent::Depleted {
                *flag.borrow_mut() = true;
            }
        });

        health.apply_damage(1);
        assert!(*destroyed.borrow());
    }
}
