//! Core state trait.
//!
//! This module defines the [`State`] trait, the unit of behavior driven by a
//! [`StateMachine`](crate::StateMachine). The trait is generic over a context
//! type `C` that holds whatever the owning actor exposes to its states.

use std::fmt::Debug;

use crate::Transition;

/// Data shared between an actor and its states.
pub trait Context {
    /// High-level behavior tag broadcast whenever a state becomes current.
    type Tag: Copy + Debug + PartialEq + 'static;

    /// Called once per activation, after the new state is current and before
    /// its entry phase starts.
    fn state_changed(&mut self, _tag: Self::Tag) {}
}

/// How an entry phase hands control back to the machine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Suspend {
    /// The entry phase is over; only steady-state updates run from now on.
    Done,
    /// Resume the entry phase on the next simulation tick.
    NextTick,
    /// Resume the entry phase once this many simulated seconds have passed.
    Seconds(f32),
}

impl Suspend {
    /// Returns `true` if the entry phase wants to be resumed later.
    #[inline]
    pub fn is_pending(self) -> bool {
        !matches!(self, Suspend::Done)
    }
}

/// A unit of behavior owned by a [`StateMachine`](crate::StateMachine).
///
/// # Entry phase
///
/// [`enter`](State::enter) is called once when the state becomes current and
/// again every time a suspension it returned has elapsed. The state keeps its
/// own resume point between calls. Returning [`Suspend::Done`] ends the entry
/// phase; the state then stays current, answering only to
/// [`execute`](State::execute) and [`fixed_execute`](State::fixed_execute),
/// until something requests a transition.
///
/// While the entry phase is suspended both update hooks keep running on the
/// same state.
///
/// # Transitions
///
/// Every hook receives a [`Transition`] slot. A request made there applies as
/// soon as the hook returns; the rest of the entry phase is discarded.
pub trait State<C: Context> {
    /// The behavior this state represents.
    fn tag(&self) -> C::Tag;

    /// One slice of the entry phase.
    fn enter(&mut self, _ctx: &mut C, _next: &mut Transition<C>) -> Suspend {
        Suspend::Done
    }

    /// Per simulation tick update.
    fn execute(&mut self, _ctx: &mut C, _next: &mut Transition<C>) {}

    /// Per physics tick update.
    fn fixed_execute(&mut self, _ctx: &mut C, _next: &mut Transition<C>) {}

    /// Teardown hook. Runs synchronously before the next state is entered and
    /// cannot suspend.
    fn exit(&mut self, _ctx: &mut C) {}
}
