//! Transition request slot.

use crate::{Context, State};

/// Slot through which a hook asks its machine to switch states.
///
/// Only the latest request survives: calling [`to`](Transition::to) twice
/// from the same hook replaces the first request.
pub struct Transition<C: Context> {
    requested: Option<Box<dyn State<C>>>,
}

impl<C: Context> Transition<C> {
    pub(crate) fn new() -> Self {
        Self { requested: None }
    }

    /// Requests `state` as the next current state.
    pub fn to(&mut self, state: impl State<C> + 'static) {
        self.to_boxed(Box::new(state));
    }

    /// Same as [`to`](Transition::to) for an already boxed state.
    pub fn to_boxed(&mut self, state: Box<dyn State<C>>) {
        if let Some(previous) = self.requested.replace(state) {
            tracing::trace!("transition to {:?} overridden", previous.tag());
        }
    }

    /// Withdraws any pending request.
    pub fn cancel(&mut self) {
        self.requested = None;
    }

    /// Returns `true` if a transition has been requested.
    #[inline]
    pub fn is_requested(&self) -> bool {
        self.requested.is_some()
    }

    /// Tag of the pending request, if any.
    pub fn requested_tag(&self) -> Option<C::Tag> {
        self.requested.as_ref().map(|state| state.tag())
    }

    pub(crate) fn take(&mut self) -> Option<Box<dyn State<C>>> {
        self.requested.take()
    }
}
