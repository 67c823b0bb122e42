//! Errors raised by the activation protocol.

/// Errors surfaced while activating states.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FsmError {
    /// Entry phases kept requesting new states without ever settling.
    #[error("transition chain too deep: '{last}' requested at depth {depth}")]
    TransitionChainTooDeep { last: String, depth: usize },
}
