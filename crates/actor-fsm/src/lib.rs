//! Cooperative state machine shared by every actor in the game.
//!
//! A [`State`] owns three hooks: a resumable entry phase that may suspend
//! across several simulation ticks, a per-tick update and a per-physics-tick
//! update. The [`StateMachine`] keeps exactly one state current and tears the
//! previous one down before the next one starts.
//!
//! - **Single-threaded**: hosts drive [`StateMachine::tick`] and
//!   [`StateMachine::fixed_tick`]; there are no threads or locks.
//! - **Cancel on supersede**: a suspended entry phase is discarded the moment
//!   another state becomes current and never resumes.
//! - **Deterministic**: suspension is measured in simulated seconds fed in by
//!   the host, never in wall-clock time.
//!
//! # Architecture
//!
//! - [`State`] / [`Context`]: behavior units and the data they act on
//! - [`Suspend`]: how an entry phase yields back to the machine
//! - [`Transition`]: request slot handed to every hook
//! - [`StateMachine`]: activation protocol and scheduling

pub mod error;
pub mod machine;
pub mod state;
pub mod transition;

pub use error::FsmError;
pub use machine::StateMachine;
pub use state::{Context, State, Suspend};
pub use transition::Transition;
