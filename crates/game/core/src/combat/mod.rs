//! Damage plumbing shared by every attacker.
//!
//! - [`Damageable`]: the public damage/heal entry points every actor exposes
//! - [`DamageTargets`]: host-side lookup from a body to its damageable owner
//! - [`dispatch_strike`]: the one area-damage algorithm all hitboxes use

pub mod damage;

pub use damage::{DamageTargets, Damageable, DispatchReport, Strike, dispatch_strike};
