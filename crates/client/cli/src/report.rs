//! End-of-run summary and per-frame event logging.
use std::fmt::Write as _;

use game_core::ActorKind;
use runtime::{ActorRecord, Event};

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The player went down.
    Defeat,
    /// Every enemy and boss is gone while the player stands.
    Victory,
    /// Time ran out with both sides standing.
    Timeout,
}

impl Outcome {
    /// Outcome implied by the records, or `None` while the fight goes on.
    pub fn decided<'a>(records: impl IntoIterator<Item = &'a ActorRecord>) -> Option<Self> {
        let mut player_down = false;
        let mut player_seen = false;
        let mut foes_left = 0;
        let mut foes_seen = 0;
        for record in records {
            match record.kind {
                ActorKind::Player => {
                    player_seen = true;
                    player_down |= record.despawned;
                }
                ActorKind::Enemy | ActorKind::Boss => {
                    foes_seen += 1;
                    if !record.despawned {
                        foes_left += 1;
                    }
                }
            }
        }

        if player_down {
            Some(Outcome::Defeat)
        } else if player_seen && foes_seen > 0 && foes_left == 0 {
            Some(Outcome::Victory)
        } else {
            None
        }
    }
}

/// Logs one drained runtime event.
pub fn log_event(event: &Event) {
    match event {
        Event::Damaged {
            source,
            target,
            amount,
            remaining,
        } => tracing::info!(%source, %target, amount, remaining, "hit"),
        Event::Healed {
            target,
            amount,
            current,
        } => tracing::info!(%target, amount, current, "healed"),
        Event::PickupUsed {
            pickup,
            kind,
            target,
        } => tracing::info!(%pickup, %kind, %target, "pickup used"),
        Event::Died { body } => tracing::info!(%body, "died"),
        Event::Despawned { body } => tracing::info!(%body, "despawned"),
        Event::Spawned { body, kind } => tracing::info!(%body, %kind, "spawned"),
        Event::BehaviorChanged { body, behavior } => {
            tracing::debug!(%body, %behavior, "behavior")
        }
        Event::Cue { body, name } => tracing::debug!(%body, cue = name, "cue"),
        Event::HitboxToggled {
            body,
            slot,
            enabled,
        } => tracing::trace!(%body, ?slot, enabled, "hitbox"),
    }
}

/// Renders the per-actor table printed when a run ends.
pub fn summary<'a>(
    scenario: &str,
    elapsed: f64,
    outcome: Outcome,
    records: impl IntoIterator<Item = &'a ActorRecord>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "scenario '{scenario}' after {elapsed:.2}s: {outcome:?}");
    let _ = writeln!(
        out,
        "{:<6} {:<7} {:<16} {:>8} {:>9}  status",
        "body", "kind", "behavior", "changes", "health"
    );
    for record in records {
        let behavior = record
            .behavior
            .map(|tag| tag.to_string())
            .unwrap_or_else(|| "-".to_string());
        let status = match (record.died, record.despawned) {
            (_, true) => "despawned",
            (true, false) => "dying",
            (false, false) => "alive",
        };
        let _ = writeln!(
            out,
            "{:<6} {:<7} {:<16} {:>8} {:>9}  {status}",
            record.body.0,
            record.kind.as_ref(),
            behavior,
            record.behavior_changes,
            format!("{}/{}", record.health, record.max_health),
        );
    }
    out
}
