//! Tuning parameters for the simulation and every actor archetype.
//!
//! All tunings have `Default`s matching the stock enemy, boss and player, so
//! data files only need to list what they change. Call `validate` before
//! spawning; controllers assume validated input.

use glam::Vec2;

use crate::error::ConfigError;
use crate::geometry::{Layers, Probe, Shape};
use crate::motion::Facing;

/// Global simulation settings.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    /// Downward acceleration; also the floor for vertical velocity.
    pub gravity: f32,
    /// Seconds per physics tick.
    pub fixed_timestep: f32,
    /// Bound on activations chained from a single transition request.
    pub max_transition_chain: usize,
}

impl GameConfig {
    pub const DEFAULT_GRAVITY: f32 = -9.81;
    pub const DEFAULT_FIXED_TIMESTEP: f32 = 0.02;
    pub const DEFAULT_MAX_TRANSITION_CHAIN: usize = actor_fsm::machine::DEFAULT_MAX_CHAIN;

    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_finite("gravity", self.gravity)?;
        ConfigError::check_positive("fixed_timestep", self.fixed_timestep)?;
        if self.max_transition_chain == 0 {
            return Err(ConfigError::NotPositive {
                field: "max_transition_chain",
                value: 0.0,
            });
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            gravity: Self::DEFAULT_GRAVITY,
            fixed_timestep: Self::DEFAULT_FIXED_TIMESTEP,
            max_transition_chain: Self::DEFAULT_MAX_TRANSITION_CHAIN,
        }
    }
}

/// An area query placed relative to an actor.
///
/// `offset` is given for an actor facing right and mirrored when it faces
/// left.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProbeSpec {
    pub offset: Vec2,
    pub shape: Shape,
    pub mask: Layers,
}

impl ProbeSpec {
    pub const fn new(offset: Vec2, shape: Shape, mask: Layers) -> Self {
        Self {
            offset,
            shape,
            mask,
        }
    }

    /// World-space probe for an actor at `position` facing `facing`.
    pub fn at(&self, position: Vec2, facing: Facing) -> Probe {
        Probe::new(self.shape, position + facing.mirror(self.offset), self.mask)
    }

    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        match self.shape {
            Shape::Circle { radius } => ConfigError::check_positive(field, radius),
            Shape::Rect { half_extents } => {
                ConfigError::check_positive(field, half_extents.x)?;
                ConfigError::check_positive(field, half_extents.y)
            }
        }
    }
}

/// Enemy AI tuning.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AiTuning {
    pub initial_health: u32,
    /// Body collider, centered on the actor position.
    pub body: Shape,
    pub view_distance: f32,
    pub speed: f32,
    pub chase_speed: f32,
    /// Velocity smoothing time constant.
    pub move_smooth: f32,
    pub damage: u32,
    pub flee_speed: f32,
    pub flee_chance: f32,
    pub flee_range: f32,
    pub can_stun: bool,
    pub stun_duration: f32,
    /// Fraction of max health at or below which the actor may flee.
    pub scare_factor: f32,
    /// Seconds the attack hitbox stays enabled.
    pub attack_rate: f32,
    pub attack_range: f32,
    pub ground_probe: ProbeSpec,
    pub wall_probe: Option<ProbeSpec>,
    pub attack_hitbox: Option<ProbeSpec>,
}

impl AiTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_finite("view_distance", self.view_distance)?;
        ConfigError::check_finite("speed", self.speed)?;
        ConfigError::check_finite("chase_speed", self.chase_speed)?;
        ConfigError::check_finite("flee_speed", self.flee_speed)?;
        ConfigError::check_duration("move_smooth", self.move_smooth)?;
        ConfigError::check_duration("stun_duration", self.stun_duration)?;
        ConfigError::check_duration("attack_rate", self.attack_rate)?;
        ConfigError::check_probability("flee_chance", self.flee_chance)?;
        ConfigError::check_probability("scare_factor", self.scare_factor)?;
        ConfigError::check_duration("flee_range", self.flee_range)?;
        ConfigError::check_duration("attack_range", self.attack_range)?;
        self.ground_probe.validate("ground_probe")?;
        if let Some(wall) = &self.wall_probe {
            wall.validate("wall_probe")?;
        }
        if let Some(hitbox) = &self.attack_hitbox {
            hitbox.validate("attack_hitbox")?;
        }
        Ok(())
    }
}

impl Default for AiTuning {
    fn default() -> Self {
        Self {
            initial_health: 100,
            body: Shape::rect(Vec2::new(0.4, 0.5)),
            view_distance: 10.0,
            speed: 1.0,
            chase_speed: 5.0,
            move_smooth: 0.2,
            damage: 10,
            flee_speed: 10.0,
            flee_chance: 0.2,
            flee_range: 10.0,
            can_stun: true,
            stun_duration: 0.0,
            scare_factor: 0.5,
            attack_rate: 0.0,
            attack_range: 2.0,
            ground_probe: ProbeSpec::new(Vec2::new(0.0, -0.5), Shape::circle(0.2), Layers::GROUND),
            wall_probe: Some(ProbeSpec::new(
                Vec2::new(0.5, 0.0),
                Shape::circle(0.1),
                Layers::WALL,
            )),
            attack_hitbox: Some(ProbeSpec::new(
                Vec2::new(0.8, 0.0),
                Shape::circle(0.6),
                Layers::PLAYER,
            )),
        }
    }
}

/// Animation clip lengths in seconds, where known.
///
/// Missing or non-positive clips fall back to
/// [`ClipSet::DEFAULT_SECONDS`].
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClipSet {
    pub intro: Option<f32>,
    pub idle: Option<f32>,
    pub attack: Option<f32>,
    pub recover: Option<f32>,
    pub dying: Option<f32>,
}

impl ClipSet {
    pub const DEFAULT_SECONDS: f32 = 1.0;

    /// Longest valid clip among `candidates`, or the default.
    fn longest(name: &'static str, candidates: [Option<f32>; 2]) -> f32 {
        let mut longest: Option<f32> = None;
        for length in candidates.into_iter().flatten() {
            if length.is_finite() && length > 0.0 {
                longest = Some(longest.map_or(length, |current| current.max(length)));
            } else {
                tracing::warn!(clip = name, length, "ignoring invalid clip length");
            }
        }
        longest.unwrap_or_else(|| {
            tracing::warn!(
                clip = name,
                fallback = Self::DEFAULT_SECONDS,
                "no clip length available, using default"
            );
            Self::DEFAULT_SECONDS
        })
    }
}

/// One destructible boss piece.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PieceSpec {
    /// Offset of the piece from the boss body.
    pub offset: Vec2,
    /// Piece hurtbox.
    pub body: Shape,
    pub initial_health: u32,
    pub damage: u32,
    /// Area damaged when the piece's attack hitbox is enabled.
    pub hitbox: Option<Shape>,
}

impl Default for PieceSpec {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            body: Shape::circle(0.5),
            initial_health: 10,
            damage: 10,
            hitbox: Some(Shape::circle(0.5)),
        }
    }
}

/// Boss tuning.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BossTuning {
    pub initial_health: u32,
    pub body: Shape,
    pub roar_duration: f32,
    /// Seconds between the end of the attack and disabling hitboxes.
    pub pause_delay: f32,
    /// Head strike time as a fraction of the attack duration.
    pub head_attack_ratio: f32,
    pub head_damage: u32,
    /// Probability that Idle branches to Roar instead of Attack.
    pub roar_chance: f32,
    /// Layers boss strikes can damage.
    pub damage_to: Layers,
    pub head_hitbox: Option<ProbeSpec>,
    pub body_clips: ClipSet,
    pub piece_clips: ClipSet,
    pub pieces: Vec<PieceSpec>,
}

/// Phase durations derived from a [`BossTuning`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BossTimings {
    pub intro: f32,
    pub idle: f32,
    pub attack: f32,
    pub recover: f32,
    pub roar: f32,
    pub pause: f32,
    pub dying: f32,
    /// Offset into the attack at which the head strikes.
    pub head_delay: f32,
}

impl BossTuning {
    /// Margin added around piece hitboxes when they pulse.
    pub const PIECE_HITBOX_MARGIN: f32 = 0.2;

    /// Phase durations, each long enough to cover both the body clip and the
    /// matching piece clip.
    pub fn timings(&self) -> BossTimings {
        let body = &self.body_clips;
        let piece = &self.piece_clips;
        let attack = ClipSet::longest("attack", [body.attack, piece.attack]);
        BossTimings {
            intro: ClipSet::longest("intro", [body.intro, piece.intro]),
            idle: ClipSet::longest("idle", [body.idle, piece.idle]),
            attack,
            recover: ClipSet::longest("recover", [body.recover, piece.recover]),
            roar: self.roar_duration,
            pause: self.pause_delay,
            dying: ClipSet::longest("dying", [body.dying, piece.dying]),
            head_delay: attack * self.head_attack_ratio,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_duration("roar_duration", self.roar_duration)?;
        ConfigError::check_duration("pause_delay", self.pause_delay)?;
        ConfigError::check_probability("head_attack_ratio", self.head_attack_ratio)?;
        ConfigError::check_probability("roar_chance", self.roar_chance)?;
        if let Some(head) = &self.head_hitbox {
            head.validate("head_hitbox")?;
        }
        Ok(())
    }
}

impl Default for BossTuning {
    fn default() -> Self {
        Self {
            initial_health: 10,
            body: Shape::rect(Vec2::new(1.5, 1.5)),
            roar_duration: 1.0,
            pause_delay: 0.5,
            head_attack_ratio: 0.5,
            head_damage: 10,
            roar_chance: 0.0,
            damage_to: Layers::PLAYER,
            head_hitbox: Some(ProbeSpec::new(
                Vec2::new(-1.5, 0.5),
                Shape::circle(1.0),
                Layers::PLAYER,
            )),
            body_clips: ClipSet::default(),
            piece_clips: ClipSet::default(),
            pieces: Vec::new(),
        }
    }
}

/// Player tuning.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlayerTuning {
    pub starting_health: u32,
    pub body: Shape,
    pub speed: f32,
    /// Speed multiplier while crouching.
    pub crouch_speed: f32,
    pub jump_force: f32,
    pub attack_damage: u32,
    pub attack_radius: f32,
    pub attack_offset: Vec2,
    pub ground_probe: ProbeSpec,
    pub ceiling_probe: ProbeSpec,
    pub dash_distance: f32,
    pub dash_duration: f32,
    /// Velocity smoothing while airborne.
    pub air_strafe: f32,
    /// Velocity smoothing while grounded.
    pub land_strafe: f32,
    pub can_jump: bool,
    pub can_dash: bool,
    pub can_attack: bool,
}

impl PlayerTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_finite("speed", self.speed)?;
        ConfigError::check_probability("crouch_speed", self.crouch_speed)?;
        ConfigError::check_finite("jump_force", self.jump_force)?;
        ConfigError::check_positive("attack_radius", self.attack_radius)?;
        ConfigError::check_duration("dash_distance", self.dash_distance)?;
        ConfigError::check_positive("dash_duration", self.dash_duration)?;
        ConfigError::check_duration("air_strafe", self.air_strafe)?;
        ConfigError::check_duration("land_strafe", self.land_strafe)?;
        self.ground_probe.validate("ground_probe")?;
        self.ceiling_probe.validate("ceiling_probe")
    }
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            starting_health: 100,
            body: Shape::rect(Vec2::new(0.4, 0.5)),
            speed: 5.0,
            crouch_speed: 0.4,
            jump_force: 10.0,
            attack_damage: 10,
            attack_radius: 1.0,
            attack_offset: Vec2::new(0.75, 0.0),
            ground_probe: ProbeSpec::new(Vec2::new(0.0, -0.5), Shape::circle(0.2), Layers::TERRAIN),
            ceiling_probe: ProbeSpec::new(Vec2::new(0.0, 0.5), Shape::circle(0.2), Layers::TERRAIN),
            dash_distance: 3.0,
            dash_duration: 0.2,
            air_strafe: 0.35,
            land_strafe: 0.1,
            can_jump: true,
            can_dash: true,
            can_attack: true,
        }
    }
}

/// Damage-over-time zone tuning.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HazardTuning {
    pub damage: u32,
    /// Seconds between damage pulses.
    pub interval: f32,
}

impl HazardTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_duration("interval", self.interval)
    }
}

impl Default for HazardTuning {
    fn default() -> Self {
        Self {
            damage: 10,
            interval: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        GameConfig::default().validate().unwrap();
        AiTuning::default().validate().unwrap();
        BossTuning::default().validate().unwrap();
        PlayerTuning::default().validate().unwrap();
        HazardTuning::default().validate().unwrap();
    }

    #[test]
    fn boss_timings_cover_the_longest_clip() {
        let tuning = BossTuning {
            body_clips: ClipSet {
                intro: Some(1.5),
                attack: Some(2.0),
                dying: Some(1.0),
                ..ClipSet::default()
            },
            piece_clips: ClipSet {
                intro: Some(2.25),
                attack: Some(1.0),
                dying: Some(2.5),
                ..ClipSet::default()
            },
            ..BossTuning::default()
        };

        let timings = tuning.timings();
        assert_eq!(timings.intro, 2.25);
        assert_eq!(timings.attack, 2.0);
        assert_eq!(timings.head_delay, 1.0);
        assert_eq!(timings.dying, 2.5);
    }

    #[test]
    fn invalid_clips_fall_back_to_default() {
        let tuning = BossTuning {
            body_clips: ClipSet {
                idle: Some(0.0),
                recover: Some(f32::NAN),
                ..ClipSet::default()
            },
            ..BossTuning::default()
        };

        let timings = tuning.timings();
        assert_eq!(timings.idle, ClipSet::DEFAULT_SECONDS);
        assert_eq!(timings.recover, ClipSet::DEFAULT_SECONDS);
    }

    #[test]
    fn probe_offsets_mirror_with_facing() {
        let spec = ProbeSpec::new(Vec2::new(1.0, 0.5), Shape::circle(0.2), Layers::WALL);
        let right = spec.at(Vec2::new(3.0, 0.0), Facing::Right);
        let left = spec.at(Vec2::new(3.0, 0.0), Facing::Left);

        assert_eq!(right.origin, Vec2::new(4.0, 0.5));
        assert_eq!(left.origin, Vec2::new(2.0, 0.5));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let tuning = AiTuning {
            flee_chance: 1.2,
            ..AiTuning::default()
        };
        assert!(matches!(
            tuning.validate(),
            Err(ConfigError::ProbabilityOutOfRange {
                field: "flee_chance",
                ..
            })
        ));

        let config = GameConfig {
            fixed_timestep: 0.0,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
