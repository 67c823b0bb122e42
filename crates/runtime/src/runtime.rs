//! High-level runtime orchestrator.
//!
//! The runtime owns every actor, the collision world and the clock, and
//! drives the controllers through their lifecycle. Clients feed it frame
//! deltas and player input, and observe it through the [`EventBus`].

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use game_content::{Scenario, ScriptedInput, TerrainPlacement, TuningCatalog};
use game_core::{
    Actor, ActorKind, AiMachine, AiTuning, BehaviorTag, BodyId, BossMachine, BossTuning, Facing,
    GameConfig, HazardTuning, HealthPickup, HurtZone, Intent, PcgChance, PickupKind,
    PlayerController, PlayerInput, PlayerTuning, QueryBuffer, Sensor, Shape, compute_seed,
    dispatch_strike,
};
use glam::Vec2;
use tokio::sync::broadcast;

use crate::clock::SimClock;
use crate::error::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::registry::{ActorRegistry, Targets};
use crate::scenario;
use crate::world::CollisionWorld;

/// Runtime configuration shared across the orchestrator and its actors.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub game_config: GameConfig,
    pub event_buffer_size: usize,
    /// Seed every actor's random stream is derived from.
    pub seed: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            game_config: GameConfig::default(),
            event_buffer_size: 256,
            seed: 0,
        }
    }
}

/// What happened to one actor over the run, kept after it despawns.
#[derive(Clone, Debug, PartialEq)]
pub struct ActorRecord {
    pub body: BodyId,
    pub kind: ActorKind,
    pub behavior: Option<BehaviorTag>,
    pub behavior_changes: u32,
    pub health: u32,
    pub max_health: u32,
    pub died: bool,
    pub despawned: bool,
}

// Random streams per actor.
const AI_STREAM: u32 = 0;
const BOSS_STREAM: u32 = 1;

/// Rounds of intent resolution per update. Later rounds pick up intents
/// raised while resolving earlier ones (a strike killing its target).
const MAX_INTENT_PASSES: usize = 4;

type BehaviorSink = Rc<RefCell<Vec<(BodyId, BehaviorTag)>>>;

/// Main runtime that drives the arena simulation.
pub struct Runtime {
    config: RuntimeConfig,
    clock: SimClock,
    world: CollisionWorld,
    actors: ActorRegistry,
    hazards: Vec<HurtZone>,
    pickups: Vec<HealthPickup>,
    events: EventBus,
    behaviors: BehaviorSink,
    records: BTreeMap<BodyId, ActorRecord>,
    script: Vec<ScriptedInput>,
    input: Option<PlayerInput>,
    player: Option<BodyId>,
    next_body: u32,
    intents: Vec<Intent>,
    buffer: QueryBuffer,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Empty arena with the given configuration.
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        config.game_config.validate()?;
        Ok(Self {
            clock: SimClock::new(config.game_config.fixed_timestep),
            events: EventBus::with_capacity(config.event_buffer_size),
            config,
            world: CollisionWorld::new(),
            actors: ActorRegistry::new(),
            hazards: Vec::new(),
            pickups: Vec::new(),
            behaviors: Rc::new(RefCell::new(Vec::new())),
            records: BTreeMap::new(),
            script: Vec::new(),
            input: None,
            player: None,
            next_body: 0,
            intents: Vec::new(),
            buffer: QueryBuffer::new(),
        })
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn world(&self) -> &CollisionWorld {
        &self.world
    }

    /// Simulated seconds covered by completed fixed steps.
    pub fn sim_time(&self) -> f64 {
        self.clock.fixed_time()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Subscribe to runtime events on one topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.events.subscribe(topic)
    }

    pub fn actors(&self) -> &ActorRegistry {
        &self.actors
    }

    pub fn actor(&self, body: BodyId) -> Option<&dyn Actor> {
        self.actors.get(body)
    }

    pub fn player(&self) -> Option<&dyn Actor> {
        self.player.and_then(|body| self.actors.get(body))
    }

    pub fn player_body(&self) -> Option<BodyId> {
        self.player
    }

    pub fn hazards(&self) -> &[HurtZone] {
        &self.hazards
    }

    pub fn pickups(&self) -> &[HealthPickup] {
        &self.pickups
    }

    /// Per-actor history, in body order, including despawned actors.
    pub fn records(&self) -> impl Iterator<Item = &ActorRecord> {
        self.records.values()
    }

    pub fn record(&self, body: BodyId) -> Option<&ActorRecord> {
        self.records.get(&body)
    }

    /// Live actors of `kind`.
    pub fn living(&self, kind: ActorKind) -> usize {
        self.actors
            .iter()
            .filter(|actor| actor.kind() == kind && !actor.is_finished())
            .count()
    }

    /// Adds a terrain collider.
    pub fn add_terrain(&mut self, terrain: TerrainPlacement) {
        self.world
            .add_static(terrain.position, terrain.shape, terrain.layers);
    }

    /// Replaces the scripted player input.
    pub fn set_script(&mut self, script: Vec<ScriptedInput>) {
        self.script = script;
    }

    /// Overrides scripted input until cleared with `None`.
    pub fn set_player_input(&mut self, input: Option<PlayerInput>) {
        self.input = input;
    }

    fn allocate_body(&mut self) -> Result<BodyId> {
        let body = BodyId(self.next_body);
        if body.is_static() {
            return Err(RuntimeError::BodyIdsExhausted);
        }
        self.next_body += 1;
        Ok(body)
    }

    pub fn spawn_player(
        &mut self,
        position: Vec2,
        facing: Facing,
        tuning: PlayerTuning,
    ) -> Result<BodyId> {
        if let Some(existing) = self.player {
            return Err(RuntimeError::DuplicatePlayer { existing });
        }
        let body = self.allocate_body()?;
        let player = PlayerController::new(body, position, facing, tuning, &self.config.game_config)?;
        self.spawn(Box::new(player))
    }

    pub fn spawn_enemy(&mut self, position: Vec2, facing: Facing, tuning: AiTuning) -> Result<BodyId> {
        let body = self.allocate_body()?;
        let chance = PcgChance::new(compute_seed(self.config.seed, body.0, AI_STREAM));
        let enemy = AiMachine::new(
            body,
            position,
            facing,
            tuning,
            &self.config.game_config,
            Box::new(chance),
        )?;
        self.spawn(Box::new(enemy))
    }

    pub fn spawn_boss(&mut self, position: Vec2, facing: Facing, tuning: BossTuning) -> Result<BodyId> {
        let body = self.allocate_body()?;
        let pieces = (0..tuning.pieces.len())
            .map(|_| self.allocate_body())
            .collect::<Result<Vec<_>>>()?;
        let chance = PcgChance::new(compute_seed(self.config.seed, body.0, BOSS_STREAM));
        let boss = BossMachine::new(
            body,
            position,
            facing,
            tuning,
            &pieces,
            &self.config.game_config,
            Box::new(chance),
        )?;
        self.spawn(Box::new(boss))
    }

    /// Registers a controller built elsewhere, wires its behavior changes to
    /// the event bus and runs its spawn hook.
    pub fn spawn(&mut self, mut actor: Box<dyn Actor>) -> Result<BodyId> {
        let body = actor.body();
        let kind = actor.kind();
        if body.0 >= self.next_body {
            self.next_body = body.0.saturating_add(1);
        }

        let sink = Rc::clone(&self.behaviors);
        let subscription = actor.subscribe_behavior(Box::new(move |tag: &BehaviorTag| {
            sink.borrow_mut().push((body, *tag));
        }));
        actor.on_spawn()?;

        let health = actor.health();
        self.records.insert(
            body,
            ActorRecord {
                body,
                kind,
                behavior: actor.behavior(),
                behavior_changes: 0,
                health: health.current(),
                max_health: health.max(),
                died: false,
                despawned: false,
            },
        );
        self.actors.insert(actor, subscription);
        if kind == ActorKind::Player && self.player.is_none() {
            self.player = Some(body);
        }
        self.events.publish(Event::Spawned { body, kind });
        tracing::info!(%body, %kind, "actor spawned");

        self.resolve_intents()?;
        self.flush_behaviors();
        Ok(body)
    }

    pub fn add_hurt_zone(&mut self, position: Vec2, shape: Shape, tuning: HazardTuning) -> Result<BodyId> {
        let id = self.allocate_body()?;
        self.hazards.push(HurtZone::new(id, position, shape, tuning)?);
        tracing::info!(zone = %id, "hurt zone placed");
        Ok(id)
    }

    pub fn add_pickup(&mut self, position: Vec2, shape: Shape, kind: PickupKind) -> Result<BodyId> {
        let id = self.allocate_body()?;
        self.pickups.push(HealthPickup::new(id, position, shape, kind));
        tracing::info!(pickup = %id, %kind, "pickup placed");
        Ok(id)
    }

    /// Advance the simulation by one frame.
    ///
    /// Runs every fixed step the frame accumulated, then one variable tick.
    /// Returns the number of fixed steps taken.
    pub fn step(&mut self, frame_dt: f32) -> Result<u32> {
        self.clock.advance(f64::from(frame_dt));

        let mut steps = 0;
        while self.clock.should_fixed_update() {
            let time = self.clock.fixed_time() as f32;
            self.clock.consume_fixed_step();
            self.fixed_step(time)?;
            steps += 1;
        }

        let dt = self.clock.delta_time as f32;
        for actor in self.actors.iter_mut() {
            actor.on_tick(dt)?;
        }
        self.resolve_intents()?;
        self.flush_behaviors();
        self.despawn_finished();
        self.refresh_records();
        Ok(steps)
    }

    /// Run fixed-size frames until `seconds` of simulated time have passed.
    pub fn run_for(&mut self, seconds: f32, frame_dt: f32) -> Result<u32> {
        let frame_dt = frame_dt.max(1e-4);
        let frames = (seconds / frame_dt).round().max(0.0) as u32;
        for _ in 0..frames {
            self.step(frame_dt)?;
        }
        Ok(frames)
    }

    fn fixed_step(&mut self, time: f32) -> Result<()> {
        let dt = self.config.game_config.fixed_timestep;
        let gravity = self.config.game_config.gravity;

        let target = self.player().map(|player| player.kinematics().position);
        let input = self
            .input
            .or_else(|| scenario::input_at(&self.script, time, dt))
            .unwrap_or_default();
        for actor in self.actors.iter_mut() {
            if actor.kind() == ActorKind::Player {
                actor.set_input(input);
            } else {
                actor.set_target(target);
            }
        }

        self.sync_world();
        for actor in self.actors.iter_mut() {
            actor.on_fixed_tick(&self.world, dt)?;
        }

        let mut colliders = Vec::new();
        for actor in self.actors.iter_mut() {
            if !actor.is_mobile() || actor.is_finished() {
                continue;
            }
            colliders.clear();
            actor.colliders(&mut colliders);
            let body = actor.body();
            let Some(shape) = colliders.iter().find(|c| c.body == body).map(|c| c.shape) else {
                continue;
            };
            self.world
                .integrate(actor.kinematics_mut(), shape, gravity, dt);
        }
        self.sync_world();

        self.resolve_intents()?;
        self.update_hazards(dt)?;
        self.update_pickups()?;
        self.flush_behaviors();
        Ok(())
    }

    /// Rebuilds the world's actor snapshot from current positions.
    fn sync_world(&mut self) {
        let dynamics = self.world.dynamics_mut();
        dynamics.clear();
        for actor in self.actors.iter().filter(|actor| !actor.is_finished()) {
            actor.colliders(dynamics);
        }
    }

    /// Applies every intent the actors raised: strikes go through damage
    /// dispatch, the rest become events.
    fn resolve_intents(&mut self) -> Result<()> {
        let mut intents = std::mem::take(&mut self.intents);
        for _ in 0..MAX_INTENT_PASSES {
            let mut raised = Vec::new();
            for actor in self.actors.iter_mut() {
                let before = intents.len();
                actor.drain_intents(&mut intents);
                raised.extend(std::iter::repeat_n(actor.body(), intents.len() - before));
            }
            if intents.is_empty() {
                break;
            }

            for (intent, body) in intents.drain(..).zip(raised) {
                match intent {
                    Intent::Strike(strike) => {
                        let mut targets = Targets {
                            actors: &mut self.actors,
                            events: &self.events,
                            source: strike.source,
                        };
                        dispatch_strike(&self.world, &mut targets, &strike, &mut self.buffer)?;
                    }
                    Intent::Hitbox { slot, enabled } => {
                        self.events.publish(Event::HitboxToggled {
                            body,
                            slot,
                            enabled,
                        });
                    }
                    Intent::Cue(cue) => {
                        tracing::trace!(%body, cue = cue.0, "cue");
                        self.events.publish(Event::Cue { body, name: cue.0 });
                    }
                    Intent::Died => {
                        tracing::info!(%body, "actor died");
                        if let Some(record) = self.records.get_mut(&body) {
                            record.died = true;
                        }
                        self.events.publish(Event::Died { body });
                    }
                }
            }
        }
        intents.clear();
        self.intents = intents;
        Ok(())
    }

    fn update_hazards(&mut self, dt: f32) -> Result<()> {
        for zone in &mut self.hazards {
            zone.refresh(&self.world, &mut self.buffer);
            let mut targets = Targets {
                actors: &mut self.actors,
                events: &self.events,
                source: zone.id(),
            };
            zone.tick(dt, &mut targets)?;
        }
        self.resolve_intents()
    }

    fn update_pickups(&mut self) -> Result<()> {
        for pickup in self.pickups.iter_mut().filter(|pickup| pickup.is_active()) {
            self.world.query_overlap(&pickup.probe(), &mut self.buffer);
            for &body in &self.buffer {
                let Some(actor) = self.actors.owner_mut(body) else {
                    continue;
                };
                if actor.is_finished() {
                    continue;
                }
                let target = actor.body();
                if let Some(report) = pickup.try_consume(actor)? {
                    self.events.publish(Event::Healed {
                        target,
                        amount: report.delta(),
                        current: report.current,
                    });
                    self.events.publish(Event::PickupUsed {
                        pickup: pickup.id(),
                        kind: pickup.kind(),
                        target,
                    });
                    break;
                }
            }
        }
        Ok(())
    }

    /// Forwards collected behavior changes to the bus and the records.
    fn flush_behaviors(&mut self) {
        let changes: Vec<_> = self.behaviors.borrow_mut().drain(..).collect();
        for (body, behavior) in changes {
            tracing::debug!(%body, %behavior, "behavior changed");
            if let Some(record) = self.records.get_mut(&body) {
                record.behavior = Some(behavior);
                record.behavior_changes += 1;
            }
            self.events.publish(Event::BehaviorChanged { body, behavior });
        }
    }

    fn despawn_finished(&mut self) {
        for (mut actor, subscription) in self.actors.take_finished() {
            let body = actor.body();
            actor.unsubscribe_behavior(subscription);
            actor.on_destroy();

            if let Some(record) = self.records.get_mut(&body) {
                let health = actor.health();
                record.health = health.current();
                record.max_health = health.max();
                record.despawned = true;
            }
            if self.player == Some(body) {
                self.player = None;
            }
            self.events.publish(Event::Despawned { body });
            tracing::info!(%body, "actor despawned");
        }
    }

    fn refresh_records(&mut self) {
        for actor in self.actors.iter() {
            if let Some(record) = self.records.get_mut(&actor.body()) {
                let health = actor.health();
                record.health = health.current();
                record.max_health = health.max();
            }
        }
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    catalog: Option<TuningCatalog>,
    scenario: Option<Scenario>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            catalog: None,
            scenario: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the tunings scenario placements are resolved against.
    ///
    /// Defaults to the stock tunings.
    pub fn catalog(mut self, catalog: TuningCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Provide the scenario to spawn. Its seed replaces the configured one.
    pub fn scenario(mut self, scenario: Scenario) -> Self {
        self.scenario = Some(scenario);
        self
    }

    pub fn build(self) -> Result<Runtime> {
        let mut config = self.config;
        if let Some(scenario) = &self.scenario {
            config.seed = scenario.seed;
        }
        let mut runtime = Runtime::new(config)?;

        if let Some(scenario) = &self.scenario {
            let catalog = self.catalog.unwrap_or_else(TuningCatalog::with_defaults);
            catalog.validate()?;
            scenario::populate(&mut runtime, scenario, &catalog)?;
        }
        Ok(runtime)
    }
}
