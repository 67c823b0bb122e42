//! Activation protocol and tick scheduling.
//!
//! The [`StateMachine`] owns the current [`State`] and the bookkeeping of its
//! entry phase. Activation always runs in the same order:
//!
//! 1. the outgoing state's [`exit`](State::exit) hook
//! 2. the swap (the outgoing state is dropped together with any suspended entry phase)
//! 3. [`Context::state_changed`] with the incoming tag
//! 4. the first slice of the incoming entry phase
//!
//! If that slice requests another state the loop starts over, bounded by
//! `max_chain` so a pair of states bouncing between each other cannot hang
//! the host.

use crate::{Context, FsmError, State, Suspend, Transition};

/// Default bound on activations chained from a single request.
pub const DEFAULT_MAX_CHAIN: usize = 32;

/// Tolerance applied when comparing accumulated simulated time to a wake-up.
const WAKE_EPSILON: f64 = 1e-6;

/// Pending resumption of the current entry phase.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Wake {
    NextTick,
    At(f64),
}

/// Keeps at most one [`State`] current and drives its hooks.
pub struct StateMachine<C: Context> {
    current: Option<Box<dyn State<C>>>,
    wake: Option<Wake>,
    now: f64,
    entered_at: f64,
    activations: u64,
    max_chain: usize,
}

impl<C: Context> StateMachine<C> {
    /// Creates an empty machine. Nothing runs until the first transition.
    pub fn new() -> Self {
        Self::with_max_chain(DEFAULT_MAX_CHAIN)
    }

    /// Creates an empty machine with a custom chained-activation bound.
    pub fn with_max_chain(max_chain: usize) -> Self {
        Self {
            current: None,
            wake: None,
            now: 0.0,
            entered_at: 0.0,
            activations: 0,
            max_chain: max_chain.max(1),
        }
    }

    /// Makes `state` current, tearing down the previous one first.
    ///
    /// Any entry phase the previous state had suspended is cancelled.
    pub fn transition_to(
        &mut self,
        ctx: &mut C,
        state: impl State<C> + 'static,
    ) -> Result<(), FsmError> {
        self.activate(ctx, Box::new(state))
    }

    /// Advances simulated time by `dt` seconds and runs one simulation tick.
    ///
    /// The current state's [`execute`](State::execute) runs first, then its
    /// entry phase resumes if its suspension has elapsed.
    pub fn tick(&mut self, ctx: &mut C, dt: f32) -> Result<(), FsmError> {
        self.now += f64::from(dt.max(0.0));

        let Some(state) = self.current.as_mut() else {
            return Ok(());
        };

        let mut transition = Transition::new();
        state.execute(ctx, &mut transition);
        if let Some(next) = transition.take() {
            return self.activate(ctx, next);
        }

        if self.entry_due()
            && let Some(next) = self.step_entry(ctx)
        {
            return self.activate(ctx, next);
        }

        Ok(())
    }

    /// Runs one physics tick on the current state.
    pub fn fixed_tick(&mut self, ctx: &mut C) -> Result<(), FsmError> {
        let Some(state) = self.current.as_mut() else {
            return Ok(());
        };

        let mut transition = Transition::new();
        state.fixed_execute(ctx, &mut transition);
        match transition.take() {
            Some(next) => self.activate(ctx, next),
            None => Ok(()),
        }
    }

    /// Exits and drops the current state without replacing it.
    pub fn stop(&mut self, ctx: &mut C) {
        if let Some(mut state) = self.current.take() {
            tracing::debug!("stopping state machine in {:?}", state.tag());
            state.exit(ctx);
        }
        self.wake = None;
    }

    /// Tag of the current state.
    pub fn current_tag(&self) -> Option<C::Tag> {
        self.current.as_ref().map(|state| state.tag())
    }

    /// Returns `true` if the current state's entry phase is suspended.
    pub fn is_entering(&self) -> bool {
        self.wake.is_some()
    }

    /// Number of activations so far. Increases by one per state made current.
    pub fn activations(&self) -> u64 {
        self.activations
    }

    /// Simulated seconds accumulated by [`tick`](Self::tick).
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Simulated seconds since the current state was activated.
    pub fn time_in_state(&self) -> f64 {
        self.now - self.entered_at
    }

    fn entry_due(&self) -> bool {
        match self.wake {
            None => false,
            Some(Wake::NextTick) => true,
            Some(Wake::At(at)) => self.now + WAKE_EPSILON >= at,
        }
    }

    fn activate(&mut self, ctx: &mut C, mut next: Box<dyn State<C>>) -> Result<(), FsmError> {
        let mut depth = 0;
        loop {
            depth += 1;
            if depth > self.max_chain {
                return Err(FsmError::TransitionChainTooDeep {
                    last: format!("{:?}", next.tag()),
                    depth,
                });
            }

            if let Some(mut outgoing) = self.current.take() {
                if self.wake.is_some() {
                    tracing::debug!("cancelling suspended entry of {:?}", outgoing.tag());
                }
                outgoing.exit(ctx);
            }
            self.wake = None;

            let tag = next.tag();
            tracing::debug!("activating {:?}", tag);
            self.current = Some(next);
            self.activations += 1;
            self.entered_at = self.now;
            ctx.state_changed(tag);

            match self.step_entry(ctx) {
                Some(requested) => next = requested,
                None => return Ok(()),
            }
        }
    }

    /// Runs one slice of the current entry phase and records where it parked.
    ///
    /// Returns the state the slice requested, if any. A request supersedes
    /// whatever suspension the slice returned.
    fn step_entry(&mut self, ctx: &mut C) -> Option<Box<dyn State<C>>> {
        self.wake = None;
        let state = self.current.as_mut()?;

        let mut transition = Transition::new();
        let suspend = state.enter(ctx, &mut transition);
        if let Some(next) = transition.take() {
            return Some(next);
        }

        self.wake = match suspend {
            Suspend::Done => None,
            Suspend::NextTick => Some(Wake::NextTick),
            Suspend::Seconds(seconds) => Some(Wake::At(self.now + f64::from(seconds.max(0.0)))),
        };
        None
    }
}

impl<C: Context> Default for StateMachine<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        log: Vec<String>,
        tags: Vec<&'static str>,
    }

    impl Context for Recorder {
        type Tag = &'static str;

        fn state_changed(&mut self, tag: &'static str) {
            self.tags.push(tag);
        }
    }

    /// Logs every hook it receives.
    struct Plain(&'static str);

    impl State<Recorder> for Plain {
        fn tag(&self) -> &'static str {
            self.0
        }

        fn enter(&mut self, ctx: &mut Recorder, _next: &mut Transition<Recorder>) -> Suspend {
            ctx.log.push(format!("{}.enter", self.0));
            Suspend::Done
        }

        fn execute(&mut self, ctx: &mut Recorder, _next: &mut Transition<Recorder>) {
            ctx.log.push(format!("{}.execute", self.0));
        }

        fn fixed_execute(&mut self, ctx: &mut Recorder, _next: &mut Transition<Recorder>) {
            ctx.log.push(format!("{}.fixed", self.0));
        }

        fn exit(&mut self, ctx: &mut Recorder) {
            ctx.log.push(format!("{}.exit", self.0));
        }
    }

    /// Waits, then logs and moves on to `Plain("after")`.
    struct Sleeper {
        seconds: f32,
        resumed: bool,
    }

    impl State<Recorder> for Sleeper {
        fn tag(&self) -> &'static str {
            "sleeper"
        }

        fn enter(&mut self, ctx: &mut Recorder, next: &mut Transition<Recorder>) -> Suspend {
            if !self.resumed {
                self.resumed = true;
                ctx.log.push("sleeper.sleep".into());
                return Suspend::Seconds(self.seconds);
            }
            ctx.log.push("sleeper.woke".into());
            next.to(Plain("after"));
            Suspend::Done
        }

        fn execute(&mut self, ctx: &mut Recorder, _next: &mut Transition<Recorder>) {
            ctx.log.push("sleeper.execute".into());
        }

        fn fixed_execute(&mut self, ctx: &mut Recorder, _next: &mut Transition<Recorder>) {
            ctx.log.push("sleeper.fixed".into());
        }
    }

    /// Entry phase that immediately forwards to another state.
    struct Forward(&'static str);

    impl State<Recorder> for Forward {
        fn tag(&self) -> &'static str {
            "forward"
        }

        fn enter(&mut self, _ctx: &mut Recorder, next: &mut Transition<Recorder>) -> Suspend {
            next.to(Plain("first"));
            next.to(Plain(self.0));
            Suspend::Seconds(10.0)
        }
    }

    /// Two states that keep requesting each other.
    struct PingPong;

    impl State<Recorder> for PingPong {
        fn tag(&self) -> &'static str {
            "ping"
        }

        fn enter(&mut self, _ctx: &mut Recorder, next: &mut Transition<Recorder>) -> Suspend {
            next.to(PingPong);
            Suspend::Done
        }
    }

    fn machine_in(state: impl State<Recorder> + 'static) -> (StateMachine<Recorder>, Recorder) {
        let mut machine = StateMachine::new();
        let mut ctx = Recorder::default();
        machine.transition_to(&mut ctx, state).unwrap();
        (machine, ctx)
    }

    #[test]
    fn empty_machine_ignores_ticks() {
        let mut machine = StateMachine::<Recorder>::new();
        let mut ctx = Recorder::default();
        machine.tick(&mut ctx, 0.5).unwrap();
        machine.fixed_tick(&mut ctx).unwrap();
        assert!(ctx.log.is_empty());
        assert_eq!(machine.current_tag(), None);
        assert_eq!(machine.now(), 0.5);
    }

    #[test]
    fn exit_runs_before_next_entry() {
        let (mut machine, mut ctx) = machine_in(Plain("a"));
        machine.transition_to(&mut ctx, Plain("b")).unwrap();

        assert_eq!(ctx.log, vec!["a.enter", "a.exit", "b.enter"]);
        assert_eq!(ctx.tags, vec!["a", "b"]);
        assert_eq!(machine.current_tag(), Some("b"));
        assert_eq!(machine.activations(), 2);
    }

    #[test]
    fn updates_only_reach_current_state() {
        let (mut machine, mut ctx) = machine_in(Plain("a"));
        machine.tick(&mut ctx, 0.1).unwrap();
        machine.fixed_tick(&mut ctx).unwrap();
        machine.transition_to(&mut ctx, Plain("b")).unwrap();
        ctx.log.clear();

        machine.tick(&mut ctx, 0.1).unwrap();
        machine.fixed_tick(&mut ctx).unwrap();
        assert_eq!(ctx.log, vec!["b.execute", "b.fixed"]);
    }

    #[test]
    fn suspended_entry_keeps_updates_running() {
        let (mut machine, mut ctx) = machine_in(Sleeper {
            seconds: 1.0,
            resumed: false,
        });
        assert!(machine.is_entering());

        for _ in 0..3 {
            machine.tick(&mut ctx, 0.25).unwrap();
            machine.fixed_tick(&mut ctx).unwrap();
        }
        assert_eq!(machine.current_tag(), Some("sleeper"));
        assert!(ctx.log.contains(&"sleeper.execute".to_string()));
        assert!(ctx.log.contains(&"sleeper.fixed".to_string()));

        machine.tick(&mut ctx, 0.25).unwrap();
        assert_eq!(machine.current_tag(), Some("after"));
        assert!(!machine.is_entering());
        assert_eq!(ctx.log.last().map(String::as_str), Some("after.enter"));
    }

    #[test]
    fn superseded_entry_never_resumes() {
        let (mut machine, mut ctx) = machine_in(Sleeper {
            seconds: 0.5,
            resumed: false,
        });
        machine.tick(&mut ctx, 0.25).unwrap();
        machine.transition_to(&mut ctx, Plain("b")).unwrap();
        ctx.log.clear();

        for _ in 0..8 {
            machine.tick(&mut ctx, 0.25).unwrap();
            machine.fixed_tick(&mut ctx).unwrap();
        }

        assert!(ctx.log.iter().all(|entry| !entry.starts_with("sleeper")));
        assert!(!ctx.log.contains(&"after.enter".to_string()));
        assert_eq!(machine.current_tag(), Some("b"));
    }

    #[test]
    fn latest_request_wins_and_discards_suspension() {
        let (machine, ctx) = machine_in(Forward("second"));

        assert_eq!(machine.current_tag(), Some("second"));
        assert_eq!(ctx.tags, vec!["forward", "second"]);
        assert!(!machine.is_entering());
    }

    #[test]
    fn zero_second_wait_resumes_on_next_tick() {
        let (mut machine, mut ctx) = machine_in(Sleeper {
            seconds: 0.0,
            resumed: false,
        });
        assert_eq!(machine.current_tag(), Some("sleeper"));

        machine.tick(&mut ctx, 0.0).unwrap();
        assert_eq!(machine.current_tag(), Some("after"));
    }

    #[test]
    fn runaway_chain_is_reported() {
        let mut machine = StateMachine::with_max_chain(4);
        let mut ctx = Recorder::default();

        let err = machine.transition_to(&mut ctx, PingPong).unwrap_err();
        assert_eq!(
            err,
            FsmError::TransitionChainTooDeep {
                last: "\"ping\"".into(),
                depth: 5,
            }
        );
    }

    #[test]
    fn stop_exits_current_state() {
        let (mut machine, mut ctx) = machine_in(Plain("a"));
        machine.stop(&mut ctx);

        assert_eq!(machine.current_tag(), None);
        assert_eq!(ctx.log.last().map(String::as_str), Some("a.exit"));
    }

    #[test]
    fn time_in_state_resets_on_activation() {
        let (mut machine, mut ctx) = machine_in(Plain("a"));
        machine.tick(&mut ctx, 0.5).unwrap();
        machine.tick(&mut ctx, 0.25).unwrap();
        assert_eq!(machine.time_in_state(), 0.75);

        machine.transition_to(&mut ctx, Plain("b")).unwrap();
        assert_eq!(machine.time_in_state(), 0.0);
    }
}
