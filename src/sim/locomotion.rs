//! Locomotion State Graph
//!
//! The five character states (idle, walk, walk-back, run, jump) and the
//! blend rules between them. Transitions branch on a discrete [`Intent`]
//! classified from analog input each tick, so every state's exit logic is
//! a small match instead of threshold soup.
//!
//! Blend rules:
//! - every transition crossfades over [`CROSS_FADE`] seconds;
//! - walk/run/walk-back entries from their paired gait re-phase the new
//!   action's playhead by the clip-duration ratio, keeping foot strikes
//!   lined up through the blend;
//! - jump plays once, holds its final pose, and exits on the animation's
//!   own completion event, never on intent.

use super::animation::{AnimationSet, FinishedSubscription, LoopMode};
use super::fsm::{BoxedState, FiniteStateMachine, State};

/// Crossfade window for every locomotion transition, in seconds.
pub const CROSS_FADE: f32 = 0.25;

/// The closed set of locomotion states. Doubles as the key into the
/// per-character animation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Motion {
    Idle,
    Walk,
    WalkBack,
    Run,
    Jump,
}

impl Motion {
    pub const COUNT: usize = 5;
    pub const ALL: [Motion; Motion::COUNT] = [
        Motion::Idle,
        Motion::Walk,
        Motion::WalkBack,
        Motion::Run,
        Motion::Jump,
    ];

    pub(crate) fn index(self) -> usize {
        match self {
            Motion::Idle => 0,
            Motion::Walk => 1,
            Motion::WalkBack => 2,
            Motion::Run => 3,
            Motion::Jump => 4,
        }
    }

    /// Display name for HUD / logs.
    pub fn label(self) -> &'static str {
        match self {
            Motion::Idle => "idle",
            Motion::Walk => "walk",
            Motion::WalkBack => "walkBack",
            Motion::Run => "run",
            Motion::Jump => "jump",
        }
    }
}

/// Discrete classification of the analog movement input, recomputed every
/// tick. `Jump` is never produced by classification; only the explicit
/// jump edge injects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Idle,
    Walk,
    Run,
    WalkBack,
    Jump,
}

impl Intent {
    /// Classify two-axis input into an intent. The thresholds overlap on
    /// purpose and later branches override earlier ones: walk, then run,
    /// then walk-back. Keep this order; the graph depends on it.
    pub fn classify(lateral: f32, forward: f32, walk_threshold: f32, run_threshold: f32) -> Self {
        let mut intent = Intent::Idle;
        if forward > walk_threshold || lateral.abs() > walk_threshold {
            intent = Intent::Walk;
        }
        if forward > run_threshold {
            intent = Intent::Run;
        }
        if forward < -walk_threshold {
            intent = Intent::WalkBack;
        }
        intent
    }
}

/// The character's state machine with all five states registered and no
/// active state yet; the owner calls `set_state(Motion::Idle, ..)` once
/// the animation set is ready.
pub fn character_fsm() -> FiniteStateMachine<Motion, Intent, AnimationSet> {
    type Boxed = BoxedState<Motion, Intent, AnimationSet>;
    let mut fsm = FiniteStateMachine::new();
    fsm.add_state(Motion::Idle, || Box::new(IdleState) as Boxed);
    fsm.add_state(Motion::Walk, || Box::new(WalkState) as Boxed);
    fsm.add_state(Motion::WalkBack, || Box::new(WalkBackState) as Boxed);
    fsm.add_state(Motion::Run, || Box::new(RunState) as Boxed);
    fsm.add_state(Motion::Jump, || Box::new(JumpState::new()) as Boxed);
    fsm
}

/// Shared entry logic for the cyclic gaits. When arriving from `paired`,
/// the new action's playhead is re-phased by the duration ratio so the
/// stride stays in phase through the crossfade; from anywhere else the
/// playhead restarts.
fn enter_gait(ctx: &mut AnimationSet, motion: Motion, paired: Motion, prev: Option<Motion>) {
    let Some(prev) = prev else {
        ctx.action_mut(motion).play();
        return;
    };

    ctx.action_mut(motion).set_enabled(true);
    if prev == paired {
        let ratio = ctx.action(motion).duration() / ctx.action(prev).duration();
        let time = ctx.action(prev).time() * ratio;
        ctx.action_mut(motion).set_time(time);
    } else {
        let action = ctx.action_mut(motion);
        action.set_time(0.0);
        action.set_time_scale(1.0);
        action.set_weight(1.0);
    }
    ctx.cross_fade(prev, motion, CROSS_FADE);
    ctx.action_mut(motion).play();
}

pub struct IdleState;

impl State for IdleState {
    type Id = Motion;
    type Input = Intent;
    type Ctx = AnimationSet;

    fn id(&self) -> Motion {
        Motion::Idle
    }

    fn enter(&mut self, prev: Option<Motion>, ctx: &mut AnimationSet) {
        let Some(prev) = prev else {
            ctx.action_mut(Motion::Idle).play();
            return;
        };

        let action = ctx.action_mut(Motion::Idle);
        action.set_time(0.0);
        action.set_enabled(true);
        action.set_time_scale(1.0);
        action.set_weight(1.0);
        ctx.cross_fade(prev, Motion::Idle, CROSS_FADE);
        ctx.action_mut(Motion::Idle).play();
    }

    fn update(&mut self, _dt: f32, intent: Intent, _ctx: &mut AnimationSet) -> Option<Motion> {
        match intent {
            Intent::Walk => Some(Motion::Walk),
            Intent::Run => Some(Motion::Run),
            Intent::WalkBack => Some(Motion::WalkBack),
            Intent::Jump => Some(Motion::Jump),
            Intent::Idle => None,
        }
    }
}

pub struct WalkState;

impl State for WalkState {
    type Id = Motion;
    type Input = Intent;
    type Ctx = AnimationSet;

    fn id(&self) -> Motion {
        Motion::Walk
    }

    fn enter(&mut self, prev: Option<Motion>, ctx: &mut AnimationSet) {
        enter_gait(ctx, Motion::Walk, Motion::Run, prev);
    }

    fn update(&mut self, _dt: f32, intent: Intent, _ctx: &mut AnimationSet) -> Option<Motion> {
        match intent {
            Intent::Idle => Some(Motion::Idle),
            Intent::Run => Some(Motion::Run),
            Intent::WalkBack => Some(Motion::WalkBack),
            Intent::Jump => Some(Motion::Jump),
            Intent::Walk => None,
        }
    }
}

pub struct WalkBackState;

impl State for WalkBackState {
    type Id = Motion;
    type Input = Intent;
    type Ctx = AnimationSet;

    fn id(&self) -> Motion {
        Motion::WalkBack
    }

    fn enter(&mut self, prev: Option<Motion>, ctx: &mut AnimationSet) {
        enter_gait(ctx, Motion::WalkBack, Motion::Run, prev);
    }

    fn update(&mut self, _dt: f32, intent: Intent, _ctx: &mut AnimationSet) -> Option<Motion> {
        match intent {
            Intent::Idle => Some(Motion::Idle),
            Intent::Walk => Some(Motion::Walk),
            Intent::Run => Some(Motion::Run),
            Intent::Jump => Some(Motion::Jump),
            Intent::WalkBack => None,
        }
    }
}

pub struct RunState;

impl State for RunState {
    type Id = Motion;
    type Input = Intent;
    type Ctx = AnimationSet;

    fn id(&self) -> Motion {
        Motion::Run
    }

    fn enter(&mut self, prev: Option<Motion>, ctx: &mut AnimationSet) {
        enter_gait(ctx, Motion::Run, Motion::Walk, prev);
    }

    fn update(&mut self, _dt: f32, intent: Intent, _ctx: &mut AnimationSet) -> Option<Motion> {
        match intent {
            Intent::Idle => Some(Motion::Idle),
            Intent::Walk => Some(Motion::Walk),
            Intent::WalkBack => Some(Motion::WalkBack),
            Intent::Jump => Some(Motion::Jump),
            Intent::Run => None,
        }
    }
}

/// Uninterruptible by design: intent only selects where to land, and the
/// animation's own completion event performs the exit.
pub struct JumpState {
    finished: Option<FinishedSubscription>,
    landing_intent: Intent,
}

impl JumpState {
    pub fn new() -> Self {
        Self {
            finished: None,
            landing_intent: Intent::Idle,
        }
    }
}

impl State for JumpState {
    type Id = Motion;
    type Input = Intent;
    type Ctx = AnimationSet;

    fn id(&self) -> Motion {
        Motion::Jump
    }

    fn enter(&mut self, prev: Option<Motion>, ctx: &mut AnimationSet) {
        self.finished = Some(ctx.subscribe_finished(Motion::Jump));

        let action = ctx.action_mut(Motion::Jump);
        action.reset();
        action.set_loop(LoopMode::Once);
        if let Some(prev) = prev {
            ctx.cross_fade(prev, Motion::Jump, CROSS_FADE);
        }
        ctx.action_mut(Motion::Jump).play();
    }

    fn exit(&mut self, _ctx: &mut AnimationSet) {
        // Revoke the completion listener so it cannot fire into whichever
        // state replaces us.
        self.finished = None;
    }

    fn update(&mut self, _dt: f32, intent: Intent, _ctx: &mut AnimationSet) -> Option<Motion> {
        self.landing_intent = intent;
        None
    }

    fn animation_finished(&mut self, _ctx: &mut AnimationSet) -> Option<Motion> {
        let fired = self
            .finished
            .as_mut()
            .is_some_and(|sub| sub.take_fired());
        if !fired {
            return None;
        }
        self.finished = None;

        Some(match self.landing_intent {
            Intent::Walk => Motion::Walk,
            Intent::Run => Motion::Run,
            Intent::WalkBack => Motion::WalkBack,
            Intent::Idle | Intent::Jump => Motion::Idle,
        })
    }
}
