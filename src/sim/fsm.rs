//! Finite State Machine
//!
//! A generic container holding at most one active state. States are
//! registered as factories keyed by a small id type (an enum for closed
//! graphs like locomotion) and constructed fresh on every transition into
//! them, so a state's fields never leak across visits.
//!
//! Shared context is passed explicitly into every call as `Ctx` instead of
//! living behind a back-pointer; states can only reach what the owning
//! component chooses to hand them.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// One state of a machine. `Id` names the state, `Input` is the per-tick
/// payload (locomotion intent), `Ctx` the shared context handed through.
pub trait State {
    type Id: Copy + Eq + Hash + Debug;
    type Input: Copy;
    type Ctx;

    fn id(&self) -> Self::Id;

    /// Whether `set_state` with this state's own id re-enters it. Default
    /// is no: a redundant same-state transition is a no-op, which keeps
    /// animation playheads from restarting.
    fn allows_reentry(&self) -> bool {
        false
    }

    fn enter(&mut self, prev: Option<Self::Id>, ctx: &mut Self::Ctx);

    fn exit(&mut self, _ctx: &mut Self::Ctx) {}

    /// Per-tick update. Returning `Some(id)` requests a transition, which
    /// the machine applies after this call returns, so the current tick
    /// always completes against the instance it started with.
    fn update(&mut self, dt: f32, input: Self::Input, ctx: &mut Self::Ctx) -> Option<Self::Id>;

    /// Completion event from the animation layer; only states that armed a
    /// subscription have anything to do here.
    fn animation_finished(&mut self, _ctx: &mut Self::Ctx) -> Option<Self::Id> {
        None
    }
}

pub type BoxedState<I, P, C> = Box<dyn State<Id = I, Input = P, Ctx = C>>;

type StateFactory<I, P, C> = Box<dyn Fn() -> BoxedState<I, P, C>>;

pub struct FiniteStateMachine<I, P, C>
where
    I: Copy + Eq + Hash + Debug,
    P: Copy,
{
    factories: HashMap<I, StateFactory<I, P, C>>,
    current: Option<BoxedState<I, P, C>>,
}

impl<I, P, C> FiniteStateMachine<I, P, C>
where
    I: Copy + Eq + Hash + Debug,
    P: Copy,
{
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
            current: None,
        }
    }

    /// Register a constructor for `id`. Re-registering overwrites: last
    /// write wins.
    pub fn add_state(&mut self, id: I, factory: impl Fn() -> BoxedState<I, P, C> + 'static) {
        self.factories.insert(id, Box::new(factory));
    }

    /// Id of the active state, `None` before the first `set_state`.
    pub fn current(&self) -> Option<I> {
        self.current.as_ref().map(|state| state.id())
    }

    /// Transition to `id`. Unregistered ids are a silent no-op (content
    /// may still be loading), as is re-entering the current state unless
    /// it opts in. Exit of the old state fully completes before enter of
    /// the new one begins.
    pub fn set_state(&mut self, id: I, ctx: &mut C) {
        let Some(factory) = self.factories.get(&id) else {
            log::debug!("set_state: no state registered for {id:?}");
            return;
        };

        let prev_id = self.current();
        if let Some(current) = &self.current {
            if current.id() == id && !current.allows_reentry() {
                return;
            }
        }

        let mut next = factory();
        if let Some(mut old) = self.current.take() {
            old.exit(ctx);
        }
        next.enter(prev_id, ctx);
        self.current = Some(next);
    }

    /// Forward a tick to the active state and apply any transition it
    /// requested. No-op while no state is active.
    pub fn update(&mut self, dt: f32, input: P, ctx: &mut C) {
        let Some(current) = &mut self.current else {
            return;
        };
        if let Some(next) = current.update(dt, input, ctx) {
            self.set_state(next, ctx);
        }
    }

    /// Forward an animation-completion event to the active state and apply
    /// any transition it requested.
    pub fn animation_finished(&mut self, ctx: &mut C) {
        let Some(current) = &mut self.current else {
            return;
        };
        if let Some(next) = current.animation_finished(ctx) {
            self.set_state(next, ctx);
        }
    }
}

impl<I, P, C> Default for FiniteStateMachine<I, P, C>
where
    I: Copy + Eq + Hash + Debug,
    P: Copy,
{
    fn default() -> Self {
        Self::new()
    }
}
