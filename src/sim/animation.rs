//! Animation Playback
//!
//! A deliberately small slice of a skeletal animation system: per-motion
//! playable actions sharing one clock, weight crossfades between them, and
//! loop-once completion events. What a clip actually deforms is the asset
//! layer's business; the simulation only needs playhead time, blend
//! weights, and the "finished" signal that drives the jump state's exit.
//!
//! The action table doubles as the shared context locomotion states
//! receive on every FSM call: it is the only piece of controller state the
//! states are allowed to touch.

use std::cell::Cell;
use std::rc::Rc;

use super::locomotion::Motion;

/// How an action behaves when its playhead reaches the clip end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    /// Wrap around and keep playing (locomotion cycles).
    Repeat,
    /// Play once, clamp on the final pose, and fire a completion event.
    Once,
}

/// An in-flight weight ramp scheduled by a crossfade.
#[derive(Debug, Clone, Copy)]
struct Fade {
    start: f32,
    target: f32,
    duration: f32,
    elapsed: f32,
}

/// Shared flags behind a [`FinishedSubscription`]. `armed` is cleared on
/// revocation so a completion can never be delivered to a dead listener.
struct Probe {
    armed: Rc<Cell<bool>>,
    fired: Rc<Cell<bool>>,
}

/// One-shot handle to an action's completion event.
///
/// Dropping the subscription revokes it; a completion that happens
/// afterwards is simply lost, which is exactly what a state that already
/// exited wants.
pub struct FinishedSubscription {
    armed: Rc<Cell<bool>>,
    fired: Rc<Cell<bool>>,
}

impl FinishedSubscription {
    /// Consume the pending notification, if any. Returns `true` at most
    /// once per completion.
    pub fn take_fired(&mut self) -> bool {
        self.fired.replace(false)
    }
}

impl Drop for FinishedSubscription {
    fn drop(&mut self) {
        self.armed.set(false);
    }
}

/// A playable instance of one clip: playhead, blend weight, loop mode.
pub struct Action {
    duration: f32,
    time: f32,
    time_scale: f32,
    weight: f32,
    enabled: bool,
    playing: bool,
    loop_mode: LoopMode,
    completed: bool,
    fade: Option<Fade>,
    probe: Option<Probe>,
}

impl Action {
    fn new(duration: f32) -> Self {
        assert!(
            duration > 0.0 && duration.is_finite(),
            "animation clip duration must be positive, got {duration}"
        );
        Self {
            duration,
            time: 0.0,
            time_scale: 1.0,
            weight: 1.0,
            enabled: true,
            playing: false,
            loop_mode: LoopMode::Repeat,
            completed: false,
            fade: None,
            probe: None,
        }
    }

    /// Clip length in seconds.
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Current playhead in seconds.
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn set_time(&mut self, time: f32) {
        self.time = time;
    }

    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale;
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn set_weight(&mut self, weight: f32) {
        self.weight = weight;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_loop(&mut self, mode: LoopMode) {
        self.loop_mode = mode;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn play(&mut self) {
        self.playing = true;
        self.enabled = true;
    }

    pub fn stop(&mut self) {
        self.playing = false;
        self.fade = None;
    }

    /// Rewind and clear the completion latch; keeps the current loop mode.
    pub fn reset(&mut self) {
        self.time = 0.0;
        self.completed = false;
        self.enabled = true;
    }

    /// Ramp weight 0 → 1 over `duration`.
    fn fade_in(&mut self, duration: f32) {
        self.weight = 0.0;
        self.fade = Some(Fade {
            start: 0.0,
            target: 1.0,
            duration,
            elapsed: 0.0,
        });
    }

    /// Ramp weight from its current value to 0; the action is stopped once
    /// the ramp completes.
    fn fade_out(&mut self, duration: f32) {
        self.fade = Some(Fade {
            start: self.weight,
            target: 0.0,
            duration,
            elapsed: 0.0,
        });
    }

    /// Advance playhead and fades. Returns `true` when a loop-once action
    /// completed on this call.
    fn advance(&mut self, dt: f32) -> bool {
        if let Some(fade) = &mut self.fade {
            fade.elapsed += dt;
            let t = (fade.elapsed / fade.duration).min(1.0);
            self.weight = fade.start + (fade.target - fade.start) * t;
            if t >= 1.0 {
                let faded_out = fade.target <= 0.0;
                self.fade = None;
                if faded_out {
                    self.playing = false;
                    self.enabled = false;
                }
            }
        }

        if !(self.playing && self.enabled) {
            return false;
        }

        self.time += dt * self.time_scale;

        match self.loop_mode {
            LoopMode::Repeat => {
                if self.time >= self.duration {
                    self.time %= self.duration;
                }
                false
            }
            LoopMode::Once => {
                if self.time < self.duration {
                    return false;
                }
                // Hold the final pose.
                self.time = self.duration;
                if self.completed {
                    return false;
                }
                self.completed = true;
                if let Some(probe) = &self.probe {
                    if probe.armed.get() {
                        probe.armed.set(false);
                        probe.fired.set(true);
                    }
                }
                true
            }
        }
    }
}

/// The full per-character action table, one action per locomotion motion,
/// advanced by a single shared clock.
pub struct AnimationSet {
    actions: [Action; Motion::COUNT],
}

impl AnimationSet {
    /// Build the table from per-motion clip durations.
    pub fn new(duration_of: impl Fn(Motion) -> f32) -> Self {
        Self {
            actions: Motion::ALL.map(|motion| Action::new(duration_of(motion))),
        }
    }

    pub fn action(&self, motion: Motion) -> &Action {
        &self.actions[motion.index()]
    }

    pub fn action_mut(&mut self, motion: Motion) -> &mut Action {
        &mut self.actions[motion.index()]
    }

    /// Schedule a crossfade: `from` ramps to weight 0 and stops, `to`
    /// ramps 0 → 1 over the same window. The caller still decides when
    /// `to` starts playing.
    pub fn cross_fade(&mut self, from: Motion, to: Motion, duration: f32) {
        if from == to {
            return;
        }
        self.action_mut(from).fade_out(duration);
        self.action_mut(to).fade_in(duration);
    }

    /// Arm a one-shot completion listener on a motion's action. Replaces
    /// any previous listener on that action.
    pub fn subscribe_finished(&mut self, motion: Motion) -> FinishedSubscription {
        let armed = Rc::new(Cell::new(true));
        let fired = Rc::new(Cell::new(false));
        self.actions[motion.index()].probe = Some(Probe {
            armed: Rc::clone(&armed),
            fired: Rc::clone(&fired),
        });
        FinishedSubscription { armed, fired }
    }

    /// Advance every playing action by `dt`. Returns `true` when any
    /// loop-once action completed this tick, so the caller can forward the
    /// event into the state machine in the same tick.
    pub fn advance(&mut self, dt: f32) -> bool {
        let mut any_finished = false;
        for action in &mut self.actions {
            any_finished |= action.advance(dt);
        }
        any_finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_set(duration: f32) -> AnimationSet {
        AnimationSet::new(|_| duration)
    }

    #[test]
    fn repeat_action_wraps() {
        let mut set = uniform_set(1.0);
        set.action_mut(Motion::Walk).play();

        set.advance(0.75);
        set.advance(0.75);
        let time = set.action(Motion::Walk).time();
        assert!((time - 0.5).abs() < 1e-6, "expected wrap to 0.5, got {time}");
    }

    #[test]
    fn once_action_clamps_and_fires_exactly_once() {
        let mut set = uniform_set(1.0);
        let action = set.action_mut(Motion::Jump);
        action.set_loop(LoopMode::Once);
        action.play();

        assert!(!set.advance(0.6));
        assert!(set.advance(0.6), "crossing the end must report completion");
        assert!(!set.advance(0.6), "completion is latched");
        assert_eq!(set.action(Motion::Jump).time(), 1.0);
    }

    #[test]
    fn cross_fade_ramps_weights() {
        let mut set = uniform_set(1.0);
        set.action_mut(Motion::Idle).play();
        set.action_mut(Motion::Walk).play();
        set.cross_fade(Motion::Idle, Motion::Walk, 0.25);

        set.advance(0.125);
        assert!((set.action(Motion::Idle).weight() - 0.5).abs() < 1e-5);
        assert!((set.action(Motion::Walk).weight() - 0.5).abs() < 1e-5);

        set.advance(0.125);
        assert_eq!(set.action(Motion::Walk).weight(), 1.0);
        assert_eq!(set.action(Motion::Idle).weight(), 0.0);
        assert!(
            !set.action(Motion::Idle).is_playing(),
            "fully faded-out action stops"
        );
    }

    #[test]
    fn subscription_sees_completion_once() {
        let mut set = uniform_set(0.5);
        let action = set.action_mut(Motion::Jump);
        action.set_loop(LoopMode::Once);
        action.play();
        let mut sub = set.subscribe_finished(Motion::Jump);

        set.advance(0.25);
        assert!(!sub.take_fired());

        set.advance(0.5);
        assert!(sub.take_fired());
        assert!(!sub.take_fired(), "take_fired consumes the event");
    }

    #[test]
    fn dropped_subscription_is_revoked() {
        let mut set = uniform_set(0.5);
        let action = set.action_mut(Motion::Jump);
        action.set_loop(LoopMode::Once);
        action.play();

        let sub = set.subscribe_finished(Motion::Jump);
        let fired = Rc::clone(&sub.fired);
        drop(sub);

        set.advance(1.0);
        assert!(
            !fired.get(),
            "revoked subscription must never observe the completion"
        );
    }
}
