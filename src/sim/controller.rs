//! Character Controller
//!
//! The component holding the authoritative simulation state for the
//! player: velocity, collision capsule, grounded flag, the locomotion
//! state machine, and the animation table that machine blends.
//!
//! Per tick it samples input, classifies it into a locomotion intent,
//! drives the FSM, integrates orientation and velocity against gravity
//! and exponential damping, resolves the capsule against the static
//! collision volume, and writes the result back onto the owning entity.
//!
//! Loading is asynchronous and never blocks a tick: until the animation
//! set arrives the FSM stays empty and only physics runs; until the
//! collision volume arrives every intersection query reports no contact.

use std::any::Any;

use macroquad::math::{vec3, Quat, Vec3};

use crate::input::InputSource;
use crate::settings::PlayerSettings;

use super::animation::AnimationSet;
use super::component::Component;
use super::entity::EntityHost;
use super::event::Message;
use super::fsm::FiniteStateMachine;
use super::locomotion::{character_fsm, Intent, Motion};
use super::physics::{Capsule, CollisionQuery};

pub struct CharacterController {
    settings: PlayerSettings,
    input: Box<dyn InputSource>,
    fsm: FiniteStateMachine<Motion, Intent, AnimationSet>,
    animations: Option<AnimationSet>,
    volume: Option<Box<dyn CollisionQuery>>,
    capsule: Capsule,
    velocity: Vec3,
    grounded: bool,
    intent: Intent,
}

impl CharacterController {
    pub const NAME: &'static str = "CharacterController";

    pub fn new(settings: PlayerSettings, input: Box<dyn InputSource>) -> Self {
        let capsule = Capsule::new(
            vec3(0.0, settings.capsule_bottom, 0.0),
            vec3(0.0, settings.capsule_top, 0.0),
            settings.capsule_radius,
        );
        Self {
            settings,
            input,
            fsm: character_fsm(),
            animations: None,
            volume: None,
            capsule,
            velocity: Vec3::ZERO,
            grounded: false,
            intent: Intent::Idle,
        }
    }

    /// Move the capsule so the character's feet sit at `feet`.
    pub fn place_at(&mut self, feet: Vec3) {
        self.capsule.start = feet + vec3(0.0, self.settings.capsule_bottom, 0.0);
        self.capsule.end = feet + vec3(0.0, self.settings.capsule_top, 0.0);
    }

    /// Asset-provider completion callback: every clip for this character
    /// is in. Installs the action table and enters the initial idle state.
    pub fn animations_ready(&mut self, mut set: AnimationSet) {
        self.fsm.set_state(Motion::Idle, &mut set);
        self.animations = Some(set);
    }

    /// Collision-provider completion callback: the level geometry is
    /// queryable from now on.
    pub fn collision_ready(&mut self, volume: Box<dyn CollisionQuery>) {
        self.volume = Some(volume);
    }

    /// Active locomotion state, `None` until animations are ready.
    pub fn motion(&self) -> Option<Motion> {
        self.fsm.current()
    }

    /// The intent classified from the most recent input sample.
    pub fn intent(&self) -> Intent {
        self.intent
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Collision capsule, for debug drawing.
    pub fn capsule(&self) -> &Capsule {
        &self.capsule
    }

    fn step(&mut self, host: &mut EntityHost, dt: f32) {
        let (lateral, forward) = self.input.axes();
        let lateral = lateral.clamp(-1.0, 1.0);
        let forward = forward.clamp(-1.0, 1.0);

        self.intent = Intent::classify(
            lateral,
            forward,
            self.settings.walk_threshold,
            self.settings.run_threshold,
        );

        // Locomotion and animation wait for the clips; physics below runs
        // regardless, so the character moves before it animates.
        if let Some(set) = self.animations.as_mut() {
            self.fsm.update(dt, self.intent, set);
            if set.advance(dt) {
                self.fsm.animation_finished(set);
            }
            if let Some(motion) = self.fsm.current() {
                host.broadcast(Message::PlayerAction {
                    motion,
                    time: set.action(motion).time(),
                });
            }
        }

        // Yaw follows lateral deflection about world-up.
        let rotation = host.rotation()
            * Quat::from_axis_angle(Vec3::Y, self.settings.turn_rate * dt * -lateral);
        host.set_rotation(rotation);

        let forward_axis = (rotation * Vec3::Z).normalize();
        let accel = if self.grounded {
            self.settings.ground_speed
        } else {
            self.settings.air_speed
        };
        self.velocity += forward_axis * (forward * dt * accel);

        let mut damping = (-self.settings.damping_rate * dt).exp() - 1.0;
        if !self.grounded {
            self.velocity.y -= self.settings.gravity * dt;
            // less resistance in the air
            damping *= self.settings.air_damping_scale;
        } else if self.input.jump_pressed() {
            self.velocity.y = self.settings.jump_speed;
            // The jump overrides whatever intent was classified this tick.
            if let Some(set) = self.animations.as_mut() {
                self.fsm.update(dt, Intent::Jump, set);
            }
        }
        self.velocity += self.velocity * damping;

        self.capsule.translate(self.velocity * dt);
        self.resolve_collisions();

        host.set_position(self.capsule.end);
    }

    /// Capsule-vs-volume response: grounded when the contact normal
    /// points up, slide along anything else, then push out of
    /// penetration. With no volume loaded yet, everything is free space.
    fn resolve_collisions(&mut self) {
        self.grounded = false;
        let Some(volume) = self.volume.as_deref() else {
            return;
        };

        if let Some(contact) = volume.capsule_intersect(&self.capsule) {
            self.grounded = contact.normal.y > 0.0;
            if !self.grounded {
                self.velocity -= contact.normal * contact.normal.dot(self.velocity);
            }
            self.capsule.translate(contact.normal * contact.depth);
        }
    }
}

impl Component for CharacterController {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn update(&mut self, host: &mut EntityHost, dt: f32) {
        self.step(host, dt);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{Entity, Transform};
    use crate::sim::physics::StaticVolume;
    use std::cell::Cell;
    use std::rc::Rc;

    const DT: f32 = 0.016;

    #[derive(Clone, Default)]
    struct ScriptedInput {
        axes: Rc<Cell<(f32, f32)>>,
        jump: Rc<Cell<bool>>,
    }

    impl InputSource for ScriptedInput {
        fn axes(&self) -> (f32, f32) {
            self.axes.get()
        }

        fn jump_pressed(&self) -> bool {
            self.jump.replace(false)
        }
    }

    fn demo_animations() -> AnimationSet {
        AnimationSet::new(|motion| match motion {
            Motion::Jump => 0.5,
            _ => 1.0,
        })
    }

    fn controller() -> (CharacterController, ScriptedInput) {
        let input = ScriptedInput::default();
        let controller = CharacterController::new(PlayerSettings::default(), Box::new(input.clone()));
        (controller, input)
    }

    /// Run one controller tick against a standalone transform.
    fn tick(controller: &mut CharacterController, transform: &mut Transform, dt: f32) -> Vec<Message> {
        let mut outbox = Vec::new();
        let mut host = EntityHost::new("player", transform, &mut outbox);
        controller.step(&mut host, dt);
        outbox
    }

    #[test]
    fn physics_runs_before_animations_are_ready() {
        let (mut controller, _input) = controller();
        let mut transform = Transform::default();

        for _ in 0..10 {
            tick(&mut controller, &mut transform, DT);
        }

        assert_eq!(controller.motion(), None);
        assert!(controller.velocity().y < 0.0, "gravity must accumulate");
        assert!(transform.position.y < 1.0, "the character must fall");
    }

    #[test]
    fn missing_volume_means_no_contact() {
        let (mut controller, _input) = controller();
        let mut transform = Transform::default();

        tick(&mut controller, &mut transform, DT);
        assert!(!controller.is_grounded());
    }

    #[test]
    fn animations_ready_enters_idle() {
        let (mut controller, _input) = controller();
        controller.animations_ready(demo_animations());
        assert_eq!(controller.motion(), Some(Motion::Idle));
    }

    #[test]
    fn resting_contact_is_stable_across_ticks() {
        let (mut controller, _input) = controller();
        controller.collision_ready(Box::new(StaticVolume::arena(0.0, 50.0)));
        controller.place_at(Vec3::ZERO);
        controller.grounded = true;

        let mut transform = Transform::default();
        let before = controller.capsule().end;
        for _ in 0..20 {
            tick(&mut controller, &mut transform, DT);
            assert!(controller.is_grounded());
        }
        let after = controller.capsule().end;
        assert!((after - before).length() < 1e-5, "moved by {:?}", after - before);
    }

    #[test]
    fn grounded_speed_decays_monotonically_without_input() {
        let (mut controller, _input) = controller();
        controller.collision_ready(Box::new(StaticVolume::arena(0.0, 500.0)));
        controller.place_at(Vec3::ZERO);
        controller.grounded = true;
        controller.velocity = vec3(5.0, 0.0, 0.0);

        let mut transform = Transform::default();
        let mut previous = controller.velocity().length();
        for _ in 0..200 {
            tick(&mut controller, &mut transform, DT);
            let speed = controller.velocity().length();
            assert!(speed <= previous, "speed must never grow: {speed} > {previous}");
            assert!(
                controller.velocity().x >= 0.0,
                "damping must never reverse direction"
            );
            previous = speed;
        }
        assert!(previous < 0.05, "speed should decay toward zero, got {previous}");
    }

    #[test]
    fn jump_edge_launches_and_enters_jump_state() {
        let (mut controller, input) = controller();
        controller.animations_ready(demo_animations());
        controller.collision_ready(Box::new(StaticVolume::arena(0.0, 50.0)));
        controller.place_at(Vec3::ZERO);

        let mut transform = Transform::default();
        // Settle onto the floor first so the jump edge lands while grounded.
        for _ in 0..5 {
            tick(&mut controller, &mut transform, DT);
        }
        assert!(controller.is_grounded());

        input.jump.set(true);
        tick(&mut controller, &mut transform, DT);

        assert_eq!(controller.motion(), Some(Motion::Jump));
        assert!(controller.velocity().y > 0.0);
    }

    #[test]
    fn jump_edge_while_airborne_is_ignored() {
        let (mut controller, input) = controller();
        controller.animations_ready(demo_animations());
        // No volume: permanently airborne.
        let mut transform = Transform::default();

        input.jump.set(true);
        tick(&mut controller, &mut transform, DT);

        assert_eq!(controller.motion(), Some(Motion::Idle));
        assert!(controller.velocity().y < 0.0);
    }

    #[test]
    fn wall_contact_slides_instead_of_stopping_dead() {
        let (mut controller, _input) = controller();
        controller.collision_ready(Box::new(StaticVolume::arena(0.0, 10.0)));
        // High above the floor, pressed into the +X wall.
        controller.place_at(vec3(9.8, 5.0, 0.0));
        controller.velocity = vec3(3.0, 0.0, 2.0);

        let mut transform = Transform::default();
        tick(&mut controller, &mut transform, DT);

        assert!(!controller.is_grounded(), "wall normal must not ground");
        assert!(
            controller.velocity().x.abs() < 1e-4,
            "velocity into the wall must be removed, got {}",
            controller.velocity().x
        );
        assert!(
            controller.velocity().z > 0.0,
            "tangent velocity must survive the slide"
        );
    }

    #[test]
    fn forward_input_accelerates_along_facing() {
        let (mut controller, input) = controller();
        controller.collision_ready(Box::new(StaticVolume::arena(0.0, 500.0)));
        controller.place_at(Vec3::ZERO);
        controller.grounded = true;
        input.axes.set((0.0, 1.0));

        let mut transform = Transform::default();
        for _ in 0..10 {
            tick(&mut controller, &mut transform, DT);
        }

        // Identity orientation faces +Z.
        assert!(controller.velocity().z > 1.0);
        assert!(controller.velocity().x.abs() < 1e-4);
        assert_eq!(controller.intent(), Intent::Run);
    }

    #[test]
    fn lateral_input_turns_the_entity() {
        let (mut controller, input) = controller();
        input.axes.set((1.0, 0.0));

        let mut transform = Transform::default();
        tick(&mut controller, &mut transform, DT);

        let yawed = transform.rotation * Vec3::Z;
        assert!(yawed.x < 0.0, "positive lateral input yaws clockwise");
    }

    #[test]
    fn action_broadcast_carries_active_motion() {
        let (mut controller, _input) = controller();
        controller.animations_ready(demo_animations());

        let mut transform = Transform::default();
        let messages = tick(&mut controller, &mut transform, DT);

        assert!(messages.iter().any(|msg| matches!(
            msg,
            Message::PlayerAction {
                motion: Motion::Idle,
                ..
            }
        )));
    }

    #[test]
    fn controller_writes_capsule_end_as_entity_position() {
        let mut entity = Entity::new();
        let (mut controller, _input) = controller();
        controller.collision_ready(Box::new(StaticVolume::arena(0.0, 50.0)));
        controller.place_at(vec3(2.0, 0.0, 3.0));
        controller.grounded = true;
        let expected = controller.capsule().end;
        entity.add_component(Box::new(controller));

        entity.update(DT);
        assert!((entity.position() - expected).length() < 1e-5);
    }
}
