//! Entity
//!
//! An entity is a named bundle of components sharing one transform and one
//! message bus. The transform is the single source of truth for placement:
//! components read and write it through the [`EntityHost`] view they are
//! handed each hook, and nothing else mutates it.
//!
//! Broadcast delivery is synchronous and in component-registration order.
//! Messages sent from inside a component hook land on the entity outbox
//! and are drained within the same `update` call, mirroring the drained
//! event-queue pattern used elsewhere in the frame loop.

use macroquad::math::{Quat, Vec3};

use super::component::Component;
use super::event::Message;

/// Position + orientation, the entity's only spatial state.
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

/// The slice of an entity a component may touch from inside a hook:
/// transform, outbox, and the entity's name. Notably *not* the component
/// list: cross-component traffic goes through messages.
pub struct EntityHost<'a> {
    name: &'a str,
    transform: &'a mut Transform,
    outbox: &'a mut Vec<Message>,
}

impl<'a> EntityHost<'a> {
    pub(crate) fn new(
        name: &'a str,
        transform: &'a mut Transform,
        outbox: &'a mut Vec<Message>,
    ) -> Self {
        Self {
            name,
            transform,
            outbox,
        }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    pub fn rotation(&self) -> Quat {
        self.transform.rotation
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.transform.position = position;
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.transform.rotation = rotation;
    }

    /// Queue a broadcast to this entity's subscribers; delivered before
    /// the current `update` call returns.
    pub fn broadcast(&mut self, message: Message) {
        self.outbox.push(message);
    }
}

struct Slot {
    name: &'static str,
    component: Box<dyn Component>,
}

/// Composition root: components in registration order, a transform, an
/// active flag, and the message outbox.
pub struct Entity {
    name: String,
    transform: Transform,
    active: bool,
    components: Vec<Slot>,
    outbox: Vec<Message>,
}

impl Entity {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            transform: Transform::default(),
            active: true,
            components: Vec::new(),
            outbox: Vec::new(),
        }
    }

    /// The manager-assigned name; empty until registered.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Assigned exactly once, by the manager.
    pub(crate) fn set_name(&mut self, name: &str) {
        assert!(
            self.name.is_empty(),
            "entity '{}' already has a name, cannot rename to '{}'",
            self.name,
            name
        );
        self.name = name.to_owned();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Inactive entities are skipped entirely by `update`.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    pub fn rotation(&self) -> Quat {
        self.transform.rotation
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.transform.position = position;
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.transform.rotation = rotation;
    }

    /// Attach a component under its declared name and run its `attached`
    /// hook. Two components under one name is a bug in the composing
    /// code, so this panics rather than logging and limping on.
    pub fn add_component(&mut self, mut component: Box<dyn Component>) {
        let name = component.name();
        assert!(
            !self.components.iter().any(|slot| slot.name == name),
            "entity '{}' already has a component named '{name}'",
            self.name
        );

        {
            let mut host = EntityHost::new(&self.name, &mut self.transform, &mut self.outbox);
            component.attached(&mut host);
        }
        self.components.push(Slot { name, component });
        self.drain_outbox();
    }

    /// Look up a component by capability name.
    pub fn component(&self, name: &str) -> Option<&dyn Component> {
        self.components
            .iter()
            .find(|slot| slot.name == name)
            .map(|slot| slot.component.as_ref())
    }

    pub fn component_mut(&mut self, name: &str) -> Option<&mut dyn Component> {
        self.components
            .iter_mut()
            .find(|slot| slot.name == name)
            .map(|slot| slot.component.as_mut())
    }

    /// Typed lookup: `component(name)` plus downcast.
    pub fn component_as<T: Component>(&self, name: &str) -> Option<&T> {
        self.component(name)?.as_any().downcast_ref()
    }

    pub fn component_as_mut<T: Component>(&mut self, name: &str) -> Option<&mut T> {
        self.component_mut(name)?.as_any_mut().downcast_mut()
    }

    /// Deliver a message to every subscribed component, synchronously and
    /// in registration order. Topics nobody subscribed to are no-ops.
    pub fn broadcast(&mut self, message: Message) {
        self.deliver(&message);
        self.drain_outbox();
    }

    /// Forward the tick to each component in registration order, then
    /// deliver whatever they broadcast. Skipped while inactive.
    pub fn update(&mut self, dt: f32) {
        if !self.active {
            return;
        }

        let Entity {
            name,
            transform,
            components,
            outbox,
            ..
        } = self;
        for slot in components.iter_mut() {
            let mut host = EntityHost::new(name, transform, outbox);
            slot.component.update(&mut host, dt);
        }

        self.drain_outbox();
    }

    /// Run every component's `registered` hook; called by the manager.
    pub(crate) fn notify_registered(&mut self) {
        let Entity {
            name,
            transform,
            components,
            outbox,
            ..
        } = self;
        for slot in components.iter_mut() {
            let mut host = EntityHost::new(name, transform, outbox);
            slot.component.registered(&mut host);
        }
        self.drain_outbox();
    }

    /// Deliver queued messages until the outbox is quiet. Handlers may
    /// broadcast in response; those follow in the next batch.
    fn drain_outbox(&mut self) {
        while !self.outbox.is_empty() {
            let batch = std::mem::take(&mut self.outbox);
            for message in &batch {
                self.deliver(message);
            }
        }
    }

    fn deliver(&mut self, message: &Message) {
        let topic = message.topic();
        let Entity {
            name,
            transform,
            components,
            outbox,
            ..
        } = self;
        for slot in components.iter_mut() {
            if slot.component.subscriptions().contains(&topic) {
                let mut host = EntityHost::new(name, transform, outbox);
                slot.component.on_message(&mut host, message);
            }
        }
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::new()
    }
}
