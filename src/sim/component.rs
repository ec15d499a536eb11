//! Component Trait
//!
//! A component is a unit of per-frame behavior attached to exactly one
//! entity for that entity's whole lifetime. Components never hold a
//! pointer back to their entity; every hook receives an [`EntityHost`]
//! view instead, which is how "only my own entity's transform" stays a
//! compile-time guarantee rather than a convention.

use std::any::Any;

use super::entity::EntityHost;
use super::event::{Message, Topic};

pub trait Component: Any {
    /// Capability name this component registers under. One component per
    /// name per entity.
    fn name(&self) -> &'static str;

    /// Topics this component wants delivered to `on_message`.
    fn subscriptions(&self) -> &'static [Topic] {
        &[]
    }

    /// Called once, immediately after the component is attached.
    fn attached(&mut self, _host: &mut EntityHost) {}

    /// Called once, when the owning entity is registered with the manager.
    fn registered(&mut self, _host: &mut EntityHost) {}

    /// Per-tick update, skipped while the owning entity is inactive.
    fn update(&mut self, _host: &mut EntityHost, _dt: f32) {}

    /// A broadcast on the owning entity matched one of this component's
    /// subscriptions.
    fn on_message(&mut self, _host: &mut EntityHost, _msg: &Message) {}

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}
