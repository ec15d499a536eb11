//! Simulation Core
//!
//! A small entity/component framework plus the character machinery built
//! on it. Inspired by Bevy's patterns but deliberately simpler: the
//! frame loop is single-threaded, components are trait objects looked up
//! by capability name, and each entity carries its own typed message bus.
//!
//! Key concepts:
//! - Entity: named bundle of components sharing one transform
//! - Component: per-frame behavior attached to exactly one entity
//! - EntityManager: registry and global update driver
//! - FiniteStateMachine: at most one active state, controlled transitions
//! - CharacterController: locomotion FSM + capsule physics for the player
//!
//! Design philosophy:
//! - the tick never blocks: asset readiness is polled, not awaited
//! - configuration misses degrade silently, programming errors panic
//! - closed enums where the set is known (states, messages), name-keyed
//!   registries where it is open (components)

// Allow unused code - the framework surface is wider than the demo binary
// exercises (typed lookups, registry accessors used by embedding code)
#![allow(dead_code)]

pub mod animation;
pub mod component;
pub mod controller;
pub mod entity;
pub mod event;
pub mod fsm;
pub mod locomotion;
pub mod manager;
pub mod physics;

// Re-export main types
pub use component::Component;
pub use controller::CharacterController;
pub use entity::{Entity, EntityHost, Transform};
pub use event::{Message, ModelHandle, Topic};
pub use fsm::{FiniteStateMachine, State};
pub use locomotion::{Intent, Motion};
pub use manager::EntityManager;
pub use physics::{Capsule, CollisionQuery, StaticVolume};
