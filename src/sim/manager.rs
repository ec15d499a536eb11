//! Entity Manager
//!
//! The session-wide registry and update driver. Entities are registered
//! under an auto-generated or caller-supplied name and ticked in
//! registration order. Newly added entities sit in a pending queue until
//! the start of the next tick, so the live set never mutates while it is
//! being iterated.

use super::entity::Entity;

#[derive(Default)]
pub struct EntityManager {
    entities: Vec<Entity>,
    pending: Vec<Entity>,
    next_id: u64,
}

impl EntityManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register under an auto-generated name; returns the name.
    pub fn add(&mut self, entity: Entity) -> String {
        let name = format!("entity-{}", self.next_id);
        self.next_id += 1;
        self.add_named(entity, &name);
        name
    }

    /// Register under an explicit name. A duplicate name silently
    /// replaces the previous entity. Convenient for respawns, a footgun
    /// otherwise, so it is logged.
    pub fn add_named(&mut self, mut entity: Entity, name: &str) {
        if let Some(index) = self.entities.iter().position(|e| e.name() == name) {
            log::warn!("entity name '{name}' re-registered, dropping the old entity");
            self.entities.remove(index);
        }
        if let Some(index) = self.pending.iter().position(|e| e.name() == name) {
            log::warn!("entity name '{name}' re-registered, dropping the old entity");
            self.pending.remove(index);
        }

        entity.set_name(name);
        entity.notify_registered();
        self.pending.push(entity);
    }

    /// Lookup by name; pending entities are visible immediately even
    /// though they only start updating next tick.
    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.entities
            .iter()
            .chain(self.pending.iter())
            .find(|entity| entity.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Entity> {
        self.entities
            .iter_mut()
            .chain(self.pending.iter_mut())
            .find(|entity| entity.name() == name)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len() + self.pending.len()
    }

    /// Promote pending entities into the live set, then tick every active
    /// entity in registration order.
    pub fn update(&mut self, dt: f32) {
        if !self.pending.is_empty() {
            self.entities.append(&mut self.pending);
        }
        for entity in &mut self.entities {
            entity.update(dt);
        }
    }
}
