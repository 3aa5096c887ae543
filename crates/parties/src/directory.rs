use std::collections::HashMap;

use stockroom_core::{ActorId, DomainError, DomainResult};

use crate::party::{Actor, ActorRole};

/// Registered actors of one role, in registration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorDirectory {
    role: ActorRole,
    actors: Vec<Actor>,
    index: HashMap<ActorId, usize>,
}

impl ActorDirectory {
    pub fn new(role: ActorRole) -> Self {
        Self {
            role,
            actors: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn role(&self) -> ActorRole {
        self.role
    }

    /// Register an actor. Fails on a role mismatch or an id already present.
    pub fn insert(&mut self, actor: Actor) -> DomainResult<()> {
        actor.ensure_role(self.role)?;
        let id = actor.id_typed();
        if self.index.contains_key(&id) {
            return Err(DomainError::conflict(format!(
                "{} '{}' already exists",
                self.role,
                actor.name()
            )));
        }
        self.index.insert(id, self.actors.len());
        self.actors.push(actor);
        Ok(())
    }

    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.index.get(&id).map(|&i| &self.actors[i])
    }

    pub fn require(&self, id: ActorId) -> DomainResult<&Actor> {
        self.get(id)
            .ok_or_else(|| DomainError::actor_not_found(format!("{} {id}", self.role)))
    }

    pub fn contains(&self, id: ActorId) -> bool {
        self.index.contains_key(&id)
    }

    /// First registered actor matching on name and contact.
    pub fn find_same_party(&self, name: &str, contact: &str) -> Option<&Actor> {
        self.actors.iter().find(|a| a.is_same_party(name, contact))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.actors.iter()
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}
