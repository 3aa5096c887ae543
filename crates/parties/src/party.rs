use serde::{Deserialize, Serialize};

use stockroom_core::{ActorId, DomainError, DomainResult, Entity};

/// Party kind: customer or supplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    Customer,
    Supplier,
}

impl ActorRole {
    /// Lowercase tag (`customer` / `supplier`).
    pub fn as_str(self) -> &'static str {
        match self {
            ActorRole::Customer => "customer",
            ActorRole::Supplier => "supplier",
        }
    }

    /// Capitalised label used as a bill's entity type.
    pub fn label(self) -> &'static str {
        match self {
            ActorRole::Customer => "Customer",
            ActorRole::Supplier => "Supplier",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "customer" => Some(ActorRole::Customer),
            "supplier" => Some(ActorRole::Supplier),
            _ => None,
        }
    }
}

impl core::fmt::Display for ActorRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A customer or supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    id: ActorId,
    role: ActorRole,
    name: String,
    /// Contact value: a customer's identity number, a supplier's phone number.
    contact: String,
}

impl Actor {
    /// Register a new actor with a freshly generated id.
    pub fn new(
        role: ActorRole,
        name: impl Into<String>,
        contact: impl Into<String>,
    ) -> DomainResult<Self> {
        Self::with_id(ActorId::new(), role, name, contact)
    }

    /// Rebuild an actor whose id was assigned earlier (e.g. loaded from a backup).
    pub fn with_id(
        id: ActorId,
        role: ActorRole,
        name: impl Into<String>,
        contact: impl Into<String>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("actor name cannot be empty"));
        }
        Ok(Self {
            id,
            role,
            name,
            contact: contact.into(),
        })
    }

    pub fn customer(name: impl Into<String>, contact: impl Into<String>) -> DomainResult<Self> {
        Self::new(ActorRole::Customer, name, contact)
    }

    pub fn supplier(name: impl Into<String>, contact: impl Into<String>) -> DomainResult<Self> {
        Self::new(ActorRole::Supplier, name, contact)
    }

    pub fn id_typed(&self) -> ActorId {
        self.id
    }

    pub fn role(&self) -> ActorRole {
        self.role
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contact(&self) -> &str {
        &self.contact
    }

    /// Two actors describe the same party when name and contact match,
    /// whatever their ids.
    pub fn is_same_party(&self, name: &str, contact: &str) -> bool {
        self.name == name && self.contact == contact
    }

    pub fn ensure_role(&self, expected: ActorRole) -> DomainResult<()> {
        if self.role != expected {
            return Err(DomainError::foreign_actor(format!(
                "{} '{}' cannot act as a {}",
                self.role, self.name, expected
            )));
        }
        Ok(())
    }
}

impl Entity for Actor {
    type Id = ActorId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
