//! Domain error model.

use thiserror::Error;

use crate::id::{ActorId, BillId, MovementId};
use crate::money::Money;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, conflicts). File and wire-format failures belong to
/// `stockroom-infra`.
///
/// Every variant renders a message that can be shown to an operator as-is.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. empty name, zero quantity).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested movement or bill does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A conflicting entity already exists (e.g. duplicate actor id).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A product with this code is already registered in the inventory.
    #[error("product code {0} is already in inventory")]
    DuplicateProduct(String),

    /// No inventory record exists for this product code.
    #[error("no inventory record found for product code {0}")]
    RecordNotFound(String),

    /// Applying the delta would leave stock outside `0..=maximum`.
    #[error("invalid stock update: {current} {delta:+} is outside 0..={maximum}")]
    InvalidStockUpdate { current: i64, delta: i64, maximum: i64 },

    /// Stock limits are negative, inverted, or below the current quantity.
    #[error("invalid stock limits: {0}")]
    InvalidLimits(String),

    /// The actor has the wrong role for the requested movement.
    #[error("foreign actor: {0}")]
    ForeignActor(String),

    /// A movement being billed belongs to a different actor than the bill.
    #[error("movement {movement} does not belong to entity {entity}")]
    ForeignMovement { movement: MovementId, entity: ActorId },

    /// A movement being billed is already linked to another bill.
    #[error("movement {movement} is already billed on {bill}")]
    AlreadyBilled { movement: MovementId, bill: BillId },

    /// The payment method did not clear the bill total.
    #[error("payment failed: {reason}")]
    PaymentFailed {
        reason: String,
        shortfall: Option<Money>,
    },

    /// A payment record names a method this system does not know.
    #[error("unknown payment method: {0}")]
    UnknownPaymentMethod(String),

    /// A referenced customer or supplier is not registered.
    #[error("actor not found: {0}")]
    ActorNotFound(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn record_not_found(code: impl Into<String>) -> Self {
        Self::RecordNotFound(code.into())
    }

    pub fn invalid_limits(msg: impl Into<String>) -> Self {
        Self::InvalidLimits(msg.into())
    }

    pub fn foreign_actor(msg: impl Into<String>) -> Self {
        Self::ForeignActor(msg.into())
    }

    pub fn actor_not_found(id: impl Into<String>) -> Self {
        Self::ActorNotFound(id.into())
    }
}
