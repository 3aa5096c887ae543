use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{ActorId, BillId, DomainError, DomainResult, Entity, Money, MovementId};
use stockroom_parties::{Actor, ActorRole};
use stockroom_products::{Product, ProductCode};

/// Markup applied to the list price of outbound movements.
pub const DEFAULT_MARKUP_PERCENT: u32 = 8;

/// Whether stock enters (supplier replenishment) or leaves (customer sale).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    pub fn for_role(role: ActorRole) -> Self {
        match role {
            ActorRole::Supplier => Direction::In,
            ActorRole::Customer => Direction::Out,
        }
    }

    /// The actor role that produces this direction.
    pub fn counterpart(self) -> ActorRole {
        match self {
            Direction::In => ActorRole::Supplier,
            Direction::Out => ActorRole::Customer,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "in" => Some(Direction::In),
            "out" => Some(Direction::Out),
            _ => None,
        }
    }
}

/// Product as seen by a movement at the time it was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    pub code: ProductCode,
    pub name: String,
    pub list_price: Money,
}

impl From<&Product> for ProductRef {
    fn from(product: &Product) -> Self {
        Self {
            code: product.code().clone(),
            name: product.name().to_string(),
            list_price: product.price(),
        }
    }
}

/// Counterpart actor as seen by a movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorRef {
    pub id: ActorId,
    pub role: ActorRole,
    pub name: String,
}

impl From<&Actor> for ActorRef {
    fn from(actor: &Actor) -> Self {
        Self {
            id: actor.id_typed(),
            role: actor.role(),
            name: actor.name().to_string(),
        }
    }
}

/// Idempotency key used to recognise a movement across snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MovementKey {
    pub code: ProductCode,
    pub amount: i64,
    pub actor_id: ActorId,
    pub occurred_at: DateTime<Utc>,
}

/// An immutable stock-affecting fact.
///
/// Only the bill link is ever set after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    id: MovementId,
    product: ProductRef,
    amount: i64,
    occurred_at: DateTime<Utc>,
    actor: ActorRef,
    reason: String,
    bill_id: Option<BillId>,
    direction: Direction,
    final_price: Money,
}

impl Movement {
    /// Record a movement of `amount` units of `product` with `actor`.
    ///
    /// Direction follows the actor's role; outbound movements are priced at
    /// the list price plus `markup_percent`.
    pub fn record(
        product: &Product,
        amount: i64,
        actor: &Actor,
        reason: impl Into<String>,
        occurred_at: DateTime<Utc>,
        markup_percent: u32,
    ) -> DomainResult<Self> {
        Self::restore(
            MovementId::new(),
            ProductRef::from(product),
            amount,
            ActorRef::from(actor),
            reason,
            occurred_at,
            markup_percent,
        )
    }

    /// Rebuild a movement from references, e.g. when replaying a backup.
    ///
    /// The bill link is not restored here; it is re-established by matching
    /// bills against the ledger.
    pub fn restore(
        id: MovementId,
        product: ProductRef,
        amount: i64,
        actor: ActorRef,
        reason: impl Into<String>,
        occurred_at: DateTime<Utc>,
        markup_percent: u32,
    ) -> DomainResult<Self> {
        if amount <= 0 {
            return Err(DomainError::validation(format!(
                "movement amount must be positive, got {amount}"
            )));
        }

        let direction = Direction::for_role(actor.role);
        let final_price = match direction {
            Direction::In => product.list_price,
            Direction::Out => product.list_price.with_markup_percent(markup_percent),
        };

        Ok(Self {
            id,
            product,
            amount,
            occurred_at,
            actor,
            reason: reason.into(),
            bill_id: None,
            direction,
            final_price,
        })
    }

    pub fn id_typed(&self) -> MovementId {
        self.id
    }

    pub fn product(&self) -> &ProductRef {
        &self.product
    }

    pub fn code(&self) -> &ProductCode {
        &self.product.code
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn actor(&self) -> &ActorRef {
        &self.actor
    }

    pub fn actor_id(&self) -> ActorId {
        self.actor.id
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn bill_id(&self) -> Option<BillId> {
        self.bill_id
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Unit price charged: list price inbound, marked-up price outbound.
    pub fn final_price(&self) -> Money {
        self.final_price
    }

    /// Signed quantity change: `+amount` inbound, `-amount` outbound.
    pub fn delta(&self) -> i64 {
        match self.direction {
            Direction::In => self.amount,
            Direction::Out => -self.amount,
        }
    }

    pub fn key(&self) -> MovementKey {
        MovementKey {
            code: self.product.code.clone(),
            amount: self.amount,
            actor_id: self.actor.id,
            occurred_at: self.occurred_at,
        }
    }

    /// Attach the bill that charged this movement. Linking twice to the same
    /// bill is a no-op.
    pub(crate) fn link_bill(&mut self, bill_id: BillId) -> DomainResult<()> {
        match self.bill_id {
            Some(existing) if existing != bill_id => Err(DomainError::AlreadyBilled {
                movement: self.id,
                bill: existing,
            }),
            _ => {
                self.bill_id = Some(bill_id);
                Ok(())
            }
        }
    }
}

impl Entity for Movement {
    type Id = MovementId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
