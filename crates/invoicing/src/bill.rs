use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{BillId, DomainError, DomainResult, Entity, Money, MovementId};
use stockroom_inventory::{ActorRef, Movement, ProductRef};
use stockroom_parties::Actor;

use crate::payment::{PaymentMethod, PaymentOutcome, PaymentRecord};

/// Bill line: what was charged for one movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillItem {
    pub product: ProductRef,
    pub quantity: i64,
    /// Unit price at billing time (the movement's final price).
    pub unit_price: Money,
}

impl BillItem {
    pub fn total(&self) -> DomainResult<Money> {
        let quantity = u64::try_from(self.quantity)
            .map_err(|_| DomainError::validation("bill item quantity must be positive"))?;
        self.unit_price
            .checked_mul(quantity)
            .ok_or_else(|| DomainError::invariant("bill item amount overflow"))
    }
}

fn sum_items(items: &[BillItem]) -> DomainResult<Money> {
    let mut total = Money::ZERO;
    for item in items {
        total = total
            .checked_add(item.total()?)
            .ok_or_else(|| DomainError::invariant("bill total overflow"))?;
    }
    Ok(total)
}

/// Bill being assembled from an entity's movements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftBill {
    id: BillId,
    entity: ActorRef,
    items: Vec<BillItem>,
    movement_ids: Vec<MovementId>,
    created_at: DateTime<Utc>,
}

impl DraftBill {
    pub fn new(entity: &Actor, created_at: DateTime<Utc>) -> Self {
        Self {
            id: BillId::new(),
            entity: ActorRef::from(entity),
            items: Vec::new(),
            movement_ids: Vec::new(),
            created_at,
        }
    }

    pub fn id_typed(&self) -> BillId {
        self.id
    }

    /// Add one line for `movement` at its final unit price.
    ///
    /// The movement must belong to this bill's entity and must not be billed
    /// already.
    pub fn add_movement(&mut self, movement: &Movement) -> DomainResult<()> {
        if movement.actor_id() != self.entity.id {
            return Err(DomainError::ForeignMovement {
                movement: movement.id_typed(),
                entity: self.entity.id,
            });
        }
        if let Some(bill) = movement.bill_id() {
            return Err(DomainError::AlreadyBilled {
                movement: movement.id_typed(),
                bill,
            });
        }
        if self.movement_ids.contains(&movement.id_typed()) {
            return Err(DomainError::validation(format!(
                "movement {} listed twice",
                movement.id_typed()
            )));
        }

        self.items.push(BillItem {
            product: movement.product().clone(),
            quantity: movement.amount(),
            unit_price: movement.final_price(),
        });
        self.movement_ids.push(movement.id_typed());
        Ok(())
    }

    /// Fix the total. A bill without lines cannot be priced.
    pub fn price(self) -> DomainResult<PricedBill> {
        if self.items.is_empty() {
            return Err(DomainError::validation("cannot bill without movements"));
        }
        let total = sum_items(&self.items)?;
        Ok(PricedBill { draft: self, total })
    }
}

/// Bill with a fixed total, waiting for payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedBill {
    draft: DraftBill,
    total: Money,
}

impl PricedBill {
    pub fn total(&self) -> Money {
        self.total
    }

    /// Present the total to `method`. A declined payment consumes the bill.
    pub fn pay(self, method: &dyn PaymentMethod) -> DomainResult<PaidBill> {
        match method.pay(self.total) {
            PaymentOutcome::Accepted { change } => Ok(PaidBill {
                priced: self,
                payment: method.record(),
                change,
            }),
            PaymentOutcome::Declined { reason, shortfall } => {
                Err(DomainError::PaymentFailed { reason, shortfall })
            }
        }
    }
}

/// Paid bill, ready to be stored and linked to its movements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaidBill {
    priced: PricedBill,
    payment: PaymentRecord,
    change: Money,
}

impl PaidBill {
    pub fn change(&self) -> Money {
        self.change
    }

    pub fn movement_ids(&self) -> &[MovementId] {
        &self.priced.draft.movement_ids
    }

    /// Freeze into the immutable bill and the movements it must be linked to.
    pub fn commit(self) -> (Bill, Vec<MovementId>) {
        let PaidBill {
            priced, payment, ..
        } = self;
        let PricedBill { draft, total } = priced;
        let bill = Bill {
            id: draft.id,
            entity: draft.entity,
            items: draft.items,
            payment,
            created_at: draft.created_at,
            total,
        };
        (bill, draft.movement_ids)
    }
}

/// Committed bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    id: BillId,
    entity: ActorRef,
    items: Vec<BillItem>,
    payment: PaymentRecord,
    created_at: DateTime<Utc>,
    total: Money,
}

impl Bill {
    /// Rebuild a bill loaded from a backup; the total is recomputed from the
    /// items.
    pub fn restore(
        id: BillId,
        entity: ActorRef,
        items: Vec<BillItem>,
        payment: PaymentRecord,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let total = sum_items(&items)?;
        Ok(Self {
            id,
            entity,
            items,
            payment,
            created_at,
            total,
        })
    }

    pub fn id_typed(&self) -> BillId {
        self.id
    }

    pub fn entity(&self) -> &ActorRef {
        &self.entity
    }

    pub fn items(&self) -> &[BillItem] {
        &self.items
    }

    pub fn payment(&self) -> &PaymentRecord {
        &self.payment
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn total(&self) -> Money {
        self.total
    }
}

impl Entity for Bill {
    type Id = BillId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
