//! Inventory record store and the global movement ledger.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use stockroom_core::{ActorId, BillId, DomainError, DomainResult, MovementId};
use stockroom_products::{Product, ProductCode};

use crate::location::{Location, LocationAllocator};
use crate::movement::{Movement, MovementKey};
use crate::record::InventoryRecord;
use crate::stock::Stock;

/// Row of the restock report: a record below its minimum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestockSuggestion {
    pub name: String,
    pub code: String,
    pub current_stock: i64,
    pub minimum_required: i64,
}

/// Records keyed by product code, the chronological movement log, and the
/// location allocator scoped to this inventory.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    records: BTreeMap<ProductCode, InventoryRecord>,
    movements: Vec<Movement>,
    locations: LocationAllocator,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an already-located record.
    pub fn add_record(&mut self, record: InventoryRecord) -> DomainResult<()> {
        if self.records.contains_key(record.code()) {
            return Err(DomainError::DuplicateProduct(record.code().to_string()));
        }
        self.records.insert(record.code().clone(), record);
        Ok(())
    }

    /// Allocate a location for `product` and insert a record with `stock`.
    pub fn create_record(&mut self, product: Product, stock: Stock) -> DomainResult<Location> {
        if self.records.contains_key(product.code()) {
            return Err(DomainError::DuplicateProduct(product.code().to_string()));
        }
        let location = self.locations.assign(product.category(), product.code())?;
        self.add_record(InventoryRecord::new(product, stock, location))?;
        Ok(location)
    }

    pub fn record(&self, code: &ProductCode) -> Option<&InventoryRecord> {
        self.records.get(code)
    }

    pub fn require_record(&self, code: &ProductCode) -> DomainResult<&InventoryRecord> {
        self.records
            .get(code)
            .ok_or_else(|| DomainError::record_not_found(code.as_str()))
    }

    pub fn contains(&self, code: &ProductCode) -> bool {
        self.records.contains_key(code)
    }

    /// Records in product-code order.
    pub fn records(&self) -> impl Iterator<Item = &InventoryRecord> {
        self.records.values()
    }

    /// Drop a record. Its movements stay in the ledger.
    pub fn remove_record(&mut self, code: &ProductCode) -> DomainResult<InventoryRecord> {
        self.records
            .remove(code)
            .ok_or_else(|| DomainError::record_not_found(code.as_str()))
    }

    pub fn update_stock_limits(
        &mut self,
        code: &ProductCode,
        minimum: i64,
        maximum: i64,
    ) -> DomainResult<()> {
        self.records
            .get_mut(code)
            .ok_or_else(|| DomainError::record_not_found(code.as_str()))?
            .stock_mut()
            .set_limits(minimum, maximum)
    }

    /// Append a movement to the ledger.
    ///
    /// With `apply_to_stock` the owning stock is updated first and the
    /// movement is logged only if that succeeds, so the ledger never records
    /// a movement its stock rejected. Without it the movement is logged as-is
    /// (snapshot replay, where levels are already reflected).
    pub fn append(&mut self, movement: Movement, apply_to_stock: bool) -> DomainResult<MovementId> {
        if apply_to_stock {
            let code = movement.code().clone();
            let record = self
                .records
                .get_mut(&code)
                .ok_or_else(|| DomainError::record_not_found(code.as_str()))?;

            let delta = movement.delta();
            if let Err(err) = record.stock_mut().apply(delta, movement.clone()) {
                warn!(code = %code, delta, error = %err, "stock update rejected");
                return Err(err);
            }
        }

        let id = movement.id_typed();
        self.movements.push(movement);
        Ok(id)
    }

    /// The whole ledger, in append order.
    pub fn movements(&self) -> &[Movement] {
        &self.movements
    }

    pub fn movement(&self, id: MovementId) -> Option<&Movement> {
        self.movements.iter().find(|m| m.id_typed() == id)
    }

    pub fn movements_for(&self, code: &ProductCode) -> Vec<&Movement> {
        self.movements.iter().filter(|m| m.code() == code).collect()
    }

    pub fn movements_for_actor(&self, actor_id: ActorId) -> Vec<&Movement> {
        self.movements
            .iter()
            .filter(|m| m.actor_id() == actor_id)
            .collect()
    }

    pub fn unbilled_movements_for(&self, actor_id: ActorId) -> Vec<&Movement> {
        self.movements
            .iter()
            .filter(|m| m.actor_id() == actor_id && m.bill_id().is_none())
            .collect()
    }

    /// Records whose quantity is below their minimum.
    pub fn critical_records(&self) -> Vec<&InventoryRecord> {
        self.records
            .values()
            .filter(|r| r.stock().is_critical())
            .collect()
    }

    pub fn restock_suggestions(&self) -> Vec<RestockSuggestion> {
        self.critical_records()
            .into_iter()
            .map(|r| RestockSuggestion {
                name: r.product().name().to_string(),
                code: r.code().to_string(),
                current_stock: r.stock().current_quantity(),
                minimum_required: r.stock().minimum(),
            })
            .collect()
    }

    /// Link a ledger movement (and its stock history copy) to a bill.
    ///
    /// Both copies are checked before either is linked.
    pub fn link_bill(&mut self, movement_id: MovementId, bill_id: BillId) -> DomainResult<()> {
        let index = self
            .movements
            .iter()
            .position(|m| m.id_typed() == movement_id)
            .ok_or_else(|| DomainError::not_found(format!("movement {movement_id}")))?;
        let movement = &self.movements[index];
        if let Some(existing) = movement.bill_id().filter(|&b| b != bill_id) {
            return Err(DomainError::AlreadyBilled {
                movement: movement_id,
                bill: existing,
            });
        }

        let code = movement.code().clone();
        if let Some(record) = self.records.get_mut(&code) {
            record.stock_mut().link_bill(movement_id, bill_id)?;
        }
        self.movements[index].link_bill(bill_id)
    }

    /// First unbilled ledger movement matching code, amount and actor.
    pub fn find_unbilled(
        &self,
        code: &ProductCode,
        amount: i64,
        actor_id: ActorId,
    ) -> Option<MovementId> {
        self.movements
            .iter()
            .find(|m| {
                m.bill_id().is_none()
                    && m.code() == code
                    && m.amount() == amount
                    && m.actor_id() == actor_id
            })
            .map(Movement::id_typed)
    }

    /// Merge snapshot history into an existing record without touching its
    /// stock level. Returns how many movements were added.
    pub fn merge_record_history(
        &mut self,
        code: &ProductCode,
        history: Vec<Movement>,
    ) -> DomainResult<usize> {
        let record = self
            .records
            .get_mut(code)
            .ok_or_else(|| DomainError::record_not_found(code.as_str()))?;
        Ok(record.stock_mut().merge_history(history))
    }

    /// Merge snapshot movements into the ledger without applying them to
    /// stock, then into each product's history.
    ///
    /// Both merges compare idempotency keys as a multiset, so replaying the
    /// same snapshot leaves the ledger unchanged. Movements of removed
    /// records only go to the ledger. Returns how many movements were added
    /// to the ledger.
    pub fn merge_movements(&mut self, incoming: Vec<Movement>) -> DomainResult<usize> {
        let mut present: HashMap<MovementKey, usize> = HashMap::new();
        for m in &self.movements {
            *present.entry(m.key()).or_default() += 1;
        }

        let mut by_code: BTreeMap<ProductCode, Vec<Movement>> = BTreeMap::new();
        let mut added = 0;
        for movement in incoming {
            by_code
                .entry(movement.code().clone())
                .or_default()
                .push(movement.clone());

            let slot = present.entry(movement.key()).or_default();
            if *slot > 0 {
                *slot -= 1;
                debug!(code = %movement.code(), "movement already in ledger");
                continue;
            }
            self.append(movement, false)?;
            added += 1;
        }

        for (code, movements) in by_code {
            if self.records.contains_key(&code) {
                self.merge_record_history(&code, movements)?;
            } else {
                debug!(%code, count = movements.len(), "no record, ledger only");
            }
        }
        Ok(added)
    }

    /// Re-seed the location allocator from the current records.
    pub fn sync_locations(&mut self) {
        self.locations.sync_from(self.records.values());
    }

    pub fn locations(&self) -> &LocationAllocator {
        &self.locations
    }
}
