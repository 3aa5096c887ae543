//! Snapshot import and reconciliation.
//!
//! Importing merges a snapshot into the live system without duplicating
//! history: movements are recognised by their idempotency key, records that
//! already exist only gain missing history, and bills are matched back to
//! the ledger. The whole merge runs against a copy of the system that
//! replaces the live one only if every step succeeds.

use std::collections::{HashMap, VecDeque};
use std::path::Path;

use tracing::{debug, info, warn};

use stockroom_core::{ActorId, BillId, DomainError};
use stockroom_infra::snapshot::{
    BillDto, LocationDto, MovementDto, PaymentDto, ProductDto, RecordDto, Snapshot, SnapshotError,
    StateDto, read_json, read_snapshot,
};
use stockroom_inventory::{
    ActorRef, Direction, InventoryRecord, Location, Movement, MovementKey, ProductRef, Stock,
};
use stockroom_invoicing::{Bill, BillItem, PaymentRecord};
use stockroom_parties::{Actor, ActorRole};
use stockroom_products::{Product, ProductCode, ProductState};

use crate::system::System;

/// How an incoming actor is recognised as one already registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorDedup {
    /// Same id.
    ById,
    /// Same name and contact; the incoming id becomes an alias of the
    /// existing one.
    ByNameAndContact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    pub customers: ActorDedup,
    pub suppliers: ActorDedup,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            customers: ActorDedup::ById,
            suppliers: ActorDedup::ByNameAndContact,
        }
    }
}

impl ImportOptions {
    fn policy(&self, role: ActorRole) -> ActorDedup {
        match role {
            ActorRole::Customer => self.customers,
            ActorRole::Supplier => self.suppliers,
        }
    }
}

/// What an import added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub customers_added: usize,
    pub suppliers_added: usize,
    pub records_added: usize,
    pub records_merged: usize,
    pub movements_added: usize,
    pub bills_added: usize,
}

impl System {
    /// Merge `snapshot` into this system. On error the system is unchanged.
    pub fn import_snapshot(
        &mut self,
        snapshot: Snapshot,
        options: &ImportOptions,
    ) -> Result<ImportReport, SnapshotError> {
        let mut staged = self.clone();
        let report = Importer::new(&mut staged, options)
            .run(snapshot)
            .inspect_err(|e| warn!(error = %e, "import aborted"))?;
        *self = staged;
        info!(?report, "snapshot imported");
        Ok(report)
    }

    /// Read the backup at `path` and merge it.
    pub fn load(
        &mut self,
        path: impl AsRef<Path>,
        options: &ImportOptions,
    ) -> Result<ImportReport, SnapshotError> {
        let snapshot = read_snapshot(path)?;
        self.import_snapshot(snapshot, options)
    }

    /// Merge a file holding a bare list of inventory records. Actors named by
    /// their history must already be registered.
    pub fn load_inventory_records(
        &mut self,
        path: impl AsRef<Path>,
        options: &ImportOptions,
    ) -> Result<ImportReport, SnapshotError> {
        let records: Vec<RecordDto> = read_json(path)?;
        self.import_snapshot(
            Snapshot {
                records,
                ..Snapshot::default()
            },
            options,
        )
    }
}

/// Products from a file holding a bare list of product objects.
pub fn import_products(path: impl AsRef<Path>) -> Result<Vec<Product>, SnapshotError> {
    let products: Vec<ProductDto> = read_json(path)?;
    products
        .iter()
        .map(|dto| product_from_dto(ProductCode::new(dto.code.as_str())?, dto))
        .collect()
}

/// Ledger movement ids waiting to be reused by history entries with the same
/// key, so both copies of a movement keep one id.
type PendingIds = HashMap<MovementKey, VecDeque<stockroom_core::MovementId>>;

struct Importer<'a> {
    system: &'a mut System,
    options: &'a ImportOptions,
    aliases: HashMap<ActorId, ActorId>,
    report: ImportReport,
}

impl<'a> Importer<'a> {
    fn new(system: &'a mut System, options: &'a ImportOptions) -> Self {
        Self {
            system,
            options,
            aliases: HashMap::new(),
            report: ImportReport::default(),
        }
    }

    fn run(mut self, snapshot: Snapshot) -> Result<ImportReport, SnapshotError> {
        let Snapshot {
            movements,
            bills,
            records,
            customers,
            suppliers,
        } = snapshot;

        for c in &customers {
            self.merge_actor(ActorRole::Customer, &c.name, &c.number_id, &c.id)?;
        }
        for s in &suppliers {
            self.merge_actor(ActorRole::Supplier, &s.name, &s.contact_number, &s.id)?;
        }

        for record in &records {
            self.merge_record(record)?;
        }

        let ledger = movements
            .iter()
            .map(|dto| self.movement_from_dto(dto, None))
            .collect::<Result<Vec<_>, _>>()?;
        let mut pending = PendingIds::new();
        for m in &ledger {
            pending.entry(m.key()).or_default().push_back(m.id_typed());
        }

        for record in &records {
            let code = ProductCode::new(record.product.code.as_str())?;
            let history = record
                .stock
                .record
                .iter()
                .map(|dto| self.movement_from_dto(dto, Some(&mut pending)))
                .collect::<Result<Vec<_>, _>>()?;
            self.system.inventory.merge_record_history(&code, history)?;
        }

        self.report.movements_added = self.system.inventory.merge_movements(ledger)?;

        for bill in &bills {
            self.merge_bill(bill)?;
        }

        self.system.inventory.sync_locations();
        Ok(self.report)
    }

    fn parse_actor_id(raw: &str) -> Result<ActorId, SnapshotError> {
        raw.parse()
            .map_err(|e: DomainError| SnapshotError::malformed(format!("actor id {raw:?}: {e}")))
    }

    /// Snapshot id, mapped to the live id when the actor was deduplicated.
    fn resolve_actor_id(&self, raw: &str) -> Result<ActorId, SnapshotError> {
        let id = Self::parse_actor_id(raw)?;
        Ok(self.aliases.get(&id).copied().unwrap_or(id))
    }

    fn merge_actor(
        &mut self,
        role: ActorRole,
        name: &str,
        contact: &str,
        raw_id: &str,
    ) -> Result<(), SnapshotError> {
        let id = Self::parse_actor_id(raw_id)?;
        let directory = self.system.directory_mut(role);

        if self.options.policy(role) == ActorDedup::ByNameAndContact {
            if let Some(existing) = directory.find_same_party(name, contact) {
                let existing_id = existing.id_typed();
                if existing_id != id {
                    self.aliases.insert(id, existing_id);
                }
                debug!(%role, %id, %existing_id, "actor already registered under name and contact");
                return Ok(());
            }
        }
        if directory.contains(id) {
            debug!(%role, %id, "actor already registered");
            return Ok(());
        }

        directory.insert(Actor::with_id(id, role, name, contact)?)?;
        match role {
            ActorRole::Customer => self.report.customers_added += 1,
            ActorRole::Supplier => self.report.suppliers_added += 1,
        }
        Ok(())
    }

    /// Create a missing record with its snapshot levels; an existing record
    /// keeps its levels. History is merged separately.
    fn merge_record(&mut self, dto: &RecordDto) -> Result<(), SnapshotError> {
        let code = ProductCode::new(dto.product.code.as_str())?;
        if self.system.inventory.contains(&code) {
            debug!(%code, "record exists, merging history only");
            self.report.records_merged += 1;
            return Ok(());
        }

        let product = product_from_dto(code.clone(), &dto.product)?;
        let stock = Stock::restore(
            dto.stock.actual_stock,
            dto.stock.minimum_stock,
            dto.stock.maximum_stock,
            Vec::new(),
        )?;
        let location = location_from_dto(&code, dto.location)?;
        self.system
            .inventory
            .add_record(InventoryRecord::new(product, stock, location))?;
        self.report.records_added += 1;
        Ok(())
    }

    fn movement_from_dto(
        &self,
        dto: &MovementDto,
        pending: Option<&mut PendingIds>,
    ) -> Result<Movement, SnapshotError> {
        let code = ProductCode::new(dto.code.as_str())?;
        let direction = Direction::parse(&dto.direction).ok_or_else(|| {
            SnapshotError::malformed(format!("unknown movement type {:?}", dto.direction))
        })?;
        let role = direction.counterpart();
        let actor_id = self.resolve_actor_id(&dto.actor_id)?;
        self.system.directory(role).require(actor_id)?;

        let list_price = match self.system.inventory.record(&code) {
            Some(record) => record.product().price(),
            None => dto
                .price
                .ok_or_else(|| DomainError::record_not_found(code.as_str()))?,
        };
        let product = ProductRef {
            code: code.clone(),
            name: dto.product.clone(),
            list_price,
        };
        let actor = ActorRef {
            id: actor_id,
            role,
            name: dto.actor.clone(),
        };

        let occurred_at = dto.occurred_at();
        let key = MovementKey {
            code,
            amount: dto.quantity,
            actor_id,
            occurred_at,
        };
        let id = pending
            .and_then(|p| p.get_mut(&key))
            .and_then(VecDeque::pop_front)
            .unwrap_or_default();

        Ok(Movement::restore(
            id,
            product,
            dto.quantity,
            actor,
            dto.reason.clone(),
            occurred_at,
            self.system.settings().markup_percent,
        )?)
    }

    /// Insert a bill under its original id and relink its movements. A bill
    /// already present is skipped.
    fn merge_bill(&mut self, dto: &BillDto) -> Result<(), SnapshotError> {
        let id: BillId = dto
            .bill_id
            .parse()
            .map_err(|e: DomainError| SnapshotError::malformed(format!("bill id: {e}")))?;
        if self.system.bill(id).is_some() {
            debug!(bill = %id, "bill already present");
            return Ok(());
        }

        let role = ActorRole::from_label(&dto.entity_type).ok_or_else(|| {
            SnapshotError::malformed(format!("unknown entity type {:?}", dto.entity_type))
        })?;
        let entity_id = self.resolve_actor_id(&dto.entity_id)?;
        self.system.directory(role).require(entity_id)?;
        let entity = ActorRef {
            id: entity_id,
            role,
            name: dto.entity.clone(),
        };

        let payment = payment_from_dto(&dto.payment_method)?;
        let items = dto
            .items
            .iter()
            .map(|item| -> Result<BillItem, SnapshotError> {
                let code = ProductCode::new(item.product.code.as_str())?;
                let inventory = &self.system.inventory;
                let product = match inventory.record(&code) {
                    Some(record) => ProductRef::from(record.product()),
                    None => inventory
                        .movements_for(&code)
                        .first()
                        .map(|m| m.product().clone())
                        .ok_or_else(|| DomainError::record_not_found(code.as_str()))?,
                };
                Ok(BillItem {
                    product,
                    quantity: item.quantity,
                    unit_price: item.price,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let bill = Bill::restore(id, entity, items, payment, dto.created_at())?;
        if bill.total() != dto.total {
            warn!(
                bill = %id,
                stored = %dto.total,
                computed = %bill.total(),
                "bill total differs from its items, keeping the computed one"
            );
        }

        for item in bill.items() {
            let inventory = &mut self.system.inventory;
            match inventory.find_unbilled(&item.product.code, item.quantity, entity_id) {
                Some(movement_id) => inventory.link_bill(movement_id, id)?,
                None => debug!(
                    bill = %id,
                    code = %item.product.code,
                    "no unbilled movement for bill item"
                ),
            }
        }

        self.system.bills.push(bill);
        self.report.bills_added += 1;
        Ok(())
    }
}

/// Aisles and shelves are numbered from 1, and the allocator must be able to
/// hand out the next number.
fn location_from_dto(code: &ProductCode, dto: LocationDto) -> Result<Location, SnapshotError> {
    let usable = 1..u32::MAX;
    if !usable.contains(&dto.aisle) || !usable.contains(&dto.shelf) {
        return Err(SnapshotError::malformed(format!(
            "record {code}: location aisle {} shelf {} out of range",
            dto.aisle, dto.shelf
        )));
    }
    Ok(Location::new(dto.aisle, dto.shelf))
}

fn product_from_dto(code: ProductCode, dto: &ProductDto) -> Result<Product, SnapshotError> {
    let state = match &dto.state {
        StateDto::Condition { condition } => ProductState::condition(condition.as_str()),
        StateDto::Expiration {
            expiration_date: (year, month, day),
        } => ProductState::expires_on(*year, *month, *day)?,
        StateDto::Text(text) => ProductState::condition(text.as_str()),
    };
    Ok(Product::new(
        code,
        dto.name.as_str(),
        dto.category.as_str(),
        dto.price,
        state,
    )?)
}

fn payment_from_dto(dto: &PaymentDto) -> Result<PaymentRecord, SnapshotError> {
    match dto.method.as_str() {
        "Cash" => {
            let cash_given = dto
                .cash_given
                .ok_or_else(|| SnapshotError::malformed("cash payment without cash_given"))?;
            Ok(PaymentRecord::Cash { cash_given })
        }
        "Card" => {
            let number = dto
                .card_number
                .as_deref()
                .ok_or_else(|| SnapshotError::malformed("card payment without card_number"))?;
            let digits: Vec<char> = number.chars().filter(|c| !c.is_whitespace()).collect();
            let last4: String = digits[digits.len().saturating_sub(4)..].iter().collect();
            Ok(PaymentRecord::Card {
                card_number: format!("**** **** **** {last4}"),
            })
        }
        other => Err(DomainError::UnknownPaymentMethod(other.to_string()).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use stockroom_core::Money;

    use crate::system::{EntryRecord, RecordSale};

    fn seeded() -> (System, ActorId, ActorId) {
        let mut system = System::default();
        let supplier = system.add_supplier(Actor::supplier("Acme", "555").unwrap()).unwrap();
        let customer = system.add_customer(Actor::customer("Ana", "1").unwrap()).unwrap();
        let at = Utc.with_ymd_and_hms(2025, 1, 2, 9, 0, 0).unwrap();
        system
            .entry_record(EntryRecord {
                product: Product::new(
                    ProductCode::new("P1").unwrap(),
                    "Cola",
                    "Beverages",
                    Money::from_units(10),
                    ProductState::condition("sealed"),
                )
                .unwrap(),
                quantity: 40,
                supplier_id: supplier,
                reason: "first delivery".to_string(),
                occurred_at: at,
            })
            .unwrap();
        system
            .make_sale(RecordSale {
                code: ProductCode::new("P1").unwrap(),
                customer_id: customer,
                quantity: 3,
                reason: "counter".to_string(),
                occurred_at: at,
            })
            .unwrap();
        (system, supplier, customer)
    }

    #[test]
    fn reimporting_own_snapshot_adds_nothing() {
        let (mut system, _, _) = seeded();
        let snapshot = system.export_snapshot().unwrap();

        let report = system
            .import_snapshot(snapshot, &ImportOptions::default())
            .unwrap();
        assert_eq!(report.movements_added, 0);
        assert_eq!(report.records_merged, 1);
        assert_eq!(report.records_added, 0);
        assert_eq!(system.inventory().movements().len(), 2);
        let record = system.inventory().record(&ProductCode::new("P1").unwrap()).unwrap();
        assert_eq!(record.stock().history().len(), 2);
        assert_eq!(record.stock().current_quantity(), 37);
    }

    #[test]
    fn supplier_with_same_name_and_contact_is_aliased() {
        let (mut system, supplier, _) = seeded();
        let mut snapshot = system.export_snapshot().unwrap();
        let foreign_id = ActorId::new();
        snapshot.suppliers[0].id = foreign_id.to_string();
        for m in &mut snapshot.movements {
            if m.direction == "in" {
                m.actor_id = foreign_id.to_string();
            }
        }

        let mut fresh = System::default();
        fresh
            .add_supplier(Actor::with_id(supplier, ActorRole::Supplier, "Acme", "555").unwrap())
            .unwrap();
        let report = fresh.import_snapshot(snapshot, &ImportOptions::default()).unwrap();

        assert_eq!(report.suppliers_added, 0);
        assert_eq!(fresh.suppliers().len(), 1);
        let inbound = fresh.supplier_history(supplier).unwrap();
        assert_eq!(inbound.len(), 1);
    }

    #[test]
    fn customers_dedup_by_id_only_by_default() {
        let (system, _, _) = seeded();
        let mut snapshot = system.export_snapshot().unwrap();
        snapshot.customers[0].id = ActorId::new().to_string();
        snapshot.movements.retain(|m| m.direction == "in");
        snapshot.records[0].stock.record.retain(|m| m.direction == "in");

        let mut target = system.clone();
        let report = target.import_snapshot(snapshot.clone(), &ImportOptions::default()).unwrap();
        assert_eq!(report.customers_added, 1);
        assert_eq!(target.customers().len(), 2);

        let mut strict = system.clone();
        let options = ImportOptions {
            customers: ActorDedup::ByNameAndContact,
            ..ImportOptions::default()
        };
        let report = strict.import_snapshot(snapshot, &options).unwrap();
        assert_eq!(report.customers_added, 0);
    }

    #[test]
    fn unknown_payment_method_aborts_without_changes() {
        let (system, _, _) = seeded();
        let snapshot: Snapshot = serde_json::from_value(json!({
            "movements": [],
            "records": [],
            "customers": [],
            "suppliers": [],
            "bills": [{
                "bill_id": BillId::new().to_string(),
                "date": "2025-01-02",
                "entity": "Ana",
                "entity_type": "Customer",
                "entity_id": system.customers().iter().next().unwrap().id_typed().to_string(),
                "payment_method": {"method": "Cheque"},
                "items": [{"product": {"_code": "P1"}, "quantity": 3, "price": 10.8, "total": 32.4}],
                "total": 32.4
            }]
        }))
        .unwrap();

        let mut target = system.clone();
        let err = target
            .import_snapshot(snapshot, &ImportOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::Domain(DomainError::UnknownPaymentMethod(ref m)) if m == "Cheque"
        ));
        assert!(target.bills().is_empty());
    }

    #[test]
    fn movement_of_unknown_actor_aborts() {
        let (system, _, _) = seeded();
        let mut snapshot = system.export_snapshot().unwrap();
        snapshot.movements[1].actor_id = ActorId::new().to_string();
        snapshot.movements[1].timestamp = None;

        let mut target = system.clone();
        let err = target
            .import_snapshot(snapshot, &ImportOptions::default())
            .unwrap_err();
        assert!(matches!(err, SnapshotError::Domain(DomainError::ActorNotFound(_))));
        assert_eq!(target.inventory().movements().len(), 2);
    }

    #[test]
    fn priceless_movement_without_record_aborts_whole_import() {
        let (system, _, _) = seeded();
        let mut snapshot = system.export_snapshot().unwrap();
        let extra_customer = ActorId::new();
        snapshot.customers.push(stockroom_infra::snapshot::CustomerDto {
            name: "Bo".to_string(),
            number_id: "2".to_string(),
            id: extra_customer.to_string(),
        });
        snapshot.movements[1].code = "GONE".to_string();
        snapshot.movements[1].price = None;

        let mut target = system.clone();
        let err = target
            .import_snapshot(snapshot, &ImportOptions::default())
            .unwrap_err();
        assert!(matches!(err, SnapshotError::Domain(DomainError::RecordNotFound(_))));
        assert_eq!(target.customers().len(), 1);
    }

    #[test]
    fn priced_movement_without_record_stays_in_ledger() {
        let (system, _, customer) = seeded();
        let mut snapshot = system.export_snapshot().unwrap();
        snapshot.movements[1].code = "GONE".to_string();

        let mut fresh = System::default();
        let report = fresh.import_snapshot(snapshot, &ImportOptions::default()).unwrap();

        assert_eq!(report.movements_added, 2);
        let gone = fresh.inventory().movements_for(&ProductCode::new("GONE").unwrap());
        assert_eq!(gone.len(), 1);
        assert_eq!(gone[0].product().list_price, Money::from_units(10));
        assert_eq!(gone[0].final_price(), Money::from_cents(1080));
        assert_eq!(fresh.customer_history(customer).unwrap().len(), 1);
    }

    #[test]
    fn out_of_range_locations_are_malformed() {
        let (system, _, _) = seeded();
        for (aisle, shelf) in [(u32::MAX, 1), (1, u32::MAX), (0, 1), (1, 0)] {
            let mut snapshot = system.export_snapshot().unwrap();
            snapshot.records[0].location = LocationDto { aisle, shelf };

            let mut fresh = System::default();
            let err = fresh
                .import_snapshot(snapshot, &ImportOptions::default())
                .unwrap_err();
            assert!(
                matches!(err, SnapshotError::Malformed(ref m) if m.contains("out of range")),
                "aisle {aisle} shelf {shelf}: {err:?}"
            );
            assert_eq!(fresh.inventory().records().count(), 0);
        }
    }

    #[test]
    fn last_usable_shelf_imports_then_entries_fail_cleanly() {
        let (system, supplier, _) = seeded();
        let mut snapshot = system.export_snapshot().unwrap();
        snapshot.records[0].location = LocationDto {
            aisle: 1,
            shelf: u32::MAX - 1,
        };

        let mut fresh = System::default();
        fresh.import_snapshot(snapshot, &ImportOptions::default()).unwrap();
        let entry = |code: &str| EntryRecord {
            product: Product::new(
                ProductCode::new(code).unwrap(),
                "Fanta",
                "Beverages",
                Money::from_units(1),
                ProductState::condition("sealed"),
            )
            .unwrap(),
            quantity: 1,
            supplier_id: supplier,
            reason: "new line".to_string(),
            occurred_at: Utc::now(),
        };

        assert_eq!(fresh.entry_record(entry("P2")).unwrap(), Location::new(1, u32::MAX));
        let err = fresh.entry_record(entry("P3")).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(!fresh.inventory().contains(&ProductCode::new("P3").unwrap()));
    }

    #[test]
    fn bare_record_and_product_lists_load() {
        let (system, _, _) = seeded();
        let snapshot = system.export_snapshot().unwrap();
        let dir = std::env::temp_dir();
        let stamp = uuid::Uuid::now_v7();
        let records_path = dir.join(format!("stockroom-records-{stamp}.json"));
        let products_path = dir.join(format!("stockroom-products-{stamp}.json"));

        system.export_records(&records_path).unwrap();
        let products: Vec<&ProductDto> = snapshot.records.iter().map(|r| &r.product).collect();
        stockroom_infra::snapshot::write_json(&products_path, &products).unwrap();

        let mut target = System::default();
        for actor in system.suppliers().iter().chain(system.customers().iter()) {
            match actor.role() {
                ActorRole::Supplier => target.add_supplier(actor.clone()).unwrap(),
                ActorRole::Customer => target.add_customer(actor.clone()).unwrap(),
            };
        }
        let report = target
            .load_inventory_records(&records_path, &ImportOptions::default())
            .unwrap();
        let loaded = import_products(&products_path).unwrap();
        let _ = std::fs::remove_file(&records_path);
        let _ = std::fs::remove_file(&products_path);

        assert_eq!(report.records_added, 1);
        assert_eq!(report.movements_added, 0);
        let record = target.inventory().record(&ProductCode::new("P1").unwrap()).unwrap();
        assert_eq!(record.stock().current_quantity(), 37);
        assert_eq!(record.stock().history().len(), 2);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name(), "Cola");
        assert_eq!(loaded[0].price(), Money::from_units(10));
    }

    #[test]
    fn card_numbers_are_remasked() {
        let record = payment_from_dto(&PaymentDto {
            method: "Card".to_string(),
            cash_given: None,
            card_number: Some("4111 1111 1111 9876".to_string()),
        })
        .unwrap();
        assert_eq!(
            record,
            PaymentRecord::Card {
                card_number: "**** **** **** 9876".to_string()
            }
        );
    }

    #[test]
    fn invalid_actor_id_is_malformed() {
        let snapshot: Snapshot = serde_json::from_value(json!({
            "movements": [],
            "records": [],
            "customers": [{"name": "Ana", "number_id": "1", "_id": "not-a-uuid"}],
            "suppliers": []
        }))
        .unwrap();
        let err = System::default()
            .import_snapshot(snapshot, &ImportOptions::default())
            .unwrap_err();
        assert!(matches!(err, SnapshotError::Malformed(_)));
    }
}
