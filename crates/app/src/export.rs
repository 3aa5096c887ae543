//! Snapshot export.

use std::path::Path;

use serde::Serialize;
use tracing::info;

use stockroom_infra::snapshot::{
    BillDto, BillItemDto, BillProductDto, CustomerDto, LocationDto, MovementDto, PaymentDto,
    ProductDto, RecordDto, Snapshot, SnapshotError, StateDto, StockDto, SupplierDto,
    write_json, write_snapshot,
};
use stockroom_invoicing::{Bill, PaymentRecord};
use stockroom_inventory::{InventoryRecord, Movement};
use stockroom_parties::Actor;
use stockroom_products::{Product, ProductState};

use crate::system::System;

impl System {
    /// Full backup of the current state.
    pub fn export_snapshot(&self) -> Result<Snapshot, SnapshotError> {
        let bills = self
            .bills
            .iter()
            .map(bill_to_dto)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Snapshot {
            movements: self.inventory.movements().iter().map(movement_to_dto).collect(),
            bills,
            records: self.inventory.records().map(record_to_dto).collect(),
            customers: self.customers.iter().map(customer_to_dto).collect(),
            suppliers: self.suppliers.iter().map(supplier_to_dto).collect(),
        })
    }

    /// Write the full backup to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let path = path.as_ref();
        let snapshot = self.export_snapshot()?;
        write_snapshot(path, &snapshot)?;
        info!(
            path = %path.display(),
            records = snapshot.records.len(),
            movements = snapshot.movements.len(),
            bills = snapshot.bills.len(),
            "backup saved"
        );
        Ok(())
    }

    /// Write the ledger alone, as a JSON list.
    pub fn export_movements(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let movements: Vec<MovementDto> =
            self.inventory.movements().iter().map(movement_to_dto).collect();
        write_collection(path.as_ref(), "movements", &movements)
    }

    pub fn export_records(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let records: Vec<RecordDto> = self.inventory.records().map(record_to_dto).collect();
        write_collection(path.as_ref(), "records", &records)
    }

    pub fn export_customers(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let customers: Vec<CustomerDto> = self.customers.iter().map(customer_to_dto).collect();
        write_collection(path.as_ref(), "customers", &customers)
    }

    pub fn export_suppliers(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let suppliers: Vec<SupplierDto> = self.suppliers.iter().map(supplier_to_dto).collect();
        write_collection(path.as_ref(), "suppliers", &suppliers)
    }

    pub fn export_bills(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let bills = self
            .bills
            .iter()
            .map(bill_to_dto)
            .collect::<Result<Vec<_>, _>>()?;
        write_collection(path.as_ref(), "bills", &bills)
    }
}

fn write_collection<T: Serialize>(
    path: &Path,
    collection: &str,
    items: &[T],
) -> Result<(), SnapshotError> {
    write_json(path, items)?;
    info!(path = %path.display(), collection, count = items.len(), "collection exported");
    Ok(())
}

pub(crate) fn movement_to_dto(m: &Movement) -> MovementDto {
    MovementDto {
        product: m.product().name.clone(),
        code: m.code().to_string(),
        quantity: m.amount(),
        direction: m.direction().as_str().to_string(),
        date: m.occurred_at().date_naive(),
        actor: m.actor().name.clone(),
        actor_id: m.actor_id().to_string(),
        reason: m.reason().to_string(),
        timestamp: Some(m.occurred_at()),
        price: Some(m.product().list_price),
    }
}

fn product_to_dto(product: &Product) -> ProductDto {
    let state = match product.state() {
        ProductState::Condition(text) => StateDto::Condition {
            condition: text.clone(),
        },
        ProductState::Expiration(date) => {
            use chrono::Datelike;
            StateDto::Expiration {
                expiration_date: (date.year(), date.month(), date.day()),
            }
        }
    };
    ProductDto {
        name: product.name().to_string(),
        category: product.category().to_string(),
        code: product.code().to_string(),
        price: product.price(),
        state,
    }
}

fn record_to_dto(record: &InventoryRecord) -> RecordDto {
    let stock = record.stock();
    let location = record.location();
    RecordDto {
        product: product_to_dto(record.product()),
        stock: StockDto {
            actual_stock: stock.current_quantity(),
            minimum_stock: stock.minimum(),
            maximum_stock: stock.maximum(),
            record: stock.history().iter().map(movement_to_dto).collect(),
        },
        location: LocationDto {
            aisle: location.aisle,
            shelf: location.shelf,
        },
    }
}

fn bill_to_dto(bill: &Bill) -> Result<BillDto, SnapshotError> {
    let payment_method = match bill.payment() {
        PaymentRecord::Cash { cash_given } => PaymentDto {
            method: bill.payment().method().to_string(),
            cash_given: Some(*cash_given),
            card_number: None,
        },
        PaymentRecord::Card { card_number } => PaymentDto {
            method: bill.payment().method().to_string(),
            cash_given: None,
            card_number: Some(card_number.clone()),
        },
    };

    let items = bill
        .items()
        .iter()
        .map(|item| -> Result<BillItemDto, SnapshotError> {
            Ok(BillItemDto {
                product: BillProductDto {
                    code: item.product.code.to_string(),
                },
                quantity: item.quantity,
                price: item.unit_price,
                total: item.total()?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let entity = bill.entity();
    Ok(BillDto {
        bill_id: bill.id_typed().to_string(),
        date: bill.created_at().date_naive(),
        entity: entity.name.clone(),
        entity_type: entity.role.label().to_string(),
        entity_id: entity.id.to_string(),
        payment_method,
        items,
        total: bill.total(),
        timestamp: Some(bill.created_at()),
    })
}

fn customer_to_dto(actor: &Actor) -> CustomerDto {
    CustomerDto {
        name: actor.name().to_string(),
        number_id: actor.contact().to_string(),
        id: actor.id_typed().to_string(),
    }
}

fn supplier_to_dto(actor: &Actor) -> SupplierDto {
    SupplierDto {
        name: actor.name().to_string(),
        contact_number: actor.contact().to_string(),
        id: actor.id_typed().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use stockroom_core::Money;
    use stockroom_products::ProductCode;

    use crate::system::{EntryRecord, RecordSale};

    #[test]
    fn exports_every_collection() {
        let mut system = System::default();
        let supplier = system.add_supplier(Actor::supplier("Acme", "555").unwrap()).unwrap();
        let customer = system.add_customer(Actor::customer("Ana", "1").unwrap()).unwrap();
        let at = Utc.with_ymd_and_hms(2025, 3, 4, 10, 30, 0).unwrap();
        system
            .entry_record(EntryRecord {
                product: Product::new(
                    ProductCode::new("M1").unwrap(),
                    "Milk",
                    "Dairy",
                    Money::from_cents(250),
                    ProductState::expires_on(2025, 4, 1).unwrap(),
                )
                .unwrap(),
                quantity: 30,
                supplier_id: supplier,
                reason: "first delivery".to_string(),
                occurred_at: at,
            })
            .unwrap();
        system
            .make_sale(RecordSale {
                code: ProductCode::new("M1").unwrap(),
                customer_id: customer,
                quantity: 4,
                reason: "counter".to_string(),
                occurred_at: at,
            })
            .unwrap();

        let snapshot = system.export_snapshot().unwrap();
        assert_eq!(snapshot.customers.len(), 1);
        assert_eq!(snapshot.suppliers[0].contact_number, "555");
        assert_eq!(snapshot.movements.len(), 2);

        let sale = &snapshot.movements[1];
        assert_eq!(sale.direction, "out");
        assert_eq!(sale.actor, "Ana");
        assert_eq!(sale.date.to_string(), "2025-03-04");
        assert_eq!(sale.timestamp, Some(at));

        let record = &snapshot.records[0];
        assert_eq!(record.stock.actual_stock, 26);
        assert_eq!(record.stock.record.len(), 2);
        assert_eq!(record.location, LocationDto { aisle: 1, shelf: 1 });
        assert_eq!(
            record.product.state,
            StateDto::Expiration {
                expiration_date: (2025, 4, 1)
            }
        );
        assert_eq!(sale.price, Some(Money::from_cents(250)));
    }

    #[test]
    fn collections_export_as_bare_lists() {
        let mut system = System::default();
        system.add_customer(Actor::customer("Ana", "1").unwrap()).unwrap();
        system.add_customer(Actor::customer("Bo", "2").unwrap()).unwrap();
        let path = std::env::temp_dir()
            .join(format!("stockroom-customers-{}.json", uuid::Uuid::now_v7()));

        system.export_customers(&path).unwrap();
        let back: Vec<CustomerDto> = stockroom_infra::snapshot::read_json(&path).unwrap();
        system.export_bills(&path).unwrap();
        let bills: Vec<BillDto> = stockroom_infra::snapshot::read_json(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(back.len(), 2);
        assert_eq!(back[1].name, "Bo");
        assert!(bills.is_empty());
    }
}
