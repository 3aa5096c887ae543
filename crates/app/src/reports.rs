//! Display-ready rows for the document renderer.
//!
//! Every value is already formatted for print (money as `$12.34`, dates as
//! `YYYY-MM-DD`); the renderer only lays them out. Rows serialize to JSON.

use serde::Serialize;

use stockroom_core::{ActorId, BillId, DomainError, DomainResult, Money};
use stockroom_invoicing::{Bill, PaymentRecord};
use stockroom_inventory::{Location, Movement};
use stockroom_products::ProductCode;

use crate::system::System;

fn dollars(amount: Money) -> String {
    format!("${amount}")
}

fn place(location: Location) -> String {
    format!("Aisle {} - Shelf {}", location.aisle, location.shelf)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryRow {
    pub code: String,
    pub name: String,
    pub category: String,
    pub stock: i64,
    pub minimum: i64,
    pub maximum: i64,
    pub location: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovementRow {
    pub date: String,
    #[serde(rename = "type")]
    pub direction: String,
    pub code: String,
    pub product: String,
    pub quantity: i64,
    pub actor: String,
    pub reason: String,
}

impl From<&Movement> for MovementRow {
    fn from(m: &Movement) -> Self {
        Self {
            date: m.occurred_at().format("%Y-%m-%d").to_string(),
            direction: m.direction().as_str().to_string(),
            code: m.code().to_string(),
            product: m.product().name.clone(),
            quantity: m.amount(),
            actor: m.actor().name.clone(),
            reason: m.reason().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BillItemRow {
    pub code: String,
    pub product: String,
    pub amount: i64,
    pub unit_cost: String,
    pub subtotal: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BillDocument {
    pub bill_id: String,
    pub date: String,
    pub entity: String,
    pub entity_type: String,
    pub payment_method: String,
    /// Cash only: amount given and change.
    pub cash_line: Option<String>,
    pub items: Vec<BillItemRow>,
    pub total: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CriticalStockRow {
    pub code: String,
    pub product: String,
    pub category: String,
    pub stock: i64,
    pub minimum: i64,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActorHistory {
    pub title: String,
    /// Suggested output name, `<role>_<name_with_underscores>_history.pdf`.
    pub file_name: String,
    pub rows: Vec<MovementRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub code: String,
    pub product: String,
    pub in_qty: i64,
    pub in_cost: String,
    pub out_qty: i64,
    pub out_sales: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalesSummaryReport {
    pub title: String,
    pub rows: Vec<SummaryRow>,
}

pub fn inventory_rows(system: &System) -> Vec<InventoryRow> {
    system
        .inventory()
        .records()
        .map(|r| InventoryRow {
            code: r.code().to_string(),
            name: r.product().name().to_string(),
            category: r.product().category().to_string(),
            stock: r.stock().current_quantity(),
            minimum: r.stock().minimum(),
            maximum: r.stock().maximum(),
            location: place(r.location()),
            state: r.product().state().to_string(),
        })
        .collect()
}

pub fn movement_rows(system: &System) -> Vec<MovementRow> {
    system
        .inventory()
        .movements()
        .iter()
        .map(MovementRow::from)
        .collect()
}

pub fn bill_document(bill: &Bill) -> DomainResult<BillDocument> {
    let cash_line = match bill.payment() {
        PaymentRecord::Cash { cash_given } => Some(if *cash_given >= bill.total() {
            format!(
                "Paid for: {} - Change: {}",
                dollars(*cash_given),
                dollars(cash_given.saturating_sub(bill.total()))
            )
        } else {
            format!(
                "Cash insufficient. Lack: {}",
                dollars(bill.total().saturating_sub(*cash_given))
            )
        }),
        PaymentRecord::Card { .. } => None,
    };

    let items = bill
        .items()
        .iter()
        .map(|item| -> DomainResult<BillItemRow> {
            Ok(BillItemRow {
                code: item.product.code.to_string(),
                product: item.product.name.clone(),
                amount: item.quantity,
                unit_cost: dollars(item.unit_price),
                subtotal: dollars(item.total()?),
            })
        })
        .collect::<DomainResult<Vec<_>>>()?;

    Ok(BillDocument {
        bill_id: bill.id_typed().to_string(),
        date: bill.created_at().format("%Y-%m-%d").to_string(),
        entity: bill.entity().name.clone(),
        entity_type: bill.entity().role.label().to_string(),
        payment_method: bill.payment().to_string(),
        cash_line,
        items,
        total: dollars(bill.total()),
    })
}

/// Document for a stored bill.
pub fn bill_document_for(system: &System, id: BillId) -> DomainResult<BillDocument> {
    let bill = system
        .bill(id)
        .ok_or_else(|| DomainError::not_found(format!("bill {id}")))?;
    bill_document(bill)
}

pub fn critical_stock_rows(system: &System) -> Vec<CriticalStockRow> {
    system
        .inventory()
        .critical_records()
        .into_iter()
        .map(|r| CriticalStockRow {
            code: r.code().to_string(),
            product: r.product().name().to_string(),
            category: r.product().category().to_string(),
            stock: r.stock().current_quantity(),
            minimum: r.stock().minimum(),
            location: place(r.location()),
        })
        .collect()
}

/// Movements of one customer or supplier.
pub fn actor_history(system: &System, id: ActorId) -> DomainResult<ActorHistory> {
    let actor = system.actor(id)?;
    let role = actor.role();
    let rows = system
        .inventory()
        .movements_for_actor(id)
        .into_iter()
        .map(MovementRow::from)
        .collect();

    let label = role.label();
    Ok(ActorHistory {
        title: format!("History for {label}: {}", actor.name()),
        file_name: format!("{}_{}_history.pdf", role.as_str(), actor.name().replace(' ', "_")),
        rows,
    })
}

/// Purchases vs. sales, for every product or only `code`.
pub fn sales_summary(
    system: &System,
    code: Option<&ProductCode>,
) -> DomainResult<SalesSummaryReport> {
    let summary = system.sales_summary(code)?;
    let rows: Vec<SummaryRow> = summary
        .lines()
        .map(|line| SummaryRow {
            code: line.code.clone(),
            product: line.name.clone(),
            in_qty: line.inbound_qty,
            in_cost: dollars(line.inbound_cost),
            out_qty: line.outbound_qty,
            out_sales: dollars(line.outbound_cost),
        })
        .collect();

    let mut title = "Sales and Purchases Summary".to_string();
    if let Some(row) = code.and_then(|_| rows.first()) {
        title.push_str(&format!(" - Product: {} ({})", row.product, row.code));
    }
    Ok(SalesSummaryReport { title, rows })
}
