//! Wire shapes of the full-backup JSON file.
//!
//! Field names follow the file format exactly (including the capitalised
//! movement keys). Identifiers stay strings here; resolving them against the
//! live system is the importer's job.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::Money;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub movements: Vec<MovementDto>,
    #[serde(default)]
    pub bills: Vec<BillDto>,
    pub records: Vec<RecordDto>,
    pub customers: Vec<CustomerDto>,
    pub suppliers: Vec<SupplierDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerDto {
    pub name: String,
    pub number_id: String,
    #[serde(rename = "_id")]
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierDto {
    pub name: String,
    pub contact_number: String,
    #[serde(rename = "_id")]
    pub id: String,
}

/// `{condition}`, `{expiration_date: [y, m, d]}`, or a bare condition string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateDto {
    Condition { condition: String },
    Expiration { expiration_date: (i32, u32, u32) },
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDto {
    pub name: String,
    pub category: String,
    pub code: String,
    pub price: Money,
    pub state: StateDto,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockDto {
    pub actual_stock: i64,
    pub minimum_stock: i64,
    pub maximum_stock: i64,
    #[serde(default)]
    pub record: Vec<MovementDto>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationDto {
    pub aisle: u32,
    pub shelf: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordDto {
    pub product: ProductDto,
    pub stock: StockDto,
    pub location: LocationDto,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementDto {
    #[serde(rename = "Product")]
    pub product: String,
    #[serde(rename = "Code")]
    pub code: String,
    #[serde(rename = "Quantity")]
    pub quantity: i64,
    /// `in` or `out`.
    #[serde(rename = "Type")]
    pub direction: String,
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Actor")]
    pub actor: String,
    #[serde(rename = "Actor_ID")]
    pub actor_id: String,
    #[serde(rename = "Reason")]
    pub reason: String,
    /// Full instant; older files only carry `Date`.
    #[serde(rename = "Timestamp", default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// List price of the product; lets a movement outlive its record.
    #[serde(rename = "Price", default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Money>,
}

impl MovementDto {
    /// `Timestamp` when present, otherwise midnight UTC of `Date`.
    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.timestamp
            .unwrap_or_else(|| self.date.and_time(chrono::NaiveTime::MIN).and_utc())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentDto {
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cash_given: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillProductDto {
    #[serde(rename = "_code")]
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillItemDto {
    pub product: BillProductDto,
    pub quantity: i64,
    pub price: Money,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillDto {
    pub bill_id: String,
    pub date: NaiveDate,
    pub entity: String,
    /// `Customer` or `Supplier`.
    pub entity_type: String,
    pub entity_id: String,
    pub payment_method: PaymentDto,
    pub items: Vec<BillItemDto>,
    pub total: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl BillDto {
    pub fn created_at(&self) -> DateTime<Utc> {
        self.timestamp
            .unwrap_or_else(|| self.date.and_time(chrono::NaiveTime::MIN).and_utc())
    }
}
