//! Application layer: the `System` facade, backup export/import and
//! display-ready report rows.

pub mod export;
pub mod import;
pub mod reports;
pub mod system;

pub use import::{ActorDedup, ImportOptions, ImportReport, import_products};
pub use system::{CreateBill, EntryRecord, RecordSale, Restock, Settings, System};
