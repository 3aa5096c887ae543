//! Billing module.
//!
//! Bills move through `Draft -> Priced -> Paid -> Committed`; a declined
//! payment ends the bill before anything is stored or linked.

pub mod bill;
pub mod payment;
pub mod summary;

pub use bill::{Bill, BillItem, DraftBill, PaidBill, PricedBill};
pub use payment::{
    ApprovingGateway, Card, CardGateway, Cash, DecliningGateway, PaymentMethod, PaymentOutcome,
    PaymentRecord,
};
pub use summary::{SalesSummary, SummaryLine, summarize};
