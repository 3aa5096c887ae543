//! Product catalogue module.
//!
//! Products are identified by their code and are immutable once created.

pub mod product;

pub use product::{Product, ProductCode, ProductState};
