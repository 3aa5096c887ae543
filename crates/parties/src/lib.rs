//! Parties module: customers and suppliers.
//!
//! Both are represented by one [`Actor`] type tagged with an [`ActorRole`];
//! movement direction and bill entity type dispatch on the tag.

pub mod directory;
pub mod party;

pub use directory::ActorDirectory;
pub use party::{Actor, ActorRole};
