use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use stockroom_core::{DomainError, DomainResult, ValueObject};
use stockroom_products::ProductCode;

use crate::record::InventoryRecord;

/// Warehouse slot of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub aisle: u32,
    pub shelf: u32,
}

impl ValueObject for Location {}

impl Location {
    pub fn new(aisle: u32, shelf: u32) -> Self {
        Self { aisle, shelf }
    }
}

impl core::fmt::Display for Location {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "aisle {}, shelf {}", self.aisle, self.shelf)
    }
}

/// Allocation table for aisles (one per category) and shelves (one per
/// product within a category).
///
/// Owned by a single [`crate::Inventory`]; independent inventories never share
/// counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationAllocator {
    category_aisles: HashMap<String, u32>,
    next_aisle: u32,
    shelf_counters: HashMap<String, u32>,
    product_shelves: HashMap<(String, ProductCode), u32>,
}

impl Default for LocationAllocator {
    fn default() -> Self {
        Self {
            category_aisles: HashMap::new(),
            next_aisle: 1,
            shelf_counters: HashMap::new(),
            product_shelves: HashMap::new(),
        }
    }
}

fn successor(n: u32, what: &str) -> DomainResult<u32> {
    n.checked_add(1)
        .ok_or_else(|| DomainError::validation(format!("no {what} numbers left")))
}

impl LocationAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Location of `(category, code)`, allocating aisle and shelf on first sight.
    ///
    /// Fails without touching the table once aisle or shelf numbers run out.
    pub fn assign(&mut self, category: &str, code: &ProductCode) -> DomainResult<Location> {
        let key = (category.to_string(), code.clone());
        let known_aisle = self.category_aisles.get(category).copied();
        let known_shelf = self.product_shelves.get(&key).copied();

        let (aisle, next_aisle) = match known_aisle {
            Some(aisle) => (aisle, self.next_aisle),
            None => (self.next_aisle, successor(self.next_aisle, "aisle")?),
        };
        let shelf = match known_shelf {
            Some(shelf) => shelf,
            None => {
                let last = self.shelf_counters.get(category).copied().unwrap_or(0);
                successor(last, "shelf")?
            }
        };

        if known_aisle.is_none() {
            self.category_aisles.insert(category.to_string(), aisle);
            self.next_aisle = next_aisle;
            debug!(category, aisle, "allocated aisle");
        }
        if known_shelf.is_none() {
            self.shelf_counters.insert(category.to_string(), shelf);
            self.product_shelves.insert(key, shelf);
            debug!(category, code = %code, shelf, "allocated shelf");
        }

        Ok(Location { aisle, shelf })
    }

    /// Seed the table from records that already carry a location.
    ///
    /// Known categories and products keep their allocation; counters only
    /// move forward.
    pub fn sync_from<'a>(&mut self, records: impl IntoIterator<Item = &'a InventoryRecord>) {
        for record in records {
            let category = record.product().category();
            let location = record.location();

            if !self.category_aisles.contains_key(category) {
                self.category_aisles.insert(category.to_string(), location.aisle);
                self.next_aisle = self.next_aisle.max(location.aisle.saturating_add(1));
            }

            self.product_shelves
                .entry((category.to_string(), record.code().clone()))
                .or_insert(location.shelf);

            let counter = self.shelf_counters.entry(category.to_string()).or_insert(0);
            *counter = (*counter).max(location.shelf);
        }
    }

    pub fn aisle_of(&self, category: &str) -> Option<u32> {
        self.category_aisles.get(category).copied()
    }
}
