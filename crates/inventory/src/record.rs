use stockroom_core::Entity;
use stockroom_products::{Product, ProductCode};

use crate::location::Location;
use crate::stock::Stock;

/// Product, stock and location of one product code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryRecord {
    product: Product,
    stock: Stock,
    location: Location,
}

impl InventoryRecord {
    pub fn new(product: Product, stock: Stock, location: Location) -> Self {
        Self {
            product,
            stock,
            location,
        }
    }

    pub fn code(&self) -> &ProductCode {
        self.product.code()
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn stock(&self) -> &Stock {
        &self.stock
    }

    pub(crate) fn stock_mut(&mut self) -> &mut Stock {
        &mut self.stock
    }

    pub fn location(&self) -> Location {
        self.location
    }
}

impl Entity for InventoryRecord {
    type Id = ProductCode;

    fn id(&self) -> &Self::Id {
        self.product.code()
    }
}
