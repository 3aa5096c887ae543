use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Entity, Money, ValueObject};

/// Product code (the product's identity across the whole system).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductCode(String);

impl ProductCode {
    pub fn new(code: impl Into<String>) -> DomainResult<Self> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(DomainError::validation("product code cannot be empty"));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ProductCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl core::str::FromStr for ProductCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Physical state of a product: a free-text condition or a best-before date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductState {
    Condition(String),
    Expiration(NaiveDate),
}

impl ValueObject for ProductState {}

impl ProductState {
    pub fn condition(text: impl Into<String>) -> Self {
        Self::Condition(text.into())
    }

    /// Build an expiration state from a `(year, month, day)` triple.
    pub fn expires_on(year: i32, month: u32, day: u32) -> DomainResult<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self::Expiration)
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "invalid expiration date {year:04}-{month:02}-{day:02}"
                ))
            })
    }

    /// Expired means the expiration date lies strictly before `today`.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        match self {
            ProductState::Condition(_) => false,
            ProductState::Expiration(date) => today > *date,
        }
    }
}

impl core::fmt::Display for ProductState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ProductState::Condition(text) => write!(f, "Condition: {text}"),
            ProductState::Expiration(date) => write!(f, "Expires: {}", date.format("%Y-%m-%d")),
        }
    }
}

/// A catalogue product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    code: ProductCode,
    name: String,
    category: String,
    /// List price (what suppliers are paid).
    price: Money,
    state: ProductState,
}

impl Product {
    pub fn new(
        code: ProductCode,
        name: impl Into<String>,
        category: impl Into<String>,
        price: Money,
        state: ProductState,
    ) -> DomainResult<Self> {
        let name = name.into();
        let category = category.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        if category.trim().is_empty() {
            return Err(DomainError::validation("product category cannot be empty"));
        }
        Ok(Self {
            code,
            name,
            category,
            price,
            state,
        })
    }

    pub fn code(&self) -> &ProductCode {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn state(&self) -> &ProductState {
        &self.state
    }
}

impl Entity for Product {
    type Id = ProductCode;

    fn id(&self) -> &Self::Id {
        &self.code
    }
}
