use std::collections::HashMap;

use stockroom_core::{BillId, DomainError, DomainResult, MovementId};

use crate::movement::{Movement, MovementKey};

/// Per-product quantity with bounds and the movements applied to it.
///
/// Invariant: `0 <= quantity <= maximum` and `0 <= minimum <= maximum`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stock {
    quantity: i64,
    minimum: i64,
    maximum: i64,
    history: Vec<Movement>,
}

impl Stock {
    /// Empty stock with the given limits.
    pub fn new(minimum: i64, maximum: i64) -> DomainResult<Self> {
        Self::check_limits(minimum, maximum)?;
        Ok(Self {
            quantity: 0,
            minimum,
            maximum,
            history: Vec::new(),
        })
    }

    /// Rebuild a stock from a snapshot. The history is trusted as-is; the
    /// quantity must satisfy the bounds.
    pub fn restore(
        quantity: i64,
        minimum: i64,
        maximum: i64,
        history: Vec<Movement>,
    ) -> DomainResult<Self> {
        Self::check_limits(minimum, maximum)?;
        if quantity < 0 || quantity > maximum {
            return Err(DomainError::invariant(format!(
                "stock quantity {quantity} is outside 0..={maximum}"
            )));
        }
        let mut stock = Self {
            quantity,
            minimum,
            maximum,
            history: Vec::new(),
        };
        stock.merge_history(history);
        Ok(stock)
    }

    pub fn current_quantity(&self) -> i64 {
        self.quantity
    }

    pub fn minimum(&self) -> i64 {
        self.minimum
    }

    pub fn maximum(&self) -> i64 {
        self.maximum
    }

    pub fn history(&self) -> &[Movement] {
        &self.history
    }

    /// Below the configured minimum.
    pub fn is_critical(&self) -> bool {
        self.quantity < self.minimum
    }

    pub fn is_valid_update(&self, delta: i64) -> bool {
        match self.quantity.checked_add(delta) {
            Some(next) => (0..=self.maximum).contains(&next),
            None => false,
        }
    }

    /// Apply `delta` and append `movement` to the history.
    ///
    /// On failure nothing changes: neither the quantity nor the history.
    pub fn apply(&mut self, delta: i64, movement: Movement) -> DomainResult<()> {
        if delta != movement.delta() {
            return Err(DomainError::invariant(format!(
                "delta {delta} does not match movement delta {}",
                movement.delta()
            )));
        }
        if !self.is_valid_update(delta) {
            return Err(DomainError::InvalidStockUpdate {
                current: self.quantity,
                delta,
                maximum: self.maximum,
            });
        }
        self.quantity += delta;
        self.history.push(movement);
        Ok(())
    }

    /// Replace both limits.
    ///
    /// Rejects negative or inverted limits, and a maximum below the current
    /// quantity.
    pub fn set_limits(&mut self, minimum: i64, maximum: i64) -> DomainResult<()> {
        Self::check_limits(minimum, maximum)?;
        if maximum < self.quantity {
            return Err(DomainError::invalid_limits(format!(
                "maximum {maximum} is below current stock {}",
                self.quantity
            )));
        }
        self.minimum = minimum;
        self.maximum = maximum;
        Ok(())
    }

    pub fn contains_key(&self, key: &MovementKey) -> bool {
        self.history.iter().any(|m| &m.key() == key)
    }

    /// Append movements missing from the history without touching the
    /// quantity. Keys are compared as a multiset, so a key already present
    /// `n` times absorbs up to `n` incoming copies. Returns how many were added.
    pub fn merge_history(&mut self, incoming: impl IntoIterator<Item = Movement>) -> usize {
        let mut present: HashMap<MovementKey, usize> = HashMap::new();
        for m in &self.history {
            *present.entry(m.key()).or_default() += 1;
        }

        let mut added = 0;
        for movement in incoming {
            let slot = present.entry(movement.key()).or_default();
            if *slot > 0 {
                *slot -= 1;
                continue;
            }
            self.history.push(movement);
            added += 1;
        }
        added
    }

    /// Link the history copy of `movement_id`, if this stock holds one.
    pub(crate) fn link_bill(
        &mut self,
        movement_id: MovementId,
        bill_id: BillId,
    ) -> DomainResult<()> {
        match self.history.iter_mut().find(|m| m.id_typed() == movement_id) {
            Some(m) => m.link_bill(bill_id),
            None => Ok(()),
        }
    }

    fn check_limits(minimum: i64, maximum: i64) -> DomainResult<()> {
        if minimum < 0 || maximum < 0 {
            return Err(DomainError::invalid_limits("stock limits cannot be negative"));
        }
        if minimum > maximum {
            return Err(DomainError::invalid_limits(format!(
                "minimum {minimum} cannot exceed maximum {maximum}"
            )));
        }
        Ok(())
    }
}
