//! Purchases vs. sales per product.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Money};
use stockroom_inventory::{Direction, Movement};
use stockroom_products::ProductCode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryLine {
    pub code: String,
    pub name: String,
    pub inbound_qty: i64,
    /// List price x quantity.
    pub inbound_cost: Money,
    pub outbound_qty: i64,
    /// Marked-up price x quantity.
    pub outbound_cost: Money,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalesSummary {
    lines: BTreeMap<ProductCode, SummaryLine>,
}

impl SalesSummary {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, code: &ProductCode) -> Option<&SummaryLine> {
        self.lines.get(code)
    }

    /// Lines in product-code order.
    pub fn lines(&self) -> impl Iterator<Item = &SummaryLine> {
        self.lines.values()
    }
}

/// Group `movements` by product code, optionally keeping only `only`.
///
/// Fails if a cost total overflows.
pub fn summarize<'a>(
    movements: impl IntoIterator<Item = &'a Movement>,
    only: Option<&ProductCode>,
) -> DomainResult<SalesSummary> {
    let mut summary = SalesSummary::default();

    for m in movements {
        if only.is_some_and(|code| code != m.code()) {
            continue;
        }

        let line = summary
            .lines
            .entry(m.code().clone())
            .or_insert_with(|| SummaryLine {
                code: m.code().to_string(),
                name: m.product().name.clone(),
                inbound_qty: 0,
                inbound_cost: Money::ZERO,
                outbound_qty: 0,
                outbound_cost: Money::ZERO,
            });

        match m.direction() {
            Direction::In => {
                let cost = line_cost(m.product().list_price, m.amount())?;
                line.inbound_qty += m.amount();
                line.inbound_cost = add_cost(line.inbound_cost, cost)?;
            }
            Direction::Out => {
                let cost = line_cost(m.final_price(), m.amount())?;
                line.outbound_qty += m.amount();
                line.outbound_cost = add_cost(line.outbound_cost, cost)?;
            }
        }
    }

    Ok(summary)
}

fn line_cost(price: Money, amount: i64) -> DomainResult<Money> {
    let quantity = u64::try_from(amount)
        .map_err(|_| DomainError::validation("movement amount must be positive"))?;
    price
        .checked_mul(quantity)
        .ok_or_else(|| DomainError::invariant("sales summary cost overflow"))
}

fn add_cost(total: Money, cost: Money) -> DomainResult<Money> {
    total
        .checked_add(cost)
        .ok_or_else(|| DomainError::invariant("sales summary cost overflow"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;
    use stockroom_parties::Actor;
    use stockroom_products::{Product, ProductState};

    fn product(code: &str, cents: u64) -> Product {
        Product::new(
            ProductCode::new(code).unwrap(),
            format!("Name {code}"),
            "General",
            Money::from_cents(cents),
            ProductState::condition("new"),
        )
        .unwrap()
    }

    #[test]
    fn groups_inbound_and_outbound_per_code() {
        let supplier = Actor::supplier("Acme", "555").unwrap();
        let customer = Actor::customer("Ana", "1").unwrap();
        let a = product("A", 1000);
        let b = product("B", 200);
        let movements = vec![
            Movement::record(&a, 10, &supplier, "r", Utc::now(), 8).unwrap(),
            Movement::record(&a, 2, &customer, "s", Utc::now(), 8).unwrap(),
            Movement::record(&b, 5, &supplier, "r", Utc::now(), 8).unwrap(),
        ];

        let summary = summarize(&movements, None).unwrap();
        let line_a = summary.get(&ProductCode::new("A").unwrap()).unwrap();
        assert_eq!(line_a.inbound_qty, 10);
        assert_eq!(line_a.inbound_cost, Money::from_units(100));
        assert_eq!(line_a.outbound_qty, 2);
        assert_eq!(line_a.outbound_cost, Money::from_cents(2160));
        assert_eq!(summary.lines().count(), 2);

        let only_b = summarize(&movements, Some(&ProductCode::new("B").unwrap())).unwrap();
        assert_eq!(only_b.lines().count(), 1);
        assert_eq!(only_b.lines().next().unwrap().inbound_cost, Money::from_units(10));
    }

    #[test]
    fn empty_input_gives_empty_summary() {
        let none: Vec<Movement> = Vec::new();
        assert!(summarize(&none, None).unwrap().is_empty());
    }

    #[test]
    fn cost_overflow_is_an_error() {
        let supplier = Actor::supplier("Acme", "555").unwrap();
        let pricey = product("BIG", u64::MAX / 2);
        let movements = vec![
            Movement::record(&pricey, 1, &supplier, "r", Utc::now(), 0).unwrap(),
            Movement::record(&pricey, 1, &supplier, "r", Utc::now(), 0).unwrap(),
        ];
        assert!(summarize(&movements, None).is_ok());

        let three = vec![Movement::record(&pricey, 3, &supplier, "r", Utc::now(), 0).unwrap()];
        assert!(matches!(
            summarize(&three, None),
            Err(DomainError::InvariantViolation(_))
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Property: per-direction quantities add up to the movements'
        /// amounts, whatever the interleaving.
        #[test]
        fn quantities_add_up(steps in prop::collection::vec((any::<bool>(), 1i64..100), 0..30)) {
            let supplier = Actor::supplier("Acme", "555").unwrap();
            let customer = Actor::customer("Ana", "1").unwrap();
            let p = product("P", 150);

            let movements: Vec<Movement> = steps
                .iter()
                .map(|&(inbound, amount)| {
                    let actor = if inbound { &supplier } else { &customer };
                    Movement::record(&p, amount, actor, "x", Utc::now(), 8).unwrap()
                })
                .collect();

            let summary = summarize(&movements, None).unwrap();
            let expected_in: i64 = steps.iter().filter(|s| s.0).map(|s| s.1).sum();
            let expected_out: i64 = steps.iter().filter(|s| !s.0).map(|s| s.1).sum();

            match summary.get(&ProductCode::new("P").unwrap()) {
                Some(line) => {
                    prop_assert_eq!(line.inbound_qty, expected_in);
                    prop_assert_eq!(line.outbound_qty, expected_out);
                    prop_assert_eq!(line.inbound_cost, Money::from_cents(150 * expected_in as u64));
                    prop_assert_eq!(line.outbound_cost, Money::from_cents(162 * expected_out as u64));
                }
                None => prop_assert!(steps.is_empty()),
            }
        }
    }
}
