//! Payment capability.
//!
//! A bill is paid through any [`PaymentMethod`]. Cash is settled locally;
//! cards are authorised by a [`CardGateway`], so a real processor can be
//! plugged in at the boundary.

use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Money};

/// Result of presenting a total to a payment method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Accepted {
        change: Money,
    },
    Declined {
        reason: String,
        shortfall: Option<Money>,
    },
}

/// What a committed bill remembers about how it was paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum PaymentRecord {
    Cash { cash_given: Money },
    Card { card_number: String },
}

impl PaymentRecord {
    pub fn method(&self) -> &'static str {
        match self {
            PaymentRecord::Cash { .. } => "Cash",
            PaymentRecord::Card { .. } => "Card",
        }
    }
}

impl core::fmt::Display for PaymentRecord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PaymentRecord::Cash { cash_given } => write!(f, "Cash - Given: ${cash_given}"),
            PaymentRecord::Card { card_number } => write!(f, "Card - {card_number}"),
        }
    }
}

pub trait PaymentMethod {
    fn pay(&self, total: Money) -> PaymentOutcome;

    fn record(&self) -> PaymentRecord;
}

/// Cash handed over at the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cash {
    cash_given: Money,
}

impl Cash {
    pub fn new(cash_given: Money) -> Self {
        Self { cash_given }
    }

    pub fn cash_given(&self) -> Money {
        self.cash_given
    }
}

impl PaymentMethod for Cash {
    fn pay(&self, total: Money) -> PaymentOutcome {
        if self.cash_given >= total {
            PaymentOutcome::Accepted {
                change: self.cash_given.saturating_sub(total),
            }
        } else {
            let missing = total.saturating_sub(self.cash_given);
            PaymentOutcome::Declined {
                reason: format!("insufficient cash, missing {missing}"),
                shortfall: Some(missing),
            }
        }
    }

    fn record(&self) -> PaymentRecord {
        PaymentRecord::Cash {
            cash_given: self.cash_given,
        }
    }
}

/// Card authorisation backend.
pub trait CardGateway: core::fmt::Debug {
    /// Authorise `amount` on the card ending in `last4`.
    fn authorize(&self, last4: &str, amount: Money) -> Result<(), String>;
}

/// Gateway that approves every charge. There is no real processor behind it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApprovingGateway;

impl CardGateway for ApprovingGateway {
    fn authorize(&self, _last4: &str, _amount: Money) -> Result<(), String> {
        Ok(())
    }
}

/// Gateway that declines every charge with a fixed reason.
#[derive(Debug, Clone)]
pub struct DecliningGateway {
    reason: String,
}

impl DecliningGateway {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl CardGateway for DecliningGateway {
    fn authorize(&self, _last4: &str, _amount: Money) -> Result<(), String> {
        Err(self.reason.clone())
    }
}

/// Card payment. Only the last four digits ever leave this type.
#[derive(Debug, Clone)]
pub struct Card<G: CardGateway = ApprovingGateway> {
    number: String,
    gateway: G,
}

impl Card<ApprovingGateway> {
    pub fn new(number: impl Into<String>) -> DomainResult<Self> {
        Self::with_gateway(number, ApprovingGateway)
    }
}

impl<G: CardGateway> Card<G> {
    pub fn with_gateway(number: impl Into<String>, gateway: G) -> DomainResult<Self> {
        let number: String = number.into().chars().filter(|c| !c.is_whitespace()).collect();
        if number.chars().count() < 4 {
            return Err(DomainError::validation(
                "card number must have at least 4 characters",
            ));
        }
        Ok(Self { number, gateway })
    }

    pub fn last4(&self) -> &str {
        let start = self
            .number
            .char_indices()
            .rev()
            .nth(3)
            .map(|(i, _)| i)
            .unwrap_or(0);
        &self.number[start..]
    }

    pub fn masked(&self) -> String {
        format!("**** **** **** {}", self.last4())
    }
}

impl<G: CardGateway> PaymentMethod for Card<G> {
    fn pay(&self, total: Money) -> PaymentOutcome {
        match self.gateway.authorize(self.last4(), total) {
            Ok(()) => PaymentOutcome::Accepted {
                change: Money::ZERO,
            },
            Err(reason) => PaymentOutcome::Declined {
                reason: format!("card ending in {} declined: {reason}", self.last4()),
                shortfall: None,
            },
        }
    }

    fn record(&self) -> PaymentRecord {
        PaymentRecord::Card {
            card_number: self.masked(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cash_reports_change() {
        let outcome = Cash::new(Money::from_units(40)).pay(Money::from_units(35));
        assert_eq!(
            outcome,
            PaymentOutcome::Accepted {
                change: Money::from_units(5)
            }
        );
    }

    #[test]
    fn exact_cash_is_enough() {
        let outcome = Cash::new(Money::from_units(35)).pay(Money::from_units(35));
        assert_eq!(outcome, PaymentOutcome::Accepted { change: Money::ZERO });
    }

    #[test]
    fn cash_reports_shortfall() {
        match Cash::new(Money::from_units(30)).pay(Money::from_units(35)) {
            PaymentOutcome::Declined { shortfall, reason } => {
                assert_eq!(shortfall, Some(Money::from_units(5)));
                assert!(reason.contains("5.00"));
            }
            other => panic!("Expected Declined, got {other:?}"),
        }
    }

    #[test]
    fn card_is_masked_and_approved_by_default() {
        let card = Card::new("4111 1111 1111 1234").unwrap();
        assert_eq!(card.last4(), "1234");
        assert_eq!(
            card.record(),
            PaymentRecord::Card {
                card_number: "**** **** **** 1234".to_string()
            }
        );
        assert!(matches!(card.pay(Money::from_units(99)), PaymentOutcome::Accepted { .. }));
    }

    #[test]
    fn declining_gateway_declines() {
        let card = Card::with_gateway("4000000000000002", DecliningGateway::new("do not honor")).unwrap();
        match card.pay(Money::from_units(1)) {
            PaymentOutcome::Declined { reason, shortfall } => {
                assert!(reason.contains("0002"));
                assert!(reason.contains("do not honor"));
                assert_eq!(shortfall, None);
            }
            other => panic!("Expected Declined, got {other:?}"),
        }
    }

    #[test]
    fn short_card_numbers_are_rejected() {
        assert!(Card::new("123").is_err());
    }
}
