//! # Payment Settlement
//!
//! Chooses how a generated sale is paid and settles the tender.
//!
//! ## Settlement
//! ```text
//! total ──► PaymentMix::draw ──► method
//!              │
//!              ├── cash:     tendered = next note ≥ total (₹100/200/500/2000,
//!              │             then multiples of ₹500), change = tendered − total
//!              │
//!              └── non-cash: tendered = total, change = 0
//!
//! reference = {METHOD}{unix millis}{4 random digits}
//! ```

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::PaymentMethod;

/// Notes a customer plausibly hands over, in rupees, smallest first.
pub const CASH_DENOMINATIONS_RUPEES: [i64; 4] = [100, 200, 500, 2000];

/// Step used to round cash tender above the largest denomination.
const LARGE_TENDER_STEP_RUPEES: i64 = 500;

// =============================================================================
// Payment Mix
// =============================================================================

/// Relative weights for the payment method draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMix {
    pub cash: u32,
    pub card: u32,
    pub upi: u32,
    pub netbanking: u32,
}

impl Default for PaymentMix {
    /// Cash 15%, card 45%, UPI 35%, netbanking 5%.
    fn default() -> Self {
        PaymentMix {
            cash: 15,
            card: 45,
            upi: 35,
            netbanking: 5,
        }
    }
}

impl PaymentMix {
    /// Creates a mix, rejecting an all-zero weighting.
    pub fn new(cash: u32, card: u32, upi: u32, netbanking: u32) -> CoreResult<Self> {
        let mix = PaymentMix {
            cash,
            card,
            upi,
            netbanking,
        };
        if mix.total_weight() == 0 {
            return Err(CoreError::InvalidPaymentMix {
                reason: "weights must not all be zero".to_string(),
            });
        }
        Ok(mix)
    }

    fn total_weight(&self) -> u32 {
        self.cash + self.card + self.upi + self.netbanking
    }

    /// Draws a payment method proportionally to the weights.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> PaymentMethod {
        let total = self.total_weight();
        if total == 0 {
            return PaymentMethod::Cash;
        }

        let mut roll = rng.gen_range(0..total);
        for (method, weight) in [
            (PaymentMethod::Cash, self.cash),
            (PaymentMethod::Card, self.card),
            (PaymentMethod::Upi, self.upi),
            (PaymentMethod::Netbanking, self.netbanking),
        ] {
            if roll < weight {
                return method;
            }
            roll -= weight;
        }

        PaymentMethod::Netbanking
    }
}

// =============================================================================
// Tender
// =============================================================================

/// The settled payment of a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tender {
    pub method: PaymentMethod,
    pub reference: String,
    pub amount_paid: Money,
    pub change: Money,
}

/// Amount of cash handed over for a bill of `total`.
///
/// ```rust
/// use bazaar_core::money::Money;
/// use bazaar_core::payment::cash_tendered;
///
/// assert_eq!(cash_tendered(Money::from_rupees(180)), Money::from_rupees(200));
/// assert_eq!(cash_tendered(Money::from_rupees(2600)), Money::from_rupees(3000));
/// ```
pub fn cash_tendered(total: Money) -> Money {
    if !total.is_positive() {
        return total;
    }

    if let Some(note) = CASH_DENOMINATIONS_RUPEES
        .iter()
        .map(|r| Money::from_rupees(*r))
        .find(|note| *note >= total)
    {
        return note;
    }

    let step = Money::from_rupees(LARGE_TENDER_STEP_RUPEES).paise();
    let steps = (total.paise() + step - 1) / step;
    Money::from_paise(steps * step)
}

/// Synthesises an external payment reference.
pub fn payment_reference<R: Rng + ?Sized>(
    method: PaymentMethod,
    at: DateTime<Utc>,
    rng: &mut R,
) -> String {
    format!(
        "{}{}{:04}",
        method.code(),
        at.timestamp_millis(),
        rng.gen_range(0..10_000)
    )
}

/// Settles a bill with the given method.
pub fn settle<R: Rng + ?Sized>(
    method: PaymentMethod,
    total: Money,
    at: DateTime<Utc>,
    rng: &mut R,
) -> Tender {
    let amount_paid = match method {
        PaymentMethod::Cash => cash_tendered(total),
        _ => total,
    };

    Tender {
        method,
        reference: payment_reference(method, at, rng),
        amount_paid,
        change: amount_paid - total,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    #[test]
    fn test_cash_tender_for_180_gives_20_change() {
        let mut rng = StdRng::seed_from_u64(1);
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 10, 0, 0).unwrap();
        let tender = settle(PaymentMethod::Cash, Money::from_rupees(180), at, &mut rng);

        assert_eq!(tender.amount_paid, Money::from_rupees(200));
        assert_eq!(tender.change, Money::from_rupees(20));
    }

    #[test]
    fn test_cash_tendered_denominations() {
        assert_eq!(cash_tendered(Money::from_rupees(100)), Money::from_rupees(100));
        assert_eq!(cash_tendered(Money::from_paise(10_001)), Money::from_rupees(200));
        assert_eq!(cash_tendered(Money::from_rupees(450)), Money::from_rupees(500));
        assert_eq!(cash_tendered(Money::from_rupees(1999)), Money::from_rupees(2000));
        assert_eq!(cash_tendered(Money::from_rupees(2000)), Money::from_rupees(2000));
        assert_eq!(cash_tendered(Money::from_paise(250_001)), Money::from_rupees(3000));
        assert_eq!(cash_tendered(Money::from_rupees(4_100)), Money::from_rupees(4_500));
    }

    #[test]
    fn test_non_cash_has_no_change() {
        let mut rng = StdRng::seed_from_u64(2);
        let tender = settle(PaymentMethod::Upi, Money::from_paise(12_345), Utc::now(), &mut rng);
        assert_eq!(tender.amount_paid, Money::from_paise(12_345));
        assert!(tender.change.is_zero());
    }

    #[test]
    fn test_reference_format() {
        let mut rng = StdRng::seed_from_u64(3);
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 10, 0, 0).unwrap();
        let reference = payment_reference(PaymentMethod::Card, at, &mut rng);

        let prefix = format!("CARD{}", at.timestamp_millis());
        assert!(reference.starts_with(&prefix));
        assert_eq!(reference.len(), prefix.len() + 4);
        assert!(reference[prefix.len()..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_mix_draw_respects_weights() {
        let mut rng = StdRng::seed_from_u64(42);
        let mix = PaymentMix::default();
        let mut counts: HashMap<PaymentMethod, u32> = HashMap::new();
        for _ in 0..10_000 {
            *counts.entry(mix.draw(&mut rng)).or_default() += 1;
        }

        let card = counts[&PaymentMethod::Card];
        let netbanking = counts[&PaymentMethod::Netbanking];
        assert!((4000..5000).contains(&card), "card drawn {card} times");
        assert!((300..700).contains(&netbanking), "netbanking drawn {netbanking} times");
    }

    #[test]
    fn test_single_method_mix() {
        let mut rng = StdRng::seed_from_u64(9);
        let mix = PaymentMix::new(0, 0, 1, 0).unwrap();
        assert!((0..100).all(|_| mix.draw(&mut rng) == PaymentMethod::Upi));
    }

    #[test]
    fn test_zero_mix_rejected() {
        assert!(PaymentMix::new(0, 0, 0, 0).is_err());
    }
}
