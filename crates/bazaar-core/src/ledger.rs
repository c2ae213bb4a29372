//! # Customer Ledger
//!
//! Cumulative purchase statistics and the loyalty tier derived from them.
//!
//! ## Tier Thresholds (total spent)
//! ```text
//! ≥ ₹1,00,000  → Platinum
//! ≥ ₹50,000    → Gold
//! ≥ ₹20,000    → Silver
//! otherwise    → Bronze
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{Customer, LoyaltyTier};

/// One loyalty point per this many rupees spent.
pub const RUPEES_PER_LOYALTY_POINT: i64 = 100;

impl LoyaltyTier {
    /// Tier for a cumulative spend.
    ///
    /// ```rust
    /// use bazaar_core::money::Money;
    /// use bazaar_core::types::LoyaltyTier;
    ///
    /// assert_eq!(LoyaltyTier::for_spend(Money::from_rupees(50_000)), LoyaltyTier::Gold);
    /// assert_eq!(LoyaltyTier::for_spend(Money::from_rupees(19_999)), LoyaltyTier::Bronze);
    /// ```
    pub fn for_spend(total_spent: Money) -> Self {
        let rupees = total_spent.rupees();
        if rupees >= 100_000 {
            LoyaltyTier::Platinum
        } else if rupees >= 50_000 {
            LoyaltyTier::Gold
        } else if rupees >= 20_000 {
            LoyaltyTier::Silver
        } else {
            LoyaltyTier::Bronze
        }
    }
}

/// Loyalty points earned by a purchase (whole points, rounded down).
pub fn loyalty_points_for(amount: Money) -> i64 {
    if !amount.is_positive() {
        return 0;
    }
    amount.rupees() / RUPEES_PER_LOYALTY_POINT
}

impl Customer {
    /// Records a completed purchase against the customer's stats.
    ///
    /// ## Effects
    /// - total_spent += amount, total_purchases += 1
    /// - average_order_value = total_spent / total_purchases
    /// - loyalty points earned, tier recomputed
    /// - last_purchase_at = at
    pub fn add_purchase(&mut self, amount: Money, at: DateTime<Utc>) {
        let total_spent = self.total_spent() + amount;

        self.total_spent_paise = total_spent.paise();
        self.total_purchases += 1;
        self.average_order_value_paise = total_spent.divide_by(self.total_purchases).paise();
        self.loyalty_points += loyalty_points_for(amount);
        self.loyalty_tier = LoyaltyTier::for_spend(total_spent);
        self.last_purchase_at = Some(at);
        self.updated_at = at;
    }
}

/// Stats recomputed from a customer's sale history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CustomerStats {
    pub total_spent: Money,
    pub total_purchases: i64,
}

impl CustomerStats {
    /// Folds sale totals into stats.
    pub fn from_sale_totals<I>(totals: I) -> Self
    where
        I: IntoIterator<Item = Money>,
    {
        totals
            .into_iter()
            .fold(CustomerStats::default(), |mut stats, total| {
                stats.total_spent += total;
                stats.total_purchases += 1;
                stats
            })
    }

    /// Adds one sale.
    pub fn record(&mut self, total: Money) {
        self.total_spent += total;
        self.total_purchases += 1;
    }

    pub fn average_order_value(&self) -> Money {
        self.total_spent.divide_by(self.total_purchases)
    }

    pub fn loyalty_tier(&self) -> LoyaltyTier {
        LoyaltyTier::for_spend(self.total_spent)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CustomerGroup;

    fn customer() -> Customer {
        let now = Utc::now();
        Customer {
            id: "c1".into(),
            customer_number: "CUST000001".into(),
            name: "Asha Rao".into(),
            phone: None,
            email: None,
            customer_group: CustomerGroup::Regular,
            total_spent_paise: 0,
            total_purchases: 0,
            average_order_value_paise: 0,
            loyalty_points: 0,
            loyalty_tier: LoyaltyTier::Bronze,
            credit_limit_paise: 0,
            current_balance_paise: 0,
            last_purchase_at: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_tier_thresholds() {
        assert_eq!(LoyaltyTier::for_spend(Money::from_rupees(100_000)), LoyaltyTier::Platinum);
        assert_eq!(LoyaltyTier::for_spend(Money::from_paise(9_999_999)), LoyaltyTier::Gold);
        assert_eq!(LoyaltyTier::for_spend(Money::from_rupees(20_000)), LoyaltyTier::Silver);
        assert_eq!(LoyaltyTier::for_spend(Money::zero()), LoyaltyTier::Bronze);
    }

    #[test]
    fn test_add_purchase_updates_stats() {
        let mut c = customer();
        let at = Utc::now();

        c.add_purchase(Money::from_rupees(15_000), at);
        c.add_purchase(Money::from_rupees(6_000), at);

        assert_eq!(c.total_spent(), Money::from_rupees(21_000));
        assert_eq!(c.total_purchases, 2);
        assert_eq!(c.average_order_value(), Money::from_rupees(10_500));
        assert_eq!(c.loyalty_points, 150 + 60);
        assert_eq!(c.loyalty_tier, LoyaltyTier::Silver);
        assert_eq!(c.last_purchase_at, Some(at));
    }

    #[test]
    fn test_points_round_down() {
        assert_eq!(loyalty_points_for(Money::from_paise(19_999)), 1);
        assert_eq!(loyalty_points_for(Money::from_rupees(99)), 0);
        assert_eq!(loyalty_points_for(Money::from_rupees(-500)), 0);
    }

    #[test]
    fn test_stats_from_sale_totals() {
        let stats = CustomerStats::from_sale_totals([
            Money::from_rupees(100),
            Money::from_rupees(300),
        ]);
        assert_eq!(stats.total_spent, Money::from_rupees(400));
        assert_eq!(stats.total_purchases, 2);
        assert_eq!(stats.average_order_value(), Money::from_rupees(200));
    }
}
