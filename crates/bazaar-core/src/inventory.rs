//! # Inventory Distributor
//!
//! Plans a starting stock quantity for every (product, branch) pair so that
//! each branch's inventory value at cost lands near a target.
//!
//! ## Planning One Branch
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  active products                                                        │
//! │        │                                                                │
//! │        ├── primary branch:   stock everything                           │
//! │        └── secondary branch: stock a random 60-80% subset,              │
//! │                              the rest are recorded with quantity 0      │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  per_product_target = branch_target / products stocked                  │
//! │  base               = floor(per_product_target / cost)                  │
//! │  quantity           = clamp(base × U(0.8, 1.3), 5, 1000)                │
//! │                       → round to stocking unit → clamp again            │
//! │  reorder_level      = max(5, floor(quantity × U(0.2, 0.3)))             │
//! │  max_stock_level    = floor(quantity × U(1.5, 2.0))                     │
//! │  location           = aisle A-H × rack 01-12, unique until exhausted    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;
use std::ops::Range;

use chrono::{DateTime, Utc};
use rand::seq::{index, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::Money;
use crate::types::{Branch, BranchStock, Product};

pub const MIN_STOCK_QUANTITY: i64 = 5;
pub const MAX_STOCK_QUANTITY: i64 = 1000;

/// Floor for reorder levels.
pub const MIN_REORDER_LEVEL: i64 = 5;

const AISLES: &[char] = &['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H'];
const RACKS_PER_AISLE: u32 = 12;

// =============================================================================
// Quantity Rules
// =============================================================================

/// Units that a per-product value target buys at cost.
///
/// A product without a positive cost gets the maximum quantity.
///
/// ```rust
/// use bazaar_core::inventory::base_quantity;
/// use bazaar_core::money::Money;
///
/// assert_eq!(base_quantity(Money::from_rupees(1000), Money::from_rupees(15)), 66);
/// ```
pub fn base_quantity(per_product_target: Money, cost: Money) -> i64 {
    if !cost.is_positive() {
        return MAX_STOCK_QUANTITY;
    }
    per_product_target.paise().max(0) / cost.paise()
}

/// Rounds a quantity to the stocking unit implied by the cost.
///
/// ```text
/// cost < ₹20   → nearest 10
/// cost < ₹100  → nearest 5
/// otherwise    → unchanged
/// ```
pub fn round_stock_unit(quantity: i64, cost: Money) -> i64 {
    let unit = if cost < Money::from_rupees(20) {
        10
    } else if cost < Money::from_rupees(100) {
        5
    } else {
        1
    };
    ((quantity + unit / 2) / unit) * unit
}

/// Final planned quantity for a base and a variance factor.
pub fn planned_quantity(base: i64, variance: f64, cost: Money) -> i64 {
    let scaled = (base as f64 * variance).floor() as i64;
    let clamped = scaled.clamp(MIN_STOCK_QUANTITY, MAX_STOCK_QUANTITY);
    round_stock_unit(clamped, cost).clamp(MIN_STOCK_QUANTITY, MAX_STOCK_QUANTITY)
}

/// Reorder threshold for a planned quantity.
pub fn reorder_level(quantity: i64, factor: f64) -> i64 {
    ((quantity as f64 * factor).floor() as i64).max(MIN_REORDER_LEVEL)
}

/// Maximum stock level for a planned quantity.
pub fn max_stock_level(quantity: i64, factor: f64) -> i64 {
    (quantity as f64 * factor).floor() as i64
}

// =============================================================================
// Location Pool
// =============================================================================

/// Shelf locations for one branch.
///
/// Hands out each code once; after the pool runs dry codes are reused.
#[derive(Debug, Clone)]
pub struct LocationPool {
    all: Vec<String>,
    free: Vec<String>,
}

impl Default for LocationPool {
    fn default() -> Self {
        let all: Vec<String> = AISLES
            .iter()
            .flat_map(|aisle| (1..=RACKS_PER_AISLE).map(move |rack| format!("{aisle}-{rack:02}")))
            .collect();
        LocationPool {
            free: all.clone(),
            all,
        }
    }
}

impl LocationPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct codes.
    pub fn capacity(&self) -> usize {
        self.all.len()
    }

    pub fn remaining(&self) -> usize {
        self.free.len()
    }

    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> String {
        if self.free.is_empty() {
            return self.all.choose(rng).cloned().unwrap_or_default();
        }
        let idx = rng.gen_range(0..self.free.len());
        self.free.swap_remove(idx)
    }
}

// =============================================================================
// Plans
// =============================================================================

/// Planned stock record for one product at one branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockPlan {
    pub product_id: String,
    pub branch_id: String,
    /// Zero when the branch does not carry the product.
    pub quantity: i64,
    pub reorder_level: i64,
    pub max_stock_level: i64,
    pub location: String,
}

impl StockPlan {
    pub fn is_stocked(&self) -> bool {
        self.quantity > 0
    }

    /// Converts the plan into a stock record restocked at `at`.
    pub fn to_branch_stock(&self, at: DateTime<Utc>) -> BranchStock {
        BranchStock {
            id: Uuid::new_v4().to_string(),
            product_id: self.product_id.clone(),
            branch_id: self.branch_id.clone(),
            quantity: self.quantity,
            reorder_level: self.reorder_level,
            max_stock_level: self.max_stock_level,
            reserved_quantity: 0,
            location: Some(self.location.clone()),
            last_restocked: self.is_stocked().then_some(at),
        }
    }
}

/// Outcome of planning one branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub branch_id: String,
    pub branch_code: String,
    pub products_stocked: usize,
    pub products_skipped: usize,
    pub total_units: i64,
    /// Σ cost × quantity.
    pub inventory_value: Money,
    pub target_value: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchPlan {
    pub stocks: Vec<StockPlan>,
    pub summary: DistributionSummary,
}

// =============================================================================
// Distributor
// =============================================================================

#[derive(Debug, Clone)]
pub struct InventoryDistributor {
    target_per_branch: Money,
    variance: Range<f64>,
    secondary_share: Range<f64>,
    reorder_factor: Range<f64>,
    max_factor: Range<f64>,
}

impl InventoryDistributor {
    pub fn new(target_per_branch: Money) -> Self {
        InventoryDistributor {
            target_per_branch,
            variance: 0.8..1.3,
            secondary_share: 0.6..0.8,
            reorder_factor: 0.2..0.3,
            max_factor: 1.5..2.0,
        }
    }

    pub fn target_per_branch(&self) -> Money {
        self.target_per_branch
    }

    /// Plans stock for every active product at one branch.
    pub fn plan_branch<R: Rng + ?Sized>(
        &self,
        branch: &Branch,
        products: &[Product],
        rng: &mut R,
    ) -> BranchPlan {
        let catalog: Vec<&Product> = products.iter().filter(|p| p.is_active).collect();
        let stocked = self.pick_assortment(branch, catalog.len(), rng);
        let per_product_target = self.target_per_branch.divide_by(stocked.len() as i64);

        let mut locations = LocationPool::new();
        let mut summary = DistributionSummary {
            branch_id: branch.id.clone(),
            branch_code: branch.code.clone(),
            products_stocked: 0,
            products_skipped: 0,
            total_units: 0,
            inventory_value: Money::zero(),
            target_value: self.target_per_branch,
        };

        let stocks = catalog
            .iter()
            .enumerate()
            .map(|(idx, product)| {
                let cost = product.cost_price();
                let planned = planned_quantity(
                    base_quantity(per_product_target, cost),
                    rng.gen_range(self.variance.clone()),
                    cost,
                );
                let quantity = if stocked.contains(&idx) {
                    summary.products_stocked += 1;
                    summary.total_units += planned;
                    summary.inventory_value += cost.multiply_quantity(planned);
                    planned
                } else {
                    summary.products_skipped += 1;
                    0
                };

                StockPlan {
                    product_id: product.id.clone(),
                    branch_id: branch.id.clone(),
                    quantity,
                    reorder_level: reorder_level(planned, rng.gen_range(self.reorder_factor.clone())),
                    max_stock_level: max_stock_level(planned, rng.gen_range(self.max_factor.clone())),
                    location: locations.draw(rng),
                }
            })
            .collect();

        BranchPlan { stocks, summary }
    }

    /// Indices of the catalog a branch carries.
    fn pick_assortment<R: Rng + ?Sized>(
        &self,
        branch: &Branch,
        catalog_len: usize,
        rng: &mut R,
    ) -> HashSet<usize> {
        if branch.is_primary || catalog_len == 0 {
            return (0..catalog_len).collect();
        }
        let share = rng.gen_range(self.secondary_share.clone());
        let amount = ((catalog_len as f64 * share).round() as usize).clamp(1, catalog_len);
        index::sample(rng, catalog_len, amount).into_iter().collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn branch(is_primary: bool) -> Branch {
        Branch {
            id: if is_primary { "b-main" } else { "b-east" }.into(),
            code: if is_primary { "BLR-01" } else { "BLR-02" }.into(),
            name: "Branch".into(),
            address: "1 MG Road".into(),
            city: "Bengaluru".into(),
            phone: None,
            email: None,
            is_primary,
            tax_rate_bps: 1800,
            currency: "INR".into(),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn product(i: usize, cost_paise: i64) -> Product {
        let now = Utc::now();
        Product {
            id: format!("p{i}"),
            sku: format!("SKU-{i:03}"),
            barcode: None,
            name: format!("Product {i}"),
            category_id: "c1".into(),
            brand: None,
            unit: "pcs".into(),
            cost_price_paise: cost_paise,
            selling_price_paise: cost_paise + cost_paise / 4,
            mrp_paise: cost_paise + cost_paise / 3,
            gst_rate_bps: 500,
            is_active: true,
            created_at: now,
            updated_at: now,
            stock_by_branch: Vec::new(),
        }
    }

    #[test]
    fn test_base_quantity_for_cheap_product() {
        assert_eq!(base_quantity(Money::from_rupees(1000), Money::from_rupees(15)), 66);
        assert_eq!(base_quantity(Money::from_rupees(1000), Money::zero()), MAX_STOCK_QUANTITY);
    }

    #[test]
    fn test_cheap_product_rounds_to_tens() {
        let mut rng = StdRng::seed_from_u64(1);
        let distributor = InventoryDistributor::new(Money::from_rupees(1000));

        for _ in 0..50 {
            let plan = distributor.plan_branch(&branch(true), &[product(0, 1500)], &mut rng);
            let q = plan.stocks[0].quantity;
            assert_eq!(q % 10, 0, "quantity {q}");
            assert!((50..=90).contains(&q), "quantity {q}");
        }
    }

    #[test]
    fn test_round_stock_unit_tiers() {
        assert_eq!(round_stock_unit(66, Money::from_rupees(15)), 70);
        assert_eq!(round_stock_unit(64, Money::from_rupees(15)), 60);
        assert_eq!(round_stock_unit(62, Money::from_rupees(50)), 60);
        assert_eq!(round_stock_unit(63, Money::from_rupees(50)), 65);
        assert_eq!(round_stock_unit(63, Money::from_rupees(150)), 63);
    }

    #[test]
    fn test_planned_quantity_clamped() {
        assert_eq!(planned_quantity(0, 1.0, Money::from_rupees(500)), MIN_STOCK_QUANTITY);
        assert_eq!(planned_quantity(5_000, 1.3, Money::from_rupees(1)), MAX_STOCK_QUANTITY);
        // 2 × 0.8 → 1 → clamp 5 → nearest 10 → 10
        assert_eq!(planned_quantity(2, 0.8, Money::from_rupees(10)), 10);
    }

    #[test]
    fn test_levels_keep_reorder_below_max() {
        let mut rng = StdRng::seed_from_u64(3);
        let distributor = InventoryDistributor::new(Money::from_rupees(50_000));
        let products: Vec<Product> = (0..40).map(|i| product(i, 500 + i as i64 * 2_500)).collect();

        for b in [branch(true), branch(false)] {
            let plan = distributor.plan_branch(&b, &products, &mut rng);
            for stock in &plan.stocks {
                assert!(stock.quantity >= 0);
                assert!(stock.reorder_level >= MIN_REORDER_LEVEL);
                assert!(stock.reorder_level < stock.max_stock_level, "{stock:?}");
            }
        }
    }

    #[test]
    fn test_secondary_branch_stocks_a_subset() {
        let mut rng = StdRng::seed_from_u64(4);
        let distributor = InventoryDistributor::new(Money::from_rupees(100_000));
        let products: Vec<Product> = (0..100).map(|i| product(i, 4_000)).collect();

        let plan = distributor.plan_branch(&branch(false), &products, &mut rng);
        let s = &plan.summary;
        assert_eq!(plan.stocks.len(), 100);
        assert!((60..=80).contains(&s.products_stocked), "stocked {}", s.products_stocked);
        assert_eq!(s.products_stocked + s.products_skipped, 100);
        assert_eq!(
            plan.stocks.iter().filter(|p| p.is_stocked()).count(),
            s.products_stocked
        );

        let primary = distributor.plan_branch(&branch(true), &products, &mut rng);
        assert_eq!(primary.summary.products_skipped, 0);
    }

    #[test]
    fn test_summary_value_near_target() {
        let mut rng = StdRng::seed_from_u64(5);
        let target = Money::from_rupees(200_000);
        let distributor = InventoryDistributor::new(target);
        let products: Vec<Product> = (0..50).map(|i| product(i, 20_000 + i as i64 * 1_000)).collect();

        let plan = distributor.plan_branch(&branch(true), &products, &mut rng);
        let value = plan.summary.inventory_value;
        assert!(value > Money::from_rupees(140_000) && value < Money::from_rupees(280_000), "{value}");
    }

    #[test]
    fn test_locations_unique_until_exhausted() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut pool = LocationPool::new();
        assert_eq!(pool.capacity(), 96);

        let drawn: HashSet<String> = (0..96).map(|_| pool.draw(&mut rng)).collect();
        assert_eq!(drawn.len(), 96);
        assert_eq!(pool.remaining(), 0);
        assert!(drawn.contains(&pool.draw(&mut rng)));
    }

    #[test]
    fn test_to_branch_stock() {
        let plan = StockPlan {
            product_id: "p1".into(),
            branch_id: "b1".into(),
            quantity: 0,
            reorder_level: 5,
            max_stock_level: 15,
            location: "A-01".into(),
        };
        let stock = plan.to_branch_stock(Utc::now());
        assert!(stock.last_restocked.is_none());
        assert_eq!(stock.location.as_deref(), Some("A-01"));
    }
}
