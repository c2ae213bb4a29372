//! # Sale Transaction Builder
//!
//! Builds one arithmetically valid sale from a branch's stocked products,
//! an optional customer and a cashier.
//!
//! ## Build Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  customers ──choose──► customer (or walk-in when the list is empty)     │
//! │                              │                                          │
//! │                              ▼                                          │
//! │                      BuyerProfile (by group)                            │
//! │                      item count, quantity cap                           │
//! │                              │                                          │
//! │  branch products ──shuffle──►│──► take item_count                       │
//! │                              │    skip zero stock                       │
//! │                              │    qty ∈ [1, min(stock, cap)]            │
//! │                              ▼                                          │
//! │                      LineAmounts per line ──► SaleTotals                │
//! │                              │                                          │
//! │                              ▼                                          │
//! │                      PaymentMix::draw ──► settle ──► SaleDraft          │
//! │                                                                         │
//! │  No surviving line? ──► None (caller skips the attempt)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::Money;
use crate::numbering::SaleNumbers;
use crate::payment::{settle, PaymentMix, Tender};
use crate::pricing::{LineAmounts, SaleTotals};
use crate::types::{Customer, CustomerGroup, Product, Rate, Sale, SaleItem, SaleStatus};

// =============================================================================
// Inputs
// =============================================================================

/// A product as the builder sees it at one branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockedProduct {
    pub product_id: String,
    pub sku: String,
    pub name: String,
    pub unit_price: Money,
    pub cost_price: Money,
    pub gst_rate: Rate,
    /// Units on hand at the branch.
    pub available: i64,
}

impl StockedProduct {
    pub fn from_product(product: &Product, branch_id: &str) -> Self {
        StockedProduct {
            product_id: product.id.clone(),
            sku: product.sku.clone(),
            name: product.name.clone(),
            unit_price: product.selling_price(),
            cost_price: product.cost_price(),
            gst_rate: product.gst_rate(),
            available: product.quantity_at(branch_id),
        }
    }

    /// Active products carried by a branch (a stock record exists).
    pub fn for_branch(products: &[Product], branch_id: &str) -> Vec<Self> {
        products
            .iter()
            .filter(|p| p.is_active && p.stock_at(branch_id).is_some())
            .map(|p| StockedProduct::from_product(p, branch_id))
            .collect()
    }
}

/// Basket shape for a customer group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuyerProfile {
    pub item_count: RangeInclusive<usize>,
    pub quantity_cap: i64,
    pub discount_eligible: bool,
}

impl BuyerProfile {
    /// Profile for a customer group; walk-ins shop like retail customers.
    ///
    /// ```text
    /// VIP      8-20 items, ≤15 units per line, discount eligible
    /// Regular  5-12 items, ≤10 units per line
    /// Retail   2-8 items,  ≤5 units per line
    /// ```
    pub fn for_group(group: Option<CustomerGroup>) -> Self {
        match group {
            Some(CustomerGroup::Vip) => BuyerProfile {
                item_count: 8..=20,
                quantity_cap: 15,
                discount_eligible: true,
            },
            Some(CustomerGroup::Regular) => BuyerProfile {
                item_count: 5..=12,
                quantity_cap: 10,
                discount_eligible: false,
            },
            Some(CustomerGroup::Retail) | None => BuyerProfile {
                item_count: 2..=8,
                quantity_cap: 5,
                discount_eligible: false,
            },
        }
    }
}

/// Everything the builder needs for one attempt.
#[derive(Debug, Clone, Copy)]
pub struct SaleContext<'a> {
    pub branch_id: &'a str,
    pub cashier_id: &'a str,
    pub products: &'a [StockedProduct],
    pub customers: &'a [Customer],
    pub at: DateTime<Utc>,
}

// =============================================================================
// Output
// =============================================================================

/// One computed line of a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftLine {
    pub product_id: String,
    pub sku: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub cost_price: Money,
    pub discount: Rate,
    pub gst_rate: Rate,
    pub amounts: LineAmounts,
}

/// A fully computed sale, not yet numbered or persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleDraft {
    pub branch_id: String,
    pub customer_id: Option<String>,
    pub customer_group: Option<CustomerGroup>,
    pub cashier_id: String,
    pub created_at: DateTime<Utc>,
    /// Sale-wide discount applied to every line.
    pub discount: Rate,
    pub lines: Vec<DraftLine>,
    pub totals: SaleTotals,
    pub tender: Tender,
}

impl SaleDraft {
    /// Assigns ids and numbers, producing the persistable sale.
    pub fn to_sale(&self, numbers: SaleNumbers) -> Sale {
        let sale_id = Uuid::new_v4().to_string();

        let items = self
            .lines
            .iter()
            .enumerate()
            .map(|(position, line)| SaleItem {
                id: Uuid::new_v4().to_string(),
                sale_id: sale_id.clone(),
                position: position as i64,
                product_id: line.product_id.clone(),
                sku_snapshot: line.sku.clone(),
                name_snapshot: line.name.clone(),
                quantity: line.quantity,
                unit_price_paise: line.unit_price.paise(),
                cost_price_paise: line.cost_price.paise(),
                discount_bps: line.discount.bps(),
                discount_amount_paise: line.amounts.discount_amount.paise(),
                tax_rate_bps: line.gst_rate.bps(),
                tax_amount_paise: line.amounts.tax_amount.paise(),
                line_total_paise: line.amounts.line_total.paise(),
            })
            .collect();

        Sale {
            id: sale_id,
            sale_number: numbers.sale_number,
            invoice_number: numbers.invoice_number,
            branch_id: self.branch_id.clone(),
            customer_id: self.customer_id.clone(),
            status: SaleStatus::Completed,
            subtotal_paise: self.totals.subtotal.paise(),
            total_discount_paise: self.totals.total_discount.paise(),
            total_tax_paise: self.totals.total_tax.paise(),
            total_paise: self.totals.total.paise(),
            payment_method: self.tender.method,
            payment_reference: Some(self.tender.reference.clone()),
            amount_paid_paise: self.tender.amount_paid.paise(),
            change_amount_paise: self.tender.change.paise(),
            created_by: self.cashier_id.clone(),
            created_at: self.created_at,
            items,
        }
    }
}

/// Decrements the in-memory stock view by the units a draft sells.
pub fn apply_to_stock(products: &mut [StockedProduct], draft: &SaleDraft) {
    for line in &draft.lines {
        if let Some(p) = products.iter_mut().find(|p| p.product_id == line.product_id) {
            p.available = (p.available - line.quantity).max(0);
        }
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Generates sale drafts.
#[derive(Debug, Clone)]
pub struct SaleBuilder {
    payment_mix: PaymentMix,
    /// Share of VIP sales that receive a discount.
    vip_discount_chance: f64,
    /// Whole-percent discount range for discounted VIP sales.
    vip_discount_percent: RangeInclusive<u32>,
}

impl Default for SaleBuilder {
    fn default() -> Self {
        SaleBuilder {
            payment_mix: PaymentMix::default(),
            vip_discount_chance: 0.15,
            vip_discount_percent: 5..=15,
        }
    }
}

impl SaleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn payment_mix(mut self, mix: PaymentMix) -> Self {
        self.payment_mix = mix;
        self
    }

    /// Sets the VIP discount probability (clamped into [0, 1]; NaN and
    /// infinities disable the discount).
    pub fn vip_discount_chance(mut self, chance: f64) -> Self {
        self.vip_discount_chance = if chance.is_finite() {
            chance.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self
    }

    /// Builds one sale, or `None` when every picked product is out of stock.
    pub fn build<R: Rng + ?Sized>(&self, ctx: &SaleContext<'_>, rng: &mut R) -> Option<SaleDraft> {
        if ctx.products.is_empty() {
            return None;
        }

        let customer = ctx.customers.choose(rng);
        let group = customer.map(|c| c.customer_group);
        let profile = BuyerProfile::for_group(group);

        let item_count = rng.gen_range(profile.item_count.clone());
        let discount = if profile.discount_eligible && rng.gen_bool(self.vip_discount_chance) {
            Rate::from_percent(rng.gen_range(self.vip_discount_percent.clone()))
        } else {
            Rate::zero()
        };

        let mut picks: Vec<&StockedProduct> = ctx.products.iter().collect();
        picks.shuffle(rng);

        let lines: Vec<DraftLine> = picks
            .into_iter()
            .take(item_count)
            .filter(|p| p.available > 0)
            .map(|p| {
                let cap = p.available.min(profile.quantity_cap);
                let quantity = rng.gen_range(1..=cap);
                DraftLine {
                    product_id: p.product_id.clone(),
                    sku: p.sku.clone(),
                    name: p.name.clone(),
                    quantity,
                    unit_price: p.unit_price,
                    cost_price: p.cost_price,
                    discount,
                    gst_rate: p.gst_rate,
                    amounts: LineAmounts::compute(p.unit_price, quantity, discount, p.gst_rate),
                }
            })
            .collect();

        if lines.is_empty() {
            return None;
        }

        let totals = SaleTotals::from_lines(lines.iter().map(|l| &l.amounts));
        let method = self.payment_mix.draw(rng);
        let tender = settle(method, totals.total, ctx.at, rng);

        Some(SaleDraft {
            branch_id: ctx.branch_id.to_string(),
            customer_id: customer.map(|c| c.id.clone()),
            customer_group: group,
            cashier_id: ctx.cashier_id.to_string(),
            created_at: ctx.at,
            discount,
            lines,
            totals,
            tender,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
