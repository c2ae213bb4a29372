//! # Consistency Validator
//!
//! Recomputes what stored records should say and reports where they don't.
//! Read-only: nothing here mutates the dataset.
//!
//! ## Checks
//! ```text
//! ┌──────────────────────┬──────────┬──────────────────────────────────────┐
//! │ check                │ severity │ rule                                 │
//! ├──────────────────────┼──────────┼──────────────────────────────────────┤
//! │ sale_subtotal        │ failure  │ subtotal = Σ qty × unit_price        │
//! │ sale_discount        │ failure  │ total_discount = Σ discount_amount   │
//! │ sale_tax             │ failure  │ total_tax = Σ tax_amount             │
//! │ sale_total           │ failure  │ total = subtotal − discount + tax    │
//! │ line_tax             │ failure  │ tax = (item_total − discount) × gst  │
//! │ references           │ failure  │ branch/customer/product/cashier exist│
//! │ customer_aggregates  │ warning  │ spent/purchases match sale history   │
//! │ product_pricing      │ failure  │ selling > cost                       │
//! │ product_gst_rate     │ warning  │ gst = category gst                   │
//! │ stock_negative       │ failure  │ quantity ≥ 0                         │
//! │ stock_reorder        │ warning  │ quantity > reorder_level             │
//! │ stock_levels         │ warning  │ reorder_level < max_stock_level      │
//! └──────────────────────┴──────────┴──────────────────────────────────────┘
//! ```
//!
//! Amounts compare within [`TOLERANCE`]. Checks run in the order above and
//! findings within a check are sorted by subject, so re-running on the same
//! data yields the same report.
//!
//! Customer aggregates are expected to diverge for seeded customers; they
//! are reported as warnings and left alone.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::ledger::CustomerStats;
use crate::money::Money;
use crate::pricing::{LineAmounts, SaleTotals};
use crate::types::{Branch, Category, Customer, Product, Sale, SaleStatus, User};

/// Largest difference still considered equal: one paisa.
pub const TOLERANCE: Money = Money::from_paise(1);

// =============================================================================
// Report Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    SaleSubtotal,
    SaleDiscount,
    SaleTax,
    SaleTotal,
    LineTax,
    References,
    CustomerAggregates,
    ProductPricing,
    ProductGstRate,
    StockNegative,
    StockReorder,
    StockLevels,
}

impl CheckKind {
    pub const ALL: [CheckKind; 12] = [
        CheckKind::SaleSubtotal,
        CheckKind::SaleDiscount,
        CheckKind::SaleTax,
        CheckKind::SaleTotal,
        CheckKind::LineTax,
        CheckKind::References,
        CheckKind::CustomerAggregates,
        CheckKind::ProductPricing,
        CheckKind::ProductGstRate,
        CheckKind::StockNegative,
        CheckKind::StockReorder,
        CheckKind::StockLevels,
    ];

    pub const fn name(&self) -> &'static str {
        match self {
            CheckKind::SaleSubtotal => "sale_subtotal",
            CheckKind::SaleDiscount => "sale_discount",
            CheckKind::SaleTax => "sale_tax",
            CheckKind::SaleTotal => "sale_total",
            CheckKind::LineTax => "line_tax",
            CheckKind::References => "references",
            CheckKind::CustomerAggregates => "customer_aggregates",
            CheckKind::ProductPricing => "product_pricing",
            CheckKind::ProductGstRate => "product_gst_rate",
            CheckKind::StockNegative => "stock_negative",
            CheckKind::StockReorder => "stock_reorder",
            CheckKind::StockLevels => "stock_levels",
        }
    }

    pub const fn severity(&self) -> Severity {
        match self {
            CheckKind::CustomerAggregates
            | CheckKind::ProductGstRate
            | CheckKind::StockReorder
            | CheckKind::StockLevels => Severity::Warning,
            _ => Severity::Failure,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Failure,
}

/// One mismatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub check: CheckKind,
    pub severity: Severity,
    /// Business id of the offending record (sale number, sku, ...).
    pub subject: String,
    pub message: String,
    pub details: serde_json::Value,
}

impl Finding {
    fn new(check: CheckKind, subject: impl Into<String>, message: impl Into<String>, details: serde_json::Value) -> Self {
        Finding {
            check,
            severity: check.severity(),
            subject: subject.into(),
            message: message.into(),
            details,
        }
    }
}

/// A check that produced no findings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSummary {
    pub check: CheckKind,
    /// Records examined.
    pub examined: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub passed: Vec<CheckSummary>,
    pub warnings: Vec<Finding>,
    pub failed: Vec<Finding>,
}

impl ValidationReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    pub fn passed_count(&self) -> usize {
        self.passed.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    /// All findings of one check, warnings and failures alike.
    pub fn findings_for(&self, check: CheckKind) -> impl Iterator<Item = &Finding> {
        self.warnings
            .iter()
            .chain(self.failed.iter())
            .filter(move |f| f.check == check)
    }

    fn record(&mut self, check: CheckKind, examined: usize, mut findings: Vec<Finding>) {
        if findings.is_empty() {
            self.passed.push(CheckSummary { check, examined });
            return;
        }
        findings.sort_by(|a, b| a.subject.cmp(&b.subject));
        match check.severity() {
            Severity::Warning => self.warnings.extend(findings),
            Severity::Failure => self.failed.extend(findings),
        }
    }
}

// =============================================================================
// Dataset
// =============================================================================

/// Everything the validator reads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dataset<'a> {
    pub branches: &'a [Branch],
    pub categories: &'a [Category],
    pub products: &'a [Product],
    pub users: &'a [User],
    pub customers: &'a [Customer],
    /// Sales with their items loaded.
    pub sales: &'a [Sale],
}

/// Runs every check.
pub fn validate(data: &Dataset<'_>) -> ValidationReport {
    let mut report = ValidationReport::default();

    let stock_records = data.products.iter().map(|p| p.stock_by_branch.len()).sum();
    let line_count = data.sales.iter().map(|s| s.items.len()).sum();

    report.record(CheckKind::SaleSubtotal, data.sales.len(), check_sale_subtotals(data.sales));
    report.record(CheckKind::SaleDiscount, data.sales.len(), check_sale_discounts(data.sales));
    report.record(CheckKind::SaleTax, data.sales.len(), check_sale_taxes(data.sales));
    report.record(CheckKind::SaleTotal, data.sales.len(), check_sale_totals(data.sales));
    report.record(CheckKind::LineTax, line_count, check_line_taxes(data.sales));
    report.record(
        CheckKind::References,
        data.sales.len() + data.products.len(),
        check_references(data),
    );
    report.record(
        CheckKind::CustomerAggregates,
        data.customers.len(),
        check_customer_aggregates(data.customers, data.sales),
    );
    report.record(CheckKind::ProductPricing, data.products.len(), check_product_pricing(data.products));
    report.record(
        CheckKind::ProductGstRate,
        data.products.len(),
        check_product_gst_rates(data.products, data.categories),
    );
    report.record(CheckKind::StockNegative, stock_records, check_negative_stock(data));
    report.record(CheckKind::StockReorder, stock_records, check_reorder_levels(data));
    report.record(CheckKind::StockLevels, stock_records, check_stock_levels(data));

    report
}

fn money_details(expected: Money, actual: Money) -> serde_json::Value {
    json!({
        "expected_paise": expected.paise(),
        "actual_paise": actual.paise(),
        "difference_paise": (actual - expected).paise(),
    })
}

// =============================================================================
// Sale Arithmetic
// =============================================================================

pub fn check_sale_subtotals(sales: &[Sale]) -> Vec<Finding> {
    sales
        .iter()
        .filter_map(|sale| {
            let expected = SaleTotals::from_items(&sale.items).subtotal;
            (!sale.subtotal().approx_eq(expected, TOLERANCE)).then(|| {
                Finding::new(
                    CheckKind::SaleSubtotal,
                    &sale.sale_number,
                    format!("subtotal {} differs from line sum {}", sale.subtotal(), expected),
                    money_details(expected, sale.subtotal()),
                )
            })
        })
        .collect()
}

pub fn check_sale_discounts(sales: &[Sale]) -> Vec<Finding> {
    sales
        .iter()
        .filter_map(|sale| {
            let expected = SaleTotals::from_items(&sale.items).total_discount;
            (!sale.total_discount().approx_eq(expected, TOLERANCE)).then(|| {
                Finding::new(
                    CheckKind::SaleDiscount,
                    &sale.sale_number,
                    format!("total discount {} differs from line sum {}", sale.total_discount(), expected),
                    money_details(expected, sale.total_discount()),
                )
            })
        })
        .collect()
}

pub fn check_sale_taxes(sales: &[Sale]) -> Vec<Finding> {
    sales
        .iter()
        .filter_map(|sale| {
            let expected = SaleTotals::from_items(&sale.items).total_tax;
            (!sale.total_tax().approx_eq(expected, TOLERANCE)).then(|| {
                Finding::new(
                    CheckKind::SaleTax,
                    &sale.sale_number,
                    format!("total tax {} differs from line sum {}", sale.total_tax(), expected),
                    money_details(expected, sale.total_tax()),
                )
            })
        })
        .collect()
}

/// Compares the stored total with the stored aggregates.
pub fn check_sale_totals(sales: &[Sale]) -> Vec<Finding> {
    sales
        .iter()
        .filter_map(|sale| {
            let expected = sale.subtotal() - sale.total_discount() + sale.total_tax();
            (!sale.total().approx_eq(expected, TOLERANCE)).then(|| {
                Finding::new(
                    CheckKind::SaleTotal,
                    &sale.sale_number,
                    format!("total {} differs from subtotal - discount + tax = {}", sale.total(), expected),
                    money_details(expected, sale.total()),
                )
            })
        })
        .collect()
}

pub fn check_line_taxes(sales: &[Sale]) -> Vec<Finding> {
    sales
        .iter()
        .flat_map(|sale| {
            sale.items.iter().filter_map(move |item| {
                let expected = LineAmounts::expected_for(item).tax_amount;
                (!item.tax_amount().approx_eq(expected, TOLERANCE)).then(|| {
                    Finding::new(
                        CheckKind::LineTax,
                        format!("{}#{}", sale.sale_number, item.position),
                        format!("line tax {} for {} differs from {}", item.tax_amount(), item.sku_snapshot, expected),
                        json!({
                            "sku": item.sku_snapshot,
                            "tax_rate_bps": item.tax_rate_bps,
                            "expected_paise": expected.paise(),
                            "actual_paise": item.tax_amount_paise,
                        }),
                    )
                })
            })
        })
        .collect()
}

// =============================================================================
// References
// =============================================================================

pub fn check_references(data: &Dataset<'_>) -> Vec<Finding> {
    let branches: HashSet<&str> = data.branches.iter().map(|b| b.id.as_str()).collect();
    let categories: HashSet<&str> = data.categories.iter().map(|c| c.id.as_str()).collect();
    let products: HashSet<&str> = data.products.iter().map(|p| p.id.as_str()).collect();
    let users: HashSet<&str> = data.users.iter().map(|u| u.id.as_str()).collect();
    let customers: HashSet<&str> = data.customers.iter().map(|c| c.id.as_str()).collect();

    let mut findings = Vec::new();
    let mut missing = |subject: &str, field: &str, id: &str| {
        findings.push(Finding::new(
            CheckKind::References,
            subject,
            format!("{field} {id} does not exist"),
            json!({ "field": field, "id": id }),
        ));
    };

    for sale in data.sales {
        if !branches.contains(sale.branch_id.as_str()) {
            missing(&sale.sale_number, "branch_id", &sale.branch_id);
        }
        if !users.contains(sale.created_by.as_str()) {
            missing(&sale.sale_number, "created_by", &sale.created_by);
        }
        if let Some(customer_id) = &sale.customer_id {
            if !customers.contains(customer_id.as_str()) {
                missing(&sale.sale_number, "customer_id", customer_id);
            }
        }
        for item in &sale.items {
            if !products.contains(item.product_id.as_str()) {
                missing(&sale.sale_number, "product_id", &item.product_id);
            }
        }
    }

    for product in data.products {
        if !categories.contains(product.category_id.as_str()) {
            missing(&product.sku, "category_id", &product.category_id);
        }
        for stock in &product.stock_by_branch {
            if !branches.contains(stock.branch_id.as_str()) {
                missing(&product.sku, "branch_id", &stock.branch_id);
            }
        }
    }

    findings
}

// =============================================================================
// Customer Aggregates
// =============================================================================

/// Compares stored customer stats with completed sale history.
pub fn check_customer_aggregates(customers: &[Customer], sales: &[Sale]) -> Vec<Finding> {
    let mut history: HashMap<&str, CustomerStats> = HashMap::new();
    for sale in sales.iter().filter(|s| s.status == SaleStatus::Completed) {
        if let Some(customer_id) = &sale.customer_id {
            history.entry(customer_id.as_str()).or_default().record(sale.total());
        }
    }

    customers
        .iter()
        .filter_map(|customer| {
            let actual = history.get(customer.id.as_str()).copied().unwrap_or_default();
            let spent_matches = customer.total_spent().approx_eq(actual.total_spent, TOLERANCE);
            let count_matches = customer.total_purchases == actual.total_purchases;
            (!spent_matches || !count_matches).then(|| {
                Finding::new(
                    CheckKind::CustomerAggregates,
                    &customer.customer_number,
                    format!(
                        "stored {} over {} purchases, sales show {} over {}",
                        customer.total_spent(),
                        customer.total_purchases,
                        actual.total_spent,
                        actual.total_purchases
                    ),
                    json!({
                        "stored_total_spent_paise": customer.total_spent_paise,
                        "sales_total_spent_paise": actual.total_spent.paise(),
                        "stored_total_purchases": customer.total_purchases,
                        "sales_total_purchases": actual.total_purchases,
                    }),
                )
            })
        })
        .collect()
}

// =============================================================================
// Products
// =============================================================================

pub fn check_product_pricing(products: &[Product]) -> Vec<Finding> {
    products
        .iter()
        .filter(|p| p.selling_price() <= p.cost_price())
        .map(|p| {
            Finding::new(
                CheckKind::ProductPricing,
                &p.sku,
                format!("selling price {} is not above cost {}", p.selling_price(), p.cost_price()),
                json!({
                    "cost_price_paise": p.cost_price_paise,
                    "selling_price_paise": p.selling_price_paise,
                }),
            )
        })
        .collect()
}

pub fn check_product_gst_rates(products: &[Product], categories: &[Category]) -> Vec<Finding> {
    let by_id: HashMap<&str, &Category> = categories.iter().map(|c| (c.id.as_str(), c)).collect();

    products
        .iter()
        .filter_map(|p| {
            let category = by_id.get(p.category_id.as_str())?;
            (p.gst_rate() != category.gst_rate()).then(|| {
                Finding::new(
                    CheckKind::ProductGstRate,
                    &p.sku,
                    format!(
                        "GST {}% differs from category {} at {}%",
                        p.gst_rate().percentage(),
                        category.code,
                        category.gst_rate().percentage()
                    ),
                    json!({
                        "product_gst_bps": p.gst_rate_bps,
                        "category_gst_bps": category.gst_rate_bps,
                        "category": category.code,
                    }),
                )
            })
        })
        .collect()
}

// =============================================================================
// Branch Stock
// =============================================================================

/// Calls `f` for every stock record with a `sku@branch-code` subject.
fn stock_findings<F>(data: &Dataset<'_>, mut f: F) -> Vec<Finding>
where
    F: FnMut(String, &crate::types::BranchStock) -> Option<Finding>,
{
    let codes: HashMap<&str, &str> = data
        .branches
        .iter()
        .map(|b| (b.id.as_str(), b.code.as_str()))
        .collect();

    data.products
        .iter()
        .flat_map(|p| p.stock_by_branch.iter().map(move |s| (p, s)))
        .filter_map(|(p, s)| {
            let branch = codes.get(s.branch_id.as_str()).copied().unwrap_or(s.branch_id.as_str());
            f(format!("{}@{}", p.sku, branch), s)
        })
        .collect()
}

pub fn check_negative_stock(data: &Dataset<'_>) -> Vec<Finding> {
    stock_findings(data, |subject, s| {
        (s.quantity < 0).then(|| {
            Finding::new(
                CheckKind::StockNegative,
                subject,
                format!("negative quantity {}", s.quantity),
                json!({ "quantity": s.quantity }),
            )
        })
    })
}

/// Stocked records at or below their reorder level.
///
/// Records a branch does not carry (quantity 0 from distribution) are
/// flagged too: they are due for restocking like any other.
pub fn check_reorder_levels(data: &Dataset<'_>) -> Vec<Finding> {
    stock_findings(data, |subject, s| {
        (s.quantity >= 0 && s.is_below_reorder()).then(|| {
            Finding::new(
                CheckKind::StockReorder,
                subject,
                format!("quantity {} at or below reorder level {}", s.quantity, s.reorder_level),
                json!({ "quantity": s.quantity, "reorder_level": s.reorder_level }),
            )
        })
    })
}

pub fn check_stock_levels(data: &Dataset<'_>) -> Vec<Finding> {
    stock_findings(data, |subject, s| {
        (s.reorder_level >= s.max_stock_level).then(|| {
            Finding::new(
                CheckKind::StockLevels,
                subject,
                format!("reorder level {} not below max {}", s.reorder_level, s.max_stock_level),
                json!({ "reorder_level": s.reorder_level, "max_stock_level": s.max_stock_level }),
            )
        })
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::CustomerStats;
    use crate::types::{
        BranchStock, CustomerGroup, LoyaltyTier, PaymentMethod, SaleItem, UserRole,
    };
    use chrono::Utc;

    struct Fixture {
        branches: Vec<Branch>,
        categories: Vec<Category>,
        products: Vec<Product>,
        users: Vec<User>,
        customers: Vec<Customer>,
        sales: Vec<Sale>,
    }

    impl Fixture {
        fn dataset(&self) -> Dataset<'_> {
            Dataset {
                branches: &self.branches,
                categories: &self.categories,
                products: &self.products,
                users: &self.users,
                customers: &self.customers,
                sales: &self.sales,
            }
        }
    }

    fn item(position: i64, unit_price_paise: i64, quantity: i64, discount_bps: u32, tax_rate_bps: u32) -> SaleItem {
        let amounts = LineAmounts::compute(
            Money::from_paise(unit_price_paise),
            quantity,
            crate::types::Rate::from_bps(discount_bps),
            crate::types::Rate::from_bps(tax_rate_bps),
        );
        SaleItem {
            id: format!("i{position}"),
            sale_id: "s1".into(),
            position,
            product_id: "p1".into(),
            sku_snapshot: "SKU-001".into(),
            name_snapshot: "Rice 1kg".into(),
            quantity,
            unit_price_paise,
            cost_price_paise: 8_000,
            discount_bps,
            discount_amount_paise: amounts.discount_amount.paise(),
            tax_rate_bps,
            tax_amount_paise: amounts.tax_amount.paise(),
            line_total_paise: amounts.line_total.paise(),
        }
    }

    fn sale(items: Vec<SaleItem>) -> Sale {
        let totals = SaleTotals::from_items(&items);
        Sale {
            id: "s1".into(),
            sale_number: "SAL20260301000001".into(),
            invoice_number: "INV20260301000001".into(),
            branch_id: "b1".into(),
            customer_id: Some("c1".into()),
            status: SaleStatus::Completed,
            subtotal_paise: totals.subtotal.paise(),
            total_discount_paise: totals.total_discount.paise(),
            total_tax_paise: totals.total_tax.paise(),
            total_paise: totals.total.paise(),
            payment_method: PaymentMethod::Card,
            payment_reference: Some("CARD17000000000001234".into()),
            amount_paid_paise: totals.total.paise(),
            change_amount_paise: 0,
            created_by: "u1".into(),
            created_at: Utc::now(),
            items,
        }
    }

    fn fixture() -> Fixture {
        let now = Utc::now();
        let sales = vec![sale(vec![item(0, 10_000, 3, 0, 1200), item(1, 25_000, 4, 1000, 1800)])];
        let stats = CustomerStats::from_sale_totals(sales.iter().map(|s| s.total()));

        Fixture {
            branches: vec![Branch {
                id: "b1".into(),
                code: "BLR-01".into(),
                name: "Main".into(),
                address: "1 MG Road".into(),
                city: "Bengaluru".into(),
                phone: None,
                email: None,
                is_primary: true,
                tax_rate_bps: 1800,
                currency: "INR".into(),
                is_active: true,
                created_at: now,
            }],
            categories: vec![Category {
                id: "c-grocery".into(),
                code: "GROCERY".into(),
                name: "Grocery".into(),
                gst_rate_bps: 1200,
                created_at: now,
            }],
            products: vec![Product {
                id: "p1".into(),
                sku: "SKU-001".into(),
                barcode: None,
                name: "Rice 1kg".into(),
                category_id: "c-grocery".into(),
                brand: None,
                unit: "pcs".into(),
                cost_price_paise: 8_000,
                selling_price_paise: 10_000,
                mrp_paise: 11_000,
                gst_rate_bps: 1200,
                is_active: true,
                created_at: now,
                updated_at: now,
                stock_by_branch: vec![BranchStock {
                    id: "st1".into(),
                    product_id: "p1".into(),
                    branch_id: "b1".into(),
                    quantity: 40,
                    reorder_level: 10,
                    max_stock_level: 80,
                    reserved_quantity: 0,
                    location: Some("A-01".into()),
                    last_restocked: Some(now),
                }],
            }],
            users: vec![User {
                id: "u1".into(),
                username: "cashier1".into(),
                full_name: "Ravi Kumar".into(),
                email: None,
                role: UserRole::Cashier,
                branch_id: Some("b1".into()),
                is_active: true,
                created_at: now,
            }],
            customers: vec![Customer {
                id: "c1".into(),
                customer_number: "CUST000001".into(),
                name: "Asha Rao".into(),
                phone: None,
                email: None,
                customer_group: CustomerGroup::Vip,
                total_spent_paise: stats.total_spent.paise(),
                total_purchases: stats.total_purchases,
                average_order_value_paise: stats.average_order_value().paise(),
                loyalty_points: 0,
                loyalty_tier: LoyaltyTier::Bronze,
                credit_limit_paise: 0,
                current_balance_paise: 0,
                last_purchase_at: None,
                is_active: true,
                created_at: now,
                updated_at: now,
            }],
            sales,
        }
    }

    #[test]
    fn test_consistent_dataset_passes() {
        let f = fixture();
        let report = validate(&f.dataset());

        assert!(report.failed.is_empty(), "{:?}", report.failed);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
        assert_eq!(report.passed_count(), CheckKind::ALL.len());
    }

    #[test]
    fn test_subtotal_off_by_a_rupee_fails() {
        let mut f = fixture();
        f.sales[0].subtotal_paise += 100;
        let report = validate(&f.dataset());

        assert!(report.has_failures());
        let subtotal: Vec<_> = report.findings_for(CheckKind::SaleSubtotal).collect();
        assert_eq!(subtotal.len(), 1);
        assert_eq!(subtotal[0].details["difference_paise"], 100);
        // the stored total no longer matches the stored aggregates either
        assert_eq!(report.findings_for(CheckKind::SaleTotal).count(), 1);
    }

    #[test]
    fn test_one_paisa_is_tolerated() {
        let mut f = fixture();
        f.sales[0].total_tax_paise += 1;
        f.sales[0].total_paise += 1;
        f.customers[0].total_spent_paise += 1;
        assert!(!validate(&f.dataset()).has_failures());
    }

    #[test]
    fn test_line_tax_mismatch() {
        let mut f = fixture();
        f.sales[0].items[1].tax_amount_paise += 500;
        let report = validate(&f.dataset());

        let line: Vec<_> = report.findings_for(CheckKind::LineTax).collect();
        assert_eq!(line.len(), 1);
        assert_eq!(line[0].subject, "SAL20260301000001#1");
        assert_eq!(report.findings_for(CheckKind::SaleTax).count(), 1);
    }

    #[test]
    fn test_customer_divergence_is_a_warning() {
        let mut f = fixture();
        f.customers[0].total_purchases = 7;
        let report = validate(&f.dataset());

        assert!(!report.has_failures());
        assert_eq!(report.warning_count(), 1);
        assert_eq!(report.warnings[0].check, CheckKind::CustomerAggregates);
        assert_eq!(report.warnings[0].details["sales_total_purchases"], 1);
    }

    #[test]
    fn test_product_and_stock_rules() {
        let mut f = fixture();
        let product = &mut f.products[0];
        product.selling_price_paise = product.cost_price_paise;
        product.gst_rate_bps = 500;
        product.stock_by_branch[0].quantity = -2;
        product.stock_by_branch[0].reorder_level = 90;

        let report = validate(&f.dataset());
        let checks: HashSet<CheckKind> = report
            .warnings
            .iter()
            .chain(&report.failed)
            .map(|f| f.check)
            .collect();

        assert!(checks.contains(&CheckKind::ProductPricing));
        assert!(checks.contains(&CheckKind::ProductGstRate));
        assert!(checks.contains(&CheckKind::StockNegative));
        assert!(checks.contains(&CheckKind::StockLevels));
        // negative stock is a failure, not a reorder warning
        assert!(!checks.contains(&CheckKind::StockReorder));
        assert_eq!(
            report.findings_for(CheckKind::StockNegative).next().map(|f| f.subject.as_str()),
            Some("SKU-001@BLR-01")
        );
    }

    #[test]
    fn test_dangling_references_fail() {
        let mut f = fixture();
        f.sales[0].branch_id = "gone".into();
        f.sales[0].items[0].product_id = "gone".into();
        f.users.clear();

        let report = validate(&f.dataset());
        assert_eq!(report.findings_for(CheckKind::References).count(), 3);
    }

    #[test]
    fn test_rerun_is_identical() {
        let mut f = fixture();
        f.sales[0].total_paise -= 250;
        f.customers[0].total_spent_paise = 0;

        let first = validate(&f.dataset());
        let second = validate(&f.dataset());
        assert_eq!(first, second);
    }
}
