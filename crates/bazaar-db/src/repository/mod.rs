//! # Repository Module
//!
//! Database repository implementations for Bazaar.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Batch job                                                              │
//! │       │                                                                 │
//! │       │  db.sales().insert_batch(&drafts)                               │
//! │       ▼                                                                 │
//! │  SaleRepository ──► product::decrement_stock                            │
//! │                 ──► customer::write_stats        (same transaction)     │
//! │                 ──► sequence::next_value                                │
//! │       │                                                                 │
//! │       │  SQL (runtime-checked sqlx queries)                             │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`BranchRepository`](branch::BranchRepository) - Branches
//! - [`CategoryRepository`](category::CategoryRepository) - Categories and GST slabs
//! - [`ProductRepository`](product::ProductRepository) - Products and branch stock
//! - [`UserRepository`](user::UserRepository) - Staff
//! - [`CustomerRepository`](customer::CustomerRepository) - Customers and stats
//! - [`SaleRepository`](sale::SaleRepository) - Sales and sale items
//! - [`SequenceRepository`](sequence::SequenceRepository) - Numbering counters

pub mod branch;
pub mod category;
pub mod customer;
pub mod product;
pub mod sale;
pub mod sequence;
pub mod user;

#[cfg(test)]
pub(crate) mod test_support {
    //! Fixtures shared by the repository and job tests.

    use chrono::Utc;
    use uuid::Uuid;

    use crate::{Database, DbConfig};
    use bazaar_core::{
        Branch, BranchStock, Category, Customer, CustomerGroup, LoyaltyTier, Product, User,
        UserRole,
    };

    pub async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub fn branch(code: &str, is_primary: bool) -> Branch {
        Branch {
            id: Uuid::new_v4().to_string(),
            code: code.to_string(),
            name: format!("Bazaar {code}"),
            address: "12 MG Road".into(),
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

    pub fn category(code: &str, gst_rate_bps: u32) -> Category {
        Category {
            id: Uuid::new_v4().to_string(),
            code: code.to_string(),
            name: code.to_lowercase(),
            gst_rate_bps,
            created_at: Utc::now(),
        }
    }

    pub fn product(sku: &str, category: &Category, cost_price_paise: i64) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4().to_string(),
            sku: sku.to_string(),
            barcode: None,
            name: format!("Product {sku}"),
            category_id: category.id.clone(),
            brand: None,
            unit: "pcs".into(),
            cost_price_paise,
            selling_price_paise: cost_price_paise * 5 / 4,
            mrp_paise: cost_price_paise * 3 / 2,
            gst_rate_bps: category.gst_rate_bps,
            is_active: true,
            created_at: now,
            updated_at: now,
            stock_by_branch: Vec::new(),
        }
    }

    pub fn stock(product_id: &str, branch_id: &str, quantity: i64) -> BranchStock {
        BranchStock {
            id: Uuid::new_v4().to_string(),
            product_id: product_id.to_string(),
            branch_id: branch_id.to_string(),
            quantity,
            reorder_level: 5,
            max_stock_level: 100,
            reserved_quantity: 0,
            location: Some("A-01".into()),
            last_restocked: Some(Utc::now()),
        }
    }

    pub fn user(username: &str, role: UserRole, branch_id: Option<&str>) -> User {
        User {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            full_name: format!("{username} (staff)"),
            email: None,
            role,
            branch_id: branch_id.map(str::to_string),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    pub fn customer(number: &str, group: CustomerGroup) -> Customer {
        let now = Utc::now();
        Customer {
            id: Uuid::new_v4().to_string(),
            customer_number: number.to_string(),
            name: format!("Customer {number}"),
            phone: None,
            email: None,
            customer_group: group,
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

    /// What [`seeded_db`] put in the database.
    pub struct Fixture {
        pub main: Branch,
        pub category: Category,
        /// Ordered by SKU, 20 units each at `main`.
        pub products: Vec<Product>,
        pub cashier: User,
        /// One VIP customer with prior (seeded) stats.
        pub customers: Vec<Customer>,
    }

    /// One branch, one category, three stocked products, a cashier, a customer.
    pub async fn seeded_db() -> (Database, Fixture) {
        let db = test_db().await;

        let main = branch("BLR-01", true);
        db.branches().insert(&main).await.unwrap();

        let category = category("STAPLES", 500);
        db.categories().insert(&category).await.unwrap();

        let mut products = Vec::new();
        for (i, cost) in [4_500, 12_000, 38_000].into_iter().enumerate() {
            let mut p = product(&format!("STA-{:04}", i + 1), &category, cost);
            p.stock_by_branch.push(stock(&p.id, &main.id, 20));
            db.products().insert(&p).await.unwrap();
            products.push(p);
        }

        let cashier = user("cashier.blr01", UserRole::Cashier, Some(&main.id));
        db.users().insert(&cashier).await.unwrap();

        let mut vip = customer("CUST000001", CustomerGroup::Vip);
        vip.total_spent_paise = 1_250_000;
        vip.total_purchases = 4;
        db.customers().insert(&vip).await.unwrap();

        let fixture = Fixture {
            main,
            category,
            products,
            cashier,
            customers: vec![vip],
        };
        (db, fixture)
    }
}
