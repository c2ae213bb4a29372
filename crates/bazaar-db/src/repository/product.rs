//! # Product Repository
//!
//! Database operations for products and their per-branch stock.
//!
//! ## Stock Storage
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  products                         branch_stock                          │
//! │  ┌──────────────┐                 ┌───────────────────────────────────┐ │
//! │  │ id           │◄────────────────│ product_id  ┐ UNIQUE              │ │
//! │  │ sku          │                 │ branch_id   ┘                     │ │
//! │  │ prices, gst  │                 │ quantity ≥ 0 (CHECK)              │ │
//! │  └──────────────┘                 │ reorder_level < max_stock_level   │ │
//! │                                   └───────────────────────────────────┘ │
//! │                                                                         │
//! │  Reads attach rows to Product::stock_by_branch.                         │
//! │  Writes:                                                                │
//! │    upsert_stock     ← Inventory Distributor (one transaction)           │
//! │    decrement_stock  ← sale transaction, guarded: never below zero       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use bazaar_core::validation::{validate_branch_stock, validate_product};
use bazaar_core::{BranchStock, CoreError, Product};

const PRODUCT_COLUMNS: &str = r#"
    id, sku, barcode, name, category_id, brand, unit,
    cost_price_paise, selling_price_paise, mrp_paise, gst_rate_bps,
    is_active, created_at, updated_at
"#;

const STOCK_COLUMNS: &str = r#"
    id, product_id, branch_id, quantity, reorder_level, max_stock_level,
    reserved_quantity, location, last_restocked
"#;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let catalog = repo.list().await?;           // with stock_by_branch
/// repo.upsert_stock(&planned_stock).await?;   // distributor output
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a product and any stock records it carries.
    ///
    /// The product is validated first (sku, name, selling > cost, mrp ≥ selling).
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        validate_product(product)?;
        for stock in &product.stock_by_branch {
            validate_branch_stock(stock)?;
        }

        debug!(id = %product.id, sku = %product.sku, "Inserting product");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, sku, barcode, name, category_id, brand, unit,
                cost_price_paise, selling_price_paise, mrp_paise, gst_rate_bps,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.barcode)
        .bind(&product.name)
        .bind(&product.category_id)
        .bind(&product.brand)
        .bind(&product.unit)
        .bind(product.cost_price_paise)
        .bind(product.selling_price_paise)
        .bind(product.mrp_paise)
        .bind(product.gst_rate_bps)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await?;

        for stock in &product.stock_by_branch {
            write_stock(&mut tx, stock).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Gets a product by its ID, with stock attached.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(mut product) = product else {
            return Ok(None);
        };

        let sql = format!("SELECT {STOCK_COLUMNS} FROM branch_stock WHERE product_id = ?1 ORDER BY branch_id");
        product.stock_by_branch = sqlx::query_as::<_, BranchStock>(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

        Ok(Some(product))
    }

    /// Lists every product ordered by SKU, with stock attached.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY sku");
        let mut products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        let sql = format!("SELECT {STOCK_COLUMNS} FROM branch_stock ORDER BY product_id, branch_id");
        let stock = sqlx::query_as::<_, BranchStock>(&sql)
            .fetch_all(&self.pool)
            .await?;

        let mut by_product: HashMap<String, Vec<BranchStock>> = HashMap::new();
        for record in stock {
            by_product
                .entry(record.product_id.clone())
                .or_default()
                .push(record);
        }
        for product in &mut products {
            product.stock_by_branch = by_product.remove(&product.id).unwrap_or_default();
        }

        debug!(count = products.len(), "Loaded products with stock");
        Ok(products)
    }

    /// Stock records of one branch.
    pub async fn stock_for_branch(&self, branch_id: &str) -> DbResult<Vec<BranchStock>> {
        let sql = format!("SELECT {STOCK_COLUMNS} FROM branch_stock WHERE branch_id = ?1 ORDER BY product_id");
        let stock = sqlx::query_as::<_, BranchStock>(&sql)
            .bind(branch_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(stock)
    }

    /// Writes stock records in one transaction.
    ///
    /// Existing (product, branch) rows are overwritten and keep their id;
    /// reserved quantity is left untouched.
    pub async fn upsert_stock(&self, records: &[BranchStock]) -> DbResult<usize> {
        for record in records {
            validate_branch_stock(record)?;
        }

        let mut tx = self.pool.begin().await?;
        for record in records {
            write_stock(&mut tx, record).await?;
        }
        tx.commit().await?;

        info!(records = records.len(), "Stock records written");
        Ok(records.len())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Σ quantity × cost at a branch, in paise.
    pub async fn inventory_value_at(&self, branch_id: &str) -> DbResult<i64> {
        let value: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(s.quantity * p.cost_price_paise), 0)
            FROM branch_stock s
            JOIN products p ON p.id = s.product_id
            WHERE s.branch_id = ?1
            "#,
        )
        .bind(branch_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(value)
    }
}

async fn write_stock(conn: &mut SqliteConnection, stock: &BranchStock) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO branch_stock (
            id, product_id, branch_id, quantity, reorder_level, max_stock_level,
            reserved_quantity, location, last_restocked
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT (product_id, branch_id) DO UPDATE SET
            quantity        = excluded.quantity,
            reorder_level   = excluded.reorder_level,
            max_stock_level = excluded.max_stock_level,
            location        = excluded.location,
            last_restocked  = excluded.last_restocked
        "#,
    )
    .bind(&stock.id)
    .bind(&stock.product_id)
    .bind(&stock.branch_id)
    .bind(stock.quantity)
    .bind(stock.reorder_level)
    .bind(stock.max_stock_level)
    .bind(stock.reserved_quantity)
    .bind(&stock.location)
    .bind(stock.last_restocked)
    .execute(conn)
    .await?;

    Ok(())
}

/// Takes `quantity` units of a product out of a branch's stock.
///
/// The UPDATE only matches while enough units remain, so a concurrent or
/// oversized sale fails with `InsufficientStock` instead of driving the
/// quantity negative. Meant to run inside the sale's transaction.
pub async fn decrement_stock(
    conn: &mut SqliteConnection,
    product_id: &str,
    sku: &str,
    branch_id: &str,
    quantity: i64,
) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE branch_stock
        SET quantity = quantity - ?1
        WHERE product_id = ?2 AND branch_id = ?3 AND quantity >= ?1
        "#,
    )
    .bind(quantity)
    .bind(product_id)
    .bind(branch_id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 1 {
        return Ok(());
    }

    let available: Option<i64> = sqlx::query_scalar(
        "SELECT quantity FROM branch_stock WHERE product_id = ?1 AND branch_id = ?2",
    )
    .bind(product_id)
    .bind(branch_id)
    .fetch_optional(&mut *conn)
    .await?;

    Err(DbError::Core(CoreError::InsufficientStock {
        sku: sku.to_string(),
        branch_id: branch_id.to_string(),
        available: available.unwrap_or(0),
        requested: quantity,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{seeded_db, stock};

    #[tokio::test]
    async fn test_list_attaches_stock() {
        let (db, fx) = seeded_db().await;

        let products = db.products().list().await.unwrap();
        assert_eq!(products.len(), fx.products.len());
        let first = &products[0];
        assert_eq!(first.quantity_at(&fx.main.id), 20);
        assert_eq!(first.stock_by_branch.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_pricing_rejected() {
        let (db, fx) = seeded_db().await;
        let mut product = fx.products[0].clone();
        product.id = "other".into();
        product.sku = "STA-9999".into();
        product.stock_by_branch.clear();
        product.selling_price_paise = product.cost_price_paise;

        let err = db.products().insert(&product).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Validation(_))), "{err:?}");
    }

    #[tokio::test]
    async fn test_upsert_overwrites_levels_keeps_id() {
        let (db, fx) = seeded_db().await;
        let product = &fx.products[0];
        let original = db.products().stock_for_branch(&fx.main.id).await.unwrap();

        let mut record = stock(&product.id, &fx.main.id, 70);
        record.reorder_level = 15;
        record.max_stock_level = 120;
        db.products().upsert_stock(&[record]).await.unwrap();

        let updated = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        let stock = updated.stock_at(&fx.main.id).unwrap();
        assert_eq!(stock.quantity, 70);
        assert_eq!(stock.max_stock_level, 120);
        assert_eq!(
            stock.id,
            original.iter().find(|s| s.product_id == product.id).unwrap().id
        );
    }

    #[tokio::test]
    async fn test_upsert_rejects_inverted_levels() {
        let (db, fx) = seeded_db().await;
        let mut record = stock(&fx.products[0].id, &fx.main.id, 10);
        record.reorder_level = 50;
        record.max_stock_level = 40;

        assert!(db.products().upsert_stock(&[record]).await.is_err());
    }

    #[tokio::test]
    async fn test_guarded_decrement() {
        let (db, fx) = seeded_db().await;
        let product = &fx.products[0];
        let mut conn = db.pool().acquire().await.unwrap();

        decrement_stock(&mut conn, &product.id, &product.sku, &fx.main.id, 15)
            .await
            .unwrap();
        let err = decrement_stock(&mut conn, &product.id, &product.sku, &fx.main.id, 6)
            .await
            .unwrap_err();
        drop(conn);

        match err {
            DbError::Core(CoreError::InsufficientStock { available, requested, .. }) => {
                assert_eq!(available, 5);
                assert_eq!(requested, 6);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            db.products().inventory_value_at(&fx.main.id).await.unwrap(),
            5 * product.cost_price_paise
                + fx.products[1..].iter().map(|p| 20 * p.cost_price_paise).sum::<i64>()
        );
    }
}
