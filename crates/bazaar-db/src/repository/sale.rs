//! # Sale Repository
//!
//! Persists sales with their items, and reads them back for validation.
//!
//! ## One Sale, One Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │   1. next sale sequence        (sequences, atomic upsert)               │
//! │   2. INSERT sales              (SAL/INV + date + sequence)              │
//! │   3. for each line:                                                     │
//! │        INSERT sale_items                                                │
//! │        guarded stock decrement ──► short? InsufficientStock ─┐          │
//! │   4. customer.add_purchase(total) → UPDATE customers          │          │
//! │  COMMIT                                           ROLLBACK ◄──┘          │
//! │                                                                         │
//! │  Either everything above is visible, or none of it is.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `insert_batch` runs one such transaction per draft and keeps going after
//! a failure, reporting which drafts were rejected.

use std::collections::HashMap;

use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::customer::{fetch_customer, write_stats};
use crate::repository::product::decrement_stock;
use crate::repository::sequence::{next_value, SALE_SEQUENCE};
use bazaar_core::numbering::SaleNumbers;
use bazaar_core::sale_builder::SaleDraft;
use bazaar_core::validation::validate_quantity;
use bazaar_core::{CoreError, Sale, SaleItem, SaleStatus};

const SALE_COLUMNS: &str = r#"
    id, sale_number, invoice_number, branch_id, customer_id, status,
    subtotal_paise, total_discount_paise, total_tax_paise, total_paise,
    payment_method, payment_reference, amount_paid_paise, change_amount_paise,
    created_by, created_at
"#;

const ITEM_COLUMNS: &str = r#"
    id, sale_id, position, product_id, sku_snapshot, name_snapshot, quantity,
    unit_price_paise, cost_price_paise, discount_bps, discount_amount_paise,
    tax_rate_bps, tax_amount_paise, line_total_paise
"#;

/// A draft the batch could not persist.
#[derive(Debug)]
pub struct FailedSale {
    /// Position of the draft in the batch.
    pub index: usize,
    pub branch_id: String,
    pub error: DbError,
}

/// Outcome of [`SaleRepository::insert_batch`].
#[derive(Debug, Default)]
pub struct BatchInsertReport {
    pub inserted: Vec<Sale>,
    pub failed: Vec<FailedSale>,
}

impl BatchInsertReport {
    pub fn inserted_count(&self) -> usize {
        self.inserted.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Numbers and persists a draft in one transaction.
    ///
    /// ## Returns
    /// The stored sale, with its sale and invoice numbers.
    pub async fn insert_draft(&self, draft: &SaleDraft) -> DbResult<Sale> {
        if draft.lines.is_empty() {
            return Err(CoreError::EmptySale.into());
        }

        let mut tx = self.pool.begin().await?;

        let sequence = next_value(&mut tx, SALE_SEQUENCE).await?;
        let sale = draft.to_sale(SaleNumbers::new(draft.created_at.date_naive(), sequence));
        write_sale(&mut tx, &sale).await?;

        tx.commit().await?;

        debug!(
            sale_number = %sale.sale_number,
            branch_id = %sale.branch_id,
            total = %sale.total(),
            "Sale stored"
        );
        Ok(sale)
    }

    /// Persists drafts one transaction at a time.
    ///
    /// A failing draft is logged and recorded; the rest still go in.
    pub async fn insert_batch(&self, drafts: &[SaleDraft]) -> BatchInsertReport {
        let mut report = BatchInsertReport::default();

        for (index, draft) in drafts.iter().enumerate() {
            match self.insert_draft(draft).await {
                Ok(sale) => report.inserted.push(sale),
                Err(error) => {
                    warn!(index, branch_id = %draft.branch_id, error = %error, "Sale rejected");
                    report.failed.push(FailedSale {
                        index,
                        branch_id: draft.branch_id.clone(),
                        error,
                    });
                }
            }
        }

        info!(
            inserted = report.inserted_count(),
            failed = report.failed_count(),
            "Sale batch stored"
        );
        report
    }

    /// Gets a sale with its items by sale number.
    pub async fn get_by_number(&self, sale_number: &str) -> DbResult<Option<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE sale_number = ?1");
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(sale_number)
            .fetch_optional(&self.pool)
            .await?;

        let Some(mut sale) = sale else {
            return Ok(None);
        };

        let sql = format!("SELECT {ITEM_COLUMNS} FROM sale_items WHERE sale_id = ?1 ORDER BY position");
        sale.items = sqlx::query_as::<_, SaleItem>(&sql)
            .bind(&sale.id)
            .fetch_all(&self.pool)
            .await?;

        Ok(Some(sale))
    }

    /// All sales ordered by sale number, items in line order.
    pub async fn list_with_items(&self) -> DbResult<Vec<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales ORDER BY sale_number");
        let mut sales = sqlx::query_as::<_, Sale>(&sql)
            .fetch_all(&self.pool)
            .await?;

        let sql = format!("SELECT {ITEM_COLUMNS} FROM sale_items ORDER BY sale_id, position");
        let items = sqlx::query_as::<_, SaleItem>(&sql)
            .fetch_all(&self.pool)
            .await?;

        let mut by_sale: HashMap<String, Vec<SaleItem>> = HashMap::new();
        for item in items {
            by_sale.entry(item.sale_id.clone()).or_default().push(item);
        }
        for sale in &mut sales {
            sale.items = by_sale.remove(&sale.id).unwrap_or_default();
        }

        debug!(count = sales.len(), "Loaded sales with items");
        Ok(sales)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    pub async fn count_for_branch(&self, branch_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales WHERE branch_id = ?1")
            .bind(branch_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Writes the sale, its items, the stock decrements and the customer stats.
async fn write_sale(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
    if sale.items.is_empty() {
        return Err(CoreError::EmptySale.into());
    }
    for item in &sale.items {
        validate_quantity(item.quantity)?;
    }

    sqlx::query(
        r#"
        INSERT INTO sales (
            id, sale_number, invoice_number, branch_id, customer_id, status,
            subtotal_paise, total_discount_paise, total_tax_paise, total_paise,
            payment_method, payment_reference, amount_paid_paise, change_amount_paise,
            created_by, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.sale_number)
    .bind(&sale.invoice_number)
    .bind(&sale.branch_id)
    .bind(&sale.customer_id)
    .bind(sale.status)
    .bind(sale.subtotal_paise)
    .bind(sale.total_discount_paise)
    .bind(sale.total_tax_paise)
    .bind(sale.total_paise)
    .bind(sale.payment_method)
    .bind(&sale.payment_reference)
    .bind(sale.amount_paid_paise)
    .bind(sale.change_amount_paise)
    .bind(&sale.created_by)
    .bind(sale.created_at)
    .execute(&mut *conn)
    .await?;

    for item in &sale.items {
        sqlx::query(
            r#"
            INSERT INTO sale_items (
                id, sale_id, position, product_id, sku_snapshot, name_snapshot, quantity,
                unit_price_paise, cost_price_paise, discount_bps, discount_amount_paise,
                tax_rate_bps, tax_amount_paise, line_total_paise
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&item.id)
        .bind(&sale.id)
        .bind(item.position)
        .bind(&item.product_id)
        .bind(&item.sku_snapshot)
        .bind(&item.name_snapshot)
        .bind(item.quantity)
        .bind(item.unit_price_paise)
        .bind(item.cost_price_paise)
        .bind(item.discount_bps)
        .bind(item.discount_amount_paise)
        .bind(item.tax_rate_bps)
        .bind(item.tax_amount_paise)
        .bind(item.line_total_paise)
        .execute(&mut *conn)
        .await?;

        decrement_stock(conn, &item.product_id, &item.sku_snapshot, &sale.branch_id, item.quantity)
            .await?;
    }

    if sale.status == SaleStatus::Completed {
        if let Some(customer_id) = &sale.customer_id {
            let mut customer = fetch_customer(conn, customer_id)
                .await?
                .ok_or_else(|| DbError::not_found("Customer", customer_id))?;
            customer.add_purchase(sale.total(), sale.created_at);
            write_stats(conn, &customer).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{seeded_db, Fixture};
    use crate::Database;
    use bazaar_core::sale_builder::{SaleBuilder, SaleContext, StockedProduct};
    use bazaar_core::{Money, ValidationError, MAX_ITEM_QUANTITY};
    use chrono::{TimeZone, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    async fn draft(db: &Database, fx: &Fixture, seed: u64) -> SaleDraft {
        let products = db.products().list().await.unwrap();
        let stocked = StockedProduct::for_branch(&products, &fx.main.id);
        let ctx = SaleContext {
            branch_id: &fx.main.id,
            cashier_id: &fx.cashier.id,
            products: &stocked,
            customers: &fx.customers,
            at: Utc.with_ymd_and_hms(2026, 3, 14, 11, 30, 0).unwrap(),
        };
        let mut rng = StdRng::seed_from_u64(seed);
        SaleBuilder::new().build(&ctx, &mut rng).unwrap()
    }

    #[tokio::test]
    async fn test_insert_draft_is_numbered_and_applied() {
        let (db, fx) = seeded_db().await;
        let draft = draft(&db, &fx, 1).await;
        let sold: i64 = draft.lines.iter().map(|l| l.quantity).sum();

        let sale = db.sales().insert_draft(&draft).await.unwrap();
        assert_eq!(sale.sale_number, "SAL20260314000001");
        assert_eq!(sale.invoice_number, "INV20260314000001");

        let stored = db.sales().get_by_number(&sale.sale_number).await.unwrap().unwrap();
        assert_eq!(stored.items.len(), draft.lines.len());
        assert_eq!(stored.total(), draft.totals.total);

        let products = db.products().list().await.unwrap();
        let on_hand: i64 = products.iter().map(|p| p.quantity_at(&fx.main.id)).sum();
        assert_eq!(on_hand, 20 * fx.products.len() as i64 - sold);

        let customer = db.customers().get_by_id(&fx.customers[0].id).await.unwrap().unwrap();
        assert_eq!(customer.total_purchases, fx.customers[0].total_purchases + 1);
        assert_eq!(
            customer.total_spent(),
            fx.customers[0].total_spent() + draft.totals.total
        );
    }

    #[tokio::test]
    async fn test_short_stock_rolls_back_everything() {
        let (db, fx) = seeded_db().await;
        let mut draft = draft(&db, &fx, 2).await;
        draft.lines.last_mut().unwrap().quantity = 500;

        let err = db.sales().insert_draft(&draft).await.unwrap_err();
        assert!(err.is_insufficient_stock(), "{err:?}");

        assert_eq!(db.sales().count().await.unwrap(), 0);
        assert_eq!(db.sequences().current(SALE_SEQUENCE).await.unwrap(), 0);
        let products = db.products().list().await.unwrap();
        assert!(products.iter().all(|p| p.quantity_at(&fx.main.id) == 20));
        let customer = db.customers().get_by_id(&fx.customers[0].id).await.unwrap().unwrap();
        assert_eq!(customer.total_spent(), fx.customers[0].total_spent());
    }

    #[tokio::test]
    async fn test_oversized_line_is_rejected_before_writing() {
        let (db, fx) = seeded_db().await;
        let mut draft = draft(&db, &fx, 9).await;
        draft.lines[0].quantity = MAX_ITEM_QUANTITY + 1;

        let err = db.sales().insert_draft(&draft).await.unwrap_err();
        assert!(
            matches!(
                err,
                DbError::Core(CoreError::Validation(ValidationError::OutOfRange { .. }))
            ),
            "{err:?}"
        );
        assert_eq!(db.sales().count().await.unwrap(), 0);
        assert_eq!(db.sequences().current(SALE_SEQUENCE).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_batch_salvages_successes() {
        let (db, fx) = seeded_db().await;
        let good = draft(&db, &fx, 3).await;
        let mut bad = good.clone();
        bad.lines[0].quantity = 999;

        let report = db.sales().insert_batch(&[bad, good]).await;
        assert_eq!(report.inserted_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.failed[0].index, 0);
        // the rejected draft handed its number back
        assert_eq!(report.inserted[0].sale_number, "SAL20260314000001");
    }

    #[tokio::test]
    async fn test_list_with_items_in_order() {
        let (db, fx) = seeded_db().await;
        for seed in 4..7 {
            let d = draft(&db, &fx, seed).await;
            db.sales().insert_draft(&d).await.unwrap();
        }

        let sales = db.sales().list_with_items().await.unwrap();
        assert_eq!(sales.len(), 3);
        assert!(sales.windows(2).all(|w| w[0].sale_number < w[1].sale_number));
        for sale in &sales {
            assert!(!sale.items.is_empty());
            assert!(sale.items.iter().enumerate().all(|(i, item)| item.position == i as i64));
        }
        assert_eq!(db.sales().count_for_branch(&fx.main.id).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_walk_in_sale_touches_no_customer() {
        let (db, fx) = seeded_db().await;
        let mut d = draft(&db, &fx, 8).await;
        d.customer_id = None;

        let sale = db.sales().insert_draft(&d).await.unwrap();
        assert!(sale.customer_id.is_none());
        let customer = db.customers().get_by_id(&fx.customers[0].id).await.unwrap().unwrap();
        assert_eq!(customer.total_purchases, fx.customers[0].total_purchases);
        assert!(sale.total() > Money::zero());
    }
}
