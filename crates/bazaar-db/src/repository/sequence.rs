//! # Sequence Repository
//!
//! Named counters backing sale and invoice numbers.
//!
//! ## Allocation
//! ```text
//! INSERT INTO sequences (name, value) VALUES ('sale', 1)
//! ON CONFLICT (name) DO UPDATE SET value = value + 1
//! RETURNING value
//! ```
//! One statement: increments atomically, creates the counter on first use.
//! Run inside a sale's transaction, a rolled-back sale returns its number.
//!
//! Before a seeding run the counter is raised to the highest suffix already
//! present in `sales`, so numbers keep increasing across runs even when the
//! counter row was lost.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use crate::error::DbResult;
use bazaar_core::numbering::{max_sequence, SALE_PREFIX};

/// Counter shared by sale and invoice numbers.
pub const SALE_SEQUENCE: &str = "sale";

#[derive(Debug, Clone)]
pub struct SequenceRepository {
    pool: SqlitePool,
}

impl SequenceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SequenceRepository { pool }
    }

    /// Allocates the next value of a counter.
    pub async fn next(&self, name: &str) -> DbResult<u64> {
        let mut conn = self.pool.acquire().await?;
        next_value(&mut conn, name).await
    }

    /// Current value (0 when the counter was never used).
    pub async fn current(&self, name: &str) -> DbResult<u64> {
        let value: Option<i64> = sqlx::query_scalar("SELECT value FROM sequences WHERE name = ?1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value.unwrap_or(0).max(0) as u64)
    }

    /// Raises a counter to at least `floor`. Never lowers it.
    pub async fn ensure_at_least(&self, name: &str, floor: u64) -> DbResult<u64> {
        let value: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO sequences (name, value) VALUES (?1, ?2)
            ON CONFLICT (name) DO UPDATE SET value = MAX(value, excluded.value)
            RETURNING value
            "#,
        )
        .bind(name)
        .bind(floor as i64)
        .fetch_one(&self.pool)
        .await?;

        Ok(value.max(0) as u64)
    }

    /// Aligns the sale counter with the numbers already stored.
    pub async fn sync_sale_sequence(&self) -> DbResult<u64> {
        let numbers: Vec<String> = sqlx::query_scalar("SELECT sale_number FROM sales")
            .fetch_all(&self.pool)
            .await?;

        let highest = max_sequence(SALE_PREFIX, numbers.iter().map(String::as_str));
        let value = self.ensure_at_least(SALE_SEQUENCE, highest).await?;

        info!(highest_stored = highest, counter = value, "Sale sequence synchronized");
        Ok(value)
    }
}

/// Allocates the next value on an existing connection or transaction.
pub async fn next_value(conn: &mut SqliteConnection, name: &str) -> DbResult<u64> {
    let value: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO sequences (name, value) VALUES (?1, 1)
        ON CONFLICT (name) DO UPDATE SET value = value + 1
        RETURNING value
        "#,
    )
    .bind(name)
    .fetch_one(conn)
    .await?;

    Ok(value.max(0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{seeded_db, test_db};
    use bazaar_core::sale_builder::{SaleBuilder, SaleContext, StockedProduct};
    use chrono::{TimeZone, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[tokio::test]
    async fn test_next_is_monotonic() {
        let db = test_db().await;
        let seq = db.sequences();

        assert_eq!(seq.current(SALE_SEQUENCE).await.unwrap(), 0);
        assert_eq!(seq.next(SALE_SEQUENCE).await.unwrap(), 1);
        assert_eq!(seq.next(SALE_SEQUENCE).await.unwrap(), 2);
        assert_eq!(seq.next("other").await.unwrap(), 1);
        assert_eq!(seq.current(SALE_SEQUENCE).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_ensure_at_least_never_lowers() {
        let db = test_db().await;
        let seq = db.sequences();

        assert_eq!(seq.ensure_at_least(SALE_SEQUENCE, 40).await.unwrap(), 40);
        assert_eq!(seq.ensure_at_least(SALE_SEQUENCE, 10).await.unwrap(), 40);
        assert_eq!(seq.next(SALE_SEQUENCE).await.unwrap(), 41);
    }

    #[tokio::test]
    async fn test_sync_on_empty_sales() {
        let db = test_db().await;
        assert_eq!(db.sequences().sync_sale_sequence().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sync_recovers_from_stored_sales() {
        let (db, fx) = seeded_db().await;
        let products = db.products().list().await.unwrap();
        let stocked = StockedProduct::for_branch(&products, &fx.main.id);
        let ctx = SaleContext {
            branch_id: &fx.main.id,
            cashier_id: &fx.cashier.id,
            products: &stocked,
            customers: &[],
            at: Utc.with_ymd_and_hms(2026, 3, 14, 10, 0, 0).unwrap(),
        };
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..2 {
            let draft = SaleBuilder::new().build(&ctx, &mut rng).unwrap();
            db.sales().insert_draft(&draft).await.unwrap();
        }

        sqlx::query("DELETE FROM sequences")
            .execute(db.pool())
            .await
            .unwrap();
        assert_eq!(db.sequences().current(SALE_SEQUENCE).await.unwrap(), 0);

        assert_eq!(db.sequences().sync_sale_sequence().await.unwrap(), 2);

        let draft = SaleBuilder::new().build(&ctx, &mut rng).unwrap();
        let sale = db.sales().insert_draft(&draft).await.unwrap();
        assert_eq!(sale.sale_number, "SAL20260314000003");
        assert_eq!(sale.invoice_number, "INV20260314000003");
    }

    #[tokio::test]
    async fn test_sync_raises_a_lagging_counter() {
        let (db, fx) = seeded_db().await;
        let products = db.products().list().await.unwrap();
        let stocked = StockedProduct::for_branch(&products, &fx.main.id);
        let ctx = SaleContext {
            branch_id: &fx.main.id,
            cashier_id: &fx.cashier.id,
            products: &stocked,
            customers: &[],
            at: Utc.with_ymd_and_hms(2026, 3, 14, 10, 0, 0).unwrap(),
        };
        let mut rng = StdRng::seed_from_u64(6);
        let draft = SaleBuilder::new().build(&ctx, &mut rng).unwrap();
        db.sales().insert_draft(&draft).await.unwrap();

        sqlx::query("UPDATE sequences SET value = 0 WHERE name = ?1")
            .bind(SALE_SEQUENCE)
            .execute(db.pool())
            .await
            .unwrap();

        assert_eq!(db.sequences().sync_sale_sequence().await.unwrap(), 1);
        assert_eq!(db.sequences().next(SALE_SEQUENCE).await.unwrap(), 2);
    }
}
