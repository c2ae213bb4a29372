//! # Customer Repository
//!
//! Customers and their cumulative purchase stats.
//!
//! Stats change in exactly two ways: seeding writes them wholesale, and a
//! persisted sale applies `Customer::add_purchase` inside its own
//! transaction (see [`crate::repository::sale`]).

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use bazaar_core::validation::validate_name;
use bazaar_core::{Customer, CustomerGroup};

const CUSTOMER_COLUMNS: &str = r#"
    id, customer_number, name, phone, email, customer_group,
    total_spent_paise, total_purchases, average_order_value_paise,
    loyalty_points, loyalty_tier, credit_limit_paise, current_balance_paise,
    last_purchase_at, is_active, created_at, updated_at
"#;

#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    pub async fn insert(&self, customer: &Customer) -> DbResult<()> {
        validate_name("name", &customer.name)?;

        debug!(number = %customer.customer_number, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, customer_number, name, phone, email, customer_group,
                total_spent_paise, total_purchases, average_order_value_paise,
                loyalty_points, loyalty_tier, credit_limit_paise, current_balance_paise,
                last_purchase_at, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.customer_number)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(customer.customer_group)
        .bind(customer.total_spent_paise)
        .bind(customer.total_purchases)
        .bind(customer.average_order_value_paise)
        .bind(customer.loyalty_points)
        .bind(customer.loyalty_tier)
        .bind(customer.credit_limit_paise)
        .bind(customer.current_balance_paise)
        .bind(customer.last_purchase_at)
        .bind(customer.is_active)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let mut conn = self.pool.acquire().await?;
        fetch_customer(&mut conn, id).await
    }

    /// All customers ordered by customer number.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY customer_number");
        let customers = sqlx::query_as::<_, Customer>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(customers)
    }

    pub async fn count_by_group(&self, group: CustomerGroup) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers WHERE customer_group = ?1")
            .bind(group)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

pub(crate) async fn fetch_customer(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Customer>> {
    let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1");
    let customer = sqlx::query_as::<_, Customer>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(customer)
}

/// Writes the stat columns of a customer.
pub(crate) async fn write_stats(conn: &mut SqliteConnection, customer: &Customer) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE customers SET
            total_spent_paise = ?1,
            total_purchases = ?2,
            average_order_value_paise = ?3,
            loyalty_points = ?4,
            loyalty_tier = ?5,
            last_purchase_at = ?6,
            updated_at = ?7
        WHERE id = ?8
        "#,
    )
    .bind(customer.total_spent_paise)
    .bind(customer.total_purchases)
    .bind(customer.average_order_value_paise)
    .bind(customer.loyalty_points)
    .bind(customer.loyalty_tier)
    .bind(customer.last_purchase_at)
    .bind(customer.updated_at)
    .bind(&customer.id)
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Customer", &customer.id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{customer, test_db};
    use bazaar_core::{LoyaltyTier, Money};
    use chrono::Utc;

    #[tokio::test]
    async fn test_roundtrip_keeps_group_and_tier() {
        let db = test_db().await;
        let mut c = customer("CUST000001", CustomerGroup::Vip);
        c.loyalty_tier = LoyaltyTier::Gold;
        db.customers().insert(&c).await.unwrap();

        let loaded = db.customers().get_by_id(&c.id).await.unwrap().unwrap();
        assert_eq!(loaded.customer_group, CustomerGroup::Vip);
        assert_eq!(loaded.loyalty_tier, LoyaltyTier::Gold);
        assert_eq!(db.customers().count_by_group(CustomerGroup::Vip).await.unwrap(), 1);
        assert_eq!(db.customers().count_by_group(CustomerGroup::Retail).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_write_stats() {
        let db = test_db().await;
        let mut c = customer("CUST000002", CustomerGroup::Regular);
        db.customers().insert(&c).await.unwrap();

        c.add_purchase(Money::from_rupees(25_000), Utc::now());
        let mut conn = db.pool().acquire().await.unwrap();
        write_stats(&mut conn, &c).await.unwrap();
        drop(conn);

        let loaded = db.customers().get_by_id(&c.id).await.unwrap().unwrap();
        assert_eq!(loaded.total_purchases, 1);
        assert_eq!(loaded.loyalty_tier, LoyaltyTier::Silver);
        assert_eq!(loaded.loyalty_points, 250);
    }

    #[tokio::test]
    async fn test_write_stats_unknown_customer() {
        let db = test_db().await;
        let c = customer("CUST000003", CustomerGroup::Retail);
        let mut conn = db.pool().acquire().await.unwrap();

        let err = write_stats(&mut conn, &c).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
