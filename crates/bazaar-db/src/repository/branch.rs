//! # Branch Repository
//!
//! Database operations for branches.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use bazaar_core::validation::{validate_code, validate_name};
use bazaar_core::Branch;

const BRANCH_COLUMNS: &str = r#"
    id, code, name, address, city, phone, email,
    is_primary, tax_rate_bps, currency, is_active, created_at
"#;

/// Repository for branch database operations.
#[derive(Debug, Clone)]
pub struct BranchRepository {
    pool: SqlitePool,
}

impl BranchRepository {
    pub fn new(pool: SqlitePool) -> Self {
        BranchRepository { pool }
    }

    /// Inserts a branch after validating its code and name.
    pub async fn insert(&self, branch: &Branch) -> DbResult<()> {
        validate_code("code", &branch.code)?;
        validate_name("name", &branch.name)?;

        debug!(id = %branch.id, code = %branch.code, "Inserting branch");

        sqlx::query(
            r#"
            INSERT INTO branches (
                id, code, name, address, city, phone, email,
                is_primary, tax_rate_bps, currency, is_active, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&branch.id)
        .bind(&branch.code)
        .bind(&branch.name)
        .bind(&branch.address)
        .bind(&branch.city)
        .bind(&branch.phone)
        .bind(&branch.email)
        .bind(branch.is_primary)
        .bind(branch.tax_rate_bps)
        .bind(&branch.currency)
        .bind(branch.is_active)
        .bind(branch.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Lists all branches, primary first, then by code.
    pub async fn list(&self) -> DbResult<Vec<Branch>> {
        let sql = format!("SELECT {BRANCH_COLUMNS} FROM branches ORDER BY is_primary DESC, code");
        let branches = sqlx::query_as::<_, Branch>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(branches)
    }

    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Branch>> {
        let sql = format!("SELECT {BRANCH_COLUMNS} FROM branches WHERE code = ?1");
        let branch = sqlx::query_as::<_, Branch>(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(branch)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM branches")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::test_support::{branch, test_db};

    #[tokio::test]
    async fn test_insert_and_list_primary_first() {
        let db = test_db().await;
        db.branches().insert(&branch("PNQ-02", false)).await.unwrap();
        db.branches().insert(&branch("BLR-01", true)).await.unwrap();

        let branches = db.branches().list().await.unwrap();
        assert_eq!(branches.len(), 2);
        assert_eq!(branches[0].code, "BLR-01");
        assert!(branches[0].is_primary);

        let found = db.branches().get_by_code("PNQ-02").await.unwrap();
        assert_eq!(found.map(|b| b.city), Some("Bengaluru".to_string()));
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let db = test_db().await;
        db.branches().insert(&branch("BLR-01", true)).await.unwrap();

        let err = db.branches().insert(&branch("BLR-01", false)).await.unwrap_err();
        assert!(matches!(err, crate::DbError::UniqueViolation { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn test_invalid_code_rejected() {
        let db = test_db().await;
        assert!(db.branches().insert(&branch("blr 1", true)).await.is_err());
        assert_eq!(db.branches().count().await.unwrap(), 0);
    }
}
