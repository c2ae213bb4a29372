//! # Category Repository
//!
//! Product categories and the GST slab each one carries.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use bazaar_core::validation::{validate_code, validate_name, validate_rate_bps};
use bazaar_core::Category;

#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    pub async fn insert(&self, category: &Category) -> DbResult<()> {
        validate_code("code", &category.code)?;
        validate_name("name", &category.name)?;
        validate_rate_bps("gst_rate", category.gst_rate_bps)?;

        debug!(code = %category.code, gst_bps = category.gst_rate_bps, "Inserting category");

        sqlx::query(
            r#"
            INSERT INTO categories (id, code, name, gst_rate_bps, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&category.id)
        .bind(&category.code)
        .bind(&category.name)
        .bind(category.gst_rate_bps)
        .bind(category.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, code, name, gst_rate_bps, created_at FROM categories ORDER BY code",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
