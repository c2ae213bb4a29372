//! # User Repository
//!
//! Staff records. Sales reference a user as `created_by`.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use bazaar_core::validation::validate_name;
use bazaar_core::{User, UserRole};

const USER_COLUMNS: &str = "id, username, full_name, email, role, branch_id, is_active, created_at";

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    pub async fn insert(&self, user: &User) -> DbResult<()> {
        validate_name("username", &user.username)?;
        validate_name("full_name", &user.full_name)?;

        debug!(username = %user.username, role = ?user.role, "Inserting user");

        sqlx::query(
            r#"
            INSERT INTO users (id, username, full_name, email, role, branch_id, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(user.role)
        .bind(&user.branch_id)
        .bind(user.is_active)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// All users ordered by username.
    pub async fn list(&self) -> DbResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY username");
        let users = sqlx::query_as::<_, User>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    /// Active cashiers assigned to a branch.
    pub async fn cashiers_at(&self, branch_id: &str) -> DbResult<Vec<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE branch_id = ?1 AND role = ?2 AND is_active = 1 ORDER BY username"
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(branch_id)
            .bind(UserRole::Cashier)
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{seeded_db, user};

    #[tokio::test]
    async fn test_cashiers_at_branch() {
        let (db, fx) = seeded_db().await;
        db.users()
            .insert(&user("manager.main", UserRole::Manager, Some(&fx.main.id)))
            .await
            .unwrap();
        db.users().insert(&user("admin", UserRole::Admin, None)).await.unwrap();

        let cashiers = db.users().cashiers_at(&fx.main.id).await.unwrap();
        assert_eq!(cashiers.len(), 1);
        assert_eq!(cashiers[0].id, fx.cashier.id);
        assert_eq!(db.users().count().await.unwrap(), 3);
    }
}
