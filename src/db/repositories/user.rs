//! User repository
//!
//! - `UserRepository` trait defining the interface for user data access
//! - `SqlxUserRepository` implementing the trait for SQLite and MySQL

use crate::db::{impl_from_row, parse_column, with_driver, DynDatabasePool, LastInsertId};
use crate::models::{ListParams, User, UserRole};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use std::sync::Arc;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create(&self, user: &User) -> Result<User>;

    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Get user by email (case-insensitive)
    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Persist name, email, password hash, role and status
    async fn update(&self, user: &User) -> Result<User>;

    async fn delete(&self, id: i64) -> Result<()>;

    /// Count total users
    async fn count(&self) -> Result<i64>;

    /// Count users with an id below `id`
    async fn count_before(&self, id: i64) -> Result<i64>;

    /// Count users holding `role`
    async fn count_by_role(&self, role: UserRole) -> Result<i64>;

    /// List users, newest first
    async fn list(&self, params: &ListParams) -> Result<(Vec<User>, i64)>;
}

/// SQLx-based user repository implementation
pub struct SqlxUserRepository {
    pool: DynDatabasePool,
}

impl SqlxUserRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

impl_from_row!(User, |row| {
    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        role: parse_column(row.try_get("role")?, "role")?,
        status: parse_column(row.try_get("status")?, "status")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
});

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, user: &User) -> Result<User> {
        let now = Utc::now();
        let email = user.email.to_lowercase();

        let id = with_driver!(self.pool, |conn| {
            sqlx::query(
                r#"
                INSERT INTO users (name, email, password_hash, role, status, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&user.name)
            .bind(&email)
            .bind(&user.password_hash)
            .bind(user.role.to_string())
            .bind(user.status.to_string())
            .bind(now)
            .bind(now)
            .execute(conn)
            .await
            .context("Failed to create user")?
            .last_id()
        });

        Ok(User {
            id,
            email,
            created_at: now,
            updated_at: now,
            ..user.clone()
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        with_driver!(self.pool, |conn| {
            sqlx::query_as(
                r#"
                SELECT id, name, email, password_hash, role, status, created_at, updated_at
                FROM users
                WHERE id = ?
                "#,
            )
            .bind(id)
            .fetch_optional(conn)
            .await
            .context("Failed to get user by ID")
        })
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        with_driver!(self.pool, |conn| {
            sqlx::query_as(
                r#"
                SELECT id, name, email, password_hash, role, status, created_at, updated_at
                FROM users
                WHERE email = ?
                "#,
            )
            .bind(email.to_lowercase())
            .fetch_optional(conn)
            .await
            .context("Failed to get user by email")
        })
    }

    async fn update(&self, user: &User) -> Result<User> {
        let now = Utc::now();
        let email = user.email.to_lowercase();

        with_driver!(self.pool, |conn| {
            sqlx::query(
                r#"
                UPDATE users
                SET name = ?, email = ?, password_hash = ?, role = ?, status = ?, updated_at = ?
                WHERE id = ?
                "#,
            )
            .bind(&user.name)
            .bind(&email)
            .bind(&user.password_hash)
            .bind(user.role.to_string())
            .bind(user.status.to_string())
            .bind(now)
            .bind(user.id)
            .execute(conn)
            .await
            .context("Failed to update user")?;
        });

        Ok(User {
            email,
            updated_at: now,
            ..user.clone()
        })
    }

    async fn delete(&self, id: i64) -> Result<()> {
        with_driver!(self.pool, |conn| {
            sqlx::query("DELETE FROM users WHERE id = ?")
                .bind(id)
                .execute(conn)
                .await
                .context("Failed to delete user")?;
        });
        Ok(())
    }

    async fn count(&self) -> Result<i64> {
        with_driver!(self.pool, |conn| {
            sqlx::query_scalar("SELECT COUNT(*) FROM users")
                .fetch_one(conn)
                .await
                .context("Failed to count users")
        })
    }

    async fn count_before(&self, id: i64) -> Result<i64> {
        with_driver!(self.pool, |conn| {
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE id < ?")
                .bind(id)
                .fetch_one(conn)
                .await
                .context("Failed to count earlier users")
        })
    }

    async fn count_by_role(&self, role: UserRole) -> Result<i64> {
        with_driver!(self.pool, |conn| {
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = ?")
                .bind(role.to_string())
                .fetch_one(conn)
                .await
                .context("Failed to count users by role")
        })
    }

    async fn list(&self, params: &ListParams) -> Result<(Vec<User>, i64)> {
        let users: Vec<User> = with_driver!(self.pool, |conn| {
            sqlx::query_as(
                r#"
                SELECT id, name, email, password_hash, role, status, created_at, updated_at
                FROM users
                ORDER BY created_at DESC, id DESC
                LIMIT ? OFFSET ?
                "#,
            )
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(conn)
            .await
            .context("Failed to list users")?
        });

        let total = self.count().await?;
        Ok((users, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use crate::models::UserStatus;

    async fn setup_test_repo() -> SqlxUserRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxUserRepository::new(pool)
    }

    fn test_user(name: &str, email: &str, role: UserRole) -> User {
        User::new(name.to_string(), email.to_string(), "argon2-hash".to_string(), role)
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let repo = setup_test_repo().await;

        let created = repo
            .create(&test_user("Ada", "Ada@Zuree.com", UserRole::Editor))
            .await
            .expect("Failed to create user");
        assert!(created.id > 0);
        assert_eq!(created.email, "ada@zuree.com");

        let found = repo.get_by_id(created.id).await.unwrap().expect("User not found");
        assert_eq!(found.name, "Ada");
        assert_eq!(found.role, UserRole::Editor);
        assert_eq!(found.status, UserStatus::Active);
        assert_eq!(found.password_hash, "argon2-hash");
    }

    #[tokio::test]
    async fn test_get_by_email_ignores_case() {
        let repo = setup_test_repo().await;
        repo.create(&test_user("Ada", "ada@zuree.com", UserRole::User)).await.unwrap();

        assert!(repo.get_by_email("ADA@zuree.com").await.unwrap().is_some());
        assert!(repo.get_by_email("nobody@zuree.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unique_email_constraint() {
        let repo = setup_test_repo().await;
        repo.create(&test_user("Ada", "ada@zuree.com", UserRole::User)).await.unwrap();

        let result = repo.create(&test_user("Other", "ada@zuree.com", UserRole::User)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_update_user() {
        let repo = setup_test_repo().await;
        let mut user = repo
            .create(&test_user("Ada", "ada@zuree.com", UserRole::User))
            .await
            .unwrap();

        user.role = UserRole::Hr;
        user.status = UserStatus::Disabled;
        repo.update(&user).await.expect("Failed to update user");

        let found = repo.get_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(found.role, UserRole::Hr);
        assert_eq!(found.status, UserStatus::Disabled);
    }

    #[tokio::test]
    async fn test_delete_user() {
        let repo = setup_test_repo().await;
        let user = repo
            .create(&test_user("Ada", "ada@zuree.com", UserRole::User))
            .await
            .unwrap();

        repo.delete(user.id).await.expect("Failed to delete user");
        assert!(repo.get_by_id(user.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_count_and_list() {
        let repo = setup_test_repo().await;
        assert_eq!(repo.count().await.unwrap(), 0);

        for i in 0..3 {
            let role = if i == 0 { UserRole::Admin } else { UserRole::User };
            repo.create(&test_user(&format!("User {}", i), &format!("u{}@zuree.com", i), role))
                .await
                .unwrap();
        }

        assert_eq!(repo.count().await.unwrap(), 3);
        assert_eq!(repo.count_by_role(UserRole::Admin).await.unwrap(), 1);

        let (all, _) = repo.list(&ListParams::new(1, 10)).await.unwrap();
        let oldest = all.iter().map(|u| u.id).min().unwrap();
        let newest = all.iter().map(|u| u.id).max().unwrap();
        assert_eq!(repo.count_before(oldest).await.unwrap(), 0);
        assert_eq!(repo.count_before(newest).await.unwrap(), 2);

        let (page, total) = repo.list(&ListParams::new(1, 2)).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(page.len(), 2);
    }
}
