//! Login audit log repository

use crate::db::{impl_from_row, with_driver, DynDatabasePool};
use crate::models::{ListParams, LoginAttempt, LoginLog};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use std::sync::Arc;

#[async_trait]
pub trait LoginLogRepository: Send + Sync {
    /// Append one attempt
    async fn record(&self, attempt: &LoginAttempt) -> Result<()>;

    /// Newest attempts first
    async fn list(&self, params: &ListParams) -> Result<(Vec<LoginLog>, i64)>;
}

pub struct SqlxLoginLogRepository {
    pool: DynDatabasePool,
}

impl SqlxLoginLogRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn LoginLogRepository> {
        Arc::new(Self::new(pool))
    }
}

impl_from_row!(LoginLog, |row| {
    Ok(LoginLog {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        ip_address: row.try_get("ip_address")?,
        user_agent: row.try_get("user_agent")?,
        success: row.try_get("success")?,
        failure_reason: row.try_get("failure_reason")?,
        created_at: row.try_get("created_at")?,
    })
});

#[async_trait]
impl LoginLogRepository for SqlxLoginLogRepository {
    async fn record(&self, attempt: &LoginAttempt) -> Result<()> {
        let user_agent = attempt
            .user_agent
            .as_ref()
            .map(|ua| ua.chars().take(500).collect::<String>());

        with_driver!(self.pool, |conn| {
            sqlx::query(
                r#"
                INSERT INTO login_logs (email, ip_address, user_agent, success, failure_reason, created_at)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&attempt.email)
            .bind(&attempt.ip_address)
            .bind(&user_agent)
            .bind(attempt.success)
            .bind(&attempt.failure_reason)
            .bind(Utc::now())
            .execute(conn)
            .await
            .context("Failed to record login attempt")?;
        });
        Ok(())
    }

    async fn list(&self, params: &ListParams) -> Result<(Vec<LoginLog>, i64)> {
        with_driver!(self.pool, |conn| {
            let logs: Vec<LoginLog> = sqlx::query_as(
                r#"
                SELECT id, email, ip_address, user_agent, success, failure_reason, created_at
                FROM login_logs
                ORDER BY id DESC
                LIMIT ? OFFSET ?
                "#,
            )
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(conn)
            .await
            .context("Failed to list login logs")?;

            let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM login_logs")
                .fetch_one(conn)
                .await
                .context("Failed to count login logs")?;

            Ok((logs, total))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    #[tokio::test]
    async fn test_record_and_list() {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool).await.expect("Failed to run migrations");
        let repo = SqlxLoginLogRepository::new(pool);

        repo.record(&LoginAttempt::failed(
            "Ada@Zuree.com",
            Some("10.0.0.1".into()),
            None,
            "invalid_password",
        ))
        .await
        .unwrap();
        repo.record(&LoginAttempt::succeeded("ada@zuree.com", Some("10.0.0.1".into()), None))
            .await
            .unwrap();

        let (logs, total) = repo.list(&ListParams::default()).await.unwrap();
        assert_eq!(total, 2);
        assert!(logs[0].success);
        assert!(!logs[1].success);
        assert_eq!(logs[1].email, "ada@zuree.com");
        assert_eq!(logs[1].failure_reason.as_deref(), Some("invalid_password"));
    }
}
