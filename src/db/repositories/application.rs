//! Job application repository

use crate::db::{impl_from_row, parse_column, with_driver, DynDatabasePool, LastInsertId};
use crate::models::{Application, ApplicationFilter, ApplicationStatus, ListParams};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use std::sync::Arc;

const SELECT_APPLICATIONS: &str = r#"
    SELECT a.id, a.job_id, j.title AS job_title, a.full_name, a.email, a.phone, a.resume_url,
           a.cover_letter, a.status, a.created_at, a.updated_at
    FROM applications a
    INNER JOIN jobs j ON j.id = a.job_id
"#;

// Bind order: job_id x2, status x2
const FILTER_APPLICATIONS: &str = r#"
    WHERE (? IS NULL OR a.job_id = ?)
      AND (? IS NULL OR a.status = ?)
"#;

/// A new application as written to the database
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub job_id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub resume_url: Option<String>,
    pub cover_letter: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    async fn create(&self, application: &NewApplication) -> Result<Application>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Application>>;

    /// Check whether `email` already applied for `job_id`
    async fn exists_for_job(&self, job_id: i64, email: &str) -> Result<bool>;

    async fn update_status(&self, id: i64, status: ApplicationStatus) -> Result<()>;

    async fn delete(&self, id: i64) -> Result<()>;

    /// List applications matching `filter`, newest first
    async fn list(
        &self,
        filter: &ApplicationFilter,
        params: &ListParams,
    ) -> Result<(Vec<Application>, i64)>;

    async fn count(&self, filter: &ApplicationFilter) -> Result<i64>;
}

pub struct SqlxApplicationRepository {
    pool: DynDatabasePool,
}

impl SqlxApplicationRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ApplicationRepository> {
        Arc::new(Self::new(pool))
    }
}

impl_from_row!(Application, |row| {
    Ok(Application {
        id: row.try_get("id")?,
        job_id: row.try_get("job_id")?,
        job_title: row.try_get("job_title")?,
        full_name: row.try_get("full_name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        resume_url: row.try_get("resume_url")?,
        cover_letter: row.try_get("cover_letter")?,
        status: parse_column(row.try_get("status")?, "status")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
});

#[async_trait]
impl ApplicationRepository for SqlxApplicationRepository {
    async fn create(&self, application: &NewApplication) -> Result<Application> {
        let id = with_driver!(self.pool, |conn| {
            sqlx::query(
                r#"
                INSERT INTO applications (job_id, full_name, email, phone, resume_url,
                    cover_letter, status, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(application.job_id)
            .bind(&application.full_name)
            .bind(application.email.to_lowercase())
            .bind(&application.phone)
            .bind(&application.resume_url)
            .bind(&application.cover_letter)
            .bind(ApplicationStatus::Pending.to_string())
            .bind(application.created_at)
            .bind(application.created_at)
            .execute(conn)
            .await
            .context("Failed to create application")?
            .last_id()
        });

        self.get_by_id(id)
            .await?
            .context("Application missing after insert")
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Application>> {
        let sql = format!("{} WHERE a.id = ?", SELECT_APPLICATIONS);
        with_driver!(self.pool, |conn| {
            sqlx::query_as(&sql)
                .bind(id)
                .fetch_optional(conn)
                .await
                .context("Failed to get application by ID")
        })
    }

    async fn exists_for_job(&self, job_id: i64, email: &str) -> Result<bool> {
        let count: i64 = with_driver!(self.pool, |conn| {
            sqlx::query_scalar("SELECT COUNT(*) FROM applications WHERE job_id = ? AND email = ?")
                .bind(job_id)
                .bind(email.to_lowercase())
                .fetch_one(conn)
                .await
                .context("Failed to check for duplicate application")?
        });
        Ok(count > 0)
    }

    async fn update_status(&self, id: i64, status: ApplicationStatus) -> Result<()> {
        with_driver!(self.pool, |conn| {
            sqlx::query("UPDATE applications SET status = ?, updated_at = ? WHERE id = ?")
                .bind(status.to_string())
                .bind(Utc::now())
                .bind(id)
                .execute(conn)
                .await
                .context("Failed to update application status")?;
        });
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        with_driver!(self.pool, |conn| {
            sqlx::query("DELETE FROM applications WHERE id = ?")
                .bind(id)
                .execute(conn)
                .await
                .context("Failed to delete application")?;
        });
        Ok(())
    }

    async fn list(
        &self,
        filter: &ApplicationFilter,
        params: &ListParams,
    ) -> Result<(Vec<Application>, i64)> {
        let status = filter.status.map(|s| s.to_string());
        let sql = format!(
            "{} {} ORDER BY a.created_at DESC, a.id DESC LIMIT ? OFFSET ?",
            SELECT_APPLICATIONS, FILTER_APPLICATIONS
        );

        let applications: Vec<Application> = with_driver!(self.pool, |conn| {
            sqlx::query_as(&sql)
                .bind(filter.job_id)
                .bind(filter.job_id)
                .bind(&status)
                .bind(&status)
                .bind(params.limit())
                .bind(params.offset())
                .fetch_all(conn)
                .await
                .context("Failed to list applications")?
        });

        let total = self.count(filter).await?;
        Ok((applications, total))
    }

    async fn count(&self, filter: &ApplicationFilter) -> Result<i64> {
        let status = filter.status.map(|s| s.to_string());
        let sql = format!("SELECT COUNT(*) FROM applications a {}", FILTER_APPLICATIONS);

        with_driver!(self.pool, |conn| {
            sqlx::query_scalar(&sql)
                .bind(filter.job_id)
                .bind(filter.job_id)
                .bind(&status)
                .bind(&status)
                .fetch_one(conn)
                .await
                .context("Failed to count applications")
        })
    }
}
