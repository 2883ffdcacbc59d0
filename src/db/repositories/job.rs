//! Job opening repository

use super::SlugLookup;
use crate::db::{
    impl_from_row, like_pattern, parse_column, with_driver, DynDatabasePool, LastInsertId,
};
use crate::models::{Job, JobFilter, ListParams};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::Row;
use std::sync::Arc;

const SELECT_JOBS: &str = r#"
    SELECT id, title, slug, department, location, employment_type, experience, salary_range,
           description, requirements, status, created_at, updated_at
    FROM jobs
"#;

// Bind order: status x2, department x2, location x2, employment_type x2, search x3
const FILTER_JOBS: &str = r#"
    WHERE (? IS NULL OR status = ?)
      AND (? IS NULL OR department = ?)
      AND (? IS NULL OR location = ?)
      AND (? IS NULL OR employment_type = ?)
      AND (? IS NULL OR title LIKE ? OR description LIKE ?)
"#;

#[async_trait]
pub trait JobRepository: SlugLookup {
    async fn create(&self, job: &Job) -> Result<Job>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Job>>;

    async fn update(&self, job: &Job) -> Result<Job>;

    /// Delete a job together with its applications
    async fn delete(&self, id: i64) -> Result<()>;

    /// List jobs matching `filter`, newest first
    async fn list(&self, filter: &JobFilter, params: &ListParams) -> Result<(Vec<Job>, i64)>;

    async fn count(&self, filter: &JobFilter) -> Result<i64>;
}

pub struct SqlxJobRepository {
    pool: DynDatabasePool,
}

impl SqlxJobRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn JobRepository> {
        Arc::new(Self::new(pool))
    }
}

impl_from_row!(Job, |row| {
    Ok(Job {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        slug: row.try_get("slug")?,
        department: row.try_get("department")?,
        location: row.try_get("location")?,
        employment_type: parse_column(row.try_get("employment_type")?, "employment_type")?,
        experience: row.try_get("experience")?,
        salary_range: row.try_get("salary_range")?,
        description: row.try_get("description")?,
        requirements: row.try_get("requirements")?,
        status: parse_column(row.try_get("status")?, "status")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
});

/// Filter values as bound into `FILTER_JOBS`
struct JobFilterBinds {
    status: Option<String>,
    department: Option<String>,
    location: Option<String>,
    employment_type: Option<String>,
    search: Option<String>,
}

impl From<&JobFilter> for JobFilterBinds {
    fn from(filter: &JobFilter) -> Self {
        Self {
            status: filter.status.map(|s| s.to_string()),
            department: filter.department.clone().filter(|d| !d.trim().is_empty()),
            location: filter.location.clone().filter(|l| !l.trim().is_empty()),
            employment_type: filter.employment_type.map(|t| t.to_string()),
            search: like_pattern(filter.search.as_deref()),
        }
    }
}

#[async_trait]
impl SlugLookup for SqlxJobRepository {
    async fn exists_by_slug(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool> {
        let count: i64 = with_driver!(self.pool, |conn| {
            sqlx::query_scalar("SELECT COUNT(*) FROM jobs WHERE slug = ? AND (? IS NULL OR id <> ?)")
                .bind(slug)
                .bind(exclude_id)
                .bind(exclude_id)
                .fetch_one(conn)
                .await
                .context("Failed to check job slug")?
        });
        Ok(count > 0)
    }
}

#[async_trait]
impl JobRepository for SqlxJobRepository {
    async fn create(&self, job: &Job) -> Result<Job> {
        let id = with_driver!(self.pool, |conn| {
            sqlx::query(
                r#"
                INSERT INTO jobs (title, slug, department, location, employment_type, experience,
                    salary_range, description, requirements, status, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&job.title)
            .bind(&job.slug)
            .bind(&job.department)
            .bind(&job.location)
            .bind(job.employment_type.to_string())
            .bind(&job.experience)
            .bind(&job.salary_range)
            .bind(&job.description)
            .bind(&job.requirements)
            .bind(job.status.to_string())
            .bind(job.created_at)
            .bind(job.updated_at)
            .execute(conn)
            .await
            .context("Failed to create job")?
            .last_id()
        });

        Ok(Job { id, ..job.clone() })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Job>> {
        let sql = format!("{} WHERE id = ?", SELECT_JOBS);
        with_driver!(self.pool, |conn| {
            sqlx::query_as(&sql)
                .bind(id)
                .fetch_optional(conn)
                .await
                .context("Failed to get job by ID")
        })
    }

    async fn update(&self, job: &Job) -> Result<Job> {
        with_driver!(self.pool, |conn| {
            sqlx::query(
                r#"
                UPDATE jobs
                SET title = ?, slug = ?, department = ?, location = ?, employment_type = ?,
                    experience = ?, salary_range = ?, description = ?, requirements = ?,
                    status = ?, updated_at = ?
                WHERE id = ?
                "#,
            )
            .bind(&job.title)
            .bind(&job.slug)
            .bind(&job.department)
            .bind(&job.location)
            .bind(job.employment_type.to_string())
            .bind(&job.experience)
            .bind(&job.salary_range)
            .bind(&job.description)
            .bind(&job.requirements)
            .bind(job.status.to_string())
            .bind(job.updated_at)
            .bind(job.id)
            .execute(conn)
            .await
            .context("Failed to update job")?;
        });
        Ok(job.clone())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        with_driver!(self.pool, |conn| {
            sqlx::query("DELETE FROM jobs WHERE id = ?")
                .bind(id)
                .execute(conn)
                .await
                .context("Failed to delete job")?;
        });
        Ok(())
    }

    async fn list(&self, filter: &JobFilter, params: &ListParams) -> Result<(Vec<Job>, i64)> {
        let binds = JobFilterBinds::from(filter);
        let sql = format!(
            "{} {} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
            SELECT_JOBS, FILTER_JOBS
        );

        let jobs: Vec<Job> = with_driver!(self.pool, |conn| {
            sqlx::query_as(&sql)
                .bind(&binds.status)
                .bind(&binds.status)
                .bind(&binds.department)
                .bind(&binds.department)
                .bind(&binds.location)
                .bind(&binds.location)
                .bind(&binds.employment_type)
                .bind(&binds.employment_type)
                .bind(&binds.search)
                .bind(&binds.search)
                .bind(&binds.search)
                .bind(params.limit())
                .bind(params.offset())
                .fetch_all(conn)
                .await
                .context("Failed to list jobs")?
        });

        let total = self.count(filter).await?;
        Ok((jobs, total))
    }

    async fn count(&self, filter: &JobFilter) -> Result<i64> {
        let binds = JobFilterBinds::from(filter);
        let sql = format!("SELECT COUNT(*) FROM jobs {}", FILTER_JOBS);

        with_driver!(self.pool, |conn| {
            sqlx::query_scalar(&sql)
                .bind(&binds.status)
                .bind(&binds.status)
                .bind(&binds.department)
                .bind(&binds.department)
                .bind(&binds.location)
                .bind(&binds.location)
                .bind(&binds.employment_type)
                .bind(&binds.employment_type)
                .bind(&binds.search)
                .bind(&binds.search)
                .bind(&binds.search)
                .fetch_one(conn)
                .await
                .context("Failed to count jobs")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use crate::models::{EmploymentType, JobStatus};
    use chrono::Utc;

    async fn setup_test_repo() -> SqlxJobRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxJobRepository::new(pool)
    }

    fn test_job(slug: &str, department: &str, kind: EmploymentType, status: JobStatus) -> Job {
        let now = Utc::now();
        Job {
            id: 0,
            title: format!("Job {}", slug),
            slug: slug.to_string(),
            department: department.to_string(),
            location: "Lagos".to_string(),
            employment_type: kind,
            experience: Some("2+ years".to_string()),
            salary_range: None,
            description: "Keep the network up".to_string(),
            requirements: None,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_job() {
        let repo = setup_test_repo().await;
        let created = repo
            .create(&test_job("noc", "Network", EmploymentType::Contract, JobStatus::Open))
            .await
            .expect("Failed to create job");

        let found = repo.get_by_id(created.id).await.unwrap().expect("Job not found");
        assert_eq!(found.slug, "noc");
        assert_eq!(found.employment_type, EmploymentType::Contract);
        assert_eq!(found.experience.as_deref(), Some("2+ years"));
        assert!(found.is_open());
    }

    #[tokio::test]
    async fn test_list_filters() {
        let repo = setup_test_repo().await;
        repo.create(&test_job("a", "Network", EmploymentType::FullTime, JobStatus::Open)).await.unwrap();
        repo.create(&test_job("b", "Sales", EmploymentType::Internship, JobStatus::Open)).await.unwrap();
        repo.create(&test_job("c", "Network", EmploymentType::FullTime, JobStatus::Closed)).await.unwrap();

        let params = ListParams::default();
        let open = JobFilter {
            status: Some(JobStatus::Open),
            ..Default::default()
        };
        assert_eq!(repo.count(&open).await.unwrap(), 2);

        let network_open = JobFilter {
            department: Some("Network".into()),
            ..open.clone()
        };
        let (jobs, total) = repo.list(&network_open, &params).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(jobs[0].slug, "a");

        let interns = JobFilter {
            employment_type: Some(EmploymentType::Internship),
            ..Default::default()
        };
        assert_eq!(repo.count(&interns).await.unwrap(), 1);

        let blank_department = JobFilter {
            department: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(repo.count(&blank_department).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_update_and_delete_job() {
        let repo = setup_test_repo().await;
        let mut job = repo
            .create(&test_job("rf", "Radio", EmploymentType::FullTime, JobStatus::Open))
            .await
            .unwrap();

        job.status = JobStatus::Closed;
        repo.update(&job).await.unwrap();
        assert!(!repo.get_by_id(job.id).await.unwrap().unwrap().is_open());

        repo.delete(job.id).await.unwrap();
        assert!(repo.get_by_id(job.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_exists_by_slug() {
        let repo = setup_test_repo().await;
        let job = repo
            .create(&test_job("unique", "Radio", EmploymentType::FullTime, JobStatus::Open))
            .await
            .unwrap();

        assert!(repo.exists_by_slug("unique", None).await.unwrap());
        assert!(!repo.exists_by_slug("unique", Some(job.id)).await.unwrap());
    }
}
