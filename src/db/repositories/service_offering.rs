//! Service offering repository

use super::SlugLookup;
use crate::db::{impl_from_row, with_driver, DynDatabasePool, LastInsertId};
use crate::models::ServiceOffering;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::Row;
use std::sync::Arc;

#[async_trait]
pub trait ServiceOfferingRepository: SlugLookup {
    async fn create(&self, offering: &ServiceOffering) -> Result<ServiceOffering>;

    async fn get_by_id(&self, id: i64) -> Result<Option<ServiceOffering>>;

    async fn get_by_slug(&self, slug: &str) -> Result<Option<ServiceOffering>>;

    async fn update(&self, offering: &ServiceOffering) -> Result<ServiceOffering>;

    async fn delete(&self, id: i64) -> Result<()>;

    /// List offerings by `sort_order`, then id
    async fn list(&self, active_only: bool) -> Result<Vec<ServiceOffering>>;

    async fn count(&self) -> Result<i64>;
}

pub struct SqlxServiceOfferingRepository {
    pool: DynDatabasePool,
}

impl SqlxServiceOfferingRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ServiceOfferingRepository> {
        Arc::new(Self::new(pool))
    }
}

impl_from_row!(ServiceOffering, |row| {
    Ok(ServiceOffering {
        id: row.try_get("id")?,
        slug: row.try_get("slug")?,
        title: row.try_get("title")?,
        summary: row.try_get("summary")?,
        description: row.try_get("description")?,
        icon: row.try_get("icon")?,
        sort_order: row.try_get("sort_order")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
});

#[async_trait]
impl SlugLookup for SqlxServiceOfferingRepository {
    async fn exists_by_slug(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool> {
        let count: i64 = with_driver!(self.pool, |conn| {
            sqlx::query_scalar(
                "SELECT COUNT(*) FROM service_offerings WHERE slug = ? AND (? IS NULL OR id <> ?)",
            )
            .bind(slug)
            .bind(exclude_id)
            .bind(exclude_id)
            .fetch_one(conn)
            .await
            .context("Failed to check service slug")?
        });
        Ok(count > 0)
    }
}

#[async_trait]
impl ServiceOfferingRepository for SqlxServiceOfferingRepository {
    async fn create(&self, offering: &ServiceOffering) -> Result<ServiceOffering> {
        let id = with_driver!(self.pool, |conn| {
            sqlx::query(
                r#"
                INSERT INTO service_offerings (slug, title, summary, description, icon,
                    sort_order, is_active, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&offering.slug)
            .bind(&offering.title)
            .bind(&offering.summary)
            .bind(&offering.description)
            .bind(&offering.icon)
            .bind(offering.sort_order)
            .bind(offering.is_active)
            .bind(offering.created_at)
            .bind(offering.updated_at)
            .execute(conn)
            .await
            .context("Failed to create service offering")?
            .last_id()
        });

        Ok(ServiceOffering {
            id,
            ..offering.clone()
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<ServiceOffering>> {
        with_driver!(self.pool, |conn| {
            sqlx::query_as(
                r#"
                SELECT id, slug, title, summary, description, icon, sort_order, is_active,
                       created_at, updated_at
                FROM service_offerings
                WHERE id = ?
                "#,
            )
            .bind(id)
            .fetch_optional(conn)
            .await
            .context("Failed to get service offering by ID")
        })
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<ServiceOffering>> {
        with_driver!(self.pool, |conn| {
            sqlx::query_as(
                r#"
                SELECT id, slug, title, summary, description, icon, sort_order, is_active,
                       created_at, updated_at
                FROM service_offerings
                WHERE slug = ?
                "#,
            )
            .bind(slug)
            .fetch_optional(conn)
            .await
            .context("Failed to get service offering by slug")
        })
    }

    async fn update(&self, offering: &ServiceOffering) -> Result<ServiceOffering> {
        with_driver!(self.pool, |conn| {
            sqlx::query(
                r#"
                UPDATE service_offerings
                SET slug = ?, title = ?, summary = ?, description = ?, icon = ?,
                    sort_order = ?, is_active = ?, updated_at = ?
                WHERE id = ?
                "#,
            )
            .bind(&offering.slug)
            .bind(&offering.title)
            .bind(&offering.summary)
            .bind(&offering.description)
            .bind(&offering.icon)
            .bind(offering.sort_order)
            .bind(offering.is_active)
            .bind(offering.updated_at)
            .bind(offering.id)
            .execute(conn)
            .await
            .context("Failed to update service offering")?;
        });
        Ok(offering.clone())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        with_driver!(self.pool, |conn| {
            sqlx::query("DELETE FROM service_offerings WHERE id = ?")
                .bind(id)
                .execute(conn)
                .await
                .context("Failed to delete service offering")?;
        });
        Ok(())
    }

    async fn list(&self, active_only: bool) -> Result<Vec<ServiceOffering>> {
        with_driver!(self.pool, |conn| {
            sqlx::query_as(
                r#"
                SELECT id, slug, title, summary, description, icon, sort_order, is_active,
                       created_at, updated_at
                FROM service_offerings
                WHERE (? = 0 OR is_active = 1)
                ORDER BY sort_order ASC, id ASC
                "#,
            )
            .bind(active_only as i32)
            .fetch_all(conn)
            .await
            .context("Failed to list service offerings")
        })
    }

    async fn count(&self) -> Result<i64> {
        with_driver!(self.pool, |conn| {
            sqlx::query_scalar("SELECT COUNT(*) FROM service_offerings")
                .fetch_one(conn)
                .await
                .context("Failed to count service offerings")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use chrono::Utc;

    async fn setup_test_repo() -> SqlxServiceOfferingRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxServiceOfferingRepository::new(pool)
    }

    fn offering(slug: &str, sort_order: i32, is_active: bool) -> ServiceOffering {
        let now = Utc::now();
        ServiceOffering {
            id: 0,
            slug: slug.to_string(),
            title: slug.to_uppercase(),
            summary: "Carrier-grade connectivity".to_string(),
            description: None,
            icon: Some("wifi".to_string()),
            sort_order,
            is_active,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_by_slug() {
        let repo = setup_test_repo().await;
        let created = repo.create(&offering("fiber", 1, true)).await.unwrap();

        let found = repo.get_by_slug("fiber").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.icon.as_deref(), Some("wifi"));
        assert!(found.is_active);
    }

    #[tokio::test]
    async fn test_list_orders_and_filters_inactive() {
        let repo = setup_test_repo().await;
        repo.create(&offering("voice", 3, true)).await.unwrap();
        repo.create(&offering("fiber", 1, true)).await.unwrap();
        repo.create(&offering("legacy", 2, false)).await.unwrap();

        let public: Vec<String> = repo.list(true).await.unwrap().into_iter().map(|o| o.slug).collect();
        assert_eq!(public, vec!["fiber", "voice"]);

        let all: Vec<String> = repo.list(false).await.unwrap().into_iter().map(|o| o.slug).collect();
        assert_eq!(all, vec!["fiber", "legacy", "voice"]);
        assert_eq!(repo.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let repo = setup_test_repo().await;
        let mut created = repo.create(&offering("cloud", 1, true)).await.unwrap();

        created.is_active = false;
        created.sort_order = 9;
        repo.update(&created).await.unwrap();
        let found = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert!(!found.is_active);
        assert_eq!(found.sort_order, 9);

        repo.delete(created.id).await.unwrap();
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
    }
}
