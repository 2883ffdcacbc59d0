//! Service offerings shown on the services page

use crate::db::repositories::ServiceOfferingRepository;
use crate::models::clean_optional;
use crate::models::{CreateServiceInput, ServiceOffering, UpdateServiceInput};
use crate::services::validation::{self, merge_optional, slug_for_create, slug_for_update};
use crate::services::ServiceError;
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;

pub struct CatalogService {
    repo: Arc<dyn ServiceOfferingRepository>,
}

impl CatalogService {
    pub fn new(repo: Arc<dyn ServiceOfferingRepository>) -> Self {
        Self { repo }
    }

    /// Offerings ordered by `sort_order`, optionally only active ones
    pub async fn list(&self, active_only: bool) -> Result<Vec<ServiceOffering>, ServiceError> {
        Ok(self
            .repo
            .list(active_only)
            .await
            .context("Failed to list services")?)
    }

    /// An active offering by slug. Inactive ones are reported as missing.
    pub async fn get_active(&self, slug: &str) -> Result<ServiceOffering, ServiceError> {
        self.repo
            .get_by_slug(slug)
            .await
            .context("Failed to get service by slug")?
            .filter(|s| s.is_active)
            .ok_or(ServiceError::NotFound("Service"))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<ServiceOffering, ServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get service")?
            .ok_or(ServiceError::NotFound("Service"))
    }

    pub async fn count(&self) -> Result<i64, ServiceError> {
        Ok(self.repo.count().await.context("Failed to count services")?)
    }

    pub async fn create(&self, input: CreateServiceInput) -> Result<ServiceOffering, ServiceError> {
        let title = validation::required(&input.title, "Title", 200)?;
        let summary = validation::required(&input.summary, "Summary", 500)?;
        let slug = slug_for_create(&*self.repo, input.slug.as_deref(), &title).await?;
        let now = Utc::now();

        let offering = ServiceOffering {
            id: 0,
            slug,
            title,
            summary,
            description: clean_optional(input.description),
            icon: clean_optional(input.icon),
            sort_order: input.sort_order.unwrap_or(0),
            is_active: input.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };

        let created = self
            .repo
            .create(&offering)
            .await
            .context("Failed to create service")?;
        tracing::info!(service_id = created.id, slug = %created.slug, "Service created");
        Ok(created)
    }

    pub async fn update(
        &self,
        id: i64,
        input: UpdateServiceInput,
    ) -> Result<ServiceOffering, ServiceError> {
        let existing = self.get_by_id(id).await?;
        let slug = slug_for_update(&*self.repo, id, &existing.slug, input.slug.as_deref())
            .await?
            .unwrap_or_else(|| existing.slug.clone());

        let title = match input.title {
            Some(title) => validation::required(&title, "Title", 200)?,
            None => existing.title.clone(),
        };
        let summary = match input.summary {
            Some(summary) => validation::required(&summary, "Summary", 500)?,
            None => existing.summary.clone(),
        };

        let offering = ServiceOffering {
            slug,
            title,
            summary,
            description: merge_optional(existing.description.clone(), input.description),
            icon: merge_optional(existing.icon.clone(), input.icon),
            sort_order: input.sort_order.unwrap_or(existing.sort_order),
            is_active: input.is_active.unwrap_or(existing.is_active),
            updated_at: Utc::now(),
            ..existing
        };

        Ok(self
            .repo
            .update(&offering)
            .await
            .context("Failed to update service")?)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        self.get_by_id(id).await?;
        self.repo.delete(id).await.context("Failed to delete service")?;
        tracing::info!(service_id = id, "Service deleted");
        Ok(())
    }
}
