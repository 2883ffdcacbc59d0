//! Contact form service
//!
//! Stores messages from the public contact form and hands each one to a
//! [`ContactNotifier`] in the background. Notification failures are logged
//! and never reach the visitor.

use crate::db::repositories::ContactRepository;
use crate::models::clean_optional;
use crate::models::{
    ContactFilter, ContactMessage, ContactStatus, CreateContactInput, ListParams, PagedResult,
};
use crate::services::email::ContactNotifier;
use crate::services::validation::{self, MAX_MESSAGE_CHARS};
use crate::services::ServiceError;
use anyhow::Context;
use std::sync::Arc;

pub struct ContactService {
    repo: Arc<dyn ContactRepository>,
    notifier: Arc<dyn ContactNotifier>,
}

impl ContactService {
    pub fn new(repo: Arc<dyn ContactRepository>, notifier: Arc<dyn ContactNotifier>) -> Self {
        Self { repo, notifier }
    }

    /// Validate and store a message, then notify in the background.
    pub async fn submit(&self, input: CreateContactInput) -> Result<ContactMessage, ServiceError> {
        let input = CreateContactInput {
            name: validation::required(&input.name, "Name", 150)?,
            email: validation::email(&input.email)?,
            phone: clean_optional(input.phone),
            company: clean_optional(input.company),
            subject: clean_optional(input.subject),
            message: validation::required(&input.message, "Message", MAX_MESSAGE_CHARS)?,
        };

        let message = self
            .repo
            .create(&input)
            .await
            .context("Failed to store contact message")?;
        tracing::info!(contact_id = message.id, "Contact message received");

        let notifier = self.notifier.clone();
        let stored = message.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.contact_received(&stored).await {
                tracing::warn!(contact_id = stored.id, "Failed to send contact notification: {:#}", e);
            }
        });

        Ok(message)
    }

    pub async fn list(
        &self,
        filter: &ContactFilter,
        params: &ListParams,
    ) -> Result<PagedResult<ContactMessage>, ServiceError> {
        let (items, total) = self
            .repo
            .list(filter, params)
            .await
            .context("Failed to list contact messages")?;
        Ok(PagedResult::new(items, total, params))
    }

    /// Fetch a message for an admin. Opening a `new` message marks it `read`.
    pub async fn open(&self, id: i64) -> Result<ContactMessage, ServiceError> {
        let message = self.get(id).await?;
        if message.status != ContactStatus::New {
            return Ok(message);
        }

        self.repo
            .update_status(id, ContactStatus::Read)
            .await
            .context("Failed to mark contact message read")?;
        self.get(id).await
    }

    pub async fn update_status(
        &self,
        id: i64,
        status: ContactStatus,
    ) -> Result<ContactMessage, ServiceError> {
        self.get(id).await?;
        self.repo
            .update_status(id, status)
            .await
            .context("Failed to update contact status")?;
        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        self.get(id).await?;
        self.repo
            .delete(id)
            .await
            .context("Failed to delete contact message")?;
        Ok(())
    }

    pub async fn count(&self, filter: &ContactFilter) -> Result<i64, ServiceError> {
        Ok(self
            .repo
            .count(filter)
            .await
            .context("Failed to count contact messages")?)
    }

    async fn get(&self, id: i64) -> Result<ContactMessage, ServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get contact message")?
            .ok_or(ServiceError::NotFound("Contact message"))
    }
}
