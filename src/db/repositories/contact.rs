//! Contact message repository

use crate::db::{impl_from_row, parse_column, with_driver, DynDatabasePool, LastInsertId};
use crate::models::{ContactFilter, ContactMessage, ContactStatus, CreateContactInput, ListParams};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use std::sync::Arc;

#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// Store a validated message with status `new`
    async fn create(&self, input: &CreateContactInput) -> Result<ContactMessage>;

    async fn get_by_id(&self, id: i64) -> Result<Option<ContactMessage>>;

    async fn update_status(&self, id: i64, status: ContactStatus) -> Result<()>;

    async fn delete(&self, id: i64) -> Result<()>;

    /// List messages matching `filter`, newest first
    async fn list(
        &self,
        filter: &ContactFilter,
        params: &ListParams,
    ) -> Result<(Vec<ContactMessage>, i64)>;

    async fn count(&self, filter: &ContactFilter) -> Result<i64>;
}

pub struct SqlxContactRepository {
    pool: DynDatabasePool,
}

impl SqlxContactRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ContactRepository> {
        Arc::new(Self::new(pool))
    }
}

impl_from_row!(ContactMessage, |row| {
    Ok(ContactMessage {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        company: row.try_get("company")?,
        subject: row.try_get("subject")?,
        message: row.try_get("message")?,
        status: parse_column(row.try_get("status")?, "status")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
});

#[async_trait]
impl ContactRepository for SqlxContactRepository {
    async fn create(&self, input: &CreateContactInput) -> Result<ContactMessage> {
        let now = Utc::now();
        let id = with_driver!(self.pool, |conn| {
            sqlx::query(
                r#"
                INSERT INTO contact_messages (name, email, phone, company, subject, message,
                    status, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.company)
            .bind(&input.subject)
            .bind(&input.message)
            .bind(ContactStatus::New.to_string())
            .bind(now)
            .bind(now)
            .execute(conn)
            .await
            .context("Failed to create contact message")?
            .last_id()
        });

        Ok(ContactMessage {
            id,
            name: input.name.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
            company: input.company.clone(),
            subject: input.subject.clone(),
            message: input.message.clone(),
            status: ContactStatus::New,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<ContactMessage>> {
        with_driver!(self.pool, |conn| {
            sqlx::query_as(
                r#"
                SELECT id, name, email, phone, company, subject, message, status, created_at, updated_at
                FROM contact_messages
                WHERE id = ?
                "#,
            )
            .bind(id)
            .fetch_optional(conn)
            .await
            .context("Failed to get contact message by ID")
        })
    }

    async fn update_status(&self, id: i64, status: ContactStatus) -> Result<()> {
        with_driver!(self.pool, |conn| {
            sqlx::query("UPDATE contact_messages SET status = ?, updated_at = ? WHERE id = ?")
                .bind(status.to_string())
                .bind(Utc::now())
                .bind(id)
                .execute(conn)
                .await
                .context("Failed to update contact message status")?;
        });
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        with_driver!(self.pool, |conn| {
            sqlx::query("DELETE FROM contact_messages WHERE id = ?")
                .bind(id)
                .execute(conn)
                .await
                .context("Failed to delete contact message")?;
        });
        Ok(())
    }

    async fn list(
        &self,
        filter: &ContactFilter,
        params: &ListParams,
    ) -> Result<(Vec<ContactMessage>, i64)> {
        let status = filter.status.map(|s| s.to_string());
        let messages: Vec<ContactMessage> = with_driver!(self.pool, |conn| {
            sqlx::query_as(
                r#"
                SELECT id, name, email, phone, company, subject, message, status, created_at, updated_at
                FROM contact_messages
                WHERE (? IS NULL OR status = ?)
                ORDER BY created_at DESC, id DESC
                LIMIT ? OFFSET ?
                "#,
            )
            .bind(&status)
            .bind(&status)
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(conn)
            .await
            .context("Failed to list contact messages")?
        });

        let total = self.count(filter).await?;
        Ok((messages, total))
    }

    async fn count(&self, filter: &ContactFilter) -> Result<i64> {
        let status = filter.status.map(|s| s.to_string());
        with_driver!(self.pool, |conn| {
            sqlx::query_scalar("SELECT COUNT(*) FROM contact_messages WHERE (? IS NULL OR status = ?)")
                .bind(&status)
                .bind(&status)
                .fetch_one(conn)
                .await
                .context("Failed to count contact messages")
        })
    }
}
