//! Team member repository

use crate::db::{impl_from_row, with_driver, DynDatabasePool, LastInsertId};
use crate::models::TeamMember;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::Row;
use std::sync::Arc;

#[async_trait]
pub trait TeamMemberRepository: Send + Sync {
    async fn create(&self, member: &TeamMember) -> Result<TeamMember>;

    async fn get_by_id(&self, id: i64) -> Result<Option<TeamMember>>;

    async fn update(&self, member: &TeamMember) -> Result<TeamMember>;

    async fn delete(&self, id: i64) -> Result<()>;

    /// List members by `sort_order`, then id
    async fn list(&self, active_only: bool) -> Result<Vec<TeamMember>>;

    async fn count(&self) -> Result<i64>;
}

pub struct SqlxTeamMemberRepository {
    pool: DynDatabasePool,
}

impl SqlxTeamMemberRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn TeamMemberRepository> {
        Arc::new(Self::new(pool))
    }
}

impl_from_row!(TeamMember, |row| {
    Ok(TeamMember {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        position: row.try_get("position")?,
        bio: row.try_get("bio")?,
        photo_url: row.try_get("photo_url")?,
        linkedin_url: row.try_get("linkedin_url")?,
        email: row.try_get("email")?,
        sort_order: row.try_get("sort_order")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
});

#[async_trait]
impl TeamMemberRepository for SqlxTeamMemberRepository {
    async fn create(&self, member: &TeamMember) -> Result<TeamMember> {
        let id = with_driver!(self.pool, |conn| {
            sqlx::query(
                r#"
                INSERT INTO team_members (name, position, bio, photo_url, linkedin_url, email,
                    sort_order, is_active, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&member.name)
            .bind(&member.position)
            .bind(&member.bio)
            .bind(&member.photo_url)
            .bind(&member.linkedin_url)
            .bind(&member.email)
            .bind(member.sort_order)
            .bind(member.is_active)
            .bind(member.created_at)
            .bind(member.updated_at)
            .execute(conn)
            .await
            .context("Failed to create team member")?
            .last_id()
        });

        Ok(TeamMember {
            id,
            ..member.clone()
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<TeamMember>> {
        with_driver!(self.pool, |conn| {
            sqlx::query_as(
                r#"
                SELECT id, name, position, bio, photo_url, linkedin_url, email, sort_order,
                       is_active, created_at, updated_at
                FROM team_members
                WHERE id = ?
                "#,
            )
            .bind(id)
            .fetch_optional(conn)
            .await
            .context("Failed to get team member by ID")
        })
    }

    async fn update(&self, member: &TeamMember) -> Result<TeamMember> {
        with_driver!(self.pool, |conn| {
            sqlx::query(
                r#"
                UPDATE team_members
                SET name = ?, position = ?, bio = ?, photo_url = ?, linkedin_url = ?, email = ?,
                    sort_order = ?, is_active = ?, updated_at = ?
                WHERE id = ?
                "#,
            )
            .bind(&member.name)
            .bind(&member.position)
            .bind(&member.bio)
            .bind(&member.photo_url)
            .bind(&member.linkedin_url)
            .bind(&member.email)
            .bind(member.sort_order)
            .bind(member.is_active)
            .bind(member.updated_at)
            .bind(member.id)
            .execute(conn)
            .await
            .context("Failed to update team member")?;
        });
        Ok(member.clone())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        with_driver!(self.pool, |conn| {
            sqlx::query("DELETE FROM team_members WHERE id = ?")
                .bind(id)
                .execute(conn)
                .await
                .context("Failed to delete team member")?;
        });
        Ok(())
    }

    async fn list(&self, active_only: bool) -> Result<Vec<TeamMember>> {
        with_driver!(self.pool, |conn| {
            sqlx::query_as(
                r#"
                SELECT id, name, position, bio, photo_url, linkedin_url, email, sort_order,
                       is_active, created_at, updated_at
                FROM team_members
                WHERE (? = 0 OR is_active = 1)
                ORDER BY sort_order ASC, id ASC
                "#,
            )
            .bind(active_only as i32)
            .fetch_all(conn)
            .await
            .context("Failed to list team members")
        })
    }

    async fn count(&self) -> Result<i64> {
        with_driver!(self.pool, |conn| {
            sqlx::query_scalar("SELECT COUNT(*) FROM team_members")
                .fetch_one(conn)
                .await
                .context("Failed to count team members")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use chrono::Utc;

    async fn setup_test_repo() -> SqlxTeamMemberRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxTeamMemberRepository::new(pool)
    }

    fn member(name: &str, sort_order: i32, is_active: bool) -> TeamMember {
        let now = Utc::now();
        TeamMember {
            id: 0,
            name: name.to_string(),
            position: "Engineer".to_string(),
            bio: None,
            photo_url: None,
            linkedin_url: Some(format!("https://linkedin.com/in/{}", name.to_lowercase())),
            email: None,
            sort_order,
            is_active,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_member() {
        let repo = setup_test_repo().await;
        let created = repo.create(&member("Amaka", 1, true)).await.unwrap();

        let found = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Amaka");
        assert_eq!(found.linkedin_url.as_deref(), Some("https://linkedin.com/in/amaka"));
    }

    #[tokio::test]
    async fn test_list_active_in_order() {
        let repo = setup_test_repo().await;
        repo.create(&member("Second", 2, true)).await.unwrap();
        repo.create(&member("First", 1, true)).await.unwrap();
        repo.create(&member("Former", 0, false)).await.unwrap();

        let names: Vec<String> = repo.list(true).await.unwrap().into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["First", "Second"]);
        assert_eq!(repo.list(false).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_update_and_delete_member() {
        let repo = setup_test_repo().await;
        let mut created = repo.create(&member("Tunde", 1, true)).await.unwrap();

        created.position = "CTO".to_string();
        repo.update(&created).await.unwrap();
        assert_eq!(repo.get_by_id(created.id).await.unwrap().unwrap().position, "CTO");

        repo.delete(created.id).await.unwrap();
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}
