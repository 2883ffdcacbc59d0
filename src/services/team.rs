//! Team members shown on the about page

use crate::db::repositories::TeamMemberRepository;
use crate::models::clean_optional;
use crate::models::{CreateTeamMemberInput, TeamMember, UpdateTeamMemberInput};
use crate::services::validation::{self, merge_optional};
use crate::services::ServiceError;
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;

pub struct TeamService {
    repo: Arc<dyn TeamMemberRepository>,
}

impl TeamService {
    pub fn new(repo: Arc<dyn TeamMemberRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, active_only: bool) -> Result<Vec<TeamMember>, ServiceError> {
        Ok(self
            .repo
            .list(active_only)
            .await
            .context("Failed to list team members")?)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<TeamMember, ServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get team member")?
            .ok_or(ServiceError::NotFound("Team member"))
    }

    pub async fn count(&self) -> Result<i64, ServiceError> {
        Ok(self.repo.count().await.context("Failed to count team members")?)
    }

    pub async fn create(&self, input: CreateTeamMemberInput) -> Result<TeamMember, ServiceError> {
        let now = Utc::now();
        let member = TeamMember {
            id: 0,
            name: validation::required(&input.name, "Name", 150)?,
            position: validation::required(&input.position, "Position", 150)?,
            bio: clean_optional(input.bio),
            photo_url: clean_optional(input.photo_url),
            linkedin_url: clean_optional(input.linkedin_url),
            email: optional_email(clean_optional(input.email))?,
            sort_order: input.sort_order.unwrap_or(0),
            is_active: input.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };

        let created = self
            .repo
            .create(&member)
            .await
            .context("Failed to create team member")?;
        tracing::info!(member_id = created.id, "Team member created");
        Ok(created)
    }

    pub async fn update(
        &self,
        id: i64,
        input: UpdateTeamMemberInput,
    ) -> Result<TeamMember, ServiceError> {
        let existing = self.get_by_id(id).await?;

        let name = match input.name {
            Some(name) => validation::required(&name, "Name", 150)?,
            None => existing.name.clone(),
        };
        let position = match input.position {
            Some(position) => validation::required(&position, "Position", 150)?,
            None => existing.position.clone(),
        };

        let member = TeamMember {
            name,
            position,
            bio: merge_optional(existing.bio.clone(), input.bio),
            photo_url: merge_optional(existing.photo_url.clone(), input.photo_url),
            linkedin_url: merge_optional(existing.linkedin_url.clone(), input.linkedin_url),
            email: optional_email(merge_optional(existing.email.clone(), input.email))?,
            sort_order: input.sort_order.unwrap_or(existing.sort_order),
            is_active: input.is_active.unwrap_or(existing.is_active),
            updated_at: Utc::now(),
            ..existing
        };

        Ok(self
            .repo
            .update(&member)
            .await
            .context("Failed to update team member")?)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        self.get_by_id(id).await?;
        self.repo
            .delete(id)
            .await
            .context("Failed to delete team member")?;
        tracing::info!(member_id = id, "Team member deleted");
        Ok(())
    }
}

fn optional_email(email: Option<String>) -> Result<Option<String>, ServiceError> {
    email.map(|e| validation::email(&e)).transpose()
}
