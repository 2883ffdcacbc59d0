//! Careers service: job postings and the applications sent to them

use crate::db::repositories::{ApplicationRepository, JobRepository, NewApplication};
use crate::models::clean_optional;
use crate::models::{
    Application, ApplicationFilter, ApplicationStatus, CreateApplicationInput, CreateJobInput,
    Job, JobFilter, JobStatus, ListParams, PagedResult, UpdateJobInput,
};
use crate::services::error::is_unique_violation;
use crate::services::validation::{
    self, merge_optional, slug_for_create, slug_for_update, MAX_MESSAGE_CHARS,
};
use crate::services::ServiceError;
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;

const DUPLICATE_APPLICATION: &str = "You have already applied for this position";

pub struct CareerService {
    jobs: Arc<dyn JobRepository>,
    applications: Arc<dyn ApplicationRepository>,
}

impl CareerService {
    pub fn new(jobs: Arc<dyn JobRepository>, applications: Arc<dyn ApplicationRepository>) -> Self {
        Self { jobs, applications }
    }

    // ---- jobs ----

    /// Open jobs for the public careers page. Any status in `filter` is ignored.
    pub async fn list_open_jobs(
        &self,
        filter: JobFilter,
        params: &ListParams,
    ) -> Result<PagedResult<Job>, ServiceError> {
        let filter = JobFilter {
            status: Some(JobStatus::Open),
            ..filter
        };
        self.list_jobs(&filter, params).await
    }

    pub async fn list_jobs(
        &self,
        filter: &JobFilter,
        params: &ListParams,
    ) -> Result<PagedResult<Job>, ServiceError> {
        let (jobs, total) = self
            .jobs
            .list(filter, params)
            .await
            .context("Failed to list jobs")?;
        Ok(PagedResult::new(jobs, total, params))
    }

    /// A job visible to applicants. Closed jobs are reported as missing.
    pub async fn get_open_job(&self, id: i64) -> Result<Job, ServiceError> {
        let job = self.get_job(id).await?;
        if !job.is_open() {
            return Err(ServiceError::NotFound("Job"));
        }
        Ok(job)
    }

    pub async fn get_job(&self, id: i64) -> Result<Job, ServiceError> {
        self.jobs
            .get_by_id(id)
            .await
            .context("Failed to get job")?
            .ok_or(ServiceError::NotFound("Job"))
    }

    pub async fn count_jobs(&self, filter: &JobFilter) -> Result<i64, ServiceError> {
        Ok(self.jobs.count(filter).await.context("Failed to count jobs")?)
    }

    pub async fn create_job(&self, input: CreateJobInput) -> Result<Job, ServiceError> {
        let title = validation::required(&input.title, "Title", 200)?;
        let department = validation::required(&input.department, "Department", 100)?;
        let location = validation::required(&input.location, "Location", 100)?;
        let description = validation::required(&input.description, "Description", 20_000)?;
        let slug = slug_for_create(&*self.jobs, input.slug.as_deref(), &title).await?;
        let now = Utc::now();

        let job = Job {
            id: 0,
            title,
            slug,
            department,
            location,
            employment_type: input.employment_type.unwrap_or_default(),
            experience: clean_optional(input.experience),
            salary_range: clean_optional(input.salary_range),
            description,
            requirements: clean_optional(input.requirements),
            status: input.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        let created = self.jobs.create(&job).await.context("Failed to create job")?;
        tracing::info!(job_id = created.id, slug = %created.slug, "Job created");
        Ok(created)
    }

    pub async fn update_job(&self, id: i64, input: UpdateJobInput) -> Result<Job, ServiceError> {
        let existing = self.get_job(id).await?;
        let slug = slug_for_update(&*self.jobs, id, &existing.slug, input.slug.as_deref())
            .await?
            .unwrap_or_else(|| existing.slug.clone());

        let job = Job {
            title: replace_required(input.title, "Title", 200, &existing.title)?,
            slug,
            department: replace_required(input.department, "Department", 100, &existing.department)?,
            location: replace_required(input.location, "Location", 100, &existing.location)?,
            employment_type: input.employment_type.unwrap_or(existing.employment_type),
            experience: merge_optional(existing.experience.clone(), input.experience),
            salary_range: merge_optional(existing.salary_range.clone(), input.salary_range),
            description: replace_required(input.description, "Description", 20_000, &existing.description)?,
            requirements: merge_optional(existing.requirements.clone(), input.requirements),
            status: input.status.unwrap_or(existing.status),
            updated_at: Utc::now(),
            ..existing
        };

        let updated = self.jobs.update(&job).await.context("Failed to update job")?;
        tracing::info!(job_id = id, status = %updated.status, "Job updated");
        Ok(updated)
    }

    /// Delete a job together with its applications
    pub async fn delete_job(&self, id: i64) -> Result<(), ServiceError> {
        self.get_job(id).await?;
        self.jobs.delete(id).await.context("Failed to delete job")?;
        tracing::info!(job_id = id, "Job deleted");
        Ok(())
    }

    // ---- applications ----

    /// Submit an application for an open job.
    ///
    /// One application per job and email address.
    pub async fn apply(&self, input: CreateApplicationInput) -> Result<Application, ServiceError> {
        let full_name = validation::required(&input.full_name, "Full name", 150)?;
        let email = validation::email(&input.email)?;
        let cover_letter = clean_optional(input.cover_letter);
        if cover_letter
            .as_ref()
            .is_some_and(|c| c.chars().count() > MAX_MESSAGE_CHARS)
        {
            return Err(ServiceError::validation(format!(
                "Cover letter must be at most {} characters",
                MAX_MESSAGE_CHARS
            )));
        }

        let job = self.get_job(input.job_id).await?;
        if !job.is_open() {
            return Err(ServiceError::validation(
                "This position is no longer accepting applications",
            ));
        }

        if self
            .applications
            .exists_for_job(job.id, &email)
            .await
            .context("Failed to check existing application")?
        {
            return Err(ServiceError::conflict(DUPLICATE_APPLICATION));
        }

        let application = NewApplication {
            job_id: job.id,
            full_name,
            email,
            phone: clean_optional(input.phone),
            resume_url: clean_optional(input.resume_url),
            cover_letter,
            created_at: Utc::now(),
        };

        let created = match self.applications.create(&application).await {
            Ok(created) => created,
            Err(e) if is_unique_violation(&e) => {
                return Err(ServiceError::conflict(DUPLICATE_APPLICATION));
            }
            Err(e) => return Err(e.context("Failed to create application").into()),
        };

        tracing::info!(application_id = created.id, job_id = job.id, "Application received");
        Ok(created)
    }

    pub async fn list_applications(
        &self,
        filter: &ApplicationFilter,
        params: &ListParams,
    ) -> Result<PagedResult<Application>, ServiceError> {
        let (items, total) = self
            .applications
            .list(filter, params)
            .await
            .context("Failed to list applications")?;
        Ok(PagedResult::new(items, total, params))
    }

    pub async fn get_application(&self, id: i64) -> Result<Application, ServiceError> {
        self.applications
            .get_by_id(id)
            .await
            .context("Failed to get application")?
            .ok_or(ServiceError::NotFound("Application"))
    }

    pub async fn count_applications(&self, filter: &ApplicationFilter) -> Result<i64, ServiceError> {
        Ok(self
            .applications
            .count(filter)
            .await
            .context("Failed to count applications")?)
    }

    pub async fn update_application_status(
        &self,
        id: i64,
        status: ApplicationStatus,
    ) -> Result<Application, ServiceError> {
        self.get_application(id).await?;
        self.applications
            .update_status(id, status)
            .await
            .context("Failed to update application status")?;
        tracing::info!(application_id = id, %status, "Application status changed");
        self.get_application(id).await
    }

    pub async fn delete_application(&self, id: i64) -> Result<(), ServiceError> {
        self.get_application(id).await?;
        self.applications
            .delete(id)
            .await
            .context("Failed to delete application")?;
        Ok(())
    }
}

/// Validate a replacement for a required text field, keeping `current` when absent
fn replace_required(
    value: Option<String>,
    field: &str,
    max_chars: usize,
    current: &str,
) -> Result<String, ServiceError> {
    match value {
        Some(value) => validation::required(&value, field, max_chars),
        None => Ok(current.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxApplicationRepository, SqlxJobRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::EmploymentType;

    async fn setup_test_service() -> CareerService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        CareerService::new(
            SqlxJobRepository::boxed(pool.clone()),
            SqlxApplicationRepository::boxed(pool),
        )
    }

    fn job_input(title: &str) -> CreateJobInput {
        CreateJobInput {
            title: title.to_string(),
            department: "Engineering".to_string(),
            location: "Lagos".to_string(),
            description: "Keep the core network healthy.".to_string(),
            ..Default::default()
        }
    }

    fn application(job_id: i64, email: &str) -> CreateApplicationInput {
        CreateApplicationInput {
            job_id,
            full_name: "Chiamaka Obi".to_string(),
            email: email.to_string(),
            phone: Some("+234 800 000 0000".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_job_defaults() {
        let service = setup_test_service().await;

        let job = service.create_job(job_input("Network Engineer")).await.unwrap();
        assert_eq!(job.slug, "network-engineer");
        assert_eq!(job.employment_type, EmploymentType::FullTime);
        assert_eq!(job.status, JobStatus::Open);
    }

    #[tokio::test]
    async fn test_create_job_requires_fields() {
        let service = setup_test_service().await;

        let input = CreateJobInput {
            department: " ".into(),
            ..job_input("Network Engineer")
        };
        assert!(matches!(service.create_job(input).await, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_public_listing_hides_closed_jobs() {
        let service = setup_test_service().await;
        let open = service.create_job(job_input("Open Role")).await.unwrap();
        let closed = service
            .create_job(CreateJobInput {
                status: Some(JobStatus::Closed),
                ..job_input("Closed Role")
            })
            .await
            .unwrap();

        let page = service
            .list_open_jobs(
                JobFilter {
                    status: Some(JobStatus::Closed),
                    ..Default::default()
                },
                &ListParams::default(),
            )
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, open.id);

        assert!(service.get_open_job(open.id).await.is_ok());
        assert!(matches!(service.get_open_job(closed.id).await, Err(ServiceError::NotFound(_))));
        assert!(service.get_job(closed.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_apply_rules() {
        let service = setup_test_service().await;
        let job = service.create_job(job_input("Field Technician")).await.unwrap();

        let created = service.apply(application(job.id, "Chi@Mail.com")).await.unwrap();
        assert_eq!(created.email, "chi@mail.com");
        assert_eq!(created.job_title, "Field Technician");
        assert_eq!(created.status, ApplicationStatus::Pending);

        let duplicate = service.apply(application(job.id, "chi@mail.com")).await;
        assert!(matches!(duplicate, Err(ServiceError::Conflict(_))));

        let unknown = service.apply(application(999, "new@mail.com")).await;
        assert!(matches!(unknown, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_apply_to_closed_job_is_rejected() {
        let service = setup_test_service().await;
        let job = service
            .create_job(CreateJobInput {
                status: Some(JobStatus::Closed),
                ..job_input("Closed Role")
            })
            .await
            .unwrap();

        let result = service.apply(application(job.id, "late@mail.com")).await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_apply_validation() {
        let service = setup_test_service().await;
        let job = service.create_job(job_input("Analyst")).await.unwrap();

        let bad_email = service.apply(application(job.id, "nope")).await;
        assert!(matches!(bad_email, Err(ServiceError::Validation(_))));

        let long_letter = CreateApplicationInput {
            cover_letter: Some("x".repeat(MAX_MESSAGE_CHARS + 1)),
            ..application(job.id, "ok@mail.com")
        };
        assert!(matches!(service.apply(long_letter).await, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_application_status_and_delete() {
        let service = setup_test_service().await;
        let job = service.create_job(job_input("Analyst")).await.unwrap();
        let app = service.apply(application(job.id, "a@mail.com")).await.unwrap();

        let updated = service
            .update_application_status(app.id, ApplicationStatus::Shortlisted)
            .await
            .unwrap();
        assert_eq!(updated.status, ApplicationStatus::Shortlisted);

        let shortlisted = ApplicationFilter {
            status: Some(ApplicationStatus::Shortlisted),
            ..Default::default()
        };
        assert_eq!(service.count_applications(&shortlisted).await.unwrap(), 1);

        service.delete_application(app.id).await.unwrap();
        assert!(matches!(
            service.get_application(app.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_job_and_delete_cascades() {
        let service = setup_test_service().await;
        let job = service.create_job(job_input("Analyst")).await.unwrap();
        let app = service.apply(application(job.id, "a@mail.com")).await.unwrap();

        let updated = service
            .update_job(
                job.id,
                UpdateJobInput {
                    salary_range: Some("₦500k - ₦700k".into()),
                    status: Some(JobStatus::Closed),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, JobStatus::Closed);
        assert_eq!(updated.title, "Analyst");

        service.delete_job(job.id).await.unwrap();
        assert!(matches!(service.get_application(app.id).await, Err(ServiceError::NotFound(_))));
    }
}
