use chrono::Utc;

use jobboard_auth::policy;
use jobboard_core::JobId;
use jobboard_jobs::{
    AdminJobFilter, Job, JobChanges, JobListing, JobStatus, JobType, NewJob, PublicJobFilter,
    Skill, VerificationOutcome, VerifyAction,
};

use super::AppServices;
use crate::app::errors::ApiError;
use crate::authz;
use crate::context::PrincipalContext;

/// Fields of an owner's edit, as received.
#[derive(Debug, Default)]
pub struct JobEdit<'a> {
    pub title: Option<&'a str>,
    pub job_type: Option<JobType>,
    pub location: Option<&'a str>,
    pub skills: Option<&'a [String]>,
}

impl AppServices {
    /// New posting owned by the calling company. Always starts pending.
    pub async fn create_job(
        &self,
        principal: &PrincipalContext,
        title: &str,
        job_type: JobType,
        location: &str,
        skills: &[String],
    ) -> Result<Job, ApiError> {
        authz::require(principal, policy::COMPANY)?;

        let new = NewJob::new(title, job_type, location, skills)?;
        let skills = self.resolve_skills(&new.skills).await?;
        let job = Job::create(new, principal.user_id(), skills, Utc::now());
        self.store.insert_job(&job).await?;

        tracing::info!(job_id = %job.id, company_id = %job.company_id, "job created");
        Ok(job)
    }

    pub async fn list_own_jobs(&self, principal: &PrincipalContext) -> Result<Vec<Job>, ApiError> {
        authz::require(principal, policy::COMPANY)?;
        Ok(self.store.list_company_jobs(principal.user_id()).await?)
    }

    pub async fn get_own_job(&self, principal: &PrincipalContext, id: JobId) -> Result<Job, ApiError> {
        self.owned_job(principal, id).await
    }

    /// Apply an owner's edit. Status is never touched here.
    pub async fn update_own_job(
        &self,
        principal: &PrincipalContext,
        id: JobId,
        edit: JobEdit<'_>,
    ) -> Result<Job, ApiError> {
        let job = self.owned_job(principal, id).await?;
        self.edit_job(job, edit).await
    }

    /// Apply an edit to a job the caller has already been cleared to own.
    pub(crate) async fn edit_job(&self, mut job: Job, edit: JobEdit<'_>) -> Result<Job, ApiError> {
        let changes = JobChanges::new(edit.title, edit.job_type, edit.location, edit.skills)?;
        let skills = match &changes.skills {
            Some(names) => Some(self.resolve_skills(names).await?),
            None => None,
        };
        job.apply_changes(changes, skills);
        self.store.update_job(&job).await?;

        tracing::info!(job_id = %job.id, "job updated");
        Ok(job)
    }

    pub async fn delete_own_job(&self, principal: &PrincipalContext, id: JobId) -> Result<(), ApiError> {
        let job = self.owned_job(principal, id).await?;
        self.store.delete_job(job.id).await?;
        tracing::info!(job_id = %job.id, "job deleted");
        Ok(())
    }

    /// All postings for review. `status` must be a known status when given.
    pub async fn list_admin_jobs(
        &self,
        principal: &PrincipalContext,
        status: Option<&str>,
        company_email: Option<&str>,
    ) -> Result<Vec<JobListing>, ApiError> {
        authz::require(principal, policy::ADMIN)?;

        let filter = AdminJobFilter {
            status: status.map(str::parse::<JobStatus>).transpose()?,
            company_email: company_email.map(str::to_string),
        };
        Ok(self.store.list_admin_jobs(&filter).await?)
    }

    pub async fn verify_job(
        &self,
        principal: &PrincipalContext,
        id: JobId,
        action: Option<&str>,
    ) -> Result<VerificationOutcome, ApiError> {
        authz::require(principal, policy::ADMIN)?;

        let mut job = self
            .store
            .get_job(id)
            .await?
            .ok_or_else(ApiError::not_found)?
            .job;
        let action: VerifyAction = action.unwrap_or_default().parse()?;

        let outcome = job.verify(action);
        self.store.set_job_status(job.id, outcome.status).await?;

        tracing::info!(job_id = %job.id, status = %outcome.status, admin_id = %principal.user_id(), "job verified");
        Ok(outcome)
    }

    /// Anonymous search over approved postings.
    ///
    /// An unrecognised `job_type` cannot match anything, so it yields an
    /// empty list rather than an error.
    pub async fn list_public_jobs(
        &self,
        job_type: Option<&str>,
        location: Option<&str>,
        skill: Option<&str>,
    ) -> Result<Vec<JobListing>, ApiError> {
        let job_type = match job_type {
            Some(raw) => match raw.parse::<JobType>() {
                Ok(t) => Some(t),
                Err(_) => return Ok(Vec::new()),
            },
            None => None,
        };

        let filter = PublicJobFilter {
            job_type,
            location: location.map(str::to_string),
            skill: skill.map(str::to_string),
        };
        Ok(self.store.list_public_jobs(&filter).await?)
    }

    /// Company role, then existence, then ownership.
    async fn owned_job(&self, principal: &PrincipalContext, id: JobId) -> Result<Job, ApiError> {
        authz::require(principal, policy::COMPANY)?;

        let listing = self
            .store
            .get_job(id)
            .await?
            .ok_or_else(ApiError::not_found)?;
        authz::require(principal, &policy::owning_company(listing.job.company_id))?;

        Ok(listing.job)
    }

    async fn resolve_skills(&self, names: &[String]) -> Result<Vec<Skill>, ApiError> {
        let mut skills = Vec::with_capacity(names.len());
        for name in names {
            skills.push(self.store.get_or_create_skill(name).await?);
        }
        Ok(skills)
    }
}
