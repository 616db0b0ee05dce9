use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use jobboard_auth::policy;

use crate::app::dto::{CompanyJobResponse, CreateJobRequest, UpdateJobRequest};
use crate::app::errors::ApiError;
use crate::app::extract::{JobPath, ValidJson};
use crate::app::services::{AppServices, JobEdit};
use crate::authz;
use crate::context::PrincipalContext;

// Bodies are taken as `Result` so role and ownership failures win over a
// malformed payload.

/// POST /jobs/company/jobs/create/ - new posting, always pending
pub async fn create_job(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<ValidJson<CreateJobRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    authz::require(&principal, policy::COMPANY)?;
    let ValidJson(body) = body?;
    let job = services
        .create_job(&principal, &body.title, body.job_type, &body.location, &body.skills)
        .await?;
    Ok((StatusCode::CREATED, Json(CompanyJobResponse::from(&job))))
}

/// GET /jobs/company/jobs/ - the caller's own postings
pub async fn list_jobs(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<impl IntoResponse, ApiError> {
    let jobs = services.list_own_jobs(&principal).await?;
    Ok(Json(
        jobs.iter().map(CompanyJobResponse::from).collect::<Vec<_>>(),
    ))
}

/// GET /jobs/company/jobs/:id/
pub async fn get_job(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    JobPath(id): JobPath,
) -> Result<impl IntoResponse, ApiError> {
    let job = services.get_own_job(&principal, id).await?;
    Ok(Json(CompanyJobResponse::from(&job)))
}

/// PUT|PATCH /jobs/company/jobs/:id/ and PUT /jobs/job/:id/update/
pub async fn update_job(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    JobPath(id): JobPath,
    body: Result<ValidJson<UpdateJobRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let job = services.get_own_job(&principal, id).await?;
    let ValidJson(body) = body?;
    let edit = JobEdit {
        title: body.title.as_deref(),
        job_type: body.job_type,
        location: body.location.as_deref(),
        skills: body.skills.as_deref(),
    };
    let job = services.edit_job(job, edit).await?;
    Ok(Json(CompanyJobResponse::from(&job)))
}

/// DELETE /jobs/company/jobs/:id/ and DELETE /jobs/job/:id/delete/
pub async fn delete_job(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    JobPath(id): JobPath,
) -> Result<impl IntoResponse, ApiError> {
    services.delete_own_job(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
