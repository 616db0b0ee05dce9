use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    response::IntoResponse,
    Json,
};

use jobboard_auth::policy;

use crate::app::dto::{non_blank, AdminJobQuery, AdminJobResponse, VerifyJobRequest};
use crate::app::errors::ApiError;
use crate::app::extract::{JobPath, ValidJson};
use crate::app::services::AppServices;
use crate::authz;
use crate::context::PrincipalContext;

/// GET /jobs/admin/jobs/?status=&company= - every posting, for review
pub async fn list_jobs(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<AdminJobQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let status = non_blank(query.status);
    let company = non_blank(query.company);
    let jobs = services
        .list_admin_jobs(&principal, status.as_deref(), company.as_deref())
        .await?;
    Ok(Json(jobs.iter().map(AdminJobResponse::from).collect::<Vec<_>>()))
}

/// PATCH /jobs/admin/jobs/:id/verify/ - approve or reject
pub async fn verify_job(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    JobPath(id): JobPath,
    body: Result<ValidJson<VerifyJobRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    // Non-admins are refused before the body is looked at.
    authz::require(&principal, policy::ADMIN)?;
    let ValidJson(body) = body?;
    let outcome = services
        .verify_job(&principal, id, body.action.as_deref())
        .await?;
    Ok(Json(outcome))
}
