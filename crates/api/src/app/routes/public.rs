use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    response::IntoResponse,
    Json,
};

use crate::app::dto::{non_blank, PublicJobQuery, PublicJobResponse};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

/// GET /jobs/jobs/?job_type=&location=&skill= - approved postings, no auth
pub async fn list_jobs(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<PublicJobQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let job_type = non_blank(query.job_type);
    let location = non_blank(query.location);
    let skill = non_blank(query.skill);
    let jobs = services
        .list_public_jobs(job_type.as_deref(), location.as_deref(), skill.as_deref())
        .await?;
    Ok(Json(jobs.iter().map(PublicJobResponse::from).collect::<Vec<_>>()))
}
