use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::{async_trait, Json};
use serde::de::DeserializeOwned;
use validator::Validate;

use jobboard_core::JobId;

use crate::app::dto::validation_detail;
use crate::app::errors::ApiError;

/// JSON body that has been deserialized and passed its `Validate` rules.
///
/// Both failures become a 400 with the usual `detail` envelope instead of
/// axum's plain-text rejection.
#[derive(Debug)]
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e: JsonRejection| ApiError::Validation(e.body_text()))?;
        value
            .validate()
            .map_err(|e| ApiError::Validation(validation_detail(&e)))?;
        Ok(ValidJson(value))
    }
}

/// `:id` path segment parsed as a job id. Anything unparseable is a 404.
#[derive(Debug, Copy, Clone)]
pub struct JobPath(pub JobId);

#[async_trait]
impl<S> FromRequestParts<S> for JobPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_: PathRejection| ApiError::not_found())?;
        raw.parse::<JobId>()
            .map(JobPath)
            .map_err(|_| ApiError::not_found())
    }
}
