use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::app::dto::{
    AccessTokenResponse, LoginRequest, LoginResponse, ProfileResponse, RefreshRequest,
    RegisterRequest, RegisteredUser, UpdateProfileRequest, UserSummary,
};
use crate::app::errors::ApiError;
use crate::app::extract::ValidJson;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

/// POST /accounts/register/ - create a company account
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    ValidJson(body): ValidJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = services
        .register(&body.email, &body.password, &body.full_name, body.role.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(RegisteredUser::from(&user))))
}

/// POST /accounts/login/ - exchange credentials for a token pair
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    ValidJson(body): ValidJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (user, pair) = services.login(&body.email, &body.password).await?;
    Ok(Json(LoginResponse {
        refresh: pair.refresh,
        access: pair.access,
        user: UserSummary::from(&user),
    }))
}

/// POST /accounts/token/refresh/ - new access token from a refresh token
pub async fn refresh(
    Extension(services): Extension<Arc<AppServices>>,
    ValidJson(body): ValidJson<RefreshRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let access = services.refresh_access(&body.refresh).await?;
    Ok(Json(AccessTokenResponse { access }))
}

/// POST /accounts/logout/ - blacklist the given refresh token
pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    ValidJson(body): ValidJson<RefreshRequest>,
) -> Result<impl IntoResponse, ApiError> {
    services.logout(&principal, &body.refresh).await?;
    Ok((
        StatusCode::RESET_CONTENT,
        Json(serde_json::json!({ "detail": "Successfully logged out" })),
    ))
}

/// GET /accounts/profile/
pub async fn get_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<impl IntoResponse, ApiError> {
    let user = services.profile(&principal).await?;
    Ok(Json(ProfileResponse::from(&user)))
}

/// PUT|PATCH /accounts/profile/ - only `full_name` is writable
pub async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    ValidJson(body): ValidJson<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = services
        .update_profile(&principal, body.full_name.as_deref())
        .await?;
    Ok(Json(ProfileResponse::from(&user)))
}
