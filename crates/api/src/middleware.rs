use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

const NO_CREDENTIALS: &str = "Authentication credentials were not provided.";

#[derive(Clone)]
pub struct AuthState {
    pub services: Arc<AppServices>,
}

/// Resolve `Authorization: Bearer <access>` into a [`PrincipalContext`].
///
/// The account is re-read on every request: a deactivated user is locked
/// out immediately even while their token is still valid.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let token = match extract_bearer(req.headers()) {
        Ok(token) => token,
        Err(e) => return e.into_response(),
    };

    let principal = match state.services.authenticate(token).await {
        Ok(principal) => principal,
        Err(e) => return e.into_response(),
    };

    req.extensions_mut().insert(PrincipalContext::new(principal));
    next.run(req).await
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, ApiError> {
    let missing = || ApiError::Unauthenticated(NO_CREDENTIALS.into());

    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(missing)?;

    let header = header.to_str().map_err(|_| missing())?;

    let header = header.strip_prefix("Bearer ").ok_or_else(missing)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(missing());
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::AUTHORIZATION, HeaderValue};

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(extract_bearer(&headers("Bearer abc.def")).unwrap(), "abc.def");
    }

    #[test]
    fn missing_or_malformed_header_is_unauthenticated() {
        let expected = ApiError::Unauthenticated(NO_CREDENTIALS.into());
        assert_eq!(extract_bearer(&HeaderMap::new()).unwrap_err(), expected);
        assert_eq!(extract_bearer(&headers("Basic abc")).unwrap_err(), expected);
        assert_eq!(extract_bearer(&headers("Bearer   ")).unwrap_err(), expected);
    }
}
