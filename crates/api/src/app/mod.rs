//! HTTP application: router, handlers and the services behind them.
//!
//! - `services/`: account and job workflows over the shared store
//! - `routes/`: handlers, one file per audience
//! - `dto.rs`: request/response bodies and validation rules
//! - `extract.rs`: validated JSON and job id extractors
//! - `errors.rs`: the `{"detail": ...}` error envelope

use std::sync::Arc;

use axum::{Extension, Router};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod extract;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub fn build_app(services: Arc<services::AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        services: services.clone(),
    };

    // Protected routes: require a valid access token.
    let protected = routes::protected_router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    routes::public_router()
        .merge(protected)
        .layer(Extension(services))
}
