use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

pub mod accounts;
pub mod admin;
pub mod company_jobs;
pub mod public;
pub mod system;

/// Endpoints open to anonymous callers.
pub fn public_router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/accounts/register/", post(accounts::register))
        .route("/accounts/login/", post(accounts::login))
        .route("/accounts/token/refresh/", post(accounts::refresh))
        .route("/jobs/jobs/", get(public::list_jobs))
}

/// Endpoints that need a bearer access token. Role checks happen in the
/// services, after authentication.
pub fn protected_router() -> Router {
    Router::new()
        .route("/accounts/logout/", post(accounts::logout))
        .route(
            "/accounts/profile/",
            get(accounts::get_profile)
                .put(accounts::update_profile)
                .patch(accounts::update_profile),
        )
        .route("/jobs/company/jobs/", get(company_jobs::list_jobs))
        .route("/jobs/company/jobs/create/", post(company_jobs::create_job))
        .route(
            "/jobs/company/jobs/:id/",
            get(company_jobs::get_job)
                .put(company_jobs::update_job)
                .patch(company_jobs::update_job)
                .delete(company_jobs::delete_job),
        )
        .route("/jobs/job/:id/update/", put(company_jobs::update_job))
        .route("/jobs/job/:id/delete/", delete(company_jobs::delete_job))
        .route("/jobs/admin/jobs/", get(admin::list_jobs))
        .route("/jobs/admin/jobs/:id/verify/", patch(admin::verify_job))
}
