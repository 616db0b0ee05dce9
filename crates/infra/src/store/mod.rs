//! Persistence boundary.
//!
//! Each concern gets its own trait so services depend on what they use.
//! Both backends implement all of them on one type; [`Store`] bundles them
//! for wiring.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use jobboard_auth::UserAccount;
use jobboard_core::{JobId, UserId};
use jobboard_jobs::{AdminJobFilter, Job, JobListing, JobStatus, PublicJobFilter, Skill};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PostgresStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new account. Fails with `Conflict` if the email is taken.
    async fn insert_user(&self, account: UserAccount) -> StoreResult<UserAccount>;

    /// Exact lookup on the normalized email.
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserAccount>>;

    async fn get_user(&self, id: UserId) -> StoreResult<Option<UserAccount>>;

    async fn update_full_name(&self, id: UserId, full_name: &str) -> StoreResult<UserAccount>;
}

#[async_trait]
pub trait SkillStore: Send + Sync {
    /// Return the skill named exactly `name`, creating it if needed.
    ///
    /// Concurrent calls with the same name must resolve to the same row.
    async fn get_or_create_skill(&self, name: &str) -> StoreResult<Skill>;

    async fn list_skills(&self) -> StoreResult<Vec<Skill>>;
}

/// Job persistence. Listings are ordered newest first.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Persist a new job with its skill links in one step.
    async fn insert_job(&self, job: &Job) -> StoreResult<()>;

    async fn get_job(&self, id: JobId) -> StoreResult<Option<JobListing>>;

    /// Overwrite title, type, location and the skill set.
    async fn update_job(&self, job: &Job) -> StoreResult<()>;

    async fn set_job_status(&self, id: JobId, status: JobStatus) -> StoreResult<()>;

    async fn delete_job(&self, id: JobId) -> StoreResult<()>;

    async fn list_company_jobs(&self, company_id: UserId) -> StoreResult<Vec<Job>>;

    async fn list_admin_jobs(&self, filter: &AdminJobFilter) -> StoreResult<Vec<JobListing>>;

    async fn list_public_jobs(&self, filter: &PublicJobFilter) -> StoreResult<Vec<JobListing>>;
}

/// Revoked refresh tokens, keyed by `jti`.
#[async_trait]
pub trait TokenBlacklist: Send + Sync {
    /// Record a revocation. Returns `false` if `jti` was already revoked.
    async fn blacklist_token(&self, jti: Uuid, expires_at: DateTime<Utc>) -> StoreResult<bool>;

    async fn is_token_blacklisted(&self, jti: Uuid) -> StoreResult<bool>;

    /// Drop revocations whose token expired before `now`; such a token
    /// already fails verification. Returns how many were removed.
    async fn purge_expired_tokens(&self, now: DateTime<Utc>) -> StoreResult<u64>;
}

/// Everything the API needs from a backend.
pub trait Store: UserStore + SkillStore + JobStore + TokenBlacklist {}

impl<S> Store for S where S: UserStore + SkillStore + JobStore + TokenBlacklist {}

pub type SharedStore = Arc<dyn Store>;
