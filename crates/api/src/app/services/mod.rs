//! Service wiring: one store, one token service, shared by every handler.
//!
//! Operations are split by area: `accounts` (identity and tokens) and
//! `jobs` (postings, review and search).

use std::sync::Arc;

use jobboard_auth::TokenService;
use jobboard_infra::{db, AppConfig, AuthConfig, InMemoryStore, PostgresStore, SharedStore, Store};

mod accounts;
mod jobs;

pub use jobs::JobEdit;

pub struct AppServices {
    store: SharedStore,
    tokens: TokenService,
    bcrypt_cost: u32,
}

impl AppServices {
    pub fn new(store: SharedStore, tokens: TokenService, bcrypt_cost: u32) -> Self {
        Self {
            store,
            tokens,
            bcrypt_cost,
        }
    }

    /// Services over a fresh in-memory store.
    pub fn in_memory(auth: &AuthConfig) -> Self {
        Self::new(
            Arc::new(InMemoryStore::new()),
            TokenService::new(auth.token_config()),
            auth.bcrypt_cost,
        )
    }

    /// Postgres when `DATABASE_URL` is configured, in-memory otherwise.
    pub async fn from_config(config: &AppConfig) -> Result<Self, sqlx::Error> {
        let store: SharedStore = match &config.database {
            Some(database) => Arc::new(PostgresStore::new(db::connect(database).await?)),
            None => {
                tracing::warn!("DATABASE_URL not set; using in-memory store (data is lost on exit)");
                Arc::new(InMemoryStore::new())
            }
        };

        Ok(Self::new(
            store,
            TokenService::new(config.auth.token_config()),
            config.auth.bcrypt_cost,
        ))
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }
}

impl core::fmt::Debug for AppServices {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppServices")
            .field("tokens", &self.tokens)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) fn test_services() -> AppServices {
    let auth = AuthConfig {
        jwt_secret: "test-secret".into(),
        jwt_issuer: "jobboard".into(),
        access_ttl_minutes: 5,
        refresh_ttl_hours: 24,
        bcrypt_cost: 4,
    };
    AppServices::in_memory(&auth)
}
