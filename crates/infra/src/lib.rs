//! Infrastructure layer: configuration, persistence and migrations.

pub mod config;
pub mod db;
pub mod store;

pub use config::{AppConfig, AuthConfig, ConfigError, DatabaseConfig, ServerConfig};
pub use store::{
    InMemoryStore, JobStore, PostgresStore, SharedStore, SkillStore, Store, StoreError,
    StoreResult, TokenBlacklist, UserStore,
};
