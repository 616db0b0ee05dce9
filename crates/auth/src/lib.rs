//! `jobboard-auth`: authentication/authorization boundary.
//!
//! This crate is decoupled from HTTP and storage: it knows how to hash and
//! check passwords, mint and verify tokens, and decide whether a principal
//! may act. Persisting accounts and revoked tokens is the caller's job.

pub mod authorize;
pub mod claims;
pub mod password;
pub mod principal;
pub mod roles;
pub mod token;
pub mod user;

pub use authorize::{authorize, policy, AuthzError, Rule};
pub use claims::{validate_claims, JwtClaims, TokenType, TokenValidationError};
pub use password::{hash_password, validate_password, verify_password, PasswordError};
pub use principal::Principal;
pub use roles::Role;
pub use token::{TokenConfig, TokenError, TokenPair, TokenService};
pub use user::{normalize_email, NewAccount, UserAccount};
