//! `jobboard-core`: shared domain building blocks.
//!
//! Pure types only: identifiers, the entity contract and the error taxonomy
//! every other crate maps its failures onto.

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{JobId, SkillId, UserId};
