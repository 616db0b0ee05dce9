//! `jobboard-jobs`: job postings, skills and the approval workflow.
//!
//! Pure domain: validation, status transitions and listing filters. Nothing
//! here touches storage; the infra stores call [`filter`] predicates and
//! the API drives [`Job::verify`].

pub mod filter;
pub mod job;
pub mod skill;
pub mod verification;

pub use filter::{AdminJobFilter, PublicJobFilter};
pub use job::{CompanyRef, Job, JobChanges, JobListing, JobStatus, JobType, NewJob};
pub use skill::{normalize_skill_names, Skill};
pub use verification::{VerificationOutcome, VerifyAction};
