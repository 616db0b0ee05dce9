use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use jobboard_auth::{Role, UserAccount};
use jobboard_core::JobId;
use jobboard_jobs::{Job, JobListing, JobStatus, JobType};

/// Longest accepted skill name.
pub const MAX_SKILL_NAME: usize = 50;

// ─────────────────────────────────────────────────────────────────────────────
// Request DTOs
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    #[validate(length(max = 255, message = "Ensure this field has no more than 255 characters."))]
    pub full_name: String,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub refresh: String,
}

/// Only `full_name` is writable; anything else in the body is ignored.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 255, message = "Ensure this field has no more than 255 characters."))]
    pub full_name: Option<String>,
}

/// `status` is not a field: a posting always starts pending.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateJobRequest {
    #[validate(length(max = 255, message = "Ensure this field has no more than 255 characters."))]
    pub title: String,
    pub job_type: JobType,
    #[validate(length(max = 100, message = "Ensure this field has no more than 100 characters."))]
    pub location: String,
    #[serde(default)]
    #[validate(custom(function = "validate_skill_names"))]
    pub skills: Vec<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateJobRequest {
    #[validate(length(max = 255, message = "Ensure this field has no more than 255 characters."))]
    pub title: Option<String>,
    pub job_type: Option<JobType>,
    #[validate(length(max = 100, message = "Ensure this field has no more than 100 characters."))]
    pub location: Option<String>,
    #[validate(custom(function = "validate_skill_names"))]
    pub skills: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct VerifyJobRequest {
    pub action: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminJobQuery {
    pub status: Option<String>,
    pub company: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PublicJobQuery {
    pub job_type: Option<String>,
    pub location: Option<String>,
    pub skill: Option<String>,
}

fn validate_skill_names(names: &Vec<String>) -> Result<(), ValidationError> {
    if names.iter().any(|n| n.trim().chars().count() > MAX_SKILL_NAME) {
        let mut err = ValidationError::new("skill_length");
        err.message = Some(
            format!("Skill names must have no more than {MAX_SKILL_NAME} characters.").into(),
        );
        return Err(err);
    }
    Ok(())
}

/// Flatten validator output into a single `detail` line, fields sorted.
pub fn validation_detail(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let messages: Vec<String> = errs
                .iter()
                .map(|e| match &e.message {
                    Some(m) => m.to_string(),
                    None => e.code.to_string(),
                })
                .collect();
            format!("{field}: {}", messages.join(" "))
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

/// Treat `?key=` the same as an absent key.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// ─────────────────────────────────────────────────────────────────────────────
// Response DTOs
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct RegisteredUser {
    pub email: String,
    pub full_name: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub email: String,
    pub role: Role,
    pub full_name: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub refresh: String,
    pub access: String,
    pub user: UserSummary,
}

#[derive(Debug, Serialize)]
pub struct AccessTokenResponse {
    pub access: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub date_joined: DateTime<Utc>,
}

/// What a company sees for its own postings.
#[derive(Debug, Serialize)]
pub struct CompanyJobResponse {
    pub id: JobId,
    pub title: String,
    pub location: String,
    pub job_type: JobType,
    pub skills: Vec<String>,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct AdminJobResponse {
    pub id: JobId,
    pub title: String,
    pub company_email: String,
    pub location: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct PublicJobResponse {
    pub id: JobId,
    pub title: String,
    pub company_name: String,
    pub job_type: JobType,
    pub location: String,
    pub skills: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&UserAccount> for RegisteredUser {
    fn from(user: &UserAccount) -> Self {
        Self {
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
        }
    }
}

impl From<&UserAccount> for UserSummary {
    fn from(user: &UserAccount) -> Self {
        Self {
            email: user.email.clone(),
            role: user.role,
            full_name: user.full_name.clone(),
        }
    }
}

impl From<&UserAccount> for ProfileResponse {
    fn from(user: &UserAccount) -> Self {
        Self {
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
            date_joined: user.date_joined,
        }
    }
}

impl From<&Job> for CompanyJobResponse {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id,
            title: job.title.clone(),
            location: job.location.clone(),
            job_type: job.job_type,
            skills: job.skill_names(),
            status: job.status,
            created_at: job.created_at,
        }
    }
}

impl From<&JobListing> for AdminJobResponse {
    fn from(listing: &JobListing) -> Self {
        Self {
            id: listing.job.id,
            title: listing.job.title.clone(),
            company_email: listing.company.email.clone(),
            location: listing.job.location.clone(),
            status: listing.job.status,
            created_at: listing.job.created_at,
        }
    }
}

impl From<&JobListing> for PublicJobResponse {
    fn from(listing: &JobListing) -> Self {
        Self {
            id: listing.job.id,
            title: listing.job.title.clone(),
            company_name: listing.company.full_name.clone(),
            job_type: listing.job.job_type,
            location: listing.job.location.clone(),
            skills: listing.job.skill_names(),
            created_at: listing.job.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_job_request_ignores_status() {
        let body = serde_json::json!({
            "title": "Engineer",
            "job_type": "full_time",
            "location": "Remote",
            "status": "approved"
        });
        let req: CreateJobRequest = serde_json::from_value(body).unwrap();
        assert!(req.skills.is_empty());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn overlong_fields_fail_validation() {
        let req = CreateJobRequest {
            title: "x".repeat(256),
            job_type: JobType::Internship,
            location: "Remote".into(),
            skills: vec!["y".repeat(MAX_SKILL_NAME + 1)],
        };
        let detail = validation_detail(&req.validate().unwrap_err());
        assert!(detail.starts_with("skills: "), "{detail}");
        assert!(detail.contains("title: Ensure this field has no more than 255 characters."));
    }

    #[test]
    fn login_requires_a_well_formed_email() {
        let login = |email: &str| LoginRequest {
            email: email.into(),
            password: "password123".into(),
        };
        assert!(login("hr@acme.io").validate().is_ok());
        let detail = validation_detail(&login("not-an-email").validate().unwrap_err());
        assert_eq!(detail, "email: Enter a valid email address.");
        assert!(login("").validate().is_err());
    }

    #[test]
    fn blank_query_values_are_absent() {
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(Some("pending".into())), Some("pending".into()));
    }
}
