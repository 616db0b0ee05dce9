//! Job postings and their lifecycle.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use jobboard_core::{DomainError, DomainResult, Entity, JobId, UserId};

use crate::skill::{normalize_skill_names, Skill};
use crate::verification::{VerificationOutcome, VerifyAction};

// ─────────────────────────────────────────────────────────────────────────────
// Enumerations
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    FullTime,
    PartTime,
    Internship,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "full_time",
            JobType::PartTime => "part_time",
            JobType::Internship => "internship",
        }
    }
}

impl FromStr for JobType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full_time" => Ok(JobType::FullTime),
            "part_time" => Ok(JobType::PartTime),
            "internship" => Ok(JobType::Internship),
            other => Err(DomainError::validation(format!(
                "\"{other}\" is not a valid job type."
            ))),
        }
    }
}

impl core::fmt::Display for JobType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Review status of a posting.
///
/// `Pending` on creation; only admin verification moves it, and a verified
/// job can be re-verified either way.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Approved => "approved",
            JobStatus::Rejected => "rejected",
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(self, JobStatus::Approved)
    }
}

impl FromStr for JobStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "approved" => Ok(JobStatus::Approved),
            "rejected" => Ok(JobStatus::Rejected),
            other => Err(DomainError::validation(format!(
                "\"{other}\" is not a valid status."
            ))),
        }
    }
}

impl core::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Job
// ─────────────────────────────────────────────────────────────────────────────

/// A job posting.
///
/// # Invariants
/// - `company_id` is fixed at creation.
/// - `title` and `location` are trimmed and non-empty.
/// - `status` changes only through [`Job::verify`].
/// - `skills` holds each skill at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub company_id: UserId,
    pub job_type: JobType,
    pub location: String,
    pub skills: Vec<Skill>,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
}

impl Entity for Job {
    type Id = JobId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Job {
    /// Build a new posting for `company_id`.
    ///
    /// `skills` are the catalog rows resolved for `new.skills`. The status is
    /// always `Pending` whatever the caller asked for.
    pub fn create(new: NewJob, company_id: UserId, skills: Vec<Skill>, now: DateTime<Utc>) -> Self {
        Self {
            id: JobId::new(),
            title: new.title,
            company_id,
            job_type: new.job_type,
            location: new.location,
            skills: dedup_skills(skills),
            status: JobStatus::Pending,
            created_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.company_id == user_id
    }

    pub fn skill_names(&self) -> Vec<String> {
        self.skills.iter().map(|s| s.name.clone()).collect()
    }

    /// Apply an owner's edit.
    ///
    /// `skills` must be the resolved rows for `changes.skills` when that is
    /// set; it replaces the whole set. Status and owner are untouched.
    pub fn apply_changes(&mut self, changes: JobChanges, skills: Option<Vec<Skill>>) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(job_type) = changes.job_type {
            self.job_type = job_type;
        }
        if let Some(location) = changes.location {
            self.location = location;
        }
        if let Some(skills) = skills {
            self.skills = dedup_skills(skills);
        }
    }

    /// Admin verification. Re-verifying an already reviewed job overwrites
    /// its status.
    pub fn verify(&mut self, action: VerifyAction) -> VerificationOutcome {
        let previous = self.status;
        self.status = action.target_status();
        if previous != JobStatus::Pending {
            tracing::debug!(job_id = %self.id, %previous, next = %self.status, "re-verifying reviewed job");
        }
        VerificationOutcome::new(action, self.status)
    }
}

fn dedup_skills(skills: Vec<Skill>) -> Vec<Skill> {
    let mut seen = std::collections::HashSet::new();
    skills.into_iter().filter(|s| seen.insert(s.id)).collect()
}

/// Summary of the owning company, loaded alongside a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRef {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
}

/// A job together with its owner, as returned by listing queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobListing {
    pub job: Job,
    pub company: CompanyRef,
}

// ─────────────────────────────────────────────────────────────────────────────
// Inputs
// ─────────────────────────────────────────────────────────────────────────────

/// Validated input for a new posting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJob {
    pub title: String,
    pub job_type: JobType,
    pub location: String,
    /// Trimmed, non-blank, distinct skill names in request order.
    pub skills: Vec<String>,
}

impl NewJob {
    pub fn new(
        title: &str,
        job_type: JobType,
        location: &str,
        skills: &[String],
    ) -> DomainResult<Self> {
        Ok(Self {
            title: required("Title", title)?,
            job_type,
            location: required("Location", location)?,
            skills: normalize_skill_names(skills),
        })
    }
}

/// Validated partial edit of a posting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobChanges {
    pub title: Option<String>,
    pub job_type: Option<JobType>,
    pub location: Option<String>,
    pub skills: Option<Vec<String>>,
}

impl JobChanges {
    pub fn new(
        title: Option<&str>,
        job_type: Option<JobType>,
        location: Option<&str>,
        skills: Option<&[String]>,
    ) -> DomainResult<Self> {
        Ok(Self {
            title: title.map(|t| required("Title", t)).transpose()?,
            job_type,
            location: location.map(|l| required("Location", l)).transpose()?,
            skills: skills.map(normalize_skill_names),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.job_type.is_none()
            && self.location.is_none()
            && self.skills.is_none()
    }
}

fn required(field: &str, value: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty.")));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobboard_core::SkillId;
    use proptest::prelude::*;

    fn skill(name: &str) -> Skill {
        Skill {
            id: SkillId::new(),
            name: name.to_string(),
        }
    }

    fn new_job() -> NewJob {
        NewJob::new(
            "  Engineer ",
            JobType::FullTime,
            " Remote",
            &["Go".to_string(), "SQL".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn new_job_trims_fields() {
        let job = new_job();
        assert_eq!(job.title, "Engineer");
        assert_eq!(job.location, "Remote");
        assert_eq!(job.skills, vec!["Go", "SQL"]);
    }

    #[test]
    fn blank_title_or_location_is_rejected() {
        assert!(NewJob::new("   ", JobType::FullTime, "Remote", &[]).is_err());
        assert!(NewJob::new("Engineer", JobType::FullTime, "\t\n", &[]).is_err());
    }

    #[test]
    fn created_jobs_are_pending_and_owned() {
        let company = UserId::new();
        let job = Job::create(new_job(), company, vec![skill("Go"), skill("SQL")], Utc::now());
        assert_eq!(job.status, JobStatus::Pending);
        assert!(job.is_owned_by(company));
        assert!(!job.is_owned_by(UserId::new()));
    }

    #[test]
    fn duplicate_skill_rows_attach_once() {
        let go = skill("Go");
        let job = Job::create(new_job(), UserId::new(), vec![go.clone(), go], Utc::now());
        assert_eq!(job.skills.len(), 1);
    }

    #[test]
    fn changes_leave_status_and_owner_alone() {
        let company = UserId::new();
        let mut job = Job::create(new_job(), company, vec![], Utc::now());
        job.verify(VerifyAction::Approve);

        let changes = JobChanges::new(Some("Staff Engineer"), Some(JobType::PartTime), None, None).unwrap();
        job.apply_changes(changes, None);

        assert_eq!(job.title, "Staff Engineer");
        assert_eq!(job.job_type, JobType::PartTime);
        assert_eq!(job.location, "Remote");
        assert_eq!(job.status, JobStatus::Approved);
        assert_eq!(job.company_id, company);
    }

    #[test]
    fn changes_replace_skill_set() {
        let mut job = Job::create(new_job(), UserId::new(), vec![skill("Go"), skill("SQL")], Utc::now());
        let changes = JobChanges::new(None, None, None, Some(&["Rust".to_string()])).unwrap();
        job.apply_changes(changes, Some(vec![skill("Rust")]));
        assert_eq!(job.skill_names(), vec!["Rust"]);
    }

    #[test]
    fn blank_changes_are_rejected() {
        assert!(JobChanges::new(Some(" "), None, None, None).is_err());
        assert!(JobChanges::new(None, None, Some(""), None).is_err());
        assert!(JobChanges::new(None, None, None, None).unwrap().is_empty());
    }

    #[test]
    fn verification_can_be_repeated() {
        let mut job = Job::create(new_job(), UserId::new(), vec![], Utc::now());
        assert_eq!(job.verify(VerifyAction::Approve).status, JobStatus::Approved);
        assert_eq!(job.verify(VerifyAction::Reject).status, JobStatus::Rejected);
        assert_eq!(job.verify(VerifyAction::Reject).status, JobStatus::Rejected);
        assert_eq!(job.status, JobStatus::Rejected);
    }

    #[test]
    fn enums_use_wire_names() {
        assert_eq!(serde_json::to_string(&JobType::FullTime).unwrap(), "\"full_time\"");
        assert_eq!(serde_json::to_string(&JobStatus::Approved).unwrap(), "\"approved\"");
        assert_eq!("part_time".parse::<JobType>().unwrap(), JobType::PartTime);
        assert!("contract".parse::<JobType>().is_err());
        assert!("Approved".parse::<JobStatus>().is_err());
    }

    proptest! {
        #[test]
        fn accepted_titles_are_trimmed_and_non_empty(title in "\\PC{0,40}", location in "\\PC{0,20}") {
            if let Ok(job) = NewJob::new(&title, JobType::Internship, &location, &[]) {
                prop_assert!(!job.title.is_empty());
                prop_assert_eq!(job.title.trim(), job.title.as_str());
                prop_assert!(!job.location.is_empty());
            } else {
                prop_assert!(title.trim().is_empty() || location.trim().is_empty());
            }
        }
    }
}
