//! Listing filters for the admin and public job views.
//!
//! Stores may push these down into SQL, but the predicates here define the
//! semantics; the in-memory store evaluates them directly.

use crate::job::{JobListing, JobStatus, JobType};

/// Admin listing filter. Both fields match exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminJobFilter {
    pub status: Option<JobStatus>,
    pub company_email: Option<String>,
}

impl AdminJobFilter {
    pub fn matches(&self, listing: &JobListing) -> bool {
        if let Some(status) = self.status {
            if listing.job.status != status {
                return false;
            }
        }
        if let Some(email) = &self.company_email {
            if &listing.company.email != email {
                return false;
            }
        }
        true
    }
}

/// Public listing filter, applied over approved jobs only.
///
/// `job_type` matches exactly; `location` and `skill` are case-insensitive
/// substring matches. A job matches `skill` when any of its skills does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublicJobFilter {
    pub job_type: Option<JobType>,
    pub location: Option<String>,
    pub skill: Option<String>,
}

impl PublicJobFilter {
    pub fn matches(&self, listing: &JobListing) -> bool {
        let job = &listing.job;
        if !job.status.is_public() {
            return false;
        }
        if let Some(job_type) = self.job_type {
            if job.job_type != job_type {
                return false;
            }
        }
        if let Some(location) = &self.location {
            if !contains_ignore_case(&job.location, location) {
                return false;
            }
        }
        if let Some(skill) = &self.skill {
            if !job.skills.iter().any(|s| contains_ignore_case(&s.name, skill)) {
                return false;
            }
        }
        true
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{CompanyRef, Job, NewJob};
    use crate::skill::Skill;
    use crate::verification::VerifyAction;
    use chrono::Utc;
    use jobboard_core::{SkillId, UserId};

    fn listing(location: &str, skills: &[&str], job_type: JobType, email: &str) -> JobListing {
        let names: Vec<String> = skills.iter().map(|s| s.to_string()).collect();
        let new = NewJob::new("Engineer", job_type, location, &names).unwrap();
        let rows = names
            .iter()
            .map(|n| Skill {
                id: SkillId::new(),
                name: n.clone(),
            })
            .collect();
        let company = CompanyRef {
            id: UserId::new(),
            email: email.to_string(),
            full_name: "Acme".to_string(),
        };
        JobListing {
            job: Job::create(new, company.id, rows, Utc::now()),
            company,
        }
    }

    fn approved(mut l: JobListing) -> JobListing {
        l.job.verify(VerifyAction::Approve);
        l
    }

    #[test]
    fn public_filter_hides_unapproved_jobs() {
        let pending = listing("Remote", &["Rust"], JobType::FullTime, "a@x.io");
        let mut rejected = pending.clone();
        rejected.job.verify(VerifyAction::Reject);

        let filter = PublicJobFilter::default();
        assert!(!filter.matches(&pending));
        assert!(!filter.matches(&rejected));
        assert!(filter.matches(&approved(pending)));
    }

    #[test]
    fn location_and_skill_are_case_insensitive_substrings() {
        let job = approved(listing("Berlin, DE", &["Python", "SQL"], JobType::FullTime, "a@x.io"));

        let by_location = PublicJobFilter {
            location: Some("berlin".into()),
            ..Default::default()
        };
        let by_skill = PublicJobFilter {
            skill: Some("pyth".into()),
            ..Default::default()
        };
        let miss = PublicJobFilter {
            skill: Some("rust".into()),
            ..Default::default()
        };

        assert!(by_location.matches(&job));
        assert!(by_skill.matches(&job));
        assert!(!miss.matches(&job));
    }

    #[test]
    fn job_type_matches_exactly() {
        let job = approved(listing("Remote", &[], JobType::Internship, "a@x.io"));
        let yes = PublicJobFilter {
            job_type: Some(JobType::Internship),
            ..Default::default()
        };
        let no = PublicJobFilter {
            job_type: Some(JobType::PartTime),
            ..Default::default()
        };
        assert!(yes.matches(&job));
        assert!(!no.matches(&job));
    }

    #[test]
    fn admin_filter_matches_status_and_email_exactly() {
        let job = listing("Remote", &[], JobType::FullTime, "hr@acme.io");

        let pending = AdminJobFilter {
            status: Some(JobStatus::Pending),
            company_email: Some("hr@acme.io".into()),
        };
        let other_email = AdminJobFilter {
            company_email: Some("HR@acme.io".into()),
            ..Default::default()
        };
        let approved_only = AdminJobFilter {
            status: Some(JobStatus::Approved),
            ..Default::default()
        };

        assert!(AdminJobFilter::default().matches(&job));
        assert!(pending.matches(&job));
        assert!(!other_email.matches(&job));
        assert!(!approved_only.matches(&job));
    }
}
