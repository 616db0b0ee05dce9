use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use jobboard_auth::UserAccount;
use jobboard_core::{JobId, SkillId, UserId};
use jobboard_jobs::{
    AdminJobFilter, CompanyRef, Job, JobListing, JobStatus, PublicJobFilter, Skill,
};

use super::{JobStore, SkillStore, StoreError, StoreResult, TokenBlacklist, UserStore};

#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, UserAccount>,
    skills: HashMap<String, Skill>,
    jobs: HashMap<JobId, Job>,
    blacklist: HashMap<Uuid, DateTime<Utc>>,
}

impl State {
    fn listing(&self, job: &Job) -> StoreResult<JobListing> {
        let owner = self.users.get(&job.company_id).ok_or_else(|| {
            StoreError::Backend(format!("job {} references missing company", job.id))
        })?;
        Ok(JobListing {
            job: job.clone(),
            company: CompanyRef {
                id: owner.id,
                email: owner.email.clone(),
                full_name: owner.full_name.clone(),
            },
        })
    }

    fn listings(&self, keep: impl Fn(&JobListing) -> bool) -> StoreResult<Vec<JobListing>> {
        let mut out = Vec::new();
        for job in self.jobs.values() {
            let listing = self.listing(job)?;
            if keep(&listing) {
                out.push(listing);
            }
        }
        out.sort_by(|a, b| newest_first(&a.job, &b.job));
        Ok(out)
    }
}

fn newest_first(a: &Job, b: &Job) -> std::cmp::Ordering {
    b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id))
}

/// In-memory store for tests and local development.
///
/// All state sits behind one lock, so each operation is atomic with respect
/// to the others. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".into()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".into()))
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn insert_user(&self, account: UserAccount) -> StoreResult<UserAccount> {
        let mut state = self.write()?;
        if state.users.values().any(|u| u.email == account.email) {
            return Err(StoreError::Conflict(format!(
                "user with email {} already exists",
                account.email
            )));
        }
        state.users.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserAccount>> {
        Ok(self.read()?.users.values().find(|u| u.email == email).cloned())
    }

    async fn get_user(&self, id: UserId) -> StoreResult<Option<UserAccount>> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn update_full_name(&self, id: UserId, full_name: &str) -> StoreResult<UserAccount> {
        let mut state = self.write()?;
        let user = state
            .users
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("user {id}")))?;
        user.full_name = full_name.to_string();
        Ok(user.clone())
    }
}

#[async_trait]
impl SkillStore for InMemoryStore {
    async fn get_or_create_skill(&self, name: &str) -> StoreResult<Skill> {
        let mut state = self.write()?;
        let skill = state
            .skills
            .entry(name.to_string())
            .or_insert_with(|| Skill {
                id: SkillId::new(),
                name: name.to_string(),
            });
        Ok(skill.clone())
    }

    async fn list_skills(&self) -> StoreResult<Vec<Skill>> {
        let mut skills: Vec<Skill> = self.read()?.skills.values().cloned().collect();
        skills.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(skills)
    }
}

#[async_trait]
impl JobStore for InMemoryStore {
    async fn insert_job(&self, job: &Job) -> StoreResult<()> {
        let mut state = self.write()?;
        if !state.users.contains_key(&job.company_id) {
            return Err(StoreError::NotFound(format!("company {}", job.company_id)));
        }
        if state.jobs.contains_key(&job.id) {
            return Err(StoreError::Conflict(format!("job {} already exists", job.id)));
        }
        state.jobs.insert(job.id, job.clone());
        Ok(())
    }

    async fn get_job(&self, id: JobId) -> StoreResult<Option<JobListing>> {
        let state = self.read()?;
        state.jobs.get(&id).map(|job| state.listing(job)).transpose()
    }

    async fn update_job(&self, job: &Job) -> StoreResult<()> {
        let mut state = self.write()?;
        let stored = state
            .jobs
            .get_mut(&job.id)
            .ok_or_else(|| StoreError::NotFound(format!("job {}", job.id)))?;
        stored.title = job.title.clone();
        stored.job_type = job.job_type;
        stored.location = job.location.clone();
        stored.skills = job.skills.clone();
        Ok(())
    }

    async fn set_job_status(&self, id: JobId, status: JobStatus) -> StoreResult<()> {
        let mut state = self.write()?;
        let stored = state
            .jobs
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("job {id}")))?;
        stored.status = status;
        Ok(())
    }

    async fn delete_job(&self, id: JobId) -> StoreResult<()> {
        self.write()?
            .jobs
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("job {id}")))
    }

    async fn list_company_jobs(&self, company_id: UserId) -> StoreResult<Vec<Job>> {
        let mut jobs: Vec<Job> = self
            .read()?
            .jobs
            .values()
            .filter(|j| j.company_id == company_id)
            .cloned()
            .collect();
        jobs.sort_by(newest_first);
        Ok(jobs)
    }

    async fn list_admin_jobs(&self, filter: &AdminJobFilter) -> StoreResult<Vec<JobListing>> {
        self.read()?.listings(|l| filter.matches(l))
    }

    async fn list_public_jobs(&self, filter: &PublicJobFilter) -> StoreResult<Vec<JobListing>> {
        self.read()?.listings(|l| filter.matches(l))
    }
}

#[async_trait]
impl TokenBlacklist for InMemoryStore {
    async fn blacklist_token(&self, jti: Uuid, expires_at: DateTime<Utc>) -> StoreResult<bool> {
        let mut state = self.write()?;
        if state.blacklist.contains_key(&jti) {
            return Ok(false);
        }
        state.blacklist.insert(jti, expires_at);
        Ok(true)
    }

    async fn is_token_blacklisted(&self, jti: Uuid) -> StoreResult<bool> {
        Ok(self.read()?.blacklist.contains_key(&jti))
    }

    async fn purge_expired_tokens(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let mut state = self.write()?;
        let before = state.blacklist.len();
        state.blacklist.retain(|_, expires_at| *expires_at >= now);
        Ok((before - state.blacklist.len()) as u64)
    }
}
