//! Postgres-backed store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Code | StoreError |
//! |------------|-----------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (foreign key violation) | `23503` | `NotFound` |
//! | Database (other) | any | `Backend` |
//! | RowNotFound | N/A | `NotFound` |
//! | PoolClosed / other | N/A | `Backend` |
//!
//! Multi-statement writes (job insert/update with skill links) run in a
//! single transaction.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, FromRow, PgPool, Postgres, Row, Transaction};
use tracing::instrument;
use uuid::Uuid;

use jobboard_auth::{Role, UserAccount};
use jobboard_core::{JobId, SkillId, UserId};
use jobboard_jobs::{
    AdminJobFilter, CompanyRef, Job, JobListing, JobStatus, JobType, PublicJobFilter, Skill,
};

use super::{JobStore, SkillStore, StoreError, StoreResult, TokenBlacklist, UserStore};

const USER_COLUMNS: &str =
    "id, email, password_hash, full_name, role, is_active, is_staff, date_joined";

const LISTING_SELECT: &str = r#"
    SELECT
        j.id, j.title, j.company_id, j.job_type, j.location, j.status, j.created_at,
        u.email AS company_email, u.full_name AS company_name
    FROM jobs j
    JOIN users u ON u.id = j.company_id
"#;

const NEWEST_FIRST: &str = "ORDER BY j.created_at DESC, j.id DESC";

/// Postgres implementation of every store trait.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Attach skills to the given job rows with one extra query.
    async fn hydrate(&self, operation: &'static str, rows: Vec<PgRow>) -> StoreResult<Vec<JobListing>> {
        let decode = |e| map_sqlx_error(operation, e);
        let rows = rows
            .iter()
            .map(JobRow::from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(decode)?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let links = sqlx::query(
            r#"
            SELECT js.job_id, s.id, s.name
            FROM job_skills js
            JOIN skills s ON s.id = js.skill_id
            WHERE js.job_id = ANY($1)
            ORDER BY s.name ASC
            "#,
        )
        .bind(ids.as_slice())
        .fetch_all(&*self.pool)
        .await
        .map_err(decode)?;

        let mut skills: HashMap<Uuid, Vec<Skill>> = HashMap::new();
        for link in &links {
            let job_id: Uuid = link.try_get("job_id").map_err(decode)?;
            skills.entry(job_id).or_default().push(Skill {
                id: SkillId::from_uuid(link.try_get("id").map_err(decode)?),
                name: link.try_get("name").map_err(decode)?,
            });
        }

        rows.into_iter()
            .map(|row| {
                let attached = skills.remove(&row.id).unwrap_or_default();
                row.into_listing(attached)
            })
            .collect()
    }
}

async fn link_skills(
    tx: &mut Transaction<'_, Postgres>,
    job_id: JobId,
    skills: &[Skill],
) -> Result<(), sqlx::Error> {
    for skill in skills {
        sqlx::query(
            "INSERT INTO job_skills (job_id, skill_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(job_id.as_uuid())
        .bind(skill.id.as_uuid())
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl UserStore for PostgresStore {
    #[instrument(skip(self, account), fields(user_id = %account.id, role = %account.role), err)]
    async fn insert_user(&self, account: UserAccount) -> StoreResult<UserAccount> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, full_name, role, is_active, is_staff, date_joined)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(account.id.as_uuid())
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.full_name)
        .bind(account.role.as_str())
        .bind(account.is_active)
        .bind(account.is_staff)
        .bind(account.date_joined)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;

        Ok(account)
    }

    #[instrument(skip(self, email), err)]
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserAccount>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_email", e))?;

        row.map(|r| user_from_row(&r)).transpose()
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn get_user(&self, id: UserId) -> StoreResult<Option<UserAccount>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_user", e))?;

        row.map(|r| user_from_row(&r)).transpose()
    }

    #[instrument(skip(self, full_name), fields(user_id = %id), err)]
    async fn update_full_name(&self, id: UserId, full_name: &str) -> StoreResult<UserAccount> {
        let row = sqlx::query(&format!(
            "UPDATE users SET full_name = $2 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .bind(full_name)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_full_name", e))?
        .ok_or_else(|| StoreError::NotFound(format!("user {id}")))?;

        user_from_row(&row)
    }
}

fn user_from_row(row: &PgRow) -> StoreResult<UserAccount> {
    let decode = |e| map_sqlx_error("decode_user", e);
    let role: String = row.try_get("role").map_err(decode)?;
    Ok(UserAccount {
        id: UserId::from_uuid(row.try_get("id").map_err(decode)?),
        email: row.try_get("email").map_err(decode)?,
        password_hash: row.try_get("password_hash").map_err(decode)?,
        full_name: row.try_get("full_name").map_err(decode)?,
        role: role
            .parse::<Role>()
            .map_err(|_| StoreError::Backend(format!("unknown role {role:?} in users table")))?,
        is_active: row.try_get("is_active").map_err(decode)?,
        is_staff: row.try_get("is_staff").map_err(decode)?,
        date_joined: row.try_get("date_joined").map_err(decode)?,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Skills
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl SkillStore for PostgresStore {
    /// Single-statement upsert. The no-op `DO UPDATE` makes `RETURNING`
    /// yield the existing row on conflict.
    #[instrument(skip(self), err)]
    async fn get_or_create_skill(&self, name: &str) -> StoreResult<Skill> {
        let row = sqlx::query(
            r#"
            INSERT INTO skills (id, name) VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id, name
            "#,
        )
        .bind(SkillId::new().as_uuid())
        .bind(name)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_or_create_skill", e))?;

        let decode = |e| map_sqlx_error("get_or_create_skill", e);
        Ok(Skill {
            id: SkillId::from_uuid(row.try_get("id").map_err(decode)?),
            name: row.try_get("name").map_err(decode)?,
        })
    }

    #[instrument(skip(self), err)]
    async fn list_skills(&self) -> StoreResult<Vec<Skill>> {
        let rows = sqlx::query("SELECT id, name FROM skills ORDER BY name ASC")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_skills", e))?;

        rows.iter()
            .map(|r| {
                Ok(Skill {
                    id: SkillId::from_uuid(r.try_get("id")?),
                    name: r.try_get("name")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(|e| map_sqlx_error("list_skills", e))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Jobs
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl JobStore for PostgresStore {
    #[instrument(skip(self, job), fields(job_id = %job.id, company_id = %job.company_id), err)]
    async fn insert_job(&self, job: &Job) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("insert_job", e))?;

        sqlx::query(
            r#"
            INSERT INTO jobs (id, title, company_id, job_type, location, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(job.id.as_uuid())
        .bind(&job.title)
        .bind(job.company_id.as_uuid())
        .bind(job.job_type.as_str())
        .bind(&job.location)
        .bind(job.status.as_str())
        .bind(job.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_job", e))?;

        link_skills(&mut tx, job.id, &job.skills)
            .await
            .map_err(|e| map_sqlx_error("insert_job", e))?;

        tx.commit().await.map_err(|e| map_sqlx_error("insert_job", e))
    }

    #[instrument(skip(self), fields(job_id = %id), err)]
    async fn get_job(&self, id: JobId) -> StoreResult<Option<JobListing>> {
        let sql = format!("{LISTING_SELECT} WHERE j.id = $1");
        let rows = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_job", e))?;
        Ok(self.hydrate("get_job", rows).await?.into_iter().next())
    }

    #[instrument(skip(self, job), fields(job_id = %job.id), err)]
    async fn update_job(&self, job: &Job) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("update_job", e))?;

        let updated = sqlx::query(
            "UPDATE jobs SET title = $2, job_type = $3, location = $4 WHERE id = $1",
        )
        .bind(job.id.as_uuid())
        .bind(&job.title)
        .bind(job.job_type.as_str())
        .bind(&job.location)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_job", e))?;

        if updated.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("job {}", job.id)));
        }

        sqlx::query("DELETE FROM job_skills WHERE job_id = $1")
            .bind(job.id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("update_job", e))?;

        link_skills(&mut tx, job.id, &job.skills)
            .await
            .map_err(|e| map_sqlx_error("update_job", e))?;

        tx.commit().await.map_err(|e| map_sqlx_error("update_job", e))
    }

    #[instrument(skip(self), fields(job_id = %id, status = %status), err)]
    async fn set_job_status(&self, id: JobId, status: JobStatus) -> StoreResult<()> {
        let updated = sqlx::query("UPDATE jobs SET status = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(status.as_str())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("set_job_status", e))?;

        if updated.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("job {id}")));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(job_id = %id), err)]
    async fn delete_job(&self, id: JobId) -> StoreResult<()> {
        // job_skills rows go with it (ON DELETE CASCADE).
        let deleted = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_job", e))?;

        if deleted.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("job {id}")));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(company_id = %company_id), err)]
    async fn list_company_jobs(&self, company_id: UserId) -> StoreResult<Vec<Job>> {
        let sql = format!("{LISTING_SELECT} WHERE j.company_id = $1 {NEWEST_FIRST}");
        let rows = sqlx::query(&sql)
            .bind(company_id.as_uuid())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_company_jobs", e))?;
        let listings = self.hydrate("list_company_jobs", rows).await?;
        Ok(listings.into_iter().map(|l| l.job).collect())
    }

    #[instrument(skip(self), err)]
    async fn list_admin_jobs(&self, filter: &AdminJobFilter) -> StoreResult<Vec<JobListing>> {
        let sql = format!(
            "{LISTING_SELECT}
             WHERE ($1::text IS NULL OR j.status = $1)
               AND ($2::text IS NULL OR u.email = $2)
             {NEWEST_FIRST}"
        );
        let rows = sqlx::query(&sql)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.company_email.as_deref())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_admin_jobs", e))?;
        self.hydrate("list_admin_jobs", rows).await
    }

    #[instrument(skip(self), err)]
    async fn list_public_jobs(&self, filter: &PublicJobFilter) -> StoreResult<Vec<JobListing>> {
        // Skill match is an EXISTS so each job appears once.
        let sql = format!(
            r#"{LISTING_SELECT}
             WHERE j.status = 'approved'
               AND ($1::text IS NULL OR j.job_type = $1)
               AND ($2::text IS NULL OR j.location ILIKE $2 ESCAPE '\')
               AND ($3::text IS NULL OR EXISTS (
                    SELECT 1 FROM job_skills js
                    JOIN skills s ON s.id = js.skill_id
                    WHERE js.job_id = j.id AND s.name ILIKE $3 ESCAPE '\'
               ))
             {NEWEST_FIRST}"#
        );
        let rows = sqlx::query(&sql)
            .bind(filter.job_type.map(|t| t.as_str()))
            .bind(filter.location.as_deref().map(like_pattern))
            .bind(filter.skill.as_deref().map(like_pattern))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_public_jobs", e))?;
        self.hydrate("list_public_jobs", rows).await
    }
}

/// `%needle%` with LIKE metacharacters escaped.
fn like_pattern(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len() + 2);
    out.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

struct JobRow {
    id: Uuid,
    title: String,
    company_id: Uuid,
    job_type: String,
    location: String,
    status: String,
    created_at: DateTime<Utc>,
    company_email: String,
    company_name: String,
}

impl<'r> FromRow<'r, PgRow> for JobRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(JobRow {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            company_id: row.try_get("company_id")?,
            job_type: row.try_get("job_type")?,
            location: row.try_get("location")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
            company_email: row.try_get("company_email")?,
            company_name: row.try_get("company_name")?,
        })
    }
}

impl JobRow {
    fn into_listing(self, skills: Vec<Skill>) -> StoreResult<JobListing> {
        let job_type: JobType = self
            .job_type
            .parse()
            .map_err(|_| StoreError::Backend(format!("unknown job_type {:?}", self.job_type)))?;
        let status: JobStatus = self
            .status
            .parse()
            .map_err(|_| StoreError::Backend(format!("unknown status {:?}", self.status)))?;
        let company_id = UserId::from_uuid(self.company_id);

        Ok(JobListing {
            job: Job {
                id: JobId::from_uuid(self.id),
                title: self.title,
                company_id,
                job_type,
                location: self.location,
                skills,
                status,
                created_at: self.created_at,
            },
            company: CompanyRef {
                id: company_id,
                email: self.company_email,
                full_name: self.company_name,
            },
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Token blacklist
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl TokenBlacklist for PostgresStore {
    #[instrument(skip(self), fields(jti = %jti), err)]
    async fn blacklist_token(&self, jti: Uuid, expires_at: DateTime<Utc>) -> StoreResult<bool> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO blacklisted_tokens (jti, expires_at, blacklisted_at)
            VALUES ($1, $2, now())
            ON CONFLICT (jti) DO NOTHING
            "#,
        )
        .bind(jti)
        .bind(expires_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("blacklist_token", e))?;

        Ok(inserted.rows_affected() == 1)
    }

    #[instrument(skip(self), fields(jti = %jti), err)]
    async fn is_token_blacklisted(&self, jti: Uuid) -> StoreResult<bool> {
        let row = sqlx::query("SELECT 1 FROM blacklisted_tokens WHERE jti = $1")
            .bind(jti)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("is_token_blacklisted", e))?;

        Ok(row.is_some())
    }

    #[instrument(skip(self), err)]
    async fn purge_expired_tokens(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let deleted = sqlx::query("DELETE FROM blacklisted_tokens WHERE expires_at < $1")
            .bind(now)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("purge_expired_tokens", e))?;

        Ok(deleted.rows_affected())
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(msg),
                Some("23503") => StoreError::NotFound(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::RowNotFound => StoreError::NotFound(format!("no row in {operation}")),
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {operation}"))
        }
        other => StoreError::Backend(format!("sqlx error in {operation}: {other}")),
    }
}
