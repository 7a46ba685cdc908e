use crate::dto::job_dto::{CreateJobPayload, JobListQuery, UpdateJobPayload};
use crate::error::{Error, Result};
use crate::models::job::{Job, JobActivity};
use crate::utils::department::normalize_department;
use crate::utils::pagination::PageWindow;
use sqlx::PgPool;
use uuid::Uuid;

const JOB_COLUMNS: &str = "id, title, department, description, requirements, location, is_active, created_by, created_at, updated_at";

#[derive(Clone)]
pub struct JobService {
    pool: PgPool,
}

pub struct JobList {
    pub items: Vec<Job>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

/// Who is asking: an HR owner sees only their jobs, the public only active ones.
#[derive(Debug, Clone, Copy)]
pub enum JobScope {
    Owner(Uuid),
    Public,
}

impl JobService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, owner: Uuid, payload: CreateJobPayload) -> Result<Job> {
        let job = sqlx::query_as::<_, Job>(&format!(
            r#"
            INSERT INTO jobs (id, title, department, description, requirements, location, is_active, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(payload.title.trim())
        .bind(normalize_department(&payload.department))
        .bind(&payload.description)
        .bind(&payload.requirements)
        .bind(payload.location.trim())
        .bind(payload.is_active.unwrap_or(true))
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(job_id = %job.id, %owner, "Job created");
        Ok(job)
    }

    pub async fn update(&self, owner: Uuid, id: Uuid, payload: UpdateJobPayload) -> Result<Job> {
        let department = payload.department.as_deref().map(normalize_department);
        let job = sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs
            SET
                title = COALESCE($3, title),
                department = COALESCE($4, department),
                description = COALESCE($5, description),
                requirements = COALESCE($6, requirements),
                location = COALESCE($7, location),
                is_active = COALESCE($8, is_active),
                updated_at = NOW()
            WHERE id = $1 AND created_by = $2
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind(id)
        .bind(owner)
        .bind(payload.title.as_deref().map(str::trim))
        .bind(department)
        .bind(payload.description)
        .bind(payload.requirements)
        .bind(payload.location.as_deref().map(str::trim))
        .bind(payload.is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Job not found".into()))?;

        Ok(job)
    }

    pub async fn toggle_active(&self, owner: Uuid, id: Uuid) -> Result<Job> {
        let job = sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs
            SET is_active = NOT is_active, updated_at = NOW()
            WHERE id = $1 AND created_by = $2
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Job not found".into()))?;

        tracing::info!(job_id = %job.id, is_active = job.is_active, "Job visibility toggled");
        Ok(job)
    }

    /// Jobs that submissions or links point at are kept; deactivate them instead.
    pub async fn delete(&self, owner: Uuid, id: Uuid) -> Result<()> {
        self.get_owned(owner, id).await?;

        let references: i64 = sqlx::query_scalar(
            r#"
            SELECT (SELECT COUNT(*) FROM cv_submissions WHERE job_id = $1)
                 + (SELECT COUNT(*) FROM application_links WHERE job_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        if references > 0 {
            return Err(Error::Conflict(
                "Job has submissions or application links; deactivate it instead".into(),
            ));
        }

        sqlx::query("DELETE FROM jobs WHERE id = $1 AND created_by = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        tracing::info!(job_id = %id, "Job deleted");
        Ok(())
    }

    pub async fn get_owned(&self, owner: Uuid, id: Uuid) -> Result<Job> {
        sqlx::query_as::<_, Job>(&format!(
            "SELECT {} FROM jobs WHERE id = $1 AND created_by = $2",
            JOB_COLUMNS
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Job not found".into()))
    }

    pub async fn get_active(&self, id: Uuid) -> Result<Job> {
        sqlx::query_as::<_, Job>(&format!(
            "SELECT {} FROM jobs WHERE id = $1 AND is_active = TRUE",
            JOB_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Job not found".into()))
    }

    pub async fn list(&self, scope: JobScope, query: JobListQuery) -> Result<JobList> {
        let window = PageWindow::new(query.page, query.per_page);

        let (owner, active) = match scope {
            JobScope::Owner(id) => (Some(id), query.is_active),
            JobScope::Public => (None, Some(true)),
        };

        // $1 owner and $2 active are always bound; text filters follow
        let mut filters = vec![
            "($1::uuid IS NULL OR created_by = $1)".to_string(),
            "($2::boolean IS NULL OR is_active = $2)".to_string(),
        ];
        let mut args: Vec<String> = Vec::new();

        if let Some(department) = query.department.filter(|d| !d.trim().is_empty()) {
            filters.push(format!("department = ${}", args.len() + 3));
            args.push(normalize_department(&department));
        }
        if let Some(location) = query.location.filter(|l| !l.trim().is_empty()) {
            filters.push(format!("location ILIKE ${}", args.len() + 3));
            args.push(format!("%{}%", location.trim()));
        }
        if let Some(search) = query.search.filter(|s| !s.trim().is_empty()) {
            let slot = args.len() + 3;
            filters.push(format!(
                "(title ILIKE ${slot} OR description ILIKE ${slot} OR requirements ILIKE ${slot})"
            ));
            args.push(format!("%{}%", search.trim()));
        }

        let where_clause = format!("WHERE {}", filters.join(" AND "));

        let items_query = format!(
            "SELECT {} FROM jobs {} ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
            JOB_COLUMNS,
            where_clause,
            args.len() + 3,
            args.len() + 4
        );
        let total_query = format!("SELECT COUNT(*) FROM jobs {}", where_clause);

        let mut items_statement = sqlx::query_as::<_, Job>(&items_query).bind(owner).bind(active);
        for value in &args {
            items_statement = items_statement.bind(value);
        }
        let items = items_statement
            .bind(window.per_page)
            .bind(window.offset)
            .fetch_all(&self.pool)
            .await?;

        let mut total_statement = sqlx::query_scalar::<_, i64>(&total_query).bind(owner).bind(active);
        for value in &args {
            total_statement = total_statement.bind(value);
        }
        let total = total_statement.fetch_one(&self.pool).await?;

        Ok(JobList {
            items,
            total,
            page: window.page,
            per_page: window.per_page,
            total_pages: window.total_pages(total),
        })
    }

    /// Per-job submission and application counts for an owner's jobs.
    pub async fn activity(&self, owner: Uuid) -> Result<Vec<JobActivity>> {
        let rows = sqlx::query_as::<_, JobActivity>(
            r#"
            SELECT
                j.id AS job_id,
                j.title,
                j.is_active,
                (SELECT COUNT(*) FROM cv_submissions s WHERE s.job_id = j.id) AS submissions,
                (SELECT COUNT(*) FROM cv_submissions s WHERE s.job_id = j.id AND NOT s.is_viewed) AS unviewed_submissions,
                (SELECT COUNT(*) FROM detailed_applications a
                    JOIN application_links l ON l.id = a.link_id
                    WHERE l.job_id = j.id) AS applications
            FROM jobs j
            WHERE j.created_by = $1
            ORDER BY j.created_at DESC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
