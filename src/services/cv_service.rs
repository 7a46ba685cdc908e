use crate::dto::cv_dto::SubmissionListQuery;
use crate::error::{Error, Result};
use crate::models::cv_submission::{CvSubmission, DepartmentCount};
use crate::services::storage_service::StoredFile;
use crate::utils::department::normalize_department;
use crate::utils::pagination::PageWindow;
use sqlx::PgPool;
use uuid::Uuid;

const SUBMISSION_COLUMNS: &str = "s.id, s.job_id, j.title AS job_title, s.applicant_name, s.applicant_email, \
     s.cv_path, s.cv_filename, s.cv_content_type, s.department, s.is_viewed, s.submitted_at";

// HR users see submissions for their own jobs plus general ones.
const VISIBLE_TO_OWNER: &str = "(s.job_id IS NULL OR j.created_by = $1)";

#[derive(Clone)]
pub struct CvService {
    pool: PgPool,
}

pub struct NewCvSubmission {
    pub job_id: Option<Uuid>,
    pub applicant_name: String,
    pub applicant_email: String,
    pub department: String,
    pub file: StoredFile,
}

pub struct SubmissionList {
    pub items: Vec<CvSubmission>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl CvService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: NewCvSubmission) -> Result<CvSubmission> {
        let submission = sqlx::query_as::<_, CvSubmission>(&format!(
            r#"
            WITH s AS (
                INSERT INTO cv_submissions (
                    id, job_id, applicant_name, applicant_email,
                    cv_path, cv_filename, cv_content_type, department
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING *
            )
            SELECT {} FROM s LEFT JOIN jobs j ON j.id = s.job_id
            "#,
            SUBMISSION_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(new.job_id)
        .bind(new.applicant_name.trim())
        .bind(new.applicant_email.trim())
        .bind(&new.file.path)
        .bind(&new.file.original_name)
        .bind(&new.file.content_type)
        .bind(normalize_department(&new.department))
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            submission_id = %submission.id,
            job_id = ?submission.job_id,
            department = %submission.department,
            "CV submission received"
        );
        Ok(submission)
    }

    pub async fn get_visible(&self, owner: Uuid, id: Uuid) -> Result<CvSubmission> {
        sqlx::query_as::<_, CvSubmission>(&format!(
            "SELECT {} FROM cv_submissions s LEFT JOIN jobs j ON j.id = s.job_id WHERE {} AND s.id = $2",
            SUBMISSION_COLUMNS, VISIBLE_TO_OWNER
        ))
        .bind(owner)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Submission not found".into()))
    }

    pub async fn mark_viewed(&self, owner: Uuid, id: Uuid) -> Result<CvSubmission> {
        self.get_visible(owner, id).await?;
        sqlx::query("UPDATE cv_submissions SET is_viewed = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        self.get_visible(owner, id).await
    }

    pub async fn list(&self, owner: Uuid, query: SubmissionListQuery) -> Result<SubmissionList> {
        let window = PageWindow::new(query.page, query.per_page);

        // $1 owner, $2 job, $3 viewed are always bound; text filters follow
        let mut filters = vec![
            VISIBLE_TO_OWNER.to_string(),
            "($2::uuid IS NULL OR s.job_id = $2)".to_string(),
            "($3::boolean IS NULL OR s.is_viewed = $3)".to_string(),
        ];
        let mut args: Vec<String> = Vec::new();

        if let Some(department) = query.department.filter(|d| !d.trim().is_empty()) {
            filters.push(format!("s.department = ${}", args.len() + 4));
            args.push(normalize_department(&department));
        }
        if let Some(search) = query.search.filter(|s| !s.trim().is_empty()) {
            let slot = args.len() + 4;
            filters.push(format!(
                "(s.applicant_name ILIKE ${slot} OR s.applicant_email ILIKE ${slot})"
            ));
            args.push(format!("%{}%", search.trim()));
        }

        let where_clause = format!("WHERE {}", filters.join(" AND "));
        let items_query = format!(
            "SELECT {} FROM cv_submissions s LEFT JOIN jobs j ON j.id = s.job_id {} \
             ORDER BY s.submitted_at DESC LIMIT ${} OFFSET ${}",
            SUBMISSION_COLUMNS,
            where_clause,
            args.len() + 4,
            args.len() + 5
        );
        let total_query = format!(
            "SELECT COUNT(*) FROM cv_submissions s LEFT JOIN jobs j ON j.id = s.job_id {}",
            where_clause
        );

        let mut items_statement = sqlx::query_as::<_, CvSubmission>(&items_query)
            .bind(owner)
            .bind(query.job_id)
            .bind(query.is_viewed);
        for value in &args {
            items_statement = items_statement.bind(value);
        }
        let items = items_statement
            .bind(window.per_page)
            .bind(window.offset)
            .fetch_all(&self.pool)
            .await?;

        let mut total_statement = sqlx::query_scalar::<_, i64>(&total_query)
            .bind(owner)
            .bind(query.job_id)
            .bind(query.is_viewed);
        for value in &args {
            total_statement = total_statement.bind(value);
        }
        let total = total_statement.fetch_one(&self.pool).await?;

        Ok(SubmissionList {
            items,
            total,
            page: window.page,
            per_page: window.per_page,
            total_pages: window.total_pages(total),
        })
    }

    pub async fn department_counts(&self, owner: Uuid) -> Result<Vec<DepartmentCount>> {
        let rows = sqlx::query_as::<_, DepartmentCount>(&format!(
            r#"
            SELECT s.department, COUNT(*) AS submissions
            FROM cv_submissions s LEFT JOIN jobs j ON j.id = s.job_id
            WHERE {}
            GROUP BY s.department
            ORDER BY submissions DESC, s.department
            "#,
            VISIBLE_TO_OWNER
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn unviewed_count(&self, owner: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM cv_submissions s LEFT JOIN jobs j ON j.id = s.job_id \
             WHERE {} AND NOT s.is_viewed",
            VISIBLE_TO_OWNER
        ))
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
