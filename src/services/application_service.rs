use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::application_dto::ApplicationListQuery;
use crate::error::{Error, Result};
use crate::models::detailed_application::{DetailedApplication, OverallStatusCount};
use crate::services::stage_engine::{detect_transitions, recompute_overall, StageTransition};
use crate::services::stage_gating::{apply_stage_edits, field_editability, StageEdits};
use crate::utils::pagination::PageWindow;

pub(crate) const APPLICATION_COLUMNS: &str = "a.id, a.link_id, l.created_by AS link_owner, l.job_id, \
     j.title AS job_title, a.full_name, a.email, a.phone_number, a.cover_letter, a.submitted_at, \
     a.is_viewed, a.interview_date, a.overall_status, a.phone_status, a.phone_comment, a.hr_status, \
     a.hr_comment, a.technical_status, a.technical_comment, a.ceo_status, a.ceo_comment, a.updated_at";

pub(crate) const APPLICATION_FROM: &str = "detailed_applications a \
     JOIN application_links l ON l.id = a.link_id \
     LEFT JOIN jobs j ON j.id = l.job_id";

#[derive(Clone)]
pub struct ApplicationService {
    pool: PgPool,
}

pub struct ApplicationList {
    pub items: Vec<DetailedApplication>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

/// Applicant details HR may correct while the application is in review.
#[derive(Debug, Clone, Default)]
pub struct ApplicantDetailsEdit {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub cover_letter: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ApplicationUpdate {
    pub details: ApplicantDetailsEdit,
    pub interview_date: Option<DateTime<Utc>>,
    pub stages: StageEdits,
}

pub struct StatusUpdateOutcome {
    pub application: DetailedApplication,
    pub transitions: Vec<StageTransition>,
}

impl ApplicationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_owned(&self, owner: Uuid, id: Uuid) -> Result<DetailedApplication> {
        sqlx::query_as::<_, DetailedApplication>(&format!(
            "SELECT {} FROM {} WHERE a.id = $1 AND l.created_by = $2",
            APPLICATION_COLUMNS, APPLICATION_FROM
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Application not found".into()))
    }

    pub async fn mark_viewed(&self, owner: Uuid, id: Uuid) -> Result<DetailedApplication> {
        let updated = sqlx::query(
            r#"
            UPDATE detailed_applications a
            SET is_viewed = TRUE
            FROM application_links l
            WHERE l.id = a.link_id AND a.id = $1 AND l.created_by = $2
            "#,
        )
        .bind(id)
        .bind(owner)
        .execute(&self.pool)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(Error::NotFound("Application not found".into()));
        }
        self.get_owned(owner, id).await
    }

    /// Applies an HR update under a row lock and reports which stages left
    /// pending. Locked fields are left untouched; the overall status is
    /// always recomputed from the stage statuses.
    pub async fn update_status(
        &self,
        owner: Uuid,
        id: Uuid,
        update: ApplicationUpdate,
        now: DateTime<Utc>,
    ) -> Result<StatusUpdateOutcome> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, DetailedApplication>(&format!(
            "SELECT {} FROM {} WHERE a.id = $1 AND l.created_by = $2 FOR UPDATE OF a",
            APPLICATION_COLUMNS, APPLICATION_FROM
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound("Application not found".into()))?;

        let access = field_editability(&current.statuses, current.overall_status);
        let (statuses, comments) = apply_stage_edits(
            &current.statuses,
            &current.comments,
            current.overall_status,
            &update.stages,
        )?;
        let overall = recompute_overall(&statuses);
        let transitions = detect_transitions(&current.statuses, &statuses);

        let details = if access.applicant_details {
            update.details
        } else {
            ApplicantDetailsEdit::default()
        };
        let interview_date = update.interview_date.filter(|_| access.interview_date);

        sqlx::query(
            r#"
            UPDATE detailed_applications
            SET
                full_name = COALESCE($2, full_name),
                email = COALESCE($3, email),
                phone_number = COALESCE($4, phone_number),
                cover_letter = COALESCE($5, cover_letter),
                interview_date = COALESCE($6, interview_date),
                phone_status = $7,
                phone_comment = $8,
                hr_status = $9,
                hr_comment = $10,
                technical_status = $11,
                technical_comment = $12,
                ceo_status = $13,
                ceo_comment = $14,
                overall_status = $15,
                updated_at = $16
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(details.full_name.as_deref().map(str::trim))
        .bind(details.email.as_deref().map(str::trim))
        .bind(details.phone_number.as_deref().map(str::trim))
        .bind(details.cover_letter.as_deref().map(str::trim))
        .bind(interview_date)
        .bind(statuses.phone.as_str())
        .bind(&comments.phone)
        .bind(statuses.hr.as_str())
        .bind(&comments.hr)
        .bind(statuses.technical.as_str())
        .bind(&comments.technical)
        .bind(statuses.ceo.as_str())
        .bind(&comments.ceo)
        .bind(overall.as_str())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let application = sqlx::query_as::<_, DetailedApplication>(&format!(
            "SELECT {} FROM {} WHERE a.id = $1",
            APPLICATION_COLUMNS, APPLICATION_FROM
        ))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        if current.overall_status != overall {
            tracing::info!(
                application_id = %id,
                from = %current.overall_status,
                to = %overall,
                "Application overall status changed"
            );
        }
        for transition in &transitions {
            tracing::info!(
                application_id = %id,
                stage = %transition.stage,
                to = %transition.to,
                "Interview stage decided"
            );
        }

        Ok(StatusUpdateOutcome {
            application,
            transitions,
        })
    }

    pub async fn list(&self, owner: Uuid, query: ApplicationListQuery) -> Result<ApplicationList> {
        let window = PageWindow::new(query.page, query.per_page);

        // $1 owner, $2 job, $3 overall status are always bound; search follows
        let mut filters = vec![
            "l.created_by = $1".to_string(),
            "($2::uuid IS NULL OR l.job_id = $2)".to_string(),
            "($3::text IS NULL OR a.overall_status = $3)".to_string(),
        ];
        let mut search: Option<String> = None;
        if let Some(term) = query.search.filter(|s| !s.trim().is_empty()) {
            filters.push(
                "(a.full_name ILIKE $4 OR a.email ILIKE $4 OR a.phone_number ILIKE $4)".to_string(),
            );
            search = Some(format!("%{}%", term.trim()));
        }
        let status = query.overall_status.map(|s| s.as_str());

        let where_clause = format!("WHERE {}", filters.join(" AND "));
        let next_slot = if search.is_some() { 5 } else { 4 };
        let items_query = format!(
            "SELECT {} FROM {} {} ORDER BY a.submitted_at DESC LIMIT ${} OFFSET ${}",
            APPLICATION_COLUMNS,
            APPLICATION_FROM,
            where_clause,
            next_slot,
            next_slot + 1
        );
        let total_query = format!("SELECT COUNT(*) FROM {} {}", APPLICATION_FROM, where_clause);

        let mut items_statement = sqlx::query_as::<_, DetailedApplication>(&items_query)
            .bind(owner)
            .bind(query.job_id)
            .bind(status);
        if let Some(term) = &search {
            items_statement = items_statement.bind(term);
        }
        let items = items_statement
            .bind(window.per_page)
            .bind(window.offset)
            .fetch_all(&self.pool)
            .await?;

        let mut total_statement = sqlx::query_scalar::<_, i64>(&total_query)
            .bind(owner)
            .bind(query.job_id)
            .bind(status);
        if let Some(term) = &search {
            total_statement = total_statement.bind(term);
        }
        let total = total_statement.fetch_one(&self.pool).await?;

        Ok(ApplicationList {
            items,
            total,
            page: window.page,
            per_page: window.per_page,
            total_pages: window.total_pages(total),
        })
    }

    pub async fn status_counts(&self, owner: Uuid) -> Result<Vec<OverallStatusCount>> {
        let rows = sqlx::query_as::<_, OverallStatusCount>(
            r#"
            SELECT a.overall_status, COUNT(*) AS applications
            FROM detailed_applications a
            JOIN application_links l ON l.id = a.link_id
            WHERE l.created_by = $1
            GROUP BY a.overall_status
            ORDER BY a.overall_status
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn unviewed_count(&self, owner: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM detailed_applications a
            JOIN application_links l ON l.id = a.link_id
            WHERE l.created_by = $1 AND NOT a.is_viewed
            "#,
        )
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
