use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::link_dto::ApplicationFormPayload;
use crate::error::{Error, Result};
use crate::models::application_link::{ApplicationLink, LinkState};
use crate::models::detailed_application::{DetailedApplication, StageStatuses};
use crate::models::job::Job;
use crate::services::application_service::{APPLICATION_COLUMNS, APPLICATION_FROM};
use crate::services::stage_engine::recompute_overall;

pub const MIN_DURATION_DAYS: i64 = 1;
pub const MAX_DURATION_DAYS: i64 = 365;

const LINK_COLUMNS: &str =
    "l.id, l.token, l.job_id, j.title AS job_title, l.expires_at, l.is_used, l.created_by, l.created_at";

#[derive(Clone)]
pub struct LinkService {
    pool: PgPool,
    default_duration_days: i64,
}

/// What the applicant sees before filling in the form.
#[derive(Debug, Clone)]
pub struct LinkForm {
    pub link: ApplicationLink,
    pub job: Option<Job>,
}

/// Maps a link state onto the error the applicant receives.
pub fn ensure_redeemable(state: LinkState) -> Result<()> {
    match state {
        LinkState::Active => Ok(()),
        LinkState::Expired => Err(Error::LinkExpired),
        LinkState::Redeemed => Err(Error::LinkAlreadyUsed),
    }
}

/// Tokens arrive as path text; anything that is not a UUID is simply unknown.
pub fn parse_token(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| Error::LinkInvalid)
}

pub fn apply_url(public_base_url: &str, token: Uuid) -> String {
    format!("{}/apply/{}", public_base_url.trim_end_matches('/'), token)
}

impl LinkService {
    pub fn new(pool: PgPool, default_duration_days: i64) -> Self {
        Self {
            pool,
            default_duration_days,
        }
    }

    pub async fn create(
        &self,
        owner: Uuid,
        job_id: Option<Uuid>,
        duration_days: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<ApplicationLink> {
        let days = duration_days.unwrap_or(self.default_duration_days);
        if !(MIN_DURATION_DAYS..=MAX_DURATION_DAYS).contains(&days) {
            return Err(Error::BadRequest(format!(
                "duration_days must be between {} and {}",
                MIN_DURATION_DAYS, MAX_DURATION_DAYS
            )));
        }

        if let Some(job_id) = job_id {
            let owned: Option<Uuid> =
                sqlx::query_scalar("SELECT id FROM jobs WHERE id = $1 AND created_by = $2")
                    .bind(job_id)
                    .bind(owner)
                    .fetch_optional(&self.pool)
                    .await?;
            if owned.is_none() {
                return Err(Error::NotFound("Job not found".into()));
            }
        }

        let link = sqlx::query_as::<_, ApplicationLink>(&format!(
            r#"
            WITH l AS (
                INSERT INTO application_links (id, token, job_id, expires_at, is_used, created_by, created_at)
                VALUES ($1, $2, $3, $4, FALSE, $5, $6)
                RETURNING *
            )
            SELECT {} FROM l LEFT JOIN jobs j ON j.id = l.job_id
            "#,
            LINK_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(Uuid::new_v4())
        .bind(job_id)
        .bind(now + Duration::days(days))
        .bind(owner)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(link_id = %link.id, job_id = ?link.job_id, expires_at = %link.expires_at, "Application link issued");
        Ok(link)
    }

    pub async fn list(&self, owner: Uuid) -> Result<Vec<ApplicationLink>> {
        let links = sqlx::query_as::<_, ApplicationLink>(&format!(
            "SELECT {} FROM application_links l LEFT JOIN jobs j ON j.id = l.job_id \
             WHERE l.created_by = $1 ORDER BY l.created_at DESC",
            LINK_COLUMNS
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(links)
    }

    async fn find_by_token(&self, token: Uuid) -> Result<ApplicationLink> {
        sqlx::query_as::<_, ApplicationLink>(&format!(
            "SELECT {} FROM application_links l LEFT JOIN jobs j ON j.id = l.job_id WHERE l.token = $1",
            LINK_COLUMNS
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(Error::LinkInvalid)
    }

    /// Loads the form context for an active link.
    pub async fn inspect(&self, token: Uuid, now: DateTime<Utc>) -> Result<LinkForm> {
        let link = self.find_by_token(token).await?;
        ensure_redeemable(link.state_at(now))?;

        let job = match link.job_id {
            Some(job_id) => Some(
                sqlx::query_as::<_, Job>(
                    "SELECT id, title, department, description, requirements, location, is_active, \
                     created_by, created_at, updated_at FROM jobs WHERE id = $1",
                )
                .bind(job_id)
                .fetch_one(&self.pool)
                .await?,
            ),
            None => None,
        };
        Ok(LinkForm { link, job })
    }

    /// Creates the detailed application and consumes the link, atomically.
    /// A link is active until it is redeemed or `now` passes `expires_at`;
    /// the link state is settled before the form is validated.
    pub async fn redeem(
        &self,
        token: Uuid,
        form: ApplicationFormPayload,
        now: DateTime<Utc>,
    ) -> Result<DetailedApplication> {
        let mut tx = self.pool.begin().await?;

        let link = sqlx::query_as::<_, ApplicationLink>(
            r#"
            SELECT id, token, job_id, NULL::text AS job_title, expires_at, is_used, created_by, created_at
            FROM application_links
            WHERE token = $1
            FOR UPDATE
            "#,
        )
        .bind(token)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(Error::LinkInvalid)?;

        ensure_redeemable(link.state_at(now))?;
        form.validate()?;

        let statuses = StageStatuses::default();
        let application_id = Uuid::new_v4();
        let inserted = sqlx::query(
            r#"
            INSERT INTO detailed_applications (
                id, link_id, full_name, email, phone_number, cover_letter, submitted_at, updated_at,
                overall_status, phone_status, hr_status, technical_status, ceo_status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (link_id) DO NOTHING
            "#,
        )
        .bind(application_id)
        .bind(link.id)
        .bind(form.full_name.trim())
        .bind(form.email.trim())
        .bind(form.phone_number.trim())
        .bind(form.cover_letter.trim())
        .bind(now)
        .bind(recompute_overall(&statuses).as_str())
        .bind(statuses.phone.as_str())
        .bind(statuses.hr.as_str())
        .bind(statuses.technical.as_str())
        .bind(statuses.ceo.as_str())
        .execute(&mut *tx)
        .await?;
        if inserted.rows_affected() == 0 {
            return Err(Error::LinkAlreadyUsed);
        }

        let consumed = sqlx::query(
            "UPDATE application_links SET is_used = TRUE WHERE id = $1 AND is_used = FALSE",
        )
        .bind(link.id)
        .execute(&mut *tx)
        .await?;
        if consumed.rows_affected() == 0 {
            return Err(Error::LinkAlreadyUsed);
        }

        let application = sqlx::query_as::<_, DetailedApplication>(&format!(
            "SELECT {} FROM {} WHERE a.id = $1",
            APPLICATION_COLUMNS, APPLICATION_FROM
        ))
        .bind(application_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            application_id = %application.id,
            link_id = %link.id,
            "Application link redeemed"
        );
        Ok(application)
    }
}
