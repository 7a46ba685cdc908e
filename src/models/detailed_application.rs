use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, Row};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Outcome of a single interview stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    #[default]
    Pending,
    Passed,
    Failed,
}

impl StageStatus {
    pub const ALL: [StageStatus; 3] = [StageStatus::Pending, StageStatus::Passed, StageStatus::Failed];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageStatus::Pending => "pending",
            StageStatus::Passed => "passed",
            StageStatus::Failed => "failed",
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, StageStatus::Pending)
    }
}

/// Aggregate outcome of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    #[default]
    Review,
    Hired,
    Rejected,
}

impl OverallStatus {
    pub const ALL: [OverallStatus; 3] = [
        OverallStatus::Review,
        OverallStatus::Hired,
        OverallStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OverallStatus::Review => "review",
            OverallStatus::Hired => "hired",
            OverallStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown status value '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for StageStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(StageStatus::Pending),
            "passed" => Ok(StageStatus::Passed),
            "failed" => Ok(StageStatus::Failed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl FromStr for OverallStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "review" => Ok(OverallStatus::Review),
            "hired" => Ok(OverallStatus::Hired),
            "rejected" => Ok(OverallStatus::Rejected),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four sequential interview stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Phone,
    Hr,
    Technical,
    Ceo,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Phone, Stage::Hr, Stage::Technical, Stage::Ceo];

    pub fn key(&self) -> &'static str {
        match self {
            Stage::Phone => "phone",
            Stage::Hr => "hr",
            Stage::Technical => "technical",
            Stage::Ceo => "ceo",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Phone => "Phone Interview",
            Stage::Hr => "HR Interview",
            Stage::Technical => "Technical Interview",
            Stage::Ceo => "CEO Interview",
        }
    }

    /// Label of what follows this stage; the CEO interview leads to the offer.
    pub fn next_label(&self) -> &'static str {
        match self {
            Stage::Phone => Stage::Hr.label(),
            Stage::Hr => Stage::Technical.label(),
            Stage::Technical => Stage::Ceo.label(),
            Stage::Ceo => "Final Offer",
        }
    }

    pub fn status_field(&self) -> &'static str {
        match self {
            Stage::Phone => "phone_status",
            Stage::Hr => "hr_status",
            Stage::Technical => "technical_status",
            Stage::Ceo => "ceo_status",
        }
    }

    pub fn comment_field(&self) -> &'static str {
        match self {
            Stage::Phone => "phone_comment",
            Stage::Hr => "hr_comment",
            Stage::Technical => "technical_comment",
            Stage::Ceo => "ceo_comment",
        }
    }

    /// Position in the pipeline, 1 through 4.
    pub fn number(&self) -> u8 {
        match self {
            Stage::Phone => 1,
            Stage::Hr => 2,
            Stage::Technical => 3,
            Stage::Ceo => 4,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub struct StageStatuses {
    pub phone: StageStatus,
    pub hr: StageStatus,
    pub technical: StageStatus,
    pub ceo: StageStatus,
}

impl StageStatuses {
    pub fn new(phone: StageStatus, hr: StageStatus, technical: StageStatus, ceo: StageStatus) -> Self {
        Self {
            phone,
            hr,
            technical,
            ceo,
        }
    }

    pub fn get(&self, stage: Stage) -> StageStatus {
        match stage {
            Stage::Phone => self.phone,
            Stage::Hr => self.hr,
            Stage::Technical => self.technical,
            Stage::Ceo => self.ceo,
        }
    }

    pub fn set(&mut self, stage: Stage, status: StageStatus) {
        match stage {
            Stage::Phone => self.phone = status,
            Stage::Hr => self.hr = status,
            Stage::Technical => self.technical = status,
            Stage::Ceo => self.ceo = status,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Stage, StageStatus)> + '_ {
        Stage::ALL.into_iter().map(move |stage| (stage, self.get(stage)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub struct StageComments {
    pub phone: String,
    pub hr: String,
    pub technical: String,
    pub ceo: String,
}

impl StageComments {
    pub fn get(&self, stage: Stage) -> &str {
        match stage {
            Stage::Phone => &self.phone,
            Stage::Hr => &self.hr,
            Stage::Technical => &self.technical,
            Stage::Ceo => &self.ceo,
        }
    }

    pub fn set(&mut self, stage: Stage, comment: String) {
        match stage {
            Stage::Phone => self.phone = comment,
            Stage::Hr => self.hr = comment,
            Stage::Technical => self.technical = comment,
            Stage::Ceo => self.ceo = comment,
        }
    }
}

/// A detailed application joined with the link and job it came through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedApplication {
    pub id: Uuid,
    pub link_id: Uuid,
    pub link_owner: Uuid,
    pub job_id: Option<Uuid>,
    pub job_title: Option<String>,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub cover_letter: String,
    pub submitted_at: DateTime<Utc>,
    pub is_viewed: bool,
    pub interview_date: Option<DateTime<Utc>>,
    pub overall_status: OverallStatus,
    pub statuses: StageStatuses,
    pub comments: StageComments,
    pub updated_at: DateTime<Utc>,
}

impl DetailedApplication {
    pub fn job_title_or_general(&self) -> &str {
        self.job_title.as_deref().unwrap_or(GENERAL_APPLICATION)
    }
}

pub const GENERAL_APPLICATION: &str = "General Application";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct OverallStatusCount {
    pub overall_status: String,
    pub applications: i64,
}

fn decode_status<T>(row: &PgRow, column: &str) -> Result<T, sqlx::Error>
where
    T: FromStr<Err = UnknownStatus>,
{
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|e: UnknownStatus| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, PgRow> for DetailedApplication {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            link_id: row.try_get("link_id")?,
            link_owner: row.try_get("link_owner")?,
            job_id: row.try_get("job_id")?,
            job_title: row.try_get("job_title")?,
            full_name: row.try_get("full_name")?,
            email: row.try_get("email")?,
            phone_number: row.try_get("phone_number")?,
            cover_letter: row.try_get("cover_letter")?,
            submitted_at: row.try_get("submitted_at")?,
            is_viewed: row.try_get("is_viewed")?,
            interview_date: row.try_get("interview_date")?,
            overall_status: decode_status(row, "overall_status")?,
            statuses: StageStatuses {
                phone: decode_status(row, "phone_status")?,
                hr: decode_status(row, "hr_status")?,
                technical: decode_status(row, "technical_status")?,
                ceo: decode_status(row, "ceo_status")?,
            },
            comments: StageComments {
                phone: row.try_get("phone_comment")?,
                hr: row.try_get("hr_comment")?,
                technical: row.try_get("technical_comment")?,
                ceo: row.try_get("ceo_comment")?,
            },
            updated_at: row.try_get("updated_at")?,
        })
    }
}
