use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationLink {
    pub id: Uuid,
    pub token: Uuid,
    pub job_id: Option<Uuid>,
    pub job_title: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub is_used: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl ApplicationLink {
    /// Expiry wins over use: an expired link reports expired even when redeemed.
    pub fn state_at(&self, now: DateTime<Utc>) -> LinkState {
        if now > self.expires_at {
            LinkState::Expired
        } else if self.is_used {
            LinkState::Redeemed
        } else {
            LinkState::Active
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LinkState {
    Active,
    Redeemed,
    Expired,
}
