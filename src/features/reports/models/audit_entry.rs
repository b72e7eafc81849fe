use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::features::reports::models::ReportStatus;

/// One append-only record of a lifecycle transition
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct AuditEntry {
    pub id: Uuid,
    pub actor_id: Option<String>,
    pub from_status: ReportStatus,
    pub to_status: ReportStatus,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(
        actor_id: Option<String>,
        from_status: ReportStatus,
        to_status: ReportStatus,
        comment: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            actor_id,
            from_status,
            to_status,
            comment,
            created_at,
        }
    }
}
