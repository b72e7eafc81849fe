use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Type;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::AppError;
use crate::features::reports::models::{AuditEntry, MediaAttachment, VoiceReport};

/// Report status enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "report_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Submitted,
    Reviewing,
    Investigating,
    Forwarded,
    Resolved,
    Closed,
}

impl ReportStatus {
    pub const ALL: [ReportStatus; 6] = [
        ReportStatus::Submitted,
        ReportStatus::Reviewing,
        ReportStatus::Investigating,
        ReportStatus::Forwarded,
        ReportStatus::Resolved,
        ReportStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Submitted => "submitted",
            ReportStatus::Reviewing => "reviewing",
            ReportStatus::Investigating => "investigating",
            ReportStatus::Forwarded => "forwarded",
            ReportStatus::Resolved => "resolved",
            ReportStatus::Closed => "closed",
        }
    }

    /// Statuses counted as "in progress" on the dashboard
    pub fn is_in_progress(&self) -> bool {
        matches!(
            self,
            ReportStatus::Reviewing | ReportStatus::Investigating | ReportStatus::Forwarded
        )
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| AppError::InvalidValue(format!("Unknown report status '{}'", s)))
    }
}

/// Report priority enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "report_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReportPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl ReportPriority {
    pub const ALL: [ReportPriority; 4] = [
        ReportPriority::Low,
        ReportPriority::Medium,
        ReportPriority::High,
        ReportPriority::Urgent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportPriority::Low => "low",
            ReportPriority::Medium => "medium",
            ReportPriority::High => "high",
            ReportPriority::Urgent => "urgent",
        }
    }
}

impl std::fmt::Display for ReportPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportPriority {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportPriority::ALL
            .into_iter()
            .find(|priority| priority.as_str() == s)
            .ok_or_else(|| AppError::InvalidValue(format!("Unknown report priority '{}'", s)))
    }
}

/// A citizen-submitted incident record and its workflow state
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category_id: Uuid,
    pub incident_date: NaiveDate,
    pub incident_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub region_code: Option<String>,
    pub is_anonymous: bool,
    pub contact_allowed: bool,
    /// Stored even for anonymous reports; redacted on read for non-staff
    pub creator_id: Option<String>,
    pub status: ReportStatus,
    pub priority: ReportPriority,
    pub media: Vec<MediaAttachment>,
    pub voice_report: Option<VoiceReport>,
    pub audit_trail: Vec<AuditEntry>,
    /// Compare-and-set token, bumped by every repository update
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for creating a new report. Status always starts at `submitted`.
#[derive(Debug, Clone)]
pub struct NewReport {
    pub title: String,
    pub description: String,
    pub category_id: Uuid,
    pub incident_date: NaiveDate,
    pub incident_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub region_code: Option<String>,
    pub is_anonymous: bool,
    pub contact_allowed: bool,
    pub creator_id: Option<String>,
    pub priority: ReportPriority,
    pub media: Vec<MediaAttachment>,
    pub voice_report: Option<VoiceReport>,
}

/// Mutation applied by the lifecycle engine through `ReportRepository::update`
#[derive(Debug, Clone)]
pub struct ReportPatch {
    pub status: ReportStatus,
    pub updated_at: DateTime<Utc>,
    pub audit_entry: Option<AuditEntry>,
}
