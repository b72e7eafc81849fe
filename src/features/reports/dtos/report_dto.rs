use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::core::error::Result;
use crate::features::reports::models::{
    AuditEntry, MediaAttachment, Report, ReportPriority, ReportStatus, VoiceReport,
};
use crate::features::reports::services::aggregation::ReportFilter;
use crate::shared::validation::REGION_CODE_REGEX;

/// Response DTO for report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportResponseDto {
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
    /// Omitted for anonymous reports unless the viewer is staff
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<String>,
    pub status: ReportStatus,
    pub priority: ReportPriority,
    pub media: Vec<MediaAttachment>,
    pub voice_report: Option<VoiceReport>,
    /// Only present for viewers allowed to read the audit trail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_trail: Option<Vec<AuditEntryResponseDto>>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Report> for ReportResponseDto {
    fn from(r: Report) -> Self {
        let audit_trail = if r.audit_trail.is_empty() {
            None
        } else {
            Some(r.audit_trail.into_iter().map(|e| e.into()).collect())
        };

        Self {
            id: r.id,
            title: r.title,
            description: r.description,
            category_id: r.category_id,
            incident_date: r.incident_date,
            incident_time: r.incident_time,
            location: r.location,
            region_code: r.region_code,
            is_anonymous: r.is_anonymous,
            contact_allowed: r.contact_allowed,
            creator_id: r.creator_id,
            status: r.status,
            priority: r.priority,
            media: r.media,
            voice_report: r.voice_report,
            audit_trail,
            version: r.version,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Response DTO for one audit trail entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditEntryResponseDto {
    pub id: Uuid,
    pub actor_id: Option<String>,
    pub from_status: ReportStatus,
    pub to_status: ReportStatus,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<AuditEntry> for AuditEntryResponseDto {
    fn from(e: AuditEntry) -> Self {
        Self {
            id: e.id,
            actor_id: e.actor_id,
            from_status: e.from_status,
            to_status: e.to_status,
            comment: e.comment,
            created_at: e.created_at,
        }
    }
}

/// Returned to the submitter right after a report is stored
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmissionReceiptDto {
    pub id: Uuid,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
}

/// Request DTO for submitting a report
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_submission"))]
pub struct CreateReportDto {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(
        min = 1,
        max = 5000,
        message = "Description must be 1-5000 characters"
    ))]
    pub description: String,

    pub category_id: Uuid,

    /// Must not be in the future
    pub incident_date: NaiveDate,

    pub incident_time: Option<NaiveTime>,

    #[validate(length(max = 500, message = "Location must not exceed 500 characters"))]
    pub location: Option<String>,

    /// ISO 3166-2 style code, e.g. "SN-DK"
    #[validate(regex(path = *REGION_CODE_REGEX, message = "Region code must look like 'SN-DK'"))]
    pub region_code: Option<String>,

    /// Ignored for guests, whose reports are always anonymous
    #[serde(default)]
    pub is_anonymous: bool,

    #[serde(default)]
    pub contact_allowed: bool,

    /// low | medium | high | urgent (default: medium)
    pub priority: Option<String>,

    #[serde(default)]
    #[validate(length(max = 10, message = "At most 10 media files per report"))]
    pub media: Vec<MediaAttachment>,

    pub voice_report: Option<VoiceReport>,
}

impl CreateReportDto {
    pub fn priority(&self) -> Result<ReportPriority> {
        self.priority
            .as_deref()
            .map(str::parse::<ReportPriority>)
            .transpose()
            .map(|p| p.unwrap_or(ReportPriority::Medium))
    }
}

fn validate_submission(dto: &CreateReportDto) -> std::result::Result<(), ValidationError> {
    if dto.title.trim().is_empty() {
        return Err(ValidationError::new("blank_title").with_message("Title is required".into()));
    }
    if dto.description.trim().is_empty() {
        return Err(ValidationError::new("blank_description")
            .with_message("Description is required".into()));
    }

    let has_place = [dto.location.as_deref(), dto.region_code.as_deref()]
        .into_iter()
        .flatten()
        .any(|s| !s.trim().is_empty());
    if !has_place {
        return Err(ValidationError::new("missing_place")
            .with_message("Either location or region_code is required".into()));
    }

    if dto.incident_date > Utc::now().date_naive() {
        return Err(ValidationError::new("future_incident_date")
            .with_message("Incident date cannot be in the future".into()));
    }

    Ok(())
}

/// Request DTO for a status transition
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateReportStatusDto {
    /// Target status
    pub status: String,

    #[validate(length(max = 2000, message = "Comment must not exceed 2000 characters"))]
    pub comment: Option<String>,
}

impl UpdateReportStatusDto {
    pub fn target(&self) -> Result<ReportStatus> {
        self.status.parse()
    }
}

/// Facet query shared by the report list and dashboard endpoints
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ReportFilterQuery {
    /// Status value or "all"
    pub status: Option<String>,
    /// Priority value or "all"
    pub priority: Option<String>,
    /// Case-insensitive text search
    pub q: Option<String>,
}

impl ReportFilterQuery {
    pub fn to_filter(&self) -> Result<ReportFilter> {
        ReportFilter::parse(
            self.status.as_deref(),
            self.priority.as_deref(),
            self.q.as_deref(),
        )
    }
}
