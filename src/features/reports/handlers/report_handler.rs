use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireStaff;
use crate::features::auth::permissions::{authorize, Action};
use crate::features::auth::model::Principal;
use crate::features::reports::dtos::{
    AuditEntryResponseDto, CreateReportDto, ReportFilterQuery, ReportResponseDto,
    SubmissionReceiptDto, UpdateReportStatusDto,
};
use crate::features::reports::models::ReportStatus;
use crate::features::reports::services::{LifecycleService, ReportService};
use crate::shared::types::{ApiResponse, Meta};

/// State for report handlers
#[derive(Clone)]
pub struct ReportState {
    pub report_service: Arc<ReportService>,
    pub lifecycle_service: Arc<LifecycleService>,
}

/// Submit a new report
///
/// Works without a credential; such reports are stored anonymously.
#[utoipa::path(
    post,
    path = "/api/reports",
    request_body = CreateReportDto,
    responses(
        (status = 201, description = "Report submitted", body = ApiResponse<SubmissionReceiptDto>),
        (status = 400, description = "Invalid report data"),
        (status = 401, description = "Invalid credential")
    ),
    security((), ("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn create_report(
    principal: Principal,
    State(state): State<ReportState>,
    AppJson(dto): AppJson<CreateReportDto>,
) -> Result<(StatusCode, Json<ApiResponse<SubmissionReceiptDto>>)> {
    let receipt = state.report_service.submit(&principal, &dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(receipt),
            Some("Report submitted".to_string()),
            None,
        )),
    ))
}

/// List reports visible to the caller
///
/// Citizens get their own reports, staff get every report.
#[utoipa::path(
    get,
    path = "/api/reports",
    params(ReportFilterQuery),
    responses(
        (status = 200, description = "Visible reports, newest first", body = ApiResponse<Vec<ReportResponseDto>>),
        (status = 400, description = "Unknown status or priority"),
        (status = 401, description = "Invalid credential")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn list_reports(
    principal: Principal,
    State(state): State<ReportState>,
    Query(query): Query<ReportFilterQuery>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let filter = query.to_filter()?;
    let reports = state
        .report_service
        .list_visible(&principal, &filter)
        .await?;
    let total = reports.len() as i64;
    let dtos: Vec<ReportResponseDto> = reports.into_iter().map(|r| r.into()).collect();
    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta { total }),
    )))
}

/// Get report by ID
#[utoipa::path(
    get,
    path = "/api/reports/{id}",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report found", body = ApiResponse<ReportResponseDto>),
        (status = 401, description = "Invalid credential"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn get_report(
    principal: Principal,
    State(state): State<ReportState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = state.report_service.get_visible(id, &principal).await?;
    Ok(Json(ApiResponse::success(Some(report.into()), None, None)))
}

/// Move a report to another status (staff only)
#[utoipa::path(
    patch,
    path = "/api/reports/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    request_body = UpdateReportStatusDto,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Unknown status"),
        (status = 401, description = "Invalid credential"),
        (status = 403, description = "Role may not change report status"),
        (status = 404, description = "Report not found"),
        (status = 409, description = "Transition not allowed or report changed concurrently"),
        (status = 504, description = "Report store did not answer in time")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn update_report_status(
    principal: Principal,
    State(state): State<ReportState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateReportStatusDto>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    authorize(&principal, Action::TransitionStatus)?;
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let target = dto.target()?;

    let report = state
        .lifecycle_service
        .transition_status(id, target, &principal, dto.comment.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(Some(report.into()), None, None)))
}

/// Statuses the report can move to next (staff only)
#[utoipa::path(
    get,
    path = "/api/reports/{id}/transitions",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Reachable statuses", body = ApiResponse<Vec<ReportStatus>>),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn list_allowed_transitions(
    RequireStaff(principal): RequireStaff,
    State(state): State<ReportState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<ReportStatus>>>> {
    let targets = state
        .lifecycle_service
        .allowed_transitions(id, &principal)
        .await?;
    Ok(Json(ApiResponse::success(Some(targets), None, None)))
}

/// Audit trail of a report, oldest first (staff only)
#[utoipa::path(
    get,
    path = "/api/reports/{id}/audit",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Audit entries", body = ApiResponse<Vec<AuditEntryResponseDto>>),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn get_audit_trail(
    RequireStaff(principal): RequireStaff,
    State(state): State<ReportState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<AuditEntryResponseDto>>>> {
    let entries = state.lifecycle_service.audit_trail(id, &principal).await?;
    let dtos: Vec<AuditEntryResponseDto> = entries.into_iter().map(|e| e.into()).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, None)))
}
