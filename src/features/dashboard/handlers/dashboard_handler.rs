use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::core::error::AppError;
use crate::features::auth::model::Principal;
use crate::features::dashboard::dtos::*;
use crate::features::dashboard::services::DashboardService;
use crate::features::reports::dtos::ReportFilterQuery;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

// ============================================================================
// Summary
// ============================================================================

/// Report statistics over the caller's visible reports
#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    tag = "Dashboard",
    params(ReportFilterQuery),
    responses(
        (status = 200, description = "Dashboard summary", body = ApiResponse<DashboardSummaryDto>),
        (status = 400, description = "Unknown status or priority"),
        (status = 401, description = "Invalid credential"),
        (status = 500, description = "Internal server error")
    ),
    security((), ("bearer_auth" = []))
)]
pub async fn get_summary(
    principal: Principal,
    State(service): State<Arc<DashboardService>>,
    Query(query): Query<ReportFilterQuery>,
) -> Result<Json<ApiResponse<DashboardSummaryDto>>, AppError> {
    let filter = query.to_filter()?;
    let summary = service.get_summary(&principal, &filter).await?;
    Ok(Json(ApiResponse::success(Some(summary.into()), None, None)))
}

// ============================================================================
// Reports List
// ============================================================================

/// List visible reports with filters and pagination
#[utoipa::path(
    get,
    path = "/api/dashboard/reports",
    tag = "Dashboard",
    params(ReportFilterQuery, PaginationQuery),
    responses(
        (status = 200, description = "Paginated reports list", body = ApiResponse<DashboardReportsDto>),
        (status = 400, description = "Unknown status or priority"),
        (status = 401, description = "Invalid credential"),
        (status = 500, description = "Internal server error")
    ),
    security((), ("bearer_auth" = []))
)]
pub async fn list_reports(
    principal: Principal,
    State(service): State<Arc<DashboardService>>,
    Query(query): Query<ReportFilterQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<DashboardReportsDto>>, AppError> {
    let filter = query.to_filter()?;
    let result = service
        .list_reports(&principal, &filter, &pagination)
        .await?;
    let total = result.pagination.total_items;
    Ok(Json(ApiResponse::success(
        Some(result),
        None,
        Some(Meta { total }),
    )))
}
