use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth;
use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::dashboard::{dtos as dashboard_dtos, handlers as dashboard_handlers};
use crate::features::reports::{
    dtos as reports_dtos, handlers as reports_handlers, models as reports_models,
};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Reports
        reports_handlers::create_report,
        reports_handlers::list_reports,
        reports_handlers::get_report,
        reports_handlers::update_report_status,
        reports_handlers::list_allowed_transitions,
        reports_handlers::get_audit_trail,
        // Dashboard
        dashboard_handlers::get_summary,
        dashboard_handlers::list_reports,
        // Categories (public)
        categories_handlers::list_categories,
        categories_handlers::get_category,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Auth
            auth::model::Role,
            auth::model::Principal,
            // Reports
            reports_models::ReportStatus,
            reports_models::ReportPriority,
            reports_models::MediaAttachment,
            reports_models::VoiceReport,
            reports_dtos::CreateReportDto,
            reports_dtos::UpdateReportStatusDto,
            reports_dtos::SubmissionReceiptDto,
            reports_dtos::ReportResponseDto,
            reports_dtos::AuditEntryResponseDto,
            ApiResponse<reports_dtos::SubmissionReceiptDto>,
            ApiResponse<reports_dtos::ReportResponseDto>,
            ApiResponse<Vec<reports_dtos::ReportResponseDto>>,
            ApiResponse<Vec<reports_dtos::AuditEntryResponseDto>>,
            ApiResponse<Vec<reports_models::ReportStatus>>,
            // Dashboard
            dashboard_dtos::DashboardSummaryDto,
            dashboard_dtos::DashboardReportsDto,
            dashboard_dtos::PaginationMeta,
            ApiResponse<dashboard_dtos::DashboardSummaryDto>,
            ApiResponse<dashboard_dtos::DashboardReportsDto>,
            // Categories
            categories_dtos::CategoryResponseDto,
            ApiResponse<Vec<categories_dtos::CategoryResponseDto>>,
            ApiResponse<categories_dtos::CategoryResponseDto>,
        )
    ),
    tags(
        (name = "reports", description = "Report submission, status lifecycle and audit trail"),
        (name = "Dashboard", description = "Statistics and filtered listings over visible reports"),
        (name = "categories", description = "Incident categories (public)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Crimewatch API",
        version = "0.1.0",
        description = "API documentation for Crimewatch",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
