use axum::{routing::get, Router};
use std::sync::Arc;

use crate::features::dashboard::handlers;
use crate::features::dashboard::services::DashboardService;

/// Create dashboard routes
///
/// Expects a `Principal` in the request extensions (see
/// `core::middleware::principal_middleware`)
pub fn routes(dashboard_service: Arc<DashboardService>) -> Router {
    Router::new()
        .route("/api/dashboard/summary", get(handlers::get_summary))
        .route("/api/dashboard/reports", get(handlers::list_reports))
        .with_state(dashboard_service)
}
