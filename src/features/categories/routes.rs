use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::categories::handlers;
use crate::features::categories::services::CategoryService;

/// Create routes for the categories feature
///
/// Note: This feature is public (no authentication required)
pub fn routes(service: Arc<CategoryService>) -> Router {
    Router::new()
        .route("/api/categories", get(handlers::list_categories))
        .route("/api/categories/{slug}", get(handlers::get_category))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::Value;

    fn server() -> TestServer {
        let service = CategoryService::with_categories(CategoryService::default_categories());
        TestServer::new(routes(Arc::new(service))).unwrap()
    }

    #[tokio::test]
    async fn test_list_categories_localized() {
        let response = server()
            .get("/api/categories")
            .add_query_param("lang", "en")
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["data"].as_array().map(Vec::len), Some(6));
        assert_eq!(body["data"][0]["label"], "Theft");
    }

    #[tokio::test]
    async fn test_get_category_by_slug() {
        let server = server();

        let response = server.get("/api/categories/fraud").await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["data"]["label"], "Fraude");

        server
            .get("/api/categories/arson")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
