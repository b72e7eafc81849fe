use std::sync::Arc;

use axum::{
    routing::{get, patch},
    Router,
};

use crate::features::reports::handlers::{self, ReportState};
use crate::features::reports::services::{LifecycleService, ReportService};

/// Create routes for the reports feature
///
/// Every handler reads the caller's `Principal` from the request extensions,
/// so `core::middleware::principal_middleware` must wrap these routes
pub fn routes(
    report_service: Arc<ReportService>,
    lifecycle_service: Arc<LifecycleService>,
) -> Router {
    let state = ReportState {
        report_service,
        lifecycle_service,
    };

    Router::new()
        .route(
            "/api/reports",
            get(handlers::list_reports).post(handlers::create_report),
        )
        .route("/api/reports/{id}", get(handlers::get_report))
        .route(
            "/api/reports/{id}/status",
            patch(handlers::update_report_status),
        )
        .route(
            "/api/reports/{id}/transitions",
            get(handlers::list_allowed_transitions),
        )
        .route("/api/reports/{id}/audit", get(handlers::get_audit_trail))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use std::time::Duration;
    use uuid::Uuid;

    use crate::core::middleware::principal_middleware;
    use crate::features::auth::IdentityResolver;
    use crate::features::categories::CategoryService;
    use crate::features::reports::repository::{InMemoryReportRepository, ReportRepository};
    use crate::shared::test_helpers::{new_report, theft_category, StaticTokenResolver};

    struct Harness {
        server: TestServer,
        repository: Arc<InMemoryReportRepository>,
    }

    fn harness() -> Harness {
        let repository = Arc::new(InMemoryReportRepository::new());
        let categories = Arc::new(CategoryService::with_categories(vec![theft_category()]));
        let timeout = Duration::from_secs(5);

        let app = routes(
            Arc::new(ReportService::new(
                repository.clone(),
                categories,
                timeout,
            )),
            Arc::new(LifecycleService::new(repository.clone(), timeout)),
        );

        let resolver: Arc<dyn IdentityResolver> = Arc::new(StaticTokenResolver::default());
        let app = app.layer(axum::middleware::from_fn_with_state(
            resolver,
            principal_middleware,
        ));

        Harness {
            server: TestServer::new(app).unwrap(),
            repository,
        }
    }

    fn submission() -> Value {
        json!({
            "title": "Vol de portable",
            "description": "Téléphone volé dans le car rapide",
            "category_id": "0190a000-0000-7000-8000-000000000001",
            "incident_date": "2026-03-14",
            "location": "Colobane, Dakar",
            "contact_allowed": true
        })
    }

    async fn seeded(h: &Harness) -> Uuid {
        h.repository
            .create(new_report(Some("citizen-1"), false))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_guest_submission_is_accepted() {
        let h = harness();

        let response = h.server.post("/api/reports").json(&submission()).await;
        response.assert_status(StatusCode::CREATED);

        let body: Value = response.json();
        assert_eq!(body["data"]["status"], "submitted");

        let id: Uuid = serde_json::from_value(body["data"]["id"].clone()).unwrap();
        let stored = h.repository.get(id).await.unwrap();
        assert!(stored.is_anonymous);
        assert_eq!(stored.creator_id, None);
    }

    #[tokio::test]
    async fn test_invalid_submission_is_bad_request() {
        let h = harness();
        let mut payload = submission();
        payload["location"] = Value::Null;

        h.server
            .post("/api/reports")
            .json(&payload)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_citizen_lists_own_reports() {
        let h = harness();
        seeded(&h).await;
        h.repository
            .create(new_report(Some("someone-else"), false))
            .await
            .unwrap();

        let response = h
            .server
            .get("/api/reports")
            .authorization_bearer("citizen-token")
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["meta"]["total"], 1);
        assert_eq!(body["data"][0]["creator_id"], "citizen-1");
    }

    #[tokio::test]
    async fn test_foreign_report_is_not_found() {
        let h = harness();
        let id = h
            .repository
            .create(new_report(Some("someone-else"), true))
            .await
            .unwrap();

        h.server
            .get(&format!("/api/reports/{}", id))
            .authorization_bearer("citizen-token")
            .await
            .assert_status(StatusCode::NOT_FOUND);

        let response = h
            .server
            .get(&format!("/api/reports/{}", id))
            .authorization_bearer("authority-token")
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["data"]["creator_id"], "someone-else");
    }

    #[tokio::test]
    async fn test_status_update_maps_errors() {
        let h = harness();
        let id = seeded(&h).await;
        let path = format!("/api/reports/{}/status", id);

        h.server
            .patch(&path)
            .authorization_bearer("citizen-token")
            .json(&json!({ "status": "reviewing" }))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        h.server
            .patch(&path)
            .authorization_bearer("authority-token")
            .json(&json!({ "status": "resolved" }))
            .await
            .assert_status(StatusCode::CONFLICT);

        h.server
            .patch(&path)
            .authorization_bearer("authority-token")
            .json(&json!({ "status": "archived" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        h.server
            .patch(&path)
            .authorization_bearer("bogus-token")
            .json(&json!({ "status": "reviewing" }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        h.server
            .patch(&format!("/api/reports/{}/status", Uuid::new_v4()))
            .authorization_bearer("authority-token")
            .json(&json!({ "status": "reviewing" }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_status_update_and_audit_trail() {
        let h = harness();
        let id = seeded(&h).await;

        let response = h
            .server
            .patch(&format!("/api/reports/{}/status", id))
            .authorization_bearer("admin-token")
            .json(&json!({ "status": "reviewing", "comment": "Pris en charge" }))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["data"]["status"], "reviewing");

        let response = h
            .server
            .get(&format!("/api/reports/{}/audit", id))
            .authorization_bearer("authority-token")
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"][0]["from_status"], "submitted");
        assert_eq!(body["data"][0]["comment"], "Pris en charge");
        assert_eq!(body["data"][0]["actor_id"], "admin-1");

        let response = h
            .server
            .get(&format!("/api/reports/{}/transitions", id))
            .authorization_bearer("authority-token")
            .await;
        assert_eq!(response.json::<Value>()["data"], json!(["investigating"]));
    }

    #[tokio::test]
    async fn test_unknown_status_from_citizen_is_forbidden() {
        let h = harness();
        let id = seeded(&h).await;
        let path = format!("/api/reports/{}/status", id);

        h.server
            .patch(&path)
            .authorization_bearer("citizen-token")
            .json(&json!({ "status": "archived" }))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        h.server
            .patch(&path)
            .json(&json!({ "status": "archived" }))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_staff_only_routes_reject_citizens() {
        let h = harness();
        let id = seeded(&h).await;

        h.server
            .get(&format!("/api/reports/{}/audit", id))
            .authorization_bearer("citizen-token")
            .await
            .assert_status(StatusCode::FORBIDDEN);

        h.server
            .get(&format!("/api/reports/{}/transitions", id))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_list_rejects_unknown_facet() {
        let h = harness();
        h.server
            .get("/api/reports")
            .add_query_param("priority", "critical")
            .authorization_bearer("authority-token")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
