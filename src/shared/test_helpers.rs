#![allow(dead_code)]

use async_trait::async_trait;
use axum::{extract::Request, middleware::Next, Router};
use chrono::{NaiveDate, Utc};
use fake::faker::lorem::en::{Paragraph, Sentence};
use fake::Fake;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::{Principal, Role};
use crate::features::auth::IdentityResolver;
use crate::features::categories::models::Category;
use crate::features::reports::models::{NewReport, Report, ReportPriority, ReportStatus};

pub const THEFT_CATEGORY_ID: Uuid = Uuid::from_u128(0x0190a000_0000_7000_8000_000000000001);

pub fn theft_category() -> Category {
    Category {
        id: THEFT_CATEGORY_ID,
        slug: "theft".to_string(),
        labels: [("fr", "Vol"), ("en", "Theft")]
            .into_iter()
            .map(|(lang, label)| (lang.to_string(), label.to_string()))
            .collect(),
        color: "amber".to_string(),
        display_order: 1,
    }
}

fn incident_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
}

/// Submission payload with random text
pub fn new_report(creator_id: Option<&str>, is_anonymous: bool) -> NewReport {
    NewReport {
        title: Sentence(3..6).fake(),
        description: Paragraph(1..3).fake(),
        category_id: THEFT_CATEGORY_ID,
        incident_date: incident_date(),
        incident_time: None,
        location: None,
        region_code: Some("SN-TH".to_string()),
        is_anonymous,
        contact_allowed: false,
        creator_id: creator_id.map(String::from),
        priority: ReportPriority::Medium,
        media: Vec::new(),
        voice_report: None,
    }
}

/// Fully-formed report record, as a repository would return it
pub fn sample_report(status: ReportStatus, priority: ReportPriority) -> Report {
    let now = Utc::now();
    Report {
        id: Uuid::new_v4(),
        title: Sentence(3..6).fake(),
        description: Paragraph(1..3).fake(),
        category_id: THEFT_CATEGORY_ID,
        incident_date: incident_date(),
        incident_time: None,
        location: None,
        region_code: Some("SN-TH".to_string()),
        is_anonymous: false,
        contact_allowed: false,
        creator_id: Some("citizen-0".to_string()),
        status,
        priority,
        media: Vec::new(),
        voice_report: None,
        audit_trail: Vec::new(),
        version: 1,
        created_at: now,
        updated_at: now,
    }
}

pub fn owned_report(creator_id: &str, is_anonymous: bool) -> Report {
    let mut report = sample_report(ReportStatus::Submitted, ReportPriority::Medium);
    report.creator_id = Some(creator_id.to_string());
    report.is_anonymous = is_anonymous;
    report
}

/// 10 reports: 3 resolved, 2 investigating, 1 reviewing, 2 submitted,
/// 2 closed; 2 of them urgent
pub fn aggregation_scenario() -> Vec<Report> {
    use ReportPriority::*;
    use ReportStatus::*;

    [
        (Resolved, Urgent),
        (Resolved, Low),
        (Resolved, Medium),
        (Investigating, High),
        (Investigating, Medium),
        (Reviewing, Low),
        (Submitted, Urgent),
        (Submitted, Medium),
        (Closed, High),
        (Closed, Low),
    ]
    .into_iter()
    .map(|(status, priority)| sample_report(status, priority))
    .collect()
}

/// Resolver with a fixed token table
pub struct StaticTokenResolver {
    tokens: Vec<(&'static str, Principal)>,
}

impl Default for StaticTokenResolver {
    fn default() -> Self {
        Self {
            tokens: vec![
                ("citizen-token", Principal::citizen("citizen-1")),
                (
                    "authority-token",
                    Principal::authenticated(Role::Authority, "officer-1"),
                ),
                ("admin-token", Principal::authenticated(Role::Admin, "admin-1")),
            ],
        }
    }
}

#[async_trait]
impl IdentityResolver for StaticTokenResolver {
    async fn resolve(&self, credential: Option<&str>) -> Result<Principal> {
        let Some(token) = credential else {
            return Ok(Principal::guest());
        };
        self.tokens
            .iter()
            .find(|(t, _)| *t == token)
            .map(|(_, principal)| principal.clone())
            .ok_or_else(|| AppError::Unauthenticated("Unknown token".to_string()))
    }
}

/// Attach a fixed principal to every request
pub fn with_principal(router: Router, principal: Principal) -> Router {
    router.layer(axum::middleware::from_fn(
        move |mut request: Request, next: Next| {
            let principal = principal.clone();
            async move {
                request.extensions_mut().insert(principal);
                next.run(request).await
            }
        },
    ))
}
