use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::Principal;
use crate::features::auth::permissions::{authorize, is_permitted, Action};
use crate::features::categories::CategoryService;
use crate::features::reports::dtos::{CreateReportDto, SubmissionReceiptDto};
use crate::features::reports::models::{NewReport, Report};
use crate::features::reports::repository::{bounded, ReportRepository};
use crate::features::reports::services::aggregation::{filter_reports, ReportFilter};
use crate::features::reports::services::visibility::{project, visible_reports};

/// Service for report submission and role-filtered reads
pub struct ReportService {
    repository: Arc<dyn ReportRepository>,
    categories: Arc<CategoryService>,
    timeout: Duration,
}

impl ReportService {
    pub fn new(
        repository: Arc<dyn ReportRepository>,
        categories: Arc<CategoryService>,
        timeout: Duration,
    ) -> Self {
        Self {
            repository,
            categories,
            timeout,
        }
    }

    /// Store a new report in `submitted` state.
    ///
    /// Principals without `SubmitIdentified` (guests) always submit
    /// anonymously and without a creator reference or contact consent.
    pub async fn submit(
        &self,
        principal: &Principal,
        dto: &CreateReportDto,
    ) -> Result<SubmissionReceiptDto> {
        authorize(principal, Action::SubmitReport)?;
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let priority = dto.priority()?;
        if !self.categories.contains(dto.category_id) {
            return Err(AppError::InvalidValue(format!(
                "Unknown category '{}'",
                dto.category_id
            )));
        }

        let identified = is_permitted(principal.role, Action::SubmitIdentified);
        let new_report = NewReport {
            title: dto.title.trim().to_string(),
            description: dto.description.trim().to_string(),
            category_id: dto.category_id,
            incident_date: dto.incident_date,
            incident_time: dto.incident_time,
            location: non_blank(dto.location.as_deref()),
            region_code: non_blank(dto.region_code.as_deref()),
            is_anonymous: !identified || dto.is_anonymous,
            contact_allowed: identified && dto.contact_allowed,
            creator_id: if identified {
                principal.user_id.clone()
            } else {
                None
            },
            priority,
            media: dto.media.clone(),
            voice_report: dto.voice_report.clone(),
        };
        let is_anonymous = new_report.is_anonymous;

        let id = bounded(
            self.timeout,
            "report creation",
            self.repository.create(new_report),
        )
        .await?;
        let report = bounded(self.timeout, "report lookup", self.repository.get(id)).await?;

        tracing::info!(
            report_id = %report.id,
            role = %principal.role,
            anonymous = is_anonymous,
            "Report submitted"
        );

        Ok(SubmissionReceiptDto {
            id: report.id,
            status: report.status,
            created_at: report.created_at,
        })
    }

    /// Reports `principal` may see, newest first, narrowed by `filter`.
    ///
    /// Citizens only ever get their own reports; the owner restriction is
    /// pushed down to the repository and the projection re-checks it.
    pub async fn list_visible(
        &self,
        principal: &Principal,
        filter: &ReportFilter,
    ) -> Result<Vec<Report>> {
        let owner = if is_permitted(principal.role, Action::ViewAllReports) {
            None
        } else if is_permitted(principal.role, Action::ViewOwnReports) {
            match principal.user_id.as_deref() {
                Some(user_id) => Some(user_id),
                None => return Ok(Vec::new()),
            }
        } else {
            return Ok(Vec::new());
        };

        let reports = bounded(self.timeout, "report listing", self.repository.list(owner)).await?;
        Ok(filter_reports(visible_reports(reports, principal), filter))
    }

    /// One report as `principal` may see it; hidden reports are `NotFound`
    pub async fn get_visible(&self, id: Uuid, principal: &Principal) -> Result<Report> {
        let report = bounded(self.timeout, "report lookup", self.repository.get(id)).await?;
        project(report, principal)
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tokio_test::{assert_err, assert_ok};

    use crate::features::auth::model::Role;
    use crate::features::reports::models::{ReportPriority, ReportStatus};
    use crate::features::reports::repository::InMemoryReportRepository;
    use crate::shared::test_helpers::{theft_category, THEFT_CATEGORY_ID};

    fn service() -> (Arc<InMemoryReportRepository>, ReportService) {
        let repository = Arc::new(InMemoryReportRepository::new());
        let categories = Arc::new(CategoryService::with_categories(vec![theft_category()]));
        let service = ReportService::new(repository.clone(), categories, Duration::from_secs(5));
        (repository, service)
    }

    fn submission(is_anonymous: bool) -> CreateReportDto {
        CreateReportDto {
            title: "  Vol à l'arraché ".to_string(),
            description: "Sac volé près de la gare routière".to_string(),
            category_id: THEFT_CATEGORY_ID,
            incident_date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            incident_time: None,
            location: Some("Gare routière".to_string()),
            region_code: Some("SN-TH".to_string()),
            is_anonymous,
            contact_allowed: true,
            priority: Some("high".to_string()),
            media: Vec::new(),
            voice_report: None,
        }
    }

    #[tokio::test]
    async fn test_submit_then_get_round_trip() {
        let (repository, service) = service();
        let citizen = Principal::citizen("citizen-1");

        let receipt = assert_ok!(service.submit(&citizen, &submission(false)).await);
        assert_eq!(receipt.status, ReportStatus::Submitted);

        let stored = repository.get(receipt.id).await.unwrap();
        assert_eq!(stored.title, "Vol à l'arraché");
        assert_eq!(stored.priority, ReportPriority::High);
        assert_eq!(stored.creator_id.as_deref(), Some("citizen-1"));
        assert!(stored.contact_allowed);
        assert!(stored.audit_trail.is_empty());
        assert_eq!(stored.version, 1);
    }

    #[tokio::test]
    async fn test_guest_submission_is_forced_anonymous() {
        let (repository, service) = service();

        let receipt = assert_ok!(service.submit(&Principal::guest(), &submission(false)).await);

        let stored = repository.get(receipt.id).await.unwrap();
        assert!(stored.is_anonymous);
        assert!(!stored.contact_allowed);
        assert_eq!(stored.creator_id, None);
    }

    #[tokio::test]
    async fn test_submission_rejects_unknown_category_and_priority() {
        let (_, service) = service();
        let citizen = Principal::citizen("citizen-1");

        let mut dto = submission(false);
        dto.category_id = Uuid::new_v4();
        let err = assert_err!(service.submit(&citizen, &dto).await);
        assert!(matches!(err, AppError::InvalidValue(_)));

        let mut dto = submission(false);
        dto.priority = Some("critical".to_string());
        let err = assert_err!(service.submit(&citizen, &dto).await);
        assert!(matches!(err, AppError::InvalidValue(_)));
    }

    #[tokio::test]
    async fn test_submission_validation_error() {
        let (_, service) = service();
        let mut dto = submission(false);
        dto.location = None;
        dto.region_code = None;

        let err = assert_err!(service.submit(&Principal::citizen("citizen-1"), &dto).await);
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_blank_title_is_not_stored() {
        let (repository, service) = service();
        let mut dto = submission(false);
        dto.title = "   ".to_string();
        dto.description = "   ".to_string();

        let err = assert_err!(service.submit(&Principal::citizen("citizen-1"), &dto).await);
        assert!(matches!(err, AppError::Validation(_)));
        assert!(repository.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_visible_by_role() {
        let (_, service) = service();
        let alice = Principal::citizen("alice");
        let bob = Principal::citizen("bob");
        service.submit(&alice, &submission(true)).await.unwrap();
        service.submit(&alice, &submission(false)).await.unwrap();
        service.submit(&bob, &submission(false)).await.unwrap();
        service.submit(&Principal::guest(), &submission(false)).await.unwrap();

        let all = ReportFilter::default();

        let mine = service.list_visible(&alice, &all).await.unwrap();
        assert_eq!(mine.len(), 2);
        // newest first: the identified one, then the anonymous one redacted
        assert_eq!(mine[0].creator_id.as_deref(), Some("alice"));
        assert_eq!(mine[1].creator_id, None);

        let officer = Principal::authenticated(Role::Authority, "officer-1");
        let everything = service.list_visible(&officer, &all).await.unwrap();
        assert_eq!(everything.len(), 4);
        assert_eq!(everything[3].creator_id.as_deref(), Some("alice"));

        assert!(service
            .list_visible(&Principal::guest(), &all)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_list_visible_applies_filter() {
        let (_, service) = service();
        let officer = Principal::authenticated(Role::Admin, "admin-1");
        service.submit(&officer, &submission(false)).await.unwrap();

        let mut urgent = submission(false);
        urgent.priority = Some("urgent".to_string());
        service.submit(&officer, &urgent).await.unwrap();

        let filter = ReportFilter::parse(None, Some("urgent"), Some("GARE")).unwrap();
        let reports = service.list_visible(&officer, &filter).await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].priority, ReportPriority::Urgent);
    }

    #[tokio::test]
    async fn test_get_visible_hides_foreign_reports() {
        let (_, service) = service();
        let receipt = service
            .submit(&Principal::citizen("alice"), &submission(false))
            .await
            .unwrap();

        let err = assert_err!(
            service
                .get_visible(receipt.id, &Principal::citizen("bob"))
                .await
        );
        assert!(matches!(err, AppError::NotFound(_)));

        let err = assert_err!(
            service
                .get_visible(Uuid::new_v4(), &Principal::citizen("alice"))
                .await
        );
        assert!(matches!(err, AppError::NotFound(_)));

        let report = assert_ok!(
            service
                .get_visible(receipt.id, &Principal::citizen("alice"))
                .await
        );
        assert_eq!(report.id, receipt.id);
    }
}
