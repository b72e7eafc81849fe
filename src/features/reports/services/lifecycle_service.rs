use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::Principal;
use crate::features::auth::permissions::{authorize, Action};
use crate::features::reports::lifecycle;
use crate::features::reports::models::{AuditEntry, Report, ReportPatch, ReportStatus};
use crate::features::reports::repository::{bounded, ReportRepository};

/// Service for status transitions and the audit trail they leave behind
pub struct LifecycleService {
    repository: Arc<dyn ReportRepository>,
    timeout: Duration,
}

impl LifecycleService {
    pub fn new(repository: Arc<dyn ReportRepository>, timeout: Duration) -> Self {
        Self {
            repository,
            timeout,
        }
    }

    /// Move a report to `target`.
    ///
    /// The role check runs before the report is read, so an unauthorized
    /// caller learns nothing about whether the id exists.
    pub async fn transition_status(
        &self,
        id: Uuid,
        target: ReportStatus,
        principal: &Principal,
        comment: Option<&str>,
    ) -> Result<Report> {
        authorize(principal, Action::TransitionStatus)?;

        let current = bounded(self.timeout, "report lookup", self.repository.get(id)).await?;
        self.apply_transition(current, target, principal, comment)
            .await
    }

    /// Apply a transition against an already-read snapshot.
    ///
    /// The write is a compare-and-set on `current.version`; a concurrent writer
    /// that got there first turns this call into `StaleState`.
    pub async fn apply_transition(
        &self,
        current: Report,
        target: ReportStatus,
        principal: &Principal,
        comment: Option<&str>,
    ) -> Result<Report> {
        authorize(principal, Action::TransitionStatus)?;

        let comment = comment
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from);

        if current.status == target && comment.is_none() {
            return Ok(current);
        }

        if current.status != target && !lifecycle::can_transition(current.status, target) {
            tracing::warn!(
                report_id = %current.id,
                from = %current.status,
                to = %target,
                role = %principal.role,
                "Rejected report status transition"
            );
            let message = if lifecycle::is_terminal(current.status) {
                format!("Report is '{}' and can no longer change status", current.status)
            } else {
                format!(
                    "Cannot move report from '{}' to '{}'",
                    current.status, target
                )
            };
            return Err(AppError::InvalidTransition(message));
        }

        let now = Utc::now();
        let patch = ReportPatch {
            status: target,
            updated_at: now,
            audit_entry: Some(AuditEntry::new(
                principal.user_id.clone(),
                current.status,
                target,
                comment,
                now,
            )),
        };

        let updated = bounded(
            self.timeout,
            "report status update",
            self.repository.update(current.id, patch, current.version),
        )
        .await?;

        tracing::info!(
            report_id = %updated.id,
            from = %current.status,
            to = %updated.status,
            actor = actor_label(principal),
            "Report status changed"
        );

        Ok(updated)
    }

    /// Statuses `principal` could move this report to right now
    pub async fn allowed_transitions(
        &self,
        id: Uuid,
        principal: &Principal,
    ) -> Result<Vec<ReportStatus>> {
        authorize(principal, Action::TransitionStatus)?;

        let report = bounded(self.timeout, "report lookup", self.repository.get(id)).await?;
        Ok(lifecycle::allowed_targets(report.status).to_vec())
    }

    /// Audit entries for a report, oldest first
    pub async fn audit_trail(&self, id: Uuid, principal: &Principal) -> Result<Vec<AuditEntry>> {
        authorize(principal, Action::ViewAuditTrail)?;

        let report = bounded(self.timeout, "report lookup", self.repository.get(id)).await?;
        Ok(report.audit_trail)
    }
}

fn actor_label(principal: &Principal) -> &str {
    principal.user_id.as_deref().unwrap_or("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio_test::{assert_err, assert_ok};

    use crate::features::auth::model::Role;
    use crate::features::reports::models::NewReport;
    use crate::features::reports::repository::InMemoryReportRepository;
    use crate::features::reports::services::aggregation::summarize;
    use crate::shared::test_helpers::new_report;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn officer() -> Principal {
        Principal::authenticated(Role::Authority, "officer-1")
    }

    async fn setup() -> (Arc<InMemoryReportRepository>, LifecycleService, Uuid) {
        let repository = Arc::new(InMemoryReportRepository::new());
        let id = repository
            .create(new_report(Some("citizen-1"), false))
            .await
            .unwrap();
        let service = LifecycleService::new(repository.clone(), TIMEOUT);
        (repository, service, id)
    }

    #[tokio::test]
    async fn test_authority_moves_report_along_graph() {
        let (_, service, id) = setup().await;

        let report = assert_ok!(
            service
                .transition_status(id, ReportStatus::Reviewing, &officer(), Some("Triage"))
                .await
        );
        assert_eq!(report.status, ReportStatus::Reviewing);
        assert_eq!(report.version, 2);
        assert_eq!(report.audit_trail.len(), 1);

        let entry = &report.audit_trail[0];
        assert_eq!(entry.from_status, ReportStatus::Submitted);
        assert_eq!(entry.to_status, ReportStatus::Reviewing);
        assert_eq!(entry.actor_id.as_deref(), Some("officer-1"));
        assert_eq!(entry.comment.as_deref(), Some("Triage"));
    }

    #[tokio::test]
    async fn test_citizen_and_guest_cannot_transition() {
        let (repository, service, id) = setup().await;

        for principal in [Principal::citizen("citizen-1"), Principal::guest()] {
            let err = assert_err!(
                service
                    .transition_status(id, ReportStatus::Reviewing, &principal, None)
                    .await
            );
            assert!(matches!(err, AppError::Unauthorized(_)));
        }

        let stored = repository.get(id).await.unwrap();
        assert_eq!(stored.status, ReportStatus::Submitted);
        assert_eq!(stored.version, 1);
    }

    #[tokio::test]
    async fn test_role_check_precedes_lookup() {
        let (_, service, _) = setup().await;
        let err = assert_err!(
            service
                .transition_status(
                    Uuid::new_v4(),
                    ReportStatus::Reviewing,
                    &Principal::guest(),
                    None
                )
                .await
        );
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_skipping_states_is_invalid() {
        let (repository, service, id) = setup().await;

        let err = assert_err!(
            service
                .transition_status(id, ReportStatus::Resolved, &officer(), None)
                .await
        );
        assert!(matches!(err, AppError::InvalidTransition(_)));

        let stored = repository.get(id).await.unwrap();
        assert_eq!(stored.status, ReportStatus::Submitted);
        assert!(stored.audit_trail.is_empty());
    }

    #[tokio::test]
    async fn test_closed_is_terminal() {
        let (_, service, id) = setup().await;
        for target in [
            ReportStatus::Reviewing,
            ReportStatus::Investigating,
            ReportStatus::Closed,
        ] {
            service
                .transition_status(id, target, &officer(), None)
                .await
                .unwrap();
        }

        let err = assert_err!(
            service
                .transition_status(id, ReportStatus::Reviewing, &officer(), None)
                .await
        );
        assert!(matches!(err, AppError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn test_same_status_without_comment_is_a_no_op() {
        let (_, service, id) = setup().await;

        let report = assert_ok!(
            service
                .transition_status(id, ReportStatus::Submitted, &officer(), Some("   "))
                .await
        );
        assert_eq!(report.version, 1);
        assert!(report.audit_trail.is_empty());
    }

    #[tokio::test]
    async fn test_same_status_with_comment_appends_note() {
        let (_, service, id) = setup().await;

        let report = assert_ok!(
            service
                .transition_status(id, ReportStatus::Submitted, &officer(), Some("Called back"))
                .await
        );
        assert_eq!(report.status, ReportStatus::Submitted);
        assert_eq!(report.version, 2);
        assert_eq!(report.audit_trail.len(), 1);
        assert_eq!(report.audit_trail[0].from_status, ReportStatus::Submitted);
        assert_eq!(report.audit_trail[0].to_status, ReportStatus::Submitted);
    }

    #[tokio::test]
    async fn test_concurrent_transitions_on_same_snapshot() {
        let (repository, service, id) = setup().await;
        let snapshot = repository.get(id).await.unwrap();

        let officer = officer();
        let admin = Principal::authenticated(Role::Admin, "admin-1");
        let (first, second) = tokio::join!(
            service.apply_transition(snapshot.clone(), ReportStatus::Reviewing, &officer, None),
            service.apply_transition(snapshot, ReportStatus::Reviewing, &admin, None),
        );

        let outcomes = [first, second];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(outcomes
            .iter()
            .any(|r| matches!(r, Err(AppError::StaleState(_)))));

        let stored = repository.get(id).await.unwrap();
        assert_eq!(stored.version, 2);
        assert_eq!(stored.audit_trail.len(), 1);
    }

    #[tokio::test]
    async fn test_allowed_transitions_and_audit_trail() {
        let (_, service, id) = setup().await;
        service
            .transition_status(id, ReportStatus::Reviewing, &officer(), None)
            .await
            .unwrap();
        service
            .transition_status(id, ReportStatus::Investigating, &officer(), None)
            .await
            .unwrap();

        let targets = service.allowed_transitions(id, &officer()).await.unwrap();
        assert_eq!(targets, vec![ReportStatus::Forwarded, ReportStatus::Closed]);

        let trail = service.audit_trail(id, &officer()).await.unwrap();
        let steps: Vec<_> = trail.iter().map(|e| e.to_status).collect();
        assert_eq!(steps, vec![ReportStatus::Reviewing, ReportStatus::Investigating]);

        let err = assert_err!(
            service
                .audit_trail(id, &Principal::citizen("citizen-1"))
                .await
        );
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_statistics_reflect_new_status() {
        let (repository, service, id) = setup().await;
        assert_eq!(summarize(&repository.list(None).await.unwrap()).in_progress, 0);

        service
            .transition_status(id, ReportStatus::Reviewing, &officer(), None)
            .await
            .unwrap();

        let stats = summarize(&repository.list(None).await.unwrap());
        assert_eq!(stats.total, 1);
        assert_eq!(stats.in_progress, 1);
    }

    /// Reads pass through; writes never finish
    struct StalledWrites(InMemoryReportRepository);

    #[async_trait]
    impl ReportRepository for StalledWrites {
        async fn create(&self, report: NewReport) -> Result<Uuid> {
            self.0.create(report).await
        }

        async fn get(&self, id: Uuid) -> Result<Report> {
            self.0.get(id).await
        }

        async fn update(&self, _: Uuid, _: ReportPatch, _: i64) -> Result<Report> {
            std::future::pending().await
        }

        async fn list(&self, owner: Option<&str>) -> Result<Vec<Report>> {
            self.0.list(owner).await
        }
    }

    #[tokio::test]
    async fn test_stalled_write_times_out_without_change() {
        let repository = Arc::new(StalledWrites(InMemoryReportRepository::new()));
        let id = repository
            .create(new_report(Some("citizen-1"), false))
            .await
            .unwrap();
        let service = LifecycleService::new(repository.clone(), Duration::from_millis(50));

        let err = assert_err!(
            service
                .transition_status(id, ReportStatus::Reviewing, &officer(), None)
                .await
        );
        assert!(matches!(err, AppError::Timeout(_)));

        let stored = repository.get(id).await.unwrap();
        assert_eq!(stored.status, ReportStatus::Submitted);
        assert_eq!(stored.version, 1);
    }
}
