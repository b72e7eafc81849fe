use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::ReportRepository;
use crate::core::error::{AppError, Result};
use crate::features::reports::lifecycle::INITIAL_STATUS;
use crate::features::reports::models::{NewReport, Report, ReportPatch};

#[derive(Default)]
struct Store {
    reports: HashMap<Uuid, Report>,
    /// Insertion order, oldest first
    order: Vec<Uuid>,
}

/// Process-local report store.
///
/// Every write happens under a single write lock with no await point in
/// between, so a patch is either fully applied or not at all.
#[derive(Default)]
pub struct InMemoryReportRepository {
    store: RwLock<Store>,
}

impl InMemoryReportRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReportRepository for InMemoryReportRepository {
    async fn create(&self, report: NewReport) -> Result<Uuid> {
        let now = Utc::now();
        let id = Uuid::now_v7();

        let record = Report {
            id,
            title: report.title,
            description: report.description,
            category_id: report.category_id,
            incident_date: report.incident_date,
            incident_time: report.incident_time,
            location: report.location,
            region_code: report.region_code,
            is_anonymous: report.is_anonymous,
            contact_allowed: report.contact_allowed,
            creator_id: report.creator_id,
            status: INITIAL_STATUS,
            priority: report.priority,
            media: report.media,
            voice_report: report.voice_report,
            audit_trail: Vec::new(),
            version: 1,
            created_at: now,
            updated_at: now,
        };

        let mut store = self.store.write().await;
        store.reports.insert(id, record);
        store.order.push(id);

        Ok(id)
    }

    async fn get(&self, id: Uuid) -> Result<Report> {
        self.store
            .read()
            .await
            .reports
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))
    }

    async fn update(&self, id: Uuid, patch: ReportPatch, expected_version: i64) -> Result<Report> {
        let mut store = self.store.write().await;
        let report = store
            .reports
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))?;

        if report.version != expected_version {
            return Err(AppError::StaleState(format!(
                "Report {} is at version {}, expected {}",
                id, report.version, expected_version
            )));
        }

        report.status = patch.status;
        report.updated_at = patch.updated_at;
        if let Some(entry) = patch.audit_entry {
            report.audit_trail.push(entry);
        }
        report.version += 1;

        Ok(report.clone())
    }

    async fn list(&self, owner: Option<&str>) -> Result<Vec<Report>> {
        let store = self.store.read().await;

        Ok(store
            .order
            .iter()
            .rev()
            .filter_map(|id| store.reports.get(id))
            .filter(|r| owner.is_none() || r.creator_id.as_deref() == owner)
            .cloned()
            .collect())
    }
}
