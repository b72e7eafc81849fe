use std::sync::Arc;

use crate::core::error::Result;
use crate::features::auth::model::Principal;
use crate::features::dashboard::dtos::{DashboardReportsDto, PaginationMeta};
use crate::features::reports::services::aggregation::{
    summarize, ReportFilter, StatisticsSnapshot,
};
use crate::features::reports::ReportService;
use crate::shared::types::PaginationQuery;

/// Service for dashboard statistics and listings.
///
/// Everything is computed from the caller's visible report set on every
/// call; nothing is cached between requests.
pub struct DashboardService {
    reports: Arc<ReportService>,
}

impl DashboardService {
    pub fn new(reports: Arc<ReportService>) -> Self {
        Self { reports }
    }

    /// Statistics over the reports `principal` can see that match `filter`
    pub async fn get_summary(
        &self,
        principal: &Principal,
        filter: &ReportFilter,
    ) -> Result<StatisticsSnapshot> {
        let reports = self.reports.list_visible(principal, filter).await?;
        Ok(summarize(&reports))
    }

    /// One page of matching reports plus statistics over all of them
    pub async fn list_reports(
        &self,
        principal: &Principal,
        filter: &ReportFilter,
        pagination: &PaginationQuery,
    ) -> Result<DashboardReportsDto> {
        let reports = self.reports.list_visible(principal, filter).await?;
        let summary = summarize(&reports);
        let meta = PaginationMeta::new(pagination, reports.len() as i64);

        Ok(DashboardReportsDto {
            summary: summary.into(),
            reports: pagination
                .paginate(reports)
                .into_iter()
                .map(|r| r.into())
                .collect(),
            pagination: meta,
        })
    }
}
