use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::reports::dtos::ReportResponseDto;
use crate::features::reports::services::aggregation::StatisticsSnapshot;
use crate::shared::types::PaginationQuery;

// ============================================================================
// Pagination
// ============================================================================

/// Pagination metadata for response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    pub page: i64,
    pub page_size: i64,
    pub total_items: i64,
    pub total_pages: i64,
}

impl PaginationMeta {
    pub fn new(query: &PaginationQuery, total_items: i64) -> Self {
        let page_size = query.limit();
        let total_pages = (total_items as f64 / page_size as f64).ceil() as i64;
        Self {
            page: query.page(),
            page_size,
            total_items,
            total_pages,
        }
    }
}

// ============================================================================
// Summary
// ============================================================================

/// Report counts over the caller's visible (and filtered) report set
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardSummaryDto {
    pub total: usize,
    pub resolved: usize,
    /// reviewing + investigating + forwarded
    pub in_progress: usize,
    pub urgent: usize,
}

impl From<StatisticsSnapshot> for DashboardSummaryDto {
    fn from(s: StatisticsSnapshot) -> Self {
        Self {
            total: s.total,
            resolved: s.resolved,
            in_progress: s.in_progress,
            urgent: s.urgent,
        }
    }
}

// ============================================================================
// Reports List
// ============================================================================

/// One page of filtered reports together with the statistics of the whole
/// filtered set
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardReportsDto {
    pub summary: DashboardSummaryDto,
    pub reports: Vec<ReportResponseDto>,
    pub pagination: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_meta() {
        let query = PaginationQuery {
            page: 1,
            page_size: 4,
        };
        assert_eq!(PaginationMeta::new(&query, 10).total_pages, 3);
        assert_eq!(PaginationMeta::new(&query, 8).total_pages, 2);
        assert_eq!(PaginationMeta::new(&query, 0).total_pages, 0);
    }
}
