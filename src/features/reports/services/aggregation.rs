//! Dashboard statistics and faceted filtering over an already
//! visibility-filtered report set. Nothing here is cached: every call
//! computes from the slice it is given.

use serde::Serialize;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::core::error::AppError;
use crate::features::reports::models::{Report, ReportPriority, ReportStatus};

/// Sentinel accepted on every facet to disable filtering on that axis
pub const ALL_SENTINEL: &str = "all";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatisticsSnapshot {
    pub total: usize,
    pub resolved: usize,
    pub in_progress: usize,
    pub urgent: usize,
}

pub fn summarize(reports: &[Report]) -> StatisticsSnapshot {
    reports
        .iter()
        .fold(StatisticsSnapshot::default(), |mut stats, report| {
            stats.total += 1;
            if report.status == ReportStatus::Resolved {
                stats.resolved += 1;
            }
            if report.status.is_in_progress() {
                stats.in_progress += 1;
            }
            if report.priority == ReportPriority::Urgent {
                stats.urgent += 1;
            }
            stats
        })
}

/// One filter axis: either unrestricted or an exact value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facet<T> {
    All,
    Only(T),
}

impl<T> Default for Facet<T> {
    fn default() -> Self {
        Facet::All
    }
}

impl<T: PartialEq> Facet<T> {
    fn admits(&self, value: &T) -> bool {
        match self {
            Facet::All => true,
            Facet::Only(expected) => expected == value,
        }
    }
}

impl<T> FromStr for Facet<T>
where
    T: FromStr<Err = AppError>,
{
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == ALL_SENTINEL {
            Ok(Facet::All)
        } else {
            s.parse().map(Facet::Only)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    pub status: Facet<ReportStatus>,
    pub priority: Facet<ReportPriority>,
    /// Lowercased needle; `None` when no text search applies
    search_text: Option<String>,
}

impl ReportFilter {
    pub fn new(
        status: Facet<ReportStatus>,
        priority: Facet<ReportPriority>,
        search_text: Option<&str>,
    ) -> Self {
        let search_text = search_text
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        Self {
            status,
            priority,
            search_text,
        }
    }

    /// Build from raw query values; absent facets mean "all".
    /// Unknown status/priority strings are rejected with `InvalidValue`.
    pub fn parse(
        status: Option<&str>,
        priority: Option<&str>,
        search_text: Option<&str>,
    ) -> Result<Self, AppError> {
        let status = status
            .map(str::parse::<Facet<ReportStatus>>)
            .transpose()?
            .unwrap_or_default();
        let priority = priority
            .map(str::parse::<Facet<ReportPriority>>)
            .transpose()?
            .unwrap_or_default();
        Ok(Self::new(status, priority, search_text))
    }

    pub fn matches(&self, report: &Report) -> bool {
        self.status.admits(&report.status)
            && self.priority.admits(&report.priority)
            && self.matches_text(report)
    }

    fn matches_text(&self, report: &Report) -> bool {
        let Some(needle) = self.search_text.as_deref() else {
            return true;
        };

        [
            Some(report.title.as_str()),
            Some(report.description.as_str()),
            report.location.as_deref(),
            report.region_code.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|haystack| haystack.to_lowercase().contains(needle))
    }
}

/// Keep reports matching every present criterion, in input order
pub fn filter_reports(reports: Vec<Report>, criteria: &ReportFilter) -> Vec<Report> {
    reports
        .into_iter()
        .filter(|report| criteria.matches(report))
        .collect()
}
