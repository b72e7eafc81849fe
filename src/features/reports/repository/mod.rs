mod memory;
mod postgres;

pub use memory::InMemoryReportRepository;
pub use postgres::PgReportRepository;

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::reports::models::{NewReport, Report, ReportPatch};

/// Durable store of report records.
///
/// `update` is a compare-and-set on `Report::version`: it fails with
/// `AppError::StaleState` when the stored version differs from
/// `expected_version`, and with `AppError::NotFound` when the id is unknown.
/// A patch is applied completely or not at all.
#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn create(&self, report: NewReport) -> Result<Uuid>;

    async fn get(&self, id: Uuid) -> Result<Report>;

    async fn update(&self, id: Uuid, patch: ReportPatch, expected_version: i64) -> Result<Report>;

    /// Newest first. `owner` restricts to reports created by that user id.
    async fn list(&self, owner: Option<&str>) -> Result<Vec<Report>>;
}

/// Run a repository call under the caller's time bound.
///
/// Expiry drops the in-flight future and surfaces `AppError::Timeout`; the
/// call is not retried.
pub async fn bounded<T>(
    limit: Duration,
    operation: &str,
    call: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(AppError::Timeout(format!(
            "{} did not complete within {}ms",
            operation,
            limit.as_millis()
        ))),
    }
}
