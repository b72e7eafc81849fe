pub mod aggregation;
mod lifecycle_service;
mod report_service;
pub mod visibility;

pub use lifecycle_service::LifecycleService;
pub use report_service::ReportService;
