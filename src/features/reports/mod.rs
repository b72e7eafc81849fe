pub mod dtos;
pub mod handlers;
pub mod lifecycle;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;

pub use services::{LifecycleService, ReportService};
