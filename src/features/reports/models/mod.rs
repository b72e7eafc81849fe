mod audit_entry;
mod report;
mod report_attachment;

pub use audit_entry::AuditEntry;
pub use report::{NewReport, Report, ReportPatch, ReportPriority, ReportStatus};
pub use report_attachment::{MediaAttachment, VoiceReport};
