//! Role-based projection of report sets.
//!
//! Rules, first match wins:
//! 1. staff (`ViewAllReports`) see every report unredacted
//! 2. citizens (`ViewOwnReports`) see only reports they created
//! 3. everyone else sees nothing
//!
//! Independently of the rule that admitted a report, an anonymous report's
//! creator is removed unless the viewer holds `ViewAnonymousReporter`, and the
//! audit trail is removed unless the viewer holds `ViewAuditTrail`.

use crate::features::auth::model::Principal;
use crate::features::auth::permissions::{is_permitted, Action};
use crate::features::reports::models::Report;

/// Project a single report for `principal`, or `None` if it must not be seen
pub fn project(mut report: Report, principal: &Principal) -> Option<Report> {
    let role = principal.role;

    let admitted = is_permitted(role, Action::ViewAllReports)
        || (is_permitted(role, Action::ViewOwnReports)
            && principal.owns(report.creator_id.as_deref()));
    if !admitted {
        return None;
    }

    if report.is_anonymous && !is_permitted(role, Action::ViewAnonymousReporter) {
        report.creator_id = None;
    }
    if !is_permitted(role, Action::ViewAuditTrail) {
        report.audit_trail.clear();
    }

    Some(report)
}

/// Restrict and redact `reports` for `principal`, preserving input order
pub fn visible_reports(reports: Vec<Report>, principal: &Principal) -> Vec<Report> {
    reports
        .into_iter()
        .filter_map(|report| project(report, principal))
        .collect()
}
