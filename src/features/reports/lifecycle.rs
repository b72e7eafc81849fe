//! Report status graph.
//!
//! ```text
//! submitted -> reviewing -> investigating -> forwarded -> resolved -> closed
//!                                 |              |                      ^
//!                                 +--------------+----------------------+
//! ```
//!
//! `submitted` is the only initial state and `closed` is terminal.

use crate::features::reports::models::ReportStatus;

const TRANSITIONS: &[(ReportStatus, &[ReportStatus])] = &[
    (ReportStatus::Submitted, &[ReportStatus::Reviewing]),
    (ReportStatus::Reviewing, &[ReportStatus::Investigating]),
    (
        ReportStatus::Investigating,
        &[ReportStatus::Forwarded, ReportStatus::Closed],
    ),
    (
        ReportStatus::Forwarded,
        &[ReportStatus::Resolved, ReportStatus::Closed],
    ),
    (ReportStatus::Resolved, &[ReportStatus::Closed]),
    (ReportStatus::Closed, &[]),
];

pub const INITIAL_STATUS: ReportStatus = ReportStatus::Submitted;

/// Statuses reachable in one step from `from`
pub fn allowed_targets(from: ReportStatus) -> &'static [ReportStatus] {
    TRANSITIONS
        .iter()
        .find(|(status, _)| *status == from)
        .map(|(_, targets)| *targets)
        .unwrap_or(&[])
}

pub fn can_transition(from: ReportStatus, to: ReportStatus) -> bool {
    allowed_targets(from).contains(&to)
}

pub fn is_terminal(status: ReportStatus) -> bool {
    allowed_targets(status).is_empty()
}
