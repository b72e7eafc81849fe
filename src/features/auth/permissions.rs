//! Authorization matrix keyed by (role, action).
//!
//! Kept separate from the report status graph so that "who may act" and
//! "which transitions exist" can change and be tested independently.

use crate::core::error::{AppError, Result};
use crate::features::auth::model::{Principal, Role};

/// Operations gated by role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SubmitReport,
    /// Submit with the creator reference attached
    SubmitIdentified,
    ViewOwnReports,
    ViewAllReports,
    /// See `creator_id` on anonymous reports
    ViewAnonymousReporter,
    TransitionStatus,
    ViewAuditTrail,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::SubmitReport => "submit_report",
            Action::SubmitIdentified => "submit_identified",
            Action::ViewOwnReports => "view_own_reports",
            Action::ViewAllReports => "view_all_reports",
            Action::ViewAnonymousReporter => "view_anonymous_reporter",
            Action::TransitionStatus => "transition_status",
            Action::ViewAuditTrail => "view_audit_trail",
        }
    }
}

const STAFF: &[Action] = &[
    Action::SubmitReport,
    Action::SubmitIdentified,
    Action::ViewOwnReports,
    Action::ViewAllReports,
    Action::ViewAnonymousReporter,
    Action::TransitionStatus,
    Action::ViewAuditTrail,
];

const PERMISSIONS: &[(Role, &[Action])] = &[
    (Role::Guest, &[Action::SubmitReport]),
    (
        Role::Citizen,
        &[
            Action::SubmitReport,
            Action::SubmitIdentified,
            Action::ViewOwnReports,
        ],
    ),
    (Role::Authority, STAFF),
    (Role::Admin, STAFF),
    (Role::Moderator, STAFF),
];

pub fn is_permitted(role: Role, action: Action) -> bool {
    PERMISSIONS
        .iter()
        .find(|(r, _)| *r == role)
        .is_some_and(|(_, actions)| actions.contains(&action))
}

/// Fail with `Unauthorized` unless the principal's role grants `action`
pub fn authorize(principal: &Principal, action: Action) -> Result<()> {
    if is_permitted(principal.role, action) {
        Ok(())
    } else {
        tracing::debug!(
            "Denied {} for role {} (user: {:?})",
            action.as_str(),
            principal.role,
            principal.user_id
        );
        Err(AppError::Unauthorized(format!(
            "Role '{}' is not allowed to {}",
            principal.role,
            action.as_str().replace('_', " ")
        )))
    }
}
