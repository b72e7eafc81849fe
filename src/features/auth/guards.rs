//! Role guards for handlers.
//!
//! The resolved `Principal` is placed in the request extensions by
//! `core::middleware::principal_middleware`; guards read it back and check the
//! permission table before the handler body runs.

use crate::core::error::AppError;
use crate::features::auth::model::Principal;
use crate::features::auth::permissions::{authorize, Action};
use axum::{extract::FromRequestParts, http::request::Parts};

/// Guard for authority, admin and moderator staff.
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireStaff(principal): RequireStaff) { ... }
/// ```
pub struct RequireStaff(pub Principal);

impl<S> FromRequestParts<S> for RequireStaff
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let principal = parts
            .extensions
            .get::<Principal>()
            .ok_or_else(|| AppError::Unauthenticated("Authentication required".to_string()))?;

        authorize(principal, Action::ViewAllReports)?;

        Ok(RequireStaff(principal.clone()))
    }
}
