use async_trait::async_trait;

use crate::core::error::Result;
use crate::features::auth::model::Principal;

/// Turns an optional session credential into the acting principal.
///
/// `None` means no credential was presented and resolves to a guest. A
/// credential that is present but invalid or expired fails with
/// `AppError::Unauthenticated`. Downstream components only ever see the
/// resolved `Principal`.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, credential: Option<&str>) -> Result<Principal>;
}
