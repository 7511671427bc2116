//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! match. Per-claim rules (creator, designated approver) are decided by the
//! workflow table instead.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use claimflow_core::error::CoreError;
use claimflow_core::roles::Role;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `MANAGER` role. Rejects with 403 Forbidden otherwise.
pub struct RequireManager(pub AuthUser);

impl FromRequestParts<AppState> for RequireManager {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != Role::Manager {
            return Err(AppError::Core(CoreError::Forbidden(
                "Forbidden: MANAGER role required".into(),
            )));
        }
        Ok(RequireManager(user))
    }
}

/// Requires the `INSURANCE` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn insurer_only(RequireInsurer(user): RequireInsurer) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireInsurer(pub AuthUser);

impl FromRequestParts<AppState> for RequireInsurer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != Role::Insurance {
            return Err(AppError::Core(CoreError::Forbidden(
                "Forbidden: INSURANCE role required".into(),
            )));
        }
        Ok(RequireInsurer(user))
    }
}
