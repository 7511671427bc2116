//! Claim header model, list summary, and DTOs.

use claimflow_core::error::CoreError;
use claimflow_core::types::{DbId, Timestamp};
use claimflow_core::workflow::ClaimStatus;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::attachment::CreateAttachment;

/// A row from the `claims` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub id: DbId,
    pub category_main: String,
    pub category_sub: String,
    pub status: String,
    pub created_by_id: DbId,
    pub created_by_name: String,
    pub approver_id: DbId,
    pub approver_name: String,
    pub insurer_comment: Option<String>,
    pub submitted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Claim {
    /// Parse the stored status. The `ck_claims_status` constraint keeps this infallible
    /// in practice; a failure means the schema and the enum have drifted apart.
    pub fn claim_status(&self) -> Result<ClaimStatus, CoreError> {
        self.status.parse().map_err(|_| {
            CoreError::Internal(format!(
                "Claim {} has unknown status '{}'",
                self.id, self.status
            ))
        })
    }
}

/// Denormalized list row: claim header plus the cause from its CPM form.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimSummary {
    pub id: DbId,
    pub category_main: String,
    pub category_sub: String,
    pub status: String,
    pub created_by_id: DbId,
    pub created_by_name: String,
    pub approver_id: DbId,
    pub approver_name: String,
    pub insurer_comment: Option<String>,
    pub submitted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub cause: Option<String>,
}

/// DTO for inserting a claim header. Names are resolved by the caller.
#[derive(Debug, Clone)]
pub struct CreateClaim {
    pub category_main: String,
    pub category_sub: String,
    pub status: ClaimStatus,
    pub created_by_id: DbId,
    pub created_by_name: String,
    pub approver_id: DbId,
    pub approver_name: String,
}

/// Partial update of a claim.
///
/// Header fields are applied with `COALESCE`; `approver_id` and
/// `approver_name` travel together. `cause` is the one nested write: it
/// upserts the claim's CPM form, touching no other CPM column.
/// `attachments` are already on disk and are recorded with the same write.
#[derive(Debug, Clone, Default)]
pub struct UpdateClaim {
    pub category_main: Option<String>,
    pub category_sub: Option<String>,
    pub approver: Option<(DbId, String)>,
    pub cause: Option<String>,
    pub attachments: Vec<CreateAttachment>,
}

impl UpdateClaim {
    pub fn is_empty(&self) -> bool {
        self.category_main.is_none()
            && self.category_sub.is_none()
            && self.approver.is_none()
            && self.cause.is_none()
            && self.attachments.is_empty()
    }
}

/// A status move decided by the workflow, ready to be written.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub status: ClaimStatus,
    /// Overwrites `insurer_comment` when present.
    pub comment: Option<String>,
    /// Sets `submitted_at = NOW()`.
    pub stamp_submitted_at: bool,
}

/// Query parameters for `GET /claims`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimListParams {
    pub user_email: Option<String>,
    pub approver_id: Option<DbId>,
    pub status: Option<String>,
    pub category_main: Option<String>,
    pub category_sub: Option<String>,
    pub exclude_status: Option<String>,
}
