//! Claim attachment model.

use claimflow_core::attachment::AttachmentType;
use claimflow_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `attachments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: DbId,
    pub claim_id: DbId,
    pub file_name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub attachment_type: String,
    pub created_at: Timestamp,
}

/// DTO for recording a stored upload against a claim.
#[derive(Debug, Clone)]
pub struct CreateAttachment {
    pub claim_id: DbId,
    pub file_name: String,
    pub url: String,
    pub attachment_type: AttachmentType,
}
