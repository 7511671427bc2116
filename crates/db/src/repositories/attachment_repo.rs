//! Repository for the `attachments` table.

use claimflow_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::attachment::{Attachment, CreateAttachment};

const COLUMNS: &str = "id, claim_id, file_name, url, attachment_type, created_at";

/// Provides persistence for claim attachment metadata. File bytes live in
/// the upload store, not here.
pub struct AttachmentRepo;

impl AttachmentRepo {
    /// Record stored uploads inside the caller's transaction, so the rows
    /// land together with the write they belong to.
    pub(crate) async fn insert_all(
        tx: &mut Transaction<'_, Postgres>,
        inputs: &[CreateAttachment],
    ) -> Result<Vec<Attachment>, sqlx::Error> {
        let query = format!(
            "INSERT INTO attachments (claim_id, file_name, url, attachment_type) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        let mut created = Vec::with_capacity(inputs.len());
        for input in inputs {
            let attachment = sqlx::query_as::<_, Attachment>(&query)
                .bind(input.claim_id)
                .bind(&input.file_name)
                .bind(&input.url)
                .bind(input.attachment_type.as_str())
                .fetch_one(&mut **tx)
                .await?;
            created.push(attachment);
        }
        Ok(created)
    }

    /// All attachments for a claim, oldest first.
    pub async fn list_for_claim(
        pool: &PgPool,
        claim_id: DbId,
    ) -> Result<Vec<Attachment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM attachments WHERE claim_id = $1 ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Attachment>(&query)
            .bind(claim_id)
            .fetch_all(pool)
            .await
    }

    /// Find an attachment by ID, scoped to its claim.
    pub async fn find_for_claim(
        pool: &PgPool,
        claim_id: DbId,
        id: DbId,
    ) -> Result<Option<Attachment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM attachments WHERE id = $1 AND claim_id = $2");
        sqlx::query_as::<_, Attachment>(&query)
            .bind(id)
            .bind(claim_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete an attachment row. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM attachments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
