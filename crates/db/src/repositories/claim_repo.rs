//! Repository for the `claims` table.

use claimflow_core::types::DbId;
use claimflow_core::workflow::ClaimFacts;
use sqlx::PgPool;

use crate::models::claim::{
    Claim, ClaimListParams, ClaimSummary, CreateClaim, StatusChange, UpdateClaim,
};
use crate::repositories::AttachmentRepo;

/// Column list for `claims` queries.
const COLUMNS: &str = "\
    id, category_main, category_sub, status, created_by_id, created_by_name, \
    approver_id, approver_name, insurer_comment, submitted_at, created_at, updated_at";

/// Column list for the denormalized list query (`c` = claims, `f` = cpm_forms).
const SUMMARY_COLUMNS: &str = "\
    c.id, c.category_main, c.category_sub, c.status, c.created_by_id, c.created_by_name, \
    c.approver_id, c.approver_name, c.insurer_comment, c.submitted_at, \
    c.created_at, c.updated_at, f.cause";

/// Provides CRUD and workflow writes for claims.
pub struct ClaimRepo;

impl ClaimRepo {
    /// Insert a claim header. `submitted_at` is stamped unless the claim
    /// starts as a draft.
    pub async fn create(pool: &PgPool, input: &CreateClaim) -> Result<Claim, sqlx::Error> {
        let query = format!(
            "INSERT INTO claims \
                (category_main, category_sub, status, created_by_id, created_by_name, \
                 approver_id, approver_name, submitted_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, \
                     CASE WHEN $3 = 'DRAFT' THEN NULL ELSE NOW() END) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Claim>(&query)
            .bind(&input.category_main)
            .bind(&input.category_sub)
            .bind(input.status.as_str())
            .bind(input.created_by_id)
            .bind(&input.created_by_name)
            .bind(input.approver_id)
            .bind(&input.approver_name)
            .fetch_one(pool)
            .await
    }

    /// Find a claim by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Claim>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM claims WHERE id = $1");
        sqlx::query_as::<_, Claim>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List claims matching every supplied filter, newest first.
    ///
    /// `user_email` matches the creator's email; `cause` is read from the
    /// claim's CPM form when one exists.
    pub async fn list_filtered(
        pool: &PgPool,
        params: &ClaimListParams,
    ) -> Result<Vec<ClaimSummary>, sqlx::Error> {
        let mut conditions: Vec<String> = Vec::new();
        let mut param_idx: usize = 1;

        if params.user_email.is_some() {
            conditions.push(format!("u.email = ${param_idx}"));
            param_idx += 1;
        }
        if params.approver_id.is_some() {
            conditions.push(format!("c.approver_id = ${param_idx}"));
            param_idx += 1;
        }
        if params.status.is_some() {
            conditions.push(format!("c.status = ${param_idx}"));
            param_idx += 1;
        }
        if params.category_main.is_some() {
            conditions.push(format!("c.category_main = ${param_idx}"));
            param_idx += 1;
        }
        if params.category_sub.is_some() {
            conditions.push(format!("c.category_sub = ${param_idx}"));
            param_idx += 1;
        }
        if params.exclude_status.is_some() {
            conditions.push(format!("c.status <> ${param_idx}"));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {SUMMARY_COLUMNS} FROM claims c \
             JOIN users u ON u.id = c.created_by_id \
             LEFT JOIN cpm_forms f ON f.claim_id = c.id \
             {where_clause} \
             ORDER BY c.created_at DESC, c.id DESC"
        );

        let mut q = sqlx::query_as::<_, ClaimSummary>(&query);

        if let Some(ref email) = params.user_email {
            q = q.bind(email);
        }
        if let Some(approver_id) = params.approver_id {
            q = q.bind(approver_id);
        }
        if let Some(ref status) = params.status {
            q = q.bind(status);
        }
        if let Some(ref main) = params.category_main {
            q = q.bind(main);
        }
        if let Some(ref sub) = params.category_sub {
            q = q.bind(sub);
        }
        if let Some(ref excluded) = params.exclude_status {
            q = q.bind(excluded);
        }

        q.fetch_all(pool).await
    }

    /// Apply a partial update. Only non-`None` fields are written.
    ///
    /// When `cause` is present the claim's CPM form is created or has its
    /// `cause` column replaced; no other CPM column is touched. The header,
    /// the cause, and any new attachment rows share one transaction. Returns
    /// `None` if the claim does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateClaim,
    ) -> Result<Option<Claim>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let (approver_id, approver_name) = match &input.approver {
            Some((approver_id, name)) => (Some(*approver_id), Some(name.as_str())),
            None => (None, None),
        };

        let update_query = format!(
            "UPDATE claims SET \
                category_main = COALESCE($2, category_main), \
                category_sub = COALESCE($3, category_sub), \
                approver_id = COALESCE($4, approver_id), \
                approver_name = COALESCE($5, approver_name) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let claim = sqlx::query_as::<_, Claim>(&update_query)
            .bind(id)
            .bind(&input.category_main)
            .bind(&input.category_sub)
            .bind(approver_id)
            .bind(approver_name)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(claim) = claim else {
            return Ok(None);
        };

        if let Some(ref cause) = input.cause {
            sqlx::query(
                "INSERT INTO cpm_forms (claim_id, cause) VALUES ($1, $2) \
                 ON CONFLICT (claim_id) DO UPDATE SET cause = EXCLUDED.cause",
            )
            .bind(id)
            .bind(cause)
            .execute(&mut *tx)
            .await?;
        }

        AttachmentRepo::insert_all(&mut tx, &input.attachments).await?;

        tx.commit().await?;
        Ok(Some(claim))
    }

    /// Persist a workflow transition.
    ///
    /// `insurer_comment` is replaced only when the change carries a comment.
    pub async fn apply_status(
        pool: &PgPool,
        id: DbId,
        change: &StatusChange,
    ) -> Result<Option<Claim>, sqlx::Error> {
        let query = format!(
            "UPDATE claims SET \
                status = $2, \
                insurer_comment = COALESCE($3, insurer_comment), \
                submitted_at = CASE WHEN $4 THEN NOW() ELSE submitted_at END \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Claim>(&query)
            .bind(id)
            .bind(change.status.as_str())
            .bind(&change.comment)
            .bind(change.stamp_submitted_at)
            .fetch_optional(pool)
            .await
    }

    /// Facts about the claim's FPPA04 form that gate later transitions.
    pub async fn workflow_facts(pool: &PgPool, id: DbId) -> Result<ClaimFacts, sqlx::Error> {
        let (has_fppa04_form, signatures_on_file): (bool, bool) = sqlx::query_as(
            "SELECT \
                EXISTS (SELECT 1 FROM fppa04_cpm v \
                        JOIN fppa04_bases b ON b.id = v.base_id \
                        WHERE b.claim_id = $1), \
                EXISTS (SELECT 1 FROM fppa04_cpm v \
                        JOIN fppa04_bases b ON b.id = v.base_id \
                        WHERE b.claim_id = $1 AND cardinality(v.signature_files) > 0)",
        )
        .bind(id)
        .fetch_one(pool)
        .await?;

        Ok(ClaimFacts {
            has_fppa04_form,
            signatures_on_file,
        })
    }
}
