//! Repository for the `fppa04_bases` table.

use claimflow_core::types::DbId;
use sqlx::PgPool;

use crate::models::fppa04::{CreateFppa04Base, Fppa04Base, Fppa04Detail, UpdateFppa04Base};
use crate::repositories::Fppa04CpmRepo;

pub(crate) const COLUMNS: &str =
    "id, claim_id, category_main, category_sub, created_at, updated_at";

/// Provides CRUD for the FPPA04 base record of a claim.
pub struct Fppa04Repo;

impl Fppa04Repo {
    /// Create the FPPA04 base for a claim.
    ///
    /// Fails with a unique violation on `uq_fppa04_bases_claim_id` when the
    /// claim already has one.
    pub async fn create(
        pool: &PgPool,
        input: &CreateFppa04Base,
    ) -> Result<Fppa04Base, sqlx::Error> {
        let query = format!(
            "INSERT INTO fppa04_bases (claim_id, category_main, category_sub) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Fppa04Base>(&query)
            .bind(input.claim_id)
            .bind(&input.category_main)
            .bind(&input.category_sub)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Fppa04Base>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM fppa04_bases WHERE id = $1");
        sqlx::query_as::<_, Fppa04Base>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_claim(
        pool: &PgPool,
        claim_id: DbId,
    ) -> Result<Option<Fppa04Base>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM fppa04_bases WHERE claim_id = $1");
        sqlx::query_as::<_, Fppa04Base>(&query)
            .bind(claim_id)
            .fetch_optional(pool)
            .await
    }

    /// Update the base categories. Returns `None` if the base does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateFppa04Base,
    ) -> Result<Option<Fppa04Base>, sqlx::Error> {
        let query = format!(
            "UPDATE fppa04_bases SET \
                category_main = COALESCE($2, category_main), \
                category_sub = COALESCE($3, category_sub) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Fppa04Base>(&query)
            .bind(id)
            .bind(&input.category_main)
            .bind(&input.category_sub)
            .fetch_optional(pool)
            .await
    }

    /// Load a base with its CPM variant and the variant's ordered children.
    pub async fn detail(pool: &PgPool, base: Fppa04Base) -> Result<Fppa04Detail, sqlx::Error> {
        let cpm = Fppa04CpmRepo::detail_for_base(pool, base.id).await?;
        Ok(Fppa04Detail { base, cpm })
    }
}
