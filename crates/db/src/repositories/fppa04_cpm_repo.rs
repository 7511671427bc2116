//! Repository for the FPPA04 CPM variant and its child collections
//! (`fppa04_cpm`, `fppa04_cpm_items`, `fppa04_cpm_adjustments`).

use claimflow_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::fppa04::{
    Fppa04AdjustmentCpm, Fppa04AdjustmentInput, Fppa04Base, Fppa04Cpm, Fppa04CpmDetail,
    Fppa04Detail, Fppa04ItemCpm, Fppa04ItemInput, UpdateFppa04Adjustment, UpdateFppa04Item,
    UpsertClaimFppa04, UpsertFppa04Cpm,
};
use crate::repositories::fppa04_repo;

const COLUMNS: &str = "\
    id, base_id, event_type, claim_ref_number, event_description, product_list, \
    accident_date, accident_time, surveyor_name, policy_number, net_amount, \
    signature_files, created_at, updated_at";

const ITEM_COLUMNS: &str =
    "id, cpm_id, sort_order, category, description, damage_amount, created_at, updated_at";

const ADJUSTMENT_COLUMNS: &str =
    "id, cpm_id, sort_order, adjustment_type, description, amount, created_at, updated_at";

/// Provides upsert and child CRUD for the FPPA04 CPM variant.
pub struct Fppa04CpmRepo;

impl Fppa04CpmRepo {
    // -----------------------------------------------------------------------
    // Variant
    // -----------------------------------------------------------------------

    pub async fn find_by_base(
        pool: &PgPool,
        base_id: DbId,
    ) -> Result<Option<Fppa04Cpm>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM fppa04_cpm WHERE base_id = $1");
        sqlx::query_as::<_, Fppa04Cpm>(&query)
            .bind(base_id)
            .fetch_optional(pool)
            .await
    }

    /// Load the variant of a base with its items and adjustments in stored order.
    pub async fn detail_for_base(
        pool: &PgPool,
        base_id: DbId,
    ) -> Result<Option<Fppa04CpmDetail>, sqlx::Error> {
        let Some(cpm) = Self::find_by_base(pool, base_id).await? else {
            return Ok(None);
        };
        let items = Self::list_items(pool, cpm.id).await?;
        let adjustments = Self::list_adjustments(pool, cpm.id).await?;
        Ok(Some(Fppa04CpmDetail {
            cpm,
            items,
            adjustments,
        }))
    }

    /// Create or fully replace the variant of an existing base.
    ///
    /// Items and adjustments are deleted and recreated in payload order
    /// inside the same transaction as the variant write.
    pub async fn upsert(
        pool: &PgPool,
        base_id: DbId,
        input: &UpsertFppa04Cpm,
    ) -> Result<Fppa04CpmDetail, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let detail = Self::upsert_inner(&mut tx, base_id, input).await?;
        tx.commit().await?;
        Ok(detail)
    }

    /// Create or replace a claim's FPPA04 base and CPM variant in one
    /// transaction. The base keeps its id; its categories are overwritten.
    pub async fn upsert_for_claim(
        pool: &PgPool,
        claim_id: DbId,
        input: &UpsertClaimFppa04,
    ) -> Result<Fppa04Detail, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let base_query = format!(
            "INSERT INTO fppa04_bases (claim_id, category_main, category_sub) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (claim_id) DO UPDATE SET \
                category_main = EXCLUDED.category_main, \
                category_sub = EXCLUDED.category_sub \
             RETURNING {}",
            fppa04_repo::COLUMNS
        );
        let base = sqlx::query_as::<_, Fppa04Base>(&base_query)
            .bind(claim_id)
            .bind(&input.category_main)
            .bind(&input.category_sub)
            .fetch_one(&mut *tx)
            .await?;

        let cpm = Self::upsert_inner(&mut tx, base.id, &input.cpm).await?;

        tx.commit().await?;
        Ok(Fppa04Detail {
            base,
            cpm: Some(cpm),
        })
    }

    /// Append signature URLs to the variant of a base.
    ///
    /// Returns `None` if the base has no variant yet.
    pub async fn append_signatures(
        pool: &PgPool,
        base_id: DbId,
        urls: &[String],
    ) -> Result<Option<Fppa04Cpm>, sqlx::Error> {
        let query = format!(
            "UPDATE fppa04_cpm SET signature_files = signature_files || $2::TEXT[] \
             WHERE base_id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Fppa04Cpm>(&query)
            .bind(base_id)
            .bind(urls)
            .fetch_optional(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Items
    // -----------------------------------------------------------------------

    pub async fn list_items(
        pool: &PgPool,
        cpm_id: DbId,
    ) -> Result<Vec<Fppa04ItemCpm>, sqlx::Error> {
        let query = format!(
            "SELECT {ITEM_COLUMNS} FROM fppa04_cpm_items \
             WHERE cpm_id = $1 ORDER BY sort_order ASC, id ASC"
        );
        sqlx::query_as::<_, Fppa04ItemCpm>(&query)
            .bind(cpm_id)
            .fetch_all(pool)
            .await
    }

    /// Append an item after the current last one.
    pub async fn add_item(
        pool: &PgPool,
        cpm_id: DbId,
        input: &Fppa04ItemInput,
    ) -> Result<Fppa04ItemCpm, sqlx::Error> {
        let query = format!(
            "INSERT INTO fppa04_cpm_items (cpm_id, sort_order, category, description, damage_amount) \
             VALUES ($1, \
                     (SELECT COALESCE(MAX(sort_order) + 1, 0) FROM fppa04_cpm_items WHERE cpm_id = $1), \
                     $2, $3, $4) \
             RETURNING {ITEM_COLUMNS}"
        );
        sqlx::query_as::<_, Fppa04ItemCpm>(&query)
            .bind(cpm_id)
            .bind(&input.category)
            .bind(&input.description)
            .bind(input.damage_amount)
            .fetch_one(pool)
            .await
    }

    /// Update an item of the given variant. Returns `None` if no such item.
    pub async fn update_item(
        pool: &PgPool,
        cpm_id: DbId,
        item_id: DbId,
        input: &UpdateFppa04Item,
    ) -> Result<Option<Fppa04ItemCpm>, sqlx::Error> {
        let query = format!(
            "UPDATE fppa04_cpm_items SET \
                category = COALESCE($3, category), \
                description = COALESCE($4, description), \
                damage_amount = COALESCE($5, damage_amount) \
             WHERE id = $1 AND cpm_id = $2 \
             RETURNING {ITEM_COLUMNS}"
        );
        sqlx::query_as::<_, Fppa04ItemCpm>(&query)
            .bind(item_id)
            .bind(cpm_id)
            .bind(&input.category)
            .bind(&input.description)
            .bind(input.damage_amount)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete_item(
        pool: &PgPool,
        cpm_id: DbId,
        item_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM fppa04_cpm_items WHERE id = $1 AND cpm_id = $2")
            .bind(item_id)
            .bind(cpm_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Adjustments
    // -----------------------------------------------------------------------

    pub async fn list_adjustments(
        pool: &PgPool,
        cpm_id: DbId,
    ) -> Result<Vec<Fppa04AdjustmentCpm>, sqlx::Error> {
        let query = format!(
            "SELECT {ADJUSTMENT_COLUMNS} FROM fppa04_cpm_adjustments \
             WHERE cpm_id = $1 ORDER BY sort_order ASC, id ASC"
        );
        sqlx::query_as::<_, Fppa04AdjustmentCpm>(&query)
            .bind(cpm_id)
            .fetch_all(pool)
            .await
    }

    /// Append an adjustment after the current last one.
    pub async fn add_adjustment(
        pool: &PgPool,
        cpm_id: DbId,
        input: &Fppa04AdjustmentInput,
    ) -> Result<Fppa04AdjustmentCpm, sqlx::Error> {
        let query = format!(
            "INSERT INTO fppa04_cpm_adjustments (cpm_id, sort_order, adjustment_type, description, amount) \
             VALUES ($1, \
                     (SELECT COALESCE(MAX(sort_order) + 1, 0) FROM fppa04_cpm_adjustments WHERE cpm_id = $1), \
                     $2, $3, $4) \
             RETURNING {ADJUSTMENT_COLUMNS}"
        );
        sqlx::query_as::<_, Fppa04AdjustmentCpm>(&query)
            .bind(cpm_id)
            .bind(&input.adjustment_type)
            .bind(&input.description)
            .bind(input.amount)
            .fetch_one(pool)
            .await
    }

    pub async fn update_adjustment(
        pool: &PgPool,
        cpm_id: DbId,
        adjustment_id: DbId,
        input: &UpdateFppa04Adjustment,
    ) -> Result<Option<Fppa04AdjustmentCpm>, sqlx::Error> {
        let query = format!(
            "UPDATE fppa04_cpm_adjustments SET \
                adjustment_type = COALESCE($3, adjustment_type), \
                description = COALESCE($4, description), \
                amount = COALESCE($5, amount) \
             WHERE id = $1 AND cpm_id = $2 \
             RETURNING {ADJUSTMENT_COLUMNS}"
        );
        sqlx::query_as::<_, Fppa04AdjustmentCpm>(&query)
            .bind(adjustment_id)
            .bind(cpm_id)
            .bind(&input.adjustment_type)
            .bind(&input.description)
            .bind(input.amount)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete_adjustment(
        pool: &PgPool,
        cpm_id: DbId,
        adjustment_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM fppa04_cpm_adjustments WHERE id = $1 AND cpm_id = $2")
                .bind(adjustment_id)
                .bind(cpm_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Write the variant row and replace its children within an existing transaction.
    async fn upsert_inner(
        tx: &mut Transaction<'_, Postgres>,
        base_id: DbId,
        input: &UpsertFppa04Cpm,
    ) -> Result<Fppa04CpmDetail, sqlx::Error> {
        let query = format!(
            "INSERT INTO fppa04_cpm \
                (base_id, event_type, claim_ref_number, event_description, product_list, \
                 accident_date, accident_time, surveyor_name, policy_number, net_amount, \
                 signature_files) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, COALESCE($11::TEXT[], '{{}}')) \
             ON CONFLICT (base_id) DO UPDATE SET \
                event_type = EXCLUDED.event_type, \
                claim_ref_number = EXCLUDED.claim_ref_number, \
                event_description = EXCLUDED.event_description, \
                product_list = EXCLUDED.product_list, \
                accident_date = EXCLUDED.accident_date, \
                accident_time = EXCLUDED.accident_time, \
                surveyor_name = EXCLUDED.surveyor_name, \
                policy_number = EXCLUDED.policy_number, \
                net_amount = EXCLUDED.net_amount, \
                signature_files = COALESCE($11::TEXT[], fppa04_cpm.signature_files) \
             RETURNING {COLUMNS}"
        );
        let cpm = sqlx::query_as::<_, Fppa04Cpm>(&query)
            .bind(base_id)
            .bind(&input.event_type)
            .bind(&input.claim_ref_number)
            .bind(&input.event_description)
            .bind(&input.product_list)
            .bind(input.accident_date)
            .bind(&input.accident_time)
            .bind(&input.surveyor_name)
            .bind(&input.policy_number)
            .bind(input.net_amount)
            .bind(&input.signature_files)
            .fetch_one(&mut **tx)
            .await?;

        let items = Self::replace_items_inner(tx, cpm.id, &input.items).await?;
        let adjustments = Self::replace_adjustments_inner(tx, cpm.id, &input.adjustments).await?;

        Ok(Fppa04CpmDetail {
            cpm,
            items,
            adjustments,
        })
    }

    async fn replace_items_inner(
        tx: &mut Transaction<'_, Postgres>,
        cpm_id: DbId,
        items: &[Fppa04ItemInput],
    ) -> Result<Vec<Fppa04ItemCpm>, sqlx::Error> {
        sqlx::query("DELETE FROM fppa04_cpm_items WHERE cpm_id = $1")
            .bind(cpm_id)
            .execute(&mut **tx)
            .await?;

        let query = format!(
            "INSERT INTO fppa04_cpm_items (cpm_id, sort_order, category, description, damage_amount) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {ITEM_COLUMNS}"
        );
        let mut created = Vec::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            let row = sqlx::query_as::<_, Fppa04ItemCpm>(&query)
                .bind(cpm_id)
                .bind(idx as i32)
                .bind(&item.category)
                .bind(&item.description)
                .bind(item.damage_amount)
                .fetch_one(&mut **tx)
                .await?;
            created.push(row);
        }
        Ok(created)
    }

    async fn replace_adjustments_inner(
        tx: &mut Transaction<'_, Postgres>,
        cpm_id: DbId,
        adjustments: &[Fppa04AdjustmentInput],
    ) -> Result<Vec<Fppa04AdjustmentCpm>, sqlx::Error> {
        sqlx::query("DELETE FROM fppa04_cpm_adjustments WHERE cpm_id = $1")
            .bind(cpm_id)
            .execute(&mut **tx)
            .await?;

        let query = format!(
            "INSERT INTO fppa04_cpm_adjustments (cpm_id, sort_order, adjustment_type, description, amount) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {ADJUSTMENT_COLUMNS}"
        );
        let mut created = Vec::with_capacity(adjustments.len());
        for (idx, adjustment) in adjustments.iter().enumerate() {
            let row = sqlx::query_as::<_, Fppa04AdjustmentCpm>(&query)
                .bind(cpm_id)
                .bind(idx as i32)
                .bind(&adjustment.adjustment_type)
                .bind(&adjustment.description)
                .bind(adjustment.amount)
                .fetch_one(&mut **tx)
                .await?;
            created.push(row);
        }
        Ok(created)
    }
}
