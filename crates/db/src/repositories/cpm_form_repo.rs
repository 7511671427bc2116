//! Repository for the `cpm_forms` table.

use claimflow_core::types::DbId;
use sqlx::PgPool;

use crate::models::attachment::{Attachment, CreateAttachment};
use crate::models::cpm_form::{CpmForm, CreateCpmForm};
use crate::repositories::AttachmentRepo;

const COLUMNS: &str = "\
    id, claim_id, accident_date, accident_time, location, cause, \
    repair_shop, repair_shop_location, police_date, police_time, police_station, \
    damage_own_data, damage_detail, damage_amount, victim_detail, \
    partner_name, partner_tel, partner_address, partner_vehicle, \
    partner_damage_detail, partner_damage_amount, created_at, updated_at";

/// Provides create and lookup for a claim's CPM form.
pub struct CpmFormRepo;

impl CpmFormRepo {
    /// Create the CPM form for a claim.
    ///
    /// Fails with a unique violation on `uq_cpm_forms_claim_id` when the
    /// claim already has one.
    pub async fn create(
        pool: &PgPool,
        claim_id: DbId,
        input: &CreateCpmForm,
    ) -> Result<CpmForm, sqlx::Error> {
        let (form, _) = Self::create_with_attachments(pool, claim_id, input, &[]).await?;
        Ok(form)
    }

    /// Create the CPM form and record its uploaded files in one transaction.
    pub async fn create_with_attachments(
        pool: &PgPool,
        claim_id: DbId,
        input: &CreateCpmForm,
        attachments: &[CreateAttachment],
    ) -> Result<(CpmForm, Vec<Attachment>), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO cpm_forms \
                (claim_id, accident_date, accident_time, location, cause, \
                 repair_shop, repair_shop_location, police_date, police_time, police_station, \
                 damage_own_data, damage_detail, damage_amount, victim_detail, \
                 partner_name, partner_tel, partner_address, partner_vehicle, \
                 partner_damage_detail, partner_damage_amount) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, \
                     $11, $12, $13, $14, $15, $16, $17, $18, $19, $20) \
             RETURNING {COLUMNS}"
        );
        let form = sqlx::query_as::<_, CpmForm>(&query)
            .bind(claim_id)
            .bind(input.accident_date)
            .bind(&input.accident_time)
            .bind(&input.location)
            .bind(&input.cause)
            .bind(&input.repair_shop)
            .bind(&input.repair_shop_location)
            .bind(input.police_date)
            .bind(&input.police_time)
            .bind(&input.police_station)
            .bind(&input.damage_own_data)
            .bind(&input.damage_detail)
            .bind(input.damage_amount)
            .bind(&input.victim_detail)
            .bind(&input.partner_name)
            .bind(&input.partner_tel)
            .bind(&input.partner_address)
            .bind(&input.partner_vehicle)
            .bind(&input.partner_damage_detail)
            .bind(input.partner_damage_amount)
            .fetch_one(&mut *tx)
            .await?;

        let attachments = AttachmentRepo::insert_all(&mut tx, attachments).await?;

        tx.commit().await?;
        Ok((form, attachments))
    }

    /// Find the CPM form attached to a claim.
    pub async fn find_by_claim(
        pool: &PgPool,
        claim_id: DbId,
    ) -> Result<Option<CpmForm>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cpm_forms WHERE claim_id = $1");
        sqlx::query_as::<_, CpmForm>(&query)
            .bind(claim_id)
            .fetch_optional(pool)
            .await
    }
}
