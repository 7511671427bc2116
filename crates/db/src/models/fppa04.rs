//! FPPA04 settlement form: base record, CPM variant, and its child rows.

use chrono::NaiveDate;
use claimflow_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Base
// ---------------------------------------------------------------------------

/// A row from the `fppa04_bases` table. At most one per claim.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fppa04Base {
    pub id: DbId,
    pub claim_id: DbId,
    pub category_main: String,
    pub category_sub: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for `POST /fppa04`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFppa04Base {
    pub claim_id: DbId,
    pub category_main: String,
    pub category_sub: String,
}

/// Request body for `PATCH /fppa04/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFppa04Base {
    pub category_main: Option<String>,
    pub category_sub: Option<String>,
}

// ---------------------------------------------------------------------------
// CPM variant
// ---------------------------------------------------------------------------

/// A row from the `fppa04_cpm` table. At most one per base.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fppa04Cpm {
    pub id: DbId,
    pub base_id: DbId,
    pub event_type: Option<String>,
    pub claim_ref_number: Option<String>,
    pub event_description: Option<String>,
    pub product_list: Option<String>,
    pub accident_date: Option<NaiveDate>,
    pub accident_time: Option<String>,
    pub surveyor_name: Option<String>,
    pub policy_number: Option<String>,
    pub net_amount: f64,
    pub signature_files: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `fppa04_cpm_items` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fppa04ItemCpm {
    pub id: DbId,
    pub cpm_id: DbId,
    pub sort_order: i32,
    pub category: String,
    pub description: Option<String>,
    pub damage_amount: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `fppa04_cpm_adjustments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fppa04AdjustmentCpm {
    pub id: DbId,
    pub cpm_id: DbId,
    pub sort_order: i32,
    pub adjustment_type: String,
    pub description: Option<String>,
    pub amount: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// One item in an upsert payload or an item create request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fppa04ItemInput {
    pub category: String,
    pub description: Option<String>,
    #[serde(default)]
    pub damage_amount: f64,
}

/// Request body for `PATCH /fppa04/{id}/cpm/items/{item_id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFppa04Item {
    pub category: Option<String>,
    pub description: Option<String>,
    pub damage_amount: Option<f64>,
}

/// One adjustment in an upsert payload or an adjustment create request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fppa04AdjustmentInput {
    pub adjustment_type: String,
    pub description: Option<String>,
    #[serde(default)]
    pub amount: f64,
}

/// Request body for `PATCH /fppa04/{id}/cpm/adjustments/{adjustment_id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFppa04Adjustment {
    pub adjustment_type: Option<String>,
    pub description: Option<String>,
    pub amount: Option<f64>,
}

/// Full replacement payload for the CPM variant.
///
/// `items` and `adjustments` replace the stored collections wholesale; their
/// order here becomes their stored `sort_order`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertFppa04Cpm {
    pub event_type: Option<String>,
    pub claim_ref_number: Option<String>,
    pub event_description: Option<String>,
    pub product_list: Option<String>,
    pub accident_date: Option<NaiveDate>,
    pub accident_time: Option<String>,
    pub surveyor_name: Option<String>,
    pub policy_number: Option<String>,
    #[serde(default)]
    pub net_amount: f64,
    /// `None` keeps the stored signature list; `Some` replaces it.
    pub signature_files: Option<Vec<String>>,
    #[serde(default)]
    pub items: Vec<Fppa04ItemInput>,
    #[serde(default)]
    pub adjustments: Vec<Fppa04AdjustmentInput>,
}

/// Request body for `POST /claims/{id}/fppa04`: the base categories plus the
/// CPM variant payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertClaimFppa04 {
    pub category_main: String,
    pub category_sub: String,
    #[serde(flatten)]
    pub cpm: UpsertFppa04Cpm,
}

// ---------------------------------------------------------------------------
// Composite reads
// ---------------------------------------------------------------------------

/// The CPM variant with its ordered children.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fppa04CpmDetail {
    #[serde(flatten)]
    pub cpm: Fppa04Cpm,
    pub items: Vec<Fppa04ItemCpm>,
    pub adjustments: Vec<Fppa04AdjustmentCpm>,
}

/// The FPPA04 base with its optional CPM variant.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fppa04Detail {
    #[serde(flatten)]
    pub base: Fppa04Base,
    pub cpm: Option<Fppa04CpmDetail>,
}
