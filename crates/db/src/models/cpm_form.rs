//! CPM (physical assets) claim detail form.

use chrono::NaiveDate;
use claimflow_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `cpm_forms` table. At most one per claim.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CpmForm {
    pub id: DbId,
    pub claim_id: DbId,
    pub accident_date: Option<NaiveDate>,
    pub accident_time: Option<String>,
    pub location: Option<String>,
    pub cause: Option<String>,
    pub repair_shop: Option<String>,
    pub repair_shop_location: Option<String>,
    pub police_date: Option<NaiveDate>,
    pub police_time: Option<String>,
    pub police_station: Option<String>,
    pub damage_own_data: Option<String>,
    pub damage_detail: Option<String>,
    pub damage_amount: Option<f64>,
    pub victim_detail: Option<String>,
    pub partner_name: Option<String>,
    pub partner_tel: Option<String>,
    pub partner_address: Option<String>,
    pub partner_vehicle: Option<String>,
    pub partner_damage_detail: Option<String>,
    pub partner_damage_amount: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a claim's CPM form. Every detail field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCpmForm {
    pub accident_date: Option<NaiveDate>,
    pub accident_time: Option<String>,
    pub location: Option<String>,
    pub cause: Option<String>,
    pub repair_shop: Option<String>,
    pub repair_shop_location: Option<String>,
    pub police_date: Option<NaiveDate>,
    pub police_time: Option<String>,
    pub police_station: Option<String>,
    pub damage_own_data: Option<String>,
    pub damage_detail: Option<String>,
    pub damage_amount: Option<f64>,
    pub victim_detail: Option<String>,
    pub partner_name: Option<String>,
    pub partner_tel: Option<String>,
    pub partner_address: Option<String>,
    pub partner_vehicle: Option<String>,
    pub partner_damage_detail: Option<String>,
    pub partner_damage_amount: Option<f64>,
}
