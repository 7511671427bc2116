//! Multipart form reading for the claim endpoints.
//!
//! Claim create/update and CPM form submission arrive as `multipart/form-data`
//! with camelCase text fields plus file fields. This module buffers a request
//! into a [`MultipartForm`] and turns its text fields into typed DTOs.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::Multipart;
use chrono::NaiveDate;
use claimflow_core::attachment::AttachmentType;
use claimflow_core::error::CoreError;
use claimflow_core::types::DbId;
use claimflow_core::validation::{validate_amount, validate_category};
use claimflow_db::models::cpm_form::CreateCpmForm;

use crate::error::{AppError, AppResult};

/// One file part of a multipart request.
#[derive(Debug, Clone)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub bytes: Bytes,
}

/// A fully buffered multipart request.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    pub files: Vec<FilePart>,
}

impl MultipartForm {
    /// Drain a multipart stream. Parts with a file name are files; the rest
    /// are text fields (last value wins on repeats).
    pub async fn read(multipart: &mut Multipart) -> AppResult<Self> {
        let mut form = MultipartForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or("").to_string();
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                    // Browsers send an empty part for an untouched file input.
                    if !bytes.is_empty() {
                        form.files.push(FilePart {
                            field: name,
                            file_name,
                            bytes,
                        });
                    }
                }
                None => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                    form.fields.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    /// Build a form from already-split parts.
    pub fn from_parts(fields: HashMap<String, String>, files: Vec<FilePart>) -> Self {
        Self { fields, files }
    }

    /// A text field, trimmed; blank counts as absent.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    fn date(&self, name: &str) -> AppResult<Option<NaiveDate>> {
        self.text(name)
            .map(|raw| {
                NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
                    AppError::Core(CoreError::Validation(format!(
                        "{name} must be a date in YYYY-MM-DD format"
                    )))
                })
            })
            .transpose()
    }

    fn amount(&self, name: &str) -> AppResult<Option<f64>> {
        self.text(name)
            .map(|raw| -> AppResult<f64> {
                let value: f64 = raw.parse().map_err(|_| {
                    AppError::Core(CoreError::Validation(format!("{name} must be a number")))
                })?;
                validate_amount(name, value)?;
                Ok(value)
            })
            .transpose()
    }

    fn id(&self, name: &str) -> AppResult<Option<DbId>> {
        self.text(name)
            .map(|raw| {
                raw.parse::<DbId>().map_err(|_| {
                    AppError::Core(CoreError::Validation(format!("{name} must be an integer id")))
                })
            })
            .transpose()
    }

    /// File parts whose field names map to an attachment kind. Parts under
    /// other names are skipped.
    pub fn attachments(&self) -> Vec<(AttachmentType, &FilePart)> {
        self.files
            .iter()
            .filter_map(|part| match AttachmentType::from_form_field(&part.field) {
                Some(kind) => Some((kind, part)),
                None => {
                    tracing::debug!(field = %part.field, "Ignoring file under unknown field");
                    None
                }
            })
            .collect()
    }

    /// File parts under one field name.
    pub fn files_named<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FilePart> + 'a {
        self.files.iter().filter(move |part| part.field == field)
    }

    /// The CPM detail fields of the form.
    pub fn cpm_form(&self) -> AppResult<CreateCpmForm> {
        Ok(CreateCpmForm {
            accident_date: self.date("accidentDate")?,
            accident_time: self.text("accidentTime"),
            location: self.text("location"),
            cause: self.text("cause"),
            repair_shop: self.text("repairShop"),
            repair_shop_location: self.text("repairShopLocation"),
            police_date: self.date("policeDate")?,
            police_time: self.text("policeTime"),
            police_station: self.text("policeStation"),
            damage_own_data: self.text("damageOwnData"),
            damage_detail: self.text("damageDetail"),
            damage_amount: self.amount("damageAmount")?,
            victim_detail: self.text("victimDetail"),
            partner_name: self.text("partnerName"),
            partner_tel: self.text("partnerTel"),
            partner_address: self.text("partnerAddress"),
            partner_vehicle: self.text("partnerVehicle"),
            partner_damage_detail: self.text("partnerDamageDetail"),
            partner_damage_amount: self.amount("partnerDamageAmount")?,
        })
    }

    /// The claim patch fields of an update form. `status` is never read.
    pub fn claim_patch(&self) -> AppResult<ClaimPatch> {
        Ok(ClaimPatch {
            category_main: self
                .text("categoryMain")
                .map(|v| validate_category("categoryMain", &v))
                .transpose()?,
            category_sub: self
                .text("categorySub")
                .map(|v| validate_category("categorySub", &v))
                .transpose()?,
            approver_id: self.id("approverId")?,
            cause: self.text("cause"),
        })
    }
}

/// Fields an update may change. The approver's display name is resolved by
/// the handler before the write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClaimPatch {
    pub category_main: Option<String>,
    pub category_sub: Option<String>,
    pub approver_id: Option<DbId>,
    pub cause: Option<String>,
}
