//! Handlers for the `/fppa04` resource: the insurer's settlement form, its
//! CPM variant, the variant's items and adjustments, and signature uploads.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use claimflow_core::error::CoreError;
use claimflow_core::roles::Role;
use claimflow_core::types::DbId;
use claimflow_core::validation::{require_text, validate_amount, validate_category};
use claimflow_db::models::fppa04::{
    CreateFppa04Base, Fppa04AdjustmentCpm, Fppa04AdjustmentInput, Fppa04Base, Fppa04Cpm,
    Fppa04CpmDetail, Fppa04Detail, Fppa04ItemCpm, Fppa04ItemInput, UpdateFppa04Adjustment,
    UpdateFppa04Base, UpdateFppa04Item, UpsertFppa04Cpm,
};
use claimflow_db::repositories::{ClaimRepo, Fppa04CpmRepo, Fppa04Repo};

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::forms::MultipartForm;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireInsurer;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::uploads::UploadFolder;

/// Multipart field carrying signature files.
const SIGNATURE_FIELD: &str = "files";

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_item(item: &Fppa04ItemInput) -> Result<(), CoreError> {
    require_text("category", &item.category)?;
    validate_amount("damageAmount", item.damage_amount)
}

fn validate_adjustment(adjustment: &Fppa04AdjustmentInput) -> Result<(), CoreError> {
    require_text("adjustmentType", &adjustment.adjustment_type)?;
    if !adjustment.amount.is_finite() {
        return Err(CoreError::Validation("amount must be a number".into()));
    }
    Ok(())
}

/// Check a full variant payload before any of it is written.
pub(crate) fn validate_upsert(input: &UpsertFppa04Cpm) -> Result<(), CoreError> {
    if !input.net_amount.is_finite() {
        return Err(CoreError::Validation("netAmount must be a number".into()));
    }
    input.items.iter().try_for_each(validate_item)?;
    input.adjustments.iter().try_for_each(validate_adjustment)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_base(state: &AppState, id: DbId) -> AppResult<Fppa04Base> {
    Fppa04Repo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Fppa04Base",
            id,
        }))
}

/// The CPM variant of a base; item and adjustment routes need one.
async fn find_variant(state: &AppState, base_id: DbId) -> AppResult<Fppa04Cpm> {
    find_base(state, base_id).await?;
    Fppa04CpmRepo::find_by_base(&state.pool, base_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Fppa04Cpm",
            id: base_id,
        }))
}

// ---------------------------------------------------------------------------
// Base
// ---------------------------------------------------------------------------

/// POST /api/fppa04
pub async fn create_base(
    State(state): State<AppState>,
    RequireInsurer(auth): RequireInsurer,
    AppJson(input): AppJson<CreateFppa04Base>,
) -> AppResult<(StatusCode, Json<DataResponse<Fppa04Base>>)> {
    ClaimRepo::find_by_id(&state.pool, input.claim_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Claim",
            id: input.claim_id,
        }))?;

    let input = CreateFppa04Base {
        claim_id: input.claim_id,
        category_main: validate_category("categoryMain", &input.category_main)?,
        category_sub: validate_category("categorySub", &input.category_sub)?,
    };
    let base = Fppa04Repo::create(&state.pool, &input).await?;

    tracing::info!(
        claim_id = base.claim_id,
        base_id = base.id,
        user_id = auth.user_id,
        "FPPA04 base created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: base })))
}

/// GET /api/fppa04/{id}
///
/// Base, CPM variant, items, and adjustments in one document.
pub async fn get_fppa04(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Fppa04Detail>>> {
    let base = find_base(&state, id).await?;
    let detail = Fppa04Repo::detail(&state.pool, base).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// PATCH /api/fppa04/{id}
pub async fn update_base(
    State(state): State<AppState>,
    RequireInsurer(_auth): RequireInsurer,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateFppa04Base>,
) -> AppResult<Json<DataResponse<Fppa04Base>>> {
    let input = UpdateFppa04Base {
        category_main: input
            .category_main
            .map(|v| validate_category("categoryMain", &v))
            .transpose()?,
        category_sub: input
            .category_sub
            .map(|v| validate_category("categorySub", &v))
            .transpose()?,
    };

    let base = Fppa04Repo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Fppa04Base",
            id,
        }))?;
    Ok(Json(DataResponse { data: base }))
}

// ---------------------------------------------------------------------------
// CPM variant
// ---------------------------------------------------------------------------

/// POST|PATCH /api/fppa04/{id}/cpm
///
/// Create or fully replace the variant; items and adjustments are replaced
/// by the payload's lists in order.
pub async fn upsert_cpm(
    State(state): State<AppState>,
    RequireInsurer(auth): RequireInsurer,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpsertFppa04Cpm>,
) -> AppResult<Json<DataResponse<Fppa04CpmDetail>>> {
    let base = find_base(&state, id).await?;
    validate_upsert(&input)?;

    let detail = Fppa04CpmRepo::upsert(&state.pool, base.id, &input).await?;

    tracing::info!(
        claim_id = base.claim_id,
        base_id = base.id,
        user_id = auth.user_id,
        items = detail.items.len(),
        adjustments = detail.adjustments.len(),
        "FPPA04 CPM variant saved"
    );

    Ok(Json(DataResponse { data: detail }))
}

/// POST /api/fppa04/{id}/cpm/signatures
///
/// Multipart `files`; each is stored in the claim's signature folder and its
/// URL appended to `signatureFiles`. Open to the claim's creator and INSURANCE users.
pub async fn upload_signatures(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<Json<DataResponse<Fppa04Cpm>>> {
    let base = find_base(&state, id).await?;
    let claim = ClaimRepo::find_by_id(&state.pool, base.claim_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Claim",
            id: base.claim_id,
        }))?;

    if auth.user_id != claim.created_by_id && auth.role != Role::Insurance {
        return Err(AppError::Core(CoreError::Forbidden(
            "Forbidden: only the claim's creator or INSURANCE users may add signatures".into(),
        )));
    }
    find_variant(&state, id).await?;

    let form = MultipartForm::read(&mut multipart).await?;
    let parts: Vec<_> = form.files_named(SIGNATURE_FIELD).collect();
    if parts.is_empty() {
        return Err(AppError::BadRequest(format!(
            "Missing signature files in '{SIGNATURE_FIELD}'"
        )));
    }

    let stored = state
        .uploads
        .save_all(claim.id, UploadFolder::Signatures, &parts)
        .await?;
    let urls: Vec<String> = stored.into_iter().map(|file| file.url).collect();

    let appended = Fppa04CpmRepo::append_signatures(&state.pool, id, &urls).await;
    if !matches!(appended, Ok(Some(_))) {
        state.uploads.discard(urls.iter().map(String::as_str)).await;
    }
    let cpm = appended?.ok_or(AppError::Core(CoreError::NotFound {
        entity: "Fppa04Cpm",
        id,
    }))?;

    tracing::info!(
        claim_id = claim.id,
        base_id = id,
        user_id = auth.user_id,
        added = urls.len(),
        "Signature files added"
    );

    Ok(Json(DataResponse { data: cpm }))
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// GET /api/fppa04/{id}/cpm/items
pub async fn list_items(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Fppa04ItemCpm>>>> {
    let cpm = find_variant(&state, id).await?;
    let items = Fppa04CpmRepo::list_items(&state.pool, cpm.id).await?;
    Ok(Json(DataResponse { data: items }))
}

/// POST /api/fppa04/{id}/cpm/items
pub async fn add_item(
    State(state): State<AppState>,
    RequireInsurer(_auth): RequireInsurer,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<Fppa04ItemInput>,
) -> AppResult<(StatusCode, Json<DataResponse<Fppa04ItemCpm>>)> {
    validate_item(&input)?;
    let cpm = find_variant(&state, id).await?;
    let item = Fppa04CpmRepo::add_item(&state.pool, cpm.id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: item })))
}

/// PATCH /api/fppa04/{id}/cpm/items/{item_id}
pub async fn update_item(
    State(state): State<AppState>,
    RequireInsurer(_auth): RequireInsurer,
    Path((id, item_id)): Path<(DbId, DbId)>,
    AppJson(input): AppJson<UpdateFppa04Item>,
) -> AppResult<Json<DataResponse<Fppa04ItemCpm>>> {
    if let Some(ref category) = input.category {
        require_text("category", category)?;
    }
    if let Some(amount) = input.damage_amount {
        validate_amount("damageAmount", amount)?;
    }

    let cpm = find_variant(&state, id).await?;
    let item = Fppa04CpmRepo::update_item(&state.pool, cpm.id, item_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Fppa04ItemCpm",
            id: item_id,
        }))?;
    Ok(Json(DataResponse { data: item }))
}

/// DELETE /api/fppa04/{id}/cpm/items/{item_id}
pub async fn delete_item(
    State(state): State<AppState>,
    RequireInsurer(_auth): RequireInsurer,
    Path((id, item_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let cpm = find_variant(&state, id).await?;
    if !Fppa04CpmRepo::delete_item(&state.pool, cpm.id, item_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Fppa04ItemCpm",
            id: item_id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Adjustments
// ---------------------------------------------------------------------------

/// GET /api/fppa04/{id}/cpm/adjustments
pub async fn list_adjustments(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Fppa04AdjustmentCpm>>>> {
    let cpm = find_variant(&state, id).await?;
    let adjustments = Fppa04CpmRepo::list_adjustments(&state.pool, cpm.id).await?;
    Ok(Json(DataResponse { data: adjustments }))
}

/// POST /api/fppa04/{id}/cpm/adjustments
pub async fn add_adjustment(
    State(state): State<AppState>,
    RequireInsurer(_auth): RequireInsurer,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<Fppa04AdjustmentInput>,
) -> AppResult<(StatusCode, Json<DataResponse<Fppa04AdjustmentCpm>>)> {
    validate_adjustment(&input)?;
    let cpm = find_variant(&state, id).await?;
    let adjustment = Fppa04CpmRepo::add_adjustment(&state.pool, cpm.id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: adjustment })))
}

/// PATCH /api/fppa04/{id}/cpm/adjustments/{adjustment_id}
pub async fn update_adjustment(
    State(state): State<AppState>,
    RequireInsurer(_auth): RequireInsurer,
    Path((id, adjustment_id)): Path<(DbId, DbId)>,
    AppJson(input): AppJson<UpdateFppa04Adjustment>,
) -> AppResult<Json<DataResponse<Fppa04AdjustmentCpm>>> {
    if let Some(ref kind) = input.adjustment_type {
        require_text("adjustmentType", kind)?;
    }
    if input.amount.is_some_and(|a| !a.is_finite()) {
        return Err(AppError::Core(CoreError::Validation(
            "amount must be a number".into(),
        )));
    }

    let cpm = find_variant(&state, id).await?;
    let adjustment = Fppa04CpmRepo::update_adjustment(&state.pool, cpm.id, adjustment_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Fppa04AdjustmentCpm",
            id: adjustment_id,
        }))?;
    Ok(Json(DataResponse { data: adjustment }))
}

/// DELETE /api/fppa04/{id}/cpm/adjustments/{adjustment_id}
pub async fn delete_adjustment(
    State(state): State<AppState>,
    RequireInsurer(_auth): RequireInsurer,
    Path((id, adjustment_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let cpm = find_variant(&state, id).await?;
    if !Fppa04CpmRepo::delete_adjustment(&state.pool, cpm.id, adjustment_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Fppa04AdjustmentCpm",
            id: adjustment_id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}
