//! Handlers for the `/claims` resource.
//!
//! Status never changes through the update endpoint; every move goes through
//! [`claimflow_core::workflow::authorize`] via `/action` or `/manager`.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use claimflow_core::error::CoreError;
use claimflow_core::roles::Role;
use claimflow_core::types::DbId;
use claimflow_core::validation::validate_category;
use claimflow_core::workflow::{self, Actor, ClaimAction, ClaimStatus};
use claimflow_db::models::attachment::{Attachment, CreateAttachment};
use claimflow_db::models::claim::{
    Claim, ClaimListParams, ClaimSummary, CreateClaim, StatusChange, UpdateClaim,
};
use claimflow_db::models::cpm_form::CpmForm;
use claimflow_db::models::fppa04::{Fppa04Detail, UpsertClaimFppa04};
use claimflow_db::models::user::User;
use claimflow_db::repositories::{
    AttachmentRepo, ClaimRepo, CpmFormRepo, Fppa04CpmRepo, Fppa04Repo, UserRepo,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::forms::{FilePart, MultipartForm};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireInsurer, RequireManager};
use crate::response::{ClaimResponse, ClaimsResponse, DataResponse};
use crate::state::AppState;
use crate::uploads::UploadFolder;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /claims`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClaimRequest {
    pub category_main: String,
    pub category_sub: String,
    pub approver_id: DbId,
    #[serde(default)]
    pub save_as_draft: bool,
}

/// Request body for `POST /claims/{id}/action` and `/manager`.
#[derive(Debug, Deserialize)]
pub struct ClaimActionRequest {
    pub action: String,
    pub comment: Option<String>,
}

/// Claim with its sub-forms, attachments, and the caller's next actions.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimDetail {
    #[serde(flatten)]
    pub claim: Claim,
    pub attachments: Vec<Attachment>,
    pub cpm_form: Option<CpmForm>,
    pub fppa04_base: Option<Fppa04Detail>,
    pub available_actions: Vec<ClaimAction>,
}

/// Response for `POST /claims/{id}/cpm`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CpmFormCreated {
    pub cpm_form: CpmForm,
    pub attachments: Vec<Attachment>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_claim(state: &AppState, id: DbId) -> AppResult<Claim> {
    ClaimRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Claim", id }))
}

async fn find_current_user(state: &AppState, auth: &AuthUser) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))
}

async fn find_approver(state: &AppState, id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Approver",
            id,
        }))
}

fn actor_for(auth: &AuthUser, claim: &Claim) -> Actor {
    Actor::for_claim(auth.user_id, auth.role, claim.created_by_id, claim.approver_id)
}

/// The creator, INSURANCE users, and MANAGER users may edit a claim's
/// header, sub-forms, and attachments.
fn ensure_can_edit(auth: &AuthUser, claim: &Claim) -> AppResult<()> {
    let allowed = auth.user_id == claim.created_by_id
        || matches!(auth.role, Role::Insurance | Role::Manager);
    if !allowed {
        return Err(AppError::Core(CoreError::Forbidden(
            "Forbidden: only the claim's creator, INSURANCE or MANAGER users may edit a claim"
                .into(),
        )));
    }
    Ok(())
}

async fn load_detail(state: &AppState, auth: &AuthUser, claim: Claim) -> AppResult<ClaimDetail> {
    let attachments = AttachmentRepo::list_for_claim(&state.pool, claim.id).await?;
    let cpm_form = CpmFormRepo::find_by_claim(&state.pool, claim.id).await?;
    let fppa04_base = match Fppa04Repo::find_by_claim(&state.pool, claim.id).await? {
        Some(base) => Some(Fppa04Repo::detail(&state.pool, base).await?),
        None => None,
    };
    let available_actions =
        workflow::available_actions(claim.claim_status()?, &actor_for(auth, &claim));

    Ok(ClaimDetail {
        claim,
        attachments,
        cpm_form,
        fppa04_base,
        available_actions,
    })
}

/// Write the form's attachment files to disk and describe the rows to
/// record. Nothing is written when any file name is unusable.
async fn save_attachment_files(
    state: &AppState,
    claim_id: DbId,
    form: &MultipartForm,
) -> AppResult<Vec<CreateAttachment>> {
    let attachments = form.attachments();
    let parts: Vec<&FilePart> = attachments.iter().map(|(_, part)| *part).collect();
    let stored = state
        .uploads
        .save_all(claim_id, UploadFolder::Attachments, &parts)
        .await?;

    Ok(attachments
        .into_iter()
        .zip(stored)
        .map(|((kind, _), file)| CreateAttachment {
            claim_id,
            file_name: file.file_name,
            url: file.url,
            attachment_type: kind,
        })
        .collect())
}

/// Remove files saved for a write that did not commit.
async fn discard_attachment_files(state: &AppState, attachments: &[CreateAttachment]) {
    state
        .uploads
        .discard(attachments.iter().map(|a| a.url.as_str()))
        .await;
}

/// Run a requested action through the workflow table and persist the result.
async fn dispatch_action(
    state: &AppState,
    auth: &AuthUser,
    claim_id: DbId,
    input: &ClaimActionRequest,
) -> AppResult<Claim> {
    let action: ClaimAction = input.action.trim().parse()?;
    let claim = find_claim(state, claim_id).await?;
    let current = claim.claim_status()?;
    let facts = ClaimRepo::workflow_facts(&state.pool, claim.id).await?;

    let transition = workflow::authorize(
        current,
        action,
        &actor_for(auth, &claim),
        state.workflow_policy(),
        facts,
    )
    .inspect_err(|e| {
        tracing::info!(
            claim_id,
            user_id = auth.user_id,
            action = %action,
            status = %current,
            error = %e,
            "Claim action refused"
        );
    })?;

    let change = StatusChange {
        status: transition.to,
        comment: workflow::normalize_comment(input.comment.as_deref()),
        stamp_submitted_at: transition.stamps_submitted_at,
    };

    let updated = ClaimRepo::apply_status(&state.pool, claim_id, &change)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Claim",
            id: claim_id,
        }))?;

    tracing::info!(
        claim_id,
        user_id = auth.user_id,
        from = %transition.from,
        to = %transition.to,
        action = %transition.action,
        "Claim status changed"
    );

    Ok(updated)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/claims?userEmail=&approverId=&status=&categoryMain=&categorySub=&excludeStatus=
///
/// Newest first, with the CPM form's `cause` pulled onto each row.
pub async fn list_claims(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<ClaimListParams>,
) -> AppResult<Json<ClaimsResponse<ClaimSummary>>> {
    for status in [&params.status, &params.exclude_status].into_iter().flatten() {
        let _: ClaimStatus = status.parse()?;
    }

    let claims = ClaimRepo::list_filtered(&state.pool, &params).await?;
    Ok(Json(ClaimsResponse { claims }))
}

/// POST /api/claims
///
/// The bearer is the creator. Starts in `DRAFT` when `saveAsDraft` is set,
/// otherwise as if submitted.
pub async fn create_claim(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(input): AppJson<CreateClaimRequest>,
) -> AppResult<(StatusCode, Json<ClaimResponse<Claim>>)> {
    let category_main = validate_category("categoryMain", &input.category_main)?;
    let category_sub = validate_category("categorySub", &input.category_sub)?;

    let creator = find_current_user(&state, &auth).await?;
    let approver = find_approver(&state, input.approver_id).await?;

    let claim = ClaimRepo::create(
        &state.pool,
        &CreateClaim {
            category_main,
            category_sub,
            status: ClaimStatus::initial(input.save_as_draft, state.workflow_policy()),
            created_by_id: creator.id,
            created_by_name: creator.name,
            approver_id: approver.id,
            approver_name: approver.name,
        },
    )
    .await?;

    tracing::info!(
        claim_id = claim.id,
        user_id = auth.user_id,
        status = %claim.status,
        "Claim created"
    );

    Ok((StatusCode::CREATED, Json(ClaimResponse { claim })))
}

/// GET /api/claims/{id}
pub async fn get_claim(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ClaimResponse<ClaimDetail>>> {
    let claim = find_claim(&state, id).await?;
    let detail = load_detail(&state, &auth, claim).await?;
    Ok(Json(ClaimResponse { claim: detail }))
}

/// PUT /api/claims/{id}
///
/// Multipart patch: `categoryMain`, `categorySub`, `approverId`, `cause`, plus
/// `damageFiles` / `estimateFiles` / `otherFiles` / `userConfirmFiles`.
pub async fn update_claim(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<Json<ClaimResponse<ClaimDetail>>> {
    let claim = find_claim(&state, id).await?;
    ensure_can_edit(&auth, &claim)?;

    let form = MultipartForm::read(&mut multipart).await?;
    let patch = form.claim_patch()?;

    let approver = match patch.approver_id {
        Some(approver_id) => {
            let approver = find_approver(&state, approver_id).await?;
            Some((approver.id, approver.name))
        }
        None => None,
    };

    let attachments = save_attachment_files(&state, id, &form).await?;
    let update = UpdateClaim {
        category_main: patch.category_main,
        category_sub: patch.category_sub,
        approver,
        cause: patch.cause,
        attachments,
    };

    let claim = if update.is_empty() {
        claim
    } else {
        let written = ClaimRepo::update(&state.pool, id, &update).await;
        if !matches!(written, Ok(Some(_))) {
            discard_attachment_files(&state, &update.attachments).await;
        }
        written?.ok_or(AppError::Core(CoreError::NotFound { entity: "Claim", id }))?
    };

    tracing::info!(
        claim_id = id,
        user_id = auth.user_id,
        attachments = update.attachments.len(),
        "Claim updated"
    );

    let detail = load_detail(&state, &auth, claim).await?;
    Ok(Json(ClaimResponse { claim: detail }))
}

/// POST /api/claims/{id}/action
///
/// Any workflow action; who may take it is decided by the transition table.
pub async fn claim_action(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<ClaimActionRequest>,
) -> AppResult<Json<ClaimResponse<Claim>>> {
    let claim = dispatch_action(&state, &auth, id, &input).await?;
    Ok(Json(ClaimResponse { claim }))
}

/// POST /api/claims/{id}/manager
///
/// Same dispatch as `/action`, reachable only by MANAGER users.
pub async fn manager_action(
    State(state): State<AppState>,
    RequireManager(auth): RequireManager,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<ClaimActionRequest>,
) -> AppResult<Json<ClaimResponse<Claim>>> {
    let claim = dispatch_action(&state, &auth, id, &input).await?;
    Ok(Json(ClaimResponse { claim }))
}

/// POST /api/claims/{id}/cpm
///
/// Multipart CPM detail fields plus optional attachment files. A claim has at
/// most one CPM form.
pub async fn create_cpm_form(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<CpmFormCreated>)> {
    let claim = find_claim(&state, id).await?;
    ensure_can_edit(&auth, &claim)?;

    if CpmFormRepo::find_by_claim(&state.pool, id).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "Claim already has a CPM form".into(),
        )));
    }

    let form = MultipartForm::read(&mut multipart).await?;
    let input = form.cpm_form()?;

    let files = save_attachment_files(&state, id, &form).await?;
    let created = CpmFormRepo::create_with_attachments(&state.pool, id, &input, &files).await;
    if created.is_err() {
        discard_attachment_files(&state, &files).await;
    }
    let (cpm_form, attachments) = created?;

    tracing::info!(claim_id = id, user_id = auth.user_id, "CPM form created");

    Ok((
        StatusCode::CREATED,
        Json(CpmFormCreated {
            cpm_form,
            attachments,
        }),
    ))
}

/// POST /api/claims/{id}/fppa04
///
/// Create or fully replace the claim's FPPA04 base and CPM variant.
pub async fn upsert_claim_fppa04(
    State(state): State<AppState>,
    RequireInsurer(auth): RequireInsurer,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpsertClaimFppa04>,
) -> AppResult<Json<DataResponse<Fppa04Detail>>> {
    find_claim(&state, id).await?;
    super::fppa04::validate_upsert(&input.cpm)?;
    let input = UpsertClaimFppa04 {
        category_main: validate_category("categoryMain", &input.category_main)?,
        category_sub: validate_category("categorySub", &input.category_sub)?,
        cpm: input.cpm,
    };

    let detail = Fppa04CpmRepo::upsert_for_claim(&state.pool, id, &input).await?;

    tracing::info!(
        claim_id = id,
        user_id = auth.user_id,
        items = input.cpm.items.len(),
        adjustments = input.cpm.adjustments.len(),
        "FPPA04 form saved"
    );

    Ok(Json(DataResponse { data: detail }))
}

/// DELETE /api/claims/{id}/attachments/{attachment_id}
///
/// Removes the attachment row and its stored file.
pub async fn delete_attachment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, attachment_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let claim = find_claim(&state, id).await?;
    ensure_can_edit(&auth, &claim)?;

    let attachment = AttachmentRepo::find_for_claim(&state.pool, id, attachment_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Attachment",
            id: attachment_id,
        }))?;

    AttachmentRepo::delete(&state.pool, attachment.id).await?;
    state.uploads.remove_by_url(&attachment.url).await?;

    tracing::info!(
        claim_id = id,
        attachment_id,
        user_id = auth.user_id,
        "Attachment deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}
