//! Route definitions for the `/claims` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::claims;
use crate::state::AppState;

/// Routes mounted at `/claims`.
///
/// ```text
/// GET    /                                  -> list_claims
/// POST   /                                  -> create_claim
/// GET    /{id}                              -> get_claim
/// PUT    /{id}                              -> update_claim
/// POST   /{id}/action                       -> claim_action
/// POST   /{id}/manager                      -> manager_action
/// POST   /{id}/cpm                          -> create_cpm_form
/// POST   /{id}/fppa04                       -> upsert_claim_fppa04
/// DELETE /{id}/attachments/{attachment_id}  -> delete_attachment
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(claims::list_claims).post(claims::create_claim))
        .route("/{id}", get(claims::get_claim).put(claims::update_claim))
        .route("/{id}/action", post(claims::claim_action))
        .route("/{id}/manager", post(claims::manager_action))
        .route("/{id}/cpm", post(claims::create_cpm_form))
        .route("/{id}/fppa04", post(claims::upsert_claim_fppa04))
        .route(
            "/{id}/attachments/{attachment_id}",
            delete(claims::delete_attachment),
        )
}
