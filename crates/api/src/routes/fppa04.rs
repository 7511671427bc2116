//! Route definitions for the `/fppa04` resource.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::fppa04;
use crate::state::AppState;

/// Routes mounted at `/fppa04`.
///
/// ```text
/// POST         /                                    -> create_base
/// GET, PATCH   /{id}                                -> get_fppa04, update_base
/// POST, PATCH  /{id}/cpm                            -> upsert_cpm
/// POST         /{id}/cpm/signatures                 -> upload_signatures
/// GET, POST    /{id}/cpm/items                      -> list_items, add_item
/// PATCH, DELETE /{id}/cpm/items/{item_id}           -> update_item, delete_item
/// GET, POST    /{id}/cpm/adjustments                -> list_adjustments, add_adjustment
/// PATCH, DELETE /{id}/cpm/adjustments/{adjustment_id} -> update_adjustment, delete_adjustment
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(fppa04::create_base))
        .route("/{id}", get(fppa04::get_fppa04).patch(fppa04::update_base))
        .route(
            "/{id}/cpm",
            post(fppa04::upsert_cpm).patch(fppa04::upsert_cpm),
        )
        .route("/{id}/cpm/signatures", post(fppa04::upload_signatures))
        .route(
            "/{id}/cpm/items",
            get(fppa04::list_items).post(fppa04::add_item),
        )
        .route(
            "/{id}/cpm/items/{item_id}",
            patch(fppa04::update_item).delete(fppa04::delete_item),
        )
        .route(
            "/{id}/cpm/adjustments",
            get(fppa04::list_adjustments).post(fppa04::add_adjustment),
        )
        .route(
            "/{id}/cpm/adjustments/{adjustment_id}",
            patch(fppa04::update_adjustment).delete(fppa04::delete_adjustment),
        )
}
