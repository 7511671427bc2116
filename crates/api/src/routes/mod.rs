pub mod auth;
pub mod claims;
pub mod fppa04;
pub mod health;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                      login (public)
/// /auth/me                                         current user
///
/// /users                                           list (?role=)
///
/// /claims                                          list, create
/// /claims/{id}                                     get, update (multipart)
/// /claims/{id}/action                              workflow action
/// /claims/{id}/manager                             workflow action (MANAGER only)
/// /claims/{id}/cpm                                 create CPM form (multipart)
/// /claims/{id}/fppa04                              upsert FPPA04 base + CPM variant
/// /claims/{id}/attachments/{attachment_id}         delete
///
/// /fppa04                                          create base
/// /fppa04/{id}                                     get, update base
/// /fppa04/{id}/cpm                                 upsert CPM variant (POST, PATCH)
/// /fppa04/{id}/cpm/signatures                      add signature files (multipart)
/// /fppa04/{id}/cpm/items                           list, create
/// /fppa04/{id}/cpm/items/{item_id}                 update, delete
/// /fppa04/{id}/cpm/adjustments                     list, create
/// /fppa04/{id}/cpm/adjustments/{adjustment_id}     update, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/claims", claims::router())
        .nest("/fppa04", fppa04::router())
}
