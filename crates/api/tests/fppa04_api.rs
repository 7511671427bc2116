//! HTTP-level integration tests for the FPPA04 settlement form and the tail
//! of the claim workflow that depends on it.

mod common;

use axum::http::{Method, StatusCode};
use claimflow_db::models::fppa04::CreateFppa04Base;
use claimflow_db::repositories::Fppa04Repo;
use common::{
    body_json, delete_auth, get_auth, multipart_auth, patch_json_auth, post_json_auth, seed_user,
    token_for, Part,
};
use serde_json::json;
use sqlx::PgPool;

struct Cast {
    alice: String,
    ian: String,
    mona: String,
    claim_id: i64,
}

/// Seed a creator, approver, insurer and manager plus one submitted claim.
async fn setup(pool: &PgPool) -> Cast {
    let alice = seed_user(pool, "Alice", "USER").await;
    let bob = seed_user(pool, "Bob", "USER").await;
    let ian = seed_user(pool, "Ian", "INSURANCE").await;
    let mona = seed_user(pool, "Mona", "MANAGER").await;

    let app = common::build_test_app(pool.clone());
    let body = json!({
        "categoryMain": "Vehicle",
        "categorySub": "Collision",
        "approverId": bob.id,
    });
    let response = post_json_auth(app, "/api/claims", &token_for(&alice), body).await;
    let claim_id = body_json(response).await["claim"]["id"].as_i64().unwrap();

    Cast {
        alice: token_for(&alice),
        ian: token_for(&ian),
        mona: token_for(&mona),
        claim_id,
    }
}

fn upsert_body(items: &[(&str, f64)]) -> serde_json::Value {
    let items: Vec<_> = items
        .iter()
        .map(|(category, amount)| json!({ "category": category, "damageAmount": amount }))
        .collect();
    json!({
        "categoryMain": "Vehicle",
        "categorySub": "Collision",
        "eventType": "Accident",
        "accidentDate": "2026-03-14",
        "policyNumber": "POL-77",
        "netAmount": 900.0,
        "items": items,
        "adjustments": [
            { "adjustmentType": "Deductible", "amount": -100.0 }
        ],
    })
}

async fn upsert_for_claim(
    pool: &PgPool,
    cast: &Cast,
    body: serde_json::Value,
) -> axum::response::Response {
    let app = common::build_test_app(pool.clone());
    post_json_auth(
        app,
        &format!("/api/claims/{}/fppa04", cast.claim_id),
        &cast.ian,
        body,
    )
    .await
}

async fn act(pool: &PgPool, token: &str, uri: String, action: &str) -> axum::response::Response {
    let app = common::build_test_app(pool.clone());
    post_json_auth(app, &uri, token, json!({ "action": action })).await
}

// ---------------------------------------------------------------------------
// Claim-scoped upsert
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn claim_upsert_creates_then_replaces_items(pool: PgPool) {
    let cast = setup(&pool).await;

    let body = upsert_body(&[("Bumper", 500.0), ("Door", 400.0)]);
    let response = upsert_for_claim(&pool, &cast, body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let first = body_json(response).await;
    assert_eq!(first["data"]["claimId"], cast.claim_id);
    assert_eq!(first["data"]["cpm"]["policyNumber"], "POL-77");
    assert_eq!(first["data"]["cpm"]["items"].as_array().unwrap().len(), 2);

    let response = upsert_for_claim(
        &pool,
        &cast,
        upsert_body(&[("Hood", 300.0), ("Mirror", 50.0), ("Light", 75.0)]),
    )
    .await;
    let second = body_json(response).await;

    assert_eq!(second["data"]["id"], first["data"]["id"]);
    let categories: Vec<&str> = second["data"]["cpm"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["category"].as_str().unwrap())
        .collect();
    assert_eq!(categories, vec!["Hood", "Mirror", "Light"]);
    assert_eq!(second["data"]["cpm"]["adjustments"][0]["amount"], -100.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn claim_upsert_requires_insurer(pool: PgPool) {
    let cast = setup(&pool).await;

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        &format!("/api/claims/{}/fppa04", cast.claim_id),
        &cast.alice,
        upsert_body(&[]),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn claim_upsert_rejects_negative_item_amount(pool: PgPool) {
    let cast = setup(&pool).await;

    let response = upsert_for_claim(&pool, &cast, upsert_body(&[("Bumper", -5.0)])).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Base and variant routes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_base_for_claim_conflicts(pool: PgPool) {
    let cast = setup(&pool).await;
    let body = json!({
        "claimId": cast.claim_id,
        "categoryMain": "Vehicle",
        "categorySub": "Collision",
    });

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/fppa04", &cast.ian, body.clone()).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool);
    let response = post_json_auth(app, "/api/fppa04", &cast.ian, body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Claim already has an FPPA04 form");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn base_for_missing_claim_returns_404(pool: PgPool) {
    let cast = setup(&pool).await;
    let app = common::build_test_app(pool);

    let body = json!({ "claimId": 999_999, "categoryMain": "A", "categorySub": "B" });
    let response = post_json_auth(app, "/api/fppa04", &cast.ian, body).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn item_routes_manage_single_rows(pool: PgPool) {
    let cast = setup(&pool).await;
    let response = upsert_for_claim(&pool, &cast, upsert_body(&[("Bumper", 500.0)])).await;
    let base_id = body_json(response).await["data"]["id"].as_i64().unwrap();
    let items_uri = format!("/api/fppa04/{base_id}/cpm/items");

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &items_uri,
        &cast.ian,
        json!({ "category": "Tyre", "description": "Front left", "damageAmount": 120.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let added = body_json(response).await;
    let item_id = added["data"]["id"].as_i64().unwrap();
    assert_eq!(added["data"]["sortOrder"], 1);

    let app = common::build_test_app(pool.clone());
    let response = patch_json_auth(
        app,
        &format!("{items_uri}/{item_id}"),
        &cast.ian,
        json!({ "damageAmount": 150.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["data"]["damageAmount"], 150.0);
    assert_eq!(updated["data"]["category"], "Tyre");

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &format!("{items_uri}/{item_id}"), &cast.ian).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &format!("{items_uri}/{item_id}"), &cast.ian).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let app = common::build_test_app(pool);
    let response = get_auth(app, &items_uri, &cast.alice).await;
    let json = body_json(response).await;
    let items = json["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["category"], "Bumper");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn item_routes_need_a_variant(pool: PgPool) {
    let cast = setup(&pool).await;
    let app = common::build_test_app(pool.clone());
    let body = json!({
        "claimId": cast.claim_id,
        "categoryMain": "Vehicle",
        "categorySub": "Collision",
    });
    let response = post_json_auth(app, "/api/fppa04", &cast.ian, body).await;
    let base_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool);
    let response = get_auth(app, &format!("/api/fppa04/{base_id}/cpm/items"), &cast.ian).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Full workflow through signatures
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn claim_completes_once_signatures_are_on_file(pool: PgPool) {
    let cast = setup(&pool).await;
    let config = common::test_config();
    let action_uri = format!("/api/claims/{}/action", cast.claim_id);
    let manager_uri = format!("/api/claims/{}/manager", cast.claim_id);

    let response = act(&pool, &cast.ian, action_uri.clone(), "approve").await;
    assert_eq!(body_json(response).await["claim"]["status"], "PENDING_INSURER_FORM");

    let response = upsert_for_claim(&pool, &cast, upsert_body(&[("Bumper", 500.0)])).await;
    let base_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = act(&pool, &cast.ian, action_uri.clone(), "submit_form").await;
    assert_eq!(body_json(response).await["claim"]["status"], "PENDING_MANAGER_REVIEW");

    let response = act(&pool, &cast.mona, manager_uri, "approve").await;
    assert_eq!(body_json(response).await["claim"]["status"], "PENDING_USER_CONFIRM");

    let response = act(&pool, &cast.alice, action_uri.clone(), "confirm").await;
    assert_eq!(body_json(response).await["claim"]["status"], "AWAITING_SIGNATURES");

    let response = act(&pool, &cast.alice, action_uri.clone(), "complete").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let app = common::build_test_app_with(pool.clone(), config.clone());
    let response = multipart_auth(
        app,
        Method::POST,
        &format!("/api/fppa04/{base_id}/cpm/signatures"),
        &cast.alice,
        &[Part::File("files", "signed.png", b"png-bytes")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(
        json["data"]["signatureFiles"],
        json!([format!("/uploads/claims/{}/signatures/signed.png", cast.claim_id)])
    );

    let response = act(&pool, &cast.alice, action_uri, "complete").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["claim"]["status"], "COMPLETED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn confirm_with_signatures_completes_directly(pool: PgPool) {
    let cast = setup(&pool).await;
    let action_uri = format!("/api/claims/{}/action", cast.claim_id);

    act(&pool, &cast.ian, action_uri.clone(), "approve").await;
    let mut body = upsert_body(&[("Bumper", 500.0)]);
    body["signatureFiles"] = json!(["/uploads/claims/1/pre-signed.png"]);
    upsert_for_claim(&pool, &cast, body).await;
    act(&pool, &cast.ian, action_uri.clone(), "submit_form").await;
    act(
        &pool,
        &cast.mona,
        format!("/api/claims/{}/manager", cast.claim_id),
        "approve",
    )
    .await;

    let response = act(&pool, &cast.alice, action_uri, "confirm").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["claim"]["status"], "COMPLETED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn signature_upload_without_files_is_rejected(pool: PgPool) {
    let cast = setup(&pool).await;
    let response = upsert_for_claim(&pool, &cast, upsert_body(&[])).await;
    let base_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool);
    let response = multipart_auth(
        app,
        Method::POST,
        &format!("/api/fppa04/{base_id}/cpm/signatures"),
        &cast.alice,
        &[Part::Text("note", "no files here")],
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn signature_upload_without_variant_writes_nothing(pool: PgPool) {
    let cast = setup(&pool).await;
    let base = Fppa04Repo::create(
        &pool,
        &CreateFppa04Base {
            claim_id: cast.claim_id,
            category_main: "Vehicle".into(),
            category_sub: "Collision".into(),
        },
    )
    .await
    .unwrap();
    let config = common::test_config();

    let app = common::build_test_app_with(pool, config.clone());
    let response = multipart_auth(
        app,
        Method::POST,
        &format!("/api/fppa04/{}/cpm/signatures", base.id),
        &cast.alice,
        &[Part::File("files", "signed.png", b"png-bytes")],
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let claim_dir = common::upload_root(&config)
        .join("claims")
        .join(cast.claim_id.to_string());
    assert!(!claim_dir.exists());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleting_attachment_keeps_signature_with_same_name(pool: PgPool) {
    let cast = setup(&pool).await;
    let config = common::test_config();
    let response = upsert_for_claim(&pool, &cast, upsert_body(&[])).await;
    let base_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app_with(pool.clone(), config.clone());
    let response = multipart_auth(
        app,
        Method::POST,
        &format!("/api/fppa04/{base_id}/cpm/signatures"),
        &cast.alice,
        &[Part::File("files", "scan.pdf", b"signature")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app_with(pool.clone(), config.clone());
    let response = multipart_auth(
        app,
        Method::POST,
        &format!("/api/claims/{}/cpm", cast.claim_id),
        &cast.alice,
        &[Part::File("otherFiles", "scan.pdf", b"attachment")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let attachment_id = body_json(response).await["attachments"][0]["id"]
        .as_i64()
        .unwrap();

    let app = common::build_test_app_with(pool, config.clone());
    let response = delete_auth(
        app,
        &format!("/api/claims/{}/attachments/{attachment_id}", cast.claim_id),
        &cast.alice,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let claim_dir = common::upload_root(&config)
        .join("claims")
        .join(cast.claim_id.to_string());
    assert!(!claim_dir.join("attachments").join("scan.pdf").exists());
    let signature = std::fs::read(claim_dir.join("signatures").join("scan.pdf")).unwrap();
    assert_eq!(signature, b"signature");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn manager_rejection_returns_claim_to_insurer(pool: PgPool) {
    let cast = setup(&pool).await;
    let action_uri = format!("/api/claims/{}/action", cast.claim_id);

    act(&pool, &cast.ian, action_uri.clone(), "approve").await;
    upsert_for_claim(&pool, &cast, upsert_body(&[("Bumper", 500.0)])).await;
    act(&pool, &cast.ian, action_uri, "submit_form").await;

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        &format!("/api/claims/{}/manager", cast.claim_id),
        &cast.mona,
        json!({ "action": "reject", "comment": "amount too high" }),
    )
    .await;

    let json = body_json(response).await;
    assert_eq!(json["claim"]["status"], "PENDING_INSURER_REVIEW");
    assert_eq!(json["claim"]["insurerComment"], "amount too high");
}
