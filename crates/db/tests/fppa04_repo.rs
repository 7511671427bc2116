//! Integration tests for the FPPA04 base and CPM variant repositories.

use claimflow_core::workflow::ClaimStatus;
use claimflow_db::models::claim::{Claim, CreateClaim};
use claimflow_db::models::fppa04::{
    CreateFppa04Base, Fppa04AdjustmentInput, Fppa04ItemInput, UpdateFppa04Item,
    UpsertClaimFppa04, UpsertFppa04Cpm,
};
use claimflow_db::models::user::CreateUser;
use claimflow_db::repositories::{ClaimRepo, Fppa04CpmRepo, Fppa04Repo, UserRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_claim(pool: &PgPool) -> Claim {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            role: "USER".to_string(),
            position: None,
            password_hash: "not-a-real-hash".to_string(),
        },
    )
    .await
    .unwrap();

    ClaimRepo::create(
        pool,
        &CreateClaim {
            category_main: "CPM".to_string(),
            category_sub: "Vehicle".to_string(),
            status: ClaimStatus::PendingInsurerForm,
            created_by_id: user.id,
            created_by_name: user.name.clone(),
            approver_id: user.id,
            approver_name: user.name,
        },
    )
    .await
    .unwrap()
}

fn item(category: &str, amount: f64) -> Fppa04ItemInput {
    Fppa04ItemInput {
        category: category.to_string(),
        description: None,
        damage_amount: amount,
    }
}

fn adjustment(kind: &str, amount: f64) -> Fppa04AdjustmentInput {
    Fppa04AdjustmentInput {
        adjustment_type: kind.to_string(),
        description: None,
        amount,
    }
}

fn payload(items: Vec<Fppa04ItemInput>) -> UpsertFppa04Cpm {
    UpsertFppa04Cpm {
        event_type: Some("Collision".to_string()),
        policy_number: Some("POL-001".to_string()),
        net_amount: 950.0,
        items,
        adjustments: vec![adjustment("Deductible", -50.0)],
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Test: base
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_base_create_update_and_uniqueness(pool: PgPool) {
    let claim = seed_claim(&pool).await;
    let input = CreateFppa04Base {
        claim_id: claim.id,
        category_main: "CPM".to_string(),
        category_sub: "Vehicle".to_string(),
    };

    let base = Fppa04Repo::create(&pool, &input).await.unwrap();
    assert_eq!(base.claim_id, claim.id);

    let found = Fppa04Repo::find_by_claim(&pool, claim.id)
        .await
        .unwrap()
        .expect("base should exist");
    assert_eq!(found.id, base.id);

    let updated = Fppa04Repo::update(
        &pool,
        base.id,
        &claimflow_db::models::fppa04::UpdateFppa04Base {
            category_sub: Some("Building".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.category_main, "CPM");
    assert_eq!(updated.category_sub, "Building");

    let err = Fppa04Repo::create(&pool, &input).await.unwrap_err();
    match err {
        sqlx::Error::Database(db_err) => {
            assert_eq!(db_err.constraint(), Some("uq_fppa04_bases_claim_id"));
        }
        other => panic!("expected a database error, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Test: upsert replaces children
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_upsert_replaces_all_items_in_payload_order(pool: PgPool) {
    let claim = seed_claim(&pool).await;
    let request = UpsertClaimFppa04 {
        category_main: "CPM".to_string(),
        category_sub: "Vehicle".to_string(),
        cpm: payload(vec![item("Bumper", 400.0), item("Door", 300.0), item("Glass", 300.0)]),
    };
    let first = Fppa04CpmRepo::upsert_for_claim(&pool, claim.id, &request)
        .await
        .unwrap();
    let first_cpm = first.cpm.expect("variant should be created");
    assert_eq!(first_cpm.items.len(), 3);

    let second = Fppa04CpmRepo::upsert(
        &pool,
        first.base.id,
        &payload(vec![item("Headlight", 120.0), item("Bonnet", 80.5)]),
    )
    .await
    .unwrap();
    assert_eq!(second.cpm.id, first_cpm.cpm.id, "variant row is reused");

    let stored = Fppa04CpmRepo::list_items(&pool, second.cpm.id).await.unwrap();
    assert_eq!(stored.len(), 2, "prior items are fully replaced");
    assert_eq!(stored[0].category, "Headlight");
    assert_eq!(stored[0].damage_amount, 120.0);
    assert_eq!(stored[1].category, "Bonnet");
    assert_eq!(stored[1].damage_amount, 80.5);

    let adjustments = Fppa04CpmRepo::list_adjustments(&pool, second.cpm.id)
        .await
        .unwrap();
    assert_eq!(adjustments.len(), 1);

    let facts = ClaimRepo::workflow_facts(&pool, claim.id).await.unwrap();
    assert!(facts.has_fppa04_form);
    assert!(!facts.signatures_on_file);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_upsert_without_signature_list_keeps_signatures(pool: PgPool) {
    let claim = seed_claim(&pool).await;
    let base = Fppa04Repo::create(
        &pool,
        &CreateFppa04Base {
            claim_id: claim.id,
            category_main: "CPM".to_string(),
            category_sub: "Vehicle".to_string(),
        },
    )
    .await
    .unwrap();

    Fppa04CpmRepo::upsert(&pool, base.id, &payload(vec![]))
        .await
        .unwrap();
    let signed = Fppa04CpmRepo::append_signatures(
        &pool,
        base.id,
        &["/uploads/claims/1/sig.png".to_string()],
    )
    .await
    .unwrap()
    .expect("variant exists");
    assert_eq!(signed.signature_files.len(), 1);

    let resaved = Fppa04CpmRepo::upsert(&pool, base.id, &payload(vec![item("Door", 10.0)]))
        .await
        .unwrap();
    assert_eq!(resaved.cpm.signature_files, signed.signature_files);

    let facts = ClaimRepo::workflow_facts(&pool, claim.id).await.unwrap();
    assert!(facts.signatures_on_file);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_append_signatures_without_variant(pool: PgPool) {
    let claim = seed_claim(&pool).await;
    let base = Fppa04Repo::create(
        &pool,
        &CreateFppa04Base {
            claim_id: claim.id,
            category_main: "CPM".to_string(),
            category_sub: "Vehicle".to_string(),
        },
    )
    .await
    .unwrap();

    let result = Fppa04CpmRepo::append_signatures(&pool, base.id, &["x".to_string()])
        .await
        .unwrap();
    assert!(result.is_none());
}

// ---------------------------------------------------------------------------
// Test: item CRUD
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_item_crud_appends_at_end(pool: PgPool) {
    let claim = seed_claim(&pool).await;
    let request = UpsertClaimFppa04 {
        category_main: "CPM".to_string(),
        category_sub: "Vehicle".to_string(),
        cpm: payload(vec![item("Bumper", 400.0)]),
    };
    let detail = Fppa04CpmRepo::upsert_for_claim(&pool, claim.id, &request)
        .await
        .unwrap();
    let cpm_id = detail.cpm.unwrap().cpm.id;

    let added = Fppa04CpmRepo::add_item(&pool, cpm_id, &item("Mirror", 75.0))
        .await
        .unwrap();
    assert_eq!(added.sort_order, 1);

    let updated = Fppa04CpmRepo::update_item(
        &pool,
        cpm_id,
        added.id,
        &UpdateFppa04Item {
            damage_amount: Some(90.0),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.category, "Mirror");
    assert_eq!(updated.damage_amount, 90.0);

    assert!(Fppa04CpmRepo::delete_item(&pool, cpm_id, added.id).await.unwrap());
    assert!(!Fppa04CpmRepo::delete_item(&pool, cpm_id, added.id).await.unwrap());

    let remaining = Fppa04CpmRepo::list_items(&pool, cpm_id).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].category, "Bumper");
}
