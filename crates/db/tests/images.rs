//! Repository tests for image moderation and duplicate marking.

use chrono::Utc;
use estate_core::duplicates::group_duplicates;
use estate_core::moderation::{ImageStatus, ModerationAction};
use estate_core::types::{DbId, Money};
use estate_db::models::image::CreateImage;
use estate_db::models::property::CreateProperty;
use estate_db::models::user::CreateUser;
use estate_db::repositories::{ImageRepo, PropertyRepo, UserRepo};
use sqlx::PgPool;

async fn property(pool: &PgPool) -> DbId {
    let owner = UserRepo::create(
        pool,
        &CreateUser {
            username: "owner".to_string(),
            email: "owner@example.com".to_string(),
            password_hash: "hash".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            phone_number: None,
            address: None,
            user_type: "broker".to_string(),
            agree_terms: true,
            terms_accepted_at: None,
        },
    )
    .await
    .unwrap();

    PropertyRepo::create(
        pool,
        &CreateProperty {
            owner_id: owner.id,
            title: "House".to_string(),
            description: String::new(),
            property_type: "House".to_string(),
            address: "Ward 4".to_string(),
            city: "Dharan".to_string(),
            state: "Koshi".to_string(),
            zip_code: "56700".to_string(),
            country: None,
            price: Money::from(100),
            square_footage: None,
            lot_size: None,
            year_built: None,
            zoning: None,
            status: "for_sale".to_string(),
            cap_rate: None,
            noi: None,
            broker_name: None,
            broker_phone: None,
            broker_email: None,
            virtual_tour_url: None,
        },
    )
    .await
    .unwrap()
    .id
}

fn image(property_id: DbId, path: &str, hash: &str) -> CreateImage {
    CreateImage {
        property_id,
        file_path: path.to_string(),
        caption: None,
        content_hash: Some(hash.to_string()),
        is_duplicate: false,
        duplicate_of: None,
        file_size: Some(50_000),
        width: Some(800),
        height: Some(600),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_three_identical_hashes_point_at_first(pool: PgPool) {
    let pid = property(&pool).await;
    let a = ImageRepo::create(&pool, &image(pid, "a.jpg", "h1")).await.unwrap();
    let b = ImageRepo::create(&pool, &image(pid, "b.jpg", "h1")).await.unwrap();
    let c = ImageRepo::create(&pool, &image(pid, "c.jpg", "h1")).await.unwrap();

    let marks = group_duplicates(&ImageRepo::list_hashes(&pool).await.unwrap());
    assert_eq!(ImageRepo::apply_duplicate_marks(&pool, &marks).await.unwrap(), 2);
    assert_eq!(ImageRepo::apply_duplicate_marks(&pool, &marks).await.unwrap(), 0);

    for id in [b.id, c.id] {
        let img = ImageRepo::find_by_id(&pool, id).await.unwrap().unwrap();
        assert!(img.is_duplicate);
        assert_eq!(img.duplicate_of, Some(a.id));
    }
    let master = ImageRepo::find_by_id(&pool, a.id).await.unwrap().unwrap();
    assert!(!master.is_duplicate);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_moderation_round_trips_through_columns(pool: PgPool) {
    let pid = property(&pool).await;
    let img = ImageRepo::create(&pool, &image(pid, "x.jpg", "h2")).await.unwrap();
    let now = Utc::now();

    let flagged = img
        .moderation_state()
        .unwrap()
        .apply(&ModerationAction::Flag { reason: Some("blurry".into()) }, None, now)
        .unwrap();
    let deleted = flagged
        .apply(&ModerationAction::SoftDelete { reason: None }, None, now)
        .unwrap();
    let saved = ImageRepo::save_moderation(&pool, img.id, &deleted)
        .await
        .unwrap()
        .unwrap();

    let state = saved.moderation_state().unwrap();
    assert_eq!(state.status, ImageStatus::Deleted);
    assert_eq!(state.status_before_delete, Some(ImageStatus::Flagged));
    assert_eq!(state.flag_reason.as_deref(), Some("blurry"));

    let listed = ImageRepo::list_for_property(&pool, pid, false).await.unwrap();
    assert!(listed.is_empty());

    let stats = ImageRepo::stats(&pool).await.unwrap();
    assert_eq!(stats.total_images, 1);
    assert_eq!(stats.deleted_images, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_scan_limit_skips_reviewed_images(pool: PgPool) {
    let pid = property(&pool).await;
    let now = Utc::now();
    let mut ids = Vec::new();
    for (path, hash) in [("r1.jpg", "h3"), ("r2.jpg", "h4"), ("new.jpg", "h5")] {
        ids.push(ImageRepo::create(&pool, &image(pid, path, hash)).await.unwrap().id);
    }
    for &id in &ids[..2] {
        let img = ImageRepo::find_by_id(&pool, id).await.unwrap().unwrap();
        let rejected = img
            .moderation_state()
            .unwrap()
            .apply(&ModerationAction::Reject { reason: None }, None, now)
            .unwrap();
        ImageRepo::save_moderation(&pool, id, &rejected).await.unwrap().unwrap();
    }

    let scannable = ImageRepo::list_scannable(&pool, Some(2)).await.unwrap();
    let scanned: Vec<DbId> = scannable.iter().map(|img| img.id).collect();
    assert_eq!(scanned, vec![ids[2]]);
    assert_eq!(scannable[0].moderation_state().unwrap().status, ImageStatus::Pending);
}
