//! Premium purchase flow through the router against a real database.
//!
//! The gateway is seeded through `ServerConfig::payment_seed`, so every
//! charge decision below is reproducible.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{body_json, build_test_app_with, post_json_auth, test_config, token_for};
use estate_core::payment::{PaymentMethod, SimulatedGateway};
use estate_core::premium::PlanType;
use estate_core::types::{DbId, Money};
use estate_db::models::promo_code::CreatePromoCode;
use estate_db::models::property::CreateProperty;
use estate_db::models::user::CreateUser;
use estate_db::repositories::{
    EmailNotificationRepo, PremiumListingRepo, PromoCodeRepo, PropertyRepo, UserRepo,
};
use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;

const CHECKOUT: &str = "/api/v1/premium/checkout";

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A broker owning one property. Returns `(user_id, property_id)`.
async fn broker_with_property(pool: &PgPool) -> (DbId, DbId) {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: "anita".to_string(),
            email: "anita@example.com".to_string(),
            password_hash: "hash".to_string(),
            first_name: "Anita".to_string(),
            last_name: "Rai".to_string(),
            phone_number: None,
            address: None,
            user_type: "broker".to_string(),
            agree_terms: true,
            terms_accepted_at: Some(Utc::now()),
        },
    )
    .await
    .unwrap();

    let property = PropertyRepo::create(
        pool,
        &CreateProperty {
            owner_id: user.id,
            title: "Hillside cottage".to_string(),
            description: String::new(),
            property_type: "House".to_string(),
            address: "Ward 9".to_string(),
            city: "Pokhara".to_string(),
            state: "Gandaki".to_string(),
            zip_code: "33700".to_string(),
            country: None,
            price: Money::from(7_500_000),
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
    .unwrap();

    (user.id, property.id)
}

async fn promo(pool: &PgPool, code: &str) {
    let now = Utc::now();
    PromoCodeRepo::create(
        pool,
        &CreatePromoCode {
            code: code.to_string(),
            discount_type: "percentage".to_string(),
            discount_value: Decimal::from(20),
            valid_from: now - Duration::days(1),
            valid_until: now + Duration::days(30),
            max_uses: Some(5),
            created_by: None,
        },
    )
    .await
    .unwrap();
}

async fn times_used(pool: &PgPool, code: &str) -> i32 {
    PromoCodeRepo::find_by_code(pool, code)
        .await
        .unwrap()
        .unwrap()
        .times_used
}

async fn is_premium(pool: &PgPool, property_id: DbId) -> bool {
    PropertyRepo::find_by_id(pool, property_id)
        .await
        .unwrap()
        .unwrap()
        .is_premium
}

/// First seed whose opening `qr_payment` draw is declined.
fn declining_seed() -> u64 {
    (0..10_000)
        .find(|&seed| {
            !SimulatedGateway::new(Some(seed))
                .charge(PaymentMethod::QrPayment, PlanType::Basic.price(), Utc::now())
                .is_approved()
        })
        .expect("a 20% decline rate yields a declining seed quickly")
}

fn app_with_seed(pool: PgPool, seed: u64) -> axum::Router {
    let mut config = test_config();
    config.payment_seed = Some(seed);
    build_test_app_with(pool, config)
}

fn money(value: &serde_json::Value) -> Decimal {
    serde_json::from_value(value.clone()).expect("amount should be a decimal")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_declined_charge_leaves_no_listing(pool: PgPool) {
    let (user_id, property_id) = broker_with_property(&pool).await;
    let app = app_with_seed(pool.clone(), declining_seed());

    let response = post_json_auth(
        app,
        CHECKOUT,
        json!({ "property_id": property_id, "plan_type": "basic", "payment_method": "qr_payment" }),
        &token_for(user_id, "broker"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body_json(response).await["code"], "PAYMENT_FAILED");

    assert!(PremiumListingRepo::find_by_property(&pool, property_id)
        .await
        .unwrap()
        .is_none());
    assert!(!is_premium(&pool, property_id).await);

    let sent = EmailNotificationRepo::list_for_user(&pool, user_id, 10)
        .await
        .unwrap();
    let failed: Vec<_> = sent
        .iter()
        .filter(|n| n.notification_type == "payment_failed")
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(sent.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_promo_preview_does_not_consume_a_use(pool: PgPool) {
    let (user_id, _) = broker_with_property(&pool).await;
    promo(&pool, "TIHAR20").await;
    let app = app_with_seed(pool.clone(), 7);
    let token = token_for(user_id, "broker");

    for _ in 0..2 {
        let response = post_json_auth(
            app.clone(),
            "/api/v1/premium/promo/preview",
            json!({ "code": " tihar20 ", "plan_type": "basic" }),
            &token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["code"], "TIHAR20");
        assert_eq!(money(&json["data"]["discounted_price"]), Decimal::from(400));
    }

    assert_eq!(times_used(&pool, "TIHAR20").await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_paid_checkout_redeems_code_once(pool: PgPool) {
    let (user_id, property_id) = broker_with_property(&pool).await;
    promo(&pool, "TIHAR20").await;
    let app = app_with_seed(pool.clone(), 7);
    let token = token_for(user_id, "broker");
    let body = json!({
        "property_id": property_id,
        "plan_type": "basic",
        "payment_method": "cash",
        "promo_code": "TIHAR20"
    });

    let response = post_json_auth(app.clone(), CHECKOUT, body.clone(), &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(money(&json["data"]["original_price"]), PlanType::Basic.price());
    assert_eq!(money(&json["data"]["amount_paid"]), Decimal::from(400));
    assert_eq!(json["data"]["promo_code"], "TIHAR20");
    assert!(json["data"]["payment_id"]
        .as_str()
        .unwrap_or_default()
        .starts_with("PAY_"));

    assert!(is_premium(&pool, property_id).await);
    assert_eq!(times_used(&pool, "TIHAR20").await, 1);

    // A second purchase while the listing is active is refused and the code
    // is not touched again.
    let again = post_json_auth(app, CHECKOUT, body, &token).await;
    assert_eq!(again.status(), StatusCode::CONFLICT);
    assert_eq!(times_used(&pool, "TIHAR20").await, 1);
}
