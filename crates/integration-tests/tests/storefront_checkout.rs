//! Integration tests for the cart, checkout and order tracking.
//!
//! These tests require:
//! - A migrated and seeded `PostgreSQL` database (gebeya-cli migrate, seed)
//! - The storefront running (cargo run -p gebeya-storefront)

use gebeya_core::OrderStatus;
use gebeya_integration_tests::{
    get_page, location, number_after, post_form, seeded_product_id, session_client,
};
use reqwest::{Client, StatusCode};

const PHONE: &str = "0911223344";

fn checkout_form(phone: &str) -> Vec<(&'static str, String)> {
    vec![
        ("full_name", "Hana Tadesse".to_owned()),
        ("email", String::new()),
        ("phone", phone.to_owned()),
        ("address", "Near Jimma University main gate".to_owned()),
        ("kebele", "mentina".to_owned()),
        ("delivery_time_slot", "afternoon".to_owned()),
        ("payment_method", "cash_on_delivery".to_owned()),
    ]
}

async fn place_order(client: &Client, phone: &str) -> i32 {
    let product_id = seeded_product_id(client).await;
    let resp = post_form(client, &format!("/cart/add/{product_id}/"), &[("quantity", "2")]).await;
    assert_eq!(location(&resp), "/cart/");

    let form = checkout_form(phone);
    let pairs: Vec<(&str, &str)> = form.iter().map(|(k, v)| (*k, v.as_str())).collect();
    let resp = post_form(client, "/checkout/", &pairs).await;
    let to = location(&resp);
    number_after(&to, "/order/success/").expect("redirect to order success page")
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_cart_add_and_remove() {
    let client = session_client();
    let product_id = seeded_product_id(&client).await;

    let resp = post_form(&client, &format!("/cart/add/{product_id}/"), &[("quantity", "3")]).await;
    assert_eq!(location(&resp), "/cart/");

    let (status, body) = get_page(&client, "/cart/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Organic Honey"));
    assert!(body.contains("Br 2,400.00"));

    let resp = post_form(&client, &format!("/cart/remove/{product_id}/"), &[]).await;
    assert_eq!(location(&resp), "/cart/");

    let (_, body) = get_page(&client, "/cart/").await;
    assert!(body.contains("Your cart is empty"));
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_cart_rejects_zero_quantity() {
    let client = session_client();
    let product_id = seeded_product_id(&client).await;

    let resp = post_form(&client, &format!("/cart/add/{product_id}/"), &[("quantity", "0")]).await;
    assert!(resp.status().is_redirection());

    let (_, body) = get_page(&client, "/cart/").await;
    assert!(body.contains("Your cart is empty"));
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_add_unknown_product_is_404() {
    let client = session_client();
    let resp = post_form(&client, "/cart/add/999999/", &[("quantity", "1")]).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_checkout_with_empty_cart_redirects() {
    let client = session_client();
    let resp = client
        .get(format!("{}/checkout/", gebeya_integration_tests::base_url()))
        .send()
        .await
        .expect("request failed");
    assert_eq!(location(&resp), "/products/");
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_checkout_validation_keeps_cart() {
    let client = session_client();
    let product_id = seeded_product_id(&client).await;
    post_form(&client, &format!("/cart/add/{product_id}/"), &[("quantity", "1")]).await;

    let resp = post_form(
        &client,
        "/checkout/",
        &[("full_name", ""), ("phone", "12"), ("kebele", "atlantis")],
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("body");
    assert!(body.contains("Please correct the following"));

    let (_, cart) = get_page(&client, "/cart/").await;
    assert!(cart.contains("Organic Honey"));
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_place_order_snapshots_prices_and_clears_cart() {
    let client = session_client();
    let order_id = place_order(&client, PHONE).await;

    let (status, body) = get_page(&client, &format!("/order/success/{order_id}/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(&format!("#{order_id}")));
    assert!(body.contains("Br 1,600.00"));
    assert!(body.contains(OrderStatus::Pending.label()));

    let (_, cart) = get_page(&client, "/cart/").await;
    assert!(cart.contains("Your cart is empty"));
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_order_success_hidden_from_other_sessions() {
    let buyer = session_client();
    let order_id = place_order(&buyer, PHONE).await;

    let stranger = session_client();
    let (status, _) = get_page(&stranger, &format!("/order/success/{order_id}/")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_track_order_requires_matching_phone() {
    let buyer = session_client();
    let order_id = place_order(&buyer, PHONE).await;
    let order = order_id.to_string();

    let tracker = session_client();
    let resp = post_form(
        &tracker,
        "/track-order/",
        &[("order_id", order.as_str()), ("phone", PHONE)],
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let found = resp.text().await.expect("body");
    assert!(found.contains(&format!("Order #{order_id}")));

    let resp = post_form(
        &tracker,
        "/track-order/",
        &[("order_id", order.as_str()), ("phone", "0900000000")],
    )
    .await;
    let wrong_phone = resp.text().await.expect("body");

    let resp = post_form(
        &tracker,
        "/track-order/",
        &[("order_id", "99999999"), ("phone", PHONE)],
    )
    .await;
    let missing = resp.text().await.expect("body");

    assert!(wrong_phone.contains("No order found"));
    assert!(missing.contains("No order found"));
    assert!(!wrong_phone.contains(&format!("Order #{order_id}")));
}
