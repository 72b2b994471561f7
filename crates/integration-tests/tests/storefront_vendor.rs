//! Integration tests for vendor registration and the dashboard.
//!
//! These tests require:
//! - A migrated and seeded `PostgreSQL` database (gebeya-cli migrate, seed)
//! - The storefront running (cargo run -p gebeya-storefront)

use gebeya_integration_tests::{
    get_page, location, login_seeded_vendor, number_after, post_form, session_client,
    signup_customer,
};
use reqwest::{Client, StatusCode};

async fn register_vendor(client: &Client, business: &str) {
    signup_customer(client).await;
    let resp = post_form(
        client,
        "/vendor/register/",
        &[
            ("business_name", business),
            ("description", "Test shop"),
            ("address", "Near the bus station"),
            ("phone", "0917000000"),
            ("kebele", "ginjo"),
        ],
    )
    .await;
    assert_eq!(location(&resp), "/vendor/dashboard/");
}

async fn create_product(client: &Client, name: &str) -> i32 {
    let (_, form) = get_page(client, "/vendor/product/add/").await;
    let options = form
        .find("Select category</option>")
        .map(|at| &form[at..])
        .expect("category select");
    let category = number_after(options, "<option value=\"").expect("a category option");
    let category = category.to_string();

    let resp = post_form(
        client,
        "/vendor/product/add/",
        &[
            ("category", category.as_str()),
            ("name", name),
            ("slug", ""),
            ("description", "Made for tests"),
            ("price", "150.50"),
            ("stock", "3"),
            ("is_available", "on"),
            ("image", ""),
        ],
    )
    .await;
    assert_eq!(location(&resp), "/vendor/dashboard/");

    let (_, dashboard) = get_page(client, "/vendor/dashboard/").await;
    let marker = "/vendor/product/edit/";
    let at = dashboard.find(name).expect("new product on dashboard");
    number_after(&dashboard[at..], marker).expect("edit link")
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_dashboard_requires_login() {
    let client = session_client();
    let resp = client
        .get(format!("{}/vendor/dashboard/", gebeya_integration_tests::base_url()))
        .send()
        .await
        .expect("request failed");

    let to = location(&resp);
    assert!(to.starts_with("/login/?next="), "unexpected redirect {to}");
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_customer_is_sent_to_registration() {
    let client = session_client();
    signup_customer(&client).await;

    let resp = client
        .get(format!("{}/vendor/dashboard/", gebeya_integration_tests::base_url()))
        .send()
        .await
        .expect("request failed");
    assert_eq!(location(&resp), "/vendor/register/");
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_register_then_manage_product() {
    let client = session_client();
    register_vendor(&client, "Ginjo Weavers").await;

    let product_id = create_product(&client, "Woven Basket Test").await;

    let (status, body) = get_page(&client, "/vendor/dashboard/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Ginjo Weavers"));
    assert!(body.contains("Br 150.50"));

    let resp = post_form(&client, &format!("/vendor/product/delete/{product_id}/"), &[]).await;
    assert_eq!(location(&resp), "/vendor/dashboard/");

    let (_, body) = get_page(&client, "/vendor/dashboard/").await;
    assert!(!body.contains("Woven Basket Test"));
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_hidden_product_rejects_reviews() {
    let vendor = session_client();
    register_vendor(&vendor, "Hidden Goods").await;
    let product_id = create_product(&vendor, "Hidden Jebena Test").await;

    let resp = post_form(&vendor, &format!("/vendor/product/delete/{product_id}/"), &[]).await;
    assert_eq!(location(&resp), "/vendor/dashboard/");

    let reviewer = session_client();
    let resp = post_form(
        &reviewer,
        &format!("/product/review/{product_id}/"),
        &[("full_name", "Almaz"), ("rating", "5"), ("comment", "Lovely")],
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_vendor_cannot_edit_foreign_product() {
    let owner = session_client();
    register_vendor(&owner, "Owner Shop").await;
    let product_id = create_product(&owner, "Owned Coffee Test").await;

    let intruder = session_client();
    login_seeded_vendor(&intruder).await;

    let resp = post_form(
        &intruder,
        &format!("/vendor/product/edit/{product_id}/"),
        &[
            ("category", "1"),
            ("name", "Hijacked"),
            ("slug", ""),
            ("description", ""),
            ("price", "1"),
            ("stock", "0"),
            ("image", ""),
        ],
    )
    .await;
    assert_eq!(location(&resp), "/vendor/dashboard/");

    let (_, body) = get_page(&owner, "/vendor/dashboard/").await;
    assert!(body.contains("Owned Coffee Test"));
    assert!(!body.contains("Hijacked"));
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_vendor_cannot_update_foreign_order() {
    let owner = session_client();
    register_vendor(&owner, "Status Shop").await;
    create_product(&owner, "Status Item Test").await;

    // A buyer orders the seeded vendor's honey.
    let buyer = session_client();
    let honey = gebeya_integration_tests::seeded_product_id(&buyer).await;
    post_form(&buyer, &format!("/cart/add/{honey}/"), &[("quantity", "1")]).await;
    let resp = post_form(
        &buyer,
        "/checkout/",
        &[
            ("full_name", "Kedir Abba"),
            ("email", ""),
            ("phone", "0911555666"),
            ("address", "Hermata market"),
            ("kebele", "hermata"),
            ("delivery_time_slot", "morning"),
            ("payment_method", "telebirr"),
        ],
    )
    .await;
    let order_id = number_after(&location(&resp), "/order/success/").expect("order id");

    // The new vendor has no line in that order.
    let resp = post_form(
        &owner,
        &format!("/vendor/order/status/{order_id}/"),
        &[("status", "cancelled")],
    )
    .await;
    assert_eq!(location(&resp), "/vendor/dashboard/");

    let order = order_id.to_string();
    let tracker = session_client();
    let resp = post_form(
        &tracker,
        "/track-order/",
        &[("order_id", order.as_str()), ("phone", "0911555666")],
    )
    .await;
    let body = resp.text().await.expect("body");
    assert!(body.contains("Pending"));
    assert!(!body.contains("status-cancelled"));
}
