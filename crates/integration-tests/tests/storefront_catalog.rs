//! Integration tests for catalog browsing.
//!
//! These tests require:
//! - A migrated and seeded `PostgreSQL` database (gebeya-cli migrate, seed)
//! - The storefront running (cargo run -p gebeya-storefront)

use gebeya_integration_tests::{SEEDED_PRODUCT_SLUG, get_page, session_client};
use reqwest::StatusCode;

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_health_endpoints() {
    let client = session_client();

    let (status, body) = get_page(&client, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");

    let (status, _) = get_page(&client, "/health/ready").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_home_lists_categories_and_products() {
    let client = session_client();
    let (status, body) = get_page(&client, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("/category/electronics/"));
    assert!(body.contains(&format!("/product/{SEEDED_PRODUCT_SLUG}/")));
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_search_matches_description() {
    let client = session_client();
    let (status, body) = get_page(&client, "/products/?q=gojam").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Organic Honey"));
    assert!(!body.contains("Smartphone X1"));
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_sort_by_price_ascending() {
    let client = session_client();
    let (status, body) = get_page(&client, "/products/?sort=price_low").await;

    assert_eq!(status, StatusCode::OK);
    let jebena = body.find("Jebena").expect("jebena listed");
    let phone = body.find("Smartphone X1").expect("phone listed");
    assert!(jebena < phone, "cheaper product should come first");
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_unknown_filters_are_ignored() {
    let client = session_client();
    let (status, body) = get_page(&client, "/products/?kebele=atlantis&sort=sideways").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Organic Honey"));
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_product_detail_shows_reviews() {
    let client = session_client();
    let (status, body) = get_page(&client, "/product/smartphone-x1/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Chala Jimma"));
    assert!(body.contains("Ethio Tech Solutions"));
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_unknown_product_and_category_are_404() {
    let client = session_client();

    let (status, _) = get_page(&client, "/product/no-such-thing/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get_page(&client, "/category/no-such-thing/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_blog_lists_seeded_article() {
    let client = session_client();
    let (status, body) = get_page(&client, "/blog/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("/blog/welcome-to-gebeya/"));

    let (status, body) = get_page(&client, "/blog/welcome-to-gebeya/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<h2>Ordering</h2>"));
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_security_headers_present() {
    let client = session_client();
    let resp = client
        .get(format!("{}/about/", gebeya_integration_tests::base_url()))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::OK);
    let headers = resp.headers();
    assert!(headers.contains_key("content-security-policy"));
    assert_eq!(
        headers.get("x-content-type-options").and_then(|v| v.to_str().ok()),
        Some("nosniff")
    );
    assert!(headers.contains_key("x-request-id"));
}
