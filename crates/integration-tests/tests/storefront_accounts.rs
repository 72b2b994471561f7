//! Integration tests for signup, login and logout.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (gebeya-cli migrate)
//! - The storefront running (cargo run -p gebeya-storefront)

use gebeya_integration_tests::{
    get_page, location, post_form, session_client, signup_customer, unique_username,
};
use reqwest::StatusCode;

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_signup_logs_in() {
    let client = session_client();
    let username = signup_customer(&client).await;

    let (status, body) = get_page(&client, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(&username));
    assert!(body.contains("Log out"));
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_signup_rejects_mismatched_passwords() {
    let client = session_client();
    let username = unique_username("buyer");
    let email = format!("{username}@example.com");

    let resp = post_form(
        &client,
        "/signup/",
        &[
            ("username", username.as_str()),
            ("email", email.as_str()),
            ("first_name", ""),
            ("last_name", ""),
            ("password", "correct-horse-42"),
            ("password_confirm", "battery-staple-42"),
        ],
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("body");
    assert!(body.contains("passwords do not match"));
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_login_failure_is_generic() {
    let client = session_client();
    let resp = post_form(
        &client,
        "/login/",
        &[
            ("username", "nobody-by-this-name"),
            ("password", "whatever-123"),
            ("next", ""),
        ],
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("body");
    assert!(body.contains("Invalid username or password"));
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_logout_clears_user() {
    let client = session_client();
    let username = signup_customer(&client).await;

    let resp = post_form(&client, "/logout/", &[]).await;
    assert_eq!(location(&resp), "/");

    let (_, body) = get_page(&client, "/").await;
    assert!(!body.contains(&username));
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_login_ignores_offsite_next() {
    let client = session_client();
    let username = signup_customer(&client).await;
    post_form(&client, "/logout/", &[]).await;

    let resp = post_form(
        &client,
        "/login/",
        &[
            ("username", username.as_str()),
            ("password", "correct-horse-42"),
            ("next", "https://evil.example/"),
        ],
    )
    .await;
    assert_eq!(location(&resp), "/");
}
