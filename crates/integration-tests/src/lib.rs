//! Integration tests for Gebeya.
//!
//! The tests drive a running storefront over HTTP, so they are `#[ignore]`d
//! by default.
//!
//! # Running Tests
//!
//! ```bash
//! # Prepare a database with demo data
//! cargo run -p gebeya-cli -- migrate
//! cargo run -p gebeya-cli -- seed --vendor-password vendorpass
//!
//! # Start the storefront, then in another shell
//! cargo test -p gebeya-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_BASE_URL` - Storefront under test (default `http://localhost:3000`)
//! - `SEED_VENDOR_PASSWORD` - Password given to `gebeya-cli seed` (default `vendorpass`)

use reqwest::{Client, Response, StatusCode, header::LOCATION, redirect::Policy};

/// Slug of a seeded product.
pub const SEEDED_PRODUCT_SLUG: &str = "organic-honey";

/// Username of the seeded vendor.
pub const SEEDED_VENDOR: &str = "vendor1";

/// Base URL for the storefront (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Password of the seeded vendor account.
#[must_use]
pub fn seeded_vendor_password() -> String {
    std::env::var("SEED_VENDOR_PASSWORD").unwrap_or_else(|_| "vendorpass".to_string())
}

/// A client that keeps cookies (one browser session) and does not follow
/// redirects, so tests can assert on `Location`.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
#[allow(clippy::expect_used)]
pub fn session_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// A username that no other test run uses.
#[must_use]
pub fn unique_username(prefix: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{prefix}_{}", &suffix[..10])
}

/// The `Location` header of a redirect response.
///
/// # Panics
///
/// Panics if the response is not a redirect with a location.
#[must_use]
#[allow(clippy::expect_used)]
pub fn location(resp: &Response) -> String {
    assert!(
        resp.status().is_redirection(),
        "expected redirect, got {}",
        resp.status()
    );
    resp.headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .expect("redirect without Location")
        .to_owned()
}

/// First run of digits following `marker` in `body`.
#[must_use]
pub fn number_after(body: &str, marker: &str) -> Option<i32> {
    let start = body.find(marker)? + marker.len();
    let digits: String = body[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// GET a path and return status and body.
///
/// # Panics
///
/// Panics on transport errors.
#[allow(clippy::expect_used)]
pub async fn get_page(client: &Client, path: &str) -> (StatusCode, String) {
    let resp = client
        .get(format!("{}{path}", base_url()))
        .send()
        .await
        .expect("request failed");
    let status = resp.status();
    (status, resp.text().await.expect("Failed to read response"))
}

/// POST a form and return the raw response.
///
/// # Panics
///
/// Panics on transport errors.
#[allow(clippy::expect_used)]
pub async fn post_form(client: &Client, path: &str, form: &[(&str, &str)]) -> Response {
    client
        .post(format!("{}{path}", base_url()))
        .form(form)
        .send()
        .await
        .expect("request failed")
}

/// Sign up a fresh customer in this client's session and return the username.
///
/// # Panics
///
/// Panics if signup does not redirect.
pub async fn signup_customer(client: &Client) -> String {
    let username = unique_username("buyer");
    let email = format!("{username}@example.com");
    let resp = post_form(
        client,
        "/signup/",
        &[
            ("username", username.as_str()),
            ("email", email.as_str()),
            ("first_name", "Test"),
            ("last_name", "Buyer"),
            ("password", "correct-horse-42"),
            ("password_confirm", "correct-horse-42"),
        ],
    )
    .await;
    assert!(
        resp.status().is_redirection(),
        "signup failed: {}",
        resp.status()
    );
    username
}

/// Log in the seeded vendor in this client's session.
///
/// # Panics
///
/// Panics if login does not redirect.
pub async fn login_seeded_vendor(client: &Client) {
    let password = seeded_vendor_password();
    let resp = post_form(
        client,
        "/login/",
        &[
            ("username", SEEDED_VENDOR),
            ("password", password.as_str()),
            ("next", "/vendor/dashboard/"),
        ],
    )
    .await;
    assert_eq!(location(&resp), "/vendor/dashboard/");
}

/// ID of a seeded product, read from its "add to cart" form.
///
/// # Panics
///
/// Panics if the product page has no cart form.
#[allow(clippy::expect_used)]
pub async fn seeded_product_id(client: &Client) -> i32 {
    let (status, body) = get_page(client, &format!("/product/{SEEDED_PRODUCT_SLUG}/")).await;
    assert_eq!(status, StatusCode::OK);
    number_after(&body, "/cart/add/").expect("product page without cart form")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_after() {
        let body = r#"<form action="/cart/add/42/" method="post">"#;
        assert_eq!(number_after(body, "/cart/add/"), Some(42));
        assert_eq!(number_after(body, "/cart/remove/"), None);
    }

    #[test]
    fn test_unique_username() {
        let a = unique_username("buyer");
        let b = unique_username("buyer");
        assert!(a.starts_with("buyer_"));
        assert_ne!(a, b);
    }
}
