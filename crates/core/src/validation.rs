//! Form input validation.
//!
//! Each form has a raw struct (what the browser posts, all strings) and a
//! `validate_*` function that either returns the typed, trusted value or every
//! violation found. Nothing is constructed from a form that has not passed
//! through here.

use core::fmt;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::checkout::ContactDetails;
use crate::types::{
    CategoryId, DeliveryTimeSlot, Email, Kebele, OrderId, OrderStatus, PaymentMethod, Phone,
    Price, Rating, Slug,
};

/// Maximum length of short text fields (names, addresses).
pub const MAX_NAME_LENGTH: usize = 255;
/// Maximum length of a username.
pub const MAX_USERNAME_LENGTH: usize = 150;
/// Maximum length of first and last names on accounts.
pub const MAX_PERSON_NAME_LENGTH: usize = 30;
/// Maximum length of category names.
pub const MAX_CATEGORY_NAME_LENGTH: usize = 100;
/// Maximum length of long text fields (descriptions, comments).
pub const MAX_TEXT_LENGTH: usize = 10_000;
/// Maximum length of an image URL.
pub const MAX_URL_LENGTH: usize = 500;
/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// One rule a submitted form breaks.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },
    #[error("enter a valid email address")]
    InvalidEmail,
    #[error("enter a valid phone number")]
    InvalidPhone,
    #[error("rating must be between 1 and 5, got {0}")]
    RatingOutOfRange(i64),
    #[error("{0} must be a number")]
    InvalidNumber(&'static str),
    #[error("price cannot be negative")]
    NegativePrice,
    #[error("stock cannot be negative")]
    NegativeStock,
    #[error("quantity must be at least 1")]
    InvalidQuantity,
    #[error("{value:?} is not a valid {field}")]
    InvalidChoice { field: &'static str, value: String },
    #[error("{0} must be an http(s) URL or a site path")]
    InvalidUrl(&'static str),
    #[error("passwords do not match")]
    PasswordMismatch,
}

impl ValidationError {
    /// The form field the violation belongs to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Required(field)
            | Self::TooLong { field, .. }
            | Self::TooShort { field, .. }
            | Self::InvalidNumber(field)
            | Self::InvalidChoice { field, .. }
            | Self::InvalidUrl(field) => field,
            Self::InvalidEmail => "email",
            Self::InvalidPhone => "phone",
            Self::RatingOutOfRange(_) => "rating",
            Self::NegativePrice => "price",
            Self::NegativeStock => "stock",
            Self::InvalidQuantity => "quantity",
            Self::PasswordMismatch => "password_confirm",
        }
    }
}

/// Every violation found in one form submission, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// Whether any violation concerns `field`.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field() == field)
    }

    /// Messages for display, one per violation.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }

    /// `Ok(value)` when nothing was recorded, otherwise these errors.
    ///
    /// # Errors
    ///
    /// Returns `self` if it holds at least one violation.
    pub fn finish<T>(self, value: impl FnOnce() -> Option<T>) -> Result<T, Self> {
        if !self.is_empty() {
            return Err(self);
        }
        // Every Option the closure unwraps was filled when no error was pushed.
        value().ok_or(self)
    }

    /// Consume into the list of violations.
    #[must_use]
    pub fn into_inner(self) -> Vec<ValidationError> {
        self.0
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self(vec![error])
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

// =============================================================================
// Field helpers
// =============================================================================

/// A trimmed, non-empty string of at most `max` characters.
fn required(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &str,
    max: usize,
) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        errors.push(ValidationError::Required(field));
        None
    } else if value.chars().count() > max {
        errors.push(ValidationError::TooLong { field, max });
        None
    } else {
        Some(value.to_owned())
    }
}

/// A trimmed string of at most `max` characters, possibly empty.
fn optional(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &str,
    max: usize,
) -> Option<String> {
    let value = value.trim();
    if value.chars().count() > max {
        errors.push(ValidationError::TooLong { field, max });
        None
    } else {
        Some(value.to_owned())
    }
}

fn choice<T>(errors: &mut ValidationErrors, field: &'static str, value: &str) -> Option<T>
where
    T: core::str::FromStr,
{
    if value.trim().is_empty() {
        errors.push(ValidationError::Required(field));
        return None;
    }
    value.parse::<T>().map_or_else(
        |_| {
            errors.push(ValidationError::InvalidChoice {
                field,
                value: value.trim().to_owned(),
            });
            None
        },
        Some,
    )
}

fn phone(errors: &mut ValidationErrors, value: &str) -> Option<Phone> {
    if value.trim().is_empty() {
        errors.push(ValidationError::Required("phone"));
        return None;
    }
    Phone::parse(value).map_or_else(
        |_| {
            errors.push(ValidationError::InvalidPhone);
            None
        },
        Some,
    )
}

fn image_url(errors: &mut ValidationErrors, field: &'static str, value: &str) -> Option<String> {
    let value = value.trim();
    if value.chars().count() > MAX_URL_LENGTH {
        errors.push(ValidationError::TooLong {
            field,
            max: MAX_URL_LENGTH,
        });
        return None;
    }
    let acceptable = value.is_empty()
        || value.starts_with("https://")
        || value.starts_with("http://")
        || (value.starts_with('/') && !value.starts_with("//"));
    if acceptable {
        Some(value.to_owned())
    } else {
        errors.push(ValidationError::InvalidUrl(field));
        None
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

// =============================================================================
// Checkout
// =============================================================================

/// The checkout form as posted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CheckoutForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub kebele: String,
    pub delivery_time_slot: String,
    pub payment_method: String,
}

/// Validate checkout details.
///
/// # Errors
///
/// Every violation found.
pub fn validate_checkout(form: &CheckoutForm) -> Result<ContactDetails, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let full_name = required(&mut errors, "full_name", &form.full_name, MAX_NAME_LENGTH);
    let email = if form.email.trim().is_empty() {
        Some(None)
    } else {
        Email::parse(&form.email).map_or_else(
            |_| {
                errors.push(ValidationError::InvalidEmail);
                None
            },
            |email| Some(Some(email)),
        )
    };
    let phone = phone(&mut errors, &form.phone);
    let address = required(&mut errors, "address", &form.address, MAX_TEXT_LENGTH);
    let kebele = choice::<Kebele>(&mut errors, "kebele", &form.kebele);
    let delivery_time_slot =
        choice::<DeliveryTimeSlot>(&mut errors, "delivery_time_slot", &form.delivery_time_slot);
    let payment_method =
        choice::<PaymentMethod>(&mut errors, "payment_method", &form.payment_method);

    errors.finish(|| {
        Some(ContactDetails {
            full_name: full_name?,
            email: email?,
            phone: phone?,
            address: address?,
            kebele: kebele?,
            delivery_time_slot: delivery_time_slot?,
            payment_method: payment_method?,
        })
    })
}

// =============================================================================
// Cart and order status
// =============================================================================

/// Parse a cart quantity; a missing or blank value means 1.
///
/// # Errors
///
/// [`ValidationError::InvalidQuantity`] for anything that is not a whole
/// number of at least 1.
pub fn parse_quantity(value: Option<&str>) -> Result<u32, ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(1),
        Some(v) => match v.parse::<u32>() {
            Ok(q) if q >= 1 => Ok(q),
            _ => Err(ValidationError::InvalidQuantity),
        },
    }
}

/// Parse a submitted order status.
///
/// # Errors
///
/// [`ValidationError::InvalidChoice`] for values outside [`OrderStatus`].
pub fn parse_order_status(value: &str) -> Result<OrderStatus, ValidationError> {
    value.parse().map_err(|_| ValidationError::InvalidChoice {
        field: "status",
        value: value.trim().to_owned(),
    })
}

// =============================================================================
// Reviews
// =============================================================================

/// The review form as posted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReviewForm {
    pub rating: String,
    pub comment: String,
    pub full_name: String,
}

/// A validated review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewInput {
    pub rating: Rating,
    pub comment: String,
    pub full_name: String,
}

/// Validate a review submission.
///
/// # Errors
///
/// Every violation found.
pub fn validate_review(form: &ReviewForm) -> Result<ReviewInput, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let rating = match form.rating.trim() {
        "" => {
            errors.push(ValidationError::Required("rating"));
            None
        }
        raw => match raw.parse::<i64>() {
            Ok(n) => Rating::new(n).map_or_else(
                |_| {
                    errors.push(ValidationError::RatingOutOfRange(n));
                    None
                },
                Some,
            ),
            Err(_) => {
                errors.push(ValidationError::InvalidNumber("rating"));
                None
            }
        },
    };
    let comment = required(&mut errors, "comment", &form.comment, MAX_TEXT_LENGTH);
    let full_name = required(&mut errors, "full_name", &form.full_name, MAX_NAME_LENGTH);

    errors.finish(|| {
        Some(ReviewInput {
            rating: rating?,
            comment: comment?,
            full_name: full_name?,
        })
    })
}

// =============================================================================
// Products
// =============================================================================

/// The vendor product form as posted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductForm {
    pub category: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: String,
    pub stock: String,
    /// Checkbox: present when ticked.
    pub is_available: Option<String>,
    pub image: String,
}

/// A validated product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInput {
    pub category_id: CategoryId,
    pub name: String,
    /// Requested slug; the repository makes it unique.
    pub slug: Slug,
    pub description: String,
    pub price: Price,
    pub stock: i32,
    pub is_available: bool,
    pub image: Option<String>,
}

/// Largest price a `NUMERIC(10, 2)` column holds.
fn max_price() -> Decimal {
    Price::max_storable().amount()
}

/// Validate a product submission.
///
/// A blank slug is derived from the name. A blank stock means zero.
///
/// # Errors
///
/// Every violation found.
pub fn validate_product(form: &ProductForm) -> Result<ProductInput, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let category_id = choice::<CategoryId>(&mut errors, "category", &form.category);
    let name = required(&mut errors, "name", &form.name, MAX_NAME_LENGTH);
    let slug = optional(&mut errors, "slug", &form.slug, MAX_NAME_LENGTH);
    let description = required(&mut errors, "description", &form.description, MAX_TEXT_LENGTH);

    let price = match form.price.trim() {
        "" => {
            errors.push(ValidationError::Required("price"));
            None
        }
        raw => match raw.parse::<Decimal>() {
            Ok(amount) if amount.is_sign_negative() && !amount.is_zero() => {
                errors.push(ValidationError::NegativePrice);
                None
            }
            Ok(amount) if amount > max_price() => {
                errors.push(ValidationError::InvalidNumber("price"));
                None
            }
            Ok(amount) => Some(Price::new(amount)),
            Err(_) => {
                errors.push(ValidationError::InvalidNumber("price"));
                None
            }
        },
    };

    let stock = match form.stock.trim() {
        "" => Some(0),
        raw => match raw.parse::<i32>() {
            Ok(n) if n < 0 => {
                errors.push(ValidationError::NegativeStock);
                None
            }
            Ok(n) => Some(n),
            Err(_) => {
                errors.push(ValidationError::InvalidNumber("stock"));
                None
            }
        },
    };

    let image = image_url(&mut errors, "image", &form.image);

    errors.finish(|| {
        let name = name?;
        let slug = Slug::or_from_name(slug.as_deref(), &name);
        Some(ProductInput {
            category_id: category_id?,
            name,
            slug,
            description: description?,
            price: price?,
            stock: stock?,
            is_available: form.is_available.is_some(),
            image: non_empty(image?),
        })
    })
}

/// The gallery image form as posted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductImageForm {
    pub image: String,
}

/// Validate a gallery image URL, which must be present.
///
/// # Errors
///
/// Every violation found.
pub fn validate_product_image(form: &ProductImageForm) -> Result<String, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if form.image.trim().is_empty() {
        errors.push(ValidationError::Required("image"));
    }
    let image = image_url(&mut errors, "image", &form.image);
    errors.finish(|| image)
}

// =============================================================================
// Vendor registration
// =============================================================================

/// The vendor registration form as posted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VendorForm {
    pub business_name: String,
    pub description: String,
    pub address: String,
    pub phone: String,
    pub kebele: String,
}

/// A validated vendor registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorInput {
    pub business_name: String,
    pub description: String,
    pub address: String,
    pub phone: Phone,
    pub kebele: Kebele,
}

/// Validate a vendor registration.
///
/// # Errors
///
/// Every violation found.
pub fn validate_vendor(form: &VendorForm) -> Result<VendorInput, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let business_name = required(
        &mut errors,
        "business_name",
        &form.business_name,
        MAX_NAME_LENGTH,
    );
    let description = required(&mut errors, "description", &form.description, MAX_TEXT_LENGTH);
    let address = required(&mut errors, "address", &form.address, MAX_NAME_LENGTH);
    let phone = phone(&mut errors, &form.phone);
    let kebele = choice::<Kebele>(&mut errors, "kebele", &form.kebele);

    errors.finish(|| {
        Some(VendorInput {
            business_name: business_name?,
            description: description?,
            address: address?,
            phone: phone?,
            kebele: kebele?,
        })
    })
}

// =============================================================================
// Accounts
// =============================================================================

/// The signup form as posted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub password_confirm: String,
}

/// A validated signup. The password is still plain text and must be hashed
/// before it goes anywhere.
#[derive(Clone, PartialEq, Eq)]
pub struct SignupInput {
    pub username: String,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

impl fmt::Debug for SignupInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupInput")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Validate a signup.
///
/// Usernames allow letters, digits and `@ . + - _`.
///
/// # Errors
///
/// Every violation found.
pub fn validate_signup(form: &SignupForm) -> Result<SignupInput, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let username = required(&mut errors, "username", &form.username, MAX_USERNAME_LENGTH)
        .and_then(|u| {
            if u.chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
            {
                Some(u)
            } else {
                errors.push(ValidationError::InvalidChoice {
                    field: "username",
                    value: u,
                });
                None
            }
        });
    let email = if form.email.trim().is_empty() {
        errors.push(ValidationError::Required("email"));
        None
    } else {
        Email::parse(&form.email).map_or_else(
            |_| {
                errors.push(ValidationError::InvalidEmail);
                None
            },
            Some,
        )
    };
    let first_name = required(
        &mut errors,
        "first_name",
        &form.first_name,
        MAX_PERSON_NAME_LENGTH,
    );
    let last_name = required(
        &mut errors,
        "last_name",
        &form.last_name,
        MAX_PERSON_NAME_LENGTH,
    );

    let password = if form.password.is_empty() {
        errors.push(ValidationError::Required("password"));
        None
    } else if form.password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push(ValidationError::TooShort {
            field: "password",
            min: MIN_PASSWORD_LENGTH,
        });
        None
    } else if form.password != form.password_confirm {
        errors.push(ValidationError::PasswordMismatch);
        None
    } else {
        Some(form.password.clone())
    };

    errors.finish(|| {
        Some(SignupInput {
            username: username?,
            email: email?,
            first_name: first_name?,
            last_name: last_name?,
            password: password?,
        })
    })
}

// =============================================================================
// Order tracking
// =============================================================================

/// The order tracking form as posted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TrackOrderForm {
    pub order_id: String,
    pub phone: String,
}

/// A validated tracking lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackOrderQuery {
    pub order_id: OrderId,
    pub phone: Phone,
}

/// Validate an order tracking lookup. A leading `#` on the order number is
/// accepted.
///
/// # Errors
///
/// Every violation found.
pub fn validate_track_order(form: &TrackOrderForm) -> Result<TrackOrderQuery, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let order_id = match form.order_id.trim().trim_start_matches('#') {
        "" => {
            errors.push(ValidationError::Required("order_id"));
            None
        }
        raw => raw.parse::<OrderId>().map_or_else(
            |_| {
                errors.push(ValidationError::InvalidNumber("order_id"));
                None
            },
            Some,
        ),
    };
    let phone = phone(&mut errors, &form.phone);

    errors.finish(|| {
        Some(TrackOrderQuery {
            order_id: order_id?,
            phone: phone?,
        })
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn checkout_form() -> CheckoutForm {
        CheckoutForm {
            full_name: "Aster Kebede".to_string(),
            email: String::new(),
            phone: "+251 911 223 344".to_string(),
            address: "Behind Jimma Museum".to_string(),
            kebele: "mentina".to_string(),
            delivery_time_slot: "afternoon".to_string(),
            payment_method: "telebirr".to_string(),
        }
    }

    fn product_form() -> ProductForm {
        ProductForm {
            category: "3".to_string(),
            name: "Traditional Coffee Pot (Jebena)".to_string(),
            slug: String::new(),
            description: "Handmade clay jebena".to_string(),
            price: "500".to_string(),
            stock: "12".to_string(),
            is_available: Some("on".to_string()),
            image: String::new(),
        }
    }

    #[test]
    fn test_checkout_valid() {
        let contact = validate_checkout(&checkout_form()).unwrap();
        assert_eq!(contact.full_name, "Aster Kebede");
        assert_eq!(contact.email, None);
        assert_eq!(contact.kebele, Kebele::Mentina);
        assert_eq!(contact.payment_method, PaymentMethod::Telebirr);
    }

    #[test]
    fn test_checkout_collects_every_violation() {
        let form = CheckoutForm {
            full_name: "  ".to_string(),
            email: "not-an-email".to_string(),
            phone: "abc".to_string(),
            kebele: "atlantis".to_string(),
            ..checkout_form()
        };
        let errors = validate_checkout(&form).unwrap_err().into_inner();
        assert_eq!(
            errors,
            vec![
                ValidationError::Required("full_name"),
                ValidationError::InvalidEmail,
                ValidationError::InvalidPhone,
                ValidationError::InvalidChoice {
                    field: "kebele",
                    value: "atlantis".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_quantity() {
        assert_eq!(parse_quantity(None), Ok(1));
        assert_eq!(parse_quantity(Some(" 3 ")), Ok(3));
        assert_eq!(parse_quantity(Some("0")), Err(ValidationError::InvalidQuantity));
        assert_eq!(parse_quantity(Some("-2")), Err(ValidationError::InvalidQuantity));
        assert_eq!(parse_quantity(Some("many")), Err(ValidationError::InvalidQuantity));
    }

    #[test]
    fn test_order_status() {
        assert_eq!(parse_order_status("shipped"), Ok(OrderStatus::Shipped));
        assert!(matches!(
            parse_order_status("lost"),
            Err(ValidationError::InvalidChoice { field: "status", .. })
        ));
    }

    #[test]
    fn test_review_rating_bounds() {
        let form = |rating: &str| ReviewForm {
            rating: rating.to_string(),
            comment: "Great honey".to_string(),
            full_name: "Dawit H.".to_string(),
        };
        assert_eq!(validate_review(&form("5")).unwrap().rating.value(), 5);
        assert_eq!(
            validate_review(&form("6")).unwrap_err().into_inner(),
            vec![ValidationError::RatingOutOfRange(6)]
        );
        assert_eq!(
            validate_review(&form("0")).unwrap_err().into_inner(),
            vec![ValidationError::RatingOutOfRange(0)]
        );
        assert_eq!(
            validate_review(&form("five")).unwrap_err().into_inner(),
            vec![ValidationError::InvalidNumber("rating")]
        );
    }

    #[test]
    fn test_product_valid_derives_slug() {
        let input = validate_product(&product_form()).unwrap();
        assert_eq!(input.slug.as_str(), "traditional-coffee-pot-jebena");
        assert_eq!(input.price, Price::from_cents(50_000));
        assert_eq!(input.stock, 12);
        assert!(input.is_available);
        assert_eq!(input.image, None);
    }

    #[test]
    fn test_product_keeps_trimmed_image() {
        let form = ProductForm {
            image: "  /static/img/jebena.jpg ".to_string(),
            ..product_form()
        };
        let input = validate_product(&form).unwrap();
        assert_eq!(input.image.as_deref(), Some("/static/img/jebena.jpg"));
    }

    #[test]
    fn test_product_negative_values() {
        let form = ProductForm {
            price: "-1".to_string(),
            stock: "-5".to_string(),
            is_available: None,
            ..product_form()
        };
        let errors = validate_product(&form).unwrap_err();
        assert_eq!(
            errors.into_inner(),
            vec![ValidationError::NegativePrice, ValidationError::NegativeStock]
        );
    }

    #[test]
    fn test_product_rejects_bad_numbers_and_urls() {
        let form = ProductForm {
            price: "12abc".to_string(),
            stock: "1.5".to_string(),
            image: "javascript:alert(1)".to_string(),
            ..product_form()
        };
        let errors = validate_product(&form).unwrap_err();
        assert!(errors.has("price"));
        assert!(errors.has("stock"));
        assert!(errors.has("image"));
    }

    #[test]
    fn test_product_image_required() {
        let empty = ProductImageForm::default();
        assert_eq!(
            validate_product_image(&empty).unwrap_err().into_inner(),
            vec![ValidationError::Required("image")]
        );
        let ok = ProductImageForm {
            image: "https://cdn.example.com/jebena-side.jpg".to_string(),
        };
        assert!(validate_product_image(&ok).is_ok());
    }

    #[test]
    fn test_vendor_requires_business_name() {
        let form = VendorForm {
            business_name: String::new(),
            description: "Phones and accessories".to_string(),
            address: "Merkato road".to_string(),
            phone: "0917000000".to_string(),
            kebele: "bosa_kito".to_string(),
        };
        let errors = validate_vendor(&form).unwrap_err();
        assert_eq!(
            errors.into_inner(),
            vec![ValidationError::Required("business_name")]
        );
    }

    #[test]
    fn test_signup() {
        let form = SignupForm {
            username: "chala".to_string(),
            email: "chala@example.com".to_string(),
            first_name: "Chala".to_string(),
            last_name: "Jimma".to_string(),
            password: "correct horse".to_string(),
            password_confirm: "correct horse".to_string(),
        };
        let input = validate_signup(&form).unwrap();
        assert_eq!(input.username, "chala");
        assert!(!format!("{input:?}").contains("correct horse"));

        let mismatch = SignupForm {
            password_confirm: "battery staple".to_string(),
            ..form.clone()
        };
        assert_eq!(
            validate_signup(&mismatch).unwrap_err().into_inner(),
            vec![ValidationError::PasswordMismatch]
        );

        let short = SignupForm {
            password: "short".to_string(),
            password_confirm: "short".to_string(),
            ..form
        };
        assert!(validate_signup(&short).unwrap_err().has("password"));
    }

    #[test]
    fn test_track_order() {
        let form = TrackOrderForm {
            order_id: "#42".to_string(),
            phone: "0911223344".to_string(),
        };
        let query = validate_track_order(&form).unwrap();
        assert_eq!(query.order_id, OrderId::new(42));

        let bad = TrackOrderForm {
            order_id: "forty-two".to_string(),
            phone: String::new(),
        };
        assert_eq!(
            validate_track_order(&bad).unwrap_err().into_inner(),
            vec![
                ValidationError::InvalidNumber("order_id"),
                ValidationError::Required("phone"),
            ]
        );
    }

    #[test]
    fn test_display_joins_messages() {
        let mut errors = ValidationErrors::new();
        errors.push(ValidationError::Required("name"));
        errors.push(ValidationError::NegativePrice);
        assert_eq!(errors.to_string(), "name is required; price cannot be negative");
    }
}
