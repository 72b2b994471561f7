//! Catalog domain types: categories, vendors, products, gallery images and reviews.

use chrono::{DateTime, Utc};

use gebeya_core::{
    CategoryId, Kebele, Price, ProductId, ProductImageId, Rating, ReviewId, Slug, UserId, VendorId,
};

/// A product category.
#[derive(Debug, Clone)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: Slug,
    pub image: Option<String>,
    pub description: String,
}

/// A seller, one per user.
#[derive(Debug, Clone)]
pub struct Vendor {
    pub id: VendorId,
    pub user_id: UserId,
    pub business_name: String,
    pub description: String,
    pub address: String,
    /// Normalized phone number.
    pub phone: String,
    pub kebele: Kebele,
    /// Set by an administrator; verified vendors are listed on the home page.
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

/// A product offered by a vendor.
#[derive(Debug, Clone)]
pub struct Product {
    pub id: ProductId,
    pub category_id: CategoryId,
    pub vendor_id: VendorId,
    pub name: String,
    pub slug: Slug,
    pub image: Option<String>,
    pub description: String,
    /// Current price. Orders keep their own snapshot.
    pub price: Price,
    /// Informational only; checkout never decrements it.
    pub stock: i32,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product with the names needed to render a card.
#[derive(Debug, Clone)]
pub struct ProductListing {
    pub product: Product,
    pub category_name: String,
    pub category_slug: Slug,
    pub vendor_name: String,
    pub vendor_kebele: Kebele,
    pub vendor_verified: bool,
}

/// An extra gallery image.
#[derive(Debug, Clone)]
pub struct ProductImage {
    pub id: ProductImageId,
    pub product_id: ProductId,
    pub image: String,
}

/// A buyer review. Immutable once written.
#[derive(Debug, Clone)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    /// Author account, cleared if the account is deleted.
    pub user_id: Option<UserId>,
    pub rating: Rating,
    pub comment: String,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
}
