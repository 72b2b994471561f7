//! Seed the database with demo data.
//!
//! Creates the marketplace categories, a demo vendor (`vendor1`, "Ethio Tech
//! Solutions") with four products, a handful of reviews and one published
//! blog article. Records that already exist are left alone, so the command
//! can be run again safely.

use gebeya_core::validation::{
    ProductForm, ReviewForm, SignupForm, VendorForm, validate_product, validate_review,
    validate_vendor,
};
use gebeya_core::{CategoryId, Role, Slug};
use gebeya_storefront::db::{
    ArticleRepository, CategoryRepository, ProductRepository, ReviewRepository, UserRepository,
    VendorRepository,
};
use gebeya_storefront::models::Vendor;
use gebeya_storefront::services::AuthService;
use sqlx::PgPool;
use tracing::info;

use super::{CommandError, connect};

/// Category name and description.
const CATEGORIES: &[(&str, &str)] = &[
    ("Electronics", "Phones, computers and accessories."),
    ("Clothing", "Traditional and everyday wear."),
    ("Home & Garden", "Furniture, kitchenware and tools."),
    ("Food & Groceries", "Coffee, honey, spices and staples."),
    ("Handmade Crafts", "Pottery, baskets and woven goods."),
    ("Books", "Books in Afaan Oromoo, Amharic and English."),
];

struct DemoProduct {
    name: &'static str,
    category: &'static str,
    price: &'static str,
    stock: &'static str,
    description: &'static str,
}

const PRODUCTS: &[DemoProduct] = &[
    DemoProduct {
        name: "Smartphone X1",
        category: "Electronics",
        price: "25000",
        stock: "10",
        description: "High performance smartphone.",
    },
    DemoProduct {
        name: "Traditional Coffee Pot (Jebena)",
        category: "Handmade Crafts",
        price: "500",
        stock: "25",
        description: "Handmade traditional clay pot.",
    },
    DemoProduct {
        name: "Cotton Scarf",
        category: "Clothing",
        price: "1200",
        stock: "15",
        description: "Pure Ethiopian cotton.",
    },
    DemoProduct {
        name: "Organic Honey",
        category: "Food & Groceries",
        price: "800",
        stock: "40",
        description: "Pure honey from Gojam.",
    },
];

/// Product name, reviewer, rating, comment.
const REVIEWS: &[(&str, &str, &str, &str)] = &[
    (
        "Smartphone X1",
        "Chala Jimma",
        "5",
        "Excellent quality! Highly recommended for anyone in Jimma.",
    ),
    (
        "Smartphone X1",
        "Aster K.",
        "4",
        "Very good service and the product is as described.",
    ),
    (
        "Traditional Coffee Pot (Jebena)",
        "Dawit H.",
        "5",
        "Fast delivery to Kochi and great price.",
    ),
    (
        "Cotton Scarf",
        "Mulu B.",
        "3",
        "Decent product, but took a bit longer to arrive.",
    ),
];

const ARTICLE_TITLE: &str = "Welcome to Gebeya";

const ARTICLE_CONTENT: &str = "\
Gebeya brings the shops of Jimma online.

## Ordering

Add products from any vendor to your cart and check out once. Choose your
kebele and a delivery time slot, then pay **cash on delivery** or with
mobile money.

## Tracking

Keep your order number. Enter it with your phone number on the
[tracking page](/track-order/) to see where your order is.
";

const DEMO_VENDOR_USERNAME: &str = "vendor1";

/// Seed everything.
pub async fn run(vendor_password: &str) -> Result<(), CommandError> {
    let pool = connect().await?;

    let categories = seed_categories(&pool).await?;
    let vendor = seed_vendor(&pool, vendor_password).await?;
    seed_products(&pool, &vendor, &categories).await?;
    seed_article(&pool).await?;

    info!("Seeding complete!");
    Ok(())
}

async fn seed_categories(pool: &PgPool) -> Result<Vec<(&'static str, CategoryId)>, CommandError> {
    let repo = CategoryRepository::new(pool);
    let mut ids = Vec::with_capacity(CATEGORIES.len());

    for &(name, description) in CATEGORIES {
        let slug = Slug::from_name(name);
        let category = match repo.get_by_slug(slug.as_str()).await? {
            Some(existing) => existing,
            None => {
                let created = repo.create(name, description, None).await?;
                info!("Category created: {name}");
                created
            }
        };
        ids.push((name, category.id));
    }

    Ok(ids)
}

async fn seed_vendor(pool: &PgPool, password: &str) -> Result<Vendor, CommandError> {
    let users = UserRepository::new(pool);
    let user_id = match users.id_by_username(DEMO_VENDOR_USERNAME).await? {
        Some(id) => id,
        None => {
            let form = SignupForm {
                username: DEMO_VENDOR_USERNAME.to_owned(),
                email: "vendor1@example.com".to_owned(),
                first_name: "Abebe".to_owned(),
                last_name: "Tesfaye".to_owned(),
                password: password.to_owned(),
                password_confirm: password.to_owned(),
            };
            let user = AuthService::new(pool)
                .create_account(&form, Role::Seller)
                .await?;
            info!("Vendor user created: {DEMO_VENDOR_USERNAME}");
            user.id
        }
    };

    let vendors = VendorRepository::new(pool);
    if let Some(vendor) = vendors.get_by_user(user_id).await? {
        return Ok(vendor);
    }

    let input = validate_vendor(&VendorForm {
        business_name: "Ethio Tech Solutions".to_owned(),
        description: "Leading provider of tech gadgets in Jimma.".to_owned(),
        address: "Merkato, Jimma".to_owned(),
        phone: "+251911000000".to_owned(),
        kebele: "hermata".to_owned(),
    })
    .map_err(|e| CommandError::Invalid(e.to_string()))?;

    let vendor = vendors.register(user_id, &input).await?;
    vendors.set_verified(vendor.id, true).await?;
    info!("Vendor created: {}", vendor.business_name);
    Ok(vendor)
}

async fn seed_products(
    pool: &PgPool,
    vendor: &Vendor,
    categories: &[(&'static str, CategoryId)],
) -> Result<(), CommandError> {
    let products = ProductRepository::new(pool);
    let reviews = ReviewRepository::new(pool);
    let existing = products.list_by_vendor(vendor.id).await?;

    for demo in PRODUCTS {
        if existing.iter().any(|p| p.name == demo.name) {
            continue;
        }

        let category_id = categories
            .iter()
            .find(|(name, _)| *name == demo.category)
            .map(|(_, id)| *id)
            .ok_or_else(|| CommandError::Invalid(format!("unknown category {}", demo.category)))?;

        let input = validate_product(&ProductForm {
            category: category_id.to_string(),
            name: demo.name.to_owned(),
            slug: String::new(),
            description: demo.description.to_owned(),
            price: demo.price.to_owned(),
            stock: demo.stock.to_owned(),
            is_available: Some("on".to_owned()),
            image: String::new(),
        })
        .map_err(|e| CommandError::Invalid(e.to_string()))?;

        let product = products.create(vendor.id, &input).await?;
        info!("Product created: {}", product.name);

        // Reviews only accompany freshly created products.
        for &(_, full_name, rating, comment) in
            REVIEWS.iter().filter(|(name, ..)| *name == demo.name)
        {
            let review = validate_review(&ReviewForm {
                rating: rating.to_owned(),
                comment: comment.to_owned(),
                full_name: full_name.to_owned(),
            })
            .map_err(|e| CommandError::Invalid(e.to_string()))?;
            reviews.create(product.id, None, &review).await?;
        }
    }

    Ok(())
}

async fn seed_article(pool: &PgPool) -> Result<(), CommandError> {
    let articles = ArticleRepository::new(pool);
    let slug = Slug::from_name(ARTICLE_TITLE);
    if articles.get_by_slug(slug.as_str()).await?.is_some() {
        return Ok(());
    }

    articles
        .create(ARTICLE_TITLE, ARTICLE_CONTENT, None, true)
        .await?;
    info!("Article created: {ARTICLE_TITLE}");
    Ok(())
}
