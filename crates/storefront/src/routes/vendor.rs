//! Vendor registration and dashboard.
//!
//! Every mutation is authorized against the requester's [`Identity`]: a
//! vendor may only change its own products, and may only change the status
//! of orders containing at least one of its products. Refusals redirect to
//! the dashboard with a message and change nothing.
//!
//! [`Identity`]: gebeya_core::Identity

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use gebeya_core::validation::{
    ProductForm, ProductImageForm, ProductInput, VendorForm, parse_order_status,
    validate_product, validate_product_image, validate_vendor,
};
use gebeya_core::{
    AuthorizationError, Kebele, OrderId, OrderStatus, ProductId, ValidationError,
    ValidationErrors,
};

use crate::db::{
    CategoryRepository, OrderRepository, ProductRepository, RepositoryError, VendorRepository,
};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{CurrentIdentity, RequireUser, RequireVendor, capitalize};
use crate::models::{Category, FlashMessage, Product, ProductImage, Vendor, VendorOrderItem};
use crate::page::{PageContext, redirect_with};
use crate::state::AppState;

const DASHBOARD_PATH: &str = "/vendor/dashboard/";

/// Redirect to the dashboard explaining why an action was refused.
async fn refuse(session: &Session, err: AuthorizationError) -> Result<Response> {
    tracing::info!(reason = %err, "vendor action refused");
    let message = FlashMessage::error(format!("{}.", capitalize(&err.to_string())));
    Ok(redirect_with(session, message, DASHBOARD_PATH)
        .await?
        .into_response())
}

fn current_from(user: RequireUser) -> CurrentIdentity {
    CurrentIdentity {
        user: Some(user.user),
        identity: user.identity,
    }
}

fn current_from_vendor(vendor: &RequireVendor) -> CurrentIdentity {
    CurrentIdentity {
        user: Some(vendor.user.clone()),
        identity: vendor.identity,
    }
}

// =============================================================================
// Registration
// =============================================================================

/// Vendor registration template.
#[derive(Template, WebTemplate)]
#[template(path = "vendor/register.html")]
pub struct RegisterTemplate {
    pub page: PageContext,
    pub form: VendorForm,
    pub errors: Vec<String>,
    pub kebeles: &'static [Kebele],
}

/// Display the vendor registration form. Existing vendors go to the dashboard.
#[instrument(skip(session, user))]
pub async fn register_form(session: Session, user: RequireUser) -> Result<Response> {
    if user.identity.vendor_id().is_some() {
        return Ok(Redirect::to(DASHBOARD_PATH).into_response());
    }

    let current = current_from(user);
    Ok(RegisterTemplate {
        page: PageContext::load(&session, &current).await?,
        form: VendorForm::default(),
        errors: Vec::new(),
        kebeles: Kebele::ALL,
    }
    .into_response())
}

/// Register the logged-in user as a vendor.
///
/// The vendor record and the seller role are written together.
#[instrument(skip(state, session, user, form))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    user: RequireUser,
    Form(form): Form<VendorForm>,
) -> Result<Response> {
    if user.identity.vendor_id().is_some() {
        return Ok(Redirect::to(DASHBOARD_PATH).into_response());
    }

    let input = match validate_vendor(&form) {
        Ok(input) => input,
        Err(errors) => {
            let current = current_from(user);
            return Ok(RegisterTemplate {
                page: PageContext::load(&session, &current).await?,
                form,
                errors: errors.messages(),
                kebeles: Kebele::ALL,
            }
            .into_response());
        }
    };

    match VendorRepository::new(state.pool())
        .register(user.user.id, &input)
        .await
    {
        Ok(vendor) => {
            tracing::info!(vendor_id = %vendor.id, user_id = %user.user.id, "vendor registered");
            let message = FlashMessage::success(
                "Vendor registration successful. Please wait for admin verification.",
            );
            Ok(redirect_with(&session, message, DASHBOARD_PATH)
                .await?
                .into_response())
        }
        Err(RepositoryError::Conflict(_)) => Ok(Redirect::to(DASHBOARD_PATH).into_response()),
        Err(err) => Err(err.into()),
    }
}

// =============================================================================
// Dashboard
// =============================================================================

/// Vendor dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "vendor/dashboard.html")]
pub struct DashboardTemplate {
    pub page: PageContext,
    pub vendor: Vendor,
    pub products: Vec<Product>,
    pub order_items: Vec<VendorOrderItem>,
    pub statuses: &'static [OrderStatus],
}

/// Display the vendor's products and the order lines for them.
///
/// # Errors
///
/// Returns 404 if the vendor record disappeared since the identity was resolved.
#[instrument(skip(state, session, vendor))]
pub async fn dashboard(
    State(state): State<AppState>,
    session: Session,
    vendor: RequireVendor,
) -> Result<impl IntoResponse> {
    let pool = state.pool();
    let record = VendorRepository::new(pool)
        .get_by_id(vendor.vendor_id)
        .await?
        .ok_or(AppError::Database(RepositoryError::NotFound))?;
    let products = ProductRepository::new(pool)
        .list_by_vendor(vendor.vendor_id)
        .await?;
    let order_items = OrderRepository::new(pool)
        .items_for_vendor(vendor.vendor_id)
        .await?;

    Ok(DashboardTemplate {
        page: PageContext::load(&session, &current_from_vendor(&vendor)).await?,
        vendor: record,
        products,
        order_items,
        statuses: OrderStatus::ALL,
    })
}

// =============================================================================
// Products
// =============================================================================

/// Product create/edit template.
#[derive(Template, WebTemplate)]
#[template(path = "vendor/product_form.html")]
pub struct ProductFormTemplate {
    pub page: PageContext,
    pub heading: String,
    pub action: String,
    pub form: ProductForm,
    pub errors: Vec<String>,
    pub categories: Vec<Category>,
    /// Set when editing, for the gallery section.
    pub product: Option<Product>,
    pub images: Vec<ProductImage>,
}

fn form_from_product(product: &Product) -> ProductForm {
    ProductForm {
        category: product.category_id.to_string(),
        name: product.name.clone(),
        slug: product.slug.to_string(),
        description: product.description.clone(),
        price: product.price.amount().to_string(),
        stock: product.stock.to_string(),
        is_available: product.is_available.then(|| "on".to_owned()),
        image: product.image.clone().unwrap_or_default(),
    }
}

/// Validate a product form, including that the category exists.
async fn validated_product(
    state: &AppState,
    form: &ProductForm,
) -> Result<std::result::Result<ProductInput, ValidationErrors>> {
    let input = match validate_product(form) {
        Ok(input) => input,
        Err(errors) => return Ok(Err(errors)),
    };

    if CategoryRepository::new(state.pool())
        .exists(input.category_id)
        .await?
    {
        Ok(Ok(input))
    } else {
        Ok(Err(ValidationError::InvalidChoice {
            field: "category",
            value: form.category.clone(),
        }
        .into()))
    }
}

/// Load a product and check the vendor owns it.
///
/// `Ok(Err(_))` is an authorization refusal.
async fn owned_product(
    state: &AppState,
    vendor: &RequireVendor,
    id: ProductId,
) -> Result<std::result::Result<Product, AuthorizationError>> {
    let product = ProductRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(vendor
        .identity
        .authorize_product(product.vendor_id)
        .map(|_| product))
}

/// What the product form is for.
enum ProductFormMode {
    Create,
    Edit(Product),
}

/// Render the product form, loading categories and, when editing, the gallery.
async fn render_product_form(
    state: &AppState,
    session: &Session,
    vendor: &RequireVendor,
    mode: ProductFormMode,
    form: ProductForm,
    errors: Vec<String>,
) -> Result<Response> {
    let pool = state.pool();
    let (heading, action, images, product) = match mode {
        ProductFormMode::Create => (
            "Add product".to_owned(),
            "/vendor/product/add/".to_owned(),
            Vec::new(),
            None,
        ),
        ProductFormMode::Edit(product) => (
            format!("Edit {}", product.name),
            format!("/vendor/product/edit/{}/", product.id),
            ProductRepository::new(pool).images(product.id).await?,
            Some(product),
        ),
    };

    Ok(ProductFormTemplate {
        page: PageContext::load(session, &current_from_vendor(vendor)).await?,
        heading,
        action,
        form,
        errors,
        categories: CategoryRepository::new(pool).list(None).await?,
        product,
        images,
    }
    .into_response())
}

/// Display the new product form.
#[instrument(skip(state, session, vendor))]
pub async fn new_product(
    State(state): State<AppState>,
    session: Session,
    vendor: RequireVendor,
) -> Result<Response> {
    let form = ProductForm {
        is_available: Some("on".to_owned()),
        ..ProductForm::default()
    };
    render_product_form(&state, &session, &vendor, ProductFormMode::Create, form, Vec::new())
        .await
}

/// Create a product owned by the requesting vendor.
#[instrument(skip(state, session, vendor, form))]
pub async fn create_product(
    State(state): State<AppState>,
    session: Session,
    vendor: RequireVendor,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let errors = match validated_product(&state, &form).await? {
        Ok(input) => match ProductRepository::new(state.pool())
            .create(vendor.vendor_id, &input)
            .await
        {
            Ok(product) => {
                tracing::info!(
                    product_id = %product.id,
                    vendor_id = %vendor.vendor_id,
                    "product created"
                );
                let message = FlashMessage::success(format!("{} was added.", product.name));
                return Ok(redirect_with(&session, message, DASHBOARD_PATH)
                    .await?
                    .into_response());
            }
            Err(RepositoryError::Conflict(msg)) => vec![msg],
            Err(err) => return Err(err.into()),
        },
        Err(errors) => errors.messages(),
    };

    render_product_form(&state, &session, &vendor, ProductFormMode::Create, form, errors).await
}

/// Display the edit form for one of the vendor's products.
///
/// # Errors
///
/// Returns 404 if the product does not exist.
#[instrument(skip(state, session, vendor))]
pub async fn edit_product(
    State(state): State<AppState>,
    session: Session,
    vendor: RequireVendor,
    Path(id): Path<ProductId>,
) -> Result<Response> {
    let product = match owned_product(&state, &vendor, id).await? {
        Ok(product) => product,
        Err(err) => return refuse(&session, err).await,
    };

    let form = form_from_product(&product);
    render_product_form(
        &state,
        &session,
        &vendor,
        ProductFormMode::Edit(product),
        form,
        Vec::new(),
    )
    .await
}

/// Update one of the vendor's products.
///
/// # Errors
///
/// Returns 404 if the product does not exist.
#[instrument(skip(state, session, vendor, form))]
pub async fn update_product(
    State(state): State<AppState>,
    session: Session,
    vendor: RequireVendor,
    Path(id): Path<ProductId>,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let product = match owned_product(&state, &vendor, id).await? {
        Ok(product) => product,
        Err(err) => return refuse(&session, err).await,
    };

    let errors = match validated_product(&state, &form).await? {
        Ok(input) => match ProductRepository::new(state.pool()).update(id, &input).await {
            Ok(updated) => {
                tracing::info!(product_id = %id, vendor_id = %vendor.vendor_id, "product updated");
                let message = FlashMessage::success(format!("{} was updated.", updated.name));
                return Ok(redirect_with(&session, message, DASHBOARD_PATH)
                    .await?
                    .into_response());
            }
            Err(RepositoryError::Conflict(msg)) => vec![msg],
            Err(err) => return Err(err.into()),
        },
        Err(errors) => errors.messages(),
    };

    render_product_form(
        &state,
        &session,
        &vendor,
        ProductFormMode::Edit(product),
        form,
        errors,
    )
    .await
}

/// Delete one of the vendor's products.
///
/// A product that has been ordered cannot be deleted without losing order
/// history, so it is hidden from the catalog instead.
///
/// # Errors
///
/// Returns 404 if the product does not exist.
#[instrument(skip(state, session, vendor))]
pub async fn delete_product(
    State(state): State<AppState>,
    session: Session,
    vendor: RequireVendor,
    Path(id): Path<ProductId>,
) -> Result<Response> {
    let product = match owned_product(&state, &vendor, id).await? {
        Ok(product) => product,
        Err(err) => return refuse(&session, err).await,
    };
    let products = ProductRepository::new(state.pool());

    let message = match products.delete(id).await {
        Ok(()) => {
            tracing::info!(product_id = %id, vendor_id = %vendor.vendor_id, "product deleted");
            FlashMessage::success(format!("{} was deleted.", product.name))
        }
        Err(RepositoryError::Conflict(_)) => {
            products.hide(id).await?;
            tracing::info!(product_id = %id, vendor_id = %vendor.vendor_id, "ordered product hidden");
            FlashMessage::info(format!(
                "{} has existing orders, so it was hidden from the catalog instead of deleted.",
                product.name
            ))
        }
        Err(err) => return Err(err.into()),
    };

    Ok(redirect_with(&session, message, DASHBOARD_PATH)
        .await?
        .into_response())
}

/// Add a gallery image to one of the vendor's products.
///
/// # Errors
///
/// Returns 404 if the product does not exist.
#[instrument(skip(state, session, vendor, form))]
pub async fn add_image(
    State(state): State<AppState>,
    session: Session,
    vendor: RequireVendor,
    Path(id): Path<ProductId>,
    Form(form): Form<ProductImageForm>,
) -> Result<Response> {
    if let Err(err) = owned_product(&state, &vendor, id).await? {
        return refuse(&session, err).await;
    }
    let back = format!("/vendor/product/edit/{id}/");

    let message = match validate_product_image(&form) {
        Ok(image) => {
            ProductRepository::new(state.pool())
                .add_image(id, &image)
                .await?;
            FlashMessage::success("Image added.")
        }
        Err(errors) => FlashMessage::error(format!("The image could not be added: {errors}.")),
    };

    Ok(redirect_with(&session, message, &back).await?.into_response())
}

// =============================================================================
// Orders
// =============================================================================

/// Order status form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OrderStatusForm {
    pub status: String,
}

/// Set the status of an order containing the vendor's products.
///
/// Any participating vendor may set the shared status of a multi-vendor order.
///
/// # Errors
///
/// Returns 404 if the order does not exist.
#[instrument(skip(state, session, vendor, form))]
pub async fn update_order_status(
    State(state): State<AppState>,
    session: Session,
    vendor: RequireVendor,
    Path(id): Path<OrderId>,
    Form(form): Form<OrderStatusForm>,
) -> Result<Response> {
    let orders = OrderRepository::new(state.pool());
    let item_vendors = orders
        .item_vendors(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    let vendor_id = match vendor.identity.authorize_order_status(item_vendors.iter().copied()) {
        Ok(vendor_id) => vendor_id,
        Err(err) => return refuse(&session, err).await,
    };

    let message = match parse_order_status(&form.status) {
        Ok(status) => {
            orders.set_status(id, status).await?;
            tracing::info!(
                order_id = %id,
                vendor_id = %vendor_id,
                status = status.as_str(),
                vendors_in_order = item_vendors.len(),
                "order status updated"
            );
            FlashMessage::success(format!("Order #{id} is now {status}."))
        }
        Err(err) => FlashMessage::error(format!("Order #{id} was not changed: {err}.")),
    };

    Ok(redirect_with(&session, message, DASHBOARD_PATH)
        .await?
        .into_response())
}
