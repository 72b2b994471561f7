//! Vendor management.

use gebeya_storefront::db::{UserRepository, VendorRepository};

use super::{CommandError, connect};

/// Set or clear the verified badge of the vendor owned by `username`.
pub async fn verify(username: &str, verified: bool) -> Result<(), CommandError> {
    let pool = connect().await?;

    let user_id = UserRepository::new(&pool)
        .id_by_username(username)
        .await?
        .ok_or_else(|| CommandError::Invalid(format!("No user named {username}")))?;

    let vendors = VendorRepository::new(&pool);
    let vendor = vendors
        .get_by_user(user_id)
        .await?
        .ok_or_else(|| CommandError::Invalid(format!("{username} is not a vendor")))?;

    vendors.set_verified(vendor.id, verified).await?;

    tracing::info!(
        vendor_id = %vendor.id,
        business = %vendor.business_name,
        verified,
        "Vendor verification updated"
    );
    Ok(())
}
