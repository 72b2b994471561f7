//! Vendor repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use gebeya_core::validation::VendorInput;
use gebeya_core::{Kebele, Role, UserId, VendorId};

use super::{RepositoryError, parse_column};
use crate::models::Vendor;

#[derive(Debug, sqlx::FromRow)]
struct VendorRow {
    id: i32,
    user_id: i32,
    business_name: String,
    description: String,
    address: String,
    phone: String,
    kebele: String,
    is_verified: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<VendorRow> for Vendor {
    type Error = RepositoryError;

    fn try_from(row: VendorRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: VendorId::new(row.id),
            user_id: UserId::new(row.user_id),
            business_name: row.business_name,
            description: row.description,
            address: row.address,
            phone: row.phone,
            kebele: parse_column::<Kebele>("kebele", &row.kebele)?,
            is_verified: row.is_verified,
            created_at: row.created_at,
        })
    }
}

const VENDOR_COLUMNS: &str =
    "id, user_id, business_name, description, address, phone, kebele, is_verified, created_at";

/// Repository for vendor database operations.
pub struct VendorRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> VendorRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a vendor by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: VendorId) -> Result<Option<Vendor>, RepositoryError> {
        sqlx::query_as::<_, VendorRow>(&format!(
            "SELECT {VENDOR_COLUMNS} FROM vendors WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .map(Vendor::try_from)
        .transpose()
    }

    /// Get the vendor record owned by a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_user(&self, user_id: UserId) -> Result<Option<Vendor>, RepositoryError> {
        sqlx::query_as::<_, VendorRow>(&format!(
            "SELECT {VENDOR_COLUMNS} FROM vendors WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?
        .map(Vendor::try_from)
        .transpose()
    }

    /// Verified vendors, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_verified(&self, limit: i64) -> Result<Vec<Vendor>, RepositoryError> {
        sqlx::query_as::<_, VendorRow>(&format!(
            "SELECT {VENDOR_COLUMNS} FROM vendors WHERE is_verified \
             ORDER BY created_at, id LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(Vendor::try_from)
        .collect()
    }

    /// Register a user as a vendor and make their profile role `seller`, in
    /// one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already has a vendor record.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn register(
        &self,
        user_id: UserId,
        input: &VendorInput,
    ) -> Result<Vendor, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, VendorRow>(&format!(
            "INSERT INTO vendors (user_id, business_name, description, address, phone, kebele) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {VENDOR_COLUMNS}"
        ))
        .bind(user_id)
        .bind(&input.business_name)
        .bind(&input.description)
        .bind(&input.address)
        .bind(input.phone.as_str())
        .bind(input.kebele.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("user is already a vendor".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        sqlx::query(
            r"
            INSERT INTO profiles (user_id, role) VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET role = EXCLUDED.role
            ",
        )
        .bind(user_id)
        .bind(Role::Seller.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Vendor::try_from(row)
    }

    /// Set or clear the verified badge.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the vendor does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_verified(&self, id: VendorId, verified: bool) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE vendors SET is_verified = $2 WHERE id = $1")
            .bind(id)
            .bind(verified)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
