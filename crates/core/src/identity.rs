//! Request identity and vendor authorization.
//!
//! Every request resolves to exactly one [`Identity`]. Vendor operations go
//! through the `authorize_*` methods, which return the acting vendor's ID on
//! success so handlers never act on an ID they did not get from here.

use serde::Serialize;

use crate::types::{Role, UserId, VendorId};

/// Who is making a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Identity {
    /// Not logged in.
    Guest,
    /// Logged-in user without a vendor record.
    Customer(UserId),
    /// Logged-in user owning a vendor record.
    Vendor { user_id: UserId, vendor_id: VendorId },
    /// Logged-in user whose profile role is admin.
    Admin(UserId),
}

/// Reasons a vendor operation is refused.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationError {
    #[error("you must be logged in")]
    NotAuthenticated,
    #[error("you must register as a vendor first")]
    NotVendor,
    #[error("you do not have permission to change this product")]
    NotProductOwner,
    #[error("you do not have permission to update this order")]
    NotOrderParticipant,
}

impl Identity {
    /// Resolve an identity from the session user, their profile role and
    /// their vendor record.
    ///
    /// The admin role takes precedence; otherwise owning a vendor record
    /// makes the user a vendor regardless of the stored role.
    #[must_use]
    pub const fn resolve(user: Option<(UserId, Role)>, vendor_id: Option<VendorId>) -> Self {
        match (user, vendor_id) {
            (None, _) => Self::Guest,
            (Some((user_id, Role::Admin)), _) => Self::Admin(user_id),
            (Some((user_id, _)), Some(vendor_id)) => Self::Vendor { user_id, vendor_id },
            (Some((user_id, _)), None) => Self::Customer(user_id),
        }
    }

    /// The logged-in user, if any.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Guest => None,
            Self::Customer(user_id) | Self::Admin(user_id) | Self::Vendor { user_id, .. } => {
                Some(*user_id)
            }
        }
    }

    /// The vendor record, if this identity is a vendor.
    #[must_use]
    pub const fn vendor_id(&self) -> Option<VendorId> {
        match self {
            Self::Vendor { vendor_id, .. } => Some(*vendor_id),
            Self::Guest | Self::Customer(_) | Self::Admin(_) => None,
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        !matches!(self, Self::Guest)
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin(_))
    }

    /// Require a vendor identity.
    ///
    /// # Errors
    ///
    /// [`AuthorizationError::NotAuthenticated`] for guests,
    /// [`AuthorizationError::NotVendor`] for everyone else who is not a vendor.
    pub const fn require_vendor(&self) -> Result<VendorId, AuthorizationError> {
        match self {
            Self::Vendor { vendor_id, .. } => Ok(*vendor_id),
            Self::Guest => Err(AuthorizationError::NotAuthenticated),
            Self::Customer(_) | Self::Admin(_) => Err(AuthorizationError::NotVendor),
        }
    }

    /// Authorize a mutation of a product owned by `owner`.
    ///
    /// # Errors
    ///
    /// Anything [`Identity::require_vendor`] returns, or
    /// [`AuthorizationError::NotProductOwner`] when the product belongs to
    /// another vendor.
    pub fn authorize_product(&self, owner: VendorId) -> Result<VendorId, AuthorizationError> {
        let vendor_id = self.require_vendor()?;
        if vendor_id == owner {
            Ok(vendor_id)
        } else {
            Err(AuthorizationError::NotProductOwner)
        }
    }

    /// Authorize a status change on an order whose items belong to the given
    /// vendors.
    ///
    /// Any vendor with at least one item in the order may set its status.
    ///
    /// # Errors
    ///
    /// Anything [`Identity::require_vendor`] returns, or
    /// [`AuthorizationError::NotOrderParticipant`] when none of the items are
    /// this vendor's.
    pub fn authorize_order_status<I>(
        &self,
        item_vendors: I,
    ) -> Result<VendorId, AuthorizationError>
    where
        I: IntoIterator<Item = VendorId>,
    {
        let vendor_id = self.require_vendor()?;
        if item_vendors.into_iter().any(|v| v == vendor_id) {
            Ok(vendor_id)
        } else {
            Err(AuthorizationError::NotOrderParticipant)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER: UserId = UserId::new(10);
    const OWN: VendorId = VendorId::new(1);
    const OTHER: VendorId = VendorId::new(2);

    fn vendor() -> Identity {
        Identity::resolve(Some((USER, Role::Seller)), Some(OWN))
    }

    #[test]
    fn test_resolve_precedence() {
        assert_eq!(Identity::resolve(None, Some(OWN)), Identity::Guest);
        assert_eq!(
            Identity::resolve(Some((USER, Role::Admin)), Some(OWN)),
            Identity::Admin(USER)
        );
        assert_eq!(
            Identity::resolve(Some((USER, Role::Customer)), Some(OWN)),
            Identity::Vendor {
                user_id: USER,
                vendor_id: OWN
            }
        );
        assert_eq!(
            Identity::resolve(Some((USER, Role::Seller)), None),
            Identity::Customer(USER)
        );
    }

    #[test]
    fn test_non_vendors_cannot_reach_vendor_operations() {
        for identity in [Identity::Guest, Identity::Customer(USER), Identity::Admin(USER)] {
            assert!(identity.require_vendor().is_err());
            assert!(identity.authorize_product(OWN).is_err());
            assert!(identity.authorize_order_status([OWN]).is_err());
        }
        assert_eq!(
            Identity::Guest.require_vendor(),
            Err(AuthorizationError::NotAuthenticated)
        );
        assert_eq!(
            Identity::Customer(USER).require_vendor(),
            Err(AuthorizationError::NotVendor)
        );
    }

    #[test]
    fn test_product_ownership() {
        assert_eq!(vendor().authorize_product(OWN), Ok(OWN));
        assert_eq!(
            vendor().authorize_product(OTHER),
            Err(AuthorizationError::NotProductOwner)
        );
    }

    #[test]
    fn test_order_participation() {
        assert_eq!(vendor().authorize_order_status([OTHER, OWN]), Ok(OWN));
        assert_eq!(
            vendor().authorize_order_status([OTHER]),
            Err(AuthorizationError::NotOrderParticipant)
        );
        assert_eq!(
            vendor().authorize_order_status(Vec::new()),
            Err(AuthorizationError::NotOrderParticipant)
        );
    }

    #[test]
    fn test_accessors() {
        assert_eq!(vendor().user_id(), Some(USER));
        assert_eq!(vendor().vendor_id(), Some(OWN));
        assert!(!Identity::Guest.is_authenticated());
        assert!(Identity::Admin(USER).is_admin());
        assert_eq!(Identity::Admin(USER).vendor_id(), None);
    }
}
