//! Enumerated choices: order status, roles, neighborhoods, delivery slots,
//! payment methods and catalog sort orders.
//!
//! Every choice has a stable snake_case value (used in forms, query strings
//! and database columns) and a human-readable label for templates.

use serde::{Deserialize, Serialize};

/// A submitted value did not match any of the allowed choices.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {value:?}")]
pub struct UnknownChoice {
    /// Which enumeration was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Define a string-backed choice enum.
///
/// Generates `ALL`, `as_str()`, `label()`, `Display` (the label), `FromStr`
/// (the value), and serde support through the value.
macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => ($value:literal, $label:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(into = "&'static str", try_from = "String")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant, in display order.
            pub const ALL: &'static [Self] = &[ $( Self::$variant ),+ ];

            /// Stable value used in forms and storage.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $value ),+
                }
            }

            /// Human-readable label.
            #[must_use]
            pub const fn label(self) -> &'static str {
                match self {
                    $( Self::$variant => $label ),+
                }
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.label())
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = UnknownChoice;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $( $value => Ok(Self::$variant), )+
                    other => Err(UnknownChoice {
                        kind: $kind,
                        value: other.to_owned(),
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = UnknownChoice;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for &'static str {
            fn from(value: $name) -> Self {
                value.as_str()
            }
        }
    };
}

choice_enum! {
    /// Order lifecycle status.
    ///
    /// There is no enforced transition graph: any participating vendor may
    /// move an order to any status.
    #[derive(Default)]
    OrderStatus, "order status" {
        #[default]
        Pending => ("pending", "Pending"),
        Processing => ("processing", "Processing"),
        Shipped => ("shipped", "Shipped"),
        Delivered => ("delivered", "Delivered"),
        Cancelled => ("cancelled", "Cancelled"),
    }
}

choice_enum! {
    /// Account role stored on the user's profile.
    #[derive(Default)]
    Role, "role" {
        #[default]
        Customer => ("customer", "Customer"),
        Seller => ("seller", "Seller"),
        Admin => ("admin", "Admin"),
    }
}

choice_enum! {
    /// Jimma neighborhood (kebele) used for vendor location and delivery.
    Kebele, "kebele" {
        Hermata => ("hermata", "Hermata"),
        Mentina => ("mentina", "Mentina"),
        BosaAddis => ("bosa_addis", "Bosa Addis"),
        BosaKito => ("bosa_kito", "Bosa Kito"),
        Ginjo => ("ginjo", "Ginjo"),
        GinjoGuduru => ("ginjo_guduru", "Ginjo Guduru"),
        AwetuMendera => ("awetu_mendera", "Awetu Mendera"),
        BechoBore => ("becho_bore", "Becho Bore"),
        Kofe => ("kofe", "Kofe"),
        SetoSemero => ("seto_semero", "Seto Semero"),
        MenderaKochi => ("mendera_kochi", "Mendera Kochi"),
        Jiren => ("jiren", "Jiren"),
        Other => ("other", "Other"),
    }
}

choice_enum! {
    /// Delivery window chosen at checkout.
    DeliveryTimeSlot, "delivery time slot" {
        Morning => ("morning", "Morning (8:00 - 12:00)"),
        Afternoon => ("afternoon", "Afternoon (12:00 - 16:00)"),
        Evening => ("evening", "Evening (16:00 - 20:00)"),
    }
}

choice_enum! {
    /// How the buyer intends to pay.
    PaymentMethod, "payment method" {
        CashOnDelivery => ("cash_on_delivery", "Cash on delivery"),
        Telebirr => ("telebirr", "Telebirr"),
        CbeBirr => ("cbe_birr", "CBE Birr bank transfer"),
    }
}

choice_enum! {
    /// Catalog listing order.
    #[derive(Default)]
    ProductSort, "sort" {
        #[default]
        Newest => ("newest", "Newest"),
        PriceLow => ("price_low", "Price: low to high"),
        PriceHigh => ("price_high", "Price: high to low"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_defaults_to_pending() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_values_round_trip_through_from_str() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), *status);
        }
        for kebele in Kebele::ALL {
            assert_eq!(kebele.as_str().parse::<Kebele>().unwrap(), *kebele);
        }
    }

    #[test]
    fn test_unknown_choice() {
        let err = "refunded".parse::<OrderStatus>().unwrap_err();
        assert_eq!(err.kind, "order status");
        assert_eq!(err.value, "refunded");
    }

    #[test]
    fn test_serde_uses_value() {
        let json = serde_json::to_string(&PaymentMethod::CashOnDelivery).unwrap();
        assert_eq!(json, "\"cash_on_delivery\"");
        let back: PaymentMethod = serde_json::from_str("\"telebirr\"").unwrap();
        assert_eq!(back, PaymentMethod::Telebirr);
        assert!(serde_json::from_str::<Role>("\"root\"").is_err());
    }

    #[test]
    fn test_display_uses_label() {
        assert_eq!(Kebele::MenderaKochi.to_string(), "Mendera Kochi");
        assert_eq!(ProductSort::PriceLow.as_str(), "price_low");
    }
}
