//! User role value object.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Marketplace role of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Lists and manages products.
    Seller,
    /// Buys products through the cart.
    #[default]
    Customer,
}

impl UserRole {
    /// Stable lowercase name used in storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Seller => "seller",
            Self::Customer => "customer",
        }
    }

    /// Parses a role name, case-insensitively.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "seller" => Some(Self::Seller),
            "customer" => Some(Self::Customer),
            _ => None,
        }
    }

    #[must_use]
    pub const fn can_sell(&self) -> bool {
        matches!(self, Self::Seller)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
