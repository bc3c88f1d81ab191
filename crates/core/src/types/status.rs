//! Tag and role enums.

use serde::{Deserialize, Serialize};

/// Merchandising badge shown on a product card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Badge {
    /// Recently added to the catalog. Drives the `newest` sort.
    New,
    Sale,
    Bestseller,
    Limited,
    Exclusive,
}

impl Badge {
    /// Lowercase label as shown on the storefront.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Sale => "sale",
            Self::Bestseller => "bestseller",
            Self::Limited => "limited",
            Self::Exclusive => "exclusive",
        }
    }
}

/// Role of a signed-in shopper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Guest,
    /// Regular account holder. Login and registration always yield this role.
    #[default]
    Customer,
    Admin,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_serde_lowercase() {
        let json = serde_json::to_string(&[Badge::New, Badge::Bestseller]).unwrap();
        assert_eq!(json, r#"["new","bestseller"]"#);

        let parsed: Badge = serde_json::from_str("\"exclusive\"").unwrap();
        assert_eq!(parsed, Badge::Exclusive);
        assert_eq!(parsed.as_str(), "exclusive");
    }

    #[test]
    fn test_role_default_is_customer() {
        assert_eq!(UserRole::default(), UserRole::Customer);
        assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), "\"admin\"");
    }
}
