//! Catalog product types.

use serde::{Deserialize, Serialize};

use super::{Badge, Price, ProductId};

/// Physical specification of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSpecs {
    /// Body material (e.g. `silicone`, `tpe`).
    pub material: String,
    /// Height in centimetres.
    pub height: u32,
    /// Weight in kilograms.
    pub weight: u32,
    /// Cup size letter (e.g. `D`).
    pub cup: String,
}

/// An immutable catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    pub price: Price,
    /// Pre-discount price. Only meaningful when greater than `price`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_at_price: Option<Price>,
    pub image: String,
    pub hover_image: String,
    /// Badges in display order.
    #[serde(default)]
    pub badges: Vec<Badge>,
    pub specs: ProductSpecs,
    /// Collection handle (e.g. `premium`).
    pub collection: String,
    /// Accent colour token, display only.
    pub color: String,
}

impl Product {
    /// Whether the product carries `badge`.
    #[must_use]
    pub fn has_badge(&self, badge: Badge) -> bool {
        self.badges.contains(&badge)
    }

    /// Whether the product is tagged `new`.
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.has_badge(Badge::New)
    }

    /// Discount against `compare_at_price`, rounded to the nearest percent.
    ///
    /// Returns `None` when there is no compare-at price or it does not
    /// exceed the selling price.
    #[must_use]
    pub fn discount_percent(&self) -> Option<u8> {
        let compare_at = u128::from(self.compare_at_price?.amount());
        let price = u128::from(self.price.amount());
        if compare_at <= price {
            return None;
        }
        // round half up: floor((c - p) * 100 / c + 1/2)
        let percent = ((compare_at - price) * 200 + compare_at) / (compare_at * 2);
        u8::try_from(percent).ok()
    }

    /// Case-insensitive substring match against name or brand.
    ///
    /// `needle` must already be lowercase.
    #[must_use]
    pub(crate) fn matches_search(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.brand.to_lowercase().contains(needle)
    }
}
