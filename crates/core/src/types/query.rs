//! Product listing query types.
//!
//! A [`ProductQuery`] is a structured set of filters with explicit
//! defaults: empty sets and the full price window mean "no filter", so
//! callers never need to distinguish a missing filter from an empty one.
//! Queries are `Hash + Eq` so they can key cached listings.

use core::fmt;
use core::str::FromStr;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{Price, PriceWindow, Product};

/// Height bucket for the height filter.
///
/// Boundaries are half-open: `150-160` means `150 <= h < 160`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HeightRange {
    #[serde(rename = "<150", alias = "< 150")]
    Under150,
    #[serde(rename = "150-160")]
    From150To160,
    #[serde(rename = "160-170")]
    From160To170,
    #[serde(rename = "170+")]
    From170,
}

impl HeightRange {
    /// All buckets in ascending order.
    pub const ALL: [Self; 4] = [
        Self::Under150,
        Self::From150To160,
        Self::From160To170,
        Self::From170,
    ];

    /// Whether a height in centimetres falls in this bucket.
    #[must_use]
    pub const fn contains(self, height: u32) -> bool {
        match self {
            Self::Under150 => height < 150,
            Self::From150To160 => height >= 150 && height < 160,
            Self::From160To170 => height >= 160 && height < 170,
            Self::From170 => height >= 170,
        }
    }

    /// Canonical label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Under150 => "<150",
            Self::From150To160 => "150-160",
            Self::From160To170 => "160-170",
            Self::From170 => "170+",
        }
    }
}

impl fmt::Display for HeightRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a height bucket label is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown height range: {0}")]
pub struct UnknownHeightRange(pub String);

impl FromStr for HeightRange {
    type Err = UnknownHeightRange;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "<150" | "< 150" => Ok(Self::Under150),
            "150-160" => Ok(Self::From150To160),
            "160-170" => Ok(Self::From160To170),
            "170+" => Ok(Self::From170),
            other => Err(UnknownHeightRange(other.to_string())),
        }
    }
}

/// Listing order, applied after filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortBy {
    /// Catalog order, untouched.
    #[default]
    Featured,
    PriceAsc,
    PriceDesc,
    /// Products tagged `new` first; otherwise catalog order.
    Newest,
}

impl SortBy {
    /// Reorder `products` in place. Every ordering is stable.
    pub fn apply(self, products: &mut [Product]) {
        match self {
            Self::Featured => {}
            Self::PriceAsc => products.sort_by_key(|p| p.price),
            Self::PriceDesc => products.sort_by_key(|p| core::cmp::Reverse(p.price)),
            Self::Newest => products.sort_by_key(|p| !p.is_new()),
        }
    }
}

/// Filter predicates, AND-combined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductFilters {
    pub price_range: PriceWindow,
    /// Accepted materials. Empty accepts all.
    pub materials: BTreeSet<String>,
    /// Accepted height buckets; a product passes if it is in any of them.
    pub heights: BTreeSet<HeightRange>,
    /// Accepted cup sizes. Empty accepts all.
    pub cups: BTreeSet<String>,
    /// Exact collection handle.
    pub collection: Option<String>,
    /// Case-insensitive substring of name or brand.
    pub search: Option<String>,
}

impl ProductFilters {
    /// Whether `product` satisfies every active predicate.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        self.price_range.contains(product.price)
            && (self.materials.is_empty() || self.materials.contains(&product.specs.material))
            && (self.heights.is_empty()
                || self.heights.iter().any(|h| h.contains(product.specs.height)))
            && (self.cups.is_empty() || self.cups.contains(&product.specs.cup))
            && self
                .collection
                .as_deref()
                .filter(|c| !c.is_empty())
                .is_none_or(|c| product.collection == c)
            && self
                .search_needle()
                .is_none_or(|needle| product.matches_search(&needle))
    }

    fn search_needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// Select `material` if unselected, otherwise unselect it.
    pub fn toggle_material(&mut self, material: &str) {
        toggle(&mut self.materials, material.to_string());
    }

    /// Select `height` if unselected, otherwise unselect it.
    pub fn toggle_height(&mut self, height: HeightRange) {
        toggle(&mut self.heights, height);
    }

    /// Select `cup` if unselected, otherwise unselect it.
    pub fn toggle_cup(&mut self, cup: &str) {
        toggle(&mut self.cups, cup.to_string());
    }

    /// Reset every filter, restoring `price_range` to `window`.
    pub fn clear(&mut self, window: PriceWindow) {
        *self = Self {
            price_range: window,
            ..Self::default()
        };
    }

    /// Number of active facet selections, counting a narrowed price
    /// window (relative to `default_window`) as one.
    #[must_use]
    pub fn active_count(&self, default_window: PriceWindow) -> usize {
        let narrowed = self.price_range.min > default_window.min
            || self.price_range.max < default_window.max;
        self.materials.len() + self.heights.len() + self.cups.len() + usize::from(narrowed)
    }
}

fn toggle<T: Ord>(set: &mut BTreeSet<T>, value: T) {
    if !set.remove(&value) {
        set.insert(value);
    }
}

/// A page request. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Create a page request. `page` and `page_size` are clamped to at least 1.
    #[must_use]
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }
}

/// Filters, order and optional paging for a product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductQuery {
    #[serde(flatten)]
    pub filters: ProductFilters,
    pub sort_by: SortBy,
    /// `None` returns every match as a single page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<PageRequest>,
}

impl ProductQuery {
    /// An unfiltered, featured-order query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_price_range(mut self, min: u64, max: u64) -> Self {
        self.filters.price_range = PriceWindow::new(min, max);
        self
    }

    #[must_use]
    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.filters.materials.insert(material.into());
        self
    }

    #[must_use]
    pub fn with_height(mut self, height: HeightRange) -> Self {
        self.filters.heights.insert(height);
        self
    }

    #[must_use]
    pub fn with_cup(mut self, cup: impl Into<String>) -> Self {
        self.filters.cups.insert(cup.into());
        self
    }

    #[must_use]
    pub fn in_collection(mut self, collection: impl Into<String>) -> Self {
        self.filters.collection = Some(collection.into());
        self
    }

    #[must_use]
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.filters.search = Some(text.into());
        self
    }

    #[must_use]
    pub fn sorted_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    #[must_use]
    pub fn paged(mut self, page: u32, page_size: u32) -> Self {
        self.page = Some(PageRequest::new(page, page_size));
        self
    }
}

/// Result of a product listing query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductList {
    pub products: Vec<Product>,
    /// Number of matches before paging.
    pub total: usize,
    pub page: u32,
    pub page_size: usize,
}

impl ProductList {
    /// Split sorted matches into the requested page.
    #[must_use]
    pub fn paginate(matches: Vec<Product>, page: Option<PageRequest>) -> Self {
        let total = matches.len();
        let Some(request) = page else {
            return Self {
                products: matches,
                total,
                page: 1,
                page_size: total,
            };
        };

        let page_size = request.page_size as usize;
        let skip = (request.page.saturating_sub(1) as usize).saturating_mul(page_size);
        Self {
            products: matches.into_iter().skip(skip).take(page_size).collect(),
            total,
            page: request.page,
            page_size,
        }
    }

    /// Lowest and highest price among the returned products.
    #[must_use]
    pub fn price_bounds(&self) -> Option<(Price, Price)> {
        let min = self.products.iter().map(|p| p.price).min()?;
        let max = self.products.iter().map(|p| p.price).max()?;
        Some((min, max))
    }
}
