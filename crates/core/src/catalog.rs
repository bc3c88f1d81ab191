//! Read-only product catalog.
//!
//! The catalog is built once and never mutated, so it can be shared
//! behind an `Arc` without locking. Queries are pure: filter, then a
//! stable sort, then optional paging.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::error::CatalogError;
use crate::types::{
    Badge, Price, Product, ProductId, ProductList, ProductQuery, ProductSpecs,
};

/// The full set of sellable products, in featured order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    index: HashMap<ProductId, usize>,
}

/// Distinct filter values present in a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Facets {
    pub materials: BTreeSet<String>,
    pub cups: BTreeSet<String>,
    pub collections: BTreeSet<String>,
    pub min_price: Option<Price>,
    pub max_price: Option<Price>,
}

impl Catalog {
    /// Build a catalog. Product order is kept as the featured order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateProductId`] if two products share an ID.
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(products.len());
        for (position, product) in products.iter().enumerate() {
            if index.insert(product.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateProductId(product.id.clone()));
            }
        }
        Ok(Self { products, index })
    }

    /// The storefront's launch catalog.
    #[must_use]
    pub fn seeded() -> Self {
        let products: Vec<Product> = SEED.iter().map(SeedProduct::to_product).collect();
        let index = products
            .iter()
            .enumerate()
            .map(|(position, product)| (product.id.clone(), position))
            .collect();
        Self { products, index }
    }

    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.index.get(id).and_then(|&position| self.products.get(position))
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Run a listing query.
    ///
    /// An empty match is an empty list, never an error.
    #[must_use]
    pub fn query(&self, query: &ProductQuery) -> ProductList {
        let mut matches: Vec<Product> = self
            .products
            .iter()
            .filter(|product| query.filters.matches(product))
            .cloned()
            .collect();
        query.sort_by.apply(&mut matches);
        ProductList::paginate(matches, query.page)
    }

    /// Distinct materials, cups and collections, plus the price span.
    #[must_use]
    pub fn facets(&self) -> Facets {
        Facets {
            materials: self.products.iter().map(|p| p.specs.material.clone()).collect(),
            cups: self.products.iter().map(|p| p.specs.cup.clone()).collect(),
            collections: self.products.iter().map(|p| p.collection.clone()).collect(),
            min_price: self.products.iter().map(|p| p.price).min(),
            max_price: self.products.iter().map(|p| p.price).max(),
        }
    }
}

// =============================================================================
// Seed Data
// =============================================================================

struct SeedProduct {
    id: &'static str,
    name: &'static str,
    brand: &'static str,
    price: u64,
    compare_at_price: Option<u64>,
    image: &'static str,
    hover_image: &'static str,
    badges: &'static [Badge],
    height: u32,
    weight: u32,
    cup: &'static str,
    material: &'static str,
    collection: &'static str,
    color: &'static str,
}

impl SeedProduct {
    fn to_product(&self) -> Product {
        Product {
            id: ProductId::new(self.id),
            name: self.name.to_string(),
            brand: self.brand.to_string(),
            price: Price::new(self.price),
            compare_at_price: self.compare_at_price.map(Price::new),
            image: image_url(self.image),
            hover_image: image_url(self.hover_image),
            badges: self.badges.to_vec(),
            specs: ProductSpecs {
                material: self.material.to_string(),
                height: self.height,
                weight: self.weight,
                cup: self.cup.to_string(),
            },
            collection: self.collection.to_string(),
            color: self.color.to_string(),
        }
    }
}

fn image_url(photo: &str) -> String {
    format!("https://images.unsplash.com/photo-{photo}?w=600&h=800&fit=crop")
}

const SEED: &[SeedProduct] = &[
    SeedProduct {
        id: "1",
        name: "Aurora Premium Silicone",
        brand: "romanti.X Elite",
        price: 1899,
        compare_at_price: Some(2299),
        image: "1509631179647-0177331693ae",
        hover_image: "1515886657613-9f3515b0c78f",
        badges: &[Badge::Bestseller],
        height: 165,
        weight: 32,
        cup: "D",
        material: "silicone",
        collection: "premium",
        color: "#ff2d8a",
    },
    SeedProduct {
        id: "2",
        name: "Bella Fantasy Collection",
        brand: "romanti.X",
        price: 2499,
        compare_at_price: None,
        image: "1506126613408-eca07ce68773",
        hover_image: "1501196354995-cbb51c65aaea",
        badges: &[Badge::New, Badge::Limited],
        height: 168,
        weight: 35,
        cup: "E",
        material: "silicone",
        collection: "fantasy",
        color: "#8b3dff",
    },
    SeedProduct {
        id: "3",
        name: "Luna Sensual Series",
        brand: "romanti.X",
        price: 1299,
        compare_at_price: Some(1699),
        image: "1507003211169-0a1dd7228f2d",
        hover_image: "1496440737103-cd596325d314",
        badges: &[Badge::Sale],
        height: 158,
        weight: 28,
        cup: "C",
        material: "tpe",
        collection: "sensual",
        color: "#ff3347",
    },
    SeedProduct {
        id: "4",
        name: "Sakura Anime Edition",
        brand: "romanti.X Fantasy",
        price: 1599,
        compare_at_price: None,
        image: "1512310604669-443f26c35f52",
        hover_image: "1524502397800-2eeaad7c3fe5",
        badges: &[Badge::New],
        height: 155,
        weight: 26,
        cup: "B",
        material: "silicone",
        collection: "anime",
        color: "#ff69b4",
    },
    SeedProduct {
        id: "5",
        name: "Venus Goddess Curves",
        brand: "romanti.X Curves",
        price: 1799,
        compare_at_price: None,
        image: "1513094735237-8f2714d57c13",
        hover_image: "1519699047748-de8e457a634e",
        badges: &[Badge::Bestseller],
        height: 162,
        weight: 38,
        cup: "F",
        material: "tpe",
        collection: "curvy",
        color: "#ffd700",
    },
    SeedProduct {
        id: "6",
        name: "Aria Petite Dream",
        brand: "romanti.X",
        price: 999,
        compare_at_price: Some(1299),
        image: "1558618666-fcd25c85cd64",
        hover_image: "1475669698648-2f144fcaaeb1",
        badges: &[Badge::Sale],
        height: 148,
        weight: 22,
        cup: "A",
        material: "tpe",
        collection: "petite",
        color: "#00d9ff",
    },
    SeedProduct {
        id: "7",
        name: "Scarlett Premium Plus",
        brand: "romanti.X Elite",
        price: 2899,
        compare_at_price: None,
        image: "1532453288672-3a27e9be9efd",
        hover_image: "1534528741775-53994a69daeb",
        badges: &[Badge::Exclusive],
        height: 170,
        weight: 36,
        cup: "D",
        material: "silicone",
        collection: "premium",
        color: "#ff2d8a",
    },
    SeedProduct {
        id: "8",
        name: "Mika Anime Star",
        brand: "romanti.X Fantasy",
        price: 1449,
        compare_at_price: None,
        image: "1516726817505-f5ed825624d8",
        hover_image: "1529139574466-a303027c1d8b",
        badges: &[Badge::New],
        height: 152,
        weight: 24,
        cup: "B",
        material: "silicone",
        collection: "anime",
        color: "#a855f7",
    },
];

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{HeightRange, SortBy};

    fn ids(list: &ProductList) -> Vec<&str> {
        list.products.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_seeded_catalog() {
        let catalog = Catalog::seeded();
        assert_eq!(catalog.len(), 8);
        assert_eq!(catalog.get(&ProductId::new("6")).unwrap().price, Price::new(999));
        assert!(catalog.get(&ProductId::new("99")).is_none());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut products = Catalog::seeded().products().to_vec();
        products.push(products.first().unwrap().clone());
        assert_eq!(
            Catalog::new(products).unwrap_err(),
            CatalogError::DuplicateProductId(ProductId::new("1"))
        );
    }

    #[test]
    fn test_unfiltered_query_is_featured_single_page() {
        let list = Catalog::seeded().query(&ProductQuery::new());
        assert_eq!(ids(&list), ["1", "2", "3", "4", "5", "6", "7", "8"]);
        assert_eq!((list.total, list.page, list.page_size), (8, 1, 8));
    }

    #[test]
    fn test_price_range_sorted_ascending() {
        let query = ProductQuery::new()
            .with_price_range(1500, 2000)
            .sorted_by(SortBy::PriceAsc);
        let list = Catalog::seeded().query(&query);
        assert_eq!(ids(&list), ["4", "5", "1"]);
        assert_eq!(list.total, 3);
    }

    #[test]
    fn test_price_desc() {
        let list = Catalog::seeded().query(&ProductQuery::new().sorted_by(SortBy::PriceDesc));
        assert_eq!(ids(&list), ["7", "2", "1", "5", "4", "8", "3", "6"]);
    }

    #[test]
    fn test_newest_puts_new_first_in_catalog_order() {
        let list = Catalog::seeded().query(&ProductQuery::new().sorted_by(SortBy::Newest));
        assert_eq!(ids(&list), ["2", "4", "8", "1", "3", "5", "6", "7"]);
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let query = ProductQuery::new()
            .with_material("silicone")
            .with_height(HeightRange::From150To160)
            .with_cup("B");
        let list = Catalog::seeded().query(&query);
        assert_eq!(ids(&list), ["4", "8"]);

        let narrowed = query.in_collection("anime").search("sakura");
        assert_eq!(ids(&Catalog::seeded().query(&narrowed)), ["4"]);
    }

    #[test]
    fn test_height_buckets_are_unioned() {
        let query = ProductQuery::new()
            .with_height(HeightRange::Under150)
            .with_height(HeightRange::From170);
        assert_eq!(ids(&Catalog::seeded().query(&query)), ["6", "7"]);
    }

    #[test]
    fn test_search_matches_brand() {
        let list = Catalog::seeded().query(&ProductQuery::new().search("ELITE"));
        assert_eq!(ids(&list), ["1", "7"]);
    }

    #[test]
    fn test_no_match_is_empty() {
        let list = Catalog::seeded().query(&ProductQuery::new().in_collection("nope"));
        assert!(list.products.is_empty());
        assert_eq!((list.total, list.page, list.page_size), (0, 1, 0));
    }

    #[test]
    fn test_every_result_satisfies_filters() {
        let catalog = Catalog::seeded();
        let queries = [
            ProductQuery::new().with_material("tpe").with_price_range(0, 1500),
            ProductQuery::new().with_cup("D").with_height(HeightRange::From160To170),
            ProductQuery::new().in_collection("premium").sorted_by(SortBy::Newest),
        ];
        for query in queries {
            let list = catalog.query(&query);
            assert!(list.products.iter().all(|p| query.filters.matches(p)));
            let expected = catalog
                .products()
                .iter()
                .filter(|p| query.filters.matches(p))
                .count();
            assert_eq!(list.total, expected);
        }
    }

    #[test]
    fn test_paged_query() {
        let query = ProductQuery::new().sorted_by(SortBy::PriceAsc).paged(2, 3);
        let list = Catalog::seeded().query(&query);
        assert_eq!(ids(&list), ["4", "5", "1"]);
        assert_eq!((list.total, list.page, list.page_size), (8, 2, 3));
    }

    #[test]
    fn test_facets() {
        let facets = Catalog::seeded().facets();
        assert_eq!(
            facets.materials.iter().map(String::as_str).collect::<Vec<_>>(),
            ["silicone", "tpe"]
        );
        assert_eq!(facets.cups.len(), 6);
        assert_eq!(facets.min_price, Some(Price::new(999)));
        assert_eq!(facets.max_price, Some(Price::new(2899)));
    }
}
