//! Integration tests for catalog queries and cached product views.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use vitrine_core::{HeightRange, Price, ProductQuery, SortBy};
use vitrine_integration_tests::{ids, storefront, storefront_with_latency};
use vitrine_storefront::{AppError, QueryKey, QueryValue};

// =============================================================================
// Filtering and Sorting
// =============================================================================

#[tokio::test]
async fn test_price_window_sorted_ascending() {
    let shop = storefront();
    let query = ProductQuery::new()
        .with_price_range(1500, 2000)
        .sorted_by(SortBy::PriceAsc);
    let list = shop.products(&query).await.unwrap();

    assert_eq!(ids(&list.products), ["4", "5", "1"]);
    assert_eq!(list.price_bounds(), Some((Price::new(1599), Price::new(1899))));
}

#[tokio::test]
async fn test_every_result_matches_every_filter() {
    let shop = storefront();
    let query = ProductQuery::new()
        .with_material("silicone")
        .with_height(HeightRange::From160To170)
        .with_height(HeightRange::From170)
        .with_cup("D")
        .sorted_by(SortBy::PriceDesc);
    let list = shop.query_products(&query);

    assert_eq!(ids(&list.products), ["7", "1"]);
    assert!(list.products.iter().all(|p| query.filters.matches(p)));
    assert_eq!(list.total, 2);
}

#[tokio::test]
async fn test_newest_and_featured_orders() {
    let shop = storefront();
    let featured = shop.query_products(&ProductQuery::new());
    assert_eq!(ids(&featured.products), ["1", "2", "3", "4", "5", "6", "7", "8"]);

    let newest = shop.query_products(&ProductQuery::new().sorted_by(SortBy::Newest));
    assert_eq!(ids(&newest.products), ["2", "4", "8", "1", "3", "5", "6", "7"]);
}

#[tokio::test]
async fn test_filter_bookkeeping_drives_queries() {
    let shop = storefront();
    let mut query = ProductQuery::new();
    query.filters.toggle_material("tpe");
    query.filters.toggle_height(HeightRange::Under150);
    assert_eq!(ids(&shop.query_products(&query).products), ["6"]);

    query.filters.toggle_height(HeightRange::Under150);
    assert_eq!(ids(&shop.query_products(&query).products), ["3", "5", "6"]);

    query.filters.clear(vitrine_core::PriceWindow::DEFAULT_UI);
    assert_eq!(query.filters.active_count(vitrine_core::PriceWindow::DEFAULT_UI), 0);
    assert_eq!(shop.query_products(&query).total, 8);

    query.filters.price_range = vitrine_core::PriceWindow::new(500, 1500);
    assert_eq!(query.filters.active_count(vitrine_core::PriceWindow::DEFAULT_UI), 1);
    assert_eq!(ids(&shop.query_products(&query).products), ["3", "6", "8"]);
}

#[tokio::test]
async fn test_pages_split_the_sorted_matches() {
    let shop = storefront();
    let query = ProductQuery::new().sorted_by(SortBy::PriceAsc);
    let first = shop.query_products(&query.clone().paged(1, 5));
    let second = shop.query_products(&query.clone().paged(2, 5));
    let past_end = shop.query_products(&query.paged(3, 5));

    assert_eq!(ids(&first.products), ["6", "3", "8", "4", "5"]);
    assert_eq!(ids(&second.products), ["1", "2", "7"]);
    assert!(past_end.products.is_empty());
    assert_eq!(past_end.total, 8);
}

#[tokio::test]
async fn test_facets_cover_catalog() {
    let facets = storefront().facets();
    assert!(facets.collections.contains("anime"));
    assert_eq!(facets.min_price, Some(Price::new(999)));
    assert_eq!(facets.max_price, Some(Price::new(2899)));
}

// =============================================================================
// Caching
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_simultaneous_reads_share_one_fetch() {
    let shop = storefront_with_latency();
    let query = ProductQuery::new().with_cup("B");

    let started = tokio::time::Instant::now();
    let (a, b) = tokio::join!(shop.products(&query), shop.products(&query));
    assert_eq!(a.unwrap(), b.unwrap());
    // One 500 ms backend call, not two back to back.
    assert!(started.elapsed() < Duration::from_millis(1000));
}

#[tokio::test(start_paused = true)]
async fn test_fresh_view_is_served_from_cache() {
    let shop = storefront_with_latency();
    let query = ProductQuery::new().in_collection("premium");
    shop.products(&query).await.unwrap();

    let started = tokio::time::Instant::now();
    let list = shop.products(&query).await.unwrap();
    assert_eq!(started.elapsed(), Duration::ZERO);
    assert_eq!(ids(&list.products), ["1", "7"]);

    // Past the five minute stale time the view is fetched again.
    tokio::time::advance(Duration::from_secs(301)).await;
    let started = tokio::time::Instant::now();
    shop.products(&query).await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(500));
}

#[tokio::test(start_paused = true)]
async fn test_cache_read_counts_fetches_per_key() {
    let shop = storefront();
    let calls = Arc::new(AtomicUsize::new(0));
    let fetch = |calls: Arc<AtomicUsize>| async move {
        calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok::<_, AppError>(QueryValue::User(None))
    };

    let cache = shop.cache();
    let (a, b) = tokio::join!(
        cache.read(QueryKey::User, || fetch(Arc::clone(&calls))),
        cache.read(QueryKey::User, || fetch(Arc::clone(&calls))),
    );
    a.unwrap();
    b.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    cache.invalidate(&QueryKey::User).await;
    cache
        .read(QueryKey::User, || fetch(Arc::clone(&calls)))
        .await
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
