//! Integration tests for the cart through the storefront facade.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use vitrine_core::Price;
use vitrine_integration_tests::{id, storefront, storefront_with_latency};
use vitrine_storefront::{ErrorKind, QueryKey, QueryStatus, QueryValue};

// =============================================================================
// Ledger Arithmetic
// =============================================================================

#[tokio::test]
async fn test_add_twice_yields_one_line_of_two() {
    let shop = storefront();
    shop.add_to_cart(&id("1")).await.unwrap();
    let cart = shop.add_to_cart(&id("1")).await.unwrap();

    assert_eq!(cart.items().len(), 1);
    assert_eq!(cart.line(&id("1")).unwrap().quantity, 2);
    assert_eq!(cart.item_count(), 2);
    assert_eq!(cart.total(), Price::new(2 * 1899));
}

#[tokio::test]
async fn test_add_twice_then_remove_empties_cart() {
    let shop = storefront();
    shop.add_to_cart(&id("1")).await.unwrap();
    shop.add_to_cart(&id("1")).await.unwrap();
    let cart = shop.remove_from_cart(&id("1")).await.unwrap();

    assert!(cart.items().is_empty());
    assert_eq!(cart.item_count(), 0);
    assert_eq!(cart.total(), Price::ZERO);
}

#[tokio::test]
async fn test_totals_span_lines() {
    let shop = storefront();
    shop.add_to_cart(&id("6")).await.unwrap();
    shop.add_to_cart(&id("3")).await.unwrap();
    let cart = shop.set_cart_quantity(&id("3"), 3).await.unwrap();

    assert_eq!(cart.item_count(), 4);
    assert_eq!(cart.total(), Price::new(999 + 3 * 1299));
    // Lines keep insertion order.
    assert_eq!(cart.items().first().unwrap().product_id, id("6"));
}

#[tokio::test]
async fn test_set_quantity_zero_equals_remove() {
    let shop = storefront();
    shop.add_to_cart(&id("2")).await.unwrap();
    shop.add_to_cart(&id("4")).await.unwrap();

    let via_zero = shop.set_cart_quantity(&id("2"), 0).await.unwrap();
    assert!(via_zero.line(&id("2")).is_none());
    assert_eq!(via_zero.item_count(), 1);

    let negative = shop.set_cart_quantity(&id("4"), -5).await.unwrap();
    assert!(negative.is_empty());
}

#[tokio::test]
async fn test_remove_absent_line_is_noop() {
    let shop = storefront();
    shop.add_to_cart(&id("5")).await.unwrap();
    let cart = shop.remove_from_cart(&id("8")).await.unwrap();
    assert_eq!(cart.item_count(), 1);
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_unknown_product_is_not_found_and_changes_nothing() {
    let shop = storefront();
    let before = shop.add_to_cart(&id("1")).await.unwrap();

    let err = shop.add_to_cart(&id("999")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = shop.set_cart_quantity(&id("999"), 2).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    assert_eq!(shop.cart().await.unwrap(), before);
}

#[tokio::test]
async fn test_set_quantity_for_line_not_in_cart_is_not_found() {
    let shop = storefront();
    let err = shop.set_cart_quantity(&id("7"), 1).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(shop.cart().await.unwrap().is_empty());
}

// =============================================================================
// Cache Interaction
// =============================================================================

#[tokio::test]
async fn test_mutation_snapshot_is_cached() {
    let shop = storefront();
    let cart = shop.add_to_cart(&id("1")).await.unwrap();

    let state = shop.cache().state(&QueryKey::Cart).await.unwrap();
    assert_eq!(state.status, QueryStatus::Success);
    assert_eq!(state.data, Some(QueryValue::Cart(cart)));
}

#[tokio::test(start_paused = true)]
async fn test_read_after_mutation_skips_backend_delay() {
    let shop = storefront_with_latency();
    shop.add_to_cart(&id("1")).await.unwrap();

    let started = tokio::time::Instant::now();
    let cart = shop.cart().await.unwrap();
    assert_eq!(started.elapsed(), Duration::ZERO);
    assert_eq!(cart.item_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_overlapping_adds_do_not_lose_updates() {
    let shop = storefront_with_latency();
    let product = id("3");
    let (a, b, c) = tokio::join!(
        shop.add_to_cart(&product),
        shop.add_to_cart(&product),
        shop.add_to_cart(&product),
    );
    let quantities: Vec<u32> = [a, b, c]
        .into_iter()
        .map(|cart| cart.unwrap().line(&product).unwrap().quantity)
        .collect();
    assert_eq!(quantities, [1, 2, 3]);
    assert_eq!(shop.cart().await.unwrap().item_count(), 3);
}

#[tokio::test]
async fn test_cart_serializes_camel_case() {
    let shop = storefront();
    let cart = shop.add_to_cart(&id("1")).await.unwrap();
    let json = serde_json::to_value(&cart).unwrap();

    assert_eq!(json["itemCount"], 1);
    assert_eq!(json["total"], 1899);
    assert_eq!(json["items"][0]["productId"], "1");
    assert_eq!(json["items"][0]["product"]["compareAtPrice"], 2299);
}
