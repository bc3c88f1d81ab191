//! Query cache.
//!
//! Keyed, stale-time-aware cache of storefront reads, backed by `moka`.
//!
//! # Behavior
//!
//! - A read returns the cached value while it is fresh and fetches
//!   otherwise. Fetches for one key are serialized through moka's per-key
//!   compute, and a reader that waited behind a fetch takes that fetch's
//!   outcome (value or error) instead of fetching again.
//! - A write replaces the value and restarts its stale timer. Mutations use
//!   the typed setters ([`QueryCache::set_cart`] and friends).
//! - A failed fetch keeps the last good value alongside the error.
//! - Entries never expire on their own; [`QueryCache::invalidate`] and
//!   [`QueryCache::clear`] drop them.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use moka::future::Cache;
use moka::ops::compute::{CompResult, Op};
use tokio::time::Instant;
use tracing::{debug, warn};

use vitrine_core::{Cart, ProductList, ProductQuery, User, Wishlist};

use crate::config::StaleTimes;
use crate::error::{AppError, Result};

// =============================================================================
// Keys and values
// =============================================================================

/// Cache key for storefront reads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// One filtered, sorted view of the catalog.
    Products(ProductQuery),
    Cart,
    Wishlist,
    /// The signed-in shopper.
    User,
}

impl QueryKey {
    /// Short label for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Products(_) => "products",
            Self::Cart => "cart",
            Self::Wishlist => "wishlist",
            Self::User => "user",
        }
    }
}

/// Cached value types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Products(ProductList),
    Cart(Cart),
    Wishlist(Wishlist),
    User(Option<User>),
}

impl QueryValue {
    const fn name(&self) -> &'static str {
        match self {
            Self::Products(_) => "products",
            Self::Cart(_) => "cart",
            Self::Wishlist(_) => "wishlist",
            Self::User(_) => "user",
        }
    }

    /// Ledger revision of a cart or wishlist snapshot.
    const fn revision(&self) -> Option<u64> {
        match self {
            Self::Cart(cart) => Some(cart.revision()),
            Self::Wishlist(wishlist) => Some(wishlist.revision()),
            Self::Products(_) | Self::User(_) => None,
        }
    }

    fn is_newer_than(&self, other: &Self) -> bool {
        match (self.revision(), other.revision()) {
            (Some(mine), Some(theirs)) => mine > theirs,
            _ => false,
        }
    }

    /// # Errors
    ///
    /// Returns `AppError::Internal` if this is not a product list.
    pub fn into_products(self) -> Result<ProductList> {
        match self {
            Self::Products(list) => Ok(list),
            other => Err(mismatch("products", &other)),
        }
    }

    /// # Errors
    ///
    /// Returns `AppError::Internal` if this is not a cart.
    pub fn into_cart(self) -> Result<Cart> {
        match self {
            Self::Cart(cart) => Ok(cart),
            other => Err(mismatch("cart", &other)),
        }
    }

    /// # Errors
    ///
    /// Returns `AppError::Internal` if this is not a wishlist.
    pub fn into_wishlist(self) -> Result<Wishlist> {
        match self {
            Self::Wishlist(wishlist) => Ok(wishlist),
            other => Err(mismatch("wishlist", &other)),
        }
    }

    /// # Errors
    ///
    /// Returns `AppError::Internal` if this is not a user.
    pub fn into_user(self) -> Result<Option<User>> {
        match self {
            Self::User(user) => Ok(user),
            other => Err(mismatch("user", &other)),
        }
    }
}

fn mismatch(expected: &str, found: &QueryValue) -> AppError {
    AppError::Internal(format!("expected {expected} in cache, found {}", found.name()))
}

// =============================================================================
// Observable state
// =============================================================================

/// Lifecycle of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// First fetch in flight, nothing cached yet. A refetch of a cached
    /// value keeps the previous status and sets
    /// [`QueryState::is_fetching`] instead.
    Pending,
    /// Last fetch or write succeeded.
    Success,
    /// Last fetch failed.
    Error,
}

/// Snapshot of one entry, as returned by [`QueryCache::state`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    /// Last good value. Kept after a failed refetch.
    pub data: Option<QueryValue>,
    pub status: QueryStatus,
    pub error: Option<AppError>,
    /// When `data` was fetched or written.
    pub fetched_at: Option<Instant>,
    /// A fetch for this key is running.
    pub is_fetching: bool,
}

#[derive(Debug, Clone)]
struct CachedEntry {
    data: Option<QueryValue>,
    error: Option<AppError>,
    fetched_at: Option<Instant>,
    /// Global sequence number of the fetch or write that produced this entry.
    generation: u64,
    /// Value of the clear counter when the entry was produced.
    epoch: u64,
}

impl CachedEntry {
    fn is_fresh(&self, now: Instant, stale_time: Duration) -> bool {
        self.error.is_none()
            && self.data.is_some()
            && self
                .fetched_at
                .is_some_and(|at| now.saturating_duration_since(at) <= stale_time)
    }

    fn into_outcome(self, key: &'static str) -> Result<QueryValue> {
        match (self.error, self.data) {
            (Some(error), _) => Err(error),
            (None, Some(data)) => Ok(data),
            (None, None) => Err(AppError::Internal(format!("{key} entry has neither data nor error"))),
        }
    }

    fn into_state(self, is_fetching: bool) -> QueryState {
        QueryState {
            status: if self.error.is_some() {
                QueryStatus::Error
            } else {
                QueryStatus::Success
            },
            data: self.data,
            error: self.error,
            fetched_at: self.fetched_at,
            is_fetching,
        }
    }
}

// =============================================================================
// QueryCache
// =============================================================================

/// Shared query cache. Cloning shares the same entries.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<QueryCacheInner>,
}

struct QueryCacheInner {
    entries: Cache<QueryKey, CachedEntry>,
    stale_times: StaleTimes,
    /// Bumped by every settled fetch and every write.
    generation: AtomicU64,
    /// Bumped by every clear; entries from an older epoch are ignored.
    epoch: AtomicU64,
    in_flight: Mutex<HashSet<QueryKey>>,
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.inner.entries.entry_count())
            .field("stale_times", &self.inner.stale_times)
            .finish_non_exhaustive()
    }
}

impl QueryCache {
    /// Create an empty cache. Entries are never evicted.
    #[must_use]
    pub fn new(stale_times: StaleTimes) -> Self {
        Self {
            inner: Arc::new(QueryCacheInner {
                entries: Cache::builder().build(),
                stale_times,
                generation: AtomicU64::new(0),
                epoch: AtomicU64::new(0),
                in_flight: Mutex::new(HashSet::new()),
            }),
        }
    }

    /// Stale time that applies to `key`.
    #[must_use]
    pub fn stale_time(&self, key: &QueryKey) -> Duration {
        let stale = &self.inner.stale_times;
        match key {
            QueryKey::Products(_) => stale.products,
            QueryKey::Cart => stale.cart,
            QueryKey::Wishlist => stale.wishlist,
            QueryKey::User => stale.user,
        }
    }

    /// Return the value for `key`, calling `fetch` if it is missing, stale
    /// or failed.
    ///
    /// At most one fetch per key runs at a time. Readers that arrive while
    /// it runs wait for it and share its outcome. If the caller stops
    /// awaiting mid-fetch the fetch is abandoned and the next reader starts
    /// a new one.
    ///
    /// # Errors
    ///
    /// Returns the fetch's error, shared by every reader that waited on it.
    pub async fn read<F, Fut>(&self, key: QueryKey, fetch: F) -> Result<QueryValue>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<QueryValue>> + Send,
    {
        let name = key.name();
        let seen = self.inner.generation.load(Ordering::Acquire);
        let stale_time = self.stale_time(&key);
        let inner = Arc::clone(&self.inner);
        let fetch_key = key.clone();

        let result = self
            .inner
            .entries
            .entry(key)
            .and_compute_with(move |current| async move {
                let epoch = inner.epoch.load(Ordering::Acquire);
                let current = current
                    .map(moka::Entry::into_value)
                    .filter(|entry| entry.epoch == epoch);

                if let Some(entry) = &current {
                    if entry.is_fresh(Instant::now(), stale_time) {
                        debug!(query = name, "Cache hit");
                        return Op::Nop;
                    }
                    if entry.generation > seen {
                        debug!(query = name, "Sharing result settled while waiting");
                        return Op::Nop;
                    }
                }

                debug!(query = name, "Cache miss, fetching");
                let _in_flight = InFlight::start(&inner.in_flight, fetch_key);
                let outcome = fetch().await;
                let generation = inner.generation.fetch_add(1, Ordering::AcqRel) + 1;

                Op::Put(match outcome {
                    Ok(data) => CachedEntry {
                        data: Some(data),
                        error: None,
                        fetched_at: Some(Instant::now()),
                        generation,
                        epoch,
                    },
                    Err(error) => {
                        warn!(query = name, %error, "Fetch failed");
                        let (data, fetched_at) =
                            current.map_or((None, None), |entry| (entry.data, entry.fetched_at));
                        CachedEntry {
                            data,
                            error: Some(error),
                            fetched_at,
                            generation,
                            epoch,
                        }
                    }
                })
            })
            .await;

        match result {
            CompResult::Inserted(entry)
            | CompResult::ReplacedWith(entry)
            | CompResult::Unchanged(entry) => entry.into_value().into_outcome(name),
            CompResult::Removed(_) | CompResult::StillNone(_) => {
                Err(AppError::Internal(format!("{name} read settled without an entry")))
            }
        }
    }

    /// Replace the value for `key` and mark it freshly fetched.
    ///
    /// A write issued while a fetch for `key` runs lands after that fetch
    /// settles, so the written value wins. A cart or wishlist snapshot
    /// older than the cached one is dropped, so overlapping mutations
    /// that finish out of order leave the newest snapshot cached.
    pub async fn write(&self, key: QueryKey, value: QueryValue) {
        let name = key.name();
        let inner = Arc::clone(&self.inner);
        self.inner
            .entries
            .entry(key)
            .and_compute_with(move |current| async move {
                let epoch = inner.epoch.load(Ordering::Acquire);
                let superseded = current
                    .map(moka::Entry::into_value)
                    .filter(|entry| entry.epoch == epoch)
                    .and_then(|entry| entry.data)
                    .is_some_and(|cached| cached.is_newer_than(&value));
                if superseded {
                    debug!(query = name, "Dropping out-of-order write");
                    return Op::Nop;
                }

                let generation = inner.generation.fetch_add(1, Ordering::AcqRel) + 1;
                debug!(query = name, "Cache write");
                Op::Put(CachedEntry {
                    data: Some(value),
                    error: None,
                    fetched_at: Some(Instant::now()),
                    generation,
                    epoch,
                })
            })
            .await;
    }

    pub async fn set_products(&self, query: ProductQuery, list: ProductList) {
        self.write(QueryKey::Products(query), QueryValue::Products(list))
            .await;
    }

    pub async fn set_cart(&self, cart: Cart) {
        self.write(QueryKey::Cart, QueryValue::Cart(cart)).await;
    }

    pub async fn set_wishlist(&self, wishlist: Wishlist) {
        self.write(QueryKey::Wishlist, QueryValue::Wishlist(wishlist))
            .await;
    }

    pub async fn set_user(&self, user: Option<User>) {
        self.write(QueryKey::User, QueryValue::User(user)).await;
    }

    /// Drop one entry so the next read fetches.
    ///
    /// Waits for a fetch already running on `key`, so that fetch's value is
    /// dropped too.
    pub async fn invalidate(&self, key: &QueryKey) {
        self.inner
            .entries
            .entry(key.clone())
            .and_compute_with(|_| async { Op::Remove })
            .await;
        debug!(query = key.name(), "Cache entry invalidated");
    }

    /// Drop every entry. Fetches still running when this is called do not
    /// repopulate the cache.
    pub async fn clear(&self) {
        self.inner.epoch.fetch_add(1, Ordering::AcqRel);
        self.inner.entries.invalidate_all();
        self.inner.entries.run_pending_tasks().await;
        debug!("Cache cleared");
    }

    /// Current state of `key` without fetching. `None` if the key has
    /// never been read or written since the last clear.
    pub async fn state(&self, key: &QueryKey) -> Option<QueryState> {
        let is_fetching = self
            .inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key);
        let epoch = self.inner.epoch.load(Ordering::Acquire);
        let entry = self
            .inner
            .entries
            .get(key)
            .await
            .filter(|entry| entry.epoch == epoch);

        match entry {
            Some(entry) => Some(entry.into_state(is_fetching)),
            None if is_fetching => Some(QueryState {
                data: None,
                status: QueryStatus::Pending,
                error: None,
                fetched_at: None,
                is_fetching,
            }),
            None => None,
        }
    }
}

/// Marks a key as being fetched until dropped.
struct InFlight<'a> {
    keys: &'a Mutex<HashSet<QueryKey>>,
    key: QueryKey,
}

impl<'a> InFlight<'a> {
    fn start(keys: &'a Mutex<HashSet<QueryKey>>, key: QueryKey) -> Self {
        keys.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone());
        Self { keys, key }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}
