//! The event-sourced order book: an identity-keyed store of order
//! histories with a price-level secondary index.

use chrono::{DateTime, Utc};
use crossbeam::atomic::AtomicCell;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::RwLock;
use tracing::trace;

use super::error::BookError;
use super::history::OrderHistory;
use super::mutation::OrderMutation;
use super::order::{Order, OrderId, OrderState, StatefulOrder};

/// An order book derived entirely from observed feed events.
///
/// The book is a passive mirror: it never crosses orders, it only folds the
/// exchange's reported lifecycle events into per-order histories. Histories
/// are owned by the identity map; the price-level index stores identity
/// handles and resolves them through the identity map on each access.
///
/// Methods take `&self`, but the book is designed for a single mutator (the
/// feed consumer task). Readers on other tasks should work from owned
/// snapshots returned by the query methods.
pub struct OrderBook {
    /// Product identifier this book mirrors, e.g. `BTC-USD`.
    pub(super) product: String,

    /// Identity map: the owning store of every live order history.
    pub(super) orders: DashMap<OrderId, OrderHistory>,

    /// Price-level index: every identity ever placed at a price. Entries
    /// are not scrubbed on vacuum; lookups skip handles that no longer
    /// resolve.
    pub(super) levels: DashMap<i64, Vec<OrderId>>,

    /// Identities in placement order, append-only.
    pub(super) arrivals: RwLock<Vec<OrderId>>,

    /// Monotonic maximum event time over every mutation folded into any
    /// order, and every placement time.
    pub(super) last_mutation: AtomicCell<Option<DateTime<Utc>>>,

    /// Sequence number of the most recent non-empty command batch applied.
    pub(super) last_sequence: AtomicCell<Option<u64>>,
}

impl OrderBook {
    /// Create an empty book for the given product.
    pub fn new(product: &str) -> Self {
        Self {
            product: product.to_string(),
            orders: DashMap::new(),
            levels: DashMap::new(),
            arrivals: RwLock::new(Vec::new()),
            last_mutation: AtomicCell::new(None),
            last_sequence: AtomicCell::new(None),
        }
    }

    /// The product identifier this book mirrors.
    pub fn product(&self) -> &str {
        &self.product
    }

    /// Number of live order histories.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Whether the book holds no live histories.
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Insert a new order with its initial size.
    ///
    /// The history opens with the implicit pending transition at `placed_at`
    /// and the identity is registered in its price-level bucket.
    ///
    /// # Errors
    /// Returns [`BookError::IdentityConflict`] when the identity was already
    /// placed in this book's lifetime.
    pub fn place(&self, order: Order, size: i64, placed_at: DateTime<Utc>) -> Result<(), BookError> {
        trace!("placing {} for {} units at {}", order, size, placed_at);

        match self.orders.entry(order.id.clone()) {
            Entry::Occupied(_) => Err(BookError::IdentityConflict(order.id)),
            Entry::Vacant(slot) => {
                let id = order.id.clone();
                let price = order.price;
                slot.insert(OrderHistory::new(order, size, placed_at));
                self.levels.entry(price).or_default().push(id.clone());
                self.arrivals
                    .write()
                    .expect("arrival list lock poisoned")
                    .push(id);
                self.touch(placed_at);
                Ok(())
            }
        }
    }

    /// Append a batch of mutations to an existing order's history.
    ///
    /// An empty batch is a no-op success. The order's log is re-sorted and
    /// its latest version re-derived by full replay, so out-of-order event
    /// times land in their proper place.
    ///
    /// # Errors
    /// Returns [`BookError::UnknownOrder`] when the identity was never
    /// placed (or has been vacuumed).
    pub fn mutate(&self, id: &OrderId, mutations: Vec<OrderMutation>) -> Result<(), BookError> {
        let mut history = self
            .orders
            .get_mut(id)
            .ok_or_else(|| BookError::UnknownOrder(id.clone()))?;

        if mutations.is_empty() {
            return Ok(());
        }

        trace!("mutating {} with {} mutations", id, mutations.len());

        let newest = mutations.iter().map(OrderMutation::time).max();
        history.append(mutations);
        drop(history);

        if let Some(t) = newest {
            self.touch(t);
        }
        Ok(())
    }

    /// The latest derived version of an order.
    ///
    /// # Errors
    /// Returns [`BookError::UnknownOrder`] when the identity is not live.
    pub fn get(&self, id: &OrderId) -> Result<StatefulOrder, BookError> {
        self.orders
            .get(id)
            .map(|history| history.latest().clone())
            .ok_or_else(|| BookError::UnknownOrder(id.clone()))
    }

    /// The order's derived state with every mutation at or before `at`
    /// applied.
    ///
    /// # Errors
    /// Returns [`BookError::UnknownOrder`] when the identity is not live.
    pub fn version_at(&self, id: &OrderId, at: DateTime<Utc>) -> Result<StatefulOrder, BookError> {
        self.orders
            .get(id)
            .map(|history| history.version_at(at))
            .ok_or_else(|| BookError::UnknownOrder(id.clone()))
    }

    /// Orders resting at `price` whose state at `at` is open or pending.
    ///
    /// When `at` is `None` the book's latest mutation time is used, which
    /// makes the memoized latest versions authoritative. Identity handles
    /// left behind by [`Self::vacuum`] are skipped.
    pub fn price_level(&self, price: i64, at: Option<DateTime<Utc>>) -> Vec<StatefulOrder> {
        let ids: Vec<OrderId> = match self.levels.get(&price) {
            Some(bucket) => bucket.value().clone(),
            None => return Vec::new(),
        };
        let cutoff = at.or_else(|| self.last_mutation.load());

        let mut resting = Vec::new();
        for id in &ids {
            let Some(history) = self.orders.get(id) else {
                continue;
            };
            let version = match cutoff {
                Some(t) => history.version_no_later_than(t),
                None => history.latest().clone(),
            };
            if matches!(version.state, OrderState::Open | OrderState::Pending) {
                resting.push(version);
            }
        }
        resting
    }

    /// Every price that has ever held an order, ascending. Prices whose
    /// orders are all terminal or vacuumed are still reported.
    pub fn price_levels(&self) -> Vec<i64> {
        let mut prices: Vec<i64> = self.levels.iter().map(|entry| *entry.key()).collect();
        prices.sort_unstable();
        prices
    }

    /// Purge every history whose latest derived state is terminal.
    ///
    /// Only the identity map is scrubbed; price-level buckets and the
    /// arrival list keep their handles so historical queries can still
    /// enumerate the prices that were touched. Returns the number of
    /// histories reaped.
    pub fn vacuum(&self) -> usize {
        let before = self.orders.len();
        self.orders
            .retain(|_, history| !history.latest().state.is_terminal());
        let reaped = before - self.orders.len();
        if reaped > 0 {
            trace!("vacuumed {} terminal orders from {}", reaped, self.product);
        }
        reaped
    }

    /// The monotonic maximum event time folded into this book, or `None`
    /// before the first placement.
    pub fn last_mutation_time(&self) -> Option<DateTime<Utc>> {
        self.last_mutation.load()
    }

    /// Sequence number of the most recent non-empty batch applied, or
    /// `None` before the first batch. The book records whatever it is
    /// given; gap and regression detection belong to the feed operator.
    pub fn last_sequence(&self) -> Option<u64> {
        self.last_sequence.load()
    }

    pub(super) fn record_sequence(&self, sequence: u64) {
        self.last_sequence.store(Some(sequence));
    }

    /// Advance the global mutation clock. Load-then-store is sufficient
    /// under the single-mutator discipline.
    fn touch(&self, t: DateTime<Utc>) {
        let advanced = match self.last_mutation.load() {
            Some(seen) => seen.max(t),
            None => t,
        };
        self.last_mutation.store(Some(advanced));
    }
}

impl std::fmt::Display for OrderBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{} order book with {} orders>", self.product, self.orders.len())
    }
}
