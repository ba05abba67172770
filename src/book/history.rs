//! Per-order event log: birth record plus a time-sorted mutation log.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::mutation::{OrderMutation, replay};
use super::order::{Order, OrderState, StatefulOrder};

/// The full recorded history of one order.
///
/// Holds the immutable birth record, the mutation log sorted ascending by
/// event time (ties keep insertion order), and a memoized latest version
/// equal to a full replay of the entire log.
#[derive(Debug, Clone, Serialize)]
pub struct OrderHistory {
    birth: Order,
    initial_size: i64,
    mutations: Vec<OrderMutation>,
    latest: StatefulOrder,
}

impl OrderHistory {
    /// Opens a history for a freshly placed order.
    ///
    /// The log starts with the implicit pending transition at placement
    /// time, so the latest version mirrors the birth record with the
    /// initial size and `Pending` state.
    pub fn new(order: Order, size: i64, placed_at: DateTime<Utc>) -> Self {
        let mutations = vec![OrderMutation::State {
            state: OrderState::Pending,
            time: placed_at,
        }];
        let latest = replay(&order, size, &mutations);
        Self {
            birth: order,
            initial_size: size,
            mutations,
            latest,
        }
    }

    /// The immutable birth record.
    pub fn order(&self) -> &Order {
        &self.birth
    }

    /// The order's size at placement.
    pub fn initial_size(&self) -> i64 {
        self.initial_size
    }

    /// The memoized result of replaying the entire log.
    pub fn latest(&self) -> &StatefulOrder {
        &self.latest
    }

    /// The mutation log, sorted ascending by event time.
    pub fn mutations(&self) -> &[OrderMutation] {
        &self.mutations
    }

    /// Appends a batch of mutations and re-derives the latest version.
    ///
    /// The whole log is stable-sorted by event time afterwards so a
    /// late-arriving mutation with an earlier timestamp commutes with what
    /// was already folded in. The memo is recomputed by full replay rather
    /// than folded incrementally; logs are short and an incremental fold
    /// cannot absorb out-of-order arrivals.
    pub fn append(&mut self, mutations: Vec<OrderMutation>) {
        self.mutations.extend(mutations);
        self.mutations.sort_by_key(OrderMutation::time);
        self.latest = replay(&self.birth, self.initial_size, &self.mutations);
    }

    /// Derives the order's state with every mutation at or before `at`
    /// applied.
    ///
    /// For a timestamp earlier than the first mutation this returns the
    /// birth record's state: initial size, `Pending`, no mutation time.
    pub fn version_at(&self, at: DateTime<Utc>) -> StatefulOrder {
        let visible = self.mutations.iter().filter(|m| m.time() <= at);
        replay(&self.birth, self.initial_size, visible)
    }

    /// `version_at` that short-circuits to the memo when the entire log is
    /// already within the cutoff.
    pub(super) fn version_no_later_than(&self, at: DateTime<Utc>) -> StatefulOrder {
        match self.latest.last_mutation {
            Some(newest) if newest <= at => self.latest.clone(),
            _ => self.version_at(at),
        }
    }
}
