//! Read-only aggregate scans over the book at a point in time.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::orderbook::OrderBook;
use super::order::{OrderId, Side};

/// Top-of-book prices derived at a single timestamp.
///
/// Prices use `-1` to mean "no resting open order on that side". When both
/// sides are absent the mid is `-1` and the spread is `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TopOfBook {
    /// Highest open buy price in cents, or `-1`.
    pub bid: i64,
    /// Lowest open sell price in cents, or `-1`.
    pub ask: i64,
    /// Midpoint `bid + (ask - bid) / 2`, truncated toward zero.
    pub mid: i64,
    /// `ask - bid`.
    pub spread: i64,
}

impl OrderBook {
    /// Count of orders whose derived state at `at` is open.
    pub fn open_orders(&self, at: DateTime<Utc>) -> usize {
        let mut open = 0;
        for id in self.arrival_snapshot() {
            let Some(history) = self.orders.get(&id) else {
                continue;
            };
            if history.version_no_later_than(at).is_open() {
                open += 1;
            }
        }
        open
    }

    /// Sum of `price × size` over every order open at `at`, in units of
    /// cents × satoshi.
    pub fn notional_in_play(&self, at: DateTime<Utc>) -> i128 {
        let mut notional: i128 = 0;
        for price in self.price_levels() {
            for order in self.price_level(price, Some(at)) {
                if order.is_open() {
                    notional += i128::from(order.order.price) * i128::from(order.size);
                }
            }
        }
        notional
    }

    /// Best bid, best ask, mid, and spread over the orders open at `at`.
    pub fn top_of_book(&self, at: DateTime<Utc>) -> TopOfBook {
        let mut bid: i64 = -1;
        let mut ask: i64 = -1;

        for id in self.arrival_snapshot() {
            let Some(history) = self.orders.get(&id) else {
                continue;
            };
            let version = history.version_no_later_than(at);
            if !version.is_open() {
                continue;
            }
            match version.order.side {
                Side::Buy => {
                    if version.order.price > bid {
                        bid = version.order.price;
                    }
                }
                Side::Sell => {
                    if version.order.price < ask || ask == -1 {
                        ask = version.order.price;
                    }
                }
            }
        }

        TopOfBook {
            bid,
            ask,
            mid: bid + (ask - bid) / 2,
            spread: ask - bid,
        }
    }

    /// Owned copy of the arrival list so scans never hold the lock while
    /// resolving histories.
    fn arrival_snapshot(&self) -> Vec<OrderId> {
        self.arrivals
            .read()
            .expect("arrival list lock poisoned")
            .clone()
    }
}
