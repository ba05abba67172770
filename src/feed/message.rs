//! Wire message shapes for the exchange market-data protocol.
//!
//! One JSON object per frame, discriminated by its `type` field. Prices and
//! sizes arrive as decimal strings and are converted to fixed-point by the
//! decoder; timestamps are RFC 3339 with fractional seconds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::book::Side;

/// One realtime frame from the feed.
///
/// Only the fields the decoder consumes are declared; unknown wire fields
/// (e.g. `product_id`, `old_size`) are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FeedEvent {
    /// The exchange acknowledged a new order.
    Received {
        /// Event time.
        time: DateTime<Utc>,
        /// Feed sequence number.
        sequence: u64,
        /// Identity of the new order.
        order_id: String,
        /// Buy or sell.
        side: Side,
        /// Limit price as a decimal dollar string.
        price: String,
        /// Order size as a decimal major-unit string.
        size: String,
    },

    /// The order is now resting on the book.
    Open {
        /// Event time.
        time: DateTime<Utc>,
        /// Feed sequence number.
        sequence: u64,
        /// Identity of the order.
        order_id: String,
        /// Size still unfilled, as a decimal string.
        remaining_size: String,
    },

    /// The order left the book.
    Done {
        /// Event time.
        time: DateTime<Utc>,
        /// Feed sequence number.
        sequence: u64,
        /// Identity of the order.
        order_id: String,
        /// Why the order is done.
        reason: DoneReason,
        /// Size left unfilled when the order ended, as a decimal string.
        remaining_size: String,
    },

    /// A trade executed between two orders.
    Match {
        /// Event time.
        time: DateTime<Utc>,
        /// Feed sequence number.
        sequence: u64,
        /// Exchange-assigned trade identifier.
        trade_id: i64,
        /// Identity of the resting order.
        maker_order_id: String,
        /// Identity of the incoming order.
        taker_order_id: String,
        /// Traded size as a decimal string.
        size: String,
    },

    /// The order's size changed without trading (e.g. self-modification).
    Change {
        /// Event time.
        time: DateTime<Utc>,
        /// Feed sequence number.
        sequence: u64,
        /// Identity of the order.
        order_id: String,
        /// The new size as a decimal string.
        new_size: String,
    },

    /// The exchange reported a protocol error.
    Error {
        /// Human-readable description from the exchange.
        message: String,
    },
}

/// Reason carried by a `done` frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoneReason {
    /// Fully executed.
    Filled,
    /// Cancelled by the owner or the exchange.
    Cancelled,
}

/// Outbound frames an embedder sends on the transport it owns.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundMessage {
    /// Subscription handshake for one product's feed.
    Subscribe {
        /// Product to subscribe to, e.g. `BTC-USD`.
        product_id: String,
    },
}

/// REST book snapshot: ladders of resting orders, one array per side.
#[derive(Debug, Clone, Deserialize)]
pub struct BookSnapshot {
    /// Feed sequence the snapshot was taken at.
    pub sequence: u64,
    /// Bid ladder.
    pub bids: Vec<SnapshotEntry>,
    /// Ask ladder.
    pub asks: Vec<SnapshotEntry>,
}

/// One ladder row: `[price, size, order_id]`.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotEntry(pub String, pub String, pub String);
