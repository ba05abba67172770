//! # Chronobook
//!
//! An event-sourced mirror of an exchange limit order book. The engine
//! ingests a realtime market-data feed (order lifecycle events from a
//! matching engine it observes but never drives) and maintains a
//! temporally consistent view of the book: every order is stored as its
//! immutable birth record plus a time-sorted log of mutations, and any
//! historical version of an order (or of the whole book) is derived on
//! demand by replaying that log.
//!
//! ## Key properties
//!
//! - **Out-of-order tolerant**: a mutation that arrives late with an
//!   earlier event time is stable-sorted into its proper place and the
//!   order's state is re-derived by full replay, so arrival order never
//!   changes the outcome.
//! - **Time-travel queries**: `version_at` answers "what did this order
//!   look like at time T" for any T covered by retained history; summary
//!   queries (open-order count, notional in play, best bid/ask/mid/spread)
//!   do the same for the whole book.
//! - **Convergent by construction**: replay anomalies that reflect the
//!   exchange's authoritative history (a match reported against an
//!   already-terminal order, or a fill that would drive size below zero)
//!   are absorbed silently instead of raised, so the local book always
//!   converges to what the exchange reports.
//! - **Single mutator**: one consumer task owns the book and drains a
//!   bounded channel of command batches; queries hand back owned snapshots
//!   that later mutations never alias.
//!
//! ## Data flow
//!
//! ```text
//! byte frame → decoder → command batch (with feed sequence)
//!            → book.apply → mutation appended to order history
//!            → latest version re-derived → price-level index touched
//! ```
//!
//! The websocket transport, REST bootstrap fetch, and process entry point
//! are the embedder's: this crate starts at the byte frame and ends at the
//! query surface.
//!
//! ## Example
//!
//! ```rust
//! use chronobook::prelude::*;
//! use chrono::{TimeZone, Utc};
//!
//! let book = OrderBook::new("BTC-USD");
//! let t0 = Utc.timestamp_opt(0, 0).unwrap();
//! let t1 = Utc.timestamp_opt(1, 0).unwrap();
//!
//! book.place(
//!     Order { id: OrderId::new("a"), price: 10_000, side: Side::Buy },
//!     50_000_000,
//!     t0,
//! )
//! .unwrap();
//! book.mutate(
//!     &OrderId::new("a"),
//!     vec![OrderMutation::State { state: OrderState::Open, time: t1 }],
//! )
//! .unwrap();
//!
//! assert_eq!(book.get(&OrderId::new("a")).unwrap().state, OrderState::Open);
//! assert_eq!(book.version_at(&OrderId::new("a"), t0).unwrap().state, OrderState::Pending);
//! assert_eq!(book.top_of_book(t1).bid, 10_000);
//! ```

pub mod book;
pub mod feed;

pub mod prelude;

pub use book::{
    BookCommand, BookError, CommandBatch, Order, OrderBook, OrderHistory, OrderId, OrderMutation,
    OrderState, Side, StatefulOrder, TopOfBook, replay,
};
pub use feed::{
    BookSnapshot, DecodeError, DoneReason, FeedConsumer, FeedEvent, OutboundMessage, PRICE_SCALE,
    SIZE_SCALE, SnapshotEntry, command_channel, decode_event, decode_snapshot,
};
