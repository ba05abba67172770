//! Prelude module that re-exports the commonly used types and functions.
//!
//! Instead of importing each type individually, embedders can use:
//!
//! ```rust
//! use chronobook::prelude::*;
//! ```

// The order book engine
pub use crate::book::{
    BookCommand, BookError, CommandBatch, Order, OrderBook, OrderHistory, OrderId, OrderMutation,
    OrderState, Side, StatefulOrder, TopOfBook, replay,
};

// Wire decoding and feed plumbing
pub use crate::feed::{
    BookSnapshot, DecodeError, DoneReason, FeedConsumer, FeedEvent, OutboundMessage, PRICE_SCALE,
    SIZE_SCALE, SnapshotEntry, command_channel, decode_event, decode_snapshot,
};
