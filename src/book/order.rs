//! Order identity, sides, lifecycle states, and derived order state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque order identifier assigned by the upstream exchange.
///
/// The engine never interprets the contents; identities are only compared
/// for equality and used as map keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Wrap an exchange-supplied identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OrderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for OrderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Which side of the book an order rests on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Bid side.
    Buy,
    /// Ask side.
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

/// Lifecycle state of an order.
///
/// `Pending` is the initial state from placement. `Filled` and `Void` are
/// terminal: they absorb further match mutations, though explicit state or
/// size mutations still apply so a re-sorted out-of-order log can overwrite
/// them during replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderState {
    /// Acknowledged by the exchange but not yet resting on the book.
    Pending,
    /// Resting on the book, eligible to match.
    Open,
    /// Fully executed.
    Filled,
    /// Cancelled or rejected.
    Void,
}

impl OrderState {
    /// Whether this state absorbs match mutations.
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderState::Filled | OrderState::Void)
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderState::Pending => write!(f, "pending"),
            OrderState::Open => write!(f, "open"),
            OrderState::Filled => write!(f, "filled"),
            OrderState::Void => write!(f, "void"),
        }
    }
}

/// Immutable birth record of an order.
///
/// Price is in minor currency units (cents) and never changes after
/// placement; only size and state evolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Exchange-assigned identity, unique within a book's lifetime.
    pub id: OrderId,
    /// Limit price in cents.
    pub price: i64,
    /// Buy or Sell.
    pub side: Side,
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} order at price {}; id={}>", self.side, self.price, self.id)
    }
}

/// Derived state of an order at some point in time.
///
/// Produced by replaying a mutation log over the birth record; callers own
/// the returned value and it is never aliased by later mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatefulOrder {
    /// The immutable birth record.
    pub order: Order,
    /// Remaining size in the smallest divisible units (satoshi).
    pub size: i64,
    /// Lifecycle state after the replayed mutations.
    pub state: OrderState,
    /// Counterparty identifiers accumulated from matches where this order
    /// was the taker.
    pub makers: Vec<OrderId>,
    /// Event time of the newest mutation folded in; `None` when no mutation
    /// has been observed yet.
    pub last_mutation: Option<DateTime<Utc>>,
}

impl StatefulOrder {
    /// Whether the order is resting and eligible to match.
    pub fn is_open(&self) -> bool {
        self.state == OrderState::Open
    }
}

impl fmt::Display for StatefulOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{} order at price {} for {} units; state {}; id={}>",
            self.order.side, self.order.price, self.size, self.state, self.order.id
        )
    }
}
