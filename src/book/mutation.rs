//! Order mutations and the replay fold that derives order state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::order::{Order, OrderId, OrderState, StatefulOrder};

/// One observed change to an order, tagged with its event time.
///
/// Mutations are the only vocabulary for altering an order after placement.
/// They are stored in the order's history and folded into derived state by
/// [`replay`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderMutation {
    /// Unconditionally assigns a new lifecycle state.
    State {
        /// The state to assign.
        state: OrderState,
        /// Event time reported by the feed.
        time: DateTime<Utc>,
    },

    /// Unconditionally assigns a new remaining size.
    Size {
        /// The size to assign, in satoshi.
        new_size: i64,
        /// Event time reported by the feed.
        time: DateTime<Utc>,
    },

    /// A trade executed against this order.
    ///
    /// Decrements size by the traded amount and transitions to `Filled`
    /// when the remainder reaches zero. When this order was the taker, the
    /// resting counterparty's identity is accumulated.
    Match {
        /// Exchange-assigned trade identifier.
        trade_id: i64,
        /// Traded size in satoshi.
        size: i64,
        /// Whether this order was the resting (maker) side of the trade.
        was_maker: bool,
        /// The maker's identity, carried on the taker's mutation only.
        maker_id: Option<OrderId>,
        /// Event time reported by the feed.
        time: DateTime<Utc>,
    },
}

impl OrderMutation {
    /// The event time this mutation was observed at.
    pub fn time(&self) -> DateTime<Utc> {
        match self {
            OrderMutation::State { time, .. }
            | OrderMutation::Size { time, .. }
            | OrderMutation::Match { time, .. } => *time,
        }
    }

    /// Folds this mutation into `current`.
    ///
    /// State and size assignments are infallible. A match targeting an
    /// order that is not open, or one that would drive size below zero, is
    /// absorbed without effect: it reflects exchange history the local book
    /// must converge to, not a local fault.
    fn fold(&self, current: &mut StatefulOrder) {
        match self {
            OrderMutation::State { state, .. } => {
                current.state = *state;
            }
            OrderMutation::Size { new_size, .. } => {
                current.size = *new_size;
            }
            OrderMutation::Match {
                size,
                was_maker,
                maker_id,
                ..
            } => {
                if current.state != OrderState::Open {
                    return;
                }
                if current.size - size < 0 {
                    return;
                }
                current.size -= size;
                if !was_maker {
                    if let Some(maker) = maker_id {
                        current.makers.push(maker.clone());
                    }
                }
                if current.size == 0 {
                    current.state = OrderState::Filled;
                }
            }
        }
    }
}

/// Derives an order's state by folding `mutations` over its birth record.
///
/// The fold starts from `(state = Pending, size = initial_size, makers = [])`
/// and expects `mutations` already sorted ascending by event time. Absorbed
/// mutations still advance the derived `last_mutation` clock: they were
/// observed, just ineffective.
///
/// Replay is pure: the same birth record, initial size, and mutation
/// sequence always yield an identical derived state.
pub fn replay<'a, I>(birth: &Order, initial_size: i64, mutations: I) -> StatefulOrder
where
    I: IntoIterator<Item = &'a OrderMutation>,
{
    let mut current = StatefulOrder {
        order: birth.clone(),
        size: initial_size,
        state: OrderState::Pending,
        makers: Vec::new(),
        last_mutation: None,
    };

    for mutation in mutations {
        mutation.fold(&mut current);
        current.last_mutation = Some(match current.last_mutation {
            Some(seen) => seen.max(mutation.time()),
            None => mutation.time(),
        });
    }

    current
}
