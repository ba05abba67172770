//! Translates realtime feed events into command batches.
//!
//! One frame in, one [`CommandBatch`] out, tagged with the frame's sequence
//! number. The decoder owns the fixed-point conversions: decimal dollar
//! strings become cents, decimal major-unit strings become satoshi, both
//! via 64-bit float multiplication truncated to a signed integer. Changing
//! either scale is a wire-compatibility break.

use tracing::warn;

use crate::book::{BookCommand, CommandBatch, Order, OrderId, OrderMutation, OrderState};

use super::error::DecodeError;
use super::message::{DoneReason, FeedEvent};

/// Cents per quote currency unit.
pub const PRICE_SCALE: f64 = 100.0;

/// Satoshi per major currency unit.
pub const SIZE_SCALE: f64 = 100_000_000.0;

/// Parse a decimal string into fixed-point units of `scale`.
pub(super) fn fixed_point(field: &'static str, raw: &str, scale: f64) -> Result<i64, DecodeError> {
    let value: f64 = raw.parse().map_err(|_| DecodeError::ValueRange {
        field,
        value: raw.to_string(),
    })?;
    if !value.is_finite() {
        return Err(DecodeError::ValueRange {
            field,
            value: raw.to_string(),
        });
    }
    Ok((value * scale) as i64)
}

/// Decode one realtime frame into the commands it implies.
///
/// Every event type maps to a fixed command shape; `error` frames are
/// logged and produce an empty batch. Match events fan out into two
/// mutation commands, taker first, both carrying the same trade.
///
/// # Errors
/// [`DecodeError::Malformed`] for JSON the frame shapes don't accept,
/// [`DecodeError::ValueRange`] for unparseable numeric strings.
pub fn decode_event(raw: &[u8]) -> Result<CommandBatch, DecodeError> {
    let event: FeedEvent = serde_json::from_slice(raw)?;

    let batch = match event {
        FeedEvent::Received {
            time,
            sequence,
            order_id,
            side,
            price,
            size,
        } => CommandBatch {
            sequence,
            commands: vec![BookCommand::Place {
                order: Order {
                    id: OrderId::new(order_id),
                    price: fixed_point("price", &price, PRICE_SCALE)?,
                    side,
                },
                size: fixed_point("size", &size, SIZE_SCALE)?,
                time,
            }],
        },

        FeedEvent::Open {
            time,
            sequence,
            order_id,
            remaining_size,
        } => CommandBatch {
            sequence,
            commands: vec![BookCommand::Mutate {
                id: OrderId::new(order_id),
                mutations: vec![
                    OrderMutation::Size {
                        new_size: fixed_point("remaining_size", &remaining_size, SIZE_SCALE)?,
                        time,
                    },
                    OrderMutation::State {
                        state: OrderState::Open,
                        time,
                    },
                ],
            }],
        },

        FeedEvent::Done {
            time,
            sequence,
            order_id,
            reason,
            remaining_size,
        } => {
            let state = match reason {
                DoneReason::Filled => OrderState::Filled,
                DoneReason::Cancelled => OrderState::Void,
            };
            CommandBatch {
                sequence,
                commands: vec![BookCommand::Mutate {
                    id: OrderId::new(order_id),
                    mutations: vec![
                        OrderMutation::Size {
                            new_size: fixed_point("remaining_size", &remaining_size, SIZE_SCALE)?,
                            time,
                        },
                        OrderMutation::State { state, time },
                    ],
                }],
            }
        }

        FeedEvent::Match {
            time,
            sequence,
            trade_id,
            maker_order_id,
            taker_order_id,
            size,
        } => {
            let traded = fixed_point("size", &size, SIZE_SCALE)?;
            let maker_id = OrderId::new(maker_order_id);
            CommandBatch {
                sequence,
                commands: vec![
                    BookCommand::Mutate {
                        id: OrderId::new(taker_order_id),
                        mutations: vec![OrderMutation::Match {
                            trade_id,
                            size: traded,
                            was_maker: false,
                            maker_id: Some(maker_id.clone()),
                            time,
                        }],
                    },
                    BookCommand::Mutate {
                        id: maker_id,
                        mutations: vec![OrderMutation::Match {
                            trade_id,
                            size: traded,
                            was_maker: true,
                            maker_id: None,
                            time,
                        }],
                    },
                ],
            }
        }

        FeedEvent::Change {
            time,
            sequence,
            order_id,
            new_size,
        } => CommandBatch {
            sequence,
            commands: vec![BookCommand::Mutate {
                id: OrderId::new(order_id),
                mutations: vec![OrderMutation::Size {
                    new_size: fixed_point("new_size", &new_size, SIZE_SCALE)?,
                    time,
                }],
            }],
        },

        FeedEvent::Error { message } => {
            warn!("exchange error frame: {message}");
            CommandBatch {
                sequence: 0,
                commands: Vec::new(),
            }
        }
    };

    Ok(batch)
}
