//! Translates the REST book snapshot into placement commands.

use chrono::{DateTime, Utc};

use crate::book::{BookCommand, CommandBatch, Order, OrderId, Side};

use super::decoder::{PRICE_SCALE, SIZE_SCALE, fixed_point};
use super::error::DecodeError;
use super::message::BookSnapshot;

/// Decode a REST book snapshot into one batch of placements.
///
/// The exchange does not report when each resting order was placed, so every
/// placement is stamped with `received_at`, the caller's wall-clock receipt
/// time of the snapshot. Subsequent realtime mutations for the same identity
/// then sort after the synthesized placement during replay.
///
/// # Errors
/// [`DecodeError::Malformed`] for JSON that doesn't match the snapshot
/// shape, [`DecodeError::ValueRange`] for unparseable ladder values.
pub fn decode_snapshot(
    raw: &[u8],
    received_at: DateTime<Utc>,
) -> Result<CommandBatch, DecodeError> {
    let snapshot: BookSnapshot = serde_json::from_slice(raw)?;

    let mut commands = Vec::with_capacity(snapshot.bids.len() + snapshot.asks.len());
    for (side, ladder) in [(Side::Buy, snapshot.bids), (Side::Sell, snapshot.asks)] {
        for row in ladder {
            commands.push(BookCommand::Place {
                order: Order {
                    id: OrderId::new(row.2),
                    price: fixed_point("price", &row.0, PRICE_SCALE)?,
                    side,
                },
                size: fixed_point("size", &row.1, SIZE_SCALE)?,
                time: received_at,
            });
        }
    }

    Ok(CommandBatch {
        sequence: snapshot.sequence,
        commands,
    })
}
