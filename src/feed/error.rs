//! Decoder error types.

use thiserror::Error;

/// Errors raised while translating wire frames into command batches.
///
/// A decode error aborts the one frame being decoded; the driver logs it
/// and continues with the next frame.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// The frame was not valid JSON or did not match any known event shape.
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A numeric field could not be parsed or does not fit the fixed-point
    /// range.
    #[error("unparseable value in field `{field}`: {value:?}")]
    ValueRange {
        /// The wire field that failed to parse.
        field: &'static str,
        /// The raw value as received.
        value: String,
    },
}
