//! Commands: the only legal ways to modify a book.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::orderbook::OrderBook;
use super::error::BookError;
use super::mutation::OrderMutation;
use super::order::{Order, OrderId};

/// A single modification of the book, decoded from one feed event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookCommand {
    /// Insert a new order with its initial size at placement time.
    Place {
        /// The birth record to insert.
        order: Order,
        /// Initial size in satoshi.
        size: i64,
        /// Placement time reported by the feed.
        time: DateTime<Utc>,
    },

    /// Append a batch of mutations to an existing order's history.
    Mutate {
        /// Identity of the order to mutate.
        id: OrderId,
        /// Mutations to fold in, in wire order.
        mutations: Vec<OrderMutation>,
    },
}

impl BookCommand {
    /// Execute this command against `book`.
    ///
    /// # Errors
    /// Propagates [`BookError::IdentityConflict`] from placements and
    /// [`BookError::UnknownOrder`] from mutations.
    pub fn apply(self, book: &OrderBook) -> Result<(), BookError> {
        match self {
            BookCommand::Place { order, size, time } => book.place(order, size, time),
            BookCommand::Mutate { id, mutations } => book.mutate(&id, mutations),
        }
    }
}

/// The commands decoded from one feed event, tagged with the feed's
/// monotonic sequence number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandBatch {
    /// Sequence number assigned by the upstream feed.
    pub sequence: u64,
    /// Commands in wire order. May be empty (e.g. exchange error frames).
    pub commands: Vec<BookCommand>,
}

impl CommandBatch {
    /// Whether this batch carries no commands.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Execute the commands in order, halting at the first error.
    ///
    /// A non-empty batch records its sequence number on the book even when
    /// a command fails: the feed has already consumed that sequence, and
    /// later events are relative to it. Empty batches touch nothing.
    ///
    /// # Errors
    /// Returns the first [`BookError`] produced by a command; remaining
    /// commands in the batch are not executed.
    pub fn apply(self, book: &OrderBook) -> Result<(), BookError> {
        if self.commands.is_empty() {
            return Ok(());
        }
        book.record_sequence(self.sequence);
        for command in self.commands {
            command.apply(book)?;
        }
        Ok(())
    }
}
