//! The apply loop that owns the book and drains the command channel.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::book::{CommandBatch, OrderBook};

/// Create the bounded channel between the frame producer and the consumer.
///
/// The producer (the embedder's transport task) decodes frames and sends
/// batches; it suspends when the channel is full. The consumer drains the
/// channel serially into the book.
pub fn command_channel(
    capacity: usize,
) -> (mpsc::Sender<CommandBatch>, mpsc::Receiver<CommandBatch>) {
    mpsc::channel(capacity)
}

/// Owns the book and serially applies command batches from the feed.
///
/// The consumer is the book's single mutator. Command errors are logged and
/// do not halt the loop; terminal histories are vacuumed between batches.
/// The loop exits when every sender is dropped.
pub struct FeedConsumer {
    book: Arc<OrderBook>,
    receiver: mpsc::Receiver<CommandBatch>,
}

impl FeedConsumer {
    /// Attach a consumer to a book and the receiving end of the feed
    /// channel.
    pub fn new(book: Arc<OrderBook>, receiver: mpsc::Receiver<CommandBatch>) -> Self {
        Self { book, receiver }
    }

    /// Drain the channel until it closes.
    pub async fn run(mut self) {
        while let Some(batch) = self.receiver.recv().await {
            self.apply(batch);
        }
        debug!("feed channel closed, consumer for {} exiting", self.book.product());
    }

    /// Apply one batch, vacuum, and report the book's shape.
    fn apply(&self, batch: CommandBatch) {
        let sequence = batch.sequence;
        if let Err(err) = batch.apply(&self.book) {
            warn!("failed to apply batch at sequence {sequence}: {err}");
        }
        let reaped = self.book.vacuum();

        if let Some(now) = self.book.last_mutation_time() {
            let top = self.book.top_of_book(now);
            debug!(
                "{} seq={} open={} bid={} mid={} ask={} spread={} reaped={}",
                self.book.product(),
                sequence,
                self.book.open_orders(now),
                top.bid,
                top.mid,
                top.ask,
                top.spread,
                reaped,
            );
        }
    }
}
