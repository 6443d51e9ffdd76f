//! Lifecycle hooks on the user-facing producer and consumer objects
//!
//! The coordinator drives these hooks but never constructs or owns the
//! objects behind them. Hook implementations must be cheap and non-blocking;
//! they run on the coordinator's scheduler or on a transport worker.

use std::sync::Arc;

use crate::transport::Connection;

/// Producer-side hooks driven by the coordinator.
///
/// For any one rebind the observable order is `unavailable`, then
/// `set_client` with the replacement connection, then `running`.
pub trait ManagedProducer: Send + Sync {
    /// Publishing id on the current connection; assigned before `set_client`
    fn set_publisher_id(&self, publisher_id: u8);

    /// Bind to a (new) physical connection
    fn set_client(&self, connection: Arc<dyn Connection>);

    /// The current binding is gone; publishing must pause
    fn unavailable(&self);

    /// Rebind complete; publishing may resume
    fn running(&self);

    /// Terminal: the stream is gone (deleted, or recovery timed out)
    fn close_after_stream_deletion(&self);
}

/// Hooks for a consumer's offset-commit attachment.
///
/// The consumer itself lives on its own read connection; only its commit
/// channel is coordinated here, which is why there is no close hook: an
/// unrecoverable commit channel never tears down the consumer.
pub trait CommittingConsumer: Send + Sync {
    /// Bind the commit channel to a (new) physical connection
    fn set_client(&self, connection: Arc<dyn Connection>);

    /// The commit channel is gone; commits must pause
    fn unavailable(&self);

    /// Rebind complete; commits may resume
    fn running(&self);
}
