//! # skein-client
//!
//! Client-side coordination for the skein streaming broker: this crate
//! multiplexes many logical producers (and the offset-commit attachments of
//! consumers) onto a small pool of physical connections, keeps every
//! registration bound to the current leader of its stream, and repairs
//! bindings when connections die or the cluster topology changes.
//!
//! ## Features
//!
//! - **Slot multiplexing**: up to [`MAX_PRODUCERS_PER_CLIENT`] producers and
//!   [`MAX_COMMITTING_CONSUMERS_PER_CLIENT`] committing consumers share one
//!   connection; a producer's slot index is its publishing id
//! - **Leader placement**: registrations land on the pool of the stream's
//!   current write leader, discovered through the environment's locator
//! - **Automatic recovery**: connection loss and topology updates displace
//!   the affected registrations into retry jobs driven by a
//!   [`BackOffDelayPolicy`], with bounded give-up via its TIMEOUT sentinel
//! - **Dense packing**: managers are filled in insertion order and torn
//!   down as soon as their last slot is released
//!
//! ## Example
//!
//! ```rust,ignore
//! use skein_client::ProducersCoordinator;
//! use std::sync::Arc;
//!
//! # async fn example(env: Arc<dyn skein_client::Environment>,
//! #                  factory: Arc<dyn skein_client::ClientFactory>,
//! #                  producer: Arc<dyn skein_client::ManagedProducer>)
//! #                  -> skein_client::Result<()> {
//! let coordinator = ProducersCoordinator::new(env, factory);
//!
//! // binds the producer to the leader of "orders" and assigns its
//! // publishing id
//! let registration = coordinator.register_producer(producer, "orders").await?;
//!
//! // later: release the slot (idempotent)
//! registration.cancel();
//! # Ok(())
//! # }
//! ```
//!
//! The transport, the wire codec, and the user-facing producer/consumer
//! objects live elsewhere; this crate sees them only through the
//! [`ClientFactory`], [`Environment`], [`ManagedProducer`], and
//! [`CommittingConsumer`] seams.

mod backoff;
mod coordinator;
mod environment;
mod error;
mod hooks;
mod recovery;
mod transport;

pub use backoff::BackOffDelayPolicy;
pub use coordinator::{
    CleanupHandle, ClientSnapshot, CoordinatorSnapshot, PoolSnapshot, ProducersCoordinator,
    MAX_COMMITTING_CONSUMERS_PER_CLIENT, MAX_PRODUCERS_PER_CLIENT,
};
pub use environment::{Environment, MetadataLocator};
pub use error::{Error, Result};
pub use hooks::{CommittingConsumer, ManagedProducer};
pub use transport::{
    ClientFactory, ClientParameters, Connection, MetadataListener, ShutdownListener,
    ShutdownReason,
};

// Re-export the protocol types that appear in this crate's API.
pub use skein_protocol::{Broker, ResponseCode, StreamMetadata};
