//! Shared environment contract
//!
//! The environment owns what the coordinator only borrows: the locator
//! connection used for metadata queries, the scheduler for delayed work,
//! base connection parameters, and the two recovery backoff policies.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use skein_protocol::StreamMetadata;

use crate::backoff::BackOffDelayPolicy;
use crate::transport::ClientParameters;
use crate::Result;

/// Metadata lookups against the environment's locator connection
#[async_trait]
pub trait MetadataLocator: Send + Sync {
    /// Fetch `{stream -> metadata}` for the given stream.
    ///
    /// Errors are fatal during registration and transient during recovery.
    async fn metadata(&self, stream: &str) -> Result<HashMap<String, StreamMetadata>>;
}

/// What the coordinator needs from its surrounding environment
pub trait Environment: Send + Sync {
    /// The shared locator connection
    fn locator(&self) -> Arc<dyn MetadataLocator>;

    /// A fresh copy of the base connection parameters
    fn client_parameters(&self) -> ClientParameters;

    /// Handle to the environment's scheduler; the coordinator owns no
    /// worker threads and spawns all delayed work here
    fn scheduler(&self) -> tokio::runtime::Handle;

    /// Backoff policy for recovery after a connection loss
    fn recovery_back_off_delay_policy(&self) -> BackOffDelayPolicy;

    /// Backoff policy for recovery after a topology change
    fn topology_update_back_off_delay_policy(&self) -> BackOffDelayPolicy;
}
