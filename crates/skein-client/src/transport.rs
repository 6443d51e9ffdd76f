//! Transport seams: connections, the client factory, and upward listeners
//!
//! The coordinator never reads or writes frames; it only opens connections
//! through a [`ClientFactory`], closes them, and reacts to the two upward
//! callbacks the transport fires on its own worker: connection shutdown and
//! broker-announced topology changes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use skein_protocol::ResponseCode;

use crate::Result;

/// Why a connection terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// Orderly close initiated by this client
    ClientClose,
    /// Server closed the connection
    ServerClose,
    /// Missed heartbeats
    HeartbeatTimeout,
    /// Anything else (reset, I/O error)
    Unknown,
}

impl ShutdownReason {
    /// True for every termination the coordinator has to repair
    pub fn is_unexpected(&self) -> bool {
        !matches!(self, ShutdownReason::ClientClose)
    }
}

/// Callback fired by the transport when a connection terminates
pub type ShutdownListener = Arc<dyn Fn(ShutdownReason) + Send + Sync>;

/// Callback fired when the broker announces a stream topology change
pub type MetadataListener = Arc<dyn Fn(&str, ResponseCode) + Send + Sync>;

/// One physical broker connection, owned by a manager.
///
/// `close` is fire-and-forget; the transport tears the socket down on its
/// own worker and fires the shutdown listener with
/// [`ShutdownReason::ClientClose`].
pub trait Connection: Send + Sync {
    fn close(&self);
}

/// Options for opening one physical connection.
///
/// The coordinator takes the environment's base copy and binds the target
/// broker plus its per-manager listeners before handing it to the factory.
#[derive(Clone, Default)]
pub struct ClientParameters {
    pub host: String,
    pub port: u16,
    pub connection_timeout: Option<Duration>,
    pub heartbeat: Option<Duration>,
    pub shutdown_listener: Option<ShutdownListener>,
    pub metadata_listener: Option<MetadataListener>,
}

impl ClientParameters {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Set the target host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the target port
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the connect/handshake timeout
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = Some(timeout);
        self
    }

    /// Set the heartbeat interval
    pub fn heartbeat(mut self, heartbeat: Duration) -> Self {
        self.heartbeat = Some(heartbeat);
        self
    }

    /// Register the shutdown listener
    pub fn shutdown_listener(mut self, listener: ShutdownListener) -> Self {
        self.shutdown_listener = Some(listener);
        self
    }

    /// Register the metadata listener
    pub fn metadata_listener(mut self, listener: MetadataListener) -> Self {
        self.metadata_listener = Some(listener);
        self
    }
}

impl std::fmt::Debug for ClientParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientParameters")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("connection_timeout", &self.connection_timeout)
            .field("heartbeat", &self.heartbeat)
            .field("shutdown_listener", &self.shutdown_listener.is_some())
            .field("metadata_listener", &self.metadata_listener.is_some())
            .finish()
    }
}

/// Opens physical connections; performs the TCP/TLS handshake
#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn create(&self, parameters: ClientParameters) -> Result<Arc<dyn Connection>>;
}
