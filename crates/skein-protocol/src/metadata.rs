//! Stream and broker metadata types

use serde::{Deserialize, Serialize};

/// Broker node identity for metadata discovery and leader placement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Broker {
    /// Host for client connections
    pub host: String,
    /// Port for client connections
    pub port: u16,
}

impl Broker {
    /// Create a new broker identity
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Get the address string (host:port)
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Response code carried by broker replies.
///
/// The numbering matches the wire protocol; unknown codes are preserved in
/// [`ResponseCode::Other`] so newer brokers do not break older clients.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ResponseCode {
    Ok,
    StreamDoesNotExist,
    SubscriptionIdAlreadyExists,
    SubscriptionIdDoesNotExist,
    StreamAlreadyExists,
    StreamNotAvailable,
    AuthenticationFailure,
    AccessRefused,
    PreconditionFailed,
    PublisherDoesNotExist,
    Other(u16),
}

impl ResponseCode {
    /// Decode a wire response code
    pub fn from_code(code: u16) -> Self {
        match code {
            0x01 => ResponseCode::Ok,
            0x02 => ResponseCode::StreamDoesNotExist,
            0x03 => ResponseCode::SubscriptionIdAlreadyExists,
            0x04 => ResponseCode::SubscriptionIdDoesNotExist,
            0x05 => ResponseCode::StreamAlreadyExists,
            0x06 => ResponseCode::StreamNotAvailable,
            0x08 => ResponseCode::AuthenticationFailure,
            0x10 => ResponseCode::AccessRefused,
            0x11 => ResponseCode::PreconditionFailed,
            0x12 => ResponseCode::PublisherDoesNotExist,
            other => ResponseCode::Other(other),
        }
    }

    /// Encode back to the wire representation
    pub fn code(&self) -> u16 {
        match self {
            ResponseCode::Ok => 0x01,
            ResponseCode::StreamDoesNotExist => 0x02,
            ResponseCode::SubscriptionIdAlreadyExists => 0x03,
            ResponseCode::SubscriptionIdDoesNotExist => 0x04,
            ResponseCode::StreamAlreadyExists => 0x05,
            ResponseCode::StreamNotAvailable => 0x06,
            ResponseCode::AuthenticationFailure => 0x08,
            ResponseCode::AccessRefused => 0x10,
            ResponseCode::PreconditionFailed => 0x11,
            ResponseCode::PublisherDoesNotExist => 0x12,
            ResponseCode::Other(other) => *other,
        }
    }

    /// Whether the broker accepted the request
    pub fn is_ok(&self) -> bool {
        matches!(self, ResponseCode::Ok)
    }
}

/// Per-stream metadata record returned by a metadata query
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreamMetadata {
    /// Stream name
    pub stream: String,
    /// Response code for this stream's entry
    pub response_code: ResponseCode,
    /// Current write leader (None when no leader is elected, even with an
    /// Ok response code; this is a transient cluster state)
    pub leader: Option<Broker>,
    /// Replica nodes
    pub replicas: Vec<Broker>,
}

impl StreamMetadata {
    /// Create a new metadata record
    pub fn new(stream: impl Into<String>, response_code: ResponseCode) -> Self {
        Self {
            stream: stream.into(),
            response_code,
            leader: None,
            replicas: Vec::new(),
        }
    }

    /// Set the leader
    pub fn with_leader(mut self, leader: Broker) -> Self {
        self.leader = Some(leader);
        self
    }

    /// Add replicas
    pub fn with_replicas(mut self, replicas: Vec<Broker>) -> Self {
        self.replicas = replicas;
        self
    }
}
