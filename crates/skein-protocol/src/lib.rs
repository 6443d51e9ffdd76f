//! Skein Wire Protocol Types
//!
//! This crate defines the metadata types shared between the skein client and
//! the broker daemon: broker identities, response codes, and per-stream
//! metadata records returned by metadata queries.
//!
//! The actual frame codec lives with the transport; this crate is pure data
//! so that client-side coordination logic can be tested without a socket.

mod metadata;

pub use metadata::{Broker, ResponseCode, StreamMetadata};
