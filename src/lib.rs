//! Cluster wire - session and transport protocol layer for a clustered messaging platform
//!
//! This library provides the binary message schema exchanged between cluster
//! clients, the consensus module and clustered services, together with the
//! channel URI parser and address resolver used to configure transports.
//!
//! # Quick Start
//!
//! ```rust
//! use cluster_wire::{Message, SessionConnectRequest};
//!
//! // Build a message
//! let msg = Message::from(SessionConnectRequest {
//!     correlation_id: 42,
//!     response_stream_id: 102,
//!     response_channel: "aeron:udp?endpoint=localhost:9020".to_string(),
//!     credential_data: Vec::new(),
//! });
//!
//! // Encode to bytes
//! let bytes = msg.encode()?;
//!
//! // Decode from bytes
//! let decoded = Message::decode(&bytes)?;
//! assert_eq!(decoded, msg);
//! # Ok::<(), cluster_wire::Error>(())
//! ```
//!
//! # Features
//!
//! - **Forward-compatible decoding** - longer blocks from newer peers are skipped
//! - **Type-safe message catalog** - one enum variant per template
//! - **Bounded decoding** - every length is checked before bytes are consumed
//! - **Pluggable name resolution** - deterministic tests via an injectable hook
//!
//! # Channels
//!
//! ```rust
//! use cluster_wire::transport::{AddressResolver, UdpChannel};
//!
//! let channel = UdpChannel::parse(
//!     "aeron:udp?endpoint=224.10.9.8:4567|interface=192.168.0.3|ttl=16",
//!     &AddressResolver::default(),
//! )?;
//! assert!(channel.is_multicast());
//! # Ok::<(), cluster_wire::transport::ChannelError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

mod metrics;
pub mod protocol;
pub mod transport;

pub use metrics::{MetricsSnapshot, metrics_snapshot};

pub use protocol::{
    Error, HEADER_SIZE, Message, MessageHeader, MessageType, Result, SCHEMA_ID, SCHEMA_VERSION,
    SEMANTIC_VERSION, SessionConnectRequest,
};
pub use transport::{AddressResolver, ChannelUri, UdpChannel};
