//! Cluster protocol codecs
//!
//! This module provides the wire format, message catalog, and codec for the
//! session, service, consensus, and snapshot protocols.

mod codec;
mod consensus;
mod cursor;
mod error;
mod header;
mod message;
mod service;
mod session;
mod snapshot;
mod state;
mod types;

pub use codec::{decode, decode_prefix, encode, encode_into, encode_to_slice, encoded_length};
pub use consensus::{AppendedPosition, CommitPosition, RequestVote, Vote};
pub use error::{Error, Result};
pub use header::{GroupSizeEncoding, MessageHeader};
pub use message::{Message, Template};
pub use service::{
    CancelTimer, CloseSession, ClusterActionAck, ClusterActionRequest, JoinLog, ScheduleTimer,
    SessionCloseEvent, SessionOpenEvent, TimerEvent,
};
pub use session::{
    Challenge, ChallengeResponse, MembershipQuery, MembershipQueryResponse, NewLeaderEvent,
    SessionCloseRequest, SessionConnectRequest, SessionEvent, SessionHeader,
    SessionKeepAliveRequest,
};
pub use snapshot::{
    ClientSession, ClusterSession, RecoveryPlan, RecoverySnapshot, RecoveryStep, Sequencer,
    SnapshotMarker, Timer,
};
pub use state::{SessionError, SessionLifecycle, SessionState, TermGuard, TermVerdict};
pub use types::{
    BooleanType, CloseReason, ClusterAction, EventCode, MessageType, Protocol, SnapshotMark,
};

/// Schema identifier carried in every message header.
pub const SCHEMA_ID: u16 = 1;

/// Current schema version.
pub const SCHEMA_VERSION: u16 = 1;

/// Semantic version of the message schema.
pub const SEMANTIC_VERSION: &str = "5.2";

/// Message header size in bytes.
pub const HEADER_SIZE: usize = 8;

/// Repeating group header size in bytes.
pub const GROUP_HEADER_SIZE: usize = 4;

/// Length prefix size of a variable-length data field.
pub const VAR_DATA_HEADER_SIZE: usize = 4;

/// Maximum length of a variable-length data field (2^30 bytes).
pub const MAX_VAR_DATA_LENGTH: usize = 1 << 30;
