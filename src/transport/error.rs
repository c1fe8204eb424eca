//! Error types for channel URI parsing, address resolution and channel setup.

use core::fmt;
use thiserror::Error;

/// Errors produced while parsing a channel URI.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UriError {
    /// Input does not start with the `aeron:` scheme
    #[error("invalid scheme, expected 'aeron:' prefix: {uri}")]
    InvalidScheme {
        /// Offending input
        uri: String,
    },

    /// Transport keyword is not `ipc` or `udp`
    #[error("unknown transport '{transport}'")]
    UnknownTransport {
        /// Text found where the transport keyword was expected
        transport: String,
    },

    /// A `key=value` pair is empty, unterminated or missing a part
    #[error("malformed parameter at offset {offset}: {reason}")]
    MalformedParam {
        /// Byte offset into the URI where the parameter starts
        offset: usize,
        /// What was wrong with it
        reason: &'static str,
    },

    /// Input exceeds the accepted URI length
    #[error("uri length {length} exceeds maximum {max}")]
    UriTooLong {
        /// Length of the input in bytes
        length: usize,
        /// Accepted maximum
        max: usize,
    },
}

/// Errors produced while resolving host, port and interface strings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Port is missing, empty, non-numeric or out of range
    #[error("invalid port in '{input}'")]
    InvalidPort {
        /// Offending input
        input: String,
    },

    /// Host is not a valid literal or hostname, or the zone is malformed
    #[error("invalid address literal '{input}': {reason}")]
    InvalidAddressLiteral {
        /// Offending input
        input: String,
        /// What was wrong with it
        reason: &'static str,
    },

    /// Prefix length is empty, non-numeric or wider than the address family
    #[error("invalid prefix length in '{input}', must be 0..={max}")]
    InvalidPrefixLength {
        /// Offending input
        input: String,
        /// Width of the address family
        max: u8,
    },

    /// Name resolution produced no usable address
    #[error("unable to resolve host '{host}': {reason}")]
    HostResolutionFailed {
        /// Hostname passed to the resolver
        host: String,
        /// Resolver failure or the reason no candidate was usable
        reason: String,
    },
}

impl ResolveError {
    /// Whether retrying the same input may succeed later.
    ///
    /// Grammar errors are permanent configuration errors; only name
    /// resolution failures depend on the environment.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::HostResolutionFailed { .. })
    }
}

/// Unified error type for turning a channel URI into socket addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// URI could not be parsed.
    Uri(UriError),
    /// Endpoint or interface could not be resolved.
    Resolve(ResolveError),
    /// Channel is not a UDP channel.
    NotUdp,
    /// UDP channel has no `endpoint` parameter.
    MissingEndpoint,
    /// `ttl` parameter is not a number in `0..=255`.
    InvalidTtl {
        /// Value of the `ttl` parameter.
        value: String,
    },
    /// Interface and endpoint belong to different address families.
    AddressFamilyMismatch {
        /// Family of the endpoint.
        endpoint: &'static str,
        /// Family of the interface.
        interface: &'static str,
    },
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uri(err) => write!(f, "uri error: {err}"),
            Self::Resolve(err) => write!(f, "resolve error: {err}"),
            Self::NotUdp => f.write_str("channel is not a udp channel"),
            Self::MissingEndpoint => f.write_str("udp channel has no endpoint"),
            Self::InvalidTtl { value } => write!(f, "invalid ttl '{value}' (expected 0..=255)"),
            Self::AddressFamilyMismatch {
                endpoint,
                interface,
            } => write!(
                f,
                "interface family {interface} does not match endpoint family {endpoint}"
            ),
        }
    }
}

impl std::error::Error for ChannelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Uri(err) => Some(err),
            Self::Resolve(err) => Some(err),
            _ => None,
        }
    }
}

impl From<UriError> for ChannelError {
    fn from(err: UriError) -> Self {
        Self::Uri(err)
    }
}

impl From<ResolveError> for ChannelError {
    fn from(err: ResolveError) -> Self {
        Self::Resolve(err)
    }
}
