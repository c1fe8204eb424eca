//! Channel URI parsing.
//!
//! Grammar: `aeron:{ipc|udp}[?key=value[|key=value...]]`. Parsing is a single
//! forward scan; parsed size is bounded by the input length.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::UriError;

/// URI scheme prefix shared by every channel
pub const URI_SCHEME: &str = "aeron:";

/// Longest accepted channel URI in bytes
pub const MAX_URI_LENGTH: usize = 4096;

/// UDP destination address parameter
pub const ENDPOINT_KEY: &str = "endpoint";
/// UDP local interface parameter
pub const INTERFACE_KEY: &str = "interface";
/// UDP multicast time-to-live parameter
pub const TTL_KEY: &str = "ttl";

/// Transport media named by a channel URI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Media {
    /// Shared-memory channel within one host
    Ipc,
    /// UDP unicast or multicast
    Udp,
}

impl Media {
    /// Keyword used in the URI
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ipc => "ipc",
            Self::Udp => "udp",
        }
    }
}

impl fmt::Display for Media {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single `key=value` parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UriParam {
    /// Parameter name
    pub key: String,
    /// Parameter value
    pub value: String,
}

impl UriParam {
    /// Create a parameter
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Parameters of an IPC channel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IpcParams {
    /// Every parameter, in first-seen order
    pub additional: Vec<UriParam>,
}

/// Parameters of a UDP channel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UdpParams {
    /// `endpoint`: remote `host:port` to send to or multicast group
    pub endpoint: Option<String>,
    /// `interface`: local interface literal, optionally with port and prefix
    pub interface: Option<String>,
    /// `ttl`: multicast time-to-live, unparsed
    pub ttl: Option<String>,
    /// Remaining parameters, in first-seen order with duplicates kept
    pub additional: Vec<UriParam>,
}

/// Parsed channel URI
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ChannelUri {
    /// `aeron:ipc`
    Ipc(IpcParams),
    /// `aeron:udp`
    Udp(UdpParams),
}

impl ChannelUri {
    /// Parse a channel URI.
    ///
    /// # Examples
    ///
    /// ```
    /// use cluster_wire::transport::ChannelUri;
    ///
    /// let uri = ChannelUri::parse("aeron:udp?endpoint=224.10.9.8:4567|ttl=16")?;
    /// assert_eq!(uri.param("endpoint"), Some("224.10.9.8:4567"));
    /// assert_eq!(uri.to_string(), "aeron:udp?endpoint=224.10.9.8:4567|ttl=16");
    /// # Ok::<(), cluster_wire::transport::UriError>(())
    /// ```
    pub fn parse(uri: &str) -> Result<Self, UriError> {
        if uri.len() > MAX_URI_LENGTH {
            return Err(UriError::UriTooLong {
                length: uri.len(),
                max: MAX_URI_LENGTH,
            });
        }

        let rest = uri.strip_prefix(URI_SCHEME).ok_or_else(|| UriError::InvalidScheme {
            uri: uri.to_string(),
        })?;
        let (transport, query) = match rest.split_once('?') {
            Some((transport, query)) => (transport, Some(query)),
            None => (rest, None),
        };
        let query_offset = URI_SCHEME.len() + transport.len() + 1;

        match (transport, query) {
            ("ipc", query) => {
                let additional = match query {
                    Some(query) => parse_params(query, query_offset)?,
                    None => Vec::new(),
                };
                Ok(Self::Ipc(IpcParams { additional }))
            }
            ("udp", Some(query)) => {
                let mut params = UdpParams::default();
                for param in parse_params(query, query_offset)? {
                    match param.key.as_str() {
                        ENDPOINT_KEY => params.endpoint = Some(param.value),
                        INTERFACE_KEY => params.interface = Some(param.value),
                        TTL_KEY => params.ttl = Some(param.value),
                        _ => params.additional.push(param),
                    }
                }
                Ok(Self::Udp(params))
            }
            ("udp", None) => Err(UriError::MalformedParam {
                offset: uri.len(),
                reason: "udp channel requires a '?' parameter section",
            }),
            (other, _) => Err(UriError::UnknownTransport {
                transport: other.to_string(),
            }),
        }
    }

    /// Transport media of the channel
    #[must_use]
    pub const fn media(&self) -> Media {
        match self {
            Self::Ipc(_) => Media::Ipc,
            Self::Udp(_) => Media::Udp,
        }
    }

    /// UDP parameters, if this is a UDP channel
    #[must_use]
    pub const fn as_udp(&self) -> Option<&UdpParams> {
        match self {
            Self::Udp(params) => Some(params),
            Self::Ipc(_) => None,
        }
    }

    /// Parameters that have no dedicated field
    #[must_use]
    pub fn additional_params(&self) -> &[UriParam] {
        match self {
            Self::Ipc(params) => &params.additional,
            Self::Udp(params) => &params.additional,
        }
    }

    /// First value for `key`, well-known UDP keys included.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.well_known(key).or_else(|| {
            self.additional_params()
                .iter()
                .find(|param| param.key == key)
                .map(|param| param.value.as_str())
        })
    }

    /// Every value for `key`, in the order they appeared.
    pub fn params<'a, 'k>(
        &'a self,
        key: &'k str,
    ) -> impl Iterator<Item = &'a str> + use<'a, 'k> {
        self.well_known(key).into_iter().chain(
            self.additional_params()
                .iter()
                .filter(move |param| param.key == key)
                .map(|param| param.value.as_str()),
        )
    }

    fn well_known(&self, key: &str) -> Option<&str> {
        let params = self.as_udp()?;
        match key {
            ENDPOINT_KEY => params.endpoint.as_deref(),
            INTERFACE_KEY => params.interface.as_deref(),
            TTL_KEY => params.ttl.as_deref(),
            _ => None,
        }
    }
}

/// Split `key=value|key=value` into parameters.
///
/// A key runs to the first `=` and may contain `|`. A value runs to the next
/// `|` and may contain `=`. A single trailing `|` is accepted.
fn parse_params(query: &str, base_offset: usize) -> Result<Vec<UriParam>, UriError> {
    let bytes = query.as_bytes();
    let mut params = Vec::new();
    let mut start = 0;

    while start < bytes.len() {
        let Some(key_len) = bytes[start..].iter().position(|&b| b == b'=') else {
            return Err(UriError::MalformedParam {
                offset: base_offset + start,
                reason: "parameter has no '='",
            });
        };
        if key_len == 0 {
            return Err(UriError::MalformedParam {
                offset: base_offset + start,
                reason: "empty parameter key",
            });
        }

        let key_end = start + key_len;
        let value_start = key_end + 1;
        let value_end = bytes[value_start..]
            .iter()
            .position(|&b| b == b'|')
            .map_or(bytes.len(), |len| value_start + len);
        if value_end == value_start {
            return Err(UriError::MalformedParam {
                offset: base_offset + start,
                reason: "empty parameter value",
            });
        }

        // Delimiters are ASCII so these are char boundaries.
        params.push(UriParam::new(
            &query[start..key_end],
            &query[value_start..value_end],
        ));
        start = value_end + 1;
    }

    Ok(params)
}

fn write_params<'a>(
    f: &mut fmt::Formatter<'_>,
    params: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> fmt::Result {
    for (i, (key, value)) in params.into_iter().enumerate() {
        if i > 0 {
            f.write_str("|")?;
        }
        write!(f, "{key}={value}")?;
    }
    Ok(())
}

impl fmt::Display for ChannelUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{URI_SCHEME}{}", self.media())?;
        let additional = self
            .additional_params()
            .iter()
            .map(|param| (param.key.as_str(), param.value.as_str()));

        match self {
            Self::Ipc(params) => {
                if params.additional.is_empty() {
                    return Ok(());
                }
                f.write_str("?")?;
                write_params(f, additional)
            }
            Self::Udp(params) => {
                f.write_str("?")?;
                let well_known = [
                    (ENDPOINT_KEY, params.endpoint.as_deref()),
                    (INTERFACE_KEY, params.interface.as_deref()),
                    (TTL_KEY, params.ttl.as_deref()),
                ]
                .into_iter()
                .filter_map(|(key, value)| value.map(|value| (key, value)));
                write_params(f, well_known.chain(additional))
            }
        }
    }
}

impl FromStr for ChannelUri {
    type Err = UriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
