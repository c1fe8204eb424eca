//! Host, port and interface text formats.
//!
//! ```text
//! host:port        127.0.0.1:40123   node-a.cluster:40123   [fe80::1%eth0]:40123
//! interface        literal[:port][/prefixLength]   192.168.1.20:1234/24   [::1]/48
//! ```
//!
//! IPv6 literals are always bracketed. Parsing here never touches the name
//! resolution hook; see [`super::AddressResolver`] for that.

use core::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV6};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::ResolveError;

/// IP address family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AddressFamily {
    /// 32-bit addresses
    Ipv4,
    /// 128-bit addresses
    Ipv6,
}

impl AddressFamily {
    /// Family of an address
    #[must_use]
    pub const fn of(ip: &IpAddr) -> Self {
        match ip {
            IpAddr::V4(_) => Self::Ipv4,
            IpAddr::V6(_) => Self::Ipv6,
        }
    }

    /// Address width in bits, also the widest valid prefix length
    #[must_use]
    pub const fn width(self) -> u8 {
        match self {
            Self::Ipv4 => 32,
            Self::Ipv6 => 128,
        }
    }

    /// Wildcard address of this family
    #[must_use]
    pub const fn unspecified(self) -> IpAddr {
        match self {
            Self::Ipv4 => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            Self::Ipv6 => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        }
    }

    /// Short display name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ipv4 => "IPv4",
            Self::Ipv6 => "IPv6",
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concrete address produced by resolution, ready to configure a socket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResolvedAddress {
    ip: IpAddr,
    port: Option<u16>,
    zone: Option<String>,
    scope_id: u32,
    prefix_length: u8,
}

impl ResolvedAddress {
    /// Exact address with a port and no zone.
    #[must_use]
    pub const fn new(ip: IpAddr, port: u16) -> Self {
        Self {
            ip,
            port: Some(port),
            zone: None,
            scope_id: 0,
            prefix_length: AddressFamily::of(&ip).width(),
        }
    }

    pub(crate) const fn from_parts(
        ip: IpAddr,
        port: Option<u16>,
        zone: Option<String>,
        scope_id: u32,
        prefix_length: u8,
    ) -> Self {
        Self {
            ip,
            port,
            zone,
            scope_id,
            prefix_length,
        }
    }

    /// Address family
    #[must_use]
    pub const fn family(&self) -> AddressFamily {
        AddressFamily::of(&self.ip)
    }

    /// IP address
    #[must_use]
    pub const fn ip(&self) -> IpAddr {
        self.ip
    }

    /// Port, if one was given
    #[must_use]
    pub const fn port(&self) -> Option<u16> {
        self.port
    }

    /// IPv6 zone exactly as written after `%`
    #[must_use]
    pub fn zone(&self) -> Option<&str> {
        self.zone.as_deref()
    }

    /// Numeric scope id for the zone, 0 when absent or unknown
    #[must_use]
    pub const fn scope_id(&self) -> u32 {
        self.scope_id
    }

    /// Prefix length; the family width means "this exact address"
    #[must_use]
    pub const fn prefix_length(&self) -> u8 {
        self.prefix_length
    }

    /// Whether the address is a multicast group
    #[must_use]
    pub const fn is_multicast(&self) -> bool {
        self.ip.is_multicast()
    }

    /// Socket address, using port 0 when none was given.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        let port = match self.port {
            Some(port) => port,
            None => 0,
        };
        match self.ip {
            IpAddr::V4(ip) => SocketAddr::new(IpAddr::V4(ip), port),
            IpAddr::V6(ip) => SocketAddr::V6(SocketAddrV6::new(ip, port, 0, self.scope_id)),
        }
    }
}

impl From<SocketAddr> for ResolvedAddress {
    fn from(addr: SocketAddr) -> Self {
        let scope_id = match addr {
            SocketAddr::V4(_) => 0,
            SocketAddr::V6(v6) => v6.scope_id(),
        };
        Self {
            zone: (scope_id != 0).then(|| scope_id.to_string()),
            scope_id,
            ..Self::new(addr.ip(), addr.port())
        }
    }
}

/// Canonical text form.
///
/// Parses back to an equal value with the same operation that produced it.
/// The prefix is only written when narrower than the family width.
impl fmt::Display for ResolvedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.ip, &self.zone) {
            (IpAddr::V4(ip), _) => write!(f, "{ip}")?,
            (IpAddr::V6(ip), Some(zone)) => write!(f, "[{ip}%{zone}]")?,
            (IpAddr::V6(ip), None) => write!(f, "[{ip}]")?,
        }
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        if self.prefix_length != self.family().width() {
            write!(f, "/{}", self.prefix_length)?;
        }
        Ok(())
    }
}

/// Host part of an address string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Host<'a> {
    Literal { ip: IpAddr, zone: Option<&'a str> },
    Name(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HostAndPort<'a> {
    pub(crate) host: Host<'a>,
    pub(crate) port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct InterfaceSpec<'a> {
    pub(crate) ip: IpAddr,
    pub(crate) zone: Option<&'a str>,
    pub(crate) port: Option<u16>,
    pub(crate) prefix_length: u8,
}

/// Parse `host:port` or `[ipv6[%zone]]:port`.
pub(crate) fn parse_host_and_port(input: &str) -> Result<HostAndPort<'_>, ResolveError> {
    let (host, rest) = split_host(input)?;
    let port = rest
        .strip_prefix(':')
        .ok_or_else(|| invalid_port(input))
        .and_then(|port| parse_port(input, port))?;
    Ok(HostAndPort { host, port })
}

/// Parse `literal[:port][/prefixLength]`.
pub(crate) fn parse_interface(input: &str) -> Result<InterfaceSpec<'_>, ResolveError> {
    let (host, rest) = split_host(input)?;
    let (ip, zone) = match host {
        Host::Literal { ip, zone } => (ip, zone),
        Host::Name(_) => {
            return Err(invalid_literal(
                input,
                "interface must be an address literal",
            ));
        }
    };

    let (port_text, prefix_text) = match rest.split_once('/') {
        Some((port, prefix)) => (port, Some(prefix)),
        None => (rest, None),
    };
    let port = match port_text {
        "" => None,
        text => {
            let port = text.strip_prefix(':').ok_or_else(|| {
                invalid_literal(input, "unexpected characters after address")
            })?;
            Some(parse_port(input, port)?)
        }
    };

    let width = AddressFamily::of(&ip).width();
    let prefix_length = match prefix_text {
        None => width,
        Some(text) => parse_prefix(input, text, width)?,
    };

    Ok(InterfaceSpec {
        ip,
        zone,
        port,
        prefix_length,
    })
}

/// Split the host off the front, returning it and the unparsed remainder.
fn split_host(input: &str) -> Result<(Host<'_>, &str), ResolveError> {
    if let Some(bracketed) = input.strip_prefix('[') {
        let (inner, rest) = bracketed
            .split_once(']')
            .ok_or_else(|| invalid_literal(input, "missing ']' after IPv6 literal"))?;
        let (addr, zone) = match inner.split_once('%') {
            Some((addr, zone)) => (addr, Some(validate_zone(input, zone)?)),
            None => (inner, None),
        };
        let ip = addr
            .parse::<Ipv6Addr>()
            .map_err(|_| invalid_literal(input, "bracketed host is not an IPv6 literal"))?;
        return Ok((
            Host::Literal {
                ip: IpAddr::V6(ip),
                zone,
            },
            rest,
        ));
    }

    let end = input.find([':', '/']).unwrap_or(input.len());
    let (host, rest) = input.split_at(end);
    if host.is_empty() {
        return Err(invalid_literal(input, "empty host"));
    }
    if let Ok(ip) = host.parse::<Ipv4Addr>() {
        return Ok((
            Host::Literal {
                ip: IpAddr::V4(ip),
                zone: None,
            },
            rest,
        ));
    }
    if !host
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_'))
    {
        return Err(invalid_literal(input, "host is neither a literal nor a hostname"));
    }
    Ok((Host::Name(host), rest))
}

fn validate_zone<'a>(input: &str, zone: &'a str) -> Result<&'a str, ResolveError> {
    if zone.is_empty() {
        return Err(invalid_literal(input, "empty IPv6 zone"));
    }
    if !zone
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'~' | b'_' | b'.' | b'-'))
    {
        return Err(invalid_literal(input, "invalid character in IPv6 zone"));
    }
    Ok(zone)
}

fn parse_port(input: &str, port: &str) -> Result<u16, ResolveError> {
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid_port(input));
    }
    port.parse().map_err(|_| invalid_port(input))
}

fn parse_prefix(input: &str, prefix: &str, width: u8) -> Result<u8, ResolveError> {
    let invalid = || ResolveError::InvalidPrefixLength {
        input: input.to_string(),
        max: width,
    };
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    match prefix.parse::<u8>() {
        Ok(length) if length <= width => Ok(length),
        _ => Err(invalid()),
    }
}

fn invalid_port(input: &str) -> ResolveError {
    ResolveError::InvalidPort {
        input: input.to_string(),
    }
}

fn invalid_literal(input: &str, reason: &'static str) -> ResolveError {
    ResolveError::InvalidAddressLiteral {
        input: input.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_and_port_literals() {
        let parsed = parse_host_and_port("127.0.0.1:1234").unwrap();
        assert_eq!(
            parsed.host,
            Host::Literal {
                ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
                zone: None
            }
        );
        assert_eq!(parsed.port, 1234);

        let parsed = parse_host_and_port("[::1%12~_.-34]:1234").unwrap();
        assert_eq!(
            parsed.host,
            Host::Literal {
                ip: IpAddr::V6(Ipv6Addr::LOCALHOST),
                zone: Some("12~_.-34")
            }
        );
    }

    #[test]
    fn test_hostname_passed_through() {
        let parsed = parse_host_and_port("node-a.cluster_1:40123").unwrap();
        assert_eq!(parsed.host, Host::Name("node-a.cluster_1"));
        assert_eq!(parsed.port, 40123);
    }

    #[test]
    fn test_port_errors() {
        for input in [
            "192.168.1.20:aa",
            "192.168.1.20",
            "192.168.1.20:",
            "192.168.1.20:65536",
            "192.168.1.20:+80",
            "[::1]",
            "[::1]1234",
        ] {
            assert!(
                matches!(parse_host_and_port(input), Err(ResolveError::InvalidPort { .. })),
                "{input}"
            );
        }
    }

    #[test]
    fn test_literal_errors() {
        for input in [
            ":1234",
            "[::1:1234",
            "[127.0.0.1]:1234",
            "[::1%]:1234",
            "[::1%eth/0]:1234",
            "bad host:1234",
        ] {
            assert!(
                matches!(
                    parse_host_and_port(input),
                    Err(ResolveError::InvalidAddressLiteral { .. })
                ),
                "{input}"
            );
        }
    }

    #[test]
    fn test_interface_forms() {
        let spec = parse_interface("192.168.1.20:1234/24").unwrap();
        assert_eq!(spec.port, Some(1234));
        assert_eq!(spec.prefix_length, 24);

        let spec = parse_interface("[::1]:1234/48").unwrap();
        assert_eq!(spec.ip, IpAddr::V6(Ipv6Addr::LOCALHOST));
        assert_eq!(spec.port, Some(1234));
        assert_eq!(spec.prefix_length, 48);

        let spec = parse_interface("0.0.0.0/0").unwrap();
        assert_eq!(spec.ip, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(spec.port, None);
        assert_eq!(spec.prefix_length, 0);
    }

    #[test]
    fn test_interface_errors() {
        assert!(matches!(
            parse_interface("192.168.1.20/33"),
            Err(ResolveError::InvalidPrefixLength { max: 32, .. })
        ));
        assert!(matches!(
            parse_interface("[::1]/129"),
            Err(ResolveError::InvalidPrefixLength { max: 128, .. })
        ));
        assert!(matches!(
            parse_interface("192.168.1.20/"),
            Err(ResolveError::InvalidPrefixLength { .. })
        ));
        assert!(matches!(
            parse_interface("192.168.1.20:/24"),
            Err(ResolveError::InvalidPort { .. })
        ));
        assert!(matches!(
            parse_interface("localhost/24"),
            Err(ResolveError::InvalidAddressLiteral { .. })
        ));
        assert!(matches!(
            parse_interface("[::1]x"),
            Err(ResolveError::InvalidAddressLiteral { .. })
        ));
    }

    #[test]
    fn test_display_forms() {
        let exact = ResolvedAddress::new(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20)), 55);
        assert_eq!(exact.to_string(), "192.168.1.20:55");

        let subnet = ResolvedAddress::from_parts(
            IpAddr::V6(Ipv6Addr::LOCALHOST),
            None,
            Some("eth0".to_string()),
            2,
            48,
        );
        assert_eq!(subnet.to_string(), "[::1%eth0]/48");
        assert_eq!(
            subnet.socket_addr(),
            SocketAddr::V6(SocketAddrV6::new(Ipv6Addr::LOCALHOST, 0, 0, 2))
        );
    }

    #[test]
    fn test_from_socket_addr_keeps_scope() {
        let addr = SocketAddr::V6(SocketAddrV6::new(Ipv6Addr::LOCALHOST, 9010, 0, 3));
        let resolved = ResolvedAddress::from(addr);
        assert_eq!(resolved.scope_id(), 3);
        assert_eq!(resolved.prefix_length(), 128);
        assert_eq!(resolved.socket_addr(), addr);
        assert_eq!(resolved.zone(), Some("3"));
        assert_eq!(resolved.to_string(), "[::1%3]:9010");
    }

    #[test]
    fn test_from_socket_addr_reparses_to_same_address() {
        use std::sync::Arc;

        use crate::transport::{AddressResolver, ResolverConfig, SystemResolver};

        let resolver = AddressResolver::new(Arc::new(SystemResolver), ResolverConfig::default());
        for addr in [
            SocketAddr::V6(SocketAddrV6::new(Ipv6Addr::LOCALHOST, 9010, 0, 3)),
            SocketAddr::V6(SocketAddrV6::new(Ipv6Addr::LOCALHOST, 9010, 0, 0)),
            SocketAddr::from((Ipv4Addr::new(10, 1, 2, 3), 40123)),
        ] {
            let resolved = ResolvedAddress::from(addr);
            let reparsed = resolver
                .resolve_host_and_port(&resolved.to_string())
                .unwrap();
            assert_eq!(reparsed, resolved);
        }
    }
}
