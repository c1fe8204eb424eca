//! UDP channel resolution: from a parsed URI to bind and connect addresses.

use core::fmt;
use std::net::SocketAddr;

use tracing::debug;

use super::{AddressResolver, ChannelError, ChannelUri, ResolvedAddress};

/// UDP channel with its endpoint and interface resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UdpChannel {
    uri: ChannelUri,
    remote_data: ResolvedAddress,
    local_data: ResolvedAddress,
    ttl: Option<u8>,
}

impl UdpChannel {
    /// Parse a channel URI and resolve it.
    pub fn parse(uri: &str, resolver: &AddressResolver) -> Result<Self, ChannelError> {
        Self::resolve(&ChannelUri::parse(uri)?, resolver)
    }

    /// Resolve the `endpoint`, `interface` and `ttl` of a UDP channel.
    ///
    /// Without an `interface` the channel binds the wildcard address of the
    /// endpoint's family.
    pub fn resolve(uri: &ChannelUri, resolver: &AddressResolver) -> Result<Self, ChannelError> {
        let params = uri.as_udp().ok_or(ChannelError::NotUdp)?;
        let endpoint = params
            .endpoint
            .as_deref()
            .ok_or(ChannelError::MissingEndpoint)?;
        let remote_data = resolver.resolve_host_and_port(endpoint)?;

        let family = remote_data.family();
        let local_data = match params.interface.as_deref() {
            Some(interface) => resolver.resolve_interface(interface)?,
            None => ResolvedAddress::from_parts(family.unspecified(), None, None, 0, 0),
        };
        if local_data.family() != family {
            return Err(ChannelError::AddressFamilyMismatch {
                endpoint: family.as_str(),
                interface: local_data.family().as_str(),
            });
        }

        let ttl = params
            .ttl
            .as_deref()
            .map(|value| {
                value.parse::<u8>().map_err(|_| ChannelError::InvalidTtl {
                    value: value.to_string(),
                })
            })
            .transpose()?;

        let channel = Self {
            uri: uri.clone(),
            remote_data,
            local_data,
            ttl,
        };
        debug!(channel = %channel, multicast = channel.is_multicast(), "resolved udp channel");
        Ok(channel)
    }

    /// URI the channel was resolved from
    #[must_use]
    pub const fn uri(&self) -> &ChannelUri {
        &self.uri
    }

    /// Resolved `endpoint`
    #[must_use]
    pub const fn remote_data(&self) -> &ResolvedAddress {
        &self.remote_data
    }

    /// Resolved `interface`, or the wildcard address
    #[must_use]
    pub const fn local_data(&self) -> &ResolvedAddress {
        &self.local_data
    }

    /// Address to send to
    #[must_use]
    pub const fn remote_addr(&self) -> SocketAddr {
        self.remote_data.socket_addr()
    }

    /// Address to bind
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_data.socket_addr()
    }

    /// Multicast time-to-live
    #[must_use]
    pub const fn ttl(&self) -> Option<u8> {
        self.ttl
    }

    /// Whether the endpoint is a multicast group
    #[must_use]
    pub const fn is_multicast(&self) -> bool {
        self.remote_data.is_multicast()
    }

    /// Stable identity of the channel: `UDP-<local>-<remote>`.
    #[must_use]
    pub fn canonical_form(&self) -> String {
        format!("UDP-{}-{}", self.local_addr(), self.remote_addr())
    }
}

impl fmt::Display for UdpChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_form())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{NameResolver, ResolveHints, ResolverConfig, UriError};
    use std::io;
    use std::net::IpAddr;
    use std::sync::Arc;

    struct NoLookups;

    impl NameResolver for NoLookups {
        fn resolve(&self, host: &str, _hints: &ResolveHints) -> io::Result<Vec<IpAddr>> {
            Err(io::Error::new(io::ErrorKind::NotFound, host.to_string()))
        }
    }

    fn resolver() -> AddressResolver {
        AddressResolver::new(Arc::new(NoLookups), ResolverConfig::default())
    }

    #[test]
    fn test_multicast_with_interface() {
        let channel = UdpChannel::parse(
            "aeron:udp?endpoint=224.10.9.8:4567|interface=192.168.0.3/24|ttl=16",
            &resolver(),
        )
        .unwrap();

        assert!(channel.is_multicast());
        assert_eq!(channel.ttl(), Some(16));
        assert_eq!(channel.local_data().prefix_length(), 24);
        assert_eq!(channel.canonical_form(), "UDP-192.168.0.3:0-224.10.9.8:4567");
    }

    #[test]
    fn test_unicast_defaults_to_wildcard() {
        let channel = UdpChannel::parse("aeron:udp?endpoint=[::1]:40123", &resolver()).unwrap();

        assert!(!channel.is_multicast());
        assert!(channel.local_addr().ip().is_unspecified());
        assert_eq!(channel.local_data().prefix_length(), 0);
        assert_eq!(channel.to_string(), "UDP-[::]:0-[::1]:40123");
    }

    #[test]
    fn test_channel_errors() {
        let resolver = resolver();
        assert_eq!(
            UdpChannel::parse("aeron:ipc", &resolver),
            Err(ChannelError::NotUdp)
        );
        assert_eq!(
            UdpChannel::parse("aeron:udp?interface=0.0.0.0", &resolver),
            Err(ChannelError::MissingEndpoint)
        );
        assert_eq!(
            UdpChannel::parse("aeron:udp?endpoint=127.0.0.1:1|ttl=300", &resolver),
            Err(ChannelError::InvalidTtl {
                value: "300".to_string()
            })
        );
        assert_eq!(
            UdpChannel::parse("aeron:udp?endpoint=127.0.0.1:1|interface=[::1]", &resolver),
            Err(ChannelError::AddressFamilyMismatch {
                endpoint: "IPv4",
                interface: "IPv6"
            })
        );
        assert!(matches!(
            UdpChannel::parse("aeron:tcp?endpoint=x", &resolver),
            Err(ChannelError::Uri(UriError::UnknownTransport { .. }))
        ));
        assert!(matches!(
            UdpChannel::parse("aeron:udp?endpoint=unknown-host:1", &resolver),
            Err(ChannelError::Resolve(err)) if err.is_transient()
        ));
    }
}
