//! Address resolution with a pluggable hostname lookup.
//!
//! Literal addresses are parsed directly and never reach the lookup hook.
//! Hostnames go through a [`NameResolver`], either one held explicitly by an
//! [`AddressResolver`] or the process-wide default installed with
//! [`set_hostname_resolver`].

use core::fmt;
use std::io;
use std::net::{IpAddr, ToSocketAddrs};
use std::sync::{Arc, PoisonError, RwLock};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::address::{Host, parse_host_and_port, parse_interface};
use super::{AddressFamily, ResolveError, ResolvedAddress};
use crate::metrics::Metrics;

/// Which address families a hostname lookup may return
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FamilyPreference {
    /// First candidate of either family
    #[default]
    Any,
    /// IPv4 candidates only
    Ipv4,
    /// IPv6 candidates only
    Ipv6,
}

impl FamilyPreference {
    /// Whether a candidate address is usable under this preference
    #[must_use]
    pub const fn accepts(self, ip: &IpAddr) -> bool {
        match self {
            Self::Any => true,
            Self::Ipv4 => ip.is_ipv4(),
            Self::Ipv6 => ip.is_ipv6(),
        }
    }
}

/// Configuration for address resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResolverConfig {
    /// Families acceptable for hostname candidates.
    pub family: FamilyPreference,
}

/// Hints passed to the lookup hook alongside the hostname
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveHints {
    /// Families the caller can use
    pub family: FamilyPreference,
    /// Port that will be paired with the result
    pub port: u16,
}

/// Hostname lookup hook.
///
/// Implementations may block. Callers that cannot block should run
/// resolution on a worker and bound the wait themselves.
pub trait NameResolver: Send + Sync {
    /// Candidate addresses for `host`, in preference order.
    fn resolve(&self, host: &str, hints: &ResolveHints) -> io::Result<Vec<IpAddr>>;

    /// Numeric scope id for an IPv6 zone, if the zone is known.
    fn scope_id(&self, zone: &str) -> Option<u32> {
        zone.parse().ok()
    }
}

/// Lookup hook backed by the platform resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl NameResolver for SystemResolver {
    fn resolve(&self, host: &str, hints: &ResolveHints) -> io::Result<Vec<IpAddr>> {
        Ok((host, hints.port)
            .to_socket_addrs()?
            .map(|addr| addr.ip())
            .collect())
    }

    fn scope_id(&self, zone: &str) -> Option<u32> {
        zone.parse().ok().or_else(|| interface_index(zone))
    }
}

#[cfg(unix)]
fn interface_index(name: &str) -> Option<u32> {
    nix::net::if_::if_nametoindex(name)
        .ok()
        .filter(|&index| index != 0)
}

#[cfg(not(unix))]
fn interface_index(_name: &str) -> Option<u32> {
    None
}

static HOSTNAME_RESOLVER: RwLock<Option<Arc<dyn NameResolver>>> = RwLock::new(None);

/// Install a process-wide lookup hook, returning the previous override.
///
/// Intended for single-threaded setup and tests; resolvers already built
/// keep the hook they captured.
pub fn set_hostname_resolver(resolver: Arc<dyn NameResolver>) -> Option<Arc<dyn NameResolver>> {
    debug!("installing hostname resolver override");
    HOSTNAME_RESOLVER
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .replace(resolver)
}

/// Restore the platform resolver as the process-wide hook.
pub fn reset_hostname_resolver() {
    debug!("restoring system hostname resolver");
    HOSTNAME_RESOLVER
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
}

/// Current process-wide lookup hook.
#[must_use]
pub fn hostname_resolver() -> Arc<dyn NameResolver> {
    HOSTNAME_RESOLVER
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
        .unwrap_or_else(|| Arc::new(SystemResolver))
}

/// Resolves host, port and interface strings to concrete addresses.
#[derive(Clone)]
pub struct AddressResolver {
    resolver: Arc<dyn NameResolver>,
    config: ResolverConfig,
}

impl AddressResolver {
    /// Create a resolver with an explicit lookup hook.
    #[must_use]
    pub fn new(resolver: Arc<dyn NameResolver>, config: ResolverConfig) -> Self {
        Self { resolver, config }
    }

    /// Create a resolver using the current process-wide hook.
    #[must_use]
    pub fn with_config(config: ResolverConfig) -> Self {
        Self::new(hostname_resolver(), config)
    }

    /// Configuration in use
    #[must_use]
    pub const fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve `host:port` or `[ipv6[%zone]]:port`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cluster_wire::transport::AddressResolver;
    ///
    /// let addr = AddressResolver::default().resolve_host_and_port("[::1]:1234")?;
    /// assert!(addr.ip().is_loopback());
    /// assert_eq!(addr.port(), Some(1234));
    /// # Ok::<(), cluster_wire::transport::ResolveError>(())
    /// ```
    #[instrument(level = "debug", skip(self))]
    pub fn resolve_host_and_port(&self, input: &str) -> Result<ResolvedAddress, ResolveError> {
        let parsed = parse_host_and_port(input)?;
        match parsed.host {
            Host::Literal { ip, zone } => Ok(self.literal(ip, Some(parsed.port), zone, None)),
            Host::Name(host) => {
                let ip = self.lookup(host, parsed.port)?;
                Ok(ResolvedAddress::new(ip, parsed.port))
            }
        }
    }

    /// Resolve an interface `literal[:port][/prefixLength]`.
    ///
    /// Hostnames are rejected; an interface names a local binding.
    #[instrument(level = "debug", skip(self))]
    pub fn resolve_interface(&self, input: &str) -> Result<ResolvedAddress, ResolveError> {
        let spec = parse_interface(input)?;
        Ok(self.literal(spec.ip, spec.port, spec.zone, Some(spec.prefix_length)))
    }

    fn literal(
        &self,
        ip: IpAddr,
        port: Option<u16>,
        zone: Option<&str>,
        prefix_length: Option<u8>,
    ) -> ResolvedAddress {
        let scope_id = zone
            .and_then(|zone| self.resolver.scope_id(zone))
            .unwrap_or(0);
        let prefix_length = prefix_length.unwrap_or_else(|| AddressFamily::of(&ip).width());
        ResolvedAddress::from_parts(ip, port, zone.map(str::to_string), scope_id, prefix_length)
    }

    fn lookup(&self, host: &str, port: u16) -> Result<IpAddr, ResolveError> {
        let hints = ResolveHints {
            family: self.config.family,
            port,
        };
        let chosen = match self.resolver.resolve(host, &hints) {
            Ok(candidates) => candidates
                .into_iter()
                .find(|ip| hints.family.accepts(ip))
                .ok_or_else(|| "no candidate matches the family preference".to_string()),
            Err(err) => Err(err.to_string()),
        };

        Metrics::record_hostname_lookup(chosen.is_ok());
        debug!(host, port, result = ?chosen, "hostname lookup");
        chosen.map_err(|reason| ResolveError::HostResolutionFailed {
            host: host.to_string(),
            reason,
        })
    }
}

impl Default for AddressResolver {
    fn default() -> Self {
        Self::with_config(ResolverConfig::default())
    }
}

impl fmt::Debug for AddressResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddressResolver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Resolve `host:port` with the process-wide hook and default configuration.
pub fn resolve_host_and_port(input: &str) -> Result<ResolvedAddress, ResolveError> {
    AddressResolver::default().resolve_host_and_port(input)
}

/// Resolve an interface string with the process-wide hook.
pub fn resolve_interface(input: &str) -> Result<ResolvedAddress, ResolveError> {
    AddressResolver::default().resolve_interface(input)
}
