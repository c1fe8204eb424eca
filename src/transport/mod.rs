//! Channel URIs and endpoint address resolution
//!
//! Configuration strings flow through [`ChannelUri::parse`], then the
//! [`AddressResolver`], and finally become the socket addresses of a
//! [`UdpChannel`].

mod address;
mod channel;
mod error;
mod resolver;
mod uri;

pub use address::{AddressFamily, ResolvedAddress};
pub use channel::UdpChannel;
pub use error::{ChannelError, ResolveError, UriError};
pub use resolver::{
    AddressResolver, FamilyPreference, NameResolver, ResolveHints, ResolverConfig, SystemResolver,
    hostname_resolver, reset_hostname_resolver, resolve_host_and_port, resolve_interface,
    set_hostname_resolver,
};
pub use uri::{
    ChannelUri, ENDPOINT_KEY, INTERFACE_KEY, IpcParams, MAX_URI_LENGTH, Media, TTL_KEY,
    URI_SCHEME, UdpParams, UriParam,
};
