use std::collections::HashMap;
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use cluster_wire::metrics_snapshot;
use cluster_wire::transport::{
    AddressFamily, AddressResolver, FamilyPreference, NameResolver, ResolveError, ResolveHints,
    ResolverConfig, UdpChannel, reset_hostname_resolver, resolve_host_and_port,
    resolve_interface, set_hostname_resolver,
};

/// Serializes tests that swap the process-wide hook.
static HOOK_LOCK: Mutex<()> = Mutex::new(());

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Lookup hook answering from a fixed table and counting calls.
#[derive(Default)]
struct TableResolver {
    hosts: HashMap<String, Vec<IpAddr>>,
    calls: AtomicUsize,
}

impl TableResolver {
    fn with_host(mut self, host: &str, addrs: &[IpAddr]) -> Self {
        self.hosts.insert(host.to_string(), addrs.to_vec());
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl NameResolver for TableResolver {
    fn resolve(&self, host: &str, _hints: &ResolveHints) -> io::Result<Vec<IpAddr>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.hosts
            .get(host)
            .cloned()
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("unknown host {host}"))
            })
    }
}

/// Installs a hook for the duration of a test and restores the default after.
struct HookGuard {
    _lock: MutexGuard<'static, ()>,
}

impl HookGuard {
    fn install(resolver: Arc<dyn NameResolver>) -> Self {
        let lock = HOOK_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        set_hostname_resolver(resolver);
        Self { _lock: lock }
    }
}

impl Drop for HookGuard {
    fn drop(&mut self) {
        reset_hostname_resolver();
    }
}

#[test]
fn ipv4_host_and_port() {
    for (input, ip, port) in [
        ("127.0.0.1:1234", Ipv4Addr::new(127, 0, 0, 1), 1234),
        ("192.168.1.20:55", Ipv4Addr::new(192, 168, 1, 20), 55),
    ] {
        let addr = resolve_host_and_port(input).expect(input);
        assert_eq!(addr.family(), AddressFamily::Ipv4);
        assert_eq!(addr.ip(), IpAddr::V4(ip));
        assert_eq!(addr.port(), Some(port));
    }
}

#[test]
fn invalid_ports() {
    for input in ["192.168.1.20:aa", "192.168.1.20", "192.168.1.20:"] {
        assert!(
            matches!(
                resolve_host_and_port(input),
                Err(ResolveError::InvalidPort { .. })
            ),
            "{input}"
        );
    }
}

#[test]
fn ipv6_host_and_port() {
    let addr = resolve_host_and_port("[::1]:1234").expect("ipv6 literal");
    assert_eq!(addr.family(), AddressFamily::Ipv6);
    assert_eq!(addr.ip(), IpAddr::V6(Ipv6Addr::LOCALHOST));
    assert_eq!(addr.port(), Some(1234));

    let addr = resolve_host_and_port("[::1%eth0]:1234").expect("zoned literal");
    assert_eq!(addr.zone(), Some("eth0"));

    let addr = resolve_host_and_port("[::1%12~_.-34]:1234").expect("opaque zone");
    assert_eq!(addr.zone(), Some("12~_.-34"));
}

#[test]
fn multicast_literals_are_plain_addresses() {
    let v4 = resolve_host_and_port("224.10.9.8:4567").expect("ipv4 multicast");
    let v6 = resolve_host_and_port("[ff02::1]:4567").expect("ipv6 multicast");
    assert!(v4.is_multicast());
    assert!(v6.is_multicast());
}

#[test]
fn interface_prefix_lengths() {
    for (input, prefix) in [
        ("192.168.1.20", 32),
        ("192.168.1.20/24", 24),
        ("0.0.0.0/0", 0),
        ("[::1]", 128),
        ("[::1]/48", 48),
    ] {
        let addr = resolve_interface(input).expect(input);
        assert_eq!(addr.prefix_length(), prefix, "{input}");
    }

    let any = resolve_interface("0.0.0.0/0").expect("wildcard");
    assert_eq!(any.ip(), IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    let with_port = resolve_interface("192.168.1.20:1234/24").expect("with port");
    assert_eq!(with_port.port(), Some(1234));
    let with_port = resolve_interface("[::1]:1234/48").expect("ipv6 with port");
    assert_eq!(with_port.port(), Some(1234));
    assert_eq!(resolve_interface("[::1]").expect("no port").port(), None);

    assert!(matches!(
        resolve_interface("192.168.1.20/33"),
        Err(ResolveError::InvalidPrefixLength { .. })
    ));
}

#[test]
fn canonical_form_re_resolves() {
    let resolver = AddressResolver::default();
    for input in ["127.0.0.1:1234", "[::1]:1234", "[fe80::1%eth0]:9010"] {
        let addr = resolver.resolve_host_and_port(input).expect(input);
        assert_eq!(
            resolver.resolve_host_and_port(&addr.to_string()),
            Ok(addr),
            "{input}"
        );
    }
    for input in ["192.168.1.20/24", "[::1]:1234/48", "0.0.0.0/0"] {
        let addr = resolver.resolve_interface(input).expect(input);
        assert_eq!(resolver.resolve_interface(&addr.to_string()), Ok(addr), "{input}");
    }
}

#[test]
fn literals_never_consult_hook() {
    init_tracing();
    let hook = Arc::new(TableResolver::default());
    let _guard = HookGuard::install(hook.clone());

    resolve_host_and_port("127.0.0.1:1234").expect("ipv4");
    resolve_host_and_port("[::1%eth0]:1234").expect("ipv6");
    resolve_interface("192.168.1.20/24").expect("interface");

    assert_eq!(hook.calls(), 0);
}

#[test]
fn hostnames_use_installed_hook() {
    init_tracing();
    let hook = Arc::new(TableResolver::default().with_host(
        "node-a.cluster",
        &[
            IpAddr::V6(Ipv6Addr::LOCALHOST),
            IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7)),
        ],
    ));
    let _guard = HookGuard::install(hook.clone());
    let before = metrics_snapshot();

    let addr = resolve_host_and_port("node-a.cluster:9010").expect("hostname");
    assert_eq!(addr.ip(), IpAddr::V6(Ipv6Addr::LOCALHOST));
    assert_eq!(addr.port(), Some(9010));

    let v4 = AddressResolver::with_config(ResolverConfig {
        family: FamilyPreference::Ipv4,
    });
    let addr = v4
        .resolve_host_and_port("node-a.cluster:9010")
        .expect("ipv4 candidate");
    assert_eq!(addr.ip(), IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7)));

    let err = resolve_host_and_port("node-b.cluster:9010").expect_err("unknown host");
    assert!(err.is_transient());

    assert_eq!(hook.calls(), 3);
    let after = metrics_snapshot();
    assert!(after.hostname_lookups >= before.hostname_lookups + 3);
    assert!(after.hostname_lookup_failures > before.hostname_lookup_failures);
}

#[test]
fn interface_rejects_hostnames() {
    let hook = Arc::new(
        TableResolver::default().with_host("localhost", &[IpAddr::V4(Ipv4Addr::LOCALHOST)]),
    );
    let _guard = HookGuard::install(hook.clone());

    assert!(matches!(
        resolve_interface("localhost/24"),
        Err(ResolveError::InvalidAddressLiteral { .. })
    ));
    assert_eq!(hook.calls(), 0);
}

#[test]
fn channel_with_hostname_endpoint() {
    let hook = Arc::new(
        TableResolver::default()
            .with_host("media.cluster", &[IpAddr::V4(Ipv4Addr::new(10, 1, 2, 3))]),
    );
    let resolver = AddressResolver::new(hook, ResolverConfig::default());

    let channel = UdpChannel::parse(
        "aeron:udp?endpoint=media.cluster:40456|interface=10.1.2.0:0/24",
        &resolver,
    )
    .expect("channel");
    assert_eq!(channel.remote_addr().to_string(), "10.1.2.3:40456");
    assert_eq!(channel.canonical_form(), "UDP-10.1.2.0:0-10.1.2.3:40456");
}

/// Lookup hook that blocks longer than callers are willing to wait.
struct SlowResolver;

impl NameResolver for SlowResolver {
    fn resolve(&self, _host: &str, _hints: &ResolveHints) -> io::Result<Vec<IpAddr>> {
        std::thread::sleep(Duration::from_millis(500));
        Ok(vec![IpAddr::V4(Ipv4Addr::LOCALHOST)])
    }
}

#[tokio::test]
async fn bounded_wait_abandons_slow_lookup() {
    let resolver = AddressResolver::new(Arc::new(SlowResolver), ResolverConfig::default());

    let slow = resolver.clone();
    let lookup = tokio::task::spawn_blocking(move || slow.resolve_host_and_port("slow-host:80"));
    let outcome = tokio::time::timeout(Duration::from_millis(50), lookup).await;
    assert!(outcome.is_err(), "lookup should exceed the wait bound");

    let fast = tokio::task::spawn_blocking(move || resolver.resolve_host_and_port("127.0.0.1:80"));
    let addr = tokio::time::timeout(Duration::from_secs(5), fast)
        .await
        .expect("literal resolves promptly")
        .expect("task completes")
        .expect("valid literal");
    assert_eq!(addr.port(), Some(80));
}
