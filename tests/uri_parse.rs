use cluster_wire::transport::{ChannelUri, Media, UdpParams, UriError, UriParam};

fn udp(input: &str) -> UdpParams {
    match ChannelUri::parse(input) {
        Ok(ChannelUri::Udp(params)) => params,
        other => panic!("{input}: expected udp channel, got {other:?}"),
    }
}

#[test]
fn ipc_forms() {
    for input in ["aeron:ipc", "aeron:ipc?"] {
        let uri = ChannelUri::parse(input).expect("ipc uri");
        assert_eq!(uri.media(), Media::Ipc);
        assert!(uri.additional_params().is_empty());
    }
}

#[test]
fn rejects_unknown_schemes_and_transports() {
    for input in [
        "aaron",
        "aeron:",
        ":aeron",
        "aeron:tcp",
        "aeron:sctp",
        "aeron:udp",
        "",
    ] {
        assert!(ChannelUri::parse(input).is_err(), "{input} should fail");
    }

    assert!(matches!(
        ChannelUri::parse("aaron"),
        Err(UriError::InvalidScheme { .. })
    ));
    assert!(matches!(
        ChannelUri::parse("aeron:sctp"),
        Err(UriError::UnknownTransport { .. })
    ));
}

#[test]
fn empty_udp_params() {
    let params = udp("aeron:udp?");
    assert_eq!(params, UdpParams::default());
}

#[test]
fn well_known_and_additional_params() {
    let params = udp("aeron:udp?endpoint=224.10.9.8|port=4567|interface=192.168.0.3|ttl=16");

    assert_eq!(params.endpoint.as_deref(), Some("224.10.9.8"));
    assert_eq!(params.interface.as_deref(), Some("192.168.0.3"));
    assert_eq!(params.ttl.as_deref(), Some("16"));
    assert_eq!(params.additional, vec![UriParam::new("port", "4567")]);
}

#[test]
fn value_may_contain_equals() {
    let params = udp("aeron:udp?endpoint=224.1=0.9.8");
    assert_eq!(params.endpoint.as_deref(), Some("224.1=0.9.8"));
}

#[test]
fn key_may_contain_pipe() {
    let params = udp("aeron:udp?add|ress=224.10.9.8");

    assert_eq!(params.endpoint, None);
    assert_eq!(params.additional, vec![UriParam::new("add|ress", "224.10.9.8")]);
}

#[test]
fn canonical_form_reparses() {
    for input in [
        "aeron:ipc",
        "aeron:ipc?term-length=65536|alias=orders",
        "aeron:udp?",
        "aeron:udp?ttl=16|port=4567|interface=192.168.0.3|endpoint=224.10.9.8",
        "aeron:udp?add|ress=224.10.9.8|tag=1|tag=2",
    ] {
        let uri = ChannelUri::parse(input).expect("valid uri");
        let canonical = uri.to_string();
        assert_eq!(ChannelUri::parse(&canonical).expect("canonical uri"), uri, "{input}");
    }
}
