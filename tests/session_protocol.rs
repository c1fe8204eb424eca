use bytes::BytesMut;
use cluster_wire::protocol::{
    Challenge, ChallengeResponse, CloseReason, CommitPosition, EventCode, Message, NewLeaderEvent,
    RequestVote, SessionCloseEvent, SessionConnectRequest, SessionError, SessionEvent,
    SessionKeepAliveRequest, SessionLifecycle, SessionState, TermGuard, TermVerdict, Vote,
    decode_prefix, encode_into,
};

const CORRELATION_ID: i64 = 1001;
const SESSION_ID: i64 = 77;

fn connect_request() -> SessionConnectRequest {
    SessionConnectRequest {
        correlation_id: CORRELATION_ID,
        response_stream_id: 102,
        response_channel: "aeron:udp?endpoint=localhost:9020".to_string(),
        credential_data: b"user:secret".to_vec(),
    }
}

fn session_event(code: EventCode) -> Message {
    Message::from(SessionEvent {
        cluster_session_id: SESSION_ID,
        correlation_id: CORRELATION_ID,
        leader_member_id: 1,
        code,
        detail: String::new(),
    })
}

/// Encode a sequence of messages into one buffer, as they would arrive on a stream.
fn stream(messages: &[Message]) -> BytesMut {
    let mut buf = BytesMut::new();
    for message in messages {
        encode_into(message, &mut buf).expect("encodable message");
    }
    buf
}

/// Decode every message in a buffer in order.
fn drain(mut bytes: &[u8]) -> Vec<Message> {
    let mut out = Vec::new();
    while !bytes.is_empty() {
        let (message, consumed) = decode_prefix(bytes).expect("well-formed stream");
        out.push(message);
        bytes = &bytes[consumed..];
    }
    out
}

#[test]
fn authenticated_session_over_the_wire() {
    let request = connect_request();
    let mut session = SessionLifecycle::connect(&request);

    let inbound = stream(&[
        Message::from(Challenge {
            correlation_id: CORRELATION_ID,
            cluster_session_id: SESSION_ID,
            encoded_challenge: b"nonce-1".to_vec(),
        }),
        Message::from(ChallengeResponse {
            correlation_id: CORRELATION_ID,
            cluster_session_id: SESSION_ID,
            encoded_credentials: b"signed-nonce-1".to_vec(),
        }),
        session_event(EventCode::Ok),
        Message::from(SessionKeepAliveRequest {
            correlation_id: 1002,
            cluster_session_id: SESSION_ID,
        }),
        Message::from(NewLeaderEvent {
            leadership_term_id: 4,
            cluster_session_id: SESSION_ID,
            leader_member_id: 2,
            member_endpoints: "0=node-a:9010,1=node-b:9010,2=node-c:9010".to_string(),
        }),
        Message::from(SessionCloseEvent {
            leadership_term_id: 4,
            cluster_session_id: SESSION_ID,
            timestamp: 1_700_000_000_000,
            close_reason: CloseReason::ServiceAction,
        }),
    ]);

    let states: Vec<_> = drain(&inbound)
        .iter()
        .map(|message| session.on_message(message).expect("valid transition"))
        .collect();

    assert_eq!(
        states,
        vec![
            SessionState::Challenged,
            SessionState::Authenticating,
            SessionState::Open,
            SessionState::Open,
            SessionState::Open,
            SessionState::Closed(CloseReason::ServiceAction),
        ]
    );
    assert_eq!(session.cluster_session_id(), Some(SESSION_ID));
}

#[test]
fn redirect_and_error_reject_the_connect() {
    for code in [EventCode::Redirect, EventCode::Error] {
        let mut session = SessionLifecycle::connect(&connect_request());
        let decoded = Message::decode(&session_event(code).encode().expect("encode"))
            .expect("decode");

        assert_eq!(session.on_message(&decoded), Ok(SessionState::Rejected(code)));
        assert!(session.state().is_terminal());
        assert!(session.on_message(&session_event(EventCode::Ok)).is_err());
    }
}

#[test]
fn second_challenge_is_refused() {
    let mut session = SessionLifecycle::connect(&connect_request());
    let challenge = Message::from(Challenge {
        correlation_id: CORRELATION_ID,
        cluster_session_id: SESSION_ID,
        encoded_challenge: Vec::new(),
    });

    session.on_message(&challenge).expect("first challenge");
    assert_eq!(
        session.on_message(&challenge),
        Err(SessionError::RepeatedChallenge)
    );
    assert_eq!(session.state(), SessionState::Challenged);
}

#[test]
fn messages_for_another_session_are_refused() {
    let mut session = SessionLifecycle::connect(&connect_request());
    session
        .on_message(&session_event(EventCode::Ok))
        .expect("open");

    let stray = Message::from(SessionKeepAliveRequest {
        correlation_id: 5,
        cluster_session_id: SESSION_ID + 1,
    });
    assert_eq!(
        session.on_message(&stray),
        Err(SessionError::SessionMismatch {
            expected: SESSION_ID,
            found: SESSION_ID + 1
        })
    );
    assert_eq!(session.state(), SessionState::Open);
}

#[test]
fn election_then_stale_commit_is_discarded() {
    let mut guard = TermGuard::new(3);

    let inbound = stream(&[
        Message::from(RequestVote {
            candidate_term_id: 4,
            last_base_log_position: 0,
            last_term_position: 4096,
            candidate_member_id: 2,
        }),
        Message::from(Vote {
            candidate_term_id: 4,
            last_base_log_position: 0,
            last_term_position: 4096,
            candidate_member_id: 2,
            follower_member_id: 0,
            vote: true,
        }),
        Message::from(CommitPosition {
            term_position: 2048,
            leadership_term_id: 3,
            leader_member_id: 1,
            log_session_id: 9,
        }),
        Message::from(CommitPosition {
            term_position: 8192,
            leadership_term_id: 4,
            leader_member_id: 2,
            log_session_id: 10,
        }),
    ]);

    let verdicts: Vec<_> = drain(&inbound)
        .iter()
        .map(|message| guard.observe(message))
        .collect();

    assert_eq!(
        verdicts,
        vec![
            TermVerdict::Accept,
            TermVerdict::Accept,
            TermVerdict::Discard {
                message_term: 3,
                known_term: 4
            },
            TermVerdict::Accept,
        ]
    );
    assert_eq!(guard.known_term(), 4);
}
