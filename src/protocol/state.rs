//! Protocol rules layered over the codec: the client session lifecycle and
//! the leadership-term guard for consensus traffic.

use thiserror::Error;
use tracing::{debug, warn};

use super::{CloseReason, EventCode, Message, Protocol, SessionConnectRequest};

/// Lifecycle of a single client session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Connect request sent, awaiting the outcome
    Connecting,
    /// Challenge received, awaiting the client's response
    Challenged,
    /// Challenge answered, awaiting the outcome
    Authenticating,
    /// Session established
    Open,
    /// Session ended after being open
    Closed(CloseReason),
    /// Connect attempt refused
    Rejected(EventCode),
}

impl SessionState {
    /// Whether no further transitions are possible
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Closed(_) | Self::Rejected(_))
    }
}

/// Errors produced by session lifecycle transitions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Event is not valid in the current state
    #[error("{event} not valid in session state {state:?}")]
    InvalidTransition {
        /// State when the event arrived
        state: SessionState,
        /// Event that was refused
        event: String,
    },

    /// Reply does not answer this session's connect request
    #[error("correlation id {found} does not match connect request {expected}")]
    CorrelationMismatch {
        /// Correlation id of the connect request
        expected: i64,
        /// Correlation id carried by the reply
        found: i64,
    },

    /// Message addresses a different session
    #[error("cluster session id {found} does not match session {expected}")]
    SessionMismatch {
        /// Session id assigned to this session
        expected: i64,
        /// Session id carried by the message
        found: i64,
    },

    /// A second challenge arrived during one connect attempt
    #[error("session already received a challenge")]
    RepeatedChallenge,
}

/// Client session lifecycle driven by session protocol messages.
///
/// ```text
/// Connecting ──Challenge──▶ Challenged ──ChallengeResponse──▶ Authenticating
///     │                                                            │
///     └───────────────SessionEvent(OK | other code)───────────────┘
///                          │                    │
///                          ▼                    ▼
///                        Open               Rejected
///                          │
///   close request / CloseSession / SessionCloseEvent / idle timeout
///                          ▼
///                     Closed(reason)
/// ```
#[derive(Debug, Clone)]
pub struct SessionLifecycle {
    correlation_id: i64,
    cluster_session_id: Option<i64>,
    state: SessionState,
}

impl SessionLifecycle {
    /// Start tracking a session from its connect request.
    #[must_use]
    pub const fn connect(request: &SessionConnectRequest) -> Self {
        Self {
            correlation_id: request.correlation_id,
            cluster_session_id: None,
            state: SessionState::Connecting,
        }
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Correlation id of the connect request
    #[must_use]
    pub const fn correlation_id(&self) -> i64 {
        self.correlation_id
    }

    /// Session id, once the cluster has assigned one
    #[must_use]
    pub const fn cluster_session_id(&self) -> Option<i64> {
        self.cluster_session_id
    }

    /// Apply a session protocol message and return the resulting state.
    ///
    /// On error the state is left unchanged.
    pub fn on_message(&mut self, message: &Message) -> Result<SessionState, SessionError> {
        use SessionState::{Authenticating, Challenged, Connecting, Open};

        let next = match (self.state, message) {
            (Connecting, Message::Challenge(challenge)) => {
                self.check_correlation(challenge.correlation_id)?;
                self.cluster_session_id = Some(challenge.cluster_session_id);
                Challenged
            }
            (Challenged | Authenticating, Message::Challenge(_)) => {
                return Err(SessionError::RepeatedChallenge);
            }
            (Challenged, Message::ChallengeResponse(response)) => {
                self.check_correlation(response.correlation_id)?;
                self.check_session(response.cluster_session_id)?;
                Authenticating
            }
            (Connecting | Authenticating, Message::SessionEvent(event)) => {
                self.check_correlation(event.correlation_id)?;
                self.check_session(event.cluster_session_id)?;
                match event.code {
                    EventCode::Ok => {
                        self.cluster_session_id = Some(event.cluster_session_id);
                        Open
                    }
                    code => SessionState::Rejected(code),
                }
            }
            (Open, Message::SessionCloseRequest(request)) => {
                self.check_session(request.cluster_session_id)?;
                SessionState::Closed(CloseReason::ClientAction)
            }
            (Open, Message::CloseSession(close)) => {
                self.check_session(close.cluster_session_id)?;
                SessionState::Closed(CloseReason::ServiceAction)
            }
            (Open, Message::SessionCloseEvent(event)) => {
                self.check_session(event.cluster_session_id)?;
                SessionState::Closed(event.close_reason)
            }
            (
                Open,
                Message::SessionHeader(_)
                | Message::SessionKeepAliveRequest(_)
                | Message::SessionEvent(_)
                | Message::NewLeaderEvent(_),
            ) => {
                if let Some(session_id) = message.cluster_session_id() {
                    self.check_session(session_id)?;
                }
                Open
            }
            (state, message) => {
                return Err(SessionError::InvalidTransition {
                    state,
                    event: message.message_type().to_string(),
                });
            }
        };

        if next != self.state {
            debug!(
                correlation_id = self.correlation_id,
                from = ?self.state,
                to = ?next,
                "session transition"
            );
        }
        self.state = next;
        Ok(next)
    }

    /// Close an open session whose liveness timeout expired.
    pub fn on_idle_timeout(&mut self) -> Result<SessionState, SessionError> {
        if self.state != SessionState::Open {
            return Err(SessionError::InvalidTransition {
                state: self.state,
                event: "idle timeout".to_string(),
            });
        }
        self.state = SessionState::Closed(CloseReason::Timeout);
        Ok(self.state)
    }

    fn check_correlation(&self, found: i64) -> Result<(), SessionError> {
        if found == self.correlation_id {
            Ok(())
        } else {
            Err(SessionError::CorrelationMismatch {
                expected: self.correlation_id,
                found,
            })
        }
    }

    fn check_session(&self, found: i64) -> Result<(), SessionError> {
        match self.cluster_session_id {
            Some(expected) if expected != found => {
                Err(SessionError::SessionMismatch { expected, found })
            }
            _ => Ok(()),
        }
    }
}

/// Outcome of checking a message against the known leadership term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermVerdict {
    /// Message is current and may be processed
    Accept,
    /// Message names an older term and must be dropped
    Discard {
        /// Term named by the message
        message_term: i64,
        /// Highest term known locally
        known_term: i64,
    },
}

/// Tracks the highest leadership term seen and filters stale messages.
///
/// Snapshot entities are historical records and are never filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermGuard {
    known_term: i64,
}

impl TermGuard {
    /// Term id meaning "no term known yet".
    pub const NULL_TERM: i64 = -1;

    /// Create a guard starting from a known term
    #[must_use]
    pub const fn new(known_term: i64) -> Self {
        Self { known_term }
    }

    /// Highest term seen so far
    #[must_use]
    pub const fn known_term(&self) -> i64 {
        self.known_term
    }

    /// Check a message, advancing the known term if it names a newer one.
    pub fn observe(&mut self, message: &Message) -> TermVerdict {
        if message.message_type().protocol() == Protocol::Snapshot {
            return TermVerdict::Accept;
        }
        let Some(term) = message.leadership_term_id() else {
            return TermVerdict::Accept;
        };

        if term < self.known_term {
            warn!(
                message_type = %message.message_type(),
                message_term = term,
                known_term = self.known_term,
                "discarding message from stale leadership term"
            );
            return TermVerdict::Discard {
                message_term: term,
                known_term: self.known_term,
            };
        }

        if term > self.known_term {
            debug!(from = self.known_term, to = term, "leadership term advanced");
            self.known_term = term;
        }
        TermVerdict::Accept
    }
}

impl Default for TermGuard {
    fn default() -> Self {
        Self::new(Self::NULL_TERM)
    }
}
