//! Template identifiers and schema enums

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Message templates in the cluster schema, keyed by stable template id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum MessageType {
    /// Header preceding an application message on a session
    SessionHeader = 1,
    /// Outcome of a connect request or asynchronous session notification
    SessionEvent = 2,
    /// Client request to open a session
    SessionConnectRequest = 3,
    /// Client request to close its session
    SessionCloseRequest = 4,
    /// Client liveness signal
    SessionKeepAliveRequest = 5,
    /// Notification that a new leader has been elected
    NewLeaderEvent = 6,
    /// Authentication challenge sent to a connecting client
    Challenge = 7,
    /// Client answer to an authentication challenge
    ChallengeResponse = 8,
    /// Client query for current cluster membership
    MembershipQuery = 9,
    /// Answer to a membership query
    MembershipQueryResponse = 10,

    /// Timer expiry appended to the log
    TimerEvent = 20,
    /// Session opened, appended to the log
    SessionOpenEvent = 21,
    /// Session closed, appended to the log
    SessionCloseEvent = 22,
    /// Cluster-wide action appended to the log
    ClusterActionRequest = 23,

    /// Service request to schedule a timer
    ScheduleTimer = 30,
    /// Service request to cancel a timer
    CancelTimer = 31,
    /// Service acknowledgment of a cluster action
    ClusterActionAck = 32,
    /// Instruction for a service to join the replicated log
    JoinLog = 33,
    /// Service request to close a client session
    CloseSession = 34,

    /// Candidate solicits votes for a new term
    RequestVote = 50,
    /// Member answer to a vote request
    Vote = 51,
    /// Follower report of its appended log position
    AppendedPosition = 52,
    /// Leader notification of the committed log position
    CommitPosition = 53,

    /// Marks the start, sections, and end of a snapshot
    SnapshotMarker = 100,
    /// Client session state held by a service snapshot
    ClientSession = 102,
    /// Cluster session state held by the consensus snapshot
    ClusterSession = 103,
    /// Pending timer held by a snapshot
    Timer = 104,
    /// Session id sequencer held by a snapshot
    Sequencer = 105,
    /// Plan for recovering state from recordings
    RecoveryPlan = 110,
}

impl MessageType {
    /// Every template in the schema, ordered by id.
    pub const ALL: [Self; 29] = [
        Self::SessionHeader,
        Self::SessionEvent,
        Self::SessionConnectRequest,
        Self::SessionCloseRequest,
        Self::SessionKeepAliveRequest,
        Self::NewLeaderEvent,
        Self::Challenge,
        Self::ChallengeResponse,
        Self::MembershipQuery,
        Self::MembershipQueryResponse,
        Self::TimerEvent,
        Self::SessionOpenEvent,
        Self::SessionCloseEvent,
        Self::ClusterActionRequest,
        Self::ScheduleTimer,
        Self::CancelTimer,
        Self::ClusterActionAck,
        Self::JoinLog,
        Self::CloseSession,
        Self::RequestVote,
        Self::Vote,
        Self::AppendedPosition,
        Self::CommitPosition,
        Self::SnapshotMarker,
        Self::ClientSession,
        Self::ClusterSession,
        Self::Timer,
        Self::Sequencer,
        Self::RecoveryPlan,
    ];

    /// Convert from template id
    #[must_use]
    pub fn from_u16(value: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.template_id() == value)
    }

    /// Template id carried in the message header
    #[must_use]
    pub const fn template_id(self) -> u16 {
        self as u16
    }

    /// Protocol phase this template belongs to
    #[must_use]
    pub const fn protocol(self) -> Protocol {
        match self.template_id() {
            1..=19 => Protocol::Session,
            20..=29 => Protocol::ServiceLog,
            30..=49 => Protocol::ServiceControl,
            50..=99 => Protocol::Consensus,
            _ => Protocol::Snapshot,
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SessionHeader => "SessionHeader",
            Self::SessionEvent => "SessionEvent",
            Self::SessionConnectRequest => "SessionConnectRequest",
            Self::SessionCloseRequest => "SessionCloseRequest",
            Self::SessionKeepAliveRequest => "SessionKeepAliveRequest",
            Self::NewLeaderEvent => "NewLeaderEvent",
            Self::Challenge => "Challenge",
            Self::ChallengeResponse => "ChallengeResponse",
            Self::MembershipQuery => "MembershipQuery",
            Self::MembershipQueryResponse => "MembershipQueryResponse",
            Self::TimerEvent => "TimerEvent",
            Self::SessionOpenEvent => "SessionOpenEvent",
            Self::SessionCloseEvent => "SessionCloseEvent",
            Self::ClusterActionRequest => "ClusterActionRequest",
            Self::ScheduleTimer => "ScheduleTimer",
            Self::CancelTimer => "CancelTimer",
            Self::ClusterActionAck => "ClusterActionAck",
            Self::JoinLog => "JoinLog",
            Self::CloseSession => "CloseSession",
            Self::RequestVote => "RequestVote",
            Self::Vote => "Vote",
            Self::AppendedPosition => "AppendedPosition",
            Self::CommitPosition => "CommitPosition",
            Self::SnapshotMarker => "SnapshotMarker",
            Self::ClientSession => "ClientSession",
            Self::ClusterSession => "ClusterSession",
            Self::Timer => "Timer",
            Self::Sequencer => "Sequencer",
            Self::RecoveryPlan => "RecoveryPlan",
        };
        write!(f, "{name}")
    }
}

/// Protocol phase grouping of templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// Client to cluster session traffic
    Session,
    /// Events replicated in the log for services
    ServiceLog,
    /// Service to consensus module control traffic
    ServiceControl,
    /// Consensus module peer traffic
    Consensus,
    /// Persisted snapshot entities
    Snapshot,
}

/// Schema enum encoded as a little-endian `i32`.
pub(crate) trait SchemaEnum: Sized + Copy {
    /// Type name reported in decode errors.
    const NAME: &'static str;

    fn from_i32(value: i32) -> Option<Self>;

    fn as_i32(self) -> i32;
}

macro_rules! schema_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident = $value:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        #[repr(i32)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $value),+
        }

        impl $name {
            /// Convert from the encoded value
            #[must_use]
            pub const fn from_i32(value: i32) -> Option<Self> {
                match value {
                    $($value => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// Convert to the encoded value
            #[must_use]
            pub const fn as_i32(self) -> i32 {
                self as i32
            }
        }

        impl SchemaEnum for $name {
            const NAME: &'static str = stringify!($name);

            fn from_i32(value: i32) -> Option<Self> {
                Self::from_i32(value)
            }

            fn as_i32(self) -> i32 {
                self as i32
            }
        }
    };
}

schema_enum! {
    /// Outcome reported by a session event
    EventCode {
        /// Request succeeded
        Ok = 0,
        /// Request failed
        Error = 1,
        /// Member is not the leader; detail names the leader
        Redirect = 2,
        /// Credentials were rejected
        AuthenticationRejected = 3,
    }
}

schema_enum! {
    /// Reason a session was closed
    CloseReason {
        /// Client asked to close
        ClientAction = 0,
        /// Service asked to close
        ServiceAction = 1,
        /// Session went idle past its liveness timeout
        Timeout = 2,
    }
}

schema_enum! {
    /// Cluster-wide action replicated through the log
    ClusterAction {
        /// Cluster initialisation
        Init = 0,
        /// Suspend ingress processing
        Suspend = 1,
        /// Resume ingress processing
        Resume = 2,
        /// Take a snapshot
        Snapshot = 3,
        /// Snapshot then shut down
        Shutdown = 4,
        /// Shut down without a snapshot
        Abort = 5,
    }
}

schema_enum! {
    /// Position of a marker within a snapshot
    SnapshotMark {
        /// Snapshot begins
        Begin = 0,
        /// Section boundary
        Section = 1,
        /// Snapshot ends
        End = 2,
    }
}

schema_enum! {
    /// Boolean encoded as a schema enum
    BooleanType {
        /// False
        False = 0,
        /// True
        True = 1,
    }
}

impl From<bool> for BooleanType {
    fn from(value: bool) -> Self {
        if value { Self::True } else { Self::False }
    }
}

impl From<BooleanType> for bool {
    fn from(value: BooleanType) -> Self {
        matches!(value, BooleanType::True)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_type_roundtrip() {
        for msg_type in MessageType::ALL {
            let id = msg_type.template_id();
            assert_eq!(MessageType::from_u16(id), Some(msg_type));
        }
        assert_eq!(MessageType::from_u16(0), None);
        assert_eq!(MessageType::from_u16(101), None);
    }

    #[test]
    fn test_protocol_grouping() {
        assert_eq!(MessageType::Challenge.protocol(), Protocol::Session);
        assert_eq!(MessageType::TimerEvent.protocol(), Protocol::ServiceLog);
        assert_eq!(MessageType::JoinLog.protocol(), Protocol::ServiceControl);
        assert_eq!(MessageType::Vote.protocol(), Protocol::Consensus);
        assert_eq!(MessageType::RecoveryPlan.protocol(), Protocol::Snapshot);
    }

    #[test]
    fn test_enum_range() {
        assert_eq!(CloseReason::from_i32(2), Some(CloseReason::Timeout));
        assert_eq!(CloseReason::from_i32(3), None);
        assert_eq!(EventCode::from_i32(-1), None);
        assert_eq!(ClusterAction::Abort.as_i32(), 5);
        assert!(bool::from(BooleanType::from(true)));
    }
}
