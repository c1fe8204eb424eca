//! Message catalog: one tagged variant per template

use bytes::BufMut;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::cursor::Reader;
use super::{
    AppendedPosition, CancelTimer, Challenge, ChallengeResponse, ClientSession, CloseSession,
    ClusterActionAck, ClusterActionRequest, ClusterSession, CommitPosition, JoinLog,
    MembershipQuery, MembershipQueryResponse, MessageType, NewLeaderEvent, RecoveryPlan,
    RequestVote, Result, ScheduleTimer, Sequencer, SessionCloseEvent, SessionCloseRequest,
    SessionConnectRequest, SessionEvent, SessionHeader, SessionKeepAliveRequest,
    SessionOpenEvent, SnapshotMarker, Timer, TimerEvent, Vote,
};

/// Static layout of a message template.
pub trait Template {
    /// Template this type encodes.
    const MESSAGE_TYPE: MessageType;
    /// Size of the fixed block this codec writes.
    const BLOCK_LENGTH: u16;
}

/// Body encoding shared by all templates: fixed block, groups, then var data.
pub(crate) trait BodyCodec: Template + Sized {
    /// Encoded length of everything after the message header.
    fn body_length(&self) -> usize {
        usize::from(Self::BLOCK_LENGTH)
    }

    fn encode_body<B: BufMut>(&self, buf: &mut B) -> Result<()>;

    /// Decode with the cursor positioned just after the message header.
    fn decode_body(reader: &mut Reader<'_>, block_length: u16) -> Result<Self>;
}

macro_rules! message_catalog {
    ($($variant:ident),+ $(,)?) => {
        /// Any message in the cluster schema
        #[derive(Debug, Clone, PartialEq, Eq)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub enum Message {
            $(
                #[allow(missing_docs)]
                $variant($variant),
            )+
        }

        $(
            impl From<$variant> for Message {
                fn from(message: $variant) -> Self {
                    Self::$variant(message)
                }
            }
        )+

        impl Message {
            /// Get message type
            #[must_use]
            pub const fn message_type(&self) -> MessageType {
                match self {
                    $(Self::$variant(_) => <$variant as Template>::MESSAGE_TYPE,)+
                }
            }

            /// Fixed block length written for this message
            #[must_use]
            pub const fn block_length(&self) -> u16 {
                match self {
                    $(Self::$variant(_) => <$variant as Template>::BLOCK_LENGTH,)+
                }
            }

            pub(crate) fn body_length(&self) -> usize {
                match self {
                    $(Self::$variant(m) => m.body_length(),)+
                }
            }

            pub(crate) fn encode_body<B: BufMut>(&self, buf: &mut B) -> Result<()> {
                match self {
                    $(Self::$variant(m) => m.encode_body(buf),)+
                }
            }

            pub(crate) fn decode_body(
                msg_type: MessageType,
                reader: &mut Reader<'_>,
                block_length: u16,
            ) -> Result<Self> {
                match msg_type {
                    $(MessageType::$variant => {
                        $variant::decode_body(reader, block_length).map(Self::$variant)
                    })+
                }
            }
        }
    };
}

message_catalog!(
    SessionHeader,
    SessionEvent,
    SessionConnectRequest,
    SessionCloseRequest,
    SessionKeepAliveRequest,
    NewLeaderEvent,
    Challenge,
    ChallengeResponse,
    MembershipQuery,
    MembershipQueryResponse,
    TimerEvent,
    SessionOpenEvent,
    SessionCloseEvent,
    ClusterActionRequest,
    ScheduleTimer,
    CancelTimer,
    ClusterActionAck,
    JoinLog,
    CloseSession,
    RequestVote,
    Vote,
    AppendedPosition,
    CommitPosition,
    SnapshotMarker,
    ClientSession,
    ClusterSession,
    Timer,
    Sequencer,
    RecoveryPlan,
);

impl Message {
    /// Correlation id used to match a reply to its request, if the template carries one.
    #[must_use]
    pub const fn correlation_id(&self) -> Option<i64> {
        match self {
            Self::SessionHeader(m) => Some(m.correlation_id),
            Self::SessionEvent(m) => Some(m.correlation_id),
            Self::SessionConnectRequest(m) => Some(m.correlation_id),
            Self::SessionKeepAliveRequest(m) => Some(m.correlation_id),
            Self::Challenge(m) => Some(m.correlation_id),
            Self::ChallengeResponse(m) => Some(m.correlation_id),
            Self::MembershipQuery(m) => Some(m.correlation_id),
            Self::MembershipQueryResponse(m) => Some(m.correlation_id),
            Self::TimerEvent(m) => Some(m.correlation_id),
            Self::SessionOpenEvent(m) => Some(m.correlation_id),
            Self::ScheduleTimer(m) => Some(m.correlation_id),
            Self::CancelTimer(m) => Some(m.correlation_id),
            Self::Timer(m) => Some(m.correlation_id),
            Self::ClusterSession(m) => Some(m.last_correlation_id),
            _ => None,
        }
    }

    /// Leadership term named by the message, if any.
    #[must_use]
    pub const fn leadership_term_id(&self) -> Option<i64> {
        match self {
            Self::NewLeaderEvent(m) => Some(m.leadership_term_id),
            Self::SessionOpenEvent(m) => Some(m.leadership_term_id),
            Self::SessionCloseEvent(m) => Some(m.leadership_term_id),
            Self::ClusterActionRequest(m) => Some(m.leadership_term_id),
            Self::ClusterActionAck(m) => Some(m.leadership_term_id),
            Self::JoinLog(m) => Some(m.leadership_term_id),
            Self::RequestVote(m) => Some(m.candidate_term_id),
            Self::Vote(m) => Some(m.candidate_term_id),
            Self::AppendedPosition(m) => Some(m.leadership_term_id),
            Self::CommitPosition(m) => Some(m.leadership_term_id),
            Self::SnapshotMarker(m) => Some(m.leadership_term_id),
            Self::RecoveryPlan(m) => Some(m.last_leadership_term_id),
            _ => None,
        }
    }

    /// Cluster session the message refers to, if any.
    #[must_use]
    pub const fn cluster_session_id(&self) -> Option<i64> {
        match self {
            Self::SessionHeader(m) => Some(m.cluster_session_id),
            Self::SessionEvent(m) => Some(m.cluster_session_id),
            Self::SessionCloseRequest(m) => Some(m.cluster_session_id),
            Self::SessionKeepAliveRequest(m) => Some(m.cluster_session_id),
            Self::NewLeaderEvent(m) => Some(m.cluster_session_id),
            Self::Challenge(m) => Some(m.cluster_session_id),
            Self::ChallengeResponse(m) => Some(m.cluster_session_id),
            Self::MembershipQuery(m) => Some(m.cluster_session_id),
            Self::SessionOpenEvent(m) => Some(m.cluster_session_id),
            Self::SessionCloseEvent(m) => Some(m.cluster_session_id),
            Self::CloseSession(m) => Some(m.cluster_session_id),
            Self::ClientSession(m) => Some(m.cluster_session_id),
            Self::ClusterSession(m) => Some(m.cluster_session_id),
            _ => None,
        }
    }

    /// Encode message to bytes
    pub fn encode(&self) -> Result<bytes::Bytes> {
        super::encode(self)
    }

    /// Decode message from bytes
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        super::decode(bytes)
    }
}
