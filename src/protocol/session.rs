//! Session protocol: traffic between cluster clients and the consensus module.

use bytes::BufMut;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::cursor::{Reader, put_enum, put_var_ascii, put_var_data, var_data_length};
use super::message::BodyCodec;
use super::{EventCode, MessageType, Result, Template};

/// Header preceding an application message sent on an open session
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SessionHeader {
    /// Correlation id assigned by the client
    pub correlation_id: i64,
    /// Session the message belongs to
    pub cluster_session_id: i64,
    /// Cluster time at which the message was appended
    pub timestamp: i64,
}

impl Template for SessionHeader {
    const MESSAGE_TYPE: MessageType = MessageType::SessionHeader;
    const BLOCK_LENGTH: u16 = 24;
}

impl BodyCodec for SessionHeader {
    fn encode_body<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        buf.put_i64_le(self.correlation_id);
        buf.put_i64_le(self.cluster_session_id);
        buf.put_i64_le(self.timestamp);
        Ok(())
    }

    fn decode_body(reader: &mut Reader<'_>, block_length: u16) -> Result<Self> {
        let mut block = reader.block(block_length, Self::BLOCK_LENGTH)?;
        Ok(Self {
            correlation_id: block.get_i64()?,
            cluster_session_id: block.get_i64()?,
            timestamp: block.get_i64()?,
        })
    }
}

/// Outcome of a connect request, or an asynchronous session notification
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SessionEvent {
    /// Session the event concerns
    pub cluster_session_id: i64,
    /// Correlation id of the request being answered
    pub correlation_id: i64,
    /// Current leader, meaningful for redirects
    pub leader_member_id: i32,
    /// Outcome code
    pub code: EventCode,
    /// Human-readable detail
    pub detail: String,
}

impl Template for SessionEvent {
    const MESSAGE_TYPE: MessageType = MessageType::SessionEvent;
    const BLOCK_LENGTH: u16 = 24;
}

impl BodyCodec for SessionEvent {
    fn body_length(&self) -> usize {
        usize::from(Self::BLOCK_LENGTH) + var_data_length(self.detail.len())
    }

    fn encode_body<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        buf.put_i64_le(self.cluster_session_id);
        buf.put_i64_le(self.correlation_id);
        buf.put_i32_le(self.leader_member_id);
        put_enum(buf, self.code);
        put_var_ascii(buf, "detail", &self.detail)
    }

    fn decode_body(reader: &mut Reader<'_>, block_length: u16) -> Result<Self> {
        let mut block = reader.block(block_length, Self::BLOCK_LENGTH)?;
        Ok(Self {
            cluster_session_id: block.get_i64()?,
            correlation_id: block.get_i64()?,
            leader_member_id: block.get_i32()?,
            code: block.get_enum()?,
            detail: reader.get_var_ascii("detail")?,
        })
    }
}

/// Client request to open a session
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SessionConnectRequest {
    /// Correlation id echoed by the resulting session event
    pub correlation_id: i64,
    /// Stream id on which the client expects responses
    pub response_stream_id: i32,
    /// Channel URI on which the client expects responses
    pub response_channel: String,
    /// Opaque credentials for the authenticator
    pub credential_data: Vec<u8>,
}

impl Template for SessionConnectRequest {
    const MESSAGE_TYPE: MessageType = MessageType::SessionConnectRequest;
    const BLOCK_LENGTH: u16 = 12;
}

impl BodyCodec for SessionConnectRequest {
    fn body_length(&self) -> usize {
        usize::from(Self::BLOCK_LENGTH)
            + var_data_length(self.response_channel.len())
            + var_data_length(self.credential_data.len())
    }

    fn encode_body<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        buf.put_i64_le(self.correlation_id);
        buf.put_i32_le(self.response_stream_id);
        put_var_ascii(buf, "responseChannel", &self.response_channel)?;
        put_var_data(buf, "credentialData", &self.credential_data)
    }

    fn decode_body(reader: &mut Reader<'_>, block_length: u16) -> Result<Self> {
        let mut block = reader.block(block_length, Self::BLOCK_LENGTH)?;
        Ok(Self {
            correlation_id: block.get_i64()?,
            response_stream_id: block.get_i32()?,
            response_channel: reader.get_var_ascii("responseChannel")?,
            credential_data: reader.get_var_data("credentialData")?,
        })
    }
}

/// Client request to close its session
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SessionCloseRequest {
    /// Session to close
    pub cluster_session_id: i64,
}

impl Template for SessionCloseRequest {
    const MESSAGE_TYPE: MessageType = MessageType::SessionCloseRequest;
    const BLOCK_LENGTH: u16 = 8;
}

impl BodyCodec for SessionCloseRequest {
    fn encode_body<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        buf.put_i64_le(self.cluster_session_id);
        Ok(())
    }

    fn decode_body(reader: &mut Reader<'_>, block_length: u16) -> Result<Self> {
        let mut block = reader.block(block_length, Self::BLOCK_LENGTH)?;
        Ok(Self {
            cluster_session_id: block.get_i64()?,
        })
    }
}

/// Client liveness signal
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SessionKeepAliveRequest {
    /// Correlation id assigned by the client
    pub correlation_id: i64,
    /// Session being kept alive
    pub cluster_session_id: i64,
}

impl Template for SessionKeepAliveRequest {
    const MESSAGE_TYPE: MessageType = MessageType::SessionKeepAliveRequest;
    const BLOCK_LENGTH: u16 = 16;
}

impl BodyCodec for SessionKeepAliveRequest {
    fn encode_body<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        buf.put_i64_le(self.correlation_id);
        buf.put_i64_le(self.cluster_session_id);
        Ok(())
    }

    fn decode_body(reader: &mut Reader<'_>, block_length: u16) -> Result<Self> {
        let mut block = reader.block(block_length, Self::BLOCK_LENGTH)?;
        Ok(Self {
            correlation_id: block.get_i64()?,
            cluster_session_id: block.get_i64()?,
        })
    }
}

/// Notification that a new leader has been elected
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NewLeaderEvent {
    /// Term in which the new leader leads
    pub leadership_term_id: i64,
    /// Session being notified
    pub cluster_session_id: i64,
    /// Member id of the new leader
    pub leader_member_id: i32,
    /// Client-facing endpoints of the members
    pub member_endpoints: String,
}

impl Template for NewLeaderEvent {
    const MESSAGE_TYPE: MessageType = MessageType::NewLeaderEvent;
    const BLOCK_LENGTH: u16 = 20;
}

impl BodyCodec for NewLeaderEvent {
    fn body_length(&self) -> usize {
        usize::from(Self::BLOCK_LENGTH) + var_data_length(self.member_endpoints.len())
    }

    fn encode_body<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        buf.put_i64_le(self.leadership_term_id);
        buf.put_i64_le(self.cluster_session_id);
        buf.put_i32_le(self.leader_member_id);
        put_var_ascii(buf, "memberEndpoints", &self.member_endpoints)
    }

    fn decode_body(reader: &mut Reader<'_>, block_length: u16) -> Result<Self> {
        let mut block = reader.block(block_length, Self::BLOCK_LENGTH)?;
        Ok(Self {
            leadership_term_id: block.get_i64()?,
            cluster_session_id: block.get_i64()?,
            leader_member_id: block.get_i32()?,
            member_endpoints: reader.get_var_ascii("memberEndpoints")?,
        })
    }
}

/// Authentication challenge sent to a connecting client
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Challenge {
    /// Correlation id of the connect request
    pub correlation_id: i64,
    /// Session being authenticated
    pub cluster_session_id: i64,
    /// Opaque challenge for the client
    pub encoded_challenge: Vec<u8>,
}

impl Template for Challenge {
    const MESSAGE_TYPE: MessageType = MessageType::Challenge;
    const BLOCK_LENGTH: u16 = 16;
}

impl BodyCodec for Challenge {
    fn body_length(&self) -> usize {
        usize::from(Self::BLOCK_LENGTH) + var_data_length(self.encoded_challenge.len())
    }

    fn encode_body<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        buf.put_i64_le(self.correlation_id);
        buf.put_i64_le(self.cluster_session_id);
        put_var_data(buf, "encodedChallenge", &self.encoded_challenge)
    }

    fn decode_body(reader: &mut Reader<'_>, block_length: u16) -> Result<Self> {
        let mut block = reader.block(block_length, Self::BLOCK_LENGTH)?;
        Ok(Self {
            correlation_id: block.get_i64()?,
            cluster_session_id: block.get_i64()?,
            encoded_challenge: reader.get_var_data("encodedChallenge")?,
        })
    }
}

/// Client answer to an authentication challenge
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChallengeResponse {
    /// Correlation id of the connect request
    pub correlation_id: i64,
    /// Session being authenticated
    pub cluster_session_id: i64,
    /// Opaque credentials answering the challenge
    pub encoded_credentials: Vec<u8>,
}

impl Template for ChallengeResponse {
    const MESSAGE_TYPE: MessageType = MessageType::ChallengeResponse;
    const BLOCK_LENGTH: u16 = 16;
}

impl BodyCodec for ChallengeResponse {
    fn body_length(&self) -> usize {
        usize::from(Self::BLOCK_LENGTH) + var_data_length(self.encoded_credentials.len())
    }

    fn encode_body<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        buf.put_i64_le(self.correlation_id);
        buf.put_i64_le(self.cluster_session_id);
        put_var_data(buf, "encodedCredentials", &self.encoded_credentials)
    }

    fn decode_body(reader: &mut Reader<'_>, block_length: u16) -> Result<Self> {
        let mut block = reader.block(block_length, Self::BLOCK_LENGTH)?;
        Ok(Self {
            correlation_id: block.get_i64()?,
            cluster_session_id: block.get_i64()?,
            encoded_credentials: reader.get_var_data("encodedCredentials")?,
        })
    }
}

/// Client query for current cluster membership
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MembershipQuery {
    /// Correlation id echoed by the response
    pub correlation_id: i64,
    /// Session issuing the query
    pub cluster_session_id: i64,
}

impl Template for MembershipQuery {
    const MESSAGE_TYPE: MessageType = MessageType::MembershipQuery;
    const BLOCK_LENGTH: u16 = 16;
}

impl BodyCodec for MembershipQuery {
    fn encode_body<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        buf.put_i64_le(self.correlation_id);
        buf.put_i64_le(self.cluster_session_id);
        Ok(())
    }

    fn decode_body(reader: &mut Reader<'_>, block_length: u16) -> Result<Self> {
        let mut block = reader.block(block_length, Self::BLOCK_LENGTH)?;
        Ok(Self {
            correlation_id: block.get_i64()?,
            cluster_session_id: block.get_i64()?,
        })
    }
}

/// Answer to a membership query
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MembershipQueryResponse {
    /// Correlation id of the query
    pub correlation_id: i64,
    /// Current leader
    pub leader_member_id: i32,
    /// Voting members
    pub active_members: String,
    /// Members catching up, not yet voting
    pub passive_members: String,
}

impl Template for MembershipQueryResponse {
    const MESSAGE_TYPE: MessageType = MessageType::MembershipQueryResponse;
    const BLOCK_LENGTH: u16 = 12;
}

impl BodyCodec for MembershipQueryResponse {
    fn body_length(&self) -> usize {
        usize::from(Self::BLOCK_LENGTH)
            + var_data_length(self.active_members.len())
            + var_data_length(self.passive_members.len())
    }

    fn encode_body<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        buf.put_i64_le(self.correlation_id);
        buf.put_i32_le(self.leader_member_id);
        put_var_ascii(buf, "activeMembers", &self.active_members)?;
        put_var_ascii(buf, "passiveMembers", &self.passive_members)
    }

    fn decode_body(reader: &mut Reader<'_>, block_length: u16) -> Result<Self> {
        let mut block = reader.block(block_length, Self::BLOCK_LENGTH)?;
        Ok(Self {
            correlation_id: block.get_i64()?,
            leader_member_id: block.get_i32()?,
            active_members: reader.get_var_ascii("activeMembers")?,
            passive_members: reader.get_var_ascii("passiveMembers")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_request_layout() {
        let request = SessionConnectRequest {
            correlation_id: 1,
            response_stream_id: 2,
            response_channel: "aeron:ipc".to_string(),
            credential_data: vec![0xAB],
        };

        let mut buf = Vec::new();
        request.encode_body(&mut buf).unwrap();

        assert_eq!(buf.len(), request.body_length());
        assert_eq!(&buf[0..8], &1i64.to_le_bytes());
        assert_eq!(&buf[8..12], &2i32.to_le_bytes());
        assert_eq!(&buf[12..16], &9u32.to_le_bytes());
        assert_eq!(&buf[16..25], b"aeron:ipc");
        assert_eq!(&buf[25..29], &1u32.to_le_bytes());
        assert_eq!(buf[29], 0xAB);
    }

    #[test]
    fn test_session_event_decodes_after_longer_block() {
        let mut buf = Vec::new();
        buf.put_i64_le(5);
        buf.put_i64_le(6);
        buf.put_i32_le(2);
        buf.put_i32_le(EventCode::Redirect.as_i32());
        buf.put_i64_le(-1);
        put_var_ascii(&mut buf, "detail", "leader=2").unwrap();

        let mut reader = Reader::new(&buf);
        let event = SessionEvent::decode_body(&mut reader, 32).unwrap();

        assert_eq!(event.code, EventCode::Redirect);
        assert_eq!(event.leader_member_id, 2);
        assert_eq!(event.detail, "leader=2");
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_session_event_rejects_unknown_code() {
        let mut buf = Vec::new();
        buf.put_i64_le(5);
        buf.put_i64_le(6);
        buf.put_i32_le(2);
        buf.put_i32_le(17);
        put_var_ascii(&mut buf, "detail", "").unwrap();

        let mut reader = Reader::new(&buf);
        assert!(matches!(
            SessionEvent::decode_body(&mut reader, 24),
            Err(crate::protocol::Error::UnknownEnumValue {
                enum_name: "EventCode",
                value: 17
            })
        ));
    }
}
