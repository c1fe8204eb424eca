//! Service protocol: log events delivered to clustered services and the
//! control messages services send back to the consensus module.

use bytes::BufMut;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::cursor::{Reader, put_enum, put_var_ascii, put_var_data, var_data_length};
use super::message::BodyCodec;
use super::{CloseReason, ClusterAction, MessageType, Result, Template};

/// Timer expiry appended to the log
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimerEvent {
    /// Correlation id of the scheduled timer
    pub correlation_id: i64,
    /// Cluster time of expiry
    pub timestamp: i64,
}

impl Template for TimerEvent {
    const MESSAGE_TYPE: MessageType = MessageType::TimerEvent;
    const BLOCK_LENGTH: u16 = 16;
}

impl BodyCodec for TimerEvent {
    fn encode_body<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        buf.put_i64_le(self.correlation_id);
        buf.put_i64_le(self.timestamp);
        Ok(())
    }

    fn decode_body(reader: &mut Reader<'_>, block_length: u16) -> Result<Self> {
        let mut block = reader.block(block_length, Self::BLOCK_LENGTH)?;
        Ok(Self {
            correlation_id: block.get_i64()?,
            timestamp: block.get_i64()?,
        })
    }
}

/// Session opened, appended to the log
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SessionOpenEvent {
    /// Term in which the session was opened
    pub leadership_term_id: i64,
    /// Correlation id of the connect request
    pub correlation_id: i64,
    /// Newly assigned session id
    pub cluster_session_id: i64,
    /// Cluster time of opening
    pub timestamp: i64,
    /// Stream id for responses to the client
    pub response_stream_id: i32,
    /// Channel URI for responses to the client
    pub response_channel: String,
    /// Principal established by the authenticator
    pub encoded_principal: Vec<u8>,
}

impl Template for SessionOpenEvent {
    const MESSAGE_TYPE: MessageType = MessageType::SessionOpenEvent;
    const BLOCK_LENGTH: u16 = 36;
}

impl BodyCodec for SessionOpenEvent {
    fn body_length(&self) -> usize {
        usize::from(Self::BLOCK_LENGTH)
            + var_data_length(self.response_channel.len())
            + var_data_length(self.encoded_principal.len())
    }

    fn encode_body<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        buf.put_i64_le(self.leadership_term_id);
        buf.put_i64_le(self.correlation_id);
        buf.put_i64_le(self.cluster_session_id);
        buf.put_i64_le(self.timestamp);
        buf.put_i32_le(self.response_stream_id);
        put_var_ascii(buf, "responseChannel", &self.response_channel)?;
        put_var_data(buf, "encodedPrincipal", &self.encoded_principal)
    }

    fn decode_body(reader: &mut Reader<'_>, block_length: u16) -> Result<Self> {
        let mut block = reader.block(block_length, Self::BLOCK_LENGTH)?;
        Ok(Self {
            leadership_term_id: block.get_i64()?,
            correlation_id: block.get_i64()?,
            cluster_session_id: block.get_i64()?,
            timestamp: block.get_i64()?,
            response_stream_id: block.get_i32()?,
            response_channel: reader.get_var_ascii("responseChannel")?,
            encoded_principal: reader.get_var_data("encodedPrincipal")?,
        })
    }
}

/// Session closed, appended to the log
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SessionCloseEvent {
    /// Term in which the session was closed
    pub leadership_term_id: i64,
    /// Session that closed
    pub cluster_session_id: i64,
    /// Cluster time of closing
    pub timestamp: i64,
    /// Why the session closed
    pub close_reason: CloseReason,
}

impl Template for SessionCloseEvent {
    const MESSAGE_TYPE: MessageType = MessageType::SessionCloseEvent;
    const BLOCK_LENGTH: u16 = 28;
}

impl BodyCodec for SessionCloseEvent {
    fn encode_body<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        buf.put_i64_le(self.leadership_term_id);
        buf.put_i64_le(self.cluster_session_id);
        buf.put_i64_le(self.timestamp);
        put_enum(buf, self.close_reason);
        Ok(())
    }

    fn decode_body(reader: &mut Reader<'_>, block_length: u16) -> Result<Self> {
        let mut block = reader.block(block_length, Self::BLOCK_LENGTH)?;
        Ok(Self {
            leadership_term_id: block.get_i64()?,
            cluster_session_id: block.get_i64()?,
            timestamp: block.get_i64()?,
            close_reason: block.get_enum()?,
        })
    }
}

/// Cluster-wide action appended to the log
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClusterActionRequest {
    /// Term in which the action was requested
    pub leadership_term_id: i64,
    /// Log position at which the action applies
    pub log_position: i64,
    /// Cluster time of the request
    pub timestamp: i64,
    /// Requested action
    pub action: ClusterAction,
}

impl Template for ClusterActionRequest {
    const MESSAGE_TYPE: MessageType = MessageType::ClusterActionRequest;
    const BLOCK_LENGTH: u16 = 28;
}

impl BodyCodec for ClusterActionRequest {
    fn encode_body<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        buf.put_i64_le(self.leadership_term_id);
        buf.put_i64_le(self.log_position);
        buf.put_i64_le(self.timestamp);
        put_enum(buf, self.action);
        Ok(())
    }

    fn decode_body(reader: &mut Reader<'_>, block_length: u16) -> Result<Self> {
        let mut block = reader.block(block_length, Self::BLOCK_LENGTH)?;
        Ok(Self {
            leadership_term_id: block.get_i64()?,
            log_position: block.get_i64()?,
            timestamp: block.get_i64()?,
            action: block.get_enum()?,
        })
    }
}

/// Service request to schedule a timer
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScheduleTimer {
    /// Correlation id echoed by the timer event
    pub correlation_id: i64,
    /// Cluster time at which the timer expires
    pub deadline: i64,
}

impl Template for ScheduleTimer {
    const MESSAGE_TYPE: MessageType = MessageType::ScheduleTimer;
    const BLOCK_LENGTH: u16 = 16;
}

impl BodyCodec for ScheduleTimer {
    fn encode_body<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        buf.put_i64_le(self.correlation_id);
        buf.put_i64_le(self.deadline);
        Ok(())
    }

    fn decode_body(reader: &mut Reader<'_>, block_length: u16) -> Result<Self> {
        let mut block = reader.block(block_length, Self::BLOCK_LENGTH)?;
        Ok(Self {
            correlation_id: block.get_i64()?,
            deadline: block.get_i64()?,
        })
    }
}

/// Service request to cancel a timer
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CancelTimer {
    /// Correlation id of the timer to cancel
    pub correlation_id: i64,
}

impl Template for CancelTimer {
    const MESSAGE_TYPE: MessageType = MessageType::CancelTimer;
    const BLOCK_LENGTH: u16 = 8;
}

impl BodyCodec for CancelTimer {
    fn encode_body<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        buf.put_i64_le(self.correlation_id);
        Ok(())
    }

    fn decode_body(reader: &mut Reader<'_>, block_length: u16) -> Result<Self> {
        let mut block = reader.block(block_length, Self::BLOCK_LENGTH)?;
        Ok(Self {
            correlation_id: block.get_i64()?,
        })
    }
}

/// Service acknowledgment of a cluster action
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClusterActionAck {
    /// Log position of the acknowledged request
    pub log_position: i64,
    /// Term of the acknowledged request
    pub leadership_term_id: i64,
    /// Service sending the acknowledgment
    pub service_id: i32,
    /// Action being acknowledged
    pub action: ClusterAction,
}

impl Template for ClusterActionAck {
    const MESSAGE_TYPE: MessageType = MessageType::ClusterActionAck;
    const BLOCK_LENGTH: u16 = 24;
}

impl BodyCodec for ClusterActionAck {
    fn encode_body<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        buf.put_i64_le(self.log_position);
        buf.put_i64_le(self.leadership_term_id);
        buf.put_i32_le(self.service_id);
        put_enum(buf, self.action);
        Ok(())
    }

    fn decode_body(reader: &mut Reader<'_>, block_length: u16) -> Result<Self> {
        let mut block = reader.block(block_length, Self::BLOCK_LENGTH)?;
        Ok(Self {
            log_position: block.get_i64()?,
            leadership_term_id: block.get_i64()?,
            service_id: block.get_i32()?,
            action: block.get_enum()?,
        })
    }
}

/// Instruction for a service to join the replicated log
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JoinLog {
    /// Term of the log being joined
    pub leadership_term_id: i64,
    /// Counter id tracking the commit position
    pub commit_position_id: i32,
    /// Session id of the log publication
    pub log_session_id: i32,
    /// Stream id of the log publication
    pub log_stream_id: i32,
    /// Channel URI of the log publication
    pub log_channel: String,
}

impl Template for JoinLog {
    const MESSAGE_TYPE: MessageType = MessageType::JoinLog;
    const BLOCK_LENGTH: u16 = 20;
}

impl BodyCodec for JoinLog {
    fn body_length(&self) -> usize {
        usize::from(Self::BLOCK_LENGTH) + var_data_length(self.log_channel.len())
    }

    fn encode_body<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        buf.put_i64_le(self.leadership_term_id);
        buf.put_i32_le(self.commit_position_id);
        buf.put_i32_le(self.log_session_id);
        buf.put_i32_le(self.log_stream_id);
        put_var_ascii(buf, "logChannel", &self.log_channel)
    }

    fn decode_body(reader: &mut Reader<'_>, block_length: u16) -> Result<Self> {
        let mut block = reader.block(block_length, Self::BLOCK_LENGTH)?;
        Ok(Self {
            leadership_term_id: block.get_i64()?,
            commit_position_id: block.get_i32()?,
            log_session_id: block.get_i32()?,
            log_stream_id: block.get_i32()?,
            log_channel: reader.get_var_ascii("logChannel")?,
        })
    }
}

/// Service request to close a client session
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CloseSession {
    /// Session to close
    pub cluster_session_id: i64,
}

impl Template for CloseSession {
    const MESSAGE_TYPE: MessageType = MessageType::CloseSession;
    const BLOCK_LENGTH: u16 = 8;
}

impl BodyCodec for CloseSession {
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
