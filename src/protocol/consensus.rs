//! Consensus protocol: elections and log position tracking between members.

use bytes::BufMut;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::cursor::{Reader, put_bool};
use super::message::BodyCodec;
use super::{MessageType, Result, Template};

/// Candidate solicits votes for a new term
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RequestVote {
    /// Term the candidate proposes to lead
    pub candidate_term_id: i64,
    /// Base log position of the candidate's last term
    pub last_base_log_position: i64,
    /// Position reached within the candidate's last term
    pub last_term_position: i64,
    /// Member asking for votes
    pub candidate_member_id: i32,
}

impl Template for RequestVote {
    const MESSAGE_TYPE: MessageType = MessageType::RequestVote;
    const BLOCK_LENGTH: u16 = 28;
}

impl BodyCodec for RequestVote {
    fn encode_body<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        buf.put_i64_le(self.candidate_term_id);
        buf.put_i64_le(self.last_base_log_position);
        buf.put_i64_le(self.last_term_position);
        buf.put_i32_le(self.candidate_member_id);
        Ok(())
    }

    fn decode_body(reader: &mut Reader<'_>, block_length: u16) -> Result<Self> {
        let mut block = reader.block(block_length, Self::BLOCK_LENGTH)?;
        Ok(Self {
            candidate_term_id: block.get_i64()?,
            last_base_log_position: block.get_i64()?,
            last_term_position: block.get_i64()?,
            candidate_member_id: block.get_i32()?,
        })
    }
}

/// Member answer to a vote request
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vote {
    /// Term from the vote request
    pub candidate_term_id: i64,
    /// Base log position of the voter's last term
    pub last_base_log_position: i64,
    /// Position reached within the voter's last term
    pub last_term_position: i64,
    /// Candidate being answered
    pub candidate_member_id: i32,
    /// Member casting the vote
    pub follower_member_id: i32,
    /// Whether the vote is granted
    pub vote: bool,
}

impl Template for Vote {
    const MESSAGE_TYPE: MessageType = MessageType::Vote;
    const BLOCK_LENGTH: u16 = 36;
}

impl BodyCodec for Vote {
    fn encode_body<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        buf.put_i64_le(self.candidate_term_id);
        buf.put_i64_le(self.last_base_log_position);
        buf.put_i64_le(self.last_term_position);
        buf.put_i32_le(self.candidate_member_id);
        buf.put_i32_le(self.follower_member_id);
        put_bool(buf, self.vote);
        Ok(())
    }

    fn decode_body(reader: &mut Reader<'_>, block_length: u16) -> Result<Self> {
        let mut block = reader.block(block_length, Self::BLOCK_LENGTH)?;
        Ok(Self {
            candidate_term_id: block.get_i64()?,
            last_base_log_position: block.get_i64()?,
            last_term_position: block.get_i64()?,
            candidate_member_id: block.get_i32()?,
            follower_member_id: block.get_i32()?,
            vote: block.get_bool()?,
        })
    }
}

/// Follower report of the position it has appended
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AppendedPosition {
    /// Position appended within the term
    pub term_position: i64,
    /// Term the position belongs to
    pub leadership_term_id: i64,
    /// Reporting follower
    pub follower_member_id: i32,
}

impl Template for AppendedPosition {
    const MESSAGE_TYPE: MessageType = MessageType::AppendedPosition;
    const BLOCK_LENGTH: u16 = 20;
}

impl BodyCodec for AppendedPosition {
    fn encode_body<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        buf.put_i64_le(self.term_position);
        buf.put_i64_le(self.leadership_term_id);
        buf.put_i32_le(self.follower_member_id);
        Ok(())
    }

    fn decode_body(reader: &mut Reader<'_>, block_length: u16) -> Result<Self> {
        let mut block = reader.block(block_length, Self::BLOCK_LENGTH)?;
        Ok(Self {
            term_position: block.get_i64()?,
            leadership_term_id: block.get_i64()?,
            follower_member_id: block.get_i32()?,
        })
    }
}

/// Leader notification of the quorum position within its term
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CommitPosition {
    /// Committed position within the term
    pub term_position: i64,
    /// Term the position belongs to
    pub leadership_term_id: i64,
    /// Leader sending the update
    pub leader_member_id: i32,
    /// Session id of the log publication
    pub log_session_id: i32,
}

impl Template for CommitPosition {
    const MESSAGE_TYPE: MessageType = MessageType::CommitPosition;
    const BLOCK_LENGTH: u16 = 24;
}

impl BodyCodec for CommitPosition {
    fn encode_body<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        buf.put_i64_le(self.term_position);
        buf.put_i64_le(self.leadership_term_id);
        buf.put_i32_le(self.leader_member_id);
        buf.put_i32_le(self.log_session_id);
        Ok(())
    }

    fn decode_body(reader: &mut Reader<'_>, block_length: u16) -> Result<Self> {
        let mut block = reader.block(block_length, Self::BLOCK_LENGTH)?;
        Ok(Self {
            term_position: block.get_i64()?,
            leadership_term_id: block.get_i64()?,
            leader_member_id: block.get_i32()?,
            log_session_id: block.get_i32()?,
        })
    }
}
