//! Persisted entities written into snapshots and recovery plans.

use bytes::BufMut;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::cursor::{
    Reader, put_enum, put_group_header, put_var_ascii, put_var_data, var_data_length,
};
use super::message::BodyCodec;
use super::{CloseReason, GROUP_HEADER_SIZE, MessageType, Result, SnapshotMark, Template};

/// Marks the start, sections, and end of a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SnapshotMarker {
    /// Snapshot type identifier
    pub type_id: i64,
    /// Log position the snapshot was taken at
    pub log_position: i64,
    /// Term the snapshot was taken in
    pub leadership_term_id: i64,
    /// Section index
    pub index: i32,
    /// Marker kind
    pub mark: SnapshotMark,
}

impl Template for SnapshotMarker {
    const MESSAGE_TYPE: MessageType = MessageType::SnapshotMarker;
    const BLOCK_LENGTH: u16 = 32;
}

impl BodyCodec for SnapshotMarker {
    fn encode_body<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        buf.put_i64_le(self.type_id);
        buf.put_i64_le(self.log_position);
        buf.put_i64_le(self.leadership_term_id);
        buf.put_i32_le(self.index);
        put_enum(buf, self.mark);
        Ok(())
    }

    fn decode_body(reader: &mut Reader<'_>, block_length: u16) -> Result<Self> {
        let mut block = reader.block(block_length, Self::BLOCK_LENGTH)?;
        Ok(Self {
            type_id: block.get_i64()?,
            log_position: block.get_i64()?,
            leadership_term_id: block.get_i64()?,
            index: block.get_i32()?,
            mark: block.get_enum()?,
        })
    }
}

/// Client session state held by a service snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClientSession {
    /// Session id
    pub cluster_session_id: i64,
    /// Stream id for responses
    pub response_stream_id: i32,
    /// Channel URI for responses
    pub response_channel: String,
    /// Principal established at connect time
    pub encoded_principal: Vec<u8>,
}

impl Template for ClientSession {
    const MESSAGE_TYPE: MessageType = MessageType::ClientSession;
    const BLOCK_LENGTH: u16 = 12;
}

impl BodyCodec for ClientSession {
    fn body_length(&self) -> usize {
        usize::from(Self::BLOCK_LENGTH)
            + var_data_length(self.response_channel.len())
            + var_data_length(self.encoded_principal.len())
    }

    fn encode_body<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        buf.put_i64_le(self.cluster_session_id);
        buf.put_i32_le(self.response_stream_id);
        put_var_ascii(buf, "responseChannel", &self.response_channel)?;
        put_var_data(buf, "encodedPrincipal", &self.encoded_principal)
    }

    fn decode_body(reader: &mut Reader<'_>, block_length: u16) -> Result<Self> {
        let mut block = reader.block(block_length, Self::BLOCK_LENGTH)?;
        Ok(Self {
            cluster_session_id: block.get_i64()?,
            response_stream_id: block.get_i32()?,
            response_channel: reader.get_var_ascii("responseChannel")?,
            encoded_principal: reader.get_var_data("encodedPrincipal")?,
        })
    }
}

/// Cluster session state held by the consensus snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClusterSession {
    /// Session id
    pub cluster_session_id: i64,
    /// Last correlation id seen from the client
    pub last_correlation_id: i64,
    /// Cluster time of last activity
    pub time_of_last_activity: i64,
    /// Close reason if the session is closing
    pub close_reason: CloseReason,
    /// Stream id for responses
    pub response_stream_id: i32,
    /// Channel URI for responses
    pub response_channel: String,
}

impl Template for ClusterSession {
    const MESSAGE_TYPE: MessageType = MessageType::ClusterSession;
    const BLOCK_LENGTH: u16 = 32;
}

impl BodyCodec for ClusterSession {
    fn body_length(&self) -> usize {
        usize::from(Self::BLOCK_LENGTH) + var_data_length(self.response_channel.len())
    }

    fn encode_body<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        buf.put_i64_le(self.cluster_session_id);
        buf.put_i64_le(self.last_correlation_id);
        buf.put_i64_le(self.time_of_last_activity);
        put_enum(buf, self.close_reason);
        buf.put_i32_le(self.response_stream_id);
        put_var_ascii(buf, "responseChannel", &self.response_channel)
    }

    fn decode_body(reader: &mut Reader<'_>, block_length: u16) -> Result<Self> {
        let mut block = reader.block(block_length, Self::BLOCK_LENGTH)?;
        Ok(Self {
            cluster_session_id: block.get_i64()?,
            last_correlation_id: block.get_i64()?,
            time_of_last_activity: block.get_i64()?,
            close_reason: block.get_enum()?,
            response_stream_id: block.get_i32()?,
            response_channel: reader.get_var_ascii("responseChannel")?,
        })
    }
}

/// Pending timer held by a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Timer {
    /// Correlation id the timer was scheduled with
    pub correlation_id: i64,
    /// Cluster time of expiry
    pub deadline: i64,
}

impl Template for Timer {
    const MESSAGE_TYPE: MessageType = MessageType::Timer;
    const BLOCK_LENGTH: u16 = 16;
}

impl BodyCodec for Timer {
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

/// Session id sequencer held by a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sequencer {
    /// Next session id to assign
    pub next_session_id: i64,
}

impl Template for Sequencer {
    const MESSAGE_TYPE: MessageType = MessageType::Sequencer;
    const BLOCK_LENGTH: u16 = 8;
}

impl BodyCodec for Sequencer {
    fn encode_body<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        buf.put_i64_le(self.next_session_id);
        Ok(())
    }

    fn decode_body(reader: &mut Reader<'_>, block_length: u16) -> Result<Self> {
        let mut block = reader.block(block_length, Self::BLOCK_LENGTH)?;
        Ok(Self {
            next_session_id: block.get_i64()?,
        })
    }
}

/// Snapshot recording to load during recovery
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RecoverySnapshot {
    /// Recording holding the snapshot
    pub recording_id: i64,
    /// Term the snapshot was taken in
    pub leadership_term_id: i64,
    /// Base log position of that term
    pub term_base_log_position: i64,
    /// Log position the snapshot covers
    pub log_position: i64,
    /// Cluster time the snapshot was taken
    pub timestamp: i64,
    /// Service the snapshot belongs to
    pub service_id: i32,
}

impl RecoverySnapshot {
    /// Encoded entry size.
    pub const BLOCK_LENGTH: u16 = 44;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_i64_le(self.recording_id);
        buf.put_i64_le(self.leadership_term_id);
        buf.put_i64_le(self.term_base_log_position);
        buf.put_i64_le(self.log_position);
        buf.put_i64_le(self.timestamp);
        buf.put_i32_le(self.service_id);
    }

    fn decode(entry: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            recording_id: entry.get_i64()?,
            leadership_term_id: entry.get_i64()?,
            term_base_log_position: entry.get_i64()?,
            log_position: entry.get_i64()?,
            timestamp: entry.get_i64()?,
            service_id: entry.get_i32()?,
        })
    }
}

/// Log recording segment to replay during recovery
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RecoveryStep {
    /// First position to replay
    pub recording_start_position: i64,
    /// Position to stop replay at
    pub recording_stop_position: i64,
    /// Recording holding the log
    pub recording_id: i64,
    /// Term of the recorded log
    pub leadership_term_id: i64,
    /// Base log position of that term
    pub term_base_log_position: i64,
    /// Cluster time the term started
    pub timestamp: i64,
    /// Index of the entry in the recording log
    pub entry_index: i32,
}

impl RecoveryStep {
    /// Encoded entry size.
    pub const BLOCK_LENGTH: u16 = 52;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_i64_le(self.recording_start_position);
        buf.put_i64_le(self.recording_stop_position);
        buf.put_i64_le(self.recording_id);
        buf.put_i64_le(self.leadership_term_id);
        buf.put_i64_le(self.term_base_log_position);
        buf.put_i64_le(self.timestamp);
        buf.put_i32_le(self.entry_index);
    }

    fn decode(entry: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            recording_start_position: entry.get_i64()?,
            recording_stop_position: entry.get_i64()?,
            recording_id: entry.get_i64()?,
            leadership_term_id: entry.get_i64()?,
            term_base_log_position: entry.get_i64()?,
            timestamp: entry.get_i64()?,
            entry_index: entry.get_i32()?,
        })
    }
}

/// Plan for recovering state from snapshots and log recordings
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RecoveryPlan {
    /// Last term found in the recording log
    pub last_leadership_term_id: i64,
    /// Base log position of the last term
    pub last_term_base_log_position: i64,
    /// Committed position within the last term
    pub last_term_position_committed: i64,
    /// Appended position within the last term
    pub last_term_position_appended: i64,
    /// Snapshots to load, one per service plus the consensus module
    pub snapshots: Vec<RecoverySnapshot>,
    /// Log segments to replay after loading snapshots
    pub steps: Vec<RecoveryStep>,
}

impl Template for RecoveryPlan {
    const MESSAGE_TYPE: MessageType = MessageType::RecoveryPlan;
    const BLOCK_LENGTH: u16 = 32;
}

impl BodyCodec for RecoveryPlan {
    fn body_length(&self) -> usize {
        usize::from(Self::BLOCK_LENGTH)
            + GROUP_HEADER_SIZE
            + self.snapshots.len() * usize::from(RecoverySnapshot::BLOCK_LENGTH)
            + GROUP_HEADER_SIZE
            + self.steps.len() * usize::from(RecoveryStep::BLOCK_LENGTH)
    }

    fn encode_body<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        buf.put_i64_le(self.last_leadership_term_id);
        buf.put_i64_le(self.last_term_base_log_position);
        buf.put_i64_le(self.last_term_position_committed);
        buf.put_i64_le(self.last_term_position_appended);

        put_group_header(
            buf,
            "snapshots",
            RecoverySnapshot::BLOCK_LENGTH,
            self.snapshots.len(),
        )?;
        for snapshot in &self.snapshots {
            snapshot.encode(buf);
        }

        put_group_header(buf, "steps", RecoveryStep::BLOCK_LENGTH, self.steps.len())?;
        for step in &self.steps {
            step.encode(buf);
        }
        Ok(())
    }

    fn decode_body(reader: &mut Reader<'_>, block_length: u16) -> Result<Self> {
        let mut block = reader.block(block_length, Self::BLOCK_LENGTH)?;
        let last_leadership_term_id = block.get_i64()?;
        let last_term_base_log_position = block.get_i64()?;
        let last_term_position_committed = block.get_i64()?;
        let last_term_position_appended = block.get_i64()?;

        let group = reader.group_header(RecoverySnapshot::BLOCK_LENGTH)?;
        let mut snapshots = Vec::with_capacity(usize::from(group.num_in_group));
        for _ in 0..group.num_in_group {
            let mut entry = reader.block(group.block_length, RecoverySnapshot::BLOCK_LENGTH)?;
            snapshots.push(RecoverySnapshot::decode(&mut entry)?);
        }

        let group = reader.group_header(RecoveryStep::BLOCK_LENGTH)?;
        let mut steps = Vec::with_capacity(usize::from(group.num_in_group));
        for _ in 0..group.num_in_group {
            let mut entry = reader.block(group.block_length, RecoveryStep::BLOCK_LENGTH)?;
            steps.push(RecoveryStep::decode(&mut entry)?);
        }

        Ok(Self {
            last_leadership_term_id,
            last_term_base_log_position,
            last_term_position_committed,
            last_term_position_appended,
            snapshots,
            steps,
        })
    }
}
