//! Message and group headers
//!
//! The message header is 8 bytes and prefixes every encoded message.

use super::{Error, GROUP_HEADER_SIZE, HEADER_SIZE, MessageType, Result, SCHEMA_ID, SCHEMA_VERSION};

/// Message header (8 bytes)
///
/// # Wire Format
///
/// ```text
/// 0                   1                   2                   3
/// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |         Block Length          |          Template ID          |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |           Schema ID           |            Version            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    block_length: u16,
    template_id: u16,
    schema_id: u16,
    version: u16,
}

impl MessageHeader {
    /// Create a header for the current schema version
    #[must_use]
    pub const fn new(msg_type: MessageType, block_length: u16) -> Self {
        Self {
            block_length,
            template_id: msg_type.template_id(),
            schema_id: SCHEMA_ID,
            version: SCHEMA_VERSION,
        }
    }

    /// Create a header from raw field values
    #[must_use]
    pub const fn from_parts(block_length: u16, template_id: u16, schema_id: u16, version: u16) -> Self {
        Self {
            block_length,
            template_id,
            schema_id,
            version,
        }
    }

    /// Length of the fixed block that follows the header
    #[must_use]
    pub const fn block_length(&self) -> u16 {
        self.block_length
    }

    /// Get template id
    #[must_use]
    pub const fn template_id(&self) -> u16 {
        self.template_id
    }

    /// Get schema id
    #[must_use]
    pub const fn schema_id(&self) -> u16 {
        self.schema_id
    }

    /// Get schema version
    #[must_use]
    pub const fn version(&self) -> u16 {
        self.version
    }

    /// Get message type
    #[must_use]
    pub fn message_type(&self) -> Option<MessageType> {
        MessageType::from_u16(self.template_id)
    }

    /// Validate schema compatibility and resolve the template.
    ///
    /// Newer versions are accepted: their extra block bytes are skipped.
    pub fn validate(&self) -> Result<MessageType> {
        if self.schema_id != SCHEMA_ID || self.version == 0 {
            return Err(Error::SchemaVersionMismatch {
                schema_id: self.schema_id,
                version: self.version,
            });
        }

        self.message_type().ok_or(Error::UnknownTemplateId {
            template_id: self.template_id,
        })
    }

    /// Convert to bytes (little-endian)
    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];

        bytes[0..2].copy_from_slice(&self.block_length.to_le_bytes());
        bytes[2..4].copy_from_slice(&self.template_id.to_le_bytes());
        bytes[4..6].copy_from_slice(&self.schema_id.to_le_bytes());
        bytes[6..8].copy_from_slice(&self.version.to_le_bytes());

        bytes
    }

    /// Parse from bytes (little-endian) without validating schema or template.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(Error::BufferTooShort {
                needed: HEADER_SIZE,
                got: bytes.len(),
            });
        }

        Ok(Self {
            block_length: u16::from_le_bytes([bytes[0], bytes[1]]),
            template_id: u16::from_le_bytes([bytes[2], bytes[3]]),
            schema_id: u16::from_le_bytes([bytes[4], bytes[5]]),
            version: u16::from_le_bytes([bytes[6], bytes[7]]),
        })
    }
}

/// Repeating group header (4 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupSizeEncoding {
    /// Encoded size of each group entry
    pub block_length: u16,
    /// Number of entries that follow
    pub num_in_group: u16,
}

impl GroupSizeEncoding {
    /// Convert to bytes (little-endian)
    #[must_use]
    pub fn to_bytes(&self) -> [u8; GROUP_HEADER_SIZE] {
        let mut bytes = [0u8; GROUP_HEADER_SIZE];
        bytes[0..2].copy_from_slice(&self.block_length.to_le_bytes());
        bytes[2..4].copy_from_slice(&self.num_in_group.to_le_bytes());
        bytes
    }

    /// Parse from bytes (little-endian)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < GROUP_HEADER_SIZE {
            return Err(Error::BufferTooShort {
                needed: GROUP_HEADER_SIZE,
                got: bytes.len(),
            });
        }

        Ok(Self {
            block_length: u16::from_le_bytes([bytes[0], bytes[1]]),
            num_in_group: u16::from_le_bytes([bytes[2], bytes[3]]),
        })
    }
}
