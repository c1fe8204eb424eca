//! Codec error types

use thiserror::Error;

/// Errors raised while encoding or decoding cluster messages
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Buffer ends before the structure being read or written
    #[error("buffer too short: need {needed} bytes, got {got}")]
    BufferTooShort {
        /// Needed size
        needed: usize,
        /// Actual size
        got: usize,
    },

    /// Header names a template this codec does not know
    #[error("unknown template id: {template_id}")]
    UnknownTemplateId {
        /// Template id from the header
        template_id: u16,
    },

    /// Header names a schema or version this codec cannot decode
    #[error("schema mismatch: schema id {schema_id} version {version}")]
    SchemaVersionMismatch {
        /// Schema id from the header
        schema_id: u16,
        /// Schema version from the header
        version: u16,
    },

    /// Enum field holds a value outside its declared set
    #[error("unknown {enum_name} value: {value}")]
    UnknownEnumValue {
        /// Enum type name
        enum_name: &'static str,
        /// Raw encoded value
        value: i32,
    },

    /// Variable-length field exceeds the schema limit
    #[error("{field} too long: {length} bytes (max {max})")]
    VarDataTooLong {
        /// Field name
        field: &'static str,
        /// Declared or supplied length
        length: usize,
        /// Maximum allowed
        max: usize,
    },

    /// Repeating group holds more entries than the group header can count
    #[error("group {group} too large: {count} entries (max {max})")]
    GroupTooLarge {
        /// Group name
        group: &'static str,
        /// Number of entries
        count: usize,
        /// Maximum allowed
        max: usize,
    },

    /// ASCII field carries non-ASCII bytes
    #[error("{field} contains non-ASCII text")]
    NonAsciiText {
        /// Field name
        field: &'static str,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
