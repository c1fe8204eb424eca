//! Message codec (encode/decode)
//!
//! Every message is `[HEADER (8 bytes)] [BLOCK] [GROUPS] [VAR DATA]`, all
//! little-endian. Decoding positions the cursor absolutely at
//! `HEADER_SIZE + blockLength` after the fixed block, so blocks written by a
//! newer schema version are skipped rather than misread.

use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

use super::cursor::Reader;
use crate::metrics::{Metrics, MessageDirection};
use super::{Error, HEADER_SIZE, Message, MessageHeader, Result};

/// Total encoded size of a message, header included.
#[must_use]
pub fn encoded_length(message: &Message) -> usize {
    HEADER_SIZE + message.body_length()
}

/// Encode a message to bytes
///
/// # Format
///
/// ```text
/// [HEADER (8 bytes)] [BLOCK (blockLength)] [GROUPS] [VAR DATA]
/// ```
///
/// # Errors
///
/// Returns an error if a variable-length field or repeating group exceeds its
/// schema limit, or an ASCII field holds non-ASCII text.
pub fn encode(message: &Message) -> Result<Bytes> {
    let mut buf = BytesMut::with_capacity(encoded_length(message));
    encode_into(message, &mut buf)?;
    Ok(buf.freeze())
}

/// Append an encoded message to `buf`.
///
/// On error `buf` is left as it was before the call.
pub fn encode_into(message: &Message, buf: &mut BytesMut) -> Result<()> {
    let start = buf.len();
    buf.reserve(encoded_length(message));

    let header = MessageHeader::new(message.message_type(), message.block_length());
    buf.put_slice(&header.to_bytes());

    if let Err(err) = message.encode_body(buf) {
        buf.truncate(start);
        Metrics::record_error();
        return Err(err);
    }

    Metrics::record_message(MessageDirection::Encoded, message.message_type());
    Ok(())
}

/// Encode a message into a caller-supplied buffer, returning the bytes written.
///
/// # Errors
///
/// Returns [`Error::BufferTooShort`] if `dst` cannot hold the whole message,
/// plus the limit errors of [`encode`].
pub fn encode_to_slice(message: &Message, dst: &mut [u8]) -> Result<usize> {
    let length = encoded_length(message);
    if dst.len() < length {
        return Err(Error::BufferTooShort {
            needed: length,
            got: dst.len(),
        });
    }

    let mut cursor: &mut [u8] = &mut dst[..length];
    let header = MessageHeader::new(message.message_type(), message.block_length());
    cursor.put_slice(&header.to_bytes());
    message.encode_body(&mut cursor).inspect_err(|_| Metrics::record_error())?;

    Metrics::record_message(MessageDirection::Encoded, message.message_type());
    Ok(length)
}

/// Decode a message from bytes, ignoring anything after it.
///
/// # Errors
///
/// Returns an error if:
/// - Buffer is too short for the header, block, groups, or var data
/// - Schema id or version is not supported
/// - Template id is unknown
/// - An enum field holds an undeclared value
pub fn decode(bytes: &[u8]) -> Result<Message> {
    decode_prefix(bytes).map(|(message, _)| message)
}

/// Decode a message from the front of `bytes`, returning it with the number
/// of bytes it occupied.
pub fn decode_prefix(bytes: &[u8]) -> Result<(Message, usize)> {
    match decode_message(bytes) {
        Ok((message, consumed)) => {
            Metrics::record_message(MessageDirection::Decoded, message.message_type());
            Ok((message, consumed))
        }
        Err(err) => {
            Metrics::record_error();
            trace!(error = %err, available = bytes.len(), "decode failed");
            Err(err)
        }
    }
}

fn decode_message(bytes: &[u8]) -> Result<(Message, usize)> {
    let header = MessageHeader::from_bytes(bytes)?;
    let msg_type = header.validate()?;
    trace!(
        %msg_type,
        block_length = header.block_length(),
        version = header.version(),
        "decoding message"
    );

    let mut reader = Reader::new(bytes);
    reader.skip(HEADER_SIZE)?;
    let message = Message::decode_body(msg_type, &mut reader, header.block_length())?;
    Ok((message, reader.offset()))
}
