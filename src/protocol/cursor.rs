//! Bounds-checked read cursor and write helpers shared by every template.
//!
//! Every read is checked against the remaining buffer before any bytes are
//! consumed, so a malformed length can never index past the input.

use bytes::{Buf, BufMut};

use super::types::{BooleanType, SchemaEnum};
use super::{
    Error, GROUP_HEADER_SIZE, GroupSizeEncoding, MAX_VAR_DATA_LENGTH, Result, VAR_DATA_HEADER_SIZE,
};

/// Read cursor over an encoded message.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Reader<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    pub(crate) const fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    /// Absolute position from the start of the buffer.
    pub(crate) const fn offset(&self) -> usize {
        self.offset
    }

    pub(crate) const fn remaining(&self) -> usize {
        self.buf.len() - self.offset
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let needed = self.offset.saturating_add(len);
        if needed > self.buf.len() {
            return Err(Error::BufferTooShort {
                needed,
                got: self.buf.len(),
            });
        }
        let slice = &self.buf[self.offset..needed];
        self.offset = needed;
        Ok(slice)
    }

    pub(crate) fn skip(&mut self, len: usize) -> Result<()> {
        self.take(len).map(|_| ())
    }

    pub(crate) fn get_i64(&mut self) -> Result<i64> {
        let mut bytes = self.take(8)?;
        Ok(bytes.get_i64_le())
    }

    pub(crate) fn get_i32(&mut self) -> Result<i32> {
        let mut bytes = self.take(4)?;
        Ok(bytes.get_i32_le())
    }

    pub(crate) fn get_enum<E: SchemaEnum>(&mut self) -> Result<E> {
        let value = self.get_i32()?;
        E::from_i32(value).ok_or(Error::UnknownEnumValue {
            enum_name: E::NAME,
            value,
        })
    }

    pub(crate) fn get_bool(&mut self) -> Result<bool> {
        self.get_enum::<BooleanType>().map(bool::from)
    }

    /// Split off a fixed block of `acting` bytes and move past all of it.
    ///
    /// The returned reader sees only the block; bytes beyond `known` are
    /// never read, which is how newer, longer blocks are tolerated.
    pub(crate) fn block(&mut self, acting: u16, known: u16) -> Result<Reader<'a>> {
        if acting < known {
            return Err(Error::BufferTooShort {
                needed: usize::from(known),
                got: usize::from(acting),
            });
        }
        let bytes = self.take(usize::from(acting))?;
        Ok(Reader::new(bytes))
    }

    /// Read a group header and check the entries fit in what is left.
    pub(crate) fn group_header(&mut self, known_entry: u16) -> Result<GroupSizeEncoding> {
        let header = GroupSizeEncoding::from_bytes(self.take(GROUP_HEADER_SIZE)?)?;
        if header.block_length < known_entry {
            return Err(Error::BufferTooShort {
                needed: usize::from(known_entry),
                got: usize::from(header.block_length),
            });
        }

        let body = usize::from(header.block_length) * usize::from(header.num_in_group);
        if body > self.remaining() {
            return Err(Error::BufferTooShort {
                needed: self.offset + body,
                got: self.buf.len(),
            });
        }
        Ok(header)
    }

    pub(crate) fn get_var_data(&mut self, field: &'static str) -> Result<Vec<u8>> {
        let mut prefix = self.take(VAR_DATA_HEADER_SIZE)?;
        let length = prefix.get_u32_le() as usize;
        if length > MAX_VAR_DATA_LENGTH {
            return Err(Error::VarDataTooLong {
                field,
                length,
                max: MAX_VAR_DATA_LENGTH,
            });
        }
        Ok(self.take(length)?.to_vec())
    }

    pub(crate) fn get_var_ascii(&mut self, field: &'static str) -> Result<String> {
        let bytes = self.get_var_data(field)?;
        if !bytes.is_ascii() {
            return Err(Error::NonAsciiText { field });
        }
        String::from_utf8(bytes).map_err(|_| Error::NonAsciiText { field })
    }
}

pub(crate) fn put_enum<B: BufMut, E: SchemaEnum>(buf: &mut B, value: E) {
    buf.put_i32_le(value.as_i32());
}

pub(crate) fn put_bool<B: BufMut>(buf: &mut B, value: bool) {
    put_enum(buf, BooleanType::from(value));
}

pub(crate) fn put_var_data<B: BufMut>(buf: &mut B, field: &'static str, data: &[u8]) -> Result<()> {
    if data.len() > MAX_VAR_DATA_LENGTH {
        return Err(Error::VarDataTooLong {
            field,
            length: data.len(),
            max: MAX_VAR_DATA_LENGTH,
        });
    }
    // Bounded by MAX_VAR_DATA_LENGTH above.
    #[allow(clippy::cast_possible_truncation)]
    buf.put_u32_le(data.len() as u32);
    buf.put_slice(data);
    Ok(())
}

pub(crate) fn put_var_ascii<B: BufMut>(buf: &mut B, field: &'static str, text: &str) -> Result<()> {
    if !text.is_ascii() {
        return Err(Error::NonAsciiText { field });
    }
    put_var_data(buf, field, text.as_bytes())
}

pub(crate) fn put_group_header<B: BufMut>(
    buf: &mut B,
    group: &'static str,
    block_length: u16,
    count: usize,
) -> Result<()> {
    let num_in_group = u16::try_from(count).map_err(|_| Error::GroupTooLarge {
        group,
        count,
        max: usize::from(u16::MAX),
    })?;
    buf.put_slice(
        &GroupSizeEncoding {
            block_length,
            num_in_group,
        }
        .to_bytes(),
    );
    Ok(())
}

/// Encoded size of a variable-length field holding `len` bytes.
pub(crate) const fn var_data_length(len: usize) -> usize {
    VAR_DATA_HEADER_SIZE + len
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::CloseReason;

    #[test]
    fn test_block_skips_trailing_bytes() {
        let bytes = [1u8, 0, 0, 0, 0xAA, 0xBB, 7, 0, 0, 0];
        let mut reader = Reader::new(&bytes);

        let mut block = reader.block(6, 4).unwrap();
        assert_eq!(block.get_i32().unwrap(), 1);
        assert_eq!(reader.offset(), 6);
        assert_eq!(reader.get_i32().unwrap(), 7);
    }

    #[test]
    fn test_block_shorter_than_known() {
        let bytes = [0u8; 16];
        let mut reader = Reader::new(&bytes);
        assert!(matches!(
            reader.block(4, 8),
            Err(Error::BufferTooShort { needed: 8, got: 4 })
        ));
    }

    #[test]
    fn test_var_data_length_exceeds_buffer() {
        let mut bytes = Vec::new();
        bytes.put_u32_le(100);
        bytes.put_slice(b"short");

        let mut reader = Reader::new(&bytes);
        assert!(matches!(
            reader.get_var_data("detail"),
            Err(Error::BufferTooShort { needed: 104, got: 9 })
        ));
    }

    #[test]
    fn test_var_data_over_limit() {
        let mut bytes = Vec::new();
        bytes.put_u32_le(u32::MAX);

        let mut reader = Reader::new(&bytes);
        assert!(matches!(
            reader.get_var_data("credentialData"),
            Err(Error::VarDataTooLong { .. })
        ));
    }

    #[test]
    fn test_non_ascii_text_rejected() {
        let mut bytes = Vec::new();
        put_var_data(&mut bytes, "detail", "caf\u{e9}".as_bytes()).unwrap();

        let mut reader = Reader::new(&bytes);
        assert!(matches!(
            reader.get_var_ascii("detail"),
            Err(Error::NonAsciiText { field: "detail" })
        ));

        let mut out = Vec::new();
        assert!(put_var_ascii(&mut out, "detail", "caf\u{e9}").is_err());
    }

    #[test]
    fn test_unknown_enum_value() {
        let bytes = 9i32.to_le_bytes();
        let mut reader = Reader::new(&bytes);
        assert!(matches!(
            reader.get_enum::<CloseReason>(),
            Err(Error::UnknownEnumValue {
                enum_name: "CloseReason",
                value: 9
            })
        ));
    }

    #[test]
    fn test_group_header_bounds_entries() {
        let mut bytes = Vec::new();
        put_group_header(&mut bytes, "steps", 52, 1000).unwrap();

        let mut reader = Reader::new(&bytes);
        assert!(matches!(
            reader.group_header(52),
            Err(Error::BufferTooShort { .. })
        ));
    }

    #[test]
    fn test_group_too_large() {
        let mut bytes = Vec::new();
        assert!(matches!(
            put_group_header(&mut bytes, "steps", 52, 70_000),
            Err(Error::GroupTooLarge { count: 70_000, .. })
        ));
    }
}
