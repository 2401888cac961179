// crates/flt2vhs-core/src/flt/reader.rs

use crate::error::{ConversionError, Result};
use crate::flt::catalog::{decode_body, PayloadLen, Record, RecordType, HEADER_LEN};

/// Forward-only iterator over the records of an FLT buffer.
///
/// Borrows the buffer (usually a memory map) and decodes each payload in
/// place. After the first error it yields nothing more: an unknown tag leaves
/// the cursor unable to find the next record, and a truncated record is by
/// definition the last one.
#[derive(Clone, Debug)]
pub struct RecordReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    failed: bool,
}

impl<'a> RecordReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            pos: 0,
            failed: false,
        }
    }

    /// Offset of the next record to be read.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn truncated(&self, needed: usize) -> ConversionError {
        ConversionError::TruncatedRecord {
            offset: self.pos,
            needed,
            available: self.remaining(),
        }
    }

    fn read_next(&mut self) -> Result<Record<'a>> {
        let start = self.pos;
        let rest = &self.bytes[start..];

        let tag = rest[0];
        let ty = RecordType::from_tag(tag)
            .ok_or(ConversionError::UnknownRecordType { offset: start, tag })?;

        if rest.len() < HEADER_LEN {
            return Err(self.truncated(HEADER_LEN));
        }
        let time = f32::from_le_bytes([rest[1], rest[2], rest[3], rest[4]]);

        let payload_len = match ty.payload_len() {
            PayloadLen::Fixed(n) => n,
            PayloadLen::Counted { prefix, element } => {
                if rest.len() < HEADER_LEN + prefix {
                    return Err(self.truncated(HEADER_LEN + prefix));
                }
                let c = &rest[HEADER_LEN..HEADER_LEN + prefix];
                let count = i32::from_le_bytes([c[0], c[1], c[2], c[3]]);
                if count < 0 {
                    return Err(ConversionError::InvalidCallsignCount {
                        offset: start,
                        count,
                    });
                }
                prefix + count as usize * element
            }
        };

        let total = HEADER_LEN + payload_len;
        if rest.len() < total {
            return Err(self.truncated(total));
        }

        let body = decode_body(ty, &rest[HEADER_LEN..total]);
        self.pos = start + total;
        Ok(Record { time, body })
    }
}

impl<'a> Iterator for RecordReader<'a> {
    type Item = Result<Record<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.bytes.len() {
            return None;
        }
        let res = self.read_next();
        if res.is_err() {
            self.failed = true;
        }
        Some(res)
    }
}

impl std::iter::FusedIterator for RecordReader<'_> {}
