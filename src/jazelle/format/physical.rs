//! Physical record framing.
//!
//! # Record Structure
//! ```text
//! [2 bytes] Record length, header included (little-endian u16)
//! [2 bytes] Reserved
//! [2 bytes] Logical segment length
//! [2 bytes] Continuation word: bit 0 = continues in next record,
//!           bit 1 = continued from previous record, other bits zero
//! [N bytes] Payload (record length - 8)
//! ```
//!
//! A record length of zero where a header is expected marks the end of the
//! data; so does a clean end of file.

use std::io::Read;

use byteorder::{ByteOrder, LittleEndian};
use log::{debug, trace};

use crate::jazelle::types::error::{JazelleError, Result};
use crate::jazelle::types::models::{PHYSICAL_HEADER_LEN, PhysicalRecord};
use crate::jazelle::utils;

const CONTINUES: u16 = 0x1;
const CONTINUED: u16 = 0x2;
const SYNC_MASK: u16 = !(CONTINUES | CONTINUED);

/// Yields the framed physical records of a byte source, in order.
///
/// The reader only moves forward. Once it has reported the end of the data
/// or an error, it keeps reporting the end of the data.
pub struct PhysicalRecordReader<R: Read> {
    source: R,
    offset: u64,
    next_index: u64,
    finished: bool,
}

impl<R: Read> PhysicalRecordReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            offset: 0,
            next_index: 0,
            finished: false,
        }
    }

    /// Number of bytes consumed from the source so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Number of physical records produced so far.
    pub fn records_read(&self) -> u64 {
        self.next_index
    }

    /// Reads the next physical record, or `None` at the end of the data.
    pub fn next_record(&mut self) -> Result<Option<PhysicalRecord>> {
        if self.finished {
            return Ok(None);
        }
        let result = self.read_record();
        if !matches!(result, Ok(Some(_))) {
            self.finished = true;
        }
        result
    }

    fn read_record(&mut self) -> Result<Option<PhysicalRecord>> {
        let record_offset = self.offset;
        let mut header = [0u8; PHYSICAL_HEADER_LEN];

        // The length word alone decides between end marker, end of file and a record.
        let got = utils::read_fully(&mut self.source, &mut header[..2])?;
        self.offset += got as u64;
        if got == 0 {
            debug!("End of file after {} physical records", self.next_index);
            return Ok(None);
        }
        if got < 2 {
            return Err(JazelleError::TruncatedStream {
                offset: record_offset,
                expected: PHYSICAL_HEADER_LEN,
                found: got,
            });
        }

        let reclen = LittleEndian::read_u16(&header[0..2]) as usize;
        if reclen == 0 {
            debug!(
                "End marker at byte {} after {} physical records",
                record_offset, self.next_index
            );
            return Ok(None);
        }

        let got = utils::read_fully(&mut self.source, &mut header[2..])?;
        self.offset += got as u64;
        if got < PHYSICAL_HEADER_LEN - 2 {
            return Err(JazelleError::TruncatedStream {
                offset: record_offset,
                expected: PHYSICAL_HEADER_LEN,
                found: got + 2,
            });
        }

        if reclen < PHYSICAL_HEADER_LEN {
            return Err(JazelleError::Framing {
                offset: record_offset,
                reason: format!("record length {} is shorter than its own header", reclen),
            });
        }

        let segment_length = LittleEndian::read_u16(&header[4..6]);
        let control = LittleEndian::read_u16(&header[6..8]);
        if control & SYNC_MASK != 0 {
            return Err(JazelleError::Framing {
                offset: record_offset,
                reason: format!("continuation word {:#06x} has reserved bits set", control),
            });
        }

        let payload_len = reclen - PHYSICAL_HEADER_LEN;
        let mut payload = vec![0u8; payload_len];
        let got = utils::read_fully(&mut self.source, &mut payload)?;
        self.offset += got as u64;
        if got < payload_len {
            return Err(JazelleError::TruncatedStream {
                offset: record_offset,
                expected: payload_len,
                found: got,
            });
        }

        let record = PhysicalRecord {
            index: self.next_index,
            offset: record_offset,
            segment_length,
            continued: control & CONTINUED != 0,
            continues: control & CONTINUES != 0,
            payload,
        };
        trace!(
            "Physical record {}: {} payload bytes, continued={}, continues={}",
            record.index, payload_len, record.continued, record.continues
        );
        self.next_index += 1;
        Ok(Some(record))
    }
}
