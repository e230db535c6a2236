//! Logical record reassembly.
//!
//! A logical record is split over one or more physical records. The first
//! fragment has its "continued" bit clear; every fragment but the last has its
//! "continues" bit set. Each fragment's "continued" bit must therefore equal
//! the previous fragment's "continues" bit, or the stream is out of sync.

use std::io::Read;

use log::trace;

use super::header;
use super::physical::PhysicalRecordReader;
use crate::jazelle::types::error::{JazelleError, Result};
use crate::jazelle::types::models::{LogicalRecord, RawRecord};
use crate::jazelle::types::options::FloatPolicy;

/// Reassembles logical records from a stream of physical records.
///
/// Partially assembled records never leave this type.
pub struct LogicalRecordAssembler<R: Read> {
    reader: PhysicalRecordReader<R>,
    next_index: u64,
    float_policy: FloatPolicy,
}

impl<R: Read> LogicalRecordAssembler<R> {
    pub fn new(source: R) -> Self {
        Self::with_float_policy(source, FloatPolicy::default())
    }

    pub fn with_float_policy(source: R, float_policy: FloatPolicy) -> Self {
        Self {
            reader: PhysicalRecordReader::new(source),
            next_index: 0,
            float_policy,
        }
    }

    /// Number of bytes consumed from the source so far.
    pub fn offset(&self) -> u64 {
        self.reader.offset()
    }

    /// Number of logical records sealed so far, the file header included.
    pub fn records_read(&self) -> u64 {
        self.next_index
    }

    /// Reassembles the next logical record without interpreting it.
    pub fn next_raw(&mut self) -> Result<Option<RawRecord>> {
        let Some(first) = self.reader.next_record()? else {
            return Ok(None);
        };
        let index = self.next_index;

        if first.continued {
            return Err(JazelleError::Assembly {
                record: index,
                reason: format!(
                    "physical record {} continues a logical record that never started",
                    first.index
                ),
            });
        }

        let offset = first.offset;
        let mut continues = first.continues;
        let mut fragment_starts = vec![0];
        let mut payload = first.payload;

        while continues {
            let Some(next) = self.reader.next_record()? else {
                return Err(JazelleError::Assembly {
                    record: index,
                    reason: format!(
                        "stream ended after {} fragments of an unfinished logical record",
                        fragment_starts.len()
                    ),
                });
            };
            if !next.continued {
                return Err(JazelleError::Assembly {
                    record: index,
                    reason: format!(
                        "physical record {} starts a new logical record \
                         before the previous one was sealed",
                        next.index
                    ),
                });
            }
            fragment_starts.push(payload.len());
            payload.extend_from_slice(&next.payload);
            continues = next.continues;
        }

        trace!(
            "Logical record {}: {} bytes in {} fragments",
            index,
            payload.len(),
            fragment_starts.len()
        );
        self.next_index += 1;

        Ok(Some(RawRecord {
            index,
            offset,
            fragment_starts,
            payload,
        }))
    }

    /// Reassembles the next logical record and parses its record and event headers.
    pub fn next_record(&mut self) -> Result<Option<LogicalRecord>> {
        match self.next_raw()? {
            Some(raw) => header::interpret(raw, self.float_policy).map(Some),
            None => Ok(None),
        }
    }
}
