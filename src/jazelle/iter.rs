//! Iterators over decoded records.
//!
//! Both iterators yield `Result<DecodedRecord>` and end after the first error.
//!
//! # Example
//! ```no_run
//! # use jazelle_reader::{JazelleReader, ReaderOptions};
//! let mut reader = JazelleReader::open("run.jazelle", ReaderOptions::default()).unwrap();
//! for record in reader.records() {
//!     let record = record.unwrap();
//!     println!("{:?} {:?}", record.run(), record.event_number());
//! }
//! ```

use std::io::Read;
use std::iter::FusedIterator;

use super::reader::JazelleReader;
use super::types::error::Result;
use super::types::models::DecodedRecord;

/// Iterator borrowing a [`JazelleReader`].
///
/// Created by [`JazelleReader::records()`](crate::JazelleReader::records).
pub struct Records<'a, R: Read> {
    reader: &'a mut JazelleReader<R>,
}

impl<'a, R: Read> Records<'a, R> {
    pub(super) fn new(reader: &'a mut JazelleReader<R>) -> Self {
        Self { reader }
    }

    /// Number of records yielded by the underlying reader so far.
    pub fn records_yielded(&self) -> u64 {
        self.reader.records_yielded()
    }
}

impl<R: Read> Iterator for Records<'_, R> {
    type Item = Result<DecodedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.next_record().transpose()
    }
}

impl<R: Read> FusedIterator for Records<'_, R> {}

/// Iterator owning its [`JazelleReader`].
///
/// Created by [`JazelleReader::into_records()`](crate::JazelleReader::into_records).
pub struct IntoRecords<R: Read> {
    reader: JazelleReader<R>,
}

impl<R: Read> IntoRecords<R> {
    pub(super) fn new(reader: JazelleReader<R>) -> Self {
        Self { reader }
    }

    pub fn reader(&self) -> &JazelleReader<R> {
        &self.reader
    }
}

impl<R: Read> Iterator for IntoRecords<R> {
    type Item = Result<DecodedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.next_record().transpose()
    }
}

impl<R: Read> FusedIterator for IntoRecords<R> {}

impl<R: Read> IntoIterator for JazelleReader<R> {
    type Item = Result<DecodedRecord>;
    type IntoIter = IntoRecords<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_records()
    }
}
