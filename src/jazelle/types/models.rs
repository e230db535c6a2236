//! Core data structures for Jazelle format components.
//!
//! This module defines the fundamental types used throughout the library:
//! - Physical and logical records as they come off the byte stream
//! - File, record and event headers
//! - The MiniDST table of contents and bank directory entries
//! - The fully decoded record handed to consumers

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::bank::{Bank, BankId};

/// Size of a physical record header: record length, reserved word,
/// logical segment length and continuation word (four little-endian u16).
pub const PHYSICAL_HEADER_LEN: usize = 8;

/// A framed physical record read directly from the byte stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalRecord {
    /// Position in the stream, starting at 0, strictly increasing.
    pub index: u64,
    /// Absolute byte offset of the record header.
    pub offset: u64,
    /// The logical segment length word.
    pub segment_length: u16,
    /// This record continues a logical record started earlier.
    pub continued: bool,
    /// The logical record continues in the next physical record.
    pub continues: bool,
    pub payload: Vec<u8>,
}

/// A reassembled logical record before any header interpretation.
///
/// `payload` is the concatenation of the payloads of every physical record
/// that contributed to it. Offsets written in Jazelle headers are relative to
/// a physical record (header included), so the start of each fragment is
/// kept to translate them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// Logical record number; the file header record is 0.
    pub index: u64,
    /// Absolute byte offset of the first physical record.
    pub offset: u64,
    /// Offset in `payload` where each contributing physical record begins.
    pub fragment_starts: Vec<usize>,
    pub payload: Vec<u8>,
}

impl RawRecord {
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn fragment_count(&self) -> usize {
        self.fragment_starts.len()
    }

    /// Translates a (physical record, offset within that physical record)
    /// pair from a Jazelle header into an offset into `payload`.
    ///
    /// The offset counts the 8-byte physical header, as the writer did.
    pub fn locate(&self, record: i32, offset: i32) -> Option<usize> {
        let record = usize::try_from(record).ok()?;
        let offset = usize::try_from(offset).ok()?;
        let start = *self.fragment_starts.get(record)?;
        let end = self
            .fragment_starts
            .get(record + 1)
            .copied()
            .unwrap_or(self.payload.len());
        let within = offset.checked_sub(PHYSICAL_HEADER_LEN)?;
        if start + within > end {
            return None;
        }
        Some(start + within)
    }
}

/// File-level information stored in the first logical record.
#[derive(Debug, Clone, PartialEq)]
pub struct FileMetadata {
    pub name: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    /// The IBM/VAX indicator word written next to the magic.
    pub format_word: i32,
    pub modification_count: i32,
}

/// The fixed header at the start of every logical record after the file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHeader {
    pub recno: i32,
    pub t1: i32,
    pub t2: i32,
    pub target: i32,
    pub rectype: String,
    pub p1: i32,
    pub p2: i32,
    pub format: String,
    pub context: String,
    pub tocrec: i32,
    pub datrec: i32,
    pub tocsiz: i32,
    pub datsiz: i32,
    pub tocoff1: i32,
    pub tocoff2: i32,
    pub tocoff3: i32,
    pub datoff: i32,
    pub segname: String,
    pub usrnam: String,
    pub usroff: i32,
    pub lrecflgs: i32,
    pub spare1: i32,
    pub spare2: i32,
}

/// The IJEVHD user block: event identification.
#[derive(Debug, Clone, PartialEq)]
pub struct EventHeader {
    pub header: i32,
    pub run: i32,
    pub event: i32,
    pub time: DateTime<Utc>,
    pub weight: f32,
    pub event_type: i32,
    pub trigger: i32,
}

/// A logical record with its record header (and event header, when present) parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalRecord {
    pub raw: RawRecord,
    pub header: RecordHeader,
    pub event: Option<EventHeader>,
    /// Payload offset right after the record and event headers.
    pub body_offset: usize,
}

impl LogicalRecord {
    pub fn index(&self) -> u64 {
        self.raw.index
    }

    pub fn run(&self) -> Option<i32> {
        self.event.as_ref().map(|e| e.run)
    }

    pub fn event_number(&self) -> Option<i32> {
        self.event.as_ref().map(|e| e.event)
    }

    pub fn is_minidst(&self) -> bool {
        self.header.format == crate::jazelle::format::directory::MINIDST_FORMAT
    }
}

/// The MiniDST table of contents (PHMTOC).
#[derive(Debug, Clone, PartialEq)]
pub struct Toc {
    pub version: f32,
    /// Entry counts in table order, `NMcPart` through `NPhVxOv`.
    pub counts: [u32; 17],
}

impl Toc {
    /// Number of entries declared for a bank. MCHEAD always has exactly one.
    pub fn count(&self, id: BankId) -> u32 {
        match id {
            BankId::Mchead => 1,
            other => self.counts[other as usize - 1],
        }
    }
}

/// Location of one bank inside a logical record payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankDirectoryEntry {
    pub id: BankId,
    pub version: u32,
    /// Number of entries the bank holds.
    pub count: u32,
    /// Byte offset into the logical record payload.
    pub offset: usize,
    /// Byte length of the bank.
    pub length: usize,
}

impl BankDirectoryEntry {
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

/// The banks located in one MiniDST record.
#[derive(Debug, Clone, PartialEq)]
pub struct Directory {
    pub toc: Toc,
    pub version: u32,
    pub entries: Vec<BankDirectoryEntry>,
}

/// A bank dropped under permissive mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedBank {
    pub id: BankId,
    pub reason: String,
}

/// A logical record fully decoded into banks, as yielded by the record stream.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRecord {
    /// 1-based count of records yielded so far, this one included.
    pub ordinal: u64,
    /// Logical record number in the file.
    pub index: u64,
    pub header: RecordHeader,
    pub event: Option<EventHeader>,
    pub toc: Option<Toc>,
    pub banks: BTreeMap<BankId, Bank>,
    pub skipped: Vec<SkippedBank>,
}

impl DecodedRecord {
    pub fn run(&self) -> Option<i32> {
        self.event.as_ref().map(|e| e.run)
    }

    pub fn event_number(&self) -> Option<i32> {
        self.event.as_ref().map(|e| e.event)
    }

    pub fn bank(&self, id: BankId) -> Option<&Bank> {
        self.banks.get(&id)
    }
}
