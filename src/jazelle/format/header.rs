//! Jazelle file, record and event header parsing.
//!
//! # File Header (first logical record)
//! ```text
//! [8 bytes]  Magic "JAZELLE" (space padded)
//! [4 bytes]  IBM/VAX format word (i32)
//! [8 bytes]  Creation date (VMS ticks)
//! [8 bytes]  Modification date (VMS ticks)
//! [4 bytes]  Modification count (i32)
//! [80 bytes] File name
//! ```
//!
//! Every later logical record starts with a 112-byte record header, followed
//! by the IJEVHD event header when the record header names it as user block.

use byteorder::{LittleEndian, ReadBytesExt};
use log::{debug, trace};

use crate::jazelle::types::error::{JazelleError, Result};
use crate::jazelle::types::models::{
    EventHeader, FileMetadata, LogicalRecord, RawRecord, RecordHeader,
};
use crate::jazelle::types::options::FloatPolicy;
use crate::jazelle::utils;

pub const FILE_MAGIC: &str = "JAZELLE";
pub const FILE_HEADER_LEN: usize = 112;
pub const RECORD_HEADER_LEN: usize = 112;
pub const EVENT_HEADER_LEN: usize = 32;
/// User block name of the event header.
pub const EVENT_BLOCK: &str = "IJEVHD";

/// Parses the file header record into [`FileMetadata`].
pub fn parse_file_header(raw: &RawRecord) -> Result<FileMetadata> {
    if raw.len() < FILE_HEADER_LEN {
        return Err(JazelleError::InvalidHeader(format!(
            "File header record holds {} bytes, expected at least {}",
            raw.len(),
            FILE_HEADER_LEN
        )));
    }
    let mut reader = raw.payload.as_slice();

    let magic = utils::read_text(&mut reader, 8)?;
    if magic != FILE_MAGIC {
        return Err(JazelleError::InvalidHeader(format!(
            "Input is not in JAZELLE format (magic {:?})",
            magic
        )));
    }

    let format_word = reader.read_i32::<LittleEndian>()?;
    let created = utils::read_date(&mut reader)?;
    let modified = utils::read_date(&mut reader)?;
    let modification_count = reader.read_i32::<LittleEndian>()?;
    let name = utils::read_text(&mut reader, 80)?;

    debug!("File header: name='{}', created={}, modified={}", name, created, modified);

    Ok(FileMetadata {
        name,
        created,
        modified,
        format_word,
        modification_count,
    })
}

/// Reads the fixed record header.
pub fn parse_record_header(reader: &mut &[u8]) -> Result<RecordHeader> {
    Ok(RecordHeader {
        recno: reader.read_i32::<LittleEndian>()?,
        t1: reader.read_i32::<LittleEndian>()?,
        t2: reader.read_i32::<LittleEndian>()?,
        target: reader.read_i32::<LittleEndian>()?,
        rectype: utils::read_text(reader, 8)?,
        p1: reader.read_i32::<LittleEndian>()?,
        p2: reader.read_i32::<LittleEndian>()?,
        format: utils::read_text(reader, 8)?,
        context: utils::read_text(reader, 8)?,
        tocrec: reader.read_i32::<LittleEndian>()?,
        datrec: reader.read_i32::<LittleEndian>()?,
        tocsiz: reader.read_i32::<LittleEndian>()?,
        datsiz: reader.read_i32::<LittleEndian>()?,
        tocoff1: reader.read_i32::<LittleEndian>()?,
        tocoff2: reader.read_i32::<LittleEndian>()?,
        tocoff3: reader.read_i32::<LittleEndian>()?,
        datoff: reader.read_i32::<LittleEndian>()?,
        segname: utils::read_text(reader, 8)?,
        usrnam: utils::read_text(reader, 8)?,
        usroff: reader.read_i32::<LittleEndian>()?,
        lrecflgs: reader.read_i32::<LittleEndian>()?,
        spare1: reader.read_i32::<LittleEndian>()?,
        spare2: reader.read_i32::<LittleEndian>()?,
    })
}

/// Reads the IJEVHD event header.
pub fn parse_event_header(reader: &mut &[u8], policy: FloatPolicy) -> Result<EventHeader> {
    Ok(EventHeader {
        header: reader.read_i32::<LittleEndian>()?,
        run: reader.read_i32::<LittleEndian>()?,
        event: reader.read_i32::<LittleEndian>()?,
        time: utils::read_date(reader)?,
        weight: utils::read_vax_f32(reader, policy)?,
        event_type: reader.read_i32::<LittleEndian>()?,
        trigger: reader.read_i32::<LittleEndian>()?,
    })
}

/// Parses the headers at the front of a logical record.
///
/// The event header must sit exactly where the record header says it does
/// (`usroff` in the first physical record) and immediately after the record header.
pub fn interpret(raw: RawRecord, policy: FloatPolicy) -> Result<LogicalRecord> {
    if raw.len() < RECORD_HEADER_LEN {
        return Err(JazelleError::InvalidHeader(format!(
            "Logical record {} holds {} bytes, too short for a record header",
            raw.index,
            raw.len()
        )));
    }

    let mut reader = raw.payload.as_slice();
    let header = parse_record_header(&mut reader)?;
    let mut body_offset = RECORD_HEADER_LEN;

    let event = if header.usrnam == EVENT_BLOCK {
        match raw.locate(0, header.usroff) {
            Some(position) if position == body_offset => {}
            _ => {
                return Err(JazelleError::InvalidHeader(format!(
                    "Inconsistent usroff {} in logical record {}",
                    header.usroff, raw.index
                )));
            }
        }
        if raw.len() < body_offset + EVENT_HEADER_LEN {
            return Err(JazelleError::InvalidHeader(format!(
                "Logical record {} is too short for its event header",
                raw.index
            )));
        }
        let event = parse_event_header(&mut reader, policy)?;
        body_offset += EVENT_HEADER_LEN;
        Some(event)
    } else {
        None
    };

    trace!(
        "Logical record {}: rectype='{}', format='{}', usrnam='{}'",
        raw.index, header.rectype, header.format, header.usrnam
    );

    Ok(LogicalRecord {
        raw,
        header,
        event,
        body_offset,
    })
}
