//! MiniDST bank directory.
//!
//! A MiniDST record carries no explicit bank offsets. Its PHMTOC table of
//! contents gives a format version and one entry count per bank; the banks
//! then follow each other in a fixed order inside the data block, so their
//! extents are recovered by measuring each one in turn.
//!
//! # PHMTOC (72 bytes)
//! ```text
//! [4 bytes]  Version (VAX F_floating)
//! [68 bytes] 17 entry counts (i32): MCPART, PHPSUM, PHCHRG, PHKLUS, PHKTRK,
//!            PHWIC, PHWMC, PHCRID, PHPOINT, MCPNT, PHKMC1, PHKCHRG, PHBM,
//!            PHEVCL, MCBEAM, PHKELID, PHVXOV
//! ```
//!
//! # Data block order
//! ```text
//! MCHEAD, MCPART, PHPSUM, PHCHRG, PHKLUS, PHWIC, PHCRID, PHKTRK, PHKELID,
//! then PHWMC, PHPOINT, MCPNT, PHKMC1, PHKCHRG, PHBM, PHEVCL, MCBEAM, PHVXOV
//! ```

use byteorder::{LittleEndian, ReadBytesExt};
use log::{debug, trace};

use super::banks::{LayoutTable, layout};
use crate::jazelle::codec::vax;
use crate::jazelle::types::bank::BankId;
use crate::jazelle::types::error::{JazelleError, Result};
use crate::jazelle::types::models::{BankDirectoryEntry, Directory, LogicalRecord, Toc};
use crate::jazelle::utils;

pub const MINIDST_FORMAT: &str = "MINIDST";
pub const TOC_LEN: usize = 72;

/// Order in which banks are laid out in the data block.
pub const DATA_ORDER: [BankId; 18] = [
    BankId::Mchead,
    BankId::Mcpart,
    BankId::Phpsum,
    BankId::Phchrg,
    BankId::Phklus,
    BankId::Phwic,
    BankId::Phcrid,
    BankId::Phktrk,
    BankId::Phkelid,
    BankId::Phwmc,
    BankId::Phpoint,
    BankId::Mcpnt,
    BankId::Phkmc1,
    BankId::Phkchrg,
    BankId::Phbm,
    BankId::Phevcl,
    BankId::Mcbeam,
    BankId::Phvxov,
];

/// Reads the PHMTOC table of contents.
pub fn parse_toc(reader: &mut &[u8]) -> Result<Toc> {
    let mut version = [0u8; 4];
    version.copy_from_slice(utils::take(reader, 4)?);
    let version = vax::decode_f32(version)?;

    let mut counts = [0u32; 17];
    for count in counts.iter_mut() {
        let raw = reader.read_i32::<LittleEndian>()?;
        *count = u32::try_from(raw).map_err(|_| {
            JazelleError::InvalidHeader(format!("Negative bank count {} in table of contents", raw))
        })?;
    }
    Ok(Toc { version, counts })
}

/// Locates every bank of a MiniDST record.
///
/// Returns `None` for records in any other format; they carry no banks.
///
/// # Errors
/// Returns [`JazelleError::Directory`] if the table of contents is not where
/// the header says, if a bank runs past the data block, if bytes of the data
/// block are left unclaimed, or if two extents overlap.
pub fn parse(record: &LogicalRecord, layouts: &LayoutTable) -> Result<Option<Directory>> {
    if !record.is_minidst() {
        trace!("Logical record {} has format '{}', no banks", record.index(), record.header.format);
        return Ok(None);
    }

    let index = record.index();
    let fail = |reason: String| JazelleError::Directory { record: index, reason };
    let raw = &record.raw;
    let header = &record.header;

    let toc_start = raw
        .locate(header.tocrec, header.tocoff1)
        .ok_or_else(|| {
            fail(format!(
                "table of contents offset ({}, {}) is outside the record",
                header.tocrec, header.tocoff1
            ))
        })?;
    if toc_start != record.body_offset {
        return Err(fail(format!(
            "table of contents at byte {}, expected right after the headers at byte {}",
            toc_start, record.body_offset
        )));
    }
    let mut reader = raw
        .payload
        .get(toc_start..toc_start + TOC_LEN)
        .ok_or_else(|| fail("record too short for its table of contents".to_string()))?;
    let toc = parse_toc(&mut reader)
        .map_err(|e| fail(format!("unreadable table of contents: {}", e)))?;

    if !toc.version.is_finite() || toc.version < 0.0 {
        return Err(fail(format!("implausible MiniDST version {}", toc.version)));
    }
    let version = toc.version.trunc() as u32;

    let data_start = raw
        .locate(header.datrec, header.datoff)
        .ok_or_else(|| {
            fail(format!(
                "data offset ({}, {}) is outside the record",
                header.datrec, header.datoff
            ))
        })?;
    let data_len = usize::try_from(header.datsiz)
        .map_err(|_| fail(format!("negative data size {}", header.datsiz)))?;
    let data_end = data_start + data_len;
    let data = raw
        .payload
        .get(data_start..data_end)
        .ok_or_else(|| fail(format!("data block of {} bytes runs past the record", data_len)))?;

    let entries = walk(&toc, version, data, data_start, layouts).map_err(fail)?;
    verify_extents(index, &entries, raw.len())?;

    debug!(
        "Logical record {}: MiniDST version {}, {} banks in {} bytes",
        index,
        version,
        entries.len(),
        data_len
    );
    Ok(Some(Directory { toc, version, entries }))
}

/// Measures the banks of `data` in data block order.
fn walk(
    toc: &Toc,
    version: u32,
    data: &[u8],
    base: usize,
    layouts: &LayoutTable,
) -> std::result::Result<Vec<BankDirectoryEntry>, String> {
    let mut entries = Vec::new();
    let mut pos = 0;

    for id in DATA_ORDER {
        let count = toc.count(id);
        if count == 0 {
            continue;
        }
        let rest = &data[pos..];
        let structure = layouts.structure(id);
        let length = match structure {
            Some(structure) => layout::measure(structure.fields, rest, count).ok_or_else(|| {
                format!(
                    "bank {} with {} entries runs past the end of the data block",
                    id, count
                )
            })?,
            None => rest.len(),
        };

        entries.push(BankDirectoryEntry {
            id,
            version,
            count,
            offset: base + pos,
            length,
        });
        pos += length;

        if structure.is_none() {
            // Nothing after a bank of unknown structure can be located.
            debug!("Bank {} has no known structure; it takes the remaining {} bytes", id, length);
            break;
        }
    }

    if pos != data.len() {
        return Err(format!(
            "{} bytes at the end of the data block are not claimed by any bank",
            data.len() - pos
        ));
    }
    Ok(entries)
}

/// Checks that bank extents lie within `extent` bytes and do not overlap.
pub fn verify_extents(record: u64, entries: &[BankDirectoryEntry], extent: usize) -> Result<()> {
    let mut sorted: Vec<&BankDirectoryEntry> = entries.iter().collect();
    sorted.sort_by_key(|e| (e.offset, e.end()));

    let mut previous: Option<&BankDirectoryEntry> = None;
    for entry in sorted {
        if entry.end() > extent {
            return Err(JazelleError::Directory {
                record,
                reason: format!(
                    "bank {} [{}..{}) lies outside the {}-byte payload",
                    entry.id,
                    entry.offset,
                    entry.end(),
                    extent
                ),
            });
        }
        if let Some(prev) = previous
            && entry.offset < prev.end()
        {
            return Err(JazelleError::Directory {
                record,
                reason: format!(
                    "bank {} [{}..{}) overlaps bank {} [{}..{})",
                    entry.id,
                    entry.offset,
                    entry.end(),
                    prev.id,
                    prev.offset,
                    prev.end()
                ),
            });
        }
        previous = Some(entry);
    }
    Ok(())
}
