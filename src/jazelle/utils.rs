//! Low-level byte reading utilities

use std::io::{self, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use chrono::{DateTime, Utc};
use encoding_rs::WINDOWS_1252;

use super::codec::vax;
use super::types::error::{JazelleError, Result};
use super::types::options::FloatPolicy;

/// Milliseconds between the VMS epoch (1858-11-17) and the Unix epoch, as the
/// Jazelle writer applied it (including its 730 ms skew).
pub const VMS_EPOCH_OFFSET_MS: i64 = 3_506_716_800_730;

/// VMS timestamps count 100 ns ticks.
const TICKS_PER_MS: i64 = 10_000;

/// Splits `len` bytes off the front of the slice.
pub fn take<'a>(reader: &mut &'a [u8], len: usize) -> Result<&'a [u8]> {
    if reader.len() < len {
        return Err(JazelleError::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("need {} bytes, {} left", len, reader.len()),
        )));
    }
    let (head, tail) = reader.split_at(len);
    *reader = tail;
    Ok(head)
}

/// Reads a fixed-width 8-bit text field, trimming trailing whitespace.
pub fn read_text(reader: &mut &[u8], len: usize) -> Result<String> {
    let bytes = take(reader, len)?;
    let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
    Ok(text.trim_end().to_string())
}

/// Reads an 8-byte VMS timestamp.
pub fn read_date(reader: &mut &[u8]) -> Result<DateTime<Utc>> {
    let ticks = reader.read_i64::<LittleEndian>()?;
    vms_ticks_to_utc(ticks)
}

/// Converts a count of VMS 100 ns ticks into a UTC timestamp.
pub fn vms_ticks_to_utc(ticks: i64) -> Result<DateTime<Utc>> {
    let millis = ticks.div_euclid(TICKS_PER_MS) - VMS_EPOCH_OFFSET_MS;
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| {
            JazelleError::InvalidHeader(format!("Timestamp out of range: {} ticks", ticks))
        })
}

/// Reads a VAX F_floating value.
pub fn read_vax_f32(reader: &mut &[u8], policy: FloatPolicy) -> Result<f32> {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(take(reader, 4)?);
    vax::decode_f32_with(bytes, policy)
}

/// Fills `buf` from `source` until it is full or the source is exhausted.
///
/// Unlike `read_exact`, a short read is not an error: the number of bytes
/// actually read is returned so callers can tell a clean end of stream
/// (zero bytes) from a truncated one.
pub fn read_fully<R: Read>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
