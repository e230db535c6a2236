//! Layout-driven bank decoding.

use log::trace;

use super::LayoutTable;
use super::layout::{FieldKind, FieldSpec, Scalar, minimum_size};
use crate::jazelle::codec::vax;
use crate::jazelle::types::bank::{Bank, BankId, Entry, Field, FieldValue, find_field};
use crate::jazelle::types::error::{JazelleError, Result};
use crate::jazelle::types::models::BankDirectoryEntry;
use crate::jazelle::types::options::FloatPolicy;

/// Decodes located banks into typed entries.
#[derive(Debug, Clone)]
pub struct BankDecoder {
    layouts: LayoutTable,
    float_policy: FloatPolicy,
}

/// What a single bank decode needs to report errors.
struct Context {
    bank: BankId,
    extent: usize,
    float_policy: FloatPolicy,
}

impl BankDecoder {
    pub fn new(layouts: LayoutTable, float_policy: FloatPolicy) -> Self {
        Self { layouts, float_policy }
    }

    pub fn layouts(&self) -> &LayoutTable {
        &self.layouts
    }

    /// Decodes the bank described by `entry` out of a logical record payload.
    ///
    /// # Errors
    /// - [`JazelleError::UnknownBank`] when no layout covers the bank's identity and version
    /// - [`JazelleError::BankLengthMismatch`] when the entries do not fill the extent exactly
    /// - [`JazelleError::NumericDecode`] for a reserved float under [`FloatPolicy::Fail`]
    pub fn decode(&self, entry: &BankDirectoryEntry, payload: &[u8]) -> Result<Bank> {
        let layout = self
            .layouts
            .lookup(entry.id, entry.version)
            .ok_or(JazelleError::UnknownBank {
                bank: entry.id,
                version: entry.version,
            })?;

        let bytes = payload
            .get(entry.offset..entry.end())
            .ok_or(JazelleError::BankLengthMismatch {
                bank: entry.id,
                expected: entry.length,
                found: payload.len().saturating_sub(entry.offset),
            })?;

        let ctx = Context {
            bank: entry.id,
            extent: entry.length,
            float_policy: self.float_policy,
        };
        let least = minimum_size(layout.fields, entry.count as usize);
        if least > bytes.len() {
            return Err(ctx.mismatch(least));
        }

        let mut reader = bytes;
        let mut entries = Vec::with_capacity(entry.count as usize);
        for _ in 0..entry.count {
            let fields = decode_group(layout.fields, &mut reader, &ctx)?;
            entries.push(Entry { fields });
        }

        if !reader.is_empty() {
            return Err(ctx.mismatch(entry.length - reader.len()));
        }

        trace!("Decoded {} with {} entries ({} bytes)", entry.id, entries.len(), entry.length);
        Ok(Bank {
            id: entry.id,
            version: entry.version,
            entries,
        })
    }
}

impl Context {
    fn mismatch(&self, found: usize) -> JazelleError {
        JazelleError::BankLengthMismatch {
            bank: self.bank,
            expected: self.extent,
            found,
        }
    }

    /// Bytes of the extent consumed so far plus `more`.
    fn reaching(&self, reader: &[u8], more: usize) -> usize {
        (self.extent - reader.len()).saturating_add(more)
    }
}

/// Takes `len` bytes off the front of the reader, or reports how far past the extent they reach.
fn claim<'a>(reader: &mut &'a [u8], len: usize, ctx: &Context) -> Result<&'a [u8]> {
    if reader.len() < len {
        return Err(ctx.mismatch(ctx.reaching(reader, len)));
    }
    let (head, tail) = reader.split_at(len);
    *reader = tail;
    Ok(head)
}

fn decode_group(fields: &[FieldSpec], reader: &mut &[u8], ctx: &Context) -> Result<Vec<Field>> {
    let mut out: Vec<Field> = Vec::with_capacity(fields.len());
    for spec in fields {
        let value = match spec.kind {
            FieldKind::Scalar(scalar) => decode_scalar(scalar, reader, ctx)?,
            FieldKind::Array(scalar, len) => decode_array(scalar, len, reader, ctx)?,
            FieldKind::Text(len) => {
                let bytes = claim(reader, len, ctx)?;
                let (text, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(bytes);
                FieldValue::Text(text.trim_end().to_string())
            }
            FieldKind::Padding(len) => {
                claim(reader, len, ctx)?;
                continue;
            }
            FieldKind::Repeated { count, fields } => {
                let times = usize::try_from(control_value(&out, count))
                    .map_err(|_| ctx.mismatch(ctx.reaching(reader, 0)))?;
                let least = minimum_size(fields, times);
                if least > reader.len() {
                    return Err(ctx.mismatch(ctx.reaching(reader, least)));
                }
                let mut groups = Vec::with_capacity(times);
                for _ in 0..times {
                    groups.push(decode_group(fields, reader, ctx)?);
                }
                FieldValue::Groups(groups)
            }
            FieldKind::Switch { control, mask, set, clear } => {
                let chosen = if control_value(&out, control) & mask != 0 { set } else { clear };
                FieldValue::Group(decode_group(chosen, reader, ctx)?)
            }
        };
        out.push(Field { name: spec.name, value });
    }
    Ok(out)
}

fn decode_scalar(scalar: Scalar, reader: &mut &[u8], ctx: &Context) -> Result<FieldValue> {
    let bytes = claim(reader, scalar.width(), ctx)?;
    Ok(match scalar {
        Scalar::VaxF => FieldValue::Float(decode_f(bytes, ctx)?),
        Scalar::VaxD => FieldValue::Double(decode_d(bytes, ctx)?),
        int => FieldValue::Int(int.read_int(bytes)),
    })
}

fn decode_array(
    scalar: Scalar,
    len: usize,
    reader: &mut &[u8],
    ctx: &Context,
) -> Result<FieldValue> {
    let bytes = claim(reader, scalar.width() * len, ctx)?;
    let chunks = bytes.chunks_exact(scalar.width());
    Ok(match scalar {
        Scalar::VaxF => {
            FieldValue::Floats(chunks.map(|c| decode_f(c, ctx)).collect::<Result<_>>()?)
        }
        Scalar::VaxD => {
            FieldValue::Doubles(chunks.map(|c| decode_d(c, ctx)).collect::<Result<_>>()?)
        }
        int => FieldValue::Ints(chunks.map(|c| int.read_int(c)).collect()),
    })
}

fn decode_f(bytes: &[u8], ctx: &Context) -> Result<f32> {
    let mut word = [0u8; 4];
    word.copy_from_slice(bytes);
    vax::decode_f32_with(word, ctx.float_policy)
}

fn decode_d(bytes: &[u8], ctx: &Context) -> Result<f64> {
    let mut word = [0u8; 8];
    word.copy_from_slice(bytes);
    vax::decode_f64_with(word, ctx.float_policy)
}

fn control_value(decoded: &[Field], name: &str) -> i64 {
    find_field(decoded, name)
        .and_then(FieldValue::as_int)
        .unwrap_or(0)
}
