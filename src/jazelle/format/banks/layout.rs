//! Declarative bank entry layouts.
//!
//! A layout is a static list of [`FieldSpec`]s describing one bank entry in
//! file order. Adding a bank or a new bank version means adding a table, not
//! control flow.

use std::ops::RangeInclusive;

use byteorder::{ByteOrder, LittleEndian};

use crate::jazelle::types::bank::BankId;

/// Fixed-width value kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    I16,
    I32,
    I64,
    U16,
    U32,
    /// VAX F_floating, 4 bytes.
    VaxF,
    /// VAX D_floating, 8 bytes.
    VaxD,
}

impl Scalar {
    pub const fn width(self) -> usize {
        match self {
            Scalar::I16 | Scalar::U16 => 2,
            Scalar::I32 | Scalar::U32 | Scalar::VaxF => 4,
            Scalar::I64 | Scalar::VaxD => 8,
        }
    }

    pub const fn is_integer(self) -> bool {
        !matches!(self, Scalar::VaxF | Scalar::VaxD)
    }

    /// Reads an integer scalar from the front of `bytes`.
    pub(crate) fn read_int(self, bytes: &[u8]) -> i64 {
        match self {
            Scalar::I16 => LittleEndian::read_i16(bytes) as i64,
            Scalar::I32 => LittleEndian::read_i32(bytes) as i64,
            Scalar::I64 => LittleEndian::read_i64(bytes),
            Scalar::U16 => LittleEndian::read_u16(bytes) as i64,
            Scalar::U32 => LittleEndian::read_u32(bytes) as i64,
            Scalar::VaxF | Scalar::VaxD => 0,
        }
    }
}

/// What a field holds and how many bytes it takes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Scalar(Scalar),
    /// A fixed number of scalars.
    Array(Scalar, usize),
    /// Fixed-width 8-bit text, trailing whitespace trimmed.
    Text(usize),
    /// Bytes skipped without producing a field.
    Padding(usize),
    /// A group repeated as many times as the integer field `count`, decoded
    /// earlier in the same entry, says.
    Repeated {
        count: &'static str,
        fields: &'static [FieldSpec],
    },
    /// One of two groups, chosen by testing `mask` against the integer field
    /// `control` decoded earlier in the same entry.
    Switch {
        control: &'static str,
        mask: i64,
        set: &'static [FieldSpec],
        clear: &'static [FieldSpec],
    },
}

/// A named field in a layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn scalar(name: &'static str, scalar: Scalar) -> Self {
        Self { name, kind: FieldKind::Scalar(scalar) }
    }

    pub const fn i16(name: &'static str) -> Self {
        Self::scalar(name, Scalar::I16)
    }

    pub const fn i32(name: &'static str) -> Self {
        Self::scalar(name, Scalar::I32)
    }

    pub const fn u32(name: &'static str) -> Self {
        Self::scalar(name, Scalar::U32)
    }

    /// A VAX single precision float.
    pub const fn f32(name: &'static str) -> Self {
        Self::scalar(name, Scalar::VaxF)
    }

    /// A VAX double precision float.
    pub const fn f64(name: &'static str) -> Self {
        Self::scalar(name, Scalar::VaxD)
    }

    pub const fn array(name: &'static str, scalar: Scalar, len: usize) -> Self {
        Self { name, kind: FieldKind::Array(scalar, len) }
    }

    pub const fn floats(name: &'static str, len: usize) -> Self {
        Self::array(name, Scalar::VaxF, len)
    }

    pub const fn text(name: &'static str, len: usize) -> Self {
        Self { name, kind: FieldKind::Text(len) }
    }

    pub const fn padding(len: usize) -> Self {
        Self { name: "", kind: FieldKind::Padding(len) }
    }

    pub const fn repeated(
        name: &'static str,
        count: &'static str,
        fields: &'static [FieldSpec],
    ) -> Self {
        Self { name, kind: FieldKind::Repeated { count, fields } }
    }

    pub const fn switch(
        name: &'static str,
        control: &'static str,
        mask: i64,
        set: &'static [FieldSpec],
        clear: &'static [FieldSpec],
    ) -> Self {
        Self { name, kind: FieldKind::Switch { control, mask, set, clear } }
    }
}

/// A layout registered for one bank identity over a range of versions.
#[derive(Debug, Clone, PartialEq)]
pub struct BankLayout {
    pub id: BankId,
    pub versions: RangeInclusive<u32>,
    pub fields: &'static [FieldSpec],
}

impl BankLayout {
    /// A layout valid for every version.
    pub const fn any_version(id: BankId, fields: &'static [FieldSpec]) -> Self {
        Self { id, versions: 0..=u32::MAX, fields }
    }

    pub fn accepts(&self, id: BankId, version: u32) -> bool {
        self.id == id && self.versions.contains(&version)
    }
}

/// Size of one entry, when it does not depend on the data.
pub fn fixed_size(fields: &[FieldSpec]) -> Option<usize> {
    fields.iter().try_fold(0usize, |total, field| {
        let size = match field.kind {
            FieldKind::Scalar(s) => s.width(),
            FieldKind::Array(s, len) => s.width() * len,
            FieldKind::Text(len) | FieldKind::Padding(len) => len,
            FieldKind::Repeated { .. } | FieldKind::Switch { .. } => return None,
        };
        Some(total + size)
    })
}

/// Fewest bytes `times` entries of this layout can occupy.
///
/// Zero-sized and variable entries count as one byte each, so a count read
/// from the data can never ask for more entries than there are bytes left.
pub fn minimum_size(fields: &[FieldSpec], times: usize) -> usize {
    let each = fixed_size(fields).filter(|&size| size > 0).unwrap_or(1);
    each.saturating_mul(times)
}

/// Measures how many bytes `count` entries of this layout take at the start of `data`.
///
/// Only integer fields referenced by repeats and switches are looked at; no
/// floats are converted. Returns `None` when the entries would run past `data`.
pub fn measure(fields: &[FieldSpec], data: &[u8], count: u32) -> Option<usize> {
    if minimum_size(fields, count as usize) > data.len() {
        return None;
    }
    if let Some(size) = fixed_size(fields) {
        return Some(size * count as usize);
    }

    let mut pos = 0;
    for _ in 0..count {
        measure_group(fields, data, &mut pos)?;
    }
    Some(pos)
}

fn measure_group(fields: &[FieldSpec], data: &[u8], pos: &mut usize) -> Option<()> {
    let mut controls: Vec<(&'static str, i64)> = Vec::new();
    for field in fields {
        match field.kind {
            FieldKind::Scalar(s) => {
                let bytes = data.get(*pos..*pos + s.width())?;
                if s.is_integer() {
                    controls.push((field.name, s.read_int(bytes)));
                }
                *pos += s.width();
            }
            FieldKind::Array(s, len) => *pos += s.width() * len,
            FieldKind::Text(len) | FieldKind::Padding(len) => *pos += len,
            FieldKind::Repeated { count, fields } => {
                let times = usize::try_from(control_value(&controls, count)).ok()?;
                if minimum_size(fields, times) > data.len().saturating_sub(*pos) {
                    return None;
                }
                for _ in 0..times {
                    measure_group(fields, data, pos)?;
                }
            }
            FieldKind::Switch { control, mask, set, clear } => {
                let chosen =
                    if control_value(&controls, control) & mask != 0 { set } else { clear };
                measure_group(chosen, data, pos)?;
            }
        }
        if *pos > data.len() {
            return None;
        }
    }
    Some(())
}

/// Value of the first integer field with this name read earlier in the group.
///
/// Unknown names read as zero. Decoding resolves names the same way.
fn control_value(controls: &[(&'static str, i64)], name: &str) -> i64 {
    controls
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, v)| *v)
        .unwrap_or(0)
}
