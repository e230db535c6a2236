//! Bank identities and decoded bank contents.
//!
//! A MiniDST event carries its physics content in "banks": arrays of fixed or
//! variable sized entries, each made of named fields. Decoded banks are plain
//! owned values; nothing in them refers back to the record buffer.

use std::fmt;

/// Identity of a MiniDST bank.
///
/// The variants follow the counter order of the MiniDST table of contents,
/// with `Mchead` (the Monte Carlo header, always present) first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BankId {
    Mchead,
    Mcpart,
    Phpsum,
    Phchrg,
    Phklus,
    Phktrk,
    Phwic,
    Phwmc,
    Phcrid,
    Phpoint,
    Mcpnt,
    Phkmc1,
    Phkchrg,
    Phbm,
    Phevcl,
    Mcbeam,
    Phkelid,
    Phvxov,
}

impl BankId {
    /// The bank name as written in SLD documentation.
    pub fn name(&self) -> &'static str {
        match self {
            BankId::Mchead => "MCHEAD",
            BankId::Mcpart => "MCPART",
            BankId::Phpsum => "PHPSUM",
            BankId::Phchrg => "PHCHRG",
            BankId::Phklus => "PHKLUS",
            BankId::Phktrk => "PHKTRK",
            BankId::Phwic => "PHWIC",
            BankId::Phwmc => "PHWMC",
            BankId::Phcrid => "PHCRID",
            BankId::Phpoint => "PHPOINT",
            BankId::Mcpnt => "MCPNT",
            BankId::Phkmc1 => "PHKMC1",
            BankId::Phkchrg => "PHKCHRG",
            BankId::Phbm => "PHBM",
            BankId::Phevcl => "PHEVCL",
            BankId::Mcbeam => "MCBEAM",
            BankId::Phkelid => "PHKELID",
            BankId::Phvxov => "PHVXOV",
        }
    }
}

impl fmt::Display for BankId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single decoded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Float(f32),
    Double(f64),
    Text(String),
    Ints(Vec<i64>),
    Floats(Vec<f32>),
    Doubles(Vec<f64>),
    /// A nested structure, e.g. one PHCRID hypothesis.
    Group(Vec<Field>),
    /// A repeated structure whose count was read earlier in the same entry.
    Groups(Vec<Vec<Field>>),
}

impl FieldValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            FieldValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            FieldValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_floats(&self) -> Option<&[f32]> {
        match self {
            FieldValue::Floats(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&[Field]> {
        match self {
            FieldValue::Group(v) => Some(v),
            _ => None,
        }
    }
}

/// A named field inside a bank entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub value: FieldValue,
}

/// Looks up a field by name in a decoded field list.
pub fn find_field<'a>(fields: &'a [Field], name: &str) -> Option<&'a FieldValue> {
    fields.iter().find(|f| f.name == name).map(|f| &f.value)
}

/// One entry (row) of a bank.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub fields: Vec<Field>,
}

impl Entry {
    /// Returns the value of the named field, if the layout declares it.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        find_field(&self.fields, name)
    }
}

/// A decoded bank: identity plus its entries in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct Bank {
    pub id: BankId,
    pub version: u32,
    pub entries: Vec<Entry>,
}

impl Bank {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
