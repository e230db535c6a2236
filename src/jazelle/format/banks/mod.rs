//! Bank layouts and the table that selects one per bank identity and version.

pub mod decoder;
pub mod layout;
pub mod minidst;

use log::debug;

use crate::jazelle::types::bank::BankId;

pub use decoder::BankDecoder;
pub use layout::{BankLayout, FieldKind, FieldSpec, Scalar};

/// Registry of bank layouts.
///
/// Later registrations take precedence over earlier ones, so a caller can
/// override a built-in layout for a range of versions without removing it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutTable {
    layouts: Vec<BankLayout>,
}

impl LayoutTable {
    /// A table with no layouts at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The MiniDST layouts this crate knows about.
    pub fn builtin() -> Self {
        Self {
            layouts: minidst::builtin_layouts(),
        }
    }

    pub fn register(&mut self, layout: BankLayout) -> &mut Self {
        debug!(
            "Registering layout for {} versions {:?} ({} fields)",
            layout.id,
            layout.versions,
            layout.fields.len()
        );
        self.layouts.push(layout);
        self
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, layout: BankLayout) -> Self {
        self.register(layout);
        self
    }

    /// Restricts every layout registered for `id` to the given versions.
    pub fn with_versions(mut self, id: BankId, versions: std::ops::RangeInclusive<u32>) -> Self {
        for layout in self.layouts.iter_mut().filter(|l| l.id == id) {
            layout.versions = versions.clone();
        }
        self
    }

    /// Drops every layout registered for `id`.
    pub fn without(mut self, id: BankId) -> Self {
        self.layouts.retain(|l| l.id != id);
        self
    }

    /// The layout used to decode `id` at `version`.
    pub fn lookup(&self, id: BankId, version: u32) -> Option<&BankLayout> {
        self.layouts.iter().rev().find(|l| l.accepts(id, version))
    }

    /// The most recently registered layout for `id`, whatever its versions.
    ///
    /// Used to size banks in the data block. Entry sizes are a property of the
    /// bank identity; a version with no registered layout is still located, and
    /// only fails when decoded.
    pub fn structure(&self, id: BankId) -> Option<&BankLayout> {
        self.layouts.iter().rev().find(|l| l.id == id)
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }
}
