//! # jazelle-reader
//!
//! A reader for SLD Jazelle files in the MiniDST format.
//!
//! The decoding pipeline runs strictly forward over any [`std::io::Read`] source:
//! physical records are framed, reassembled into logical records, their
//! record and event headers parsed, the MiniDST banks located and decoded
//! through declarative layouts, with VAX floats converted to IEEE-754.
pub mod jazelle;

// Re-export the main types for convenience
pub use jazelle::{
    codec::vax,
    format::banks::{BankDecoder, BankLayout, FieldKind, FieldSpec, LayoutTable, Scalar},
    iter::{IntoRecords, Records},
    reader::JazelleReader,
    types::{
        bank::{Bank, BankId, Entry, Field, FieldValue},
        error::{JazelleError, Result},
        models::{
            BankDirectoryEntry, DecodedRecord, Directory, EventHeader, FileMetadata, LogicalRecord,
            RawRecord, RecordHeader, SkippedBank, Toc,
        },
        options::{FloatPolicy, ReaderOptions, Strictness},
    },
};
