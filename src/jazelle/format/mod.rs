//! Jazelle on-disk format, from physical framing up to decoded banks.
//!
//! ```text
//! bytes ─► physical ─► logical ─► header ─► directory ─► banks
//!          framing     reassembly  record/   PHMTOC and   layout-driven
//!                                  event     bank extents decoding
//! ```

pub mod banks;
pub mod directory;
pub mod header;
pub mod logical;
pub mod physical;
