//! Codec layer for legacy numeric encodings.
//!
//! # Submodules
//!
//! - [`vax`]: VAX F_floating and D_floating to IEEE-754 conversion

pub mod vax;
