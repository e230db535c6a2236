//! Built-in MiniDST bank layouts.
//!
//! Field names follow the SLD MiniDST bank definitions. Only one generation of
//! these layouts is known, so each one is registered for every version.

use super::layout::{BankLayout, FieldSpec, Scalar};
use crate::jazelle::types::bank::BankId;

/// Monte Carlo header. Its content is not documented; the five words are kept raw.
pub static MCHEAD: &[FieldSpec] = &[FieldSpec::array("raw", Scalar::I32, 5)];

/// Particle summary, 36 bytes.
pub static PHPSUM: &[FieldSpec] = &[
    FieldSpec::i32("id"),
    FieldSpec::f32("px"),
    FieldSpec::f32("py"),
    FieldSpec::f32("pz"),
    FieldSpec::f32("x"),
    FieldSpec::f32("y"),
    FieldSpec::f32("z"),
    FieldSpec::f32("charge"),
    FieldSpec::i32("status"),
];

/// Charged track fit, 240 bytes.
pub static PHCHRG: &[FieldSpec] = &[
    FieldSpec::i32("id"),
    FieldSpec::floats("hlxpar", 6),
    FieldSpec::floats("dhlxpar", 15),
    FieldSpec::f32("bnorm"),
    FieldSpec::f32("impact"),
    FieldSpec::f32("b3norm"),
    FieldSpec::f32("impact3"),
    FieldSpec::i16("charge"),
    FieldSpec::i16("smwstat"),
    FieldSpec::i32("status"),
    FieldSpec::f32("tkpar0"),
    FieldSpec::floats("tkpar", 5),
    FieldSpec::floats("dtkpar", 15),
    FieldSpec::f32("length"),
    FieldSpec::f32("chi2dt"),
    FieldSpec::i16("imc"),
    FieldSpec::i16("ndfdt"),
    FieldSpec::i16("nhit"),
    FieldSpec::i16("nhite"),
    FieldSpec::i16("nhitp"),
    FieldSpec::i16("nmisht"),
    FieldSpec::i16("nwrght"),
    FieldSpec::i16("nhitv"),
    FieldSpec::f32("chi2"),
    FieldSpec::f32("chi2v"),
    FieldSpec::i32("vxdhit"),
    FieldSpec::i16("mustat"),
    FieldSpec::i16("estat"),
    FieldSpec::i32("dedx"),
];

/// Calorimeter cluster, 100 bytes.
pub static PHKLUS: &[FieldSpec] = &[
    FieldSpec::i32("id"),
    FieldSpec::i32("status"),
    FieldSpec::f32("eraw"),
    FieldSpec::f32("cth"),
    FieldSpec::f32("wcth"),
    FieldSpec::f32("phi"),
    FieldSpec::f32("wphi"),
    FieldSpec::floats("elayer", 8),
    FieldSpec::i32("nhit2"),
    FieldSpec::f32("cth2"),
    FieldSpec::f32("wcth2"),
    FieldSpec::f32("phi2"),
    FieldSpec::f32("wphi2"),
    FieldSpec::i32("nhit3"),
    FieldSpec::f32("cth3"),
    FieldSpec::f32("wcth3"),
    FieldSpec::f32("phi3"),
    FieldSpec::f32("wphi3"),
];

/// Warm iron calorimeter (muon) match, 144 bytes with trailing padding.
pub static PHWIC: &[FieldSpec] = &[
    FieldSpec::i32("id"),
    FieldSpec::i16("idstat"),
    FieldSpec::i16("nhit"),
    FieldSpec::i16("nhit45"),
    FieldSpec::i16("npat"),
    FieldSpec::i16("nhitpat"),
    FieldSpec::i16("syshit"),
    FieldSpec::f32("qpinit"),
    FieldSpec::f32("t1"),
    FieldSpec::f32("t2"),
    FieldSpec::f32("t3"),
    FieldSpec::i32("hitmiss"),
    FieldSpec::f32("itrlen"),
    FieldSpec::i16("nlayexp"),
    FieldSpec::i16("nlaybey"),
    FieldSpec::f32("missprob"),
    FieldSpec::i32("phwicid"),
    FieldSpec::i16("nhitshar"),
    FieldSpec::i16("nother"),
    FieldSpec::i32("hitsused"),
    FieldSpec::floats("pref1", 3),
    FieldSpec::floats("pfit", 4),
    FieldSpec::floats("dpfit", 10),
    FieldSpec::f32("chi2"),
    FieldSpec::i16("ndf"),
    FieldSpec::i16("punfit"),
    FieldSpec::f32("matchChi2"),
    FieldSpec::i16("matchNdf"),
    FieldSpec::padding(2),
];

/// A full Cherenkov ring hypothesis block, 36 bytes.
pub static CRIDHYP_FULL: &[FieldSpec] = &[
    FieldSpec::floats("llik", 5),
    FieldSpec::i16("rc"),
    FieldSpec::i16("nhits"),
    FieldSpec::i32("besthyp"),
    FieldSpec::i16("nhexp"),
    FieldSpec::i16("nhfnd"),
    FieldSpec::i16("nhbkg"),
    FieldSpec::i16("mskphot"),
];

/// A hypothesis block for a radiator without a fit, 4 bytes.
pub static CRIDHYP_SHORT: &[FieldSpec] = &[FieldSpec::i16("rc"), FieldSpec::i16("nhits")];

/// Bit of the PHCRID `id` word set when the liquid radiator hypothesis is complete.
pub const CRID_LIQUID: i64 = 0x10000;
/// Bit of the PHCRID `id` word set when the gas radiator hypothesis is complete.
pub const CRID_GAS: i64 = 0x20000;

/// Cherenkov ring imaging, 24 to 88 bytes depending on the control bits in `id`.
pub static PHCRID: &[FieldSpec] = &[
    FieldSpec::i32("id"),
    FieldSpec::f32("norm"),
    FieldSpec::i16("rc"),
    FieldSpec::i16("geom"),
    FieldSpec::i16("trkp"),
    FieldSpec::i16("nhits"),
    FieldSpec::switch("liq", "id", CRID_LIQUID, CRIDHYP_FULL, CRIDHYP_SHORT),
    FieldSpec::switch("gas", "id", CRID_GAS, CRIDHYP_FULL, CRIDHYP_SHORT),
];

/// Track link; only the identifier is stored, 4 bytes.
pub static PHKTRK: &[FieldSpec] = &[FieldSpec::i32("id")];

/// Calorimeter electron identification, 96 bytes.
pub static PHKELID: &[FieldSpec] = &[
    FieldSpec::i32("id"),
    FieldSpec::i16("idstat"),
    FieldSpec::i16("prob"),
    FieldSpec::f32("phi"),
    FieldSpec::f32("theta"),
    FieldSpec::f32("qp"),
    FieldSpec::f32("dphi"),
    FieldSpec::f32("dtheta"),
    FieldSpec::f32("dqp"),
    FieldSpec::f32("tphi"),
    FieldSpec::f32("ttheta"),
    FieldSpec::f32("isolat"),
    FieldSpec::f32("em1"),
    FieldSpec::f32("em12"),
    FieldSpec::f32("dem12"),
    FieldSpec::f32("had1"),
    FieldSpec::f32("emphi"),
    FieldSpec::f32("emtheta"),
    FieldSpec::f32("phiwid"),
    FieldSpec::f32("thewid"),
    FieldSpec::f32("em1x1"),
    FieldSpec::f32("em2x2a"),
    FieldSpec::f32("em2x2b"),
    FieldSpec::f32("em3x3a"),
    FieldSpec::f32("em3x3b"),
];

/// Every built-in layout.
pub fn builtin_layouts() -> Vec<BankLayout> {
    vec![
        BankLayout::any_version(BankId::Mchead, MCHEAD),
        BankLayout::any_version(BankId::Phpsum, PHPSUM),
        BankLayout::any_version(BankId::Phchrg, PHCHRG),
        BankLayout::any_version(BankId::Phklus, PHKLUS),
        BankLayout::any_version(BankId::Phwic, PHWIC),
        BankLayout::any_version(BankId::Phcrid, PHCRID),
        BankLayout::any_version(BankId::Phktrk, PHKTRK),
        BankLayout::any_version(BankId::Phkelid, PHKELID),
    ]
}
