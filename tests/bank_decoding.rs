mod common;

use common::{Bytes, phpsum};
use jazelle_reader::{
    BankDecoder, BankDirectoryEntry, BankId, BankLayout, FieldSpec, FieldValue, FloatPolicy,
    JazelleError, LayoutTable, Scalar,
};
use jazelle_reader::jazelle::format::banks::layout::measure;

fn entry(id: BankId, count: u32, length: usize) -> BankDirectoryEntry {
    BankDirectoryEntry { id, version: 1, count, offset: 0, length }
}

#[test]
fn phpsum_fields_are_decoded_by_name() {
    let mut payload = phpsum(11, [1.0, -2.0, 3.0], -1.0);
    payload.extend(phpsum(12, [0.5, 0.0, 0.0], 0.0));

    let decoder = BankDecoder::new(LayoutTable::builtin(), FloatPolicy::Fail);
    let bank = decoder.decode(&entry(BankId::Phpsum, 2, 72), &payload).unwrap();

    assert_eq!(bank.id, BankId::Phpsum);
    assert_eq!(bank.version, 1);
    assert_eq!(bank.len(), 2);

    let first = &bank.entries[0];
    assert_eq!(first.get("id").and_then(FieldValue::as_int), Some(11));
    assert_eq!(first.get("px").and_then(FieldValue::as_float), Some(1.0));
    assert_eq!(first.get("py").and_then(FieldValue::as_float), Some(-2.0));
    assert_eq!(first.get("pz").and_then(FieldValue::as_float), Some(3.0));
    assert_eq!(first.get("charge").and_then(FieldValue::as_float), Some(-1.0));
    assert_eq!(first.get("status").and_then(FieldValue::as_int), Some(7));
    assert_eq!(bank.entries[1].get("id").and_then(FieldValue::as_int), Some(12));
    assert!(first.get("nonexistent").is_none());
}

#[test]
fn padding_produces_no_field() {
    let payload = vec![0u8; 144];
    let decoder = BankDecoder::new(LayoutTable::builtin(), FloatPolicy::Fail);
    let bank = decoder.decode(&entry(BankId::Phwic, 1, 144), &payload).unwrap();
    let names: Vec<&str> = bank.entries[0].fields.iter().map(|f| f.name).collect();
    assert_eq!(names.last(), Some(&"matchNdf"));
    assert!(!names.contains(&""));
}

#[test]
fn extent_longer_than_the_entries_is_a_length_mismatch() {
    let mut payload = phpsum(1, [1.0, 1.0, 1.0], 1.0);
    payload.extend_from_slice(&[0u8; 4]);

    let decoder = BankDecoder::new(LayoutTable::builtin(), FloatPolicy::Fail);
    match decoder.decode(&entry(BankId::Phpsum, 1, 40), &payload) {
        Err(JazelleError::BankLengthMismatch { bank, expected, found }) => {
            assert_eq!(bank, BankId::Phpsum);
            assert_eq!(expected, 40);
            assert_eq!(found, 36);
        }
        other => panic!("expected BankLengthMismatch, got {:?}", other),
    }
}

#[test]
fn extent_shorter_than_the_entries_is_a_length_mismatch() {
    let payload = phpsum(1, [1.0, 1.0, 1.0], 1.0);
    let decoder = BankDecoder::new(LayoutTable::builtin(), FloatPolicy::Fail);
    match decoder.decode(&entry(BankId::Phpsum, 1, 30), &payload) {
        Err(JazelleError::BankLengthMismatch { expected, found, .. }) => {
            assert_eq!(expected, 30);
            assert!(found > expected, "found {} should exceed the extent", found);
        }
        other => panic!("expected BankLengthMismatch, got {:?}", other),
    }
}

#[test]
fn entry_count_beyond_the_extent_is_a_length_mismatch() {
    let payload = phpsum(1, [1.0, 1.0, 1.0], 1.0);
    let decoder = BankDecoder::new(LayoutTable::builtin(), FloatPolicy::Fail);
    match decoder.decode(&entry(BankId::Phpsum, u32::MAX, 36), &payload) {
        Err(JazelleError::BankLengthMismatch { bank, expected, found }) => {
            assert_eq!(bank, BankId::Phpsum);
            assert_eq!(expected, 36);
            assert_eq!(found, 36 * u32::MAX as usize);
        }
        other => panic!("expected BankLengthMismatch, got {:?}", other),
    }

    // Variable-size layouts are bounded too.
    match decoder.decode(&entry(BankId::Phcrid, u32::MAX, 36), &[0u8; 36]) {
        Err(JazelleError::BankLengthMismatch { expected: 36, found, .. }) => {
            assert!(found > 36, "found {}", found)
        }
        other => panic!("expected BankLengthMismatch, got {:?}", other),
    }
}

#[test]
fn reserved_float_follows_the_policy() {
    let payload = Bytes::new()
        .i32(1)
        .raw(&[0x00, 0x80, 0x00, 0x00])
        .zeros(28)
        .build();

    let strict = BankDecoder::new(LayoutTable::builtin(), FloatPolicy::Fail);
    assert!(matches!(
        strict.decode(&entry(BankId::Phpsum, 1, 36), &payload),
        Err(JazelleError::NumericDecode { width: 32, .. })
    ));

    let lenient = BankDecoder::new(LayoutTable::builtin(), FloatPolicy::Nan);
    let bank = lenient.decode(&entry(BankId::Phpsum, 1, 36), &payload).unwrap();
    assert!(bank.entries[0].get("px").and_then(FieldValue::as_float).unwrap().is_nan());
}

#[test]
fn unregistered_version_is_an_unknown_bank() {
    let payload = vec![0u8; 100];
    let layouts = LayoutTable::builtin().with_versions(BankId::Phklus, 0..=0);
    let decoder = BankDecoder::new(layouts, FloatPolicy::Fail);
    assert!(matches!(
        decoder.decode(&entry(BankId::Phklus, 1, 100), &payload),
        Err(JazelleError::UnknownBank { bank: BankId::Phklus, version: 1 })
    ));
}

static HIT: &[FieldSpec] = &[FieldSpec::i16("layer"), FieldSpec::f32("energy")];
static HIT_LIST: &[FieldSpec] = &[
    FieldSpec::i32("id"),
    FieldSpec::i16("nhits"),
    FieldSpec::repeated("hits", "nhits", HIT),
    FieldSpec::f64("total"),
    FieldSpec::text("tag", 4),
];

#[test]
fn caller_layouts_with_repeated_groups_decode() {
    let layouts = LayoutTable::builtin().with(BankLayout {
        id: BankId::Phpoint,
        versions: 1..=3,
        fields: HIT_LIST,
    });
    let payload = Bytes::new()
        .i32(77)
        .i16(2)
        .i16(4)
        .f32(1.5)
        .i16(5)
        .f32(2.5)
        .f64(4.0)
        .raw(b"ECAL")
        .build();
    assert_eq!(payload.len(), 4 + 2 + 12 + 8 + 4);

    let decoder = BankDecoder::new(layouts.clone(), FloatPolicy::Fail);
    let bank = decoder
        .decode(&entry(BankId::Phpoint, 1, payload.len()), &payload)
        .unwrap();
    let first = &bank.entries[0];

    match first.get("hits") {
        Some(FieldValue::Groups(groups)) => {
            assert_eq!(groups.len(), 2);
            assert_eq!(groups[1][0].value.as_int(), Some(5));
            assert_eq!(groups[1][1].value.as_float(), Some(2.5));
        }
        other => panic!("expected repeated hits, got {:?}", other),
    }
    assert_eq!(first.get("total").and_then(FieldValue::as_double), Some(4.0));
    assert_eq!(first.get("tag").and_then(FieldValue::as_text), Some("ECAL"));

    // Sizing follows the same walk.
    let structure = layouts.structure(BankId::Phpoint).unwrap();
    assert_eq!(
        measure(structure.fields, &payload, 1),
        Some(payload.len())
    );

    // Outside the registered versions the bank is unknown.
    let newer = BankDirectoryEntry { version: 4, ..entry(BankId::Phpoint, 1, payload.len()) };
    assert!(matches!(decoder.decode(&newer, &payload), Err(JazelleError::UnknownBank { .. })));
}

#[test]
fn later_registrations_take_precedence() {
    static ID_ONLY: &[FieldSpec] =
        &[FieldSpec::i32("id"), FieldSpec::array("rest", Scalar::I32, 8)];
    let layouts = LayoutTable::builtin().with(BankLayout::any_version(BankId::Phpsum, ID_ONLY));
    let decoder = BankDecoder::new(layouts, FloatPolicy::Fail);

    let payload = phpsum(3, [1.0, 2.0, 3.0], 0.0);
    let bank = decoder.decode(&entry(BankId::Phpsum, 1, 36), &payload).unwrap();
    assert!(bank.entries[0].get("px").is_none());
    assert!(matches!(
        bank.entries[0].get("rest"),
        Some(FieldValue::Ints(words)) if words.len() == 8
    ));
}

static NOTHING: &[FieldSpec] = &[];
static COUNTED_NOTHING: &[FieldSpec] =
    &[FieldSpec::i32("n"), FieldSpec::repeated("xs", "n", NOTHING)];

#[test]
fn repeat_count_beyond_the_extent_is_a_length_mismatch() {
    let layouts = LayoutTable::builtin()
        .with(BankLayout::any_version(BankId::Phpoint, COUNTED_NOTHING))
        .with(BankLayout::any_version(BankId::Phwmc, HIT_LIST));
    let decoder = BankDecoder::new(layouts, FloatPolicy::Fail);

    let empty_groups = Bytes::new().i32(i32::MAX).build();
    match decoder.decode(&entry(BankId::Phpoint, 1, 4), &empty_groups) {
        Err(JazelleError::BankLengthMismatch { expected: 4, found, .. }) => {
            assert_eq!(found, 4 + i32::MAX as usize)
        }
        other => panic!("expected BankLengthMismatch, got {:?}", other),
    }
    assert_eq!(measure(COUNTED_NOTHING, &empty_groups, 1), None);

    // Six bytes per hit, only one hit's worth present.
    let hits = Bytes::new()
        .i32(1)
        .i16(i16::MAX)
        .i16(1)
        .f32(1.0)
        .f64(0.0)
        .raw(b"HCAL")
        .build();
    match decoder.decode(&entry(BankId::Phwmc, 1, hits.len()), &hits) {
        Err(JazelleError::BankLengthMismatch { found, .. }) => {
            assert_eq!(found, 6 + 6 * i16::MAX as usize)
        }
        other => panic!("expected BankLengthMismatch, got {:?}", other),
    }
    assert_eq!(measure(HIT_LIST, &hits, 1), None);

    let negative = Bytes::new().i32(-1).build();
    assert!(matches!(
        decoder.decode(&entry(BankId::Phpoint, 1, 4), &negative),
        Err(JazelleError::BankLengthMismatch { .. })
    ));
    assert_eq!(measure(COUNTED_NOTHING, &negative, 1), None);
}

static SHADOWED_COUNT: &[FieldSpec] = &[
    FieldSpec::i16("n"),
    FieldSpec::i16("n"),
    FieldSpec::repeated("hits", "n", HIT),
];

#[test]
fn repeated_control_names_resolve_to_the_first_field() {
    let layouts =
        LayoutTable::builtin().with(BankLayout::any_version(BankId::Phpoint, SHADOWED_COUNT));
    let payload = Bytes::new().i16(1).i16(2).i16(3).f32(0.5).build();

    assert_eq!(measure(SHADOWED_COUNT, &payload, 1), Some(payload.len()));

    let decoder = BankDecoder::new(layouts, FloatPolicy::Fail);
    let bank = decoder
        .decode(&entry(BankId::Phpoint, 1, payload.len()), &payload)
        .unwrap();
    match bank.entries[0].get("hits") {
        Some(FieldValue::Groups(groups)) => {
            assert_eq!(groups.len(), 1);
            assert_eq!(groups[0][0].value.as_int(), Some(3));
        }
        other => panic!("expected one hit, got {:?}", other),
    }
}

#[test]
fn empty_table_knows_no_banks() {
    let layouts = LayoutTable::empty();
    assert!(layouts.is_empty());
    assert!(layouts.structure(BankId::Phpsum).is_none());

    let decoder = BankDecoder::new(layouts, FloatPolicy::Fail);
    assert!(matches!(
        decoder.decode(&entry(BankId::Phpsum, 1, 36), &phpsum(1, [0.0; 3], 0.0)),
        Err(JazelleError::UnknownBank { bank: BankId::Phpsum, version: 1 })
    ));
}

#[test]
fn removed_layouts_are_no_longer_found() {
    let builtin = LayoutTable::builtin();
    let trimmed = builtin.clone().without(BankId::Phklus);
    assert_eq!(trimmed.len(), builtin.len() - 1);
    assert!(trimmed.lookup(BankId::Phklus, 1).is_none());
    assert!(trimmed.structure(BankId::Phklus).is_none());
    assert!(trimmed.lookup(BankId::Phpsum, 1).is_some());
}
