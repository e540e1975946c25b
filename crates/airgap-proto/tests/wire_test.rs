//! Property tests for the wire layer.
//!
//! Scanned input is untrusted, so the interesting properties are that
//! decoders never panic on garbage and that corruption is always detected.

use airgap_proto::{
    DecodeError, Part, Ur, UrBody, UrType,
    bytewords::{self, Style},
    cbor::{self, MapBuilder, Value},
    encode_part,
};
use proptest::prelude::*;

fn leaf_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<u64>().prop_map(cbor::uint),
        prop::collection::vec(any::<u8>(), 0..40).prop_map(cbor::bytes),
        "[a-z ]{0,20}".prop_map(cbor::text),
        any::<bool>().prop_map(Value::Bool),
    ]
}

proptest! {
    #[test]
    fn prop_cbor_decode_never_panics(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = cbor::decode(&data);
    }

    /// Map encoding must not depend on insertion order.
    #[test]
    fn prop_map_encoding_is_order_independent(
        entries in prop::collection::btree_map(0..1000u64, leaf_strategy(), 0..12)
    ) {
        let forward = entries
            .iter()
            .fold(MapBuilder::new(), |m, (k, v)| m.insert(*k, v.clone()))
            .build();
        let backward = entries
            .iter()
            .rev()
            .fold(MapBuilder::new(), |m, (k, v)| m.insert(*k, v.clone()))
            .build();

        let a = cbor::encode(&forward).unwrap();
        let b = cbor::encode(&backward).unwrap();
        prop_assert_eq!(&a, &b);

        // Decoding canonical output and encoding again is a fixed point.
        let again = cbor::encode(&cbor::decode(&a).unwrap()).unwrap();
        prop_assert_eq!(a, again);
    }

    #[test]
    fn prop_ur_parse_never_panics(text in "[uU][rR]:[a-zA-Z-]{1,12}(/[0-9]{1,3}-[0-9]{1,3})?/[a-zA-Z]{0,80}") {
        let _ = Ur::parse(&text);
    }

    /// Changing any single letter of a minimal bytewords body is caught,
    /// either as an unknown word or by the checksum.
    #[test]
    fn prop_bytewords_corruption_is_detected(
        data in prop::collection::vec(any::<u8>(), 1..64),
        position in any::<prop::sample::Index>(),
        replacement in b'a'..=b'z',
    ) {
        let encoded = bytewords::encode(&data, Style::Minimal);
        let mut corrupted = encoded.into_bytes();
        let i = position.index(corrupted.len());
        prop_assume!(corrupted[i] != replacement);
        corrupted[i] = replacement;

        let corrupted = String::from_utf8(corrupted).unwrap();
        prop_assert!(matches!(
            bytewords::decode(&corrupted, Style::Minimal),
            Err(DecodeError::InvalidBytewords(_))
        ));
    }
}

#[test]
fn multi_part_string_carries_header_and_fragment() {
    let ur_type = UrType::new("bytes").unwrap();
    let part = Part {
        seq_num: 12,
        seq_len: 3,
        message_len: 25,
        checksum: 0x1234_5678,
        data: (0u8..9).collect(),
    };

    let text = encode_part(&ur_type, &part).unwrap();
    assert!(text.starts_with("UR:BYTES/12-3/"));

    let parsed = Ur::parse(&text).unwrap();
    assert_eq!(parsed.ur_type, ur_type);
    assert_eq!(parsed.body, UrBody::Multi(part));
}

#[test]
fn oversized_document_is_refused() {
    let data = vec![0u8; cbor::MAX_DOCUMENT_LEN + 1];
    assert!(matches!(cbor::decode(&data), Err(DecodeError::InvalidLength(_))));
}
