//! CBOR decoding and canonical re-encoding.

#![no_main]

use airgap_proto::cbor;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = cbor::decode(data) else {
        return;
    };
    let Ok(encoded) = cbor::encode(&value) else {
        return;
    };

    // Canonical output is a fixed point of decode then encode
    let reparsed = cbor::decode(&encoded).expect("canonical output must decode");
    let again = cbor::encode(&reparsed).expect("decoded value must encode");
    assert_eq!(encoded, again, "canonical encoding is not stable");
});
