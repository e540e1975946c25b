//! Registry record decoding.
//!
//! Arbitrary CBOR as every registry type, both as a top-level UR message and
//! as an embedded tagged record.

#![no_main]

use airgap_registry::{Account, EthSignRequest, EthSignature, HdKey, Record, RegistryType};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    for ur_type in Record::UR_TYPES {
        let _ = Record::from_ur_message(ur_type, data);
    }

    let _ = HdKey::from_bytes(data);
    let _ = Account::from_bytes(data);
    let _ = EthSignRequest::from_bytes(data);
    let _ = EthSignature::from_bytes(data);

    if let Ok(value) = airgap_proto::cbor::decode(data) {
        let _ = Record::from_tagged(&value);
        if let Ok(key) = HdKey::from_cbor(&value) {
            let _ = key.uncompressed_key();
        }
    }
});
