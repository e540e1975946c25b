//! Fountain transport against reference vectors and random schedules.

use std::time::{Duration, Instant};

use airgap_core::{
    DecoderConfig, EncoderConfig, FountainDecoder, FountainEncoder, FountainRng, Reception,
    UrDecoder, UrEncoder, choose_fragments,
};
use airgap_proto::{DecodeError, Part, UrType};
use proptest::prelude::*;

/// 256 bytes from the "Wolf" seed, wrapped as a CBOR byte string.
fn wolf_message() -> Vec<u8> {
    let mut message = vec![0x59, 0x01, 0x00];
    message.extend(FountainRng::from_seed_bytes(b"Wolf").next_bytes(256));
    message
}

const WOLF_PARTS: [&str; 12] = [
    "ur:bytes/1-9/lpadascfadaxcywenbpljkhdcahkadaemejtswhhylkepmykhhtsytsnoyoyaxaedsuttydmmhhpktpmsrjtdkgslpgh",
    "ur:bytes/2-9/lpaoascfadaxcywenbpljkhdcagwdpfnsboxgwlbaawzuefywkdplrsrjynbvygabwjldapfcsgmghhkhstlrdcxaefz",
    "ur:bytes/3-9/lpaxascfadaxcywenbpljkhdcahelbknlkuejnbadmssfhfrdpsbiegecpasvssovlgeykssjykklronvsjksopdzmol",
    "ur:bytes/4-9/lpaaascfadaxcywenbpljkhdcasotkhemthydawydtaxneurlkosgwcekonertkbrlwmplssjtammdplolsbrdzcrtas",
    "ur:bytes/5-9/lpahascfadaxcywenbpljkhdcatbbdfmssrkzmcwnezelennjpfzbgmuktrhtejscktelgfpdlrkfyfwdajldejokbwf",
    "ur:bytes/6-9/lpamascfadaxcywenbpljkhdcackjlhkhybssklbwefectpfnbbectrljectpavyrolkzczcpkmwidmwoxkilghdsowp",
    "ur:bytes/7-9/lpatascfadaxcywenbpljkhdcavszmwnjkwtclrtvaynhpahrtoxmwvwatmedibkaegdosftvandiodagdhthtrlnnhy",
    "ur:bytes/8-9/lpayascfadaxcywenbpljkhdcadmsponkkbbhgsoltjntegepmttmoonftnbuoiyrehfrtsabzsttorodklubbuyaetk",
    "ur:bytes/9-9/lpasascfadaxcywenbpljkhdcajskecpmdckihdyhphfotjojtfmlnwmadspaxrkytbztpbauotbgtgtaeaevtgavtny",
    "ur:bytes/10-9/lpbkascfadaxcywenbpljkhdcahkadaemejtswhhylkepmykhhtsytsnoyoyaxaedsuttydmmhhpktpmsrjtwdkiplzs",
    "ur:bytes/11-9/lpbdascfadaxcywenbpljkhdcahelbknlkuejnbadmssfhfrdpsbiegecpasvssovlgeykssjykklronvsjkvetiiapk",
    "ur:bytes/12-9/lpbnascfadaxcywenbpljkhdcarllaluzmdmgstospeyiefmwejlwtpedamktksrvlcygmzemovovllarodtmtbnptrs",
];

fn wolf_encoder() -> UrEncoder {
    UrEncoder::new(
        UrType::new("bytes").unwrap(),
        &wolf_message(),
        &EncoderConfig::with_max_fragment_len(30),
    )
    .unwrap()
}

#[test]
fn encoder_matches_reference_parts() {
    let mut encoder = wolf_encoder();
    for expected in WOLF_PARTS {
        assert_eq!(encoder.next_part().unwrap().to_ascii_lowercase(), expected);
    }
}

#[test]
fn decoder_accepts_reference_parts_in_any_case() {
    let mut decoder = UrDecoder::default();
    for text in &WOLF_PARTS[..9] {
        decoder.receive(&text.to_ascii_uppercase()).unwrap();
    }
    assert!(decoder.is_complete());
    assert_eq!(decoder.resolve().unwrap().message, wolf_message());
}

#[test]
fn recovery_with_two_pure_parts_missing() {
    // Withhold parts 3 and 7; mixed parts 12 = {2, 6} and 14 = {0, 6} make up
    // for them.
    let encoder = FountainEncoder::new(&wolf_message(), &EncoderConfig::with_max_fragment_len(30))
        .unwrap();
    let mut decoder = FountainDecoder::default();

    for seq_num in [1, 2, 4, 5, 6, 8, 9, 12] {
        let reception = decoder.receive(&encoder.part(seq_num)).unwrap();
        assert!(matches!(reception, Reception::Progress(_)), "part {seq_num}: {reception:?}");
    }
    assert!(!decoder.is_complete());

    assert_eq!(decoder.receive(&encoder.part(14)).unwrap(), Reception::Complete);
    assert_eq!(decoder.message().unwrap(), wolf_message());
}

#[test]
fn mixed_parts_alone_eventually_complete() {
    let message: Vec<u8> = FountainRng::from_seed_bytes(b"mixed only").next_bytes(3000);
    let encoder =
        FountainEncoder::new(&message, &EncoderConfig::with_max_fragment_len(200)).unwrap();
    let mut decoder = FountainDecoder::default();

    let seq_len = encoder.seq_len() as u32;
    let mut seq_num = seq_len;
    while !decoder.is_complete() {
        seq_num += 1;
        assert!(seq_num < seq_len * 20, "no completion after {seq_num} parts");
        decoder.receive(&encoder.part(seq_num)).unwrap();
    }
    assert_eq!(decoder.message().unwrap(), message);
}

#[test]
fn fragment_choice_is_reproducible_from_header_alone() {
    let encoder = FountainEncoder::new(&wolf_message(), &EncoderConfig::with_max_fragment_len(30))
        .unwrap();
    let set = choose_fragments(16, encoder.seq_len(), encoder.checksum());
    assert_eq!(set.into_iter().collect::<Vec<_>>(), vec![0, 6, 7, 8]);
}

#[test]
fn configured_pending_limit_does_not_lose_the_message() {
    let message: Vec<u8> = FountainRng::from_seed_bytes(b"limit").next_bytes(2000);
    let encoder =
        FountainEncoder::new(&message, &EncoderConfig::with_max_fragment_len(50)).unwrap();
    let mut decoder =
        FountainDecoder::new(DecoderConfig { max_pending_parts: 2, ..DecoderConfig::default() });

    let mut seq_num = encoder.seq_len() as u32;
    while !decoder.is_complete() {
        seq_num += 1;
        decoder.receive(&encoder.part(seq_num)).unwrap();
        assert!(decoder.pending_parts() <= 2);
    }
    assert_eq!(decoder.message().unwrap(), message);
}

proptest! {
    /// Every pure part, in any order, reconstructs the message.
    #[test]
    fn prop_pure_parts_in_any_order_complete(
        message in prop::collection::vec(any::<u8>(), 1..600),
        max_fragment_len in 10..120usize,
        order_seed in any::<u64>(),
    ) {
        let config = EncoderConfig::with_max_fragment_len(max_fragment_len);
        let encoder = FountainEncoder::new(&message, &config).unwrap();
        let seq_nums: Vec<u32> = (1..=encoder.seq_len() as u32).collect();
        let shuffled = FountainRng::from_seed_bytes(&order_seed.to_be_bytes()).shuffled(seq_nums);

        let mut decoder = FountainDecoder::default();
        for seq_num in shuffled {
            decoder.receive(&encoder.part(seq_num)).unwrap();
        }

        prop_assert!(decoder.is_complete());
        prop_assert_eq!(decoder.message().unwrap(), message);
    }

    /// Receiving a part twice leaves the decoder exactly where it was.
    #[test]
    fn prop_duplicate_parts_are_idempotent(
        message in prop::collection::vec(any::<u8>(), 50..400),
        seq_nums in prop::collection::vec(1..40u32, 1..20),
    ) {
        let encoder = FountainEncoder::new(&message, &EncoderConfig::with_max_fragment_len(20)).unwrap();
        let mut decoder = FountainDecoder::default();

        for seq_num in seq_nums {
            let part = encoder.part(seq_num);
            decoder.receive(&part).unwrap();
            let progress = decoder.progress();
            let pending = decoder.pending_parts();

            prop_assert_eq!(decoder.receive(&part).unwrap(), Reception::Redundant);
            prop_assert_eq!(decoder.progress(), progress);
            prop_assert_eq!(decoder.pending_parts(), pending);
        }
    }

    /// A part whose data was tampered with after the fact never yields a
    /// wrong message: either reassembly is rejected by the checksum or the
    /// tampered part is not needed.
    #[test]
    fn prop_tampered_part_never_passes_checksum(
        message in prop::collection::vec(any::<u8>(), 30..300),
        victim in any::<prop::sample::Index>(),
        byte in any::<prop::sample::Index>(),
        flip in 1..=255u8,
    ) {
        let encoder = FountainEncoder::new(&message, &EncoderConfig::with_max_fragment_len(20)).unwrap();
        let seq_len = encoder.seq_len();
        let victim = victim.index(seq_len) as u32 + 1;

        let mut decoder = FountainDecoder::default();
        for seq_num in 1..=seq_len as u32 {
            let mut part = encoder.part(seq_num);
            if seq_num == victim {
                let i = byte.index(part.data.len());
                part.data[i] ^= flip;
            }
            decoder.receive(&part).unwrap();
        }

        match decoder.message() {
            Ok(recovered) => prop_assert_eq!(recovered, message),
            Err(err) => prop_assert!(matches!(err, DecodeError::ChecksumMismatch { .. }), "unexpected error: {:?}", err),
        }
    }
}

#[test]
fn forged_giant_header_is_rejected_promptly() {
    // One-byte fragments of a 1 MiB message: within the size limit, but
    // choosing the fragments of its mixed parts would take minutes.
    let n = 1 << 20;
    let hostile = Part { seq_num: n as u32 + 1, seq_len: n, message_len: n, checksum: 0x1234_5678, data: vec![0xaa] };
    let mut decoder = FountainDecoder::default();

    let started = Instant::now();
    let result = decoder.receive(&hostile);
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(result, Err(DecodeError::TooManyFragments { count: n, max: 10_000 }));
    assert_eq!(decoder.progress().total, 0);
}

#[test]
fn forged_giant_header_is_rejected_through_ur_text() {
    let hostile = Part { seq_num: 2_000_001, seq_len: 2_000_000, message_len: 2_000_000, checksum: 7, data: vec![1] };
    let text = airgap_proto::encode_part(&UrType::new("bytes").unwrap(), &hostile).unwrap();

    let config = DecoderConfig { max_message_len: 4 * 1024 * 1024, ..DecoderConfig::default() };
    let mut decoder = UrDecoder::new(config);
    assert!(matches!(decoder.receive(&text), Err(DecodeError::TooManyFragments { .. })));
    assert!(decoder.ur_type().is_none());
}
