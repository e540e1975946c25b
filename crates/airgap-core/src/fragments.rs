//! Fragmentation and fragment selection.

use std::collections::BTreeSet;

use crate::{random::FountainRng, sampler::choose_degree};

/// Set of fragment indexes XORed into one part.
pub type FragmentSet = BTreeSet<usize>;

/// Fragment length for a message, balanced across fragments.
///
/// The count is fixed by `max_fragment_len`, then the length shrinks to the
/// smallest that still covers the message in that many fragments, which keeps
/// padding under one byte per fragment.
pub fn fragment_len(message_len: usize, max_fragment_len: usize) -> usize {
    let count = message_len.div_ceil(max_fragment_len.max(1));
    message_len.div_ceil(count.max(1))
}

/// Split `message` into equal fragments, zero-padding the last.
pub fn partition(message: &[u8], fragment_len: usize) -> Vec<Vec<u8>> {
    message
        .chunks(fragment_len.max(1))
        .map(|chunk| {
            let mut fragment = chunk.to_vec();
            fragment.resize(fragment_len, 0);
            fragment
        })
        .collect()
}

/// Fragments combined into part `seq_num`.
///
/// The first `seq_len` parts are pure; later parts draw a degree and take
/// that many indexes from a seeded shuffle of all fragments.
pub fn choose_fragments(seq_num: u32, seq_len: usize, checksum: u32) -> FragmentSet {
    if (seq_num as usize) <= seq_len {
        return FragmentSet::from([seq_num.saturating_sub(1) as usize]);
    }

    let mut rng = FountainRng::for_part(seq_num, checksum);
    let degree = choose_degree(seq_len, &mut rng);
    rng.take_shuffled((0..seq_len).collect(), degree).into_iter().collect()
}

/// `target ^= source`, over the shorter of the two.
pub fn xor_into(target: &mut [u8], source: &[u8]) {
    for (t, s) in target.iter_mut().zip(source) {
        *t ^= s;
    }
}
