//! Bytewords: bytes as four-letter words, terminated by a CRC-32.
//!
//! Every byte maps to one of 256 words whose first and last letters are
//! unique across the table, which is what lets the minimal style keep only
//! two letters per byte. A big-endian CRC-32 of the payload is appended
//! before encoding and verified after decoding.

use std::sync::LazyLock;

use crc::{CRC_32_ISO_HDLC, Crc};

use crate::errors::{DecodeError, Result};

const WORDS: &str = concat!(
    "ableacidalsoapexaquaarchatomauntawayaxisbackbaldbarnbeltbetabiasbluebodybragbrewbulbbuzzcalmcashcatschefcityclawcodecolacookcost",
    "cruxcurlcuspcyandarkdatadaysdelidicedietdoordowndrawdropdrumdulldutyeacheasyechoedgeepicevenexamexiteyesfactfairfernfigsfilmfish",
    "fizzflapflewfluxfoxyfreefrogfuelfundgalagamegeargemsgiftgirlglowgoodgraygrimgurugushgyrohalfhanghardhawkheathelphighhillholyhope",
    "hornhutsicedideaidleinchinkyintoirisironitemjadejazzjoinjoltjowljudojugsjumpjunkjurykeepkenokeptkeyskickkilnkingkitekiwiknoblamb",
    "lavalazyleaflegsliarlimplionlistlogoloudloveluaulucklungmainmanymathmazememomenumeowmildmintmissmonknailnavyneednewsnextnoonnote",
    "numbobeyoboeomitonyxopenovalowlspaidpartpeckplaypluspoempoolposepuffpumapurrquadquizraceramprealredorichroadrockroofrubyruinruns",
    "rustsafesagascarsetssilkskewslotsoapsolosongstubsurfswantacotasktaxitenttiedtimetinytoiltombtoystriptunatwinuglyundouniturgeuser",
    "vastveryvetovialvibeviewvisavoidvowswallwandwarmwaspwavewaxywebswhatwhenwhizwolfworkyankyawnyellyogayurtzapszerozestzinczonezoom",
);

const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

const CHECKSUM_LEN: usize = 4;

/// First-and-last letter pair to byte value.
static MINIMAL_INDEX: LazyLock<[Option<u8>; 26 * 26]> = LazyLock::new(|| {
    let mut table = [None; 26 * 26];
    for (value, word) in (0..=u8::MAX).zip(WORDS.as_bytes().chunks_exact(4)) {
        if let Some(slot) = slot(word[0], word[3]) {
            table[slot] = Some(value);
        }
    }
    table
});

/// CRC-32/ISO-HDLC, the checksum used by bytewords and fountain parts.
pub fn crc32(data: &[u8]) -> u32 {
    CRC32.checksum(data)
}

/// Word separator and abbreviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// Full words separated by spaces
    Standard,
    /// Full words separated by dashes
    Uri,
    /// First and last letter of each word, no separator (used in UR bodies)
    Minimal,
}

/// Encode `data` plus its checksum. Output is lowercase.
pub fn encode(data: &[u8], style: Style) -> String {
    let checksum = crc32(data).to_be_bytes();
    let words = data.iter().chain(checksum.iter()).map(|b| word(*b));

    match style {
        Style::Standard => words.collect::<Vec<_>>().join(" "),
        Style::Uri => words.collect::<Vec<_>>().join("-"),
        Style::Minimal => words
            .flat_map(|w| {
                let w = w.as_bytes();
                [char::from(w[0]), char::from(w[3])]
            })
            .collect(),
    }
}

/// Decode bytewords text, verify and strip its checksum.
///
/// Letters are matched case-insensitively.
pub fn decode(text: &str, style: Style) -> Result<Vec<u8>> {
    let mut bytes = match style {
        Style::Standard => decode_words(text.split(' ')),
        Style::Uri => decode_words(text.split('-')),
        Style::Minimal => decode_minimal(text),
    }?;

    if bytes.len() < CHECKSUM_LEN {
        return Err(DecodeError::InvalidBytewords("too short"));
    }

    let body_len = bytes.len() - CHECKSUM_LEN;
    let mut expected = [0u8; CHECKSUM_LEN];
    expected.copy_from_slice(&bytes[body_len..]);
    bytes.truncate(body_len);

    if crc32(&bytes) != u32::from_be_bytes(expected) {
        return Err(DecodeError::InvalidBytewords("checksum mismatch"));
    }

    Ok(bytes)
}

fn word(byte: u8) -> &'static str {
    let start = usize::from(byte) * 4;
    &WORDS[start..start + 4]
}

fn slot(first: u8, last: u8) -> Option<usize> {
    let first = first.to_ascii_lowercase();
    let last = last.to_ascii_lowercase();
    if !first.is_ascii_lowercase() || !last.is_ascii_lowercase() {
        return None;
    }
    Some(usize::from(first - b'a') * 26 + usize::from(last - b'a'))
}

fn lookup(first: u8, last: u8) -> Result<u8> {
    slot(first, last)
        .and_then(|s| MINIMAL_INDEX[s])
        .ok_or(DecodeError::InvalidBytewords("unknown word"))
}

fn decode_minimal(text: &str) -> Result<Vec<u8>> {
    let raw = text.as_bytes();
    if raw.len() % 2 != 0 {
        return Err(DecodeError::InvalidBytewords("odd length"));
    }
    raw.chunks_exact(2).map(|pair| lookup(pair[0], pair[1])).collect()
}

fn decode_words<'a>(words: impl Iterator<Item = &'a str>) -> Result<Vec<u8>> {
    words
        .map(|w| {
            let w = w.as_bytes();
            if w.len() != 4 {
                return Err(DecodeError::InvalidBytewords("word is not four letters"));
            }
            let value = lookup(w[0], w[3])?;
            if !word(value).as_bytes().eq_ignore_ascii_case(w) {
                return Err(DecodeError::InvalidBytewords("unknown word"));
            }
            Ok(value)
        })
        .collect()
}
