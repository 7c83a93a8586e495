//! Round-trip and bounds tests for the CM codec.

use oxidat_cm::{CmHeader, CmToken, decode, encode, tokens};
use oxidat_core::error::FormatError;
use proptest::prelude::*;

/// Reproducible pseudo-random bytes.
fn random_bytes(size: usize, mut seed: u64) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    for _ in 0..size {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
        data.push((seed >> 32) as u8);
    }
    data
}

fn assert_roundtrip(input: &[u8]) {
    let payload = encode(input).unwrap();
    let decoded = decode(&payload).unwrap();
    assert_eq!(decoded, input);
}

#[test]
fn test_empty_input() {
    let payload = encode(b"").unwrap();
    let header = CmHeader::parse(&payload).unwrap();
    assert_eq!(header.raw_length, 0);
    assert_eq!(header.token_length, 0);
    assert_eq!(payload.len(), 12);
    assert!(decode(&payload).unwrap().is_empty());
}

#[test]
fn test_single_byte() {
    assert_roundtrip(b"A");
}

#[test]
fn test_run_of_200_bytes() {
    let input = vec![0x5Au8; 200];
    let payload = encode(&input).unwrap();
    let items = tokens(&payload).unwrap();

    // literal, 11 x 18-byte matches, trailing literal
    assert_eq!(items[0], CmToken::Literal(0x5A));
    let matches: Vec<_> = items.iter().filter(|t| t.is_match()).collect();
    assert_eq!(matches.len(), 11);
    assert!(
        matches
            .iter()
            .all(|t| matches!(t, CmToken::Match { length: 18, distance: 1 }))
    );
    assert_eq!(decode(&payload).unwrap(), input);
}

#[test]
fn test_text() {
    let text = b"The quick brown fox jumps over the lazy dog. ".repeat(50);
    let payload = encode(&text).unwrap();
    assert!(payload.len() < text.len() / 4);
    assert_roundtrip(&text);
}

#[test]
fn test_random_data() {
    for (size, seed) in [(1, 1), (17, 2), (4097, 3), (20_000, 4)] {
        assert_roundtrip(&random_bytes(size, seed));
    }
}

#[test]
fn test_distant_repeat_beyond_window() {
    let block = random_bytes(5000, 9);
    let mut input = block.clone();
    input.extend_from_slice(&block);
    assert_roundtrip(&input);
}

#[test]
fn test_flag_byte_count() {
    // 9 items -> 2 flag bytes
    let input = b"abcdefghi";
    let payload = encode(input).unwrap();
    let header = CmHeader::parse(&payload).unwrap();
    assert_eq!(header.token_length, 9);
    assert_eq!(payload.len(), 12 + 9 + 2);
}

#[test]
fn test_corrupted_magic() {
    let mut payload = encode(b"hello hello hello").unwrap();
    payload[0] = b'X';
    assert_eq!(
        decode(&payload),
        Err(FormatError::BadMagic { found: *b"XM" })
    );
}

#[test]
fn test_truncated_payload_never_panics() {
    let payload = encode(&b"abcabcabcabcabcabc-xyz-xyz-xyz".repeat(8)).unwrap();
    for cut in 0..payload.len() {
        let _ = decode(&payload[..cut]);
    }
    // Flags region chopped off entirely
    let header = CmHeader::parse(&payload).unwrap();
    let err = decode(&payload[..header.flags_offset()]).unwrap_err();
    assert!(matches!(err, FormatError::FlagsExhausted { produced: 0, .. }));
}

proptest! {
    #[test]
    fn prop_roundtrip(data in proptest::collection::vec(any::<u8>(), 0..2048)) {
        let payload = encode(&data).unwrap();
        prop_assert_eq!(decode(&payload).unwrap(), data);
    }

    #[test]
    fn prop_roundtrip_low_entropy(data in proptest::collection::vec(0u8..4, 0..6000)) {
        let payload = encode(&data).unwrap();
        prop_assert_eq!(decode(&payload).unwrap(), data);
    }

    #[test]
    fn prop_matches_in_bounds(data in proptest::collection::vec(0u8..3, 1..3000)) {
        let payload = encode(&data).unwrap();
        let mut produced = 0usize;
        for item in tokens(&payload).unwrap() {
            if let CmToken::Match { length, distance } = item {
                prop_assert!((3..=18).contains(&length));
                prop_assert!((1..=4096).contains(&distance));
                prop_assert!(distance as usize <= produced);
            }
            produced += item.output_len();
        }
        prop_assert_eq!(produced, data.len());
    }

    #[test]
    fn prop_arbitrary_payload_never_panics(data in proptest::collection::vec(any::<u8>(), 0..256)) {
        let mut payload = b"CM\0\0".to_vec();
        payload.extend_from_slice(&data);
        let _ = decode(&payload);
    }
}
