//! Fuzzer for protocol line parsing and hex decoding.
//!
//! Feeds arbitrary bytes through the line parsers and the hex decoder,
//! asserting the crash-free properties the wire layer relies on:
//! parsing never panics on any input, a successful parse always yields
//! exactly the requested length, and encode/decode are mutual inverses.

#![no_main]

use kemline_proto::{hex, line};
use libfuzzer_sys::fuzz_target;

// Payload lengths to parse against: degenerate, toy, and the ML-KEM-768
// public-key and ciphertext sizes
const PAYLOAD_LENS: &[usize] = &[0, 1, 8, 1088, 1184];

fuzz_target!(|data: &[u8]| {
    // Parsers take text; exercise both lossy text and, when valid, exact
    // UTF-8 input
    let text = String::from_utf8_lossy(data);

    for &len in PAYLOAD_LENS {
        if let Ok(bytes) = line::parse_public_key_line(&text, len) {
            assert_eq!(bytes.len(), len);
        }
        if let Ok(bytes) = line::parse_ciphertext_line(&text, len) {
            assert_eq!(bytes.len(), len);
        }
        if let Ok(bytes) = hex::decode(&text, len) {
            assert_eq!(bytes.len(), len);
            // Decoded hex re-encodes to the same text, modulo case
            assert_eq!(hex::encode(&bytes), text.to_lowercase());
        }
    }

    // Round trip from arbitrary bytes: encoding always decodes back
    let encoded = hex::encode(data);
    let decoded = hex::decode(&encoded, data.len()).expect("encoded hex must decode");
    assert_eq!(decoded, data);

    let pk_line = line::public_key_line(data);
    assert_eq!(
        line::parse_public_key_line(&pk_line, data.len()).expect("built line must parse"),
        data
    );

    let ct_line = line::ciphertext_line(data);
    assert_eq!(
        line::parse_ciphertext_line(&ct_line, data.len()).expect("built line must parse"),
        data
    );

    // The cap admits every well-formed line
    assert!(pk_line.len() <= line::max_line_len(data.len(), 0));
    assert!(ct_line.len() <= line::max_line_len(0, data.len()));

    // Preview never exceeds its bound and never panics
    for &n in &[0usize, 1, 8, 64] {
        let p = hex::preview(data, n);
        assert!(p.len() <= 2 * n + 2);
    }
});
