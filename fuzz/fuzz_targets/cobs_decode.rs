//! Fuzz target for the streaming COBS decoder.
//!
//! Feeds arbitrary bytes through `CobsDecoder::push` one at a time,
//! exercising resynchronization after malformed or oversized records. Never
//! panics: malformed input only ever yields `DecodeOutcome::Resynced`.

#![no_main]

use cinch_proto::cobs::{CobsDecoder, MAX_ENCODED_RECORD_LEN};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut raw_buf = [0u8; MAX_ENCODED_RECORD_LEN];
    let mut decoder = CobsDecoder::new(&mut raw_buf);
    let mut out = [0u8; MAX_ENCODED_RECORD_LEN];

    for &byte in data {
        let _ = decoder.push(byte, &mut out);
    }
});
