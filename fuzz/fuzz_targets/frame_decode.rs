//! Fuzz target for `RawFrame::parse`.
//!
//! Feeds arbitrary bytes as a (post-COBS-decode) record. Never panics: all
//! invalid inputs return an error.

#![no_main]

use cinch_proto::frame::RawFrame;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = RawFrame::parse(data);
});
