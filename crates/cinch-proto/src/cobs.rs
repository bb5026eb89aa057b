//! Consistent Overhead Byte Stuffing (COBS) encoder and streaming decoder.
//!
//! COBS removes 0x00 from the encoded region so that byte can serve as an
//! unambiguous record delimiter on the wire. Both encode and decode operate
//! on caller-supplied buffers; the streaming decoder holds only the minimal
//! parser state needed to reassemble one record (current write position and
//! the remaining count from the last code byte) — no heap allocation.

use crate::errors::ProtoError;

/// Maximum run length a single COBS code byte can describe.
const MAX_RUN: usize = 254;

/// Maximum bytes the streaming decoder will buffer for one still-stuffed
/// record (everything between delimiters, COBS overhead included) before
/// treating it as oversized and resynchronizing.
///
/// A maximum-sized cleartext record (`cinch_proto::frame::MAX_RECORD_LEN`,
/// duplicated here as a `const` so this module has no dependency on `frame`)
/// is 1052 bytes; COBS adds one code byte per started 254-byte block
/// (`div_ceil(1052, 254) == 5`), so the stuffed record arriving off the wire
/// can be up to 1057 bytes before its terminating delimiter.
pub const MAX_ENCODED_RECORD_LEN: usize = 1057;

/// Encode `input` as a COBS record, including the terminating `0x00` byte,
/// into `output`.
///
/// Returns the number of bytes written (always `<= input.len() +
/// ceil(input.len() / 254) + 1`).
///
/// # Errors
///
/// Returns [`ProtoError::BufferTooSmall`] if `output` cannot hold the
/// encoded result.
///
/// # Examples
///
/// ```
/// use cinch_proto::cobs;
///
/// let mut out = [0u8; 2];
/// let n = cobs::encode(&[], &mut out).unwrap();
/// assert_eq!(&out[..n], &[0x01, 0x00]);
///
/// let mut out = [0u8; 3];
/// let n = cobs::encode(&[0x00], &mut out).unwrap();
/// assert_eq!(&out[..n], &[0x01, 0x01, 0x00]);
/// ```
pub fn encode(input: &[u8], output: &mut [u8]) -> Result<usize, ProtoError> {
    let max_len = encoded_len(input.len());
    if output.len() < max_len {
        return Err(ProtoError::BufferTooSmall { needed: max_len, available: output.len() });
    }

    // Position in `output` reserved for the current block's code byte.
    let mut code_pos = 0usize;
    let mut out_pos = 1usize;
    let mut run_len: u8 = 0;

    for &byte in input {
        // A block that just reached the 254-byte cap is finalized lazily,
        // only once we know there is more input to place in a new block —
        // otherwise an input that ends exactly on a 254-byte boundary would
        // pick up a spurious trailing code byte.
        if usize::from(run_len) == MAX_RUN {
            output[code_pos] = run_len + 1;
            code_pos = out_pos;
            out_pos += 1;
            run_len = 0;
        }

        if byte == 0x00 {
            output[code_pos] = run_len + 1;
            code_pos = out_pos;
            out_pos += 1;
            run_len = 0;
        } else {
            output[out_pos] = byte;
            out_pos += 1;
            run_len += 1;
        }
    }

    output[code_pos] = run_len + 1;
    output[out_pos] = 0x00;
    out_pos += 1;

    Ok(out_pos)
}

/// Maximum encoded length (including the trailing delimiter) for an input of
/// `input_len` bytes.
#[must_use]
pub fn encoded_len(input_len: usize) -> usize {
    let blocks = if input_len == 0 { 1 } else { input_len.div_ceil(MAX_RUN) };
    input_len + blocks + 1
}

/// Decode one complete COBS record (without its trailing `0x00`) from
/// `input` into `output`.
///
/// `input` must contain exactly one record's worth of stuffed bytes, with no
/// trailing delimiter.
///
/// # Errors
///
/// - [`ProtoError::CobsDecode`] if the record is structurally invalid (a code
///   byte claims more bytes than remain, a stuffed byte is `0x00`, or the
///   input is empty).
/// - [`ProtoError::BufferTooSmall`] if `output` cannot hold the decoded
///   bytes.
pub fn decode(input: &[u8], output: &mut [u8]) -> Result<usize, ProtoError> {
    if input.is_empty() {
        return Err(ProtoError::CobsDecode { reason: "empty record" });
    }

    let mut in_pos = 0usize;
    let mut out_pos = 0usize;

    while in_pos < input.len() {
        let code = input[in_pos];
        if code == 0 {
            return Err(ProtoError::CobsDecode { reason: "zero code byte" });
        }
        in_pos += 1;
        let run = usize::from(code) - 1;

        if in_pos + run > input.len() {
            return Err(ProtoError::CobsDecode { reason: "code byte overruns record" });
        }

        if out_pos + run > output.len() {
            return Err(ProtoError::BufferTooSmall { needed: out_pos + run, available: output.len() });
        }

        for _ in 0..run {
            let byte = input[in_pos];
            if byte == 0 {
                return Err(ProtoError::CobsDecode { reason: "stuffed zero inside run" });
            }
            output[out_pos] = byte;
            in_pos += 1;
            out_pos += 1;
        }

        if usize::from(code) != MAX_RUN + 1 && in_pos < input.len() {
            if out_pos >= output.len() {
                return Err(ProtoError::BufferTooSmall { needed: out_pos + 1, available: output.len() });
            }
            output[out_pos] = 0x00;
            out_pos += 1;
        }
    }

    Ok(out_pos)
}

/// Result of feeding one byte to [`CobsDecoder::push`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// No complete record yet; keep feeding bytes.
    NeedMore,
    /// A record completed and was decoded into the caller's buffer. The
    /// value is the decoded length.
    Record(usize),
    /// The record was malformed or exceeded the maximum size; the parser has
    /// already discarded the offending bytes and resynchronized to the next
    /// delimiter.
    Resynced(ProtoError),
}

/// Streaming COBS decoder.
///
/// Carries the raw (still-encoded) bytes of the record in progress and
/// decodes them in place once the delimiter arrives. No heap allocation;
/// buffer size is fixed at construction.
pub struct CobsDecoder<'buf> {
    raw: &'buf mut [u8],
    raw_len: usize,
    /// Set once a record overflows `raw`; every byte is then swallowed
    /// without being stored until the next delimiter arrives, so the tail
    /// of an oversized record is never mistaken for the start of a new one.
    discarding: bool,
    /// Number of records discarded due to malformed COBS or oversize input.
    /// Exposed for observability only; not part of the core contract
    /// (spec.md §7).
    resync_count: u64,
}

impl<'buf> CobsDecoder<'buf> {
    /// Build a decoder backed by `raw_buf`, which must be at least
    /// [`MAX_ENCODED_RECORD_LEN`] bytes to hold a maximum-sized record before
    /// decoding.
    #[must_use]
    pub fn new(raw_buf: &'buf mut [u8]) -> Self {
        Self { raw: raw_buf, raw_len: 0, discarding: false, resync_count: 0 }
    }

    /// Number of times this decoder has discarded a malformed or oversize
    /// record and resynchronized to the next delimiter.
    #[must_use]
    pub fn resync_count(&self) -> u64 {
        self.resync_count
    }

    /// Feed one byte from the wire. On `0x00`, attempts to decode the
    /// buffered record into `output` and resets internal state regardless of
    /// outcome.
    pub fn push(&mut self, byte: u8, output: &mut [u8]) -> DecodeOutcome {
        if self.discarding {
            if byte == 0x00 {
                self.discarding = false;
            }
            return DecodeOutcome::NeedMore;
        }

        if byte != 0x00 {
            if self.raw_len >= self.raw.len() {
                // Oversized record: the byte that overflowed is reported
                // once, then every further byte is swallowed (not stored)
                // until the next delimiter resynchronizes the parser.
                let needed = self.raw_len + 1;
                self.discarding = true;
                self.raw_len = 0;
                self.resync_count = self.resync_count.wrapping_add(1);
                return DecodeOutcome::Resynced(ProtoError::BufferTooSmall {
                    needed,
                    available: self.raw.len(),
                });
            }
            self.raw[self.raw_len] = byte;
            self.raw_len += 1;
            return DecodeOutcome::NeedMore;
        }

        let record = &self.raw[..self.raw_len];
        let result = decode(record, output);
        self.raw_len = 0;

        match result {
            Ok(len) => DecodeOutcome::Record(len),
            Err(err) => {
                self.resync_count = self.resync_count.wrapping_add(1);
                DecodeOutcome::Resynced(err)
            },
        }
    }
}
