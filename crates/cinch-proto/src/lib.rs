//! Wire framing for the cinch protocol.
//!
//! This crate is the pure, allocation-free wire layer: CRC16, COBS framing,
//! and the fixed frame header. It knows nothing about keys, sessions, or
//! authentication — those live in `cinch-crypto` and `cinch-core`. Every
//! function here operates on caller-supplied buffers and has no suspension
//! points, matching the synchronous, bounded-memory model this protocol is
//! built for.
//!
//! # Security
//!
//! - No dynamic allocation: every encode/decode path writes into a
//!   caller-supplied `&mut [u8]`.
//! - The on-wire header is never reinterpreted as a native struct. Every
//!   multi-byte field is read and written explicitly in big-endian order,
//!   which avoids alignment and struct-packing pitfalls entirely.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod cobs;
pub mod crc16;
pub mod errors;
pub mod frame;
pub mod header;

pub use cobs::{CobsDecoder, DecodeOutcome};
pub use crc16::crc16_ccitt;
pub use errors::ProtoError;
pub use frame::{MAX_PAYLOAD_LEN, MAX_RECORD_LEN, RawFrame};
pub use header::{FrameFlags, FrameType, RawHeader};
