//! Truncated HMAC-SHA256 authentication for the cinch protocol.
//!
//! This crate holds exactly two concerns: computing a truncated HMAC-SHA256
//! tag over a record, and comparing two tags in constant time. It knows
//! nothing about frames, sessions, or key storage — those live in
//! `cinch-proto` and `cinch-core`.
//!
//! # Security
//!
//! - Tag comparison never exits early on the first mismatched byte; timing
//!   must not leak which byte of a forged tag was wrong.
//! - Key material implements [`Drop`] via `zeroize` so it is wiped from
//!   memory as soon as it goes out of scope.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod key;
pub mod mac;

pub use key::SessionKey;
pub use mac::{tag, verify, TAG_LEN};
