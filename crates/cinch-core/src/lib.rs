//! Session state machine, keystore contract, and frame codec orchestration
//! for the cinch protocol.
//!
//! This crate ties `cinch-proto` (framing) and `cinch-crypto`
//! (authentication) together behind the session and codec APIs a transport
//! layer actually calls. It enforces the validation order spec.md §4.5
//! mandates: CRC before HMAC before sequence, with no session state mutated
//! until every check passes.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod codec;
pub mod errors;
pub mod keystore;
pub mod session;

pub use codec::{encode, DecodeProgress, FrameDecoder, MAX_PAYLOAD_LEN};
pub use errors::CinchError;
pub use keystore::{KeyLookupError, Keystore, StaticKeystore};
pub use session::{Session, SessionPolicy, SessionState};
