//! Error types for the session and frame codec layers.

use thiserror::Error;

/// Errors produced by the session state machine and frame codec.
///
/// Every spec-level error code from the wire protocol maps to exactly one
/// variant here. `need_more_data` is deliberately not a variant — it is a
/// progress signal, not a failure, and is modeled by
/// [`crate::codec::DecodeProgress`] instead.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CinchError {
    /// Caller-supplied output buffer could not hold the encoded result.
    #[error("buffer too small: need {needed}, have {available}")]
    BufferTooSmall {
        /// Bytes required to complete the operation.
        needed: usize,
        /// Bytes actually available in the caller's buffer.
        available: usize,
    },

    /// Payload length exceeds the protocol MTU (1024 bytes).
    #[error("payload too large: {len} exceeds maximum of {max}")]
    PayloadTooLarge {
        /// Length of the rejected payload.
        len: usize,
        /// Maximum permitted payload length.
        max: usize,
    },

    /// Header was structurally invalid (reserved bits, unsupported flags,
    /// or a length/schema mismatch).
    #[error("malformed header: {reason}")]
    MalformedHeader {
        /// Human-readable reason, never containing peer-controlled bytes.
        reason: &'static str,
    },

    /// The `version` byte is not one this implementation understands.
    #[error("unsupported version: {0:#04x}")]
    UnsupportedVersion(u8),

    /// The COBS-encoded record is structurally invalid.
    #[error("invalid COBS encoding")]
    CobsDecode,

    /// The trailing CRC16 did not match the computed checksum.
    #[error("CRC mismatch")]
    CrcMismatch,

    /// HMAC tag verification failed.
    #[error("authentication failed")]
    AuthFailed,

    /// `seq_rx` was not strictly greater than `last_accepted_seq`.
    #[error("replayed or out-of-order sequence number")]
    Replay,

    /// A command-class frame was encoded or received without the
    /// auth-present flag set.
    #[error("command frame requires authentication")]
    UnauthenticatedCommand,

    /// Encoding required authentication (command-class frame, or policy) but
    /// no session was supplied.
    #[error("authentication required but no session was provided")]
    AuthRequired,

    /// The keystore could not resolve `key_id`.
    #[error("key not found: {key_id}")]
    KeyNotFound {
        /// The key id that failed to resolve.
        key_id: u32,
    },

    /// The sender exhausted the sequence space without calling `rotate`.
    #[error("sequence space exhausted; rotate is required")]
    SequenceWrap,
}

impl CinchError {
    /// Returns true for errors that must never be reported to a peer with
    /// more detail than the generic code itself — spec.md §7: "authentication
    /// failures do not reveal which check failed beyond the distinct error
    /// code."
    ///
    /// A transport layer can use this to decide whether to log full detail
    /// locally while still only ever sending back a generic rejection.
    #[must_use]
    pub fn is_security_sensitive(&self) -> bool {
        matches!(self, Self::AuthFailed | Self::Replay | Self::KeyNotFound { .. })
    }

    /// Returns true for errors that indicate a broken or hostile peer, as
    /// opposed to a local resourcing mistake (`BufferTooSmall`) or an
    /// application-level oversize payload (`PayloadTooLarge`).
    #[must_use]
    pub fn indicates_hostile_peer(&self) -> bool {
        matches!(
            self,
            Self::MalformedHeader { .. }
                | Self::UnsupportedVersion(_)
                | Self::CobsDecode
                | Self::CrcMismatch
                | Self::AuthFailed
                | Self::Replay
                | Self::UnauthenticatedCommand
        )
    }
}

impl From<cinch_proto::ProtoError> for CinchError {
    fn from(err: cinch_proto::ProtoError) -> Self {
        match err {
            cinch_proto::ProtoError::BufferTooSmall { needed, available } => {
                Self::BufferTooSmall { needed, available }
            },
            cinch_proto::ProtoError::PayloadTooLarge { len, max } => Self::PayloadTooLarge { len, max },
            cinch_proto::ProtoError::MalformedHeader { reason } => Self::MalformedHeader { reason },
            cinch_proto::ProtoError::UnsupportedVersion(v) => Self::UnsupportedVersion(v),
            cinch_proto::ProtoError::CobsDecode { .. } => Self::CobsDecode,
            cinch_proto::ProtoError::CrcMismatch { .. } => Self::CrcMismatch,
        }
    }
}
