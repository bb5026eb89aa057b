//! Error types for the wire layer.

use thiserror::Error;

/// Errors produced by CRC16/COBS/header parsing.
///
/// Every variant here corresponds to a failure mode a peer can trigger by
/// sending malformed or hostile bytes; none of them indicate a bug in this
/// crate.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtoError {
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

    /// `reserved` was non-zero, an unsupported flag bit was set, or the
    /// record length did not match the schema implied by the auth flag.
    #[error("malformed header: {reason}")]
    MalformedHeader {
        /// Human-readable reason, never containing peer-controlled bytes.
        reason: &'static str,
    },

    /// The `version` byte is not one this implementation understands.
    #[error("unsupported version: {0:#04x}")]
    UnsupportedVersion(u8),

    /// The COBS-encoded record is structurally invalid.
    #[error("invalid COBS encoding: {reason}")]
    CobsDecode {
        /// Human-readable reason.
        reason: &'static str,
    },

    /// The trailing CRC16 did not match the computed checksum of the record.
    #[error("CRC mismatch: computed {computed:#06x}, expected {expected:#06x}")]
    CrcMismatch {
        /// CRC16 computed over the received bytes.
        computed: u16,
        /// CRC16 read from the record's trailer.
        expected: u16,
    },
}

impl ProtoError {
    /// Returns true for errors that indicate a broken or hostile peer
    /// (`CobsDecode`, `MalformedHeader`, `UnsupportedVersion`), as opposed to
    /// purely local resourcing mistakes (`BufferTooSmall`) or an
    /// application-level oversize payload (`PayloadTooLarge`).
    ///
    /// Useful for a transport layer deciding whether to log at a higher
    /// severity or count the peer against a misbehavior budget.
    #[must_use]
    pub fn indicates_hostile_peer(&self) -> bool {
        matches!(
            self,
            Self::CobsDecode { .. }
                | Self::MalformedHeader { .. }
                | Self::UnsupportedVersion(_)
                | Self::CrcMismatch { .. }
        )
    }
}
