//! Full on-wire record assembly: header, payload, authentication tag, and
//! CRC16 trailer.
//!
//! This module knows the record's byte layout and can check the CRC16
//! trailer, but it has no notion of what a valid authentication tag looks
//! like — that is `cinch-crypto`'s job. The tag is carried here purely as an
//! opaque `[u8; TAG_LEN]` the caller supplies (on encode) or receives (on
//! decode), which keeps this crate free of a crypto dependency.

use crate::crc16::crc16_ccitt;
use crate::errors::ProtoError;
use crate::header::{FIXED_HEADER_LEN, RawHeader, SEQ_LEN};

pub use crate::header::MAX_PAYLOAD_LEN;

/// Length of the truncated HMAC-SHA256 authentication tag, in bytes.
pub const TAG_LEN: usize = 16;

/// Length of the CRC16 trailer, in bytes.
pub const CRC_LEN: usize = 2;

/// Largest possible record: full header with `seq`, maximum payload, a tag,
/// and the CRC16 trailer.
pub const MAX_RECORD_LEN: usize =
    FIXED_HEADER_LEN + SEQ_LEN + MAX_PAYLOAD_LEN as usize + TAG_LEN + CRC_LEN;

/// A parsed, CRC-verified record: header, payload, and authentication tag
/// (if the header's auth flag is set), all borrowed from the input buffer.
///
/// Parsing this struct verifies the CRC16 trailer but does not verify the
/// tag's authenticity — that requires a key, and belongs to `cinch-core`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFrame<'a> {
    /// Parsed header.
    pub header: RawHeader,
    /// Payload bytes (`header.length` long).
    pub payload: &'a [u8],
    /// Authentication tag, present iff `header.flags.auth_present()`.
    pub tag: Option<&'a [u8; TAG_LEN]>,
}

impl<'a> RawFrame<'a> {
    /// Parse and CRC-verify one complete record from `input`.
    ///
    /// `input` must contain exactly one record (header, payload, optional
    /// tag, and the 2-byte CRC16 trailer) with no extra trailing bytes —
    /// this is what a COBS-decoded record yields.
    ///
    /// # Errors
    ///
    /// Propagates [`RawHeader::read_from`]'s errors, plus:
    /// - [`ProtoError::BufferTooSmall`] if `input` is shorter than the
    ///   header promises.
    /// - [`ProtoError::MalformedHeader`] if `input` has trailing bytes past
    ///   the record the header describes.
    /// - [`ProtoError::CrcMismatch`] if the trailing CRC16 does not match
    ///   the computed checksum of everything preceding it.
    pub fn parse(input: &'a [u8]) -> Result<Self, ProtoError> {
        let (header, header_len) = RawHeader::read_from(input)?;

        let payload_len = usize::from(header.length);
        let tag_len = if header.flags.auth_present() { TAG_LEN } else { 0 };
        let total_len = header_len + payload_len + tag_len + CRC_LEN;

        if input.len() < total_len {
            return Err(ProtoError::BufferTooSmall { needed: total_len, available: input.len() });
        }
        if input.len() > total_len {
            return Err(ProtoError::MalformedHeader { reason: "trailing bytes past record end" });
        }

        let payload_start = header_len;
        let payload_end = payload_start + payload_len;
        let payload = &input[payload_start..payload_end];

        let tag_end = payload_end + tag_len;
        let tag = if header.flags.auth_present() {
            let slice = &input[payload_end..tag_end];
            let array = <&[u8; TAG_LEN]>::try_from(slice)
                .map_err(|_| ProtoError::MalformedHeader { reason: "tag slice length mismatch" })?;
            Some(array)
        } else {
            None
        };

        let crc_region = &input[..tag_end];
        let expected = u16::from_be_bytes([input[tag_end], input[tag_end + 1]]);
        let computed = crc16_ccitt(crc_region);
        if computed != expected {
            return Err(ProtoError::CrcMismatch { computed, expected });
        }

        Ok(Self { header, payload, tag })
    }

    /// Assemble a record from its parts into `output`, appending the CRC16
    /// trailer. Returns the number of bytes written.
    ///
    /// `tag` must be `Some` exactly when `header.flags.auth_present()`; this
    /// is a caller invariant, not a peer-triggerable condition, so a
    /// mismatch is reported the same way as any other malformed-construction
    /// request.
    ///
    /// # Errors
    ///
    /// - [`ProtoError::BufferTooSmall`] if `output` cannot hold the record.
    /// - [`ProtoError::MalformedHeader`] if `tag.is_some()` disagrees with
    ///   `header.flags.auth_present()`, or `payload.len()` disagrees with
    ///   `header.length`.
    pub fn encode(
        header: &RawHeader,
        payload: &[u8],
        tag: Option<&[u8; TAG_LEN]>,
        output: &mut [u8],
    ) -> Result<usize, ProtoError> {
        if tag.is_some() != header.flags.auth_present() {
            return Err(ProtoError::MalformedHeader { reason: "tag presence disagrees with flags" });
        }
        if payload.len() != usize::from(header.length) {
            return Err(ProtoError::MalformedHeader { reason: "payload length disagrees with header" });
        }

        let tag_len = tag.map_or(0, |_| TAG_LEN);
        let total_len = header.encoded_len() + payload.len() + tag_len + CRC_LEN;
        if output.len() < total_len {
            return Err(ProtoError::BufferTooSmall { needed: total_len, available: output.len() });
        }

        let header_len = header.write_into(output)?;
        let payload_end = header_len + payload.len();
        output[header_len..payload_end].copy_from_slice(payload);

        let tag_end = if let Some(tag) = tag {
            let end = payload_end + TAG_LEN;
            output[payload_end..end].copy_from_slice(tag);
            end
        } else {
            payload_end
        };

        let crc = crc16_ccitt(&output[..tag_end]);
        output[tag_end..tag_end + CRC_LEN].copy_from_slice(&crc.to_be_bytes());

        Ok(tag_end + CRC_LEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{FrameFlags, FrameType};

    #[test]
    fn round_trip_unauthenticated() {
        let header =
            RawHeader { frame_type: FrameType::Telemetry(1), flags: FrameFlags::none(), length: 3, seq: 0 };
        let mut buf = [0u8; MAX_RECORD_LEN];
        let n = RawFrame::encode(&header, b"abc", None, &mut buf).unwrap();

        let parsed = RawFrame::parse(&buf[..n]).unwrap();
        assert_eq!(parsed.header, header);
        assert_eq!(parsed.payload, b"abc");
        assert_eq!(parsed.tag, None);
    }

    #[test]
    fn round_trip_authenticated() {
        let header = RawHeader {
            frame_type: FrameType::Command(0x01),
            flags: FrameFlags::authenticated(),
            length: 4,
            seq: 7,
        };
        let tag = [0x42u8; TAG_LEN];
        let mut buf = [0u8; MAX_RECORD_LEN];
        let n = RawFrame::encode(&header, b"ping", Some(&tag), &mut buf).unwrap();

        let parsed = RawFrame::parse(&buf[..n]).unwrap();
        assert_eq!(parsed.payload, b"ping");
        assert_eq!(parsed.tag, Some(&tag));
    }

    #[test]
    fn parse_rejects_crc_mismatch() {
        let header =
            RawHeader { frame_type: FrameType::Telemetry(0), flags: FrameFlags::none(), length: 1, seq: 0 };
        let mut buf = [0u8; MAX_RECORD_LEN];
        let n = RawFrame::encode(&header, b"x", None, &mut buf).unwrap();
        buf[n - 1] ^= 0xFF;

        let err = RawFrame::parse(&buf[..n]).unwrap_err();
        assert!(matches!(err, ProtoError::CrcMismatch { .. }));
    }

    #[test]
    fn parse_rejects_trailing_bytes() {
        let header =
            RawHeader { frame_type: FrameType::Telemetry(0), flags: FrameFlags::none(), length: 0, seq: 0 };
        let mut buf = [0u8; MAX_RECORD_LEN];
        let n = RawFrame::encode(&header, b"", None, &mut buf).unwrap();

        let err = RawFrame::parse(&buf[..n + 1]).unwrap_err();
        assert_eq!(err, ProtoError::MalformedHeader { reason: "trailing bytes past record end" });
    }

    #[test]
    fn encode_rejects_tag_flag_mismatch() {
        let header =
            RawHeader { frame_type: FrameType::Telemetry(0), flags: FrameFlags::none(), length: 0, seq: 0 };
        let tag = [0u8; TAG_LEN];
        let mut buf = [0u8; MAX_RECORD_LEN];
        let err = RawFrame::encode(&header, b"", Some(&tag), &mut buf).unwrap_err();
        assert_eq!(err, ProtoError::MalformedHeader { reason: "tag presence disagrees with flags" });
    }
}
