//! Literal end-to-end scenarios from the protocol's test-vector suite:
//! telemetry round-trip, replay rejection, unauthenticated command
//! rejection, tamper rejection, and a multi-frame stream.

use cinch_core::codec::{self, DecodeProgress, FrameDecoder};
use cinch_core::{KeyLookupError, Keystore, Session, SessionPolicy};
use cinch_crypto::SessionKey;
use cinch_proto::cobs::MAX_ENCODED_RECORD_LEN;
use cinch_proto::frame::MAX_RECORD_LEN;
use cinch_proto::header::{FrameFlags, FrameType};

struct NullKeystore;

impl Keystore for NullKeystore {
    fn lookup(&self, _key_id: u32) -> Result<SessionKey, KeyLookupError> {
        // These scenarios authenticate with a session that already holds
        // its own key; this keystore only needs to satisfy the "is this id
        // known" liveness check, so it resolves any id.
        Ok(SessionKey::new([0x0B; 32]))
    }
}

fn decode_one(stream: &[u8], keystore: &impl Keystore, mut session: Option<&mut Session>) -> DecodeProgress {
    let mut raw_buf = [0u8; MAX_ENCODED_RECORD_LEN];
    let mut decoder = FrameDecoder::new(&mut raw_buf);
    let mut payload_out = [0u8; MAX_RECORD_LEN];
    let mut record_scratch = [0u8; MAX_RECORD_LEN];

    let mut last = DecodeProgress::NeedMoreData;
    for &byte in stream {
        let reborrowed = session.as_mut().map(|s| &mut **s);
        last = decoder.push(byte, &mut record_scratch, &mut payload_out, keystore, reborrowed);
        if !matches!(last, DecodeProgress::NeedMoreData) {
            return last;
        }
    }
    last
}

#[test]
fn telemetry_round_trip_empty_payload() {
    let mut output = [0u8; MAX_RECORD_LEN];
    let n = codec::encode(b"", FrameType::Telemetry(0x10), FrameFlags::none(), None, &mut output).unwrap();

    let keystore = NullKeystore;
    match decode_one(&output[..n], &keystore, None) {
        DecodeProgress::Frame { payload_len, frame_type, flags } => {
            assert_eq!(payload_len, 0);
            assert_eq!(frame_type, FrameType::Telemetry(0x10));
            assert_eq!(flags, FrameFlags::none());
        },
        other => panic!("expected successful decode, got {other:?}"),
    }
}

#[test]
fn payload_length_boundaries_round_trip() {
    let keystore = NullKeystore;
    for &len in &[0usize, 1, 253, 254, 255, 1023, 1024] {
        let payload = vec![0xAB; len];
        let mut output = [0u8; MAX_RECORD_LEN];
        let n = codec::encode(&payload, FrameType::Telemetry(0x20), FrameFlags::none(), None, &mut output)
            .unwrap_or_else(|err| panic!("encode failed at len {len}: {err:?}"));

        match decode_one(&output[..n], &keystore, None) {
            DecodeProgress::Frame { payload_len, .. } => assert_eq!(payload_len, len),
            other => panic!("expected successful decode at len {len}, got {other:?}"),
        }
    }
}

#[test]
fn payload_over_mtu_is_rejected_on_encode() {
    let payload = vec![0xABu8; 1025];
    let mut output = [0u8; MAX_RECORD_LEN + 8];
    let err =
        codec::encode(&payload, FrameType::Telemetry(0x20), FrameFlags::none(), None, &mut output).unwrap_err();
    assert_eq!(err, cinch_core::CinchError::PayloadTooLarge { len: 1025, max: codec::MAX_PAYLOAD_LEN });
}

#[test]
fn replay_rejection() {
    let keystore = NullKeystore;
    let mut sender = Session::init(1, SessionKey::new([0x0B; 32]), 0, 5, SessionPolicy::default());
    let mut receiver = Session::init(1, SessionKey::new([0x0B; 32]), 0, 0, SessionPolicy::default());

    let mut output = [0u8; MAX_RECORD_LEN];
    let n = codec::encode(
        b"HELLO",
        FrameType::Command(0x01),
        FrameFlags::authenticated(),
        Some(&mut sender),
        &mut output,
    )
    .unwrap();
    let stream = output[..n].to_vec();

    match decode_one(&stream, &keystore, Some(&mut receiver)) {
        DecodeProgress::Frame { payload_len, .. } => assert_eq!(payload_len, 5),
        other => panic!("expected first decode to succeed, got {other:?}"),
    }

    match decode_one(&stream, &keystore, Some(&mut receiver)) {
        DecodeProgress::Rejected(cinch_core::CinchError::Replay) => {},
        other => panic!("expected replay rejection on second decode, got {other:?}"),
    }
}

#[test]
fn unauthenticated_command_rejection() {
    let mut output = [0u8; MAX_RECORD_LEN];
    let err =
        codec::encode(b"cmd", FrameType::Command(0x01), FrameFlags::none(), None, &mut output).unwrap_err();
    assert_eq!(err, cinch_core::CinchError::AuthRequired);
}

#[test]
fn tamper_rejection_flips_payload_bit() {
    let keystore = NullKeystore;
    let mut sender = Session::init(1, SessionKey::new([0x0B; 32]), 0, 5, SessionPolicy::default());
    let mut receiver = Session::init(1, SessionKey::new([0x0B; 32]), 0, 0, SessionPolicy::default());

    let mut output = [0u8; MAX_RECORD_LEN];
    let n = codec::encode(
        b"HELLO",
        FrameType::Command(0x01),
        FrameFlags::authenticated(),
        Some(&mut sender),
        &mut output,
    )
    .unwrap();

    // Decode once cleanly to get the raw record bytes (pre-COBS), then
    // re-encode with a flipped payload bit but the original (now-invalid)
    // tag and a freshly recomputed CRC, simulating an attacker who can
    // recompute CRC16 but not forge the HMAC tag.
    let mut raw_buf = [0u8; MAX_ENCODED_RECORD_LEN];
    let mut decoder = cinch_proto::CobsDecoder::new(&mut raw_buf);
    let mut record = [0u8; MAX_RECORD_LEN];
    let mut record_len = 0usize;
    for &byte in &output[..n] {
        if let cinch_proto::DecodeOutcome::Record(len) = decoder.push(byte, &mut record) {
            record_len = len;
        }
    }

    let parsed = cinch_proto::frame::RawFrame::parse(&record[..record_len]).unwrap();
    let mut tampered_payload = parsed.payload.to_vec();
    tampered_payload[0] ^= 0x01;

    let mut tampered_record = [0u8; MAX_RECORD_LEN];
    let tampered_len = cinch_proto::frame::RawFrame::encode(
        &parsed.header,
        &tampered_payload,
        parsed.tag,
        &mut tampered_record,
    )
    .unwrap();

    let mut tampered_stream = vec![0u8; cinch_proto::cobs::encoded_len(tampered_len)];
    let stream_len =
        cinch_proto::cobs::encode(&tampered_record[..tampered_len], &mut tampered_stream).unwrap();

    match decode_one(&tampered_stream[..stream_len], &keystore, Some(&mut receiver)) {
        DecodeProgress::Rejected(cinch_core::CinchError::AuthFailed) => {},
        other => panic!("expected auth_failed on tampered payload, got {other:?}"),
    }
}

#[test]
fn multi_frame_stream_decodes_in_order() {
    let mut raw_buf = [0u8; MAX_ENCODED_RECORD_LEN];
    let mut decoder = FrameDecoder::new(&mut raw_buf);
    let keystore = NullKeystore;

    let mut stream = Vec::new();
    for payload in [&b"one"[..], &b"two"[..], &b"three"[..]] {
        let mut out = [0u8; MAX_RECORD_LEN];
        let n =
            codec::encode(payload, FrameType::Telemetry(1), FrameFlags::none(), None, &mut out).unwrap();
        stream.extend_from_slice(&out[..n]);
    }

    let mut payload_out = [0u8; MAX_RECORD_LEN];
    let mut record_scratch = [0u8; MAX_RECORD_LEN];
    let mut decoded = Vec::new();
    let mut consumed = 0usize;

    for &byte in &stream {
        consumed += 1;
        if let DecodeProgress::Frame { payload_len, .. } =
            decoder.push(byte, &mut record_scratch, &mut payload_out, &keystore, None)
        {
            decoded.push(payload_out[..payload_len].to_vec());
        }
    }

    assert_eq!(decoded, vec![b"one".to_vec(), b"two".to_vec(), b"three".to_vec()]);
    assert_eq!(consumed, stream.len());
}
