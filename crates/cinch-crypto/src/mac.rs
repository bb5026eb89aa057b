//! Truncated HMAC-SHA256 tag computation and constant-time verification.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::key::SessionKey;

type HmacSha256 = Hmac<Sha256>;

/// Length of the truncated tag, in bytes. HMAC-SHA256 produces a 32-byte
/// output; only the leftmost 16 bytes are kept on the wire.
pub const TAG_LEN: usize = 16;

/// Compute the truncated HMAC-SHA256 tag of `message` under `key`.
///
/// Returns the leftmost 16 bytes of the full 32-byte HMAC-SHA256 output.
#[must_use]
pub fn tag(key: &SessionKey, message: &[u8]) -> [u8; TAG_LEN] {
    let Ok(mut mac) = HmacSha256::new_from_slice(key.as_bytes()) else {
        unreachable!("HMAC-SHA256 accepts any key size, and SessionKey is fixed-size");
    };
    mac.update(message);
    let full = mac.finalize().into_bytes();

    let mut truncated = [0u8; TAG_LEN];
    truncated.copy_from_slice(&full[..TAG_LEN]);
    truncated
}

/// Compare two tags in constant time.
///
/// Returns `true` iff `a` and `b` are equal. The comparison always inspects
/// every byte of both tags regardless of where they first differ, so the
/// time taken does not leak which byte of a forged tag was wrong.
#[must_use]
pub fn verify(a: &[u8; TAG_LEN], b: &[u8; TAG_LEN]) -> bool {
    let mut diff: u8 = 0;
    for i in 0..TAG_LEN {
        diff |= a[i] ^ b[i];
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn tag_is_deterministic() {
        let key = SessionKey::new([0x0B; 32]);
        let a = tag(&key, b"telemetry payload");
        let b = tag(&key, b"telemetry payload");
        assert_eq!(a, b);
    }

    #[test]
    fn tag_changes_with_key() {
        let key_a = SessionKey::new([0x0B; 32]);
        let key_b = SessionKey::new([0x0C; 32]);
        assert_ne!(tag(&key_a, b"same message"), tag(&key_b, b"same message"));
    }

    #[test]
    fn tag_changes_with_message() {
        let key = SessionKey::new([0x0B; 32]);
        assert_ne!(tag(&key, b"message one"), tag(&key, b"message two"));
    }

    #[test]
    fn verify_accepts_equal_tags() {
        let key = SessionKey::new([0x0B; 32]);
        let t = tag(&key, b"payload");
        assert!(verify(&t, &t));
    }

    #[test]
    fn verify_rejects_single_bit_flip() {
        let key = SessionKey::new([0x0B; 32]);
        let mut t = tag(&key, b"payload");
        let forged = {
            t[0] ^= 0x01;
            t
        };
        assert!(!verify(&forged, &tag(&key, b"payload")));
    }

    proptest! {
        #[test]
        fn verify_matches_equality(a in any::<[u8; TAG_LEN]>(), b in any::<[u8; TAG_LEN]>()) {
            prop_assert_eq!(verify(&a, &b), a == b);
        }
    }
}
