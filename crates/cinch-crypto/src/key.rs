//! Session key material.

use zeroize::Zeroize;

/// Length of a session key, in bytes.
pub const KEY_LEN: usize = 32;

/// A 32-byte symmetric key used to authenticate frames for one session.
///
/// The key is zeroized on drop and is never printed; `Debug` deliberately
/// omits the key bytes.
#[derive(Clone)]
pub struct SessionKey {
    bytes: [u8; KEY_LEN],
}

impl SessionKey {
    /// Wrap raw key bytes.
    #[must_use]
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Borrow the raw key bytes for use as an HMAC key.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl core::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionKey").field("bytes", &"<redacted>").finish()
    }
}

impl Drop for SessionKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}
