//! Session state machine: key material, nonce, sequence counters, and
//! policy for one authenticated peer relationship.

use cinch_crypto::{mac, SessionKey};

use crate::errors::CinchError;

/// Session processing policy bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    /// Command-class frames must be authenticated. Default: on.
    pub require_auth_for_commands: bool,
    /// Treat an unresolved key id as a hard failure rather than silently
    /// accepting unauthenticated traffic. Default: on.
    pub fail_closed_on_missing_key: bool,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self { require_auth_for_commands: true, fail_closed_on_missing_key: true }
    }
}

/// Session lifecycle state.
///
/// `Wrapped` is terminal until [`Session::rotate`] returns the session to
/// `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Accepting sign/verify calls.
    Ready,
    /// The sender-side sequence counter has exhausted its range; `sign`
    /// fails with [`CinchError::SequenceWrap`] until `rotate`.
    Wrapped,
}

impl SessionState {
    /// Whether the session is in the terminal `Wrapped` state.
    #[must_use]
    pub fn is_wrapped(self) -> bool {
        matches!(self, Self::Wrapped)
    }
}

/// The mutable state tying a key to a pair of communicating endpoints.
///
/// `nonce` establishes session identity at initialization time and is never
/// transmitted per-frame or mixed into the HMAC input — spec.md §4.3 fixes
/// this because the key+seq pair already uniquely scopes each frame within a
/// session.
pub struct Session {
    key_id: u32,
    key: SessionKey,
    #[allow(dead_code)]
    nonce: u64,
    next_seq: u32,
    last_accepted_seq: Option<u32>,
    policy: SessionPolicy,
    state: SessionState,
}

impl Session {
    /// Create a new session. `last_accepted_seq` starts unset, so the first
    /// `verify` call accepts any `seq_rx` value.
    #[must_use]
    pub fn init(key_id: u32, key: SessionKey, nonce: u64, start_seq: u32, policy: SessionPolicy) -> Self {
        Self {
            key_id,
            key,
            nonce,
            next_seq: start_seq,
            last_accepted_seq: None,
            policy,
            state: SessionState::Ready,
        }
    }

    /// The key id this session was initialized with.
    #[must_use]
    pub fn key_id(&self) -> u32 {
        self.key_id
    }

    /// The session's current policy.
    #[must_use]
    pub fn policy(&self) -> SessionPolicy {
        self.policy
    }

    /// The session's current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The sequence number the next [`Self::sign`] call will consume,
    /// without mutating any state.
    ///
    /// Callers need this to assemble the header bytes that get fed into the
    /// MAC before `sign` is actually called, since the header must already
    /// carry the `seq` value that `sign` will return.
    #[must_use]
    pub fn peek_next_seq(&self) -> u32 {
        self.next_seq
    }

    /// Produce a truncated HMAC-SHA256 tag over `header_and_payload`, and
    /// the sequence number consumed for it.
    ///
    /// Per spec.md §4.3, `header_and_payload` is the cleartext header bytes
    /// (version, type, flags, reserved, length, seq) concatenated with the
    /// payload bytes — the caller assembles this before calling `sign`,
    /// since `seq` itself must already reflect the value this call returns.
    ///
    /// # Errors
    ///
    /// Returns [`CinchError::SequenceWrap`] if the session is already
    /// `Wrapped`.
    pub fn sign(&mut self, header_and_payload: &[u8]) -> Result<([u8; mac::TAG_LEN], u32), CinchError> {
        if self.state.is_wrapped() {
            return Err(CinchError::SequenceWrap);
        }

        let seq_used = self.next_seq;
        let tag = mac::tag(&self.key, header_and_payload);

        match self.next_seq.checked_add(1) {
            Some(next) => self.next_seq = next,
            None => self.state = SessionState::Wrapped,
        }

        Ok((tag, seq_used))
    }

    /// Verify a received frame's tag and sequence number.
    ///
    /// Accepts iff `tag` verifies in constant time against
    /// `header_and_payload` AND `seq_rx > last_accepted_seq` (any value is
    /// accepted if no sequence has been accepted yet). On accept,
    /// `last_accepted_seq` is updated. On reject, session state is
    /// unchanged — spec.md §4.4: "no session state is mutated until all
    /// checks pass."
    ///
    /// # Errors
    ///
    /// - [`CinchError::AuthFailed`] if the tag does not verify.
    /// - [`CinchError::Replay`] if `seq_rx` is not strictly greater than
    ///   `last_accepted_seq`.
    pub fn verify(
        &mut self,
        header_and_payload: &[u8],
        tag: &[u8; mac::TAG_LEN],
        seq_rx: u32,
    ) -> Result<(), CinchError> {
        let expected = mac::tag(&self.key, header_and_payload);
        if !mac::verify(&expected, tag) {
            return Err(CinchError::AuthFailed);
        }

        if let Some(last) = self.last_accepted_seq {
            if seq_rx <= last {
                return Err(CinchError::Replay);
            }
        }

        self.last_accepted_seq = Some(seq_rx);
        Ok(())
    }

    /// Rotate to a new key, nonce, and starting sequence. Old key material
    /// is zeroized when the previous `SessionKey` is dropped. Returns the
    /// session to `Ready` and clears `last_accepted_seq`.
    pub fn rotate(&mut self, new_key_id: u32, new_key: SessionKey, new_nonce: u64, new_start_seq: u32) {
        self.key_id = new_key_id;
        self.key = new_key;
        self.nonce = new_nonce;
        self.next_seq = new_start_seq;
        self.last_accepted_seq = None;
        self.state = SessionState::Ready;
    }
}
