//! Keystore contract: a simple key-by-id lookup consumed by the session
//! layer.
//!
//! The core never owns key persistence — it calls this trait. Implementers
//! may back it with a file, an HSM, flash storage, or (as here) a small
//! fixed-capacity in-memory table for tests and single-key deployments.

use cinch_crypto::SessionKey;

/// Outcome of a keystore lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyLookupError {
    /// No key is registered under the requested id.
    NotFound,
}

/// A key-by-id lookup interface.
///
/// Implementations MUST be safe to call concurrently from multiple threads
/// (spec.md §5: "the keystore lookup function may be called concurrently;
/// it MUST be safe for concurrent read access") and MUST NOT mutate global
/// state observable by the core.
pub trait Keystore {
    /// Resolve `key_id` to its key material.
    ///
    /// # Errors
    ///
    /// Returns [`KeyLookupError::NotFound`] if no key is registered under
    /// `key_id`.
    fn lookup(&self, key_id: u32) -> Result<SessionKey, KeyLookupError>;
}

/// A fixed-capacity, allocation-free keystore backed by an array of
/// `(key_id, key)` entries.
///
/// Intended for tests and small embedded deployments with a handful of
/// known keys. `N` bounds the number of entries; `register` fails silently
/// past capacity (callers needing more entries should hold a larger `N` or
/// provide their own `Keystore`).
pub struct StaticKeystore<const N: usize> {
    entries: [Option<(u32, SessionKey)>; N],
}

impl<const N: usize> StaticKeystore<N> {
    /// An empty keystore with no registered keys.
    #[must_use]
    pub fn new() -> Self {
        Self { entries: [const { None }; N] }
    }

    /// Register a key under `key_id`, overwriting any existing entry for
    /// that id. Returns `false` (without registering) if the table is full
    /// and `key_id` is not already present.
    pub fn register(&mut self, key_id: u32, key: SessionKey) -> bool {
        if let Some(slot) = self.entries.iter_mut().find(|e| matches!(e, Some((id, _)) if *id == key_id))
        {
            *slot = Some((key_id, key));
            return true;
        }
        if let Some(slot) = self.entries.iter_mut().find(|e| e.is_none()) {
            *slot = Some((key_id, key));
            return true;
        }
        false
    }
}

impl<const N: usize> Default for StaticKeystore<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Keystore for StaticKeystore<N> {
    fn lookup(&self, key_id: u32) -> Result<SessionKey, KeyLookupError> {
        self.entries
            .iter()
            .find_map(|e| e.as_ref().filter(|(id, _)| *id == key_id).map(|(_, key)| key.clone()))
            .ok_or(KeyLookupError::NotFound)
    }
}
