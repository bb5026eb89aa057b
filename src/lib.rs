//! Workspace root; carries no code of its own.
//!
//! `cinch`'s implementation lives in `crates/cinch-proto`, `crates/cinch-crypto`,
//! and `crates/cinch-core`. This crate exists only so the workspace root has a
//! buildable target; depend on the crates above directly.
