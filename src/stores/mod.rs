//! Storage layer for account records. Provides:
//! - The ordered, persisted account collection ([`AccountStore`])
//! - The key-value slot abstraction it writes through ([`KeyValueBackend`])
//! - In-memory and directory-backed slot implementations
//!
//! All operations are synchronous; a mutation returns only after the
//! collection has been written back in full.

mod accounts;
mod backend;
mod file;

pub use accounts::{AccountStore, LoadOutcome, STORAGE_KEY};
pub use backend::{KeyValueBackend, MemoryBackend};
pub use file::FileBackend;
pub(crate) use file::validate_key;
