//! Key-value storage abstraction.
//!
//! The validator runs against browser local/session storage in its original
//! home; here storage is an injected trait so the logic is testable and can
//! back onto memory or a file:
//!
//! - `Storage`: the key-value seam the validator reads and writes through
//! - `MemoryStorage`: in-process map, used by tests and embedders
//! - `FileStorage`: JSON file on disk, used by the CLI
//!
//! A persistent area and a transient area are passed to the guard as two
//! independent `Storage` handles.

pub mod file;
pub mod memory;

use thiserror::Error;

pub use file::FileStorage;
pub use memory::MemoryStorage;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage contents are not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

/// Key-value storage seam.
///
/// Mirrors the browser storage surface the validator was written against:
/// string keys, string values, enumeration of key names. Implementations
/// may fail on any call; the validator treats failures as "invalid" rather
/// than propagating them.
pub trait Storage {
    /// Read the value stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove the value stored under `key`; removing an absent key is not
    /// an error
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;

    /// Names of every stored key
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}
