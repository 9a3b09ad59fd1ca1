// Ordered key/value storage used by the governance store.
//
// Backends only need three things: point reads, ordered scans and atomic
// batches. Everything governance-specific lives in `committee::store`.

pub mod codec;
pub mod memory;
pub mod sled_backend;

use std::path::PathBuf;

use thiserror::Error;

pub use memory::MemoryBackend;
pub use sled_backend::SledBackend;

/// Error type for storage backends and record encoding
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Backend error: {0}")]
    Backend(#[from] sled::Error),

    #[error("Failed to encode record: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("Failed to decode record: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("Corrupt key: {0}")]
    CorruptKey(String),
}

/// A single write inside a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    Put(Vec<u8>, Vec<u8>),
    Delete(Vec<u8>),
}

/// Writes that are applied together or not at all
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }

    pub fn put(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.ops.push(BatchOp::Put(key, value));
    }

    pub fn delete(&mut self, key: Vec<u8>) {
        self.ops.push(BatchOp::Delete(key));
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn into_ops(self) -> Vec<BatchOp> {
        self.ops
    }
}

/// Ordered byte-keyed store
pub trait KvBackend {
    /// Read a single key
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError>;

    /// All entries whose key starts with `prefix`, ascending by key
    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StorageError>;

    /// All entries with `start <= key < end`, ascending by key
    fn scan_range(&self, start: &[u8], end: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StorageError>;

    /// Apply every op in the batch atomically
    fn apply(&mut self, batch: WriteBatch) -> Result<(), StorageError>;
}

/// Which backend to open
#[derive(Debug, Clone)]
pub enum BackendChoice {
    Memory,
    Sled(PathBuf),
}

/// Runtime-selected backend, used where the choice comes from configuration
pub enum AnyBackend {
    Memory(MemoryBackend),
    Sled(SledBackend),
}

impl AnyBackend {
    pub fn open(choice: &BackendChoice) -> Result<Self, StorageError> {
        match choice {
            BackendChoice::Memory => Ok(AnyBackend::Memory(MemoryBackend::new())),
            BackendChoice::Sled(path) => Ok(AnyBackend::Sled(SledBackend::open(path)?)),
        }
    }
}

impl KvBackend for AnyBackend {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        match self {
            AnyBackend::Memory(b) => b.get(key),
            AnyBackend::Sled(b) => b.get(key),
        }
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StorageError> {
        match self {
            AnyBackend::Memory(b) => b.scan_prefix(prefix),
            AnyBackend::Sled(b) => b.scan_prefix(prefix),
        }
    }

    fn scan_range(&self, start: &[u8], end: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StorageError> {
        match self {
            AnyBackend::Memory(b) => b.scan_range(start, end),
            AnyBackend::Sled(b) => b.scan_range(start, end),
        }
    }

    fn apply(&mut self, batch: WriteBatch) -> Result<(), StorageError> {
        match self {
            AnyBackend::Memory(b) => b.apply(batch),
            AnyBackend::Sled(b) => b.apply(batch),
        }
    }
}
