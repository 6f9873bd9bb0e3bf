/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Traits for pluggable persistence of the committed store.

use thiserror::Error;

/// A key-value store with atomic, batched writes and snapshot reads.
///
/// ## Atomicity
///
/// [`write`](Self::write) must make either all or none of the batch's writes visible, and a
/// [`Snapshot`](Self::Snapshot) taken before a `write` must never observe only part of it.
pub trait KVStore: KVGet + Send + 'static {
    type WriteBatch: WriteBatch;
    type Snapshot<'a>: 'a + KVGet;

    fn write(&mut self, wb: Self::WriteBatch) -> Result<(), KVStoreError>;
    fn snapshot<'b>(&'b self) -> Self::Snapshot<'_>;
}

/// Point lookups into a key-value store or into a view of one.
pub trait KVGet {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError>;
}

impl<T: KVGet + ?Sized> KVGet for &T {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        (**self).get(key)
    }
}

pub trait WriteBatch {
    fn new() -> Self;
    fn set(&mut self, key: &[u8], value: &[u8]);
}

/// Error when the underlying key-value store fails to complete an operation.
///
/// These errors indicate a fault local to this replica. They are never the result of the contents of a
/// transaction, and masking them would let this replica's state silently diverge from its peers'.
#[derive(Debug, Error)]
pub enum KVStoreError {
    #[error("failed to read key {} from the key-value store: {reason}", hex::encode(.key))]
    Read { key: Vec<u8>, reason: String },

    #[error("failed to write a batch of {writes} writes into the key-value store: {reason}")]
    Write { writes: usize, reason: String },

    #[error("failed to open the key-value store: {reason}")]
    Open { reason: String },
}
