/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The block-scoped write buffer and the view of state that it presents while a block is executing.

use std::collections::HashMap;

use super::pluggables::{KVGet, KVStoreError, WriteBatch};

/// Height of a block, as given by the replication engine in the block's header.
pub type BlockHeight = u64;

/// Writes produced by the transactions of one block that have not yet been committed.
///
/// Writes are kept in delivery order. If the same key is written more than once, the latest write wins,
/// both when reading through a [`BlockBatchView`] and when the batch is [committed](Self::into_write_batch).
pub struct BlockBatch {
    height: BlockHeight,
    writes: Vec<(Vec<u8>, Vec<u8>)>,

    // Position in `writes` of the latest write to each key.
    latest: HashMap<Vec<u8>, usize>,
}

impl BlockBatch {
    /// Create an empty batch for the block at `height`.
    pub fn new(height: BlockHeight) -> BlockBatch {
        BlockBatch {
            height,
            writes: Vec::new(),
            latest: HashMap::new(),
        }
    }

    pub fn height(&self) -> BlockHeight {
        self.height
    }

    /// Buffer a write of `value` into `key`.
    pub fn set(&mut self, key: &[u8], value: &[u8]) {
        self.latest.insert(key.to_vec(), self.writes.len());
        self.writes.push((key.to_vec(), value.to_vec()));
    }

    /// Get the latest value written into `key` in this batch, if any.
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.latest
            .get(key)
            .map(|&position| self.writes[position].1.as_slice())
    }

    /// Number of writes buffered in this batch.
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Get a view of state that shows the writes in this batch on top of `committed`.
    pub fn view<S: KVGet>(&self, committed: S) -> BlockBatchView<'_, S> {
        BlockBatchView {
            batch: self,
            committed,
        }
    }

    /// Convert this batch into a write batch of the key-value store, replaying the writes in delivery
    /// order.
    pub fn into_write_batch<W: WriteBatch>(self) -> W {
        let mut wb = W::new();
        for (key, value) in &self.writes {
            wb.set(key, value);
        }
        wb
    }
}

/// View of state as seen by a transaction that is being delivered in a block.
///
/// Keys written earlier in the same block are read from the [`BlockBatch`]; all other keys are read from
/// the committed store.
pub struct BlockBatchView<'a, S: KVGet> {
    batch: &'a BlockBatch,
    committed: S,
}

impl<'a, S: KVGet> KVGet for BlockBatchView<'a, S> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        match self.batch.get(key) {
            Some(value) => Ok(Some(value.to_vec())),
            None => self.committed.get(key),
        }
    }
}
