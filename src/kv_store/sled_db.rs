/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! A durable implementation of [`KVStore`] backed by the [sled](https://docs.rs/sled) embedded database.

use std::path::Path;

use sled::{Batch, Db};

use super::pluggables::{KVGet, KVStore, KVStoreError, WriteBatch};

/// Committed store kept in a sled database on the local filesystem.
///
/// Batches are applied with [`sled::Tree::apply_batch`], which is atomic, and then flushed to disk
/// before [`write`](KVStore::write) returns.
#[derive(Clone)]
pub struct SledDB(Db);

impl SledDB {
    /// Open (creating if necessary) the sled database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<SledDB, KVStoreError> {
        sled::open(path)
            .map(SledDB)
            .map_err(|err| KVStoreError::Open {
                reason: err.to_string(),
            })
    }
}

impl KVStore for SledDB {
    type WriteBatch = SledWriteBatch;
    type Snapshot<'a> = SledSnapshot<'a>;

    fn write(&mut self, wb: Self::WriteBatch) -> Result<(), KVStoreError> {
        let writes = wb.writes;
        self.0
            .apply_batch(wb.batch)
            .and_then(|_| self.0.flush())
            .map(|_| ())
            .map_err(|err| KVStoreError::Write {
                writes,
                reason: err.to_string(),
            })
    }

    fn snapshot<'b>(&'b self) -> SledSnapshot<'b> {
        SledSnapshot(&self.0)
    }
}

impl KVGet for SledDB {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        get(&self.0, key)
    }
}

/// [`WriteBatch`] for [`SledDB`].
pub struct SledWriteBatch {
    batch: Batch,
    writes: usize,
}

impl WriteBatch for SledWriteBatch {
    fn new() -> Self {
        SledWriteBatch {
            batch: Batch::default(),
            writes: 0,
        }
    }

    fn set(&mut self, key: &[u8], value: &[u8]) {
        self.batch.insert(key, value);
        self.writes += 1;
    }
}

/// [`KVGet`] used as `KVStore::Snapshot` for [`SledDB`].
///
/// Point reads in sled are linearizable and batches are applied atomically, so a single lookup can never
/// observe a partially applied batch.
pub struct SledSnapshot<'a>(&'a Db);

impl KVGet for SledSnapshot<'_> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        get(self.0, key)
    }
}

fn get(db: &Db, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
    db.get(key)
        .map(|value| value.map(|ivec| ivec.to_vec()))
        .map_err(|err| KVStoreError::Read {
            key: key.to_vec(),
            reason: err.to_string(),
        })
}
