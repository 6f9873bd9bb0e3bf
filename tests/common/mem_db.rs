//! A simple, volatile, in-memory implementation of [`KVStore`] that can be told to fail.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard,
    },
};

use signed_kvstore::kv_store::pluggables::{KVGet, KVStore, KVStoreError, WriteBatch};

/// An in-memory implementation of [`KVStore`].
///
/// Clones share the same map and the same fault switches, so a test can keep a clone to inspect the
/// committed state of an application that owns another.
#[derive(Clone)]
pub(crate) struct MemDB {
    map: Arc<Mutex<HashMap<Vec<u8>, Vec<u8>>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl MemDB {
    /// Create a new, empty `MemDB`.
    pub(crate) fn new() -> MemDB {
        MemDB {
            map: Arc::new(Mutex::new(HashMap::new())),
            fail_reads: Arc::new(AtomicBool::new(false)),
            fail_writes: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Make every subsequent read fail (or succeed again).
    pub(crate) fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent write fail (or succeed again). A failed write changes nothing.
    pub(crate) fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of keys in the store.
    pub(crate) fn len(&self) -> usize {
        self.map.lock().unwrap().len()
    }

    /// Insert directly into the store, bypassing the application.
    pub(crate) fn insert(&self, key: &[u8], value: &[u8]) {
        self.map.lock().unwrap().insert(key.to_vec(), value.to_vec());
    }

    /// A copy of the whole store, for comparing the states of two stores.
    pub(crate) fn contents(&self) -> HashMap<Vec<u8>, Vec<u8>> {
        self.map.lock().unwrap().clone()
    }
}

impl KVStore for MemDB {
    type WriteBatch = MemWriteBatch;
    type Snapshot<'a> = MemDBSnapshot<'a>;

    fn write(&mut self, wb: Self::WriteBatch) -> Result<(), KVStoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(KVStoreError::Write {
                writes: wb.insertions.len(),
                reason: String::from("injected write fault"),
            });
        }

        let mut map = self.map.lock().unwrap();
        for (key, value) in wb.insertions {
            map.insert(key, value);
        }
        Ok(())
    }

    fn snapshot<'b>(&'b self) -> MemDBSnapshot<'b> {
        MemDBSnapshot {
            map: self.map.lock().unwrap(),
            fail_reads: &self.fail_reads,
        }
    }
}

impl KVGet for MemDB {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        read(&self.map.lock().unwrap(), &self.fail_reads, key)
    }
}

// A simple implementation of [`WriteBatch`]. Insertions are kept in order.
pub(crate) struct MemWriteBatch {
    insertions: Vec<(Vec<u8>, Vec<u8>)>,
}

impl WriteBatch for MemWriteBatch {
    fn new() -> Self {
        MemWriteBatch {
            insertions: Vec::new(),
        }
    }

    fn set(&mut self, key: &[u8], value: &[u8]) {
        self.insertions.push((key.to_vec(), value.to_vec()));
    }
}

/// A simple implementation of [`KVGet`] used as `KVStore::Snapshot` for `MemDB`.
pub(crate) struct MemDBSnapshot<'a> {
    map: MutexGuard<'a, HashMap<Vec<u8>, Vec<u8>>>,
    fail_reads: &'a AtomicBool,
}

impl KVGet for MemDBSnapshot<'_> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        read(&self.map, self.fail_reads, key)
    }
}

fn read(
    map: &HashMap<Vec<u8>, Vec<u8>>,
    fail_reads: &AtomicBool,
    key: &[u8],
) -> Result<Option<Vec<u8>>, KVStoreError> {
    if fail_reads.load(Ordering::SeqCst) {
        return Err(KVStoreError::Read {
            key: key.to_vec(),
            reason: String::from("injected read fault"),
        });
    }
    Ok(map.get(key).cloned())
}
