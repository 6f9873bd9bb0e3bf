/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The persistent state of the application.
//!
//! # Committed state and the block batch
//!
//! The application keeps a single key-value namespace, the "committed store". Nothing writes into it
//! directly. Instead, writes produced while executing a block are buffered in a [`BlockBatch`], which is
//! opened when the block begins and then applied to the committed store in a single, atomic
//! [write](pluggables::KVStore::write) when the block is committed. A block whose batch is never
//! written (because the process failed before commit) leaves no trace in the committed store.
//!
//! Reads happen through two kinds of views, both implementing [`KVGet`](pluggables::KVGet):
//! 1. A [snapshot](pluggables::KVStore::snapshot) of the committed store, used outside of blocks.
//! 2. A [`BlockBatchView`], which shows the writes of the block in progress on top of a snapshot of the
//!    committed store, used while a block is being executed.
//!
//! # Pluggable persistence
//!
//! - The committed store is kept in persistent storage, most probably in the host's filesystem.
//! - Library users get to choose how exactly this is done.
//! - The application merely requires that whatever the user provides as a persistence mechanism
//!   implements the abstract functionality of a key-value store with atomic, batched writes.
//! - This abstract functionality is made concrete by the traits defined in the [`pluggables`] module.
//! - A ready-made implementation on top of [sled](https://docs.rs/sled) is available in [`sled_db`] if
//!   the `sled` feature is enabled (it is by default).

pub mod block_batch;
pub use block_batch::{BlockBatch, BlockBatchView};

pub mod pluggables;

#[cfg(feature = "sled")]
pub mod sled_db;
