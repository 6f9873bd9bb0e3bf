/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Definitions of the events that the application emits for event handling and logging.
//!
//! An event is emitted after the action it describes has completed. Handlers for these events can be
//! registered through the [`KVStoreAppSpec`](crate::kv_store_app::KVStoreAppSpec) builder, and default
//! loggers for all of them are enabled by [`Configuration::log_events`](crate::config::Configuration).
//!
//! The `timestamp` of an event is taken from the local clock. It is only meant for observability, and
//! never influences any response or write.

use std::time::SystemTime;

use crate::kv_store::block_batch::BlockHeight;

pub enum Event {
    CheckTx(CheckTxEvent),
    BeginBlock(BeginBlockEvent),
    DeliverTx(DeliverTxEvent),
    CommitBlock(CommitBlockEvent),
    Query(QueryEvent),
}

/// A transaction was classified for admission into the mempool.
pub struct CheckTxEvent {
    pub timestamp: SystemTime,
    /// SHA-256 hash of the transaction bytes.
    pub tx_hash: [u8; 32],
    pub code: u32,
}

/// A block was opened.
pub struct BeginBlockEvent {
    pub timestamp: SystemTime,
    pub height: BlockHeight,
}

/// A transaction in the open block was applied (`code == 0`) or skipped (any other code).
pub struct DeliverTxEvent {
    pub timestamp: SystemTime,
    pub height: BlockHeight,
    pub tx_hash: [u8; 32],
    pub code: u32,
}

/// The writes of a block were persisted into the committed store.
pub struct CommitBlockEvent {
    pub timestamp: SystemTime,
    pub height: BlockHeight,
    /// Number of transactions applied in the block.
    pub writes: usize,
}

/// A key was looked up in the committed store.
pub struct QueryEvent {
    pub timestamp: SystemTime,
    pub key: Vec<u8>,
    pub found: bool,
}
