/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The signed key-value store application.
//!
//! [`KVStoreApp`] implements the [callback protocol](crate::abci) on top of any [`KVStore`]. Every
//! transaction it accepts writes one value, signed by its author, into one key of the committed store.
//!
//! ## Block lifecycle
//!
//! The application is always in one of two states:
//!
//! |State|Entered by|Allowed calls|
//! |---|---|---|
//! |Idle|Construction, `commit`|`check_tx`, `query`, `begin_block`, pass-through calls|
//! |Block open|`begin_block`|`deliver_tx`, `commit`, plus everything allowed in Idle except `begin_block`|
//!
//! While a block is open, its writes are buffered in a [`BlockBatch`]. Transactions delivered later in
//! the block are checked against a view that includes these writes, so a block containing the same
//! transaction twice applies it once and rejects the second copy as a duplicate. [`check_tx`] and
//! [`query`] never see the open block's writes.
//!
//! Calling `deliver_tx` or `commit` while Idle, or `begin_block` while a block is open, returns a
//! [`ProtocolError`].
//!
//! ## Starting an application
//!
//! ```ignore
//! let app =
//!     KVStoreAppSpec::builder()
//!     .kv_store(kv_store)
//!     .configuration(configuration)
//!     .on_commit_block(commit_handler)
//!     .build()
//!     .into_app();
//! ```
//!
//! ### Required setters
//!
//! - `.kv_store(...)`
//! - `.configuration(...)`
//!
//! ### Optional setters
//!
//! The optional setters are for registering user-defined event handlers for events from [crate::events]:
//! - `.on_check_tx(...)`
//! - `.on_begin_block(...)`
//! - `.on_deliver_tx(...)`
//! - `.on_commit_block(...)`
//! - `.on_query(...)`
//!
//! [`check_tx`]: Application::check_tx
//! [`query`]: Application::query

use std::mem;
use std::time::SystemTime;

use typed_builder::TypedBuilder;

use crate::abci::{
    messages::{self, *},
    AppError, Application, ProtocolError,
};
use crate::admission::{self, AdmissionOutcome};
use crate::config::Configuration;
use crate::event_bus::{EventHandlers, HandlerPtr};
use crate::events::{
    BeginBlockEvent, CheckTxEvent, CommitBlockEvent, DeliverTxEvent, Event, QueryEvent,
};
use crate::kv_store::{
    block_batch::BlockBatch,
    pluggables::{KVGet, KVStore},
};
use crate::types::crypto_primitives::{CryptoHasher, Digest};

/// Stores all necessary parameters and trait implementations required to create a [KVStoreApp].
#[derive(TypedBuilder)]
#[builder(builder_method(doc = "
    Create a builder for building a [KVStoreAppSpec]. On the builder call the following methods to construct a valid [KVStoreAppSpec].

    Required:
    - `.kv_store(...)`
    - `.configuration(...)`

    Optional:
    - `.on_check_tx(...)`
    - `.on_begin_block(...)`
    - `.on_deliver_tx(...)`
    - `.on_commit_block(...)`
    - `.on_query(...)`
"))]
pub struct KVStoreAppSpec<K: KVStore> {
    // Required parameters
    #[builder(setter(doc = "Set the implementation of the committed store. The argument must implement the [KVStore](crate::kv_store::pluggables::KVStore) trait. Required."))]
    kv_store: K,
    #[builder(setter(doc = "Set the [configuration](Configuration) of the application. Required."))]
    configuration: Configuration,
    // Optional parameters
    #[builder(default, setter(transform = |handler: impl Fn(&CheckTxEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<CheckTxEvent>),
    doc = "Register a handler closure to be invoked after a transaction is checked for admission into the mempool. Optional."))]
    on_check_tx: Option<HandlerPtr<CheckTxEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&BeginBlockEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<BeginBlockEvent>),
    doc = "Register a handler closure to be invoked after a block is opened. Optional."))]
    on_begin_block: Option<HandlerPtr<BeginBlockEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&DeliverTxEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<DeliverTxEvent>),
    doc = "Register a handler closure to be invoked after a transaction in the open block is applied or skipped. Optional."))]
    on_deliver_tx: Option<HandlerPtr<DeliverTxEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&CommitBlockEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<CommitBlockEvent>),
    doc = "Register a handler closure to be invoked after a block is committed. Optional."))]
    on_commit_block: Option<HandlerPtr<CommitBlockEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&QueryEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<QueryEvent>),
    doc = "Register a handler closure to be invoked after the committed store is queried. Optional."))]
    on_query: Option<HandlerPtr<QueryEvent>>,
}

impl<K: KVStore> KVStoreAppSpec<K> {
    /// Create the [KVStoreApp] described by this `KVStoreAppSpec`. The application starts with no block
    /// open.
    pub fn into_app(self) -> KVStoreApp<K> {
        let event_handlers = EventHandlers::new(
            self.configuration.log_events,
            self.on_check_tx,
            self.on_begin_block,
            self.on_deliver_tx,
            self.on_commit_block,
            self.on_query,
        );

        KVStoreApp {
            kv_store: self.kv_store,
            configuration: self.configuration,
            block_state: BlockState::Idle,
            event_handlers,
        }
    }
}

/// An [`Application`] that stores signed values under keys chosen by their authors.
pub struct KVStoreApp<K: KVStore> {
    kv_store: K,
    configuration: Configuration,
    block_state: BlockState,
    event_handlers: EventHandlers,
}

enum BlockState {
    Idle,
    BlockOpen(BlockBatch),
}

impl<K: KVStore> KVStoreApp<K> {
    /// Get the committed store that this application reads from and commits into.
    pub fn kv_store(&self) -> &K {
        &self.kv_store
    }

    /// Check whether a block is currently open.
    pub fn is_block_open(&self) -> bool {
        matches!(self.block_state, BlockState::BlockOpen(_))
    }

    // Apply the reporting options in the configuration to `outcome`.
    fn reported(&self, outcome: AdmissionOutcome) -> AdmissionOutcome {
        if self.configuration.collapse_verification_errors {
            outcome.collapse_verification_error()
        } else {
            outcome
        }
    }
}

impl<K: KVStore> Application for KVStoreApp<K> {
    fn check_tx(&self, request: RequestCheckTx) -> Result<ResponseCheckTx, AppError> {
        let outcome = admission::classify(&request.tx, &self.kv_store.snapshot())
            .map_err(|err| fatal(AppError::Storage(err)))?;
        let outcome = self.reported(outcome);
        if !outcome.is_accepted() {
            log::debug!("Rejected transaction in check_tx: {}", outcome);
        }

        self.event_handlers.fire_handlers(Event::CheckTx(CheckTxEvent {
            timestamp: SystemTime::now(),
            tx_hash: tx_hash(&request.tx),
            code: outcome.code(),
        }));

        Ok(ResponseCheckTx {
            code: outcome.code(),
            log: outcome.log(),
        })
    }

    fn begin_block(&mut self, request: RequestBeginBlock) -> Result<ResponseBeginBlock, AppError> {
        let height = request.header.height;
        if let BlockState::BlockOpen(batch) = &self.block_state {
            return Err(fatal(AppError::Protocol(ProtocolError::BlockAlreadyOpen {
                open: batch.height(),
                requested: height,
            })));
        }

        self.block_state = BlockState::BlockOpen(BlockBatch::new(height));

        self.event_handlers
            .fire_handlers(Event::BeginBlock(BeginBlockEvent {
                timestamp: SystemTime::now(),
                height,
            }));

        Ok(ResponseBeginBlock::default())
    }

    fn deliver_tx(&mut self, request: RequestDeliverTx) -> Result<ResponseDeliverTx, AppError> {
        let batch = match &mut self.block_state {
            BlockState::BlockOpen(batch) => batch,
            BlockState::Idle => {
                return Err(fatal(AppError::Protocol(ProtocolError::NoOpenBlock {
                    method: "deliver_tx",
                })))
            }
        };

        let admission = admission::admit(&request.tx, &batch.view(self.kv_store.snapshot()))
            .map_err(|err| fatal(AppError::Storage(err)))?;
        let (outcome, events) = match admission {
            Ok(transaction) => {
                batch.set(transaction.key, transaction.value);
                (AdmissionOutcome::Accepted, vec![messages::Event::post_success()])
            }
            Err(rejection) => (rejection, Vec::new()),
        };
        let height = batch.height();

        let outcome = self.reported(outcome);
        if !outcome.is_accepted() {
            log::debug!("Skipped transaction in block {}: {}", height, outcome);
        }

        self.event_handlers
            .fire_handlers(Event::DeliverTx(DeliverTxEvent {
                timestamp: SystemTime::now(),
                height,
                tx_hash: tx_hash(&request.tx),
                code: outcome.code(),
            }));

        Ok(ResponseDeliverTx {
            code: outcome.code(),
            log: outcome.log(),
            events,
        })
    }

    fn commit(&mut self) -> Result<ResponseCommit, AppError> {
        let batch = match mem::replace(&mut self.block_state, BlockState::Idle) {
            BlockState::BlockOpen(batch) => batch,
            BlockState::Idle => {
                return Err(fatal(AppError::Protocol(ProtocolError::NoOpenBlock {
                    method: "commit",
                })))
            }
        };

        let height = batch.height();
        let writes = batch.len();
        self.kv_store
            .write(batch.into_write_batch())
            .map_err(|err| fatal(AppError::Storage(err)))?;

        self.event_handlers
            .fire_handlers(Event::CommitBlock(CommitBlockEvent {
                timestamp: SystemTime::now(),
                height,
                writes,
            }));

        Ok(ResponseCommit { data: Vec::new() })
    }

    fn query(&self, request: RequestQuery) -> Result<ResponseQuery, AppError> {
        let value = self
            .kv_store
            .get(&request.data)
            .map_err(|err| fatal(AppError::Storage(err)))?;
        let found = value.is_some();

        self.event_handlers.fire_handlers(Event::Query(QueryEvent {
            timestamp: SystemTime::now(),
            key: request.data.clone(),
            found,
        }));

        Ok(ResponseQuery {
            key: request.data,
            value: value.unwrap_or_default(),
            log: if found { KEY_FOUND } else { KEY_NOT_FOUND }.to_string(),
        })
    }
}

// Log `err` before handing it back to the caller, which is expected to stop the process.
fn fatal(err: AppError) -> AppError {
    log::error!("Fatal application error: {}", err);
    err
}

fn tx_hash(tx: &[u8]) -> [u8; 32] {
    CryptoHasher::digest(tx).into()
}
