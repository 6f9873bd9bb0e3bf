/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The callback protocol through which a replication engine drives the application.
//!
//! The replication engine (e.g., a Tendermint-style BFT engine) orders transactions into blocks and then
//! hands them to the application, one call at a time, through the methods of the [`Application`] trait.
//!
//! # Call sequence
//!
//! ```text
//! check_tx* ──► begin_block ──► deliver_tx* ──► end_block ──► commit ──► (repeat)
//!                                                                 query*, info at any time
//! ```
//!
//! 1. [`check_tx`](Application::check_tx) is called for every transaction submitted to this replica,
//!    before it is gossiped. It must not change state.
//! 2. [`begin_block`](Application::begin_block) opens a block.
//! 3. [`deliver_tx`](Application::deliver_tx) is called once for each transaction in the block, in
//!    block order.
//! 4. [`commit`](Application::commit) makes the writes of the block visible to [`query`](Application::query)
//!    and to future blocks.
//!
//! The replication engine makes these calls one at a time, so implementations may assume that no two
//! methods ever run concurrently.
//!
//! # Fatal errors
//!
//! Methods that can fail return an [`AppError`]. These are never caused by the contents of a
//! transaction (which are reported in the response's `code` instead), but by a fault in this replica:
//! its storage failed, or the engine called the methods out of order. Continuing after either could make
//! this replica's state diverge from its peers', so the process embedding the application must stop once
//! an `AppError` is returned.
//!
//! # Determinism
//!
//! Given the same sequence of calls, every replica must produce the same responses (apart from `log`
//! strings) and end up with the same state. Implementations must therefore not let wall-clock time,
//! randomness, or any other local information influence responses or writes.

use thiserror::Error;

use crate::kv_store::block_batch::BlockHeight;
use crate::kv_store::pluggables::KVStoreError;

pub mod messages;
use messages::*;

/// Methods that a type needs to implement to be driven by a replication engine through the callback
/// protocol.
///
/// Methods that have no bearing on application state have default implementations that acknowledge the
/// request and return an empty response.
pub trait Application: Send + 'static {
    /// Get application metadata.
    fn info(&self, _request: RequestInfo) -> ResponseInfo {
        ResponseInfo::default()
    }

    /// Called once, when the chain is created.
    fn init_chain(&mut self, _request: RequestInitChain) -> ResponseInitChain {
        ResponseInitChain::default()
    }

    /// Decide whether a transaction may enter the mempool.
    fn check_tx(&self, request: RequestCheckTx) -> Result<ResponseCheckTx, AppError>;

    /// Open a new block.
    fn begin_block(&mut self, request: RequestBeginBlock) -> Result<ResponseBeginBlock, AppError>;

    /// Apply a transaction of the currently open block.
    fn deliver_tx(&mut self, request: RequestDeliverTx) -> Result<ResponseDeliverTx, AppError>;

    /// Called after the last transaction of the currently open block has been delivered.
    fn end_block(&mut self, _request: RequestEndBlock) -> ResponseEndBlock {
        ResponseEndBlock::default()
    }

    /// Persist the writes of the currently open block and close it.
    fn commit(&mut self) -> Result<ResponseCommit, AppError>;

    /// Read from the committed state.
    fn query(&self, request: RequestQuery) -> Result<ResponseQuery, AppError>;

    fn list_snapshots(&self) -> ResponseListSnapshots {
        ResponseListSnapshots::default()
    }

    fn offer_snapshot(&mut self, _request: RequestOfferSnapshot) -> ResponseOfferSnapshot {
        ResponseOfferSnapshot::default()
    }

    fn load_snapshot_chunk(&self, _request: RequestLoadSnapshotChunk) -> ResponseLoadSnapshotChunk {
        ResponseLoadSnapshotChunk::default()
    }

    fn apply_snapshot_chunk(
        &mut self,
        _request: RequestApplySnapshotChunk,
    ) -> ResponseApplySnapshotChunk {
        ResponseApplySnapshotChunk::default()
    }
}

/// Route `request` to the matching method of `app` and wrap its response.
pub fn dispatch<A: Application>(app: &mut A, request: Request) -> Result<Response, AppError> {
    Ok(match request {
        Request::Info(request) => Response::Info(app.info(request)),
        Request::InitChain(request) => Response::InitChain(app.init_chain(request)),
        Request::CheckTx(request) => Response::CheckTx(app.check_tx(request)?),
        Request::BeginBlock(request) => Response::BeginBlock(app.begin_block(request)?),
        Request::DeliverTx(request) => Response::DeliverTx(app.deliver_tx(request)?),
        Request::EndBlock(request) => Response::EndBlock(app.end_block(request)),
        Request::Commit => Response::Commit(app.commit()?),
        Request::Query(request) => Response::Query(app.query(request)?),
        Request::ListSnapshots => Response::ListSnapshots(app.list_snapshots()),
        Request::OfferSnapshot(request) => Response::OfferSnapshot(app.offer_snapshot(request)),
        Request::LoadSnapshotChunk(request) => {
            Response::LoadSnapshotChunk(app.load_snapshot_chunk(request))
        }
        Request::ApplySnapshotChunk(request) => {
            Response::ApplySnapshotChunk(app.apply_snapshot_chunk(request))
        }
    })
}

/// Fatal error returned by a method of [`Application`].
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Storage(#[from] KVStoreError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Error when the replication engine calls the block lifecycle methods out of order.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("{method} was called while no block is open")]
    NoOpenBlock { method: &'static str },

    #[error("begin_block was called for block {requested} while block {open} is still open")]
    BlockAlreadyOpen {
        open: BlockHeight,
        requested: BlockHeight,
    },
}
