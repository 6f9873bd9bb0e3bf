/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Requests and responses of the callback protocol.
//!
//! Every method of [`Application`](super::Application) takes one request type and returns one response
//! type. [`Request`] and [`Response`] wrap all of them for replication engines that deliver calls through
//! a single entry point (see [`dispatch`](super::dispatch)).
//!
//! Fields that the application does not act on are still carried, so that the types mirror what the
//! replication engine sends.

/// Every request in the callback protocol.
#[derive(Clone, Debug)]
pub enum Request {
    Info(RequestInfo),
    InitChain(RequestInitChain),
    CheckTx(RequestCheckTx),
    BeginBlock(RequestBeginBlock),
    DeliverTx(RequestDeliverTx),
    EndBlock(RequestEndBlock),
    Commit,
    Query(RequestQuery),
    ListSnapshots,
    OfferSnapshot(RequestOfferSnapshot),
    LoadSnapshotChunk(RequestLoadSnapshotChunk),
    ApplySnapshotChunk(RequestApplySnapshotChunk),
}

/// Every response in the callback protocol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    Info(ResponseInfo),
    InitChain(ResponseInitChain),
    CheckTx(ResponseCheckTx),
    BeginBlock(ResponseBeginBlock),
    DeliverTx(ResponseDeliverTx),
    EndBlock(ResponseEndBlock),
    Commit(ResponseCommit),
    Query(ResponseQuery),
    ListSnapshots(ResponseListSnapshots),
    OfferSnapshot(ResponseOfferSnapshot),
    LoadSnapshotChunk(ResponseLoadSnapshotChunk),
    ApplySnapshotChunk(ResponseApplySnapshotChunk),
}

/* ↓↓↓ Info ↓↓↓ */

#[derive(Clone, Debug, Default)]
pub struct RequestInfo {
    pub version: String,
}

/// Application metadata. The application does not negotiate versions or heights, so this is always
/// empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseInfo {
    pub data: String,
    pub last_block_height: u64,
    pub last_block_app_hash: Vec<u8>,
}

/* ↓↓↓ InitChain ↓↓↓ */

#[derive(Clone, Debug, Default)]
pub struct RequestInitChain {
    pub chain_id: String,
    pub app_state_bytes: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseInitChain {}

/* ↓↓↓ CheckTx ↓↓↓ */

#[derive(Clone, Debug, Default)]
pub struct RequestCheckTx {
    pub tx: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseCheckTx {
    /// `0` if the transaction may enter the mempool, or one of the nonzero
    /// [rejection codes](crate::admission) otherwise.
    pub code: u32,
    pub log: String,
}

/* ↓↓↓ BeginBlock ↓↓↓ */

#[derive(Clone, Debug, Default)]
pub struct RequestBeginBlock {
    pub hash: Vec<u8>,
    pub header: Header,
}

/// The parts of a block header that the replication engine passes to the application.
#[derive(Clone, Debug, Default)]
pub struct Header {
    pub chain_id: String,
    pub height: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseBeginBlock {}

/* ↓↓↓ DeliverTx ↓↓↓ */

#[derive(Clone, Debug, Default)]
pub struct RequestDeliverTx {
    pub tx: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseDeliverTx {
    pub code: u32,
    pub log: String,

    /// [`Event::post_success`] if the transaction was applied, empty otherwise.
    pub events: Vec<Event>,
}

/// A typed set of key-value attributes that the replication engine indexes, so that clients can search
/// for the transactions that emitted it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    pub r#type: String,
    pub attributes: Vec<EventAttribute>,
}

impl Event {
    /// The event emitted by every transaction that is applied in a block. Clients find accepted posts by
    /// searching for `post.success='true'`.
    pub fn post_success() -> Event {
        Event {
            r#type: "post".to_string(),
            attributes: vec![EventAttribute {
                key: "success".to_string(),
                value: "true".to_string(),
                index: true,
            }],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventAttribute {
    pub key: String,
    pub value: String,
    pub index: bool,
}

/* ↓↓↓ EndBlock ↓↓↓ */

#[derive(Clone, Debug, Default)]
pub struct RequestEndBlock {
    pub height: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseEndBlock {}

/* ↓↓↓ Commit ↓↓↓ */

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseCommit {
    /// Digest of the state after the commit. The application does not compute state digests, so this is
    /// always empty.
    pub data: Vec<u8>,
}

/* ↓↓↓ Query ↓↓↓ */

#[derive(Clone, Debug, Default)]
pub struct RequestQuery {
    /// The key to look up in the committed store.
    pub data: Vec<u8>,
    pub path: String,
    pub height: u64,
    pub prove: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseQuery {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
    pub log: String,
}

/// Log of a [`ResponseQuery`] for a key that is present in the committed store.
pub const KEY_FOUND: &str = "Key Found";

/// Log of a [`ResponseQuery`] for a key that is absent from the committed store.
pub const KEY_NOT_FOUND: &str = "Key not Found";

impl ResponseQuery {
    pub fn is_found(&self) -> bool {
        self.log == KEY_FOUND
    }
}

/* ↓↓↓ State sync ↓↓↓ */

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub height: u64,
    pub format: u32,
    pub chunks: u32,
    pub hash: Vec<u8>,
    pub metadata: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseListSnapshots {
    pub snapshots: Vec<Snapshot>,
}

#[derive(Clone, Debug, Default)]
pub struct RequestOfferSnapshot {
    pub snapshot: Option<Snapshot>,
    pub app_hash: Vec<u8>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OfferSnapshotResult {
    #[default]
    Unknown,
    Accept,
    Abort,
    Reject,
    RejectFormat,
    RejectSender,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseOfferSnapshot {
    pub result: OfferSnapshotResult,
}

#[derive(Clone, Debug, Default)]
pub struct RequestLoadSnapshotChunk {
    pub height: u64,
    pub format: u32,
    pub chunk: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseLoadSnapshotChunk {
    pub chunk: Vec<u8>,
}

#[derive(Clone, Debug, Default)]
pub struct RequestApplySnapshotChunk {
    pub index: u32,
    pub chunk: Vec<u8>,
    pub sender: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ApplySnapshotChunkResult {
    #[default]
    Unknown,
    Accept,
    Abort,
    Retry,
    RetrySnapshot,
    RejectSnapshot,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseApplySnapshotChunk {
    pub result: ApplySnapshotChunkResult,
    pub refetch_chunks: Vec<u32>,
    pub reject_senders: Vec<String>,
}
