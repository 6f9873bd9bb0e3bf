/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! A replicated key-value store in which every value is signed by its author.
//!
//! A transaction is the bytes `key=value`, where `value` is a JSON document carrying a hex-encoded
//! public key, a hex-encoded signature, and the message that was signed. A transaction is applied only if
//! its value parses, its signature verifies, and it does not rewrite a key with the value it already
//! holds.
//!
//! The crate is organized as follows:
//! - [`abci`]: the callback protocol through which a replication engine drives an application.
//! - [`admission`]: the checks that decide whether a transaction is accepted, and the codes that report
//!   why it was not.
//! - [`kv_store_app`]: [`KVStoreApp`], the application itself, and its builder.
//! - [`kv_store`]: the pluggable committed store, and the batch that buffers the writes of an open block.
//! - [`types`]: the transaction codec and signature verification.
//! - [`config`], [`events`], [`logging`]: ambient configuration and observability.

pub mod abci;

pub mod admission;

pub mod config;

pub(crate) mod event_bus;

pub mod events;

pub mod kv_store;

pub mod kv_store_app;
pub use kv_store_app::{KVStoreApp, KVStoreAppSpec};

pub mod logging;

pub mod types;
