/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Functions that log out events.
//!
//! The logs defined in this module are printed if the user enabled them via the application's
//! [configuration](crate::config::Configuration).
//!
//! The application logs using the [log](https://docs.rs/log/latest/log/) crate. To get these messages
//! printed onto a terminal or to a file, set up a
//! [logging implementation](https://docs.rs/log/latest/log/#available-logging-implementations).
//!
//! ## Log message format
//!
//! Log messages are CSVs (Comma Separated Values) with at least two values. The first two values are
//! always:
//! 1. The name of the [event](crate::events) in PascalCase (defined in this module as constants).
//! 2. The time the event was emitted (as number of seconds since the Unix Epoch).
//!
//! The rest of the values differ depending on the kind of event. For example, the following snippet
//! is how a [DeliverTx](crate::events::DeliverTxEvent) is printed:
//!
//! ```text
//! DeliverTx, 1701329264, 12, fNGCJyk, 0
//! ```
//!
//! In the snippet:
//! - The third value is the height of the open block.
//! - The fourth value is the first seven characters of the Base64 encoding of the hash of the
//!   transaction.
//! - The fifth value is the code returned for the transaction.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use std::time::SystemTime;

use crate::events::*;

// Names of each event in PascalCase for printing:
pub const CHECK_TX: &str = "CheckTx";
pub const BEGIN_BLOCK: &str = "BeginBlock";
pub const DELIVER_TX: &str = "DeliverTx";
pub const COMMIT_BLOCK: &str = "CommitBlock";
pub const QUERY: &str = "Query";

/// Implemented by event types. Used to get a closure that logs the event.
pub(crate) trait Logger {
    /// Returns a pointer to the default logging handler for a given event type.
    fn get_logger() -> Box<dyn Fn(&Self) + Send>;
}

impl Logger for CheckTxEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |check_tx_event: &CheckTxEvent| {
            log::info!(
                "{}, {}, {}, {}",
                CHECK_TX,
                secs_since_unix_epoch(check_tx_event.timestamp),
                first_seven_base64_chars(&check_tx_event.tx_hash),
                check_tx_event.code
            )
        };
        Box::new(logger)
    }
}

impl Logger for BeginBlockEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |begin_block_event: &BeginBlockEvent| {
            log::info!(
                "{}, {}, {}",
                BEGIN_BLOCK,
                secs_since_unix_epoch(begin_block_event.timestamp),
                begin_block_event.height
            )
        };
        Box::new(logger)
    }
}

impl Logger for DeliverTxEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |deliver_tx_event: &DeliverTxEvent| {
            log::info!(
                "{}, {}, {}, {}, {}",
                DELIVER_TX,
                secs_since_unix_epoch(deliver_tx_event.timestamp),
                deliver_tx_event.height,
                first_seven_base64_chars(&deliver_tx_event.tx_hash),
                deliver_tx_event.code
            )
        };
        Box::new(logger)
    }
}

impl Logger for CommitBlockEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |commit_block_event: &CommitBlockEvent| {
            log::info!(
                "{}, {}, {}, {}",
                COMMIT_BLOCK,
                secs_since_unix_epoch(commit_block_event.timestamp),
                commit_block_event.height,
                commit_block_event.writes
            )
        };
        Box::new(logger)
    }
}

impl Logger for QueryEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |query_event: &QueryEvent| {
            log::info!(
                "{}, {}, {}, {}",
                QUERY,
                secs_since_unix_epoch(query_event.timestamp),
                first_seven_base64_chars(&query_event.key),
                query_event.found
            )
        };
        Box::new(logger)
    }
}

// Get a more readable representation of a bytesequence by base64-encoding it and taking the first 7 characters.
pub(crate) fn first_seven_base64_chars(bytes: &[u8]) -> String {
    let encoded = STANDARD_NO_PAD.encode(bytes);
    if encoded.len() > 7 {
        encoded[0..7].to_string()
    } else {
        encoded
    }
}

// A clock set before the Unix Epoch is logged as 0 rather than aborting the application.
fn secs_since_unix_epoch(timestamp: SystemTime) -> u64 {
    timestamp
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .unwrap_or(0)
}
