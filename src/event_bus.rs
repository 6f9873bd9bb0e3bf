/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Registry of event handlers, and the function that fires them.
//!
//! Handlers are fired synchronously on the thread that emitted the event, right after the action the
//! event describes. The callback protocol already serializes every call into the application, so handlers
//! observe events in exactly the order in which the actions happened.

use crate::events::*;
use crate::logging::Logger;

pub(crate) type HandlerPtr<T> = Box<dyn Fn(&T) + Send>;

pub(crate) struct EventHandlers {
    pub(crate) check_tx_handlers: Vec<HandlerPtr<CheckTxEvent>>,
    pub(crate) begin_block_handlers: Vec<HandlerPtr<BeginBlockEvent>>,
    pub(crate) deliver_tx_handlers: Vec<HandlerPtr<DeliverTxEvent>>,
    pub(crate) commit_block_handlers: Vec<HandlerPtr<CommitBlockEvent>>,
    pub(crate) query_handlers: Vec<HandlerPtr<QueryEvent>>,
}

impl EventHandlers {
    /// Collect the user-defined handlers, adding the default logger of every event type in front of them
    /// if `log_events` is `true`.
    pub(crate) fn new(
        log_events: bool,
        check_tx_handler: Option<HandlerPtr<CheckTxEvent>>,
        begin_block_handler: Option<HandlerPtr<BeginBlockEvent>>,
        deliver_tx_handler: Option<HandlerPtr<DeliverTxEvent>>,
        commit_block_handler: Option<HandlerPtr<CommitBlockEvent>>,
        query_handler: Option<HandlerPtr<QueryEvent>>,
    ) -> EventHandlers {
        EventHandlers {
            check_tx_handlers: handlers(log_events, check_tx_handler),
            begin_block_handlers: handlers(log_events, begin_block_handler),
            deliver_tx_handlers: handlers(log_events, deliver_tx_handler),
            commit_block_handlers: handlers(log_events, commit_block_handler),
            query_handlers: handlers(log_events, query_handler),
        }
    }

    pub(crate) fn fire_handlers(&self, event: Event) {
        match event {
            Event::CheckTx(check_tx_event) => self
                .check_tx_handlers
                .iter()
                .for_each(|handler| handler(&check_tx_event)),

            Event::BeginBlock(begin_block_event) => self
                .begin_block_handlers
                .iter()
                .for_each(|handler| handler(&begin_block_event)),

            Event::DeliverTx(deliver_tx_event) => self
                .deliver_tx_handlers
                .iter()
                .for_each(|handler| handler(&deliver_tx_event)),

            Event::CommitBlock(commit_block_event) => self
                .commit_block_handlers
                .iter()
                .for_each(|handler| handler(&commit_block_event)),

            Event::Query(query_event) => self
                .query_handlers
                .iter()
                .for_each(|handler| handler(&query_event)),
        }
    }
}

fn handlers<T: Logger>(log_events: bool, user_handler: Option<HandlerPtr<T>>) -> Vec<HandlerPtr<T>> {
    let mut handlers = Vec::new();
    if log_events {
        handlers.push(T::get_logger());
    }
    handlers.extend(user_handler);
    handlers
}
