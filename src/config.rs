/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! User-defined parameters of the application.
//!
//! The configuration is built using the builder pattern, for example:
//!
//! ```ignore
//! let configuration =
//!     Configuration::builder()
//!     .log_events(true)
//!     .collapse_verification_errors(false)
//!     .build()
//! ```

use typed_builder::TypedBuilder;

/// Stores the user-defined parameters of the application, that is:
/// 1. The "Log Events" flag. If set to `true`, every [event](crate::events) is logged.
/// 2. The "Collapse Verification Errors" flag (see below).
///
/// ## Log Events
///
/// The application logs using the [log](https://docs.rs/log/latest/log/) crate. To get these messages
/// printed onto a terminal or to a file, set up a [logging
/// implementation](https://docs.rs/log/latest/log/#available-logging-implementations).
///
/// ## Collapse Verification Errors
///
/// By default, a transaction whose public key or signature cannot be decoded is rejected with its own
/// [code](crate::admission::CODE_VERIFICATION_ERROR), distinct from that of a transaction whose signature
/// is merely wrong. Deployments that must stay compatible with clients expecting the older behaviour,
/// where both are reported as an [invalid signature](crate::admission::CODE_BAD_SIGNATURE), can set this
/// flag.
///
/// All replicas of a network must use the same value, since it changes the codes returned by
/// `deliver_tx`.
#[derive(Clone, Debug, TypedBuilder)]
#[builder(builder_method(doc = "
    Create a builder for building a [Configuration]. On the builder call the following methods to construct a valid [Configuration].

    Required:
    - `.log_events(...)`

    Optional:
    - `.collapse_verification_errors(...)`
"))]
pub struct Configuration {
    #[builder(setter(doc = "Enable logging? Required."))]
    pub log_events: bool,
    #[builder(
        default = false,
        setter(
            doc = "Report undecodable keys and signatures with the same code as invalid signatures? Optional, defaults to `false`."
        )
    )]
    pub collapse_verification_errors: bool,
}
