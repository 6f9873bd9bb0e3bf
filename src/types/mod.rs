/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Types that are used across multiple components of the application.
//!
//! - [`transaction`]: the `key=value` wire format of transactions and the signed record carried in the
//!   value.
//! - [`crypto_primitives`]: hashing and signature verification over the signed record.

pub mod crypto_primitives;

pub mod transaction;
