/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Rules that decide whether a transaction is admissible.
//!
//! The same rules are applied at two points in the life of a transaction:
//! 1. In [`check_tx`](crate::abci::Application::check_tx), before the transaction enters the mempool,
//!    against a snapshot of the committed store.
//! 2. In [`deliver_tx`](crate::abci::Application::deliver_tx), just before the transaction is applied in
//!    a block, against a [`BlockBatchView`](crate::kv_store::BlockBatchView) of the block in progress.
//!
//! Only the view differs between the two. Since [`classify`] depends on nothing but the transaction bytes
//! and the contents of the view, every replica that applies the same transactions in the same order to
//! the same state reaches the same decisions.
//!
//! ## Order of checks
//!
//! The checks short-circuit in the following order, and a transaction that fails several of them reports
//! the first:
//! 1. **Format**: the transaction must [split](crate::types::transaction::split) into a key and a value.
//! 2. **Payload**: the value must be valid JSON.
//! 3. **Duplicate**: the view must not already map the key to a byte-identical value. The same key with a
//!    different value is not a duplicate, and if admitted, overwrites the old value.
//! 4. **Signature**: the value's [signed record](crate::types::transaction::SignedRecord) must carry a
//!    valid signature.

use std::fmt::{self, Display};

use crate::kv_store::pluggables::{KVGet, KVStoreError};
use crate::types::{
    crypto_primitives::{self, DecodeError},
    transaction::{self, FormatError, Transaction},
};

/// The result of classifying a transaction.
#[derive(Clone, Debug, PartialEq)]
pub enum AdmissionOutcome {
    Accepted,
    RejectedMalformed(FormatError),
    RejectedInvalidPayload,
    RejectedDuplicate,
    RejectedBadSignature,
    RejectedVerificationError(DecodeError),
}

/// Code that the callback protocol uses to signal that a transaction was accepted.
pub const CODE_OK: u32 = 0;
pub const CODE_MALFORMED: u32 = 1;
pub const CODE_INVALID_PAYLOAD: u32 = 2;
pub const CODE_DUPLICATE: u32 = 3;
pub const CODE_BAD_SIGNATURE: u32 = 4;
pub const CODE_VERIFICATION_ERROR: u32 = 5;

impl AdmissionOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, AdmissionOutcome::Accepted)
    }

    /// Get the code that reports this outcome in the callback protocol.
    pub fn code(&self) -> u32 {
        match self {
            AdmissionOutcome::Accepted => CODE_OK,
            AdmissionOutcome::RejectedMalformed(_) => CODE_MALFORMED,
            AdmissionOutcome::RejectedInvalidPayload => CODE_INVALID_PAYLOAD,
            AdmissionOutcome::RejectedDuplicate => CODE_DUPLICATE,
            AdmissionOutcome::RejectedBadSignature => CODE_BAD_SIGNATURE,
            AdmissionOutcome::RejectedVerificationError(_) => CODE_VERIFICATION_ERROR,
        }
    }

    /// Get the human-readable explanation of this outcome that is returned to the submitter.
    pub fn log(&self) -> String {
        match self {
            AdmissionOutcome::Accepted => "Valid Signature".to_string(),
            AdmissionOutcome::RejectedMalformed(err) => {
                format!("Transaction cannot be divided: {}", err)
            }
            AdmissionOutcome::RejectedInvalidPayload => "Invalid JSON".to_string(),
            AdmissionOutcome::RejectedDuplicate => "Duplicate Key".to_string(),
            AdmissionOutcome::RejectedBadSignature => "Invalid Signature".to_string(),
            AdmissionOutcome::RejectedVerificationError(err) => {
                format!("Signature could not be verified: {}", err)
            }
        }
    }

    /// Report a [`RejectedVerificationError`](Self::RejectedVerificationError) as a
    /// [`RejectedBadSignature`](Self::RejectedBadSignature), leaving every other outcome unchanged.
    ///
    /// Used when [`Configuration::collapse_verification_errors`](crate::config::Configuration) is set.
    pub fn collapse_verification_error(self) -> AdmissionOutcome {
        match self {
            AdmissionOutcome::RejectedVerificationError(_) => AdmissionOutcome::RejectedBadSignature,
            outcome => outcome,
        }
    }
}

impl Display for AdmissionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.log(), self.code())
    }
}

/// Classify `tx` against the state visible through `view`.
///
/// # Errors
///
/// Rejections are reported in the `Ok` variant. An `Err` is only returned if reading `view` fails, which
/// callers must treat as fatal.
pub fn classify<V: KVGet>(tx: &[u8], view: &V) -> Result<AdmissionOutcome, KVStoreError> {
    Ok(match admit(tx, view)? {
        Ok(_) => AdmissionOutcome::Accepted,
        Err(rejection) => rejection,
    })
}

/// Like [`classify`], but returns the split transaction if it is accepted so that the caller can apply it
/// without splitting it again.
pub(crate) fn admit<'tx, V: KVGet>(
    tx: &'tx [u8],
    view: &V,
) -> Result<Result<Transaction<'tx>, AdmissionOutcome>, KVStoreError> {
    // 1. Format.
    let transaction = match transaction::split(tx) {
        Ok(transaction) => transaction,
        Err(err) => return Ok(Err(AdmissionOutcome::RejectedMalformed(err))),
    };

    // 2. Payload.
    let record = match transaction::decode_value(transaction.value) {
        Ok(record) => record,
        Err(_) => return Ok(Err(AdmissionOutcome::RejectedInvalidPayload)),
    };

    // 3. Duplicate.
    if let Some(existing) = view.get(transaction.key)? {
        if existing == transaction.value {
            return Ok(Err(AdmissionOutcome::RejectedDuplicate));
        }
    }

    // 4. Signature.
    Ok(
        match crypto_primitives::verify(&record.public_key, &record.signature, &record.msg) {
            Ok(true) => Ok(transaction),
            Ok(false) => Err(AdmissionOutcome::RejectedBadSignature),
            Err(err) => Err(AdmissionOutcome::RejectedVerificationError(err)),
        },
    )
}
