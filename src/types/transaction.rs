/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The wire format of transactions.
//!
//! A transaction is a byte string of the form `key=value`, where:
//! - `key` is an opaque byte string used as the storage key, and
//! - `value` is a JSON document containing a [`SignedRecord`].
//!
//! ## The separator rule
//!
//! Exactly one [`SEPARATOR`] byte must occur in the whole transaction. Since there is no escaping, a key
//! or a `Msg` containing `=` cannot be represented; such transactions are rejected by [`split`] rather
//! than split in some smarter way, so that every replica agrees on where the key ends.
//!
//! ## Decoding the value
//!
//! [`decode_value`] only fails if the value is not syntactically valid JSON. Fields that are missing,
//! are not strings, or belong to a document that is not an object, decode to the empty string. Whether
//! the resulting record is meaningful is decided later, by [signature
//! verification](super::crypto_primitives::verify).

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// The byte that separates the key from the value in a transaction.
pub const SEPARATOR: u8 = b'=';

/// A transaction that has been split into its key and its (not yet decoded) value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transaction<'a> {
    pub key: &'a [u8],
    pub value: &'a [u8],
}

/// Split `tx` into its key and value.
///
/// # Errors
///
/// - [`FormatError::SeparatorCount`] if `tx` does not contain exactly one [`SEPARATOR`].
/// - [`FormatError::EmptyKey`] if the key is empty. Storage engines commonly refuse empty keys, and a
///   transaction whose write is guaranteed to fail at commit must not be admitted.
pub fn split(tx: &[u8]) -> Result<Transaction<'_>, FormatError> {
    let separators = tx.iter().filter(|&&byte| byte == SEPARATOR).count();
    let position = match tx.iter().position(|&byte| byte == SEPARATOR) {
        Some(position) if separators == 1 => position,
        _ => return Err(FormatError::SeparatorCount { found: separators }),
    };

    let (key, value) = (&tx[..position], &tx[position + 1..]);
    if key.is_empty() {
        return Err(FormatError::EmptyKey);
    }

    Ok(Transaction { key, value })
}

/// Decode `value` into a [`SignedRecord`].
///
/// Field names are matched exactly first, then ASCII case-insensitively, so records produced by clients
/// that emit `publicKey`/`signature`/`msg` are decoded as well.
pub fn decode_value(value: &[u8]) -> Result<SignedRecord, PayloadError> {
    let document: Value =
        serde_json::from_slice(value).map_err(|err| PayloadError(err.to_string()))?;

    Ok(match document {
        Value::Object(fields) => SignedRecord {
            public_key: string_field(&fields, "PublicKey"),
            signature: string_field(&fields, "Signature"),
            msg: string_field(&fields, "Msg"),
        },
        _ => SignedRecord::default(),
    })
}

/// Build the bytes of a `key=value` transaction carrying `record`.
///
/// This does not check the separator rule; a `key` or `record.msg` containing `=` yields a transaction
/// that [`split`] will reject.
pub fn encode(key: &[u8], record: &SignedRecord) -> Vec<u8> {
    // Serializing a struct of strings into JSON cannot fail.
    let value = serde_json::to_vec(record).unwrap_or_default();
    let mut tx = Vec::with_capacity(key.len() + 1 + value.len());
    tx.extend_from_slice(key);
    tx.push(SEPARATOR);
    tx.extend_from_slice(&value);
    tx
}

fn string_field(fields: &Map<String, Value>, name: &str) -> String {
    let value = fields.get(name).or_else(|| {
        fields
            .iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    });

    match value {
        Some(Value::String(string)) => string.clone(),
        _ => String::new(),
    }
}

/// The signed message carried in the value of a transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SignedRecord {
    /// Hex encoding of the DER `SubjectPublicKeyInfo` of the signer's public key.
    pub public_key: String,

    /// Hex encoding of the signature over the SHA-256 digest of `msg`.
    pub signature: String,

    pub msg: String,
}

/// Error when a transaction does not follow the `key=value` format.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("transaction must contain exactly one separator, found {found}")]
    SeparatorCount { found: usize },

    #[error("transaction key is empty")]
    EmptyKey,
}

/// Error when the value of a transaction is not a valid JSON document.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("transaction value is not valid JSON: {0}")]
pub struct PayloadError(pub String);
