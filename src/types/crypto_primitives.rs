/*
    Copyright © 2024, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Cryptographic primitives.
//!
//! The definitions and re-exports in this module provide two categories of cryptographic primitives:
//! 1. **Cryptographic Hashes**: provided by the [`sha2`] crate. Every signed message is hashed with
//!    SHA-256 before its signature is checked, whatever the key type.
//! 2. **Digital Signatures**: verification of signatures made by any of the [supported key
//!    types](PublicKey), provided by the [`p256`], [`p384`], and [`ed25519_dalek`] crates.
//!
//! ## Encodings
//!
//! Public keys are DER-encoded `SubjectPublicKeyInfo` structures, the form produced by, e.g., WebCrypto's
//! `exportKey("spki", ...)` and Go's `x509.MarshalPKIXPublicKey`.
//!
//! ECDSA signatures are ASN.1 DER `Ecdsa-Sig-Value` structures. Their length varies with the magnitude of
//! `r` and `s`, so they are never split at a fixed offset. Ed25519 signatures are the usual 64 bytes.

use ed25519_dalek::pkcs8::DecodePublicKey as _;
use ed25519_dalek::Verifier as _;
use p256::ecdsa::signature::hazmat::PrehashVerifier as _;
use p256::pkcs8::DecodePublicKey as _;
use thiserror::Error;

// re-exports below.
pub use sha2::Digest;
pub use sha2::Sha256 as CryptoHasher;

/// Verify that `signature_hex` is a signature over the SHA-256 digest of `msg` made by the holder of the
/// private key corresponding to `public_key_hex`.
///
/// # Return value
///
/// - `Ok(true)` if the signature is valid.
/// - `Ok(false)` if the key decodes but the signature is invalid, including when the signature bytes are
///   not a well-formed signature for the key type.
/// - `Err(DecodeError)` if either argument is not valid hex, or the public key is not the DER encoding of
///   a supported key.
pub fn verify(public_key_hex: &str, signature_hex: &str, msg: &str) -> Result<bool, DecodeError> {
    let public_key_bytes = hex::decode(public_key_hex).map_err(DecodeError::PublicKeyHex)?;
    let signature_bytes = hex::decode(signature_hex).map_err(DecodeError::SignatureHex)?;
    let public_key = PublicKey::from_der(&public_key_bytes)?;

    let digest = CryptoHasher::digest(msg.as_bytes());
    Ok(public_key.verify_digest(&digest, &signature_bytes))
}

/// A public key of one of the key types that can sign transactions.
#[derive(Clone, Debug)]
pub enum PublicKey {
    P256(p256::ecdsa::VerifyingKey),
    P384(p384::ecdsa::VerifyingKey),
    Ed25519(ed25519_dalek::VerifyingKey),
}

impl PublicKey {
    /// Parse the DER encoding of a `SubjectPublicKeyInfo`.
    pub fn from_der(bytes: &[u8]) -> Result<PublicKey, DecodeError> {
        if let Ok(public_key) = p256::PublicKey::from_public_key_der(bytes) {
            return Ok(PublicKey::P256(public_key.into()));
        }
        if let Ok(public_key) = p384::PublicKey::from_public_key_der(bytes) {
            return Ok(PublicKey::P384(public_key.into()));
        }
        if let Ok(verifying_key) = ed25519_dalek::VerifyingKey::from_public_key_der(bytes) {
            return Ok(PublicKey::Ed25519(verifying_key));
        }
        Err(DecodeError::UnsupportedPublicKey)
    }

    /// Check `signature` against a SHA-256 `digest`. Signatures that cannot be parsed are invalid.
    pub fn verify_digest(&self, digest: &[u8], signature: &[u8]) -> bool {
        match self {
            PublicKey::P256(verifying_key) => p256::ecdsa::Signature::from_der(signature)
                .map(|signature| verifying_key.verify_prehash(digest, &signature).is_ok())
                .unwrap_or(false),
            PublicKey::P384(verifying_key) => p384::ecdsa::Signature::from_der(signature)
                .map(|signature| verifying_key.verify_prehash(digest, &signature).is_ok())
                .unwrap_or(false),
            PublicKey::Ed25519(verifying_key) => ed25519_dalek::Signature::from_slice(signature)
                .map(|signature| verifying_key.verify(digest, &signature).is_ok())
                .unwrap_or(false),
        }
    }
}

/// Error when the public key or signature of a signed record cannot be decoded far enough to attempt
/// verification.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum DecodeError {
    #[error("public key is not valid hex: {0}")]
    PublicKeyHex(hex::FromHexError),

    #[error("signature is not valid hex: {0}")]
    SignatureHex(hex::FromHexError),

    #[error("public key is not a DER-encoded P-256, P-384, or Ed25519 SubjectPublicKeyInfo")]
    UnsupportedPublicKey,
}
