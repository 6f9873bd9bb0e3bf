//! Signing keys of every supported type, and helpers for building signed transactions with them.

use ed25519_dalek::Signer as _;
use p256::ecdsa::signature::hazmat::PrehashSigner as _;
use p256::pkcs8::EncodePublicKey as _;
use rand_core::OsRng;
use signed_kvstore::types::{
    crypto_primitives::{CryptoHasher, Digest},
    transaction::{encode, SignedRecord},
};

/// A private key that can sign transactions, of one of the supported key types.
pub(crate) enum TestKey {
    P256(p256::ecdsa::SigningKey),
    P384(p384::ecdsa::SigningKey),
    Ed25519(ed25519_dalek::SigningKey),
}

impl TestKey {
    pub(crate) fn p256() -> TestKey {
        TestKey::P256(p256::ecdsa::SigningKey::random(&mut OsRng))
    }

    pub(crate) fn p384() -> TestKey {
        TestKey::P384(p384::ecdsa::SigningKey::random(&mut OsRng))
    }

    pub(crate) fn ed25519() -> TestKey {
        TestKey::Ed25519(ed25519_dalek::SigningKey::generate(&mut OsRng))
    }

    /// Hex encoding of the DER `SubjectPublicKeyInfo` of the public key.
    pub(crate) fn public_key_hex(&self) -> String {
        let der = match self {
            TestKey::P256(signing_key) => p256::PublicKey::from(signing_key.verifying_key())
                .to_public_key_der()
                .unwrap(),
            TestKey::P384(signing_key) => p384::PublicKey::from(signing_key.verifying_key())
                .to_public_key_der()
                .unwrap(),
            TestKey::Ed25519(signing_key) => signing_key.verifying_key().to_public_key_der().unwrap(),
        };
        hex::encode(der.as_bytes())
    }

    /// Hex encoding of the signature over the SHA-256 digest of `msg`. ECDSA signatures are DER-encoded.
    pub(crate) fn sign_hex(&self, msg: &str) -> String {
        let digest = CryptoHasher::digest(msg.as_bytes());
        let signature = match self {
            TestKey::P256(signing_key) => {
                let signature: p256::ecdsa::Signature = signing_key.sign_prehash(&digest).unwrap();
                signature.to_der().as_bytes().to_vec()
            }
            TestKey::P384(signing_key) => {
                let signature: p384::ecdsa::Signature = signing_key.sign_prehash(&digest).unwrap();
                signature.to_der().as_bytes().to_vec()
            }
            TestKey::Ed25519(signing_key) => signing_key.sign(&digest).to_bytes().to_vec(),
        };
        hex::encode(signature)
    }

    /// A record carrying `msg` and a valid signature over it.
    pub(crate) fn signed_record(&self, msg: &str) -> SignedRecord {
        SignedRecord {
            public_key: self.public_key_hex(),
            signature: self.sign_hex(msg),
            msg: msg.to_string(),
        }
    }

    /// A `key=value` transaction whose value is a validly signed record carrying `msg`.
    pub(crate) fn signed_tx(&self, key: &str, msg: &str) -> Vec<u8> {
        encode(key.as_bytes(), &self.signed_record(msg))
    }
}

/// Flip one bit of the byte at `index` of a hex string, returning the new hex string.
pub(crate) fn flip_hex_byte(hex_string: &str, index: usize) -> String {
    let mut bytes = hex::decode(hex_string).unwrap();
    bytes[index] ^= 0x01;
    hex::encode(bytes)
}
