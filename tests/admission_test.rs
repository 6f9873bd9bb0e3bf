use signed_kvstore::{
    admission::{
        classify, AdmissionOutcome, CODE_BAD_SIGNATURE, CODE_DUPLICATE, CODE_INVALID_PAYLOAD,
        CODE_MALFORMED, CODE_OK, CODE_VERIFICATION_ERROR,
    },
    kv_store::{
        block_batch::BlockBatch,
        pluggables::{KVGet, KVStore},
    },
    types::{
        crypto_primitives::DecodeError,
        transaction::{encode, FormatError, SignedRecord},
    },
};

mod common;

use crate::common::{
    keys::{flip_hex_byte, TestKey},
    mem_db::MemDB,
};

#[test]
fn outcome_codes_and_logs_test() {
    let outcomes = [
        (AdmissionOutcome::Accepted, CODE_OK, "Valid Signature"),
        (
            AdmissionOutcome::RejectedMalformed(FormatError::EmptyKey),
            CODE_MALFORMED,
            "Transaction cannot be divided: transaction key is empty",
        ),
        (
            AdmissionOutcome::RejectedInvalidPayload,
            CODE_INVALID_PAYLOAD,
            "Invalid JSON",
        ),
        (
            AdmissionOutcome::RejectedDuplicate,
            CODE_DUPLICATE,
            "Duplicate Key",
        ),
        (
            AdmissionOutcome::RejectedBadSignature,
            CODE_BAD_SIGNATURE,
            "Invalid Signature",
        ),
    ];
    for (outcome, code, log) in outcomes {
        assert_eq!(outcome.code(), code);
        assert_eq!(outcome.log(), log);
        assert_eq!(outcome.is_accepted(), code == CODE_OK);
    }

    let verification_error =
        AdmissionOutcome::RejectedVerificationError(DecodeError::UnsupportedPublicKey);
    assert_eq!(verification_error.code(), CODE_VERIFICATION_ERROR);
    assert!(verification_error
        .log()
        .starts_with("Signature could not be verified: "));

    // Collapsing only affects verification errors.
    assert_eq!(
        verification_error.collapse_verification_error(),
        AdmissionOutcome::RejectedBadSignature
    );
    assert_eq!(
        AdmissionOutcome::RejectedDuplicate.collapse_verification_error(),
        AdmissionOutcome::RejectedDuplicate
    );
}

#[test]
fn classify_test() {
    let db = MemDB::new();
    let key = TestKey::p256();
    let record = key.signed_record("hello");

    // A well-formed, validly signed transaction for a new key.
    let tx = encode(b"alice", &record);
    assert_eq!(classify(&tx, &db.snapshot()).unwrap(), AdmissionOutcome::Accepted);

    // Every supported key type is accepted.
    for key in [TestKey::p384(), TestKey::ed25519()] {
        let tx = key.signed_tx("bob", "hello");
        assert_eq!(classify(&tx, &db.snapshot()).unwrap(), AdmissionOutcome::Accepted);
    }

    // Malformed.
    assert_eq!(
        classify(b"no separator", &db.snapshot()).unwrap(),
        AdmissionOutcome::RejectedMalformed(FormatError::SeparatorCount { found: 0 })
    );
    assert_eq!(
        classify(b"=value", &db.snapshot()).unwrap(),
        AdmissionOutcome::RejectedMalformed(FormatError::EmptyKey)
    );

    // Invalid payload.
    assert_eq!(
        classify(b"alice=not-json", &db.snapshot()).unwrap(),
        AdmissionOutcome::RejectedInvalidPayload
    );
    assert_eq!(
        classify(b"alice=", &db.snapshot()).unwrap(),
        AdmissionOutcome::RejectedInvalidPayload
    );

    // Bad signature.
    let tampered = SignedRecord {
        signature: flip_hex_byte(&record.signature, record.signature.len() / 2 - 1),
        ..record.clone()
    };
    assert_eq!(
        classify(&encode(b"alice", &tampered), &db.snapshot()).unwrap(),
        AdmissionOutcome::RejectedBadSignature
    );
    let other_msg = SignedRecord {
        msg: "goodbye".to_string(),
        ..record.clone()
    };
    assert_eq!(
        classify(&encode(b"alice", &other_msg), &db.snapshot()).unwrap(),
        AdmissionOutcome::RejectedBadSignature
    );
    let empty_signature = SignedRecord {
        signature: String::new(),
        ..record.clone()
    };
    assert_eq!(
        classify(&encode(b"alice", &empty_signature), &db.snapshot()).unwrap(),
        AdmissionOutcome::RejectedBadSignature
    );

    // Verification error.
    let bad_public_key = SignedRecord {
        public_key: "not hex".to_string(),
        ..record.clone()
    };
    assert!(matches!(
        classify(&encode(b"alice", &bad_public_key), &db.snapshot()).unwrap(),
        AdmissionOutcome::RejectedVerificationError(DecodeError::PublicKeyHex(_))
    ));
    assert_eq!(
        classify(b"alice={}", &db.snapshot()).unwrap(),
        AdmissionOutcome::RejectedVerificationError(DecodeError::UnsupportedPublicKey)
    );
}

#[test]
fn check_order_test() {
    let db = MemDB::new();

    // A transaction with two separators is malformed, even if everything else about it is wrong too.
    assert!(matches!(
        classify(b"a=b=not-json", &db.snapshot()).unwrap(),
        AdmissionOutcome::RejectedMalformed(_)
    ));

    // An unparseable value is reported before its duplicate status.
    db.insert(b"alice", b"not-json");
    assert_eq!(
        classify(b"alice=not-json", &db.snapshot()).unwrap(),
        AdmissionOutcome::RejectedInvalidPayload
    );

    // A duplicate is reported before its signature is checked.
    db.insert(b"bob", b"{}");
    assert_eq!(
        classify(b"bob={}", &db.snapshot()).unwrap(),
        AdmissionOutcome::RejectedDuplicate
    );
}

#[test]
fn duplicate_test() {
    let db = MemDB::new();
    let key = TestKey::p256();
    let tx = key.signed_tx("alice", "hello");
    let value = &tx[b"alice=".len()..];

    // The same key with the same value is a duplicate.
    db.insert(b"alice", value);
    assert_eq!(
        classify(&tx, &db.snapshot()).unwrap(),
        AdmissionOutcome::RejectedDuplicate
    );

    // The same value under another key is not.
    assert_eq!(
        classify(&key.signed_tx("bob", "hello"), &db.snapshot()).unwrap(),
        AdmissionOutcome::Accepted
    );

    // The same key with a different value is an overwrite, not a duplicate.
    assert_eq!(
        classify(&key.signed_tx("alice", "hello again"), &db.snapshot()).unwrap(),
        AdmissionOutcome::Accepted
    );
}

#[test]
fn block_batch_view_test() {
    let db = MemDB::new();
    let key = TestKey::ed25519();
    let tx = key.signed_tx("alice", "hello");
    let value = &tx[b"alice=".len()..];

    // A write buffered in the open block is visible through its view, but not in the committed store.
    let mut batch = BlockBatch::new(1);
    assert_eq!(
        classify(&tx, &batch.view(db.snapshot())).unwrap(),
        AdmissionOutcome::Accepted
    );
    batch.set(b"alice", value);
    assert_eq!(
        classify(&tx, &batch.view(db.snapshot())).unwrap(),
        AdmissionOutcome::RejectedDuplicate
    );
    assert_eq!(
        classify(&tx, &db.snapshot()).unwrap(),
        AdmissionOutcome::Accepted
    );

    // The latest write in the batch shadows the committed store.
    db.insert(b"bob", b"committed");
    batch.set(b"bob", b"first");
    batch.set(b"bob", b"second");
    assert_eq!(batch.len(), 3);
    assert_eq!(
        batch.view(db.snapshot()).get(b"bob").unwrap(),
        Some(b"second".to_vec())
    );
    assert_eq!(db.get(b"bob").unwrap(), Some(b"committed".to_vec()));
    assert_eq!(batch.view(db.snapshot()).get(b"carol").unwrap(), None);
}

#[test]
fn classify_is_deterministic_test() {
    let key = TestKey::p384();
    let txs: Vec<Vec<u8>> = vec![
        key.signed_tx("alice", "hello"),
        b"alice=not-json".to_vec(),
        b"a=b=c".to_vec(),
        b"alice={}".to_vec(),
        encode(
            b"alice",
            &SignedRecord {
                msg: "forged".to_string(),
                ..key.signed_record("hello")
            },
        ),
    ];

    let first = MemDB::new();
    let second = MemDB::new();
    first.insert(b"carol", b"{}");
    second.insert(b"carol", b"{}");

    for tx in &txs {
        assert_eq!(
            classify(tx, &first.snapshot()).unwrap(),
            classify(tx, &second.snapshot()).unwrap()
        );
        // Classifying never changes the view.
        assert_eq!(first.contents(), second.contents());
    }
}

#[test]
fn read_failure_test() {
    let db = MemDB::new();
    let key = TestKey::p256();
    db.fail_reads(true);

    // Checks that come before the duplicate check do not read the store.
    assert_eq!(
        classify(b"alice=not-json", &db.snapshot()).unwrap(),
        AdmissionOutcome::RejectedInvalidPayload
    );

    // Reaching the duplicate check surfaces the read failure.
    assert!(classify(&key.signed_tx("alice", "hello"), &db.snapshot()).is_err());
}
