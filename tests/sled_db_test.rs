#![cfg(feature = "sled")]

use signed_kvstore::{
    abci::{messages::*, Application},
    admission::{CODE_DUPLICATE, CODE_OK},
    config::Configuration,
    kv_store::{
        pluggables::{KVGet, KVStore, WriteBatch},
        sled_db::{SledDB, SledWriteBatch},
    },
    KVStoreAppSpec,
};

mod common;

use crate::common::keys::TestKey;

#[test]
fn sled_db_write_and_snapshot_test() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = SledDB::open(dir.path()).unwrap();

    assert_eq!(db.get(b"alice").unwrap(), None);

    let mut wb = SledWriteBatch::new();
    wb.set(b"alice", b"first");
    wb.set(b"bob", b"value");
    wb.set(b"alice", b"second");
    db.write(wb).unwrap();

    // Later writes to the same key in a batch win.
    assert_eq!(db.get(b"alice").unwrap(), Some(b"second".to_vec()));
    assert_eq!(db.snapshot().get(b"bob").unwrap(), Some(b"value".to_vec()));
    assert_eq!(db.snapshot().get(b"carol").unwrap(), None);
}

#[test]
fn sled_db_persists_across_restarts_test() {
    let dir = tempfile::tempdir().unwrap();
    let key = TestKey::p256();
    let tx = key.signed_tx("alice", "hello");

    // 1. Commit a transaction, then drop the application and its database.
    {
        let mut app = KVStoreAppSpec::builder()
            .kv_store(SledDB::open(dir.path()).unwrap())
            .configuration(Configuration::builder().log_events(false).build())
            .build()
            .into_app();

        app.begin_block(RequestBeginBlock {
            header: Header {
                height: 1,
                ..Header::default()
            },
            ..RequestBeginBlock::default()
        })
        .unwrap();
        let response = app.deliver_tx(RequestDeliverTx { tx: tx.clone() }).unwrap();
        assert_eq!(response.code, CODE_OK);
        app.commit().unwrap();
    }

    // 2. Reopen the database in a new application. The committed value is still there.
    let app = KVStoreAppSpec::builder()
        .kv_store(SledDB::open(dir.path()).unwrap())
        .configuration(Configuration::builder().log_events(false).build())
        .build()
        .into_app();

    let response = app
        .query(RequestQuery {
            data: b"alice".to_vec(),
            ..RequestQuery::default()
        })
        .unwrap();
    assert!(response.is_found());
    assert_eq!(response.value, tx[b"alice=".len()..].to_vec());
    assert_eq!(
        app.check_tx(RequestCheckTx { tx }).unwrap().code,
        CODE_DUPLICATE
    );
}
