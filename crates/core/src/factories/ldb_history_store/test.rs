use super::*;
use newsspool_test_utils::article::md_at;
use newsspool_test_utils::history::exercise_history_store;

#[tokio::test]
async fn conformance() {
    let dir = tempfile::tempdir().unwrap();
    let mut b = Builder::default();
    b.config
        .set_module_config(
            SpoolConfig::MODULE.into(),
            &SpoolConfig {
                spool: dir.path().display().to_string(),
                ..Default::default()
            },
        )
        .unwrap();
    let store = LdbHistoryStoreFactory::create()
        .create(b.build())
        .await
        .unwrap();
    exercise_history_store(store).await;
}

#[tokio::test]
async fn state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let msgid = MessageId::from("<persist@x>");
    let mut tok = Token::zeroed();
    tok.set_class(7);
    tok.payload_mut()[0] = 0x42;
    {
        let store = LdbHistoryStore::open(&dir.path().join("hisldb")).unwrap();
        store
            .his_write(msgid.clone(), md_at(1_600_000_000), tok)
            .await
            .unwrap();
    }
    let store = LdbHistoryStore::open(&dir.path().join("hisldb")).unwrap();
    assert_eq!(tok, store.his_lookup(msgid).await.unwrap());
}
