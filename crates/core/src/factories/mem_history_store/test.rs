use super::*;
use newsspool_test_utils::article::md_at;
use newsspool_test_utils::history::exercise_history_store;

#[tokio::test]
async fn conformance() {
    let store = MemHistoryStoreFactory::create()
        .create(Builder::default().build())
        .await
        .unwrap();
    exercise_history_store(store).await;
}

#[tokio::test]
async fn wrong_length_blob_is_a_token_mismatch() {
    let store = MemHistoryStore::default();
    let msgid = MessageId::from("<short@x>");
    store
        .inner
        .write()
        .await
        .insert(msgid.clone(), vec![0; 10]);
    assert!(matches!(
        store.his_lookup(msgid).await,
        Err(NsError::TokenMismatch)
    ));
    // a healthy write still reads back
    let msgid = MessageId::from("<ok@x>");
    let mut tok = Token::zeroed();
    tok.set_class(2);
    store
        .his_write(msgid.clone(), md_at(1_600_000_000), tok)
        .await
        .unwrap();
    assert_eq!(tok, store.his_lookup(msgid).await.unwrap());
}
