use super::*;
use newsspool_test_utils::article::md_at;

#[tokio::test]
async fn round_trip_and_cancel() {
    let store = MemArticleStore::new(5);
    let body = Bytes::from_static(b"Subject: hi\r\n\r\nhello\r\n");
    let token = store.store(md_at(0), body.clone()).await.unwrap();
    assert_eq!(5, token.class());

    let got = store.retrieve(token, RetrieveLevel::All).await.unwrap();
    assert_eq!(body, got.data);
    assert_eq!(RetrieveLevel::All, got.level);

    let got = store.retrieve(token, RetrieveLevel::Stat).await.unwrap();
    assert_eq!(RetrieveLevel::Stat, got.level);
    assert!(got.data.is_empty());

    store.cancel(token).await.unwrap();
    assert!(matches!(
        store.retrieve(token, RetrieveLevel::All).await,
        Err(NsError::NoEntry)
    ));
    assert!(store.cancel(token).await.is_err());
}

#[tokio::test]
async fn tokens_are_distinct() {
    let store = MemArticleStore::new(1);
    let t1 = store
        .store(md_at(0), Bytes::from_static(b"a"))
        .await
        .unwrap();
    let t2 = store
        .store(md_at(0), Bytes::from_static(b"b"))
        .await
        .unwrap();
    assert_ne!(t1, t2);
    assert_eq!(
        &b"a"[..],
        &store.retrieve(t1, RetrieveLevel::All).await.unwrap().data
    );
}
