//! A conformance suite every history store backend must pass.

use crate::article::{md_at, token};
use newsspool_api::*;

/// Exercise the common behaviors of a history store.
pub async fn exercise_history_store(store: DynHistoryStore) {
    let m1 = MessageId::from("<hisconf-1@x>");
    let m2 = MessageId::from("<hisconf-2@x>");
    let md = md_at(1_600_000_000);

    assert!(matches!(
        store.his_lookup(m1.clone()).await,
        Err(NsError::NoEntry)
    ));

    store.his_write(m1.clone(), md, token(3, 0xaa)).await.unwrap();
    store.his_write(m2.clone(), md, token(5, 0xbb)).await.unwrap();

    assert_eq!(token(3, 0xaa), store.his_lookup(m1.clone()).await.unwrap());
    assert_eq!(token(5, 0xbb), store.his_lookup(m2.clone()).await.unwrap());

    // a rewrite replaces the token
    store.his_write(m1.clone(), md, token(4, 0xcc)).await.unwrap();
    assert_eq!(token(4, 0xcc), store.his_lookup(m1.clone()).await.unwrap());

    store.his_cancel(m1.clone()).await.unwrap();
    assert!(matches!(
        store.his_lookup(m1.clone()).await,
        Err(NsError::NoEntry)
    ));
    // the other entry is untouched
    assert_eq!(token(5, 0xbb), store.his_lookup(m2.clone()).await.unwrap());

    store.his_cancel(m2.clone()).await.unwrap();
}
