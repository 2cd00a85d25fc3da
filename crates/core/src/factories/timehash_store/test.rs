use super::*;
use newsspool_test_utils::article::md_at;

fn store_at(dir: &std::path::Path, class: u8) -> TimehashStore {
    TimehashStore::new(dir.to_path_buf(), class)
}

#[tokio::test]
async fn round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_at(dir.path(), 3);
    let body = Bytes::from_static(b"Subject: hi\r\n\r\nhello\r\n");
    let token = store
        .store(md_at(0x0102030405), body.clone())
        .await
        .unwrap();
    assert_eq!(3, token.class());

    let got = store.retrieve(token, RetrieveLevel::All).await.unwrap();
    assert_eq!(RetrieveLevel::All, got.level);
    assert_eq!(body, got.data);
}

#[tokio::test]
async fn filename_grammar() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_at(dir.path(), 0x2a);
    // arrival 0x0102030405 reads as zz=01 aa=02 bb=03 cc=04 dd=05; the
    // first serial is 1
    let token = store
        .store(md_at(0x0102030405), Bytes::from_static(b"x"))
        .await
        .unwrap();
    let expect = dir
        .path()
        .join("time-2a")
        .join("0103")
        .join("04")
        .join("0001-0205");
    assert!(expect.is_file(), "missing {expect:?}");
    assert_eq!(expect, store.path_for(&token));
}

#[tokio::test]
async fn token_payload_layout() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_at(dir.path(), 1);
    let token = store
        .store(md_at(1_600_000_000), Bytes::from_static(b"x"))
        .await
        .unwrap();
    let p = token.payload();
    assert_eq!(
        1_600_000_000u64,
        u64::from_be_bytes(p[..8].try_into().unwrap())
    );
    assert_eq!(1u32, u32::from_be_bytes(p[8..12].try_into().unwrap()));
    assert!(p[12..].iter().all(|&b| b == 0));
}

#[tokio::test]
async fn stat_level_is_metadata_only() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_at(dir.path(), 1);
    let token = store
        .store(md_at(1_600_000_000), Bytes::from_static(b"payload"))
        .await
        .unwrap();
    let got = store.retrieve(token, RetrieveLevel::Stat).await.unwrap();
    assert_eq!(RetrieveLevel::Stat, got.level);
    assert!(got.data.is_empty());

    // a head request on a flat file is answered with the whole article
    let got = store.retrieve(token, RetrieveLevel::Head).await.unwrap();
    assert_eq!(RetrieveLevel::All, got.level);
    assert_eq!(&b"payload"[..], &got.data);
}

#[tokio::test]
async fn cancel_unlinks() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_at(dir.path(), 1);
    let token = store
        .store(md_at(1_600_000_000), Bytes::from_static(b"x"))
        .await
        .unwrap();
    store.cancel(token).await.unwrap();
    assert!(store.retrieve(token, RetrieveLevel::Stat).await.is_err());
    assert!(store.cancel(token).await.is_err());
}

#[tokio::test]
async fn serial_collision_bumps_to_the_next_file() {
    let dir = tempfile::tempdir().unwrap();
    // two stores simulate a restart that reset the serial counter
    let a = store_at(dir.path(), 1);
    let b = store_at(dir.path(), 1);
    let md = md_at(1_600_000_000);
    let t1 = a.store(md, Bytes::from_static(b"one")).await.unwrap();
    let t2 = b.store(md, Bytes::from_static(b"two")).await.unwrap();
    assert_ne!(t1, t2);
    assert_eq!(
        &b"one"[..],
        &a.retrieve(t1, RetrieveLevel::All).await.unwrap().data
    );
    assert_eq!(
        &b"two"[..],
        &b.retrieve(t2, RetrieveLevel::All).await.unwrap().data
    );
}

#[tokio::test]
async fn distinct_serials_per_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_at(dir.path(), 1);
    let md = md_at(1_600_000_000);
    let t1 = store.store(md, Bytes::from_static(b"a")).await.unwrap();
    let t2 = store.store(md, Bytes::from_static(b"b")).await.unwrap();
    assert_ne!(t1, t2);
}
