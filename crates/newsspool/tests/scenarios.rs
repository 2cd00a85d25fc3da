//! End-to-end scenarios over the assembled engine, run against both the
//! mem-backed and the durable spool.

use newsspool_api::config::{
    SpoolConfig, StorageClassConfig, StorageClassesConfig,
};
use newsspool_api::*;
use newsspool_core::expirer::Expirer;
use newsspool_core::poster::{PostOutcome, Poster, RejectReason};
use newsspool_core::{default_builder, Spool};
use newsspool_test_utils::article::{article, simple_article};
use newsspool_test_utils::enable_tracing;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

async fn mem_spool() -> Spool {
    Spool::open(newsspool_core::default_test_builder())
        .await
        .unwrap()
}

async fn durable_spool(dir: &std::path::Path) -> Spool {
    let mut b = default_builder();
    b.config
        .set_module_config(
            SpoolConfig::MODULE.into(),
            &SpoolConfig {
                spool: dir.display().to_string(),
                ..Default::default()
            },
        )
        .unwrap();
    b.config
        .set_module_config(
            StorageClassesConfig::MODULE.into(),
            &StorageClassesConfig {
                classes: vec![StorageClassConfig {
                    method: "timehash".into(),
                    class: 3,
                    ..Default::default()
                }],
            },
        )
        .unwrap();
    Spool::open(b).await.unwrap()
}

async fn init(spool: &Spool, group: &str) {
    spool
        .overview()
        .init_group(GroupName::from(group))
        .await
        .unwrap();
}

async fn post(spool: &Spool, art: &[u8]) -> (MessageId, Token) {
    match spool.poster().perform_post(b"", art).await.unwrap() {
        PostOutcome::Accepted { message_id, token } => (message_id, token),
        other => panic!("expected acceptance, got {other:?}"),
    }
}

/// S1: first post into a fresh group.
async fn first_post(spool: Spool, expect_class: u8) {
    init(&spool, "comp.test").await;
    assert_eq!(
        GroupStat {
            count: 0,
            low: 1,
            high: 0
        },
        spool
            .overview()
            .group_stat(GroupName::from("comp.test"))
            .await
            .unwrap()
    );

    let art = article(
        &[
            ("Newsgroups", "comp.test"),
            ("Message-ID", "<a@x>"),
            ("Subject", "hi"),
        ],
        "hello\n",
    );
    let (message_id, _) = post(&spool, &art).await;
    assert_eq!(MessageId::from("<a@x>"), message_id);

    assert_eq!(
        GroupStat {
            count: 1,
            low: 1,
            high: 1
        },
        spool
            .overview()
            .group_stat(GroupName::from("comp.test"))
            .await
            .unwrap()
    );
    let (_, ove) = spool
        .overview()
        .fetch_one(GroupName::from("comp.test"), 1)
        .await
        .unwrap();
    assert_eq!(&b"<a@x>"[..], &ove.msg_id);

    let token = spool.history().his_lookup(message_id).await.unwrap();
    assert_eq!(expect_class, token.class());
}

#[tokio::test]
async fn s1_first_post_mem() {
    enable_tracing();
    first_post(mem_spool().await, 0).await;
}

#[tokio::test]
async fn s1_first_post_durable() {
    enable_tracing();
    let dir = tempfile::tempdir().unwrap();
    first_post(durable_spool(dir.path()).await, 3).await;
}

/// S2: a crosspost lands in both groups with per-group numbering.
async fn crosspost(spool: Spool) {
    init(&spool, "comp.test").await;
    init(&spool, "alt.bin").await;

    post(&spool, &simple_article("<a@x>", "comp.test", "one\n")).await;
    post(&spool, &simple_article("<b@x>", "comp.test, alt.bin", "two\n"))
        .await;

    let (_, ove) = spool
        .overview()
        .fetch_one(GroupName::from("comp.test"), 2)
        .await
        .unwrap();
    assert_eq!(&b"<b@x>"[..], &ove.msg_id);
    let (_, ove) = spool
        .overview()
        .fetch_one(GroupName::from("alt.bin"), 1)
        .await
        .unwrap();
    assert_eq!(&b"<b@x>"[..], &ove.msg_id);

    let mut cur = spool
        .reverse_index()
        .ri_lookup_all(MessageId::from("<b@x>"))
        .await
        .unwrap();
    let mut pairs = Vec::new();
    while let Some(rie) = cur.next().await.unwrap() {
        pairs.push((rie.group, rie.num));
    }
    assert_eq!(
        vec![
            (GroupName::from("comp.test"), 2),
            (GroupName::from("alt.bin"), 1),
        ],
        pairs
    );
}

#[tokio::test]
async fn s2_crosspost_mem() {
    crosspost(mem_spool().await).await;
}

#[tokio::test]
async fn s2_crosspost_durable() {
    let dir = tempfile::tempdir().unwrap();
    crosspost(durable_spool(dir.path()).await).await;
}

/// S3: a duplicate message-id is rejected, not failed.
#[tokio::test]
async fn s3_duplicate_rejected() {
    let spool = mem_spool().await;
    init(&spool, "comp.test").await;
    post(&spool, &simple_article("<a@x>", "comp.test", "one\n")).await;
    assert_eq!(
        PostOutcome::Rejected(RejectReason::Duplicate),
        spool
            .poster()
            .perform_post(b"", &simple_article("<a@x>", "comp.test", "two\n"))
            .await
            .unwrap()
    );
    assert_eq!(
        1,
        spool
            .overview()
            .group_stat(GroupName::from("comp.test"))
            .await
            .unwrap()
            .count
    );
}

/// S4: cancel by (group, number) clears every trace.
async fn cancel_group_num(spool: Spool) {
    init(&spool, "comp.test").await;
    let (mid, token) =
        post(&spool, &simple_article("<a@x>", "comp.test", "one\n")).await;
    post(&spool, &simple_article("<b@x>", "comp.test", "two\n")).await;

    spool
        .expirer()
        .cancel_group_num(GroupName::from("comp.test"), 1)
        .await
        .unwrap();

    assert!(matches!(
        spool.history().his_lookup(mid).await,
        Err(NsError::NoEntry)
    ));
    assert!(spool
        .storage()
        .retrieve(token, RetrieveLevel::Stat)
        .await
        .is_err());
    let mut cur = spool
        .overview()
        .fetch_all(GroupName::from("comp.test"), 1, i64::MAX)
        .await
        .unwrap();
    let mut nums = Vec::new();
    while let Some((_, ove)) = cur.next().await.unwrap() {
        nums.push(ove.num);
    }
    assert_eq!(vec![2], nums);
}

#[tokio::test]
async fn s4_cancel_group_num_mem() {
    cancel_group_num(mem_spool().await).await;
}

#[tokio::test]
async fn s4_cancel_group_num_durable() {
    let dir = tempfile::tempdir().unwrap();
    cancel_group_num(durable_spool(dir.path()).await).await;
}

/// S5: expiry takes only what has elapsed.
async fn staggered_expiry(spool: Spool) {
    init(&spool, "comp.test").await;
    let early = Poster::new(
        spool.storage().clone(),
        spool.overview().clone(),
        spool.history().clone(),
        spool.reverse_index().clone(),
        Some(Duration::from_secs(100)),
    );
    let late = Poster::new(
        spool.storage().clone(),
        spool.overview().clone(),
        spool.history().clone(),
        spool.reverse_index().clone(),
        Some(Duration::from_secs(1_000_000)),
    );

    let art = simple_article("<t1@x>", "comp.test", "one\n");
    assert!(matches!(
        early.perform_post(b"", &art).await.unwrap(),
        PostOutcome::Accepted { .. }
    ));
    let art = simple_article("<t2@x>", "comp.test", "two\n");
    assert!(matches!(
        late.perform_post(b"", &art).await.unwrap(),
        PostOutcome::Accepted { .. }
    ));

    let shutdown = AtomicBool::new(false);
    let count = spool
        .expirer()
        .expire_process(&shutdown, Timestamp::now() + Duration::from_secs(1000))
        .await
        .unwrap();
    assert_eq!(1, count);

    assert!(spool
        .history()
        .his_lookup(MessageId::from("<t1@x>"))
        .await
        .is_err());
    // the second article's reverse index entry is intact
    assert_eq!(
        2,
        spool
            .reverse_index()
            .ri_lookup(MessageId::from("<t2@x>"))
            .await
            .unwrap()
            .num
    );
}

#[tokio::test]
async fn s5_staggered_expiry_mem() {
    staggered_expiry(mem_spool().await).await;
}

#[tokio::test]
async fn s5_staggered_expiry_durable() {
    let dir = tempfile::tempdir().unwrap();
    staggered_expiry(durable_spool(dir.path()).await).await;
}

/// S6 lives with the framing unit tests; here the equivalent end to
/// end: a stored article is byte-identical and splits back apart.
#[tokio::test]
async fn stored_article_round_trips() {
    let spool = mem_spool().await;
    init(&spool, "comp.test").await;
    let art = article(
        &[
            ("A", "1"),
            ("Newsgroups", "comp.test"),
            ("Message-ID", "<rt@x>"),
        ],
        "body\r\n",
    );
    let (_, token) = post(&spool, &art).await;
    let got = spool
        .storage()
        .retrieve(token, RetrieveLevel::All)
        .await
        .unwrap();
    assert_eq!(RetrieveLevel::All, got.level);
    assert_eq!(&art[..], &got.data);
}

/// An expirer without a reverse index cannot run a batch expiry.
#[tokio::test]
async fn expirer_needs_a_queue() {
    let spool = mem_spool().await;
    let expirer = Expirer::new(
        spool.storage().clone(),
        spool.overview().clone(),
        spool.history().clone(),
        None,
    );
    assert!(matches!(
        expirer
            .expire_process(&AtomicBool::new(false), Timestamp::now())
            .await,
        Err(NsError::CouldNotQuery)
    ));
}
