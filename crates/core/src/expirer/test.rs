use super::*;
use crate::default_test_builder;
use crate::poster::{PostOutcome, Poster};
use crate::spool::Spool;
use newsspool_test_utils::article::simple_article;
use std::time::Duration;

async fn mem_spool() -> Spool {
    Spool::open(default_test_builder()).await.unwrap()
}

async fn init_groups(spool: &Spool, groups: &[&str]) {
    for g in groups {
        spool
            .overview()
            .init_group(GroupName::from(*g))
            .await
            .unwrap();
    }
}

fn expiring_poster(spool: &Spool, retention: Duration) -> Poster {
    Poster::new(
        spool.storage().clone(),
        spool.overview().clone(),
        spool.history().clone(),
        spool.reverse_index().clone(),
        Some(retention),
    )
}

async fn post(poster: &Poster, msgid: &str, groups: &str) -> Token {
    let art = simple_article(msgid, groups, "body\r\n");
    match poster.perform_post(b"", &art).await.unwrap() {
        PostOutcome::Accepted { token, .. } => token,
        other => panic!("expected acceptance, got {other:?}"),
    }
}

async fn assert_gone(spool: &Spool, msgid: &str, pairs: &[(&str, i64)]) {
    let mid = MessageId::from(msgid);
    assert!(spool.history().his_lookup(mid.clone()).await.is_err());
    assert!(spool.reverse_index().ri_lookup(mid).await.is_err());
    for (grp, num) in pairs {
        assert!(spool
            .overview()
            .fetch_one(GroupName::from(*grp), *num)
            .await
            .is_err());
    }
}

#[tokio::test]
async fn cancel_message_id_tears_down_every_index() {
    let spool = mem_spool().await;
    init_groups(&spool, &["comp.test", "alt.bin"]).await;
    let poster = spool.poster();
    let token = post(&poster, "<gone@x>", "comp.test, alt.bin").await;
    let keep = post(&poster, "<keep@x>", "comp.test").await;

    spool
        .expirer()
        .cancel_message_id(MessageId::from("<gone@x>"))
        .await
        .unwrap();

    assert_gone(&spool, "<gone@x>", &[("comp.test", 1), ("alt.bin", 1)])
        .await;
    assert!(spool
        .storage()
        .retrieve(token, RetrieveLevel::Stat)
        .await
        .is_err());

    // the other article is untouched
    assert!(spool
        .storage()
        .retrieve(keep, RetrieveLevel::Stat)
        .await
        .is_ok());
    assert!(spool
        .overview()
        .fetch_one(GroupName::from("comp.test"), 2)
        .await
        .is_ok());
}

#[tokio::test]
async fn cancel_group_num_resolves_the_id_first() {
    let spool = mem_spool().await;
    init_groups(&spool, &["comp.test", "alt.bin"]).await;
    let poster = spool.poster();
    let token = post(&poster, "<gn@x>", "comp.test, alt.bin").await;

    spool
        .expirer()
        .cancel_group_num(GroupName::from("comp.test"), 1)
        .await
        .unwrap();

    // the cancel reaches every filing, not just the named one
    assert_gone(&spool, "<gn@x>", &[("comp.test", 1), ("alt.bin", 1)]).await;
    assert!(spool
        .storage()
        .retrieve(token, RetrieveLevel::Stat)
        .await
        .is_err());

    assert!(matches!(
        spool
            .expirer()
            .cancel_group_num(GroupName::from("comp.test"), 1)
            .await,
        Err(NsError::NoEntry)
    ));
}

#[tokio::test]
async fn expire_process_only_takes_elapsed_articles() {
    let spool = mem_spool().await;
    init_groups(&spool, &["comp.test"]).await;
    let early = expiring_poster(&spool, Duration::from_secs(100));
    let late = expiring_poster(&spool, Duration::from_secs(1_000_000));

    let t1 = post(&early, "<early@x>", "comp.test").await;
    let t2 = post(&late, "<late@x>", "comp.test").await;

    let shutdown = AtomicBool::new(false);
    let count = spool
        .expirer()
        .expire_process(
            &shutdown,
            Timestamp::now() + Duration::from_secs(1000),
        )
        .await
        .unwrap();
    assert_eq!(1, count);

    assert_gone(&spool, "<early@x>", &[("comp.test", 1)]).await;
    assert!(spool
        .storage()
        .retrieve(t1, RetrieveLevel::Stat)
        .await
        .is_err());

    // the later article survived with its queue entry intact
    assert!(spool
        .storage()
        .retrieve(t2, RetrieveLevel::Stat)
        .await
        .is_ok());
    assert_eq!(
        1,
        spool
            .reverse_index()
            .ri_lookup(MessageId::from("<late@x>"))
            .await
            .unwrap()
            .num
    );

    // a second sweep finds nothing left
    let count = spool
        .expirer()
        .expire_process(
            &shutdown,
            Timestamp::now() + Duration::from_secs(1000),
        )
        .await
        .unwrap();
    assert_eq!(0, count);
}

#[tokio::test]
async fn shutdown_is_observed_between_articles() {
    let spool = mem_spool().await;
    init_groups(&spool, &["comp.test"]).await;
    let poster = expiring_poster(&spool, Duration::from_secs(1));
    for id in ["<s1@x>", "<s2@x>", "<s3@x>"] {
        post(&poster, id, "comp.test").await;
    }

    let shutdown = AtomicBool::new(true);
    let count = spool
        .expirer()
        .expire_process(
            &shutdown,
            Timestamp::now() + Duration::from_secs(100),
        )
        .await
        .unwrap();
    // the in-flight article is fully gone before the signal is honored
    assert_eq!(1, count);

    let shutdown = AtomicBool::new(false);
    let count = spool
        .expirer()
        .expire_process(
            &shutdown,
            Timestamp::now() + Duration::from_secs(100),
        )
        .await
        .unwrap();
    assert_eq!(2, count);
}

#[tokio::test]
async fn no_reverse_index_cannot_query() {
    let spool = mem_spool().await;
    let expirer = Expirer::new(
        spool.storage().clone(),
        spool.overview().clone(),
        spool.history().clone(),
        None,
    );
    let shutdown = AtomicBool::new(false);
    assert!(matches!(
        expirer.expire_process(&shutdown, Timestamp::now()).await,
        Err(NsError::CouldNotQuery)
    ));
}
