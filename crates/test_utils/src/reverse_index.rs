//! A conformance suite every reverse index backend must pass.

use crate::article::{md_at, md_expiring};
use newsspool_api::*;

async fn write_pairs(
    ri: &DynReverseIndex,
    msgid: &MessageId,
    md: ArticleMd,
    pairs: &[(&str, i64)],
) {
    let mut w = ri.ri_begin(msgid.clone()).await.unwrap();
    for (i, (grp, num)) in pairs.iter().enumerate() {
        let rie = RiElement {
            group: GroupName::from(*grp),
            num: *num,
        };
        if i == 0 {
            w.ri_write(md, rie).await.unwrap();
        } else {
            w.ri_write_more(md, rie).await.unwrap();
        }
    }
    w.ri_commit().await.unwrap();
}

async fn lookup_all(
    ri: &DynReverseIndex,
    msgid: &MessageId,
) -> Vec<(GroupName, i64)> {
    let mut out = Vec::new();
    let Ok(mut cur) = ri.ri_lookup_all(msgid.clone()).await else {
        return out;
    };
    while let Some(rie) = cur.next().await.unwrap() {
        out.push((rie.group, rie.num));
    }
    out
}

/// Exercise the common behaviors of a reverse index.
pub async fn exercise_reverse_index(ri: DynReverseIndex) {
    let m1 = MessageId::from("<riconf-1@x>");
    let m2 = MessageId::from("<riconf-2@x>");
    let m3 = MessageId::from("<riconf-3@x>");

    // m1 expires first, m2 later, m3 never
    write_pairs(
        &ri,
        &m1,
        md_expiring(1_600_000_000, 1_600_100_000),
        &[("riconf.comp.test", 2), ("riconf.alt.bin", 1)],
    )
    .await;
    write_pairs(
        &ri,
        &m2,
        md_expiring(1_600_000_000, 1_600_200_000),
        &[("riconf.comp.test", 3)],
    )
    .await;
    write_pairs(&ri, &m3, md_at(1_600_000_000), &[("riconf.comp.test", 4)])
        .await;

    // lookup produces the first pair
    let rie = ri.ri_lookup(m1.clone()).await.unwrap();
    assert_eq!(GroupName::from("riconf.comp.test"), rie.group);
    assert_eq!(2, rie.num);

    // lookup_all produces every pair in insertion order
    assert_eq!(
        vec![
            (GroupName::from("riconf.comp.test"), 2),
            (GroupName::from("riconf.alt.bin"), 1),
        ],
        lookup_all(&ri, &m1).await
    );

    assert!(matches!(
        ri.ri_lookup(MessageId::from("<riconf-none@x>")).await,
        Err(NsError::NoEntry)
    ));

    // an expiry scan before every deadline yields nothing
    let mut cur = ri
        .ri_query_expired(Timestamp::from_unix_secs(1_600_050_000))
        .await
        .unwrap();
    assert!(cur.next().await.unwrap().is_none());

    // a scan past m1's deadline yields m1 only: both group entries, then
    // exactly one article terminator
    let mut cur = ri
        .ri_query_expired(Timestamp::from_unix_secs(1_600_150_000))
        .await
        .unwrap();
    let mut groups = Vec::new();
    let mut articles = Vec::new();
    while let Some(step) = cur.next().await.unwrap() {
        match step {
            RiHistory::Group { group, num } => {
                // group entries always precede their article terminator
                assert!(articles.is_empty());
                groups.push((group, num));
            }
            RiHistory::Article { message_id } => articles.push(message_id),
        }
    }
    assert_eq!(
        vec![
            (GroupName::from("riconf.comp.test"), 2),
            (GroupName::from("riconf.alt.bin"), 1),
        ],
        groups
    );
    assert_eq!(vec![m1.clone()], articles);

    // a scan past both deadlines yields both articles, each terminated
    let mut cur = ri
        .ri_query_expired(Timestamp::from_unix_secs(1_600_250_000))
        .await
        .unwrap();
    let mut pending_groups = 0;
    let mut articles = Vec::new();
    while let Some(step) = cur.next().await.unwrap() {
        match step {
            RiHistory::Group { .. } => pending_groups += 1,
            RiHistory::Article { message_id } => {
                assert!(pending_groups > 0);
                pending_groups = 0;
                articles.push(message_id);
            }
        }
    }
    assert_eq!(2, articles.len());
    assert!(articles.contains(&m1));
    assert!(articles.contains(&m2));
    // the unexpiring article never shows up
    assert!(!articles.contains(&m3));

    // expire removes the record and the queue entries
    ri.ri_expire(m1.clone()).await.unwrap();
    assert!(ri.ri_lookup(m1.clone()).await.is_err());
    assert!(lookup_all(&ri, &m1).await.is_empty());
    let mut cur = ri
        .ri_query_expired(Timestamp::from_unix_secs(1_600_250_000))
        .await
        .unwrap();
    let mut articles = Vec::new();
    while let Some(step) = cur.next().await.unwrap() {
        if let RiHistory::Article { message_id } = step {
            articles.push(message_id);
        }
    }
    assert_eq!(vec![m2.clone()], articles);

    // m2 and m3 are untouched by m1's removal
    assert_eq!(3, ri.ri_lookup(m2.clone()).await.unwrap().num);
    assert_eq!(4, ri.ri_lookup(m3.clone()).await.unwrap().num);

    ri.ri_expire(m2.clone()).await.unwrap();
    ri.ri_expire(m3.clone()).await.unwrap();
}
