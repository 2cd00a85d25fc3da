//! A conformance suite every overview store backend must pass.

use crate::article::{md_at, ove, token};
use newsspool_api::*;

async fn collect(
    mut cur: Box<dyn OverviewCursor>,
) -> Vec<(Token, OverviewElement)> {
    let mut out = Vec::new();
    while let Some(item) = cur.next().await.unwrap() {
        out.push(item);
    }
    out
}

/// Exercise the common behaviors of an overview store.
///
/// The store may be fresh or already carry state for other groups; the
/// suite only touches groups under the `ovconf.` hierarchy.
pub async fn exercise_overview_store(store: DynOverviewStore) {
    let grp = GroupName::from("ovconf.comp.test");
    let md = md_at(1_600_000_000);

    // a write into an uninitialized group must fail
    assert!(matches!(
        store
            .group_write_ov(grp.clone(), true, md, token(3, 1), ove("<c1@x>"))
            .await,
        Err(NsError::NoEntry)
    ));

    // init is idempotent and starts at (0, 1, 0)
    store.init_group(grp.clone()).await.unwrap();
    store.init_group(grp.clone()).await.unwrap();
    assert_eq!(
        GroupStat {
            count: 0,
            low: 1,
            high: 0
        },
        store.group_stat(grp.clone()).await.unwrap()
    );

    // autonum assigns strictly increasing numbers from 1
    for (i, msgid) in ["<c1@x>", "<c2@x>", "<c3@x>"].iter().enumerate() {
        let out = store
            .group_write_ov(
                grp.clone(),
                true,
                md,
                token(3, i as u8 + 1),
                ove(msgid),
            )
            .await
            .unwrap();
        assert_eq!(i as i64 + 1, out.num);
    }
    assert_eq!(
        GroupStat {
            count: 3,
            low: 1,
            high: 3
        },
        store.group_stat(grp.clone()).await.unwrap()
    );

    // init after writes must not reset the watermarks
    store.init_group(grp.clone()).await.unwrap();
    assert_eq!(
        GroupStat {
            count: 3,
            low: 1,
            high: 3
        },
        store.group_stat(grp.clone()).await.unwrap()
    );

    // point fetch round-trips the record and sets the number
    let (tk, o) = store.fetch_one(grp.clone(), 2).await.unwrap();
    assert_eq!(token(3, 2), tk);
    assert_eq!(2, o.num);
    assert_eq!(&b"<c2@x>"[..], &o.msg_id);
    assert!(matches!(
        store.fetch_one(grp.clone(), 9).await,
        Err(NsError::NoEntry)
    ));

    // explicit numbering raises the high watermark
    let out = store
        .group_write_ov(grp.clone(), false, md, token(3, 9), {
            let mut o = ove("<c9@x>");
            o.num = 9;
            o
        })
        .await
        .unwrap();
    assert_eq!(9, out.num);
    assert_eq!(
        GroupStat {
            count: 4,
            low: 1,
            high: 9
        },
        store.group_stat(grp.clone()).await.unwrap()
    );

    // range scans are inclusive and stay inside the group
    let items = collect(store.fetch_all(grp.clone(), 1, 3).await.unwrap()).await;
    assert_eq!(vec![1, 2, 3], items.iter().map(|(_, o)| o.num).collect::<Vec<_>>());
    let items =
        collect(store.fetch_all(grp.clone(), 1, i64::MAX).await.unwrap())
            .await;
    assert_eq!(
        vec![1, 2, 3, 9],
        items.iter().map(|(_, o)| o.num).collect::<Vec<_>>()
    );

    // a prefix group must not leak into the scan of its extension, nor
    // the other way around
    let prefix = GroupName::from("ovconf.comp.tes");
    store.init_group(prefix.clone()).await.unwrap();
    store
        .group_write_ov(prefix.clone(), true, md, token(3, 7), ove("<p1@x>"))
        .await
        .unwrap();
    let items =
        collect(store.fetch_all(prefix.clone(), 1, i64::MAX).await.unwrap())
            .await;
    assert_eq!(1, items.len());
    assert_eq!(&b"<p1@x>"[..], &items[0].1.msg_id);
    let items =
        collect(store.fetch_all(grp.clone(), 1, i64::MAX).await.unwrap())
            .await;
    assert_eq!(4, items.len());

    // seeks step to the strictly adjacent live neighbor
    let (_, o) = store.seek_one(grp.clone(), 4, false).await.unwrap();
    assert_eq!(9, o.num);
    let (_, o) = store.seek_one(grp.clone(), 4, true).await.unwrap();
    assert_eq!(3, o.num);
    let (_, o) = store.seek_one(grp.clone(), 3, false).await.unwrap();
    assert_eq!(9, o.num);
    let (_, o) = store.seek_one(grp.clone(), 3, true).await.unwrap();
    assert_eq!(2, o.num);
    let (_, o) = store.seek_one(grp.clone(), 0, false).await.unwrap();
    assert_eq!(1, o.num);
    // walking off either end of the group is NoEntry
    assert!(store.seek_one(grp.clone(), 1, true).await.is_err());
    assert!(store.seek_one(grp.clone(), 9, false).await.is_err());

    // cancel removes the entry; removing the lowest advances low
    store.cancel_ov(grp.clone(), 1).await.unwrap();
    assert!(store.fetch_one(grp.clone(), 1).await.is_err());
    let gs = store.group_stat(grp.clone()).await.unwrap();
    assert_eq!(2, gs.low);
    assert_eq!(9, gs.high);
    // count never decreases
    assert_eq!(4, gs.count);
    // removing a middle entry leaves low alone
    store.cancel_ov(grp.clone(), 3).await.unwrap();
    assert_eq!(2, store.group_stat(grp.clone()).await.unwrap().low);
    let items =
        collect(store.fetch_all(grp.clone(), 1, i64::MAX).await.unwrap())
            .await;
    assert_eq!(
        vec![2, 9],
        items.iter().map(|(_, o)| o.num).collect::<Vec<_>>()
    );
}
