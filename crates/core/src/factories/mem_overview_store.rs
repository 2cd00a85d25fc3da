//! The mem overview store implementation provided by newsspool.

use crate::codec;
use crate::factories::SnapshotOvCursor;
use crate::stripe::GroupLocks;
use newsspool_api::builder::Builder;
use newsspool_api::config::Config;
use newsspool_api::*;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;
use tokio::sync::RwLock;


/// The mem overview store implementation provided by newsspool.
///
/// This keeps the whole overview database in a sorted in-memory map. It
/// speaks the same record format as the durable backend, so everything
/// except persistence behaves identically.
#[derive(Debug)]
pub struct MemOverviewStoreFactory {}

impl MemOverviewStoreFactory {
    /// Construct a new MemOverviewStoreFactory.
    pub fn create() -> DynOverviewStoreFactory {
        let out: DynOverviewStoreFactory =
            Arc::new(MemOverviewStoreFactory {});
        out
    }
}

impl OverviewStoreFactory for MemOverviewStoreFactory {
    fn default_config(&self, _config: &mut Config) -> NsResult<()> {
        Ok(())
    }

    fn create(
        &self,
        _builder: Arc<Builder>,
    ) -> BoxFut<'static, NsResult<DynOverviewStore>> {
        Box::pin(async move {
            let out: DynOverviewStore = Arc::new(MemOverviewStore::new());
            Ok(out)
        })
    }
}

#[derive(Debug)]
pub(crate) struct MemOverviewStore {
    locks: GroupLocks,
    inner: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemOverviewStore {
    pub(crate) fn new() -> Self {
        Self {
            locks: GroupLocks::default(),
            inner: RwLock::new(BTreeMap::new()),
        }
    }

    #[cfg(test)]
    pub(crate) async fn poke_raw(&self, key: Vec<u8>, rec: Vec<u8>) {
        self.inner.write().await.insert(key, rec);
    }
}

impl OverviewStore for MemOverviewStore {
    fn fetch_one(
        &self,
        group: GroupName,
        num: i64,
    ) -> BoxFut<'_, NsResult<(Token, OverviewElement)>> {
        Box::pin(async move {
            let rid = codec::rec_id(&group, num);
            let inner = self.inner.read().await;
            let rec = inner.get(&rid).ok_or(NsError::NoEntry)?;
            let (tk, mut ove) = codec::explode_record(rec)?;
            ove.num = num;
            Ok((tk, ove))
        })
    }

    fn fetch_all(
        &self,
        group: GroupName,
        first: i64,
        last: i64,
    ) -> BoxFut<'_, NsResult<Box<dyn OverviewCursor>>> {
        Box::pin(async move {
            let rid = codec::rec_id(&group, first);
            let mut lid = codec::rec_id(&group, last);
            codec::rec_id_incr(&mut lid);
            if rid >= lid {
                let out: Box<dyn OverviewCursor> =
                    Box::new(SnapshotOvCursor::new(Vec::new()));
                return Ok(out);
            }
            let inner = self.inner.read().await;
            let items: Vec<(Vec<u8>, Vec<u8>)> = inner
                .range(rid..lid)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            let out: Box<dyn OverviewCursor> =
                Box::new(SnapshotOvCursor::new(items));
            Ok(out)
        })
    }

    fn seek_one(
        &self,
        group: GroupName,
        num: i64,
        backward: bool,
    ) -> BoxFut<'_, NsResult<(Token, OverviewElement)>> {
        Box::pin(async move {
            let rid = codec::rec_id(&group, num);
            let inner = self.inner.read().await;
            let found = if backward {
                inner.range::<Vec<u8>, _>(..rid.clone()).next_back()
            } else {
                inner
                    .range::<Vec<u8>, _>((
                        Bound::Excluded(rid.clone()),
                        Bound::Unbounded,
                    ))
                    .next()
            };
            let (key, rec) = found.ok_or(NsError::NoEntry)?;
            // the walk must not leave the group's entry range
            if !codec::rec_id_prefix_eq(&rid, key) {
                return Err(NsError::NoEntry);
            }
            let (tk, mut ove) = codec::explode_record(rec)?;
            ove.num = codec::rec_id_to_num(key);
            Ok((tk, ove))
        })
    }

    fn group_stat(&self, group: GroupName) -> BoxFut<'_, NsResult<GroupStat>> {
        Box::pin(async move {
            let inner = self.inner.read().await;
            let rec = inner
                .get(&codec::gstat_id(&group))
                .ok_or(NsError::NoEntry)?;
            codec::explode_gstat(rec)
        })
    }

    fn group_write_ov(
        &self,
        group: GroupName,
        autonum: bool,
        _md: ArticleMd,
        token: Token,
        ove: OverviewElement,
    ) -> BoxFut<'_, NsResult<OverviewElement>> {
        Box::pin(async move {
            let mut ove = ove;
            let _stripe = self.locks.lock(&group).await;
            let mrid = codec::gstat_id(&group);
            let mut inner = self.inner.write().await;
            let mrec = inner.get(&mrid).ok_or(NsError::NoEntry)?;
            let mut gs = codec::explode_gstat(mrec)?;
            gs.count += 1;
            if autonum {
                gs.high += 1;
                ove.num = gs.high;
            } else if gs.high < ove.num {
                gs.high = ove.num;
            }
            let rid = codec::rec_id(&group, ove.num);
            let rec = codec::join_record(&token, &ove);
            inner.insert(rid, rec);
            inner.insert(mrid, codec::join_gstat(gs).to_vec());
            Ok(ove)
        })
    }

    fn init_group(&self, group: GroupName) -> BoxFut<'_, NsResult<()>> {
        Box::pin(async move {
            let _stripe = self.locks.lock(&group).await;
            let mrid = codec::gstat_id(&group);
            let mut inner = self.inner.write().await;
            let gs = inner
                .get(&mrid)
                .and_then(|rec| codec::explode_gstat(rec).ok())
                .unwrap_or(GroupStat {
                    count: 0,
                    low: 1,
                    high: 0,
                });
            inner.insert(mrid, codec::join_gstat(gs).to_vec());
            Ok(())
        })
    }

    fn cancel_ov(
        &self,
        group: GroupName,
        num: i64,
    ) -> BoxFut<'_, NsResult<()>> {
        Box::pin(async move {
            let _stripe = self.locks.lock(&group).await;
            let rid = codec::rec_id(&group, num);
            let mrid = codec::gstat_id(&group);
            let mut inner = self.inner.write().await;
            inner.remove(&rid);
            if let Some(mut gs) =
                inner.get(&mrid).and_then(|rec| codec::explode_gstat(rec).ok())
            {
                if gs.low == num {
                    gs.low = num + 1;
                    inner.insert(mrid, codec::join_gstat(gs).to_vec());
                }
            }
            Ok(())
        })
    }
}
