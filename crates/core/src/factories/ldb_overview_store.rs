//! The durable overview store implementation provided by newsspool.
//!
//! Overview records live in one ordered [redb] database under
//! `<spool>/ovldb/`, keyed and encoded exactly like the mem backend, so
//! the two are spool-compatible.

use crate::codec;
use crate::factories::{store_err, SnapshotOvCursor};
use crate::stripe::GroupLocks;
use newsspool_api::builder::Builder;
use newsspool_api::config::{Config, SpoolConfig};
use newsspool_api::*;
use redb::{Database, TableDefinition};
use std::ops::Bound;
use std::path::Path;
use std::sync::Arc;


const OV_TABLE: TableDefinition<&[u8], &[u8]> =
    TableDefinition::new("overview");

/// The durable overview store implementation provided by newsspool.
#[derive(Debug)]
pub struct LdbOverviewStoreFactory {}

impl LdbOverviewStoreFactory {
    /// Construct a new LdbOverviewStoreFactory.
    pub fn create() -> DynOverviewStoreFactory {
        let out: DynOverviewStoreFactory =
            Arc::new(LdbOverviewStoreFactory {});
        out
    }
}

impl OverviewStoreFactory for LdbOverviewStoreFactory {
    fn default_config(&self, _config: &mut Config) -> NsResult<()> {
        Ok(())
    }

    fn create(
        &self,
        builder: Arc<Builder>,
    ) -> BoxFut<'static, NsResult<DynOverviewStore>> {
        Box::pin(async move {
            let spool: SpoolConfig =
                builder.config.get_module_config(SpoolConfig::MODULE)?;
            let store = LdbOverviewStore::open(
                &Path::new(&spool.spool).join("ovldb"),
            )?;
            let out: DynOverviewStore = Arc::new(store);
            Ok(out)
        })
    }
}

#[derive(Debug)]
pub(crate) struct LdbOverviewStore {
    locks: GroupLocks,
    db: Database,
}

impl LdbOverviewStore {
    pub(crate) fn open(dir: &Path) -> NsResult<Self> {
        std::fs::create_dir_all(dir)?;
        let db = Database::create(dir.join("ov.redb")).map_err(store_err)?;
        let w = db.begin_write().map_err(store_err)?;
        w.open_table(OV_TABLE).map_err(store_err)?;
        w.commit().map_err(store_err)?;
        Ok(Self {
            locks: GroupLocks::default(),
            db,
        })
    }

    fn get_raw(&self, key: &[u8]) -> NsResult<Option<Vec<u8>>> {
        let r = self.db.begin_read().map_err(store_err)?;
        let t = r.open_table(OV_TABLE).map_err(store_err)?;
        Ok(t.get(key).map_err(store_err)?.map(|v| v.value().to_vec()))
    }

    /// One write transaction; the atomic batch of the write protocol.
    fn put_batch(&self, items: &[(Vec<u8>, Vec<u8>)]) -> NsResult<()> {
        let w = self.db.begin_write().map_err(store_err)?;
        {
            let mut t = w.open_table(OV_TABLE).map_err(store_err)?;
            for (key, rec) in items {
                t.insert(key.as_slice(), rec.as_slice())
                    .map_err(store_err)?;
            }
        }
        w.commit().map_err(store_err)
    }

    fn remove_batch(
        &self,
        removals: &[Vec<u8>],
        puts: &[(Vec<u8>, Vec<u8>)],
    ) -> NsResult<()> {
        let w = self.db.begin_write().map_err(store_err)?;
        {
            let mut t = w.open_table(OV_TABLE).map_err(store_err)?;
            for key in removals {
                t.remove(key.as_slice()).map_err(store_err)?;
            }
            for (key, rec) in puts {
                t.insert(key.as_slice(), rec.as_slice())
                    .map_err(store_err)?;
            }
        }
        w.commit().map_err(store_err)
    }
}

impl OverviewStore for LdbOverviewStore {
    fn fetch_one(
        &self,
        group: GroupName,
        num: i64,
    ) -> BoxFut<'_, NsResult<(Token, OverviewElement)>> {
        Box::pin(async move {
            let rid = codec::rec_id(&group, num);
            let rec = self.get_raw(&rid)?.ok_or(NsError::NoEntry)?;
            let (tk, mut ove) = codec::explode_record(&rec)?;
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
            let r = self.db.begin_read().map_err(store_err)?;
            let t = r.open_table(OV_TABLE).map_err(store_err)?;
            let items = t
                .range(rid.as_slice()..lid.as_slice())
                .map_err(store_err)?
                .map(|entry| {
                    entry
                        .map(|(k, v)| (k.value().to_vec(), v.value().to_vec()))
                        .map_err(store_err)
                })
                .collect::<NsResult<Vec<_>>>()?;
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
            let r = self.db.begin_read().map_err(store_err)?;
            let t = r.open_table(OV_TABLE).map_err(store_err)?;
            let found = if backward {
                t.range(..rid.as_slice()).map_err(store_err)?.next_back()
            } else {
                let bounds: (Bound<&[u8]>, Bound<&[u8]>) = (
                    Bound::Excluded(rid.as_slice()),
                    Bound::Unbounded,
                );
                t.range::<&[u8]>(bounds).map_err(store_err)?.next()
            };
            let (key, rec) = match found {
                None => return Err(NsError::NoEntry),
                Some(entry) => {
                    let (k, v) = entry.map_err(store_err)?;
                    (k.value().to_vec(), v.value().to_vec())
                }
            };
            // the walk must not leave the group's entry range
            if !codec::rec_id_prefix_eq(&rid, &key) {
                return Err(NsError::NoEntry);
            }
            let (tk, mut ove) = codec::explode_record(&rec)?;
            ove.num = codec::rec_id_to_num(&key);
            Ok((tk, ove))
        })
    }

    fn group_stat(&self, group: GroupName) -> BoxFut<'_, NsResult<GroupStat>> {
        Box::pin(async move {
            let rec = self
                .get_raw(&codec::gstat_id(&group))?
                .ok_or(NsError::NoEntry)?;
            codec::explode_gstat(&rec)
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
            let mrec = self.get_raw(&mrid)?.ok_or(NsError::NoEntry)?;
            let mut gs = codec::explode_gstat(&mrec)?;
            gs.count += 1;
            if autonum {
                gs.high += 1;
                ove.num = gs.high;
            } else if gs.high < ove.num {
                gs.high = ove.num;
            }
            let rid = codec::rec_id(&group, ove.num);
            let rec = codec::join_record(&token, &ove);
            self.put_batch(&[
                (rid, rec),
                (mrid, codec::join_gstat(gs).to_vec()),
            ])?;
            Ok(ove)
        })
    }

    fn init_group(&self, group: GroupName) -> BoxFut<'_, NsResult<()>> {
        Box::pin(async move {
            let _stripe = self.locks.lock(&group).await;
            let mrid = codec::gstat_id(&group);
            let gs = self
                .get_raw(&mrid)?
                .and_then(|rec| codec::explode_gstat(&rec).ok())
                .unwrap_or(GroupStat {
                    count: 0,
                    low: 1,
                    high: 0,
                });
            self.put_batch(&[(mrid, codec::join_gstat(gs).to_vec())])
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
            let mut puts = Vec::new();
            if let Some(mut gs) = self
                .get_raw(&mrid)?
                .and_then(|rec| codec::explode_gstat(&rec).ok())
            {
                if gs.low == num {
                    gs.low = num + 1;
                    puts.push((mrid, codec::join_gstat(gs).to_vec()));
                }
            }
            self.remove_batch(&[rid], &puts)
        })
    }
}
