//! The durable reverse index implementation provided by newsspool.
//!
//! The lineage triad, one [redb] database each: `<spool>/rildbm/` holds
//! the record map (msgid → group/number lines), `<spool>/rildbt/` the
//! expiry queue (expiry-key → msgid), `<spool>/rildbr/` the
//! back-reference (msgid → expiry-key).

use crate::codec;
use crate::factories::{
    store_err, SnapshotRiCursor, SnapshotRiExpiryCursor,
};
use newsspool_api::builder::Builder;
use newsspool_api::config::{Config, SpoolConfig};
use newsspool_api::*;
use redb::{Database, TableDefinition};
use std::path::Path;
use std::sync::Arc;


const RI_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("ri");

/// The durable reverse index implementation provided by newsspool.
#[derive(Debug)]
pub struct LdbReverseIndexFactory {}

impl LdbReverseIndexFactory {
    /// Construct a new LdbReverseIndexFactory.
    pub fn create() -> DynReverseIndexFactory {
        let out: DynReverseIndexFactory = Arc::new(LdbReverseIndexFactory {});
        out
    }
}

impl ReverseIndexFactory for LdbReverseIndexFactory {
    fn default_config(&self, _config: &mut Config) -> NsResult<()> {
        Ok(())
    }

    fn create(
        &self,
        builder: Arc<Builder>,
    ) -> BoxFut<'static, NsResult<DynReverseIndex>> {
        Box::pin(async move {
            let spool: SpoolConfig =
                builder.config.get_module_config(SpoolConfig::MODULE)?;
            let store = LdbReverseIndex::open(Path::new(&spool.spool))?;
            let out: DynReverseIndex = Arc::new(store);
            Ok(out)
        })
    }
}

#[derive(Debug)]
struct Dbs {
    mdb: Database,
    tdb: Database,
    rdb: Database,
}

fn open_one(dir: &Path) -> NsResult<Database> {
    std::fs::create_dir_all(dir)?;
    let db = Database::create(dir.join("ri.redb")).map_err(store_err)?;
    let w = db.begin_write().map_err(store_err)?;
    w.open_table(RI_TABLE).map_err(store_err)?;
    w.commit().map_err(store_err)?;
    Ok(db)
}

fn put(db: &Database, key: &[u8], value: &[u8]) -> NsResult<()> {
    let w = db.begin_write().map_err(store_err)?;
    {
        let mut t = w.open_table(RI_TABLE).map_err(store_err)?;
        t.insert(key, value).map_err(store_err)?;
    }
    w.commit().map_err(store_err)
}

fn get(db: &Database, key: &[u8]) -> NsResult<Option<Vec<u8>>> {
    let r = db.begin_read().map_err(store_err)?;
    let t = r.open_table(RI_TABLE).map_err(store_err)?;
    Ok(t.get(key).map_err(store_err)?.map(|v| v.value().to_vec()))
}

fn remove(db: &Database, key: &[u8]) -> NsResult<()> {
    let w = db.begin_write().map_err(store_err)?;
    {
        let mut t = w.open_table(RI_TABLE).map_err(store_err)?;
        t.remove(key).map_err(store_err)?;
    }
    w.commit().map_err(store_err)
}

#[derive(Debug)]
pub(crate) struct LdbReverseIndex {
    dbs: Arc<Dbs>,
}

impl LdbReverseIndex {
    pub(crate) fn open(spool: &Path) -> NsResult<Self> {
        Ok(Self {
            dbs: Arc::new(Dbs {
                mdb: open_one(&spool.join("rildbm"))?,
                tdb: open_one(&spool.join("rildbt"))?,
                rdb: open_one(&spool.join("rildbr"))?,
            }),
        })
    }
}

struct LdbRiWriter {
    dbs: Arc<Dbs>,
    msgid: MessageId,
    buf: Vec<u8>,
}

impl RiWriter for LdbRiWriter {
    fn ri_write(
        &mut self,
        md: ArticleMd,
        rie: RiElement,
    ) -> BoxFut<'_, NsResult<()>> {
        Box::pin(async move {
            if let Some(expires) = md.expires {
                let key = codec::expiry_key(expires, &self.msgid);
                put(&self.dbs.tdb, &key, &self.msgid)?;
                put(&self.dbs.rdb, &self.msgid, &key)?;
            }
            codec::mdb_push_line(&mut self.buf, &rie);
            Ok(())
        })
    }

    fn ri_write_more(
        &mut self,
        _md: ArticleMd,
        rie: RiElement,
    ) -> BoxFut<'_, NsResult<()>> {
        Box::pin(async move {
            codec::mdb_push_line(&mut self.buf, &rie);
            Ok(())
        })
    }

    fn ri_commit(self: Box<Self>) -> BoxFut<'static, NsResult<()>> {
        Box::pin(async move {
            let this = *self;
            put(&this.dbs.mdb, &this.msgid, &this.buf)
        })
    }
}

impl ReverseIndex for LdbReverseIndex {
    fn ri_begin(
        &self,
        msgid: MessageId,
    ) -> BoxFut<'_, NsResult<Box<dyn RiWriter>>> {
        Box::pin(async move {
            let out: Box<dyn RiWriter> = Box::new(LdbRiWriter {
                dbs: self.dbs.clone(),
                msgid,
                buf: Vec::new(),
            });
            Ok(out)
        })
    }

    fn ri_lookup(&self, msgid: MessageId) -> BoxFut<'_, NsResult<RiElement>> {
        Box::pin(async move {
            let blob = get(&self.dbs.mdb, &msgid)?.ok_or(NsError::NoEntry)?;
            codec::mdb_lines(&blob).next().ok_or(NsError::NoEntry)
        })
    }

    fn ri_lookup_all(
        &self,
        msgid: MessageId,
    ) -> BoxFut<'_, NsResult<Box<dyn RiCursor>>> {
        Box::pin(async move {
            let blob = get(&self.dbs.mdb, &msgid)?.ok_or(NsError::NoEntry)?;
            let out: Box<dyn RiCursor> = Box::new(SnapshotRiCursor::new(
                codec::mdb_lines(&blob).collect(),
            ));
            Ok(out)
        })
    }

    fn ri_query_expired(
        &self,
        now: Timestamp,
    ) -> BoxFut<'_, NsResult<Box<dyn RiExpiryCursor>>> {
        Box::pin(async move {
            let end = codec::expiry_scan_end(now);
            let r = self.dbs.tdb.begin_read().map_err(store_err)?;
            let t = r.open_table(RI_TABLE).map_err(store_err)?;
            let mut msgids = Vec::new();
            for entry in t.range(..end.as_slice()).map_err(store_err)? {
                let (_, v) = entry.map_err(store_err)?;
                msgids.push(MessageId::from(bytes::Bytes::copy_from_slice(
                    v.value(),
                )));
            }
            // iterate in reverse so every msgid terminator follows its
            // group entries in a consistent walk order
            msgids.reverse();
            let mut items = Vec::with_capacity(msgids.len());
            for mid in msgids {
                let blob = get(&self.dbs.mdb, &mid)?;
                items.push((mid, blob));
            }
            let out: Box<dyn RiExpiryCursor> =
                Box::new(SnapshotRiExpiryCursor::new(items));
            Ok(out)
        })
    }

    fn ri_expire(&self, msgid: MessageId) -> BoxFut<'_, NsResult<()>> {
        Box::pin(async move {
            remove(&self.dbs.mdb, &msgid)?;
            if let Some(key) = get(&self.dbs.rdb, &msgid)? {
                remove(&self.dbs.tdb, &key)?;
                remove(&self.dbs.rdb, &msgid)?;
            }
            Ok(())
        })
    }
}
