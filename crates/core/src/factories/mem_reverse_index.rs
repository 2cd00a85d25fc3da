//! The mem reverse index implementation provided by newsspool.

use crate::codec;
use crate::factories::{SnapshotRiCursor, SnapshotRiExpiryCursor};
use newsspool_api::builder::Builder;
use newsspool_api::config::Config;
use newsspool_api::*;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;


/// The mem reverse index implementation provided by newsspool.
///
/// Three coordinated maps, after the durable triad: the record map
/// (msgid → group/number lines), the expiry queue (expiry-key → msgid),
/// and the back-reference (msgid → expiry-key) used for targeted
/// removal.
#[derive(Debug)]
pub struct MemReverseIndexFactory {}

impl MemReverseIndexFactory {
    /// Construct a new MemReverseIndexFactory.
    pub fn create() -> DynReverseIndexFactory {
        let out: DynReverseIndexFactory = Arc::new(MemReverseIndexFactory {});
        out
    }
}

impl ReverseIndexFactory for MemReverseIndexFactory {
    fn default_config(&self, _config: &mut Config) -> NsResult<()> {
        Ok(())
    }

    fn create(
        &self,
        _builder: Arc<Builder>,
    ) -> BoxFut<'static, NsResult<DynReverseIndex>> {
        Box::pin(async move {
            let out: DynReverseIndex = Arc::new(MemReverseIndex::default());
            Ok(out)
        })
    }
}

#[derive(Debug, Default)]
struct Inner {
    mdb: HashMap<MessageId, Vec<u8>>,
    tdb: BTreeMap<Vec<u8>, MessageId>,
    rdb: HashMap<MessageId, Vec<u8>>,
}

#[derive(Debug, Default)]
pub(crate) struct MemReverseIndex {
    inner: Arc<RwLock<Inner>>,
}

struct MemRiWriter {
    inner: Arc<RwLock<Inner>>,
    msgid: MessageId,
    buf: Vec<u8>,
}

impl RiWriter for MemRiWriter {
    fn ri_write(
        &mut self,
        md: ArticleMd,
        rie: RiElement,
    ) -> BoxFut<'_, NsResult<()>> {
        Box::pin(async move {
            if let Some(expires) = md.expires {
                let key = codec::expiry_key(expires, &self.msgid);
                let mut inner = self.inner.write().await;
                inner.tdb.insert(key.clone(), self.msgid.clone());
                inner.rdb.insert(self.msgid.clone(), key);
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
            this.inner.write().await.mdb.insert(this.msgid, this.buf);
            Ok(())
        })
    }
}

impl ReverseIndex for MemReverseIndex {
    fn ri_begin(
        &self,
        msgid: MessageId,
    ) -> BoxFut<'_, NsResult<Box<dyn RiWriter>>> {
        Box::pin(async move {
            let out: Box<dyn RiWriter> = Box::new(MemRiWriter {
                inner: self.inner.clone(),
                msgid,
                buf: Vec::new(),
            });
            Ok(out)
        })
    }

    fn ri_lookup(&self, msgid: MessageId) -> BoxFut<'_, NsResult<RiElement>> {
        Box::pin(async move {
            let inner = self.inner.read().await;
            let blob = inner.mdb.get(&msgid).ok_or(NsError::NoEntry)?;
            codec::mdb_lines(blob).next().ok_or(NsError::NoEntry)
        })
    }

    fn ri_lookup_all(
        &self,
        msgid: MessageId,
    ) -> BoxFut<'_, NsResult<Box<dyn RiCursor>>> {
        Box::pin(async move {
            let inner = self.inner.read().await;
            let blob = inner.mdb.get(&msgid).ok_or(NsError::NoEntry)?;
            let out: Box<dyn RiCursor> = Box::new(SnapshotRiCursor::new(
                codec::mdb_lines(blob).collect(),
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
            let inner = self.inner.read().await;
            let mut items: Vec<(MessageId, Option<Vec<u8>>)> = inner
                .tdb
                .range::<Vec<u8>, _>(..end)
                .map(|(_, mid)| (mid.clone(), inner.mdb.get(mid).cloned()))
                .collect();
            // iterate in reverse so every msgid terminator follows its
            // group entries in a consistent walk order
            items.reverse();
            let out: Box<dyn RiExpiryCursor> =
                Box::new(SnapshotRiExpiryCursor::new(items));
            Ok(out)
        })
    }

    fn ri_expire(&self, msgid: MessageId) -> BoxFut<'_, NsResult<()>> {
        Box::pin(async move {
            let mut inner = self.inner.write().await;
            inner.mdb.remove(&msgid);
            if let Some(key) = inner.rdb.remove(&msgid) {
                inner.tdb.remove(&key);
            }
            Ok(())
        })
    }
}
