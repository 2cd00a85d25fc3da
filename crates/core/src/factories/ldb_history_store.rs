//! The durable history store implementation provided by newsspool.
//!
//! The msgid → token map lives in one [redb] database under
//! `<spool>/hisldb/`.

use crate::factories::store_err;
use newsspool_api::builder::Builder;
use newsspool_api::config::{Config, SpoolConfig};
use newsspool_api::*;
use redb::{Database, TableDefinition};
use std::path::Path;
use std::sync::Arc;

#[cfg(test)]
mod test;

const HIS_TABLE: TableDefinition<&[u8], &[u8]> =
    TableDefinition::new("history");

/// The durable history store implementation provided by newsspool.
#[derive(Debug)]
pub struct LdbHistoryStoreFactory {}

impl LdbHistoryStoreFactory {
    /// Construct a new LdbHistoryStoreFactory.
    pub fn create() -> DynHistoryStoreFactory {
        let out: DynHistoryStoreFactory = Arc::new(LdbHistoryStoreFactory {});
        out
    }
}

impl HistoryStoreFactory for LdbHistoryStoreFactory {
    fn default_config(&self, _config: &mut Config) -> NsResult<()> {
        Ok(())
    }

    fn create(
        &self,
        builder: Arc<Builder>,
    ) -> BoxFut<'static, NsResult<DynHistoryStore>> {
        Box::pin(async move {
            let spool: SpoolConfig =
                builder.config.get_module_config(SpoolConfig::MODULE)?;
            let store = LdbHistoryStore::open(
                &Path::new(&spool.spool).join("hisldb"),
            )?;
            let out: DynHistoryStore = Arc::new(store);
            Ok(out)
        })
    }
}

#[derive(Debug)]
pub(crate) struct LdbHistoryStore {
    db: Database,
}

impl LdbHistoryStore {
    pub(crate) fn open(dir: &Path) -> NsResult<Self> {
        std::fs::create_dir_all(dir)?;
        let db = Database::create(dir.join("his.redb")).map_err(store_err)?;
        let w = db.begin_write().map_err(store_err)?;
        w.open_table(HIS_TABLE).map_err(store_err)?;
        w.commit().map_err(store_err)?;
        Ok(Self { db })
    }
}

impl HistoryStore for LdbHistoryStore {
    fn his_write(
        &self,
        msgid: MessageId,
        _md: ArticleMd,
        token: Token,
    ) -> BoxFut<'_, NsResult<()>> {
        Box::pin(async move {
            let w = self.db.begin_write().map_err(store_err)?;
            {
                let mut t = w.open_table(HIS_TABLE).map_err(store_err)?;
                t.insert(&msgid[..], token.as_bytes()).map_err(store_err)?;
            }
            w.commit().map_err(store_err)
        })
    }

    fn his_lookup(&self, msgid: MessageId) -> BoxFut<'_, NsResult<Token>> {
        Box::pin(async move {
            let r = self.db.begin_read().map_err(store_err)?;
            let t = r.open_table(HIS_TABLE).map_err(store_err)?;
            let rec = t
                .get(&msgid[..])
                .map_err(store_err)?
                .ok_or(NsError::NoEntry)?;
            Token::from_bytes(rec.value())
        })
    }

    fn his_cancel(&self, msgid: MessageId) -> BoxFut<'_, NsResult<()>> {
        Box::pin(async move {
            let w = self.db.begin_write().map_err(store_err)?;
            {
                let mut t = w.open_table(HIS_TABLE).map_err(store_err)?;
                t.remove(&msgid[..]).map_err(store_err)?;
            }
            w.commit().map_err(store_err)
        })
    }
}
