//! The mem history store implementation provided by newsspool.

use newsspool_api::builder::Builder;
use newsspool_api::config::Config;
use newsspool_api::*;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[cfg(test)]
mod test;

/// The mem history store implementation provided by newsspool.
#[derive(Debug)]
pub struct MemHistoryStoreFactory {}

impl MemHistoryStoreFactory {
    /// Construct a new MemHistoryStoreFactory.
    pub fn create() -> DynHistoryStoreFactory {
        let out: DynHistoryStoreFactory = Arc::new(MemHistoryStoreFactory {});
        out
    }
}

impl HistoryStoreFactory for MemHistoryStoreFactory {
    fn default_config(&self, _config: &mut Config) -> NsResult<()> {
        Ok(())
    }

    fn create(
        &self,
        _builder: Arc<Builder>,
    ) -> BoxFut<'static, NsResult<DynHistoryStore>> {
        Box::pin(async move {
            let out: DynHistoryStore = Arc::new(MemHistoryStore::default());
            Ok(out)
        })
    }
}

#[derive(Debug, Default)]
pub(crate) struct MemHistoryStore {
    inner: RwLock<HashMap<MessageId, Vec<u8>>>,
}

impl HistoryStore for MemHistoryStore {
    fn his_write(
        &self,
        msgid: MessageId,
        _md: ArticleMd,
        token: Token,
    ) -> BoxFut<'_, NsResult<()>> {
        Box::pin(async move {
            self.inner
                .write()
                .await
                .insert(msgid, token.as_bytes().to_vec());
            Ok(())
        })
    }

    fn his_lookup(&self, msgid: MessageId) -> BoxFut<'_, NsResult<Token>> {
        Box::pin(async move {
            let inner = self.inner.read().await;
            let rec = inner.get(&msgid).ok_or(NsError::NoEntry)?;
            Token::from_bytes(rec)
        })
    }

    fn his_cancel(&self, msgid: MessageId) -> BoxFut<'_, NsResult<()>> {
        Box::pin(async move {
            self.inner.write().await.remove(&msgid);
            Ok(())
        })
    }
}
