//! The mem article store: a storage method for tests and diskless
//! classes.

use newsspool_api::builder::Builder;
use newsspool_api::config::Config;
use newsspool_api::*;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

#[cfg(test)]
mod test;

/// The mem article store implementation provided by newsspool.
#[derive(Debug)]
pub struct MemArticleStoreFactory {}

impl MemArticleStoreFactory {
    /// Construct a new MemArticleStoreFactory.
    pub fn create() -> DynStorageMethodFactory {
        let out: DynStorageMethodFactory = Arc::new(MemArticleStoreFactory {});
        out
    }
}

impl StorageMethodFactory for MemArticleStoreFactory {
    fn default_config(&self, _config: &mut Config) -> NsResult<()> {
        Ok(())
    }

    fn create(
        &self,
        _builder: Arc<Builder>,
        class: u8,
    ) -> BoxFut<'static, NsResult<DynStorageMethod>> {
        Box::pin(async move {
            let out: DynStorageMethod =
                Arc::new(MemArticleStore::new(class));
            Ok(out)
        })
    }
}

#[derive(Debug)]
pub(crate) struct MemArticleStore {
    class: u8,
    serial: AtomicU64,
    inner: RwLock<HashMap<u64, Bytes>>,
}

impl MemArticleStore {
    pub(crate) fn new(class: u8) -> Self {
        Self {
            class,
            serial: AtomicU64::new(0),
            inner: RwLock::new(HashMap::new()),
        }
    }

    fn serial_of(token: &Token) -> u64 {
        u64::from_be_bytes(token.payload()[..8].try_into().unwrap())
    }
}

impl StorageMethod for MemArticleStore {
    fn store(
        &self,
        _md: ArticleMd,
        article: Bytes,
    ) -> BoxFut<'_, NsResult<Token>> {
        Box::pin(async move {
            let serial = self.serial.fetch_add(1, Ordering::Relaxed) + 1;
            let mut token = Token::zeroed();
            token.set_class(self.class);
            token.payload_mut()[..8].copy_from_slice(&serial.to_be_bytes());
            self.inner.write().await.insert(serial, article);
            Ok(token)
        })
    }

    fn retrieve(
        &self,
        token: Token,
        level: RetrieveLevel,
    ) -> BoxFut<'_, NsResult<RetrievedArticle>> {
        Box::pin(async move {
            let inner = self.inner.read().await;
            let data = inner
                .get(&Self::serial_of(&token))
                .ok_or(NsError::NoEntry)?;
            if level == RetrieveLevel::Stat {
                return Ok(RetrievedArticle {
                    level: RetrieveLevel::Stat,
                    data: Bytes::new(),
                });
            }
            Ok(RetrievedArticle {
                level: RetrieveLevel::All,
                data: data.clone(),
            })
        })
    }

    fn cancel(&self, token: Token) -> BoxFut<'_, NsResult<()>> {
        Box::pin(async move {
            self.inner
                .write()
                .await
                .remove(&Self::serial_of(&token))
                .ok_or(NsError::NoEntry)?;
            Ok(())
        })
    }
}
