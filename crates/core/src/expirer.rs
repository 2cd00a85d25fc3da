//! The expirer: tears articles down across every store, in the reverse
//! of the posting order.
//!
//! Overview rows go first, history last for the article itself, then the
//! storage object, then the reverse index. The reverse index is the
//! final canonical truth: as long as it still holds the article, a
//! partial failure upstream is retried by a future expiry scan.

use crate::storage_manager::StorageManager;
use newsspool_api::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[cfg(test)]
mod test;

/// The expirer over the assembled stores.
#[derive(Debug)]
pub struct Expirer {
    storage: Arc<StorageManager>,
    overview: DynOverviewStore,
    history: DynHistoryStore,
    reverse_index: Option<DynReverseIndex>,
}

impl Expirer {
    /// Construct an expirer over the assembled stores.
    pub fn new(
        storage: Arc<StorageManager>,
        overview: DynOverviewStore,
        history: DynHistoryStore,
        reverse_index: Option<DynReverseIndex>,
    ) -> Self {
        Self {
            storage,
            overview,
            history,
            reverse_index,
        }
    }

    /// Tear one article down across every store.
    ///
    /// `token` may already carry the storage token recovered upstream;
    /// otherwise history is asked. Per-store errors are logged and
    /// skipped so a half-gone article keeps converging toward gone.
    async fn cancel_article(
        &self,
        message_id: &MessageId,
        mut token: Option<Token>,
    ) {
        if token.is_none() {
            token = self
                .history
                .his_lookup(message_id.clone())
                .await
                .ok();
        }
        if let Err(err) = self.history.his_cancel(message_id.clone()).await {
            tracing::warn!(?err, %message_id, "history cancel failed");
        }
        if let Some(token) = token {
            if let Err(err) = self.storage.cancel(token).await {
                tracing::warn!(?err, %message_id, "storage cancel failed");
            }
        }
        // the reverse index goes last: as long as it still holds the
        // article, any partial failure above is retried by a later scan
        if let Some(ri) = &self.reverse_index {
            if let Err(err) = ri.ri_expire(message_id.clone()).await {
                tracing::warn!(?err, %message_id, "reverse index expire failed");
            }
        }
    }

    /// Expire every article whose retention elapsed before `now`.
    ///
    /// Returns how many articles were torn down. When `shutdown` fires
    /// the loop stops between articles: the signal is observed only
    /// after the in-flight article is fully gone.
    pub async fn expire_process(
        &self,
        shutdown: &AtomicBool,
        now: Timestamp,
    ) -> NsResult<u64> {
        let ri =
            self.reverse_index.as_ref().ok_or(NsError::CouldNotQuery)?;
        let mut cur = ri.ri_query_expired(now).await?;
        let mut token: Option<Token> = None;
        let mut count = 0;
        loop {
            let step = match cur.next().await {
                Ok(step) => step,
                Err(err) => {
                    tracing::warn!(?err, "expiry cursor failed");
                    break;
                }
            };
            let Some(step) = step else { break };
            match step {
                RiHistory::Group { group, num } => {
                    if token.is_none() {
                        token = self
                            .overview
                            .fetch_one(group.clone(), num)
                            .await
                            .ok()
                            .map(|(tk, _)| tk);
                    }
                    if let Err(err) =
                        self.overview.cancel_ov(group.clone(), num).await
                    {
                        tracing::warn!(?err, %group, num, "overview cancel failed");
                    }
                }
                RiHistory::Article { message_id } => {
                    self.cancel_article(&message_id, token.take()).await;
                    count += 1;
                    if shutdown.load(Ordering::SeqCst) {
                        tracing::debug!(count, "expiry interrupted");
                        return Ok(count);
                    }
                }
            }
        }
        tracing::debug!(count, "expiry sweep done");
        Ok(count)
    }

    /// Cancel one article by message-id.
    pub async fn cancel_message_id(
        &self,
        message_id: MessageId,
    ) -> NsResult<()> {
        self.cancel_with(message_id, None).await
    }

    async fn cancel_with(
        &self,
        message_id: MessageId,
        mut token: Option<Token>,
    ) -> NsResult<()> {
        if let Some(ri) = &self.reverse_index {
            if let Ok(mut cur) = ri.ri_lookup_all(message_id.clone()).await {
                while let Some(rie) = cur.next().await? {
                    if token.is_none() {
                        token = self
                            .overview
                            .fetch_one(rie.group.clone(), rie.num)
                            .await
                            .ok()
                            .map(|(tk, _)| tk);
                    }
                    if let Err(err) = self
                        .overview
                        .cancel_ov(rie.group.clone(), rie.num)
                        .await
                    {
                        tracing::warn!(?err, group = %rie.group, num = rie.num, "overview cancel failed");
                    }
                }
            }
        }
        self.cancel_article(&message_id, token).await;
        Ok(())
    }

    /// Cancel one article by (group, number).
    pub async fn cancel_group_num(
        &self,
        group: GroupName,
        num: i64,
    ) -> NsResult<()> {
        let (token, ove) = self.overview.fetch_one(group, num).await?;
        let message_id = MessageId::from(ove.msg_id);
        self.cancel_with(message_id, Some(token)).await
    }
}
