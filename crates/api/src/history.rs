//! Newsspool history store types.
//!
//! The history store is the pure map from message-id to storage token,
//! after INN's HIS database.

use crate::{builder, config, ArticleMd, BoxFut, MessageId, NsResult, Token};
use std::sync::Arc;

/// The API of a history store backend.
pub trait HistoryStore: 'static + Send + Sync + std::fmt::Debug {
    /// Record the token an article was stored under.
    fn his_write(
        &self,
        msgid: MessageId,
        md: ArticleMd,
        token: Token,
    ) -> BoxFut<'_, NsResult<()>>;

    /// Look an article's token up by message-id.
    ///
    /// Fails [crate::NsError::NoEntry] when the id is unknown and
    /// [crate::NsError::TokenMismatch] when the stored blob is not a
    /// token.
    fn his_lookup(&self, msgid: MessageId) -> BoxFut<'_, NsResult<Token>>;

    /// Forget an article.
    fn his_cancel(&self, msgid: MessageId) -> BoxFut<'_, NsResult<()>>;
}

/// Trait-object version of newsspool [HistoryStore].
pub type DynHistoryStore = Arc<dyn HistoryStore>;

/// A factory for constructing [HistoryStore] instances.
pub trait HistoryStoreFactory: 'static + Send + Sync + std::fmt::Debug {
    /// Help the builder construct a default config from the chosen
    /// module factories.
    fn default_config(&self, config: &mut config::Config) -> NsResult<()>;

    /// Construct a history store instance.
    fn create(
        &self,
        builder: Arc<builder::Builder>,
    ) -> BoxFut<'static, NsResult<DynHistoryStore>>;
}

/// Trait-object [HistoryStoreFactory].
pub type DynHistoryStoreFactory = Arc<dyn HistoryStoreFactory>;
