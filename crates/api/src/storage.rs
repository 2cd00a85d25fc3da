//! Newsspool storage method types.
//!
//! A storage method is one pluggable article store, bound to one or more
//! of the 256 storage classes. The reference method is the time-hashed
//! spool provided by the core crate.

use crate::{builder, config, ArticleMd, BoxFut, NsResult, Token};
use bytes::Bytes;
use std::sync::Arc;

/// How much of an article a retrieval must produce.
///
/// Levels are ordered; a method may achieve a higher level than the one
/// requested (a file-based method cannot produce a bare head cheaply and
/// answers with the whole article instead). The caller must respect the
/// achieved level and split head from body itself if needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RetrieveLevel {
    /// Existence check only. No data.
    Stat,

    /// The header block.
    Head,

    /// The whole article.
    All,
}

/// The outcome of a retrieval: the achieved level and the data that level
/// implies. Empty at [RetrieveLevel::Stat].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievedArticle {
    /// The level the method actually achieved.
    pub level: RetrieveLevel,

    /// The article bytes the achieved level implies.
    pub data: Bytes,
}

/// One pluggable article store.
pub trait StorageMethod: 'static + Send + Sync + std::fmt::Debug {
    /// Store an article, minting a token for it.
    ///
    /// The minted token's payload identifies the article within this
    /// method; its class byte is left zero and stamped by the storage
    /// manager.
    fn store(
        &self,
        md: ArticleMd,
        article: Bytes,
    ) -> BoxFut<'_, NsResult<Token>>;

    /// Retrieve an article at the given level or above.
    fn retrieve(
        &self,
        token: Token,
        level: RetrieveLevel,
    ) -> BoxFut<'_, NsResult<RetrievedArticle>>;

    /// Remove an article.
    fn cancel(&self, token: Token) -> BoxFut<'_, NsResult<()>>;
}

/// Trait-object version of newsspool [StorageMethod].
pub type DynStorageMethod = Arc<dyn StorageMethod>;

/// A factory for constructing [StorageMethod] instances.
pub trait StorageMethodFactory: 'static + Send + Sync + std::fmt::Debug {
    /// Help the builder construct a default config from the chosen
    /// module factories.
    fn default_config(&self, config: &mut config::Config) -> NsResult<()>;

    /// Construct a storage method instance bound to one storage class.
    fn create(
        &self,
        builder: Arc<builder::Builder>,
        class: u8,
    ) -> BoxFut<'static, NsResult<DynStorageMethod>>;
}

/// Trait-object [StorageMethodFactory].
pub type DynStorageMethodFactory = Arc<dyn StorageMethodFactory>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn levels_are_ordered() {
        assert!(RetrieveLevel::Stat < RetrieveLevel::Head);
        assert!(RetrieveLevel::Head < RetrieveLevel::All);
    }
}
