//! Newsspool reverse index types.
//!
//! The reverse index maps message-ids to every (group, number) pair the
//! article was filed under, and keeps the time-ordered expiry queue that
//! drives batch expiration.

use crate::{
    builder, config, ArticleMd, BoxFut, MessageId, NsResult, RiElement,
    RiHistory, Timestamp,
};
use std::sync::Arc;

/// The write half of one logical reverse-index record.
///
/// Obtained from [ReverseIndex::ri_begin]; fed one [RiElement] per group;
/// sealed with [RiWriter::ri_commit], the boundary of the logical write.
/// An implementation may defer the record store until commit.
pub trait RiWriter: 'static + Send {
    /// Record the first (group, number) pair of the article.
    ///
    /// When `md.expires` is set, this also queues the article on the
    /// expiry index.
    fn ri_write(
        &mut self,
        md: ArticleMd,
        rie: RiElement,
    ) -> BoxFut<'_, NsResult<()>>;

    /// Record a further (group, number) pair of the article.
    fn ri_write_more(
        &mut self,
        md: ArticleMd,
        rie: RiElement,
    ) -> BoxFut<'_, NsResult<()>>;

    /// Seal the record.
    fn ri_commit(self: Box<Self>) -> BoxFut<'static, NsResult<()>>;
}

/// A cursor over the (group, number) pairs of one article, in insertion
/// order.
pub trait RiCursor: 'static + Send {
    /// Produce the next pair, or None.
    fn next(&mut self) -> BoxFut<'_, NsResult<Option<RiElement>>>;
}

/// A cursor over expired articles.
///
/// For each expired article this yields every [RiHistory::Group] element,
/// then exactly one [RiHistory::Article] terminator.
pub trait RiExpiryCursor: 'static + Send {
    /// Produce the next expiry step, or None.
    fn next(&mut self) -> BoxFut<'_, NsResult<Option<RiHistory>>>;
}

/// The API of a reverse index backend.
pub trait ReverseIndex: 'static + Send + Sync + std::fmt::Debug {
    /// Open the logical write of one article's record.
    fn ri_begin(
        &self,
        msgid: MessageId,
    ) -> BoxFut<'_, NsResult<Box<dyn RiWriter>>>;

    /// Look up the first (group, number) pair of an article.
    fn ri_lookup(&self, msgid: MessageId) -> BoxFut<'_, NsResult<RiElement>>;

    /// Look up every (group, number) pair of an article.
    fn ri_lookup_all(
        &self,
        msgid: MessageId,
    ) -> BoxFut<'_, NsResult<Box<dyn RiCursor>>>;

    /// Walk every article whose expiry time is before `now`.
    fn ri_query_expired(
        &self,
        now: Timestamp,
    ) -> BoxFut<'_, NsResult<Box<dyn RiExpiryCursor>>>;

    /// Drop an article's record and its expiry-queue entries.
    fn ri_expire(&self, msgid: MessageId) -> BoxFut<'_, NsResult<()>>;
}

/// Trait-object version of newsspool [ReverseIndex].
pub type DynReverseIndex = Arc<dyn ReverseIndex>;

/// A factory for constructing [ReverseIndex] instances.
pub trait ReverseIndexFactory: 'static + Send + Sync + std::fmt::Debug {
    /// Help the builder construct a default config from the chosen
    /// module factories.
    fn default_config(&self, config: &mut config::Config) -> NsResult<()>;

    /// Construct a reverse index instance.
    fn create(
        &self,
        builder: Arc<builder::Builder>,
    ) -> BoxFut<'static, NsResult<DynReverseIndex>>;
}

/// Trait-object [ReverseIndexFactory].
pub type DynReverseIndexFactory = Arc<dyn ReverseIndexFactory>;
