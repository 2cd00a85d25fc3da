//! Newsspool overview store types.
//!
//! The overview store is an ordered per-group stream of article metadata
//! with a per-group watermark sentinel. It answers point, range, and seek
//! queries by (group, number), and assigns article numbers at write time.

use crate::{
    builder, config, ArticleMd, BoxFut, GroupName, GroupStat, NsResult,
    OverviewElement, Token,
};
use std::sync::Arc;

/// A cursor over a range of overview entries.
///
/// Cursors are single-consumer; they own their underlying iterator and
/// release it on drop. Records that fail to decode are skipped silently.
pub trait OverviewCursor: 'static + Send {
    /// Produce the next entry, or None at the end of the range.
    fn next(
        &mut self,
    ) -> BoxFut<'_, NsResult<Option<(Token, OverviewElement)>>>;
}

/// The API of an overview store backend.
pub trait OverviewStore: 'static + Send + Sync + std::fmt::Debug {
    /// Point-get of one entry.
    fn fetch_one(
        &self,
        group: GroupName,
        num: i64,
    ) -> BoxFut<'_, NsResult<(Token, OverviewElement)>>;

    /// Range scan over `[first, last]` within one group.
    fn fetch_all(
        &self,
        group: GroupName,
        first: i64,
        last: i64,
    ) -> BoxFut<'_, NsResult<Box<dyn OverviewCursor>>>;

    /// Seek to the entry at `num`, or the nearest live neighbor.
    ///
    /// With `backward` the nearest predecessor is produced when `num` has
    /// no entry; otherwise the nearest successor strictly after `num`.
    /// Fails [crate::NsError::NoEntry] when the walk leaves the group.
    fn seek_one(
        &self,
        group: GroupName,
        num: i64,
        backward: bool,
    ) -> BoxFut<'_, NsResult<(Token, OverviewElement)>>;

    /// Read the group's watermark sentinel.
    fn group_stat(&self, group: GroupName) -> BoxFut<'_, NsResult<GroupStat>>;

    /// Write one overview entry, assigning its article number.
    ///
    /// With `autonum` the next number above the high watermark is
    /// assigned; otherwise `ove.num` is used and the high watermark is
    /// raised to cover it. The returned element carries the number
    /// actually assigned. The entry and the updated sentinel are written
    /// in one atomic batch.
    fn group_write_ov(
        &self,
        group: GroupName,
        autonum: bool,
        md: ArticleMd,
        token: Token,
        ove: OverviewElement,
    ) -> BoxFut<'_, NsResult<OverviewElement>>;

    /// Idempotently initialize the group sentinel to `(0, 1, 0)`.
    fn init_group(&self, group: GroupName) -> BoxFut<'_, NsResult<()>>;

    /// Remove one entry. Used by the expirer.
    ///
    /// This is the only operation that moves the low watermark: when the
    /// removed number sits on it, the watermark advances past it.
    fn cancel_ov(
        &self,
        group: GroupName,
        num: i64,
    ) -> BoxFut<'_, NsResult<()>>;
}

/// Trait-object version of newsspool [OverviewStore].
pub type DynOverviewStore = Arc<dyn OverviewStore>;

/// A factory for constructing [OverviewStore] instances.
pub trait OverviewStoreFactory: 'static + Send + Sync + std::fmt::Debug {
    /// Help the builder construct a default config from the chosen
    /// module factories.
    fn default_config(&self, config: &mut config::Config) -> NsResult<()>;

    /// Construct an overview store instance.
    fn create(
        &self,
        builder: Arc<builder::Builder>,
    ) -> BoxFut<'static, NsResult<DynOverviewStore>>;
}

/// Trait-object [OverviewStoreFactory].
pub type DynOverviewStoreFactory = Arc<dyn OverviewStoreFactory>;
