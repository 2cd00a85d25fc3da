//! Newsspool group catalog types.
//!
//! The group catalog is the read-only source of known groups and their
//! status or description, traditionally backed by the flat `active` and
//! `newsgroups` files.

use crate::{builder, config, BoxFut, GroupElement, NsResult};
use std::sync::Arc;

/// A cursor over catalog entries. Malformed lines are skipped.
pub trait GroupCursor: 'static + Send {
    /// Produce the next group, or None.
    fn next(&mut self) -> BoxFut<'_, NsResult<Option<GroupElement>>>;
}

/// The API of a group catalog backend.
pub trait GroupCatalog: 'static + Send + Sync + std::fmt::Debug {
    /// List the known groups with their status (`status`) or their
    /// description (`descr`).
    ///
    /// Requesting both in one pass is unsupported; callers pick one.
    fn fetch_groups(
        &self,
        status: bool,
        descr: bool,
    ) -> BoxFut<'_, NsResult<Box<dyn GroupCursor>>>;
}

/// Trait-object version of newsspool [GroupCatalog].
pub type DynGroupCatalog = Arc<dyn GroupCatalog>;

/// A factory for constructing [GroupCatalog] instances.
pub trait GroupCatalogFactory: 'static + Send + Sync + std::fmt::Debug {
    /// Help the builder construct a default config from the chosen
    /// module factories.
    fn default_config(&self, config: &mut config::Config) -> NsResult<()>;

    /// Construct a group catalog instance.
    fn create(
        &self,
        builder: Arc<builder::Builder>,
    ) -> BoxFut<'static, NsResult<DynGroupCatalog>>;
}

/// Trait-object [GroupCatalogFactory].
pub type DynGroupCatalogFactory = Arc<dyn GroupCatalogFactory>;
