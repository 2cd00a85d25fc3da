//! The assembled storage engine.

use crate::expirer::Expirer;
use crate::headers::DynStamper;
use crate::poster::Poster;
use crate::storage_manager::StorageManager;
use newsspool_api::builder::Builder;
use newsspool_api::config::SpoolConfig;
use newsspool_api::*;
use std::sync::Arc;


/// The composite storage engine: the five coordinated substores, opened
/// from a [Builder] by the backend names its configuration picks.
#[derive(Debug)]
pub struct Spool {
    storage: Arc<StorageManager>,
    overview: DynOverviewStore,
    history: DynHistoryStore,
    reverse_index: DynReverseIndex,
    catalog: DynGroupCatalog,
    default_expiry: Option<std::time::Duration>,
}

impl Spool {
    /// Resolve every configured backend through the builder's
    /// registries and open the engine.
    pub async fn open(builder: Builder) -> NsResult<Spool> {
        let builder = builder.build();
        let cfg: SpoolConfig =
            builder.config.get_module_config(SpoolConfig::MODULE)?;
        let overview = builder
            .overview_method(&cfg.ov_method)?
            .create(builder.clone())
            .await?;
        let history = builder
            .history_method(&cfg.his_method)?
            .create(builder.clone())
            .await?;
        let reverse_index = builder
            .ri_method(&cfg.ri_method)?
            .create(builder.clone())
            .await?;
        let catalog = builder
            .group_method(&cfg.group_method)?
            .create(builder.clone())
            .await?;
        let storage = Arc::new(StorageManager::open(&builder).await?);
        tracing::debug!(
            ov = %cfg.ov_method,
            his = %cfg.his_method,
            ri = %cfg.ri_method,
            groups = %cfg.group_method,
            "spool open"
        );
        Ok(Spool {
            storage,
            overview,
            history,
            reverse_index,
            catalog,
            default_expiry: cfg.default_expiry(),
        })
    }

    /// The storage manager.
    pub fn storage(&self) -> &Arc<StorageManager> {
        &self.storage
    }

    /// The overview store.
    pub fn overview(&self) -> &DynOverviewStore {
        &self.overview
    }

    /// The history store.
    pub fn history(&self) -> &DynHistoryStore {
        &self.history
    }

    /// The reverse index.
    pub fn reverse_index(&self) -> &DynReverseIndex {
        &self.reverse_index
    }

    /// The group catalog.
    pub fn catalog(&self) -> &DynGroupCatalog {
        &self.catalog
    }

    /// A posting coordinator over this engine.
    pub fn poster(&self) -> Poster {
        Poster::new(
            self.storage.clone(),
            self.overview.clone(),
            self.history.clone(),
            self.reverse_index.clone(),
            self.default_expiry,
        )
    }

    /// A posting coordinator with a header stamper.
    pub fn poster_with_stamper(&self, stamper: DynStamper) -> Poster {
        self.poster().with_stamper(stamper)
    }

    /// An expirer over this engine.
    pub fn expirer(&self) -> Expirer {
        Expirer::new(
            self.storage.clone(),
            self.overview.clone(),
            self.history.clone(),
            Some(self.reverse_index.clone()),
        )
    }
}
