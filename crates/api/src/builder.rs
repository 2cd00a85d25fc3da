//! Builder-related types.

use crate::*;
use std::collections::HashMap;
use std::sync::Arc;

/// The general newsspool builder.
///
/// This contains both configuration and the name-keyed factory
/// registries, allowing construction of runtime module instances. The
/// registries are populated explicitly, before any configuration is
/// applied; nothing registers itself through load order.
#[derive(Default)]
pub struct Builder {
    /// The module configuration to be used when building modules.
    /// This can be loaded from disk or modified before freezing the
    /// builder.
    pub config: config::Config,

    /// Storage methods by registry name, e.g. "timehash".
    pub storage_methods: HashMap<String, DynStorageMethodFactory>,

    /// Overview store backends by registry name, e.g. "ovldb".
    pub overview_methods: HashMap<String, DynOverviewStoreFactory>,

    /// History store backends by registry name, e.g. "hisldb".
    pub history_methods: HashMap<String, DynHistoryStoreFactory>,

    /// Reverse index backends by registry name, e.g. "rildb".
    pub ri_methods: HashMap<String, DynReverseIndexFactory>,

    /// Group catalog backends by registry name, e.g. "tradgroup".
    pub group_methods: HashMap<String, DynGroupCatalogFactory>,
}

impl std::fmt::Debug for Builder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> =
            self.storage_methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Builder")
            .field("storage_methods", &names)
            .finish()
    }
}

impl Builder {
    /// Register a storage method factory under a name.
    pub fn register_storage_method(
        &mut self,
        name: impl Into<String>,
        f: DynStorageMethodFactory,
    ) {
        self.storage_methods.insert(name.into(), f);
    }

    /// Register an overview store factory under a name.
    pub fn register_overview_method(
        &mut self,
        name: impl Into<String>,
        f: DynOverviewStoreFactory,
    ) {
        self.overview_methods.insert(name.into(), f);
    }

    /// Register a history store factory under a name.
    pub fn register_history_method(
        &mut self,
        name: impl Into<String>,
        f: DynHistoryStoreFactory,
    ) {
        self.history_methods.insert(name.into(), f);
    }

    /// Register a reverse index factory under a name.
    pub fn register_ri_method(
        &mut self,
        name: impl Into<String>,
        f: DynReverseIndexFactory,
    ) {
        self.ri_methods.insert(name.into(), f);
    }

    /// Register a group catalog factory under a name.
    pub fn register_group_method(
        &mut self,
        name: impl Into<String>,
        f: DynGroupCatalogFactory,
    ) {
        self.group_methods.insert(name.into(), f);
    }

    /// Look a storage method factory up by registry name.
    pub fn storage_method(
        &self,
        name: &str,
    ) -> NsResult<&DynStorageMethodFactory> {
        self.storage_methods
            .get(name)
            .ok_or_else(|| NsError::other(format!("unknown method {name:?}")))
    }

    /// Look an overview store factory up by registry name.
    pub fn overview_method(
        &self,
        name: &str,
    ) -> NsResult<&DynOverviewStoreFactory> {
        self.overview_methods.get(name).ok_or_else(|| {
            NsError::other(format!("unknown overview-method {name:?}"))
        })
    }

    /// Look a history store factory up by registry name.
    pub fn history_method(
        &self,
        name: &str,
    ) -> NsResult<&DynHistoryStoreFactory> {
        self.history_methods.get(name).ok_or_else(|| {
            NsError::other(format!("unknown his-method {name:?}"))
        })
    }

    /// Look a reverse index factory up by registry name.
    pub fn ri_method(&self, name: &str) -> NsResult<&DynReverseIndexFactory> {
        self.ri_methods.get(name).ok_or_else(|| {
            NsError::other(format!("unknown ri-method {name:?}"))
        })
    }

    /// Look a group catalog factory up by registry name.
    pub fn group_method(
        &self,
        name: &str,
    ) -> NsResult<&DynGroupCatalogFactory> {
        self.group_methods.get(name).ok_or_else(|| {
            NsError::other(format!("unknown group-method {name:?}"))
        })
    }

    /// Construct a default config given the registered module factories.
    /// Note, this should be called before freezing the Builder instance
    /// in an Arc<>.
    pub fn set_default_config(&mut self) -> NsResult<()> {
        let Self {
            config,
            storage_methods,
            overview_methods,
            history_methods,
            ri_methods,
            group_methods,
        } = self;

        config.add_default_module_config::<config::SpoolConfig>(
            config::SpoolConfig::MODULE.into(),
        )?;
        config.add_default_module_config::<config::StorageClassesConfig>(
            config::StorageClassesConfig::MODULE.into(),
        )?;

        for f in storage_methods.values() {
            f.default_config(config)?;
        }
        for f in overview_methods.values() {
            f.default_config(config)?;
        }
        for f in history_methods.values() {
            f.default_config(config)?;
        }
        for f in ri_methods.values() {
            f.default_config(config)?;
        }
        for f in group_methods.values() {
            f.default_config(config)?;
        }

        Ok(())
    }

    /// Freeze the builder for use by module factories.
    pub fn build(self) -> Arc<Self> {
        Arc::new(self)
    }
}
