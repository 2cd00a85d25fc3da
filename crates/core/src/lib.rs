#![deny(missing_docs)]
//! Reference implementations of the [newsspool API](newsspool_api).

use newsspool_api::builder::Builder;
use newsspool_api::config::{
    SpoolConfig, StorageClassConfig, StorageClassesConfig,
};

pub mod codec;
pub mod decompress;
pub mod expirer;
pub mod factories;
pub mod framing;
pub mod headers;
pub mod poster;
pub mod spool;
pub mod storage_manager;
pub mod wildmat;

mod stripe;

pub use spool::Spool;

/// Construct a builder with every factory this crate provides
/// registered under its canonical name.
///
/// - storage methods: `timehash` ([factories::TimehashStoreFactory]),
///   `mem` ([factories::MemArticleStoreFactory]).
/// - overview stores: `ovldb` ([factories::LdbOverviewStoreFactory]),
///   `mem` ([factories::MemOverviewStoreFactory]).
/// - history stores: `hisldb` ([factories::LdbHistoryStoreFactory]),
///   `mem` ([factories::MemHistoryStoreFactory]).
/// - reverse indexes: `rildb` ([factories::LdbReverseIndexFactory]),
///   `mem` ([factories::MemReverseIndexFactory]).
/// - group catalogs: `tradgroup` ([factories::TradCatalogFactory]).
pub fn default_builder() -> Builder {
    let mut b = Builder::default();
    b.register_storage_method(
        "timehash",
        factories::TimehashStoreFactory::create(),
    );
    b.register_storage_method("mem", factories::MemArticleStoreFactory::create());
    b.register_overview_method(
        "ovldb",
        factories::LdbOverviewStoreFactory::create(),
    );
    b.register_overview_method(
        "mem",
        factories::MemOverviewStoreFactory::create(),
    );
    b.register_history_method(
        "hisldb",
        factories::LdbHistoryStoreFactory::create(),
    );
    b.register_history_method(
        "mem",
        factories::MemHistoryStoreFactory::create(),
    );
    b.register_ri_method("rildb", factories::LdbReverseIndexFactory::create());
    b.register_ri_method("mem", factories::MemReverseIndexFactory::create());
    b.register_group_method(
        "tradgroup",
        factories::TradCatalogFactory::create(),
    );
    b
}

/// Construct a default builder for use in tests: every backend is the
/// mem one and a single storage class 0 takes everything.
pub fn default_test_builder() -> Builder {
    let mut b = default_builder();
    b.config
        .set_module_config(
            SpoolConfig::MODULE.into(),
            &SpoolConfig {
                ov_method: "mem".into(),
                his_method: "mem".into(),
                ri_method: "mem".into(),
                ..Default::default()
            },
        )
        .expect("default spool config");
    b.config
        .set_module_config(
            StorageClassesConfig::MODULE.into(),
            &StorageClassesConfig {
                classes: vec![StorageClassConfig {
                    method: "mem".into(),
                    class: 0,
                    ..Default::default()
                }],
            },
        )
        .expect("default storage classes");
    b
}
