//! The storage manager: class-dispatched article storage.
//!
//! 256 class slots, each optionally bound to one storage method plus the
//! policy that routes new posts into it. Retrieval dispatches on the
//! class byte a token carries.

use crate::wildmat::Wildmat;
use newsspool_api::builder::Builder;
use newsspool_api::config::{StorageClassConfig, StorageClassesConfig};
use newsspool_api::*;
use bytes::Bytes;
use std::sync::{Arc, OnceLock};

struct ClassSlot {
    method: DynStorageMethod,
    cfg: StorageClassConfig,
    wildmat: OnceLock<Wildmat>,
}

/// The class-dispatched article store.
pub struct StorageManager {
    classes: Vec<Option<ClassSlot>>,
}

impl std::fmt::Debug for StorageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bound: Vec<usize> = self
            .classes
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_ref().map(|_| i))
            .collect();
        f.debug_struct("StorageManager").field("bound", &bound).finish()
    }
}

impl StorageManager {
    /// Open every configured storage class through the builder's
    /// storage-method registry.
    pub async fn open(builder: &Arc<Builder>) -> NsResult<StorageManager> {
        let cfg: StorageClassesConfig = builder
            .config
            .get_module_config(StorageClassesConfig::MODULE)?;
        let mut classes: Vec<Option<ClassSlot>> =
            (0..256).map(|_| None).collect();
        for c in cfg.classes {
            let factory = builder.storage_method(&c.method)?;
            let method =
                factory.create(builder.clone(), c.class).await?;
            let class_idx = c.class;
            classes[class_idx as usize] = Some(ClassSlot {
                method,
                cfg: c,
                wildmat: OnceLock::new(),
            });
        }
        Ok(StorageManager { classes })
    }

    fn slot(&self, class: u8) -> NsResult<&ClassSlot> {
        self.classes[class as usize]
            .as_ref()
            .ok_or(NsError::NotInitialized(class))
    }

    /// Pick the first class whose policy accepts an article of `size`
    /// bytes posted to `groups`.
    pub fn choose_class(
        &self,
        groups: &[GroupName],
        size: i64,
    ) -> NsResult<u8> {
        for (i, slot) in self.classes.iter().enumerate() {
            let Some(slot) = slot else { continue };
            if size < slot.cfg.size {
                continue;
            }
            if slot.cfg.max_size > 0 && size > slot.cfg.max_size {
                continue;
            }
            if !slot.cfg.newsgroups.is_empty() {
                let wm = slot
                    .wildmat
                    .get_or_init(|| Wildmat::parse(&slot.cfg.newsgroups));
                let mut any = false;
                let mut all = true;
                for g in groups {
                    if wm.matches(g) {
                        any = true;
                    } else {
                        all = false;
                    }
                }
                if !any {
                    continue;
                }
                if slot.cfg.exact_match && !all {
                    continue;
                }
            }
            return Ok(i as u8);
        }
        Err(NsError::NoClass)
    }

    /// Store an article into a class, stamping the class byte on the
    /// minted token.
    pub async fn store(
        &self,
        class: u8,
        md: ArticleMd,
        article: Bytes,
    ) -> NsResult<Token> {
        let slot = self.slot(class)?;
        let mut token = slot.method.store(md, article).await?;
        token.set_class(class);
        Ok(token)
    }

    /// Retrieve an article, dispatching on the token's class byte.
    pub async fn retrieve(
        &self,
        token: Token,
        level: RetrieveLevel,
    ) -> NsResult<RetrievedArticle> {
        self.slot(token.class())?.method.retrieve(token, level).await
    }

    /// Remove an article, dispatching on the token's class byte.
    pub async fn cancel(&self, token: Token) -> NsResult<()> {
        self.slot(token.class())?.method.cancel(token).await
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::factories::MemArticleStoreFactory;
    use newsspool_api::config::SpoolConfig;
    use newsspool_test_utils::article::md_at;

    async fn manager(classes: Vec<StorageClassConfig>) -> StorageManager {
        let mut b = Builder::default();
        b.register_storage_method("mem", MemArticleStoreFactory::create());
        b.config
            .set_module_config(
                SpoolConfig::MODULE.into(),
                &SpoolConfig::default(),
            )
            .unwrap();
        b.config
            .set_module_config(
                StorageClassesConfig::MODULE.into(),
                &StorageClassesConfig { classes },
            )
            .unwrap();
        StorageManager::open(&b.build()).await.unwrap()
    }

    fn class(n: u8) -> StorageClassConfig {
        StorageClassConfig {
            method: "mem".into(),
            class: n,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn tokens_dispatch_to_their_class() {
        let sm = manager(vec![class(3), class(7)]).await;
        let md = md_at(0);
        let t3 = sm
            .store(3, md, Bytes::from_static(b"three"))
            .await
            .unwrap();
        let t7 = sm
            .store(7, md, Bytes::from_static(b"seven"))
            .await
            .unwrap();
        assert_eq!(3, t3.class());
        assert_eq!(7, t7.class());
        assert_eq!(
            &b"three"[..],
            &sm.retrieve(t3, RetrieveLevel::All).await.unwrap().data
        );
        assert_eq!(
            &b"seven"[..],
            &sm.retrieve(t7, RetrieveLevel::All).await.unwrap().data
        );
    }

    #[tokio::test]
    async fn unbound_class_is_not_initialized() {
        let sm = manager(vec![class(3)]).await;
        let mut tok = Token::zeroed();
        tok.set_class(9);
        assert!(matches!(
            sm.retrieve(tok, RetrieveLevel::All).await,
            Err(NsError::NotInitialized(9))
        ));
        assert!(matches!(
            sm.cancel(tok).await,
            Err(NsError::NotInitialized(9))
        ));
        assert!(matches!(
            sm.store(9, md_at(0), Bytes::new()).await,
            Err(NsError::NotInitialized(9))
        ));
    }

    #[tokio::test]
    async fn unknown_method_name_fails_open() {
        let mut b = Builder::default();
        b.config
            .set_module_config(
                StorageClassesConfig::MODULE.into(),
                &StorageClassesConfig {
                    classes: vec![StorageClassConfig {
                        method: "nope".into(),
                        class: 0,
                        ..Default::default()
                    }],
                },
            )
            .unwrap();
        assert!(StorageManager::open(&b.build()).await.is_err());
    }

    #[tokio::test]
    async fn choose_class_scans_in_class_order() {
        let sm = manager(vec![class(2), class(5)]).await;
        let groups = vec![GroupName::from("comp.test")];
        assert_eq!(2, sm.choose_class(&groups, 100).unwrap());
    }

    #[tokio::test]
    async fn choose_class_enforces_size_bounds() {
        let mut small = class(1);
        small.max_size = 1000;
        let mut big = class(2);
        big.size = 1001;
        let sm = manager(vec![small, big]).await;
        let groups = vec![GroupName::from("comp.test")];
        assert_eq!(1, sm.choose_class(&groups, 1000).unwrap());
        assert_eq!(2, sm.choose_class(&groups, 1001).unwrap());
        assert_eq!(2, sm.choose_class(&groups, 1 << 30).unwrap());
    }

    #[tokio::test]
    async fn choose_class_applies_wildmat_policy() {
        let mut binaries = class(1);
        binaries.newsgroups = "alt.binaries.*".into();
        let mut strict = class(2);
        strict.newsgroups = "comp.*".into();
        strict.exact_match = true;
        let catchall = class(9);
        let sm = manager(vec![binaries, strict, catchall]).await;

        // any-match routes into the binaries class
        assert_eq!(
            1,
            sm.choose_class(
                &[
                    GroupName::from("alt.binaries.pictures"),
                    GroupName::from("misc.x"),
                ],
                10,
            )
            .unwrap()
        );
        // exact match requires every group to match
        assert_eq!(
            2,
            sm.choose_class(
                &[
                    GroupName::from("comp.lang.c"),
                    GroupName::from("comp.lang.rust"),
                ],
                10,
            )
            .unwrap()
        );
        assert_eq!(
            9,
            sm.choose_class(
                &[GroupName::from("comp.lang.c"), GroupName::from("misc.x")],
                10,
            )
            .unwrap()
        );
    }

    #[tokio::test]
    async fn no_matching_class_is_no_class() {
        let mut only = class(1);
        only.size = 1_000_000;
        let sm = manager(vec![only]).await;
        assert!(matches!(
            sm.choose_class(&[GroupName::from("comp.test")], 10),
            Err(NsError::NoClass)
        ));
    }
}
