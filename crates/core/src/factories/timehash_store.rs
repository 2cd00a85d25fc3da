//! The time-hashed spool, the reference storage method.
//!
//! One file per article, named from the arrival time and a serial:
//!
//! ```text
//! <spool>/time-nn/zzbb/cc/yyyy-aadd
//! ```
//!
//! where `nn` is the storage class in hex, the arrival time in seconds
//! since the epoch reads as `0xzzaabbccdd`, and `yyyy` is the low half
//! of the serial counter.

use newsspool_api::builder::Builder;
use newsspool_api::config::{Config, SpoolConfig};
use newsspool_api::*;
use bytes::Bytes;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

#[cfg(test)]
mod test;

/// How many serials to try before giving up on a saturated second.
const STORE_ATTEMPTS: u32 = 1 << 16;

/// The time-hashed spool storage method provided by newsspool.
#[derive(Debug)]
pub struct TimehashStoreFactory {}

impl TimehashStoreFactory {
    /// Construct a new TimehashStoreFactory.
    pub fn create() -> DynStorageMethodFactory {
        let out: DynStorageMethodFactory = Arc::new(TimehashStoreFactory {});
        out
    }
}

impl StorageMethodFactory for TimehashStoreFactory {
    fn default_config(&self, _config: &mut Config) -> NsResult<()> {
        Ok(())
    }

    fn create(
        &self,
        builder: Arc<Builder>,
        class: u8,
    ) -> BoxFut<'static, NsResult<DynStorageMethod>> {
        Box::pin(async move {
            let spool: SpoolConfig =
                builder.config.get_module_config(SpoolConfig::MODULE)?;
            let out: DynStorageMethod = Arc::new(TimehashStore::new(
                PathBuf::from(spool.spool),
                class,
            ));
            Ok(out)
        })
    }
}

#[derive(Debug)]
pub(crate) struct TimehashStore {
    root: PathBuf,
    class: u8,
    serial: AtomicU32,
}

impl TimehashStore {
    pub(crate) fn new(root: PathBuf, class: u8) -> Self {
        Self {
            root,
            class,
            serial: AtomicU32::new(0),
        }
    }

    fn mint(&self, md: &ArticleMd, serial: u32) -> Token {
        let mut t = Token::zeroed();
        t.set_class(self.class);
        let p = t.payload_mut();
        p[..8].copy_from_slice(
            &(md.arrival.as_unix_secs() as u64).to_be_bytes(),
        );
        p[8..12].copy_from_slice(&serial.to_be_bytes());
        t
    }

    fn path_for(&self, token: &Token) -> PathBuf {
        let p = token.payload();
        let tm = u64::from_be_bytes(p[..8].try_into().unwrap());
        let ser = u32::from_be_bytes(p[8..12].try_into().unwrap());
        // time-nn/zzbb/cc/yyyy-aadd  <- 0xzzaabbccdd, 0xyyyy
        let rel = format!(
            "time-{:02x}/{:02x}{:02x}/{:02x}/{:04x}-{:02x}{:02x}",
            token.class(),
            (tm >> 32) & 0xff,
            (tm >> 16) & 0xff,
            (tm >> 8) & 0xff,
            ser & 0xffff,
            (tm >> 24) & 0xff,
            tm & 0xff,
        );
        let mut out = self.root.clone();
        out.extend(rel.split('/'));
        out
    }
}

impl StorageMethod for TimehashStore {
    fn store(
        &self,
        md: ArticleMd,
        article: Bytes,
    ) -> BoxFut<'_, NsResult<Token>> {
        Box::pin(async move {
            for _ in 0..STORE_ATTEMPTS {
                let serial = self.serial.fetch_add(1, Ordering::Relaxed)
                    .wrapping_add(1);
                let token = self.mint(&md, serial);
                let path = self.path_for(&token);
                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                let mut f = match tokio::fs::OpenOptions::new()
                    .write(true)
                    .create_new(true)
                    .open(&path)
                    .await
                {
                    Ok(f) => f,
                    // serial reuse after a restart lands on an existing
                    // file; the next serial resolves it
                    Err(e)
                        if e.kind()
                            == std::io::ErrorKind::AlreadyExists =>
                    {
                        continue
                    }
                    Err(e) => return Err(e.into()),
                };
                if let Err(e) = f.write_all(&article).await {
                    // keep the partial as forensic residue, not a live
                    // article
                    let mut del = path.clone().into_os_string();
                    del.push(".del");
                    let _ = tokio::fs::rename(&path, &del).await;
                    return Err(e.into());
                }
                return Ok(token);
            }
            Err(NsError::other("timehash spool: serial space saturated"))
        })
    }

    fn retrieve(
        &self,
        token: Token,
        level: RetrieveLevel,
    ) -> BoxFut<'_, NsResult<RetrievedArticle>> {
        Box::pin(async move {
            let path = self.path_for(&token);
            if level == RetrieveLevel::Stat {
                tokio::fs::metadata(&path).await?;
                return Ok(RetrievedArticle {
                    level: RetrieveLevel::Stat,
                    data: Bytes::new(),
                });
            }
            // a flat file cannot produce a bare head cheaply; answer
            // with the whole article and let the caller split
            let data = tokio::fs::read(&path).await?;
            Ok(RetrievedArticle {
                level: RetrieveLevel::All,
                data: data.into(),
            })
        })
    }

    fn cancel(&self, token: Token) -> BoxFut<'_, NsResult<()>> {
        Box::pin(async move {
            let path = self.path_for(&token);
            tokio::fs::remove_file(&path).await?;
            Ok(())
        })
    }
}
