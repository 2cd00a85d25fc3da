//! The traditional group catalog, backed by the flat `active` and
//! `newsgroups` files as distributed for usenet peering.

use crate::decompress::DecoderRegistry;
use newsspool_api::builder::Builder;
use newsspool_api::config::{Config, SpoolConfig};
use newsspool_api::*;
use bytes::Bytes;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;


/// The traditional group catalog implementation provided by newsspool.
#[derive(Debug)]
pub struct TradCatalogFactory {
    registry: Arc<DecoderRegistry>,
}

impl TradCatalogFactory {
    /// Construct a new TradCatalogFactory with an empty decoder
    /// registry (identity only).
    pub fn create() -> DynGroupCatalogFactory {
        Self::with_registry(Arc::new(DecoderRegistry::default()))
    }

    /// Construct a new TradCatalogFactory over a shared decoder
    /// registry, typically one the embedding application has loaded its
    /// decompression plugins into.
    pub fn with_registry(
        registry: Arc<DecoderRegistry>,
    ) -> DynGroupCatalogFactory {
        let out: DynGroupCatalogFactory =
            Arc::new(TradCatalogFactory { registry });
        out
    }
}

impl GroupCatalogFactory for TradCatalogFactory {
    fn default_config(&self, _config: &mut Config) -> NsResult<()> {
        Ok(())
    }

    fn create(
        &self,
        builder: Arc<Builder>,
    ) -> BoxFut<'static, NsResult<DynGroupCatalog>> {
        let registry = self.registry.clone();
        Box::pin(async move {
            let spool: SpoolConfig =
                builder.config.get_module_config(SpoolConfig::MODULE)?;
            let out: DynGroupCatalog = Arc::new(TradCatalog {
                dir: PathBuf::from(spool.config_path),
                ext: spool.decompress,
                registry,
            });
            Ok(out)
        })
    }
}

#[derive(Debug)]
struct TradCatalog {
    dir: PathBuf,
    ext: String,
    registry: Arc<DecoderRegistry>,
}

impl GroupCatalog for TradCatalog {
    fn fetch_groups(
        &self,
        status: bool,
        descr: bool,
    ) -> BoxFut<'_, NsResult<Box<dyn GroupCursor>>> {
        Box::pin(async move {
            // one pass reads one file; status lives in `active`,
            // descriptions in `newsgroups`
            if status && descr {
                return Err(NsError::NotSupported);
            }
            let name = if descr { "newsgroups" } else { "active" };
            let deco = self.registry.get(&self.ext).ok_or_else(|| {
                NsError::NoDecompress(self.ext.as_str().into())
            })?;
            let fname = if self.ext.is_empty() {
                name.to_string()
            } else {
                format!("{name}.{}", self.ext)
            };
            let raw = tokio::fs::read(self.dir.join(fname)).await?;
            let mut lines = Vec::new();
            deco(Box::new(std::io::Cursor::new(raw)))?
                .read_to_end(&mut lines)?;
            let out: Box<dyn GroupCursor> = Box::new(CatalogCursor {
                lines,
                pos: 0,
                descr,
            });
            Ok(out)
        })
    }
}

struct CatalogCursor {
    lines: Vec<u8>,
    pos: usize,
    descr: bool,
}

impl CatalogCursor {
    fn next_line(&mut self) -> Option<&[u8]> {
        if self.pos >= self.lines.len() {
            return None;
        }
        let rest = &self.lines[self.pos..];
        let end = rest
            .iter()
            .position(|&b| b == b'\n')
            .map(|i| i + 1)
            .unwrap_or(rest.len());
        self.pos += end;
        Some(&self.lines[self.pos - end..self.pos])
    }
}

fn trim_end(line: &[u8]) -> &[u8] {
    let mut e = line.len();
    while e > 0 && matches!(line[e - 1], b'\n' | b'\r' | b' ' | b'\t') {
        e -= 1;
    }
    &line[..e]
}

impl GroupCursor for CatalogCursor {
    fn next(&mut self) -> BoxFut<'_, NsResult<Option<GroupElement>>> {
        Box::pin(async move {
            loop {
                let descr = self.descr;
                let Some(line) = self.next_line() else {
                    return Ok(None);
                };
                let line = trim_end(line);
                if descr {
                    // <group> <description...>
                    let Some(split) = line
                        .iter()
                        .position(|&b| b == b' ' || b == b'\t')
                    else {
                        continue;
                    };
                    let group = &line[..split];
                    if group.is_empty() {
                        continue;
                    }
                    let mut d = split;
                    while d < line.len()
                        && (line[d] == b' ' || line[d] == b'\t')
                    {
                        d += 1;
                    }
                    return Ok(Some(GroupElement {
                        group: Bytes::copy_from_slice(group).into(),
                        status: b'y',
                        description: Bytes::copy_from_slice(&line[d..]),
                    }));
                }
                // <group> <high> <low> <status-char>
                let mut fields = line
                    .split(|&b| b == b' ' || b == b'\t')
                    .filter(|f| !f.is_empty());
                let (Some(group), Some(_high), Some(_low), Some(st)) = (
                    fields.next(),
                    fields.next(),
                    fields.next(),
                    fields.next(),
                ) else {
                    continue;
                };
                return Ok(Some(GroupElement {
                    group: Bytes::copy_from_slice(group).into(),
                    status: st[0],
                    description: Bytes::new(),
                }));
            }
        })
    }
}
