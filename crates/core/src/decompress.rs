//! A decompression plugin registry.
//!
//! The flat group-listing files (`active`, `newsgroups`) come in
//! compressed counterparts; the catalog resolves their extension through
//! this registry. Decoders register under an extension with a priority;
//! the highest priority wins on re-registration. The empty extension is
//! pre-registered as the identity decoder. Concrete decoders for ".gz"
//! or ".bz2" are plugins supplied by the embedding application.

use std::collections::HashMap;
use std::io::Read;
use std::sync::{Arc, Mutex};

/// A boxed readable stream.
pub type DynRead = Box<dyn Read + Send>;

/// A decoder wraps a raw stream in a decompressing one.
pub type DynDecoder =
    Arc<dyn Fn(DynRead) -> std::io::Result<DynRead> + Send + Sync>;

/// The identity decoder priority; high enough that a plugin does not
/// displace it by accident.
const IDENTITY_PRIO: i32 = 1 << 20;

struct PrioDecoder {
    prio: i32,
    deco: DynDecoder,
}

/// A priority-ordered decoder registry keyed by file extension.
pub struct DecoderRegistry {
    inner: Mutex<HashMap<String, PrioDecoder>>,
}

impl std::fmt::Debug for DecoderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut exts: Vec<String> =
            self.inner.lock().unwrap().keys().cloned().collect();
        exts.sort_unstable();
        f.debug_struct("DecoderRegistry").field("exts", &exts).finish()
    }
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        let out = Self {
            inner: Mutex::new(HashMap::new()),
        };
        out.register("", IDENTITY_PRIO, Arc::new(|r| Ok(r)));
        out
    }
}

impl DecoderRegistry {
    /// Register a decoder for an extension (without the dot, e.g. "gz").
    ///
    /// An existing registration at the same or a higher priority is kept.
    pub fn register(&self, ext: &str, prio: i32, deco: DynDecoder) {
        let mut inner = self.inner.lock().unwrap();
        let ext = ext.to_ascii_lowercase();
        if let Some(existing) = inner.get(&ext) {
            if existing.prio >= prio {
                return;
            }
        }
        inner.insert(ext, PrioDecoder { prio, deco });
    }

    /// Resolve the decoder for an extension, or None if unsupported.
    pub fn get(&self, ext: &str) -> Option<DynDecoder> {
        self.inner
            .lock()
            .unwrap()
            .get(&ext.to_ascii_lowercase())
            .map(|d| d.deco.clone())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn identity_is_preregistered() {
        let reg = DecoderRegistry::default();
        let deco = reg.get("").unwrap();
        let mut out = String::new();
        deco(Box::new(&b"hello"[..]))
            .unwrap()
            .read_to_string(&mut out)
            .unwrap();
        assert_eq!("hello", out);
    }

    #[test]
    fn unknown_extension_is_none() {
        let reg = DecoderRegistry::default();
        assert!(reg.get("bz2").is_none());
    }

    /// rot13-style byte flip, standing in for a real decompressor.
    fn flip(r: DynRead) -> std::io::Result<DynRead> {
        let mut buf = Vec::new();
        let mut r = r;
        r.read_to_end(&mut buf)?;
        for b in &mut buf {
            *b = !*b;
        }
        Ok(Box::new(std::io::Cursor::new(buf)))
    }

    #[test]
    fn priority_decides_re_registration() {
        let reg = DecoderRegistry::default();
        reg.register("x", 10, Arc::new(flip));
        // a lower-priority re-registration is ignored
        reg.register("x", 5, Arc::new(|r| Ok(r)));
        let deco = reg.get("x").unwrap();
        let mut out = Vec::new();
        deco(Box::new(&[!b'a'][..])).unwrap().read_to_end(&mut out).unwrap();
        assert_eq!(vec![b'a'], out);

        // a higher-priority one wins
        reg.register("x", 20, Arc::new(|r| Ok(r)));
        let deco = reg.get("x").unwrap();
        let mut out = Vec::new();
        deco(Box::new(&[!b'a'][..])).unwrap().read_to_end(&mut out).unwrap();
        assert_eq!(vec![!b'a'], out);
    }

    #[test]
    fn extension_lookup_is_case_insensitive() {
        let reg = DecoderRegistry::default();
        reg.register("GZ", 1, Arc::new(|r| Ok(r)));
        assert!(reg.get("gz").is_some());
        assert!(reg.get("Gz").is_some());
    }
}
