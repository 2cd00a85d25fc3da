//! Newsspool error types.

use std::sync::Arc;

/// A clonable trait-object inner error.
#[derive(Clone, Default)]
pub struct DynInnerError(
    pub Option<Arc<dyn std::error::Error + 'static + Send + Sync>>,
);

impl std::fmt::Debug for DynInnerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::fmt::Display for DynInnerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.as_ref() {
            None => f.write_str("None"),
            Some(s) => s.fmt(f),
        }
    }
}

impl std::error::Error for DynInnerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.as_ref().map(|s| {
            let out: &(dyn std::error::Error + 'static) = &**s;
            out
        })
    }
}

impl DynInnerError {
    /// Construct a new DynInnerError from a source error.
    pub fn new<E: std::error::Error + 'static + Send + Sync>(e: E) -> Self {
        Self(Some(Arc::new(e)))
    }
}

/// The core newsspool error type. This type is used in all external
/// storage apis as well as internally in some modules.
///
/// This type is required to implement `Clone` to ease the use of
/// shared futures, which require the entire `Result` to be `Clone`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum NsError {
    /// A token names a storage class with no bound method.
    #[error("storage class {0} is not initialized")]
    NotInitialized(u8),

    /// The requested key is not present in the store.
    #[error("no entry")]
    NoEntry,

    /// A persisted record is shorter than its format dictates.
    #[error("record too short")]
    RecordShort,

    /// The history store returned a blob of the wrong length.
    #[error("history token mismatch")]
    TokenMismatch,

    /// No configured storage class accepts the article.
    #[error("no storage class matched")]
    NoClass,

    /// The expirer was invoked with nothing to query.
    #[error("could not query expired articles")]
    CouldNotQuery,

    /// The group catalog cannot answer status and description in one pass.
    #[error("not supported: status and description")]
    NotSupported,

    /// No decompressor is registered for the requested extension.
    #[error("no decompressor registered for extension {0:?}")]
    NoDecompress(Arc<str>),

    /// Underlying store or filesystem failure.
    #[error("io error: {0}")]
    Io(#[source] DynInnerError),

    /// Generic newsspool internal error.
    #[error("{ctx} (src: {src})")]
    Other {
        /// Any context associated with this error.
        ctx: Arc<str>,

        /// The inner error (if any).
        #[source]
        src: DynInnerError,
    },
}

impl NsError {
    /// Construct an "other" error with an inner source error.
    pub fn other_src<
        C: std::fmt::Display,
        S: std::error::Error + 'static + Send + Sync,
    >(
        ctx: C,
        src: S,
    ) -> Self {
        Self::Other {
            ctx: ctx.to_string().into_boxed_str().into(),
            src: DynInnerError::new(src),
        }
    }

    /// Construct an "other" error.
    pub fn other<C: std::fmt::Display>(ctx: C) -> Self {
        Self::Other {
            ctx: ctx.to_string().into_boxed_str().into(),
            src: DynInnerError::default(),
        }
    }

    /// True if this error represents an underlying io failure.
    ///
    /// The posting coordinator distinguishes transient io failures from
    /// policy refusals with this.
    pub fn is_io(&self) -> bool {
        matches!(self, NsError::Io(_))
    }
}

impl From<std::io::Error> for NsError {
    fn from(e: std::io::Error) -> Self {
        NsError::Io(DynInnerError::new(e))
    }
}

/// The core newsspool result type.
pub type NsResult<T> = Result<T, NsError>;
