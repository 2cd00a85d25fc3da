#![deny(missing_docs)]
//! Newsspool API contains the storage module traits and the basic types
//! required to define the api of those traits.
//!
//! If you want to use the newsspool engine itself, please see the
//! newsspool crate.

/// Boxed future type.
pub type BoxFut<'a, T> =
    std::pin::Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

pub(crate) mod serde_bytes_text {
    pub fn serialize<S>(
        b: &bytes::Bytes,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&String::from_utf8_lossy(b))
    }

    pub fn deserialize<'de, D, T: From<bytes::Bytes>>(
        deserializer: D,
    ) -> Result<T, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s: String = serde::Deserialize::deserialize(deserializer)?;
        Ok(bytes::Bytes::from(s.into_bytes()).into())
    }
}

pub mod builder;
pub mod config;

mod error;
pub use error::*;

pub mod id;
pub use id::{GroupName, MessageId};

mod timestamp;
pub use timestamp::*;

mod token;
pub use token::*;

mod article;
pub use article::*;

pub mod storage;
pub use storage::*;

pub mod overview;
pub use overview::*;

pub mod history;
pub use history::*;

pub mod reverse_index;
pub use reverse_index::*;

pub mod catalog;
pub use catalog::*;
