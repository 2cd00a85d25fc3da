#![deny(missing_docs)]
//! The storage-and-indexing core of a usenet news server, after the INN
//! lineage: opaque storage tokens, a time-hashed article spool, the
//! overview, history, and reverse indexes, and the posting and expiry
//! pipelines that drive them.
//!
//! Open an engine by registering backends on a
//! [builder](newsspool_api::builder::Builder) (start from
//! [newsspool_core::default_builder]) and handing it to
//! [Spool::open](newsspool_core::Spool::open).

pub use newsspool_api as api;
pub use newsspool_core as engine;

pub use newsspool_core::{default_builder, Spool};
