//! Test utilities for newsspool.

use rand::RngCore;

pub mod article;
pub mod history;
pub mod overview;
pub mod reverse_index;

/// Enable tracing with the RUST_LOG environment variable.
///
/// This is intended to be used in tests, so it defaults to DEBUG level.
pub fn enable_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing::Level::DEBUG.into())
                .from_env_lossy(),
        )
        .try_init();
}

/// Get a random byte vector of a given length.
pub fn random_bytes(length: usize) -> Vec<u8> {
    let mut out = vec![0; length];
    rand::thread_rng().fill_bytes(&mut out);
    out
}
