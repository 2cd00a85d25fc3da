//! Striped per-group locking.

use crate::codec::fnv1a_64;
use tokio::sync::{Mutex, MutexGuard};

const STRIPES: usize = 1 << 12;

/// A striped group-lock table.
///
/// Overview writes for a given group serialize on the stripe the group
/// name hashes to; the stripe is held across the sentinel
/// read-modify-write window. Reads take no stripe.
pub struct GroupLocks {
    locks: Vec<Mutex<()>>,
}

impl std::fmt::Debug for GroupLocks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupLocks")
            .field("stripes", &self.locks.len())
            .finish()
    }
}

impl Default for GroupLocks {
    fn default() -> Self {
        Self {
            locks: (0..STRIPES).map(|_| Mutex::new(())).collect(),
        }
    }
}

impl GroupLocks {
    /// Acquire the stripe covering `grp`.
    pub async fn lock(&self, grp: &[u8]) -> MutexGuard<'_, ()> {
        let i = (fnv1a_64(grp) as usize) & (STRIPES - 1);
        self.locks[i].lock().await
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn same_group_same_stripe() {
        let locks = GroupLocks::default();
        let g1 = locks.lock(b"comp.test").await;
        // a different group may share the stripe, but the same group must
        let held = locks.locks
            [(fnv1a_64(b"comp.test") as usize) & (STRIPES - 1)]
        .try_lock();
        assert!(held.is_err());
        drop(g1);
        let g2 = locks.lock(b"comp.test").await;
        drop(g2);
    }
}
