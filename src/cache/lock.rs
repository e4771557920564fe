//! Poison-tolerant access to the in-process entry map.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::warn;

pub(crate) fn rw_read<'a, T>(lock: &'a RwLock<T>, op: &'static str) -> RwLockReadGuard<'a, T> {
    lock.read()
        .unwrap_or_else(|poisoned| recover(poisoned, op, "read"))
}

pub(crate) fn rw_write<'a, T>(lock: &'a RwLock<T>, op: &'static str) -> RwLockWriteGuard<'a, T> {
    lock.write()
        .unwrap_or_else(|poisoned| recover(poisoned, op, "write"))
}

fn recover<G>(poisoned: PoisonError<G>, op: &'static str, mode: &'static str) -> G {
    warn!(
        target = "jokeminute::cache::memory",
        op,
        mode,
        "recovered poisoned cache lock"
    );
    poisoned.into_inner()
}
