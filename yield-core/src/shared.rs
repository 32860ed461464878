//! Shared, session-scoped state handles.
//!
//! Each store has exactly one writer context. The mutex only serializes the
//! tokio tasks that take turns on it; no lock is ever held across an `.await`.

use crate::store::StrategyStore;
use crate::wallet::WalletStore;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub type SharedStrategy = Arc<Mutex<StrategyStore>>;
pub type SharedWallet = Arc<Mutex<WalletStore>>;

/// Locks a store. A poisoned lock still holds consistent data because every
/// transition completes before the guard is released, so it is recovered.
pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
