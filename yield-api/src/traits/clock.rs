/// Source of wall-clock timestamps for rebalance events.
///
/// Injected so tests can pin time instead of reading the system clock.
pub trait Clock: Send + Sync {
    /// Current Unix time in milliseconds.
    fn now_millis(&self) -> i64;
}
