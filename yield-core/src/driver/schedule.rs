use log::debug;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// A named tokio task invoking a synchronous callback once per period.
///
/// The first invocation happens one full period after spawning. The task is
/// aborted when this handle is dropped.
pub struct PeriodicTask {
    name: &'static str,
    handle: JoinHandle<()>,
}

impl PeriodicTask {
    /// Spawns the task on the given runtime.
    ///
    /// # Arguments
    ///
    /// * `runtime` - Handle of the runtime that drives the timer.
    /// * `name` - Identifier used in logs.
    /// * `period` - Time between two invocations. Must be non-zero.
    /// * `tick` - Callback run on every period. It must not block.
    pub fn spawn<F>(runtime: &Handle, name: &'static str, period: Duration, mut tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let handle = runtime.spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                tick();
            }
        });
        debug!("Task '{}' scheduled every {:?}", name, period);

        Self { name, handle }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
