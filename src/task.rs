use std::{future::Future, sync::Arc, time::Duration};
use tokio::{
    sync::Notify,
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::debug;

/// Recurring job tied to the lifetime of its owner. Dropping the handle
/// aborts the job, so a closed view never leaves a timer behind.
pub struct ScheduledTask {
    name: &'static str,
    handle: JoinHandle<()>,
    reset: Arc<Notify>,
}

impl ScheduledTask {
    /// Runs `tick` every `period`, first run one period from now. Ticks never
    /// overlap, a slow tick pushes the next one back instead of queueing it.
    pub fn every<F, Fut>(name: &'static str, period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let reset = Arc::new(Notify::new());
        let task_reset = reset.clone();
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = interval.tick() => tick().await,
                    _ = task_reset.notified() => interval.reset(),
                }
            }
        });
        debug!(name, ?period, "Scheduled task started");
        ScheduledTask {
            name,
            handle,
            reset,
        }
    }

    /// Restarts the countdown, the next tick comes one full period from now.
    pub fn reset(&self) {
        debug!(name = self.name, "Scheduled task reset");
        self.reset.notify_one();
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.handle.abort();
        debug!(name = self.name, "Scheduled task cancelled");
    }
}
