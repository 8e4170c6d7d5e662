use rigctl_core::PeriodicTask;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, trace};

use crate::error::StateError;

/// 周期回调
pub type TickFn = Arc<dyn Fn() + Send + Sync>;

/// 基于 tokio 的周期任务
///
/// `start` 在运行时上生成一个定时循环，`stop` 中止它。两者都按当前状态幂等。
pub struct IntervalTask {
    name: String,
    period: Duration,
    runtime: Handle,
    tick: TickFn,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl IntervalTask {
    pub fn new<S: Into<String>>(name: S, period: Duration, runtime: Handle, tick: TickFn) -> Self {
        Self {
            name: name.into(),
            period,
            runtime,
            tick,
            handle: Mutex::new(None),
        }
    }

    /// 使用当前 tokio 运行时创建
    pub fn on_current<S: Into<String>>(
        name: S,
        period: Duration,
        tick: TickFn,
    ) -> Result<Self, StateError> {
        let runtime = Handle::try_current()
            .map_err(|e| StateError::System(format!("No tokio runtime available: {}", e)))?;
        Ok(Self::new(name, period, runtime, tick))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    fn handle(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        match self.handle.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl PeriodicTask for IntervalTask {
    fn start(&self) {
        let mut handle = self.handle();
        if handle.as_ref().is_some_and(|h| !h.is_finished()) {
            trace!("Periodic task {} already running", self.name);
            return;
        }

        let tick = self.tick.clone();
        let period = self.period;
        let name = self.name.clone();

        *handle = Some(self.runtime.spawn(async move {
            let mut timer = interval(period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                timer.tick().await;
                trace!("Periodic task {} tick", name);
                tick();
            }
        }));

        debug!("Periodic task {} started, period {:?}", self.name, self.period);
    }

    fn stop(&self) {
        if let Some(handle) = self.handle().take() {
            handle.abort();
            debug!("Periodic task {} stopped", self.name);
        }
    }

    fn is_running(&self) -> bool {
        self.handle().as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for IntervalTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn counting_task(period: Duration) -> (IntervalTask, Arc<AtomicU32>) {
        let ticks = Arc::new(AtomicU32::new(0));
        let counter = ticks.clone();
        let task = IntervalTask::on_current(
            "test",
            period,
            Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .expect("runtime available");
        (task, ticks)
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_while_running() {
        let (task, ticks) = counting_task(Duration::from_secs(5));

        task.start();
        assert!(task.is_running());

        tokio::time::sleep(Duration::from_secs(16)).await;
        let seen = ticks.load(Ordering::SeqCst);
        assert!(seen >= 3, "expected at least 3 ticks, got {}", seen);

        task.stop();
        assert!(!task.is_running());
        tokio::task::yield_now().await;

        let after_stop = ticks.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), after_stop);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_is_idempotent() {
        let (task, ticks) = counting_task(Duration::from_secs(10));

        task.start();
        task.start();
        tokio::time::sleep(Duration::from_secs(1)).await;

        // 只有一个循环，立即触发一次
        assert_eq!(ticks.load(Ordering::SeqCst), 1);

        task.stop();
        task.stop();
        assert!(!task.is_running());
    }

    #[test]
    fn test_requires_runtime() {
        let result = IntervalTask::on_current("orphan", Duration::from_secs(1), Arc::new(|| {}));
        assert!(result.is_err());
    }
}
