pub mod interval;
pub mod session;

use rigctl_core::{PeriodicTask, PowerManagement};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::trace;

use crate::config::SessionConfig;

pub use interval::{IntervalTask, TickFn};
pub use rigctl_core::MiningSessionState;
pub use session::{MiningSession, SessionHooks};

impl SessionHooks {
    /// 用 tokio 周期任务构建会话句柄
    ///
    /// 防休眠定时器每个周期调用一次 `prevent_sleep`。
    pub fn with_intervals(
        runtime: Handle,
        config: &SessionConfig,
        power: Arc<dyn PowerManagement>,
        stats_tick: TickFn,
        device_tick: TickFn,
    ) -> Self {
        let guard_power = power.clone();
        let sleep_tick: TickFn = Arc::new(move || {
            trace!("Refreshing sleep prevention");
            guard_power.prevent_sleep();
        });

        let stats_poll: Arc<dyn PeriodicTask> = Arc::new(IntervalTask::new(
            "miner-stats",
            config.stats_poll_interval(),
            runtime.clone(),
            stats_tick,
        ));
        let device_poll: Arc<dyn PeriodicTask> = Arc::new(IntervalTask::new(
            "device-health",
            config.device_poll_interval(),
            runtime.clone(),
            device_tick,
        ));
        let sleep_guard: Arc<dyn PeriodicTask> = Arc::new(IntervalTask::new(
            "sleep-guard",
            config.sleep_guard_interval(),
            runtime,
            sleep_tick,
        ));

        Self {
            stats_poll,
            device_poll,
            sleep_guard,
            power,
        }
    }
}
