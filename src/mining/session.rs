use rigctl_core::{MiningSessionState, PeriodicTask, PowerManagement, StateEvent};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use crate::notify::NotificationBus;
use crate::session_info;

/// 会话启停时驱动的外部句柄
#[derive(Clone)]
pub struct SessionHooks {
    /// 矿工统计轮询
    pub stats_poll: Arc<dyn PeriodicTask>,
    /// 计算设备健康轮询
    pub device_poll: Arc<dyn PeriodicTask>,
    /// 防休眠定时器
    pub sleep_guard: Arc<dyn PeriodicTask>,
    /// 操作系统电源管理
    pub power: Arc<dyn PowerManagement>,
}

/// 挖矿会话状态机
///
/// 状态只有 `Stopped` 和 `Running`，转换是边沿触发的：重复启动或重复停止
/// 返回 `false` 且没有任何副作用。调用 `start` 之前凭据必须有效或处于演示模式，
/// 这里不再重复检查。
pub struct MiningSession {
    state: Mutex<MiningSessionState>,
    hooks: SessionHooks,
    bus: Arc<NotificationBus>,
}

impl MiningSession {
    pub fn new(hooks: SessionHooks, bus: Arc<NotificationBus>) -> Self {
        Self {
            state: Mutex::new(MiningSessionState::Stopped),
            hooks,
            bus,
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, MiningSessionState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn state(&self) -> MiningSessionState {
        *self.lock_state()
    }

    pub fn is_running(&self) -> bool {
        self.state() == MiningSessionState::Running
    }

    /// 启动挖矿会话
    pub fn start(&self) -> bool {
        {
            let mut state = self.lock_state();
            if *state == MiningSessionState::Running {
                debug!("Mining session is already running");
                return false;
            }

            *state = MiningSessionState::Running;
            self.hooks.stats_poll.start();
            self.hooks.device_poll.start();
            self.hooks.sleep_guard.start();
        }

        session_info!("Mining session started");
        self.bus.publish(StateEvent::MiningStarted);
        true
    }

    /// 停止挖矿会话
    pub fn stop(&self) -> bool {
        {
            let mut state = self.lock_state();
            if *state == MiningSessionState::Stopped {
                debug!("Mining session is already stopped");
                return false;
            }

            self.hooks.power.allow_sleep();
            *state = MiningSessionState::Stopped;
            self.hooks.stats_poll.stop();
            self.hooks.device_poll.stop();
            self.hooks.sleep_guard.stop();
        }

        session_info!("Mining session stopped");
        self.bus.publish(StateEvent::MiningStopped);
        true
    }
}
