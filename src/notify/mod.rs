//! 通知总线
//!
//! 同步、按注册顺序把状态变更事件分发给观察者。观察者在调用线程上执行，
//! 发布方不等待也不隔离观察者；状态修改和提交总是在发布之前完成。
//! 异步消费者可以通过 [`NotificationBus::channel`] 获得广播接收端，
//! 它在所有同步观察者之后收到事件。

use rigctl_core::StateEvent;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, trace};
use uuid::Uuid;

/// 默认广播通道容量
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// 状态观察者
pub trait StateObserver: Send + Sync {
    fn on_event(&self, event: &StateEvent);
}

impl<F> StateObserver for F
where
    F: Fn(&StateEvent) + Send + Sync,
{
    fn on_event(&self, event: &StateEvent) {
        self(event)
    }
}

/// 订阅句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 通知总线
pub struct NotificationBus {
    /// 按注册顺序保存的观察者
    observers: RwLock<Vec<(SubscriptionId, Arc<dyn StateObserver>)>>,
    /// 异步消费者的广播桥
    sender: broadcast::Sender<StateEvent>,
    events_published: AtomicU64,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            observers: RwLock::new(Vec::new()),
            sender,
            events_published: AtomicU64::new(0),
        }
    }

    /// 注册观察者
    pub fn subscribe(&self, observer: Arc<dyn StateObserver>) -> SubscriptionId {
        let id = SubscriptionId(Uuid::new_v4());
        let mut observers = match self.observers.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        observers.push((id, observer));
        debug!("Observer {} subscribed, total {}", id, observers.len());
        id
    }

    /// 以闭包注册观察者
    pub fn subscribe_fn<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&StateEvent) + Send + Sync + 'static,
    {
        self.subscribe(Arc::new(observer))
    }

    /// 取消订阅，返回是否找到该订阅
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = match self.observers.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        let removed = observers.len() != before;
        if removed {
            debug!("Observer {} unsubscribed", id);
        }
        removed
    }

    /// 异步广播接收端
    pub fn channel(&self) -> broadcast::Receiver<StateEvent> {
        self.sender.subscribe()
    }

    pub fn observer_count(&self) -> usize {
        match self.observers.read() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }

    /// 发布事件，返回收到事件的同步观察者数量
    pub fn publish(&self, event: StateEvent) -> usize {
        // 先复制观察者列表再调用，观察者内部可以安全地订阅或取消订阅
        let observers: Vec<Arc<dyn StateObserver>> = {
            let guard = match self.observers.read() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            guard.iter().map(|(_, observer)| observer.clone()).collect()
        };

        trace!("Publishing {} to {} observers", event.event_type(), observers.len());

        for observer in &observers {
            observer.on_event(&event);
        }

        self.events_published.fetch_add(1, Ordering::Relaxed);

        // 没有异步接收端时发送失败是正常情况
        if self.sender.send(event).is_err() {
            trace!("No channel receivers for state event");
        }

        observers.len()
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}
