use rigctl_core::{
    AlgorithmType, ConfigStore, ConnectionType, ServiceLocationDirectory, SetResult, StateEvent,
};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use crate::error::StateError;
use crate::notify::NotificationBus;
use crate::{state_error, state_info, state_warn};

/// 服务地域控制器
///
/// 所选地域保存在设置存储中，用于拼接 stratum 地址。越界请求回退到第一个地域。
pub struct ServiceLocationController {
    store: Arc<dyn ConfigStore>,
    directory: Arc<dyn ServiceLocationDirectory>,
    bus: Arc<NotificationBus>,
    lock: Mutex<()>,
}

impl ServiceLocationController {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        directory: Arc<dyn ServiceLocationDirectory>,
        bus: Arc<NotificationBus>,
    ) -> Self {
        Self {
            store,
            directory,
            bus,
            lock: Mutex::new(()),
        }
    }

    pub fn service_location(&self) -> usize {
        self.store.service_location()
    }

    /// 当前地域的名称
    pub fn location_name(&self) -> Option<String> {
        self.directory.location(self.service_location())
    }

    /// 按当前地域生成 stratum 地址
    pub fn resolve_location_url(
        &self,
        algorithm: AlgorithmType,
        connection: ConnectionType,
    ) -> Result<String, StateError> {
        let index = self.store.service_location();
        let location = self
            .directory
            .location(index)
            .ok_or(StateError::LocationOutOfRange {
                index,
                len: self.directory.location_count(),
            })?;

        Ok(self.directory.location_url(algorithm, &location, connection))
    }

    /// 设置服务地域
    ///
    /// 与当前值相同返回 `NoChange`；越界时强制写入 0 并返回 `Invalid`，
    /// 即使当前已经是 0 也会提交并通知。
    pub fn set_location_if_valid_or_different(&self, requested: i64) -> SetResult {
        let _guard = self.lock();

        let current = self.store.service_location();
        if usize::try_from(requested).is_ok_and(|index| index == current) {
            debug!("Service location unchanged: {}", current);
            return SetResult::NoChange;
        }

        let len = self.directory.location_count();
        match usize::try_from(requested) {
            Ok(index) if index < len => {
                self.apply(index);
                SetResult::Changed
            }
            _ => {
                state_warn!(
                    "Service location {} out of range (0..{}), falling back to 0",
                    requested,
                    len
                );
                self.apply(0);
                SetResult::Invalid
            }
        }
    }

    fn apply(&self, index: usize) {
        self.store.set_service_location(index);
        if let Err(e) = self.store.commit() {
            state_error!("Failed to commit service location change: {}", e);
        }

        state_info!("Service location changed to {}", index);
        self.bus.publish(StateEvent::ServiceLocationChanged { index });
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        match self.lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryConfigStore;
    use crate::stratum::StratumLocations;
    use rigctl_core::GeneralSettings;

    type Events = Arc<Mutex<Vec<StateEvent>>>;

    fn controller(current: usize) -> (ServiceLocationController, Arc<MemoryConfigStore>, Events) {
        let store = Arc::new(MemoryConfigStore::new(GeneralSettings {
            service_location: current,
            ..GeneralSettings::default()
        }));
        let directory = Arc::new(StratumLocations::new(
            vec!["eu".to_string(), "usa".to_string(), "hk".to_string()],
            "nicehash.com",
        ));
        let bus = Arc::new(NotificationBus::new());
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        bus.subscribe_fn(move |event| sink.lock().unwrap().push(event.clone()));

        (
            ServiceLocationController::new(store.clone(), directory, bus),
            store,
            events,
        )
    }

    #[test]
    fn test_same_location_is_no_change() {
        let (controller, store, events) = controller(1);

        assert_eq!(controller.set_location_if_valid_or_different(1), SetResult::NoChange);
        assert_eq!(store.commit_count(), 0);
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_valid_location_changes() {
        let (controller, store, events) = controller(0);

        assert_eq!(controller.set_location_if_valid_or_different(2), SetResult::Changed);
        assert_eq!(controller.service_location(), 2);
        assert_eq!(controller.location_name().as_deref(), Some("hk"));
        assert_eq!(store.commit_count(), 1);
        assert_eq!(
            *events.lock().unwrap(),
            vec![StateEvent::ServiceLocationChanged { index: 2 }]
        );
    }

    #[test]
    fn test_out_of_range_falls_back_to_zero() {
        let (controller, store, events) = controller(2);

        assert_eq!(controller.set_location_if_valid_or_different(3), SetResult::Invalid);
        assert_eq!(controller.service_location(), 0);
        assert_eq!(store.commit_count(), 1);
        assert_eq!(
            *events.lock().unwrap(),
            vec![StateEvent::ServiceLocationChanged { index: 0 }]
        );
    }

    #[test]
    fn test_negative_location_forces_reset_even_at_zero() {
        let (controller, store, events) = controller(0);

        assert_eq!(controller.set_location_if_valid_or_different(-1), SetResult::Invalid);
        assert_eq!(controller.service_location(), 0);
        assert_eq!(store.commit_count(), 1);
        assert_eq!(events.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_resolve_location_url() {
        let (controller, _, _) = controller(1);

        let url = controller
            .resolve_location_url(AlgorithmType::DaggerHashimoto, ConnectionType::StratumTcp)
            .unwrap();
        assert_eq!(url, "stratum+tcp://daggerhashimoto.usa.nicehash.com:3353");
    }

    #[test]
    fn test_resolve_with_stale_index() {
        let (controller, _, _) = controller(9);

        assert!(matches!(
            controller
                .resolve_location_url(AlgorithmType::DaggerHashimoto, ConnectionType::StratumTcp),
            Err(StateError::LocationOutOfRange { index: 9, len: 3 })
        ));
    }

    #[test]
    fn test_observer_sees_committed_location() {
        let store = Arc::new(MemoryConfigStore::default());
        let directory = Arc::new(StratumLocations::new(
            vec!["eu".to_string(), "usa".to_string()],
            "nicehash.com",
        ));
        let bus = Arc::new(NotificationBus::new());

        let seen = Arc::new(Mutex::new(None));
        let (observed_store, sink) = (store.clone(), seen.clone());
        bus.subscribe_fn(move |_| {
            *sink.lock().unwrap() =
                Some((observed_store.commit_count(), observed_store.service_location()));
        });

        let controller = ServiceLocationController::new(store, directory, bus);
        assert_eq!(controller.set_location_if_valid_or_different(1), SetResult::Changed);
        assert_eq!(*seen.lock().unwrap(), Some((1, 1)));
    }
}
