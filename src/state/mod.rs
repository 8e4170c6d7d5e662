//! 应用状态
//!
//! [`ApplicationState`] 持有所有控制器，是状态修改的唯一入口。它通过
//! `Arc` 在调用方之间共享，取代进程级单例。

pub mod balance;
pub mod credentials;
pub mod service_location;
pub mod version;

use rigctl_core::{
    AlgorithmType, ConfigStore, ConnectionType, CredentialValidator, CredentialValidity,
    Credentials, ExchangeRateSource, MinerSupervisor, MiningSessionState, Navigator,
    ServiceLocationDirectory, SetResult, StatsReporter,
};
use std::sync::Arc;

use crate::config::VersionConfig;
use crate::error::StateError;
use crate::mining::{MiningSession, SessionHooks};
use crate::notify::NotificationBus;

pub use balance::BalanceController;
pub use credentials::CredentialController;
pub use service_location::ServiceLocationController;
pub use version::{parse_version, VersionController};

/// 状态控制器依赖的外部协作者
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn ConfigStore>,
    pub validator: Arc<dyn CredentialValidator>,
    pub directory: Arc<dyn ServiceLocationDirectory>,
    pub rates: Arc<dyn ExchangeRateSource>,
    pub reporter: Arc<dyn StatsReporter>,
    pub supervisor: Arc<dyn MinerSupervisor>,
    pub navigator: Arc<dyn Navigator>,
}

/// 应用状态
pub struct ApplicationState {
    bus: Arc<NotificationBus>,
    session: Arc<MiningSession>,
    credentials: CredentialController,
    locations: ServiceLocationController,
    version: VersionController,
    balance: BalanceController,
}

impl ApplicationState {
    pub fn new(
        collaborators: Collaborators,
        hooks: SessionHooks,
        version: &VersionConfig,
    ) -> Result<Self, StateError> {
        let bus = Arc::new(NotificationBus::new());
        Self::with_bus(collaborators, hooks, version, bus)
    }

    /// 使用外部提供的通知总线创建
    pub fn with_bus(
        collaborators: Collaborators,
        hooks: SessionHooks,
        version: &VersionConfig,
        bus: Arc<NotificationBus>,
    ) -> Result<Self, StateError> {
        let session = Arc::new(MiningSession::new(hooks, bus.clone()));

        let credentials = CredentialController::new(
            collaborators.store.clone(),
            collaborators.validator,
            collaborators.supervisor,
            collaborators.reporter,
            session.clone(),
            bus.clone(),
        );
        let locations = ServiceLocationController::new(
            collaborators.store,
            collaborators.directory,
            bus.clone(),
        );
        let version = VersionController::new(version, collaborators.navigator, bus.clone())?;
        let balance = BalanceController::new(collaborators.rates, bus.clone());

        Ok(Self {
            bus,
            session,
            credentials,
            locations,
            version,
            balance,
        })
    }

    pub fn bus(&self) -> &Arc<NotificationBus> {
        &self.bus
    }

    pub fn session(&self) -> &Arc<MiningSession> {
        &self.session
    }

    pub fn credentials(&self) -> &CredentialController {
        &self.credentials
    }

    pub fn locations(&self) -> &ServiceLocationController {
        &self.locations
    }

    pub fn version(&self) -> &VersionController {
        &self.version
    }

    pub fn balance(&self) -> &BalanceController {
        &self.balance
    }

    // 凭据

    pub fn payout_address(&self) -> String {
        self.credentials.payout_address()
    }

    pub fn worker_name(&self) -> String {
        self.credentials.worker_name()
    }

    pub fn rig_group(&self) -> String {
        self.credentials.rig_group()
    }

    pub fn current_credentials(&self) -> Credentials {
        self.credentials.credentials()
    }

    pub fn set_payout_address(&self, address: &str, skip_credential_reset: bool) -> SetResult {
        self.credentials.set_payout_address(address, skip_credential_reset)
    }

    pub fn set_worker_name(&self, worker_name: &str, skip_credential_reset: bool) -> SetResult {
        self.credentials.set_worker_name(worker_name, skip_credential_reset)
    }

    pub fn set_rig_group(&self, rig_group: &str, skip_credential_reset: bool) -> SetResult {
        self.credentials.set_rig_group(rig_group, skip_credential_reset)
    }

    pub fn credential_validity(&self) -> CredentialValidity {
        self.credentials.credential_validity()
    }

    pub fn reset_downstream_credentials(&self) -> bool {
        self.credentials.reset_downstream_credentials()
    }

    // 服务地域

    pub fn service_location(&self) -> usize {
        self.locations.service_location()
    }

    pub fn set_location_if_valid_or_different(&self, index: i64) -> SetResult {
        self.locations.set_location_if_valid_or_different(index)
    }

    pub fn resolve_location_url(
        &self,
        algorithm: AlgorithmType,
        connection: ConnectionType,
    ) -> Result<String, StateError> {
        self.locations.resolve_location_url(algorithm, connection)
    }

    // 版本

    pub fn on_version_reported(&self, version: &str) -> bool {
        self.version.on_version_reported(version)
    }

    pub fn request_upgrade_navigation(&self) -> String {
        self.version.request_upgrade_navigation()
    }

    pub fn title(&self) -> String {
        self.version.title()
    }

    // 余额

    pub fn on_balance_reported(&self, btc: f64) {
        self.balance.on_balance_reported(btc)
    }

    // 挖矿会话

    /// 凭据有效或演示模式时允许启动
    pub fn can_start(&self, demo: bool) -> bool {
        demo || self.credential_validity().is_valid()
    }

    pub fn start_mining(&self) -> bool {
        self.session.start()
    }

    pub fn stop_mining(&self) -> bool {
        self.session.stop()
    }

    pub fn is_currently_mining(&self) -> bool {
        self.session.is_running()
    }

    pub fn session_state(&self) -> MiningSessionState {
        self.session.state()
    }
}
