use rigctl_core::{
    ConfigStore, CredentialField, CredentialValidator, CredentialValidity, Credentials,
    MinerSupervisor, SetResult, StateEvent, StatsReporter,
};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use crate::mining::MiningSession;
use crate::notify::NotificationBus;
use crate::{state_error, state_info, state_warn};

/// 凭据控制器
///
/// 收款地址、矿工名和矿机分组的唯一修改入口。三个字段遵循同一流程：
/// 比较 → 校验 → 写入并提交 → (运行中时)重启矿工 → 通知 → 重置下游凭据。
/// 候选值必须由调用方去除首尾空白。
pub struct CredentialController {
    store: Arc<dyn ConfigStore>,
    validator: Arc<dyn CredentialValidator>,
    supervisor: Arc<dyn MinerSupervisor>,
    reporter: Arc<dyn StatsReporter>,
    session: Arc<MiningSession>,
    bus: Arc<NotificationBus>,
    /// 每个字段一把锁，同一字段的修改串行执行
    field_locks: [Mutex<()>; 3],
}

impl CredentialController {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        validator: Arc<dyn CredentialValidator>,
        supervisor: Arc<dyn MinerSupervisor>,
        reporter: Arc<dyn StatsReporter>,
        session: Arc<MiningSession>,
        bus: Arc<NotificationBus>,
    ) -> Self {
        Self {
            store,
            validator,
            supervisor,
            reporter,
            session,
            bus,
            field_locks: [Mutex::new(()), Mutex::new(()), Mutex::new(())],
        }
    }

    pub fn payout_address(&self) -> String {
        self.store.credential(CredentialField::PayoutAddress)
    }

    pub fn worker_name(&self) -> String {
        self.store.credential(CredentialField::WorkerName)
    }

    pub fn rig_group(&self) -> String {
        self.store.credential(CredentialField::RigGroup)
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.payout_address(), self.worker_name(), self.rig_group())
    }

    pub fn set_payout_address(&self, address: &str, skip_credential_reset: bool) -> SetResult {
        self.set_credential(CredentialField::PayoutAddress, address, skip_credential_reset)
    }

    /// `skip_credential_reset` 供远程控制调用，避免重复推送凭据
    pub fn set_worker_name(&self, worker_name: &str, skip_credential_reset: bool) -> SetResult {
        self.set_credential(CredentialField::WorkerName, worker_name, skip_credential_reset)
    }

    pub fn set_rig_group(&self, rig_group: &str, skip_credential_reset: bool) -> SetResult {
        self.set_credential(CredentialField::RigGroup, rig_group, skip_credential_reset)
    }

    /// 修改一个凭据字段
    pub fn set_credential(
        &self,
        field: CredentialField,
        candidate: &str,
        skip_credential_reset: bool,
    ) -> SetResult {
        let _guard = self.lock_field(field);

        if candidate == self.store.credential(field) {
            debug!("{} unchanged", field);
            return SetResult::NoChange;
        }

        if !self.is_acceptable(field, candidate) {
            state_warn!("Rejected invalid {}: '{}'", field, candidate);
            return SetResult::Invalid;
        }

        self.store.set_credential(field, candidate);
        if let Err(e) = self.store.commit() {
            state_error!("Failed to commit {} change: {}", field, e);
        }

        if field.restarts_miners() && self.session.is_running() {
            state_info!("Restarting miners to apply new {}", field);
            self.supervisor.restart_miners();
        }

        state_info!("{} changed to '{}'", field, candidate);
        self.bus.publish(changed_event(field, candidate));

        if !skip_credential_reset {
            self.reset_downstream_credentials();
        }

        SetResult::Changed
    }

    /// 根据当前凭据计算有效性
    pub fn credential_validity(&self) -> CredentialValidity {
        let mut state = CredentialValidity::VALID;

        if !self.validator.validate_payout_address(&self.payout_address()) {
            state |= CredentialValidity::INVALID_BTC;
        }
        if !self.validator.validate_worker_name(&self.worker_name()) {
            state |= CredentialValidity::INVALID_WORKER;
        }

        state
    }

    /// 凭据有效时把去除空白后的凭据推送给统计服务，返回是否推送
    pub fn reset_downstream_credentials(&self) -> bool {
        let state = self.credential_validity();
        if !state.is_valid() {
            // TODO: 把无效状态通知给调用方，而不是只记录日志
            debug!("Credentials are {}, skipping downstream reset", state);
            return false;
        }

        let credentials = self.credentials().trimmed();
        self.reporter.set_credentials(
            &credentials.payout_address,
            &credentials.worker_name,
            &credentials.rig_group,
        );
        debug!("Pushed credentials to stats service");
        true
    }

    fn is_acceptable(&self, field: CredentialField, candidate: &str) -> bool {
        match field {
            CredentialField::PayoutAddress => self.validator.validate_payout_address(candidate),
            CredentialField::WorkerName => self.validator.validate_worker_name(candidate),
            // 分组暂无校验规则
            CredentialField::RigGroup => true,
        }
    }

    fn lock_field(&self, field: CredentialField) -> MutexGuard<'_, ()> {
        match self.field_locks[field.index()].lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn changed_event(field: CredentialField, value: &str) -> StateEvent {
    match field {
        CredentialField::PayoutAddress => StateEvent::PayoutAddressChanged {
            address: value.to_string(),
        },
        CredentialField::WorkerName => StateEvent::WorkerNameChanged {
            name: value.to_string(),
        },
        CredentialField::RigGroup => StateEvent::RigGroupChanged {
            name: value.to_string(),
        },
    }
}
