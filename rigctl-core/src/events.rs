//! 状态变更事件

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// 状态变更事件，通过通知总线按注册顺序同步分发
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StateEvent {
    /// 有新版本可用，携带可直接显示的提示
    VersionAvailable { message: String },
    /// BTC 余额更新
    BalanceUpdated { btc: f64 },
    /// 法币余额更新
    FiatBalanceUpdated { amount: f64, symbol: String },
    /// 服务位置变更
    ServiceLocationChanged { index: usize },
    /// 收款地址变更
    PayoutAddressChanged { address: String },
    /// 矿工名变更
    WorkerNameChanged { name: String },
    /// 矿机分组变更
    RigGroupChanged { name: String },
    /// 开始挖矿
    MiningStarted,
    /// 停止挖矿
    MiningStopped,
}

impl StateEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            StateEvent::VersionAvailable { .. } => "version_available",
            StateEvent::BalanceUpdated { .. } => "balance_updated",
            StateEvent::FiatBalanceUpdated { .. } => "fiat_balance_updated",
            StateEvent::ServiceLocationChanged { .. } => "service_location_changed",
            StateEvent::PayoutAddressChanged { .. } => "payout_address_changed",
            StateEvent::WorkerNameChanged { .. } => "worker_name_changed",
            StateEvent::RigGroupChanged { .. } => "rig_group_changed",
            StateEvent::MiningStarted => "mining_started",
            StateEvent::MiningStopped => "mining_stopped",
        }
    }

    /// 序列化为 JSON，供远程控制端点转发
    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_names() {
        assert_eq!(StateEvent::MiningStarted.event_type(), "mining_started");
        assert_eq!(
            StateEvent::ServiceLocationChanged { index: 2 }.event_type(),
            "service_location_changed"
        );
    }

    #[test]
    fn test_event_json() {
        let event = StateEvent::FiatBalanceUpdated {
            amount: 12.5,
            symbol: "EUR".to_string(),
        };
        let json = event.to_json().unwrap();
        assert_eq!(json, r#"{"FiatBalanceUpdated":{"amount":12.5,"symbol":"EUR"}}"#);
    }
}
