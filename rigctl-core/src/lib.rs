//! RigCtl Core - 核心特征和类型定义
//!
//! 这个库定义了应用状态核心与外部协作者之间的窄接口：
//! 凭据校验、持久化配置、服务位置目录、汇率、统计上报、
//! 矿工进程监管、电源管理和周期任务。

pub mod collaborators;
pub mod error;
pub mod events;
pub mod settings;
pub mod types;

// 重新导出常用类型
pub use collaborators::{
    ConfigStore, CredentialValidator, ExchangeRateSource, MinerSupervisor, Navigator,
    PeriodicTask, PowerManagement, ServiceLocationDirectory, StatsReporter,
};
pub use error::CoreError;
pub use events::StateEvent;
pub use settings::GeneralSettings;
pub use types::{
    AlgorithmType, ConnectionType, CredentialField, CredentialValidity, Credentials,
    MiningSessionState, SetResult,
};

#[cfg(any(test, feature = "mock"))]
pub use collaborators::{
    MockConfigStore, MockCredentialValidator, MockExchangeRateSource, MockMinerSupervisor,
    MockNavigator, MockPeriodicTask, MockPowerManagement, MockServiceLocationDirectory,
    MockStatsReporter,
};

/// 库版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
