//! 外部协作者特征
//!
//! 状态核心只通过这些窄接口与外部世界交互。所有实现都必须是
//! `Send + Sync`，因为同一个应用状态会被界面、远程控制和启动流程共享。

#[cfg(any(test, feature = "mock"))]
use mockall::automock;

use crate::error::CoreError;
use crate::types::{AlgorithmType, ConnectionType, CredentialField};

/// 凭据校验器
#[cfg_attr(any(test, feature = "mock"), automock)]
pub trait CredentialValidator: Send + Sync {
    /// 校验收款地址
    fn validate_payout_address(&self, address: &str) -> bool;

    /// 校验矿工名
    fn validate_worker_name(&self, worker_name: &str) -> bool;
}

/// 持久化配置存储
///
/// 字段修改只作用于内存副本，`commit` 才会写入持久化存储。
#[cfg_attr(any(test, feature = "mock"), automock)]
pub trait ConfigStore: Send + Sync {
    /// 读取凭据字段
    fn credential(&self, field: CredentialField) -> String;

    /// 修改凭据字段
    fn set_credential(&self, field: CredentialField, value: &str);

    /// 读取服务位置下标
    fn service_location(&self) -> usize;

    /// 修改服务位置下标
    fn set_service_location(&self, index: usize);

    /// 提交通用配置到持久化存储
    fn commit(&self) -> Result<(), CoreError>;
}

/// 服务位置目录
#[cfg_attr(any(test, feature = "mock"), automock)]
pub trait ServiceLocationDirectory: Send + Sync {
    /// 已知位置数量
    fn location_count(&self) -> usize;

    /// 按下标获取位置标识
    fn location(&self, index: usize) -> Option<String>;

    /// 根据算法、位置和连接类型生成连接 URL
    fn location_url(
        &self,
        algorithm: AlgorithmType,
        location: &str,
        connection: ConnectionType,
    ) -> String;
}

/// 汇率来源
#[cfg_attr(any(test, feature = "mock"), automock)]
pub trait ExchangeRateSource: Send + Sync {
    /// BTC → USD 汇率
    fn usd_exchange_rate(&self) -> f64;

    /// USD 金额换算为当前显示货币
    fn convert_to_active_currency(&self, usd_amount: f64) -> f64;

    /// 当前显示货币符号
    fn active_display_currency(&self) -> String;
}

/// 统计/上报服务
#[cfg_attr(any(test, feature = "mock"), automock)]
pub trait StatsReporter: Send + Sync {
    /// 设置当前生效的凭据
    fn set_credentials(&self, address: &str, worker_name: &str, rig_group: &str);
}

/// 矿工进程监管
#[cfg_attr(any(test, feature = "mock"), automock)]
pub trait MinerSupervisor: Send + Sync {
    /// 重启所有矿工进程，使其使用新的凭据
    fn restart_miners(&self);
}

/// 外部导航（打开浏览器等）
#[cfg_attr(any(test, feature = "mock"), automock)]
pub trait Navigator: Send + Sync {
    fn open_url(&self, url: &str) -> Result<(), CoreError>;
}

/// 操作系统电源管理
#[cfg_attr(any(test, feature = "mock"), automock)]
pub trait PowerManagement: Send + Sync {
    /// 阻止显示器关闭和系统休眠
    fn prevent_sleep(&self);

    /// 允许显示器关闭和系统休眠
    fn allow_sleep(&self);
}

/// 周期任务句柄，按当前状态幂等
#[cfg_attr(any(test, feature = "mock"), automock)]
pub trait PeriodicTask: Send + Sync {
    fn start(&self);

    fn stop(&self);

    fn is_running(&self) -> bool;
}
