//! RigCtl-RS - 挖矿客户端应用状态核心
//!
//! 管理挖矿客户端的用户可变状态：
//! - 收款地址、矿工名、矿机分组及其有效性
//! - 服务地域和 stratum 地址
//! - 本地/在线版本和升级提示
//! - 余额及法币换算
//! - 挖矿会话的启停
//!
//! 所有修改通过 [`state::ApplicationState`] 完成，先写入并提交设置，
//! 再通过 [`notify::NotificationBus`] 按注册顺序通知观察者。

pub mod adapters;
pub mod config;
pub mod error;
pub mod logging;
pub mod mining;
pub mod notify;
pub mod state;
pub mod store;
pub mod stratum;
pub mod validation;

pub use config::Config;
pub use error::{ConfigError, StateError};
pub use notify::{NotificationBus, StateObserver, SubscriptionId};
pub use state::{ApplicationState, Collaborators};

/// 程序版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 程序名称
pub const NAME: &str = "rigctl-rs";
