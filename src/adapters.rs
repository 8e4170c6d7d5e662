//! 命令行环境下的协作者实现
//!
//! 桌面界面、统计服务和矿工进程不在本仓库中，这里的实现只记录日志。

use rigctl_core::{
    CoreError, ExchangeRateSource, MinerSupervisor, Navigator, PowerManagement, StatsReporter,
};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

use crate::config::ExchangeConfig;

/// 把统计服务凭据写入日志
#[derive(Debug, Default)]
pub struct LoggingStatsReporter;

impl StatsReporter for LoggingStatsReporter {
    fn set_credentials(&self, payout_address: &str, worker_name: &str, rig_group: &str) {
        info!(
            "Stats credentials: address={}, worker={}, group={}",
            payout_address, worker_name, rig_group
        );
    }
}

/// 记录重启请求次数
#[derive(Debug, Default)]
pub struct LoggingMinerSupervisor {
    restarts: AtomicU64,
}

impl LoggingMinerSupervisor {
    pub fn restart_count(&self) -> u64 {
        self.restarts.load(Ordering::Relaxed)
    }
}

impl MinerSupervisor for LoggingMinerSupervisor {
    fn restart_miners(&self) {
        let count = self.restarts.fetch_add(1, Ordering::Relaxed) + 1;
        info!("Miner restart requested (#{})", count);
    }
}

/// 打印链接，由用户自行打开
#[derive(Debug, Default)]
pub struct PrintNavigator;

impl Navigator for PrintNavigator {
    fn open_url(&self, url: &str) -> Result<(), CoreError> {
        url::Url::parse(url).map_err(|e| CoreError::collaborator("navigator", e.to_string()))?;
        println!("{}", url);
        Ok(())
    }
}

/// 只记录防休眠请求
#[derive(Debug, Default)]
pub struct LoggingPowerManagement;

impl PowerManagement for LoggingPowerManagement {
    fn prevent_sleep(&self) {
        debug!("Prevent system sleep");
    }

    fn allow_sleep(&self) {
        debug!("Allow system sleep");
    }
}

/// 固定汇率
#[derive(Debug, Clone)]
pub struct FixedExchangeRates {
    usd_rate: f64,
    display_rate: f64,
    display_currency: String,
}

impl FixedExchangeRates {
    pub fn new<S: Into<String>>(usd_rate: f64, display_rate: f64, display_currency: S) -> Self {
        Self {
            usd_rate,
            display_rate,
            display_currency: display_currency.into(),
        }
    }

    pub fn from_config(config: &ExchangeConfig) -> Self {
        Self::new(
            config.usd_rate,
            config.display_rate,
            config.display_currency.clone(),
        )
    }
}

impl ExchangeRateSource for FixedExchangeRates {
    fn usd_exchange_rate(&self) -> f64 {
        self.usd_rate
    }

    fn convert_to_active_currency(&self, usd_amount: f64) -> f64 {
        usd_amount * self.display_rate
    }

    fn active_display_currency(&self) -> String {
        self.display_currency.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_rates() {
        let rates = FixedExchangeRates::new(20_000.0, 2.0, "EUR");
        assert_eq!(rates.usd_exchange_rate(), 20_000.0);
        assert_eq!(rates.convert_to_active_currency(10.0), 20.0);
        assert_eq!(rates.active_display_currency(), "EUR");
    }

    #[test]
    fn test_rates_from_default_config() {
        let rates = FixedExchangeRates::from_config(&ExchangeConfig::default());
        assert_eq!(rates.usd_exchange_rate(), 0.0);
        assert_eq!(rates.active_display_currency(), "USD");
    }

    #[test]
    fn test_navigator_rejects_garbage() {
        assert!(PrintNavigator.open_url("not a url").is_err());
        assert!(PrintNavigator.open_url("https://example.org/releases/").is_ok());
    }

    #[test]
    fn test_supervisor_counts_restarts() {
        let supervisor = LoggingMinerSupervisor::default();
        supervisor.restart_miners();
        supervisor.restart_miners();
        assert_eq!(supervisor.restart_count(), 2);
    }
}
