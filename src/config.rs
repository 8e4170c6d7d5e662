use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::state::version::parse_version;


#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "rigctl.toml")]
    pub config: String,

    /// Settings file path (overrides general.settings_file)
    #[arg(short, long)]
    pub settings: Option<String>,

    /// Enable debug mode
    #[arg(short, long)]
    pub debug: bool,

    /// Log level (overrides general.log_level)
    #[arg(long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Show current credentials, validity and service location
    Show,
    /// Set the payout address
    SetAddress {
        value: String,
        /// Do not push the credentials to the statistics service
        #[arg(long)]
        skip_reset: bool,
    },
    /// Set the worker name
    SetWorker {
        value: String,
        #[arg(long)]
        skip_reset: bool,
    },
    /// Set the rig group
    SetGroup {
        value: String,
        #[arg(long)]
        skip_reset: bool,
    },
    /// Select the service location by index
    SetLocation {
        #[arg(allow_negative_numbers = true)]
        index: i64,
    },
    /// Print the stratum URL for an algorithm at the selected location
    Url {
        algorithm: String,
        #[arg(long)]
        ssl: bool,
    },
    /// Start a mining session and run until Ctrl-C
    Run {
        /// Start even when the credentials are invalid
        #[arg(long)]
        demo: bool,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub version: VersionConfig,
    pub service: ServiceConfig,
    pub session: SessionConfig,
    pub exchange: ExchangeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    /// 凭据和服务位置的持久化文件
    pub settings_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionConfig {
    /// 本地版本，未设置时使用编译时版本
    pub local_version: Option<String>,
    /// 预发布限定符，如 "Alpha"；非空时同号在线版本也视为可升级
    pub prerelease_qualifier: String,
    pub releases_url: String,
    pub new_version_release_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub host_suffix: String,
    pub locations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub stats_poll_secs: u64,
    pub device_poll_secs: u64,
    pub sleep_guard_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    /// BTC → USD
    pub usd_rate: f64,
    /// USD → 显示货币
    pub display_rate: f64,
    pub display_currency: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file: None,
            settings_file: PathBuf::from("rigctl-settings.toml"),
        }
    }
}

impl Default for VersionConfig {
    fn default() -> Self {
        Self {
            local_version: None,
            prerelease_qualifier: "Alpha".to_string(),
            releases_url: "https://github.com/your-org/rigctl-rs/releases/".to_string(),
            new_version_release_url: "https://github.com/your-org/rigctl-rs/releases/tag/"
                .to_string(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host_suffix: "nicehash.com".to_string(),
            locations: ["eu", "usa", "hk", "jp", "in", "br"]
                .iter()
                .map(|location| location.to_string())
                .collect(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            stats_poll_secs: 5,
            device_poll_secs: 60,
            sleep_guard_secs: 20,
        }
    }
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            usd_rate: 0.0,
            display_rate: 1.0,
            display_currency: "USD".to_string(),
        }
    }
}

impl SessionConfig {
    pub fn stats_poll_interval(&self) -> Duration {
        Duration::from_secs(self.stats_poll_secs)
    }

    pub fn device_poll_interval(&self) -> Duration {
        Duration::from_secs(self.device_poll_secs)
    }

    pub fn sleep_guard_interval(&self) -> Duration {
        Duration::from_secs(self.sleep_guard_secs)
    }
}

impl Args {
    /// 生效的日志级别：`--debug` > `--log-level` > 配置文件
    pub fn effective_log_level(&self, general: &GeneralConfig) -> String {
        if self.debug {
            "debug".to_string()
        } else {
            self.log_level
                .clone()
                .unwrap_or_else(|| general.log_level.clone())
        }
    }
}

impl VersionConfig {
    /// 生效的本地版本字符串
    pub fn effective_local_version(&self) -> String {
        self.local_version
            .clone()
            .unwrap_or_else(|| crate::VERSION.to_string())
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let config_content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&config_content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        config.validate()?;

        Ok(config)
    }

    /// 配置文件不存在时使用默认配置
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            tracing::warn!("Config file {} not found, using defaults", path);
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let config_content = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(path, config_content)
            .with_context(|| format!("Failed to write config file: {}", path))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        // 验证版本配置
        let local = self.version.effective_local_version();
        if parse_version(&local).is_none() {
            anyhow::bail!("Local version '{}' is not a valid version", local);
        }

        url::Url::parse(&self.version.releases_url)
            .with_context(|| format!("Invalid releases URL: {}", self.version.releases_url))?;
        url::Url::parse(&self.version.new_version_release_url).with_context(|| {
            format!(
                "Invalid new version release URL: {}",
                self.version.new_version_release_url
            )
        })?;

        // 验证服务位置配置
        if self.service.locations.is_empty() {
            anyhow::bail!("At least one service location must be configured");
        }

        if self.service.host_suffix.trim().is_empty() {
            anyhow::bail!("Service host suffix cannot be empty");
        }

        for location in &self.service.locations {
            if location.trim().is_empty() || location.contains('.') {
                anyhow::bail!("Service location '{}' is not a valid host label", location);
            }
        }

        // 验证会话周期
        if self.session.stats_poll_secs == 0 {
            anyhow::bail!("Session stats_poll_secs must be greater than 0");
        }
        if self.session.device_poll_secs == 0 {
            anyhow::bail!("Session device_poll_secs must be greater than 0");
        }
        if self.session.sleep_guard_secs == 0 {
            anyhow::bail!("Session sleep_guard_secs must be greater than 0");
        }

        // 验证汇率
        if !self.exchange.usd_rate.is_finite() || self.exchange.usd_rate < 0.0 {
            anyhow::bail!("Exchange usd_rate {} is out of range", self.exchange.usd_rate);
        }
        if !self.exchange.display_rate.is_finite() || self.exchange.display_rate <= 0.0 {
            anyhow::bail!(
                "Exchange display_rate {} is out of range",
                self.exchange.display_rate
            );
        }
        if self.exchange.display_currency.trim().is_empty() {
            anyhow::bail!("Exchange display_currency cannot be empty");
        }

        Ok(())
    }

    /// 应用环境变量覆盖: RIGCTL_LOG_LEVEL, RIGCTL_LOG_FILE, RIGCTL_SETTINGS_FILE
    pub fn apply_environment_overrides(&mut self) {
        if let Ok(level) = std::env::var("RIGCTL_LOG_LEVEL") {
            self.general.log_level = level;
        }
        if let Ok(file) = std::env::var("RIGCTL_LOG_FILE") {
            self.general.log_file = Some(PathBuf::from(file));
        }
        if let Ok(file) = std::env::var("RIGCTL_SETTINGS_FILE") {
            self.general.settings_file = PathBuf::from(file);
        }
    }

    /// 检查配置是否有效
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}
