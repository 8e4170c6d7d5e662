use rigctl_core::{Navigator, StateEvent};
use semver::{BuildMetadata, Version};
use std::cmp::Ordering;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use crate::config::VersionConfig;
use crate::error::{ConfigError, StateError};
use crate::notify::NotificationBus;
use crate::{state_info, state_warn};

/// 宽松解析版本号
///
/// 接受可选的 `v` 前缀，不足三段时补零：`"1.9"` → `1.9.0`。
/// 第四段作为修订号保存在构建元数据中：`"1.9.1.5"` → `1.9.1+5`。
pub fn parse_version(text: &str) -> Option<Version> {
    let text = text.trim();
    let text = text.strip_prefix('v').unwrap_or(text);

    if let Ok(version) = Version::parse(text) {
        return Some(version);
    }

    let mut parts: Vec<&str> = text.split('.').collect();
    if parts.len() > 4
        || parts
            .iter()
            .any(|part| part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()))
    {
        return None;
    }

    let revision = if parts.len() == 4 { parts.pop() } else { None };
    while parts.len() < 3 {
        parts.push("0");
    }

    let mut version = Version::parse(&parts.join(".")).ok()?;
    if let Some(revision) = revision {
        version.build = BuildMetadata::new(revision).ok()?;
    }
    Some(version)
}

/// 修订号，没有第四段时为 0
fn revision(version: &Version) -> u64 {
    version.build.as_str().parse().unwrap_or(0)
}

/// 按 major.minor.patch.revision 比较，忽略预发布标签
fn compare_release(local: &Version, online: &Version) -> Ordering {
    (local.major, local.minor, local.patch, revision(local)).cmp(&(
        online.major,
        online.minor,
        online.patch,
        revision(online),
    ))
}

/// 新版本提示文本
pub fn version_available_message(version: &str) -> String {
    format!(
        "IMPORTANT! New version v{} has\nbeen released. Click here to download it.",
        version
    )
}

/// 版本控制器
pub struct VersionController {
    local: String,
    local_version: Version,
    qualifier: String,
    releases_url: String,
    new_version_release_url: String,
    online: Mutex<Option<String>>,
    navigator: Arc<dyn Navigator>,
    bus: Arc<NotificationBus>,
}

impl VersionController {
    pub fn new(
        config: &VersionConfig,
        navigator: Arc<dyn Navigator>,
        bus: Arc<NotificationBus>,
    ) -> Result<Self, StateError> {
        let local = config.effective_local_version();
        let local_version = parse_version(&local).ok_or_else(|| ConfigError::InvalidValue {
            field: "version.local_version".to_string(),
            value: local.clone(),
            reason: "not a version number".to_string(),
        })?;

        Ok(Self {
            local,
            local_version,
            qualifier: config.prerelease_qualifier.trim().to_string(),
            releases_url: config.releases_url.clone(),
            new_version_release_url: config.new_version_release_url.clone(),
            online: Mutex::new(None),
            navigator,
            bus,
        })
    }

    pub fn local_version(&self) -> &str {
        &self.local
    }

    pub fn online_version(&self) -> Option<String> {
        self.lock_online().clone()
    }

    /// 标题文本，例如 `" v1.9.1 - Alpha"`
    pub fn title(&self) -> String {
        if self.qualifier.is_empty() {
            format!(" v{}", self.local)
        } else {
            format!(" v{} - {}", self.local, self.qualifier)
        }
    }

    /// 处理上报的在线版本，返回是否发布了升级提示
    ///
    /// 空字符串表示服务端没有给出版本。
    pub fn on_version_reported(&self, reported: &str) -> bool {
        let reported = reported.trim();
        let reported = (!reported.is_empty()).then(|| reported.to_string());

        let online = {
            let mut online = self.lock_online();
            if *online != reported {
                debug!("Online version updated: {:?}", reported);
                *online = reported;
            }
            online.clone()
        };

        let Some(online) = online else {
            return false;
        };

        let Some(online_version) = parse_version(&online) else {
            state_warn!("Ignoring unparseable online version '{}'", online);
            return false;
        };

        let upgrade = match compare_release(&self.local_version, &online_version) {
            Ordering::Less => true,
            Ordering::Equal => !self.qualifier.is_empty(),
            Ordering::Greater => false,
        };

        if !upgrade {
            debug!("Local version {} is up to date (online {})", self.local, online);
            return false;
        }

        state_info!("New version available: {} (local {})", online, self.local);
        self.bus.publish(StateEvent::VersionAvailable {
            message: version_available_message(&online),
        });
        true
    }

    /// 升级下载地址，已知在线版本时指向具体版本
    pub fn upgrade_url(&self) -> String {
        match self.online_version() {
            Some(online) => format!("{}{}", self.new_version_release_url, online),
            None => self.releases_url.clone(),
        }
    }

    /// 打开升级下载页面，导航失败只记录日志
    pub fn request_upgrade_navigation(&self) -> String {
        let url = self.upgrade_url();
        match self.navigator.open_url(&url) {
            Ok(()) => debug!("Opened upgrade page {}", url),
            Err(e) => state_warn!("Failed to open upgrade page {}: {}", url, e),
        }
        url
    }

    fn lock_online(&self) -> MutexGuard<'_, Option<String>> {
        match self.online.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
