//! 通用设置存储

use rigctl_core::{ConfigStore, CoreError, CredentialField, GeneralSettings};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};
use uuid::Uuid;

fn read_settings(lock: &RwLock<GeneralSettings>) -> RwLockReadGuard<'_, GeneralSettings> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn write_settings(lock: &RwLock<GeneralSettings>) -> RwLockWriteGuard<'_, GeneralSettings> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// 内存存储，`commit` 只计数
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    settings: RwLock<GeneralSettings>,
    commits: AtomicU64,
}

impl MemoryConfigStore {
    pub fn new(settings: GeneralSettings) -> Self {
        Self {
            settings: RwLock::new(settings),
            commits: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> GeneralSettings {
        read_settings(&self.settings).clone()
    }

    pub fn commit_count(&self) -> u64 {
        self.commits.load(Ordering::SeqCst)
    }
}

impl ConfigStore for MemoryConfigStore {
    fn credential(&self, field: CredentialField) -> String {
        read_settings(&self.settings).credential(field).to_string()
    }

    fn set_credential(&self, field: CredentialField, value: &str) {
        write_settings(&self.settings).set_credential(field, value);
    }

    fn service_location(&self) -> usize {
        read_settings(&self.settings).service_location
    }

    fn set_service_location(&self, index: usize) {
        write_settings(&self.settings).service_location = index;
    }

    fn commit(&self) -> Result<(), CoreError> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// TOML 文件存储
///
/// 提交串行执行：快照、写入和重命名都在提交锁内完成，
/// 因此文件中总是最后一次提交时的完整设置。
#[derive(Debug)]
pub struct TomlConfigStore {
    path: PathBuf,
    settings: RwLock<GeneralSettings>,
    commit_lock: Mutex<()>,
}

impl TomlConfigStore {
    /// 打开设置文件，文件不存在时使用默认设置
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CoreError> {
        let path = path.as_ref().to_path_buf();
        let settings = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let settings = GeneralSettings::from_toml(&content)?;
            info!("Loaded settings from {}", path.display());
            settings
        } else {
            debug!("Settings file {} not found, using defaults", path.display());
            GeneralSettings::default()
        };

        Ok(Self {
            path,
            settings: RwLock::new(settings),
            commit_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn snapshot(&self) -> GeneralSettings {
        read_settings(&self.settings).clone()
    }
}

impl ConfigStore for TomlConfigStore {
    fn credential(&self, field: CredentialField) -> String {
        read_settings(&self.settings).credential(field).to_string()
    }

    fn set_credential(&self, field: CredentialField, value: &str) {
        write_settings(&self.settings).set_credential(field, value);
    }

    fn service_location(&self) -> usize {
        read_settings(&self.settings).service_location
    }

    fn set_service_location(&self, index: usize) {
        write_settings(&self.settings).service_location = index;
    }

    fn commit(&self) -> Result<(), CoreError> {
        let _guard = match self.commit_lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let content = self.snapshot().to_toml()?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // 先写临时文件再重命名，避免留下半写入的设置文件
        let tmp_path = self
            .path
            .with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
        std::fs::write(&tmp_path, content)?;
        std::fs::rename(&tmp_path, &self.path)?;

        debug!("Committed settings to {}", self.path.display());
        Ok(())
    }
}
