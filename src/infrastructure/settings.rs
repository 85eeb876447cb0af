use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use crate::core::runtime::{bare_version, RuntimeKind};
use crate::error::{AemError, AemResult};

/// 当前激活版本记录（`versions.json`）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub java: Option<String>,
}

impl Settings {
    /// 获取指定运行时的激活版本，空字符串视为未设置
    pub fn get(&self, kind: RuntimeKind) -> Option<&str> {
        let value = match kind {
            RuntimeKind::Node => self.node.as_deref(),
            RuntimeKind::Java => self.java.as_deref(),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    pub fn set(&mut self, kind: RuntimeKind, value: Option<String>) {
        match kind {
            RuntimeKind::Node => self.node = value,
            RuntimeKind::Java => self.java = value,
        }
    }
}

/// 基于 JSON 文件的设置存储，读改写过程由单个读写锁保护
///
/// 锁只在进程内生效，多个进程同时写入时以最后写入者为准。
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取全部设置，文件不存在时返回默认值
    pub fn load(&self) -> AemResult<Settings> {
        let _guard = self.lock.read().unwrap_or_else(PoisonError::into_inner);
        self.read_unlocked()
    }

    /// 当前激活版本（不带前缀）
    pub fn current(&self, kind: RuntimeKind) -> AemResult<Option<String>> {
        Ok(self.load()?.get(kind).map(str::to_string))
    }

    /// 记录激活版本，统一保存为不带前缀的形式
    pub fn set_current(&self, kind: RuntimeKind, version: &str) -> AemResult<()> {
        let version = bare_version(version).to_string();
        self.update(|settings| settings.set(kind, Some(version)))
    }

    /// 清除激活版本
    pub fn clear_current(&self, kind: RuntimeKind) -> AemResult<()> {
        self.update(|settings| settings.set(kind, None))
    }

    fn update(&self, apply: impl FnOnce(&mut Settings)) -> AemResult<()> {
        let _guard = self.lock.write().unwrap_or_else(PoisonError::into_inner);
        let mut settings = self.read_unlocked()?;
        apply(&mut settings);
        self.write_unlocked(&settings)
    }

    fn read_unlocked(&self) -> AemResult<Settings> {
        if !self.path.exists() {
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| AemError::fs("read", &self.path, e))?;
        if content.trim().is_empty() {
            return Ok(Settings::default());
        }

        serde_json::from_str(&content).map_err(|e| AemError::settings(&self.path, e))
    }

    fn write_unlocked(&self, settings: &Settings) -> AemResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| AemError::fs("create directory", parent, e))?;
        }

        let content = serde_json::to_string_pretty(settings).map_err(|e| AemError::settings(&self.path, e))?;

        // 先写临时文件再重命名
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, content).map_err(|e| AemError::fs("write", &staging, e))?;
        fs::rename(&staging, &self.path).map_err(|e| AemError::fs("replace", &self.path, e))
    }
}
