use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::constants::{env_vars, paths, remote};
use crate::core::runtime::RuntimeKind;
use crate::error::{AemError, AemResult};

/// 配置文件结构（`<home>/config.toml`）
#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    symlinks: Symlinks,
    #[serde(default)]
    mirrors: Mirrors,
    #[serde(default)]
    debug: Option<bool>,
}

/// 激活符号链接路径
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Symlinks {
    #[serde(default)]
    pub node: Option<PathBuf>,
    #[serde(default)]
    pub java: Option<PathBuf>,
}

/// 远程目录地址
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mirrors {
    #[serde(default = "default_node_mirror")]
    pub node: String,
    #[serde(default = "default_java_mirror")]
    pub java: String,
}

fn default_node_mirror() -> String {
    remote::NODE_MIRROR.to_string()
}

fn default_java_mirror() -> String {
    remote::JAVA_MIRROR.to_string()
}

impl Default for Mirrors {
    fn default() -> Self {
        Self {
            node: default_node_mirror(),
            java: default_java_mirror(),
        }
    }
}

/// 运行配置，启动时加载一次后显式传入各组件
#[derive(Debug, Clone)]
pub struct Config {
    pub home: PathBuf,
    pub symlinks: Symlinks,
    pub mirrors: Mirrors,
    pub debug: bool,
}

impl Config {
    /// 以指定主目录创建默认配置
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            symlinks: Symlinks::default(),
            mirrors: Mirrors::default(),
            debug: false,
        }
    }

    /// 从进程环境变量和配置文件加载
    pub fn load() -> AemResult<Self> {
        Self::load_with(|key| env::var(key).ok())
    }

    /// 使用给定的环境变量查找函数加载配置
    ///
    /// 优先级：环境变量 > 配置文件 > 默认值。
    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> AemResult<Self> {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let home = match lookup(env_vars::HOME) {
            Some(home) => PathBuf::from(home),
            None => dirs::home_dir()
                .map(|dir| dir.join(paths::HOME_DIR_NAME))
                .ok_or_else(|| AemError::Config {
                    path: PathBuf::from(paths::HOME_DIR_NAME),
                    reason: format!("cannot determine user home directory, set {}", env_vars::HOME),
                })?,
        };

        let file = read_config_file(&home.join(paths::CONFIG_FILE))?;

        let symlinks = Symlinks {
            node: lookup(env_vars::NODE_SYMLINK)
                .map(PathBuf::from)
                .or(file.symlinks.node),
            java: lookup(env_vars::JAVA_SYMLINK)
                .map(PathBuf::from)
                .or(file.symlinks.java),
        };

        let debug = lookup(env_vars::DEBUG)
            .map(|value| parse_flag(&value))
            .or(file.debug)
            .unwrap_or(false);

        Ok(Self {
            home,
            symlinks,
            mirrors: file.mirrors,
            debug,
        })
    }

    /// 已安装版本的根目录
    pub fn install_root(&self) -> PathBuf {
        self.home.join(paths::INSTALL_DIR)
    }

    /// 下载和解压的临时目录
    pub fn temp_root(&self) -> PathBuf {
        self.home.join(paths::TEMP_DIR)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.home.join(paths::SETTINGS_FILE)
    }

    pub fn config_path(&self) -> PathBuf {
        self.home.join(paths::CONFIG_FILE)
    }

    /// 指定运行时的激活符号链接路径
    pub fn symlink_for(&self, kind: RuntimeKind) -> Option<&Path> {
        match kind {
            RuntimeKind::Node => self.symlinks.node.as_deref(),
            RuntimeKind::Java => self.symlinks.java.as_deref(),
        }
    }

    pub fn mirror_for(&self, kind: RuntimeKind) -> &str {
        match kind {
            RuntimeKind::Node => &self.mirrors.node,
            RuntimeKind::Java => &self.mirrors.java,
        }
    }
}

fn read_config_file(path: &Path) -> AemResult<ConfigFile> {
    if !path.exists() {
        return Ok(ConfigFile::default());
    }

    let content = fs::read_to_string(path).map_err(|e| AemError::fs("read", path, e))?;
    toml::from_str(&content).map_err(|e| AemError::Config {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
