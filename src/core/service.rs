use log::{debug, info, warn};
use serde::Serialize;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use url::Url;

use crate::core::constants::display::{ACTIVE_MARKER, INACTIVE_MARKER};
use crate::core::provider::Provider;
use crate::core::runtime::{bare_version, same_version, version_candidates, RuntimeKind};
use crate::error::{AemError, AemResult};
use crate::infrastructure::archive::{extract_zip, single_top_level_dir};
use crate::infrastructure::config::Config;
use crate::infrastructure::filesystem::FileSystem;
use crate::infrastructure::remote::HttpTransport;
use crate::infrastructure::settings::SettingsStore;

/// 已安装的版本
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledVersion {
    /// 安装目录名称
    pub version: String,
    pub active: bool,
}

impl fmt::Display for InstalledVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.active { ACTIVE_MARKER } else { INACTIVE_MARKER };
        write!(f, "{marker}{}", self.version)
    }
}

/// 单个运行时的安装 / 启用 / 列表 / 卸载流程
pub struct RuntimeService {
    kind: RuntimeKind,
    install_root: PathBuf,
    temp_root: PathBuf,
    provider: Arc<dyn Provider>,
    transport: Arc<dyn HttpTransport>,
    settings: Arc<SettingsStore>,
}

impl RuntimeService {
    pub fn new(
        kind: RuntimeKind,
        config: &Config,
        provider: Arc<dyn Provider>,
        transport: Arc<dyn HttpTransport>,
        settings: Arc<SettingsStore>,
    ) -> Self {
        Self {
            kind,
            install_root: config.install_root().join(kind.as_str()),
            temp_root: config.temp_root(),
            provider,
            transport,
            settings,
        }
    }

    pub fn kind(&self) -> RuntimeKind {
        self.kind
    }

    /// `<install-root>/<kind>`
    pub fn install_root(&self) -> &Path {
        &self.install_root
    }

    /// 查找已安装目录，依次尝试原样、带前缀、不带前缀的名称
    ///
    /// 只接受安装根目录下的直接子目录。
    pub fn find_installed(&self, version: &str) -> Option<(String, PathBuf)> {
        version_candidates(version)
            .into_iter()
            .filter(|name| is_plain_name(name))
            .find_map(|name| {
                let path = self.install_root.join(&name);
                let inside = path.parent() == Some(self.install_root.as_path());
                (inside && path.is_dir()).then_some((name, path))
            })
    }

    /// 安装版本，返回规范版本号
    ///
    /// 请求可以是完整版本或前缀（如 `18`），前缀时选择远程目录中最高的匹配版本。
    pub async fn install(&self, requested: &str) -> AemResult<String> {
        let requested = self.kind.validate_request(requested)?;

        if let Some((name, _)) = self.find_installed(&requested) {
            info!("{} {} is already installed", self.kind, name);
            return Ok(self.kind.canonical(&name));
        }

        let resolved = self.resolve_latest(&requested).await?;
        let target = self.install_root.join(self.kind.dir_name(&resolved));
        if target.is_dir() {
            info!("{} {} is already installed", self.kind, resolved);
            return Ok(resolved);
        }

        let url = self.provider.download_url(&resolved).await?;
        info!("installing {} {} from {}", self.kind, resolved, url);

        FileSystem::ensure_dir(&self.temp_root)?;
        // 离开作用域时删除下载包和解压目录，无论成功与否
        let scratch = tempfile::Builder::new()
            .prefix(&format!("{}-", self.kind))
            .tempdir_in(&self.temp_root)
            .map_err(|e| AemError::fs("create scratch directory", &self.temp_root, e))?;

        let archive = scratch.path().join(archive_file_name(&url));
        let bytes = self.transport.download(&url, &archive).await?;
        debug!("downloaded {} bytes to {}", bytes, archive.display());

        let extract_dir = scratch.path().join("extract");
        extract_zip(&archive, &extract_dir)?;
        let root = single_top_level_dir(&extract_dir)?;

        FileSystem::ensure_dir(&self.install_root)?;
        FileSystem::replace_dir(&root, &target)?;

        info!("installed {} {} to {}", self.kind, resolved, target.display());
        Ok(resolved)
    }

    /// 在远程目录中选择满足请求的最高版本
    async fn resolve_latest(&self, requested: &str) -> AemResult<String> {
        let catalog = self.provider.catalog(Some(requested)).await?;
        catalog
            .into_iter()
            .filter(|candidate| self.kind.matches_request(candidate, requested))
            .max_by(|a, b| self.kind.compare(a, b))
            .ok_or_else(|| AemError::not_found(format!("{} version matching '{}'", self.kind, requested)))
    }

    /// 启用已安装版本：重建符号链接并记录到设置，返回记录的版本号
    pub fn use_version(&self, version: &str, link: Option<&Path>) -> AemResult<String> {
        let version = self.kind.validate_request(version)?;
        let (name, dir) = self.find_installed(&version).ok_or_else(|| {
            AemError::validation(
                "version",
                format!("{} {} is not installed, install it first", self.kind, version),
            )
        })?;

        let link = link.filter(|p| !p.as_os_str().is_empty()).ok_or_else(|| {
            AemError::validation(
                "symlink",
                format!(
                    "no symlink path configured for {}, set {}",
                    self.kind,
                    self.kind.symlink_env_var()
                ),
            )
        })?;

        FileSystem::replace_symlink(link, &dir)?;
        info!("{} now points to {}", link.display(), dir.display());

        let active = bare_version(&name).to_string();
        if let Err(e) = self.settings.set_current(self.kind, &active) {
            warn!("failed to record active {} version {}: {}", self.kind, active, e);
        }
        Ok(active)
    }

    /// 按文件系统枚举顺序列出已安装版本，并标记当前激活的版本
    pub fn list(&self) -> AemResult<Vec<InstalledVersion>> {
        let names = FileSystem::list_dirs(&self.install_root)?;
        let current = self.settings.current(self.kind)?;

        Ok(names
            .into_iter()
            .map(|version| {
                let active = current.as_deref().is_some_and(|c| same_version(c, &version));
                InstalledVersion { version, active }
            })
            .collect())
    }

    /// 带三字符标记的列表行
    pub fn list_marked(&self) -> AemResult<Vec<String>> {
        Ok(self.list()?.iter().map(ToString::to_string).collect())
    }

    /// 当前激活的版本
    pub fn current(&self) -> AemResult<Option<String>> {
        self.settings.current(self.kind)
    }

    /// 卸载版本，返回是否实际删除了目录
    ///
    /// 当前激活的版本拒绝卸载；未安装的版本视为成功。
    pub fn uninstall(&self, version: &str) -> AemResult<bool> {
        let version = self.kind.validate_request(version)?;
        let version = version.as_str();

        if let Some(active) = self.settings.current(self.kind)? {
            if same_version(&active, version) {
                return Err(AemError::UninstallRefused {
                    kind: self.kind,
                    version: version.to_string(),
                });
            }
        }

        let Some((name, dir)) = self.find_installed(version) else {
            warn!("{} {} is not installed, nothing to remove", self.kind, version);
            return Ok(false);
        };

        FileSystem::remove_dir_all(&dir)?;
        info!("removed {} {}", self.kind, name);

        self.reconcile_active();
        Ok(true)
    }

    /// 激活记录指向的目录不存在时清除记录
    fn reconcile_active(&self) {
        match self.settings.current(self.kind) {
            Ok(Some(active)) if self.find_installed(&active).is_none() => {
                match self.settings.clear_current(self.kind) {
                    Ok(()) => info!("cleared stale active {} version {}", self.kind, active),
                    Err(e) => warn!("failed to clear active {} version {}: {}", self.kind, active, e),
                }
            }
            Ok(_) => {}
            Err(e) => warn!("failed to read active {} version: {}", self.kind, e),
        }
    }
}

/// 单个普通路径分量（不含分隔符、`.`、`..` 或根）
fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn archive_file_name(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.path_segments()?.last().map(str::to_string))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "archive.zip".to_string())
}
