use log::{debug, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{AemError, AemResult};

/// 文件系统网关
///
/// 已安装版本目录和激活符号链接只通过这里写入。
pub struct FileSystem;

impl FileSystem {
    /// 确保目录存在
    pub fn ensure_dir(path: &Path) -> AemResult<()> {
        fs::create_dir_all(path).map_err(|e| AemError::fs("create directory", path, e))
    }

    /// 按文件系统枚举顺序列出子目录名称，创建缺失的根目录，跳过隐藏项
    pub fn list_dirs(root: &Path) -> AemResult<Vec<String>> {
        Self::ensure_dir(root)?;

        let entries = fs::read_dir(root).map_err(|e| AemError::fs("read directory", root, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| AemError::fs("read directory", root, e))?;
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    debug!("skipping non UTF-8 entry {:?} in {}", raw, root.display());
                    continue;
                }
            };
            if name.starts_with('.') || !entry.path().is_dir() {
                continue;
            }
            names.push(name);
        }
        Ok(names)
    }

    /// 递归删除目录
    pub fn remove_dir_all(path: &Path) -> AemResult<()> {
        fs::remove_dir_all(path).map_err(|e| AemError::fs("remove", path, e))
    }

    /// 将 `source` 目录移动到 `dest`，替换已有目录
    ///
    /// 已有目录先改名为同级备份，新目录就位后删除备份；就位失败时恢复备份。
    pub fn replace_dir(source: &Path, dest: &Path) -> AemResult<()> {
        let backup = if dest.exists() {
            let backup = Self::backup_path(dest);
            fs::rename(dest, &backup).map_err(|e| AemError::fs("move aside", dest, e))?;
            debug!("moved existing {} to {}", dest.display(), backup.display());
            Some(backup)
        } else {
            None
        };

        if let Err(e) = fs::rename(source, dest) {
            if let Some(backup) = &backup {
                if let Err(restore) = fs::rename(backup, dest) {
                    warn!(
                        "failed to restore {} from {}: {}",
                        dest.display(),
                        backup.display(),
                        restore
                    );
                }
            }
            return Err(AemError::fs("move into place", dest, e));
        }

        if let Some(backup) = backup {
            if let Err(e) = fs::remove_dir_all(&backup) {
                warn!("failed to remove backup {}: {}", backup.display(), e);
            }
        }
        Ok(())
    }

    /// 重建指向 `target` 的目录符号链接
    ///
    /// 已有链接先删除；`link` 若是普通文件或目录则拒绝覆盖。
    pub fn replace_symlink(link: &Path, target: &Path) -> AemResult<()> {
        let target = fs::canonicalize(target).map_err(|e| AemError::fs("resolve", target, e))?;

        match fs::symlink_metadata(link) {
            Ok(meta) if meta.file_type().is_symlink() => {
                Self::remove_symlink(link)?;
            }
            Ok(_) => {
                return Err(AemError::fs(
                    "replace symlink",
                    link,
                    io::Error::new(io::ErrorKind::AlreadyExists, "path exists and is not a symlink"),
                ));
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(AemError::fs("inspect", link, e)),
        }

        if let Some(parent) = link.parent().filter(|p| !p.as_os_str().is_empty()) {
            Self::ensure_dir(parent)?;
        }

        create_dir_symlink(&target, link).map_err(|e| AemError::fs("create symlink", link, e))?;
        debug!("linked {} -> {}", link.display(), target.display());
        Ok(())
    }

    fn remove_symlink(link: &Path) -> AemResult<()> {
        // Windows 的目录链接需要 remove_dir
        fs::remove_file(link)
            .or_else(|_| fs::remove_dir(link))
            .map_err(|e| AemError::fs("remove symlink", link, e))
    }

    fn backup_path(dest: &Path) -> PathBuf {
        let name = dest
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        dest.with_file_name(format!(".{}.bak-{}", name, uuid::Uuid::new_v4().simple()))
    }
}

#[cfg(unix)]
fn create_dir_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_dir_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}
