use log::debug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{AemError, AemResult};

/// 将 ZIP 压缩包解压到 `dest_dir`，返回写出的文件数
///
/// 任何解析后会落到 `dest_dir` 之外的条目（绝对路径或 `..` 越界）都会使整个解压失败。
pub fn extract_zip(zip_path: &Path, dest_dir: &Path) -> AemResult<usize> {
    let file = fs::File::open(zip_path).map_err(|e| AemError::fs("open", zip_path, e))?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| AemError::extraction(zip_path, format!("invalid ZIP archive: {e}")))?;

    fs::create_dir_all(dest_dir).map_err(|e| AemError::fs("create directory", dest_dir, e))?;

    let mut files = 0;
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| AemError::extraction(zip_path, format!("cannot read entry {i}: {e}")))?;

        let Some(relative) = entry.enclosed_name().map(Path::to_path_buf) else {
            return Err(AemError::extraction(
                zip_path,
                format!("illegal file path '{}' escapes the extraction root", entry.name()),
            ));
        };
        let out_path = dest_dir.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|e| AemError::fs("create directory", &out_path, e))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| AemError::fs("create directory", parent, e))?;
        }
        let mut outfile = fs::File::create(&out_path).map_err(|e| AemError::fs("create", &out_path, e))?;
        io::copy(&mut entry, &mut outfile).map_err(|e| AemError::fs("write", &out_path, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&out_path, fs::Permissions::from_mode(mode))
                    .map_err(|e| AemError::fs("set permissions", &out_path, e))?;
            }
        }

        files += 1;
    }

    debug!("extracted {} files from {} into {}", files, zip_path.display(), dest_dir.display());
    Ok(files)
}

/// 返回解压目录下唯一的顶层目录
///
/// 平铺结构或多个顶层条目都视为无效压缩包。
pub fn single_top_level_dir(extract_dir: &Path) -> AemResult<PathBuf> {
    let entries = fs::read_dir(extract_dir).map_err(|e| AemError::fs("read directory", extract_dir, e))?;
    let mut roots = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| AemError::fs("read directory", extract_dir, e))?;
        roots.push(entry.path());
    }

    match roots.as_slice() {
        [root] if root.is_dir() => Ok(root.clone()),
        [root] => Err(AemError::extraction(
            extract_dir,
            format!("top-level entry '{}' is not a directory", root.display()),
        )),
        _ => Err(AemError::extraction(
            extract_dir,
            format!("expected exactly one top-level directory, found {} entries", roots.len()),
        )),
    }
}
