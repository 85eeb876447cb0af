use log::info;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::core::runtime::RuntimeKind;
use crate::core::service::RuntimeService;
use crate::error::{AemError, AemResult};
use crate::infrastructure::config::Config;

/// 项目运行时声明文件（`aem.json`）
///
/// 未识别的字段（如 `android`）会被忽略。
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectFile {
    #[serde(default)]
    pub node: Option<String>,
    #[serde(default)]
    pub jdk: Option<String>,
}

impl ProjectFile {
    pub fn load(path: &Path) -> AemResult<Self> {
        if !path.exists() {
            return Err(AemError::validation(
                "file",
                format!("project file {} not found", path.display()),
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| AemError::fs("read", path, e))?;
        serde_json::from_str(&content).map_err(|e| {
            AemError::validation("file", format!("{} is not a valid project file: {e}", path.display()))
        })
    }

    /// 按 node、java 顺序列出声明的版本，跳过空值
    pub fn requested(&self) -> Vec<(RuntimeKind, String)> {
        [
            (RuntimeKind::Node, self.node.as_deref()),
            (RuntimeKind::Java, self.jdk.as_deref()),
        ]
        .into_iter()
        .filter_map(|(kind, version)| {
            let version = version.map(str::trim).filter(|v| !v.is_empty())?;
            Some((kind, version.to_string()))
        })
        .collect()
    }
}

/// 依次安装并启用项目声明的运行时，返回 (运行时, 启用的版本)
pub async fn apply_project(
    project: &ProjectFile,
    services: &[&RuntimeService],
    config: &Config,
) -> AemResult<Vec<(RuntimeKind, String)>> {
    let requested = project.requested();
    if requested.is_empty() {
        info!("project file declares no runtimes");
    }

    let mut applied = Vec::new();
    for (kind, version) in requested {
        let service = services
            .iter()
            .find(|s| s.kind() == kind)
            .ok_or_else(|| AemError::validation("module", format!("no service registered for {kind}")))?;

        let installed = service.install(&version).await?;
        let active = service.use_version(&installed, config.symlink_for(kind))?;
        applied.push((kind, active));
    }
    Ok(applied)
}
