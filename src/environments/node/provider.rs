use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::core::provider::{normalize_catalog, Provider};
use crate::core::runtime::RuntimeKind;
use crate::error::{AemError, AemResult, ApiStage};
use crate::infrastructure::remote::{HttpTransport, Platform};

/// Rust 架构名 -> Node.js 发行包架构名
const ARCH_TABLE: &[(&str, &str)] = &[
    ("x86_64", "x64"),
    ("x86", "x86"),
    ("aarch64", "arm64"),
    ("arm", "armv7l"),
];

/// Rust 系统名 -> 下载文件名中的系统名
const OS_TABLE: &[(&str, &str)] = &[("windows", "win"), ("macos", "darwin"), ("linux", "linux")];

/// Rust 系统名 -> `index.json` 中 `files` 字段使用的系统名
const FILES_OS_TABLE: &[(&str, &str)] = &[("windows", "win"), ("macos", "osx"), ("linux", "linux")];

/// `index.json` 中的一条发行记录
#[derive(Debug, Deserialize)]
struct NodeRelease {
    version: String,
    #[serde(default)]
    files: Vec<String>,
}

/// Node.js 官方发行目录提供者
pub struct NodeProvider {
    mirror: String,
    platform: Platform,
    transport: Arc<dyn HttpTransport>,
}

impl NodeProvider {
    pub fn new(mirror: &str, platform: Platform, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            mirror: mirror.trim_end_matches('/').to_string(),
            platform,
            transport,
        }
    }

    fn index_url(&self) -> String {
        format!("{}/index.json", self.mirror)
    }

    async fn fetch_releases(&self) -> AemResult<Vec<NodeRelease>> {
        let url = self.index_url();
        let body = self.transport.get_text(&url).await?;
        serde_json::from_str(&body).map_err(|e| AemError::api(&url, ApiStage::Parse, e.to_string()))
    }
}

#[async_trait]
impl Provider for NodeProvider {
    fn kind(&self) -> RuntimeKind {
        RuntimeKind::Node
    }

    async fn catalog(&self, filter: Option<&str>) -> AemResult<Vec<String>> {
        let releases = self.fetch_releases().await?;
        Ok(normalize_catalog(
            self.kind(),
            releases.into_iter().map(|r| r.version),
            filter,
        ))
    }

    async fn download_url(&self, version: &str) -> AemResult<String> {
        let version = self.kind().canonical(version);
        let releases = self.fetch_releases().await?;
        let release = releases
            .iter()
            .find(|r| self.kind().canonical(&r.version) == version)
            .ok_or_else(|| AemError::not_found(format!("node {version} in {}", self.index_url())))?;

        let arch = self.platform.arch_in(ARCH_TABLE);
        let os = self.platform.os_in(OS_TABLE);
        let asset = format!("{}-{}-zip", self.platform.os_in(FILES_OS_TABLE), arch);
        if !release.files.is_empty() && !release.files.iter().any(|f| *f == asset) {
            return Err(AemError::not_found(format!(
                "node {version} ZIP archive for {} ({asset})",
                self.platform
            )));
        }

        Ok(format!("{}/{version}/node-{version}-{os}-{arch}.zip", self.mirror))
    }
}
