use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use url::Url;

use crate::core::provider::{normalize_catalog, Provider};
use crate::core::runtime::{bare_version, RuntimeKind};
use crate::error::{AemError, AemResult, ApiStage};
use crate::infrastructure::remote::{HttpTransport, Platform};

/// Rust 架构名 -> Azul API 架构名
const ARCH_TABLE: &[(&str, &str)] = &[
    ("x86_64", "x64"),
    ("x86", "x86"),
    ("aarch64", "aarch64"),
    ("arm", "arm"),
];

/// Rust 系统名 -> Azul API 系统名
const OS_TABLE: &[(&str, &str)] = &[("windows", "windows"), ("macos", "macos"), ("linux", "linux")];

/// Azul 元数据 API 返回的包信息
#[derive(Debug, Deserialize)]
struct ZuluPackage {
    java_version: Vec<u64>,
    download_url: String,
}

impl ZuluPackage {
    fn version(&self) -> String {
        self.java_version
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Azul Zulu JDK 提供者
pub struct JavaProvider {
    mirror: String,
    platform: Platform,
    transport: Arc<dyn HttpTransport>,
}

impl JavaProvider {
    pub fn new(mirror: &str, platform: Platform, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            mirror: mirror.to_string(),
            platform,
            transport,
        }
    }

    /// 构造包查询地址，`java_version` 交给服务端预过滤
    fn packages_url(&self, java_version: Option<&str>) -> AemResult<String> {
        let mut url = Url::parse(&self.mirror)
            .map_err(|e| AemError::validation("mirrors.java", format!("'{}': {e}", self.mirror)))?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("archive_type", "zip")
                .append_pair("arch", self.platform.arch_in(ARCH_TABLE))
                .append_pair("os", self.platform.os_in(OS_TABLE))
                .append_pair("java_package_type", "jdk")
                .append_pair("page_size", "1000")
                .append_pair("availability_type", "CA")
                .append_pair("javafx_bundled", "false");
            if let Some(version) = java_version.map(bare_version).filter(|v| !v.is_empty()) {
                query.append_pair("java_version", version);
            }
        }
        Ok(url.into())
    }

    async fn fetch_packages(&self, java_version: Option<&str>) -> AemResult<Vec<ZuluPackage>> {
        let url = self.packages_url(java_version)?;
        let body = self.transport.get_text(&url).await?;
        serde_json::from_str(&body).map_err(|e| AemError::api(&url, ApiStage::Parse, e.to_string()))
    }
}

#[async_trait]
impl Provider for JavaProvider {
    fn kind(&self) -> RuntimeKind {
        RuntimeKind::Java
    }

    async fn catalog(&self, filter: Option<&str>) -> AemResult<Vec<String>> {
        let packages = self.fetch_packages(filter).await?;
        Ok(normalize_catalog(
            self.kind(),
            packages.iter().map(ZuluPackage::version),
            filter,
        ))
    }

    async fn download_url(&self, version: &str) -> AemResult<String> {
        let version = self.kind().canonical(version);
        let packages = self.fetch_packages(Some(&version)).await?;
        packages
            .into_iter()
            .find(|p| p.version() == version)
            .map(|p| p.download_url)
            .ok_or_else(|| AemError::not_found(format!("java {version} JDK ZIP package for {}", self.platform)))
    }
}
