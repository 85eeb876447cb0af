use async_trait::async_trait;
use std::collections::HashSet;

use crate::core::constants::remote::LIST_LIMIT;
use crate::core::runtime::RuntimeKind;
use crate::error::AemResult;

/// 远程版本目录提供者
///
/// 每种运行时一个实现，负责把各自的远程目录格式转换为规范版本列表，
/// 并为当前平台解析下载地址。
#[async_trait]
pub trait Provider: Send + Sync {
    /// 提供者对应的运行时类型
    fn kind(&self) -> RuntimeKind;

    /// 完整的规范化版本列表（去重、保持远程顺序、按前缀过滤，不截断）
    async fn catalog(&self, filter: Option<&str>) -> AemResult<Vec<String>>;

    /// 解析当前平台下指定版本的压缩包地址
    async fn download_url(&self, version: &str) -> AemResult<String>;

    /// 列出远程版本，最多返回 10 条
    async fn list_versions(&self, filter: Option<&str>) -> AemResult<Vec<String>> {
        let mut versions = self.catalog(filter).await?;
        versions.truncate(LIST_LIMIT);
        Ok(versions)
    }

    /// 远程目录中是否存在与输入完全一致的版本
    async fn check_version(&self, version: &str) -> AemResult<bool> {
        let wanted = self.kind().canonical(version);
        Ok(self.catalog(None).await?.iter().any(|v| *v == wanted))
    }
}

/// 规范化、去重并按前缀过滤远程版本
pub fn normalize_catalog<I>(kind: RuntimeKind, raw: I, filter: Option<&str>) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let prefix = filter
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(|f| kind.canonical(f));

    let mut seen = HashSet::new();
    raw.into_iter()
        .map(|version| kind.canonical(&version))
        .filter(|version| prefix.as_ref().map_or(true, |p| version.starts_with(p.as_str())))
        .filter(|version| seen.insert(version.clone()))
        .collect()
}
