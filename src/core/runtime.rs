use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::core::constants::env_vars;
use crate::error::{AemError, AemResult};

/// 运行时类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeKind {
    Node,
    Java,
}

impl RuntimeKind {
    pub const ALL: [RuntimeKind; 2] = [RuntimeKind::Node, RuntimeKind::Java];

    /// 安装子目录、设置字段和提供者注册名共用的名称
    pub fn as_str(&self) -> &'static str {
        match self {
            RuntimeKind::Node => "node",
            RuntimeKind::Java => "java",
        }
    }

    /// 配置符号链接路径的环境变量
    pub fn symlink_env_var(&self) -> &'static str {
        match self {
            RuntimeKind::Node => env_vars::NODE_SYMLINK,
            RuntimeKind::Java => env_vars::JAVA_SYMLINK,
        }
    }

    /// 规范版本形式：Node 带 `v` 前缀，Java 不带前缀
    pub fn canonical(&self, version: &str) -> String {
        let bare = bare_version(version);
        match self {
            RuntimeKind::Node => format!("v{bare}"),
            RuntimeKind::Java => bare.to_string(),
        }
    }

    /// 安装目录名称，两种运行时均为 `v<版本>`
    pub fn dir_name(&self, version: &str) -> String {
        format!("v{}", bare_version(version))
    }

    /// 按运行时自身的版本顺序比较
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        let (a, b) = (bare_version(a), bare_version(b));
        match self {
            RuntimeKind::Node => match (semver::Version::parse(a), semver::Version::parse(b)) {
                (Ok(a), Ok(b)) => a.cmp(&b),
                (Ok(_), Err(_)) => Ordering::Greater,
                (Err(_), Ok(_)) => Ordering::Less,
                (Err(_), Err(_)) => numeric_components(a).cmp(&numeric_components(b)),
            },
            RuntimeKind::Java => numeric_components(a).cmp(&numeric_components(b)),
        }
    }

    /// 判断目录中的版本是否满足请求：完全相等，或以 `请求.` 开头
    pub fn matches_request(&self, candidate: &str, requested: &str) -> bool {
        let candidate = bare_version(candidate);
        let requested = bare_version(requested);
        candidate == requested
            || candidate
                .strip_prefix(requested)
                .is_some_and(|rest| rest.starts_with('.'))
    }

    /// 校验用户输入的版本号，返回去除空白后的值
    pub fn validate_request(&self, version: &str) -> AemResult<String> {
        static VERSION_RE: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
        let re = VERSION_RE
            .get_or_init(|| Regex::new(r"^v?\d+(\.\d+)*$"))
            .as_ref()
            .map_err(|e| AemError::internal(e.to_string()))?;

        let version = version.trim();
        if version.is_empty() {
            return Err(AemError::validation("version", "version must not be empty"));
        }
        if !re.is_match(version) {
            return Err(AemError::validation(
                "version",
                format!("'{version}' is not a valid {self} version (expected e.g. 18 or 18.20.4)"),
            ));
        }
        Ok(version.to_string())
    }
}

impl fmt::Display for RuntimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RuntimeKind {
    type Err = AemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "node" | "nodejs" => Ok(RuntimeKind::Node),
            "java" | "jdk" => Ok(RuntimeKind::Java),
            other => Err(AemError::validation(
                "module",
                format!("unsupported module '{other}', expected node or java"),
            )),
        }
    }
}

/// 去掉 `v` 前缀后的版本号
pub fn bare_version(version: &str) -> &str {
    let version = version.trim();
    version.strip_prefix('v').unwrap_or(version)
}

/// 查找已安装版本时依次尝试的名称：原样、带前缀、不带前缀
pub fn version_candidates(version: &str) -> Vec<String> {
    let trimmed = version.trim();
    let bare = bare_version(trimmed);
    let mut candidates = vec![trimmed.to_string()];
    for candidate in [format!("v{bare}"), bare.to_string()] {
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }
    candidates
}

/// 两个版本字符串是否表示同一版本（忽略前缀）
pub fn same_version(a: &str, b: &str) -> bool {
    bare_version(a) == bare_version(b)
}

fn numeric_components(version: &str) -> Vec<u64> {
    version
        .split(['.', '+', '-'])
        .map(|part| part.parse::<u64>().unwrap_or(0))
        .collect()
}
