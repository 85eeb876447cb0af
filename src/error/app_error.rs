use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::runtime::RuntimeKind;

/// 远程 API 调用失败的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiStage {
    /// 请求未能完成（连接失败、读取响应体失败）
    Request,
    /// 服务器返回非成功状态码
    Status(u16),
    /// 响应体与预期结构不符
    Parse,
}

impl fmt::Display for ApiStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiStage::Request => write!(f, "request"),
            ApiStage::Status(code) => write!(f, "HTTP {code}"),
            ApiStage::Parse => write!(f, "parse"),
        }
    }
}

/// 应用程序错误类型
#[derive(Error, Debug)]
pub enum AemError {
    #[error("download failed: {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("extraction failed: {}: {reason}", .path.display())]
    Extraction { path: PathBuf, reason: String },

    #[error("filesystem error: cannot {operation} {}: {source}", .path.display())]
    Filesystem {
        operation: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("API error ({stage}): {url}: {details}")]
    Api {
        url: String,
        stage: ApiStage,
        details: String,
    },

    #[error("not found: {resource}")]
    NotFound { resource: String },

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("refusing to uninstall {kind} {version}: it is the active version, switch to another version first")]
    UninstallRefused { kind: RuntimeKind, version: String },

    #[error("settings error: {}: {reason}", .path.display())]
    Settings { path: PathBuf, reason: String },

    #[error("config error: {}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },

    #[error("internal error: {message}")]
    Internal { message: String },
}

/// 应用程序 Result 类型
pub type AemResult<T> = Result<T, AemError>;

/// 便捷的错误创建函数
impl AemError {
    pub fn fs(operation: &str, path: &Path, source: io::Error) -> Self {
        Self::Filesystem {
            operation: operation.to_string(),
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn download(url: &str, reason: impl Into<String>) -> Self {
        Self::Download {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    pub fn extraction(path: &Path, reason: impl Into<String>) -> Self {
        Self::Extraction {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn api(url: &str, stage: ApiStage, details: impl Into<String>) -> Self {
        Self::Api {
            url: url.to_string(),
            stage,
            details: details.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn settings(path: &Path, reason: impl fmt::Display) -> Self {
        Self::Settings {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
