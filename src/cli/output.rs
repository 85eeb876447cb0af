use serde::Serialize;

use crate::core::runtime::RuntimeKind;
use crate::core::service::InstalledVersion;
use crate::error::{AemError, AemResult};

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// 输出格式化器
pub struct OutputFormatter;

impl OutputFormatter {
    /// 格式化已安装版本列表
    pub fn format_installed(
        &self,
        kind: RuntimeKind,
        current: Option<&str>,
        installed: &[InstalledVersion],
        format: OutputFormat,
    ) -> AemResult<String> {
        match format {
            OutputFormat::Text => {
                if installed.is_empty() {
                    return Ok(format!("No {kind} versions installed\n"));
                }
                let mut output = String::new();
                for version in installed {
                    output.push_str(&format!("{version}\n"));
                }
                Ok(output)
            }
            OutputFormat::Json => to_json(&serde_json::json!({
                "kind": kind,
                "current": current,
                "installed": installed,
            })),
        }
    }

    /// 格式化当前版本
    pub fn format_current(
        &self,
        kind: RuntimeKind,
        current: Option<&str>,
        format: OutputFormat,
    ) -> AemResult<String> {
        match format {
            OutputFormat::Text => Ok(format!("{}\n", current.unwrap_or("none"))),
            OutputFormat::Json => to_json(&serde_json::json!({
                "kind": kind,
                "current": current,
            })),
        }
    }

    /// 格式化远程版本列表
    pub fn format_remote(&self, module: &str, versions: &[String]) -> String {
        if versions.is_empty() {
            return format!("No remote {module} versions found\n");
        }
        let mut output = format!("Available {module} versions:\n");
        for version in versions {
            output.push_str(&format!("  {version}\n"));
        }
        output
    }
}

fn to_json<T: Serialize>(value: &T) -> AemResult<String> {
    serde_json::to_string_pretty(value)
        .map(|json| format!("{json}\n"))
        .map_err(|e| AemError::internal(format!("failed to render JSON: {e}")))
}

/// 默认输出格式化器实例
pub static FORMATTER: OutputFormatter = OutputFormatter;
