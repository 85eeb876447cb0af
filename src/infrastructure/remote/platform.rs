use std::env;
use std::fmt;

/// 简单封装的平台信息，使用 Rust 目标名称（如 `linux` / `x86_64`）。
///
/// 各提供者通过自己的映射表转换为远程目录使用的命名。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

impl Platform {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// 检测当前运行平台。
    pub fn current() -> Self {
        Self::new(env::consts::OS, env::consts::ARCH)
    }

    /// 按映射表转换架构名，未映射的名称原样返回
    pub fn arch_in<'a>(&'a self, table: &[(&str, &'a str)]) -> &'a str {
        lookup(table, &self.arch)
    }

    /// 按映射表转换操作系统名，未映射的名称原样返回
    pub fn os_in<'a>(&'a self, table: &[(&str, &'a str)]) -> &'a str {
        lookup(table, &self.os)
    }
}

fn lookup<'a>(table: &[(&str, &'a str)], key: &'a str) -> &'a str {
    table
        .iter()
        .find(|(from, _)| *from == key)
        .map(|(_, to)| *to)
        .unwrap_or(key)
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}
