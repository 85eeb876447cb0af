use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::core::constants::paths::SETUP_FILE;

/// aem CLI 应用程序
#[derive(Parser, Debug)]
#[command(name = "aem")]
#[command(about = "Version manager for Node.js and Java (JDK) runtimes", long_about = None)]
#[command(version)]
pub struct Cli {
    /// 输出调试日志
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// 顶级命令
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Node.js 版本管理
    Node {
        #[command(subcommand)]
        action: RuntimeCommands,
    },
    /// Java (JDK) 版本管理
    Java {
        #[command(subcommand)]
        action: RuntimeCommands,
    },
    /// 列出远程可用版本（最多 10 条）
    List {
        /// 模块名称（node / java）
        module: String,
        /// 版本前缀过滤
        filter: Option<String>,
    },
    /// 按项目文件安装并启用运行时
    Setup {
        /// 项目文件路径
        #[arg(short, long, default_value = SETUP_FILE)]
        file: PathBuf,
    },
}

/// 单个运行时的管理命令
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCommands {
    /// 安装版本（可以只写主版本号，如 18）
    Install {
        version: String,
    },
    /// 切换到已安装的版本
    #[command(visible_alias = "set")]
    Use {
        version: String,
    },
    /// 列出已安装版本
    #[command(visible_alias = "ls")]
    List {
        /// JSON 格式输出
        #[arg(long)]
        json: bool,
    },
    /// 显示当前版本
    Current {
        /// JSON 格式输出
        #[arg(long)]
        json: bool,
    },
    /// 卸载版本
    #[command(visible_aliases = ["remove", "rm"])]
    Uninstall {
        version: String,
    },
}
