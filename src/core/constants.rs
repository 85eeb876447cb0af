//! 应用程序常量定义
//!
//! 本模块包含全局使用的常量，避免魔数并提供统一的配置值。

/// 目录与文件名
pub mod paths {
    /// 默认主目录名称（位于用户主目录下）
    pub const HOME_DIR_NAME: &str = ".aem";
    /// 已安装版本的根目录
    pub const INSTALL_DIR: &str = "sys_installed";
    /// 下载与解压使用的临时目录
    pub const TEMP_DIR: &str = "tmp";
    /// 当前激活版本记录文件
    pub const SETTINGS_FILE: &str = "versions.json";
    /// 可选的配置文件
    pub const CONFIG_FILE: &str = "config.toml";
    /// 项目级运行时声明文件
    pub const SETUP_FILE: &str = "aem.json";
}

/// 环境变量名称
pub mod env_vars {
    pub const HOME: &str = "AEM_HOME";
    pub const NODE_SYMLINK: &str = "AEM_NODE_SYMLINK";
    pub const JAVA_SYMLINK: &str = "AEM_JAVA_SYMLINK";
    pub const DEBUG: &str = "AEM_DEBUG";
}

/// 远程目录相关常量
pub mod remote {
    /// Node.js 官方发行目录
    pub const NODE_MIRROR: &str = "https://nodejs.org/dist";
    /// Azul Zulu 元数据 API
    pub const JAVA_MIRROR: &str = "https://api.azul.com/metadata/v1/zulu/packages/";
    /// 远程版本列表的最大条目数
    pub const LIST_LIMIT: usize = 10;
    /// 连接超时时间（秒）
    pub const CONNECT_TIMEOUT_SECS: u64 = 30;
    pub const USER_AGENT: &str = concat!("aem/", env!("CARGO_PKG_VERSION"));
}

/// 列表输出标记
pub mod display {
    /// 当前激活版本的前缀
    pub const ACTIVE_MARKER: &str = "*  ";
    /// 其他版本的前缀
    pub const INACTIVE_MARKER: &str = "   ";
}
