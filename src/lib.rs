// 核心模块
pub mod cli;
pub mod core;
pub mod environments;
pub mod error;
pub mod infrastructure;

// 重新导出常用类型
pub use crate::core::constants as app_constants;
pub use crate::core::{
    InstalledVersion, Provider, ProviderRegistry, RuntimeKind, RuntimeService,
};
pub use environments::{JavaProvider, NodeProvider};
pub use error::{AemError, AemResult, ApiStage};
pub use infrastructure::{Config, HttpClient, HttpTransport, Platform, SettingsStore};
