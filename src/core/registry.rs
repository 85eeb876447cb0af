use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::provider::Provider;
use crate::core::runtime::RuntimeKind;
use crate::environments::{JavaProvider, NodeProvider};
use crate::infrastructure::config::Config;
use crate::infrastructure::remote::{HttpTransport, Platform};

/// 名称到提供者的映射，启动时填充，之后只读
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: BTreeMap<String, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册内置的 Node.js 和 Java 提供者
    pub fn with_defaults(
        config: &Config,
        transport: Arc<dyn HttpTransport>,
        platform: Platform,
    ) -> Self {
        let mut registry = Self::new();
        registry.register(
            RuntimeKind::Node.as_str(),
            Arc::new(NodeProvider::new(
                config.mirror_for(RuntimeKind::Node),
                platform.clone(),
                transport.clone(),
            )),
        );
        registry.register(
            RuntimeKind::Java.as_str(),
            Arc::new(JavaProvider::new(
                config.mirror_for(RuntimeKind::Java),
                platform,
                transport,
            )),
        );
        registry
    }

    /// 注册提供者，同名时替换并返回旧的实现
    pub fn register(
        &mut self,
        name: &str,
        provider: Arc<dyn Provider>,
    ) -> Option<Arc<dyn Provider>> {
        self.providers.insert(name.trim().to_lowercase(), provider)
    }

    /// 按名称查找提供者
    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(&name.trim().to_lowercase()).cloned()
    }

    /// 已注册的名称（有序）
    pub fn names(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
