use async_trait::async_trait;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use super::http_client::HttpTransport;
use crate::error::{AemError, AemResult, ApiStage};

/// 按 URL 前缀返回固定响应的传输实现，记录每次请求
pub(crate) struct StaticTransport {
    routes: Vec<(String, String)>,
    requests: Mutex<Vec<String>>,
}

impl StaticTransport {
    pub(crate) fn new() -> Self {
        Self {
            routes: Vec::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn route(mut self, prefix: &str, body: &str) -> Self {
        self.routes.push((prefix.to_string(), body.to_string()));
        self
    }

    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl HttpTransport for StaticTransport {
    async fn get_text(&self, url: &str) -> AemResult<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_string());
        self.routes
            .iter()
            .find(|(prefix, _)| url.starts_with(prefix.as_str()))
            .map(|(_, body)| body.clone())
            .ok_or_else(|| AemError::api(url, ApiStage::Status(404), "Not Found"))
    }

    async fn download(&self, url: &str, _dest: &Path) -> AemResult<u64> {
        Err(AemError::download(url, "downloads are not served by StaticTransport"))
    }
}
