use async_trait::async_trait;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

use crate::core::constants::remote;
use crate::error::{AemError, AemResult, ApiStage};

/// 网络传输抽象，提供者和安装流程只通过它访问网络
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// GET 请求并返回文本
    async fn get_text(&self, url: &str) -> AemResult<String>;

    /// 流式下载到文件，返回写入的字节数
    async fn download(&self, url: &str, dest: &Path) -> AemResult<u64>;
}

/// HTTP 客户端包装器
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// 创建新的 HTTP 客户端
    pub fn new() -> AemResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(remote::CONNECT_TIMEOUT_SECS))
            .user_agent(remote::USER_AGENT)
            .build()
            .map_err(|e| AemError::internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// 使用已配置好的 reqwest 客户端
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for HttpClient {
    async fn get_text(&self, url: &str) -> AemResult<String> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AemError::api(url, ApiStage::Request, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AemError::api(
                url,
                ApiStage::Status(status.as_u16()),
                status.canonical_reason().unwrap_or("unexpected status"),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| AemError::api(url, ApiStage::Request, format!("failed to read body: {e}")))
    }

    async fn download(&self, url: &str, dest: &Path) -> AemResult<u64> {
        debug!("downloading {} to {}", url, dest.display());
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AemError::download(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AemError::download(url, format!("server returned HTTP {}", status.as_u16())));
        }

        let total_size = response.content_length().unwrap_or(0);
        let pb = create_progress_bar(total_size);

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| AemError::fs("create", dest, e))?;
        let mut downloaded = 0u64;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| AemError::download(url, format!("read failed: {e}")))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| AemError::fs("write", dest, e))?;
            downloaded += chunk.len() as u64;
            pb.set_position(downloaded);
        }

        file.flush().await.map_err(|e| AemError::fs("write", dest, e))?;
        pb.finish_and_clear();
        Ok(downloaded)
    }
}

fn create_progress_bar(total_size: u64) -> ProgressBar {
    if total_size == 0 {
        return ProgressBar::new_spinner();
    }

    let pb = ProgressBar::new(total_size);
    if let Ok(style) = ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({eta}) {percent}%",
    ) {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}
