//! 執行期設定（`config.json`），部署時可覆寫後端位址而不需重新打包。

use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const RUNTIME_CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub api_base_url: Option<String>,
}

impl RuntimeConfig {
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// 去除空白與結尾的 "/"；空字串視為未設定
    pub fn api_base_url(&self) -> Option<String> {
        self.api_base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(|url| url.trim_end_matches('/').to_string())
    }

    async fn fetch(url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let response = client.get(url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// 從檔案或 URL 載入；任何失敗都只記錄並返回 None
    pub async fn load(source: &str, timeout: Duration) -> Option<Self> {
        let result = if source.starts_with("http://") || source.starts_with("https://") {
            Self::fetch(source, timeout).await
        } else {
            let path = Path::new(source);
            if !path.exists() {
                tracing::debug!("No runtime config at {}", source);
                return None;
            }
            Self::read(path)
        };

        match result {
            Ok(config) => {
                tracing::debug!("Loaded runtime config from {}", source);
                Some(config)
            }
            Err(e) => {
                tracing::warn!("Ignoring runtime config from {}: {}", source, e);
                None
            }
        }
    }
}
