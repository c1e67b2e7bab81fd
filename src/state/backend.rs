use crate::domain::ports::PreferenceStore;
use crate::state::API_BASE_URL_KEY;
use crate::utils::error::Result;
use crate::utils::validation::validate_url;
use std::sync::Arc;

const API_SUFFIX: &str = "/api/v1";

/// 去除空白、結尾的 "/" 與 "/api/v1"
pub fn normalize_base_url(input: &str) -> String {
    let trimmed = input.trim();
    let s = trimmed.strip_suffix('/').unwrap_or(trimmed);
    s.strip_suffix(API_SUFFIX).unwrap_or(s).to_string()
}

/// 解析掃描到的 QR 內容：JSON（api_url / base_url / apiBaseUrl）或 http(s) URL 字串
pub fn parse_qr_payload(raw: &str) -> Option<String> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    if text.starts_with('{') && text.ends_with('}') {
        if let Ok(serde_json::Value::Object(json)) = serde_json::from_str(text) {
            // 依序取第一個非 null 的欄位
            let value = ["api_url", "base_url", "apiBaseUrl"]
                .iter()
                .filter_map(|key| json.get(*key))
                .find(|v| !v.is_null());
            if let Some(url) = value.and_then(|v| v.as_str()) {
                if !url.trim().is_empty() {
                    return Some(normalize_base_url(url));
                }
            }
        }
    }

    let lower = text.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Some(normalize_base_url(text));
    }

    None
}

pub struct BackendState {
    store: Arc<dyn PreferenceStore>,
    api_base_url: Option<String>,
}

impl BackendState {
    /// 解析順序：已保存的值 → fallback（執行期設定 / 環境變數）
    pub fn load(store: Arc<dyn PreferenceStore>, fallback: Option<&str>) -> Self {
        let api_base_url = match store.get(API_BASE_URL_KEY) {
            Some(saved) => Some(normalize_base_url(&saved)),
            None => fallback
                .filter(|url| !url.trim().is_empty())
                .map(normalize_base_url),
        };
        tracing::debug!("Resolved backend URL: {:?}", api_base_url);
        Self {
            store,
            api_base_url,
        }
    }

    /// 只影響本次執行，不寫入儲存
    pub fn override_url(&mut self, value: &str) -> Result<()> {
        let normalized = normalize_base_url(value);
        validate_url("api_base_url", &normalized)?;
        tracing::debug!("Backend URL overridden for this session: {}", normalized);
        self.api_base_url = Some(normalized);
        Ok(())
    }

    pub fn api_base_url(&self) -> Option<&str> {
        self.api_base_url.as_deref()
    }

    pub fn is_connected(&self) -> bool {
        self.api_base_url.is_some()
    }

    fn set_and_persist(&mut self, value: &str) -> Result<String> {
        let normalized = normalize_base_url(value);
        self.store.set(API_BASE_URL_KEY, &normalized)?;
        tracing::info!("Backend URL set to {}", normalized);
        self.api_base_url = Some(normalized.clone());
        Ok(normalized)
    }

    /// 手動輸入；空白輸入忽略並返回 None
    pub fn set_from_manual(&mut self, value: &str) -> Result<Option<String>> {
        if value.trim().is_empty() {
            return Ok(None);
        }
        validate_url("api_base_url", &normalize_base_url(value))?;
        self.set_and_persist(value).map(Some)
    }

    /// QR 內容無法辨識時返回 None 且不改變狀態
    pub fn set_from_qr(&mut self, raw: &str) -> Result<Option<String>> {
        match parse_qr_payload(raw) {
            Some(parsed) => self.set_and_persist(&parsed).map(Some),
            None => {
                tracing::warn!("QR payload did not contain a backend URL");
                Ok(None)
            }
        }
    }

    pub fn clear(&mut self) -> Result<()> {
        self.store.remove(API_BASE_URL_KEY)?;
        self.api_base_url = None;
        tracing::info!("Backend URL cleared");
        Ok(())
    }
}
