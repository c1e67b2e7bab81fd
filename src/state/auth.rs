use crate::domain::model::TelegramLoginResponse;
use crate::domain::ports::{BookingApi, PreferenceStore};
use crate::state::{API_KEY_KEY, DEVICE_ID_KEY};
use crate::utils::error::Result;
use chrono::Utc;
use std::sync::Arc;

fn to_base36(mut n: u128) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// 產生新的匿名裝置識別碼，格式 `web_<隨機>_<毫秒時間戳 base36>`
pub fn generate_device_id() -> String {
    let random = to_base36(uuid::Uuid::new_v4().as_u128());
    let millis = Utc::now().timestamp_millis().max(0) as u128;
    format!("web_{}_{}", &random[..11.min(random.len())], to_base36(millis))
}

pub struct AuthState {
    store: Arc<dyn PreferenceStore>,
    api_key: Option<String>,
    ready: bool,
}

impl AuthState {
    pub fn load(store: Arc<dyn PreferenceStore>) -> Self {
        let api_key = store.get(API_KEY_KEY).filter(|k| !k.is_empty());
        Self {
            store,
            ready: api_key.is_some(),
            api_key,
        }
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// 裝置識別碼只建立一次，之後沿用
    pub fn device_id(&self) -> Result<String> {
        if let Some(id) = self.store.get(DEVICE_ID_KEY).filter(|id| !id.is_empty()) {
            return Ok(id);
        }
        let id = generate_device_id();
        self.store.set(DEVICE_ID_KEY, &id)?;
        tracing::info!("Generated device id {}", id);
        Ok(id)
    }

    fn store_key(&mut self, key: &str) -> Result<()> {
        self.store.set(API_KEY_KEY, key)?;
        self.api_key = Some(key.to_string());
        self.ready = true;
        Ok(())
    }

    pub async fn register(&mut self, api: &dyn BookingApi) -> Result<String> {
        let device_id = self.device_id()?;
        tracing::debug!("Registering device {}", device_id);
        let response = api.register_client(&device_id).await?;
        self.store_key(&response.api_key)?;
        tracing::info!("Registered as client {}", response.client_id);
        Ok(response.api_key)
    }

    /// 沒有金鑰時自動註冊；註冊失敗也視為就緒（後續請求會顯示後端的認證錯誤）
    pub async fn ensure_registered(&mut self, api: &dyn BookingApi) -> Option<&str> {
        if self.api_key.is_none() {
            if let Err(e) = self.register(api).await {
                tracing::warn!("Device registration failed: {}", e);
                self.ready = true;
            }
        }
        self.api_key()
    }

    pub async fn login_with_telegram(
        &mut self,
        api: &dyn BookingApi,
        auth_data: &serde_json::Value,
    ) -> Result<TelegramLoginResponse> {
        let response = api.telegram_login(auth_data).await?;
        self.store_key(&response.session_token)?;
        tracing::info!("Logged in via Telegram as account {}", response.account_id);
        Ok(response)
    }

    /// 只移除金鑰；裝置識別碼保留
    pub fn logout(&mut self) -> Result<()> {
        self.store.remove(API_KEY_KEY)?;
        self.api_key = None;
        self.ready = true;
        tracing::info!("Logged out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryPreferenceStore;

    #[test]
    fn test_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }

    #[test]
    fn test_generated_device_id_shape() {
        let id = generate_device_id();
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "web");
        assert!(!parts[1].is_empty());
        assert!(parts[2].chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_device_id_is_stable() {
        let store = Arc::new(MemoryPreferenceStore::new());
        let auth = AuthState::load(store.clone());
        let first = auth.device_id().unwrap();
        let second = auth.device_id().unwrap();
        assert_eq!(first, second);
        assert_eq!(store.get(DEVICE_ID_KEY), Some(first));
    }

    #[test]
    fn test_logout_keeps_device_id() {
        let store = Arc::new(MemoryPreferenceStore::new());
        store.set(API_KEY_KEY, "k").unwrap();
        store.set(DEVICE_ID_KEY, "web_x_y").unwrap();
        let mut auth = AuthState::load(store.clone());
        assert_eq!(auth.api_key(), Some("k"));
        assert!(auth.is_ready());

        auth.logout().unwrap();
        assert_eq!(auth.api_key(), None);
        assert!(auth.is_ready());
        assert_eq!(store.get(API_KEY_KEY), None);
        assert_eq!(store.get(DEVICE_ID_KEY).as_deref(), Some("web_x_y"));
    }
}
