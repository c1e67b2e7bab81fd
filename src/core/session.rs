use crate::api::{ApiClient, BackendClient};
use crate::config::runtime::RuntimeConfig;
use crate::config::toml_config::ClientConfig;
use crate::core::navigation::{guard, Route, RouteDecision};
use crate::domain::ports::PreferenceStore;
use crate::state::{AuthState, BackendState, LegalState, ThemeState};
use crate::utils::error::{ClientError, Result};
use std::sync::Arc;
use std::time::Duration;

/// 環境變數形式的全域後端位址
pub const API_BASE_URL_ENV: &str = "SB_API_BASE_URL";

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub api_base_url_override: Option<String>,
    pub runtime_config: Option<String>,
    pub configured_api_base_url: Option<String>,
    pub timeout: Duration,
    pub platform: String,
    pub app_version: String,
}

impl SessionOptions {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            api_base_url_override: None,
            runtime_config: config.runtime_config().map(str::to_string),
            configured_api_base_url: config.api_base_url().map(str::to_string),
            timeout: Duration::from_secs(config.timeout_seconds()),
            platform: config.platform().to_string(),
            app_version: config.app_version().to_string(),
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from_config(&ClientConfig::default())
    }
}

/// 啟動流程：執行期設定 → 後端位址 → 認證 → 法律同意
pub struct Session {
    pub backend: BackendState,
    pub auth: AuthState,
    pub legal: LegalState,
    pub theme: ThemeState,
    options: SessionOptions,
}

impl Session {
    pub async fn bootstrap(store: Arc<dyn PreferenceStore>, options: SessionOptions) -> Result<Self> {
        let runtime_url = match options.runtime_config.as_deref() {
            Some(source) => RuntimeConfig::load(source, options.timeout)
                .await
                .and_then(|config| config.api_base_url()),
            None => None,
        };

        // 優先序：已保存 → 執行期設定 → 設定檔 → 環境變數
        let fallback = runtime_url
            .or_else(|| options.configured_api_base_url.clone())
            .or_else(|| std::env::var(API_BASE_URL_ENV).ok())
            .filter(|url| !url.trim().is_empty());

        let mut backend = BackendState::load(Arc::clone(&store), fallback.as_deref());
        if let Some(url) = options.api_base_url_override.as_deref() {
            backend.override_url(url)?;
        }

        Ok(Self {
            backend,
            auth: AuthState::load(Arc::clone(&store)),
            legal: LegalState::load(Arc::clone(&store)),
            theme: ThemeState::new(store),
            options,
        })
    }

    pub fn decide(&self, route: Route) -> RouteDecision {
        guard(route, self.backend.is_connected(), self.legal.accepted())
    }

    /// 依路由守衛決定是否可進入；被導向或被法律同意擋下時返回錯誤
    pub fn enter(&self, route: Route) -> Result<Route> {
        match self.decide(route.clone()) {
            RouteDecision::Allow(allowed) => Ok(allowed),
            RouteDecision::Redirect(Route::Connect) => Err(ClientError::NotConnected),
            RouteDecision::Redirect(target) => {
                tracing::debug!("Route {} redirected to {}", route, target);
                Ok(target)
            }
            RouteDecision::LegalRequired => self.legal.require_accepted().map(|_| route),
        }
    }

    /// 未連線的 API 客戶端（不含金鑰）
    pub fn client(&self) -> Result<BackendClient> {
        let base_url = self
            .backend
            .api_base_url()
            .ok_or(ClientError::NotConnected)?;
        let http = ApiClient::new(base_url, self.options.timeout)?;
        Ok(BackendClient::new(http)
            .with_client_info(&self.options.platform, &self.options.app_version))
    }

    /// 建立帶金鑰的客戶端；沒有金鑰時先以裝置身分註冊
    pub async fn connect(&mut self) -> Result<BackendClient> {
        let client = self.client()?;
        let key = self
            .auth
            .ensure_registered(&client)
            .await
            .map(str::to_string);
        client.http().set_api_key(key);
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryPreferenceStore;
    use crate::state::API_BASE_URL_KEY;

    #[tokio::test]
    async fn test_bootstrap_prefers_saved_url() {
        let store = Arc::new(MemoryPreferenceStore::new());
        store.set(API_BASE_URL_KEY, "https://saved.ru").unwrap();
        let options = SessionOptions {
            configured_api_base_url: Some("https://config.ru".to_string()),
            ..SessionOptions::default()
        };
        let session = Session::bootstrap(store, options).await.unwrap();
        assert_eq!(session.backend.api_base_url(), Some("https://saved.ru"));
    }

    #[tokio::test]
    async fn test_override_is_not_persisted() {
        let store = Arc::new(MemoryPreferenceStore::new());
        let options = SessionOptions {
            api_base_url_override: Some("https://override.ru/api/v1".to_string()),
            ..SessionOptions::default()
        };
        let session = Session::bootstrap(store.clone(), options).await.unwrap();
        assert_eq!(session.backend.api_base_url(), Some("https://override.ru"));
        assert_eq!(store.get(API_BASE_URL_KEY), None);
    }

    #[tokio::test]
    async fn test_enter_requires_connection_and_consent() {
        let store = Arc::new(MemoryPreferenceStore::new());
        let mut session = Session::bootstrap(store, SessionOptions::default())
            .await
            .unwrap();
        // 測試環境可能設定了全域變數
        session.backend.clear().unwrap();

        assert!(matches!(
            session.enter(Route::Bookings),
            Err(ClientError::NotConnected)
        ));
        assert_eq!(session.enter(Route::Legal).unwrap(), Route::Legal);

        session.backend.set_from_manual("https://wash.ru").unwrap();
        assert!(matches!(
            session.enter(Route::Bookings),
            Err(ClientError::LegalNotAccepted { .. })
        ));
        assert_eq!(session.enter(Route::Connect).unwrap(), Route::Home);

        session.legal.accept().unwrap();
        assert_eq!(session.enter(Route::Bookings).unwrap(), Route::Bookings);
    }

    #[tokio::test]
    async fn test_client_requires_backend() {
        let store = Arc::new(MemoryPreferenceStore::new());
        let mut session = Session::bootstrap(store, SessionOptions::default())
            .await
            .unwrap();
        session.backend.clear().unwrap();
        assert!(matches!(session.client(), Err(ClientError::NotConnected)));
    }
}
