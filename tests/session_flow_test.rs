use anyhow::Result;
use httpmock::prelude::*;
use sb_client::adapters::FilePreferenceStore;
use sb_client::api::{ApiClient, BackendClient};
use sb_client::core::navigation::Route;
use sb_client::state::{AuthState, API_BASE_URL_KEY, API_KEY_KEY, DEVICE_ID_KEY};
use sb_client::{BookingApi, ClientError, PreferenceStore, Session, SessionOptions};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// 執行期設定提供後端位址，第一次連線時自動註冊裝置並保存金鑰
#[tokio::test]
async fn test_runtime_config_bootstrap_and_registration() -> Result<()> {
    let server = MockServer::start();
    let base = server.base_url();
    server.mock(|when, then| {
        when.method(GET).path("/config.json");
        then.status(200)
            .json_body(json!({"api_base_url": format!("{}/", base)}));
    });
    let register = server.mock(|when, then| {
        when.method(POST).path("/api/v1/clients/register");
        then.status(200)
            .json_body(json!({"client_id": "c1", "api_key": "key-77"}));
    });
    let profile = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/profile")
            .header("X-API-Key", "key-77");
        then.status(200).json_body(json!({"_id": "c1", "phone": "device:web_x"}));
    });

    let temp_dir = TempDir::new()?;
    let store: Arc<dyn PreferenceStore> = Arc::new(FilePreferenceStore::open(temp_dir.path())?);
    let options = SessionOptions {
        runtime_config: Some(server.url("/config.json")),
        configured_api_base_url: None,
        ..SessionOptions::default()
    };
    let mut session = Session::bootstrap(Arc::clone(&store), options).await?;
    assert_eq!(session.backend.api_base_url(), Some(base.as_str()));

    assert!(matches!(
        session.enter(Route::Profile),
        Err(ClientError::LegalNotAccepted { .. })
    ));
    session.legal.accept()?;
    assert_eq!(session.enter(Route::Profile)?, Route::Profile);

    let client = session.connect().await?;
    let user = client.fetch_profile().await?;
    assert_eq!(user.id, "c1");
    register.assert();
    profile.assert();

    // 重新開啟儲存後金鑰與裝置識別碼仍在；runtime 位址不會寫入
    let reopened = FilePreferenceStore::open(temp_dir.path())?;
    assert_eq!(reopened.get(API_KEY_KEY).as_deref(), Some("key-77"));
    assert!(reopened
        .get(DEVICE_ID_KEY)
        .is_some_and(|id| id.starts_with("web_")));
    assert_eq!(reopened.get(API_BASE_URL_KEY), None);

    // 已有金鑰時不再註冊
    let mut session = Session::bootstrap(store, SessionOptions {
        configured_api_base_url: Some(base.clone()),
        ..SessionOptions::default()
    })
    .await?;
    session.connect().await?;
    register.assert_hits(1);
    Ok(())
}

#[tokio::test]
async fn test_qr_connection_is_persisted() -> Result<()> {
    let temp_dir = TempDir::new()?;
    {
        let store: Arc<dyn PreferenceStore> = Arc::new(FilePreferenceStore::open(temp_dir.path())?);
        let mut session = Session::bootstrap(store, SessionOptions::default()).await?;
        let url = session
            .backend
            .set_from_qr(r#"{"api_url": null, "base_url": "https://wash.example.ru/api/v1"}"#)?;
        assert_eq!(url.as_deref(), Some("https://wash.example.ru"));
    }

    let store: Arc<dyn PreferenceStore> = Arc::new(FilePreferenceStore::open(temp_dir.path())?);
    let session = Session::bootstrap(store, SessionOptions::default()).await?;
    assert_eq!(
        session.backend.api_base_url(),
        Some("https://wash.example.ru")
    );
    Ok(())
}

#[tokio::test]
async fn test_unreachable_runtime_config_is_ignored() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store: Arc<dyn PreferenceStore> = Arc::new(FilePreferenceStore::open(temp_dir.path())?);
    let options = SessionOptions {
        runtime_config: Some(temp_dir.path().join("missing.json").display().to_string()),
        configured_api_base_url: Some("https://fallback.example.ru".to_string()),
        ..SessionOptions::default()
    };
    let session = Session::bootstrap(store, options).await?;
    assert_eq!(
        session.backend.api_base_url(),
        Some("https://fallback.example.ru")
    );
    Ok(())
}

/// Telegram 登入取得的 session token 取代裝置金鑰並寫入儲存
#[tokio::test]
async fn test_telegram_login_stores_session_token() -> Result<()> {
    let server = MockServer::start();
    let login = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v1/auth/telegram/login")
            .json_body(json!({"id": 42, "hash": "abc"}));
        then.status(200).json_body(json!({
            "session_token": "tg-token",
            "account_id": "a1",
            "name": "Пётр",
            "email": "petr@example.com"
        }));
    });

    let temp_dir = TempDir::new()?;
    let store: Arc<dyn PreferenceStore> = Arc::new(FilePreferenceStore::open(temp_dir.path())?);
    store.set(API_KEY_KEY, "device-key")?;
    let mut auth = AuthState::load(Arc::clone(&store));
    assert_eq!(auth.api_key(), Some("device-key"));

    let client = BackendClient::new(ApiClient::new(&server.base_url(), Duration::from_secs(5))?);
    let response = auth
        .login_with_telegram(&client, &json!({"id": 42, "hash": "abc"}))
        .await?;

    login.assert();
    assert_eq!(response.account_id, "a1");
    assert_eq!(response.name, "Пётр");
    assert_eq!(auth.api_key(), Some("tg-token"));
    assert!(auth.is_ready());
    let reopened = FilePreferenceStore::open(temp_dir.path())?;
    assert_eq!(reopened.get(API_KEY_KEY).as_deref(), Some("tg-token"));
    Ok(())
}

#[tokio::test]
async fn test_rejected_telegram_login_keeps_device_key() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/v1/auth/telegram/login");
        then.status(401).json_body(json!({"message": "Invalid Telegram signature"}));
    });

    let temp_dir = TempDir::new()?;
    let store: Arc<dyn PreferenceStore> = Arc::new(FilePreferenceStore::open(temp_dir.path())?);
    store.set(API_KEY_KEY, "device-key")?;
    let mut auth = AuthState::load(Arc::clone(&store));

    let client = BackendClient::new(ApiClient::new(&server.base_url(), Duration::from_secs(5))?);
    let err = auth
        .login_with_telegram(&client, &json!({"id": 42}))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid Telegram signature");
    assert_eq!(auth.api_key(), Some("device-key"));
    assert_eq!(store.get(API_KEY_KEY).as_deref(), Some("device-key"));
    Ok(())
}
