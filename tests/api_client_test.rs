use anyhow::Result;
use httpmock::prelude::*;
use sb_client::adapters::MemoryPreferenceStore;
use sb_client::api::{ApiClient, BackendClient};
use sb_client::domain::model::{BookingStatus, CreateBookingRequest};
use sb_client::state::AuthState;
use sb_client::{BookingApi, ClientError};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn backend(server: &MockServer) -> BackendClient {
    let http = ApiClient::new(&server.base_url(), Duration::from_secs(5)).unwrap();
    BackendClient::new(http)
}

/// 裝置註冊後，之後的請求同時帶 X-API-Key 與 Bearer
#[tokio::test]
async fn test_device_registration_then_authenticated_requests() -> Result<()> {
    let server = MockServer::start();
    let register = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v1/clients/register")
            .json_body_partial(r#"{"platform":"web","app_version":"1.0"}"#);
        then.status(200)
            .json_body(json!({"client_id": "c1", "api_key": "key-1"}));
    });
    let services = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/services")
            .header("X-API-Key", "key-1")
            .header("Authorization", "Bearer key-1");
        then.status(200).json_body(json!([
            {"_id": "s1", "name": "Мойка", "price": 1500, "duration": 60, "category": "Мойка"},
            {"_id": "s2", "name": "Архив", "price": 10, "duration": 10, "is_active": false}
        ]));
    });

    let client = backend(&server);
    let mut auth = AuthState::load(Arc::new(MemoryPreferenceStore::new()));
    let key = auth.ensure_registered(&client).await.map(str::to_string);
    assert_eq!(key.as_deref(), Some("key-1"));
    client.http().set_api_key(key);

    let list = client.fetch_services().await?;
    assert_eq!(list.len(), 2);
    assert!(list[0].is_active);
    assert!(!list[1].is_active);

    register.assert();
    services.assert();
    Ok(())
}

#[tokio::test]
async fn test_registration_failure_still_marks_auth_ready() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/v1/clients/register");
        then.status(503).json_body(json!({"error": "maintenance"}));
    });

    let client = backend(&server);
    let mut auth = AuthState::load(Arc::new(MemoryPreferenceStore::new()));
    assert!(!auth.is_ready());
    assert_eq!(auth.ensure_registered(&client).await, None);
    assert!(auth.is_ready());
    Ok(())
}

#[tokio::test]
async fn test_backend_error_message_is_surfaced() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST)
            .path("/api/v1/bookings")
            .json_body(json!({
                "service_id": "s1",
                "date_time": "2026-02-16T10:00:00",
                "notes": null
            }));
        then.status(409)
            .json_body(json!({"message": "Время уже занято"}));
    });

    let req = CreateBookingRequest {
        service_id: "s1".to_string(),
        date_time: "2026-02-16T10:00:00".to_string(),
        post_id: None,
        notes: None,
    };
    let err = backend(&server).create_booking(&req).await.unwrap_err();
    match err {
        ClientError::HttpError { status, message } => {
            assert_eq!(status, 409);
            assert_eq!(message, "Время уже занято");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    Ok(())
}

/// 後端位址指到網站首頁時會拿到 HTML
#[tokio::test]
async fn test_html_success_response_is_rejected() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/profile");
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body("<!doctype html><html><body>SPA</body></html>");
    });

    let err = backend(&server).fetch_profile().await.unwrap_err();
    assert!(matches!(err, ClientError::HtmlResponse { .. }));
    assert!(err.user_friendly_message().contains("HTML"));
    Ok(())
}

#[tokio::test]
async fn test_slots_are_requested_with_query() -> Result<()> {
    let server = MockServer::start();
    let slots = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/slots")
            .query_param("service_id", "s1")
            .query_param("date", "2026-02-16")
            .query_param("post_id", "p1");
        then.status(200).json_body(json!([
            {"id": "1", "time": "2026-02-16T09:00:00", "is_available": true},
            {"id": "2", "time": "2026-02-16T09:30:00", "is_available": false}
        ]));
    });

    let list = backend(&server)
        .fetch_slots("s1", "2026-02-16", "p1")
        .await?;
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].hhmm(), "09:00");
    slots.assert();
    Ok(())
}

#[tokio::test]
async fn test_empty_bodies_are_accepted() -> Result<()> {
    let server = MockServer::start();
    let read = server.mock(|when, then| {
        when.method(POST).path("/api/v1/notifications/n1/read");
        then.status(204);
    });
    let cancel = server.mock(|when, then| {
        when.method(DELETE).path("/api/v1/bookings/b1");
        then.status(200);
    });

    let client = backend(&server);
    client.mark_notification_read("n1").await?;
    client.cancel_booking("b1").await?;
    read.assert();
    cancel.assert();
    Ok(())
}

#[tokio::test]
async fn test_unknown_booking_status_is_kept() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/bookings");
        then.status(200).json_body(json!([
            {"_id": "b1", "service_id": "s1", "date_time": "2026-02-16T10:00:00", "status": "no_show"}
        ]));
    });

    let bookings = backend(&server).fetch_bookings().await?;
    assert_eq!(bookings[0].status, BookingStatus::Other("no_show".to_string()));
    Ok(())
}
