use crate::utils::error::{ClientError, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::RwLock;
use std::time::Duration;

pub const API_PREFIX: &str = "/api/v1";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// 版本化 REST 後端的 HTTP 客戶端，負責認證標頭與錯誤訊息正規化
pub struct ApiClient {
    client: Client,
    base_url: String,
    api_key: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sb-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: RwLock::new(None),
        })
    }

    pub fn with_api_key(self, api_key: Option<String>) -> Self {
        self.set_api_key(api_key);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> Option<String> {
        self.api_key.read().ok().and_then(|key| key.clone())
    }

    pub fn set_api_key(&self, api_key: Option<String>) {
        if let Ok(mut key) = self.api_key.write() {
            *key = api_key;
        }
    }

    /// 組出完整 URL：base + /api/v1 + path (+ query)
    pub fn url(&self, path: &str, params: &[(&str, &str)]) -> String {
        let normalized = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        let full = format!("{}{}{}", self.base_url, API_PREFIX, normalized);
        if params.is_empty() {
            return full;
        }
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params.iter())
            .finish();
        format!("{}?{}", full, query)
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = self.api_key() {
            if let Ok(value) = HeaderValue::from_str(&key) {
                headers.insert("X-API-Key", value);
            }
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", key)) {
                headers.insert(AUTHORIZATION, value);
            }
        }
        headers
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        tracing::debug!("{} {}", method, url);
        self.client.request(method, url).headers(self.headers())
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, params: &[(&str, &str)]) -> Result<T> {
        let url = self.url(path, params);
        let response = self.request(Method::GET, &url).send().await?;
        handle_response(&url, response).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        let url = self.url(path, &[]);
        let mut request = self.request(Method::POST, &url);
        if let Some(body) = body {
            request = request.json(body);
        }
        handle_response(&url, request.send().await?).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        let url = self.url(path, &[]);
        let mut request = self.request(Method::PUT, &url);
        if let Some(body) = body {
            request = request.json(body);
        }
        handle_response(&url, request.send().await?).await
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path, &[]);
        let response = self.request(Method::DELETE, &url).send().await?;
        let status = response.status();
        tracing::debug!("DELETE response status: {}", status);
        if !status.is_success() {
            let content_type = content_type(&response);
            let text = response.text().await?;
            return Err(error_from_body(&url, status, content_type.as_deref(), &text));
        }
        Ok(())
    }

    /// 下載二進位內容（例如 PDF 憑證）
    pub async fn get_bytes(&self, path: &str) -> Result<Vec<u8>> {
        let url = self.url(path, &[]);
        let response = self.request(Method::GET, &url).send().await?;
        let status = response.status();
        tracing::debug!("GET (binary) response status: {}", status);
        if !status.is_success() {
            let content_type = content_type(&response);
            let text = response.text().await?;
            return Err(error_from_body(&url, status, content_type.as_deref(), &text));
        }
        let content_type = content_type(&response);
        if content_type.as_deref().is_some_and(is_html_content_type) {
            return Err(ClientError::HtmlResponse { url });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

fn content_type(response: &Response) -> Option<String> {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn is_html_content_type(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("text/html")
}

/// 是否為 HTML 內容（後端 URL 指到網頁而非 API 時常見）
pub fn looks_like_html(content_type: Option<&str>, body: &str) -> bool {
    content_type.is_some_and(is_html_content_type) || body.trim_start().starts_with('<')
}

async fn handle_response<T: DeserializeOwned>(url: &str, response: Response) -> Result<T> {
    let status = response.status();
    let content_type = content_type(&response);
    let text = response.text().await?;
    tracing::debug!("API response status: {} ({} bytes)", status, text.len());

    if !status.is_success() {
        return Err(error_from_body(url, status, content_type.as_deref(), &text));
    }
    if looks_like_html(content_type.as_deref(), &text) {
        tracing::warn!("Backend returned HTML for {}", url);
        return Err(ClientError::HtmlResponse {
            url: url.to_string(),
        });
    }

    // 空回應視為 null，讓 () / Option / IgnoredAny 得以解析
    let body = if text.trim().is_empty() { "null" } else { &text };
    Ok(serde_json::from_str(body)?)
}

/// 從錯誤回應中取出訊息：message → error → 狀態文字 → "HTTP <code>"
pub fn error_from_body(
    url: &str,
    status: StatusCode,
    content_type: Option<&str>,
    body: &str,
) -> ClientError {
    if matches!(status, StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED)
        && looks_like_html(content_type, body)
    {
        return ClientError::HtmlResponse {
            url: url.to_string(),
        };
    }

    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            ["message", "error"].iter().find_map(|field| {
                json.get(field)
                    .and_then(|v| v.as_str())
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            })
        });

    let message = from_json
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

    ClientError::HttpError {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new("https://wash.example.com/", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_url_adds_prefix_and_leading_slash() {
        let c = client();
        assert_eq!(
            c.url("services", &[]),
            "https://wash.example.com/api/v1/services"
        );
        assert_eq!(
            c.url("/bookings/42/act", &[]),
            "https://wash.example.com/api/v1/bookings/42/act"
        );
    }

    #[test]
    fn test_url_encodes_query_params() {
        let c = client();
        assert_eq!(
            c.url(
                "/slots",
                &[("service_id", "s 1"), ("date", "2026-02-15"), ("post_id", "p&1")]
            ),
            "https://wash.example.com/api/v1/slots?service_id=s+1&date=2026-02-15&post_id=p%261"
        );
    }

    #[test]
    fn test_headers_include_both_auth_forms() {
        let c = client().with_api_key(Some("key-123".to_string()));
        let headers = c.headers();
        assert_eq!(headers.get("X-API-Key").unwrap(), "key-123");
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer key-123");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn test_headers_without_key() {
        let headers = client().headers();
        assert!(headers.get("X-API-Key").is_none());
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_error_prefers_message_then_error() {
        let err = error_from_body(
            "u",
            StatusCode::BAD_REQUEST,
            Some("application/json"),
            r#"{"message":"Slot taken","error":"conflict"}"#,
        );
        assert_eq!(err.to_string(), "Slot taken");

        let err = error_from_body("u", StatusCode::BAD_REQUEST, None, r#"{"error":"conflict"}"#);
        assert_eq!(err.to_string(), "conflict");
    }

    #[test]
    fn test_error_falls_back_to_status_text() {
        let err = error_from_body("u", StatusCode::INTERNAL_SERVER_ERROR, None, "oops");
        assert_eq!(err.to_string(), "Internal Server Error");

        let err = error_from_body("u", StatusCode::from_u16(599).unwrap(), None, "");
        assert_eq!(err.to_string(), "HTTP 599");
    }

    #[test]
    fn test_html_404_is_reported_as_misconfiguration() {
        let err = error_from_body(
            "https://site/api/v1/services",
            StatusCode::NOT_FOUND,
            Some("text/html; charset=utf-8"),
            "<!doctype html><html></html>",
        );
        assert!(matches!(err, ClientError::HtmlResponse { .. }));
    }
}
