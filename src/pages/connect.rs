use crate::state::BackendState;
use crate::utils::error::{ClientError, Result};

pub const CONNECT_HINT: &str = "Отсканируйте QR-код из консоли или введите URL сервера вручную.";
pub const QR_URL_NOT_FOUND: &str =
    "QR-код распознан, но URL бэкенда не найден. Ожидаю формат URL или JSON с api_url.";

/// 連線畫面：手動輸入或 QR 內容，成功後導回首頁
#[derive(Debug, Default)]
pub struct ConnectPage {
    pub error: Option<String>,
}

impl ConnectPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// 空白輸入不做任何事，返回 None
    pub fn submit_manual(&mut self, backend: &mut BackendState, input: &str) -> Result<Option<String>> {
        self.error = None;
        match backend.set_from_manual(input) {
            Ok(url) => Ok(url),
            Err(e) => {
                self.error = Some(e.user_friendly_message());
                Err(e)
            }
        }
    }

    pub fn submit_qr(&mut self, backend: &mut BackendState, raw: &str) -> Result<String> {
        self.error = None;
        match backend.set_from_qr(raw)? {
            Some(url) => Ok(url),
            None => {
                self.error = Some(QR_URL_NOT_FOUND.to_string());
                Err(ClientError::ValidationError {
                    message: QR_URL_NOT_FOUND.to_string(),
                })
            }
        }
    }

    pub fn render(&self, backend: &BackendState) -> String {
        let mut lines = vec!["Подключение".to_string()];
        match backend.api_base_url() {
            Some(url) => lines.push(format!("Сервер: {}", url)),
            None => lines.push(CONNECT_HINT.to_string()),
        }
        if let Some(error) = &self.error {
            lines.push(error.clone());
        }
        lines.join("\n")
    }
}
