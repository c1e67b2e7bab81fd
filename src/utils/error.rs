use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("{message}")]
    HttpError { status: u16, message: String },

    #[error("Backend returned HTML instead of JSON from {url}")]
    HtmlResponse { url: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Backend is not connected")]
    NotConnected,

    #[error("Legal documents version {version} have not been accepted")]
    LegalNotAccepted { version: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("{message}")]
    LoadFailed { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Backend,
    Configuration,
    Storage,
    Input,
    Consent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ClientError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ClientError::ApiError(_) => ErrorCategory::Network,
            ClientError::HttpError { .. }
            | ClientError::NotFound { .. }
            | ClientError::LoadFailed { .. } => ErrorCategory::Backend,
            ClientError::HtmlResponse { .. }
            | ClientError::NotConnected
            | ClientError::ConfigError { .. }
            | ClientError::ConfigValidationError { .. }
            | ClientError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            ClientError::IoError(_) | ClientError::SerializationError(_) => ErrorCategory::Storage,
            ClientError::ValidationError { .. } => ErrorCategory::Input,
            ClientError::LegalNotAccepted { .. } => ErrorCategory::Consent,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ClientError::LegalNotAccepted { .. } => ErrorSeverity::Low,
            ClientError::ApiError(_) => ErrorSeverity::Medium,
            ClientError::HttpError { status, .. } if *status >= 500 => ErrorSeverity::Medium,
            ClientError::HttpError { .. }
            | ClientError::NotFound { .. }
            | ClientError::LoadFailed { .. }
            | ClientError::ValidationError { .. }
            | ClientError::NotConnected
            | ClientError::HtmlResponse { .. } => ErrorSeverity::High,
            ClientError::ConfigError { .. }
            | ClientError::ConfigValidationError { .. }
            | ClientError::InvalidConfigValueError { .. }
            | ClientError::IoError(_)
            | ClientError::SerializationError(_) => ErrorSeverity::Critical,
        }
    }

    /// 給使用者的建議處理方式
    pub fn recovery_suggestion(&self) -> String {
        match self {
            ClientError::ApiError(_) => {
                "Check the network connection and that the backend is running".to_string()
            }
            ClientError::HttpError { status: 401, .. } | ClientError::HttpError { status: 403, .. } => {
                "Run `sb-client profile logout` and retry to register a fresh device key".to_string()
            }
            ClientError::HttpError { .. } => "Retry later or contact the service".to_string(),
            ClientError::HtmlResponse { .. } => {
                "The backend URL points at a web page, not the API. Reconnect with `sb-client connect --url <api host>`".to_string()
            }
            ClientError::NotConnected => {
                "Connect first: `sb-client connect --url <url>` or `sb-client connect --qr <payload>`".to_string()
            }
            ClientError::LegalNotAccepted { .. } => {
                "Review the documents with `sb-client legal show`, then `sb-client legal accept`".to_string()
            }
            ClientError::ConfigError { .. }
            | ClientError::ConfigValidationError { .. }
            | ClientError::InvalidConfigValueError { .. } => {
                "Fix the configuration file or command-line flags".to_string()
            }
            ClientError::IoError(_) | ClientError::SerializationError(_) => {
                "Check that the state directory is writable and not corrupted".to_string()
            }
            ClientError::ValidationError { .. } => "Check the command arguments".to_string(),
            ClientError::NotFound { .. } => "Check the identifier and try again".to_string(),
            ClientError::LoadFailed { .. } => "Retry the command; run with --verbose for details".to_string(),
        }
    }

    /// 顯示給使用者的錯誤訊息（後端訊息原樣呈現）
    pub fn user_friendly_message(&self) -> String {
        match self {
            ClientError::HttpError { message, .. } => message.clone(),
            ClientError::HtmlResponse { url } => format!(
                "Сервер вернул HTML вместо JSON ({url}). Похоже, адрес бэкенда указан неверно."
            ),
            ClientError::ApiError(e) if e.is_timeout() => "Сервер не отвечает".to_string(),
            ClientError::ApiError(e) if e.is_connect() => "Не удалось подключиться к серверу".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
