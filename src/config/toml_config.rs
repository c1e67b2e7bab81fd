use crate::api::client::DEFAULT_TIMEOUT_SECONDS;
use crate::api::{DEFAULT_APP_VERSION, DEFAULT_PLATFORM};
use crate::utils::error::{ClientError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "sb-client.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub client: ClientInfoConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    pub api_base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub runtime_config: Option<String>, // config.json 的路徑或 URL
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientInfoConfig {
    pub platform: Option<String>,
    pub app_version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    pub state_dir: Option<String>,
}

impl ClientConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ClientError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 檔案存在才載入，否則使用預設值
    pub fn from_optional_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            tracing::debug!("Loading config from {}", path.as_ref().display());
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ClientError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SB_API_BASE_URL})；未設定的變數替換為空字串
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ClientError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| {
                tracing::warn!("Environment variable {} is not set", var_name);
                String::new()
            })
        });

        Ok(result.to_string())
    }

    pub fn api_base_url(&self) -> Option<&str> {
        self.backend
            .api_base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.backend.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    pub fn runtime_config(&self) -> Option<&str> {
        self.backend
            .runtime_config
            .as_deref()
            .filter(|s| !s.trim().is_empty())
    }

    pub fn platform(&self) -> &str {
        self.client.platform.as_deref().unwrap_or(DEFAULT_PLATFORM)
    }

    pub fn app_version(&self) -> &str {
        self.client
            .app_version
            .as_deref()
            .unwrap_or(DEFAULT_APP_VERSION)
    }

    pub fn state_dir(&self) -> Option<PathBuf> {
        self.storage
            .state_dir
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
    }
}

/// 預設狀態目錄：$XDG_CONFIG_HOME/sb-client → $HOME/.sb-client → ./.sb-client
pub fn default_state_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg.is_empty() {
            return PathBuf::from(xdg).join("sb-client");
        }
    }
    match std::env::var("HOME") {
        Ok(home) if !home.is_empty() => PathBuf::from(home).join(".sb-client"),
        _ => PathBuf::from(".sb-client"),
    }
}

impl Validate for ClientConfig {
    fn validate(&self) -> Result<()> {
        if let Some(url) = self.api_base_url() {
            validate_url("backend.api_base_url", url)?;
        }
        if let Some(timeout) = self.backend.timeout_seconds {
            validate_positive_number("backend.timeout_seconds", timeout, 1)?;
        }
        if let Some(source) = self.runtime_config() {
            if source.starts_with("http://") || source.starts_with("https://") {
                validate_url("backend.runtime_config", source)?;
            } else {
                validate_path("backend.runtime_config", source)?;
            }
        }
        validate_non_empty_string("client.platform", self.platform())?;
        validate_non_empty_string("client.app_version", self.app_version())?;
        if let Some(dir) = &self.storage.state_dir {
            validate_path("storage.state_dir", dir)?;
        }
        Ok(())
    }
}
