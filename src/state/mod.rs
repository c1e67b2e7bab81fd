//! 本地持久化狀態：後端位址、認證金鑰、法律文件同意、主題偏好
//!
//! 每個值都是偏好儲存中的單一字串，只有「存在 / 不存在」兩種狀態。

pub mod auth;
pub mod backend;
pub mod legal;
pub mod theme;

pub use auth::AuthState;
pub use backend::BackendState;
pub use legal::{LegalState, LEGAL_VERSION};
pub use theme::{Theme, ThemeState};

pub const API_BASE_URL_KEY: &str = "sb_web_api_base_url";
pub const DEVICE_ID_KEY: &str = "sb_web_device_id";
pub const API_KEY_KEY: &str = "sb_web_api_key";
pub const LEGAL_ACCEPTED_AT_KEY: &str = "sb_web_legal_accepted_at";
pub const LEGAL_VERSION_KEY: &str = "sb_web_legal_version";
pub const THEME_KEY: &str = "sb_web_theme";
