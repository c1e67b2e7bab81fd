use crate::domain::ports::PreferenceStore;
use crate::state::THEME_KEY;
use crate::utils::error::{ClientError, Result};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            other => Err(ClientError::InvalidConfigValueError {
                field: "theme".to_string(),
                value: other.to_string(),
                reason: "Expected one of: light, dark, system".to_string(),
            }),
        }
    }
}

pub struct ThemeState {
    store: Arc<dyn PreferenceStore>,
}

impl ThemeState {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    /// 未設定或無法辨識的值回到預設
    pub fn current(&self) -> Theme {
        self.store
            .get(THEME_KEY)
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }

    pub fn set(&self, theme: Theme) -> Result<()> {
        self.store.set(THEME_KEY, theme.as_str())?;
        tracing::info!("Theme set to {}", theme);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryPreferenceStore;

    #[test]
    fn test_theme_defaults_and_persists() {
        let store = Arc::new(MemoryPreferenceStore::new());
        let theme = ThemeState::new(store.clone());
        assert_eq!(theme.current(), Theme::System);

        theme.set(Theme::Dark).unwrap();
        assert_eq!(theme.current(), Theme::Dark);

        store.set(THEME_KEY, "sepia").unwrap();
        assert_eq!(theme.current(), Theme::System);
    }

    #[test]
    fn test_theme_parse() {
        assert_eq!(" Light ".parse::<Theme>().unwrap(), Theme::Light);
        assert!("neon".parse::<Theme>().is_err());
    }
}
