use crate::domain::ports::PreferenceStore;
use crate::state::{LEGAL_ACCEPTED_AT_KEY, LEGAL_VERSION_KEY};
use crate::utils::error::{ClientError, Result};
use crate::utils::format::to_rfc3339_utc;
use chrono::{DateTime, Utc};
use std::sync::Arc;

// 法律文件有實質變更時調整
pub const LEGAL_VERSION: &str = "2026-02-15";

pub struct LegalState {
    store: Arc<dyn PreferenceStore>,
    accepted_at: Option<String>,
}

impl LegalState {
    /// 已保存的版本與目前版本不同時，視為尚未同意
    pub fn load(store: Arc<dyn PreferenceStore>) -> Self {
        let version = store.get(LEGAL_VERSION_KEY);
        let accepted_at = store
            .get(LEGAL_ACCEPTED_AT_KEY)
            .filter(|_| version.as_deref() == Some(LEGAL_VERSION));
        Self { store, accepted_at }
    }

    pub fn accepted_at(&self) -> Option<&str> {
        self.accepted_at.as_deref()
    }

    pub fn accepted(&self) -> bool {
        self.accepted_at.is_some()
    }

    pub fn accept(&mut self) -> Result<String> {
        self.accept_at(Utc::now())
    }

    pub fn accept_at(&mut self, now: DateTime<Utc>) -> Result<String> {
        let at = to_rfc3339_utc(&now);
        self.store.set(LEGAL_ACCEPTED_AT_KEY, &at)?;
        self.store.set(LEGAL_VERSION_KEY, LEGAL_VERSION)?;
        tracing::info!("Legal documents {} accepted at {}", LEGAL_VERSION, at);
        self.accepted_at = Some(at.clone());
        Ok(at)
    }

    pub fn revoke(&mut self) -> Result<()> {
        self.store.remove(LEGAL_ACCEPTED_AT_KEY)?;
        self.store.remove(LEGAL_VERSION_KEY)?;
        self.accepted_at = None;
        tracing::info!("Legal acceptance revoked");
        Ok(())
    }

    pub fn require_accepted(&self) -> Result<()> {
        if self.accepted() {
            Ok(())
        } else {
            Err(ClientError::LegalNotAccepted {
                version: LEGAL_VERSION.to_string(),
            })
        }
    }
}
