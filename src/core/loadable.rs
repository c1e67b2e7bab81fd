use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// 每個畫面的讀取生命週期
#[derive(Debug, Clone, PartialEq)]
pub enum Loadable<T> {
    Idle,
    Loading,
    Loaded(T),
    Failed(String),
}

// 手動實作，避免要求 T: Default
impl<T> Default for Loadable<T> {
    fn default() -> Self {
        Loadable::Idle
    }
}

impl<T> Loadable<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Loadable::Loaded(v) => Some(v),
            _ => None,
        }
    }

    pub fn value_mut(&mut self) -> Option<&mut T> {
        match self {
            Loadable::Loaded(v) => Some(v),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Loadable::Failed(e) => Some(e),
            _ => None,
        }
    }
}

impl<T> From<crate::utils::error::Result<T>> for Loadable<T> {
    fn from(result: crate::utils::error::Result<T>) -> Self {
        match result {
            Ok(v) => Loadable::Loaded(v),
            Err(e) => Loadable::Failed(e.user_friendly_message()),
        }
    }
}

/// 讀取世代計數：畫面離開或重新請求後，較晚抵達的舊結果會被忽略
#[derive(Debug, Clone, Default)]
pub struct FetchGuard {
    generation: Arc<AtomicU64>,
}

#[derive(Debug, Clone)]
pub struct FetchTicket {
    generation: Arc<AtomicU64>,
    issued: u64,
}

impl FetchGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> FetchTicket {
        let issued = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        FetchTicket {
            generation: Arc::clone(&self.generation),
            issued,
        }
    }

    /// 使所有進行中的讀取失效（相當於畫面卸載）
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

impl FetchTicket {
    pub fn is_current(&self) -> bool {
        self.generation.load(Ordering::SeqCst) == self.issued
    }

    /// 僅在仍為最新請求時套用結果；返回是否已套用
    pub fn apply<T>(&self, slot: &mut Loadable<T>, result: crate::utils::error::Result<T>) -> bool {
        if !self.is_current() {
            tracing::debug!("Discarding stale fetch result (generation {})", self.issued);
            return false;
        }
        *slot = result.into();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ClientError;

    #[test]
    fn test_latest_ticket_wins() {
        let guard = FetchGuard::new();
        let first = guard.begin();
        let second = guard.begin();
        assert!(!first.is_current());
        assert!(second.is_current());

        let mut slot: Loadable<u32> = Loadable::Loading;
        assert!(!first.apply(&mut slot, Ok(1)));
        assert_eq!(slot, Loadable::Loading);
        assert!(second.apply(&mut slot, Ok(2)));
        assert_eq!(slot.value(), Some(&2));
    }

    #[test]
    fn test_invalidate_discards_in_flight() {
        let guard = FetchGuard::new();
        let ticket = guard.begin();
        guard.clone().invalidate();
        let mut slot: Loadable<u32> = Loadable::Idle;
        assert!(!ticket.apply(&mut slot, Ok(5)));
        assert_eq!(slot, Loadable::Idle);
    }

    #[test]
    fn test_error_becomes_failed_message() {
        let result: crate::utils::error::Result<u32> = Err(ClientError::HttpError {
            status: 400,
            message: "Bad slot".to_string(),
        });
        let slot: Loadable<u32> = result.into();
        assert_eq!(slot.error(), Some("Bad slot"));
    }
}
