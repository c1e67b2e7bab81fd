use crate::core::loadable::{FetchGuard, Loadable};
use crate::domain::model::ClientNewsItem;
use crate::domain::ports::BookingApi;
use crate::utils::error::{ClientError, Result};
use crate::utils::format::format_short_date;
use std::fmt::Write;

#[derive(Debug, Default)]
pub struct NewsPage {
    pub items: Loadable<Vec<ClientNewsItem>>,
    guard: FetchGuard,
}

impl NewsPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&mut self, api: &dyn BookingApi) {
        let ticket = self.guard.begin();
        self.items = Loadable::Loading;
        let result = api.fetch_news().await;
        if let Err(e) = &result {
            tracing::warn!("Failed to load news: {}", e);
        }
        ticket.apply(&mut self.items, result);
    }

    /// 標記已讀。失敗只記錄警告，不影響畫面；返回是否有變更
    pub async fn mark_read(&mut self, api: &dyn BookingApi, id: &str) -> Result<bool> {
        let items = self.items.value_mut().ok_or_else(|| ClientError::NotFound {
            message: "Новости не загружены".to_string(),
        })?;
        let item = items
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| ClientError::NotFound {
                message: format!("Новость {} не найдена", id),
            })?;
        let notification_id = match (&item.notification_id, item.read) {
            (Some(nid), false) if !nid.is_empty() => nid.clone(),
            _ => return Ok(false),
        };
        match api.mark_notification_read(&notification_id).await {
            Ok(()) => {
                item.read = true;
                Ok(true)
            }
            Err(e) => {
                tracing::warn!("Failed to mark news {} as read: {}", id, e);
                Ok(false)
            }
        }
    }

    pub fn render(&self) -> String {
        match &self.items {
            Loadable::Idle | Loadable::Loading => "Загрузка новостей...".to_string(),
            Loadable::Failed(e) if !e.trim().is_empty() => e.clone(),
            Loadable::Failed(_) => "Не удалось загрузить новости".to_string(),
            Loadable::Loaded(items) if items.is_empty() => "Новостей пока нет".to_string(),
            Loadable::Loaded(items) => {
                let mut out = String::new();
                for n in items {
                    let marker = if n.read { " " } else { "•" };
                    let _ = write!(out, "{} {}  [{}]\n  ", marker, format_short_date(&n.created_at), n.id);
                    if let Some(title) = n.title.as_deref().filter(|t| !t.is_empty()) {
                        let _ = write!(out, "{}\n  ", title);
                    }
                    let _ = writeln!(out, "{}", n.body);
                }
                out.trim_end().to_string()
            }
        }
    }
}
