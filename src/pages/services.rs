use crate::core::loadable::{FetchGuard, Loadable};
use crate::domain::model::Service;
use crate::domain::ports::BookingApi;
use crate::utils::format::{format_duration, format_price};
use std::fmt::Write;

/// 名稱或分類包含關鍵字（不分大小寫）；空白關鍵字返回全部
pub fn filter_services<'a>(services: &'a [Service], search: &str) -> Vec<&'a Service> {
    let needle = search.trim().to_lowercase();
    if needle.is_empty() {
        return services.iter().collect();
    }
    services
        .iter()
        .filter(|s| {
            s.name.to_lowercase().contains(&needle) || s.category.to_lowercase().contains(&needle)
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct ServicesPage {
    pub services: Loadable<Vec<Service>>,
    pub search: String,
    guard: FetchGuard,
}

impl ServicesPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: &str) -> Self {
        self.search = search.to_string();
        self
    }

    /// 只保留啟用中的服務
    pub async fn load(&mut self, api: &dyn BookingApi) {
        let ticket = self.guard.begin();
        self.services = Loadable::Loading;
        let result = api
            .fetch_services()
            .await
            .map(|all| all.into_iter().filter(|s| s.is_active).collect::<Vec<_>>());
        if let Ok(services) = &result {
            tracing::debug!("Loaded {} active services", services.len());
        }
        ticket.apply(&mut self.services, result);
    }

    pub fn filtered(&self) -> Vec<&Service> {
        match self.services.value() {
            Some(services) => filter_services(services, &self.search),
            None => Vec::new(),
        }
    }

    pub fn render(&self) -> String {
        match &self.services {
            Loadable::Idle | Loadable::Loading => "Загрузка услуг...".to_string(),
            Loadable::Failed(e) => e.clone(),
            Loadable::Loaded(_) => {
                let filtered = self.filtered();
                if filtered.is_empty() {
                    return "Нет услуг".to_string();
                }
                let mut out = String::new();
                for s in filtered {
                    let _ = writeln!(
                        out,
                        "{}  {} · {} · {}  [{}]",
                        s.name,
                        format_price(s.price),
                        format_duration(s.duration),
                        s.category,
                        s.id
                    );
                }
                out.trim_end().to_string()
            }
        }
    }
}
